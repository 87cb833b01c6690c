//! System-tray icon with a context menu and balloon notifications.
//!
//! The Windows shell requires every tray interaction to happen on the
//! thread that created the owning window, while callers arrive from
//! anywhere. Each [`Tray`] therefore runs a dedicated actor thread
//! that owns the hidden window, the menu, and the icon, pumps the
//! native message loop, and serializes caller operations through a
//! synchronous request/response channel.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn demo() -> tray_actor::TrayResult<()> {
//! use tray_actor::Tray;
//!
//! let tray = Tray::new()?;
//! let icon = std::fs::read("app.ico")?;
//! tray.set_icon(&icon)?;
//! tray.set_tooltip("My application")?;
//! tray.add_menu_item("Say hello", || println!("hello"))?;
//! tray.add_separator()?;
//! tray.add_menu_item("Quit", || { /* signal your main loop */ })?;
//! tray.show_notification("Started", "My application")?;
//! // ... run until quit ...
//! tray.close();
//! # Ok(())
//! # }
//! ```

mod actor;
mod error;
mod menu;
mod request;
mod shell;
mod text;
mod tray;

pub use {error::Result as TrayResult, error::TrayError, tray::Tray};

#[cfg(test)]
mod tests;
