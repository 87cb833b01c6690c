//! Seam around the platform shell API.
//!
//! The backend is deliberately not `Send`: it is constructed on the
//! actor's thread and never leaves it, which is exactly the thread
//! affinity the native shell requires. Only the waker crosses threads.
//! Tests drive the actor with a scripted backend through this trait;
//! it is not a portability layer.

#[cfg(windows)]
pub(crate) mod win32;

use crate::{TrayResult, request::PumpEvent};

/// Events the actor's pump hands back, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellEvent {
    /// A caller posted a wake-up; one request is on the mailbox.
    Request,
    /// The tray icon received the activation gesture; show the menu.
    MenuActivated,
    /// A caller posted the termination signal.
    Quit,
}

/// Posts wake-up signals into the backend's native message queue from
/// arbitrary caller threads.
pub(crate) trait ShellWaker: Send + Sync {
    /// Posts one pump event. Failures are logged, not reported: the
    /// queue only disappears when the actor is already gone, and the
    /// caller then observes the closed mailbox instead.
    fn post(&self, event: PumpEvent);
}

/// The native resources owned by one tray actor: hidden window, tray
/// entry, context menu, installed icon.
pub(crate) trait ShellBackend {
    /// Returns a waker for this backend's message queue.
    fn waker(&self) -> Box<dyn ShellWaker>;

    /// Blocks on the native message queue until an event of interest
    /// arrives, dispatching unrelated window messages along the way.
    fn next_event(&mut self) -> ShellEvent;

    /// Installs an icon from raw `.ico` bytes. On failure the
    /// previously installed icon remains in place.
    fn set_icon(&mut self, bytes: &[u8]) -> TrayResult<()>;

    /// Sets the hover tooltip, truncated to the native field capacity.
    fn set_tooltip(&mut self, text: &str) -> TrayResult<()>;

    /// Appends a clickable entry with the given identifier.
    fn append_menu_item(&mut self, id: u32, text: &str) -> TrayResult<()>;

    /// Appends a separator, which carries no identifier.
    fn append_separator(&mut self) -> TrayResult<()>;

    /// Raises a transient balloon notification, body and title
    /// truncated to their native field capacities.
    fn show_notification(&mut self, body: &str, title: &str) -> TrayResult<()>;

    /// Shows the context menu at the pointer and blocks until the user
    /// selects an entry or dismisses it. Returns the selected entry's
    /// identifier, 0 on dismissal.
    fn show_menu(&mut self) -> u32;

    /// Removes the tray entry and releases every native resource.
    /// Infallible by design: shutdown always completes, failures are
    /// logged and teardown continues.
    fn detach(&mut self);
}
