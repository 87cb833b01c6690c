//! End-to-end demo: one tray icon with a context menu, tooltip, and a
//! startup notification. Selecting "Quit" from the menu exits.

#[cfg(windows)]
fn main() {
    use tracing::error;

    tracing_subscriber::fmt()
        .with_env_filter("tray_actor=debug,tray_actor_demo=info")
        .init();

    if let Err(e) = run() {
        error!(error = %e, "demo failed");
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn run() -> tray_actor::TrayResult<()> {
    use std::sync::mpsc;

    use tracing::info;
    use tray_actor::Tray;

    let tray = Tray::new()?;
    tray.set_icon(include_bytes!("../resources/demo.ico"))?;
    tray.set_tooltip("tray-actor demo")?;

    let (quit_tx, quit_rx) = mpsc::channel();

    tray.add_menu_item("Print", || info!("print selected"))?;
    tray.add_menu_item("Quit", move || {
        let _ = quit_tx.send(());
    })?;
    tray.add_separator()?;
    tray.add_menu_item("About", || info!("tray-actor demo 0.1.0"))?;

    tray.show_notification("Right-click the tray icon for the menu", "tray-actor demo")?;

    info!("running; select Quit from the tray menu to exit");
    let _ = quit_rx.recv();

    tray.close();
    info!("tray removed, exiting");

    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("tray-actor-demo targets the Windows shell; nothing to do here");
}
