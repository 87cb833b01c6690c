//! The actor thread that owns all native tray state.
//!
//! Callers never touch the window, menu, or icon directly; every
//! mutation arrives as a [`TrayRequest`] and is performed here, one at
//! a time, between turns of the native message pump.

use crate::{
    TrayError, TrayResult,
    menu::MenuRegistry,
    request::TrayRequest,
    shell::{ShellBackend, ShellEvent, ShellWaker},
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use error_location::ErrorLocation;
use tracing::{debug, error, info};

/// Lifecycle of one actor. `Starting` ends when the native window
/// exists and the constructor's rendezvous completes; `ShuttingDown`
/// begins on the termination signal and ends when the pump exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorState {
    Starting,
    Running,
    ShuttingDown,
    Closed,
}

/// Caller-side ends of a spawned actor.
pub(crate) struct ActorHandle {
    pub(crate) waker: Box<dyn ShellWaker>,
    pub(crate) mailbox: Sender<TrayRequest>,
    pub(crate) join: JoinHandle<()>,
}

/// Spawns the actor thread. The factory runs ON that thread, because
/// the backend it builds is bound to the thread that creates the
/// native window. Blocks until the backend exists (or failed), so the
/// returned handle is never used before the window does.
pub(crate) fn spawn<B, F>(factory: F) -> TrayResult<ActorHandle>
where
    B: ShellBackend,
    F: FnOnce() -> TrayResult<B> + Send + 'static,
{
    let (mailbox_tx, mailbox_rx) = mpsc::channel();
    let (ready_tx, ready_rx) = mpsc::sync_channel::<TrayResult<Box<dyn ShellWaker>>>(1);

    let join = thread::Builder::new()
        .name("tray-actor".to_string())
        .spawn(move || {
            debug!(state = ?ActorState::Starting, "tray actor starting");
            let backend = match factory() {
                Ok(backend) => backend,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(backend.waker()));
            run(backend, mailbox_rx);
        })?;

    match ready_rx.recv() {
        Ok(Ok(waker)) => Ok(ActorHandle {
            waker,
            mailbox: mailbox_tx,
            join,
        }),
        Ok(Err(e)) => {
            let _ = join.join();
            Err(e)
        }
        // The thread died before the rendezvous.
        Err(_) => {
            let _ = join.join();
            Err(TrayError::ActorStopped {
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }
}

fn run<B: ShellBackend>(mut backend: B, mailbox: Receiver<TrayRequest>) {
    let mut registry = MenuRegistry::new();
    let mut state = ActorState::Running;
    info!(state = ?state, "tray actor running");

    loop {
        match backend.next_event() {
            ShellEvent::Request => {
                // Exactly one dequeue per wake-up keeps requests and
                // responses in lockstep.
                match mailbox.recv() {
                    Ok(request) => dispatch(&mut backend, &mut registry, request),
                    Err(_) => debug!("mailbox closed with a wake-up pending"),
                }
            }
            ShellEvent::MenuActivated => {
                let selected = backend.show_menu();
                invoke_callback(&registry, selected);
            }
            ShellEvent::Quit => {
                state = ActorState::ShuttingDown;
                info!(state = ?state, "tray actor shutting down");
                backend.detach();
                break;
            }
        }
    }

    state = ActorState::Closed;
    info!(state = ?state, "tray actor closed");
}

/// Performs one native call and reports the outcome on the request's
/// own responder before the pump resumes.
fn dispatch<B: ShellBackend>(backend: &mut B, registry: &mut MenuRegistry, request: TrayRequest) {
    let kind = request.kind();
    debug!(request = kind, "dispatching request");

    let (reply, outcome) = match request {
        TrayRequest::SetIcon { bytes, reply } => (reply, backend.set_icon(&bytes)),
        TrayRequest::SetTooltip { text, reply } => (reply, backend.set_tooltip(&text)),
        TrayRequest::AddMenuItem {
            text,
            callback,
            reply,
        } => {
            let id = registry.allocate_id();
            let outcome = backend.append_menu_item(id, &text);
            // A rejected append leaves the id unmapped, so a later
            // selection of it resolves to nothing.
            if outcome.is_ok() {
                registry.insert(id, callback);
            }
            (reply, outcome)
        }
        TrayRequest::AddSeparator { reply } => (reply, backend.append_separator()),
        TrayRequest::ShowNotification { body, title, reply } => {
            (reply, backend.show_notification(&body, &title))
        }
    };

    if let Err(e) = &outcome {
        error!(request = kind, error = %e, "request failed");
    }
    if reply.send(outcome).is_err() {
        debug!(request = kind, "caller gone before reply");
    }
}

/// Runs the callback for a selected menu entry on its own thread,
/// detached from the actor. A slow or panicking callback never stalls
/// or crashes the pump. Identifier 0 (dismissed) has no registration.
fn invoke_callback(registry: &MenuRegistry, selected: u32) {
    let Some(callback) = registry.get(selected) else {
        debug!(selected, "no callback registered for selection");
        return;
    };

    let callback = Arc::clone(callback);
    let spawned = thread::Builder::new()
        .name("tray-menu-callback".to_string())
        .spawn(move || callback());
    if let Err(e) = spawned {
        error!(selected, error = %e, "failed to spawn callback thread");
    }
}
