//! Public handle for one system-tray icon.

use crate::{
    TrayError, TrayResult,
    actor::{self, ActorHandle},
    menu::MenuCallback,
    request::{PumpEvent, Responder, TrayRequest},
    shell::{ShellBackend, ShellWaker},
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;

use error_location::ErrorLocation;
use tracing::{error, info, instrument};

/// One icon in the system tray.
///
/// All native state lives on a dedicated actor thread; this handle
/// marshals every operation to it and blocks until the native call
/// completed, so failures surface at the call site instead of being
/// dropped. The handle is cheap to share behind an `Arc`; concurrent
/// callers are serialized by the actor, one full request/response
/// cycle at a time, with no ordering guarantee between callers.
///
/// Menu callbacks run detached from the actor on their own threads:
/// they must not assume the actor's thread and are not awaited.
pub struct Tray {
    waker: Box<dyn ShellWaker>,
    mailbox: mpsc::Sender<TrayRequest>,
    join: Option<JoinHandle<()>>,
}

impl Tray {
    /// Creates the tray icon, blocking until the hidden native window
    /// exists and the tray entry is registered with the shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor thread cannot be spawned or any
    /// of the window/menu/shell registration calls is rejected.
    #[cfg(windows)]
    #[track_caller]
    pub fn new() -> TrayResult<Self> {
        Self::with_backend(crate::shell::win32::Win32Shell::new)
    }

    /// Spawns the actor over an arbitrary backend. The factory runs on
    /// the actor's thread.
    pub(crate) fn with_backend<B, F>(factory: F) -> TrayResult<Self>
    where
        B: ShellBackend,
        F: FnOnce() -> TrayResult<B> + Send + 'static,
    {
        let ActorHandle {
            waker,
            mailbox,
            join,
        } = actor::spawn(factory)?;

        info!("tray created");

        Ok(Self {
            waker,
            mailbox,
            join: Some(join),
        })
    }

    /// Installs the tray icon from in-memory `.ico` bytes.
    ///
    /// # Errors
    ///
    /// Returns `IconLoadFailed` if the platform rejects the bytes; the
    /// previously installed icon is left unchanged.
    #[track_caller]
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn set_icon(&self, bytes: &[u8]) -> TrayResult<()> {
        let bytes = bytes.to_vec();
        self.request(move |reply| TrayRequest::SetIcon { bytes, reply })
    }

    /// Sets the hover tooltip, truncated to the native field capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be marshaled or the native
    /// call is rejected.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn set_tooltip(&self, text: &str) -> TrayResult<()> {
        let text = text.to_string();
        self.request(move |reply| TrayRequest::SetTooltip { text, reply })
    }

    /// Appends a clickable entry to the context menu. The callback is
    /// invoked on a detached thread each time the entry is selected.
    ///
    /// Entries and separators appear in call order.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be marshaled or the native
    /// call is rejected.
    #[track_caller]
    #[instrument(skip(self, callback))]
    pub fn add_menu_item(
        &self,
        text: &str,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> TrayResult<()> {
        let text = text.to_string();
        let callback: MenuCallback = Arc::new(callback);
        self.request(move |reply| TrayRequest::AddMenuItem {
            text,
            callback,
            reply,
        })
    }

    /// Appends a visual divider to the context menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the native call is rejected.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn add_separator(&self) -> TrayResult<()> {
        self.request(|reply| TrayRequest::AddSeparator { reply })
    }

    /// Raises a transient balloon notification. Body and title are
    /// truncated to their native field capacities.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be marshaled or the native
    /// call is rejected.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn show_notification(&self, body: &str, title: &str) -> TrayResult<()> {
        let body = body.to_string();
        let title = title.to_string();
        self.request(move |reply| TrayRequest::ShowNotification { body, title, reply })
    }

    /// Removes the tray icon and stops the actor, blocking until
    /// teardown completes. Unconditional: shutdown always finishes,
    /// even if the shell rejects the removal call.
    ///
    /// Consuming `self` makes use-after-close a compile error. An
    /// operation racing `close` from another clone of a surrounding
    /// `Arc` observes `ActorStopped`.
    #[instrument(skip(self))]
    pub fn close(mut self) {
        self.shutdown();
    }

    /// Posts the wake-up, enqueues the payload, then blocks on this
    /// request's own responder. The wake-up goes first so the pump's
    /// blocking wait returns and dequeues exactly this one request.
    #[track_caller]
    fn request(&self, make: impl FnOnce(Responder) -> TrayRequest) -> TrayResult<()> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.waker.post(PumpEvent::Request);
        self.mailbox
            .send(make(reply_tx))
            .map_err(|_| actor_stopped())?;
        reply_rx.recv().map_err(|_| actor_stopped())?
    }

    fn shutdown(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        self.waker.post(PumpEvent::Shutdown);
        if join.join().is_err() {
            error!("tray actor thread panicked during shutdown");
        }
    }
}

impl Drop for Tray {
    /// Tears down the actor if the handle was dropped without `close`.
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[track_caller]
fn actor_stopped() -> TrayError {
    TrayError::ActorStopped {
        location: ErrorLocation::from(Location::caller()),
    }
}
