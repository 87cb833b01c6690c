//! Request/response protocol between callers and the tray actor.

use crate::{TrayResult, menu::MenuCallback};

use std::sync::mpsc::SyncSender;

/// Reply channel for one request. Bounded with capacity 1 so the actor
/// never blocks sending the outcome, even if the caller vanished.
pub(crate) type Responder = SyncSender<TrayResult<()>>;

/// Wake-up signals posted to the actor's native message queue.
///
/// These carry no payload; a `Request` wake-up tells the blocked pump
/// to dequeue exactly one mailbox entry, and `Shutdown` tells it to
/// tear down and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpEvent {
    /// One request is being enqueued on the mailbox.
    Request,
    /// Remove the tray icon and stop the event loop.
    Shutdown,
}

/// Operations sent from caller threads to the actor's mailbox.
///
/// The actor owns every native resource, so all mutations flow through
/// this enum and are performed on its thread. Each variant carries its
/// own responder; the outcome of the native call travels back on it.
pub(crate) enum TrayRequest {
    /// Install an icon from in-memory `.ico` bytes.
    SetIcon {
        /// Raw icon-format image bytes.
        bytes: Vec<u8>,
        /// Outcome channel for this request.
        reply: Responder,
    },
    /// Set the hover tooltip, truncated to the native field capacity.
    SetTooltip {
        /// Tooltip text.
        text: String,
        /// Outcome channel for this request.
        reply: Responder,
    },
    /// Append a clickable entry to the context menu.
    AddMenuItem {
        /// Entry label.
        text: String,
        /// Invoked (detached from the actor) when the entry is selected.
        callback: MenuCallback,
        /// Outcome channel for this request.
        reply: Responder,
    },
    /// Append a visual divider to the context menu.
    AddSeparator {
        /// Outcome channel for this request.
        reply: Responder,
    },
    /// Raise a transient balloon notification.
    ShowNotification {
        /// Notification body, truncated to the native field capacity.
        body: String,
        /// Notification title, truncated to the native field capacity.
        title: String,
        /// Outcome channel for this request.
        reply: Responder,
    },
}

impl TrayRequest {
    /// Variant name for structured logging; callbacks are not `Debug`.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            TrayRequest::SetIcon { .. } => "set_icon",
            TrayRequest::SetTooltip { .. } => "set_tooltip",
            TrayRequest::AddMenuItem { .. } => "add_menu_item",
            TrayRequest::AddSeparator { .. } => "add_separator",
            TrayRequest::ShowNotification { .. } => "show_notification",
        }
    }
}
