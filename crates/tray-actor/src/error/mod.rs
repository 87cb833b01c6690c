use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors reported by tray operations.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum TrayError {
    /// The platform image loader rejected the supplied icon bytes.
    #[error("Icon load failed: {reason} {location}")]
    IconLoadFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A shell, menu, or notification call returned failure.
    #[error("Native call {call} rejected: {reason} {location}")]
    NativeCallRejected {
        /// Name of the rejected platform call.
        call: &'static str,
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Input text cannot be converted to the platform's wide-string
    /// representation. This is a programming error in the caller; the
    /// offending operation is aborted without touching native state.
    #[error("String encoding failed: {reason} {location}")]
    StringEncodingFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The actor thread is gone; its mailbox or reply channel is closed.
    #[error("Tray actor stopped {location}")]
    ActorStopped {
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from temp-file handling or thread spawning.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for TrayError {
    // Manual From with location tracking; #[from] does not support
    // extra fields.
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        TrayError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `TrayError`.
pub type Result<T> = StdResult<T, TrayError>;
