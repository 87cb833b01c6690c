//! UTF-16 marshaling helpers for the fixed-capacity text fields in the
//! native shell structures.

use crate::{TrayError, TrayResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Converts text to a NUL-terminated UTF-16 string.
///
/// # Errors
///
/// Returns `StringEncodingFailed` if the text contains an interior NUL,
/// which the native wide-string representation cannot express.
#[track_caller]
pub(crate) fn to_wide(text: &str) -> TrayResult<Vec<u16>> {
    reject_interior_nul(text)?;
    Ok(text.encode_utf16().chain(std::iter::once(0)).collect())
}

/// Copies text into a fixed-capacity wide-string buffer, truncating to
/// `N - 1` code units and writing a terminator at the boundary.
///
/// The cut never splits a surrogate pair: if the last unit that fits is
/// a high surrogate whose partner was dropped, it is dropped too. Any
/// remaining capacity is zeroed so a shorter value fully replaces a
/// longer previous one.
///
/// # Errors
///
/// Returns `StringEncodingFailed` if the text contains an interior NUL.
#[track_caller]
pub(crate) fn copy_truncated<const N: usize>(buffer: &mut [u16; N], text: &str) -> TrayResult<()> {
    reject_interior_nul(text)?;

    if N == 0 {
        return Ok(());
    }

    let mut len = 0;
    let mut truncated = false;
    for unit in text.encode_utf16() {
        if len == N - 1 {
            truncated = true;
            break;
        }
        buffer[len] = unit;
        len += 1;
    }

    // A lone trailing high surrogate can only appear at a truncation
    // boundary; valid input always pairs it with the next unit.
    if truncated && len > 0 && (0xD800..0xDC00).contains(&buffer[len - 1]) {
        len -= 1;
    }

    for slot in &mut buffer[len..] {
        *slot = 0;
    }

    Ok(())
}

#[track_caller]
fn reject_interior_nul(text: &str) -> TrayResult<()> {
    if text.contains('\0') {
        return Err(TrayError::StringEncodingFailed {
            reason: "text contains an interior NUL".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(())
}
