use crate::{TrayError, text};

/// Decodes a wide buffer up to its terminator.
fn decode<const N: usize>(buffer: &[u16; N]) -> String {
    let len = buffer.iter().position(|&u| u == 0).unwrap_or(N);
    String::from_utf16_lossy(&buffer[..len])
}

/// WHAT: to_wide produces a NUL-terminated UTF-16 string
/// WHY: Native calls read until the terminator
#[test]
#[allow(clippy::unwrap_used)]
fn given_plain_text_when_converting_to_wide_then_terminated_and_round_trips() {
    // Given: Plain text
    let text = "Tray tooltip";

    // When: Converting to a wide string
    let wide = text::to_wide(text).unwrap();

    // Then: Last unit is the terminator and the content round-trips
    assert_eq!(wide.last(), Some(&0));
    assert_eq!(String::from_utf16_lossy(&wide[..wide.len() - 1]), text);
}

/// WHAT: to_wide rejects interior NULs
/// WHY: A NUL would silently cut the string inside the native call
#[test]
fn given_interior_nul_when_converting_to_wide_then_encoding_error() {
    // Given: Text with an embedded NUL
    let text = "before\0after";

    // When: Converting to a wide string
    let result = text::to_wide(text);

    // Then: Returns StringEncodingFailed
    assert!(matches!(
        result,
        Err(TrayError::StringEncodingFailed { .. })
    ));
}

/// WHAT: Text at or under capacity round-trips unmodified
/// WHY: Truncation must only affect overlong input
#[test]
#[allow(clippy::unwrap_used)]
fn given_text_under_capacity_when_copying_then_round_trips_unmodified() {
    // Given: A buffer with room to spare
    let mut buffer = [0u16; 16];
    let text = "short";

    // When: Copying into the buffer
    text::copy_truncated(&mut buffer, text).unwrap();

    // Then: The content round-trips and the tail is zeroed
    assert_eq!(decode(&buffer), text);
    assert!(buffer[text.len()..].iter().all(|&u| u == 0));
}

/// WHAT: Text exactly filling the capacity is kept whole
/// WHY: The capacity includes the terminator, nothing else
#[test]
#[allow(clippy::unwrap_used)]
fn given_text_at_capacity_when_copying_then_kept_whole() {
    // Given: Text of exactly N - 1 units for a buffer of N
    let mut buffer = [0u16; 8];
    let text = "1234567";

    // When: Copying into the buffer
    text::copy_truncated(&mut buffer, text).unwrap();

    // Then: All seven units survive, terminator in the last slot
    assert_eq!(decode(&buffer), text);
    assert_eq!(buffer[7], 0);
}

/// WHAT: Overlong text is truncated, not rejected
/// WHY: Tooltip and balloon capacity is a platform detail callers
/// should not have to know
#[test]
#[allow(clippy::unwrap_used)]
fn given_overlong_text_when_copying_then_truncated_and_terminated() {
    // Given: Text longer than the buffer
    let mut buffer = [0u16; 8];
    let text = "0123456789";

    // When: Copying into the buffer
    text::copy_truncated(&mut buffer, text).unwrap();

    // Then: N - 1 units survive with a terminator at the boundary
    assert_eq!(decode(&buffer), "0123456");
    assert_eq!(buffer[7], 0);
}

/// WHAT: Truncation never splits a surrogate pair
/// WHY: A lone surrogate renders as a replacement character
#[test]
#[allow(clippy::unwrap_used)]
fn given_surrogate_pair_at_boundary_when_copying_then_pair_dropped_whole() {
    // Given: Text whose fourth unit starts a surrogate pair, and a
    // buffer that can keep only four units
    let mut buffer = [0u16; 5];
    let text = "abc\u{1F600}";

    // When: Copying into the buffer
    text::copy_truncated(&mut buffer, text).unwrap();

    // Then: The whole pair is dropped, not half of it
    assert_eq!(decode(&buffer), "abc");
    assert_eq!(buffer[3], 0);
}

/// WHAT: A shorter value fully replaces a longer previous one
/// WHY: Stale units after the terminator must not survive reuse
#[test]
#[allow(clippy::unwrap_used)]
fn given_reused_buffer_when_copying_shorter_text_then_no_residue() {
    // Given: A buffer holding a long value
    let mut buffer = [0u16; 16];
    text::copy_truncated(&mut buffer, "a rather long value").unwrap();

    // When: Copying a shorter value into the same buffer
    text::copy_truncated(&mut buffer, "tiny").unwrap();

    // Then: Everything past the new terminator is zeroed
    assert_eq!(decode(&buffer), "tiny");
    assert!(buffer[4..].iter().all(|&u| u == 0));
}

/// WHAT: copy_truncated rejects interior NULs
/// WHY: Same contract as to_wide; the call is aborted untouched
#[test]
fn given_interior_nul_when_copying_then_encoding_error() {
    // Given: Text with an embedded NUL
    let mut buffer = [0u16; 16];

    // When: Copying into the buffer
    let result = text::copy_truncated(&mut buffer, "a\0b");

    // Then: Returns StringEncodingFailed
    assert!(matches!(
        result,
        Err(TrayError::StringEncodingFailed { .. })
    ));
}
