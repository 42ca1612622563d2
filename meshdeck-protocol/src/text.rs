//! Message text encoding
//!
//! Message text is stored as bytes: printable ASCII, plus single-byte emoji
//! escapes starting at [`EMOJI_ESCAPE_START`] and an ignorable pad byte.

/// Size of the text field, terminator included
pub const TEXT_CAP: usize = 160;

/// Longest text that still leaves room for the terminator
pub const TEXT_MAX_LEN: usize = TEXT_CAP - 1;

/// First emoji escape byte; emoji `i` is `EMOJI_ESCAPE_START + i`
pub const EMOJI_ESCAPE_START: u8 = 0x80;

/// Byte that renders as nothing
pub const EMOJI_PAD_BYTE: u8 = 0x7F;

const _: () = assert!(EMOJI_PAD_BYTE < EMOJI_ESCAPE_START);

/// Bytes before the first NUL
pub fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_nul() {
        assert_eq!(until_nul(b"abc\0def"), b"abc");
        assert_eq!(until_nul(b"abc"), b"abc");
        assert_eq!(until_nul(b"\0"), b"");
    }
}
