//! UTF-8 to message text conversion

use heapless::Vec;

use super::catalog::{escape_for, match_prefix};

const VARIATION_SELECTOR: char = '\u{FE0F}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Rewrite `input` into single-byte message text
///
/// - catalog emoji become escape bytes (longest match wins)
/// - variation selectors and zero-width joiners are dropped
/// - ASCII control characters become spaces
/// - anything else outside ASCII becomes `?`
///
/// Output stops when `out` is full. Each character maps to at most one
/// byte, so an escape is never split.
pub fn sanitize_into<const N: usize>(input: &str, out: &mut Vec<u8, N>) {
    out.clear();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if out.is_full() {
            break;
        }

        if let Some((index, len)) = match_prefix(rest) {
            let _ = out.push(escape_for(index));
            rest = &rest[len..];
            continue;
        }

        rest = &rest[c.len_utf8()..];
        let byte = match c {
            VARIATION_SELECTOR | ZERO_WIDTH_JOINER => continue,
            c if c.is_ascii_control() => b' ',
            c if c.is_ascii() => c as u8,
            _ => b'?',
        };
        let _ = out.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emoji::catalog::EMOJI_COUNT;
    use meshdeck_protocol::{EMOJI_ESCAPE_START, TEXT_MAX_LEN};

    fn sanitize(input: &str) -> Vec<u8, TEXT_MAX_LEN> {
        let mut out = Vec::new();
        sanitize_into(input, &mut out);
        out
    }

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(sanitize("Alice: hi there").as_slice(), b"Alice: hi there");
    }

    #[test]
    fn test_emoji_become_escapes() {
        let out = sanitize("ok \u{1F44D}\u{1F525}");
        assert_eq!(
            out.as_slice(),
            &[b'o', b'k', b' ', EMOJI_ESCAPE_START + 8, EMOJI_ESCAPE_START + 13]
        );
        assert!(out[3..].iter().all(|b| (*b - EMOJI_ESCAPE_START) < EMOJI_COUNT as u8));
    }

    #[test]
    fn test_variation_selector_dropped() {
        assert_eq!(
            sanitize("\u{2764}\u{FE0F}!").as_slice(),
            &[EMOJI_ESCAPE_START + 12, b'!']
        );
    }

    #[test]
    fn test_controls_and_unknown() {
        assert_eq!(sanitize("a\nb\tc\0d").as_slice(), b"a b c d");
        assert_eq!(sanitize("caf\u{E9}").as_slice(), b"caf?");
        assert_eq!(sanitize("\u{1F680}").as_slice(), b"?");
    }

    #[test]
    fn test_output_truncated() {
        let long = "x".repeat(300);
        assert_eq!(sanitize(&long).len(), TEXT_MAX_LEN);

        let mut small: Vec<u8, 3> = Vec::new();
        sanitize_into("ab\u{1F600}\u{1F600}", &mut small);
        assert_eq!(small.as_slice(), &[b'a', b'b', EMOJI_ESCAPE_START]);
    }
}
