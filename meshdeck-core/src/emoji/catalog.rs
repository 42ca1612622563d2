//! Emoji catalog
//!
//! Sprites are XBM bitmaps (rows padded to whole bytes, LSB is the
//! leftmost pixel). Large sprites are the small ones scaled 2x.

use meshdeck_protocol::EMOJI_ESCAPE_START;

/// Number of catalog entries
pub const EMOJI_COUNT: usize = 24;

/// Small sprite width in pixels
pub const EMOJI_SMALL_W: u32 = 8;
/// Small sprite height in pixels
pub const EMOJI_SMALL_H: u32 = 8;
/// Large sprite width in pixels
pub const EMOJI_LARGE_W: u32 = 16;
/// Large sprite height in pixels
pub const EMOJI_LARGE_H: u32 = 16;

const SMALL_BYTES: usize = 8;
const LARGE_BYTES: usize = 32;

const _: () = assert!(EMOJI_ESCAPE_START as usize + EMOJI_COUNT <= 0x100);

/// One catalog entry
#[derive(Debug)]
pub struct Emoji {
    /// UTF-8 sequence this entry replaces
    pub sequence: &'static str,
    /// Short label shown in the picker
    pub label: &'static str,
    /// Sprite used inline in message text
    pub small: [u8; SMALL_BYTES],
    /// Sprite used in the picker grid
    pub large: [u8; LARGE_BYTES],
}

const fn pack(rows: [&str; 8]) -> [u8; SMALL_BYTES] {
    let mut out = [0u8; SMALL_BYTES];
    let mut y = 0;
    while y < 8 {
        let row = rows[y].as_bytes();
        let mut x = 0;
        while x < 8 && x < row.len() {
            if row[x] == b'#' {
                out[y] |= 1 << x;
            }
            x += 1;
        }
        y += 1;
    }
    out
}

const fn scale2x(small: [u8; SMALL_BYTES]) -> [u8; LARGE_BYTES] {
    let mut out = [0u8; LARGE_BYTES];
    let mut y = 0;
    while y < 8 {
        let mut wide: u16 = 0;
        let mut x = 0;
        while x < 8 {
            if small[y] & (1 << x) != 0 {
                wide |= 0b11 << (2 * x);
            }
            x += 1;
        }
        let [lo, hi] = wide.to_le_bytes();
        out[4 * y] = lo;
        out[4 * y + 1] = hi;
        out[4 * y + 2] = lo;
        out[4 * y + 3] = hi;
        y += 1;
    }
    out
}

const fn emoji(sequence: &'static str, label: &'static str, rows: [&str; 8]) -> Emoji {
    let small = pack(rows);
    Emoji {
        sequence,
        label,
        small,
        large: scale2x(small),
    }
}

/// The catalog; escape byte `EMOJI_ESCAPE_START + i` stands for entry `i`
pub static EMOJI: [Emoji; EMOJI_COUNT] = [
    emoji("\u{1F600}", "grin", [
        "..####..",
        ".#....#.",
        "#.#..#.#",
        "#......#",
        "#.####.#",
        "#..##..#",
        ".#....#.",
        "..####..",
    ]),
    emoji("\u{1F602}", "lol", [
        "..####..",
        ".#....#.",
        "#.#..#.#",
        "##....##",
        "#.####.#",
        "#.#..#.#",
        ".#.##.#.",
        "..####..",
    ]),
    emoji("\u{1F609}", "wink", [
        "..####..",
        ".#....#.",
        "#.##.#.#",
        "#......#",
        "#.#..#.#",
        "#..##..#",
        ".#....#.",
        "..####..",
    ]),
    emoji("\u{1F60D}", "love", [
        "..####..",
        ".#....#.",
        "##.#.#.#",
        "#.#..#.#",
        "#......#",
        "#.####.#",
        ".#....#.",
        "..####..",
    ]),
    emoji("\u{1F622}", "sad", [
        "..####..",
        ".#....#.",
        "#.#..#.#",
        "#.#....#",
        "#..##..#",
        "#.#..#.#",
        ".#....#.",
        "..####..",
    ]),
    emoji("\u{1F621}", "mad", [
        "..####..",
        ".##..##.",
        "#..##..#",
        "#.#..#.#",
        "#......#",
        "#.####.#",
        ".#....#.",
        "..####..",
    ]),
    emoji("\u{1F60E}", "cool", [
        "..####..",
        ".#....#.",
        "########",
        "#.##.###",
        "#......#",
        "#.#..#.#",
        ".#.##.#.",
        "..####..",
    ]),
    emoji("\u{1F914}", "hmm", [
        "..####..",
        ".#....#.",
        "#.#..#.#",
        "#......#",
        "#..###.#",
        "##.....#",
        "###...#.",
        ".#####..",
    ]),
    emoji("\u{1F44D}", "yes", [
        "....#...",
        "...##...",
        "...#....",
        "######..",
        "#.....#.",
        "######..",
        "#.....#.",
        "######..",
    ]),
    emoji("\u{1F44E}", "no", [
        "######..",
        "#.....#.",
        "######..",
        "#.....#.",
        "######..",
        "...#....",
        "...##...",
        "....#...",
    ]),
    emoji("\u{1F44B}", "hi", [
        ".#.#.#..",
        ".#.#.#..",
        ".#.#.#.#",
        ".######.",
        "#.####..",
        ".#####..",
        "..###...",
        "..###...",
    ]),
    emoji("\u{1F64F}", "pray", [
        "...##...",
        "..####..",
        "..####..",
        ".##..##.",
        ".##..##.",
        "##....##",
        "#.#..#.#",
        "..#..#..",
    ]),
    emoji("\u{2764}", "<3", [
        "........",
        ".##.##..",
        "#######.",
        "#######.",
        ".#####..",
        "..###...",
        "...#....",
        "........",
    ]),
    emoji("\u{1F525}", "fire", [
        "...#....",
        "...##...",
        "..###.#.",
        ".#####..",
        ".##.###.",
        "##...##.",
        "##...##.",
        ".#####..",
    ]),
    emoji("\u{2B50}", "star", [
        "...#....",
        "...#....",
        "#######.",
        ".#####..",
        "..###...",
        ".##.##..",
        ".#...#..",
        "........",
    ]),
    emoji("\u{2600}", "sun", [
        "#..#..#.",
        ".#...#..",
        "..###...",
        "#######.",
        "..###...",
        ".#...#..",
        "#..#..#.",
        "........",
    ]),
    emoji("\u{1F327}", "rain", [
        "..###...",
        ".#####..",
        "#######.",
        "........",
        "#..#..#.",
        ".#..#..#",
        "#..#..#.",
        "........",
    ]),
    emoji("\u{1F4E1}", "ant", [
        "#.....#.",
        ".#...#..",
        "..#.#...",
        "...#....",
        "...#....",
        "..###...",
        ".#####..",
        "#######.",
    ]),
    emoji("\u{1F50B}", "batt", [
        "..##....",
        ".####...",
        ".#..#...",
        ".####...",
        ".####...",
        ".####...",
        ".####...",
        "........",
    ]),
    emoji("\u{26A0}", "warn", [
        "...#....",
        "..#.#...",
        "..###...",
        ".#.#.#..",
        ".#.#.#..",
        "#.....#.",
        "#..#..#.",
        "#######.",
    ]),
    emoji("\u{2705}", "done", [
        "########",
        "#......#",
        "#.....##",
        "#....#.#",
        "##..#..#",
        "#.##...#",
        "#..#...#",
        "########",
    ]),
    emoji("\u{274C}", "fail", [
        "##....##",
        ".##..##.",
        "..####..",
        "...##...",
        "..####..",
        ".##..##.",
        "##....##",
        "........",
    ]),
    emoji("\u{1F4CD}", "pin", [
        "..###...",
        ".#####..",
        ".##.##..",
        ".#####..",
        "..###...",
        "...#....",
        "...#....",
        "...#....",
    ]),
    emoji("\u{1F389}", "yay", [
        "......#.",
        ".#..#...",
        "...#..#.",
        "..##.#..",
        ".####...",
        ".###..#.",
        "####....",
        "###.....",
    ]),
];

/// Whether a byte is an emoji escape
pub fn is_escape(byte: u8) -> bool {
    byte >= EMOJI_ESCAPE_START && ((byte - EMOJI_ESCAPE_START) as usize) < EMOJI_COUNT
}

/// Catalog entry for an escape byte
pub fn from_escape(byte: u8) -> Option<&'static Emoji> {
    if is_escape(byte) {
        EMOJI.get((byte - EMOJI_ESCAPE_START) as usize)
    } else {
        None
    }
}

/// Escape byte for catalog index `index`
///
/// `index` must be below [`EMOJI_COUNT`].
pub fn escape_for(index: usize) -> u8 {
    EMOJI_ESCAPE_START + (index % EMOJI_COUNT) as u8
}

/// Longest catalog sequence at the start of `text`
///
/// Returns the catalog index and the matched length in bytes.
pub fn match_prefix(text: &str) -> Option<(usize, usize)> {
    EMOJI
        .iter()
        .enumerate()
        .filter(|(_, e)| text.starts_with(e.sequence))
        .max_by_key(|(_, e)| e.sequence.len())
        .map(|(i, e)| (i, e.sequence.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshdeck_protocol::EMOJI_PAD_BYTE;

    #[test]
    fn test_escape_range() {
        assert!(!is_escape(EMOJI_ESCAPE_START - 1));
        assert!(is_escape(EMOJI_ESCAPE_START));
        assert!(is_escape(EMOJI_ESCAPE_START + EMOJI_COUNT as u8 - 1));
        assert!(!is_escape(EMOJI_ESCAPE_START + EMOJI_COUNT as u8));
        assert!(!is_escape(EMOJI_PAD_BYTE));
        assert_eq!(escape_for(3), EMOJI_ESCAPE_START + 3);
        assert_eq!(from_escape(escape_for(3)).map(|e| e.label), Some("love"));
    }

    #[test]
    fn test_labels_fit_picker_cells() {
        for entry in EMOJI.iter() {
            assert!(!entry.label.is_empty());
            assert!(entry.label.len() <= 4, "{}", entry.label);
        }
    }

    #[test]
    fn test_sequences_unique() {
        for (i, a) in EMOJI.iter().enumerate() {
            for b in EMOJI.iter().skip(i + 1) {
                assert_ne!(a.sequence, b.sequence);
            }
        }
    }

    #[test]
    fn test_pack_is_lsb_first() {
        let bits = pack([
            "#.......", ".......#", "", "", "", "", "", "",
        ]);
        assert_eq!(bits[0], 0x01);
        assert_eq!(bits[1], 0x80);
    }

    #[test]
    fn test_large_sprite_is_doubled() {
        let small = pack(["#.......", "", "", "", "", "", "", ".......#"]);
        let large = scale2x(small);
        // rows 0 and 1: pixels 0..2 set
        assert_eq!(&large[0..4], &[0b11, 0, 0b11, 0]);
        // rows 14 and 15: pixels 14..16 set
        assert_eq!(&large[28..32], &[0, 0b1100_0000, 0, 0b1100_0000]);
    }

    #[test]
    fn test_match_prefix() {
        assert_eq!(match_prefix("\u{1F525} hot"), Some((13, 4)));
        assert_eq!(match_prefix("\u{2764}\u{FE0F}"), Some((12, 3)));
        assert_eq!(match_prefix("abc"), None);
    }
}
