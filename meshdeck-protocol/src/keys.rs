//! Key codes delivered by the keyboard driver
//!
//! Keys arrive as single bytes: plain ASCII for the keyboard proper, plus
//! two sentinel codes for the hardware prev/next buttons.

/// Hardware "next" button
pub const KEY_NEXT: u8 = 0xF1;

/// Hardware "prev" button
pub const KEY_PREV: u8 = 0xF2;

/// Enter key
pub const KEY_ENTER: u8 = b'\r';

/// Backspace
pub const KEY_BACKSPACE: u8 = 0x08;

/// Delete, treated as backspace
pub const KEY_DELETE: u8 = 0x7F;

/// Meaning of a key byte for navigation
///
/// Letters are matched case-insensitively. Screens that take text input
/// look at the raw byte first and fall back to this only for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// `\r` or `\n`
    Confirm,
    /// Backspace or delete
    Backspace,
    /// Hardware next button
    Next,
    /// Hardware prev button
    Prev,
    /// `W`
    Up,
    /// `S`
    Down,
    /// `A`
    Left,
    /// `D`
    Right,
    /// `Q`
    Quit,
    /// `$`
    Dollar,
    /// `0`..`9`, carrying the digit value
    Digit(u8),
    /// Anything else
    Char(u8),
}

impl Key {
    /// Classify a key byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\r' | b'\n' => Key::Confirm,
            KEY_BACKSPACE | KEY_DELETE => Key::Backspace,
            KEY_NEXT => Key::Next,
            KEY_PREV => Key::Prev,
            b'w' | b'W' => Key::Up,
            b's' | b'S' => Key::Down,
            b'a' | b'A' => Key::Left,
            b'd' | b'D' => Key::Right,
            b'q' | b'Q' => Key::Quit,
            b'$' => Key::Dollar,
            b'0'..=b'9' => Key::Digit(byte - b'0'),
            other => Key::Char(other),
        }
    }

    /// `W` or the prev button
    pub fn is_up(self) -> bool {
        matches!(self, Key::Up | Key::Prev)
    }

    /// `S` or the next button
    pub fn is_down(self) -> bool {
        matches!(self, Key::Down | Key::Next)
    }
}

/// Whether a byte is printable ASCII (space through tilde)
pub fn is_printable(byte: u8) -> bool {
    (32..=126).contains(&byte)
}
