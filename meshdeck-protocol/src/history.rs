//! Channel history file encoding and decoding.
//!
//! Header format (12 bytes):
//! - MAGIC (4 bytes): 0x4D434853, "MCHS" when read as a big-endian string
//! - VERSION (2 bytes): format version, currently 1
//! - CAPACITY (2 bytes): number of record slots that follow
//! - COUNT (2 bytes): number of messages held
//! - NEWEST_IDX (2 bytes, signed): slot of the newest message, -1 when empty
//!
//! Record format (168 bytes):
//! - TIMESTAMP (4 bytes): epoch seconds at arrival
//! - PATH_LEN (1 byte): hop count, 0xFF when unknown
//! - CHANNEL_IDX (1 byte): channel the message belongs to
//! - VALID (1 byte): nonzero when the slot holds a message
//! - RESERVED (1 byte): written as zero
//! - TEXT (160 bytes): NUL padded; byte 159 is never part of the text

use crate::text::{until_nul, TEXT_CAP, TEXT_MAX_LEN};

/// File magic
pub const HISTORY_MAGIC: u32 = 0x4D43_4853;

/// Supported file version
pub const HISTORY_VERSION: u16 = 1;

/// Encoded header size in bytes
pub const HEADER_SIZE: usize = 12;

/// Encoded record size in bytes
pub const RECORD_SIZE: usize = 8 + TEXT_CAP;

/// `path_len` value for an unknown route
pub const PATH_LEN_UNKNOWN: u8 = 0xFF;

/// Errors that can occur while decoding a history file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Magic does not match
    BadMagic,
    /// Version is not supported
    UnsupportedVersion(u16),
    /// Capacity differs from the reader's
    CapacityMismatch(u16),
    /// Input ended early
    Truncated,
}

/// History file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HistoryHeader {
    /// Record slots in the file
    pub capacity: u16,
    /// Messages held
    pub count: u16,
    /// Slot of the newest message, -1 when empty
    pub newest_idx: i16,
}

impl HistoryHeader {
    /// Encode the header
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buffer = [0u8; HEADER_SIZE];
        buffer[0..4].copy_from_slice(&HISTORY_MAGIC.to_le_bytes());
        buffer[4..6].copy_from_slice(&HISTORY_VERSION.to_le_bytes());
        buffer[6..8].copy_from_slice(&self.capacity.to_le_bytes());
        buffer[8..10].copy_from_slice(&self.count.to_le_bytes());
        buffer[10..12].copy_from_slice(&self.newest_idx.to_le_bytes());
        buffer
    }

    /// Decode a header, checking magic and version
    ///
    /// `count` and `newest_idx` are returned as stored; callers clamp them.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::Truncated);
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != HISTORY_MAGIC {
            return Err(FormatError::BadMagic);
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != HISTORY_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        Ok(Self {
            capacity: u16::from_le_bytes([bytes[6], bytes[7]]),
            count: u16::from_le_bytes([bytes[8], bytes[9]]),
            newest_idx: i16::from_le_bytes([bytes[10], bytes[11]]),
        })
    }

    /// Require the file to have exactly `capacity` slots
    pub fn check_capacity(&self, capacity: u16) -> Result<(), FormatError> {
        if self.capacity != capacity {
            return Err(FormatError::CapacityMismatch(self.capacity));
        }
        Ok(())
    }

    /// Total file size for this header
    pub fn file_size(&self) -> usize {
        HEADER_SIZE + RECORD_SIZE * self.capacity as usize
    }
}

/// One record slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Epoch seconds at arrival
    pub timestamp: u32,
    /// Hop count, [`PATH_LEN_UNKNOWN`] when unknown
    pub path_len: u8,
    /// Channel index
    pub channel_idx: u8,
    /// Whether the slot holds a message
    pub valid: bool,
    /// Raw text field
    pub text: [u8; TEXT_CAP],
}

impl Default for MessageRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl MessageRecord {
    /// An unused slot
    pub const fn empty() -> Self {
        Self {
            timestamp: 0,
            path_len: 0,
            channel_idx: 0,
            valid: false,
            text: [0; TEXT_CAP],
        }
    }

    /// Text bytes, ending at the first NUL or at byte 159
    pub fn text(&self) -> &[u8] {
        until_nul(&self.text[..TEXT_MAX_LEN])
    }

    /// Replace the text, truncating to 159 bytes and NUL padding
    pub fn set_text(&mut self, text: &[u8]) {
        let len = text.len().min(TEXT_MAX_LEN);
        self.text = [0; TEXT_CAP];
        self.text[..len].copy_from_slice(&text[..len]);
    }

    /// Encode the record
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buffer = [0u8; RECORD_SIZE];
        buffer[0..4].copy_from_slice(&self.timestamp.to_le_bytes());
        buffer[4] = self.path_len;
        buffer[5] = self.channel_idx;
        buffer[6] = u8::from(self.valid);
        buffer[7] = 0; // reserved
        buffer[8..].copy_from_slice(&self.text);
        buffer
    }

    /// Decode a record
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut text = [0u8; TEXT_CAP];
        text.copy_from_slice(&bytes[8..]);
        Self {
            timestamp: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            path_len: bytes[4],
            channel_idx: bytes[5],
            valid: bytes[6] != 0,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = HistoryHeader {
            capacity: 20,
            count: 3,
            newest_idx: -1,
        };
        let bytes = header.encode();
        assert_eq!(&bytes[0..4], &[0x53, 0x48, 0x43, 0x4D]);
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(&bytes[6..8], &[20, 0]);
        assert_eq!(&bytes[8..10], &[3, 0]);
        assert_eq!(&bytes[10..12], &[0xFF, 0xFF]);
        assert_eq!(HistoryHeader::decode(&bytes), Ok(header));
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut bytes = HistoryHeader {
            capacity: 20,
            count: 0,
            newest_idx: -1,
        }
        .encode();
        bytes[0..4].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(HistoryHeader::decode(&bytes), Err(FormatError::BadMagic));
    }

    #[test]
    fn test_header_rejects_version() {
        let mut bytes = HistoryHeader {
            capacity: 20,
            count: 0,
            newest_idx: -1,
        }
        .encode();
        bytes[4] = 2;
        assert_eq!(
            HistoryHeader::decode(&bytes),
            Err(FormatError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn test_header_truncated() {
        assert_eq!(
            HistoryHeader::decode(&[0x53, 0x48, 0x43]),
            Err(FormatError::Truncated)
        );
    }

    #[test]
    fn test_capacity_check() {
        let header = HistoryHeader {
            capacity: 16,
            count: 0,
            newest_idx: -1,
        };
        assert_eq!(
            header.check_capacity(20),
            Err(FormatError::CapacityMismatch(16))
        );
        assert_eq!(header.file_size(), 12 + 16 * 168);
    }

    #[test]
    fn test_record_layout() {
        let mut record = MessageRecord {
            timestamp: 0x0102_0304,
            path_len: PATH_LEN_UNKNOWN,
            channel_idx: 2,
            valid: true,
            ..MessageRecord::empty()
        };
        record.set_text(b"Bob: hi");
        let bytes = record.encode();

        assert_eq!(bytes.len(), 168);
        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(bytes[4], 0xFF);
        assert_eq!(bytes[5], 2);
        assert_eq!(bytes[6], 1);
        assert_eq!(bytes[7], 0);
        assert_eq!(&bytes[8..15], b"Bob: hi");
        assert_eq!(bytes[15], 0);
        assert_eq!(MessageRecord::decode(&bytes), record);
    }

    #[test]
    fn test_missing_terminator_ends_at_159() {
        let mut bytes = [b'x'; RECORD_SIZE];
        bytes[6] = 1;
        let record = MessageRecord::decode(&bytes);
        assert!(record.valid);
        assert_eq!(record.text().len(), 159);
    }

    #[test]
    fn test_set_text_truncates() {
        let mut record = MessageRecord::empty();
        record.set_text(&[b'y'; 200]);
        assert_eq!(record.text().len(), 159);
        assert_eq!(record.text[159], 0);
    }

    #[test]
    fn test_any_nonzero_valid_byte() {
        let mut bytes = MessageRecord::empty().encode();
        bytes[6] = 7;
        assert!(MessageRecord::decode(&bytes).valid);
    }
}
