//! Meshdeck byte-level formats
//!
//! This crate defines the bytes that cross the boundaries of the node
//! screens: key codes coming from the keyboard driver, the in-text encoding
//! of emoji, and the channel history file kept on the SD card.
//!
//! # History File
//!
//! A fixed-size file: one header followed by `capacity` record slots,
//! all integers little-endian, no padding.
//! ```text
//! ┌───────┬─────────┬──────────┬───────┬────────────┐
//! │ MAGIC │ VERSION │ CAPACITY │ COUNT │ NEWEST_IDX │
//! │ 4B    │ 2B      │ 2B       │ 2B    │ 2B (i16)   │
//! └───────┴─────────┴──────────┴───────┴────────────┘
//! ┌───────────┬──────────┬─────────────┬───────┬──────────┬───────────┐
//! │ TIMESTAMP │ PATH_LEN │ CHANNEL_IDX │ VALID │ RESERVED │ TEXT      │
//! │ 4B        │ 1B       │ 1B          │ 1B    │ 1B       │ 160B      │
//! └───────────┴──────────┴─────────────┴───────┴──────────┴───────────┘
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod history;
pub mod keys;
pub mod text;

pub use history::{
    FormatError, HistoryHeader, MessageRecord, HEADER_SIZE, HISTORY_MAGIC, HISTORY_VERSION,
    PATH_LEN_UNKNOWN, RECORD_SIZE,
};
pub use keys::{is_printable, Key, KEY_BACKSPACE, KEY_DELETE, KEY_ENTER, KEY_NEXT, KEY_PREV};
pub use text::{until_nul, EMOJI_ESCAPE_START, EMOJI_PAD_BYTE, TEXT_CAP, TEXT_MAX_LEN};
