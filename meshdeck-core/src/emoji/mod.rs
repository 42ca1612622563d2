//! Emoji support
//!
//! Incoming UTF-8 text is rewritten so that every catalog emoji becomes a
//! single escape byte; the renderer and the picker draw the sprites.

pub mod catalog;
pub mod sanitize;

pub use catalog::{
    escape_for, from_escape, is_escape, Emoji, EMOJI, EMOJI_COUNT, EMOJI_LARGE_H, EMOJI_LARGE_W,
    EMOJI_SMALL_H, EMOJI_SMALL_W,
};
pub use sanitize::sanitize_into;
