//! Board-agnostic screens for mesh-radio nodes
//!
//! This crate contains all UI logic that does not depend on specific
//! hardware implementations:
//!
//! - Channel message history, its file store and page renderer
//! - Emoji catalog, text sanitizer and picker
//! - Repeater administration state machine
//! - Screen runtime (input dispatch, redraw scheduling)
//! - Mesh facade interface and UI configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod admin;
pub mod channel;
pub mod config;
pub mod emoji;
pub mod mesh;
pub mod picker;
pub mod runtime;

pub use admin::{AdminState, RepeaterAdminScreen};
pub use channel::{ChannelHistory, ChannelMessage, ChannelScreen, HistoryStore, StoreError};
pub use config::{UiConfig, HIST_CAP, MAX_GROUP_CHANNELS};
pub use mesh::{ChannelDetails, MeshEvent, MeshFacade, RepeaterListener};
pub use picker::{EmojiPicker, PickerAction};
pub use runtime::{Screen, ScreenRuntime, TickOutcome};
