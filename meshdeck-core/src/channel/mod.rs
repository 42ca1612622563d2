//! Channel messages
//!
//! Circular per-node history of group channel messages, its file store,
//! the page renderer and the screen that ties them to the mesh.

mod history;
mod render;
mod screen;
mod store;

pub use history::{ChannelHistory, ChannelMessage, DEFAULT_MSGS_PER_PAGE};
pub use render::{render_page, MAX_LINES_PER_MSG};
pub use screen::ChannelScreen;
pub use store::{HistoryStore, StoreError};
