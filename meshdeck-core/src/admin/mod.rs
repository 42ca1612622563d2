//! Repeater administration
//!
//! A small session state machine plus the screen that drives it. The
//! state machine is explicit, finite and deterministic; all network waits
//! are states, never blocking calls.

pub mod events;
pub mod machine;
mod screen;
pub mod session;

pub use events::AdminEvent;
pub use machine::AdminState;
pub use screen::RepeaterAdminScreen;
pub use session::{AdminSession, MenuItem, PermissionLevel};
