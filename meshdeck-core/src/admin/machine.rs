//! Admin session state machine
//!
//! What the admin screen shows and which keys it accepts is a function of
//! the current state.

use super::events::AdminEvent;

/// Admin session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdminState {
    /// Typing the repeater password
    #[default]
    PasswordEntry,
    /// Login sent, waiting for the repeater
    LoggingIn,
    /// Logged in, command list visible
    Menu,
    /// Command sent, waiting for the response
    CommandPending,
    /// Showing a command response
    ResponseView,
    /// Showing a failure message
    Error,
}

impl AdminState {
    /// Check if a reply from the repeater is awaited
    pub fn is_waiting(&self) -> bool {
        matches!(self, AdminState::LoggingIn | AdminState::CommandPending)
    }

    /// Check if the session is past the login
    pub fn is_logged_in(&self) -> bool {
        matches!(
            self,
            AdminState::Menu | AdminState::CommandPending | AdminState::ResponseView
        )
    }

    /// Process an event and return the next state
    pub fn transition(self, event: AdminEvent) -> Self {
        use AdminEvent::*;
        use AdminState::*;

        match (self, event) {
            // Login flow
            (PasswordEntry, LoginSent) => LoggingIn,
            (LoggingIn, Cancel) => PasswordEntry,

            // Login results are accepted late, in any state
            (_, LoginAccepted) => Menu,
            (_, LoginRejected) => Error,

            // Command flow
            (Menu, CommandSent) => CommandPending,
            (CommandPending, ResponseReceived) => ResponseView,
            (CommandPending, Cancel) => Menu,

            // Failures
            (PasswordEntry | Menu, SendFailed) => Error,
            (LoggingIn | CommandPending, TimedOut) => Error,

            // Leaving a result
            (ResponseView, Back { .. }) => Menu,
            (Error, Back { logged_in: true }) => Menu,
            (Error, Back { logged_in: false }) => PasswordEntry,
            (ResponseView | Error, Acknowledge) => Menu,

            // Default: stay in current state
            _ => self,
        }
    }
}
