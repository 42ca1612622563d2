//! Events that drive the repeater admin session

/// Events that can trigger admin state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdminEvent {
    // Outbound requests
    /// Login request queued
    LoginSent,
    /// CLI command queued
    CommandSent,
    /// Mesh refused to queue a request
    SendFailed,

    // Mesh replies
    /// Repeater accepted the password
    LoginAccepted,
    /// Repeater rejected the password
    LoginRejected,
    /// CLI response arrived
    ResponseReceived,
    /// No reply within the timeout
    TimedOut,

    // User input
    /// User abandoned a pending request
    Cancel,
    /// User left a response or error (`Q`)
    Back {
        /// Whether the session holds any permissions
        logged_in: bool,
    },
    /// User dismissed a response or error (Enter)
    Acknowledge,
}
