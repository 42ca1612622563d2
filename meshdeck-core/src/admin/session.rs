//! Repeater session data

use heapless::String;

use super::machine::AdminState;

/// Longest repeater password
pub const PASSWORD_MAX_LEN: usize = 31;

/// Longest CLI response kept
pub const RESPONSE_MAX_LEN: usize = 511;

/// Longest contact name kept
pub const CONTACT_NAME_LEN: usize = 32;

/// Commands offered once logged in
///
/// The order is fixed: digit shortcuts `1`..`6` select by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    ClockSync,
    SendAdvert,
    Neighbors,
    GetClock,
    Version,
    GetStatus,
}

impl MenuItem {
    /// All items in menu order
    pub const ALL: [MenuItem; 6] = [
        MenuItem::ClockSync,
        MenuItem::SendAdvert,
        MenuItem::Neighbors,
        MenuItem::GetClock,
        MenuItem::Version,
        MenuItem::GetStatus,
    ];

    /// Number of items
    pub const COUNT: usize = Self::ALL.len();

    /// Item at a menu position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Menu text
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::ClockSync => "Clock Sync",
            MenuItem::SendAdvert => "Send Advert",
            MenuItem::Neighbors => "Neighbors",
            MenuItem::GetClock => "Get Clock",
            MenuItem::Version => "Version",
            MenuItem::GetStatus => "Get Status",
        }
    }

    /// Repeater CLI command
    pub fn command(self) -> &'static str {
        match self {
            MenuItem::ClockSync => "clock sync",
            MenuItem::SendAdvert => "advert",
            MenuItem::Neighbors => "neighbors",
            MenuItem::GetClock => "clock",
            MenuItem::Version => "ver",
            MenuItem::GetStatus => "get status",
        }
    }
}

/// Access granted by the repeater
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionLevel {
    ReadOnly,
    ReadWrite,
    Admin,
}

impl PermissionLevel {
    /// Level from the permission bits of a login reply
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            3 => PermissionLevel::Admin,
            2 => PermissionLevel::ReadWrite,
            _ => PermissionLevel::ReadOnly,
        }
    }

    /// Header tag
    pub fn tag(self) -> &'static str {
        match self {
            PermissionLevel::Admin => "ADM",
            PermissionLevel::ReadWrite => "R/W",
            PermissionLevel::ReadOnly => "R/O",
        }
    }
}

/// State of one admin session with a repeater
#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    /// Current state
    pub state: AdminState,
    /// Contact index of the repeater
    pub contact_idx: u16,
    /// Repeater display name
    pub name: String<CONTACT_NAME_LEN>,
    /// Permission bits from the login reply, 0 before login
    pub permissions: u8,
    /// Repeater clock at login, epoch seconds
    pub server_time: u32,
    /// Password typed so far
    pub password: String<PASSWORD_MAX_LEN>,
    /// Selected menu position
    pub menu_sel: usize,
    /// Last response or error text
    pub response: String<RESPONSE_MAX_LEN>,
    /// First response line shown
    pub response_scroll: usize,
    /// When the last request was sent, monotonic ms
    pub cmd_sent_at: u64,
    /// Whether a login reply is outstanding
    pub waiting_for_login: bool,
}

impl AdminSession {
    /// Fresh session for a repeater
    pub fn for_contact(contact_idx: u16, name: &str) -> Self {
        let mut session = Self {
            contact_idx,
            ..Self::default()
        };
        push_truncated(&mut session.name, name);
        session
    }

    /// Replace the response text, truncating at a character boundary
    pub fn set_response(&mut self, text: &str) {
        self.response.clear();
        push_truncated(&mut self.response, text);
        self.response_scroll = 0;
    }

    /// Permission level granted at login
    pub fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::from_bits(self.permissions)
    }

    /// Selected menu item
    pub fn selected_item(&self) -> MenuItem {
        MenuItem::from_index(self.menu_sel).unwrap_or(MenuItem::ClockSync)
    }
}

/// Append as much of `text` as fits, whole characters only
pub(crate) fn push_truncated<const N: usize>(out: &mut String<N>, text: &str) {
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
}
