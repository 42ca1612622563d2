//! Mesh facade interface
//!
//! The mesh stack (radio, routing, contact book) lives outside this crate.
//! Screens see it through [`MeshFacade`] for outbound requests, and receive
//! inbound results as [`MeshEvent`]s or through [`RepeaterListener`].

use heapless::String;

/// Maximum channel name length
pub const CHANNEL_NAME_LEN: usize = 32;

/// Channel directory entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelDetails {
    /// Human-readable name; empty means the channel slot is unused
    pub name: String<CHANNEL_NAME_LEN>,
}

impl ChannelDetails {
    /// Entry with the given name, truncated to fit
    pub fn named(name: &str) -> Self {
        let mut details = Self::default();
        for c in name.chars() {
            if details.name.push(c).is_err() {
                break;
            }
        }
        details
    }
}

/// Outbound operations of the mesh stack
///
/// Sends are queued for transmission; `false` means the request could not
/// be queued at all (no route, queue full).
pub trait MeshFacade {
    /// Look up a group channel
    fn channel(&self, idx: u8) -> Option<ChannelDetails>;

    /// Queue a login request to a repeater
    fn login_to_repeater(&self, contact_idx: u16, password: &str) -> bool;

    /// Queue a CLI command to a logged-in repeater
    fn send_cli_command(&self, contact_idx: u16, command: &str) -> bool;
}

impl<T: MeshFacade + ?Sized> MeshFacade for &T {
    fn channel(&self, idx: u8) -> Option<ChannelDetails> {
        (**self).channel(idx)
    }

    fn login_to_repeater(&self, contact_idx: u16, password: &str) -> bool {
        (**self).login_to_repeater(contact_idx, password)
    }

    fn send_cli_command(&self, contact_idx: u16, command: &str) -> bool {
        (**self).send_cli_command(contact_idx, command)
    }
}

/// Whether `idx` names a channel with a non-empty name
pub fn channel_exists<M: MeshFacade + ?Sized>(mesh: &M, idx: u8) -> bool {
    mesh.channel(idx)
        .map(|details| !details.name.is_empty())
        .unwrap_or(false)
}

/// Observer for repeater replies
///
/// The facade calls into whichever admin screen is subscribed.
pub trait RepeaterListener {
    /// Login attempt finished
    fn on_login_result(&mut self, success: bool, permissions: u8, server_time: u32);

    /// CLI response arrived; returns whether it was accepted
    fn on_cli_response(&mut self, text: &str) -> bool;
}

/// Inbound mesh traffic addressed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeshEvent<'a> {
    /// Reply to a login request
    LoginResult {
        success: bool,
        permissions: u8,
        server_time: u32,
    },
    /// Reply to a CLI command
    CliResponse(&'a str),
    /// Group channel message, sender already inlined as "Sender: text"
    ChannelMessage {
        channel_idx: u8,
        path_len: u8,
        text: &'a str,
    },
}

impl MeshEvent<'_> {
    /// Hand a repeater reply to a listener
    ///
    /// Returns whether the listener took it. Channel messages are never
    /// delivered to a listener.
    pub fn dispatch<L: RepeaterListener + ?Sized>(&self, listener: &mut L) -> bool {
        match *self {
            MeshEvent::LoginResult {
                success,
                permissions,
                server_time,
            } => {
                listener.on_login_result(success, permissions, server_time);
                true
            }
            MeshEvent::CliResponse(text) => listener.on_cli_response(text),
            MeshEvent::ChannelMessage { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Directory;

    impl MeshFacade for Directory {
        fn channel(&self, idx: u8) -> Option<ChannelDetails> {
            match idx {
                0 => Some(ChannelDetails::named("Public")),
                1 => Some(ChannelDetails::default()),
                _ => None,
            }
        }

        fn login_to_repeater(&self, _contact_idx: u16, _password: &str) -> bool {
            false
        }

        fn send_cli_command(&self, _contact_idx: u16, _command: &str) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Listener {
        logins: u8,
        last_text: Option<std::string::String>,
    }

    impl RepeaterListener for Listener {
        fn on_login_result(&mut self, _success: bool, _permissions: u8, _server_time: u32) {
            self.logins += 1;
        }

        fn on_cli_response(&mut self, text: &str) -> bool {
            self.last_text = Some(text.into());
            true
        }
    }

    #[test]
    fn test_channel_exists_requires_name() {
        assert!(channel_exists(&Directory, 0));
        assert!(!channel_exists(&Directory, 1));
        assert!(!channel_exists(&Directory, 2));
        assert!(channel_exists(&&Directory, 0));
    }

    #[test]
    fn test_named_truncates() {
        let long = "x".repeat(40);
        assert_eq!(ChannelDetails::named(&long).name.len(), CHANNEL_NAME_LEN);
    }

    #[test]
    fn test_dispatch() {
        let mut listener = Listener::default();
        let login = MeshEvent::LoginResult {
            success: true,
            permissions: 3,
            server_time: 0,
        };
        assert!(login.dispatch(&mut listener));
        assert!(MeshEvent::CliResponse("ok").dispatch(&mut listener));
        assert!(!MeshEvent::ChannelMessage {
            channel_idx: 0,
            path_len: 0,
            text: "x",
        }
        .dispatch(&mut listener));
        assert_eq!(listener.logins, 1);
        assert_eq!(listener.last_text.as_deref(), Some("ok"));
    }
}
