//! Shared test doubles

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::string::String;
use std::vec::Vec;

use meshdeck_core::{ChannelDetails, MeshFacade};

/// Mesh facade that records requests and answers from a script
pub struct ScriptedMesh {
    channels: Vec<(u8, &'static str)>,
    accept_sends: Cell<bool>,
    logins: RefCell<Vec<(u16, String)>>,
    commands: RefCell<Vec<(u16, String)>>,
}

impl ScriptedMesh {
    /// Mesh with the given named channels
    pub fn with_channels(channels: &[(u8, &'static str)]) -> Self {
        Self {
            channels: channels.to_vec(),
            accept_sends: Cell::new(true),
            logins: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// Mesh with only the public channel
    pub fn new() -> Self {
        Self::with_channels(&[(0, "Public")])
    }

    /// Make every send succeed or fail
    pub fn set_accept_sends(&self, accept: bool) {
        self.accept_sends.set(accept);
    }

    /// Login requests so far
    pub fn logins(&self) -> Vec<(u16, String)> {
        self.logins.borrow().clone()
    }

    /// CLI commands so far
    pub fn commands(&self) -> Vec<(u16, String)> {
        self.commands.borrow().clone()
    }
}

impl MeshFacade for ScriptedMesh {
    fn channel(&self, idx: u8) -> Option<ChannelDetails> {
        self.channels
            .iter()
            .find(|(i, _)| *i == idx)
            .map(|(_, name)| ChannelDetails::named(name))
    }

    fn login_to_repeater(&self, contact_idx: u16, password: &str) -> bool {
        self.logins
            .borrow_mut()
            .push((contact_idx, password.to_string()));
        self.accept_sends.get()
    }

    fn send_cli_command(&self, contact_idx: u16, command: &str) -> bool {
        self.commands
            .borrow_mut()
            .push((contact_idx, command.to_string()));
        self.accept_sends.get()
    }
}
