//! Channel message screen

use meshdeck_display::Canvas;
use meshdeck_hal::{Clock, FileSystem};
use meshdeck_protocol::Key;

use super::history::ChannelHistory;
use super::render::render_page;
use super::store::HistoryStore;
use crate::config::{UiConfig, MAX_GROUP_CHANNELS};
use crate::mesh::{channel_exists, MeshEvent, MeshFacade};
use crate::runtime::Screen;

/// Screen showing the message history of one group channel
///
/// Owns the history and its store. Every new message is written through to
/// the store; a failing store is reported once until it recovers, and the
/// messages stay in memory.
pub struct ChannelScreen<M, C, F> {
    mesh: M,
    clock: C,
    store: HistoryStore<F>,
    history: ChannelHistory,
    idle_redraw_ms: u32,
    save_failing: bool,
}

impl<M: MeshFacade, C: Clock, F: FileSystem> ChannelScreen<M, C, F> {
    /// Create the screen with an empty history
    ///
    /// Call [`load_history`](Self::load_history) to restore saved messages.
    pub fn new(mesh: M, clock: C, fs: F, config: &UiConfig) -> Self {
        Self {
            mesh,
            clock,
            store: HistoryStore::new(fs, config.history_path.clone()),
            history: ChannelHistory::new(),
            idle_redraw_ms: config.idle_redraw_ms,
            save_failing: false,
        }
    }

    /// Restore the history from the store
    ///
    /// Returns true if saved messages were loaded. On any error the
    /// in-memory history is kept.
    pub fn load_history(&mut self) -> bool {
        match self.store.load(&mut self.history) {
            Ok(true) => {
                info!("loaded {=usize} channel messages", self.history.count());
                true
            }
            Ok(false) => {
                debug!("no channel history at {=str}", self.store.path());
                false
            }
            Err(e) => {
                warn!("channel history not loaded: {}", e);
                false
            }
        }
    }

    /// Record an incoming channel message and save the history
    ///
    /// Messages on a channel index the node cannot have are dropped;
    /// returns whether the message was stored.
    pub fn add(&mut self, channel_idx: u8, path_len: u8, text: &str) -> bool {
        if channel_idx >= MAX_GROUP_CHANNELS {
            warn!("message on channel {=u8} dropped", channel_idx);
            return false;
        }
        let now = self.clock.current_time();
        let slot = self.history.push(now, channel_idx, path_len, text);
        trace!("channel {=u8} message in slot {=usize}", channel_idx, slot);
        self.save();
        true
    }

    fn save(&mut self) {
        match self.store.save(&self.history) {
            Ok(()) => {
                if self.save_failing {
                    info!("channel history saved again");
                }
                self.save_failing = false;
            }
            Err(e) => {
                if !self.save_failing {
                    warn!("channel history not saved: {}", e);
                }
                self.save_failing = true;
            }
        }
    }

    /// Whether the last save failed
    pub fn save_failing(&self) -> bool {
        self.save_failing
    }

    /// Message history
    pub fn history(&self) -> &ChannelHistory {
        &self.history
    }

    /// History store
    pub fn store(&self) -> &HistoryStore<F> {
        &self.store
    }

    /// History store, mutably
    pub fn store_mut(&mut self) -> &mut HistoryStore<F> {
        &mut self.store
    }

    /// Display another channel
    pub fn set_view_channel(&mut self, idx: u8) {
        self.history.set_view_channel(idx);
    }

    /// Channel shown after `A`
    ///
    /// Steps back one index; from channel 0 it wraps to the highest named
    /// channel above 0, or stays when there is none.
    fn previous_channel(&self) -> u8 {
        let current = self.history.view_channel();
        if current > 0 {
            return current - 1;
        }
        (1..MAX_GROUP_CHANNELS)
            .rev()
            .find(|&idx| channel_exists(&self.mesh, idx))
            .unwrap_or(current)
    }

    /// Channel shown after `D`
    fn next_channel(&self) -> u8 {
        let next = self.history.view_channel() + 1;
        if next < MAX_GROUP_CHANNELS && channel_exists(&self.mesh, next) {
            next
        } else {
            0
        }
    }

    fn switch_to(&mut self, idx: u8) -> bool {
        let changed =
            idx != self.history.view_channel() || self.history.scroll_pos() != 0;
        if changed {
            debug!("viewing channel {=u8}", idx);
            self.history.set_view_channel(idx);
        }
        changed
    }
}

impl<M: MeshFacade, C: Clock, F: FileSystem> Screen for ChannelScreen<M, C, F> {
    fn render(&mut self, canvas: &mut dyn Canvas) -> u32 {
        let now = self.clock.current_time();
        render_page(canvas, &mut self.history, &self.mesh, now);
        self.idle_redraw_ms
    }

    fn handle_input(&mut self, key: u8) -> bool {
        let key = Key::from_byte(key);
        match key {
            _ if key.is_up() => self.history.scroll_older(),
            _ if key.is_down() => self.history.scroll_newer(),
            Key::Left => self.switch_to(self.previous_channel()),
            Key::Right => self.switch_to(self.next_channel()),
            _ => false,
        }
    }

    fn on_mesh_event(&mut self, event: &MeshEvent<'_>) -> bool {
        match *event {
            MeshEvent::ChannelMessage {
                channel_idx,
                path_len,
                text,
            } => self.add(channel_idx, path_len, text),
            _ => false,
        }
    }
}
