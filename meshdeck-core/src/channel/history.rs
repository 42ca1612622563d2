//! Circular channel message history

use heapless::Vec;
use meshdeck_protocol::{HistoryHeader, MessageRecord, PATH_LEN_UNKNOWN, TEXT_MAX_LEN};

use crate::config::{HIST_CAP, MAX_GROUP_CHANNELS};
use crate::emoji::sanitize_into;

/// Page size used before the first render
pub const DEFAULT_MSGS_PER_PAGE: u16 = 6;

/// One history slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Epoch seconds at arrival
    pub timestamp: u32,
    /// Hop count, 0xFF when unknown
    pub path_len: u8,
    /// Channel the message belongs to
    pub channel_idx: u8,
    /// Sanitized text (ASCII plus emoji escapes)
    pub text: Vec<u8, TEXT_MAX_LEN>,
    /// Whether the slot holds a message
    pub valid: bool,
}

impl Default for ChannelMessage {
    fn default() -> Self {
        Self::empty()
    }
}

impl ChannelMessage {
    /// Unused slot
    pub const fn empty() -> Self {
        Self {
            timestamp: 0,
            path_len: 0,
            channel_idx: 0,
            text: Vec::new(),
            valid: false,
        }
    }

    /// Hop count for display; unknown routes show as 0
    pub fn hops(&self) -> u8 {
        if self.path_len == PATH_LEN_UNKNOWN {
            0
        } else {
            self.path_len
        }
    }

    /// File record for this slot
    pub fn to_record(&self) -> MessageRecord {
        let mut record = MessageRecord {
            timestamp: self.timestamp,
            path_len: self.path_len,
            channel_idx: self.channel_idx,
            valid: self.valid,
            ..MessageRecord::empty()
        };
        record.set_text(&self.text);
        record
    }

    /// Slot from a file record
    pub fn from_record(record: &MessageRecord) -> Self {
        let mut text = Vec::new();
        // record text is at most TEXT_MAX_LEN bytes
        let _ = text.extend_from_slice(record.text());
        Self {
            timestamp: record.timestamp,
            path_len: record.path_len,
            channel_idx: record.channel_idx,
            text,
            valid: record.valid,
        }
    }
}

/// Fixed-capacity circular buffer of channel messages
///
/// The `count` newest messages live at `(newest_idx - k) mod HIST_CAP` for
/// `k` in `0..count`. When the buffer wraps the oldest slot is overwritten.
#[derive(Debug, Clone)]
pub struct ChannelHistory {
    pub(super) messages: [ChannelMessage; HIST_CAP],
    pub(super) newest_idx: i16,
    pub(super) count: u16,
    pub(super) view_channel: u8,
    pub(super) scroll_pos: u16,
    pub(super) msgs_per_page: u16,
}

impl Default for ChannelHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHistory {
    /// Empty history viewing channel 0
    pub fn new() -> Self {
        Self {
            messages: core::array::from_fn(|_| ChannelMessage::empty()),
            newest_idx: -1,
            count: 0,
            view_channel: 0,
            scroll_pos: 0,
            msgs_per_page: DEFAULT_MSGS_PER_PAGE,
        }
    }

    /// Store a new message in the next slot
    ///
    /// The text is sanitized (emoji to escapes, truncated to 159 bytes).
    /// Scrolling is reset so the new message is visible. Returns the slot.
    pub fn push(&mut self, timestamp: u32, channel_idx: u8, path_len: u8, text: &str) -> usize {
        let slot = self.next_slot();
        let message = &mut self.messages[slot];
        message.timestamp = timestamp;
        message.path_len = path_len;
        message.channel_idx = channel_idx;
        sanitize_into(text, &mut message.text);
        message.valid = true;

        self.newest_idx = slot as i16;
        self.count = (self.count + 1).min(HIST_CAP as u16);
        self.scroll_pos = 0;
        slot
    }

    fn next_slot(&self) -> usize {
        if self.newest_idx < 0 {
            0
        } else {
            (self.newest_idx as usize + 1) % HIST_CAP
        }
    }

    /// All slots in storage order
    pub fn messages(&self) -> &[ChannelMessage; HIST_CAP] {
        &self.messages
    }

    /// Slot of the newest message
    pub fn newest_idx(&self) -> Option<usize> {
        usize::try_from(self.newest_idx).ok()
    }

    /// Number of messages held
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Channel being displayed
    pub fn view_channel(&self) -> u8 {
        self.view_channel
    }

    /// Pages of older messages revealed above the newest
    pub fn scroll_pos(&self) -> u16 {
        self.scroll_pos
    }

    /// Messages drawn on the last page
    pub fn msgs_per_page(&self) -> u16 {
        self.msgs_per_page
    }

    pub(super) fn set_msgs_per_page(&mut self, n: usize) {
        self.msgs_per_page = n.clamp(1, HIST_CAP) as u16;
    }

    /// Valid messages on `channel_idx`
    pub fn count_for_channel(&self, channel_idx: u8) -> usize {
        self.messages
            .iter()
            .filter(|m| m.valid && m.channel_idx == channel_idx)
            .count()
    }

    /// Valid messages on the displayed channel
    pub fn count_for_current_channel(&self) -> usize {
        self.count_for_channel(self.view_channel)
    }

    /// Display another channel
    ///
    /// The caller checks that `idx` names an existing channel.
    pub fn set_view_channel(&mut self, idx: u8) {
        self.view_channel = idx;
        self.scroll_pos = 0;
    }

    /// Reveal one more older message; returns whether anything changed
    pub fn scroll_older(&mut self) -> bool {
        let total = self.count_for_current_channel();
        if usize::from(self.scroll_pos) + usize::from(self.msgs_per_page) < total {
            self.scroll_pos += 1;
            true
        } else {
            false
        }
    }

    /// Move back toward the newest message; returns whether anything changed
    pub fn scroll_newer(&mut self) -> bool {
        if self.scroll_pos > 0 {
            self.scroll_pos -= 1;
            true
        } else {
            false
        }
    }

    /// Slots of the displayed channel, oldest first
    pub fn filtered_oldest_first(&self) -> Vec<usize, HIST_CAP> {
        let mut slots = Vec::new();
        let Some(newest) = self.newest_idx() else {
            return slots;
        };

        for k in 0..self.count() {
            let slot = (newest + HIST_CAP - k) % HIST_CAP;
            let message = &self.messages[slot];
            if message.valid && message.channel_idx == self.view_channel {
                let _ = slots.push(slot);
            }
        }
        slots.reverse();
        slots
    }

    /// File header describing this history
    pub fn header(&self) -> HistoryHeader {
        HistoryHeader {
            capacity: HIST_CAP as u16,
            count: self.count,
            newest_idx: self.newest_idx,
        }
    }

    /// Settle `count` and `newest_idx` read from a file
    ///
    /// Both are clamped to their ranges; an out-of-range count falls back to
    /// the number of valid slots. When the result does not describe exactly
    /// the valid slots, they are moved oldest first to the front of the
    /// buffer so every one stays reachable. Returns whether slots moved.
    pub(super) fn restore_metadata(&mut self, count: u16, newest_idx: i16) -> bool {
        self.newest_idx = newest_idx.clamp(-1, HIST_CAP as i16 - 1);
        self.scroll_pos = 0;

        let valid_slots = self.messages.iter().filter(|m| m.valid).count();
        let count = if usize::from(count) > HIST_CAP {
            valid_slots
        } else {
            usize::from(count)
        };

        let consistent = count == valid_slots
            && match self.newest_idx() {
                Some(newest) => {
                    (0..count).all(|k| self.messages[(newest + HIST_CAP - k) % HIST_CAP].valid)
                }
                None => count == 0,
            };
        if consistent {
            self.count = count as u16;
            return false;
        }

        self.compact();
        true
    }

    /// Move the valid slots to the front, oldest first
    ///
    /// Age order is storage order starting just after `newest_idx`.
    fn compact(&mut self) {
        let start = self.newest_idx().map_or(0, |newest| newest + 1);
        let mut old = core::array::from_fn::<_, HIST_CAP, _>(|_| ChannelMessage::empty());
        core::mem::swap(&mut old, &mut self.messages);

        let mut next = 0;
        for k in 0..HIST_CAP {
            let message = &mut old[(start + k) % HIST_CAP];
            if message.valid {
                self.messages[next] = core::mem::take(message);
                next += 1;
            }
        }

        self.count = next as u16;
        self.newest_idx = next as i16 - 1;
    }

    /// Invalidate slots that name a channel the node cannot have
    pub(super) fn drop_foreign_channels(&mut self) -> usize {
        let mut dropped = 0;
        for message in self.messages.iter_mut() {
            if message.valid && message.channel_idx >= MAX_GROUP_CHANNELS {
                message.valid = false;
                dropped += 1;
            }
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(texts: &[(u8, &str)]) -> ChannelHistory {
        let mut history = ChannelHistory::new();
        for (i, (channel, text)) in texts.iter().enumerate() {
            history.push(1000 + i as u32, *channel, 0, text);
        }
        history
    }

    #[test]
    fn test_empty() {
        let history = ChannelHistory::new();
        assert_eq!(history.newest_idx(), None);
        assert_eq!(history.count(), 0);
        assert_eq!(history.msgs_per_page(), 6);
        assert!(history.filtered_oldest_first().is_empty());
    }

    #[test]
    fn test_push_advances() {
        let mut history = ChannelHistory::new();
        assert_eq!(history.push(5, 0, 2, "one"), 0);
        assert_eq!(history.push(6, 0, 2, "two"), 1);
        assert_eq!(history.newest_idx(), Some(1));
        assert_eq!(history.count(), 2);
        assert_eq!(history.messages()[1].text.as_slice(), b"two");
        assert_eq!(history.messages()[1].timestamp, 6);
    }

    #[test]
    fn test_push_resets_scroll() {
        let mut history = history_with(&[(0, "a"); 10]);
        history.set_msgs_per_page(2);
        assert!(history.scroll_older());
        assert_eq!(history.scroll_pos(), 1);
        history.push(0, 0, 0, "b");
        assert_eq!(history.scroll_pos(), 0);
    }

    #[test]
    fn test_scroll_bounds() {
        let mut history = history_with(&[(0, "a"), (0, "b"), (0, "c")]);
        history.set_msgs_per_page(2);
        assert!(!history.scroll_newer());
        assert!(history.scroll_older());
        assert!(!history.scroll_older());
        assert!(history.scroll_newer());
        assert_eq!(history.scroll_pos(), 0);
    }

    #[test]
    fn test_filter_order() {
        let history = history_with(&[(0, "a"), (1, "b"), (0, "c")]);
        assert_eq!(history.filtered_oldest_first().as_slice(), &[0, 2]);
    }

    #[test]
    fn test_hops() {
        let mut message = ChannelMessage::empty();
        message.path_len = PATH_LEN_UNKNOWN;
        assert_eq!(message.hops(), 0);
        message.path_len = 3;
        assert_eq!(message.hops(), 3);
    }

    #[test]
    fn test_record_conversion() {
        let history = history_with(&[(2, "Bob: yo")]);
        let message = &history.messages()[0];
        let back = ChannelMessage::from_record(&message.to_record());
        assert_eq!(&back, message);
    }

    #[test]
    fn test_restore_keeps_consistent_layout() {
        let mut history = history_with(&[(0, "a"); 23]);
        let before = history.messages().clone();
        assert!(!history.restore_metadata(20, 2));
        assert_eq!(history.messages(), &before);
        assert_eq!(history.count(), 20);
        assert_eq!(history.newest_idx(), Some(2));
    }

    #[test]
    fn test_restore_clamps_newest() {
        let mut history = history_with(&[(0, "a"), (0, "b")]);
        assert!(history.restore_metadata(2, 99));
        assert_eq!(history.count(), 2);
        assert_eq!(history.newest_idx(), Some(1));
        assert_eq!(history.filtered_oldest_first().as_slice(), &[0, 1]);
    }

    #[test]
    fn test_restore_count_fallback() {
        let mut history = history_with(&[(0, "a"), (0, "b"), (0, "c")]);
        assert!(!history.restore_metadata(500, 2));
        assert_eq!(history.count(), 3);
    }

    #[test]
    fn test_restore_lost_newest_slot() {
        let mut history = history_with(&[(0, "a"), (0, "b"), (0, "c")]);
        history.messages[2] = ChannelMessage::empty();
        assert!(history.restore_metadata(3, 2));
        assert_eq!(history.count(), 2);
        assert_eq!(history.newest_idx(), Some(1));
        assert_eq!(history.filtered_oldest_first().as_slice(), &[0, 1]);

        assert_eq!(history.push(0, 0, 0, "d"), 2);
        assert_eq!(history.count(), 3);
        assert_eq!(history.messages().iter().filter(|m| m.valid).count(), 3);
    }

    #[test]
    fn test_restore_closes_gaps_in_age_order() {
        // wrapped buffer: slots 3..20 then 0..3, newest in slot 2
        let mut history = history_with(&[(0, "x"); 23]);
        for slot in 0..HIST_CAP {
            history.messages[slot].timestamp = ((slot + HIST_CAP - 3) % HIST_CAP) as u32;
        }
        for slot in [0, 5, 6] {
            history.messages[slot] = ChannelMessage::empty();
        }

        assert!(history.restore_metadata(20, 2));
        assert_eq!(history.count(), 17);
        assert_eq!(history.newest_idx(), Some(16));
        let stamps: std::vec::Vec<u32> = history.messages()[..17]
            .iter()
            .map(|m| m.timestamp)
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stamps.last(), Some(&19));
        assert!(history.messages()[17..].iter().all(|m| !m.valid));
    }

    #[test]
    fn test_drop_foreign_channels() {
        let mut history = history_with(&[(0, "a"), (9, "b")]);
        assert_eq!(history.drop_foreign_channels(), 1);
        assert!(!history.messages()[1].valid);
        assert!(history.restore_metadata(2, 1));
        assert_eq!(history.count(), 1);
        assert_eq!(history.newest_idx(), Some(0));
        assert_eq!(history.count_for_channel(9), 0);
    }
}
