//! History file persistence
//!
//! The whole buffer is written on every save, invalid slots included, so
//! the circular layout survives a reboot unchanged.

use embedded_io::{Read, ReadExactError, Write};
use heapless::String;
use meshdeck_hal::storage::parent_dir;
use meshdeck_hal::{BusGuard, FileSystem, OpenMode, StorageError};
use meshdeck_protocol::{FormatError, HistoryHeader, MessageRecord, HEADER_SIZE, RECORD_SIZE};

use super::history::{ChannelHistory, ChannelMessage};
use crate::config::{HIST_CAP, MAX_PATH_LEN};

/// Errors from loading or saving the history file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// File system error
    Storage(StorageError),
    /// File contents are not a usable history
    Format(FormatError),
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        StoreError::Storage(e)
    }
}

impl From<FormatError> for StoreError {
    fn from(e: FormatError) -> Self {
        StoreError::Format(e)
    }
}

impl From<ReadExactError<StorageError>> for StoreError {
    fn from(e: ReadExactError<StorageError>) -> Self {
        match e {
            ReadExactError::UnexpectedEof => StoreError::Format(FormatError::Truncated),
            ReadExactError::Other(e) => StoreError::Storage(e),
        }
    }
}

/// Channel history file on a file system
pub struct HistoryStore<F> {
    fs: F,
    path: String<MAX_PATH_LEN>,
}

impl<F: FileSystem> HistoryStore<F> {
    /// Store at `path`
    pub fn new(fs: F, path: String<MAX_PATH_LEN>) -> Self {
        Self { fs, path }
    }

    /// File path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the file system
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Get the file system mutably
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Write the header and every slot
    ///
    /// Creates the parent directory if needed. The bus is released on every
    /// exit path. Memory is never touched.
    pub fn save(&mut self, history: &ChannelHistory) -> Result<(), StoreError> {
        let mut bus = BusGuard::new(&mut self.fs);

        if let Some(dir) = parent_dir(&self.path) {
            if !bus.exists(dir)? {
                debug!("creating history directory {=str}", dir);
                bus.create_dir_all(dir)?;
            }
        }

        let mut file = bus.open(&self.path, OpenMode::WriteTruncate)?;
        file.write_all(&history.header().encode())?;
        for message in history.messages() {
            file.write_all(&message.to_record().encode())?;
        }
        file.flush()?;

        trace!("history saved ({=usize} messages)", history.count());
        Ok(())
    }

    /// Replace `history` with the file contents
    ///
    /// Returns `Ok(false)` when there is no file. On a header or I/O error
    /// `history` is left unchanged. A file cut short keeps the slots read so
    /// far, and they stay reachable even when the newest slot was lost. The
    /// displayed channel and page size carry over.
    pub fn load(&mut self, history: &mut ChannelHistory) -> Result<bool, StoreError> {
        let mut bus = BusGuard::new(&mut self.fs);

        if !bus.exists(&self.path)? {
            return Ok(false);
        }

        let mut file = bus.open(&self.path, OpenMode::Read)?;

        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        let header = HistoryHeader::decode(&header_bytes)?;
        header.check_capacity(HIST_CAP as u16)?;

        let mut loaded = ChannelHistory::new();
        let mut record = [0u8; RECORD_SIZE];
        for slot in 0..HIST_CAP {
            match file.read_exact(&mut record) {
                Ok(()) => {}
                Err(ReadExactError::UnexpectedEof) => {
                    warn!("history file short: {=usize} of {=usize} records", slot, HIST_CAP);
                    break;
                }
                Err(ReadExactError::Other(e)) => return Err(e.into()),
            }
            loaded.messages[slot] = ChannelMessage::from_record(&MessageRecord::decode(&record));
        }

        let dropped = loaded.drop_foreign_channels();
        if dropped > 0 {
            warn!("dropped {=usize} messages on unknown channels", dropped);
        }
        if loaded.restore_metadata(header.count, header.newest_idx) {
            warn!("history slots repacked, {=usize} messages kept", loaded.count());
        }
        loaded.view_channel = history.view_channel;
        loaded.msgs_per_page = history.msgs_per_page;

        *history = loaded;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};
    use meshdeck_hal::{ChipSelect, MemFileSystem, SelectedFileSystem, SharedBus};
    use meshdeck_protocol::HISTORY_MAGIC;

    const PATH: &str = "/meshdeck/channels.bin";

    fn store() -> HistoryStore<MemFileSystem> {
        let mut path = String::new();
        path.push_str(PATH).unwrap();
        HistoryStore::new(MemFileSystem::new(), path)
    }

    fn sample() -> ChannelHistory {
        let mut history = ChannelHistory::new();
        history.push(100, 0, 1, "Ann: hello");
        history.push(200, 1, 0xFF, "Bob: \u{1F44D}");
        history.push(300, 0, 4, "Cy: bye");
        history
    }

    #[test]
    fn test_save_layout() {
        let mut store = store();
        store.save(&sample()).unwrap();

        let file = store.fs().file(PATH).unwrap();
        assert_eq!(file.len(), HEADER_SIZE + HIST_CAP * RECORD_SIZE);
        assert_eq!(&file[0..4], &HISTORY_MAGIC.to_le_bytes());
        assert_eq!(&file[8..10], &3u16.to_le_bytes());
        assert_eq!(&file[10..12], &2i16.to_le_bytes());
        assert!(store.fs().has_dir("/meshdeck"));
        assert!(!store.fs().bus_selected());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = store();
        let original = sample();
        store.save(&original).unwrap();

        let mut loaded = ChannelHistory::new();
        assert_eq!(store.load(&mut loaded), Ok(true));
        assert_eq!(loaded.messages(), original.messages());
        assert_eq!(loaded.count(), 3);
        assert_eq!(loaded.newest_idx(), Some(2));
        assert!(!store.fs().bus_selected());
    }

    #[test]
    fn test_missing_file() {
        let mut store = store();
        let mut history = sample();
        assert_eq!(store.load(&mut history), Ok(false));
        assert_eq!(history.count(), 3);
        assert_eq!(store.fs().bus_releases(), 1);
    }

    #[test]
    fn test_capacity_mismatch_keeps_memory() {
        let mut store = store();
        store.save(&sample()).unwrap();
        store.fs_mut().file_mut(PATH).unwrap()[6] = 16;

        let mut history = ChannelHistory::new();
        history.push(1, 0, 0, "keep");
        assert_eq!(
            store.load(&mut history),
            Err(StoreError::Format(FormatError::CapacityMismatch(16)))
        );
        assert_eq!(history.count(), 1);
        assert_eq!(history.messages()[0].text.as_slice(), b"keep");
    }

    #[test]
    fn test_truncated_header() {
        let mut store = store();
        store.fs_mut().insert_file(PATH, &[0x53, 0x48]);
        let mut history = ChannelHistory::new();
        assert_eq!(
            store.load(&mut history),
            Err(StoreError::Format(FormatError::Truncated))
        );
        assert!(!store.fs().bus_selected());
    }

    #[test]
    fn test_short_file_keeps_read_records() {
        let mut store = store();
        store.save(&sample()).unwrap();
        let cut = HEADER_SIZE + 2 * RECORD_SIZE + 10;
        store.fs_mut().file_mut(PATH).unwrap().truncate(cut);

        let mut history = ChannelHistory::new();
        assert_eq!(store.load(&mut history), Ok(true));
        assert_eq!(history.count(), 2);
        assert_eq!(history.newest_idx(), Some(1));
        assert_eq!(history.messages()[0].text.as_slice(), b"Ann: hello");
        assert!(history.messages()[1].valid);
        assert!(!history.messages()[2].valid);
        assert_eq!(history.filtered_oldest_first().as_slice(), &[0]);

        assert_eq!(history.push(400, 0, 0, "Dee: next"), 2);
        assert_eq!(history.count(), 3);
        assert_eq!(history.messages().iter().filter(|m| m.valid).count(), 3);
    }

    #[test]
    fn test_unknown_channel_slot_keeps_older_messages() {
        let mut store = store();
        let mut original = ChannelHistory::new();
        original.push(1, 0, 0, "a");
        original.push(2, 0, 0, "b");
        original.push(3, 9, 0, "x");
        original.push(4, 0, 0, "c");
        store.save(&original).unwrap();

        let mut history = ChannelHistory::new();
        assert_eq!(store.load(&mut history), Ok(true));
        assert_eq!(history.count(), 3);
        let texts: std::vec::Vec<&[u8]> = history
            .filtered_oldest_first()
            .iter()
            .map(|&slot| history.messages()[slot].text.as_slice())
            .collect();
        assert_eq!(texts, [b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]);
    }

    #[test]
    fn test_save_failure_releases_bus() {
        let mut store = store();
        store.fs_mut().set_write_budget(Some(100));
        assert_eq!(
            store.save(&sample()),
            Err(StoreError::Storage(StorageError::NoSpace))
        );
        assert!(!store.fs().bus_selected());

        store.fs_mut().set_write_budget(None);
        store.fs_mut().set_fail_open(true);
        assert_eq!(
            store.save(&sample()),
            Err(StoreError::Storage(StorageError::Io))
        );
        assert!(!store.fs().bus_selected());
    }

    #[test]
    fn test_load_keeps_view_settings() {
        let mut store = store();
        store.save(&sample()).unwrap();

        let mut history = ChannelHistory::new();
        history.set_view_channel(1);
        history.set_msgs_per_page(3);
        store.load(&mut history).unwrap();
        assert_eq!(history.view_channel(), 1);
        assert_eq!(history.msgs_per_page(), 3);
        assert_eq!(history.scroll_pos(), 0);
    }

    /// Select pin that records its level
    #[derive(Default)]
    struct SelectPin {
        low: bool,
        lowered: u8,
    }

    impl ErrorType for SelectPin {
        type Error = Infallible;
    }

    impl OutputPin for SelectPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.low = true;
            self.lowered += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.low = false;
            Ok(())
        }
    }

    type CardStore = HistoryStore<SelectedFileSystem<MemFileSystem, ChipSelect<SelectPin>>>;

    fn card_store() -> CardStore {
        let mut path = String::new();
        path.push_str(PATH).unwrap();
        let cs = ChipSelect::new(SelectPin::default());
        let fs = SelectedFileSystem::new(MemFileSystem::new(), cs);
        HistoryStore::new(fs, path)
    }

    #[test]
    fn test_card_deselected_after_save_and_load() {
        let mut store = card_store();
        store.save(&sample()).unwrap();
        assert!(!store.fs().bus().is_selected());

        let mut history = ChannelHistory::new();
        assert_eq!(store.load(&mut history), Ok(true));
        assert_eq!(history.count(), 3);
        assert!(!store.fs().bus().is_selected());

        let (_, cs) = store.fs.into_parts();
        let pin = cs.release();
        assert!(!pin.low);
        assert!(pin.lowered > 0);
    }

    #[test]
    fn test_card_deselected_after_failed_save() {
        let mut store = card_store();
        store.fs_mut().inner_mut().set_write_budget(Some(100));
        assert_eq!(
            store.save(&sample()),
            Err(StoreError::Storage(StorageError::NoSpace))
        );
        assert!(!store.fs().bus().is_selected());

        store.fs_mut().inner_mut().set_write_budget(None);
        store.fs_mut().inner_mut().insert_file(PATH, &[0x53]);
        let mut history = sample();
        assert_eq!(
            store.load(&mut history),
            Err(StoreError::Format(FormatError::Truncated))
        );
        assert!(!store.fs().bus().is_selected());
        assert_eq!(history.count(), 3);
    }
}
