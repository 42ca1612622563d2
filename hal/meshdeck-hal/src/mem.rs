//! In-memory file system for host testing
//!
//! Tracks bus selection the way a card driver would, and can be told to
//! fail opens or run out of space part way through a write.

use std::collections::{BTreeMap, BTreeSet};
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_io::{ErrorType, Read, Write};

use crate::storage::{parent_dir, FileSystem, OpenMode, StorageError};

/// File system backed by heap buffers
#[derive(Debug, Default)]
pub struct MemFileSystem {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    bus_selected: bool,
    bus_releases: usize,
    fail_open: bool,
    write_budget: Option<usize>,
}

impl MemFileSystem {
    /// Empty file system
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a file, creating its parent directories
    pub fn insert_file(&mut self, path: &str, data: &[u8]) {
        if let Some(dir) = parent_dir(path) {
            self.insert_dirs(dir);
        }
        self.files.insert(path.to_string(), data.to_vec());
    }

    /// Contents of a file
    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Mutable contents of a file
    pub fn file_mut(&mut self, path: &str) -> Option<&mut Vec<u8>> {
        self.files.get_mut(path)
    }

    /// Whether a directory exists
    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    /// Make every subsequent `open` fail with [`StorageError::Io`]
    pub fn set_fail_open(&mut self, fail: bool) {
        self.fail_open = fail;
    }

    /// Limit how many bytes each file opened for writing accepts
    pub fn set_write_budget(&mut self, budget: Option<usize>) {
        self.write_budget = budget;
    }

    /// Whether the card is still selected
    pub fn bus_selected(&self) -> bool {
        self.bus_selected
    }

    /// Number of times the bus was released
    pub fn bus_releases(&self) -> usize {
        self.bus_releases
    }

    fn insert_dirs(&mut self, path: &str) {
        let mut acc = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            acc.push('/');
            acc.push_str(part);
            self.dirs.insert(acc.clone());
        }
    }
}

impl FileSystem for MemFileSystem {
    type File<'a> = MemFile<'a>;

    fn exists(&mut self, path: &str) -> Result<bool, StorageError> {
        self.bus_selected = true;
        Ok(self.files.contains_key(path) || self.dirs.contains(path))
    }

    fn create_dir_all(&mut self, path: &str) -> Result<(), StorageError> {
        self.bus_selected = true;
        if self.files.contains_key(path) {
            return Err(StorageError::Io);
        }
        self.insert_dirs(path);
        Ok(())
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<MemFile<'_>, StorageError> {
        self.bus_selected = true;
        if self.fail_open {
            return Err(StorageError::Io);
        }

        match mode {
            OpenMode::Read => {
                let data = self.files.get_mut(path).ok_or(StorageError::NotFound)?;
                Ok(MemFile {
                    data,
                    pos: 0,
                    write_budget: Some(0),
                })
            }
            OpenMode::WriteTruncate => {
                if let Some(dir) = parent_dir(path) {
                    if !self.dirs.contains(dir) {
                        return Err(StorageError::NotFound);
                    }
                }
                let write_budget = self.write_budget;
                let data = self.files.entry(path.to_string()).or_default();
                data.clear();
                Ok(MemFile {
                    data,
                    pos: 0,
                    write_budget,
                })
            }
        }
    }

    fn release_bus(&mut self) {
        self.bus_selected = false;
        self.bus_releases += 1;
    }
}

/// Open in-memory file
#[derive(Debug)]
pub struct MemFile<'a> {
    data: &'a mut Vec<u8>,
    pos: usize,
    write_budget: Option<usize>,
}

impl ErrorType for MemFile<'_> {
    type Error = StorageError;
}

impl Read for MemFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let start = self.pos.min(self.data.len());
        let remaining = &self.data[start..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos = start + n;
        Ok(n)
    }
}

impl Write for MemFile<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, StorageError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = match self.write_budget {
            Some(0) => return Err(StorageError::NoSpace),
            Some(budget) => buf.len().min(budget),
            None => buf.len(),
        };

        let end = self.pos + n;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(&buf[..n]);
        self.pos = end;
        if let Some(budget) = self.write_budget.as_mut() {
            *budget -= n;
        }
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BusGuard;
    use embedded_io::ReadExactError;

    #[test]
    fn test_write_requires_parent_dir() {
        let mut fs = MemFileSystem::new();
        assert!(matches!(
            fs.open("/meshdeck/channels.bin", OpenMode::WriteTruncate),
            Err(StorageError::NotFound)
        ));

        fs.create_dir_all("/meshdeck").unwrap();
        assert!(fs.has_dir("/meshdeck"));
        let mut file = fs
            .open("/meshdeck/channels.bin", OpenMode::WriteTruncate)
            .unwrap();
        file.write_all(b"hello").unwrap();
        drop(file);
        assert_eq!(fs.file("/meshdeck/channels.bin"), Some(&b"hello"[..]));
    }

    #[test]
    fn test_write_truncates() {
        let mut fs = MemFileSystem::new();
        fs.insert_file("/a/b.bin", b"0123456789");
        let mut file = fs.open("/a/b.bin", OpenMode::WriteTruncate).unwrap();
        file.write_all(b"xy").unwrap();
        drop(file);
        assert_eq!(fs.file("/a/b.bin"), Some(&b"xy"[..]));
    }

    #[test]
    fn test_short_read_is_eof() {
        let mut fs = MemFileSystem::new();
        fs.insert_file("/f.bin", b"abc");
        let mut file = fs.open("/f.bin", OpenMode::Read).unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            file.read_exact(&mut buf),
            Err(ReadExactError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_write_budget_reports_no_space() {
        let mut fs = MemFileSystem::new();
        fs.set_write_budget(Some(4));
        let mut file = fs.open("/f.bin", OpenMode::WriteTruncate).unwrap();
        assert_eq!(file.write_all(b"abcdef"), Err(StorageError::NoSpace));
        drop(file);
        assert_eq!(fs.file("/f.bin"), Some(&b"abcd"[..]));
    }

    #[test]
    fn test_read_only_handle_rejects_writes() {
        let mut fs = MemFileSystem::new();
        fs.insert_file("/f.bin", b"abc");
        let mut file = fs.open("/f.bin", OpenMode::Read).unwrap();
        assert_eq!(file.write(b"z"), Err(StorageError::NoSpace));
    }

    #[test]
    fn test_guard_tracks_bus() {
        let mut fs = MemFileSystem::new();
        fs.insert_file("/f.bin", b"abc");
        {
            let mut bus = BusGuard::new(&mut fs);
            let _file = bus.open("/f.bin", OpenMode::Read).unwrap();
        }
        assert!(!fs.bus_selected());
        assert_eq!(fs.bus_releases(), 1);
    }

    #[test]
    fn test_fail_open() {
        let mut fs = MemFileSystem::new();
        fs.insert_file("/f.bin", b"abc");
        fs.set_fail_open(true);
        assert!(matches!(
            fs.open("/f.bin", OpenMode::Read),
            Err(StorageError::Io)
        ));
    }
}
