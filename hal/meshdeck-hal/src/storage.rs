//! Persistent file storage abstractions
//!
//! The node keeps its channel history as a small file on the SD card.
//! File handles speak `embedded-io`, so codecs can stream records with
//! `read_exact`/`write_all` regardless of the card driver underneath.

use core::ops::{Deref, DerefMut};

use embedded_io::{ErrorKind, ErrorType, Read, Write};

/// Errors from file storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// File or directory does not exist
    NotFound,
    /// Card or bus transfer failed
    Io,
    /// Card is full
    NoSpace,
    /// Bus is held by another peripheral
    BusBusy,
    /// Operation not supported by this file system
    Unsupported,
}

impl embedded_io::Error for StorageError {
    fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        }
    }
}

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenMode {
    /// Read from the start of an existing file
    Read,
    /// Create or truncate, then write from the start
    WriteTruncate,
}

/// File system on the shared storage bus
///
/// Every operation may select the storage device. Callers must call
/// [`release_bus`](FileSystem::release_bus) once they are done, on every
/// exit path; [`BusGuard`] does this on drop.
pub trait FileSystem {
    /// Open file handle, closed when dropped
    type File<'a>: Read + Write + ErrorType<Error = StorageError>
    where
        Self: 'a;

    /// Check whether a file or directory exists
    fn exists(&mut self, path: &str) -> Result<bool, StorageError>;

    /// Create a directory and any missing parents
    fn create_dir_all(&mut self, path: &str) -> Result<(), StorageError>;

    /// Open a file
    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File<'_>, StorageError>;

    /// Deselect the storage device and hand the bus back
    fn release_bus(&mut self);
}

/// Holds the storage bus for one open/close cycle
///
/// Dereferences to the file system. Dropping the guard releases the bus,
/// including on early returns through `?`.
pub struct BusGuard<'a, F: FileSystem + ?Sized> {
    fs: &'a mut F,
}

impl<'a, F: FileSystem + ?Sized> BusGuard<'a, F> {
    /// Take the bus for the lifetime of the guard
    pub fn new(fs: &'a mut F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem + ?Sized> Deref for BusGuard<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.fs
    }
}

impl<F: FileSystem + ?Sized> DerefMut for BusGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.fs
    }
}

impl<F: FileSystem + ?Sized> Drop for BusGuard<'_, F> {
    fn drop(&mut self) {
        self.fs.release_bus();
    }
}

/// Parent directory of an absolute path
///
/// Returns `None` for relative paths and for files in the root directory.
pub fn parent_dir(path: &str) -> Option<&str> {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => Some(dir),
        _ => None,
    }
}
