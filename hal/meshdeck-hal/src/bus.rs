//! Shared storage bus arbitration
//!
//! The SD card shares its SPI bus with the radio and the display. Whoever
//! talks to the card must leave the card deselected afterwards, otherwise
//! the other peripherals read garbage on MISO.

use embedded_hal::digital::OutputPin;

use crate::storage::{FileSystem, OpenMode, StorageError};

/// A bus with a single select line owned by one device
pub trait SharedBus {
    /// Assert the device's select line
    fn select(&mut self) -> Result<(), StorageError>;

    /// Release the select line back to its idle level
    fn deselect(&mut self);

    /// Whether the device is currently selected
    fn is_selected(&self) -> bool;
}

/// Active-low chip select
///
/// The idle (deselected) level is high. Construction deselects the device.
#[derive(Debug)]
pub struct ChipSelect<P> {
    pin: P,
    selected: bool,
}

impl<P: OutputPin> ChipSelect<P> {
    /// Wrap a select pin and drive it to the idle level
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_high();
        Self {
            pin,
            selected: false,
        }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> SharedBus for ChipSelect<P> {
    fn select(&mut self) -> Result<(), StorageError> {
        self.pin.set_low().map_err(|_| StorageError::BusBusy)?;
        self.selected = true;
        Ok(())
    }

    fn deselect(&mut self) {
        let _ = self.pin.set_high();
        self.selected = false;
    }

    fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Card file system behind a select line on a shared bus
///
/// Selects the card before every operation and deselects it in
/// [`release_bus`](FileSystem::release_bus), so a [`BusGuard`] around any
/// store operation leaves the line idle on every exit path.
///
/// [`BusGuard`]: crate::storage::BusGuard
pub struct SelectedFileSystem<F, B> {
    fs: F,
    bus: B,
}

impl<F: FileSystem, B: SharedBus> SelectedFileSystem<F, B> {
    /// Put `fs` behind `bus`
    pub fn new(fs: F, mut bus: B) -> Self {
        bus.deselect();
        Self { fs, bus }
    }

    /// Card file system
    pub fn inner(&self) -> &F {
        &self.fs
    }

    /// Card file system, mutably
    pub fn inner_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Select line
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Take the file system and select line apart
    pub fn into_parts(self) -> (F, B) {
        (self.fs, self.bus)
    }
}

impl<F: FileSystem, B: SharedBus> FileSystem for SelectedFileSystem<F, B> {
    type File<'a>
        = F::File<'a>
    where
        Self: 'a;

    fn exists(&mut self, path: &str) -> Result<bool, StorageError> {
        self.bus.select()?;
        self.fs.exists(path)
    }

    fn create_dir_all(&mut self, path: &str) -> Result<(), StorageError> {
        self.bus.select()?;
        self.fs.create_dir_all(path)
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::File<'_>, StorageError> {
        self.bus.select()?;
        self.fs.open(path, mode)
    }

    fn release_bus(&mut self) {
        self.fs.release_bus();
        self.bus.deselect();
    }
}
