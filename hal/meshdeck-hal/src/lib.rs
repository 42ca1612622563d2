//! Meshdeck Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the node screens
//! consume. Board crates implement them for their RTC, SD card and SPI
//! wiring; the host implementations behind the `std` feature back the
//! test suites and desktop simulation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Screens (meshdeck-core)                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  meshdeck-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ board crate   │       │ mem (std)     │
//! │ SD + RTC      │       │ host testing  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::Clock`] - Epoch seconds and monotonic milliseconds
//! - [`storage::FileSystem`] - Persistent files on the shared storage bus
//! - [`bus::SharedBus`] - Select line arbitration for the storage bus
//!
//! [`bus::SelectedFileSystem`] puts a card file system behind a
//! [`bus::ChipSelect`] driven through an `embedded-hal` output pin.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod clock;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mem;

// Re-export key traits at crate root for convenience
pub use bus::{ChipSelect, SelectedFileSystem, SharedBus};
pub use clock::{Clock, ManualClock};
pub use storage::{BusGuard, FileSystem, OpenMode, StorageError};

#[cfg(feature = "embassy")]
pub use clock::EmbassyClock;

#[cfg(any(test, feature = "std"))]
pub use mem::MemFileSystem;
