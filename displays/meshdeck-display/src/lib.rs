//! Display abstraction for Meshdeck node screens
//!
//! This crate provides:
//! - `Canvas` trait: cursor-based text, rectangles and XBM bitmaps
//! - `Color` and `TextSize`, the small palette the screens draw with
//! - `GraphicsCanvas`, a `Canvas` over any `embedded-graphics` draw target
//! - `RecordingCanvas` (feature `std`), which records draw calls for tests
//!
//! # Architecture
//!
//! Screens never talk to a panel driver directly. They draw through
//! `&mut dyn Canvas`, so the same screen code runs on an SPI TFT, a
//! monochrome OLED, an e-ink panel or the host test suite.
//!
//! ## Supported Display Types
//!
//! - **Color panels** (e.g., ST7789 TFT): wrap the driver's `DrawTarget<Color = Rgb565>`
//!   in a `GraphicsCanvas`.
//! - **Monochrome panels** (OLED, e-ink): wrap a `DrawTarget<Color = BinaryColor>`;
//!   all non-dark colors render as lit pixels. E-ink panels should set the
//!   slow refresh hint so screens back off their redraw rate.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod backend;
pub mod graphics;

#[cfg(feature = "std")]
pub mod recording;

// Re-export key types
pub use backend::{Canvas, Color, DisplayError, TextSize};
pub use graphics::{GraphicsCanvas, PaletteColor};

#[cfg(feature = "std")]
pub use recording::{DrawOp, RecordingCanvas};
