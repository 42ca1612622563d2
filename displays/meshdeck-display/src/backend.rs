//! Canvas trait
//!
//! Defines the drawing interface the screens render through.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
}

/// Drawing colors
///
/// Monochrome panels map everything except `Dark` to a lit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Background
    Dark,
    /// Body text
    Light,
    /// Titles
    Green,
    /// Annotations, footers and selection borders
    Yellow,
}

/// Text sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    /// Small font for labels
    Tiny,
    /// Default font
    Normal,
}

/// Canvas trait
///
/// Provides a hardware-agnostic, cursor-based drawing interface. Drawing
/// into the frame is infallible; errors from the panel surface in
/// [`flush`](Canvas::flush).
///
/// Coordinates are in pixels with the origin at the top-left corner. Text
/// is positioned by its top-left corner.
pub trait Canvas {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Fill the whole frame with the background color
    fn clear(&mut self);

    /// Set the color used by subsequent draw calls
    fn set_color(&mut self, color: Color);

    /// Set the font used by subsequent text calls
    fn set_text_size(&mut self, size: TextSize);

    /// Move the text cursor
    fn set_cursor(&mut self, x: i32, y: i32);

    /// Draw text at the cursor and advance the cursor past it
    fn print(&mut self, text: &str);

    /// Fill a rectangle
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Draw a 1-px rectangle outline
    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Blit an XBM bitmap (rows padded to whole bytes, LSB is leftmost)
    ///
    /// Set bits are drawn in the current color; clear bits are left alone.
    fn draw_xbm(&mut self, x: i32, y: i32, bitmap: &[u8], width: u32, height: u32);

    /// Width in pixels of `text` in the current font
    ///
    /// May include side bearing after the last glyph.
    fn text_width(&self, text: &str) -> u32;

    /// Whether the panel is slow to refresh (e-ink)
    fn is_slow_refresh(&self) -> bool {
        false
    }

    /// Push the frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Advance width of one character in the current font
    ///
    /// Measured as the difference between two- and one-character strings,
    /// which cancels any trailing side bearing `text_width` includes.
    fn advance_width(&self) -> u32 {
        self.text_width("cc").saturating_sub(self.text_width("c"))
    }

    /// Move the cursor and draw text
    fn print_at(&mut self, x: i32, y: i32, text: &str) {
        self.set_cursor(x, y);
        self.print(text);
    }
}
