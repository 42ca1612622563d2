//! `embedded-graphics` canvas
//!
//! Adapts any `DrawTarget` to the [`Canvas`] interface.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_4X6, FONT_6X10},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{BinaryColor, Rgb565},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{renderer::TextRenderer, Baseline, Text},
};

use crate::backend::{Canvas, Color, DisplayError, TextSize};

/// Pixel colors that can represent the screen palette
pub trait PaletteColor: PixelColor {
    /// Native color for a palette entry
    fn from_palette(color: Color) -> Self;
}

impl PaletteColor for Rgb565 {
    fn from_palette(color: Color) -> Self {
        match color {
            Color::Dark => Rgb565::BLACK,
            Color::Light => Rgb565::new(26, 52, 26),
            Color::Green => Rgb565::GREEN,
            Color::Yellow => Rgb565::YELLOW,
        }
    }
}

impl PaletteColor for BinaryColor {
    fn from_palette(color: Color) -> Self {
        match color {
            Color::Dark => BinaryColor::Off,
            _ => BinaryColor::On,
        }
    }
}

/// Canvas over an `embedded-graphics` draw target
///
/// Uses `FONT_6X10` for normal text and `FONT_4X6` for tiny text. A failed
/// draw is remembered and reported by the next [`flush`](Canvas::flush).
pub struct GraphicsCanvas<D> {
    target: D,
    color: Color,
    text_size: TextSize,
    cursor: Point,
    slow_refresh: bool,
    draw_failed: bool,
}

impl<D> GraphicsCanvas<D>
where
    D: DrawTarget,
    D::Color: PaletteColor,
{
    /// Wrap a draw target
    pub fn new(target: D) -> Self {
        Self {
            target,
            color: Color::Light,
            text_size: TextSize::Normal,
            cursor: Point::zero(),
            slow_refresh: false,
            draw_failed: false,
        }
    }

    /// Mark the panel as slow to refresh
    pub fn with_slow_refresh(mut self, slow: bool) -> Self {
        self.slow_refresh = slow;
        self
    }

    /// Get the draw target
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Get the draw target mutably (for driver-level refresh)
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Unwrap the draw target
    pub fn into_inner(self) -> D {
        self.target
    }

    /// Current text cursor
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    fn font(&self) -> &'static MonoFont<'static> {
        match self.text_size {
            TextSize::Tiny => &FONT_4X6,
            TextSize::Normal => &FONT_6X10,
        }
    }

    fn native_color(&self) -> D::Color {
        D::Color::from_palette(self.color)
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, width: u32, height: u32, style: PrimitiveStyle<D::Color>) {
        let result = Rectangle::new(Point::new(x, y), Size::new(width, height))
            .into_styled(style)
            .draw(&mut self.target);
        if result.is_err() {
            self.draw_failed = true;
        }
    }
}

impl<D> Canvas for GraphicsCanvas<D>
where
    D: DrawTarget,
    D::Color: PaletteColor,
{
    fn width(&self) -> u32 {
        self.target.bounding_box().size.width
    }

    fn height(&self) -> u32 {
        self.target.bounding_box().size.height
    }

    fn clear(&mut self) {
        if self
            .target
            .clear(D::Color::from_palette(Color::Dark))
            .is_err()
        {
            self.draw_failed = true;
        }
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.text_size = size;
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    fn print(&mut self, text: &str) {
        let style = MonoTextStyle::new(self.font(), self.native_color());
        match Text::with_baseline(text, self.cursor, style, Baseline::Top).draw(&mut self.target) {
            Ok(next) => self.cursor = next,
            Err(_) => self.draw_failed = true,
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let style = PrimitiveStyle::with_fill(self.native_color());
        self.draw_rectangle(x, y, width, height, style);
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let style = PrimitiveStyle::with_stroke(self.native_color(), 1);
        self.draw_rectangle(x, y, width, height, style);
    }

    fn draw_xbm(&mut self, x: i32, y: i32, bitmap: &[u8], width: u32, height: u32) {
        let stride = width.div_ceil(8) as usize;
        let color = self.native_color();
        let pixels = (0..height).flat_map(move |row| {
            (0..width).filter_map(move |col| {
                let byte = bitmap.get(row as usize * stride + (col / 8) as usize)?;
                ((byte >> (col % 8)) & 1 == 1)
                    .then(|| Pixel(Point::new(x + col as i32, y + row as i32), color))
            })
        });
        if self.target.draw_iter(pixels).is_err() {
            self.draw_failed = true;
        }
    }

    fn text_width(&self, text: &str) -> u32 {
        let style = MonoTextStyle::new(self.font(), self.native_color());
        style
            .measure_string(text, Point::zero(), Baseline::Top)
            .bounding_box
            .size
            .width
    }

    fn is_slow_refresh(&self) -> bool {
        self.slow_refresh
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if core::mem::take(&mut self.draw_failed) {
            return Err(DisplayError::Communication);
        }
        Ok(())
    }
}
