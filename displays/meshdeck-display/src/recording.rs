//! Recording canvas for host testing
//!
//! Records every draw call of the current frame. Text is measured with a
//! monospace model: 6 px per character in the normal font, 4 px in the
//! tiny font, plus 1 px of side bearing after the last glyph.

use std::string::{String, ToString};
use std::vec::Vec;

use crate::backend::{Canvas, Color, DisplayError, TextSize};

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Frame cleared
    Clear,
    /// Text drawn with its top-left corner at (x, y)
    Text {
        x: i32,
        y: i32,
        size: TextSize,
        color: Color,
        text: String,
    },
    /// Filled rectangle
    FillRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
    },
    /// Rectangle outline
    DrawRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
    },
    /// XBM bitmap
    Bitmap {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
    },
}

impl DrawOp {
    /// Top-left corner of the operation, if it draws anything
    pub fn origin(&self) -> Option<(i32, i32)> {
        match self {
            DrawOp::Clear => None,
            DrawOp::Text { x, y, .. }
            | DrawOp::FillRect { x, y, .. }
            | DrawOp::DrawRect { x, y, .. }
            | DrawOp::Bitmap { x, y, .. } => Some((*x, *y)),
        }
    }
}

/// Canvas that records draw calls instead of rasterizing them
#[derive(Debug)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    color: Color,
    text_size: TextSize,
    cursor: (i32, i32),
    ops: Vec<DrawOp>,
    flushes: usize,
    fail_flush: bool,
    slow_refresh: bool,
}

impl RecordingCanvas {
    /// Create a canvas of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color: Color::Light,
            text_size: TextSize::Normal,
            cursor: (0, 0),
            ops: Vec::new(),
            flushes: 0,
            fail_flush: false,
            slow_refresh: false,
        }
    }

    /// Report the panel as slow to refresh
    pub fn with_slow_refresh(mut self, slow: bool) -> Self {
        self.slow_refresh = slow;
        self
    }

    /// Make flushes fail
    pub fn set_fail_flush(&mut self, fail: bool) {
        self.fail_flush = fail;
    }

    /// Operations since the last `clear`
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of flushes so far, failed ones included
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Text operations as (x, y, text)
    pub fn texts(&self) -> impl Iterator<Item = (i32, i32, &str)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
            _ => None,
        })
    }

    /// Bitmap operations as (x, y)
    pub fn bitmaps(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Bitmap { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
    }

    /// Whether any single text operation contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|(_, _, text)| text.contains(needle))
    }

    /// Position of the first text operation equal to `text`
    pub fn find_text(&self, text: &str) -> Option<(i32, i32)> {
        self.texts()
            .find(|(_, _, t)| *t == text)
            .map(|(x, y, _)| (x, y))
    }

    /// Characters drawn at one y position, concatenated in draw order
    pub fn line_at(&self, y: i32) -> String {
        self.texts()
            .filter(|(_, ty, _)| *ty == y)
            .map(|(_, _, t)| t)
            .collect()
    }

    fn advance(&self) -> u32 {
        match self.text_size {
            TextSize::Tiny => 4,
            TextSize::Normal => 6,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_text_size(&mut self, size: TextSize) {
        self.text_size = size;
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    fn print(&mut self, text: &str) {
        let (x, y) = self.cursor;
        self.ops.push(DrawOp::Text {
            x,
            y,
            size: self.text_size,
            color: self.color,
            text: text.to_string(),
        });
        let advance = self.advance() as i32 * text.chars().count() as i32;
        self.cursor = (x + advance, y);
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color: self.color,
        });
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.ops.push(DrawOp::DrawRect {
            x,
            y,
            width,
            height,
            color: self.color,
        });
    }

    fn draw_xbm(&mut self, x: i32, y: i32, _bitmap: &[u8], width: u32, height: u32) {
        self.ops.push(DrawOp::Bitmap {
            x,
            y,
            width,
            height,
            color: self.color,
        });
    }

    fn text_width(&self, text: &str) -> u32 {
        match text.chars().count() as u32 {
            0 => 0,
            n => n * self.advance() + 1,
        }
    }

    fn is_slow_refresh(&self) -> bool {
        self.slow_refresh
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        if self.fail_flush {
            return Err(DisplayError::Communication);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_has_side_bearing() {
        let mut canvas = RecordingCanvas::new(128, 64);
        assert_eq!(canvas.text_width(""), 0);
        assert_eq!(canvas.text_width("c"), 7);
        assert_eq!(canvas.advance_width(), 6);
        canvas.set_text_size(TextSize::Tiny);
        assert_eq!(canvas.advance_width(), 4);
    }

    #[test]
    fn test_print_records_and_advances() {
        let mut canvas = RecordingCanvas::new(128, 64);
        canvas.set_color(Color::Yellow);
        canvas.print_at(3, 10, "ab");
        canvas.print("c");
        assert_eq!(canvas.find_text("c"), Some((15, 10)));
        assert_eq!(canvas.line_at(10), "abc");
        assert!(matches!(
            canvas.ops()[0],
            DrawOp::Text {
                color: Color::Yellow,
                ..
            }
        ));
    }

    #[test]
    fn test_clear_starts_new_frame() {
        let mut canvas = RecordingCanvas::new(128, 64);
        canvas.fill_rect(0, 0, 1, 1);
        canvas.clear();
        assert_eq!(canvas.ops(), &[DrawOp::Clear]);
    }

    #[test]
    fn test_flush_failure() {
        let mut canvas = RecordingCanvas::new(128, 64);
        canvas.set_fail_flush(true);
        assert_eq!(canvas.flush(), Err(DisplayError::Communication));
        assert_eq!(canvas.flushes(), 1);
    }
}
