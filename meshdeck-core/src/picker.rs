//! Emoji picker
//!
//! A scrolling grid over the emoji catalog. The picker is reset each time
//! it is shown and finishes with either an escape byte or the cancel
//! sentinel.

use meshdeck_display::{Canvas, Color, TextSize};
use meshdeck_protocol::Key;

use crate::config::DEFAULT_IDLE_REDRAW_MS;
use crate::emoji::{escape_for, EMOJI, EMOJI_COUNT, EMOJI_LARGE_H, EMOJI_LARGE_W};
use crate::runtime::Screen;

/// Grid columns
pub const COLS: usize = 6;

/// Grid rows visible at once
pub const VISIBLE_ROWS: usize = 3;

/// Grid rows in total
pub const TOTAL_ROWS: usize = GRID.total_rows();

/// Returned instead of an escape byte when the picker is cancelled
pub const PICKER_CANCEL: u8 = 0xFF;

const HEADER_H: i32 = 14;
const FOOTER_H: i32 = 14;
const SCROLLBAR_W: u32 = 4;
const MIN_THUMB_H: u32 = 4;
const LABEL_GAP: i32 = 1;

const GRID: Grid = Grid {
    count: EMOJI_COUNT,
    cols: COLS,
    visible_rows: VISIBLE_ROWS,
};

/// Cursor movement over `count` cells laid out `cols` wide
#[derive(Debug, Clone, Copy)]
struct Grid {
    count: usize,
    cols: usize,
    visible_rows: usize,
}

impl Grid {
    const fn total_rows(&self) -> usize {
        self.count.div_ceil(self.cols)
    }

    const fn max_scroll(&self) -> usize {
        self.total_rows().saturating_sub(self.visible_rows)
    }

    fn up(&self, cursor: usize) -> usize {
        if cursor >= self.cols {
            cursor - self.cols
        } else {
            cursor
        }
    }

    /// One row down; onto the last cell when the row below is partial
    fn down(&self, cursor: usize) -> usize {
        let below = cursor + self.cols;
        if below < self.count {
            below
        } else if cursor / self.cols + 1 < self.total_rows() {
            self.count - 1
        } else {
            cursor
        }
    }

    fn right(&self, cursor: usize) -> usize {
        if cursor + 1 < self.count {
            cursor + 1
        } else {
            cursor
        }
    }

    /// Scroll row that keeps the cursor row on screen
    fn scroll_for(&self, cursor: usize, scroll_row: usize) -> usize {
        let row = cursor / self.cols;
        let scroll_row = if row < scroll_row {
            row
        } else if row >= scroll_row + self.visible_rows {
            row + 1 - self.visible_rows
        } else {
            scroll_row
        };
        scroll_row.min(self.max_scroll())
    }
}

/// Result of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PickerAction {
    /// Key not handled
    None,
    /// Cursor or scroll handled
    Moved,
    /// Emoji chosen; carries its escape byte
    Chosen(u8),
    /// Picker dismissed
    Cancelled,
}

impl PickerAction {
    /// Byte form: escape byte, [`PICKER_CANCEL`], or 0 for no action
    pub fn as_byte(self) -> u8 {
        match self {
            PickerAction::Chosen(escape) => escape,
            PickerAction::Cancelled => PICKER_CANCEL,
            PickerAction::None | PickerAction::Moved => 0,
        }
    }
}

/// Emoji picker state
#[derive(Debug, Clone, Default)]
pub struct EmojiPicker {
    cursor: usize,
    scroll_row: usize,
    outcome: Option<u8>,
}

impl EmojiPicker {
    /// Fresh picker with the cursor on the first entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset before showing the picker again
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Catalog index under the cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First visible grid row
    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    /// Escape byte or [`PICKER_CANCEL`] once the picker finished
    pub fn outcome(&self) -> Option<u8> {
        self.outcome
    }

    /// Apply one key
    pub fn handle_key(&mut self, key: u8) -> PickerAction {
        let key = Key::from_byte(key);

        match key {
            _ if key.is_up() => self.cursor = GRID.up(self.cursor),
            _ if key.is_down() => self.cursor = GRID.down(self.cursor),
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = GRID.right(self.cursor),
            Key::Confirm => return PickerAction::Chosen(escape_for(self.cursor)),
            Key::Backspace | Key::Quit | Key::Dollar => return PickerAction::Cancelled,
            _ => return PickerAction::None,
        }

        self.scroll_row = GRID.scroll_for(self.cursor, self.scroll_row);
        PickerAction::Moved
    }

    /// Paint the picker
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        canvas.clear();

        canvas.set_text_size(TextSize::Normal);
        canvas.set_color(Color::Green);
        canvas.print_at(2, 1, "Emoji");
        canvas.fill_rect(0, 11, width as u32, 1);

        let grid_w = (width - SCROLLBAR_W as i32 - 1).max(COLS as i32);
        let grid_h = (height - HEADER_H - FOOTER_H).max(VISIBLE_ROWS as i32);
        let cell_w = grid_w / COLS as i32;
        let cell_h = grid_h / VISIBLE_ROWS as i32;

        canvas.set_text_size(TextSize::Tiny);
        for visible_row in 0..VISIBLE_ROWS {
            let row = self.scroll_row + visible_row;
            for col in 0..COLS {
                let index = row * COLS + col;
                let Some(entry) = EMOJI.get(index) else {
                    break;
                };
                let x = col as i32 * cell_w;
                let y = HEADER_H + visible_row as i32 * cell_h;

                if index == self.cursor {
                    canvas.set_color(Color::Yellow);
                    canvas.draw_rect(x, y, cell_w as u32, cell_h as u32);
                }

                canvas.set_color(Color::Light);
                let sprite_x = x + (cell_w - EMOJI_LARGE_W as i32) / 2;
                canvas.draw_xbm(sprite_x, y + 1, &entry.large, EMOJI_LARGE_W, EMOJI_LARGE_H);

                let label_x = x + (cell_w - canvas.text_width(entry.label) as i32) / 2;
                let label_y = y + 1 + EMOJI_LARGE_H as i32 + LABEL_GAP;
                canvas.print_at(label_x, label_y, entry.label);
            }
        }

        self.draw_scrollbar(canvas, width, grid_h);

        canvas.set_text_size(TextSize::Normal);
        canvas.set_color(Color::Yellow);
        let footer_y = height - 10;
        canvas.fill_rect(0, footer_y - 2, width as u32, 1);
        canvas.print_at(0, footer_y, "Ent:Pick Q:Back");
    }

    fn draw_scrollbar(&self, canvas: &mut dyn Canvas, width: i32, track_h: i32) {
        let x = width - SCROLLBAR_W as i32;
        let track_h = track_h as u32;

        canvas.set_color(Color::Light);
        canvas.draw_rect(x, HEADER_H, SCROLLBAR_W, track_h);

        let thumb_h = (track_h * VISIBLE_ROWS as u32 / TOTAL_ROWS as u32)
            .max(MIN_THUMB_H)
            .min(track_h);
        let max_scroll = GRID.max_scroll() as u32;
        let thumb_offset = if max_scroll == 0 {
            0
        } else {
            (track_h - thumb_h) * self.scroll_row as u32 / max_scroll
        };
        canvas.fill_rect(x, HEADER_H + thumb_offset as i32, SCROLLBAR_W, thumb_h);
    }
}

impl Screen for EmojiPicker {
    fn render(&mut self, canvas: &mut dyn Canvas) -> u32 {
        self.draw(canvas);
        DEFAULT_IDLE_REDRAW_MS
    }

    fn handle_input(&mut self, key: u8) -> bool {
        match self.handle_key(key) {
            PickerAction::None => false,
            PickerAction::Moved => true,
            action @ (PickerAction::Chosen(_) | PickerAction::Cancelled) => {
                debug!("emoji picker done: {=u8:#x}", action.as_byte());
                self.outcome = Some(action.as_byte());
                true
            }
        }
    }

    fn wants_close(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshdeck_protocol::{EMOJI_ESCAPE_START, KEY_NEXT, KEY_PREV};

    #[test]
    fn test_grid_shape() {
        assert_eq!(TOTAL_ROWS, 4);
        assert_eq!(GRID.max_scroll(), 1);
    }

    #[test]
    fn test_down_onto_partial_row() {
        // 22 cells: the last row holds 4 of 6
        let grid = Grid {
            count: 22,
            cols: 6,
            visible_rows: 3,
        };
        assert_eq!(grid.total_rows(), 4);
        assert_eq!(grid.down(3), 9);
        assert_eq!(grid.down(15), 21);
        assert_eq!(grid.down(17), 21);
        // already on the last row
        assert_eq!(grid.down(21), 21);
        assert_eq!(grid.down(19), 19);
        assert_eq!(grid.scroll_for(21, 0), 1);
        assert_eq!(grid.up(21), 15);
        assert_eq!(grid.right(21), 21);
    }

    #[test]
    fn test_scroll_clamped_to_grid() {
        let grid = Grid {
            count: 4,
            cols: 6,
            visible_rows: 3,
        };
        assert_eq!(grid.max_scroll(), 0);
        assert_eq!(grid.down(2), 2);
        assert_eq!(grid.scroll_for(3, 2), 0);
    }

    #[test]
    fn test_down_scrolls_into_view() {
        let mut picker = EmojiPicker::new();
        for _ in 0..3 {
            assert_eq!(picker.handle_key(b's'), PickerAction::Moved);
        }
        assert_eq!(picker.cursor(), 18);
        assert_eq!(picker.scroll_row(), 1);

        // bottom row: stays put
        picker.handle_key(KEY_NEXT);
        assert_eq!(picker.cursor(), 18);

        for _ in 0..3 {
            picker.handle_key(KEY_PREV);
        }
        assert_eq!(picker.cursor(), 0);
        assert_eq!(picker.scroll_row(), 0);
    }

    #[test]
    fn test_left_right_clamp() {
        let mut picker = EmojiPicker::new();
        picker.handle_key(b'a');
        assert_eq!(picker.cursor(), 0);
        for _ in 0..40 {
            picker.handle_key(b'd');
        }
        assert_eq!(picker.cursor(), EMOJI_COUNT - 1);
        assert_eq!(picker.scroll_row(), 1);
    }

    #[test]
    fn test_choose_and_cancel() {
        let mut picker = EmojiPicker::new();
        picker.handle_key(b'd');
        assert_eq!(
            picker.handle_key(b'\r'),
            PickerAction::Chosen(EMOJI_ESCAPE_START + 1)
        );
        assert_eq!(picker.handle_key(b'q'), PickerAction::Cancelled);
        assert_eq!(picker.handle_key(0x08), PickerAction::Cancelled);
        assert_eq!(picker.handle_key(b'$').as_byte(), PICKER_CANCEL);
        assert_eq!(picker.handle_key(b'x'), PickerAction::None);
        assert_eq!(picker.handle_key(b'x').as_byte(), 0);
    }

    #[test]
    fn test_screen_outcome() {
        let mut picker = EmojiPicker::new();
        assert!(!picker.wants_close());
        assert!(!picker.handle_input(b'z'));
        assert!(picker.handle_input(b'd'));
        assert!(picker.handle_input(b'\n'));
        assert_eq!(picker.outcome(), Some(EMOJI_ESCAPE_START + 1));
        assert!(picker.wants_close());

        picker.reset();
        assert_eq!(picker.outcome(), None);
        assert_eq!(picker.cursor(), 0);
    }
}
