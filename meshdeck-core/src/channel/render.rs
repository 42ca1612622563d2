//! Channel page renderer
//!
//! Lays out one page of the displayed channel: header with name and message
//! count, messages oldest first with a hop/age prefix, and a key hint footer.
//! Message bodies are word wrapped and may contain inline emoji sprites.

use core::fmt::Write;

use heapless::String;
use meshdeck_display::{Canvas, Color, TextSize};
use meshdeck_protocol::EMOJI_PAD_BYTE;

use super::history::{ChannelHistory, ChannelMessage};
use crate::config::HIST_CAP;
use crate::emoji::{from_escape, is_escape, EMOJI_SMALL_H, EMOJI_SMALL_W};
use crate::mesh::MeshFacade;

const HEADER_H: i32 = 14;
const FOOTER_H: i32 = 14;
const LINE_H: i32 = 9;
const GAP: i32 = 2;
const DIVIDER_Y: i32 = 11;
const EMOJI_STEP: i32 = EMOJI_SMALL_W as i32 + 1;

/// Lines one message may occupy before it is cut short
pub const MAX_LINES_PER_MSG: usize = 8;

/// Height of a message that uses every line
const MAX_MSG_H: i32 = MAX_LINES_PER_MSG as i32 * LINE_H + GAP;

const EMPTY_HINT: [&str; 3] = ["No messages yet.", "A/D: switch channel", "C: compose"];

/// Draw one page of the displayed channel
///
/// Returns the number of messages drawn completely and stores the page
/// size in `history` for scrolling. The stored size is the number drawn,
/// except that it is one more when a message of maximal height would still
/// have fit below the last one, so a page shrunk by long messages grows
/// back once they scroll away.
pub fn render_page<M: MeshFacade + ?Sized>(
    canvas: &mut dyn Canvas,
    history: &mut ChannelHistory,
    mesh: &M,
    now: u32,
) -> usize {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;
    let bottom = height - FOOTER_H;
    let total = history.count_for_current_channel();

    canvas.clear();
    canvas.set_text_size(TextSize::Normal);
    draw_header(canvas, mesh, history.view_channel(), total, width);

    if total == 0 {
        canvas.set_color(Color::Light);
        for (i, line) in EMPTY_HINT.iter().enumerate() {
            canvas.print_at(0, HEADER_H + 4 + i as i32 * LINE_H, line);
        }
        draw_footer(canvas, width, height);
        return 0;
    }

    let slots = history.filtered_oldest_first();
    let reach = usize::from(history.msgs_per_page()) + usize::from(history.scroll_pos());
    let start = slots.len().saturating_sub(reach);

    let mut y = HEADER_H;
    let mut drawn = 0;
    for &slot in &slots[start..] {
        match draw_message(canvas, &history.messages()[slot], now, y, bottom) {
            Some(next_y) => {
                y = next_y;
                drawn += 1;
            }
            None => break,
        }
    }

    // drawn, plus one when a maximal message still fits
    let page = if bottom - y >= MAX_MSG_H {
        drawn + 1
    } else {
        drawn
    };
    history.set_msgs_per_page(page.min(HIST_CAP));

    draw_footer(canvas, width, height);
    drawn
}

fn draw_header<M: MeshFacade + ?Sized>(
    canvas: &mut dyn Canvas,
    mesh: &M,
    channel: u8,
    total: usize,
    width: i32,
) {
    let mut title: String<48> = String::new();
    match mesh.channel(channel).filter(|c| !c.name.is_empty()) {
        Some(details) => {
            let _ = title.push_str(&details.name);
        }
        None => {
            let _ = write!(title, "Channel {}", channel);
        }
    }

    canvas.set_color(Color::Green);
    canvas.print_at(0, 1, &title);

    let mut counter: String<8> = String::new();
    let _ = write!(counter, "[{}]", total);
    canvas.set_color(Color::Light);
    canvas.print_at(width - canvas.text_width(&counter) as i32, 1, &counter);

    canvas.set_color(Color::Green);
    canvas.fill_rect(0, DIVIDER_Y, width as u32, 1);
}

fn draw_footer(canvas: &mut dyn Canvas, width: i32, height: i32) {
    let footer_y = height - 10;
    canvas.set_color(Color::Yellow);
    canvas.fill_rect(0, footer_y - 2, width as u32, 1);
    canvas.print_at(0, footer_y, "Q:Back A/D:Ch");
    let right = "C:New";
    canvas.print_at(width - canvas.text_width(right) as i32, footer_y, right);
}

/// Age of a message in its largest whole unit
fn format_age(secs: u32) -> String<12> {
    let mut out = String::new();
    let _ = match secs {
        0..=59 => write!(out, "{}s", secs),
        60..=3599 => write!(out, "{}m", secs / 60),
        3600..=86_399 => write!(out, "{}h", secs / 3600),
        _ => write!(out, "{}d", secs / 86_400),
    };
    out
}

/// Why a message stopped before its end
enum Stop {
    /// Line limit reached; the message still counts as drawn
    Truncated,
    /// Page bottom reached; the message does not count
    Cut,
}

/// Draw one message with its top line at `top`
///
/// Returns the top of the next message, or `None` when the message did not
/// fit on the page.
fn draw_message(
    canvas: &mut dyn Canvas,
    message: &ChannelMessage,
    now: u32,
    top: i32,
    bottom: i32,
) -> Option<i32> {
    if top + LINE_H > bottom {
        return None;
    }

    let mut prefix: String<24> = String::new();
    let _ = write!(
        prefix,
        "({}) {} ",
        message.hops(),
        format_age(now.saturating_sub(message.timestamp))
    );

    let advance = canvas.advance_width().max(1) as i32;
    canvas.set_color(Color::Yellow);
    canvas.print_at(0, top, &prefix);

    let mut flow = TextFlow {
        width: canvas.width() as i32,
        canvas,
        bottom,
        advance,
        x: advance * prefix.len() as i32,
        y: top,
        lines: 1,
    };
    flow.canvas.set_color(Color::Light);

    match flow.body(&message.text) {
        Ok(()) | Err(Stop::Truncated) => {}
        Err(Stop::Cut) => return None,
    }

    let mut y = flow.y;
    if flow.x > 0 {
        y += LINE_H;
    }
    Some(y + GAP)
}

/// Cursor over the body of one message
struct TextFlow<'a> {
    canvas: &'a mut dyn Canvas,
    width: i32,
    bottom: i32,
    advance: i32,
    x: i32,
    y: i32,
    lines: usize,
}

impl TextFlow<'_> {
    fn wrap(&mut self) -> Result<(), Stop> {
        if self.lines >= MAX_LINES_PER_MSG {
            return Err(Stop::Truncated);
        }
        let next = self.y + LINE_H;
        if next + LINE_H > self.bottom {
            return Err(Stop::Cut);
        }
        self.y = next;
        self.x = 0;
        self.lines += 1;
        Ok(())
    }

    fn body(&mut self, text: &[u8]) -> Result<(), Stop> {
        let mut word_start = true;

        for (i, &byte) in text.iter().enumerate() {
            if byte == EMOJI_PAD_BYTE {
                continue;
            }

            if let Some(emoji) = from_escape(byte) {
                if self.x + EMOJI_STEP > self.width {
                    self.wrap()?;
                }
                self.canvas
                    .draw_xbm(self.x, self.y, &emoji.small, EMOJI_SMALL_W, EMOJI_SMALL_H);
                self.x += EMOJI_STEP;
                word_start = true;
                continue;
            }

            if byte == b' ' || byte < 0x20 {
                if self.x + self.advance > self.width {
                    // the break replaces the space
                    self.wrap()?;
                } else {
                    self.x += self.advance;
                }
                word_start = true;
                continue;
            }

            if word_start && self.x > 0 && self.x + self.word_width(&text[i..]) > self.width {
                self.wrap()?;
            }
            word_start = false;

            if self.x + self.advance > self.width {
                self.wrap()?;
            }
            let glyph = [if byte.is_ascii_graphic() { byte } else { b'?' }];
            let glyph = core::str::from_utf8(&glyph).unwrap_or("?");
            self.canvas.print_at(self.x, self.y, glyph);
            self.x += self.advance;
        }

        Ok(())
    }

    /// Advance of the word at the start of `text`
    fn word_width(&self, text: &[u8]) -> i32 {
        let chars = text
            .iter()
            .take_while(|&&b| b != b' ' && b >= 0x20 && !is_escape(b))
            .filter(|&&b| b != EMOJI_PAD_BYTE)
            .count();
        chars as i32 * self.advance
    }
}
