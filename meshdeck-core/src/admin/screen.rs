//! Repeater admin screen
//!
//! Logs in to a repeater, offers a fixed list of CLI commands and shows
//! their responses. Replies arrive through [`RepeaterListener`]; waits
//! time out in [`poll`](Screen::poll).

use core::fmt::Write;

use heapless::String;
use meshdeck_display::{Canvas, Color, TextSize};
use meshdeck_hal::Clock;
use meshdeck_protocol::{is_printable, Key};

use super::events::AdminEvent;
use super::machine::AdminState;
use super::session::{AdminSession, MenuItem, PASSWORD_MAX_LEN};
use crate::config::UiConfig;
use crate::mesh::{MeshEvent, MeshFacade, RepeaterListener};
use crate::runtime::Screen;

const HEADER_H: i32 = 14;
const FOOTER_H: i32 = 14;
const LINE_H: i32 = 11;
const NAME_MAX_CHARS: usize = 16;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const SPINNER_STEP_MS: u64 = 250;
const SYNCED_DRIFT_S: i64 = 2;

const MSG_LOGIN_SEND_FAILED: &str = "Send failed.\nCheck contact path.";
const MSG_SEND_FAILED: &str = "Send failed.";
const MSG_LOGIN_FAILED: &str = "Login failed.\nCheck password.";
const MSG_TIMEOUT: &str = "Timeout - no response.";

/// Admin screen for one repeater at a time
pub struct RepeaterAdminScreen<M, C> {
    mesh: M,
    clock: C,
    session: AdminSession,
    timeout_ms: u32,
    active_redraw_ms: u32,
    idle_redraw_ms: u32,
}

impl<M: MeshFacade, C: Clock> RepeaterAdminScreen<M, C> {
    /// Create the screen with an empty session
    pub fn new(mesh: M, clock: C, config: &UiConfig) -> Self {
        Self {
            mesh,
            clock,
            session: AdminSession::default(),
            timeout_ms: config.admin_timeout_ms,
            active_redraw_ms: config.active_redraw_ms,
            idle_redraw_ms: config.idle_redraw_ms,
        }
    }

    /// Start a new session with a repeater
    ///
    /// Drops any previous session, password and response included.
    pub fn open_for_contact(&mut self, contact_idx: u16, name: &str) {
        debug!("admin session for contact {=u16}", contact_idx);
        self.session = AdminSession::for_contact(contact_idx, name);
    }

    /// Current session
    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    /// Current state
    pub fn state(&self) -> AdminState {
        self.session.state
    }

    fn apply(&mut self, event: AdminEvent) {
        let current = self.session.state;
        let next = current.transition(event);
        if next != current {
            debug!("admin {} -> {} on {}", current, next, event);
        }
        self.session.state = next;
    }

    fn send_login(&mut self) {
        self.session.cmd_sent_at = self.clock.now_ms();
        let contact = self.session.contact_idx;
        if self.mesh.login_to_repeater(contact, &self.session.password) {
            self.session.waiting_for_login = true;
            self.apply(AdminEvent::LoginSent);
        } else {
            warn!("login to contact {=u16} not sent", contact);
            self.session.set_response(MSG_LOGIN_SEND_FAILED);
            self.apply(AdminEvent::SendFailed);
        }
    }

    fn execute(&mut self, item: MenuItem) {
        self.session.cmd_sent_at = self.clock.now_ms();
        let contact = self.session.contact_idx;
        if self.mesh.send_cli_command(contact, item.command()) {
            debug!("sent {=str} to contact {=u16}", item.command(), contact);
            self.apply(AdminEvent::CommandSent);
        } else {
            warn!("command {=str} not sent", item.command());
            self.session.set_response(MSG_SEND_FAILED);
            self.apply(AdminEvent::SendFailed);
        }
    }

    fn password_input(&mut self, byte: u8) -> bool {
        let password = &mut self.session.password;
        match Key::from_byte(byte) {
            // empty: leave the screen; otherwise ignored
            Key::Quit => !password.is_empty(),
            Key::Backspace => password.pop().is_some(),
            Key::Confirm => {
                if password.is_empty() {
                    return false;
                }
                self.send_login();
                true
            }
            _ if is_printable(byte) => {
                password.len() < PASSWORD_MAX_LEN && password.push(byte as char).is_ok()
            }
            _ => false,
        }
    }

    fn waiting_input(&mut self, key: Key) -> bool {
        if key != Key::Quit {
            return false;
        }
        self.session.waiting_for_login = false;
        self.apply(AdminEvent::Cancel);
        true
    }

    fn menu_input(&mut self, key: Key) -> bool {
        match key {
            _ if key.is_up() => {
                if self.session.menu_sel == 0 {
                    return false;
                }
                self.session.menu_sel -= 1;
                true
            }
            _ if key.is_down() => {
                if self.session.menu_sel + 1 >= MenuItem::COUNT {
                    return false;
                }
                self.session.menu_sel += 1;
                true
            }
            Key::Digit(n) if (1..=MenuItem::COUNT).contains(&usize::from(n)) => {
                self.session.menu_sel = usize::from(n) - 1;
                self.execute(self.session.selected_item());
                true
            }
            Key::Confirm => {
                self.execute(self.session.selected_item());
                true
            }
            _ => false,
        }
    }

    fn result_input(&mut self, key: Key) -> bool {
        match key {
            _ if key.is_up() => {
                if self.session.response_scroll == 0 {
                    return false;
                }
                self.session.response_scroll -= 1;
                true
            }
            _ if key.is_down() => {
                self.session.response_scroll += 1;
                true
            }
            Key::Quit => {
                let logged_in = self.session.permissions != 0;
                self.apply(AdminEvent::Back { logged_in });
                true
            }
            Key::Confirm => {
                self.apply(AdminEvent::Acknowledge);
                true
            }
            _ => false,
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        canvas.clear();
        canvas.set_text_size(TextSize::Normal);
        self.draw_header(canvas, width);

        match self.session.state {
            AdminState::PasswordEntry => self.draw_password(canvas),
            AdminState::LoggingIn => self.draw_waiting(canvas, "Logging in", width, height),
            AdminState::CommandPending => self.draw_waiting(canvas, "Waiting", width, height),
            AdminState::Menu => self.draw_menu(canvas, width),
            AdminState::ResponseView => self.draw_response(canvas, Color::Light, width, height),
            AdminState::Error => self.draw_response(canvas, Color::Yellow, width, height),
        }

        let footer = match self.session.state {
            AdminState::PasswordEntry => "Ent:Login Q:Back",
            AdminState::LoggingIn | AdminState::CommandPending => "Q:Cancel",
            AdminState::Menu => "1-6/Ent:Run Q:Back",
            AdminState::ResponseView | AdminState::Error => "W/S:Scroll Q:Back",
        };
        let footer_y = height - 10;
        canvas.set_color(Color::Yellow);
        canvas.fill_rect(0, footer_y - 2, width as u32, 1);
        canvas.print_at(0, footer_y, footer);
    }

    fn draw_header(&self, canvas: &mut dyn Canvas, width: i32) {
        let name = &self.session.name;
        let shown = name
            .char_indices()
            .nth(NAME_MAX_CHARS)
            .map_or(name.as_str(), |(end, _)| &name[..end]);
        canvas.set_color(Color::Green);
        canvas.print_at(0, 1, shown);

        if self.session.state.is_logged_in() {
            let tag = self.session.permission_level().tag();
            canvas.set_color(Color::Yellow);
            canvas.print_at(width - canvas.text_width(tag) as i32, 1, tag);
        }

        canvas.set_color(Color::Green);
        canvas.fill_rect(0, 11, width as u32, 1);
    }

    fn draw_password(&self, canvas: &mut dyn Canvas) {
        canvas.set_color(Color::Light);
        canvas.print_at(0, HEADER_H + 4, "Password:");

        let mut masked: String<{ PASSWORD_MAX_LEN + 1 }> = String::new();
        for _ in 0..self.session.password.len() {
            let _ = masked.push('*');
        }
        let _ = masked.push('_');
        canvas.print_at(0, HEADER_H + 4 + LINE_H, &masked);
    }

    fn draw_waiting(&self, canvas: &mut dyn Canvas, label: &str, width: i32, height: i32) {
        let elapsed = self.clock.now_ms().saturating_sub(self.session.cmd_sent_at);
        let spinner = SPINNER[(elapsed / SPINNER_STEP_MS) as usize % SPINNER.len()];

        let mut line: String<24> = String::new();
        let _ = write!(line, "{} {}", label, spinner);
        let mut secs: String<12> = String::new();
        let _ = write!(secs, "{}s", elapsed / 1000);

        let mid = (HEADER_H + height - FOOTER_H) / 2;
        canvas.set_color(Color::Light);
        for (text, y) in [(line.as_str(), mid - LINE_H), (secs.as_str(), mid)] {
            let x = (width - canvas.text_width(text) as i32) / 2;
            canvas.print_at(x.max(0), y, text);
        }
    }

    fn draw_menu(&self, canvas: &mut dyn Canvas, width: i32) {
        let drift = i64::from(self.clock.current_time()) - i64::from(self.session.server_time);
        let mut status: String<24> = String::new();
        if drift.abs() < SYNCED_DRIFT_S {
            let _ = status.push_str("Synced");
        } else {
            let _ = write!(status, "Drift:{:+}s", drift);
        }
        canvas.set_color(Color::Yellow);
        canvas.print_at(0, HEADER_H + 2, &status);

        let top = HEADER_H + 2 + LINE_H + 2;
        for (i, item) in MenuItem::ALL.iter().enumerate() {
            let y = top + i as i32 * LINE_H;
            let mut row: String<24> = String::new();
            let _ = write!(row, "{} {}", i + 1, item.label());

            if i == self.session.menu_sel {
                canvas.set_color(Color::Light);
                canvas.fill_rect(0, y - 1, width as u32, LINE_H as u32);
                canvas.set_color(Color::Dark);
            } else {
                canvas.set_color(Color::Light);
            }
            canvas.print_at(2, y, &row);
        }
    }

    fn draw_response(&self, canvas: &mut dyn Canvas, color: Color, width: i32, height: i32) {
        let cols = (width / canvas.advance_width().max(1) as i32).max(1) as usize;
        let bottom = height - FOOTER_H;
        let mut y = HEADER_H + 2;

        canvas.set_color(color);
        let lines = wrapped_lines(&self.session.response, cols).skip(self.session.response_scroll);
        for line in lines {
            if y + LINE_H > bottom {
                break;
            }
            canvas.print_at(0, y, line);
            y += LINE_H;
        }
    }

    fn redraw_interval(&self, canvas: &dyn Canvas) -> u32 {
        if !canvas.is_slow_refresh() && self.session.state.is_waiting() {
            self.active_redraw_ms
        } else {
            self.idle_redraw_ms
        }
    }
}

/// Lines of `text` broken at `\n` and at `cols` characters
fn wrapped_lines(text: &str, cols: usize) -> WrappedLines<'_> {
    WrappedLines {
        rest: Some(text),
        cols,
    }
}

struct WrappedLines<'a> {
    rest: Option<&'a str>,
    cols: usize,
}

impl<'a> Iterator for WrappedLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let split = rest[..line_end]
            .char_indices()
            .nth(self.cols)
            .map_or(line_end, |(i, _)| i);

        self.rest = if split < line_end {
            Some(&rest[split..])
        } else if line_end < rest.len() {
            Some(&rest[line_end + 1..])
        } else {
            None
        };
        Some(&rest[..split])
    }
}

impl<M: MeshFacade, C: Clock> RepeaterListener for RepeaterAdminScreen<M, C> {
    fn on_login_result(&mut self, success: bool, permissions: u8, server_time: u32) {
        self.session.waiting_for_login = false;
        if success {
            info!("repeater login ok, permissions {=u8:#x}", permissions);
            self.session.permissions = permissions;
            self.session.server_time = server_time;
            self.apply(AdminEvent::LoginAccepted);
        } else {
            warn!("repeater login rejected");
            self.session.set_response(MSG_LOGIN_FAILED);
            self.apply(AdminEvent::LoginRejected);
        }
    }

    fn on_cli_response(&mut self, text: &str) -> bool {
        if self.session.state != AdminState::CommandPending {
            trace!("late cli response dropped");
            return false;
        }
        self.session.set_response(text);
        self.apply(AdminEvent::ResponseReceived);
        true
    }
}

impl<M: MeshFacade, C: Clock> Screen for RepeaterAdminScreen<M, C> {
    fn render(&mut self, canvas: &mut dyn Canvas) -> u32 {
        self.draw(canvas);
        self.redraw_interval(canvas)
    }

    fn handle_input(&mut self, key: u8) -> bool {
        match self.session.state {
            AdminState::PasswordEntry => self.password_input(key),
            AdminState::LoggingIn | AdminState::CommandPending => {
                self.waiting_input(Key::from_byte(key))
            }
            AdminState::Menu => self.menu_input(Key::from_byte(key)),
            AdminState::ResponseView | AdminState::Error => {
                self.result_input(Key::from_byte(key))
            }
        }
    }

    fn poll(&mut self) -> bool {
        if !self.session.state.is_waiting() {
            return false;
        }
        let elapsed = self.clock.now_ms().saturating_sub(self.session.cmd_sent_at);
        if elapsed <= u64::from(self.timeout_ms) {
            return false;
        }

        warn!("repeater timed out after {=u64} ms", elapsed);
        self.session.waiting_for_login = false;
        self.session.set_response(MSG_TIMEOUT);
        self.apply(AdminEvent::TimedOut);
        true
    }

    fn on_mesh_event(&mut self, event: &MeshEvent<'_>) -> bool {
        event.dispatch(self)
    }
}
