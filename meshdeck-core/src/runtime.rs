//! Screen runtime
//!
//! Owns the active screen, forwards key bytes to it, polls it between keys
//! and redraws it no more often than the screen asks for. Everything runs
//! on one cooperative context; no screen method is reentered.

use meshdeck_display::Canvas;
use meshdeck_hal::Clock;
use meshdeck_protocol::Key;

use crate::mesh::MeshEvent;

/// A full-screen UI page
pub trait Screen {
    /// Draw a full frame; returns the delay in ms before the next redraw
    fn render(&mut self, canvas: &mut dyn Canvas) -> u32;

    /// Handle a key byte; returns whether visible state changed
    ///
    /// An unhandled `Q` tells the runtime to leave the screen.
    fn handle_input(&mut self, key: u8) -> bool;

    /// Called on ticks without a key; returns whether visible state changed
    fn poll(&mut self) -> bool {
        false
    }

    /// Inbound mesh traffic; returns whether the screen took it
    fn on_mesh_event(&mut self, _event: &MeshEvent<'_>) -> bool {
        false
    }

    /// Whether the screen is finished and should be closed
    fn wants_close(&self) -> bool {
        false
    }
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn render(&mut self, canvas: &mut dyn Canvas) -> u32 {
        (**self).render(canvas)
    }

    fn handle_input(&mut self, key: u8) -> bool {
        (**self).handle_input(key)
    }

    fn poll(&mut self) -> bool {
        (**self).poll()
    }

    fn on_mesh_event(&mut self, event: &MeshEvent<'_>) -> bool {
        (**self).on_mesh_event(event)
    }

    fn wants_close(&self) -> bool {
        (**self).wants_close()
    }
}

/// Result of one runtime tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Nothing to draw yet
    Idle,
    /// A frame was drawn and flushed
    Redrawn,
    /// The screen is done; the caller should leave it
    Pop,
}

/// Drives one active screen
pub struct ScreenRuntime<S, C> {
    screen: S,
    clock: C,
    next_redraw_at: Option<u64>,
}

impl<S: Screen, C: Clock> ScreenRuntime<S, C> {
    /// Run `screen`; the first tick draws it
    pub fn new(screen: S, clock: C) -> Self {
        Self {
            screen,
            clock,
            next_redraw_at: None,
        }
    }

    /// Active screen
    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Active screen, mutably
    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Stop running and return the screen
    pub fn into_screen(self) -> S {
        self.screen
    }

    /// Swap in another screen; returns the previous one
    pub fn replace(&mut self, screen: S) -> S {
        self.request_redraw();
        core::mem::replace(&mut self.screen, screen)
    }

    /// Draw on the next tick regardless of the interval
    pub fn request_redraw(&mut self) {
        self.next_redraw_at = None;
    }

    /// Hand mesh traffic to the screen; returns whether it was taken
    pub fn deliver(&mut self, event: &MeshEvent<'_>) -> bool {
        let taken = self.screen.on_mesh_event(event);
        if taken {
            self.request_redraw();
        }
        taken
    }

    /// Process one key (if any) and redraw when due
    pub fn tick(&mut self, canvas: &mut dyn Canvas, key: Option<u8>) -> TickOutcome {
        match key {
            Some(byte) => {
                if self.screen.handle_input(byte) {
                    self.request_redraw();
                } else if Key::from_byte(byte) == Key::Quit {
                    debug!("screen closed by key");
                    return TickOutcome::Pop;
                }
            }
            None => {
                if self.screen.poll() {
                    self.request_redraw();
                }
            }
        }

        if self.screen.wants_close() {
            debug!("screen finished");
            return TickOutcome::Pop;
        }

        let now = self.clock.now_ms();
        if let Some(at) = self.next_redraw_at {
            if now < at {
                return TickOutcome::Idle;
            }
        }

        let interval = self.screen.render(canvas);
        if let Err(e) = canvas.flush() {
            warn!("display flush failed: {}", e);
        }
        self.next_redraw_at = Some(now + u64::from(interval));
        TickOutcome::Redrawn
    }
}
