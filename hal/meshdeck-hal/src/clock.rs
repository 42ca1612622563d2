//! Time sources
//!
//! Screens need two notions of time: wall-clock epoch seconds (message
//! timestamps, repeater clock drift) and a monotonic millisecond tick
//! (timeouts, redraw scheduling).

use core::cell::Cell;

/// Clock abstraction
pub trait Clock {
    /// Current wall-clock time in epoch seconds
    fn current_time(&self) -> u32;

    /// Monotonic milliseconds since boot
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn current_time(&self) -> u32 {
        (**self).current_time()
    }

    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Manually driven clock
///
/// Used by host tests and simulation. Both counters only move when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    epoch_s: Cell<u32>,
    uptime_ms: Cell<u64>,
}

impl ManualClock {
    /// Create a clock at the given epoch seconds and uptime
    pub const fn new(epoch_s: u32, uptime_ms: u64) -> Self {
        Self {
            epoch_s: Cell::new(epoch_s),
            uptime_ms: Cell::new(uptime_ms),
        }
    }

    /// Set the wall-clock time
    pub fn set_epoch(&self, epoch_s: u32) {
        self.epoch_s.set(epoch_s);
    }

    /// Advance the monotonic tick only
    pub fn advance_ms(&self, delta_ms: u64) {
        self.uptime_ms.set(self.uptime_ms.get().saturating_add(delta_ms));
    }

    /// Advance both counters by whole seconds
    pub fn advance_secs(&self, delta_s: u32) {
        self.epoch_s.set(self.epoch_s.get().saturating_add(delta_s));
        self.advance_ms(u64::from(delta_s) * 1000);
    }
}

impl Clock for ManualClock {
    fn current_time(&self) -> u32 {
        self.epoch_s.get()
    }

    fn now_ms(&self) -> u64 {
        self.uptime_ms.get()
    }
}

/// Clock backed by the embassy time driver
///
/// The monotonic tick comes from `embassy_time::Instant`. Epoch seconds are
/// derived from the last RTC/mesh time sync recorded with [`set_epoch`].
///
/// [`set_epoch`]: EmbassyClock::set_epoch
#[cfg(feature = "embassy")]
#[derive(Debug, Default)]
pub struct EmbassyClock {
    epoch_base_s: Cell<u32>,
    synced_at_ms: Cell<u64>,
}

#[cfg(feature = "embassy")]
impl EmbassyClock {
    /// Create an unsynced clock (epoch starts at zero)
    pub const fn new() -> Self {
        Self {
            epoch_base_s: Cell::new(0),
            synced_at_ms: Cell::new(0),
        }
    }

    /// Record the wall-clock time as of now
    pub fn set_epoch(&self, epoch_s: u32) {
        self.epoch_base_s.set(epoch_s);
        self.synced_at_ms.set(embassy_time::Instant::now().as_millis());
    }
}

#[cfg(feature = "embassy")]
impl Clock for EmbassyClock {
    fn current_time(&self) -> u32 {
        let since_sync_s = self.now_ms().saturating_sub(self.synced_at_ms.get()) / 1000;
        self.epoch_base_s
            .get()
            .saturating_add(since_sync_s.min(u64::from(u32::MAX)) as u32)
    }

    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
