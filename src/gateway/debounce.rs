//! Debounce tracking for noisy button inputs
//!
//! Mechanical switches bounce: one physical press produces a burst of
//! edges. The [`Debouncer`] keeps a raw level and a stable level per pin
//! and only flips the stable level once the raw level has held unchanged
//! for the stability window. Buttons are wired active-low behind a
//! pull-up, so only the stable transition to `Low` counts as a press;
//! the release edge is silent.

use crate::hal::{elapsed, PinLevel};

/// How long a raw level must hold before it becomes the stable level.
pub const STABILITY_WINDOW_MS: u32 = 100;

/// Per-pin two-level debounce state.
///
/// Created once at setup for every configured button pin and updated
/// every tick with the pin's raw reading.
#[derive(Debug, Clone)]
pub struct Debouncer {
    pin: u8,
    stable: PinLevel,
    last_raw: PinLevel,
    last_change: u32,
}

impl Debouncer {
    /// Track `pin`, assuming the pull-up idle level until told otherwise.
    pub fn new(pin: u8, now: u32) -> Self {
        Self {
            pin,
            stable: PinLevel::High,
            last_raw: PinLevel::High,
            last_change: now,
        }
    }

    /// The pin this tracker watches.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// The current stable level.
    pub fn stable(&self) -> PinLevel {
        self.stable
    }

    /// Record a raw reading; returns `true` on a debounced press.
    ///
    /// A reading that differs from the previous raw reading restarts the
    /// window. A reading that differs from the stable level and has held
    /// for [`STABILITY_WINDOW_MS`] flips the stable level; the flip is
    /// reported as a press only when the new level is `Low`.
    pub fn update(&mut self, raw: PinLevel, now: u32) -> bool {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change = now;
            return false;
        }
        if raw != self.stable && elapsed(now, self.last_change) >= STABILITY_WINDOW_MS {
            self.stable = raw;
            return raw == PinLevel::Low;
        }
        false
    }
}
