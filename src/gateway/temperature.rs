//! Temperature polling with throttling and change detection
//!
//! Sensor values are noisy and slow to convert, and every accepted
//! reading turns into broker traffic. The monitor therefore applies
//! three filters before anything is published:
//!
//! 1. a single shared poll gate - the whole sensor pass runs at most
//!    once per [`POLL_INTERVAL_MS`], regardless of sensor count;
//! 2. a validity window - readings outside `(-127, 85)` degrees Celsius
//!    are discarded (the bus reports -127.0 for a disconnected probe);
//! 3. a change filter - a reading is reported only when it differs from
//!    the previous one after rounding to a tenth of a degree, so
//!    sub-0.1 degree jitter never floods a topic.

use heapless::String;

use super::item::MAX_TOPIC_BASE_LEN;
use crate::hal::{elapsed, SensorId};

/// Minimum spacing between two sensor passes.
pub const POLL_INTERVAL_MS: u32 = 5_000;

/// The probe's "never read / disconnected" sentinel.
pub const DISCONNECTED_C: f32 = -127.0;

/// Upper bound (exclusive) of the probe's documented valid range.
pub const VALID_MAX_C: f32 = 85.0;

/// Per-sensor reporting state.
#[derive(Debug, Clone)]
pub struct SensorState {
    sensor: SensorId,
    last_celsius: f32,
    topic_base: String<MAX_TOPIC_BASE_LEN>,
}

impl SensorState {
    /// Track one sensor publishing to `topic_base`.
    pub fn new(sensor: SensorId, topic_base: &str) -> Self {
        Self {
            sensor,
            last_celsius: DISCONNECTED_C,
            topic_base: String::try_from(topic_base).unwrap_or_default(),
        }
    }

    /// The probe handle.
    pub fn sensor(&self) -> SensorId {
        self.sensor
    }

    /// The topic readings are published to (the base itself, no suffix).
    pub fn topic_base(&self) -> &str {
        &self.topic_base
    }

    /// The last accepted reading, or [`DISCONNECTED_C`] if none yet.
    pub fn last_celsius(&self) -> f32 {
        self.last_celsius
    }

    /// Run a raw reading through the validity and change filters.
    ///
    /// Returns `true` when the reading should be published, in which
    /// case it is stored (unrounded) as the new last value.
    pub fn record(&mut self, celsius: f32) -> bool {
        if celsius <= DISCONNECTED_C || celsius >= VALID_MAX_C {
            return false;
        }
        if round_tenths(celsius) == round_tenths(self.last_celsius) {
            return false;
        }
        self.last_celsius = celsius;
        true
    }
}

/// The sensor arena plus the shared poll gate.
#[derive(Debug)]
pub struct TemperatureMonitor<const N: usize> {
    sensors: heapless::Vec<SensorState, N>,
    last_poll: u32,
}

impl<const N: usize> TemperatureMonitor<N> {
    /// An empty monitor whose first pass becomes due after one interval.
    pub fn new(now: u32) -> Self {
        Self {
            sensors: heapless::Vec::new(),
            last_poll: now,
        }
    }

    /// Register a sensor. Silently ignored beyond capacity; the
    /// coordinator sizes the arena to the item table, so it never is.
    pub fn add(&mut self, state: SensorState) {
        self.sensors.push(state).ok();
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether no sensors are registered.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// The registered sensor states.
    pub fn sensors(&self) -> &[SensorState] {
        &self.sensors
    }

    /// The probe handle of the sensor at `index`.
    pub fn sensor_at(&self, index: usize) -> SensorId {
        self.sensors[index].sensor()
    }

    /// Whether a sensor pass is due.
    pub fn poll_due(&self, now: u32) -> bool {
        elapsed(now, self.last_poll) >= POLL_INTERVAL_MS
    }

    /// Close the gate after a pass.
    pub fn mark_polled(&mut self, now: u32) {
        self.last_poll = now;
    }

    /// Filter a reading for the sensor at `index`; see [`SensorState::record`].
    pub fn record(&mut self, index: usize, celsius: f32) -> bool {
        self.sensors[index].record(celsius)
    }
}

/// Round to the nearest tenth of a degree, expressed in tenths.
///
/// Half-away-from-zero, so a reading exactly on a .05 boundary rounds
/// away from zero. `f32::round` itself is not available in `core`.
fn round_tenths(celsius: f32) -> i32 {
    let scaled = celsius * 10.0;
    if scaled >= 0.0 {
        (scaled + 0.5) as i32
    } else {
        (scaled - 0.5) as i32
    }
}
