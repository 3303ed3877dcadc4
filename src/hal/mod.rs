//! Hardware abstraction layer for the gateway core
//!
//! The gateway never touches a register directly. The host platform
//! implements these traits over whatever pin driver, one-wire stack and
//! timer it has, and the core calls through them. All traits are
//! synchronous and expected to be non-blocking or bounded; the core is
//! driven by a cooperative tick loop and never waits.
//!
//! Time is a wrapping 32-bit millisecond counter, the convention of most
//! embedded tick timers. Every "has this interval elapsed" comparison in
//! the crate goes through [`elapsed`], which stays correct across the
//! counter rolling over.

#![deny(unsafe_code)]

/// Re-exports of the hardware traits for convenient importing
pub mod prelude {
    pub use super::{DigitalIo, Monotonic, TemperatureProbe};
}

/// Logic level of a digital pin.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PinLevel {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

impl PinLevel {
    /// The opposite level, for read-modify-write toggles.
    pub fn toggled(self) -> Self {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PinLevel {
    fn format(&self, f: defmt::Formatter) {
        match self {
            PinLevel::Low => defmt::write!(f, "Low"),
            PinLevel::High => defmt::write!(f, "High"),
        }
    }
}

/// Direction and input circuit configuration of a digital pin.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PinMode {
    /// Floating input.
    Input,
    /// Input with the internal pull-up enabled. Buttons are wired
    /// active-low against this.
    InputPullup,
    /// Push-pull output.
    Output,
}

/// Opaque handle identifying one temperature sensor on the host's bus.
///
/// The core never interprets the value; it is handed back to the
/// [`TemperatureProbe`] implementation on every request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SensorId(pub u8);

/// Digital pin access.
pub trait DigitalIo {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Configure a pin's mode.
    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error>;

    /// Read the current level of a pin.
    fn read(&mut self, pin: u8) -> Result<PinLevel, Self::Error>;

    /// Drive an output pin to a level.
    fn write(&mut self, pin: u8, level: PinLevel) -> Result<(), Self::Error>;
}

/// Digital temperature sensor access.
pub trait TemperatureProbe {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Start a conversion on the sensor.
    fn request(&mut self, sensor: SensorId) -> Result<(), Self::Error>;

    /// Read the last converted value in degrees Celsius.
    ///
    /// Implementations for sensors with a "disconnected" sentinel (the
    /// DS18B20 reports -127.0) may return it here; the core filters such
    /// readings out and never publishes them.
    fn read_celsius(&mut self, sensor: SensorId) -> Result<f32, Self::Error>;
}

/// Monotonic millisecond time source.
///
/// The counter wraps at `u32::MAX`; callers must compare instants with
/// [`elapsed`], never with plain subtraction or ordering.
pub trait Monotonic {
    /// Current value of the millisecond counter.
    fn now_millis(&self) -> u32;
}

/// Milliseconds elapsed between a past instant and `now`, correct across
/// counter wraparound.
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
