//! # relaygate - MQTT device gateway core
//!
//! The reconciliation core of a small gateway device that bridges physical
//! I/O (relay outputs, debounced button inputs, digital temperature sensors)
//! to an MQTT broker. Remote clients toggle relays through command topics;
//! button presses and temperature changes are published back as retained
//! state messages. This library is designed for embedded systems and
//! supports `no_std` environments.
//!
//! ## What this crate owns
//!
//! Only the behavioral rules live here: button debouncing, temperature
//! polling with throttling and change detection, the broker session state
//! machine with bounded-rate reconnects, and the per-tick coordination of
//! all of the above. Everything with a wire or a register behind it is an
//! external collaborator reached through a narrow trait:
//!
//! ```text
//! relaygate/
//! ├── hal      - digital I/O, temperature probe and monotonic clock traits
//! ├── net      - MQTT transport trait and inbound message type
//! └── gateway  - items, debounce, temperature, session, coordinator
//! ```
//!
//! ## Usage
//!
//! The host supplies trait implementations and drives [`gateway::Gateway::tick`]
//! on a fixed cadence from its own scheduler:
//!
//! ```rust,no_run
//! use relaygate::gateway::{Gateway, Item, SensorId};
//! use relaygate::net::Credentials;
//! # use relaygate::hal::{DigitalIo, Monotonic, PinLevel, PinMode, TemperatureProbe};
//! # use relaygate::net::{InboundMessage, MqttTransport};
//! # struct Board;
//! # impl DigitalIo for Board {
//! #     type Error = ();
//! #     fn set_mode(&mut self, _: u8, _: PinMode) -> Result<(), ()> { Ok(()) }
//! #     fn read(&mut self, _: u8) -> Result<PinLevel, ()> { Ok(PinLevel::High) }
//! #     fn write(&mut self, _: u8, _: PinLevel) -> Result<(), ()> { Ok(()) }
//! # }
//! # struct Probe;
//! # impl TemperatureProbe for Probe {
//! #     type Error = ();
//! #     fn request(&mut self, _: SensorId) -> Result<(), ()> { Ok(()) }
//! #     fn read_celsius(&mut self, _: SensorId) -> Result<f32, ()> { Ok(21.0) }
//! # }
//! # struct Link;
//! # impl MqttTransport for Link {
//! #     fn connect(&mut self, _: &str, _: &str, _: &str) -> Result<(), relaygate::net::Error> { Ok(()) }
//! #     fn is_connected(&self) -> bool { true }
//! #     fn subscribe(&mut self, _: &str) -> Result<(), relaygate::net::Error> { Ok(()) }
//! #     fn publish(&mut self, _: &str, _: &[u8], _: bool) -> Result<(), relaygate::net::Error> { Ok(()) }
//! #     fn poll(&mut self) -> Result<Option<InboundMessage>, relaygate::net::Error> { Ok(None) }
//! # }
//! # struct Ticker;
//! # impl Monotonic for Ticker { fn now_millis(&self) -> u32 { 0 } }
//!
//! let items = [
//!     Item::on_off("room/light", Some(5), Some(3)).unwrap(),
//!     Item::temperature("room/temp", SensorId(0)).unwrap(),
//! ];
//! let credentials = Credentials {
//!     client_id: "relaygate",
//!     user: "mqtt",
//!     password: "secret",
//! };
//!
//! let mut gateway: Gateway<_, _, _, _, 8> =
//!     Gateway::new(&items, credentials, Board, Probe, Link, Ticker).unwrap();
//! gateway.setup();
//!
//! loop {
//!     gateway.tick();
//!     // host scheduler sleeps here
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Hardware abstraction layer: digital I/O, temperature probes and the
/// monotonic millisecond clock the timing gates are built on.
pub mod hal;

/// Network abstraction layer: the MQTT transport trait consumed by the
/// session manager and the inbound message type it delivers.
pub mod net;

/// The gateway core: item registry, debounce tracking, temperature
/// polling, broker session management and the per-tick coordinator.
pub mod gateway;
