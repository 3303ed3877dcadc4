//! Device-state reconciliation core
//!
//! This module maps a declarative list of configured items (relay plus
//! button pairs, temperature sensors) onto pin operations, MQTT topic
//! subscriptions and publications, and periodic polling with debounce and
//! throttling.
//!
//! ```text
//! gateway/
//! ├── item.rs         - item registry and topic wiring
//! ├── debounce.rs     - stable-edge extraction for button inputs
//! ├── temperature.rs  - sensor polling with throttle and change filter
//! ├── session.rs      - broker session state machine and publishing
//! └── coordinator.rs  - the per-tick orchestration of all of the above
//! ```
//!
//! # Tick model
//!
//! [`Gateway::tick`] is invoked on a fixed cadence by the host scheduler
//! and runs to completion: session health first, then inbound command
//! dispatch, then button debouncing, then sensor polling. Later stages
//! never observe a session the earlier stages have not reconciled.
//!
//! # Failure semantics
//!
//! A single item's failure never aborts the pass. Hardware and transport
//! errors are logged and the offending item is skipped for that tick;
//! misconfigured halves of an item (a relay with no button, a button with
//! no relay) are simply inert. Broker loss is retried on a 60 second gate,
//! indefinitely.

/// Item registry: configured devices and their topic wiring.
pub mod item;

/// Debounce tracking for noisy button inputs.
pub mod debounce;

/// Temperature polling with throttling and change detection.
pub mod temperature;

/// Broker session state machine, command routing and publishing.
pub mod session;

/// The per-tick coordinator tying the components together.
pub mod coordinator;

/// Configuration error types.
pub mod error;

pub use crate::hal::SensorId;
pub use coordinator::Gateway;
pub use debounce::{Debouncer, STABILITY_WINDOW_MS};
pub use error::ConfigError;
pub use item::{DeviceConfig, Item, ItemTable, RELAY_OFF, RELAY_ON};
pub use session::{Phase, RelayCommand, Session, RECONNECT_INTERVAL_MS};
pub use temperature::{SensorState, TemperatureMonitor, POLL_INTERVAL_MS};
