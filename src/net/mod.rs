//! Network abstraction layer for the gateway core
//!
//! The core does not speak MQTT on the wire. The host supplies an
//! implementation of [`MqttTransport`] over its client of choice and the
//! session manager drives it: connect with credentials, subscribe to
//! command topics, publish retained state, and poll for inbound command
//! messages. Connection failures are reported as values, never as
//! panics; the session layer treats them as retryable.
//!
//! Inbound delivery is pull-based: [`MqttTransport::poll`] hands back at
//! most one [`InboundMessage`] per call and the coordinator pumps it dry
//! each tick. There is no callback registration and no global binding.

#![deny(unsafe_code)]

use heapless::{String, Vec};

/// Common error types for transport operations
pub mod error;

pub use error::Error;

/// Maximum length of a full topic (base plus `/cmd` or `/state` suffix).
pub const MAX_TOPIC_LEN: usize = 72;

/// Maximum accepted inbound payload length.
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Broker credentials presented on every connection attempt.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// The client identifier, must be unique per broker.
    pub client_id: &'a str,
    /// Broker username.
    pub user: &'a str,
    /// Broker password.
    pub password: &'a str,
}

/// An inbound publish delivered by the transport.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct InboundMessage {
    /// The topic the message arrived on.
    pub topic: String<MAX_TOPIC_LEN>,
    /// The raw payload bytes.
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

/// A non-blocking MQTT transport.
///
/// Implementations wrap a concrete MQTT client. All methods are expected
/// to return promptly; the core calls them from a cooperative tick loop.
pub trait MqttTransport {
    /// Attempt to establish a session with the broker.
    fn connect(&mut self, client_id: &str, user: &str, password: &str) -> Result<(), Error>;

    /// Whether a broker session is currently established.
    fn is_connected(&self) -> bool;

    /// Subscribe to a topic on the current session.
    fn subscribe(&mut self, topic: &str) -> Result<(), Error>;

    /// Publish a message, optionally retained by the broker.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Error>;

    /// Poll for one pending inbound message.
    ///
    /// Returns `Ok(None)` when nothing is queued.
    fn poll(&mut self) -> Result<Option<InboundMessage>, Error>;
}
