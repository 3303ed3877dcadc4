//! Common error types for transport operations

/// A common error type for MQTT transport operations.
///
/// This enum defines a set of errors a transport implementation can
/// report to the session layer. It is designed to be simple and portable
/// for `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted while the transport is not connected.
    NotConnected,
    /// A connection attempt was refused by the broker.
    ConnectionRefused,
    /// The connection was closed by the peer.
    ConnectionClosed,
    /// The broker rejected or the transport failed a subscribe.
    SubscribeError,
    /// The transport failed to publish a message.
    PublishError,
    /// An error occurred while polling for inbound messages.
    ReadError,
    /// A protocol-level error occurred on the wire.
    ProtocolError,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::SubscribeError => defmt::write!(f, "SubscribeError"),
            Error::PublishError => defmt::write!(f, "PublishError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
        }
    }
}
