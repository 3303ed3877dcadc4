//! Broker session state machine, command routing and publishing
//!
//! The session is a two-phase machine, `Disconnected` and `Connected`,
//! reconciled against what the transport reports each tick. Reconnect
//! attempts are gated to one per [`RECONNECT_INTERVAL_MS`] so a dead
//! broker is never hammered; the attempt timestamp is stamped whether or
//! not the attempt succeeds. A successful connect immediately subscribes
//! the command topic of every on/off item - temperature items are
//! publish-only and never subscribe.
//!
//! All publishes are retained, so a subscriber connecting later
//! immediately learns the last known state of every topic.

use log::{info, warn};
use serde::Serialize;

use super::item::{DeviceConfig, Item, ItemTable, RELAY_OFF, RELAY_ON};
use crate::hal::{elapsed, PinLevel};
use crate::net::{Credentials, Error, MqttTransport};

/// Minimum spacing between two broker connection attempts.
pub const RECONNECT_INTERVAL_MS: u32 = 60_000;

/// Broker session phase.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Phase {
    /// No session established.
    #[default]
    Disconnected,
    /// A session is established and command topics are subscribed.
    Connected,
}

/// A relay write decoded from an inbound command message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RelayCommand {
    /// The relay output pin to drive.
    pub pin: u8,
    /// The level to drive it to.
    pub level: PinLevel,
}

#[derive(Serialize)]
struct TemperatureReport {
    temperature: f32,
}

/// The broker session manager.
#[derive(Debug)]
pub struct Session<'a> {
    credentials: Credentials<'a>,
    phase: Phase,
    last_attempt: u32,
}

impl<'a> Session<'a> {
    /// A disconnected session that will present `credentials` on every
    /// connection attempt.
    pub fn new(credentials: Credentials<'a>) -> Self {
        Self {
            credentials,
            phase: Phase::Disconnected,
            last_attempt: 0,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the last connection attempt was made.
    pub fn last_attempt(&self) -> u32 {
        self.last_attempt
    }

    /// Reconcile the phase with the transport, retrying behind the gate.
    ///
    /// A healthy session is a no-op. A lost session drops the phase back
    /// to `Disconnected`; a reconnect is attempted only once
    /// [`RECONNECT_INTERVAL_MS`] has elapsed since the previous attempt.
    pub fn ensure_connected<T: MqttTransport, const N: usize>(
        &mut self,
        transport: &mut T,
        items: &ItemTable<N>,
        now: u32,
    ) {
        if transport.is_connected() {
            self.phase = Phase::Connected;
            return;
        }
        if self.phase == Phase::Connected {
            warn!("mqtt session lost");
            self.phase = Phase::Disconnected;
        }
        if elapsed(now, self.last_attempt) >= RECONNECT_INTERVAL_MS {
            self.connect(transport, items, now);
        }
    }

    /// Attempt a connection now, ignoring the gate, and stamp the attempt.
    ///
    /// Used for the initial connect at setup; `ensure_connected` applies
    /// the gate for every attempt after that. Failure is logged and left
    /// for the next gated retry - never fatal.
    pub fn connect<T: MqttTransport, const N: usize>(
        &mut self,
        transport: &mut T,
        items: &ItemTable<N>,
        now: u32,
    ) {
        self.last_attempt = now;
        info!("connecting to mqtt broker as {}", self.credentials.client_id);
        match transport.connect(
            self.credentials.client_id,
            self.credentials.user,
            self.credentials.password,
        ) {
            Ok(()) => {
                self.subscribe_commands(transport, items);
                self.phase = Phase::Connected;
                info!("mqtt session established");
            }
            Err(e) => {
                self.phase = Phase::Disconnected;
                warn!("mqtt connect failed: {:?}, retrying after gate", e);
            }
        }
    }

    fn subscribe_commands<T: MqttTransport, const N: usize>(
        &mut self,
        transport: &mut T,
        items: &ItemTable<N>,
    ) {
        for item in items.items() {
            if let DeviceConfig::OnOff { .. } = item.device() {
                let topic = item.cmd_topic();
                if let Err(e) = transport.subscribe(&topic) {
                    warn!("subscribe to {} failed: {:?}", topic.as_str(), e);
                }
            }
        }
    }

    /// Decode an inbound message into a relay write, if it is one.
    ///
    /// Matches the topic against every on/off item's command topic and
    /// the payload against the exact ASCII literals `on` and `off`.
    /// Anything else - unmatched topic, temperature item, unknown
    /// payload, item without a relay pin - is a silent `None`.
    pub fn route<const N: usize>(
        items: &ItemTable<N>,
        topic: &str,
        payload: &[u8],
    ) -> Option<RelayCommand> {
        let item = items.items().iter().find(|item| {
            matches!(item.device(), DeviceConfig::OnOff { .. }) && item.cmd_topic().as_str() == topic
        })?;
        let DeviceConfig::OnOff {
            relay_pin: Some(pin),
            ..
        } = item.device()
        else {
            return None;
        };
        let level = match payload {
            b"on" => RELAY_ON,
            b"off" => RELAY_OFF,
            _ => return None,
        };
        Some(RelayCommand { pin: *pin, level })
    }

    /// Publish an item's on/off state, retained, to `<base>/state`.
    pub fn publish_on_off<T: MqttTransport>(
        &mut self,
        transport: &mut T,
        item: &Item,
        level: PinLevel,
    ) -> Result<(), Error> {
        let payload: &[u8] = if level == RELAY_OFF { b"off" } else { b"on" };
        transport.publish(&item.state_topic(), payload, true)
    }

    /// Publish a temperature reading, retained, to the topic base itself.
    ///
    /// The payload is `{"temperature": <value>}` carrying the raw,
    /// unrounded reading.
    pub fn publish_temperature<T: MqttTransport>(
        &mut self,
        transport: &mut T,
        topic_base: &str,
        celsius: f32,
    ) -> Result<(), Error> {
        let report = TemperatureReport {
            temperature: celsius,
        };
        let mut buf = [0u8; 48];
        let len =
            serde_json_core::to_slice(&report, &mut buf).map_err(|_| Error::PublishError)?;
        transport.publish(topic_base, &buf[..len], true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::item::Item;
    use crate::hal::SensorId;

    fn table() -> ItemTable<4> {
        let items = [
            Item::on_off("room/light", Some(5), Some(3)).unwrap(),
            Item::on_off("hall/socket", None, Some(7)).unwrap(),
            Item::temperature("room/temp", SensorId(0)).unwrap(),
        ];
        ItemTable::new(&items).unwrap()
    }

    #[test]
    fn on_and_off_payloads_route_to_relay_levels() {
        let items = table();
        assert_eq!(
            Session::route(&items, "room/light/cmd", b"on"),
            Some(RelayCommand {
                pin: 5,
                level: RELAY_ON
            })
        );
        assert_eq!(
            Session::route(&items, "room/light/cmd", b"off"),
            Some(RelayCommand {
                pin: 5,
                level: RELAY_OFF
            })
        );
    }

    #[test]
    fn unknown_payloads_are_silently_ignored() {
        let items = table();
        assert_eq!(Session::route(&items, "room/light/cmd", b"toggle"), None);
        assert_eq!(Session::route(&items, "room/light/cmd", b"ON"), None);
        assert_eq!(Session::route(&items, "room/light/cmd", b"on "), None);
        assert_eq!(Session::route(&items, "room/light/cmd", b""), None);
    }

    #[test]
    fn unmatched_topics_are_silently_ignored() {
        let items = table();
        assert_eq!(Session::route(&items, "room/light/state", b"on"), None);
        assert_eq!(Session::route(&items, "room/temp/cmd", b"on"), None);
        assert_eq!(Session::route(&items, "other/cmd", b"on"), None);
    }

    #[test]
    fn items_without_a_relay_pin_are_inert() {
        let items = table();
        assert_eq!(Session::route(&items, "hall/socket/cmd", b"on"), None);
    }
}
