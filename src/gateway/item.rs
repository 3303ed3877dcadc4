//! Item registry: configured devices and their topic wiring
//!
//! An [`Item`] pairs a topic base with one device configuration. The
//! registry is built once at startup, validated, and never mutated; the
//! coordinator walks it every tick.
//!
//! Topic convention (the wire contract): commands arrive on
//! `<base>/cmd`, on/off state is published to `<base>/state`, and
//! temperature readings are published to `<base>` itself with no suffix.

use heapless::String;

use super::error::ConfigError;
use crate::hal::{PinLevel, SensorId};
use crate::net::MAX_TOPIC_LEN;

/// Maximum length of an item's topic base.
///
/// Short enough that any base plus the longest suffix (`/state`) still
/// fits a [`Topic`].
pub const MAX_TOPIC_BASE_LEN: usize = 64;

/// The relay drive level meaning "on". Relay boards here are active-low.
pub const RELAY_ON: PinLevel = PinLevel::Low;

/// The relay drive level meaning "off".
pub const RELAY_OFF: PinLevel = PinLevel::High;

/// A fully assembled topic, base plus optional suffix.
pub type Topic = String<MAX_TOPIC_LEN>;

/// What kind of device an item is, and the pins or handle it owns.
///
/// A pin of `None` leaves that half of the item inert: a relay with no
/// button is command-only, a button with no relay debounces into nothing.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DeviceConfig {
    /// An on/off actuator with an optional paired button.
    OnOff {
        /// Output pin driving the relay, if any.
        relay_pin: Option<u8>,
        /// Active-low button input toggling the relay, if any.
        button_pin: Option<u8>,
    },
    /// A publish-only temperature sensor.
    Temperature {
        /// Handle for the probe driver.
        sensor: SensorId,
    },
}

/// One configured item: a topic base and its device.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Item {
    topic_base: String<MAX_TOPIC_BASE_LEN>,
    device: DeviceConfig,
}

impl Item {
    /// Declare an on/off item.
    pub fn on_off(
        topic_base: &str,
        relay_pin: Option<u8>,
        button_pin: Option<u8>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            topic_base: checked_base(topic_base)?,
            device: DeviceConfig::OnOff {
                relay_pin,
                button_pin,
            },
        })
    }

    /// Declare a temperature sensor item.
    pub fn temperature(topic_base: &str, sensor: SensorId) -> Result<Self, ConfigError> {
        Ok(Self {
            topic_base: checked_base(topic_base)?,
            device: DeviceConfig::Temperature { sensor },
        })
    }

    /// The item's topic base.
    pub fn topic_base(&self) -> &str {
        &self.topic_base
    }

    /// The item's device configuration.
    pub fn device(&self) -> &DeviceConfig {
        &self.device
    }

    /// The topic this item receives commands on (`<base>/cmd`).
    pub fn cmd_topic(&self) -> Topic {
        self.suffixed("/cmd")
    }

    /// The topic this item reports on/off state to (`<base>/state`).
    pub fn state_topic(&self) -> Topic {
        self.suffixed("/state")
    }

    fn suffixed(&self, suffix: &str) -> Topic {
        let mut topic = Topic::new();
        // base (<= 64) plus suffix (<= 6) always fits the 72-byte topic
        topic.push_str(&self.topic_base).unwrap();
        topic.push_str(suffix).unwrap();
        topic
    }
}

fn checked_base(topic_base: &str) -> Result<String<MAX_TOPIC_BASE_LEN>, ConfigError> {
    if topic_base.is_empty() {
        return Err(ConfigError::EmptyTopicBase);
    }
    String::try_from(topic_base).map_err(|_| ConfigError::TopicBaseTooLong)
}

/// The ordered, immutable table of configured items.
///
/// Fixed at construction; lookups by button pin return a valid absence
/// (`None`) for pins no item claims, which callers treat as a no-op.
#[derive(Debug, Clone)]
pub struct ItemTable<const N: usize> {
    items: heapless::Vec<Item, N>,
}

impl<const N: usize> ItemTable<N> {
    /// Build the table, checking that every topic base is unique.
    pub fn new(items: &[Item]) -> Result<Self, ConfigError> {
        let mut table = heapless::Vec::new();
        for item in items {
            if items
                .iter()
                .filter(|other| other.topic_base == item.topic_base)
                .count()
                > 1
            {
                return Err(ConfigError::DuplicateTopicBase);
            }
            table
                .push(item.clone())
                .map_err(|_| ConfigError::TooManyItems)?;
        }
        Ok(Self { items: table })
    }

    /// The configured items, in declaration order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The first item whose button input is `pin`, if any.
    pub fn find_by_button(&self, pin: u8) -> Option<&Item> {
        self.items.iter().find(|item| {
            matches!(
                item.device(),
                DeviceConfig::OnOff {
                    button_pin: Some(button),
                    ..
                } if *button == pin
            )
        })
    }
}
