//! The per-tick coordinator tying the components together
//!
//! [`Gateway`] exclusively owns the item table, the debouncer arena, the
//! temperature monitor, the session and the four collaborators. There is
//! no shared or global state; the host constructs one gateway and drives
//! it from a single thread of control.
//!
//! Each tick runs four stages, in order: reconcile the broker session,
//! pump inbound command messages, advance button debouncing, advance
//! sensor polling. The clock is sampled once at the top of the tick.

use log::{debug, warn};

use super::debounce::Debouncer;
use super::error::ConfigError;
use super::item::{DeviceConfig, Item, ItemTable, RELAY_OFF};
use super::session::Session;
use super::temperature::{SensorState, TemperatureMonitor};
use crate::hal::{DigitalIo, Monotonic, PinMode, TemperatureProbe};
use crate::net::{Credentials, MqttTransport};

/// The gateway coordinator.
///
/// Generic over the host's digital I/O, temperature probe, MQTT
/// transport and clock; `N` bounds the number of configured items.
#[derive(Debug)]
pub struct Gateway<'a, IO, P, T, C, const N: usize>
where
    IO: DigitalIo,
    P: TemperatureProbe,
    T: MqttTransport,
    C: Monotonic,
{
    items: ItemTable<N>,
    debouncers: heapless::Vec<Debouncer, N>,
    monitor: TemperatureMonitor<N>,
    session: Session<'a>,
    io: IO,
    probe: P,
    transport: T,
    clock: C,
}

impl<'a, IO, P, T, C, const N: usize> Gateway<'a, IO, P, T, C, N>
where
    IO: DigitalIo,
    P: TemperatureProbe,
    T: MqttTransport,
    C: Monotonic,
{
    /// Build a gateway over a validated copy of `items`.
    ///
    /// Fails only on configuration errors (too many items, duplicate or
    /// empty topic bases). No hardware is touched until [`Self::setup`].
    pub fn new(
        items: &[Item],
        credentials: Credentials<'a>,
        io: IO,
        probe: P,
        transport: T,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let items = ItemTable::new(items)?;
        let now = clock.now_millis();
        Ok(Self {
            items,
            debouncers: heapless::Vec::new(),
            monitor: TemperatureMonitor::new(now),
            session: Session::new(credentials),
            io,
            probe,
            transport,
            clock,
        })
    }

    /// Configure pins, build the tracker arenas and connect once.
    ///
    /// Relays are driven to the released level before being switched to
    /// output so they never glitch on at boot. A pin that fails to
    /// configure is logged and its half of the item left inert; setup
    /// itself never fails. Ends with one ungated connection attempt, so
    /// a reachable broker is subscribed before the first tick.
    pub fn setup(&mut self) {
        let now = self.clock.now_millis();
        for item in self.items.items() {
            match item.device() {
                DeviceConfig::OnOff {
                    relay_pin,
                    button_pin,
                } => {
                    if let Some(pin) = relay_pin {
                        if let Err(e) = self.io.write(*pin, RELAY_OFF) {
                            warn!("relay init write on pin {} failed: {:?}", pin, e);
                        }
                        if let Err(e) = self.io.set_mode(*pin, PinMode::Output) {
                            warn!("relay mode on pin {} failed: {:?}", pin, e);
                        }
                    }
                    if let Some(pin) = button_pin {
                        if let Err(e) = self.io.set_mode(*pin, PinMode::InputPullup) {
                            warn!("button mode on pin {} failed: {:?}", pin, e);
                        }
                        // arena capacity matches the item table, cannot overflow
                        self.debouncers.push(Debouncer::new(*pin, now)).ok();
                    }
                }
                DeviceConfig::Temperature { sensor } => {
                    self.monitor
                        .add(SensorState::new(*sensor, item.topic_base()));
                }
            }
        }
        self.session.connect(&mut self.transport, &self.items, now);
    }

    /// Run one reconciliation pass.
    pub fn tick(&mut self) {
        let now = self.clock.now_millis();
        self.session
            .ensure_connected(&mut self.transport, &self.items, now);
        self.pump_commands();
        self.scan_buttons(now);
        self.scan_sensors(now);
    }

    /// The configured items.
    pub fn items(&self) -> &ItemTable<N> {
        &self.items
    }

    /// The broker session state.
    pub fn session(&self) -> &Session<'a> {
        &self.session
    }

    /// Drain inbound messages and apply any relay commands they carry.
    fn pump_commands(&mut self) {
        loop {
            match self.transport.poll() {
                Ok(Some(msg)) => {
                    debug!("message arrived on {}", msg.topic.as_str());
                    let Some(cmd) = Session::route(&self.items, &msg.topic, &msg.payload) else {
                        continue;
                    };
                    if let Err(e) = self.io.write(cmd.pin, cmd.level) {
                        warn!("relay write on pin {} failed: {:?}", cmd.pin, e);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("inbound poll failed: {:?}", e);
                    break;
                }
            }
        }
    }

    /// Advance every debouncer; toggle and report on debounced presses.
    fn scan_buttons(&mut self, now: u32) {
        for i in 0..self.debouncers.len() {
            let pin = self.debouncers[i].pin();
            let raw = match self.io.read(pin) {
                Ok(level) => level,
                Err(e) => {
                    warn!("button read on pin {} failed: {:?}", pin, e);
                    continue;
                }
            };
            if !self.debouncers[i].update(raw, now) {
                continue;
            }
            let Some(item) = self.items.find_by_button(pin) else {
                continue;
            };
            let DeviceConfig::OnOff {
                relay_pin: Some(relay),
                ..
            } = item.device()
            else {
                continue;
            };
            // read-modify-write: a press toggles whatever the relay
            // currently drives, it does not set a fixed target
            let current = match self.io.read(*relay) {
                Ok(level) => level,
                Err(e) => {
                    warn!("relay read on pin {} failed: {:?}", relay, e);
                    continue;
                }
            };
            let next = current.toggled();
            if let Err(e) = self.io.write(*relay, next) {
                warn!("relay write on pin {} failed: {:?}", relay, e);
                continue;
            }
            if let Err(e) = self
                .session
                .publish_on_off(&mut self.transport, item, next)
            {
                warn!("state publish for {} failed: {:?}", item.topic_base(), e);
            }
        }
    }

    /// Run one sensor pass if the shared poll gate has opened.
    fn scan_sensors(&mut self, now: u32) {
        if self.monitor.is_empty() || !self.monitor.poll_due(now) {
            return;
        }
        for i in 0..self.monitor.len() {
            let sensor = self.monitor.sensor_at(i);
            if let Err(e) = self.probe.request(sensor) {
                warn!("conversion request for sensor {:?} failed: {:?}", sensor, e);
                continue;
            }
            let celsius = match self.probe.read_celsius(sensor) {
                Ok(c) => c,
                Err(e) => {
                    warn!("read from sensor {:?} failed: {:?}", sensor, e);
                    continue;
                }
            };
            debug!("sensor {:?} reads {} C", sensor, celsius);
            if self.monitor.record(i, celsius) {
                let topic_base = self.monitor.sensors()[i].topic_base();
                if let Err(e) =
                    self.session
                        .publish_temperature(&mut self.transport, topic_base, celsius)
                {
                    warn!("temperature publish for {} failed: {:?}", topic_base, e);
                }
            }
        }
        self.monitor.mark_polled(now);
    }
}
