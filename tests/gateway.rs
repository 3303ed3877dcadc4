use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use relaygate::gateway::{Gateway, Item, Phase, SensorId, RELAY_OFF, RELAY_ON};
use relaygate::hal::{DigitalIo, Monotonic, PinLevel, PinMode, TemperatureProbe};
use relaygate::net::{Credentials, Error, InboundMessage, MqttTransport};

const CREDENTIALS: Credentials<'static> = Credentials {
    client_id: "relaygate-test",
    user: "user",
    password: "secret",
};

#[derive(Debug, Default)]
struct PinBank {
    levels: HashMap<u8, PinLevel>,
    modes: HashMap<u8, PinMode>,
    writes: Vec<(u8, PinLevel)>,
}

/// Shared-handle pin driver; the test keeps a clone to set button levels
/// and inspect relay writes while the gateway owns the other clone.
#[derive(Debug, Clone, Default)]
struct MockIo(Rc<RefCell<PinBank>>);

impl MockIo {
    fn set_level(&self, pin: u8, level: PinLevel) {
        self.0.borrow_mut().levels.insert(pin, level);
    }

    fn level(&self, pin: u8) -> PinLevel {
        self.0.borrow().levels.get(&pin).copied().unwrap_or(PinLevel::High)
    }

    fn mode(&self, pin: u8) -> Option<PinMode> {
        self.0.borrow().modes.get(&pin).copied()
    }

    fn writes(&self) -> Vec<(u8, PinLevel)> {
        self.0.borrow().writes.clone()
    }
}

impl DigitalIo for MockIo {
    type Error = ();

    fn set_mode(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error> {
        self.0.borrow_mut().modes.insert(pin, mode);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<PinLevel, Self::Error> {
        // unset pins idle high, matching the pull-up wiring
        Ok(self.level(pin))
    }

    fn write(&mut self, pin: u8, level: PinLevel) -> Result<(), Self::Error> {
        let mut bank = self.0.borrow_mut();
        bank.levels.insert(pin, level);
        bank.writes.push((pin, level));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ProbeInner {
    readings: HashMap<u8, f32>,
    requests: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
struct MockProbe(Rc<RefCell<ProbeInner>>);

impl MockProbe {
    fn set_reading(&self, sensor: SensorId, celsius: f32) {
        self.0.borrow_mut().readings.insert(sensor.0, celsius);
    }

    fn request_count(&self) -> usize {
        self.0.borrow().requests.len()
    }
}

impl TemperatureProbe for MockProbe {
    type Error = ();

    fn request(&mut self, sensor: SensorId) -> Result<(), Self::Error> {
        self.0.borrow_mut().requests.push(sensor.0);
        Ok(())
    }

    fn read_celsius(&mut self, sensor: SensorId) -> Result<f32, Self::Error> {
        Ok(self
            .0
            .borrow()
            .readings
            .get(&sensor.0)
            .copied()
            .unwrap_or(-127.0))
    }
}

#[derive(Debug, Default)]
struct LinkInner {
    connected: bool,
    refuse_connects: bool,
    connect_attempts: usize,
    subscriptions: Vec<String>,
    publishes: Vec<(String, Vec<u8>, bool)>,
    inbound: VecDeque<InboundMessage>,
}

#[derive(Debug, Clone, Default)]
struct MockLink(Rc<RefCell<LinkInner>>);

impl MockLink {
    fn refusing() -> Self {
        let link = Self::default();
        link.0.borrow_mut().refuse_connects = true;
        link
    }

    fn connect_attempts(&self) -> usize {
        self.0.borrow().connect_attempts
    }

    fn subscriptions(&self) -> Vec<String> {
        self.0.borrow().subscriptions.clone()
    }

    fn publishes(&self) -> Vec<(String, Vec<u8>, bool)> {
        self.0.borrow().publishes.clone()
    }

    fn drop_session(&self) {
        self.0.borrow_mut().connected = false;
    }

    fn deliver(&self, topic: &str, payload: &[u8]) {
        self.0.borrow_mut().inbound.push_back(InboundMessage {
            topic: topic.try_into().unwrap(),
            payload: heapless::Vec::from_slice(payload).unwrap(),
        });
    }
}

impl MqttTransport for MockLink {
    fn connect(&mut self, _client_id: &str, _user: &str, _password: &str) -> Result<(), Error> {
        let mut inner = self.0.borrow_mut();
        inner.connect_attempts += 1;
        if inner.refuse_connects {
            Err(Error::ConnectionRefused)
        } else {
            inner.connected = true;
            Ok(())
        }
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Error> {
        let mut inner = self.0.borrow_mut();
        if !inner.connected {
            return Err(Error::NotConnected);
        }
        inner.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Error> {
        let mut inner = self.0.borrow_mut();
        if !inner.connected {
            return Err(Error::NotConnected);
        }
        inner
            .publishes
            .push((topic.to_owned(), payload.to_vec(), retain));
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<InboundMessage>, Error> {
        Ok(self.0.borrow_mut().inbound.pop_front())
    }
}

#[derive(Debug, Clone, Default)]
struct MockClock(Rc<Cell<u32>>);

impl MockClock {
    fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Monotonic for MockClock {
    fn now_millis(&self) -> u32 {
        self.0.get()
    }
}

struct Rig {
    io: MockIo,
    probe: MockProbe,
    link: MockLink,
    clock: MockClock,
    gateway: Gateway<'static, MockIo, MockProbe, MockLink, MockClock, 8>,
}

fn rig_with_link(items: &[Item], link: MockLink) -> Rig {
    let io = MockIo::default();
    let probe = MockProbe::default();
    let clock = MockClock::default();
    let mut gateway = Gateway::new(
        items,
        CREDENTIALS,
        io.clone(),
        probe.clone(),
        link.clone(),
        clock.clone(),
    )
    .unwrap();
    gateway.setup();
    Rig {
        io,
        probe,
        link,
        clock,
        gateway,
    }
}

fn rig(items: &[Item]) -> Rig {
    rig_with_link(items, MockLink::default())
}

fn light_and_temp() -> [Item; 2] {
    [
        Item::on_off("room/light", Some(5), Some(3)).unwrap(),
        Item::temperature("room/temp", SensorId(0)).unwrap(),
    ]
}

#[test]
fn setup_initializes_relays_and_subscribes_commands() {
    let rig = rig(&light_and_temp());

    // relay parked off before anything else touches it
    assert_eq!(rig.io.writes()[0], (5, RELAY_OFF));
    assert_eq!(rig.io.mode(5), Some(PinMode::Output));
    assert_eq!(rig.io.mode(3), Some(PinMode::InputPullup));

    // exactly the on/off command topic, never the sensor's
    assert_eq!(rig.link.connect_attempts(), 1);
    assert_eq!(rig.link.subscriptions(), vec!["room/light/cmd".to_owned()]);
    assert_eq!(rig.gateway.session().phase(), Phase::Connected);
}

#[test]
fn command_payloads_drive_the_relay() {
    let mut rig = rig(&light_and_temp());

    rig.link.deliver("room/light/cmd", b"on");
    rig.gateway.tick();
    assert_eq!(rig.io.level(5), RELAY_ON);

    rig.link.deliver("room/light/cmd", b"off");
    rig.gateway.tick();
    assert_eq!(rig.io.level(5), RELAY_OFF);
}

#[test]
fn unknown_command_payloads_cause_no_pin_write() {
    let mut rig = rig(&light_and_temp());
    let writes_after_setup = rig.io.writes().len();

    rig.link.deliver("room/light/cmd", b"toggle");
    rig.link.deliver("room/light/cmd", b"On");
    rig.link.deliver("room/temp/cmd", b"on");
    rig.gateway.tick();

    assert_eq!(rig.io.writes().len(), writes_after_setup);
}

#[test]
fn debounced_press_toggles_relay_and_publishes_state() {
    let mut rig = rig(&light_and_temp());

    // active-low pulse held past the 100 ms stability window
    rig.io.set_level(3, PinLevel::Low);
    rig.clock.advance(10);
    rig.gateway.tick();
    rig.clock.advance(110);
    rig.gateway.tick();

    // relay was off (logic high), so the press turns it on
    assert_eq!(rig.io.level(5), RELAY_ON);
    let publishes = rig.link.publishes();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].0, "room/light/state");
    assert_eq!(publishes[0].1, b"on".to_vec());
    assert!(publishes[0].2, "state publishes must be retained");

    // release is silent
    rig.io.set_level(3, PinLevel::High);
    rig.clock.advance(10);
    rig.gateway.tick();
    rig.clock.advance(110);
    rig.gateway.tick();
    assert_eq!(rig.link.publishes().len(), 1);

    // second press toggles back off
    rig.io.set_level(3, PinLevel::Low);
    rig.clock.advance(10);
    rig.gateway.tick();
    rig.clock.advance(110);
    rig.gateway.tick();
    assert_eq!(rig.io.level(5), RELAY_OFF);
    let publishes = rig.link.publishes();
    assert_eq!(publishes.len(), 2);
    assert_eq!(publishes[1].1, b"off".to_vec());
}

#[test]
fn bounce_shorter_than_the_window_never_fires() {
    let mut rig = rig(&light_and_temp());

    rig.io.set_level(3, PinLevel::Low);
    rig.clock.advance(10);
    rig.gateway.tick();
    rig.io.set_level(3, PinLevel::High);
    rig.clock.advance(50);
    rig.gateway.tick();
    rig.clock.advance(200);
    rig.gateway.tick();

    assert_eq!(rig.io.level(5), RELAY_OFF);
    assert!(rig.link.publishes().is_empty());
}

#[test]
fn button_without_relay_pin_is_inert() {
    let items = [Item::on_off("hall/socket", None, Some(7)).unwrap()];
    let mut rig = rig(&items);
    let writes_after_setup = rig.io.writes().len();

    rig.io.set_level(7, PinLevel::Low);
    rig.clock.advance(10);
    rig.gateway.tick();
    rig.clock.advance(110);
    rig.gateway.tick();

    assert_eq!(rig.io.writes().len(), writes_after_setup);
    assert!(rig.link.publishes().is_empty());
}

#[test]
fn item_without_button_pin_gets_no_debouncer() {
    let items = [Item::on_off("hall/socket", Some(6), None).unwrap()];
    let mut rig = rig(&items);

    // nothing watches any input pin; holding one low changes nothing
    rig.io.set_level(6, PinLevel::Low);
    for _ in 0..5 {
        rig.clock.advance(100);
        rig.gateway.tick();
    }
    assert!(rig.link.publishes().is_empty());
}

#[test]
fn temperature_is_published_retained_as_json() {
    let mut rig = rig(&light_and_temp());
    rig.probe.set_reading(SensorId(0), 21.34);

    rig.clock.advance(1_000);
    rig.gateway.tick();
    assert_eq!(rig.probe.request_count(), 0, "gate must hold for 5 s");

    rig.clock.advance(4_000);
    rig.gateway.tick();
    assert_eq!(rig.probe.request_count(), 1);

    let publishes = rig.link.publishes();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].0, "room/temp");
    assert_eq!(publishes[0].1, br#"{"temperature":21.34}"#.to_vec());
    assert!(publishes[0].2, "temperature publishes must be retained");
}

#[test]
fn sensor_polls_are_spaced_at_least_five_seconds() {
    let mut rig = rig(&light_and_temp());
    rig.probe.set_reading(SensorId(0), 21.0);

    // tick far faster than the gate
    for _ in 0..20 {
        rig.clock.advance(500);
        rig.gateway.tick();
    }

    // 10 s of ticking: exactly two passes
    assert_eq!(rig.probe.request_count(), 2);
}

#[test]
fn sub_tenth_jitter_is_not_republished() {
    let mut rig = rig(&light_and_temp());

    rig.probe.set_reading(SensorId(0), 21.34);
    rig.clock.advance(5_000);
    rig.gateway.tick();
    assert_eq!(rig.link.publishes().len(), 1);

    // rounds to the same tenth, so no traffic
    rig.probe.set_reading(SensorId(0), 21.31);
    rig.clock.advance(5_000);
    rig.gateway.tick();
    assert_eq!(rig.link.publishes().len(), 1);

    // crossing the rounding boundary publishes the raw new value
    rig.probe.set_reading(SensorId(0), 21.37);
    rig.clock.advance(5_000);
    rig.gateway.tick();
    let publishes = rig.link.publishes();
    assert_eq!(publishes.len(), 2);
    assert_eq!(publishes[1].1, br#"{"temperature":21.37}"#.to_vec());
}

#[test]
fn invalid_readings_are_never_published() {
    let mut rig = rig(&light_and_temp());

    for reading in [-127.0, -140.0, 85.0, 120.0] {
        rig.probe.set_reading(SensorId(0), reading);
        rig.clock.advance(5_000);
        rig.gateway.tick();
    }

    assert!(rig.link.publishes().is_empty());
}

#[test]
fn failed_connect_is_retried_only_after_the_gate() {
    let mut rig = rig_with_link(&light_and_temp(), MockLink::refusing());
    assert_eq!(rig.link.connect_attempts(), 1);
    assert_eq!(rig.gateway.session().phase(), Phase::Disconnected);

    // hammering ticks inside the gate adds no attempts
    for _ in 0..10 {
        rig.clock.advance(1_000);
        rig.gateway.tick();
    }
    assert_eq!(rig.link.connect_attempts(), 1);

    rig.clock.advance(49_999);
    rig.gateway.tick();
    assert_eq!(rig.link.connect_attempts(), 1, "59 999 ms is inside the gate");

    rig.clock.advance(1);
    rig.gateway.tick();
    assert_eq!(rig.link.connect_attempts(), 2);

    // the failed attempt restamped the gate
    rig.clock.advance(59_999);
    rig.gateway.tick();
    assert_eq!(rig.link.connect_attempts(), 2);
    rig.clock.advance(1);
    rig.gateway.tick();
    assert_eq!(rig.link.connect_attempts(), 3);
}

#[test]
fn lost_session_resubscribes_on_reconnect() {
    let mut rig = rig(&light_and_temp());
    assert_eq!(rig.gateway.session().phase(), Phase::Connected);

    rig.link.drop_session();
    rig.clock.advance(1_000);
    rig.gateway.tick();
    assert_eq!(rig.gateway.session().phase(), Phase::Disconnected);
    assert_eq!(rig.link.connect_attempts(), 1, "loss alone must not retry early");

    rig.clock.advance(60_000);
    rig.gateway.tick();
    assert_eq!(rig.link.connect_attempts(), 2);
    assert_eq!(rig.gateway.session().phase(), Phase::Connected);
    assert_eq!(
        rig.link.subscriptions(),
        vec!["room/light/cmd".to_owned(), "room/light/cmd".to_owned()],
        "one subscription per connect event"
    );
}

#[test]
fn stages_run_in_order_within_one_tick() {
    // a command and a press both pending: the command is applied first,
    // then the press toggles the commanded level
    let mut rig = rig(&light_and_temp());

    rig.io.set_level(3, PinLevel::Low);
    rig.clock.advance(10);
    rig.gateway.tick();

    rig.link.deliver("room/light/cmd", b"on");
    rig.clock.advance(110);
    rig.gateway.tick();

    // command set it on, the press toggled it back off
    assert_eq!(rig.io.level(5), RELAY_OFF);
    let publishes = rig.link.publishes();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].1, b"off".to_vec());
}
