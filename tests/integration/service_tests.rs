//! Integration tests for the full tick pipeline: mail → dispatch →
//! sensors → window advice → reading log → delivery.
//!
//! These run on the host with mock adapters on every port.

use crate::mocks::{MockClock, MockLog, MockMailbox, MockSensor, MockStore};
use passivestat::app::service::ThermostatService;
use passivestat::command::LoopControl;
use passivestat::config::SystemConfig;
use passivestat::contacts::{ContactRegistry, Role};
use passivestat::sensors::supervisor::COOLDOWN;
use passivestat::windows::WindowState;

const OPERATOR: &str = "5551234567@vtext.com";

struct Rig {
    service: ThermostatService,
    mail: MockMailbox,
    inside: MockSensor,
    outside: MockSensor,
    store: MockStore,
    log: MockLog,
    clock: MockClock,
}

impl Rig {
    /// One registered operator (both roles), comfortable readings, and a
    /// clock parked at a non-logging minute.
    fn new() -> Self {
        let mut contacts = ContactRegistry::new();
        contacts.grant(OPERATOR, Role::Recipient);
        contacts.grant(OPERATOR, Role::Malfunction);
        Self {
            service: ThermostatService::new(SystemConfig::default(), contacts),
            mail: MockMailbox::new(),
            // 20 C = 68 F inside, 25 C = 77 F outside.
            inside: MockSensor::reading(40.0, 20.0),
            outside: MockSensor::reading(50.0, 25.0),
            store: MockStore::new(),
            log: MockLog::new(),
            clock: MockClock::at_minute(7),
        }
    }

    fn tick(&mut self) -> LoopControl {
        self.service.tick(
            &mut self.mail,
            &mut self.inside,
            &mut self.outside,
            &mut self.store,
            &mut self.log,
            &self.clock,
        )
    }
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn start_sends_boot_notification_to_recipients() {
    let mut rig = Rig::new();
    rig.service.start(&mut rig.mail, &rig.clock);

    assert_eq!(rig.mail.sent.len(), 1);
    assert_eq!(rig.mail.sent[0].subject, "System Start");
    assert!(rig.mail.sent[0].body.starts_with("Initial boot at "));
    assert_eq!(rig.mail.sent[0].to, vec![OPERATOR.to_string()]);
}

#[test]
fn notifications_with_no_audience_are_dropped_not_sent() {
    let mut rig = Rig::new();
    rig.service = ThermostatService::new(SystemConfig::default(), ContactRegistry::new());
    rig.service.start(&mut rig.mail, &rig.clock);
    assert!(rig.mail.sent.is_empty());
}

// ── Command flow ──────────────────────────────────────────────

#[test]
fn inbound_set_target_changes_config_and_confirms() {
    let mut rig = Rig::new();
    rig.mail.queue_message(OPERATOR, "set target: 72");

    rig.tick();

    assert_eq!(rig.service.config().target_temp_f, 72);
    assert!(rig.mail.subjects().contains(&"Confirmation"));
}

#[test]
fn unauthorized_sender_is_ignored() {
    let mut rig = Rig::new();
    rig.mail.queue_message("5559999999@vtext.com", "set target: 72");

    rig.tick();

    assert_eq!(rig.service.config().target_temp_f, 68);
    assert!(!rig.mail.subjects().contains(&"Confirmation"));
}

#[test]
fn gateway_sibling_domain_is_authorized() {
    let mut rig = Rig::new();
    // Replies often come from the MMS domain, not the one we send to.
    rig.mail.queue_message("5551234567@vzwpix.com", "set interval: 60");

    rig.tick();

    assert_eq!(rig.service.config().poll_interval_secs, 60);
}

#[test]
fn add_recipient_persists_then_confirms() {
    let mut rig = Rig::new();
    rig.mail
        .queue_message(OPERATOR, "add recipient: 5550000000@tmomail.net");

    rig.tick();

    assert_eq!(rig.store.saves.get(), 1);
    assert!(rig
        .store
        .saved
        .borrow()
        .iter()
        .any(|e| e.address == "5550000000@tmomail.net" && e.recipient));
    let confirmation = rig
        .mail
        .sent
        .iter()
        .find(|m| m.subject == "Confirmation")
        .expect("confirmation sent");
    // The new recipient is already on the distribution list for it.
    assert!(confirmation.to.contains(&"5550000000@tmomail.net".to_string()));
}

#[test]
fn transport_fault_skips_commands_but_not_sensors() {
    let mut rig = Rig::new();
    rig.mail.fail_fetch = true;
    rig.clock.set_minute(15);

    rig.tick();

    // Commands skipped, but the quarter-hour row still landed.
    assert_eq!(rig.log.rows.len(), 1);
}

#[test]
fn kill_then_confirm_across_ticks_shuts_down() {
    let mut rig = Rig::new();
    rig.mail.queue_message(OPERATOR, "kill");
    assert_eq!(rig.tick(), LoopControl::Continue);
    assert!(rig.mail.subjects().contains(&"Confirm Shutdown"));

    rig.mail.queue_message(OPERATOR, "kill confirm");
    assert_eq!(rig.tick(), LoopControl::Shutdown);
    assert!(rig.mail.subjects().contains(&"Shutdown"));
}

#[test]
fn unrelated_traffic_disarms_a_pending_kill() {
    let mut rig = Rig::new();
    rig.mail.queue_message(OPERATOR, "kill");
    rig.tick();
    rig.mail.queue_message(OPERATOR, "get interval");
    rig.tick();
    rig.mail.queue_message(OPERATOR, "kill confirm");
    assert_eq!(rig.tick(), LoopControl::Continue);
}

// ── Window advice ─────────────────────────────────────────────

#[test]
fn window_advice_sent_once_per_transition() {
    let mut rig = Rig::new();
    // Inside 68 F at target; outside 77 F. Closed and staying closed.
    rig.tick();
    assert_eq!(rig.service.window_state(), WindowState::Closed);
    assert!(rig.mail.sent.is_empty());

    // Inside drifts below target with outside warm: open advice.
    rig.inside = MockSensor::reading(40.0, 18.0); // 64 F
    rig.tick();
    assert_eq!(rig.service.window_state(), WindowState::Open);
    let advice: Vec<_> = rig
        .mail
        .sent
        .iter()
        .filter(|m| m.subject == "Time to Open Windows!")
        .collect();
    assert_eq!(advice.len(), 1);
    assert!(advice[0].body.contains("temperature outside is 77f"));

    // Steady conditions: silent.
    rig.tick();
    assert_eq!(
        rig.mail
            .sent
            .iter()
            .filter(|m| m.subject == "Time to Open Windows!")
            .count(),
        1
    );
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn dead_sensor_alerts_malfunction_contacts_once_and_skips_decision_and_log() {
    let mut rig = Rig::new();
    rig.outside = MockSensor::dead();
    rig.clock.set_minute(15);

    rig.tick();

    let alerts: Vec<_> = rig
        .mail
        .sent
        .iter()
        .filter(|m| m.subject == "Potential Sensor Failure")
        .collect();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].body.contains("External Temperature"));
    assert!(rig.log.rows.is_empty());
    assert_eq!(rig.service.window_state(), WindowState::Closed);

    // Latched: the next tick stays quiet.
    rig.tick();
    assert_eq!(
        rig.mail
            .sent
            .iter()
            .filter(|m| m.subject == "Potential Sensor Failure")
            .count(),
        1
    );
}

// ── Reading log cadence ───────────────────────────────────────

#[test]
fn log_rows_only_on_quarter_hours_with_edge_detection() {
    let mut rig = Rig::new();

    rig.clock.set_minute(14);
    rig.tick();
    assert!(rig.log.rows.is_empty());

    rig.clock.set_minute(15);
    rig.tick();
    rig.tick(); // still :15 — must not double-log
    assert_eq!(rig.log.rows.len(), 1);

    rig.clock.set_minute(16);
    rig.tick();
    rig.clock.set_minute(30);
    rig.tick();
    assert_eq!(rig.log.rows.len(), 2);

    let row = &rig.log.rows[0];
    assert_eq!(row.minute, 15);
    assert_eq!(row.internal_temp, 68);
    assert_eq!(row.external_temp, 77);
    assert_eq!(row.internal_rh, 40);
    assert_eq!(row.external_rh, 50);
}

#[test]
fn failed_log_append_retries_on_next_tick() {
    let mut rig = Rig::new();
    rig.clock.set_minute(15);
    rig.log.fail = true;
    rig.tick();
    assert!(rig.log.rows.is_empty());

    // Sink recovers within the same minute window: the retry lands.
    rig.log.fail = false;
    rig.tick();
    assert_eq!(rig.log.rows.len(), 1);
}

#[test]
fn quarter_hour_row_resumes_after_sensor_recovery_across_boundary() {
    let mut rig = Rig::new();
    rig.clock.set_minute(15);
    rig.tick();
    assert_eq!(rig.log.rows.len(), 1);

    // Outage spanning the next boundary: no rows while down.
    rig.outside = MockSensor::dead();
    rig.clock.set_minute(16);
    rig.tick();
    assert_eq!(rig.log.rows.len(), 1);

    // Cooldown elapses and the sensor is back by :30: the due row still
    // lands on the first nominal tick.
    rig.outside = MockSensor::reading(50.0, 25.0);
    rig.clock.advance_uptime(COOLDOWN);
    rig.clock.set_minute(30);
    rig.tick();
    assert_eq!(rig.log.rows.len(), 2);
    assert_eq!(rig.log.rows[1].minute, 30);
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn heartbeat_fires_once_per_hour_boundary() {
    let mut rig = Rig::new();

    rig.clock.set_hour_minute(12, 0);
    rig.tick();
    rig.tick(); // still :00 — no duplicate
    assert_eq!(
        rig.mail
            .sent
            .iter()
            .filter(|m| m.subject == "Heartbeat")
            .count(),
        1
    );

    rig.clock.set_hour_minute(12, 1);
    rig.tick();
    rig.clock.set_hour_minute(13, 0);
    rig.tick();
    assert_eq!(
        rig.mail
            .sent
            .iter()
            .filter(|m| m.subject == "Heartbeat")
            .count(),
        2
    );
}
