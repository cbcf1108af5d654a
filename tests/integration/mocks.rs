//! Mock adapters for integration tests.
//!
//! Record every port interaction so tests can assert on the full history
//! without touching real files, sensors, or mail.

use chrono::{DateTime, Local, TimeZone};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use passivestat::app::ports::{
    ContactStorePort, InboundMessage, LogError, LogRow, MailError, MailboxPort, ReadingLogPort,
    SensorPort, StoreError, TimePort,
};
use passivestat::contacts::ContactEntry;
use passivestat::sensors::RawSample;

// ── Mailbox ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
}

#[derive(Default)]
pub struct MockMailbox {
    /// One entry per upcoming fetch; empty queue means no new mail.
    pub inbound: VecDeque<Vec<InboundMessage>>,
    pub sent: Vec<SentMail>,
    pub fail_fetch: bool,
}

#[allow(dead_code)]
impl MockMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_message(&mut self, sender: &str, attachment: &str) {
        self.inbound.push_back(vec![InboundMessage {
            sender: sender.to_string(),
            attachments: vec![attachment.to_string()],
        }]);
    }

    pub fn subjects(&self) -> Vec<&str> {
        self.sent.iter().map(|m| m.subject.as_str()).collect()
    }
}

impl MailboxPort for MockMailbox {
    fn fetch_unseen(&mut self) -> Result<Vec<InboundMessage>, MailError> {
        if self.fail_fetch {
            return Err(MailError::Unreachable("mock transport down".into()));
        }
        Ok(self.inbound.pop_front().unwrap_or_default())
    }

    fn send(&mut self, subject: &str, body: &str, to: &[String]) -> Result<(), MailError> {
        self.sent.push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            to: to.to_vec(),
        });
        Ok(())
    }
}

// ── Sensor ────────────────────────────────────────────────────

pub struct MockSensor {
    pub sample: Option<RawSample>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn reading(humidity_pct: f64, temp_c: f64) -> Self {
        Self {
            sample: Some(RawSample {
                humidity_pct,
                temp_c,
            }),
        }
    }

    pub fn dead() -> Self {
        Self { sample: None }
    }
}

impl SensorPort for MockSensor {
    fn sample(&mut self) -> Option<RawSample> {
        self.sample
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct MockClock {
    now: Cell<DateTime<Local>>,
    uptime: Cell<Duration>,
}

#[allow(dead_code)]
impl MockClock {
    /// Noon on a fixed date, at the given minute.
    pub fn at_minute(minute: u32) -> Self {
        Self {
            now: Cell::new(Local.with_ymd_and_hms(2024, 8, 4, 12, minute, 0).unwrap()),
            uptime: Cell::new(Duration::ZERO),
        }
    }

    pub fn set_minute(&self, minute: u32) {
        self.now
            .set(Local.with_ymd_and_hms(2024, 8, 4, 12, minute, 0).unwrap());
    }

    pub fn set_hour_minute(&self, hour: u32, minute: u32) {
        self.now
            .set(Local.with_ymd_and_hms(2024, 8, 4, hour, minute, 0).unwrap());
    }

    pub fn advance_uptime(&self, d: Duration) {
        self.uptime.set(self.uptime.get() + d);
    }
}

impl TimePort for MockClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }

    fn uptime(&self) -> Duration {
        self.uptime.get()
    }

    fn sleep(&self, d: Duration) {
        self.advance_uptime(d);
    }
}

// ── Contact store ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub saved: RefCell<Vec<ContactEntry>>,
    pub saves: Cell<usize>,
    pub fail: Cell<bool>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactStorePort for MockStore {
    fn load(&self) -> Result<Vec<ContactEntry>, StoreError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, entries: &[ContactEntry]) -> Result<(), StoreError> {
        if self.fail.get() {
            return Err(StoreError::Io(std::io::Error::other("mock disk full")));
        }
        *self.saved.borrow_mut() = entries.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

// ── Reading log ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockLog {
    pub rows: Vec<LogRow>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadingLogPort for MockLog {
    fn append(&mut self, row: &LogRow) -> Result<(), LogError> {
        if self.fail {
            return Err(LogError::Io(std::io::Error::other("mock log sink down")));
        }
        self.rows.push(*row);
        Ok(())
    }
}
