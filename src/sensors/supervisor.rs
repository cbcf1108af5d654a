//! Per-sensor failure supervisor.
//!
//! Wraps one [`SensorPort`] with the retry/latch state machine:
//!
//! ```text
//!          read ok                    read ok (resets counter)
//!   ┌────────────────┐            ┌──────────────┐
//!   ▼                │            ▼              │
//!  NOMINAL ──[NoData × 30]──▶ LATCHED ──[cooldown elapsed]──▶ NOMINAL
//!                 │                │
//!        one alert on latch   Down, no further
//!        (malfunction list)   driver reads
//! ```
//!
//! Transient noise is retried in place with a short delay, bounded by the
//! retry ceiling — a loop with an explicit counter, so the public `poll`
//! contract is entered once per tick and the counter is never reset by the
//! retries themselves. Once latched, the driver is left alone until the
//! cooldown deadline passes; the deadline is checked on the next access
//! rather than fired from a background timer, so a reset can never race a
//! concurrent re-latch.

use log::{info, warn};
use std::time::Duration;

use super::Reading;
use crate::app::events::{clock_stamp, Notification};
use crate::app::ports::{SensorPort, TimePort};

/// Consecutive NoData reads before a sensor is declared down.
pub const RETRY_CEILING: u32 = 30;

/// Delay between in-place retries, giving the sensor time to recover in
/// case ping frequency is overwhelming it.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// How long a latched sensor is left alone before the next probe. Long
/// enough that a dead sensor alerts at most a few times a day, short
/// enough that a replaced sensor is picked up without a restart.
pub const COOLDOWN: Duration = Duration::from_secs(15 * 60);

/// Outcome of one supervised poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Polled {
    /// A real reading; safe for decisions and logging.
    Reading(Reading),
    /// The sensor is down. `alert` is `Some` exactly once per latch —
    /// on the transition out of nominal — and `None` on every
    /// subsequent poll while latched.
    Down { alert: Option<Notification> },
}

impl Polled {
    pub fn reading(&self) -> Option<Reading> {
        match self {
            Self::Reading(r) => Some(*r),
            Self::Down { .. } => None,
        }
    }
}

/// Retry/latch state for one physical sensor.
#[derive(Debug)]
pub struct SensorSupervisor {
    /// Human-readable location, used in alert bodies ("Internal Temperature").
    location: &'static str,
    consecutive_failures: u32,
    nominal: bool,
    cooldown_until: Option<Duration>,
}

impl SensorSupervisor {
    pub fn new(location: &'static str) -> Self {
        Self {
            location,
            consecutive_failures: 0,
            nominal: true,
            cooldown_until: None,
        }
    }

    pub fn location(&self) -> &'static str {
        self.location
    }

    pub fn is_nominal(&self) -> bool {
        self.nominal
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Poll the sensor once, retrying transient NoData in place.
    ///
    /// Worst case this blocks for `RETRY_CEILING × RETRY_DELAY` (one
    /// minute) before latching — bounded, unlike an unconditional
    /// retry-until-data loop.
    pub fn poll(&mut self, port: &mut impl SensorPort, clock: &impl TimePort) -> Polled {
        if !self.nominal {
            match self.cooldown_until {
                Some(deadline) if clock.uptime() >= deadline => {
                    info!(
                        "{}: cooldown elapsed, returning sensor to service",
                        self.location
                    );
                    self.consecutive_failures = 0;
                    self.nominal = true;
                    self.cooldown_until = None;
                    // Fall through: this call is a fresh first attempt.
                }
                _ => return Polled::Down { alert: None },
            }
        }

        loop {
            if let Some(sample) = port.sample() {
                self.consecutive_failures = 0;
                return Polled::Reading(Reading::from_sample(&sample));
            }
            self.consecutive_failures += 1;
            if self.consecutive_failures >= RETRY_CEILING {
                break;
            }
            clock.sleep(RETRY_DELAY);
        }

        self.nominal = false;
        self.cooldown_until = Some(clock.uptime() + COOLDOWN);
        warn!(
            "{}: {} consecutive failed reads, latching down for {}s",
            self.location,
            self.consecutive_failures,
            COOLDOWN.as_secs()
        );
        let body = format!(
            "The sensor monitoring the {} appears to be broken as of {}",
            self.location,
            clock_stamp(&clock.now())
        );
        Polled::Down {
            alert: Some(Notification::to_malfunction_contacts(
                "Potential Sensor Failure",
                body,
            )),
        }
    }
}
