//! Application service — the hexagonal core.
//!
//! [`ThermostatService`] owns the mutable configuration, the contact
//! registry, the per-sensor supervisors, the window advisor, and the
//! command dispatcher. All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  MailboxPort ──▶ ┌──────────────────────────────┐ ──▶ MailboxPort
//!  SensorPort ──▶  │      ThermostatService       │ ──▶ ReadingLogPort
//!  TimePort ──▶    │  supervise · decide · apply  │ ──▶ ContactStorePort
//!                  └──────────────────────────────┘
//! ```
//!
//! One tick runs to completion before the next begins; within a tick the
//! order is fixed: fetch → parse → dispatch → sensor read → decide → log
//! → heartbeat → deliver.

use chrono::{DateTime, Datelike, Local, Timelike};
use log::{info, warn};

use crate::command::{parse_batch, CommandDispatcher, LoopControl};
use crate::config::SystemConfig;
use crate::contacts::ContactRegistry;
use crate::sensors::{Polled, Reading, SensorSupervisor};
use crate::windows::{WindowAdvisor, WindowState};

use super::events::{clock_stamp, Audience, Notification};
use super::ports::{
    ContactStorePort, LogRow, MailboxPort, ReadingLogPort, SensorPort, TimePort,
};

/// Minutes of the hour at which a reading-log row is appended.
const LOG_MINUTES: [u32; 4] = [0, 15, 30, 45];

/// The control loop core.
pub struct ThermostatService {
    config: SystemConfig,
    contacts: ContactRegistry,
    dispatcher: CommandDispatcher,
    advisor: WindowAdvisor,
    inside: SensorSupervisor,
    outside: SensorSupervisor,
    /// Heartbeat edge detector: armed while the minute is non-zero, fires
    /// once when it hits zero.
    heartbeat_pending: bool,
    /// (hour, minute) of the last appended reading-log row, so adjacent
    /// ticks in the same quarter-hour minute do not append twice and a
    /// row due during a sensor outage still lands after recovery.
    last_logged: Option<(u32, u32)>,
}

impl ThermostatService {
    pub fn new(config: SystemConfig, contacts: ContactRegistry) -> Self {
        Self {
            config,
            contacts,
            dispatcher: CommandDispatcher::new(),
            advisor: WindowAdvisor::new(),
            inside: SensorSupervisor::new("Internal Temperature"),
            outside: SensorSupervisor::new("External Temperature"),
            heartbeat_pending: true,
            last_logged: None,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn contacts(&self) -> &ContactRegistry {
        &self.contacts
    }

    pub fn window_state(&self) -> WindowState {
        self.advisor.state()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce startup, so an unexpected reboot is visible to operators.
    pub fn start(&mut self, mail: &mut impl MailboxPort, clock: &impl TimePort) {
        info!("thermostat service starting");
        let boot = Notification::to_recipients(
            "System Start",
            format!("Initial boot at {}", clock_stamp(&clock.now())),
        );
        self.deliver(mail, &[boot]);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle. Returns [`LoopControl::Shutdown`] only
    /// when a confirmed `kill` arrived this tick.
    pub fn tick(
        &mut self,
        mail: &mut impl MailboxPort,
        inside_port: &mut impl SensorPort,
        outside_port: &mut impl SensorPort,
        store: &mut impl ContactStorePort,
        reading_log: &mut impl ReadingLogPort,
        clock: &impl TimePort,
    ) -> LoopControl {
        let mut outbox: Vec<Notification> = Vec::new();

        // 1. Inbound commands. A transport fault skips command processing
        //    for this tick only; sensors, decision, and log still run.
        match mail.fetch_unseen() {
            Ok(messages) => {
                let blobs: Vec<String> = messages
                    .into_iter()
                    .filter(|m| {
                        let authorized = self.contacts.is_authorized_sender(&m.sender);
                        if !authorized {
                            warn!("dropping message from unauthorized sender {}", m.sender);
                        }
                        authorized
                    })
                    .flat_map(|m| m.attachments)
                    .collect();
                let batch = parse_batch(blobs.iter().map(String::as_str));
                let res = self.dispatcher.apply(
                    &batch,
                    &mut self.config,
                    &mut self.contacts,
                    store,
                    &mut self.inside,
                    inside_port,
                    &mut self.outside,
                    outside_port,
                    clock,
                );
                outbox.extend(res.notifications);
                if res.control == LoopControl::Shutdown {
                    self.deliver(mail, &outbox);
                    return LoopControl::Shutdown;
                }
            }
            Err(e) => {
                warn!("mail fetch failed, skipping command processing this tick: {e}");
            }
        }

        // 2. Sensors.
        let now = clock.now();
        let r_in = self.poll_into(Side::Inside, inside_port, clock, &mut outbox);
        let r_out = self.poll_into(Side::Outside, outside_port, clock, &mut outbox);

        // 3. Decision and log, only from two real readings — a down
        //    sensor must never leak a placeholder into either.
        if let (Some(r_in), Some(r_out)) = (r_in, r_out) {
            if let Some(advice) =
                self.advisor
                    .assess(r_in, r_out, self.config.target_temp_f, &now)
            {
                outbox.push(advice);
            }
            self.append_log(r_in, r_out, &now, reading_log);
        } else {
            info!("a sensor is down; skipping decision and log steps this tick");
        }

        // 4. Hourly heartbeat, edge-detected on minute 00.
        if now.minute() == 0 {
            if self.heartbeat_pending {
                self.heartbeat_pending = false;
                outbox.push(Notification::to_recipients(
                    "Heartbeat",
                    format!("Still alive as of {}", clock_stamp(&now)),
                ));
            }
        } else {
            self.heartbeat_pending = true;
        }

        // 5. Deliver everything queued this tick.
        self.deliver(mail, &outbox);
        LoopControl::Continue
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_into(
        &mut self,
        side: Side,
        port: &mut impl SensorPort,
        clock: &impl TimePort,
        outbox: &mut Vec<Notification>,
    ) -> Option<Reading> {
        let sup = match side {
            Side::Inside => &mut self.inside,
            Side::Outside => &mut self.outside,
        };
        match sup.poll(port, clock) {
            Polled::Reading(r) => Some(r),
            Polled::Down { alert } => {
                outbox.extend(alert);
                None
            }
        }
    }

    /// Append one row when the minute is on the quarter-hour cadence.
    /// Appends are keyed on the wall-clock minute rather than a reset
    /// flag, so a boundary that passes while a sensor is latched down is
    /// still honoured on the first nominal tick after recovery. An append
    /// failure is logged and left for the next tick in the same minute
    /// window to retry; it never stops the loop.
    fn append_log(
        &mut self,
        r_in: Reading,
        r_out: Reading,
        now: &DateTime<Local>,
        reading_log: &mut impl ReadingLogPort,
    ) {
        let slot = (now.hour(), now.minute());
        if !LOG_MINUTES.contains(&now.minute()) || self.last_logged == Some(slot) {
            return;
        }
        let row = LogRow {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            internal_temp: r_in.temp_f as i64,
            internal_hi: r_in.heat_index_f().round() as i64,
            internal_rh: r_in.rh_pct as i64,
            external_temp: r_out.temp_f as i64,
            external_hi: r_out.heat_index_f().round() as i64,
            external_rh: r_out.rh_pct as i64,
        };
        match reading_log.append(&row) {
            Ok(()) => self.last_logged = Some(slot),
            Err(e) => warn!("reading log append failed, will retry next tick: {e}"),
        }
    }

    /// Resolve each notification's audience and hand it to the mail
    /// adapter. Send failures are logged and dropped; the next event will
    /// reach operators on a healthy channel.
    fn deliver(&self, mail: &mut impl MailboxPort, notifications: &[Notification]) {
        for n in notifications {
            let to = match n.audience {
                Audience::Recipients => self.contacts.recipients(),
                Audience::MalfunctionContacts => self.contacts.malfunction_contacts(),
            };
            if to.is_empty() {
                warn!(
                    "no contacts hold the {:?} role; dropping '{}'",
                    n.audience, n.subject
                );
                continue;
            }
            if let Err(e) = mail.send(&n.subject, &n.body, &to) {
                warn!("mail send failed for '{}': {e}", n.subject);
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Inside,
    Outside,
}
