//! Command validation and application.
//!
//! [`CommandDispatcher::apply`] walks one parsed batch, validates each
//! command against its family's policy, applies side effects (config
//! changes, contact mutations), and queues reply notifications. A bad
//! command produces one error reply and never disturbs the rest of the
//! batch; the loop itself only ever stops through the two-phase `kill`
//! protocol.
//!
//! Contact mutations persist **before** their confirmation is queued, so
//! a crash after the confirmation went out cannot lose the change. A
//! failed save reverts the in-memory registry and reports the failure to
//! the sender instead.

use log::{error, info};

use super::{CommandBatch, CommandName};
use crate::app::events::{clock_stamp, Notification};
use crate::app::ports::{ContactStorePort, SensorPort, TimePort};
use crate::config::{SystemConfig, POLL_INTERVAL_RANGE, TARGET_TEMP_RANGE};
use crate::contacts::{is_gateway_address, ContactRegistry, Role};
use crate::sensors::{Polled, Reading, SensorSupervisor};

/// Whether the control loop should keep running after this batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Shutdown,
}

/// Outcome of one dispatch cycle.
#[derive(Debug)]
pub struct DispatchResult {
    pub notifications: Vec<Notification>,
    pub control: LoopControl,
}

/// Validates and applies parsed commands. Owns the `kill` arming flag.
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    kill_armed: bool,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a `kill` is waiting for its confirmation.
    pub fn is_kill_armed(&self) -> bool {
        self.kill_armed
    }

    /// Validate and apply one batch.
    ///
    /// `kill confirm` only takes effect when the arming `kill` arrived in
    /// an earlier batch; a non-empty batch without any `kill` disarms.
    pub fn apply(
        &mut self,
        batch: &CommandBatch,
        config: &mut SystemConfig,
        contacts: &mut ContactRegistry,
        store: &mut impl ContactStorePort,
        inside: &mut SensorSupervisor,
        inside_port: &mut impl SensorPort,
        outside: &mut SensorSupervisor,
        outside_port: &mut impl SensorPort,
        clock: &impl TimePort,
    ) -> DispatchResult {
        let mut out = Vec::new();
        let mut control = LoopControl::Continue;
        let armed_at_entry = self.kill_armed;
        let mut saw_kill = false;

        for (name, arg) in batch {
            let stamp = clock_stamp(&clock.now());
            let Some(cmd) = CommandName::lookup(name) else {
                out.push(Notification::to_recipients(
                    "Error",
                    format!(
                        "Hm, something seems to have gone wrong. Please check your command ({name}) and value ({}) for errors",
                        arg.as_deref().unwrap_or("none")
                    ),
                ));
                continue;
            };

            match cmd {
                // ── Configuration ─────────────────────────────────────
                CommandName::SetTarget | CommandName::SetInterval => {
                    let Some(arg) = arg else {
                        out.push(Notification::to_recipients(
                            "Error",
                            format!(
                                "Set commands require an integer assignment value, such as '{name}: 68'"
                            ),
                        ));
                        continue;
                    };
                    let Ok(value) = arg.trim().parse::<i64>() else {
                        out.push(Notification::to_recipients(
                            "Error",
                            format!("Input ({name}: {arg}) could not be coerced to integer"),
                        ));
                        continue;
                    };
                    out.push(self.apply_set(cmd, value, config, &stamp));
                }

                // ── Queries ───────────────────────────────────────────
                CommandName::GetTarget => {
                    out.push(Notification::to_recipients(
                        "Confirmation",
                        format!(
                            "Target Temperature is {}f as of {stamp}",
                            config.target_temp_f
                        ),
                    ));
                }
                CommandName::GetInterval => {
                    out.push(Notification::to_recipients(
                        "Confirmation",
                        format!("Interval is {}s as of {stamp}", config.poll_interval_secs),
                    ));
                }
                CommandName::GetCommands => {
                    let listed: Vec<&str> =
                        CommandName::LISTED.iter().map(|c| c.as_str()).collect();
                    out.push(Notification::to_recipients("Commands", listed.join(", ")));
                }
                CommandName::GetCurrent | CommandName::GetFeelsLike | CommandName::GetDewPoint => {
                    let r_in = polled(inside, inside_port, clock, &mut out);
                    let r_out = polled(outside, outside_port, clock, &mut out);
                    out.push(query_reply(cmd, r_in, r_out, config.target_temp_f, &stamp));
                }

                // ── Contact mutations ─────────────────────────────────
                CommandName::AddRecipient
                | CommandName::AddMalfunction
                | CommandName::DropRecipient
                | CommandName::DropMalfunction => {
                    let Some(arg) = arg else {
                        out.push(Notification::to_recipients(
                            "Error",
                            format!(
                                "Add/Drop commands require contact information, such as '{name}: contact'"
                            ),
                        ));
                        continue;
                    };
                    out.push(self.apply_contact(cmd, arg, contacts, store, &stamp));
                }

                // ── Shutdown protocol ─────────────────────────────────
                CommandName::Kill => {
                    saw_kill = true;
                    self.kill_armed = true;
                    info!("kill armed, awaiting confirmation");
                    out.push(Notification::to_recipients(
                        "Confirm Shutdown",
                        format!(
                            "Kill command received as of {stamp}. Send 'kill confirm' to stop the control loop"
                        ),
                    ));
                }
                CommandName::KillConfirm => {
                    if armed_at_entry {
                        info!("kill confirmed, control loop stopping");
                        control = LoopControl::Shutdown;
                        out.push(Notification::to_recipients(
                            "Shutdown",
                            format!("Control loop stopping as of {stamp}"),
                        ));
                    } else {
                        out.push(Notification::to_recipients(
                            "Error",
                            "Received 'kill confirm' with no kill pending; ignoring".to_string(),
                        ));
                    }
                }
            }
        }

        // A non-empty batch with no arming `kill` clears any pending kill:
        // the operator moved on to other business.
        if control == LoopControl::Continue && !batch.is_empty() && !saw_kill {
            if self.kill_armed {
                info!("kill disarmed by unrelated command traffic");
            }
            self.kill_armed = false;
        }

        DispatchResult {
            notifications: out,
            control,
        }
    }

    fn apply_set(
        &self,
        cmd: CommandName,
        value: i64,
        config: &mut SystemConfig,
        stamp: &str,
    ) -> Notification {
        match cmd {
            CommandName::SetTarget => {
                let Ok(v) = i32::try_from(value) else {
                    return target_range_error(value);
                };
                if !TARGET_TEMP_RANGE.contains(&v) {
                    return target_range_error(value);
                }
                config.target_temp_f = v;
                info!("config: target temperature set to {v}f");
                Notification::to_recipients(
                    "Confirmation",
                    format!("Target Temperature set to {v}f as of {stamp}"),
                )
            }
            CommandName::SetInterval => {
                let Ok(v) = u32::try_from(value) else {
                    return interval_range_error(value);
                };
                if !POLL_INTERVAL_RANGE.contains(&v) {
                    return interval_range_error(value);
                }
                config.poll_interval_secs = v;
                info!("config: poll interval set to {v}s");
                Notification::to_recipients(
                    "Confirmation",
                    format!("Interval set to {v}s as of {stamp}"),
                )
            }
            _ => unreachable!("apply_set called for non-set command"),
        }
    }

    fn apply_contact(
        &self,
        cmd: CommandName,
        address: &str,
        contacts: &mut ContactRegistry,
        store: &mut impl ContactStorePort,
        stamp: &str,
    ) -> Notification {
        if !is_gateway_address(address) {
            return Notification::to_recipients(
                "Error",
                format!("Input value ({address}) must be a valid email address"),
            );
        }

        let role = match cmd {
            CommandName::AddRecipient | CommandName::DropRecipient => Role::Recipient,
            CommandName::AddMalfunction | CommandName::DropMalfunction => Role::Malfunction,
            _ => unreachable!("apply_contact called for non-contact command"),
        };
        let adding = matches!(cmd, CommandName::AddRecipient | CommandName::AddMalfunction);

        let changed = if adding {
            contacts.grant(address, role)
        } else {
            contacts.revoke(address, role)
        };

        // Write-before-acknowledge: the table must be on disk before the
        // confirmation is queued. On failure, undo so memory and disk agree.
        if changed {
            if let Err(e) = store.save(contacts.entries()) {
                error!("contact store save failed: {e}");
                if adding {
                    contacts.revoke(address, role);
                } else {
                    contacts.grant(address, role);
                }
                return Notification::to_recipients(
                    "Error",
                    format!("Could not persist contact change ({}: {address}); please try again", cmd.as_str()),
                );
            }
        }

        Notification::to_recipients(
            "Confirmation",
            format!("Command ({}) completed successfully as of {stamp}", cmd.as_str()),
        )
    }
}

/// Poll through the supervisor, forwarding any latch alert into the
/// outbound queue.
fn polled(
    sup: &mut SensorSupervisor,
    port: &mut impl SensorPort,
    clock: &impl TimePort,
    out: &mut Vec<Notification>,
) -> Option<Reading> {
    match sup.poll(port, clock) {
        Polled::Reading(r) => Some(r),
        Polled::Down { alert } => {
            out.extend(alert);
            None
        }
    }
}

/// Render one side of a query reply, or label it unavailable instead of
/// stalling on a dead sensor.
fn side_text(reading: Option<Reading>, cmd: CommandName) -> String {
    match (reading, cmd) {
        (None, _) => "unavailable".to_string(),
        (Some(r), CommandName::GetCurrent) => {
            format!("{:.0}f, {:.0}%", r.temp_f, r.rh_pct)
        }
        (Some(r), CommandName::GetFeelsLike) => {
            format!("{:.0}f, {:.0}%", r.heat_index_f(), r.rh_pct)
        }
        (Some(r), CommandName::GetDewPoint) => format!("{:.0}f", r.dew_point_f()),
        _ => unreachable!("side_text called for non-query command"),
    }
}

fn query_reply(
    cmd: CommandName,
    r_in: Option<Reading>,
    r_out: Option<Reading>,
    target_f: i32,
    stamp: &str,
) -> Notification {
    let outside = side_text(r_out, cmd);
    let inside = side_text(r_in, cmd);
    let body = match cmd {
        CommandName::GetCurrent => format!(
            "As of {stamp}, temperature and RH outside: {outside}, and inside: {inside} with target temperature of {target_f}f"
        ),
        CommandName::GetFeelsLike => format!(
            "As of {stamp}, apparent temperature and RH outside: {outside}, and inside: {inside} with target temperature of {target_f}f"
        ),
        CommandName::GetDewPoint => {
            format!("As of {stamp}, dew point outside: {outside}, and inside: {inside}")
        }
        _ => unreachable!("query_reply called for non-query command"),
    };
    Notification::to_recipients("Confirmation", body)
}

fn target_range_error(value: i64) -> Notification {
    Notification::to_recipients(
        "Error",
        format!(
            "Input value ({value}) is outside the accepted target range of {}f to {}f",
            TARGET_TEMP_RANGE.start,
            TARGET_TEMP_RANGE.end - 1
        ),
    )
}

fn interval_range_error(value: i64) -> Notification {
    Notification::to_recipients(
        "Error",
        format!(
            "Input value ({value}) is outside the accepted interval range of {}s to {}s",
            POLL_INTERVAL_RANGE.start,
            POLL_INTERVAL_RANGE.end - 1
        ),
    )
}
