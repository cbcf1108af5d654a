//! Window open/close advisor.
//!
//! Two-state hysteresis around the target temperature:
//!
//! ```text
//!  CLOSED ──[outside air strictly closer to target than inside]──▶ OPEN
//!  OPEN ──[inside reached target and drifting past it]──▶ CLOSED
//! ```
//!
//! Opening helps whenever outside air would pull the indoor temperature
//! toward the target — either because outside sits on the comfortable side
//! of the target, or because outside is simply less extreme than inside.
//! Closing waits until the indoor temperature has actually reached the
//! target and continuing would overshoot, so boundary readings do not
//! flap the state. Ticks without a transition are silent.

use chrono::{DateTime, Local};
use log::info;

use crate::app::events::{clock_stamp, Notification};
use crate::sensors::Reading;

/// Current recommendation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Closed,
    Open,
}

/// Owns the hysteresis state for the window recommendation.
#[derive(Debug)]
pub struct WindowAdvisor {
    state: WindowState,
}

impl Default for WindowAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowAdvisor {
    /// Windows are assumed closed at startup.
    pub fn new() -> Self {
        Self {
            state: WindowState::Closed,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Evaluate one pair of valid readings. Returns a notification on a
    /// state transition, `None` when the recommendation is unchanged.
    pub fn assess(
        &mut self,
        inside: Reading,
        outside: Reading,
        target_f: i32,
        now: &DateTime<Local>,
    ) -> Option<Notification> {
        let t_in = inside.temp_f;
        let t_out = outside.temp_f;
        let target = f64::from(target_f);

        match self.state {
            WindowState::Closed => {
                let should_open = (t_out > target && t_in < target)
                    || (t_out < target && t_in > target)
                    || (t_out > target && t_in > t_out)
                    || (t_out < target && t_in < t_out);
                if !should_open {
                    return None;
                }
                self.state = WindowState::Open;
                info!(
                    "windows: open advised (inside {t_in:.0}f, outside {t_out:.0}f, target {target_f}f)"
                );
                Some(Notification::to_recipients(
                    "Time to Open Windows!",
                    advice_body(now, t_out, t_in, target_f),
                ))
            }
            WindowState::Open => {
                let should_close = (t_in >= target && t_in < t_out)
                    || (t_in <= target && t_in > t_out);
                if !should_close {
                    return None;
                }
                self.state = WindowState::Closed;
                info!(
                    "windows: close advised (inside {t_in:.0}f, outside {t_out:.0}f, target {target_f}f)"
                );
                Some(Notification::to_recipients(
                    "Time to Close Windows!",
                    advice_body(now, t_out, t_in, target_f),
                ))
            }
        }
    }
}

fn advice_body(now: &DateTime<Local>, t_out: f64, t_in: f64, target_f: i32) -> String {
    format!(
        "As of {}, temperature outside is {t_out:.0}f and temperature inside is {t_in:.0}f, with target temperature of {target_f}f",
        clock_stamp(now)
    )
}
