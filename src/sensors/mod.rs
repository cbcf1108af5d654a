//! Sensor subsystem — raw samples, rounded readings, and the failure
//! supervisor.
//!
//! A [`RawSample`] is whatever the driver produced (Celsius, unrounded).
//! A [`Reading`] is the domain's unit of record: Fahrenheit and relative
//! humidity, both rounded to whole units, the resolution the DHT family
//! actually delivers. Derived metrics are computed from readings on
//! demand and never stored.

pub mod supervisor;

pub use supervisor::{Polled, SensorSupervisor};

use crate::climate;

/// Raw driver output: relative humidity (%) and temperature (Celsius).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub humidity_pct: f64,
    pub temp_c: f64,
}

/// A validated reading in domain units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in Fahrenheit, rounded to the nearest degree.
    pub temp_f: f64,
    /// Relative humidity in percent, rounded to the nearest point.
    pub rh_pct: f64,
}

impl Reading {
    pub fn from_sample(sample: &RawSample) -> Self {
        Self {
            temp_f: climate::c_to_f(sample.temp_c).round(),
            rh_pct: sample.humidity_pct.round(),
        }
    }

    /// Apparent temperature ("feels like") in Fahrenheit.
    pub fn heat_index_f(&self) -> f64 {
        climate::heat_index(self.rh_pct, self.temp_f)
    }

    /// Dew point in Fahrenheit.
    pub fn dew_point_f(&self) -> f64 {
        climate::dew_point_f(self.rh_pct, climate::f_to_c(self.temp_f))
    }
}
