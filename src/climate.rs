//! Psychrometric calculations: unit conversions, heat index, dew point,
//! and wet-bulb temperature.
//!
//! Everything here is a pure function of (temperature, relative humidity);
//! no state, no I/O. Heat index follows the NOAA/WPC equation set
//! (<https://www.wpc.ncep.noaa.gov/html/heatindex_equation.shtml>), dew
//! point the Magnus-form approximation with Vaisala band constants, and
//! wet bulb the Stull (2011) fit.

/// Celsius → Fahrenheit.
pub fn c_to_f(temp_c: f64) -> f64 {
    temp_c * 1.8 + 32.0
}

/// Fahrenheit → Celsius.
pub fn f_to_c(temp_f: f64) -> f64 {
    (5.0 / 9.0) * (temp_f - 32.0)
}

/// Heat index (apparent temperature, "feels like") in Fahrenheit.
///
/// The simple approximation is used on its own when it lands below 80 °F;
/// above that the full NOAA regression applies, with the two documented
/// humidity corrections. Band membership is checked on the continuous
/// temperature value, so fractional temperatures receive corrections too.
pub fn heat_index(rh_pct: f64, temp_f: f64) -> f64 {
    let simple = 0.5 * (temp_f + 61.0 + ((temp_f - 68.0) * 1.2) + (rh_pct * 0.094));

    if simple < 80.0 {
        return simple;
    }

    let t = temp_f;
    let r = rh_pct;
    let mut hi = -42.379 + (2.04901523 * t) + (10.14333127 * r)
        - (0.22475541 * t * r)
        - (0.00683783 * t * t)
        - (0.05481717 * r * r)
        + (0.00122874 * t * t * r)
        + (0.00085282 * t * r * r)
        - (0.00000199 * t * t * r * r);

    if r > 85.0 && (80.0..85.0).contains(&t) {
        hi += ((r - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    } else if r < 13.0 && (80.0..112.0).contains(&t) {
        hi -= ((13.0 - r) / 4.0) * (((17.0 - (t - 95.0).abs()) / 17.0).sqrt());
    }

    hi
}

/// Magnus-form saturation constants: (A, m, Tn).
///
/// Over-ice constants for sub-zero temperatures, over-water for 0 °C and
/// above. The over-water set is documented for 0–51 °C but is also used
/// beyond 51 °C so the function stays total.
fn magnus_constants(temp_c: f64) -> (f64, f64, f64) {
    if temp_c < 0.0 {
        (6.114742, 9.778707, 273.1466)
    } else {
        (6.116441, 7.591386, 240.7263)
    }
}

/// Dew point in Celsius.
///
/// Defined for `rh_pct > 0`; at 100% humidity the dew point equals the
/// dry-bulb temperature (up to the approximation error of the fit).
pub fn dew_point_c(rh_pct: f64, temp_c: f64) -> f64 {
    let (a, m, tn) = magnus_constants(temp_c);

    // Saturation vapour pressure (hPa), then actual vapour pressure.
    let pws = a * 10f64.powf((m * temp_c) / (temp_c + tn));
    let pw = pws * rh_pct / 100.0;

    tn / ((m / (pw / a).log10()) - 1.0)
}

/// Dew point in Fahrenheit.
pub fn dew_point_f(rh_pct: f64, temp_c: f64) -> f64 {
    c_to_f(dew_point_c(rh_pct, temp_c))
}

/// Wet-bulb temperature in Celsius, per the Stull (2011) regression.
pub fn wet_bulb_c(rh_pct: f64, temp_c: f64) -> f64 {
    temp_c * (0.151977 * (rh_pct + 8.313659).sqrt()).atan() + (temp_c + rh_pct).atan()
        - (rh_pct - 1.676331).atan()
        + (0.00391838 * rh_pct.powf(1.5)) * (0.023101 * rh_pct).atan()
        - 4.686035
}
