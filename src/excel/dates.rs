//! Excel serial date conversion (1900 date system)
//!
//! Serial 1.0 is 1900-01-01. Excel treats 1900 as a leap year, so serials
//! from 61 onward are offset by one day from a plain day count. Using
//! 1899-12-30 as the epoch gives correct dates for every serial >= 61, which
//! covers any accounting data this tool sees.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert an Excel serial number to a date-time
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Convert a date-time to an Excel serial number
pub fn datetime_to_serial(datetime: &NaiveDateTime) -> f64 {
    let delta = *datetime - epoch();
    delta.num_milliseconds() as f64 / MILLIS_PER_DAY
}
