//! MJD2000 timestamps used in every annotation and measurement record.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Encoded size of an MJD2000 value
pub const MJD_SIZE: usize = 12;

/// Start of the ENVISAT time scale, 2000-01-01T00:00:00Z
pub fn envisat_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Combine MJD2000 components into a UTC timestamp.
/// Returns `None` when the value falls outside the representable range.
pub fn mjd2000_to_datetime(days: i32, seconds: u32, microseconds: u32) -> Option<DateTime<Utc>> {
    let delta = TimeDelta::try_days(i64::from(days))?
        .checked_add(&TimeDelta::try_seconds(i64::from(seconds))?)?
        .checked_add(&TimeDelta::microseconds(i64::from(microseconds)))?;
    envisat_epoch().checked_add_signed(delta)
}

/// Decode a big-endian MJD2000 value (i32 days, u32 seconds, u32 microseconds)
pub fn decode_mjd2000(bytes: &[u8; MJD_SIZE]) -> Option<DateTime<Utc>> {
    let days = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let seconds = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let micros = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    mjd2000_to_datetime(days, seconds, micros)
}

/// Parse the `"days, seconds, microseconds"` text GDAL reports for MJD record fields
pub fn parse_mjd2000_text(text: &str) -> Option<DateTime<Utc>> {
    let mut parts = text.split(',').map(str::trim);
    let days = parts.next()?.parse().ok()?;
    let seconds = parts.next()?.parse().ok()?;
    let micros = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    mjd2000_to_datetime(days, seconds, micros)
}

/// Encode a timestamp as MJD2000; used when writing synthetic records
pub fn encode_mjd2000(time: DateTime<Utc>) -> [u8; MJD_SIZE] {
    const MICROS_PER_DAY: i64 = 86_400_000_000;
    let total = (time - envisat_epoch()).num_microseconds().unwrap_or(0);
    let days = total.div_euclid(MICROS_PER_DAY);
    let rest = total.rem_euclid(MICROS_PER_DAY);

    let mut out = [0u8; MJD_SIZE];
    out[0..4].copy_from_slice(&(days as i32).to_be_bytes());
    out[4..8].copy_from_slice(&((rest / 1_000_000) as u32).to_be_bytes());
    out[8..12].copy_from_slice(&((rest % 1_000_000) as u32).to_be_bytes());
    out
}
