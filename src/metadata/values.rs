//! Typing of ASCII header values.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::model::AttrValue;

static DATETIME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{2}-[A-Za-z]{3}-\d{4}\s+\d{2}:\d{2}:\d{2}").ok());
static LATLONG_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[+-]\d{10}$").ok());
static INT_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").ok());
static FLOAT_ITEM_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^[+-]?\d+(\.\d+)?(e[+-]?\d+)?$").ok());

fn is_match(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Header timestamps such as `09-JAN-2004 19:49:24.193491`
pub fn try_parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if !is_match(&DATETIME_RE, value) {
        return None;
    }
    let compact = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&compact, "%d-%b-%Y %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&compact, "%d-%b-%Y %H:%M:%S"))
        .ok()
        .map(|dt| dt.and_utc())
}

/// Decimal or scientific notation; plain integers are left to [`try_parse_int`]
pub fn try_parse_float(value: &str) -> Option<f64> {
    let looks_float = value.contains(['.', 'e', 'E']) && value.chars().any(|c| c.is_ascii_digit());
    if !looks_float {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Signed ten-digit coordinate in micro-degrees (`10-6deg` in the product
/// header), returned in degrees.
///
/// This is not a blanket rule for ten-digit values: callers only apply it to
/// SPH corner coordinates (`*_LAT`, `*_LONG`). Any other signed ten-digit
/// value stays an integer and is never divided by 1e7.
pub fn try_parse_latlong(value: &str) -> Option<f64> {
    if !is_match(&LATLONG_RE, value) {
        return None;
    }
    value.parse::<i64>().ok().map(|v| v as f64 * 1e-6)
}

pub fn try_parse_int(value: &str) -> Option<i64> {
    if !is_match(&INT_RE, value) {
        return None;
    }
    value.trim_start_matches('+').parse().ok()
}

/// Whitespace separated numbers: one value gives a float, several a list
pub fn try_parse_float_list(value: &str) -> Option<AttrValue> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.is_empty() || !parts.iter().all(|p| is_match(&FLOAT_ITEM_RE, p)) {
        return None;
    }
    let floats = parts
        .iter()
        .map(|p| p.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match floats.as_slice() {
        [single] => Some(AttrValue::Float(*single)),
        _ => Some(AttrValue::FloatList(floats)),
    }
}
