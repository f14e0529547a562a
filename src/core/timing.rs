//! Coordinate vectors along the azimuth and range axes.

use chrono::{DateTime, TimeDelta, Utc};
use ndarray::Array1;

use crate::error::{Error, Result};

/// `n` evenly spaced instants from `first` to `last` inclusive, at integer
/// nanosecond resolution (fractions truncated)
pub fn compute_azimuth_time(first: DateTime<Utc>, last: DateTime<Utc>, n: usize) -> Result<Vec<DateTime<Utc>>> {
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![first]),
        _ => {}
    }
    let span = (last - first)
        .num_nanoseconds()
        .ok_or_else(|| Error::Processing(format!("azimuth span {first} .. {last} too large")))?;

    let steps = (n - 1) as i128;
    Ok((0..n)
        .map(|i| {
            if i == n - 1 {
                return last;
            }
            let offset = i128::from(span) * i as i128 / steps;
            first + TimeDelta::nanoseconds(offset as i64)
        })
        .collect())
}

/// Evenly spaced values over `[start, stop]`, last value exactly `stop`
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from(vec![start]),
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values = Array1::from_shape_fn(n, |i| start + i as f64 * step);
            values[n - 1] = stop;
            values
        }
    }
}

/// Two-way slant range time of each of `n` samples starting at `t0` seconds
pub fn compute_slant_range_time(t0: f64, range_sampling_rate: f64, n: usize) -> Result<Array1<f64>> {
    if !(range_sampling_rate > 0.0) {
        return Err(Error::InvalidArgument {
            arg: "range_sampling_rate",
            value: range_sampling_rate.to_string(),
        });
    }
    let stop = t0 + n.saturating_sub(1) as f64 / range_sampling_rate;
    Ok(linspace(t0, stop, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn azimuth_time_hits_both_ends() {
        let first = Utc.with_ymd_and_hms(2004, 1, 9, 19, 49, 24).unwrap();
        let last = first + TimeDelta::nanoseconds(1_000_000_001);
        let times = compute_azimuth_time(first, last, 4).unwrap();

        assert_eq!(times.len(), 4);
        assert_eq!(times[0], first);
        assert_eq!(times[3], last);
        assert_eq!(times[1] - first, TimeDelta::nanoseconds(333_333_333));
    }

    #[test]
    fn azimuth_time_degenerate_counts() {
        let first = Utc.with_ymd_and_hms(2004, 1, 9, 0, 0, 0).unwrap();
        assert!(compute_azimuth_time(first, first, 0).unwrap().is_empty());
        assert_eq!(compute_azimuth_time(first, first, 1).unwrap(), vec![first]);
    }

    #[test]
    fn linspace_matches_endpoints() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v.to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1).to_vec(), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    fn slant_range_step_is_inverse_rate() {
        let rate = 19_207_680.0;
        let t = compute_slant_range_time(5.5e-3, rate, 100).unwrap();
        assert_relative_eq!(t[1] - t[0], 1.0 / rate, epsilon = 1e-15);
        assert_relative_eq!(t[99], 5.5e-3 + 99.0 / rate, epsilon = 1e-15);
        assert!(compute_slant_range_time(5.5e-3, 0.0, 10).is_err());
    }
}
