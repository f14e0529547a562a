//! Geolocation grid: near-range slant time, mid-swath incidence angle and
//! the tie-point grid.

use serde::Serialize;
use tracing::debug;

use crate::io::envisat::layout::{GEOLOCATION_GRID_ADSR, GEOLOCATION_TIE_POINTS};
use crate::io::envisat::{EnvisatProduct, FieldValue, Fields, ProductError};
use crate::model::{AttrValue, Attrs};

pub const GEOLOCATION_GRID_ADS: &str = "GEOLOCATION GRID ADS";

/// Tie-point latitudes and longitudes are stored in micro-degrees
const MICRODEGREES: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct Geolocation {
    /// First slant range time tie point of the middle record, in nanoseconds
    pub slant_time_first: f64,
    /// Incidence angle at the centre tie point of the middle record, in degrees
    pub incidence_angle_center: f64,
    pub tie_points: Vec<Attrs>,
}

impl Geolocation {
    pub fn from_records(records: &[Fields]) -> Result<Self, ProductError> {
        let middle = records
            .get(records.len() / 2)
            .ok_or(ProductError::MissingField("GEOLOCATION GRID ADS"))?;
        let first_line = middle
            .get("first_line_tie_points")
            .and_then(FieldValue::as_struct)
            .ok_or(ProductError::MissingField("first_line_tie_points"))?;

        let slant_time_first = first_line
            .floats("slant_range_times")
            .and_then(|v| v.first().copied())
            .ok_or(ProductError::MissingField("slant_range_times"))?;
        let incidence_angle_center = first_line
            .floats("angles")
            .and_then(|v| v.get(GEOLOCATION_TIE_POINTS / 2).copied())
            .ok_or(ProductError::MissingField("angles"))?;

        Ok(Geolocation {
            slant_time_first,
            incidence_angle_center,
            tie_points: records.iter().map(tie_point_entry).collect(),
        })
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("slant_time_first".to_string(), self.slant_time_first.into());
        attrs.insert("incidence_angle_center".to_string(), self.incidence_angle_center.into());
        attrs.insert(
            "tie_points".to_string(),
            AttrValue::List(self.tie_points.iter().cloned().map(AttrValue::Map).collect()),
        );
        attrs
    }
}

fn tie_point_line(line: Option<&Fields>) -> AttrValue {
    let Some(line) = line else {
        return AttrValue::Null;
    };
    let degrees = |name: &str| -> AttrValue {
        line.ints(name)
            .map(|v| v.iter().map(|x| *x as f64 * MICRODEGREES).collect::<Vec<_>>())
            .into()
    };
    let floats = |name: &str| -> AttrValue { line.floats(name).map(<[f64]>::to_vec).into() };

    let mut attrs = Attrs::new();
    attrs.insert("samples".to_string(), line.ints("samp_numbers").map(<[i64]>::to_vec).into());
    attrs.insert("slant_range_times".to_string(), floats("slant_range_times"));
    attrs.insert("incidence_angles".to_string(), floats("angles"));
    attrs.insert("latitudes".to_string(), degrees("lats"));
    attrs.insert("longitudes".to_string(), degrees("longs"));
    AttrValue::Map(attrs)
}

fn tie_point_entry(record: &Fields) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("first_zero_doppler_time".to_string(), record.time("first_zero_doppler_time").into());
    attrs.insert("last_zero_doppler_time".to_string(), record.time("last_zero_doppler_time").into());
    attrs.insert("line_num".to_string(), record.i64("line_num").into());
    attrs.insert("num_lines".to_string(), record.i64("num_lines").into());
    attrs.insert("sub_sat_track".to_string(), record.f64("sub_sat_track").into());
    for group in ["first_line_tie_points", "last_line_tie_points"] {
        let line = record.get(group).and_then(FieldValue::as_struct);
        attrs.insert(group.trim_end_matches("_tie_points").to_string(), tie_point_line(line));
    }
    attrs
}

pub fn read_geolocation(product: &EnvisatProduct) -> Result<Geolocation, ProductError> {
    let records = product.direct().read_records(GEOLOCATION_GRID_ADS, &GEOLOCATION_GRID_ADSR)?;
    debug!("Read {} geolocation grid records", records.len());
    Geolocation::from_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::envisat::record::decode;
    use approx::assert_relative_eq;

    fn record(slant_first: f32, center_angle: f32, line_num: u32) -> Fields {
        let mut buf = vec![0u8; GEOLOCATION_GRID_ADSR.size];
        buf[13..17].copy_from_slice(&line_num.to_be_bytes());
        buf[69..73].copy_from_slice(&slant_first.to_be_bytes());
        buf[113 + 20..113 + 24].copy_from_slice(&center_angle.to_be_bytes());
        buf[157..161].copy_from_slice(&(-42_658_570i32).to_be_bytes());
        decode(&GEOLOCATION_GRID_ADSR, &buf).unwrap()
    }

    #[test]
    fn uses_the_middle_record() {
        let records = vec![record(1.0, 10.0, 1), record(2.0, 20.0, 2), record(3.0, 30.0, 3)];
        let geo = Geolocation::from_records(&records).unwrap();
        assert_eq!(geo.slant_time_first, 2.0);
        assert_eq!(geo.incidence_angle_center, 20.0);
        assert_eq!(geo.tie_points.len(), 3);

        let first = geo.tie_points[0]["first_line"].as_map().unwrap();
        assert_relative_eq!(first["latitudes"].as_float_list().unwrap()[0], -42.65857, epsilon = 1e-9);
        assert_eq!(geo.tie_points[2]["line_num"], AttrValue::Int(3));
    }

    #[test]
    fn even_record_counts_round_up() {
        let records = vec![record(1.0, 10.0, 1), record(2.0, 20.0, 2)];
        assert_eq!(Geolocation::from_records(&records).unwrap().slant_time_first, 2.0);
    }

    #[test]
    fn missing_grid_is_an_error() {
        assert!(matches!(
            Geolocation::from_records(&[]),
            Err(ProductError::MissingField("GEOLOCATION GRID ADS"))
        ));
    }
}
