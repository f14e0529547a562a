//! Annotation records exposed under `records`, rebuilt from GDAL's `RECORDS`
//! metadata domain.
//!
//! GDAL names each field `<DATA_SET>_<FIELD>` for single-record sets and
//! `<DATA_SET>_<n>_<FIELD>` (0-based `n`) otherwise, spaces in the data set
//! name replaced by underscores. Fields inside groups read `GROUP.FIELD` or
//! `GROUP.<i>.FIELD` with a 1-based `i`. Values are text: numbers separated by
//! spaces, MJD times as `days, seconds, microseconds`.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::values::{try_parse_float_list, try_parse_int};
use crate::io::envisat::EnvisatProduct;
use crate::io::envisat::time::parse_mjd2000_text;
use crate::model::{AttrValue, Attrs};

pub const MAIN_PROCESSING_PARAMS_ADS: &str = "MAIN PROCESSING PARAMS ADS";
pub const DOP_CENTROID_COEFFS_ADS: &str = "DOP CENTROID COEFFS ADS";
pub const SR_GR_ADS: &str = "SR GR ADS";

/// Summary quality set of measurement channel `channel` (1-based)
pub fn sq_ads_name(channel: usize) -> String {
    format!("MDS{channel} SQ ADS")
}

/// Key prefix of record `index` of a set holding `num_dsr` records
pub fn record_prefix(ds_name: &str, index: usize, num_dsr: usize) -> String {
    let name = ds_name.trim().replace(' ', "_");
    if num_dsr == 1 {
        format!("{name}_")
    } else {
        format!("{name}_{index}_")
    }
}

/// Typed value of one record field
pub fn record_value(name: &str, value: &str) -> AttrValue {
    let value = value.trim();
    if name.ends_with("_flag") {
        if let Some(flag) = try_parse_int(value) {
            return AttrValue::Bool(flag != 0);
        }
    }
    if value.contains(',') {
        if let Some(time) = parse_mjd2000_text(value) {
            return AttrValue::Time(time);
        }
    }

    let parts: Vec<&str> = value.split_whitespace().collect();
    if !parts.is_empty() {
        let ints: Option<Vec<i64>> = parts.iter().map(|p| try_parse_int(p)).collect();
        if let Some(ints) = ints {
            return if ints.len() == 1 {
                AttrValue::Int(ints[0])
            } else {
                AttrValue::IntList(ints)
            };
        }
        if let Some(floats) = try_parse_float_list(value) {
            return floats;
        }
    }
    AttrValue::Text(value.to_string())
}

/// Fields of the record whose keys start with `prefix`, `GROUP.FIELD` entries
/// nested in maps and `GROUP.<i>.FIELD` entries collected into indexed lists
pub fn record_fields(records: &BTreeMap<String, String>, prefix: &str) -> Attrs {
    let mut attrs = Attrs::new();
    let mut lists: BTreeMap<String, BTreeMap<i64, Attrs>> = BTreeMap::new();

    let entries = records
        .range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix));
    for (key, value) in entries {
        let name = key[prefix.len()..].to_lowercase();
        let parts: Vec<&str> = name.split('.').collect();
        match parts.as_slice() {
            [field] => {
                attrs.insert(field.to_string(), record_value(field, value));
            }
            [group, field] => {
                let entry = attrs
                    .entry(group.to_string())
                    .or_insert_with(|| AttrValue::Map(Attrs::new()));
                if let AttrValue::Map(map) = entry {
                    map.insert(field.to_string(), record_value(field, value));
                }
            }
            [group, index, field] => {
                let Ok(index) = index.parse::<i64>() else {
                    debug!("Skipping record field {}", key);
                    continue;
                };
                lists
                    .entry(group.to_string())
                    .or_default()
                    .entry(index)
                    .or_insert_with(|| Attrs::from([("index".to_string(), AttrValue::Int(index))]))
                    .insert(field.to_string(), record_value(field, value));
            }
            _ => debug!("Skipping record field {}", key),
        }
    }

    for (group, entries) in lists {
        attrs.insert(group, AttrValue::List(entries.into_values().map(AttrValue::Map).collect()));
    }
    attrs
}

/// Number of records GDAL decoded for `name`, from its descriptor
pub fn record_count(product: &EnvisatProduct, name: &str) -> usize {
    product.data_set(name).map_or(0, |dsd| dsd.num_dsr)
}

/// First record of data set `name`, `None` when GDAL reported none of its fields
pub fn first_record(records: &BTreeMap<String, String>, name: &str, num_dsr: usize) -> Option<Attrs> {
    if num_dsr == 0 {
        return None;
    }
    let fields = record_fields(records, &record_prefix(name, 0, num_dsr));
    (!fields.is_empty()).then_some(fields)
}

/// True when every numeric value is zero; `index` entries are ignored
pub(crate) fn is_zero(value: &AttrValue) -> bool {
    match value {
        AttrValue::Int(v) => *v == 0,
        AttrValue::Float(v) => *v == 0.0,
        AttrValue::IntList(v) => v.iter().all(|x| *x == 0),
        AttrValue::FloatList(v) => v.iter().all(|x| *x == 0.0),
        AttrValue::Map(m) => m
            .iter()
            .filter(|(key, _)| key.as_str() != "index")
            .all(|(_, v)| is_zero(v)),
        AttrValue::List(l) => l.iter().all(is_zero),
        AttrValue::Null | AttrValue::Bool(_) | AttrValue::Text(_) | AttrValue::Time(_) => false,
    }
}

/// Main processing parameters with unused nominal chirp entries removed
pub fn process_main_processing_params(mut record: Attrs) -> Attrs {
    if let Some(AttrValue::List(chirps)) = record.get_mut("nominal_chirp") {
        let total = chirps.len();
        chirps.retain(|entry| !is_zero(entry));
        debug!("Keeping {} of {} nominal chirp entries", chirps.len(), total);
    }
    record
}

/// First record of every record-level annotation set present in the product
pub fn process_records_metadata(product: &EnvisatProduct, channel: usize) -> Attrs {
    let records = product.records();
    let first = |name: &str| first_record(records, name, record_count(product, name));
    let mut attrs = Attrs::new();

    match first(&sq_ads_name(channel)) {
        Some(sq) => {
            attrs.insert("measurement_sq".to_string(), sq.into());
        }
        None => warn!("No summary quality record for MDS{}", channel),
    }

    match first(MAIN_PROCESSING_PARAMS_ADS) {
        Some(mpp) => {
            attrs.insert(
                "main_processing_params".to_string(),
                process_main_processing_params(mpp).into(),
            );
        }
        None => warn!("No {} record", MAIN_PROCESSING_PARAMS_ADS),
    }

    if let Some(dop) = first(DOP_CENTROID_COEFFS_ADS) {
        attrs.insert("dop_centroid_coeffs".to_string(), dop.into());
    }
    if let Some(srgr) = first(SR_GR_ADS) {
        attrs.insert("sr_gr".to_string(), srgr.into());
    }
    attrs
}
