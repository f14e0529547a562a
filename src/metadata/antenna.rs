use std::collections::BTreeMap;

use tracing::debug;

use crate::io::envisat::EnvisatProduct;
use crate::model::{AttrValue, Attrs};

use super::records::{record_count, record_fields, record_prefix};

pub fn antenna_ads_name(channel: usize) -> String {
    format!("MDS{channel} ANTENNA ELEV PATT ADS")
}

/// One record with the `elevation_pattern` group flattened into the entry
pub fn elevation_pattern_entry(record: Attrs) -> Attrs {
    let mut entry = Attrs::new();
    for (name, value) in record {
        match value {
            AttrValue::Map(pattern) => entry.extend(pattern),
            other => {
                entry.insert(name, other);
            }
        }
    }
    entry
}

/// Every decoded record of an antenna elevation pattern set holding `num_dsr` records
pub fn elevation_patterns(records: &BTreeMap<String, String>, name: &str, num_dsr: usize) -> AttrValue {
    let entries: Vec<AttrValue> = (0..num_dsr)
        .map(|index| record_fields(records, &record_prefix(name, index, num_dsr)))
        .filter(|record| !record.is_empty())
        .map(|record| AttrValue::Map(elevation_pattern_entry(record)))
        .collect();
    debug!("Collected {} of {} records from {}", entries.len(), num_dsr, name);
    AttrValue::List(entries)
}

/// Antenna elevation patterns of measurement channel `channel`
pub fn read_antenna_elevation_pattern(product: &EnvisatProduct, channel: usize) -> AttrValue {
    let name = antenna_ads_name(channel);
    elevation_patterns(product.records(), &name, record_count(product, &name))
}
