//! MPH, SPH and data set descriptor attributes from GDAL's default metadata domain.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::values::{try_parse_datetime, try_parse_float, try_parse_float_list, try_parse_int, try_parse_latlong};
use crate::model::{AttrValue, Attrs};

static UNDERSCORES_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"_+").ok());

/// Entries under `prefix` with the prefix removed and the key lowercased
fn prefixed<'a>(
    metadata: &'a BTreeMap<String, String>,
    prefix: &'a str,
) -> impl Iterator<Item = (String, &'a str)> + 'a {
    metadata
        .iter()
        .filter_map(move |(key, value)| key.strip_prefix(prefix).map(|k| (k.to_lowercase(), value.trim())))
}

pub fn process_mph_metadata(metadata: &BTreeMap<String, String>) -> Attrs {
    prefixed(metadata, "MPH_")
        .map(|(key, value)| {
            let typed = try_parse_datetime(value)
                .map(AttrValue::Time)
                .or_else(|| try_parse_float(value).map(AttrValue::Float))
                .or_else(|| try_parse_int(value).map(AttrValue::Int))
                .unwrap_or_else(|| AttrValue::Text(value.to_string()));
            (key, typed)
        })
        .collect()
}

pub fn process_sph_metadata(metadata: &BTreeMap<String, String>) -> Attrs {
    prefixed(metadata, "SPH_")
        .map(|(key, value)| {
            let typed = type_sph_value(&key, value);
            (key, typed)
        })
        .collect()
}

/// Corner coordinates are the only SPH entries named `*_lat` / `*_long`
fn is_coordinate_key(key: &str) -> bool {
    key.ends_with("_lat") || key.ends_with("_long")
}

fn type_sph_value(key: &str, value: &str) -> AttrValue {
    if let Some(t) = try_parse_datetime(value) {
        return AttrValue::Time(t);
    }
    if let Some(v) = try_parse_float(value) {
        return AttrValue::Float(v);
    }
    if is_coordinate_key(key) {
        if let Some(v) = try_parse_latlong(value) {
            return AttrValue::Float(v);
        }
    }
    if let Some(v) = try_parse_int(value) {
        return AttrValue::Int(v);
    }
    if let Some(list) = try_parse_float_list(value) {
        return list;
    }
    AttrValue::Text(value.to_string())
}

/// `DS_MDS1_SQ_ADS_NAME` style key without the prefix, duplicate underscores
/// collapsed: `mds1_sq_ads_name`
pub fn data_set_key(key: &str) -> String {
    let collapsed = match UNDERSCORES_RE.as_ref() {
        Some(re) => re.replace_all(key, "_").into_owned(),
        None => key.to_string(),
    };
    collapsed.trim_matches('_').to_lowercase()
}

/// File names of data sets stored in (or referencing) external files
pub fn process_ds_metadata(metadata: &BTreeMap<String, String>) -> Attrs {
    metadata
        .iter()
        .filter_map(|(key, value)| key.strip_prefix("DS_").map(|k| (data_set_key(k), value)))
        .inspect(|(key, _)| debug!("Adding descriptor attribute {}", key))
        .map(|(key, value)| (key, AttrValue::Text(value.trim().to_string())))
        .collect()
}

/// MPH, SPH and descriptor attributes merged into one flat map
pub fn process_general_metadata(metadata: &BTreeMap<String, String>) -> Attrs {
    let mut attrs = process_mph_metadata(metadata);
    attrs.extend(process_sph_metadata(metadata));
    attrs.extend(process_ds_metadata(metadata));
    attrs
}
