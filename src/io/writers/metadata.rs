use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{AttrValue, Dataset};
use crate::types::DerivedOperation;

/// Flatten the top-level attributes of `dataset` into `KEY -> text`.
///
/// Scalars are kept as their display text, lists of scalars are joined with
/// commas, nested maps and empty values are left out. Provenance keys
/// (`OPERATION`, `CONVERSION_*`) are appended.
pub fn extract_metadata_fields(
    dataset: &Dataset,
    operation: Option<DerivedOperation>,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for (key, value) in &dataset.attrs {
        let text = match value {
            AttrValue::Null | AttrValue::Map(_) => continue,
            AttrValue::List(items) => {
                if !items.iter().all(AttrValue::is_scalar) {
                    continue;
                }
                items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
            }
            AttrValue::IntList(_) | AttrValue::FloatList(_) => continue,
            scalar => scalar.to_string(),
        };
        if text.is_empty() {
            continue;
        }
        metadata.insert(key.to_uppercase(), text);
    }

    for (dim, size) in dataset.sizes() {
        metadata.insert(format!("{}_SIZE", dim.to_uppercase()), size.to_string());
    }
    if let Some(op) = operation {
        metadata.insert("OPERATION".to_string(), op.name().to_string());
    }
    metadata.insert("CONVERSION_TOOL".to_string(), env!("CARGO_PKG_NAME").to_string());
    metadata.insert("CONVERSION_VERSION".to_string(), env!("CARGO_PKG_VERSION").to_string());
    metadata.insert(
        "CONVERSION_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );

    metadata
}

/// Lowercase keys and restore numbers from their text form
pub fn convert_metadata_to_json(
    metadata: &BTreeMap<String, String>,
) -> serde_json::Map<String, serde_json::Value> {
    metadata
        .iter()
        .map(|(key, value)| {
            let json = if let Ok(num) = value.parse::<i64>() {
                serde_json::Value::from(num)
            } else if let Some(num) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                serde_json::Value::Number(num)
            } else {
                serde_json::Value::String(value.clone())
            };
            (key.to_lowercase(), json)
        })
        .collect()
}

/// Path of the JSON sidecar that accompanies `output`.
///
/// An `output` that already ends in `.json` would be its own sidecar and is
/// rejected.
pub fn sidecar_path(output: &Path) -> Result<PathBuf> {
    let is_json = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        return Err(Error::InvalidArgument {
            arg: "output",
            value: format!("{} (the metadata sidecar would replace it)", output.display()),
        });
    }
    Ok(output.with_extension("json"))
}

/// Write `fields` next to `output` as a JSON sidecar and return its path
pub fn create_json_sidecar(output: &Path, fields: &BTreeMap<String, String>) -> Result<PathBuf> {
    let path = sidecar_path(output)?;
    let json = serde_json::to_string_pretty(&convert_metadata_to_json(fields))?;
    std::fs::write(&path, json)?;
    info!("Created metadata sidecar: {:?}", path);
    Ok(path)
}
