use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::model::{AttrValue, Attrs};
use crate::types::DerivedOperation;

/// A derived view over the pixels of a product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSubdataset {
    pub operation: DerivedOperation,
    pub filepath: String,
    pub description: String,
}

impl DerivedSubdataset {
    pub fn to_attrs(&self) -> Attrs {
        Attrs::from([
            ("operation".to_string(), AttrValue::from(self.operation.name())),
            ("filepath".to_string(), self.filepath.clone().into()),
            ("description".to_string(), self.description.clone().into()),
        ])
    }
}

/// Subdatasets listed in GDAL's `DERIVED_SUBDATASETS` domain, in index order.
///
/// Entries come in pairs: `DERIVED_SUBDATASET_<n>_NAME` holding
/// `DERIVED_SUBDATASET:<OPERATION>:<path>` and `DERIVED_SUBDATASET_<n>_DESC`.
pub fn derived_subdatasets(metadata: &BTreeMap<String, String>) -> Vec<DerivedSubdataset> {
    let mut names: BTreeMap<usize, (DerivedOperation, String)> = BTreeMap::new();
    let mut descriptions: BTreeMap<usize, String> = BTreeMap::new();

    for (key, value) in metadata {
        let Some((index, field)) = key
            .strip_prefix("DERIVED_SUBDATASET_")
            .and_then(|rest| rest.split_once('_'))
        else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        match field {
            "NAME" => {
                let mut parts = value.splitn(3, ':');
                let (_, Some(operation), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
                    debug!("Malformed derived subdataset name {:?}", value);
                    continue;
                };
                match DerivedOperation::from_name(operation) {
                    Some(op) => {
                        names.insert(index, (op, path.to_string()));
                    }
                    None => debug!("Unknown derived operation {:?}", operation),
                }
            }
            "DESC" => {
                descriptions.insert(index, value.clone());
            }
            _ => {}
        }
    }

    names
        .into_iter()
        .map(|(index, (operation, filepath))| DerivedSubdataset {
            operation,
            filepath,
            description: descriptions.remove(&index).unwrap_or_default(),
        })
        .collect()
}
