//! Product metadata decoded into attribute trees.
//!
//! - `values`: typing of ASCII header text (times, floats, coordinates, ints)
//! - `general`: MPH, SPH and data set descriptor attributes
//! - `records`: annotation records (`measurement_sq`, `main_processing_params`, ...)
//! - `chirp`, `antenna`: dedicated annotation sets decoded by GDAL
//! - `geolocation`, `calibration`: data read directly from the file
//! - `derived`: derived subdataset listing
pub mod antenna;
pub mod calibration;
pub mod chirp;
pub mod derived;
pub mod general;
pub mod geolocation;
pub mod records;
pub mod values;

pub use calibration::CalibrationVectors;
pub use derived::DerivedSubdataset;
pub use geolocation::Geolocation;

use crate::model::{AttrValue, Attrs};

/// Everything known about a product apart from its pixels
#[derive(Debug, Clone)]
pub struct ProductMetadata {
    /// Selected measurement channel (1-based `MDSn`)
    pub channel: usize,
    /// Flat MPH, SPH and descriptor attributes
    pub general: Attrs,
    pub records: Attrs,
    pub derived_subdatasets: Vec<DerivedSubdataset>,
    pub chirp_parameters: Option<Attrs>,
    pub antenna_elevation_pattern: AttrValue,
    pub geolocation: Geolocation,
    pub calibration_vectors: Option<CalibrationVectors>,
}

impl ProductMetadata {
    /// General (header) attribute by lowercase key
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.general.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    /// First main processing parameters record
    pub fn main_processing_params(&self) -> Option<&Attrs> {
        self.records.get("main_processing_params").and_then(AttrValue::as_map)
    }

    /// `MDSn_TX_RX_POLAR` of every channel present in the SPH, in channel order
    pub fn channel_polarizations(&self) -> Vec<(usize, String)> {
        (1..)
            .map_while(|n| {
                self.get_str(&format!("mds{n}_tx_rx_polar"))
                    .map(|p| (n, p.to_string()))
            })
            .filter(|(_, p)| !p.trim().is_empty())
            .collect()
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = self.general.clone();
        attrs.insert("records".to_string(), self.records.clone().into());
        attrs.insert(
            "derived_subdatasets".to_string(),
            AttrValue::List(
                self.derived_subdatasets
                    .iter()
                    .map(|s| AttrValue::Map(s.to_attrs()))
                    .collect(),
            ),
        );
        attrs.insert("chirp_parameters".to_string(), self.chirp_parameters.clone().into());
        attrs.insert(
            "antenna_elevation_pattern".to_string(),
            self.antenna_elevation_pattern.clone(),
        );
        attrs.insert("geolocation".to_string(), self.geolocation.to_attrs().into());
        if let Some(vectors) = &self.calibration_vectors {
            attrs.insert("calibration_vectors".to_string(), vectors.to_attrs().into());
        }
        attrs
    }
}
