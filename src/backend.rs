//! Backend entry point in the shape of an xarray engine plugin.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::asar::open_asar_dataset;
use crate::core::params::OpenOptions;
use crate::error::Result;
use crate::model::Dataset;
use crate::types::Polarization;

/// File extensions of ENVISAT-container products
const EXTENSIONS: [&str; 3] = ["n1", "e1", "e2"];
/// Leading MPH bytes identifying ASAR and ERS products
const MAGIC: [&[u8]; 2] = [b"PRODUCT=\"ASA_", b"PRODUCT=\"SAR_"];

pub trait BackendEntrypoint {
    fn description(&self) -> &'static str;

    fn url(&self) -> &'static str;

    fn open_dataset(
        &self,
        path: &Path,
        drop_variables: &[String],
        polarization: Option<Polarization>,
    ) -> Result<Dataset>;

    fn guess_can_open(&self, path: &Path) -> bool;
}

/// Backend for ESA ASAR and ERS SAR Level-1 products
#[derive(Debug, Clone, Copy, Default)]
pub struct AsarBackend;

impl BackendEntrypoint for AsarBackend {
    fn description(&self) -> &'static str {
        "Backend for ESA ASAR/ERS SAR products in the ENVISAT format"
    }

    fn url(&self) -> &'static str {
        "https://earth.esa.int/eogateway/instruments/asar"
    }

    fn open_dataset(
        &self,
        path: &Path,
        drop_variables: &[String],
        polarization: Option<Polarization>,
    ) -> Result<Dataset> {
        let options = OpenOptions {
            polarization,
            drop_variables: drop_variables.to_vec(),
        };
        open_asar_dataset(path, &options)
    }

    fn guess_can_open(&self, path: &Path) -> bool {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        by_extension || has_product_magic(path)
    }
}

fn has_product_magic(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let mut head = [0u8; 13];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut head))
        .is_ok_and(|_| MAGIC.iter().any(|m| head.starts_with(m)))
}
