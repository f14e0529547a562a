//! Reader for the ENVISAT product container used by ASAR and re-packaged ERS
//! SAR Level-1 products.
//!
//! A product is laid out as a fixed-size ASCII main product header (MPH), an
//! ASCII specific product header (SPH) ending in data set descriptors (DSDs),
//! followed by binary annotation (ADS) and measurement (MDS) data sets.
//!
//! Headers, annotation records and pixels come from GDAL's ENVISAT driver
//! (`product`). GDAL does not expose the geolocation grid tie points or the
//! calibration vectors appended to extended main processing records, so those
//! are read straight from the file through the descriptors (`direct`).
pub mod direct;
pub mod dsd;
pub mod header;
pub mod layout;
pub mod product;
pub mod record;
pub mod time;

pub use direct::DirectAccess;
pub use dsd::{DSD_SIZE, DataSetType, Dsd};
pub use header::{Header, HeaderField};
pub use layout::{FieldKind, RecordLayout};
pub use product::{EnvisatProduct, MDSR_HEADER_SIZE, SampleType};
pub use record::{FieldValue, Fields};

use thiserror::Error;

/// Size of the main product header in bytes
pub const MPH_SIZE: usize = 1247;

/// Errors encountered when reading ENVISAT products
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("Not an ENVISAT product: {0}")]
    NotEnvisat(String),
    #[error("Missing field `{0}` in product")]
    MissingField(&'static str),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Truncated {what}: need {needed} bytes, {available} available")]
    Truncated {
        what: String,
        needed: u64,
        available: u64,
    },
    #[error("Unsupported measurement data type: {0}")]
    UnsupportedDataType(String),
    #[error("Unknown data set: {0}")]
    UnknownDataSet(String),
    #[error("Raster read failed for {0}")]
    RasterIo(String),
    #[error("Polarization {requested} not found, available: {available}")]
    Polarization { requested: String, available: String },
}
