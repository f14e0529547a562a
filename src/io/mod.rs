//! I/O layer: the ENVISAT product reader and output writers.
//! `envisat` opens products through GDAL (headers, records, bands) and reads
//! the few data sets GDAL does not decode straight from the file. `writers`
//! produce JSON descriptions, Float32 TIFF rasters and metadata sidecars.
pub mod envisat;
pub use envisat::{EnvisatProduct, ProductError, SampleType};

pub mod writers;
