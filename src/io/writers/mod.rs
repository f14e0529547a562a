//! Output writers: dataset descriptions as JSON, derived bands as Float32
//! TIFF and flat metadata sidecars.
pub mod json;
pub mod metadata;
pub mod tiff;

pub use self::json::write_dataset_json;
pub use self::metadata::{create_json_sidecar, extract_metadata_fields, sidecar_path};
pub use self::tiff::write_tiff_f32;
