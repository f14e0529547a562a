#![doc = r#"
asar-xarray: ESA ASAR and ERS-1/2 SAR Level-1 products as labeled datasets.

This crate reads products in the ENVISAT container format (`.N1`, `.E1`, `.E2`)
through GDAL's ENVISAT driver and assembles them into an xarray-like [`Dataset`]: a `measurements`
variable on `(azimuth_time, slant_range_time)` with `line`/`pixel` coordinates,
the product headers and annotation records as typed attributes, and derived
bands (amplitude, phase, intensity, ...) for complex products.

Stability
---------
The public library API is experimental in initial releases and may evolve as the
crate stabilizes. Breaking changes can occur.

Add dependency
--------------
```toml
[dependencies]
asar-xarray = "0.1"
```

Quick start: open a product
---------------------------
```rust,no_run
use std::path::Path;
use asar_xarray::{open_dataset, OpenOptions, Polarization};

fn main() -> asar_xarray::Result<()> {
    let options = OpenOptions::default().with_polarization(Polarization::Vv);
    let ds = open_dataset(Path::new("/data/ASA_IMS_1PNESA20040109.N1"), &options)?;

    println!("{ds}");
    if let Some(measurements) = ds.data_var("measurements") {
        println!("shape = {:?}", measurements.shape());
    }
    Ok(())
}
```

Metadata only
-------------
Dropping `measurements` skips pixel decoding; coordinates and attributes stay.

```rust,no_run
use std::path::Path;
use asar_xarray::{open_dataset, OpenOptions};

fn main() -> asar_xarray::Result<()> {
    let options = OpenOptions::default().dropping("measurements");
    let ds = open_dataset(Path::new("/data/ASA_IMP_1PNESA20040109.N1"), &options)?;
    println!("{:?}", ds.attrs.get("range_sampling_rate"));
    Ok(())
}
```

Derived bands and export
------------------------
```rust,no_run
use std::path::Path;
use asar_xarray::{export_to_path, load_derived, DerivedOperation, ExportParams, OpenOptions, OutputFormat};

fn main() -> asar_xarray::Result<()> {
    let input = Path::new("/data/ASA_IMS_1PNESA20040109.N1");
    let amplitude = load_derived(input, DerivedOperation::Amplitude, &OpenOptions::default())?;
    println!("{} {:?}", amplitude.name, amplitude.shape());

    let params = ExportParams {
        format: OutputFormat::TIFF,
        operation: DerivedOperation::Intensity,
        ..ExportParams::default()
    };
    export_to_path(input, Path::new("/out/scene.tiff"), &params)
}
```

Batch helpers
-------------
```rust,no_run
use std::path::Path;
use asar_xarray::{process_directory_to_path, ExportParams};

fn main() -> asar_xarray::Result<()> {
    let report = process_directory_to_path(
        Path::new("/data/asar"),
        Path::new("/out"),
        &ExportParams::default(),
        true, // continue_on_error
    )?;

    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Error handling
--------------
All public functions return `asar_xarray::Result<T>`; match on `asar_xarray::Error` to handle
specific cases, e.g. product reader errors.

```rust,no_run
use std::path::Path;
use asar_xarray::{open_dataset, Error, OpenOptions};

fn main() {
    match open_dataset(Path::new("/bad/path.N1"), &OpenOptions::default()) {
        Ok(ds) => println!("{ds}"),
        Err(Error::Product(e)) => eprintln!("Product error: {e}"),
        Err(Error::Unsupported(e)) => eprintln!("Unsupported: {e}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points.
- [`backend`]: engine-style entry point with format sniffing.
- [`model`]: `Dataset`, `DataArray`, `Coordinate` and attribute values.
- [`io`]: GDAL-backed ENVISAT reader and output writers.
- [`metadata`]: header and annotation record decoding.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod asar;
pub mod backend;
pub mod core;
pub mod error;
pub mod io;
pub mod metadata;
pub mod model;
pub mod types;

// Curated public API surface
// Types
pub use core::params::{ExportParams, OpenOptions};
pub use error::{Error, Result};
pub use model::{ArrayData, AttrValue, Attrs, Coordinate, DataArray, Dataset};
pub use types::{AcquisitionMode, DerivedOperation, OutputFormat, Polarization, ProductFamily};

// Readers
pub use backend::{AsarBackend, BackendEntrypoint};
pub use io::{EnvisatProduct, ProductError, SampleType};

// Selected writer helpers
pub use io::writers::metadata::{create_json_sidecar, extract_metadata_fields, sidecar_path};

// High-level API re-exports
pub use api::{
    BatchReport, export_to_path, iterate_products, load_derived, open_dataset,
    process_directory_to_path,
};
