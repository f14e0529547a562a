//! High-level, ergonomic library API: open products as datasets, compute
//! derived bands, export to files and batch helpers for directories. Prefer
//! these entrypoints over the reader and assembler modules when integrating
//! asar-xarray.
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::asar::{MEASUREMENTS, open_asar_dataset};
use crate::backend::{AsarBackend, BackendEntrypoint};
use crate::core::params::{ExportParams, OpenOptions};
use crate::error::{Error, Result};
use crate::io::writers::{
    create_json_sidecar, extract_metadata_fields, sidecar_path, write_dataset_json, write_tiff_f32,
};
use crate::model::{ArrayData, AttrValue, DataArray, Dataset};
use crate::types::{DerivedOperation, OutputFormat};

/// Open a product as a labeled dataset
pub fn open_dataset(input: &Path, options: &OpenOptions) -> Result<Dataset> {
    open_asar_dataset(input, options)
}

/// Open a product and compute a derived band from its measurements.
///
/// The result keeps the measurement coordinates and attributes, is named
/// after the operation and carries an `operation` attribute.
pub fn load_derived(input: &Path, operation: DerivedOperation, options: &OpenOptions) -> Result<DataArray> {
    if options.drops(MEASUREMENTS) {
        return Err(Error::InvalidArgument {
            arg: "drop_variables",
            value: MEASUREMENTS.to_string(),
        });
    }
    let dataset = open_asar_dataset(input, options)?;
    derived_band(&dataset, operation, input)
}

fn derived_band(dataset: &Dataset, operation: DerivedOperation, input: &Path) -> Result<DataArray> {
    let measurements = dataset
        .data_var(MEASUREMENTS)
        .ok_or_else(|| Error::Processing(format!("{:?} has no {MEASUREMENTS} variable", input)))?;

    let mut derived = measurements.clone();
    derived.name = operation.name().to_string();
    derived.data = operation.apply(&measurements.data);
    derived
        .attrs
        .insert("operation".to_string(), AttrValue::from(operation.name()));
    Ok(derived)
}

/// Row-major `f32` samples of a real band
fn band_samples(band: &DataArray) -> Result<Vec<f32>> {
    match &band.data {
        ArrayData::Real(a) => Ok(a.iter().copied().collect()),
        ArrayData::Complex(_) => Err(Error::InvalidArgument {
            arg: "operation",
            value: format!("{} yields complex samples, which cannot be written as Float32", band.name),
        }),
    }
}

/// Export a product to `output` using `params`.
///
/// JSON writes the dataset description. TIFF writes the derived band chosen by
/// `params.operation` as Float32 with a JSON metadata sidecar next to it; a
/// TIFF `output` named `*.json` is rejected before anything is written.
pub fn export_to_path(input: &Path, output: &Path, params: &ExportParams) -> Result<()> {
    let options = params.open_options();
    match params.format {
        OutputFormat::JSON => {
            let dataset = open_asar_dataset(input, &options)?;
            write_dataset_json(&dataset, output)?;
        }
        OutputFormat::TIFF => {
            sidecar_path(output)?;
            let dataset = open_asar_dataset(input, &options)?;
            let band = derived_band(&dataset, params.operation, input)?;

            let (rows, cols) = band.shape();
            let samples = band_samples(&band)?;
            let description = format!("{} of {}", params.operation.name(), dataset_product(&dataset, input));
            write_tiff_f32(output, cols, rows, &samples, Some(&description))?;

            let fields = extract_metadata_fields(&dataset, Some(params.operation));
            create_json_sidecar(output, &fields)?;
        }
    }
    info!("Exported {:?} -> {:?}", input, output);
    Ok(())
}

fn dataset_product(dataset: &Dataset, input: &Path) -> String {
    dataset
        .attrs
        .get("metadata")
        .and_then(|m| m.lookup("product"))
        .and_then(AttrValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| input.display().to_string())
}

/// Batch processing report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Return an iterator over the files of `input_dir` that look like ASAR/ERS
/// products, in name order
pub fn iterate_products(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let backend = AsarBackend;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && backend.guess_can_open(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Export every product found in `input_dir` into `output_dir` using `params`.
///
/// Unsupported products are counted as skipped. If `continue_on_error` is
/// true other failures are counted in the report and processing continues;
/// otherwise the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &ExportParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();

    for path in iterate_products(input_dir)? {
        let Some(stem) = path.file_stem() else {
            report.skipped += 1;
            continue;
        };
        let output_path = output_dir.join(format!("{}.{}", stem.to_string_lossy(), params.format.extension()));
        info!("Processing: {:?} -> {:?}", path, output_path);

        match export_to_path(&path, &output_path, params) {
            Ok(()) => report.processed += 1,
            Err(Error::Unsupported(reason)) => {
                warn!("Skipping unsupported product {:?}: {}", path, reason);
                report.skipped += 1;
            }
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use num_complex::Complex;

    #[test]
    fn iterates_product_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.N1", "a.E2", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("c.N1")).unwrap();

        let found: Vec<_> = iterate_products(dir.path())
            .unwrap()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.E2", "b.N1"]);
    }

    #[test]
    fn complex_band_is_not_a_raster() {
        let band = DataArray::new(
            "conj",
            ["azimuth_time", "slant_range_time"],
            ArrayData::Complex(array![[Complex::new(1.0f32, 1.0)]]),
        );
        assert!(matches!(band_samples(&band), Err(Error::InvalidArgument { .. })));

        let real = DataArray::new("amplitude", ["a", "b"], ArrayData::Real(array![[1.0f32, 2.0], [3.0, 4.0]]));
        assert_eq!(band_samples(&real).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn batch_counts_broken_products_as_errors() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("broken.N1"), b"not a product").unwrap();

        let report =
            process_directory_to_path(input.path(), output.path(), &ExportParams::default(), true).unwrap();
        assert_eq!(report, BatchReport { processed: 0, skipped: 0, errors: 1 });

        assert!(process_directory_to_path(input.path(), output.path(), &ExportParams::default(), false).is_err());
    }
}
