use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::Dataset;

/// Write the dimensions, coordinates, variable summaries and attributes of
/// `dataset` as pretty-printed JSON.
pub fn write_dataset_json(dataset: &Dataset, output: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &dataset.describe())?;
    info!("Wrote dataset description: {:?}", output);
    Ok(())
}
