use clap::Parser;
use std::path::PathBuf;

use asar_xarray::{DerivedOperation, OutputFormat, Polarization};

#[derive(Parser)]
#[command(name = "asar-xarray", version, about = "ASAR/ERS SAR product reader")]
pub struct CliArgs {
    /// Input product file (.N1, .E1, .E2) (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing product files (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single file mode). Without it the dataset is printed
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (json or tiff)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Measurement channel to read (hh, vv, hv or vh); defaults to MDS1
    #[arg(long, value_enum)]
    pub polarization: Option<Polarization>,

    /// Derived band written for tiff output
    #[arg(long, value_enum)]
    pub operation: Option<DerivedOperation>,

    /// JSON file with export parameters; explicit flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue processing other files when a product fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
