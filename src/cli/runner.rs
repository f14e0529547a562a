use std::fs;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use asar_xarray::api::{export_to_path, open_dataset, process_directory_to_path};
use asar_xarray::ExportParams;

use super::args::CliArgs;
use super::errors::AppError;

fn load_config(path: &Path) -> Result<ExportParams, AppError> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| AppError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Config file values overridden by the flags given on the command line
fn export_params(args: &CliArgs) -> Result<ExportParams, AppError> {
    let mut params = match &args.config {
        Some(path) => load_config(path)?,
        None => ExportParams::default(),
    };
    if let Some(format) = args.format {
        params.format = format;
    }
    if args.polarization.is_some() {
        params.polarization = args.polarization;
    }
    if let Some(operation) = args.operation {
        params.operation = operation;
    }
    Ok(params)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    if args.log {
        init_logging();
    }

    let params = export_params(&args)?;
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.as_deref().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.as_deref().ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = process_directory_to_path(input_dir, output_dir, &params, args.batch)?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.as_deref().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;

        match args.output.as_deref() {
            Some(output) => {
                export_to_path(input, output, &params)?;
                info!("Successfully processed: {:?} -> {:?}", input, output);
            }
            None => {
                let dataset = open_dataset(input, &params.open_options())?;
                println!("{dataset}");
            }
        }
    }

    Ok(())
}
