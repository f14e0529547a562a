//! asar-xarray CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, dispatch to
//! single-file or batch processing, and exit with appropriate status.
//! For programmatic use, prefer the library API (`asar_xarray::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), cli::errors::AppError> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
