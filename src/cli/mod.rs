//! Command Line Interface (CLI) layer for asar-xarray.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and batch
//! flows. It wires user-provided options to the library functionality
//! exposed via `asar_xarray::api`.
//!
//! If you are embedding asar-xarray into another application, prefer using
//! the high-level `asar_xarray::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
