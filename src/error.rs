//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, product reader, TIFF and JSON errors, and provides
//! semantic variants for argument validation and dataset assembly failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Product reader error: {0}")]
    Product(#[from] crate::io::ProductError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Unsupported product: {0}")]
    Unsupported(String),

    #[error("Dimension error: {0}")]
    Dimension(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl Error {
    pub fn dimension<S: Into<String>>(msg: S) -> Self {
        Error::Dimension(msg.into())
    }
}
