use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the card generation pipeline.
///
/// Every failure aborts the whole run; there are no retries anywhere.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("malformed number {number:?}: {reason}")]
    InvalidNumberFormat { number: String, reason: String },

    #[error("failed to load font: {0}")]
    FontLoad(String),

    #[error("barcode encoding failed: {0}")]
    BarcodeEncode(String),

    #[error("failed to write output document: {0}")]
    DocumentWrite(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CardError>;
