//! Error types for PolicySage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Not enough usable documents to compare.
    #[error("{0}")]
    Input(String),

    /// The multipart form could not be decoded.
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The generative service rejected or failed the request.
    #[error("{0}")]
    Upstream(String),

    /// The model output was neither valid JSON nor recoverable.
    /// `raw` holds the untouched response for diagnostics.
    #[error("Could not decode model response")]
    Decode { raw: String },

    /// The model output parsed but does not have the required shape.
    #[error("Invalid response structure: {0}")]
    Structural(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
