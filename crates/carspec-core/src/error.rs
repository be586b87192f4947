//! Error types for carspec.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Neither the page heading nor the resource identifier yielded a 4-digit year.
    #[error("No usable identity data: {0}")]
    Unparsable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
