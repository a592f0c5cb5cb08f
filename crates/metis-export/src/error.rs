//! Error types for metis-export

use thiserror::Error;

/// Export error type
#[derive(Debug, Error)]
pub enum Error {
    /// Destination not configured
    #[error("exporter not configured: {0}")]
    NotConfigured(String),

    /// Network failure talking to the destination
    #[error("network error: {0}")]
    Network(String),

    /// Destination rejected the append
    #[error("destination error: {0}")]
    Api(String),

    /// Local file I/O failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failure
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
