//! Error types for sentinel-core

use thiserror::Error;

/// Main error type for the sentinel-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Producer/transport error (HTTP failure, dropped stream, API rejection)
    #[error("producer error: {0}")]
    Producer(String),

    /// The final report block could not be parsed. Fatal for the session.
    #[error("malformed final report: {0}")]
    MalformedReport(String),

    /// The producer completed without ever emitting a report block
    #[error("stream ended without a final report")]
    ReportMissing,
}

/// Result type alias for sentinel-core
pub type Result<T> = std::result::Result<T, Error>;
