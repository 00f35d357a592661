use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool fetches, ranks, or writes contest findings.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading the local data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a remote endpoint cannot be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when a remote endpoint answers with a non-success status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Raised when JSON parsing fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when base64 file content returned by GitHub cannot be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Raised when a payload is structurally valid but misses expected data.
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a background blocking task panics or is cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Raised when the user provides a data directory that does not exist.
    #[error("input directory not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when neither a remote repository nor a local directory is given.
    #[error("either --repo or --local must be provided")]
    MissingSource,

    /// Raised when no label is available to name the output file.
    #[error("an output label is required: pass --name or --repo")]
    MissingLabel,

    /// Raised in strict mode when at least one finding entry failed.
    #[error("{failed} of {total} finding entries could not be collected")]
    CollectionFailed { failed: usize, total: usize },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
