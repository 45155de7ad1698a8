use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the report generator.
#[derive(Error, Debug)]
pub enum WrappedError {
    /// A path or parameter supplied by the user is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An export file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An export file is not a valid JSON array of records.
    #[error("Failed to parse {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record field could not be converted to its required type.
    #[error("Malformed record in {path}: {detail}")]
    MalformedRecord { path: PathBuf, detail: String },

    /// An extended-only report section was requested on data that was
    /// loaded from the simple export format. Recoverable: the caller
    /// warns and skips the section.
    #[error("Section '{0}' requires the extended export format")]
    UnsupportedSection(String),

    /// The chart backend failed to draw a page.
    #[error("Failed to render page: {0}")]
    Render(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the wrapped crates.
pub type Result<T> = std::result::Result<T, WrappedError>;
