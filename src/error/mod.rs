//! Error handling for the discharge dashboard pipeline.
//!
//! Only load and configuration problems are fatal. Missing canonical fields
//! and malformed cell values are absorbed by the pipeline and never surface
//! here.

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub mod util;

/// Specialized error type for the dashboard pipeline
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Error opening or reading a file
    #[error("IO error for {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Error building or transforming Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error decoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Every supported tabular format failed to read the input file
    #[error("Failed to load {}:\n{}", path.display(), attempts.join("\n"))]
    Load {
        /// Input file path
        path: PathBuf,
        /// One message per attempted format
        attempts: Vec<String>,
    },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Create an IO error bound to a path
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create an IO error from a message rather than an OS error
    pub fn io_message(path: &Path, message: impl Into<String>) -> Self {
        Self::io(path, io::Error::other(message.into()))
    }
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
