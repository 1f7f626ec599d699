//! Error types for photo-restamp

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo-restamp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for photo-restamp
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to parse timestamp from {source_info}: {message}")]
    TimestampParse { source_info: String, message: String },

    #[error("Failed to extract video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("No embedded capture time for {path}")]
    NoMetadata { path: PathBuf },

    #[error("{tool} not found. Install it or point the configuration at its location")]
    ToolNotFound { tool: String },

    #[error("{tool} failed on {path}: {message}")]
    ToolFailed {
        tool: String,
        path: PathBuf,
        message: String,
    },

    #[error("Source directory {0} does not exist or is not a directory")]
    SourceDir(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
