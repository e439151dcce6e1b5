//! Error types for trajectory I/O operations.

use std::path::PathBuf;

use thiserror::Error;
use trajectory_core::TrajectoryError;
use trajectory_types::SpecError;

/// Result type for trajectory I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing trajectory streams.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The stream declares a binary format version outside the supported
    /// range.
    #[error("unsupported trajectory format version {version:#06x}")]
    UnsupportedVersion {
        /// The declared version.
        version: u16,
    },

    /// Invalid stream content (parse error).
    #[error("invalid trajectory content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// The stream ended before a complete field could be read.
    #[error("unexpected end of stream at byte {position}")]
    UnexpectedEof {
        /// Byte offset where data ran out.
        position: usize,
    },

    /// A field exceeds the size its wire encoding can express.
    #[error("{what} count {count} exceeds the binary format limit")]
    TooLarge {
        /// Which field overflowed.
        what: &'static str,
        /// The offending count.
        count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// String conversion error.
    #[error("string conversion error: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// JSON readable serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The deserialized specification is invalid.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The deserialized waypoint data was rejected by the trajectory.
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
