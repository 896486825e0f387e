//! Error types for catalog loading and form event parsing.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type HardwareResult<T> = Result<T, HardwareError>;

/// Errors raised outside the form transitions themselves.
///
/// State transitions are total and never fail; these errors only come from
/// reading catalogs and profiles, or from parsing edit events.
#[derive(Error, Debug)]
pub enum HardwareError {
    /// A catalog or profile file could not be read.
    #[error("Failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },

    /// A catalog or profile file could not be parsed.
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The catalog is missing entries the form depends on.
    #[error("Catalog is empty: {0}")]
    EmptyCatalog(String),

    /// An edit event could not be parsed.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
