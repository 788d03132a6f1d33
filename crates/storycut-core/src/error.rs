//! Error types for Storycut.

use thiserror::Error;

/// Main error type for Storycut operations.
#[derive(Error, Debug)]
pub enum StorycutError {
    /// Malformed time bounds (NaN, infinite, or inverted).
    #[error("Invalid time range: start {start}, end {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    /// A time mapping was attempted on a clip with zero duration.
    #[error("Clip {id} has zero duration; time mapping is undefined")]
    DegenerateClip { id: String },

    /// An operation referenced a clip id not present in the manager.
    #[error("Unknown clip: {id}")]
    UnknownClip { id: String },

    /// `move`/`trim` was called without a prior `start_modification`.
    #[error("Clip {id} has no active modification")]
    NoActiveModification { id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Storycut operations.
pub type Result<T> = std::result::Result<T, StorycutError>;
