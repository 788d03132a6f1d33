//! Storycut Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types used throughout Storycut:
//! - Time representation (seconds-based, with gesture tolerance)
//! - Error types
//! - Transcript data (word-level timing, consumed from the host)

pub mod error;
pub mod time;
pub mod transcript;

pub use error::{Result, StorycutError};
pub use time::{approx_eq, clamp, is_valid_time, TimeRange, EDGE_EPSILON};
pub use transcript::{TranscriptSegment, TranscriptWord};
