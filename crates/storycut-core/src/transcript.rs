//! Transcript data types.
//!
//! Transcripts arrive pre-parsed from the host (one per source video)
//! with word-level timing in source-relative seconds. The engine reads
//! only text and timing; everything else is carried through untouched.

use serde::{Deserialize, Serialize};

/// A single transcribed word with timing information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptWord {
    /// The transcribed text.
    #[serde(alias = "word")]
    pub text: String,
    /// Start time in seconds, relative to the source media.
    pub start: f64,
    /// End time in seconds, relative to the source media.
    pub end: f64,
    /// Speaker label, when diarization is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// A speaker-attributed run of words.
///
/// Hosts may decorate segments with extra fields (confidence, display
/// formatting, …); those are preserved opaquely across round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label for the whole segment.
    pub speaker: String,
    /// Words in reading order.
    pub words: Vec<TranscriptWord>,
    /// Unrecognized fields, passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TranscriptSegment {
    /// Start time of the segment: its first word's start.
    pub fn start(&self) -> Option<f64> {
        self.words.first().map(|w| w.start)
    }

    /// End time of the segment: its last word's end.
    pub fn end(&self) -> Option<f64> {
        self.words.last().map(|w| w.end)
    }
}
