//! Master timeline index.
//!
//! Presents independently loaded source videos as one continuous
//! addressable axis and remaps each source's transcript onto it. Source
//! durations resolve asynchronously: an entry stays provisional
//! (duration 0) until the host's metadata callback fires
//! [`MasterTimelineIndex::finalize_duration`]. Every mutation triggers a
//! full offset rebuild in registration order, never an incremental
//! patch, so the index converges no matter how callbacks interleave.

use std::collections::BTreeMap;

use serde::Serialize;
use storycut_core::{is_valid_time, TranscriptSegment};
use tracing::{debug, warn};

/// One registered source video on the master axis.
#[derive(Debug, Clone, Serialize)]
pub struct MasterEntry {
    /// Stable source key (typically the uploaded filename).
    pub source_id: String,
    /// Host-side media reference; opaque to the index.
    pub file_ref: String,
    /// Offset of this source's start on the master axis.
    pub added_at: f64,
    /// Source length in seconds; 0.0 until metadata resolves.
    pub duration: f64,
}

impl MasterEntry {
    /// End of this source on the master axis.
    pub fn master_end(&self) -> f64 {
        self.added_at + self.duration
    }
}

/// A transcript word lifted onto the master axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterWord {
    pub text: String,
    pub master_start: f64,
    pub master_end: f64,
    /// Original source-relative times, kept for traceability.
    pub source_start: f64,
    pub source_end: f64,
    pub source_id: String,
    pub speaker: Option<String>,
}

/// A transcript segment lifted onto the master axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterSegment {
    pub source_id: String,
    pub speaker: String,
    pub words: Vec<MasterWord>,
}

/// Resolution of a master-axis position to a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePosition {
    pub source_id: String,
    /// Time within the source, in source-relative seconds.
    pub relative_time: f64,
}

/// Concatenation of all loaded sources into one addressable timeline.
#[derive(Debug, Default)]
pub struct MasterTimelineIndex {
    /// Registration order; authoritative for offset recomputation.
    entries: Vec<MasterEntry>,
    /// Source-relative transcripts, keyed by source id.
    transcripts: BTreeMap<String, Vec<TranscriptSegment>>,
    /// Merged transcript, rebuilt on every recalculation.
    merged: Vec<MasterSegment>,
    total_duration: f64,
}

impl MasterTimelineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. The duration is unknown at this point; the
    /// entry is appended at the current end of the master axis and
    /// finalized later, once media metadata resolves.
    pub fn add_source(&mut self, source_id: impl Into<String>, file_ref: impl Into<String>) {
        let source_id = source_id.into();
        if self.contains_source(&source_id) {
            warn!(source = %source_id, "source already registered; ignoring");
            return;
        }
        debug!(source = %source_id, added_at = self.total_duration, "registering source");
        self.entries.push(MasterEntry {
            source_id,
            file_ref: file_ref.into(),
            added_at: self.total_duration,
            duration: 0.0,
        });
    }

    /// Record a source's duration once its metadata has loaded, then
    /// rebuild all offsets.
    ///
    /// A call for an unregistered id is a safe no-op: media loading
    /// races user actions, and the source may already be gone.
    pub fn finalize_duration(&mut self, source_id: &str, duration: f64) {
        let Some(entry) = self.entries.iter_mut().find(|e| e.source_id == source_id) else {
            warn!(source = %source_id, "finalize for unregistered source; ignoring");
            return;
        };
        entry.duration = duration;
        self.recalculate();
    }

    /// Attach a source-relative transcript to a registered source, then
    /// rebuild the merged transcript.
    pub fn attach_transcript(&mut self, source_id: &str, segments: Vec<TranscriptSegment>) {
        if !self.contains_source(source_id) {
            warn!(source = %source_id, "transcript for unregistered source; ignoring");
            return;
        }
        self.transcripts.insert(source_id.to_string(), segments);
        self.recalculate();
    }

    /// Remove a source and its transcript. A metadata callback that
    /// fires for the removed id afterwards hits the unregistered-source
    /// path and is ignored.
    pub fn remove_source(&mut self, source_id: &str) -> Option<MasterEntry> {
        let position = self.entries.iter().position(|e| e.source_id == source_id)?;
        let entry = self.entries.remove(position);
        self.transcripts.remove(source_id);
        self.recalculate();
        Some(entry)
    }

    /// Rebuild every offset as the running sum of durations in
    /// registration order, then rebuild the merged transcript. Full
    /// rebuild keeps the index convergent under any finalize ordering.
    fn recalculate(&mut self) {
        let mut cursor = 0.0;
        for entry in &mut self.entries {
            if !is_valid_time(entry.duration) || entry.duration < 0.0 {
                warn!(
                    source = %entry.source_id,
                    duration = entry.duration,
                    "invalid source duration; clamping to zero"
                );
                entry.duration = 0.0;
            }
            entry.added_at = cursor;
            cursor += entry.duration;
        }
        self.total_duration = cursor;

        self.merged.clear();
        for entry in &self.entries {
            if entry.duration <= 0.0 {
                continue;
            }
            let Some(segments) = self.transcripts.get(&entry.source_id) else {
                continue;
            };
            for segment in segments {
                if segment.words.is_empty() {
                    continue;
                }
                let words = segment
                    .words
                    .iter()
                    .map(|w| MasterWord {
                        text: w.text.clone(),
                        master_start: w.start + entry.added_at,
                        master_end: w.end + entry.added_at,
                        source_start: w.start,
                        source_end: w.end,
                        source_id: entry.source_id.clone(),
                        speaker: w.speaker.clone().or_else(|| Some(segment.speaker.clone())),
                    })
                    .collect();
                self.merged.push(MasterSegment {
                    source_id: entry.source_id.clone(),
                    speaker: segment.speaker.clone(),
                    words,
                });
            }
        }
    }

    // ── Queries ────────────────────────────────────────────────

    /// Combined length of all resolved sources.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Registered sources in registration order.
    pub fn entries(&self) -> &[MasterEntry] {
        &self.entries
    }

    pub fn contains_source(&self, source_id: &str) -> bool {
        self.entries.iter().any(|e| e.source_id == source_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a master-axis position to the source containing it.
    ///
    /// `None` when the position falls in a gap or past the end; callers
    /// treat that as a normal case, not a failure.
    pub fn source_at(&self, master_time: f64) -> Option<SourcePosition> {
        if !is_valid_time(master_time) {
            return None;
        }
        self.entries
            .iter()
            .find(|e| master_time >= e.added_at && master_time < e.master_end())
            .map(|e| SourcePosition {
                source_id: e.source_id.clone(),
                relative_time: master_time - e.added_at,
            })
    }

    /// The merged transcript on the master axis, in master order.
    pub fn merged_segments(&self) -> &[MasterSegment] {
        &self.merged
    }

    /// All merged words in master order.
    pub fn merged_words(&self) -> impl Iterator<Item = &MasterWord> {
        self.merged.iter().flat_map(|s| s.words.iter())
    }

    /// Merged segments fully contained in `[start, end]`.
    ///
    /// Containment is segment-level: a segment qualifies only when its
    /// first word starts and its last word ends inside the bounds.
    pub fn transcript_between(&self, start: f64, end: f64) -> Vec<&MasterSegment> {
        if !is_valid_time(start) || !is_valid_time(end) || end < start {
            return Vec::new();
        }
        self.merged
            .iter()
            .filter(|seg| match (seg.words.first(), seg.words.last()) {
                (Some(first), Some(last)) => first.master_start >= start && last.master_end <= end,
                _ => false,
            })
            .collect()
    }
}

// ── Tests ───────────────────────────────────────────────────────
