//! Selection-scoped continuous axis.
//!
//! When the user picks a subset of sources to treat as one merged clip,
//! the selection gets its own axis: the chosen sources in their master
//! order, repacked back-to-back with no gaps. This axis is distinct from
//! the master axis — unselected sources between two chosen ones simply
//! vanish from it, and the skipped master intervals are reported as gaps
//! for discontinuity warnings in the UI.

use serde::Serialize;
use storycut_core::EDGE_EPSILON;

use crate::index::MasterTimelineIndex;

/// One selected source's span on the continuous axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousRange {
    pub source_id: String,
    pub continuous_start: f64,
    pub continuous_end: f64,
    /// Master-axis interval the source originally occupied.
    pub original_start: f64,
    pub original_end: f64,
}

/// A master-axis interval skipped by the selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapInterval {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// A selection repacked onto its own continuous axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedContent {
    pub ranges: Vec<ContinuousRange>,
    /// Master-axis discontinuities between consecutive selected sources.
    /// Informational only; nothing downstream depends on them.
    pub gaps: Vec<GapInterval>,
    pub total_duration: f64,
}

/// A transcript word shifted onto the continuous axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedWord {
    pub text: String,
    /// Timing on the continuous axis.
    pub start: f64,
    pub end: f64,
    pub source_id: String,
    /// Original master-axis timing, kept for traceability.
    pub master_start: f64,
    pub master_end: f64,
    pub speaker: Option<String>,
}

impl MasterTimelineIndex {
    /// Repack the given sources onto a continuous axis.
    ///
    /// Unknown ids are skipped; an empty or all-invalid selection yields
    /// an empty result. Selected sources keep their relative master
    /// order regardless of the order ids are passed in.
    pub fn selected_content(&self, source_ids: &[&str]) -> SelectedContent {
        let selected: Vec<_> = self
            .entries()
            .iter()
            .filter(|e| source_ids.contains(&e.source_id.as_str()))
            .collect();

        let mut ranges = Vec::with_capacity(selected.len());
        let mut cursor = 0.0;
        for entry in &selected {
            ranges.push(ContinuousRange {
                source_id: entry.source_id.clone(),
                continuous_start: cursor,
                continuous_end: cursor + entry.duration,
                original_start: entry.added_at,
                original_end: entry.master_end(),
            });
            cursor += entry.duration;
        }

        let gaps = selected
            .windows(2)
            .filter_map(|pair| {
                let gap_start = pair[0].master_end();
                let gap_end = pair[1].added_at;
                (gap_end - gap_start > EDGE_EPSILON).then_some(GapInterval {
                    start: gap_start,
                    end: gap_end,
                    duration: gap_end - gap_start,
                })
            })
            .collect();

        SelectedContent {
            ranges,
            gaps,
            total_duration: cursor,
        }
    }

    /// Merge the selected sources' transcripts onto the continuous axis.
    ///
    /// For each range, master words inside the source's original
    /// interval are shifted by `continuous_start - original_start`.
    pub fn merged_transcript(&self, ranges: &[ContinuousRange]) -> Vec<MergedWord> {
        let mut out = Vec::new();
        for range in ranges {
            let shift = range.continuous_start - range.original_start;
            for segment in self.merged_segments() {
                if segment.source_id != range.source_id {
                    continue;
                }
                for word in &segment.words {
                    if word.master_start >= range.original_start
                        && word.master_end <= range.original_end
                    {
                        out.push(MergedWord {
                            text: word.text.clone(),
                            start: word.master_start + shift,
                            end: word.master_end + shift,
                            source_id: segment.source_id.clone(),
                            master_start: word.master_start,
                            master_end: word.master_end,
                            speaker: word.speaker.clone(),
                        });
                    }
                }
            }
        }
        out
    }
}

// ── Tests ───────────────────────────────────────────────────────
