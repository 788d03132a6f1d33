//! Per-clip timing state and the move/trim state machine.
//!
//! A clip tracks three coordinate frames at once:
//! - **source time**: the untrimmed media file (`source_start..source_end`
//!   is the outer clamp this clip may ever reference),
//! - **current window**: the selected trim `current_in..current_out`
//!   within source time,
//! - **timeline position**: `timeline_start..timeline_end` on the shared
//!   editing axis.
//!
//! Moves translate the timeline placement without touching the window;
//! trims move one edge of both the placement and the window together,
//! clamped to the outer source bounds.

use serde::{Deserialize, Serialize};
use storycut_core::{approx_eq, clamp, is_valid_time, Result, StorycutError, TimeRange};
use tracing::warn;

use crate::log::{Modification, ModificationKind, TimingSnapshot};

// ── Descriptors ─────────────────────────────────────────────────

/// Immutable identity and source binding for a clip.
///
/// The source is referenced, never owned; `source_ref` is set at
/// creation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    /// Opaque unique id.
    pub id: String,
    /// Key of the underlying media (file handle key or source id).
    pub source_ref: String,
    /// Total duration of the referenced source media.
    pub source_duration: f64,
}

/// Request to place a new clip, as produced by bin or transcript
/// selection in the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRequest {
    pub source_ref: String,
    /// Outer clamp: earliest source time this clip may reference.
    pub source_start: f64,
    /// Outer clamp: latest source time this clip may reference.
    pub source_end: f64,
    /// Initially selected trim window.
    pub requested_in: f64,
    pub requested_out: f64,
    /// Track index. Defaults to the first row.
    #[serde(default)]
    pub row: u32,
    /// Total source media duration, when the host knows it already.
    /// Falls back to `source_end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_duration: Option<f64>,
}

/// How a clip is currently being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipState {
    Initial,
    Moving,
    Trimming,
    Completed,
}

/// What happens to the moved timeline edge when the trim clamps against
/// the source bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrimPolicy {
    /// Re-derive the moved edge from the clamped window, so the timeline
    /// duration always equals the trimmed content duration.
    #[default]
    DeriveFromSource,
    /// Keep the requested edge position even when the window clamped.
    /// The timeline length can then exceed the trimmed content length;
    /// matches the behavior of older project files.
    HonorRequestedEdges,
}

/// Pure read of a clip's timing, in all three coordinate frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingInfo {
    pub timeline_start: f64,
    pub timeline_end: f64,
    pub timeline_duration: f64,
    pub current_in: f64,
    pub current_out: f64,
    pub source_start: f64,
    pub source_end: f64,
    /// Offset of the window within the outer clamp.
    pub relative_start: f64,
    /// Length of the selected window.
    pub relative_duration: f64,
}

// ── Clip state ──────────────────────────────────────────────────

/// Mutable timing state of one clip on the timeline.
///
/// Fields are private: all mutation goes through the operation API, and
/// reads come back as owned copies. Handing out a [`TimingInfo`] can
/// never alias the stored state. Persistence goes through the validated
/// [`crate::serialization::SavedClip`] shape, so there is no
/// `Deserialize` here.
#[derive(Debug, Clone, Serialize)]
pub struct ClipTimeState {
    descriptor: ClipDescriptor,
    source_start: f64,
    source_end: f64,
    current_in: f64,
    current_out: f64,
    timeline_start: f64,
    timeline_end: f64,
    row: u32,
    state: ClipState,
    modifications: Vec<Modification>,
}

impl ClipTimeState {
    /// Validate a placement request and build the clip state.
    ///
    /// Requires `source_start <= requested_in < requested_out <=
    /// source_end`, all finite.
    pub fn new(id: impl Into<String>, request: &ClipRequest, timeline_start: f64) -> Result<Self> {
        TimeRange::new(request.source_start, request.source_end)?;
        TimeRange::new(request.requested_in, request.requested_out)?;
        if request.requested_in < request.source_start || request.requested_out > request.source_end
        {
            return Err(StorycutError::InvalidTimeRange {
                start: request.requested_in,
                end: request.requested_out,
            });
        }
        if !is_valid_time(timeline_start) {
            return Err(StorycutError::InvalidTimeRange {
                start: timeline_start,
                end: timeline_start,
            });
        }
        let source_duration = match request.source_duration {
            Some(d) if is_valid_time(d) && d > 0.0 => d,
            _ => request.source_end,
        };
        Ok(Self {
            descriptor: ClipDescriptor {
                id: id.into(),
                source_ref: request.source_ref.clone(),
                source_duration,
            },
            source_start: request.source_start,
            source_end: request.source_end,
            current_in: request.requested_in,
            current_out: request.requested_out,
            timeline_start,
            timeline_end: timeline_start + (request.requested_out - request.requested_in),
            row: request.row,
            state: ClipState::Initial,
            modifications: Vec::new(),
        })
    }

    /// Rebuild a clip from explicit timing fields (deserialization,
    /// split). Validates the source/window relationship but tolerates a
    /// timeline length that differs from the window length, since older
    /// files may carry the [`TrimPolicy::HonorRequestedEdges`] desync.
    pub(crate) fn from_parts(
        descriptor: ClipDescriptor,
        source_start: f64,
        source_end: f64,
        current_in: f64,
        current_out: f64,
        timeline_start: f64,
        timeline_end: f64,
        row: u32,
    ) -> Result<Self> {
        TimeRange::new(source_start, source_end)?;
        TimeRange::new(current_in, current_out)?;
        TimeRange::new(timeline_start, timeline_end)?;
        if current_in < source_start || current_out > source_end {
            return Err(StorycutError::InvalidTimeRange {
                start: current_in,
                end: current_out,
            });
        }
        Ok(Self {
            descriptor,
            source_start,
            source_end,
            current_in,
            current_out,
            timeline_start,
            timeline_end,
            row,
            state: ClipState::Initial,
            modifications: Vec::new(),
        })
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &ClipDescriptor {
        &self.descriptor
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn state(&self) -> ClipState {
        self.state
    }

    pub fn timeline_start(&self) -> f64 {
        self.timeline_start
    }

    pub fn timeline_end(&self) -> f64 {
        self.timeline_end
    }

    pub fn timeline_duration(&self) -> f64 {
        self.timeline_end - self.timeline_start
    }

    pub fn current_in(&self) -> f64 {
        self.current_in
    }

    pub fn current_out(&self) -> f64 {
        self.current_out
    }

    pub fn source_start(&self) -> f64 {
        self.source_start
    }

    pub fn source_end(&self) -> f64 {
        self.source_end
    }

    /// The append-only gesture log.
    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    /// Pure read of the clip's timing across all coordinate frames.
    pub fn timing_info(&self) -> TimingInfo {
        TimingInfo {
            timeline_start: self.timeline_start,
            timeline_end: self.timeline_end,
            timeline_duration: self.timeline_end - self.timeline_start,
            current_in: self.current_in,
            current_out: self.current_out,
            source_start: self.source_start,
            source_end: self.source_end,
            relative_start: self.current_in - self.source_start,
            relative_duration: self.current_out - self.current_in,
        }
    }

    fn snapshot_timing(&self) -> TimingSnapshot {
        TimingSnapshot {
            timeline_start: self.timeline_start,
            timeline_end: self.timeline_end,
            current_in: self.current_in,
            current_out: self.current_out,
        }
    }

    // ── Gesture state machine ──────────────────────────────────

    /// Begin a move or trim gesture.
    ///
    /// Pushes a fresh log entry capturing the current timing as the undo
    /// point. Re-entry while a gesture is open is allowed and pushes
    /// another entry.
    pub fn start_modification(&mut self, kind: ModificationKind) {
        self.modifications
            .push(Modification::begin(kind, self.snapshot_timing()));
        self.state = match kind {
            ModificationKind::Move => ClipState::Moving,
            ModificationKind::Trim => ClipState::Trimming,
        };
    }

    /// Translate the clip to a new timeline start.
    ///
    /// The trim window and duration are untouched; a move never alters
    /// trim. Requires an active move gesture.
    pub fn move_to(&mut self, new_timeline_start: f64) -> Result<TimingInfo> {
        if self.state != ClipState::Moving {
            return Err(StorycutError::NoActiveModification {
                id: self.descriptor.id.clone(),
            });
        }
        if !is_valid_time(new_timeline_start) {
            return Err(StorycutError::InvalidTimeRange {
                start: new_timeline_start,
                end: new_timeline_start,
            });
        }
        let delta = new_timeline_start - self.timeline_start;
        self.timeline_start += delta;
        self.timeline_end += delta;
        Ok(self.timing_info())
    }

    /// Apply a trim gesture with the requested timeline edges.
    ///
    /// Which edge moved is inferred by comparing against the previous
    /// placement within [`storycut_core::EDGE_EPSILON`]; the end edge is
    /// checked first. The moved edge's delta is applied to the matching
    /// window bound and clamped to the outer source bounds; what happens
    /// to the timeline edge after clamping is decided by `policy`.
    /// Requires an active trim gesture.
    pub fn trim_to(
        &mut self,
        new_timeline_start: f64,
        new_timeline_end: f64,
        policy: TrimPolicy,
    ) -> Result<TimingInfo> {
        if self.state != ClipState::Trimming {
            return Err(StorycutError::NoActiveModification {
                id: self.descriptor.id.clone(),
            });
        }
        TimeRange::new(new_timeline_start, new_timeline_end)?;

        let end_moved = !approx_eq(new_timeline_end, self.timeline_end);
        let start_moved = !approx_eq(new_timeline_start, self.timeline_start);
        if end_moved && start_moved {
            // A single gesture should move one edge. Resolve in favor of
            // the end edge, matching the detection order callers rely on.
            warn!(
                clip = %self.descriptor.id,
                "trim moved both edges; treating as a right trim"
            );
        }

        if end_moved {
            let delta = new_timeline_end - self.timeline_end;
            self.current_out = clamp(self.current_out + delta, self.source_start, self.source_end);
            self.timeline_end = match policy {
                TrimPolicy::DeriveFromSource => {
                    self.timeline_start + (self.current_out - self.current_in)
                }
                TrimPolicy::HonorRequestedEdges => new_timeline_end,
            };
        } else if start_moved {
            let delta = new_timeline_start - self.timeline_start;
            self.current_in = clamp(self.current_in + delta, self.source_start, self.source_end);
            self.timeline_start = match policy {
                TrimPolicy::DeriveFromSource => {
                    self.timeline_end - (self.current_out - self.current_in)
                }
                TrimPolicy::HonorRequestedEdges => new_timeline_start,
            };
        }
        Ok(self.timing_info())
    }

    /// Finalize the current gesture.
    pub fn complete_modification(&mut self) -> TimingInfo {
        let after = self.snapshot_timing();
        if let Some(last) = self.modifications.last_mut() {
            if !last.is_completed() {
                last.complete(after);
            }
        }
        self.state = ClipState::Completed;
        self.timing_info()
    }

    /// Pop the most recent log entry and restore its starting timing.
    ///
    /// Works on both finalized and still-open gestures (undoing an open
    /// gesture cancels it). Returns `None` when the log is empty.
    pub fn undo(&mut self) -> Option<TimingInfo> {
        let entry = self.modifications.pop()?;
        let before = entry.before;
        self.timeline_start = before.timeline_start;
        self.timeline_end = before.timeline_end;
        self.current_in = before.current_in;
        self.current_out = before.current_out;
        self.state = ClipState::Completed;
        Some(self.timing_info())
    }

    // ── Time mapping ───────────────────────────────────────────

    /// Mapping is defined only while both the timeline span and the
    /// trim window have positive length; a collapsed clip must error
    /// instead of dividing toward NaN or infinity.
    fn check_mappable(&self) -> Result<()> {
        let duration = self.timeline_end - self.timeline_start;
        let window = self.current_out - self.current_in;
        if duration <= 0.0 || window <= 0.0 {
            return Err(StorycutError::DegenerateClip {
                id: self.descriptor.id.clone(),
            });
        }
        Ok(())
    }

    /// Map a timeline position inside this clip to source time, by
    /// linear interpolation across the trim window.
    pub fn map_timeline_to_source(&self, timeline_position: f64) -> Result<f64> {
        if !is_valid_time(timeline_position) {
            return Err(StorycutError::InvalidTimeRange {
                start: timeline_position,
                end: timeline_position,
            });
        }
        self.check_mappable()?;
        let duration = self.timeline_end - self.timeline_start;
        let progress = (timeline_position - self.timeline_start) / duration;
        Ok(self.current_in + progress * (self.current_out - self.current_in))
    }

    /// Inverse of [`Self::map_timeline_to_source`].
    pub fn map_source_to_timeline(&self, source_position: f64) -> Result<f64> {
        if !is_valid_time(source_position) {
            return Err(StorycutError::InvalidTimeRange {
                start: source_position,
                end: source_position,
            });
        }
        self.check_mappable()?;
        let window = self.current_out - self.current_in;
        let progress = (source_position - self.current_in) / window;
        Ok(self.timeline_start + progress * (self.timeline_end - self.timeline_start))
    }

    // ── Internal mutation (layout & split) ─────────────────────

    /// Shift the clip to a new timeline start, preserving its duration.
    /// Used by row re-layout; bypasses the gesture log since re-layout is
    /// derived-state recalculation, not a user gesture.
    pub(crate) fn shift_to(&mut self, new_start: f64) {
        let duration = self.timeline_end - self.timeline_start;
        self.timeline_start = new_start;
        self.timeline_end = new_start + duration;
    }

    /// Split this clip at a timeline position strictly inside it.
    ///
    /// The left half (self) keeps everything before the cut; the
    /// returned right half continues from the cut's source position
    /// under the given id.
    pub(crate) fn split_at(&mut self, at: f64, right_id: String) -> Result<ClipTimeState> {
        if !is_valid_time(at) || at <= self.timeline_start {
            return Err(StorycutError::InvalidTimeRange {
                start: self.timeline_start,
                end: at,
            });
        }
        if at >= self.timeline_end {
            return Err(StorycutError::InvalidTimeRange {
                start: at,
                end: self.timeline_end,
            });
        }
        let source_cut = self.map_timeline_to_source(at)?;

        let right = ClipTimeState::from_parts(
            ClipDescriptor {
                id: right_id,
                source_ref: self.descriptor.source_ref.clone(),
                source_duration: self.descriptor.source_duration,
            },
            self.source_start,
            self.source_end,
            source_cut,
            self.current_out,
            at,
            self.timeline_end,
            self.row,
        )?;

        self.current_out = source_cut;
        self.timeline_end = at;
        Ok(right)
    }
}

// ── Tests ───────────────────────────────────────────────────────
