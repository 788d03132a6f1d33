//! Shared store of clip states.
//!
//! The manager owns every [`ClipTimeState`] exclusively; UI layers hold
//! only the id strings and the plain-record snapshots returned by each
//! operation. It is an explicitly constructed value, passed by reference
//! from the application composition root: one per open timeline, a fresh
//! one per test.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storycut_core::{Result, StorycutError};
use uuid::Uuid;

use crate::clip::{ClipRequest, ClipTimeState, TimingInfo, TrimPolicy};
use crate::log::ModificationKind;
use crate::packer;

/// Plain immutable record of a clip's placement, safe to hand to
/// rendering and export layers and to serialize into project saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSnapshot {
    pub id: String,
    pub timeline_start: f64,
    pub timeline_end: f64,
    pub current_in: f64,
    pub current_out: f64,
    pub row: u32,
}

impl ClipSnapshot {
    pub(crate) fn of(clip: &ClipTimeState) -> Self {
        Self {
            id: clip.id().to_string(),
            timeline_start: clip.timeline_start(),
            timeline_end: clip.timeline_end(),
            current_in: clip.current_in(),
            current_out: clip.current_out(),
            row: clip.row(),
        }
    }
}

/// Owner of all clip timing state for one timeline.
#[derive(Debug, Default)]
pub struct TimelineStateManager {
    clips: BTreeMap<String, ClipTimeState>,
    trim_policy: TrimPolicy,
}

impl TimelineStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with an explicit trim clamp policy.
    pub fn with_policy(trim_policy: TrimPolicy) -> Self {
        Self {
            clips: BTreeMap::new(),
            trim_policy,
        }
    }

    pub fn trim_policy(&self) -> TrimPolicy {
        self.trim_policy
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn get(&self, id: &str) -> Result<&ClipTimeState> {
        self.clips.get(id).ok_or_else(|| StorycutError::UnknownClip { id: id.to_string() })
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ClipTimeState> {
        self.clips
            .get_mut(id)
            .ok_or_else(|| StorycutError::UnknownClip { id: id.to_string() })
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Validate a placement request and add the clip at the end of its
    /// row. Returns the new clip's snapshot; its minted id is the handle
    /// for every later operation.
    pub fn add_clip(&mut self, request: &ClipRequest) -> Result<ClipSnapshot> {
        let timeline_start = self.row_end(request.row);
        let id = Uuid::new_v4().to_string();
        let clip = ClipTimeState::new(id.clone(), request, timeline_start)?;
        let snapshot = ClipSnapshot::of(&clip);
        self.clips.insert(id, clip);
        Ok(snapshot)
    }

    /// Insert an already-built clip state (deserialization path).
    pub(crate) fn insert(&mut self, clip: ClipTimeState) {
        self.clips.insert(clip.id().to_string(), clip);
    }

    /// Remove a clip, returning its final snapshot.
    pub fn remove_clip(&mut self, id: &str) -> Result<ClipSnapshot> {
        let clip = self
            .clips
            .remove(id)
            .ok_or_else(|| StorycutError::UnknownClip { id: id.to_string() })?;
        Ok(ClipSnapshot::of(&clip))
    }

    /// Split a clip at a timeline position strictly inside it. The left
    /// half keeps the original id; the right half gets a fresh one.
    pub fn split_clip(&mut self, id: &str, at: f64) -> Result<(ClipSnapshot, ClipSnapshot)> {
        let right_id = Uuid::new_v4().to_string();
        let left = self.get_mut(id)?;
        let right = left.split_at(at, right_id)?;
        let left_snapshot = ClipSnapshot::of(left);
        let right_snapshot = ClipSnapshot::of(&right);
        self.insert(right);
        Ok((left_snapshot, right_snapshot))
    }

    // ── Gestures ───────────────────────────────────────────────

    /// Begin a move or trim gesture on a clip.
    pub fn start_modification(&mut self, id: &str, kind: ModificationKind) -> Result<ClipSnapshot> {
        let clip = self.get_mut(id)?;
        clip.start_modification(kind);
        Ok(ClipSnapshot::of(clip))
    }

    /// Translate a clip to a new timeline start. Requires an active move
    /// gesture on that clip.
    pub fn move_clip(&mut self, id: &str, new_timeline_start: f64) -> Result<ClipSnapshot> {
        let clip = self.get_mut(id)?;
        clip.move_to(new_timeline_start)?;
        Ok(ClipSnapshot::of(clip))
    }

    /// Apply a trim gesture. Requires an active trim gesture on that
    /// clip; the manager's [`TrimPolicy`] decides clamp behavior.
    pub fn trim_clip(
        &mut self,
        id: &str,
        new_timeline_start: f64,
        new_timeline_end: f64,
    ) -> Result<ClipSnapshot> {
        let policy = self.trim_policy;
        let clip = self.get_mut(id)?;
        clip.trim_to(new_timeline_start, new_timeline_end, policy)?;
        Ok(ClipSnapshot::of(clip))
    }

    /// Finalize the active gesture on a clip.
    pub fn complete_modification(&mut self, id: &str) -> Result<ClipSnapshot> {
        let clip = self.get_mut(id)?;
        clip.complete_modification();
        Ok(ClipSnapshot::of(clip))
    }

    /// Undo the most recent gesture on a clip. `Ok(None)` when the
    /// clip's log is empty.
    pub fn undo(&mut self, id: &str) -> Result<Option<ClipSnapshot>> {
        let clip = self.get_mut(id)?;
        Ok(clip.undo().map(|_| ClipSnapshot::of(clip)))
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn timing_info(&self, id: &str) -> Result<TimingInfo> {
        Ok(self.get(id)?.timing_info())
    }

    pub fn snapshot(&self, id: &str) -> Result<ClipSnapshot> {
        Ok(ClipSnapshot::of(self.get(id)?))
    }

    pub fn map_timeline_to_source(&self, id: &str, position: f64) -> Result<f64> {
        self.get(id)?.map_timeline_to_source(position)
    }

    pub fn map_source_to_timeline(&self, id: &str, position: f64) -> Result<f64> {
        self.get(id)?.map_source_to_timeline(position)
    }

    /// All clips, ordered by row, then timeline start, then id.
    pub fn snapshots(&self) -> Vec<ClipSnapshot> {
        let mut all: Vec<ClipSnapshot> = self.clips.values().map(ClipSnapshot::of).collect();
        all.sort_by(|a, b| {
            a.row
                .cmp(&b.row)
                .then(a.timeline_start.total_cmp(&b.timeline_start))
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    /// Clips on one row, ordered by timeline start then id.
    pub fn clips_in_row(&self, row: u32) -> Vec<ClipSnapshot> {
        self.snapshots().into_iter().filter(|c| c.row == row).collect()
    }

    /// Latest timeline end across all clips; zero for an empty timeline.
    pub fn total_duration(&self) -> f64 {
        self.clips
            .values()
            .map(|c| c.timeline_end())
            .fold(0.0, f64::max)
    }

    fn row_end(&self, row: u32) -> f64 {
        self.clips
            .values()
            .filter(|c| c.row() == row)
            .map(|c| c.timeline_end())
            .fold(0.0, f64::max)
    }

    // ── Layout ─────────────────────────────────────────────────

    /// Re-lay every row contiguously, closing gaps left by deletes and
    /// reorders. Returns the updated snapshots in packed order.
    pub fn repack_rows(&mut self) -> Vec<ClipSnapshot> {
        packer::pack_rows(&mut self.clips)
    }

    pub(crate) fn clip_states(&self) -> impl Iterator<Item = &ClipTimeState> {
        self.clips.values()
    }
}

// ── Tests ───────────────────────────────────────────────────────
