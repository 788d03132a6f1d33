//! Per-clip modification log.
//!
//! Every gesture (move or trim) appends one entry capturing the timing
//! fields as they were when the gesture started. Undo pops the most
//! recent entry and restores that snapshot.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// The four timing fields a gesture can change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSnapshot {
    pub timeline_start: f64,
    pub timeline_end: f64,
    pub current_in: f64,
    pub current_out: f64,
}

/// Which kind of gesture a modification records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModificationKind {
    Move,
    Trim,
}

/// One entry in a clip's modification log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modification {
    pub kind: ModificationKind,
    /// Timing fields at gesture start. Restored by undo.
    pub before: TimingSnapshot,
    /// Timing fields at gesture completion, once finalized.
    pub after: Option<TimingSnapshot>,
    /// Unix milliseconds when the gesture started.
    pub started_at_ms: u64,
    /// Unix milliseconds when the gesture completed.
    pub completed_at_ms: Option<u64>,
}

impl Modification {
    /// Begin a new log entry for a gesture.
    pub fn begin(kind: ModificationKind, before: TimingSnapshot) -> Self {
        Self {
            kind,
            before,
            after: None,
            started_at_ms: unix_millis(),
            completed_at_ms: None,
        }
    }

    /// Finalize this entry with the resulting timing.
    pub fn complete(&mut self, after: TimingSnapshot) {
        self.after = Some(after);
        self.completed_at_ms = Some(unix_millis());
    }

    /// Whether the gesture has been finalized.
    pub fn is_completed(&self) -> bool {
        self.completed_at_ms.is_some()
    }
}

/// Current wall-clock time in unix milliseconds.
fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
