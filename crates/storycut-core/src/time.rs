//! Time representation for the timeline engine.
//!
//! All times are `f64` seconds. Clip gestures arrive from pointer events,
//! so edge comparisons use a fixed tolerance rather than exact equality.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorycutError};

/// Tolerance for deciding whether a timeline edge moved during a gesture.
pub const EDGE_EPSILON: f64 = 1e-3;

/// Compare two times within [`EDGE_EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EDGE_EPSILON
}

/// A time is valid if it is a finite number. NaN and infinities are
/// malformed input and rejected at API boundaries.
#[inline]
pub fn is_valid_time(t: f64) -> bool {
    t.is_finite()
}

/// Clamp a time to `[min, max]`. Bounds must be ordered and finite;
/// validated ranges guarantee that at every call site.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.clamp(min, max)
}

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: f64,
    /// End time (exclusive)
    pub end: f64,
}

impl TimeRange {
    /// Create a validated time range.
    ///
    /// Rejects non-finite bounds and `end <= start`.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !is_valid_time(start) || !is_valid_time(end) || end <= start {
            return Err(StorycutError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Duration of the range.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// This range translated by `delta`.
    pub fn shifted(self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}
