//! Timeline persistence with versioning and migration.
//!
//! The host application owns project storage; this module only defines
//! the JSON shape that round-trips clip descriptors and placements, with
//! a schema version field for forward-compatible loading.

use serde::{Deserialize, Serialize};
use storycut_core::{Result, StorycutError};

use crate::clip::{ClipDescriptor, ClipTimeState, TrimPolicy};
use crate::manager::TimelineStateManager;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Everything needed to round-trip one clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedClip {
    pub id: String,
    pub source_ref: String,
    pub source_duration: f64,
    pub source_start: f64,
    pub source_end: f64,
    pub current_in: f64,
    pub current_out: f64,
    pub timeline_start: f64,
    pub timeline_end: f64,
    #[serde(default)]
    pub row: u32,
}

impl SavedClip {
    fn of(clip: &ClipTimeState) -> Self {
        Self {
            id: clip.id().to_string(),
            source_ref: clip.descriptor().source_ref.clone(),
            source_duration: clip.descriptor().source_duration,
            source_start: clip.source_start(),
            source_end: clip.source_end(),
            current_in: clip.current_in(),
            current_out: clip.current_out(),
            timeline_start: clip.timeline_start(),
            timeline_end: clip.timeline_end(),
            row: clip.row(),
        }
    }
}

/// Versioned timeline file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    /// Saved clips, in snapshot order.
    pub clips: Vec<SavedClip>,
    /// Library version that wrote this file.
    pub app_version: String,
}

impl TimelineFile {
    /// Capture the manager's clips into a file record.
    pub fn new(manager: &TimelineStateManager) -> Self {
        let mut clips: Vec<SavedClip> = manager.clip_states().map(SavedClip::of).collect();
        clips.sort_by(|a, b| {
            a.row
                .cmp(&b.row)
                .then(a.timeline_start.total_cmp(&b.timeline_start))
                .then_with(|| a.id.cmp(&b.id))
        });
        Self {
            version: CURRENT_VERSION,
            clips,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| StorycutError::Serialization(format!("Failed to serialize timeline: {e}")))
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| StorycutError::Serialization(format!("Invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(StorycutError::Serialization(format!(
                "Timeline file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;
        serde_json::from_value(migrated)
            .map_err(|e| StorycutError::Serialization(format!("Failed to parse timeline: {e}")))
    }

    /// Rebuild a manager from the saved clips. Each clip is re-validated
    /// on the way in and starts a fresh session (no gesture log).
    pub fn into_manager(self, trim_policy: TrimPolicy) -> Result<TimelineStateManager> {
        let mut manager = TimelineStateManager::with_policy(trim_policy);
        for saved in self.clips {
            let clip = ClipTimeState::from_parts(
                ClipDescriptor {
                    id: saved.id,
                    source_ref: saved.source_ref,
                    source_duration: saved.source_duration,
                },
                saved.source_start,
                saved.source_end,
                saved.current_in,
                saved.current_out,
                saved.timeline_start,
                saved.timeline_end,
                saved.row,
            )?;
            manager.insert(clip);
        }
        Ok(manager)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0: a bare array of clips, no wrapper.
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "clips": data,
                        "app_version": "0.1.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(StorycutError::Serialization(format!(
                    "No migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}
