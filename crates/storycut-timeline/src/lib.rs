//! Storycut Timeline - Clip timing model
//!
//! Implements the timing core of the editor:
//! - Per-clip move/trim state machine with source-bound clamping
//! - Gesture log with undo
//! - Shared clip store with snapshot-based reads
//! - Row re-layout (gap closing)
//! - Versioned timeline persistence

pub mod clip;
pub mod log;
pub mod manager;
mod packer;
pub mod serialization;

pub use clip::{ClipDescriptor, ClipRequest, ClipState, ClipTimeState, TimingInfo, TrimPolicy};
pub use log::{Modification, ModificationKind, TimingSnapshot};
pub use manager::{ClipSnapshot, TimelineStateManager};
pub use serialization::{SavedClip, TimelineFile, CURRENT_VERSION};
