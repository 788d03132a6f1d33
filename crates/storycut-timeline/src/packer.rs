//! Row re-layout.
//!
//! After a delete or reorder, each row is repacked contiguously: clips
//! keep their relative order (ascending timeline start, ties broken by
//! id so the layout is deterministic) and are laid back-to-back from
//! zero. Gaps always close; blank space is not part of this model.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::clip::ClipTimeState;
use crate::manager::ClipSnapshot;

/// Repack every row in place. Returns the updated snapshots, rows in
/// first-encounter order of the input, clips in packed order.
///
/// Applying this twice yields the same layout as applying it once.
pub(crate) fn pack_rows(clips: &mut BTreeMap<String, ClipTimeState>) -> Vec<ClipSnapshot> {
    let mut row_order: SmallVec<[u32; 4]> = SmallVec::new();
    let mut rows: BTreeMap<u32, SmallVec<[String; 8]>> = BTreeMap::new();
    for (id, clip) in clips.iter() {
        let row = clip.row();
        if !rows.contains_key(&row) {
            row_order.push(row);
        }
        rows.entry(row).or_default().push(id.clone());
    }

    let mut packed = Vec::with_capacity(clips.len());
    for row in row_order {
        let mut ids = rows.remove(&row).unwrap_or_default();
        ids.sort_by(|a, b| {
            clips[a]
                .timeline_start()
                .total_cmp(&clips[b].timeline_start())
                .then_with(|| a.cmp(b))
        });

        let mut cursor = 0.0;
        for id in ids {
            if let Some(clip) = clips.get_mut(&id) {
                clip.shift_to(cursor);
                cursor += clip.timeline_duration();
                packed.push(ClipSnapshot::of(clip));
            }
        }
    }
    packed
}

// ── Tests ───────────────────────────────────────────────────────
