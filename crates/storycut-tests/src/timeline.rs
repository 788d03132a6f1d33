//! Integration tests for the clip timing subsystem.
//!
//! Exercises full editing sessions across storycut-core and
//! storycut-timeline: placement, gestures, undo, re-layout, and
//! persistence round-trips.

use storycut_core::StorycutError;
use storycut_timeline::{
    ClipRequest, ModificationKind, TimelineFile, TimelineStateManager, TrimPolicy,
};

// ── Helpers ────────────────────────────────────────────────────

fn request(source_ref: &str, source_end: f64, src_in: f64, src_out: f64, row: u32) -> ClipRequest {
    ClipRequest {
        source_ref: source_ref.into(),
        source_start: 0.0,
        source_end,
        requested_in: src_in,
        requested_out: src_out,
        row,
        source_duration: Some(source_end),
    }
}

fn build_session() -> (TimelineStateManager, Vec<String>) {
    let mut mgr = TimelineStateManager::new();
    let mut ids = Vec::new();
    ids.push(mgr.add_clip(&request("intro.mp4", 30.0, 0.0, 5.0, 0)).unwrap().id);
    ids.push(mgr.add_clip(&request("body.mp4", 120.0, 10.0, 40.0, 0)).unwrap().id);
    ids.push(mgr.add_clip(&request("outro.mp4", 20.0, 0.0, 10.0, 0)).unwrap().id);
    ids.push(mgr.add_clip(&request("music.wav", 60.0, 0.0, 45.0, 1)).unwrap().id);
    (mgr, ids)
}

// ── Session assembly & timing ──────────────────────────────────

#[test]
fn clips_append_per_row() {
    let (mgr, ids) = build_session();
    assert_eq!(mgr.snapshot(&ids[0]).unwrap().timeline_start, 0.0);
    assert_eq!(mgr.snapshot(&ids[1]).unwrap().timeline_start, 5.0);
    assert_eq!(mgr.snapshot(&ids[2]).unwrap().timeline_start, 35.0);
    assert_eq!(mgr.snapshot(&ids[3]).unwrap().timeline_start, 0.0);
    assert_eq!(mgr.total_duration(), 45.0);
}

#[test]
fn timeline_position_maps_into_source() {
    let (mgr, ids) = build_session();
    // body.mp4 occupies timeline 5..35 showing source 10..40.
    assert_eq!(mgr.map_timeline_to_source(&ids[1], 5.0).unwrap(), 10.0);
    assert_eq!(mgr.map_timeline_to_source(&ids[1], 20.0).unwrap(), 25.0);
    assert_eq!(mgr.map_source_to_timeline(&ids[1], 40.0).unwrap(), 35.0);
}

// ── Gesture round-trips ────────────────────────────────────────

#[test]
fn trim_then_undo_is_lossless() {
    let (mut mgr, ids) = build_session();
    let before = mgr.timing_info(&ids[1]).unwrap();

    mgr.start_modification(&ids[1], ModificationKind::Trim).unwrap();
    mgr.trim_clip(&ids[1], 5.0, 25.0).unwrap();
    mgr.complete_modification(&ids[1]).unwrap();
    assert_ne!(mgr.timing_info(&ids[1]).unwrap(), before);

    mgr.undo(&ids[1]).unwrap().unwrap();
    let after = mgr.timing_info(&ids[1]).unwrap();
    assert_eq!(after.timeline_start, before.timeline_start);
    assert_eq!(after.timeline_end, before.timeline_end);
    assert_eq!(after.current_in, before.current_in);
    assert_eq!(after.current_out, before.current_out);
}

#[test]
fn consecutive_gestures_unwind_in_reverse() {
    let (mut mgr, ids) = build_session();
    let id = &ids[0];

    mgr.start_modification(id, ModificationKind::Move).unwrap();
    mgr.move_clip(id, 50.0).unwrap();
    mgr.complete_modification(id).unwrap();

    mgr.start_modification(id, ModificationKind::Trim).unwrap();
    mgr.trim_clip(id, 50.0, 53.0).unwrap();
    mgr.complete_modification(id).unwrap();

    let undone_trim = mgr.undo(id).unwrap().unwrap();
    assert_eq!(undone_trim.timeline_start, 50.0);
    assert_eq!(undone_trim.timeline_end, 55.0);

    let undone_move = mgr.undo(id).unwrap().unwrap();
    assert_eq!(undone_move.timeline_start, 0.0);
    assert_eq!(mgr.undo(id).unwrap(), None);
}

#[test]
fn right_trim_clamp_behaviors_diverge_by_policy() {
    for (policy, expected_end) in [
        (TrimPolicy::DeriveFromSource, 15.0),
        (TrimPolicy::HonorRequestedEdges, 20.0),
    ] {
        let mut mgr = TimelineStateManager::with_policy(policy);
        // 10s window over a 15s source: only 5s of headroom.
        let clip = mgr.add_clip(&request("a.mp4", 15.0, 0.0, 10.0, 0)).unwrap();

        mgr.start_modification(&clip.id, ModificationKind::Trim).unwrap();
        let trimmed = mgr.trim_clip(&clip.id, 0.0, 20.0).unwrap();
        assert_eq!(trimmed.current_out, 15.0);
        assert_eq!(trimmed.timeline_end, expected_end);
    }
}

// ── Delete & re-layout ─────────────────────────────────────────

#[test]
fn delete_then_repack_closes_the_gap() {
    let (mut mgr, ids) = build_session();
    mgr.remove_clip(&ids[1]).unwrap();

    let packed = mgr.repack_rows();
    let row0: Vec<_> = packed.iter().filter(|c| c.row == 0).collect();
    assert_eq!(row0.len(), 2);
    assert_eq!(row0[0].timeline_start, 0.0);
    assert_eq!(row0[0].timeline_end, 5.0);
    assert_eq!(row0[1].timeline_start, 5.0);
    assert_eq!(row0[1].timeline_end, 15.0);
    assert_eq!(mgr.total_duration(), 45.0); // music row still longest
}

#[test]
fn split_halves_stay_contiguous_and_mappable() {
    let (mut mgr, ids) = build_session();
    let (left, right) = mgr.split_clip(&ids[1], 20.0).unwrap();

    assert_eq!(left.timeline_end, right.timeline_start);
    assert_eq!(left.current_out, right.current_in);

    // The source position at the cut is identical seen from each half.
    let at_cut = mgr.map_timeline_to_source(&right.id, 20.0).unwrap();
    assert_eq!(at_cut, left.current_out);
}

// ── Failure surfaces ───────────────────────────────────────────

#[test]
fn invalid_requests_leave_manager_untouched() {
    let (mut mgr, _) = build_session();
    let before = mgr.snapshots();

    let bad = request("bad.mp4", 10.0, 8.0, 4.0, 0);
    assert!(matches!(
        mgr.add_clip(&bad),
        Err(StorycutError::InvalidTimeRange { .. })
    ));
    assert_eq!(mgr.snapshots(), before);
}

#[test]
fn gestureless_mutation_is_rejected() {
    let (mut mgr, ids) = build_session();
    assert!(matches!(
        mgr.trim_clip(&ids[0], 0.0, 3.0),
        Err(StorycutError::NoActiveModification { .. })
    ));
}

// ── Persistence ────────────────────────────────────────────────

#[test]
fn session_survives_serialization_roundtrip() {
    let (mut mgr, ids) = build_session();
    mgr.start_modification(&ids[0], ModificationKind::Trim).unwrap();
    mgr.trim_clip(&ids[0], 0.0, 3.0).unwrap();
    mgr.complete_modification(&ids[0]).unwrap();

    let json = TimelineFile::new(&mgr).to_json().unwrap();
    let restored = TimelineFile::from_json(&json)
        .unwrap()
        .into_manager(TrimPolicy::DeriveFromSource)
        .unwrap();

    assert_eq!(restored.len(), mgr.len());
    assert_eq!(restored.snapshots(), mgr.snapshots());
    assert_eq!(restored.total_duration(), mgr.total_duration());
}

#[test]
fn snapshot_shape_is_stable_json() {
    let (mgr, ids) = build_session();
    let value = serde_json::to_value(mgr.snapshot(&ids[0]).unwrap()).unwrap();
    for key in [
        "id",
        "timeline_start",
        "timeline_end",
        "current_in",
        "current_out",
        "row",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}
