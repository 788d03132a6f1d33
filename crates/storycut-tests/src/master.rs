//! Integration tests for the multi-source master timeline.
//!
//! Drives the full upload → metadata → transcript → selection flow the
//! host application performs, including the hand-off from a transcript
//! selection to a clip placement on the editing timeline.

use storycut_core::TranscriptSegment;
use storycut_master::MasterTimelineIndex;
use storycut_timeline::{ClipRequest, TimelineStateManager};

// ── Helpers ────────────────────────────────────────────────────

/// Parse host-shaped transcript JSON (word-keyed fields, extra
/// decorations) the way it arrives from the transcription service.
fn host_transcript(json: &str) -> Vec<TranscriptSegment> {
    serde_json::from_str(json).expect("host transcript should parse")
}

fn loaded_index() -> MasterTimelineIndex {
    let mut index = MasterTimelineIndex::new();
    index.add_source("ep01.mp4", "blob:ep01");
    index.add_source("ep02.mp4", "blob:ep02");
    index.add_source("ep03.mp4", "blob:ep03");

    // Metadata callbacks land out of registration order.
    index.finalize_duration("ep03.mp4", 8.0);
    index.finalize_duration("ep01.mp4", 10.0);
    index.finalize_duration("ep02.mp4", 5.0);

    index.attach_transcript(
        "ep01.mp4",
        host_transcript(
            r#"[{
                "speaker": "HOST",
                "confidence": 0.97,
                "words": [
                    {"word": "welcome", "start": 0.5, "end": 1.0},
                    {"word": "back", "start": 1.1, "end": 1.4}
                ]
            }]"#,
        ),
    );
    index.attach_transcript(
        "ep03.mp4",
        host_transcript(
            r#"[{
                "speaker": "GUEST",
                "words": [
                    {"word": "thanks", "start": 2.0, "end": 2.4},
                    {"word": "everyone", "start": 2.5, "end": 3.1}
                ]
            }]"#,
        ),
    );
    index
}

// ── Master axis ────────────────────────────────────────────────

#[test]
fn out_of_order_metadata_still_concatenates_in_upload_order() {
    let index = loaded_index();
    let offsets: Vec<f64> = index.entries().iter().map(|e| e.added_at).collect();
    assert_eq!(offsets, vec![0.0, 10.0, 15.0]);
    assert_eq!(index.total_duration(), 23.0);
}

#[test]
fn master_positions_resolve_across_sources() {
    let index = loaded_index();
    let hit = index.source_at(17.5).unwrap();
    assert_eq!(hit.source_id, "ep03.mp4");
    assert_eq!(hit.relative_time, 2.5);
    assert!(index.source_at(23.0).is_none());
}

#[test]
fn merged_transcript_carries_master_offsets() {
    let index = loaded_index();
    let words: Vec<_> = index.merged_words().collect();
    assert_eq!(words.len(), 4);
    assert_eq!(words[0].text, "welcome");
    assert_eq!(words[0].master_start, 0.5);
    // ep03 sits at master offset 15.
    assert_eq!(words[2].text, "thanks");
    assert_eq!(words[2].master_start, 17.0);
    assert_eq!(words[2].source_start, 2.0);
}

#[test]
fn transcript_window_query_is_segment_scoped() {
    let index = loaded_index();
    // ep01's segment spans master 0.5..1.4; ep03's spans 17.0..18.1.
    assert_eq!(index.transcript_between(0.0, 10.0).len(), 1);
    assert_eq!(index.transcript_between(0.0, 18.0).len(), 1);
    assert_eq!(index.transcript_between(0.0, 18.1).len(), 2);
}

// ── Selection → editing timeline hand-off ──────────────────────

#[test]
fn selection_axis_feeds_merged_transcript() {
    let index = loaded_index();
    let content = index.selected_content(&["ep01.mp4", "ep03.mp4"]);

    assert_eq!(content.total_duration, 18.0);
    assert_eq!(content.gaps.len(), 1);
    assert_eq!(content.gaps[0].duration, 5.0);

    let words = index.merged_transcript(&content.ranges);
    assert_eq!(words.len(), 4);
    // ep03 words shift from master 17.0 to continuous 12.0.
    assert_eq!(words[2].start, 12.0);
    assert_eq!(words[2].master_start, 17.0);
}

#[test]
fn transcript_selection_becomes_a_clip() {
    let index = loaded_index();
    let mut mgr = TimelineStateManager::new();

    // The user selects the GUEST segment; the host turns its word span
    // into a clip over that source.
    let segments = index.transcript_between(15.0, 23.0);
    let segment = segments[0];
    let entry = index
        .entries()
        .iter()
        .find(|e| e.source_id == segment.source_id)
        .unwrap();

    let first = segment.words.first().unwrap();
    let last = segment.words.last().unwrap();
    let clip = mgr
        .add_clip(&ClipRequest {
            source_ref: entry.file_ref.clone(),
            source_start: 0.0,
            source_end: entry.duration,
            requested_in: first.source_start,
            requested_out: last.source_end,
            row: 0,
            source_duration: Some(entry.duration),
        })
        .unwrap();

    assert_eq!(clip.current_in, 2.0);
    assert_eq!(clip.current_out, 3.1);
    let width = clip.timeline_end - clip.timeline_start;
    assert!((width - 1.1).abs() < 1e-9);

    // Playback of the clip's start lands on the first selected word.
    let source_pos = mgr.map_timeline_to_source(&clip.id, clip.timeline_start).unwrap();
    assert_eq!(source_pos, first.source_start);
}
