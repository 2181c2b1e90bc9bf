//! Transform History Tests
//!
//! Tests for:
//! - Previous-matrix availability on the second frame
//! - First-sighting zero-motion behavior
//! - Periodic eviction of objects no longer drawn

use glam::{Mat4, Vec3};

use prowl::renderer::graph::history::TransformHistory;

#[test]
fn second_frame_sees_first_frame_matrix() {
    let mut history = TransformHistory::new(120);
    let frame1 = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let frame2 = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));

    history.record(7, frame1);
    history.end_frame();
    history.record(7, frame2);

    assert_eq!(history.previous(7), Some(frame1));
}

#[test]
fn first_sighting_has_zero_motion() {
    let mut history = TransformHistory::new(120);
    let matrix = Mat4::from_translation(Vec3::ONE);

    history.record(7, matrix);
    assert_eq!(history.previous(7), Some(matrix));
}

#[test]
fn repeated_records_in_one_frame_keep_previous() {
    let mut history = TransformHistory::new(120);
    let old = Mat4::from_translation(Vec3::X);
    history.record(7, old);
    history.end_frame();

    // Same object drawn twice in one frame (two passes).
    history.record(7, Mat4::from_translation(Vec3::Y));
    history.record(7, Mat4::from_translation(Vec3::Z));
    assert_eq!(history.previous(7), Some(old));
}

#[test]
fn zero_id_is_ignored() {
    let mut history = TransformHistory::new(120);
    history.record(0, Mat4::IDENTITY);
    assert!(history.is_empty());
    assert_eq!(history.previous(0), None);
}

#[test]
fn undrawn_objects_evicted_after_cleanup_interval() {
    let interval = 4;
    let mut history = TransformHistory::new(interval);

    history.record(1, Mat4::IDENTITY);
    // Object 2 keeps being drawn; object 1 never again.
    for _ in 0..(interval * 2) {
        history.record(2, Mat4::IDENTITY);
        history.end_frame();
    }

    assert_eq!(history.previous(1), None, "stale entry must be evicted");
    assert!(history.previous(2).is_some(), "live entry must survive");
}

#[test]
fn tracked_count_stays_bounded() {
    let interval = 8;
    let mut history = TransformHistory::new(interval);

    // A stream of short-lived objects, each drawn exactly once.
    for id in 1..=64_u64 {
        history.record(id, Mat4::IDENTITY);
        history.end_frame();
    }

    assert!(
        history.len() <= interval as usize + 1,
        "sweeps should bound the table, got {} entries",
        history.len()
    );
}
