//! Shadow Atlas Tests
//!
//! Tests for:
//! - Tile-block reservation accounting
//! - Exhaustion returning "no slot" without partial commits
//! - Idempotent per-light release and full clear
//! - Distance-based resolution policy

use prowl::renderer::shadow_atlas::ShadowAtlas;

// ============================================================================
// Reservation
// ============================================================================

#[test]
fn reserving_64px_block_occupies_four_tiles() {
    let mut atlas = ShadowAtlas::new(8192, 32, 1024);
    let total = atlas.free_tile_count();
    assert_eq!(total, (8192 / 32) * (8192 / 32));

    let placement = atlas.reserve_tiles(64, 64, 1);
    assert!(placement.is_some());
    assert_eq!(atlas.free_tile_count(), total - 4);
}

#[test]
fn placements_are_pixel_offsets_on_tile_boundaries() {
    let mut atlas = ShadowAtlas::new(128, 32, 128);
    let first = atlas.reserve_tiles(64, 64, 1).unwrap();
    let second = atlas.reserve_tiles(64, 64, 2).unwrap();

    assert_eq!(first, (0, 0));
    assert_ne!(first, second);
    assert_eq!(second.0 % 32, 0);
    assert_eq!(second.1 % 32, 0);
}

#[test]
fn exhaustion_returns_no_slot() {
    let mut atlas = ShadowAtlas::new(128, 32, 128);
    // A 128px atlas with 32px tiles holds exactly four 64px blocks.
    for light in 0..4 {
        assert!(atlas.reserve_tiles(64, 64, light).is_some());
    }
    assert_eq!(atlas.free_tile_count(), 0);
    assert!(atlas.reserve_tiles(64, 64, 99).is_none());
}

#[test]
fn failed_reservation_commits_nothing() {
    let mut atlas = ShadowAtlas::new(64, 32, 64);
    assert!(atlas.reserve_tiles(64, 32, 1).is_some()); // top row
    assert!(atlas.reserve_tiles(32, 32, 2).is_some()); // bottom-left
    let free_before = atlas.free_tile_count();

    // 2×1 tiles cannot fit anywhere now.
    assert!(atlas.reserve_tiles(64, 32, 3).is_none());
    assert_eq!(atlas.free_tile_count(), free_before);

    // The remaining single tile is still allocatable.
    assert!(atlas.reserve_tiles(32, 32, 4).is_some());
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn free_then_reserve_reuses_tiles() {
    let mut atlas = ShadowAtlas::new(128, 32, 128);
    for light in 0..4 {
        assert!(atlas.reserve_tiles(64, 64, light).is_some());
    }
    assert!(atlas.reserve_tiles(64, 64, 99).is_none());

    atlas.free_tiles(2);
    assert_eq!(atlas.free_tile_count(), 4);
    assert!(atlas.reserve_tiles(64, 64, 99).is_some());
}

#[test]
fn free_is_idempotent_for_unknown_lights() {
    let mut atlas = ShadowAtlas::new(128, 32, 128);
    atlas.reserve_tiles(64, 64, 1);
    let free = atlas.free_tile_count();

    atlas.free_tiles(12345); // owns nothing
    assert_eq!(atlas.free_tile_count(), free);
}

#[test]
fn clear_releases_everything() {
    let mut atlas = ShadowAtlas::new(128, 32, 128);
    atlas.reserve_tiles(128, 128, 1);
    atlas.clear();
    assert_eq!(atlas.free_tile_count(), 16);
    assert!(atlas.reserve_tiles(128, 128, 2).is_some());
}

// ============================================================================
// Resolution Policy
// ============================================================================

#[test]
fn resolution_is_linear_in_distance() {
    let atlas = ShadowAtlas::new(8192, 32, 1024);

    assert_eq!(atlas.desired_resolution(0.0, 100.0), 1024);
    assert_eq!(atlas.desired_resolution(25.0, 100.0), 768);
    assert_eq!(atlas.desired_resolution(50.0, 100.0), 512);
    assert_eq!(atlas.desired_resolution(75.0, 100.0), 256);
}

#[test]
fn resolution_floors_at_one_tile() {
    let atlas = ShadowAtlas::new(8192, 32, 1024);
    assert_eq!(atlas.desired_resolution(100.0, 100.0), 32);
    assert_eq!(atlas.desired_resolution(500.0, 100.0), 32);
}

#[test]
fn resolution_snaps_down_to_tile_multiples() {
    let atlas = ShadowAtlas::new(8192, 32, 1024);
    for distance in [10.0_f32, 33.3, 61.7, 90.1] {
        let resolution = atlas.desired_resolution(distance, 100.0);
        assert_eq!(resolution % 32, 0, "resolution {resolution} not tile-aligned");
    }
}
