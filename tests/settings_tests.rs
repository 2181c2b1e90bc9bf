//! Render Settings Tests
//!
//! Tests for:
//! - Serde round-trips and partial-config defaulting
//! - Derived format selection

use prowl::settings::RenderSettings;

#[test]
fn settings_round_trip_through_json() {
    let settings = RenderSettings {
        shadow_atlas_size: 8192,
        max_shadow_size: 2048,
        hdr: false,
        ..Default::default()
    };

    let json = serde_json::to_string(&settings).unwrap();
    let restored: RenderSettings = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.shadow_atlas_size, 8192);
    assert_eq!(restored.max_shadow_size, 2048);
    assert!(!restored.hdr);
    assert_eq!(restored.shadow_tile_size, settings.shadow_tile_size);
}

#[test]
fn partial_config_fills_defaults() {
    let restored: RenderSettings = serde_json::from_str(r#"{"shadow_atlas_size": 2048}"#).unwrap();
    assert_eq!(restored.shadow_atlas_size, 2048);
    assert_eq!(restored.shadow_tile_size, 32);
    assert_eq!(restored.max_spot_shadows, 8);
    assert!(restored.hdr);
}

#[test]
fn formats_follow_hdr_flag() {
    let hdr = RenderSettings::default();
    assert_eq!(hdr.color_format(), wgpu::TextureFormat::Rgba16Float);

    let ldr = RenderSettings {
        hdr: false,
        ..Default::default()
    };
    assert_eq!(ldr.color_format(), wgpu::TextureFormat::Rgba8UnormSrgb);
    assert_eq!(ldr.depth_format(), wgpu::TextureFormat::Depth32Float);
}
