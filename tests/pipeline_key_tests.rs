//! Pipeline Key Tests
//!
//! Tests for:
//! - Canonical key determinism across keyword insertion orders
//! - Pass identity (not content) in cache keys
//! - Raster/output state contributing to pipeline identity

use prowl::renderer::keyword::KeywordState;
use prowl::renderer::pipeline::key::{OutputFormatKey, fx_hash_key};
use prowl::renderer::pipeline::PipelineRequest;
use prowl::renderer::shader::ShaderPass;

fn hdr_output() -> OutputFormatKey {
    OutputFormatKey::simple(
        wgpu::TextureFormat::Rgba16Float,
        Some(wgpu::TextureFormat::Depth32Float),
    )
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_requests_hash_identically() {
    let pass = ShaderPass::new("Opaque");

    let mut kw_ab = KeywordState::new();
    kw_ab.set_key("A", "1");
    kw_ab.set_key("B", "2");
    let mut kw_ba = KeywordState::new();
    kw_ba.set_key("B", "2");
    kw_ba.set_key("A", "1");

    let first = PipelineRequest::new(&pass, &kw_ab, hdr_output());
    let second = PipelineRequest::new(&pass, &kw_ba, hdr_output());

    assert_eq!(first.canonical_key(), second.canonical_key());
    assert_eq!(
        fx_hash_key(&first.canonical_key()),
        fx_hash_key(&second.canonical_key())
    );
}

#[test]
fn pass_identity_separates_equal_state() {
    let pass_a = ShaderPass::new("Same");
    let pass_b = ShaderPass::new("Same");
    let keywords = KeywordState::new();

    let a = PipelineRequest::new(&pass_a, &keywords, hdr_output());
    let b = PipelineRequest::new(&pass_b, &keywords, hdr_output());

    // Two passes with identical contents are still distinct pipelines.
    assert_ne!(a.canonical_key(), b.canonical_key());
}

// ============================================================================
// State Contribution
// ============================================================================

#[test]
fn raster_state_changes_the_key() {
    let pass = ShaderPass::new("Opaque");
    let keywords = KeywordState::new();

    let base = PipelineRequest::new(&pass, &keywords, hdr_output());

    let mut wireframe = PipelineRequest::new(&pass, &keywords, hdr_output());
    wireframe.polygon_mode = wgpu::PolygonMode::Line;

    let mut clockwise = PipelineRequest::new(&pass, &keywords, hdr_output());
    clockwise.front_face = wgpu::FrontFace::Cw;

    let mut scissored = PipelineRequest::new(&pass, &keywords, hdr_output());
    scissored.scissor_enabled = true;

    let mut lines = PipelineRequest::new(&pass, &keywords, hdr_output());
    lines.topology = wgpu::PrimitiveTopology::LineList;

    let base_key = base.canonical_key();
    assert_ne!(base_key, wireframe.canonical_key());
    assert_ne!(base_key, clockwise.canonical_key());
    assert_ne!(base_key, scissored.canonical_key());
    assert_ne!(base_key, lines.canonical_key());
}

#[test]
fn output_formats_change_the_key() {
    let pass = ShaderPass::new("Opaque");
    let keywords = KeywordState::new();

    let hdr = PipelineRequest::new(&pass, &keywords, hdr_output());
    let ldr = PipelineRequest::new(
        &pass,
        &keywords,
        OutputFormatKey::simple(
            wgpu::TextureFormat::Rgba8UnormSrgb,
            Some(wgpu::TextureFormat::Depth32Float),
        ),
    );
    let depth_only = PipelineRequest::new(
        &pass,
        &keywords,
        OutputFormatKey::depth_only(wgpu::TextureFormat::Depth32Float),
    );

    assert_ne!(hdr.canonical_key(), ldr.canonical_key());
    assert_ne!(hdr.canonical_key(), depth_only.canonical_key());
}

// ============================================================================
// Variant Resolution
// ============================================================================

#[test]
fn unregistered_keyword_combination_is_an_error() {
    let pass = ShaderPass::new("Opaque");
    let mut keywords = KeywordState::new();
    keywords.set_key("NEVER_REGISTERED", "1");

    assert!(pass.variant(&keywords).is_err());
    assert!(pass.try_variant(&keywords).is_none());
}
