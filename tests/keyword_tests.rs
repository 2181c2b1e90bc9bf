//! Keyword State Tests
//!
//! Tests for:
//! - Insertion-order independence of equality and hashing
//! - Combine (overlay) semantics
//! - Lookup with defaults
//! - Backend capability keyword derivation

use prowl::renderer::keyword::KeywordState;

// ============================================================================
// Equality / Hashing
// ============================================================================

#[test]
fn equal_regardless_of_insertion_order() {
    let mut a = KeywordState::new();
    a.set_key("A", "1");
    a.set_key("B", "2");

    let mut b = KeywordState::new();
    b.set_key("B", "2");
    b.set_key("A", "1");

    assert_eq!(a, b);
    assert_eq!(a.variant_hash(), b.variant_hash());
}

#[test]
fn combine_order_produces_equal_hashes() {
    let base = KeywordState::from(&[("A", "1")][..]);
    let add = KeywordState::from(&[("B", "2")][..]);

    let ab = KeywordState::combine(&base, &add);
    let ba = KeywordState::combine(&add, &base);

    assert_eq!(ab, ba);
    assert_eq!(ab.variant_hash(), ba.variant_hash());
}

#[test]
fn different_values_produce_different_hashes() {
    let a = KeywordState::from(&[("MAX_LIGHTS", "4")][..]);
    let b = KeywordState::from(&[("MAX_LIGHTS", "8")][..]);
    assert_ne!(a.variant_hash(), b.variant_hash());
}

#[test]
fn hash_distinguishes_key_from_value() {
    // Same concatenated text, different pair structure.
    let a = KeywordState::from(&[("AB", "C")][..]);
    let b = KeywordState::from(&[("A", "BC")][..]);
    assert_ne!(a.variant_hash(), b.variant_hash());
}

// ============================================================================
// Combine Semantics
// ============================================================================

#[test]
fn combine_overlays_without_mutating_inputs() {
    let base = KeywordState::from(&[("A", "1"), ("B", "1")][..]);
    let add = KeywordState::from(&[("B", "2"), ("C", "3")][..]);

    let combined = KeywordState::combine(&base, &add);

    assert_eq!(combined.get_key("A", ""), "1");
    assert_eq!(combined.get_key("B", ""), "2"); // add wins
    assert_eq!(combined.get_key("C", ""), "3");

    // Inputs untouched.
    assert_eq!(base.get_key("B", ""), "1");
    assert_eq!(base.len(), 2);
    assert_eq!(add.len(), 2);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn get_key_falls_back_to_default() {
    let keywords = KeywordState::new();
    assert_eq!(keywords.get_key("NEVER_SET", "fallback"), "fallback");
}

#[test]
fn remove_and_clear() {
    let mut keywords = KeywordState::from(&[("A", "1"), ("B", "2")][..]);
    assert!(keywords.remove("A"));
    assert!(!keywords.remove("A"));
    assert_eq!(keywords.len(), 1);

    keywords.clear();
    assert!(keywords.is_empty());
}

// ============================================================================
// Backend Derivation
// ============================================================================

#[test]
fn backend_keywords_differ_between_gl_and_vulkan() {
    let vulkan = KeywordState::for_backend(wgpu::Backend::Vulkan);
    let gl = KeywordState::for_backend(wgpu::Backend::Gl);

    assert_eq!(vulkan.get_key("DEPTH_ZERO_TO_ONE", ""), "1");
    assert_eq!(gl.get_key("DEPTH_ZERO_TO_ONE", ""), "0");
    assert_eq!(vulkan.get_key("CLIP_Y_INVERTED", ""), "1");
    assert_eq!(gl.get_key("CLIP_Y_INVERTED", ""), "0");
    assert_ne!(vulkan.variant_hash(), gl.variant_hash());
}

#[test]
fn backend_keywords_are_rederivable() {
    let first = KeywordState::for_backend(wgpu::Backend::Metal);
    let second = KeywordState::for_backend(wgpu::Backend::Metal);
    assert_eq!(first, second);
    assert_eq!(first.variant_hash(), second.variant_hash());
}

#[test]
fn cached_defaults_match_fresh_derivation() {
    let cached = KeywordState::default_for(wgpu::Backend::Dx12);
    let fresh = KeywordState::for_backend(wgpu::Backend::Dx12);
    assert_eq!(cached, fresh);
    // Second lookup serves the cached copy.
    assert_eq!(KeywordState::default_for(wgpu::Backend::Dx12), fresh);
}
