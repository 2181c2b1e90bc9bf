//! Property State Tests
//!
//! Tests for:
//! - Overwrite semantics and typed, kind-checked getters
//! - `apply_override` last-writer-wins merging
//! - Frame-scoped global tier clearing
//! - Kind mismatch treated as absent during uniform resolution
//! - Applied-value change detection

use glam::{Mat4, Vec2, Vec3, Vec4};

use prowl::renderer::properties::{
    AppliedValueCache, FrameProperties, PropertyState, PropertyValue,
};
use prowl::renderer::shader::UniformKind;
use prowl::utils::interner;

// ============================================================================
// Setters / Getters
// ============================================================================

#[test]
fn setters_overwrite() {
    let mut props = PropertyState::new();
    props.set_float("x", 1.0);
    props.set_float("x", 2.0);
    assert_eq!(props.float("x"), Some(2.0));
}

#[test]
fn typed_getters_never_coerce() {
    let mut props = PropertyState::new();
    props.set_int("value", 7);

    assert_eq!(props.int("value"), Some(7));
    assert_eq!(props.float("value"), None);
    assert_eq!(props.vec4("value"), None);
    assert_eq!(props.mat4("value"), None);
}

#[test]
fn absent_names_return_none() {
    let props = PropertyState::new();
    assert_eq!(props.float("missing"), None);
    assert!(props.texture("missing").is_none());
    assert!(props.buffer("missing").is_none());
}

// ============================================================================
// apply_override
// ============================================================================

#[test]
fn override_wins_per_key_and_base_survives() {
    let mut base = PropertyState::new();
    base.set_float("x", 1.0);

    let mut overlay = PropertyState::new();
    overlay.set_float("x", 2.0);
    overlay.set_float("y", 3.0);

    base.apply_override(&overlay);

    assert_eq!(base.float("x"), Some(2.0));
    assert_eq!(base.float("y"), Some(3.0));
}

#[test]
fn override_keeps_unrelated_categories() {
    let mut base = PropertyState::new();
    base.set_vec3("color", Vec3::ONE);
    base.set_mat4("model", Mat4::IDENTITY);

    let mut overlay = PropertyState::new();
    overlay.set_vec3("color", Vec3::ZERO);

    base.apply_override(&overlay);

    assert_eq!(
        base.value(interner::intern("model")),
        Some(&PropertyValue::Mat4(Mat4::IDENTITY))
    );
}

// ============================================================================
// Global Tier Lifecycle
// ============================================================================

#[test]
fn end_frame_clears_every_global() {
    let mut frame = FrameProperties::new();
    frame.begin_frame(1);
    frame.globals_mut().set_float("t", 1.0);
    frame.globals_mut().set_vec2("resolution", Vec2::new(1.0, 1.0));

    frame.end_frame();

    assert_eq!(frame.globals().float("t"), None);
    assert!(frame.globals().is_empty());
}

#[test]
fn globals_do_not_leak_into_next_frame() {
    let mut frame = FrameProperties::new();
    frame.begin_frame(1);
    frame.globals_mut().set_float("t", 1.0);
    frame.end_frame();

    frame.begin_frame(2);
    assert_eq!(frame.globals().float("t"), None);
    frame.end_frame();
}

// ============================================================================
// Uniform Resolution (kind checking)
// ============================================================================

#[test]
fn mismatched_kind_is_absent_not_coerced() {
    let mut props = PropertyState::new();
    props.set_vec4("tint", Vec4::ONE);

    let name = interner::intern("tint");
    assert!(props.value_matching(name, UniformKind::Vec4).is_some());
    assert!(props.value_matching(name, UniformKind::Vec3).is_none());
    assert!(props.value_matching(name, UniformKind::Mat4).is_none());
}

#[test]
fn array_shape_checks_declared_count() {
    let mut props = PropertyState::new();
    props.set_mat4_array("bones", vec![Mat4::IDENTITY; 8]);

    let name = interner::intern("bones");
    assert!(
        props
            .value_matching(name, UniformKind::Mat4Array { count: 16 })
            .is_some(),
        "partial arrays fit larger declarations"
    );
    assert!(
        props
            .value_matching(name, UniformKind::Mat4Array { count: 4 })
            .is_none(),
        "oversized arrays are a shape mismatch"
    );
}

// ============================================================================
// Change Detection
// ============================================================================

#[test]
fn applied_cache_suppresses_unchanged_values() {
    let mut cache = AppliedValueCache::new();
    let name = interner::intern("exposure");
    let value = PropertyValue::Float(1.5);

    assert!(cache.changed(name, &value));
    assert!(!cache.changed(name, &value));
    assert!(cache.changed(name, &PropertyValue::Float(2.0)));
}

#[test]
fn applied_cache_always_writes_arrays() {
    let mut cache = AppliedValueCache::new();
    let name = interner::intern("bones");
    let value = PropertyValue::Mat4Array(vec![Mat4::IDENTITY; 4]);

    assert!(cache.changed(name, &value));
    assert!(cache.changed(name, &value), "arrays skip comparison");
}
