//! Property State
//!
//! A [`PropertyState`] is a typed property bag mapping interned names to
//! scalars, vectors, matrices, matrix arrays, textures, and buffers. Two
//! tiers exist at draw time:
//!
//! - the **per-draw** tier (material properties overlaid with command
//!   buffer overrides), and
//! - the **global** tier, owned by [`FrameProperties`] with an explicit
//!   per-frame lifecycle (`begin_frame` … `end_frame`) so nothing leaks
//!   across frames.
//!
//! # Resolution
//!
//! For each reflected uniform member the binding layer looks the name up
//! in the per-draw tier, falls back to the global tier, and otherwise
//! leaves the default GPU-side value (textures fall back to the default
//! white/black/normal resources). A value whose stored kind does not
//! match the declared kind is treated as *absent* — never coerced.
//!
//! # Dirty tracking
//!
//! [`AppliedValueCache`] remembers the last value written per uniform
//! member so unchanged scalars/vectors/matrices skip the GPU write.
//! Array members are exempt: comparing them costs more than writing.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::renderer::resources::{BufferHandle, TextureHandle};
use crate::renderer::shader::UniformKind;
use crate::utils::interner::{self, Symbol};

// ─── Values ───────────────────────────────────────────────────────────────────

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Mat4Array(Vec<Mat4>),
}

impl PropertyValue {
    /// Whether this value satisfies a declared uniform kind.
    ///
    /// Shape must match exactly for scalars/vectors/matrices; arrays
    /// accept any stored length up to the declared count (partial light
    /// arrays are the norm).
    #[must_use]
    pub fn matches(&self, kind: UniformKind) -> bool {
        match (self, kind) {
            (Self::Float(_), UniformKind::Float)
            | (Self::Int(_), UniformKind::Int)
            | (Self::Vec2(_), UniformKind::Vec2)
            | (Self::Vec3(_), UniformKind::Vec3)
            | (Self::Vec4(_), UniformKind::Vec4)
            | (Self::Mat4(_), UniformKind::Mat4) => true,
            (Self::Mat4Array(values), UniformKind::Mat4Array { count }) => {
                values.len() as u32 <= count
            }
            _ => false,
        }
    }
}

/// A bound texture plus optional sampler override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlot {
    pub texture: TextureHandle,
    pub sampler: Option<TextureHandle>,
}

/// A bound buffer plus optional binding-point override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    pub buffer: BufferHandle,
    pub binding: Option<u32>,
}

// ─── Property State ───────────────────────────────────────────────────────────

/// One tier of named property values.
#[derive(Debug, Clone, Default)]
pub struct PropertyState {
    values: FxHashMap<Symbol, PropertyValue>,
    textures: FxHashMap<Symbol, TextureSlot>,
    buffers: FxHashMap<Symbol, BufferSlot>,
}

impl PropertyState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Setters (overwrite semantics) ────────────────────────────────────────

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.values
            .insert(interner::intern(name), PropertyValue::Float(value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.values
            .insert(interner::intern(name), PropertyValue::Int(value));
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.values
            .insert(interner::intern(name), PropertyValue::Vec2(value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.values
            .insert(interner::intern(name), PropertyValue::Vec3(value));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.values
            .insert(interner::intern(name), PropertyValue::Vec4(value));
    }

    /// Colors are stored as linear RGBA vec4.
    pub fn set_color(&mut self, name: &str, value: Vec4) {
        self.set_vec4(name, value);
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.values
            .insert(interner::intern(name), PropertyValue::Mat4(value));
    }

    pub fn set_mat4_array(&mut self, name: &str, value: Vec<Mat4>) {
        self.values
            .insert(interner::intern(name), PropertyValue::Mat4Array(value));
    }

    pub fn set_texture(&mut self, name: &str, texture: TextureHandle) {
        self.textures.insert(
            interner::intern(name),
            TextureSlot {
                texture,
                sampler: None,
            },
        );
    }

    pub fn set_texture_with_sampler(
        &mut self,
        name: &str,
        texture: TextureHandle,
        sampler: TextureHandle,
    ) {
        self.textures.insert(
            interner::intern(name),
            TextureSlot {
                texture,
                sampler: Some(sampler),
            },
        );
    }

    pub fn set_buffer(&mut self, name: &str, buffer: BufferHandle, binding: Option<u32>) {
        self.buffers
            .insert(interner::intern(name), BufferSlot { buffer, binding });
    }

    // ── Typed getters (kind-checked, never coercing) ─────────────────────────

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.value_by_name(name)? {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.value_by_name(name)? {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn vec4(&self, name: &str) -> Option<Vec4> {
        match self.value_by_name(name)? {
            PropertyValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.value_by_name(name)? {
            PropertyValue::Mat4(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<TextureSlot> {
        interner::get(name).and_then(|sym| self.textures.get(&sym).copied())
    }

    #[must_use]
    pub fn buffer(&self, name: &str) -> Option<BufferSlot> {
        interner::get(name).and_then(|sym| self.buffers.get(&sym).copied())
    }

    fn value_by_name(&self, name: &str) -> Option<&PropertyValue> {
        interner::get(name).and_then(|sym| self.values.get(&sym))
    }

    // ── Symbol-keyed lookups (hot path) ──────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn value(&self, name: Symbol) -> Option<&PropertyValue> {
        self.values.get(&name)
    }

    /// Kind-checked lookup used during uniform resolution: a stored
    /// value of the wrong kind is reported as absent.
    #[must_use]
    pub fn value_matching(&self, name: Symbol, kind: UniformKind) -> Option<&PropertyValue> {
        self.values.get(&name).filter(|v| v.matches(kind))
    }

    #[inline]
    #[must_use]
    pub fn texture_slot(&self, name: Symbol) -> Option<TextureSlot> {
        self.textures.get(&name).copied()
    }

    #[inline]
    #[must_use]
    pub fn buffer_slot(&self, name: Symbol) -> Option<BufferSlot> {
        self.buffers.get(&name).copied()
    }

    // ── Merging / lifecycle ──────────────────────────────────────────────────

    /// Overlays `other`'s entries on top of this state.
    ///
    /// Last-writer-wins per key within each category; keys absent from
    /// `other` keep their current values.
    pub fn apply_override(&mut self, other: &PropertyState) {
        for (&name, value) in &other.values {
            self.values.insert(name, value.clone());
        }
        for (&name, &slot) in &other.textures {
            self.textures.insert(name, slot);
        }
        for (&name, &slot) in &other.buffers {
            self.buffers.insert(name, slot);
        }
    }

    /// Removes every entry from every category.
    pub fn clear(&mut self) {
        self.values.clear();
        self.textures.clear();
        self.buffers.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.textures.is_empty() && self.buffers.is_empty()
    }
}

// ─── Frame Properties ─────────────────────────────────────────────────────────

/// The global property tier, scoped to exactly one frame.
///
/// The render pipeline creates this once, calls [`FrameProperties::begin_frame`]
/// at the top of every frame and [`FrameProperties::end_frame`] at the
/// bottom; the latter clears every global so state cannot leak into the
/// next frame. Not safe for concurrent mutation — the frame loop is
/// single-threaded by contract.
#[derive(Debug, Default)]
pub struct FrameProperties {
    globals: PropertyState,
    frame_index: u64,
    in_frame: bool,
}

impl FrameProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a frame.
    pub fn begin_frame(&mut self, frame_index: u64) {
        debug_assert!(!self.in_frame, "begin_frame called twice without end_frame");
        self.frame_index = frame_index;
        self.in_frame = true;
    }

    /// Clears every global and marks the frame finished.
    pub fn end_frame(&mut self) {
        self.globals.clear();
        self.in_frame = false;
    }

    #[inline]
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    #[must_use]
    pub fn globals(&self) -> &PropertyState {
        &self.globals
    }

    #[inline]
    pub fn globals_mut(&mut self) -> &mut PropertyState {
        &mut self.globals
    }
}

// ─── Applied Value Cache ──────────────────────────────────────────────────────

/// Per-shader cache of the last value written for each uniform member.
///
/// [`AppliedValueCache::changed`] compares and records in one step; the
/// caller skips the GPU write when it returns `false`. Arrays always
/// report changed.
#[derive(Debug, Default)]
pub struct AppliedValueCache {
    applied: FxHashMap<Symbol, PropertyValue>,
}

impl AppliedValueCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `value` differs from the last applied value for
    /// `name`, recording it as applied either way.
    pub fn changed(&mut self, name: Symbol, value: &PropertyValue) -> bool {
        if matches!(value, PropertyValue::Mat4Array(_)) {
            // Not worth the comparison; the caller writes unconditionally.
            self.applied.insert(name, value.clone());
            return true;
        }
        match self.applied.get(&name) {
            Some(previous) if previous == value => false,
            _ => {
                self.applied.insert(name, value.clone());
                true
            }
        }
    }

    /// Forgets all applied values (e.g. after the GPU buffer was
    /// recreated and no longer holds them).
    pub fn reset(&mut self) {
        self.applied.clear();
    }
}
