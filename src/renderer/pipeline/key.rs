//! Strongly-typed pipeline cache keys.
//!
//! `wgpu` descriptor types (`BlendState`, `ColorTargetState`, …) do not
//! implement `Hash` / `Eq`. This module defines *mirror* types that
//! extract the fields relevant for pipeline identity and derive the
//! correct trait impls, plus the canonical [`GraphicsPipelineKey`] every
//! cached pipeline is addressed by.

use std::hash::{BuildHasher, Hash};

use smallvec::SmallVec;

use crate::renderer::shader::PassId;

// ─── Hashable Mirror Types ────────────────────────────────────────────────────

/// Hashable mirror of `wgpu::BlendComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentKey {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl From<wgpu::BlendComponent> for BlendComponentKey {
    fn from(b: wgpu::BlendComponent) -> Self {
        Self {
            src_factor: b.src_factor,
            dst_factor: b.dst_factor,
            operation: b.operation,
        }
    }
}

/// Hashable mirror of `wgpu::BlendState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateKey {
    pub color: BlendComponentKey,
    pub alpha: BlendComponentKey,
}

impl From<wgpu::BlendState> for BlendStateKey {
    fn from(b: wgpu::BlendState) -> Self {
        Self {
            color: b.color.into(),
            alpha: b.alpha.into(),
        }
    }
}

impl BlendStateKey {
    /// Reconstructs the wgpu descriptor this key mirrors.
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::BlendState {
        wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: self.color.src_factor,
                dst_factor: self.color.dst_factor,
                operation: self.color.operation,
            },
            alpha: wgpu::BlendComponent {
                src_factor: self.alpha.src_factor,
                dst_factor: self.alpha.dst_factor,
                operation: self.alpha.operation,
            },
        }
    }
}

// ─── Output Formats ───────────────────────────────────────────────────────────

/// Attachment formats of the render target a pipeline will draw into.
///
/// Part of pipeline identity: the same pass drawn into an HDR forward
/// buffer and into an LDR swapchain blit needs two GPU pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct OutputFormatKey {
    pub colors: SmallVec<[wgpu::TextureFormat; 4]>,
    pub depth: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
}

impl OutputFormatKey {
    /// Single color attachment + optional depth, the common case.
    #[must_use]
    pub fn simple(color: wgpu::TextureFormat, depth: Option<wgpu::TextureFormat>) -> Self {
        let mut colors = SmallVec::new();
        colors.push(color);
        Self {
            colors,
            depth,
            sample_count: 1,
        }
    }

    /// Depth-only target (shadow maps, depth pre-pass).
    #[must_use]
    pub fn depth_only(depth: wgpu::TextureFormat) -> Self {
        Self {
            colors: SmallVec::new(),
            depth: Some(depth),
            sample_count: 1,
        }
    }
}

// ─── Canonical Key ────────────────────────────────────────────────────────────

/// Full-identity key of a cached graphics pipeline.
///
/// Two [`GraphicsPipelineKey`]s are equal exactly when the cache may
/// legally return the same `wgpu::RenderPipeline` for both requests.
/// The pass contributes by identity ([`PassId`]), the keyword state by
/// its order-independent content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsPipelineKey {
    pub pass: PassId,
    pub keyword_hash: u64,
    pub polygon_mode: wgpu::PolygonMode,
    pub front_face: wgpu::FrontFace,
    pub topology: wgpu::PrimitiveTopology,
    pub scissor_enabled: bool,
    pub output: OutputFormatKey,
}

/// Canonical `u64` hash of any pipeline key type.
#[must_use]
pub fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    rustc_hash::FxBuildHasher.hash_one(key)
}
