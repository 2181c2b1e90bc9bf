//! Render Targets and the Transient Target Pool
//!
//! [`RenderTexture`] bundles the color attachments (plus optional depth)
//! of one render target with their pre-built views. [`RenderTargetPool`]
//! recycles targets across frames for the post-processing ping-pong
//! chain and other short-lived allocations.
//!
//! # Memory Strategy
//!
//! - Released targets are **not** destroyed; they sit in the free pool
//!   keyed by their descriptor for reuse next frame.
//! - The pool grows on demand when no compatible free target exists.
//! - Call [`RenderTargetPool::trim`] after resolution changes to release
//!   targets that have idled for several frames.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::renderer::pipeline::key::OutputFormatKey;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

// ─── Descriptors ──────────────────────────────────────────────────────────────

/// Descriptor for creating or pooling a render target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTextureDesc {
    pub width: u32,
    pub height: u32,
    pub color_formats: SmallVec<[wgpu::TextureFormat; 4]>,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub sample_count: u32,
    pub label: &'static str,
}

impl RenderTextureDesc {
    /// Single color attachment, no depth.
    #[must_use]
    pub fn color_only(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let mut color_formats = SmallVec::new();
        color_formats.push(format);
        Self {
            width,
            height,
            color_formats,
            depth_format: None,
            sample_count: 1,
            label: "Render Target",
        }
    }
}

// ─── Render Texture ───────────────────────────────────────────────────────────

/// One color attachment with its render/sample view.
#[derive(Debug)]
pub struct ColorAttachment {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// A depth attachment with its view.
#[derive(Debug)]
pub struct DepthAttachment {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// A complete render target: N color attachments + optional depth.
#[derive(Debug)]
pub struct RenderTexture {
    /// Process-unique identity, used by binding fingerprints and the
    /// effect chain's "is this still the forward buffer" checks.
    id: u64,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub color: SmallVec<[ColorAttachment; 4]>,
    pub depth: Option<DepthAttachment>,
    desc: RenderTextureDesc,
}

impl RenderTexture {
    /// Creates all attachments for `desc`.
    #[must_use]
    pub fn new(device: &wgpu::Device, desc: &RenderTextureDesc) -> Self {
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };

        let color = desc
            .color_formats
            .iter()
            .map(|&format| {
                let texture = device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(desc.label),
                    size,
                    mip_level_count: 1,
                    sample_count: desc.sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_SRC
                        | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                ColorAttachment {
                    texture,
                    view,
                    format,
                }
            })
            .collect();

        let depth = desc.depth_format.map(|format| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(desc.label),
                size,
                mip_level_count: 1,
                sample_count: desc.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            DepthAttachment {
                texture,
                view,
                format,
            }
        });

        Self {
            id: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed),
            width: desc.width,
            height: desc.height,
            sample_count: desc.sample_count,
            color,
            depth,
            desc: desc.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &RenderTextureDesc {
        &self.desc
    }

    /// First color attachment view (the common single-target case).
    #[must_use]
    pub fn primary_view(&self) -> &wgpu::TextureView {
        &self.color[0].view
    }

    /// Output format identity for pipeline selection.
    #[must_use]
    pub fn output_key(&self) -> OutputFormatKey {
        OutputFormatKey {
            colors: self.color.iter().map(|c| c.format).collect(),
            depth: self.depth.as_ref().map(|d| d.format),
            sample_count: self.sample_count,
        }
    }
}

// ─── Target Pool ──────────────────────────────────────────────────────────────

/// Pool of recyclable render targets, keyed by descriptor.
#[derive(Default)]
pub struct RenderTargetPool {
    free: FxHashMap<RenderTextureDesc, Vec<PooledTarget>>,
}

struct PooledTarget {
    target: RenderTexture,
    idle_frames: u32,
}

impl RenderTargetPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a compatible free target or creates a new one.
    #[must_use]
    pub fn acquire(&mut self, device: &wgpu::Device, desc: &RenderTextureDesc) -> RenderTexture {
        if let Some(list) = self.free.get_mut(desc)
            && let Some(pooled) = list.pop()
        {
            return pooled.target;
        }
        RenderTexture::new(device, desc)
    }

    /// Returns a target to the free pool for reuse.
    pub fn release(&mut self, target: RenderTexture) {
        self.free
            .entry(target.desc.clone())
            .or_default()
            .push(PooledTarget {
                target,
                idle_frames: 0,
            });
    }

    /// Ages free targets; call once per frame.
    pub fn end_frame(&mut self) {
        for list in self.free.values_mut() {
            for pooled in list.iter_mut() {
                pooled.idle_frames += 1;
            }
        }
    }

    /// Drops free targets idle for more than `max_idle_frames`.
    pub fn trim(&mut self, max_idle_frames: u32) {
        for list in self.free.values_mut() {
            list.retain(|pooled| pooled.idle_frames <= max_idle_frames);
        }
        self.free.retain(|_, list| !list.is_empty());
    }

    /// Number of targets currently sitting in the free pool.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }
}
