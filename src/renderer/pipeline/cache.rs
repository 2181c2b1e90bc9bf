//! Unified Pipeline Cache
//!
//! Central owner of **all** `wgpu::RenderPipeline` and
//! `wgpu::BindGroupLayout` objects the render core builds. Pipelines are
//! stored in contiguous `Vec`s and addressed through lightweight
//! [`RenderPipelineId`] / [`ResourceLayoutId`] handles; consumers never
//! own GPU pipeline state directly.
//!
//! # Caching
//!
//! The canonical cache is keyed by the full-state
//! [`GraphicsPipelineKey`] — pass identity, keyword hash, raster state,
//! and output formats. A hit returns the cached handle unchanged; a miss
//! resolves the pass variant for the request's keyword state (an error
//! if the combination was never registered), builds the resource layout
//! from the variant's declared bindings in declaration order, assembles
//! the full pipeline descriptor, and creates the GPU pipeline exactly
//! once.
//!
//! Resource layouts are deduplicated separately: passes sharing a
//! binding declaration share one `wgpu::BindGroupLayout`.
//!
//! # Ownership
//!
//! The cache is the sole owner of everything it creates.
//! [`PipelineCache::shutdown`] releases every pipeline and layout
//! explicitly; there is no finalizer-based fallback path.

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::renderer::keyword::KeywordState;
use crate::renderer::pipeline::key::{GraphicsPipelineKey, OutputFormatKey, fx_hash_key};
use crate::renderer::shader::{ShaderPass, ShaderVariant};

// ─── Handles ──────────────────────────────────────────────────────────────────

/// Non-owning handle to a cached render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPipelineId(u32);

impl RenderPipelineId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Non-owning handle to a cached bind group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceLayoutId(u32);

impl ResourceLayoutId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result of a cache lookup: the pipeline plus the resource layout it
/// was built against (needed to create matching bind groups).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineHandle {
    pub pipeline: RenderPipelineId,
    pub layout: ResourceLayoutId,
}

// ─── Requests ─────────────────────────────────────────────────────────────────

/// Everything that identifies a pipeline besides the pass itself.
#[derive(Debug, Clone)]
pub struct PipelineRequest<'a> {
    pub pass: &'a ShaderPass,
    /// Fully combined keyword state (backend defaults + material +
    /// per-draw overrides).
    pub keywords: &'a KeywordState,
    pub polygon_mode: wgpu::PolygonMode,
    pub front_face: wgpu::FrontFace,
    pub topology: wgpu::PrimitiveTopology,
    pub scissor_enabled: bool,
    pub output: OutputFormatKey,
}

impl<'a> PipelineRequest<'a> {
    /// Default raster state for a pass drawing into `output`.
    #[must_use]
    pub fn new(pass: &'a ShaderPass, keywords: &'a KeywordState, output: OutputFormatKey) -> Self {
        Self {
            pass,
            keywords,
            polygon_mode: wgpu::PolygonMode::Fill,
            front_face: wgpu::FrontFace::Ccw,
            topology: wgpu::PrimitiveTopology::TriangleList,
            scissor_enabled: false,
            output,
        }
    }

    /// The canonical full-state identity of this request.
    #[must_use]
    pub fn canonical_key(&self) -> GraphicsPipelineKey {
        GraphicsPipelineKey {
            pass: self.pass.id(),
            keyword_hash: self.keywords.variant_hash(),
            polygon_mode: self.polygon_mode,
            front_face: self.front_face,
            topology: self.topology,
            scissor_enabled: self.scissor_enabled,
            output: self.output.clone(),
        }
    }
}

// ─── Pipeline Cache ───────────────────────────────────────────────────────────

/// Central pipeline storage and deduplication cache.
pub struct PipelineCache {
    // ---- Storage (contiguous, indexed by Id) ----
    render_pipelines: Vec<wgpu::RenderPipeline>,
    resource_layouts: Vec<wgpu::BindGroupLayout>,

    // ---- Canonical lookups (full-state hash → handle) ----
    graphics_lookup: FxHashMap<u64, PipelineHandle>,
    layout_lookup: FxHashMap<u64, ResourceLayoutId>,

    hits: u64,
    misses: u64,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            render_pipelines: Vec::with_capacity(64),
            resource_layouts: Vec::with_capacity(16),
            graphics_lookup: FxHashMap::default(),
            layout_lookup: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    // ── Retrieval (execute-phase, O(1)) ──────────────────────────────────────

    /// Retrieve a render pipeline by handle. **Panics** if the id is invalid.
    #[inline]
    #[must_use]
    pub fn render_pipeline(&self, id: RenderPipelineId) -> &wgpu::RenderPipeline {
        &self.render_pipelines[id.index()]
    }

    /// Retrieve a resource layout by handle. **Panics** if the id is invalid.
    #[inline]
    #[must_use]
    pub fn resource_layout(&self, id: ResourceLayoutId) -> &wgpu::BindGroupLayout {
        &self.resource_layouts[id.index()]
    }

    /// Number of distinct pipelines created so far.
    #[inline]
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.render_pipelines.len()
    }

    /// `(hits, misses)` counters since startup or the last clear.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    // ── Lookup / Creation ────────────────────────────────────────────────────

    /// Looks up or lazily creates the pipeline for a request.
    ///
    /// Identical requests (by value equality of the keyword state, by
    /// identity of the pass) always return the same handle, and the
    /// underlying pipeline is created exactly once.
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        request: &PipelineRequest<'_>,
    ) -> Result<PipelineHandle> {
        let hash = fx_hash_key(&request.canonical_key());
        if let Some(&handle) = self.graphics_lookup.get(&hash) {
            self.hits += 1;
            return Ok(handle);
        }
        self.misses += 1;

        // Variant resolution is the only fallible step; unregistered
        // keyword combinations surface here before any GPU work.
        let variant = request.pass.variant(request.keywords)?;

        let layout_id = self.get_or_create_layout(device, variant);
        let layout = &self.resource_layouts[layout_id.index()];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&request.pass.name),
            bind_group_layouts: &[Some(layout)],
            immediate_size: 0,
        });

        // One buffer slot per declared semantic; meshes bind matching
        // slices of their channel regions.
        let attributes: Vec<wgpu::VertexAttribute> = variant
            .vertex_inputs
            .iter()
            .enumerate()
            .map(|(location, semantic)| wgpu::VertexAttribute {
                format: semantic.format(),
                offset: 0,
                shader_location: location as u32,
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout<'_>> = variant
            .vertex_inputs
            .iter()
            .zip(&attributes)
            .map(|(semantic, attribute)| wgpu::VertexBufferLayout {
                array_stride: semantic.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(attribute),
            })
            .collect();

        let color_targets: Vec<Option<wgpu::ColorTargetState>> = request
            .output
            .colors
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: request.pass.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let fragment = variant
            .fragment_entry
            .as_deref()
            .map(|entry| wgpu::FragmentState {
                module: &variant.module,
                entry_point: Some(entry),
                targets: &color_targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            });

        let depth_stencil = request.output.depth.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(request.pass.depth.write_enabled),
            depth_compare: Some(request.pass.depth.compare),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&request.pass.name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &variant.module,
                entry_point: Some(&variant.vertex_entry),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment,
            primitive: wgpu::PrimitiveState {
                topology: request.topology,
                front_face: request.front_face,
                cull_mode: request.pass.cull_mode,
                polygon_mode: request.polygon_mode,
                ..Default::default()
            },
            depth_stencil,
            multisample: wgpu::MultisampleState {
                count: request.output.sample_count.max(1),
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        let id = RenderPipelineId(self.render_pipelines.len() as u32);
        self.render_pipelines.push(pipeline);

        let handle = PipelineHandle {
            pipeline: id,
            layout: layout_id,
        };
        self.graphics_lookup.insert(hash, handle);

        log::debug!(
            "PipelineCache: compiled '{}' ({} total)",
            request.pass.name,
            self.render_pipelines.len()
        );
        Ok(handle)
    }

    /// Deduplicated bind group layout for a variant's declared bindings.
    fn get_or_create_layout(
        &mut self,
        device: &wgpu::Device,
        variant: &ShaderVariant,
    ) -> ResourceLayoutId {
        let entries: Vec<wgpu::BindGroupLayoutEntry> =
            variant.bindings.iter().map(|b| b.layout_entry()).collect();
        let hash = fx_hash_key(&entries);

        if let Some(&id) = self.layout_lookup.get(&hash) {
            return id;
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pass Resource Layout"),
            entries: &entries,
        });

        let id = ResourceLayoutId(self.resource_layouts.len() as u32);
        self.resource_layouts.push(layout);
        self.layout_lookup.insert(hash, id);
        id
    }

    // ── Invalidation / Shutdown ──────────────────────────────────────────────

    /// Clears **all** cached pipelines and layouts (called when output
    /// format settings change). Outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.render_pipelines.clear();
        self.resource_layouts.clear();
        self.graphics_lookup.clear();
        self.layout_lookup.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Releases every pipeline and resource layout.
    ///
    /// Idempotent; after shutdown the cache is empty but usable again.
    pub fn shutdown(&mut self) {
        let released = self.render_pipelines.len() + self.resource_layouts.len();
        self.clear();
        log::debug!("PipelineCache: shutdown released {released} GPU objects");
    }
}
