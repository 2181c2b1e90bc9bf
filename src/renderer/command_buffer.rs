//! Command Buffer
//!
//! Records draw/copy/clear commands against a typed command list and
//! replays them into a `wgpu::CommandEncoder` at submission. The state
//! machine is `Idle → Recording → Idle` via
//! [`CommandBuffer::begin_recording`] and [`CommandBuffer::submit`] (or
//! [`CommandBuffer::clear`]).
//!
//! Pipeline selection happens at record time: [`CommandBuffer::set_pass`]
//! resolves a pipeline through the [`PipelineCache`] from the current
//! keyword state, fill mode, topology, scissor flag, and the bound
//! target's output formats; changing any of these re-resolves.
//!
//! Replay deduplicates redundant pipeline/bind-group sets by id, and
//! resources replaced during recording are pushed into the retire queue,
//! never dropped while potentially in flight.

use std::ops::Range;
use std::sync::Arc;

use glam::Vec4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{ProwlError, Result};
use crate::renderer::binding::{BindableResourceSet, UniformStaging, resolve_bindings};
use crate::renderer::context::{RetireQueue, RetiredResource};
use crate::renderer::keyword::KeywordState;
use crate::renderer::pipeline::{
    OutputFormatKey, PipelineCache, PipelineHandle, PipelineRequest, RenderPipelineId,
};
use crate::renderer::properties::PropertyState;
use crate::renderer::resources::GpuResources;
use crate::renderer::shader::ShaderPass;
use crate::resources::material::Material;
use crate::resources::mesh::Mesh;
use crate::resources::texture::RenderTexture;
use crate::utils::interner;

// ─── Context ──────────────────────────────────────────────────────────────────

/// Borrowed engine state a command buffer records against.
pub struct BindContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub heap: &'a GpuResources,
    /// Global property tier of the current frame.
    pub globals: &'a PropertyState,
    pub cache: &'a mut PipelineCache,
    pub retire: &'a mut RetireQueue,
    /// Backend capability keywords combined into every variant lookup.
    pub default_keywords: &'a KeywordState,
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Render pass boundary with attachment views and load ops.
struct PassTarget {
    color_views: SmallVec<[wgpu::TextureView; 4]>,
    depth_view: Option<wgpu::TextureView>,
    clear_color: Option<wgpu::Color>,
    clear_depth: Option<f32>,
}

enum RenderCommand {
    BeginPass(PassTarget),
    SetPipeline {
        id: RenderPipelineId,
        pipeline: wgpu::RenderPipeline,
    },
    SetBindGroup {
        id: u64,
        bind_group: wgpu::BindGroup,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: wgpu::Buffer,
        offset: u64,
    },
    SetIndexBuffer {
        buffer: wgpu::Buffer,
        format: wgpu::IndexFormat,
    },
    SetViewport {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    SetScissor {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
    DrawIndirect {
        buffer: wgpu::Buffer,
        offset: u64,
    },
    CopyTexture {
        src: wgpu::Texture,
        dst: wgpu::Texture,
        size: wgpu::Extent3d,
    },
}

// ─── Recording State ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    Idle,
    Recording,
}

/// Pipeline-affecting raster state, re-resolved on change.
struct ActivePass {
    pass: Arc<ShaderPass>,
    keywords: KeywordState,
    handle: PipelineHandle,
}

/// The pass most recently requested via `set_pass`, kept so raster or
/// target changes can lazily re-resolve the pipeline.
struct RequestedPass {
    pass: Arc<ShaderPass>,
    material_keywords: Option<KeywordState>,
}

/// Per-(pass, variant) binding state kept across draws and frames.
struct PassBindingState {
    uniforms: Vec<UniformStaging>,
    resource_set: BindableResourceSet,
}

/// A recordable, replayable command buffer.
pub struct CommandBuffer {
    name: String,
    state: RecordState,
    commands: Vec<RenderCommand>,

    // -- current recording state --
    output: Option<OutputFormatKey>,
    active: Option<ActivePass>,
    requested: Option<RequestedPass>,
    /// Material properties overlaid with per-draw overrides.
    draw_properties: PropertyState,
    keyword_overrides: KeywordState,
    fill_mode: wgpu::PolygonMode,
    front_face: wgpu::FrontFace,
    topology: wgpu::PrimitiveTopology,
    scissor_enabled: bool,

    /// Binding state per (pass id, keyword hash).
    bindings: FxHashMap<(u32, u64), PassBindingState>,
}

impl CommandBuffer {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: RecordState::Idle,
            commands: Vec::new(),
            output: None,
            active: None,
            requested: None,
            draw_properties: PropertyState::new(),
            keyword_overrides: KeywordState::new(),
            fill_mode: wgpu::PolygonMode::Fill,
            front_face: wgpu::FrontFace::Ccw,
            topology: wgpu::PrimitiveTopology::TriangleList,
            scissor_enabled: false,
            bindings: FxHashMap::default(),
        }
    }

    // ── State machine ────────────────────────────────────────────────────────

    /// `Idle → Recording`. Fails when already recording.
    pub fn begin_recording(&mut self) -> Result<()> {
        if self.state == RecordState::Recording {
            return Err(ProwlError::InvalidRecordingState(
                "begin_recording while already recording",
            ));
        }
        self.state = RecordState::Recording;
        self.commands.clear();
        self.output = None;
        self.active = None;
        self.requested = None;
        self.draw_properties.clear();
        self.keyword_overrides.clear();
        Ok(())
    }

    /// Drops all recorded commands and returns to `Idle`.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.output = None;
        self.active = None;
        self.requested = None;
        self.draw_properties.clear();
        self.keyword_overrides.clear();
        self.state = RecordState::Idle;
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.state == RecordState::Recording
    }

    fn ensure_recording(&self) -> Result<()> {
        if self.state != RecordState::Recording {
            return Err(ProwlError::InvalidRecordingState(
                "command issued while idle",
            ));
        }
        Ok(())
    }

    // ── Targets ──────────────────────────────────────────────────────────────

    /// Binds a render target and records its output format for
    /// subsequent pipeline selection.
    pub fn set_render_target(
        &mut self,
        target: &RenderTexture,
        clear_color: Option<Vec4>,
        clear_depth: Option<f32>,
    ) -> Result<()> {
        self.ensure_recording()?;
        self.commands.push(RenderCommand::BeginPass(PassTarget {
            color_views: target.color.iter().map(|c| c.view.clone()).collect(),
            depth_view: target.depth.as_ref().map(|d| d.view.clone()),
            clear_color: clear_color.map(|c| wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            }),
            clear_depth,
        }));
        self.output = Some(target.output_key());
        // The active pipeline was resolved against the old output formats.
        self.active = None;
        Ok(())
    }

    /// Binds only the first color attachment (+ depth) of a
    /// multi-attachment target. Used by passes that write color but not
    /// the auxiliary G-buffer attachments (skybox, transparents, post).
    pub fn set_render_target_primary(
        &mut self,
        target: &RenderTexture,
        clear_color: Option<Vec4>,
        clear_depth: Option<f32>,
    ) -> Result<()> {
        self.ensure_recording()?;
        let mut color_views = SmallVec::new();
        color_views.push(target.color[0].view.clone());
        self.commands.push(RenderCommand::BeginPass(PassTarget {
            color_views,
            depth_view: target.depth.as_ref().map(|d| d.view.clone()),
            clear_color: clear_color.map(|c| wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            }),
            clear_depth,
        }));
        self.output = Some(OutputFormatKey {
            colors: std::iter::once(target.color[0].format).collect(),
            depth: target.depth.as_ref().map(|d| d.format),
            sample_count: target.sample_count,
        });
        self.active = None;
        Ok(())
    }

    /// Binds a depth-only target (shadow atlas, depth pre-pass).
    pub fn set_depth_target(
        &mut self,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        clear_depth: Option<f32>,
    ) -> Result<()> {
        self.ensure_recording()?;
        self.commands.push(RenderCommand::BeginPass(PassTarget {
            color_views: SmallVec::new(),
            depth_view: Some(view.clone()),
            clear_color: None,
            clear_depth,
        }));
        self.output = Some(OutputFormatKey::depth_only(format));
        self.active = None;
        Ok(())
    }

    /// Binds a raw texture view (e.g. the swapchain) as a single-color
    /// target without depth.
    pub fn set_raw_target(
        &mut self,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        clear_color: Option<Vec4>,
    ) -> Result<()> {
        self.ensure_recording()?;
        let mut color_views = SmallVec::new();
        color_views.push(view.clone());
        self.commands.push(RenderCommand::BeginPass(PassTarget {
            color_views,
            depth_view: None,
            clear_color: clear_color.map(|c| wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            }),
            clear_depth: None,
        }));
        self.output = Some(OutputFormatKey::simple(format, None));
        self.active = None;
        Ok(())
    }

    // ── Raster state ─────────────────────────────────────────────────────────

    pub fn set_fill_mode(&mut self, mode: wgpu::PolygonMode) {
        if self.fill_mode != mode {
            self.fill_mode = mode;
            self.active = None;
        }
    }

    pub fn set_front_face(&mut self, winding: wgpu::FrontFace) {
        if self.front_face != winding {
            self.front_face = winding;
            self.active = None;
        }
    }

    pub fn set_topology(&mut self, topology: wgpu::PrimitiveTopology) {
        if self.topology != topology {
            self.topology = topology;
            self.active = None;
        }
    }

    pub fn set_scissor_enabled(&mut self, enabled: bool) {
        if self.scissor_enabled != enabled {
            self.scissor_enabled = enabled;
            self.active = None;
        }
    }

    /// Keyword overrides combined on top of material keywords; changing
    /// them forces pipeline re-resolution on the next `set_pass`.
    pub fn set_keyword(&mut self, key: &str, value: &str) {
        self.keyword_overrides.set_key(key, value);
        self.active = None;
    }

    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        self.ensure_recording()?;
        self.commands.push(RenderCommand::SetViewport {
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    pub fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        self.ensure_recording()?;
        self.commands.push(RenderCommand::SetScissor {
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    // ── Pass / Material ──────────────────────────────────────────────────────

    /// Per-draw property overrides (applied over material properties).
    pub fn properties_mut(&mut self) -> &mut PropertyState {
        &mut self.draw_properties
    }

    /// Resolves and binds the pipeline for `pass` with the current
    /// keyword/raster/output state.
    ///
    /// Raster-state or target changes after this call lazily re-resolve
    /// the pipeline at the next bind/draw-data call.
    pub fn set_pass(
        &mut self,
        ctx: &mut BindContext<'_>,
        pass: &Arc<ShaderPass>,
        material_keywords: Option<&KeywordState>,
    ) -> Result<()> {
        self.ensure_recording()?;
        self.requested = Some(RequestedPass {
            pass: Arc::clone(pass),
            material_keywords: material_keywords.cloned(),
        });
        // `ensure_pipeline` compares against the still-active pass, so
        // re-setting the same pass and keywords stays free.
        self.ensure_pipeline(ctx)
    }

    /// Re-resolves the pipeline for the requested pass when the active
    /// one was invalidated (pass, keyword, raster, or target change).
    fn ensure_pipeline(&mut self, ctx: &mut BindContext<'_>) -> Result<()> {
        let requested = self.requested.as_ref().ok_or(ProwlError::NoActivePass)?;
        let output = self.output.clone().ok_or(ProwlError::NoRenderTarget)?;

        let mut keywords = ctx.default_keywords.clone();
        if let Some(material_keywords) = &requested.material_keywords {
            keywords = KeywordState::combine(&keywords, material_keywords);
        }
        keywords = KeywordState::combine(&keywords, &self.keyword_overrides);

        // Skip re-resolution when nothing pipeline-relevant changed.
        if let Some(active) = &self.active
            && Arc::ptr_eq(&active.pass, &requested.pass)
            && active.keywords == keywords
        {
            return Ok(());
        }

        let request = PipelineRequest {
            pass: &requested.pass,
            keywords: &keywords,
            polygon_mode: self.fill_mode,
            front_face: self.front_face,
            topology: self.topology,
            scissor_enabled: self.scissor_enabled,
            output,
        };
        let handle = ctx.cache.get_or_create(ctx.device, &request)?;

        self.commands.push(RenderCommand::SetPipeline {
            id: handle.pipeline,
            pipeline: ctx.cache.render_pipeline(handle.pipeline).clone(),
        });
        self.active = Some(ActivePass {
            pass: Arc::clone(&requested.pass),
            keywords,
            handle,
        });
        Ok(())
    }

    /// Binds a material: its main pass, keywords, and baked properties.
    pub fn set_material(&mut self, ctx: &mut BindContext<'_>, material: &Material) -> Result<()> {
        let pass = Arc::clone(&material.pass);
        self.set_material_pass(ctx, &pass, material)
    }

    /// Binds a specific pass (depth-only, shadow caster) with a
    /// material's keywords and baked properties.
    pub fn set_material_pass(
        &mut self,
        ctx: &mut BindContext<'_>,
        pass: &Arc<ShaderPass>,
        material: &Material,
    ) -> Result<()> {
        self.draw_properties = material.properties.clone();
        self.set_pass(ctx, pass, Some(&material.keywords))
    }

    // ── Resource binding ─────────────────────────────────────────────────────

    /// Resolves every declared resource of the active variant against
    /// the property tiers and (re)binds the resource set.
    ///
    /// The GPU bind group is only recreated when some slot's resource
    /// actually changed since the last bind — the fingerprint check.
    pub fn bind_resources(&mut self, ctx: &mut BindContext<'_>) -> Result<()> {
        self.ensure_recording()?;
        self.ensure_pipeline(ctx)?;
        let active = self.active.as_ref().ok_or(ProwlError::NoActivePass)?;
        let variant = active.pass.variant(&active.keywords)?;

        let key = (active.pass.id().value(), active.keywords.variant_hash());
        let binding_state = self.bindings.entry(key).or_insert_with(|| PassBindingState {
            uniforms: variant
                .uniform_blocks
                .iter()
                .map(|block| UniformStaging::new(ctx.device, block.clone()))
                .collect(),
            resource_set: BindableResourceSet::new(variant.bindings.clone()),
        });

        for staging in &mut binding_state.uniforms {
            staging.update(&self.draw_properties, ctx.globals);
            staging.upload(ctx.queue);
        }

        let resolved = resolve_bindings(
            binding_state.resource_set.bindings(),
            &self.draw_properties,
            ctx.globals,
            ctx.heap,
            &binding_state.uniforms,
        );
        let layout = ctx.cache.resource_layout(active.handle.layout);
        let (bind_group, stale) = binding_state
            .resource_set
            .bind(ctx.device, layout, &resolved);
        let bind_group = bind_group.clone();

        if let Some(stale) = stale {
            ctx.retire.dispose(RetiredResource::BindGroup(stale));
        }

        self.commands.push(RenderCommand::SetBindGroup {
            id: binding_state.resource_set.bind_group_id(),
            bind_group,
        });
        Ok(())
    }

    /// Re-resolves and uploads one named uniform block of the active
    /// variant (member-diffed against the applied cache).
    pub fn update_buffer(&mut self, ctx: &mut BindContext<'_>, name: &str) -> Result<()> {
        self.ensure_recording()?;
        let active = self.active.as_ref().ok_or(ProwlError::NoActivePass)?;
        let key = (active.pass.id().value(), active.keywords.variant_hash());
        let Some(binding_state) = self.bindings.get_mut(&key) else {
            return Ok(());
        };
        let Some(name_sym) = interner::get(name) else {
            return Ok(());
        };

        for staging in &mut binding_state.uniforms {
            if staging.block().name == name_sym {
                staging.update(&self.draw_properties, ctx.globals);
                staging.upload(ctx.queue);
            }
        }
        Ok(())
    }

    // ── Draw data ────────────────────────────────────────────────────────────

    /// Uploads the mesh if dirty and binds its vertex/index buffers for
    /// the active variant's declared inputs.
    pub fn set_draw_data(&mut self, ctx: &mut BindContext<'_>, mesh: &mut Mesh) -> Result<()> {
        self.ensure_recording()?;
        self.ensure_pipeline(ctx)?;
        let active = self.active.as_ref().ok_or(ProwlError::NoActivePass)?;
        let variant = active.pass.variant(&active.keywords)?;

        mesh.upload(ctx.device)?;
        let gpu = mesh.gpu().expect("mesh uploaded above");

        for (slot, semantic) in variant.vertex_inputs.iter().enumerate() {
            let offset = gpu.layout.offset(*semantic).ok_or_else(|| {
                ProwlError::InvalidMesh(format!(
                    "mesh '{}' is missing channel {semantic:?} declared by pass '{}'",
                    mesh.name, active.pass.name
                ))
            })?;
            self.commands.push(RenderCommand::SetVertexBuffer {
                slot: slot as u32,
                buffer: gpu.vertex_buffer.clone(),
                offset,
            });
        }

        if let Some(index_buffer) = &gpu.index_buffer {
            self.commands.push(RenderCommand::SetIndexBuffer {
                buffer: index_buffer.clone(),
                format: gpu.index_format,
            });
        }
        Ok(())
    }

    pub fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) -> Result<()> {
        self.ensure_recording()?;
        if self.active.is_none() {
            return Err(ProwlError::NoActivePass);
        }
        self.commands.push(RenderCommand::Draw {
            vertices,
            instances,
        });
        Ok(())
    }

    pub fn draw_indexed(
        &mut self,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> Result<()> {
        self.ensure_recording()?;
        if self.active.is_none() {
            return Err(ProwlError::NoActivePass);
        }
        self.commands.push(RenderCommand::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
        Ok(())
    }

    pub fn draw_indirect(&mut self, buffer: &wgpu::Buffer, offset: u64) -> Result<()> {
        self.ensure_recording()?;
        if self.active.is_none() {
            return Err(ProwlError::NoActivePass);
        }
        self.commands.push(RenderCommand::DrawIndirect {
            buffer: buffer.clone(),
            offset,
        });
        Ok(())
    }

    /// Records a whole-texture copy (e.g. depth pre-pass → forward depth).
    pub fn copy_texture(
        &mut self,
        src: &wgpu::Texture,
        dst: &wgpu::Texture,
        size: wgpu::Extent3d,
    ) -> Result<()> {
        self.ensure_recording()?;
        self.commands.push(RenderCommand::CopyTexture {
            src: src.clone(),
            dst: dst.clone(),
            size,
        });
        Ok(())
    }

    // ── Submission ───────────────────────────────────────────────────────────

    /// Replays the recorded commands into an encoder and submits.
    ///
    /// Fire-and-forget by default; `wait_for_completion` blocks on a
    /// fence (synchronous readback paths only). Resources queued for
    /// disposal during recording are sealed against this submission and
    /// freed once the GPU retires it.
    pub fn submit(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        retire: &mut RetireQueue,
        wait_for_completion: bool,
    ) -> Result<()> {
        self.ensure_recording()?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(&self.name),
        });
        self.replay(&mut encoder);

        queue.submit(std::iter::once(encoder.finish()));
        retire.seal_submission(queue);
        retire.collect();

        if wait_for_completion {
            let _ = device.poll(wgpu::PollType::wait_indefinitely());
            retire.collect();
        }

        self.commands.clear();
        self.output = None;
        self.active = None;
        self.state = RecordState::Idle;
        Ok(())
    }

    fn replay(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut i = 0;
        while i < self.commands.len() {
            match &self.commands[i] {
                RenderCommand::CopyTexture { src, dst, size } => {
                    encoder.copy_texture_to_texture(
                        src.as_image_copy(),
                        dst.as_image_copy(),
                        *size,
                    );
                    i += 1;
                }
                RenderCommand::BeginPass(target) => {
                    i = self.replay_pass(encoder, target, i + 1);
                }
                _ => {
                    // Commands outside a pass scope are recording bugs;
                    // skip rather than crash the frame.
                    log::warn!("CommandBuffer '{}': command outside pass scope", self.name);
                    i += 1;
                }
            }
        }
    }

    /// Replays one pass segment; returns the index after it.
    fn replay_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &PassTarget,
        start: usize,
    ) -> usize {
        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> = target
            .color_views
            .iter()
            .map(|view| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: match target.clear_color {
                            Some(color) => wgpu::LoadOp::Clear(color),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect();

        let depth_stencil_attachment =
            target
                .depth_view
                .as_ref()
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: match target.clear_depth {
                            Some(depth) => wgpu::LoadOp::Clear(depth),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.name),
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // Redundant-set elimination across the pass segment.
        let mut last_pipeline: Option<RenderPipelineId> = None;
        let mut last_bind_group: u64 = 0;

        let mut i = start;
        while i < self.commands.len() {
            match &self.commands[i] {
                RenderCommand::BeginPass(_) | RenderCommand::CopyTexture { .. } => return i,
                RenderCommand::SetPipeline { id, pipeline } => {
                    if last_pipeline != Some(*id) {
                        rpass.set_pipeline(pipeline);
                        last_pipeline = Some(*id);
                    }
                }
                RenderCommand::SetBindGroup { id, bind_group } => {
                    if last_bind_group != *id {
                        rpass.set_bind_group(0, bind_group, &[]);
                        last_bind_group = *id;
                    }
                }
                RenderCommand::SetVertexBuffer {
                    slot,
                    buffer,
                    offset,
                } => {
                    rpass.set_vertex_buffer(*slot, buffer.slice(*offset..));
                }
                RenderCommand::SetIndexBuffer { buffer, format } => {
                    rpass.set_index_buffer(buffer.slice(..), *format);
                }
                RenderCommand::SetViewport {
                    x,
                    y,
                    width,
                    height,
                } => {
                    rpass.set_viewport(*x, *y, *width, *height, 0.0, 1.0);
                }
                RenderCommand::SetScissor {
                    x,
                    y,
                    width,
                    height,
                } => {
                    rpass.set_scissor_rect(*x, *y, *width, *height);
                }
                RenderCommand::Draw {
                    vertices,
                    instances,
                } => {
                    rpass.draw(vertices.clone(), instances.clone());
                }
                RenderCommand::DrawIndexed {
                    indices,
                    base_vertex,
                    instances,
                } => {
                    rpass.draw_indexed(indices.clone(), *base_vertex, instances.clone());
                }
                RenderCommand::DrawIndirect { buffer, offset } => {
                    rpass.draw_indirect(buffer, *offset);
                }
            }
            i += 1;
        }
        i
    }
}
