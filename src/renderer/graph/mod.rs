//! Default Render Pipeline
//!
//! Orchestrates a full camera frame as a strict stage sequence:
//!
//! 1. Lazily create static resources (blit/skybox passes, meshes)
//! 2. `on_pre_cull` effect callbacks
//! 3. Immutable [`CameraSnapshot`]
//! 4. Publish global uniforms (camera matrices, time, fog, ambient)
//! 5. Frustum + layer culling
//! 6. `on_pre_render` effect callbacks
//! 7. Shadow atlas setup + shadow-caster sub-passes + light upload
//! 8. Re-publish camera globals
//! 9. Depth pre-pass (depth published as a global)
//! 10. Opaque pass with motion-vector tracking
//! 11. Skybox (after opaque, so depth rejects covered sky fragments)
//! 12. Opaque-tier image effects (ping-pong chain)
//! 13. Transparent pass (back-to-front)
//! 14. Final-tier image effects
//! 15. Blit to the camera target
//! 16. `on_post_render` callbacks + temporary release
//!
//! The global property tier lives in an explicit [`FrameProperties`]
//! context with a begin/end lifecycle; nothing leaks across frames.

pub mod cull;
pub mod effects;
pub mod history;
pub mod passes;
pub mod view;

use std::time::Instant;

use glam::{Mat4, Vec2, Vec4};
use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::context::{GpuContext, RetiredResource};
use crate::renderer::graph::effects::{EffectContext, EffectTier, ImageEffect, run_effect_chain};
use crate::renderer::graph::history::TransformHistory;
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::pipeline::PipelineCache;
use crate::renderer::properties::FrameProperties;
use crate::renderer::renderable::Renderable;
use crate::renderer::resources::{GpuResources, GpuTexture, TextureHandle, GpuBuffer, BufferHandle};
use crate::renderer::shadow_atlas::ShadowAtlas;
use crate::resources::texture::{RenderTargetPool, RenderTexture, RenderTextureDesc};
use crate::scene::camera::{Camera, ClearFlags};
use crate::scene::light::{GpuLight, Light};
use crate::settings::RenderSettings;

/// Where the finished frame lands.
pub enum RenderTarget<'a> {
    /// Swapchain or other raw view.
    Screen {
        view: &'a wgpu::TextureView,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    },
    /// Off-screen render texture.
    Texture(&'a RenderTexture),
}

impl RenderTarget<'_> {
    fn size(&self) -> (u32, u32) {
        match self {
            RenderTarget::Screen { width, height, .. } => (*width, *height),
            RenderTarget::Texture(target) => (target.width, target.height),
        }
    }
}

/// Static resources created once and reused every frame.
struct StaticResources {
    blit: passes::blit::BlitPass,
    skybox: passes::skybox::SkyboxPass,
}

/// The forward rendering pipeline.
pub struct DefaultRenderPipeline {
    settings: RenderSettings,
    pub cache: PipelineCache,
    pub heap: GpuResources,
    atlas: ShadowAtlas,
    history: TransformHistory,
    pool: RenderTargetPool,
    frame: FrameProperties,
    cb: CommandBuffer,

    statics: Option<StaticResources>,
    attachment_sampler: wgpu::Sampler,

    /// Last frame's view-projection per camera, for motion vectors.
    previous_view_projection: FxHashMap<uuid::Uuid, Mat4>,
    light_buffer: Option<BufferHandle>,
    light_buffer_capacity: usize,
    /// Heap handles registered for this frame only.
    frame_handles: Vec<TextureHandle>,

    frame_index: u64,
    start_time: Instant,
}

impl DefaultRenderPipeline {
    #[must_use]
    pub fn new(gpu: &GpuContext, settings: RenderSettings) -> Self {
        let mut atlas = ShadowAtlas::from_settings(&settings);
        atlas.create_texture(&gpu.device);

        let attachment_sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Attachment Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            heap: GpuResources::new(&gpu.device, &gpu.queue),
            cache: PipelineCache::new(),
            history: TransformHistory::new(settings.history_cleanup_interval),
            pool: RenderTargetPool::new(),
            frame: FrameProperties::new(),
            cb: CommandBuffer::new("Frame"),
            statics: None,
            attachment_sampler,
            previous_view_projection: FxHashMap::default(),
            light_buffer: None,
            light_buffer_capacity: 0,
            frame_handles: Vec::new(),
            frame_index: 0,
            start_time: Instant::now(),
            atlas,
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn shadow_atlas(&self) -> &ShadowAtlas {
        &self.atlas
    }

    #[inline]
    #[must_use]
    pub fn transform_history(&self) -> &TransformHistory {
        &self.history
    }

    /// Renders one camera. Stage order is a strict total order; a frame
    /// is fully processed before the next begins.
    pub fn render(
        &mut self,
        gpu: &mut GpuContext,
        camera: &Camera,
        renderables: &mut [&mut dyn Renderable],
        lights: &[Light],
        effects: &mut [&mut dyn ImageEffect],
        target: &RenderTarget<'_>,
    ) -> Result<()> {
        // 1. Static resources exist before anything records.
        if self.statics.is_none() {
            self.statics = Some(StaticResources {
                blit: passes::blit::BlitPass::new(&gpu.device, &gpu.default_keywords),
                skybox: passes::skybox::SkyboxPass::new(&gpu.device, &gpu.default_keywords),
            });
        }

        // 2. Pre-cull callbacks may still mutate the live camera.
        for effect in effects.iter_mut() {
            effect.on_pre_cull();
        }

        // 3. Snapshot: from here on the live camera is never read.
        let (width, height) = target.size();
        let previous_vp = self
            .previous_view_projection
            .get(&camera.uuid)
            .copied()
            .unwrap_or_else(|| camera.view_projection_matrix());
        let snapshot = CameraSnapshot::capture(camera, width, height, previous_vp);

        // 4. Global uniforms.
        self.frame.begin_frame(self.frame_index);
        self.publish_camera_globals(&snapshot);

        // 5. Culling (recomputed every frame; list never mutated).
        let excluded =
            cull::cull_renderables(renderables, &snapshot.frustum, snapshot.culling_mask);

        // 6. Pre-render callbacks.
        for effect in effects.iter_mut() {
            effect.on_pre_render(&snapshot);
        }

        self.cb.begin_recording()?;

        // 7. Shadows: atlas reservation, caster sub-passes, light upload.
        let gpu_lights = {
            let mut ctx = BindContext {
                device: &gpu.device,
                queue: &gpu.queue,
                heap: &self.heap,
                globals: self.frame.globals(),
                cache: &mut self.cache,
                retire: &mut gpu.retire,
                default_keywords: &gpu.default_keywords,
            };
            passes::shadow::run(
                &mut self.cb,
                &mut ctx,
                &mut self.atlas,
                lights,
                renderables,
                &snapshot,
                &self.settings,
            )?
        };
        self.upload_lights(gpu, &gpu_lights);
        self.publish_shadow_globals();

        // 8. Lighting setup may have touched globals; camera matrices
        // are re-published before geometry passes read them.
        self.publish_camera_globals(&snapshot);

        // 9. Depth pre-pass.
        let depth_desc = RenderTextureDesc {
            width,
            height,
            color_formats: smallvec::SmallVec::new(),
            depth_format: Some(self.settings.depth_format()),
            sample_count: 1,
            label: "Depth PrePass",
        };
        let prepass_depth = self.pool.acquire(&gpu.device, &depth_desc);
        {
            let mut ctx = BindContext {
                device: &gpu.device,
                queue: &gpu.queue,
                heap: &self.heap,
                globals: self.frame.globals(),
                cache: &mut self.cache,
                retire: &mut gpu.retire,
                default_keywords: &gpu.default_keywords,
            };
            passes::prepass::run(
                &mut self.cb,
                &mut ctx,
                &prepass_depth,
                renderables,
                &excluded,
                &snapshot,
            )?;
        }
        if let Some(depth) = &prepass_depth.depth {
            let handle = self.register_attachment(&depth.texture, &depth.view, depth.format);
            self.frame
                .globals_mut()
                .set_texture("prowl_DepthTexture", handle);
        }

        // 10. Opaque pass into the multi-attachment forward buffer.
        let forward_desc = self.forward_desc(width, height);
        let forward = self.pool.acquire(&gpu.device, &forward_desc);
        let clear_color = match snapshot.clear_flags {
            ClearFlags::Skybox | ClearFlags::SolidColor => Some(snapshot.clear_color),
            ClearFlags::DepthOnly | ClearFlags::Nothing => None,
        };
        {
            let mut ctx = BindContext {
                device: &gpu.device,
                queue: &gpu.queue,
                heap: &self.heap,
                globals: self.frame.globals(),
                cache: &mut self.cache,
                retire: &mut gpu.retire,
                default_keywords: &gpu.default_keywords,
            };
            passes::opaque::run(
                &mut self.cb,
                &mut ctx,
                &forward,
                &prepass_depth,
                renderables,
                &excluded,
                &snapshot,
                &mut self.history,
                clear_color,
            )?;

            // 11. Skybox, depth-rejected against opaque geometry.
            if snapshot.clear_flags == ClearFlags::Skybox {
                let statics = self.statics.as_mut().unwrap();
                statics
                    .skybox
                    .run(&mut self.cb, &mut ctx, &forward, &snapshot)?;
            }
        }

        // Everything so far executes before any effect submissions.
        self.cb
            .submit(&gpu.device, &gpu.queue, &mut gpu.retire, false)?;

        // 12. Opaque-tier effect chain.
        self.run_effects(gpu, effects, EffectTier::Opaque, &forward, &snapshot);

        // 13. Transparent pass (back-to-front).
        self.cb.begin_recording()?;
        {
            let mut ctx = BindContext {
                device: &gpu.device,
                queue: &gpu.queue,
                heap: &self.heap,
                globals: self.frame.globals(),
                cache: &mut self.cache,
                retire: &mut gpu.retire,
                default_keywords: &gpu.default_keywords,
            };
            passes::transparent::run(
                &mut self.cb,
                &mut ctx,
                &forward,
                renderables,
                &excluded,
                &snapshot,
            )?;
        }
        self.cb
            .submit(&gpu.device, &gpu.queue, &mut gpu.retire, false)?;

        // 14. Final-tier effect chain.
        self.run_effects(gpu, effects, EffectTier::Final, &forward, &snapshot);

        // 15. Blit the forward buffer to the camera target.
        let source_handle = self.register_attachment(
            &forward.color[0].texture,
            &forward.color[0].view,
            forward.color[0].format,
        );
        self.cb.begin_recording()?;
        {
            let statics = self.statics.as_mut().unwrap();
            let mut ctx = BindContext {
                device: &gpu.device,
                queue: &gpu.queue,
                heap: &self.heap,
                globals: self.frame.globals(),
                cache: &mut self.cache,
                retire: &mut gpu.retire,
                default_keywords: &gpu.default_keywords,
            };
            let blit_clear = match snapshot.clear_flags {
                ClearFlags::Nothing | ClearFlags::DepthOnly => None,
                _ => Some(snapshot.clear_color),
            };
            match target {
                RenderTarget::Screen { view, format, .. } => {
                    statics.blit.blit_to_raw(
                        &mut self.cb,
                        &mut ctx,
                        source_handle,
                        view,
                        *format,
                        blit_clear,
                    )?;
                }
                RenderTarget::Texture(texture) => {
                    statics
                        .blit
                        .blit_to_target(&mut self.cb, &mut ctx, source_handle, texture)?;
                }
            }
        }
        self.cb
            .submit(&gpu.device, &gpu.queue, &mut gpu.retire, false)?;

        // 16. Post-render callbacks, then temporary release.
        for effect in effects.iter_mut() {
            effect.on_post_render(&snapshot);
        }

        self.previous_view_projection
            .insert(camera.uuid, snapshot.view_projection);
        self.pool.release(prepass_depth);
        self.pool.release(forward);
        self.pool.end_frame();
        for handle in self.frame_handles.drain(..) {
            if let Some(texture) = self.heap.remove_texture(handle) {
                gpu.retire.dispose(RetiredResource::OwnedTexture(texture));
            }
        }
        self.history.end_frame();
        self.frame.end_frame();
        gpu.retire.collect();
        self.frame_index += 1;
        Ok(())
    }

    /// Releases every cached GPU object this pipeline owns.
    pub fn shutdown(&mut self, gpu: &mut GpuContext) {
        self.cache.shutdown();
        self.pool.trim(0);
        gpu.retire.flush(&gpu.device);
    }

    // ── Stage helpers ────────────────────────────────────────────────────────

    fn forward_desc(&self, width: u32, height: u32) -> RenderTextureDesc {
        // color + motion vectors + view normals + surface data
        let mut color_formats = smallvec::SmallVec::new();
        color_formats.push(self.settings.color_format());
        color_formats.push(wgpu::TextureFormat::Rg16Float);
        color_formats.push(wgpu::TextureFormat::Rgba16Float);
        color_formats.push(wgpu::TextureFormat::Rgba8Unorm);
        RenderTextureDesc {
            width,
            height,
            color_formats,
            depth_format: Some(self.settings.depth_format()),
            sample_count: self.settings.sample_count,
            label: "Forward Buffer",
        }
    }

    fn publish_camera_globals(&mut self, snapshot: &CameraSnapshot) {
        let globals = self.frame.globals_mut();
        globals.set_mat4("prowl_MatV", snapshot.view);
        globals.set_mat4("prowl_MatP", snapshot.projection);
        globals.set_mat4("prowl_MatVP", snapshot.view_projection);
        globals.set_mat4("prowl_MatInvV", snapshot.inverse_view);
        globals.set_mat4("prowl_MatInvP", snapshot.inverse_projection);
        globals.set_mat4("prowl_PrevMatVP", snapshot.previous_view_projection);
        globals.set_vec3("prowl_CameraPosition", snapshot.position);
        globals.set_vec2(
            "prowl_Resolution",
            Vec2::new(snapshot.pixel_width as f32, snapshot.pixel_height as f32),
        );
        globals.set_float("prowl_Time", self.start_time.elapsed().as_secs_f32());
        // Fog: rgb color + density; ambient: rgb + intensity.
        globals.set_vec4("prowl_FogParams", Vec4::new(0.5, 0.6, 0.7, 0.0));
        globals.set_vec4("prowl_AmbientColor", Vec4::new(0.21, 0.22, 0.25, 1.0));
    }

    fn publish_shadow_globals(&mut self) {
        let Some((texture, view)) = self
            .atlas
            .texture()
            .map(|t| (t.texture.clone(), t.view.clone()))
        else {
            return;
        };
        let handle =
            self.register_attachment(&texture, &view, wgpu::TextureFormat::Depth32Float);
        self.frame
            .globals_mut()
            .set_texture("prowl_ShadowAtlas", handle);
    }

    fn upload_lights(&mut self, gpu: &mut GpuContext, gpu_lights: &[GpuLight]) {
        let needed = gpu_lights.len().max(1);
        if self.light_buffer.is_none() || self.light_buffer_capacity < needed {
            if let Some(old) = self.light_buffer.take()
                && let Some(buffer) = self.heap.remove_buffer(old)
            {
                gpu.retire.dispose(RetiredResource::OwnedBuffer(buffer));
            }
            let buffer = GpuBuffer::zeroed(
                &gpu.device,
                (needed * std::mem::size_of::<GpuLight>()) as u64,
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                "Light Buffer",
            );
            self.light_buffer = Some(self.heap.insert_buffer(buffer));
            self.light_buffer_capacity = needed;
        }

        let handle = self.light_buffer.unwrap();
        if !gpu_lights.is_empty()
            && let Some(buffer) = self.heap.buffer(handle)
        {
            gpu.queue
                .write_buffer(&buffer.buffer, 0, bytemuck::cast_slice(gpu_lights));
        }
        let globals = self.frame.globals_mut();
        globals.set_buffer("prowl_Lights", handle, None);
        globals.set_int("prowl_LightCount", gpu_lights.len() as i32);
    }

    /// Registers a render-target attachment in the heap for this frame
    /// so property state can bind it; released at frame end.
    fn register_attachment(
        &mut self,
        texture: &wgpu::Texture,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
    ) -> TextureHandle {
        let handle = self.heap.insert_texture(GpuTexture::from_raw(
            texture.clone(),
            view.clone(),
            self.attachment_sampler.clone(),
            format,
        ));
        self.frame_handles.push(handle);
        handle
    }

    fn run_effects(
        &mut self,
        gpu: &mut GpuContext,
        effects: &mut [&mut dyn ImageEffect],
        tier: EffectTier,
        forward: &RenderTexture,
        snapshot: &CameraSnapshot,
    ) {
        let mut tier_effects: Vec<&mut dyn ImageEffect> = Vec::new();
        for effect in effects.iter_mut() {
            if effect.tier() == tier {
                tier_effects.push(&mut **effect);
            }
        }
        if tier_effects.is_empty() {
            return;
        }

        let statics = self.statics.as_mut().unwrap();
        let heap = &mut self.heap;
        let cache = &mut self.cache;
        let frame = &self.frame;
        let attachment_sampler = &self.attachment_sampler;
        let frame_handles = &mut self.frame_handles;
        let retire = &mut gpu.retire;
        let device = &gpu.device;
        let queue = &gpu.queue;
        let default_keywords = &gpu.default_keywords;

        let mut ctx = EffectContext {
            device,
            queue,
            snapshot,
        };

        let mut blit = |ectx: &mut EffectContext<'_>,
                        source: &RenderTexture,
                        dest: &RenderTexture| {
            let handle = heap.insert_texture(GpuTexture::from_raw(
                source.color[0].texture.clone(),
                source.color[0].view.clone(),
                attachment_sampler.clone(),
                source.color[0].format,
            ));
            frame_handles.push(handle);

            let mut cb = CommandBuffer::new("Effect CopyBack");
            let record = cb.begin_recording().and_then(|()| {
                let mut bctx = BindContext {
                    device: ectx.device,
                    queue: ectx.queue,
                    heap: &*heap,
                    globals: frame.globals(),
                    cache: &mut *cache,
                    retire: &mut *retire,
                    default_keywords,
                };
                statics.blit.blit_to_target(&mut cb, &mut bctx, handle, dest)
            });
            let record =
                record.and_then(|()| cb.submit(ectx.device, ectx.queue, &mut *retire, false));
            if let Err(err) = record {
                log::error!("effect chain copy-back failed: {err}");
            }
        };

        run_effect_chain(
            &mut tier_effects,
            forward,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &mut self.pool,
            &mut ctx,
            &mut blit,
        );
    }
}
