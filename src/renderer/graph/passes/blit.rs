//! Fullscreen Blit
//!
//! Draws a fullscreen triangle sampling a source texture into the bound
//! target. Used for the final present blit, effect-chain copy-back, and
//! anywhere a format-converting copy is needed (texture copies require
//! matching formats; a draw does not).

use std::borrow::Cow;
use std::sync::Arc;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::keyword::KeywordState;
use crate::renderer::resources::TextureHandle;
use crate::renderer::shader::{
    BindingKind, ResourceBinding, ShaderPass, ShaderVariant, VertexSemantic,
};
use crate::resources::mesh::Mesh;
use crate::resources::texture::RenderTexture;

const BLIT_WGSL: &str = r"
@group(0) @binding(0) var blit_texture: texture_2d<f32>;
@group(0) @binding(1) var blit_sampler: sampler;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(position.xy, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(blit_texture, blit_sampler, in.uv);
}
";

/// Name the blit source is bound under.
pub const BLIT_TEXTURE: &str = "prowl_BlitTexture";

pub struct BlitPass {
    pass: Arc<ShaderPass>,
    quad: Mesh,
}

impl BlitPass {
    /// Builds the blit pass; its single variant is registered under the
    /// backend default keywords so ordinary pass resolution finds it.
    #[must_use]
    pub fn new(device: &wgpu::Device, default_keywords: &KeywordState) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(BLIT_WGSL)),
        });

        let mut pass = ShaderPass::new("Blit");
        pass.cull_mode = None;

        let mut variant = ShaderVariant::new(default_keywords.clone(), module);
        variant.vertex_inputs = vec![VertexSemantic::Position, VertexSemantic::TexCoord0];
        variant.bindings = vec![
            ResourceBinding::new(0, BLIT_TEXTURE, BindingKind::TextureReadOnly),
            ResourceBinding::new(1, BLIT_TEXTURE, BindingKind::Sampler),
        ];
        pass.add_variant(variant);

        Self {
            pass: Arc::new(pass),
            quad: Mesh::fullscreen_quad(),
        }
    }

    /// Draws `source` over the primary attachment of `target`.
    pub fn blit_to_target(
        &mut self,
        cb: &mut CommandBuffer,
        ctx: &mut BindContext<'_>,
        source: TextureHandle,
        target: &RenderTexture,
    ) -> Result<()> {
        cb.set_render_target_primary(target, None, None)?;
        self.draw(cb, ctx, source)
    }

    /// Draws `source` into a raw view (the swapchain / camera target).
    pub fn blit_to_raw(
        &mut self,
        cb: &mut CommandBuffer,
        ctx: &mut BindContext<'_>,
        source: TextureHandle,
        view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        clear_color: Option<glam::Vec4>,
    ) -> Result<()> {
        cb.set_raw_target(view, format, clear_color)?;
        self.draw(cb, ctx, source)
    }

    fn draw(
        &mut self,
        cb: &mut CommandBuffer,
        ctx: &mut BindContext<'_>,
        source: TextureHandle,
    ) -> Result<()> {
        cb.set_pass(ctx, &self.pass, None)?;
        cb.properties_mut().clear();
        cb.properties_mut().set_texture(BLIT_TEXTURE, source);
        cb.bind_resources(ctx)?;
        cb.set_draw_data(ctx, &mut self.quad)?;
        cb.draw_indexed(0..3, 0, 0..1)?;
        Ok(())
    }
}
