//! Skybox Pass
//!
//! Draws a procedural gradient sky on an inward-facing dome.
//! Deliberately rendered *after* opaque geometry: with depth testing
//! against the pre-filled depth buffer, covered sky fragments are
//! rejected before shading. Purely an optimization — drawing it first
//! would look identical.

use std::borrow::Cow;
use std::sync::Arc;

use glam::Mat4;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::keyword::KeywordState;
use crate::renderer::shader::{
    BindingKind, DepthState, ResourceBinding, ShaderPass, ShaderVariant, UniformBlock,
    UniformKind, UniformMember, VertexSemantic,
};
use crate::resources::mesh::Mesh;
use crate::resources::texture::RenderTexture;

const SKYBOX_WGSL: &str = r"
struct SkyUniforms {
    view_projection: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> sky: SkyUniforms;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    var out: VsOut;
    var clip = sky.view_projection * vec4<f32>(position, 1.0);
    // Pin the dome to the far plane so opaque depth always wins.
    out.position = vec4<f32>(clip.x, clip.y, clip.w, clip.w);
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let up = normalize(in.direction).y * 0.5 + 0.5;
    let horizon = vec3<f32>(0.82, 0.86, 0.91);
    let zenith = vec3<f32>(0.22, 0.42, 0.78);
    return vec4<f32>(mix(horizon, zenith, up), 1.0);
}
";

pub struct SkyboxPass {
    pass: Arc<ShaderPass>,
    dome: Mesh,
}

impl SkyboxPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, default_keywords: &KeywordState) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SKYBOX_WGSL)),
        });

        let mut pass = ShaderPass::new("Skybox");
        // Camera sits inside the dome.
        pass.cull_mode = Some(wgpu::Face::Front);
        pass.depth = DepthState {
            write_enabled: false,
            compare: wgpu::CompareFunction::LessEqual,
        };

        let mut variant = ShaderVariant::new(default_keywords.clone(), module);
        variant.vertex_inputs = vec![VertexSemantic::Position];
        variant.bindings = vec![ResourceBinding::new(0, "Sky", BindingKind::UniformBuffer)];
        variant.uniform_blocks = vec![UniformBlock::new(
            "Sky",
            0,
            64,
            vec![UniformMember::new("prowl_SkyVP", 0, UniformKind::Mat4)],
        )];
        pass.add_variant(variant);

        Self {
            pass: Arc::new(pass),
            dome: Mesh::sphere(1.0, 24, 12),
        }
    }

    /// Draws the sky into the forward buffer's primary attachment.
    pub fn run(
        &mut self,
        cb: &mut CommandBuffer,
        ctx: &mut BindContext<'_>,
        forward: &RenderTexture,
        snapshot: &CameraSnapshot,
    ) -> Result<()> {
        cb.set_render_target_primary(forward, None, None)?;
        cb.set_pass(ctx, &self.pass, None)?;

        // View rotation without translation keeps the dome camera-centered.
        let rotation_only = Mat4::from_mat3(glam::Mat3::from_mat4(snapshot.view));
        let sky_vp = snapshot.projection * rotation_only;

        cb.properties_mut().clear();
        cb.properties_mut().set_mat4("prowl_SkyVP", sky_vp);
        cb.bind_resources(ctx)?;
        cb.set_draw_data(ctx, &mut self.dome)?;

        let index_count = self.dome.gpu().map_or(0, |gpu| gpu.index_count);
        cb.draw_indexed(0..index_count, 0, 0..1)?;
        Ok(())
    }
}
