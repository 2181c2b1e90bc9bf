//! Opaque Pass
//!
//! Binds the multi-attachment forward buffer (color + motion vectors +
//! normals + surface data), seeds its depth from the pre-pass copy so
//! the GPU early-rejects occluded opaque fragments, and draws every
//! opaque-tagged renderable front-to-back.
//!
//! Each drawn object with a nonzero id has its model matrix recorded in
//! the transform history for next frame's motion vectors.

use glam::Vec4;
use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::history::TransformHistory;
use crate::renderer::graph::passes::geometry::{self, MaterialPass, SortOrder};
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::renderable::Renderable;
use crate::resources::texture::RenderTexture;

pub const OPAQUE_TAG: &str = "Opaque";

pub fn run(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    forward: &RenderTexture,
    prepass_depth: &RenderTexture,
    renderables: &mut [&mut dyn Renderable],
    excluded: &FxHashSet<usize>,
    snapshot: &CameraSnapshot,
    history: &mut TransformHistory,
    clear_color: Option<Vec4>,
) -> Result<usize> {
    // Seed the forward depth from the pre-pass before the pass begins;
    // the pass then loads depth instead of clearing it.
    if let (Some(src), Some(dst)) = (&prepass_depth.depth, &forward.depth) {
        cb.copy_texture(
            &src.texture,
            &dst.texture,
            wgpu::Extent3d {
                width: forward.width,
                height: forward.height,
                depth_or_array_layers: 1,
            },
        )?;
    }

    cb.set_render_target(forward, clear_color, None)?;

    let drawn = geometry::draw_list(
        cb,
        ctx,
        renderables,
        excluded,
        snapshot,
        snapshot.view_projection,
        OPAQUE_TAG,
        MaterialPass::Primary,
        SortOrder::FrontToBack,
        Some(history),
    );
    Ok(drawn)
}
