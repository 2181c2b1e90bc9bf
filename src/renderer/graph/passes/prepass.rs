//! Depth Pre-Pass
//!
//! Renders depth for every culled-in renderable carrying a depth-only
//! pass. The resulting depth texture is copied into the forward buffer
//! (so the opaque pass early-rejects occluded fragments) and published
//! as a global for depth-sampling effects.

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::passes::geometry::{self, MaterialPass, SortOrder};
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::renderable::Renderable;
use crate::resources::texture::RenderTexture;

pub const DEPTH_ONLY_TAG: &str = "DepthOnly";

/// Clears and fills `depth_target`'s depth attachment.
pub fn run(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    depth_target: &RenderTexture,
    renderables: &mut [&mut dyn Renderable],
    excluded: &FxHashSet<usize>,
    snapshot: &CameraSnapshot,
) -> Result<usize> {
    let depth = depth_target
        .depth
        .as_ref()
        .expect("depth pre-pass target must carry a depth attachment");
    cb.set_depth_target(&depth.view, depth.format, Some(1.0))?;

    let drawn = geometry::draw_list(
        cb,
        ctx,
        renderables,
        excluded,
        snapshot,
        snapshot.view_projection,
        DEPTH_ONLY_TAG,
        MaterialPass::Depth,
        SortOrder::FrontToBack,
        None,
    );
    Ok(drawn)
}
