//! Transparent Pass
//!
//! Draws transparent-tagged renderables over the forward buffer's
//! primary attachment, loading color and depth from the earlier passes.
//!
//! Renderables are sorted back-to-front by squared camera distance —
//! with no order-independent transparency path, draw order is the only
//! thing keeping blending correct.

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::passes::geometry::{self, MaterialPass, SortOrder};
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::renderable::Renderable;
use crate::resources::texture::RenderTexture;

pub const TRANSPARENT_TAG: &str = "Transparent";

pub fn run(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    forward: &RenderTexture,
    renderables: &mut [&mut dyn Renderable],
    excluded: &FxHashSet<usize>,
    snapshot: &CameraSnapshot,
) -> Result<usize> {
    cb.set_render_target_primary(forward, None, None)?;

    let drawn = geometry::draw_list(
        cb,
        ctx,
        renderables,
        excluded,
        snapshot,
        snapshot.view_projection,
        TRANSPARENT_TAG,
        MaterialPass::Primary,
        SortOrder::BackToFront,
        None,
    );
    Ok(drawn)
}
