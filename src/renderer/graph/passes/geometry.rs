//! Shared Geometry Drawing
//!
//! All scene passes (depth pre-pass, opaque, shadow casters,
//! transparents) funnel through [`draw_list`]: filter by pass tag and
//! cull set, optionally sort by camera distance, then draw each
//! renderable through the command buffer.
//!
//! A misbehaving renderable (error or panic inside its callbacks) is
//! logged with context and skipped; the rest of the list still draws.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::history::TransformHistory;
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::renderable::Renderable;
use crate::renderer::shader::{RENDER_ORDER_TAG, ShaderPass};

/// Which of a material's passes a stage draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialPass {
    Primary,
    Depth,
    Shadow,
}

/// Draw order relative to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Front-to-back, to exploit early-Z on opaque geometry.
    FrontToBack,
    /// Back-to-front, required for correct transparent blending.
    BackToFront,
    None,
}

/// Draws every culled-in renderable whose selected pass carries
/// `RenderOrder == tag`. Returns the number of objects drawn.
///
/// With a [`TransformHistory`], each drawn object with a nonzero id gets
/// its model matrix recorded for next frame's motion vectors, and its
/// previous matrix published as a per-draw property.
pub fn draw_list(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    renderables: &mut [&mut dyn Renderable],
    excluded: &FxHashSet<usize>,
    snapshot: &CameraSnapshot,
    // View-projection the pass renders with (camera, or light for
    // shadow-caster passes).
    view_projection: glam::Mat4,
    tag: &str,
    which: MaterialPass,
    order: SortOrder,
    mut history: Option<&mut TransformHistory>,
) -> usize {
    // Selection + distance happen before any drawing so the list can be
    // sorted without holding borrows across draws.
    let mut selection: Vec<(usize, f32)> = renderables
        .iter()
        .enumerate()
        .filter(|(index, renderable)| {
            !excluded.contains(index)
                && material_pass(renderable.material(), which)
                    .is_some_and(|pass| pass.has_tag(RENDER_ORDER_TAG, tag))
        })
        .map(|(index, renderable)| {
            let center = renderable.culling_data().bounds.center();
            (index, center.distance_squared(snapshot.position))
        })
        .collect();

    match order {
        SortOrder::FrontToBack => {
            selection.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        SortOrder::BackToFront => {
            selection.sort_by(|a, b| b.1.total_cmp(&a.1));
        }
        SortOrder::None => {}
    }

    let mut drawn = 0;
    for (index, _) in selection {
        let renderable = &mut *renderables[index];
        let history = history.as_deref_mut();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            draw_one(cb, ctx, renderable, view_projection, which, history)
        }));
        match outcome {
            Ok(Ok(())) => drawn += 1,
            Ok(Err(err)) => {
                log::warn!("renderable #{index} skipped in '{tag}' pass: {err}");
            }
            Err(_) => {
                log::error!("renderable #{index} panicked in '{tag}' pass; skipped");
            }
        }
    }
    drawn
}

fn draw_one(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    renderable: &mut dyn Renderable,
    view_projection: glam::Mat4,
    which: MaterialPass,
    history: Option<&mut TransformHistory>,
) -> Result<()> {
    let object_id = renderable.object_id();
    {
        let material = renderable.material();
        let pass = match which {
            MaterialPass::Primary => Arc::clone(&material.pass),
            MaterialPass::Depth => material.depth_pass.clone().expect("filtered above"),
            MaterialPass::Shadow => material.shadow_pass.clone().expect("filtered above"),
        };
        cb.set_material_pass(ctx, &pass, material)?;
    }

    let data = renderable.rendering_data()?;

    let properties = cb.properties_mut();
    properties.apply_override(data.properties);
    properties.set_mat4("prowl_MatM", data.model_matrix);
    properties.set_mat4("prowl_MatMVP", view_projection * data.model_matrix);
    if let Some(history) = &history {
        let previous = history.previous(object_id).unwrap_or(data.model_matrix);
        properties.set_mat4("prowl_PrevMatM", previous);
    }

    cb.set_topology(data.mesh.topology().as_wgpu());
    cb.bind_resources(ctx)?;
    cb.set_draw_data(ctx, data.mesh)?;

    let gpu = data.mesh.gpu().expect("uploaded by set_draw_data");
    if gpu.index_buffer.is_some() {
        cb.draw_indexed(0..gpu.index_count, 0, 0..1)?;
    } else {
        cb.draw(0..gpu.vertex_count, 0..1)?;
    }

    if let Some(history) = history {
        history.record(object_id, data.model_matrix);
    }
    Ok(())
}

/// The pass a stage draws a material with, when the material carries it.
fn material_pass(
    material: &crate::resources::material::Material,
    which: MaterialPass,
) -> Option<&ShaderPass> {
    match which {
        MaterialPass::Primary => Some(&material.pass),
        MaterialPass::Depth => material.depth_pass.as_deref(),
        MaterialPass::Shadow => material.shadow_pass.as_deref(),
    }
}
