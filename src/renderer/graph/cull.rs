//! Frustum / Layer Culling
//!
//! Produces the set of renderable indices *excluded* this frame. The
//! renderable list itself is never mutated and the result is recomputed
//! every frame — culling holds no state.

use rustc_hash::FxHashSet;

use crate::renderer::renderable::{LayerMask, Renderable};
use crate::scene::camera::Frustum;

/// Computes the indices of renderables that do **not** draw this frame:
/// not renderable, wrong layer, or outside the frustum (bounding-sphere
/// test, conservative).
#[must_use]
pub fn cull_renderables(
    renderables: &[&mut dyn Renderable],
    frustum: &Frustum,
    mask: LayerMask,
) -> FxHashSet<usize> {
    let mut excluded = FxHashSet::default();
    for (index, renderable) in renderables.iter().enumerate() {
        if !mask.intersects(renderable.layer()) {
            excluded.insert(index);
            continue;
        }
        let data = renderable.culling_data();
        if !data.is_renderable {
            excluded.insert(index);
            continue;
        }
        if !frustum.intersects_sphere(data.bounds.center(), data.bounds.radius()) {
            excluded.insert(index);
        }
    }
    excluded
}
