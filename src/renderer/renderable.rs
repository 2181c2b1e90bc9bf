//! Renderable Contract
//!
//! The interface drawable objects expose to the render pipeline. How
//! renderables are stored and discovered belongs to the scene graph;
//! the pipeline only iterates slices of `&mut dyn Renderable` it is
//! handed each frame.

use glam::Mat4;

use crate::errors::Result;
use crate::renderer::properties::PropertyState;
use crate::resources::mesh::{BoundingBox, Mesh};
use crate::resources::material::Material;

bitflags::bitflags! {
    /// Scene layer bitmask used for camera culling.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        const DEFAULT = 1;
    }
}

impl LayerMask {
    /// Mask containing only layer `index` (0-based, max 31).
    #[must_use]
    pub fn layer(index: u32) -> Self {
        Self::from_bits_retain(1 << index)
    }

    /// Mask matching every layer, including unnamed ones.
    #[must_use]
    pub fn everything() -> Self {
        Self::from_bits_retain(u32::MAX)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-draw data a renderable hands the pipeline.
pub struct RenderingData<'a> {
    /// Per-draw property overrides layered over the material's.
    pub properties: &'a PropertyState,
    /// Mesh to draw; mutable because drawing triggers the lazy upload.
    pub mesh: &'a mut Mesh,
    pub model_matrix: Mat4,
}

/// Cheap visibility data used by culling.
#[derive(Debug, Clone, Copy)]
pub struct CullingData {
    pub is_renderable: bool,
    /// World-space bounds.
    pub bounds: BoundingBox,
}

/// A drawable object.
pub trait Renderable {
    /// Material (shader pass + baked properties) to draw with.
    fn material(&self) -> &Material;

    /// Per-draw data; errors are logged per object and skip the draw,
    /// never the frame.
    fn rendering_data(&mut self) -> Result<RenderingData<'_>>;

    /// Visibility data for frustum/layer culling.
    fn culling_data(&self) -> CullingData;

    /// Layer this object lives on.
    fn layer(&self) -> LayerMask {
        LayerMask::DEFAULT
    }

    /// Stable nonzero id enables motion-vector history tracking;
    /// return 0 to opt out.
    fn object_id(&self) -> u64 {
        0
    }
}
