//! Camera Snapshot
//!
//! An immutable capture of every camera-derived value the frame needs,
//! taken once at the start of rendering a camera. Later mutation of the
//! live [`Camera`] (scripts, animation callbacks) cannot desynchronize
//! the frame in flight.

use glam::{Mat4, Vec3, Vec4};

use crate::renderer::renderable::LayerMask;
use crate::scene::camera::{Camera, ClearFlags, Frustum};

/// Per-frame immutable camera state.
#[derive(Debug, Clone)]
pub struct CameraSnapshot {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub inverse_view: Mat4,
    pub inverse_projection: Mat4,
    /// Last frame's view-projection, for motion vectors.
    pub previous_view_projection: Mat4,
    pub frustum: Frustum,
    pub position: Vec3,
    pub near: f32,
    pub far: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub clear_flags: ClearFlags,
    pub clear_color: Vec4,
    pub culling_mask: LayerMask,
}

impl CameraSnapshot {
    /// Captures `camera` for a `width × height` pixel target.
    #[must_use]
    pub fn capture(
        camera: &Camera,
        width: u32,
        height: u32,
        previous_view_projection: Mat4,
    ) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            view_projection: camera.view_projection_matrix(),
            inverse_view: camera.view_matrix().inverse(),
            inverse_projection: camera.projection_matrix().inverse(),
            previous_view_projection,
            frustum: camera.frustum(),
            position: camera.position(),
            near: camera.near,
            far: camera.far,
            pixel_width: width.max(1),
            pixel_height: height.max(1),
            clear_flags: camera.clear_flags,
            clear_color: camera.clear_color,
            culling_mask: camera.culling_mask,
        }
    }

    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height as f32
    }
}
