//! Camera and Frustum
//!
//! The live, mutable camera object. The render pipeline never reads it
//! mid-frame — it takes an immutable snapshot
//! ([`crate::renderer::graph::view::CameraSnapshot`]) at frame start so
//! later mutation cannot desynchronize the in-flight frame.

use std::borrow::Cow;

use glam::{Affine3A, Mat4, Vec3, Vec4};
use uuid::Uuid;

use crate::renderer::renderable::LayerMask;

/// What the camera clears its target to before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearFlags {
    /// Clear color+depth, then draw the skybox behind opaque geometry.
    Skybox,
    /// Clear to a solid color.
    SolidColor,
    /// Clear depth only, keep previous color.
    DepthOnly,
    /// No clearing at all.
    Nothing,
}

#[derive(Debug, Clone, Copy)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,

    pub projection_type: ProjectionType,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_size: f32,

    pub clear_flags: ClearFlags,
    pub clear_color: Vec4,
    /// Layers this camera renders; used for mask-based culling.
    pub culling_mask: LayerMask,

    // Cached matrices; renderer reads only.
    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
    pub(crate) frustum: Frustum,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed("Camera"),
            projection_type: ProjectionType::Perspective,
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,
            clear_flags: ClearFlags::Skybox,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            culling_mask: LayerMask::everything(),
            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                // glam's perspective_rh targets the WGPU/Vulkan 0..1 depth range.
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    /// Updates the cached view matrices from a new world transform.
    pub fn update_view(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.world_matrix.translation)
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        self.frustum
    }
}

/// View frustum as six inward-facing planes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb-Hartmann plane extraction from a view-projection matrix
    /// (0..1 clip depth convention).
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[0] = rows[3] + rows[0]; // left
        planes[1] = rows[3] - rows[0]; // right
        planes[2] = rows[3] + rows[1]; // bottom
        planes[3] = rows[3] - rows[1]; // top
        planes[4] = rows[2]; // near (z >= 0)
        planes[5] = rows[3] - rows[2]; // far

        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            if length > 0.0 {
                *plane /= length;
            }
        }
        Self { planes }
    }

    /// Conservative sphere-frustum intersection.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.intersects_sphere(point, 0.0)
    }
}
