//! Lights
//!
//! The light contract the render pipeline consumes: type tag, transform,
//! shadow configuration, and the GPU-visible upload struct carrying the
//! shadow atlas placement (or the "no shadow" sentinel).

use glam::{Mat4, Vec3, Vec4};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Shadow settings for one light.
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    /// Explicit map resolution; authoritative for directional lights,
    /// an upper bound for the rest.
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
            map_size: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// World-space extent covered by the shadow projection.
    pub shadow_extent: f32,
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub range: f32,
    /// Inner cone angle in radians.
    pub inner_cone: f32,
    /// Outer cone angle in radians.
    pub outer_cone: f32,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    /// Stable integer id used by the shadow atlas tile grid.
    pub id: u64,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub position: Vec3,
    /// Normalized world-space direction (directional/spot).
    pub direction: Vec3,

    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
}

impl Light {
    fn generate_id(uuid: &Uuid) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        uuid.hash(&mut hasher);
        hasher.finish()
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            id: Self::generate_id(&uuid),
            uuid,
            color,
            intensity,
            kind: LightKind::Directional(DirectionalLight {
                shadow_extent: 50.0,
            }),
            position: Vec3::ZERO,
            direction: direction.normalize_or_zero(),
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, position: Vec3, range: f32) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            id: Self::generate_id(&uuid),
            uuid,
            color,
            intensity,
            kind: LightKind::Point(PointLight { range }),
            position,
            direction: Vec3::NEG_Y,
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        position: Vec3,
        direction: Vec3,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            id: Self::generate_id(&uuid),
            uuid,
            color,
            intensity,
            kind: LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
            position,
            direction: direction.normalize_or_zero(),
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional(_))
    }

    /// Whether this light can receive atlas space at all.
    #[must_use]
    pub fn wants_shadows(&self) -> bool {
        // Point light shadows need a cube atlas layout; not part of this
        // pipeline, so only directional and spot lights qualify.
        self.cast_shadows && !matches!(self.kind, LightKind::Point(_))
    }

    /// View-projection matrix used to render this light's shadow map.
    ///
    /// Directional lights project orthographically around `focus`
    /// (usually the camera position); spot lights use a perspective
    /// projection along their cone.
    #[must_use]
    pub fn shadow_view_projection(&self, focus: Vec3) -> Mat4 {
        match &self.kind {
            LightKind::Directional(dir) => {
                let extent = dir.shadow_extent;
                let eye = focus - self.direction * extent;
                let up = if self.direction.y.abs() > 0.99 {
                    Vec3::Z
                } else {
                    Vec3::Y
                };
                let view = Mat4::look_at_rh(eye, focus, up);
                let proj =
                    Mat4::orthographic_rh(-extent, extent, -extent, extent, 0.1, extent * 2.0);
                proj * view
            }
            LightKind::Spot(spot) => {
                let up = if self.direction.y.abs() > 0.99 {
                    Vec3::Z
                } else {
                    Vec3::Y
                };
                let view = Mat4::look_at_rh(self.position, self.position + self.direction, up);
                let proj =
                    Mat4::perspective_rh(spot.outer_cone * 2.0, 1.0, 0.05, spot.range.max(0.1));
                proj * view
            }
            LightKind::Point(point) => {
                // Placeholder projection; point lights never reserve atlas
                // tiles (see `wants_shadows`).
                Mat4::perspective_rh(
                    std::f32::consts::FRAC_PI_2,
                    1.0,
                    0.05,
                    point.range.max(0.1),
                )
            }
        }
    }

    /// Builds the GPU-visible record for the light buffer.
    ///
    /// `atlas_placement` is `(x, y, size)` in atlas pixels, or `None`
    /// when the light got no tiles this frame — encoded as the
    /// `(-1, -1, 0)` sentinel the shaders test against.
    /// `shadow_matrix` is the view-projection the shadow map was
    /// rendered with (see [`Light::shadow_view_projection`]).
    #[must_use]
    pub fn upload_to_gpu(
        &self,
        atlas_placement: Option<(u32, u32, u32)>,
        shadow_matrix: Mat4,
    ) -> GpuLight {
        let (kind_tag, range, inner, outer) = match &self.kind {
            LightKind::Directional(_) => (0.0, 0.0, 0.0, 0.0),
            LightKind::Point(p) => (1.0, p.range, 0.0, 0.0),
            LightKind::Spot(s) => (2.0, s.range, s.inner_cone.cos(), s.outer_cone.cos()),
        };
        let (shadow_x, shadow_y, shadow_size) = match atlas_placement {
            Some((x, y, size)) => (x as f32, y as f32, size as f32),
            None => (-1.0, -1.0, 0.0),
        };

        GpuLight {
            position_kind: Vec4::new(self.position.x, self.position.y, self.position.z, kind_tag)
                .to_array(),
            direction_range: Vec4::new(
                self.direction.x,
                self.direction.y,
                self.direction.z,
                range,
            )
            .to_array(),
            color_intensity: Vec4::new(self.color.x, self.color.y, self.color.z, self.intensity)
                .to_array(),
            cone_bias: [inner, outer, self.shadow.bias, self.shadow.normal_bias],
            shadow_rect: [shadow_x, shadow_y, shadow_size, 0.0],
            shadow_matrix: shadow_matrix.to_cols_array_2d(),
        }
    }
}

/// One light's record in the GPU light buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// xyz = position, w = kind tag (0 directional, 1 point, 2 spot).
    pub position_kind: [f32; 4],
    /// xyz = direction, w = range.
    pub direction_range: [f32; 4],
    /// xyz = linear color, w = intensity.
    pub color_intensity: [f32; 4],
    /// x = cos(inner), y = cos(outer), z = depth bias, w = normal bias.
    pub cone_bias: [f32; 4],
    /// xy = atlas offset in pixels, z = map size; `(-1, -1, 0)` means no
    /// shadow this frame.
    pub shadow_rect: [f32; 4],
    pub shadow_matrix: [[f32; 4]; 4],
}
