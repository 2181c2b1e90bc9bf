//! Camera, Frustum, and Culling Tests
//!
//! Tests for:
//! - Frustum plane extraction and sphere intersection
//! - Camera snapshot immutability against later camera mutation
//! - Frustum + layer-mask culling of renderables

use std::sync::Arc;

use glam::{Affine3A, Mat4, Vec3};

use prowl::errors::Result;
use prowl::renderer::graph::cull::cull_renderables;
use prowl::renderer::graph::view::CameraSnapshot;
use prowl::renderer::renderable::{CullingData, LayerMask, Renderable, RenderingData};
use prowl::renderer::shader::ShaderPass;
use prowl::resources::material::Material;
use prowl::resources::mesh::{BoundingBox, Mesh};
use prowl::scene::camera::Camera;

// ============================================================================
// Frustum
// ============================================================================

fn default_camera() -> Camera {
    // Looking down -Z from the origin.
    let mut camera = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);
    camera.update_view(&Affine3A::IDENTITY);
    camera
}

#[test]
fn frustum_contains_point_in_front() {
    let camera = default_camera();
    assert!(camera.frustum().contains_point(Vec3::new(0.0, 0.0, -10.0)));
}

#[test]
fn frustum_rejects_point_behind() {
    let camera = default_camera();
    assert!(!camera.frustum().contains_point(Vec3::new(0.0, 0.0, 10.0)));
}

#[test]
fn frustum_rejects_point_beyond_far() {
    let camera = default_camera();
    assert!(!camera.frustum().contains_point(Vec3::new(0.0, 0.0, -200.0)));
}

#[test]
fn sphere_straddling_plane_intersects() {
    let camera = default_camera();
    // Center behind the near plane but radius reaching through it.
    assert!(camera.frustum().intersects_sphere(Vec3::new(0.0, 0.0, 0.0), 1.0));
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn snapshot_survives_camera_mutation() {
    let mut camera = default_camera();
    let snapshot = CameraSnapshot::capture(&camera, 1920, 1080, Mat4::IDENTITY);
    let captured_vp = snapshot.view_projection;

    // Mutate the live camera mid-frame.
    camera.update_view(&Affine3A::from_translation(Vec3::new(50.0, 0.0, 0.0)));
    camera.fov = 0.5;
    camera.update_projection_matrix();

    assert_eq!(snapshot.view_projection, captured_vp);
    assert_ne!(camera.view_projection_matrix(), captured_vp);
}

#[test]
fn snapshot_records_previous_view_projection() {
    let camera = default_camera();
    let previous = Mat4::from_translation(Vec3::X);
    let snapshot = CameraSnapshot::capture(&camera, 100, 100, previous);
    assert_eq!(snapshot.previous_view_projection, previous);
}

// ============================================================================
// Culling
// ============================================================================

struct TestRenderable {
    material: Material,
    mesh: Mesh,
    center: Vec3,
    layer: LayerMask,
    renderable: bool,
}

impl TestRenderable {
    fn at(center: Vec3) -> Self {
        Self {
            material: Material::new("Test", Arc::new(ShaderPass::new("Opaque"))),
            mesh: Mesh::new("Test"),
            center,
            layer: LayerMask::DEFAULT,
            renderable: true,
        }
    }
}

impl Renderable for TestRenderable {
    fn material(&self) -> &Material {
        &self.material
    }

    fn rendering_data(&mut self) -> Result<RenderingData<'_>> {
        Ok(RenderingData {
            properties: &self.material.properties,
            mesh: &mut self.mesh,
            model_matrix: Mat4::from_translation(self.center),
        })
    }

    fn culling_data(&self) -> CullingData {
        CullingData {
            is_renderable: self.renderable,
            bounds: BoundingBox {
                min: self.center - Vec3::splat(0.5),
                max: self.center + Vec3::splat(0.5),
            },
        }
    }

    fn layer(&self) -> LayerMask {
        self.layer
    }
}

#[test]
fn culling_excludes_out_of_frustum_and_wrong_layers() {
    let camera = default_camera();

    let mut visible = TestRenderable::at(Vec3::new(0.0, 0.0, -10.0));
    let mut behind = TestRenderable::at(Vec3::new(0.0, 0.0, 50.0));
    let mut wrong_layer = TestRenderable::at(Vec3::new(0.0, 0.0, -10.0));
    wrong_layer.layer = LayerMask::layer(5);
    let mut hidden = TestRenderable::at(Vec3::new(0.0, 0.0, -10.0));
    hidden.renderable = false;

    let list: Vec<&mut dyn Renderable> =
        vec![&mut visible, &mut behind, &mut wrong_layer, &mut hidden];

    let excluded = cull_renderables(&list, &camera.frustum(), LayerMask::DEFAULT);

    assert!(!excluded.contains(&0), "in-frustum object must survive");
    assert!(excluded.contains(&1), "object behind camera must be culled");
    assert!(excluded.contains(&2), "masked layer must be culled");
    assert!(excluded.contains(&3), "non-renderable must be culled");
}

#[test]
fn culling_never_mutates_and_is_repeatable() {
    let camera = default_camera();
    let mut object = TestRenderable::at(Vec3::new(0.0, 0.0, -5.0));
    let list: Vec<&mut dyn Renderable> = vec![&mut object];

    let first = cull_renderables(&list, &camera.frustum(), LayerMask::everything());
    let second = cull_renderables(&list, &camera.frustum(), LayerMask::everything());
    assert_eq!(first, second);
}
