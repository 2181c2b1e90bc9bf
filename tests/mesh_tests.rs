//! Mesh Tests
//!
//! Tests for:
//! - Binary serialization round-trips (exact float equality — the
//!   stream applies no lossy compression)
//! - Topology index-count validation
//! - Channel length validation
//! - Planar channel layout offsets in the fixed channel order
//! - Normal recomputation (area-weighted)

use glam::{Mat4, Vec2, Vec3, Vec4};

use prowl::resources::mesh::{Mesh, MeshIndexFormat, MeshTopology};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

fn quad_mesh() -> Mesh {
    let mut mesh = Mesh::new("Quad");
    mesh.set_vertices(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ]);
    mesh.set_normals(Some(vec![Vec3::Z; 4]));
    mesh.set_uv0(Some(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ]));
    mesh.set_indices(Some(vec![0, 1, 2, 0, 2, 3]));
    mesh.recalculate_bounds();
    mesh
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn round_trip_reproduces_arrays_exactly() {
    let mesh = quad_mesh();

    let mut stream = Vec::new();
    mesh.serialize(&mut stream).unwrap();
    let restored = Mesh::deserialize(&mut stream.as_slice()).unwrap();

    assert_eq!(restored.index_format(), mesh.index_format());
    assert_eq!(restored.topology(), mesh.topology());
    assert_eq!(restored.vertices(), mesh.vertices());
    assert_eq!(restored.normals(), mesh.normals());
    assert_eq!(restored.uv0(), mesh.uv0());
    assert_eq!(restored.indices(), mesh.indices());
    assert_eq!(restored.tangents(), None);
    assert_eq!(restored.colors(), None);
}

#[test]
fn round_trip_preserves_all_optional_channels() {
    let mut mesh = quad_mesh();
    mesh.set_index_format(MeshIndexFormat::U32);
    mesh.set_tangents(Some(vec![Vec3::X; 4]));
    mesh.set_colors(Some(vec![Vec4::new(0.25, 0.5, 0.75, 1.0); 4]));
    mesh.set_colors32(Some(vec![[255, 128, 64, 32]; 4]));
    mesh.set_uv1(Some(vec![Vec2::splat(0.5); 4]));
    mesh.set_bone_indices(Some(vec![Vec4::new(0.0, 1.0, 2.0, 3.0); 4]));
    mesh.set_bone_weights(Some(vec![Vec4::new(0.4, 0.3, 0.2, 0.1); 4]));
    mesh.set_bind_poses(Some(vec![
        Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
        Mat4::from_scale(Vec3::splat(2.0)),
    ]));

    let mut stream = Vec::new();
    mesh.serialize(&mut stream).unwrap();
    let restored = Mesh::deserialize(&mut stream.as_slice()).unwrap();

    assert_eq!(restored.index_format(), MeshIndexFormat::U32);
    assert_eq!(restored.tangents(), mesh.tangents());
    assert_eq!(restored.colors(), mesh.colors());
    assert_eq!(restored.colors32(), mesh.colors32());
    assert_eq!(restored.uv1(), mesh.uv1());
    assert_eq!(restored.bone_indices(), mesh.bone_indices());
    assert_eq!(restored.bone_weights(), mesh.bone_weights());
    assert_eq!(restored.bind_poses(), mesh.bind_poses());
}

#[test]
fn deserialize_rejects_truncated_streams() {
    let mesh = quad_mesh();
    let mut stream = Vec::new();
    mesh.serialize(&mut stream).unwrap();

    stream.truncate(stream.len() / 2);
    assert!(Mesh::deserialize(&mut stream.as_slice()).is_err());
}

#[test]
fn deserialize_rejects_unknown_header_bytes() {
    assert!(Mesh::deserialize(&mut [9_u8, 0].as_slice()).is_err());
    assert!(Mesh::deserialize(&mut [0_u8, 9].as_slice()).is_err());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn triangle_list_with_seven_indices_fails() {
    let mut mesh = quad_mesh();
    mesh.set_indices(Some(vec![0, 1, 2, 0, 2, 3, 1]));
    assert!(mesh.validate().is_err());
}

#[test]
fn topology_constraints() {
    let mut mesh = quad_mesh();

    mesh.set_topology(MeshTopology::LineList);
    mesh.set_indices(Some(vec![0, 1, 2]));
    assert!(mesh.validate().is_err(), "line list needs index pairs");

    mesh.set_indices(Some(vec![0, 1, 2, 3]));
    assert!(mesh.validate().is_ok());

    mesh.set_topology(MeshTopology::LineStrip);
    mesh.set_indices(Some(vec![0]));
    assert!(mesh.validate().is_err(), "line strip needs at least two");

    mesh.set_topology(MeshTopology::TriangleStrip);
    mesh.set_indices(Some(vec![0, 1]));
    assert!(mesh.validate().is_err(), "strip needs at least three");

    mesh.set_topology(MeshTopology::PointList);
    mesh.set_indices(Some(vec![0]));
    assert!(mesh.validate().is_ok());
}

#[test]
fn channel_length_mismatch_fails() {
    let mut mesh = quad_mesh();
    mesh.set_normals(Some(vec![Vec3::Z; 3])); // 4 vertices, 3 normals
    assert!(mesh.validate().is_err());
}

#[test]
fn empty_mesh_fails() {
    let mesh = Mesh::new("Empty");
    assert!(mesh.validate().is_err());
}

#[test]
fn u16_format_rejects_wide_indices() {
    let mut mesh = quad_mesh();
    mesh.set_index_format(MeshIndexFormat::U16);
    mesh.set_indices(Some(vec![0, 1, 70000, 0, 2, 3]));
    assert!(mesh.validate().is_err());
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn layout_offsets_follow_fixed_channel_order() {
    let mesh = quad_mesh(); // positions + normals + uv0
    let layout = mesh.vertex_layout();
    let n = 4_u64;

    // positions at 0, then UV0, then normals (UV1/colors absent).
    assert_eq!(layout.uv0_offset, Some(n * 12));
    assert_eq!(layout.uv1_offset, None);
    assert_eq!(layout.normal_offset, Some(n * 12 + n * 8));
    assert_eq!(layout.color_offset, None);
    assert_eq!(layout.total_size, n * 12 + n * 8 + n * 12);
}

#[test]
fn layout_reacts_to_present_channels() {
    let mut mesh = quad_mesh();
    mesh.set_colors(Some(vec![Vec4::ONE; 4]));
    mesh.set_tangents(Some(vec![Vec3::X; 4]));
    let layout = mesh.vertex_layout();
    let n = 4_u64;

    let uv0 = n * 12;
    let normals = uv0 + n * 8;
    let colors = normals + n * 12;
    let tangents = colors + n * 16;
    assert_eq!(layout.color_offset, Some(colors));
    assert_eq!(layout.tangent_offset, Some(tangents));
    assert_eq!(layout.total_size, tangents + n * 12);
}

// ============================================================================
// Derived Data
// ============================================================================

#[test]
fn recalculated_normals_face_outward() {
    let mut mesh = quad_mesh();
    mesh.set_normals(None);
    mesh.recalculate_normals();

    let normals = mesh.normals().unwrap();
    assert_eq!(normals.len(), 4);
    for normal in normals {
        assert!(vec3_approx(*normal, Vec3::Z));
    }
}

#[test]
fn bounds_fit_vertices() {
    let mesh = quad_mesh();
    let bounds = mesh.bounds();
    assert!(vec3_approx(bounds.min, Vec3::ZERO));
    assert!(vec3_approx(bounds.max, Vec3::new(1.0, 1.0, 0.0)));
    assert!(vec3_approx(bounds.center(), Vec3::new(0.5, 0.5, 0.0)));
}
