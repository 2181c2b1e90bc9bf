//! Mesh Resource
//!
//! CPU-side vertex/index storage with lazy GPU upload. A mesh keeps its
//! channels as plain arrays (positions required, everything else
//! optional), tracks a `changed` flag, and only touches the GPU when a
//! dirty mesh is first drawn.
//!
//! # Buffer layout
//!
//! All channels share one vertex buffer as contiguous planar regions in
//! a fixed channel order — positions, then UV0, UV1, normals, colors,
//! tangents, bone indices, bone weights. [`VertexLayout`] records the
//! byte offset of each present region so draw code can bind per-semantic
//! buffer slices.
//!
//! # Serialization
//!
//! [`Mesh::serialize`] / [`Mesh::deserialize`] implement the engine's
//! binary mesh stream: 1 byte index format, 1 byte topology, then
//! length-prefixed arrays in a fixed order, little-endian throughout.
//! Indices are written as `u32` regardless of index format. The order
//! and element widths are a compatibility contract with existing
//! serialized assets.

use std::io::{Read, Write};

use glam::{Mat4, Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::errors::{ProwlError, Result};
use crate::renderer::shader::VertexSemantic;

// ─── Bounding Volume ──────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl BoundingBox {
    /// Smallest box containing every point. Zero box for empty input.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere around [`Self::center`].
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transforms the box corners and re-fits an axis-aligned box.
    #[must_use]
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let transformed: Vec<Vec3> = corners
            .iter()
            .map(|&c| matrix.transform_point3(c))
            .collect();
        Self::from_points(&transformed)
    }
}

// ─── Formats / Topology ───────────────────────────────────────────────────────

/// GPU index width. The serialized stream always stores `u32` values;
/// this only selects the upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshIndexFormat {
    U16 = 0,
    U32 = 1,
}

impl MeshIndexFormat {
    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Self::U16),
            1 => Ok(Self::U32),
            _ => Err(ProwlError::MeshDecodeFailed(format!(
                "unknown index format byte {b}"
            ))),
        }
    }

    #[must_use]
    pub fn as_wgpu(self) -> wgpu::IndexFormat {
        match self {
            Self::U16 => wgpu::IndexFormat::Uint16,
            Self::U32 => wgpu::IndexFormat::Uint32,
        }
    }
}

/// Primitive topology of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshTopology {
    TriangleList = 0,
    TriangleStrip = 1,
    LineList = 2,
    LineStrip = 3,
    PointList = 4,
}

impl MeshTopology {
    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Self::TriangleList),
            1 => Ok(Self::TriangleStrip),
            2 => Ok(Self::LineList),
            3 => Ok(Self::LineStrip),
            4 => Ok(Self::PointList),
            _ => Err(ProwlError::MeshDecodeFailed(format!(
                "unknown topology byte {b}"
            ))),
        }
    }

    #[must_use]
    pub fn as_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Self::LineList => wgpu::PrimitiveTopology::LineList,
            Self::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Self::PointList => wgpu::PrimitiveTopology::PointList,
        }
    }

    /// Validates an element count against this topology's constraints.
    fn validate_count(self, count: usize) -> Result<()> {
        let ok = match self {
            Self::TriangleList => count % 3 == 0,
            Self::TriangleStrip => count >= 3,
            Self::LineList => count % 2 == 0,
            Self::LineStrip => count >= 2,
            Self::PointList => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ProwlError::InvalidMesh(format!(
                "element count {count} invalid for {self:?}"
            )))
        }
    }
}

// ─── Vertex Layout ────────────────────────────────────────────────────────────

/// Byte offsets of each channel's planar region within the vertex
/// buffer, recomputed from which optional channels are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub vertex_count: u64,
    pub uv0_offset: Option<u64>,
    pub uv1_offset: Option<u64>,
    pub normal_offset: Option<u64>,
    pub color_offset: Option<u64>,
    pub tangent_offset: Option<u64>,
    pub bone_index_offset: Option<u64>,
    pub bone_weight_offset: Option<u64>,
    pub total_size: u64,
}

impl VertexLayout {
    /// Region offset for a semantic; positions are always at 0.
    #[must_use]
    pub fn offset(&self, semantic: VertexSemantic) -> Option<u64> {
        match semantic {
            VertexSemantic::Position => Some(0),
            VertexSemantic::TexCoord0 => self.uv0_offset,
            VertexSemantic::TexCoord1 => self.uv1_offset,
            VertexSemantic::Normal => self.normal_offset,
            VertexSemantic::Color => self.color_offset,
            VertexSemantic::Tangent => self.tangent_offset,
            VertexSemantic::BoneIndices => self.bone_index_offset,
            VertexSemantic::BoneWeights => self.bone_weight_offset,
        }
    }
}

/// GPU buffers of an uploaded mesh.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub index_format: wgpu::IndexFormat,
    pub index_count: u32,
    pub vertex_count: u32,
    pub layout: VertexLayout,
}

// ─── Mesh ─────────────────────────────────────────────────────────────────────

/// CPU mesh data with lazy GPU upload.
#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    topology: MeshTopology,
    index_format: MeshIndexFormat,

    vertices: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    tangents: Option<Vec<Vec3>>,
    colors: Option<Vec<Vec4>>,
    colors32: Option<Vec<[u8; 4]>>,
    uv0: Option<Vec<Vec2>>,
    uv1: Option<Vec<Vec2>>,
    indices: Option<Vec<u32>>,
    bone_indices: Option<Vec<Vec4>>,
    bone_weights: Option<Vec<Vec4>>,
    bind_poses: Option<Vec<Mat4>>,

    bounds: BoundingBox,
    changed: bool,
    gpu: Option<GpuMesh>,
}

impl Default for MeshTopology {
    fn default() -> Self {
        Self::TriangleList
    }
}

impl Default for MeshIndexFormat {
    fn default() -> Self {
        Self::U16
    }
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            changed: true,
            ..Default::default()
        }
    }

    // ── Channel setters (all mark the mesh dirty) ────────────────────────────

    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
        self.changed = true;
    }

    pub fn set_normals(&mut self, normals: Option<Vec<Vec3>>) {
        self.normals = normals;
        self.changed = true;
    }

    pub fn set_tangents(&mut self, tangents: Option<Vec<Vec3>>) {
        self.tangents = tangents;
        self.changed = true;
    }

    pub fn set_colors(&mut self, colors: Option<Vec<Vec4>>) {
        self.colors = colors;
        self.changed = true;
    }

    pub fn set_colors32(&mut self, colors: Option<Vec<[u8; 4]>>) {
        self.colors32 = colors;
        self.changed = true;
    }

    pub fn set_uv0(&mut self, uv: Option<Vec<Vec2>>) {
        self.uv0 = uv;
        self.changed = true;
    }

    pub fn set_uv1(&mut self, uv: Option<Vec<Vec2>>) {
        self.uv1 = uv;
        self.changed = true;
    }

    pub fn set_indices(&mut self, indices: Option<Vec<u32>>) {
        self.indices = indices;
        self.changed = true;
    }

    pub fn set_bone_indices(&mut self, v: Option<Vec<Vec4>>) {
        self.bone_indices = v;
        self.changed = true;
    }

    pub fn set_bone_weights(&mut self, v: Option<Vec<Vec4>>) {
        self.bone_weights = v;
        self.changed = true;
    }

    pub fn set_bind_poses(&mut self, v: Option<Vec<Mat4>>) {
        self.bind_poses = v;
        self.changed = true;
    }

    pub fn set_topology(&mut self, topology: MeshTopology) {
        self.topology = topology;
        self.changed = true;
    }

    pub fn set_index_format(&mut self, format: MeshIndexFormat) {
        self.index_format = format;
        self.changed = true;
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    #[must_use]
    pub fn tangents(&self) -> Option<&[Vec3]> {
        self.tangents.as_deref()
    }

    #[must_use]
    pub fn colors(&self) -> Option<&[Vec4]> {
        self.colors.as_deref()
    }

    #[must_use]
    pub fn colors32(&self) -> Option<&[[u8; 4]]> {
        self.colors32.as_deref()
    }

    #[must_use]
    pub fn uv0(&self) -> Option<&[Vec2]> {
        self.uv0.as_deref()
    }

    #[must_use]
    pub fn uv1(&self) -> Option<&[Vec2]> {
        self.uv1.as_deref()
    }

    #[must_use]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[must_use]
    pub fn bone_indices(&self) -> Option<&[Vec4]> {
        self.bone_indices.as_deref()
    }

    #[must_use]
    pub fn bone_weights(&self) -> Option<&[Vec4]> {
        self.bone_weights.as_deref()
    }

    #[must_use]
    pub fn bind_poses(&self) -> Option<&[Mat4]> {
        self.bind_poses.as_deref()
    }

    #[must_use]
    pub fn topology(&self) -> MeshTopology {
        self.topology
    }

    #[must_use]
    pub fn index_format(&self) -> MeshIndexFormat {
        self.index_format
    }

    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.changed
    }

    #[must_use]
    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }

    // ── Derived data ─────────────────────────────────────────────────────────

    /// Refits the bounding box to the current vertices.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = BoundingBox::from_points(&self.vertices);
    }

    /// Rebuilds per-vertex normals by area-weighted triangle accumulation.
    ///
    /// Only meaningful for `TriangleList` meshes; no-op otherwise.
    pub fn recalculate_normals(&mut self) {
        if self.topology != MeshTopology::TriangleList {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        let owned_indices;
        let indices: &[u32] = match &self.indices {
            Some(idx) => idx,
            None => {
                owned_indices = (0..self.vertices.len() as u32).collect::<Vec<_>>();
                &owned_indices
            }
        };

        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let edge1 = self.vertices[b] - self.vertices[a];
            let edge2 = self.vertices[c] - self.vertices[a];
            // Unnormalized cross product weights by triangle area.
            let face = edge1.cross(edge2);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = Some(normals);
        self.changed = true;
    }

    /// Rebuilds tangents from UV0 and normals (Lengyel's method).
    ///
    /// Requires normals and UV0; no-op when either is missing or the
    /// topology is not `TriangleList`.
    pub fn recalculate_tangents(&mut self) {
        let (Some(normals), Some(uv0)) = (&self.normals, &self.uv0) else {
            return;
        };
        if self.topology != MeshTopology::TriangleList {
            return;
        }

        let mut tangents = vec![Vec3::ZERO; self.vertices.len()];
        let owned_indices;
        let indices: &[u32] = match &self.indices {
            Some(idx) => idx,
            None => {
                owned_indices = (0..self.vertices.len() as u32).collect::<Vec<_>>();
                &owned_indices
            }
        };

        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let edge1 = self.vertices[b] - self.vertices[a];
            let edge2 = self.vertices[c] - self.vertices[a];
            let duv1 = uv0[b] - uv0[a];
            let duv2 = uv0[c] - uv0[a];

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < 1e-8 {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
            tangents[a] += tangent;
            tangents[b] += tangent;
            tangents[c] += tangent;
        }

        for (tangent, normal) in tangents.iter_mut().zip(normals) {
            // Gram-Schmidt orthogonalize against the vertex normal.
            *tangent = (*tangent - *normal * normal.dot(*tangent)).normalize_or_zero();
        }
        self.tangents = Some(tangents);
        self.changed = true;
    }

    // ── Layout / Validation ──────────────────────────────────────────────────

    /// Computes channel region offsets for the present channels, in the
    /// fixed channel order.
    #[must_use]
    pub fn vertex_layout(&self) -> VertexLayout {
        let n = self.vertices.len() as u64;
        let mut layout = VertexLayout {
            vertex_count: n,
            ..Default::default()
        };

        let mut cursor = n * 12; // positions
        let mut region = |present: bool, stride: u64| -> Option<u64> {
            if present {
                let offset = cursor;
                cursor += n * stride;
                Some(offset)
            } else {
                None
            }
        };

        layout.uv0_offset = region(self.uv0.is_some(), 8);
        layout.uv1_offset = region(self.uv1.is_some(), 8);
        layout.normal_offset = region(self.normals.is_some(), 12);
        layout.color_offset = region(self.colors.is_some() || self.colors32.is_some(), 16);
        layout.tangent_offset = region(self.tangents.is_some(), 12);
        layout.bone_index_offset = region(self.bone_indices.is_some(), 16);
        layout.bone_weight_offset = region(self.bone_weights.is_some(), 16);
        layout.total_size = cursor;
        layout
    }

    /// Structural validation run before every upload.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(ProwlError::InvalidMesh("mesh has no vertices".into()));
        }
        let n = self.vertices.len();

        fn check_len<T>(channel: Option<&[T]>, n: usize, name: &str) -> Result<()> {
            match channel {
                Some(data) if data.len() != n => Err(ProwlError::InvalidMesh(format!(
                    "{name} length {} does not match vertex count {n}",
                    data.len()
                ))),
                _ => Ok(()),
            }
        }
        check_len(self.normals.as_deref(), n, "normals")?;
        check_len(self.tangents.as_deref(), n, "tangents")?;
        check_len(self.colors.as_deref(), n, "colors")?;
        check_len(self.colors32.as_deref(), n, "colors32")?;
        check_len(self.uv0.as_deref(), n, "uv0")?;
        check_len(self.uv1.as_deref(), n, "uv1")?;
        check_len(self.bone_indices.as_deref(), n, "bone indices")?;
        check_len(self.bone_weights.as_deref(), n, "bone weights")?;

        let element_count = self.indices.as_ref().map_or(n, Vec::len);
        self.topology.validate_count(element_count)?;

        if self.index_format == MeshIndexFormat::U16
            && let Some(indices) = &self.indices
            && indices.iter().any(|&i| i > u32::from(u16::MAX))
        {
            return Err(ProwlError::InvalidMesh(
                "index exceeds u16 range for U16 index format".into(),
            ));
        }
        Ok(())
    }

    // ── Upload ───────────────────────────────────────────────────────────────

    /// Uploads dirty CPU data to the GPU. No-op when the mesh is clean
    /// and already uploaded.
    pub fn upload(&mut self, device: &wgpu::Device) -> Result<()> {
        if !self.changed && self.gpu.is_some() {
            return Ok(());
        }
        self.validate()?;

        let layout = self.vertex_layout();
        let mut blob = vec![0_u8; layout.total_size as usize];

        let write_region = |blob: &mut [u8], offset: u64, bytes: &[u8]| {
            let start = offset as usize;
            blob[start..start + bytes.len()].copy_from_slice(bytes);
        };

        write_region(&mut blob, 0, bytemuck::cast_slice(&self.vertices));
        if let (Some(offset), Some(uv)) = (layout.uv0_offset, &self.uv0) {
            write_region(&mut blob, offset, bytemuck::cast_slice(uv));
        }
        if let (Some(offset), Some(uv)) = (layout.uv1_offset, &self.uv1) {
            write_region(&mut blob, offset, bytemuck::cast_slice(uv));
        }
        if let (Some(offset), Some(normals)) = (layout.normal_offset, &self.normals) {
            write_region(&mut blob, offset, bytemuck::cast_slice(normals));
        }
        if let Some(offset) = layout.color_offset {
            // colors32 is normalized to float RGBA at upload so the
            // shader-visible format is uniform across meshes.
            if let Some(colors) = &self.colors {
                write_region(&mut blob, offset, bytemuck::cast_slice(colors));
            } else if let Some(colors32) = &self.colors32 {
                let expanded: Vec<Vec4> = colors32
                    .iter()
                    .map(|c| {
                        Vec4::new(
                            f32::from(c[0]) / 255.0,
                            f32::from(c[1]) / 255.0,
                            f32::from(c[2]) / 255.0,
                            f32::from(c[3]) / 255.0,
                        )
                    })
                    .collect();
                write_region(&mut blob, offset, bytemuck::cast_slice(&expanded));
            }
        }
        if let (Some(offset), Some(tangents)) = (layout.tangent_offset, &self.tangents) {
            write_region(&mut blob, offset, bytemuck::cast_slice(tangents));
        }
        if let (Some(offset), Some(bones)) = (layout.bone_index_offset, &self.bone_indices) {
            write_region(&mut blob, offset, bytemuck::cast_slice(bones));
        }
        if let (Some(offset), Some(weights)) = (layout.bone_weight_offset, &self.bone_weights) {
            write_region(&mut blob, offset, bytemuck::cast_slice(weights));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&self.name),
            contents: &blob,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let (index_buffer, index_count) = match &self.indices {
            Some(indices) => {
                let bytes = match self.index_format {
                    MeshIndexFormat::U32 => bytemuck::cast_slice(indices).to_vec(),
                    MeshIndexFormat::U16 => {
                        let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
                        let mut b = bytemuck::cast_slice(&narrow).to_vec();
                        // wgpu requires 4-byte aligned buffer sizes.
                        if b.len() % 4 != 0 {
                            b.extend_from_slice(&[0, 0]);
                        }
                        b
                    }
                };
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&self.name),
                    contents: &bytes,
                    usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                });
                (Some(buffer), indices.len() as u32)
            }
            None => (None, 0),
        };

        self.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_format: self.index_format.as_wgpu(),
            index_count,
            vertex_count: self.vertices.len() as u32,
            layout,
        });
        self.changed = false;
        Ok(())
    }

    // ── Serialization ────────────────────────────────────────────────────────

    /// Writes the binary mesh stream.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&[self.index_format as u8, self.topology as u8])?;

        write_vec3_array(w, Some(&self.vertices))?;
        write_vec3_array(w, self.normals.as_deref())?;
        write_vec3_array(w, self.tangents.as_deref())?;
        write_vec4_array(w, self.colors.as_deref())?;
        write_color32_array(w, self.colors32.as_deref())?;
        write_vec2_array(w, self.uv0.as_deref())?;
        write_vec2_array(w, self.uv1.as_deref())?;
        write_u32_array(w, self.indices.as_deref())?;
        write_vec4_array(w, self.bone_indices.as_deref())?;
        write_vec4_array(w, self.bone_weights.as_deref())?;
        write_mat4_array(w, self.bind_poses.as_deref())?;
        Ok(())
    }

    /// Reads the binary mesh stream back. The result is dirty and will
    /// upload on first draw.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let mut header = [0_u8; 2];
        r.read_exact(&mut header)
            .map_err(|e| ProwlError::MeshDecodeFailed(e.to_string()))?;

        let mut mesh = Mesh::new("Mesh");
        mesh.index_format = MeshIndexFormat::from_byte(header[0])?;
        mesh.topology = MeshTopology::from_byte(header[1])?;

        mesh.vertices = read_vec3_array(r)?.unwrap_or_default();
        mesh.normals = read_vec3_array(r)?;
        mesh.tangents = read_vec3_array(r)?;
        mesh.colors = read_vec4_array(r)?;
        mesh.colors32 = read_color32_array(r)?;
        mesh.uv0 = read_vec2_array(r)?;
        mesh.uv1 = read_vec2_array(r)?;
        mesh.indices = read_u32_array(r)?;
        mesh.bone_indices = read_vec4_array(r)?;
        mesh.bone_weights = read_vec4_array(r)?;
        mesh.bind_poses = read_mat4_array(r)?;

        mesh.recalculate_bounds();
        mesh.changed = true;
        Ok(mesh)
    }

    // ── Primitives ───────────────────────────────────────────────────────────

    /// Fullscreen quad in clip space, used by blit and post passes.
    #[must_use]
    pub fn fullscreen_quad() -> Self {
        let mut mesh = Mesh::new("Fullscreen Quad");
        mesh.set_vertices(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(3.0, -1.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.0),
        ]);
        mesh.set_uv0(Some(vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(0.0, -1.0),
        ]));
        mesh.set_indices(Some(vec![0, 1, 2]));
        mesh.recalculate_bounds();
        mesh
    }

    /// UV sphere centered at the origin, used for the sky dome.
    #[must_use]
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let phi = v * std::f32::consts::PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let theta = u * std::f32::consts::TAU;
                let dir = Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(dir * radius);
                normals.push(dir);
                uvs.push(Vec2::new(u, v));
            }
        }

        let mut indices = Vec::new();
        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
            }
        }

        let mut mesh = Mesh::new("Sphere");
        mesh.set_index_format(MeshIndexFormat::U32);
        mesh.set_vertices(vertices);
        mesh.set_normals(Some(normals));
        mesh.set_uv0(Some(uvs));
        mesh.set_indices(Some(indices));
        mesh.recalculate_bounds();
        mesh
    }
}

// ─── Stream Helpers ───────────────────────────────────────────────────────────

fn write_len<W: Write>(w: &mut W, len: usize) -> Result<()> {
    w.write_all(&(len as u32).to_le_bytes())?;
    Ok(())
}

fn read_len<R: Read>(r: &mut R) -> Result<usize> {
    let mut b = [0_u8; 4];
    r.read_exact(&mut b)
        .map_err(|e| ProwlError::MeshDecodeFailed(e.to_string()))?;
    Ok(u32::from_le_bytes(b) as usize)
}

fn write_f32s<W: Write>(w: &mut W, values: &[f32]) -> Result<()> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    let mut b = [0_u8; 4];
    r.read_exact(&mut b)
        .map_err(|e| ProwlError::MeshDecodeFailed(e.to_string()))?;
    Ok(f32::from_le_bytes(b))
}

fn write_vec2_array<W: Write>(w: &mut W, data: Option<&[Vec2]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for v in data {
        write_f32s(w, &[v.x, v.y])?;
    }
    Ok(())
}

fn read_vec2_array<R: Read>(r: &mut R) -> Result<Option<Vec<Vec2>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(Vec2::new(read_f32(r)?, read_f32(r)?));
    }
    Ok(Some(out))
}

fn write_vec3_array<W: Write>(w: &mut W, data: Option<&[Vec3]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for v in data {
        write_f32s(w, &[v.x, v.y, v.z])?;
    }
    Ok(())
}

fn read_vec3_array<R: Read>(r: &mut R) -> Result<Option<Vec<Vec3>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(Vec3::new(read_f32(r)?, read_f32(r)?, read_f32(r)?));
    }
    Ok(Some(out))
}

fn write_vec4_array<W: Write>(w: &mut W, data: Option<&[Vec4]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for v in data {
        write_f32s(w, &[v.x, v.y, v.z, v.w])?;
    }
    Ok(())
}

fn read_vec4_array<R: Read>(r: &mut R) -> Result<Option<Vec<Vec4>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(Vec4::new(
            read_f32(r)?,
            read_f32(r)?,
            read_f32(r)?,
            read_f32(r)?,
        ));
    }
    Ok(Some(out))
}

fn write_color32_array<W: Write>(w: &mut W, data: Option<&[[u8; 4]]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for c in data {
        w.write_all(c)?;
    }
    Ok(())
}

fn read_color32_array<R: Read>(r: &mut R) -> Result<Option<Vec<[u8; 4]>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let mut c = [0_u8; 4];
        r.read_exact(&mut c)
            .map_err(|e| ProwlError::MeshDecodeFailed(e.to_string()))?;
        out.push(c);
    }
    Ok(Some(out))
}

fn write_u32_array<W: Write>(w: &mut W, data: Option<&[u32]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for v in data {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_u32_array<R: Read>(r: &mut R) -> Result<Option<Vec<u32>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let mut b = [0_u8; 4];
        r.read_exact(&mut b)
            .map_err(|e| ProwlError::MeshDecodeFailed(e.to_string()))?;
        out.push(u32::from_le_bytes(b));
    }
    Ok(Some(out))
}

/// Bind poses are stored row-major in the stream; glam matrices are
/// column-major, so rows are transposed on the way through.
fn write_mat4_array<W: Write>(w: &mut W, data: Option<&[Mat4]>) -> Result<()> {
    let data = data.unwrap_or_default();
    write_len(w, data.len())?;
    for m in data {
        for row in 0..4 {
            let r = m.row(row);
            write_f32s(w, &[r.x, r.y, r.z, r.w])?;
        }
    }
    Ok(())
}

fn read_mat4_array<R: Read>(r: &mut R) -> Result<Option<Vec<Mat4>>> {
    let len = read_len(r)?;
    if len == 0 {
        return Ok(None);
    }
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let mut rows = [0_f32; 16];
        for v in &mut rows {
            *v = read_f32(r)?;
        }
        let mut cols = [0_f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                cols[col * 4 + row] = rows[row * 4 + col];
            }
        }
        out.push(Mat4::from_cols_array(&cols));
    }
    Ok(Some(out))
}
