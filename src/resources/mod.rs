//! CPU-side resources: meshes, materials, render targets.

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::Material;
pub use mesh::{BoundingBox, Mesh, MeshIndexFormat, MeshTopology, VertexLayout};
pub use texture::{RenderTargetPool, RenderTexture, RenderTextureDesc};
