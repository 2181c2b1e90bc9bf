//! Shader Passes and Variants
//!
//! A [`ShaderPass`] is one named stage of a shader asset: it owns raster
//! state (cull, blend, depth), string-keyed tags used by the frame graph
//! to select which renderables draw where (`RenderOrder=Opaque` and
//! friends), and a set of compiled [`ShaderVariant`]s keyed by
//! [`KeywordState`] hash.
//!
//! Variants arrive precompiled from the asset pipeline; the render core
//! never generates shader source. Each variant carries the reflection
//! data the binding layer needs: ordered vertex input semantics, ordered
//! resource-set declarations, and uniform block member layouts.
//!
//! Requesting a keyword combination that was never registered is a hard
//! error ([`ProwlError::VariantNotFound`]) — the core does not silently
//! substitute a different variant.

use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::errors::{ProwlError, Result};
use crate::renderer::keyword::KeywordState;
use crate::utils::interner::{self, Symbol};

/// Tag key selecting the frame-graph stage a pass draws in.
pub const RENDER_ORDER_TAG: &str = "RenderOrder";

static NEXT_PASS_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of a [`ShaderPass`].
///
/// Pipeline cache keys use this instead of pass contents: two passes with
/// identical state are still distinct cache entries, matching the
/// by-identity semantics of pass ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(u32);

impl PassId {
    #[inline]
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

// ─── Vertex Inputs ────────────────────────────────────────────────────────────

/// Vertex input semantics a variant may declare, in the fixed channel
/// order meshes lay their data out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    TexCoord0,
    TexCoord1,
    Normal,
    Color,
    Tangent,
    BoneIndices,
    BoneWeights,
}

impl VertexSemantic {
    /// Vertex format this semantic is uploaded as.
    #[must_use]
    pub fn format(self) -> wgpu::VertexFormat {
        match self {
            Self::Position | Self::Normal | Self::Tangent => wgpu::VertexFormat::Float32x3,
            Self::TexCoord0 | Self::TexCoord1 => wgpu::VertexFormat::Float32x2,
            Self::Color | Self::BoneIndices | Self::BoneWeights => wgpu::VertexFormat::Float32x4,
        }
    }

    /// Byte size of one element.
    #[must_use]
    pub fn size(self) -> u64 {
        match self.format() {
            wgpu::VertexFormat::Float32x2 => 8,
            wgpu::VertexFormat::Float32x3 => 12,
            _ => 16,
        }
    }
}

// ─── Resource Declarations ────────────────────────────────────────────────────

/// Kind of a declared shader resource binding.
///
/// This enum is part of the shader asset wire contract and must stay
/// stable for existing assets to keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    TextureReadOnly,
    TextureReadWrite,
    StructuredBufferReadOnly,
    StructuredBufferReadWrite,
    Sampler,
}

/// One declared binding slot of a variant's resource set.
#[derive(Debug, Clone)]
pub struct ResourceBinding {
    /// Binding index within the resource set, fixed by declaration order.
    pub binding: u32,
    /// Interned resource name, matched against property state entries.
    pub name: Symbol,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
    /// View dimension for texture bindings (ignored otherwise).
    pub dimension: wgpu::TextureViewDimension,
    /// Storage texel format, required when `kind` is `TextureReadWrite`.
    pub storage_format: Option<wgpu::TextureFormat>,
}

impl ResourceBinding {
    /// Convenience constructor covering the common 2D sampled cases.
    #[must_use]
    pub fn new(binding: u32, name: &str, kind: BindingKind) -> Self {
        Self {
            binding,
            name: interner::intern(name),
            kind,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            dimension: wgpu::TextureViewDimension::D2,
            storage_format: None,
        }
    }

    /// Translates the declared kind into a bind group layout entry.
    #[must_use]
    pub fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        let ty = match self.kind {
            BindingKind::UniformBuffer => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::TextureReadOnly => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: self.dimension,
                multisampled: false,
            },
            BindingKind::TextureReadWrite => wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::ReadWrite,
                format: self
                    .storage_format
                    .unwrap_or(wgpu::TextureFormat::Rgba16Float),
                view_dimension: self.dimension,
            },
            BindingKind::StructuredBufferReadOnly => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::StructuredBufferReadWrite => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Sampler => {
                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
            }
        };

        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty,
            count: None,
        }
    }
}

// ─── Uniform Reflection ───────────────────────────────────────────────────────

/// Element kind of a reflected uniform block member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Array of column-major mat4 with std140 stride (64 bytes).
    Mat4Array { count: u32 },
}

impl UniformKind {
    /// Total byte size of the member in the uniform block.
    #[must_use]
    pub fn byte_size(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
            Self::Mat4Array { count } => 64 * count,
        }
    }
}

/// One reflected member of a uniform block.
#[derive(Debug, Clone)]
pub struct UniformMember {
    pub name: Symbol,
    /// Byte offset within the block.
    pub offset: u32,
    pub kind: UniformKind,
}

impl UniformMember {
    #[must_use]
    pub fn new(name: &str, offset: u32, kind: UniformKind) -> Self {
        Self {
            name: interner::intern(name),
            offset,
            kind,
        }
    }
}

/// Reflected layout of one uniform buffer binding.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub name: Symbol,
    /// Binding slot this block occupies in the resource set.
    pub binding: u32,
    /// Total block size in bytes (16-byte aligned by the reflector).
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformBlock {
    #[must_use]
    pub fn new(name: &str, binding: u32, size: u32, members: Vec<UniformMember>) -> Self {
        Self {
            name: interner::intern(name),
            binding,
            size,
            members,
        }
    }
}

// ─── Variants ─────────────────────────────────────────────────────────────────

/// A compiled instantiation of a pass for one specific keyword state.
#[derive(Debug)]
pub struct ShaderVariant {
    pub keywords: KeywordState,
    /// Compiled module holding both stage entry points.
    pub module: wgpu::ShaderModule,
    pub vertex_entry: String,
    /// `None` for depth-only variants without a fragment stage.
    pub fragment_entry: Option<String>,
    /// Declared vertex inputs, in declaration order (shader locations
    /// are assigned by index).
    pub vertex_inputs: Vec<VertexSemantic>,
    /// Declared resource bindings, in declaration order.
    pub bindings: Vec<ResourceBinding>,
    /// Reflected uniform blocks, one per `UniformBuffer` binding.
    pub uniform_blocks: Vec<UniformBlock>,
}

impl ShaderVariant {
    #[must_use]
    pub fn new(keywords: KeywordState, module: wgpu::ShaderModule) -> Self {
        Self {
            keywords,
            module,
            vertex_entry: "vs_main".to_string(),
            fragment_entry: Some("fs_main".to_string()),
            vertex_inputs: Vec::new(),
            bindings: Vec::new(),
            uniform_blocks: Vec::new(),
        }
    }

    /// Looks up the reflected block bound at `binding`.
    #[must_use]
    pub fn uniform_block(&self, binding: u32) -> Option<&UniformBlock> {
        self.uniform_blocks.iter().find(|b| b.binding == binding)
    }
}

// ─── Depth State ──────────────────────────────────────────────────────────────

/// Depth test configuration of a pass.
#[derive(Debug, Clone, Copy)]
pub struct DepthState {
    pub write_enabled: bool,
    pub compare: wgpu::CompareFunction,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            write_enabled: true,
            compare: wgpu::CompareFunction::LessEqual,
        }
    }
}

// ─── Shader Pass ──────────────────────────────────────────────────────────────

/// One stage of a shader asset, owning its raster state and variants.
#[derive(Debug)]
pub struct ShaderPass {
    id: PassId,
    pub name: String,
    tags: FxHashMap<Symbol, Symbol>,
    pub cull_mode: Option<wgpu::Face>,
    pub blend: Option<wgpu::BlendState>,
    pub depth: DepthState,
    variants: FxHashMap<u64, ShaderVariant>,
}

impl ShaderPass {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: PassId(NEXT_PASS_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            tags: FxHashMap::default(),
            cull_mode: Some(wgpu::Face::Back),
            blend: None,
            depth: DepthState::default(),
            variants: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PassId {
        self.id
    }

    /// Sets a string-keyed tag (e.g. `RenderOrder=Opaque`).
    pub fn set_tag(&mut self, key: &str, value: &str) {
        self.tags
            .insert(interner::intern(key), interner::intern(value));
    }

    /// Looks up a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        let sym = interner::get(key)?;
        self.tags.get(&sym).map(|&v| interner::resolve(v))
    }

    /// Checks a tag against an expected value.
    #[must_use]
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }

    /// Registers a compiled variant under its keyword state.
    ///
    /// Re-registering the same keyword set replaces the old variant.
    pub fn add_variant(&mut self, variant: ShaderVariant) {
        self.variants
            .insert(variant.keywords.variant_hash(), variant);
    }

    /// Resolves the variant for a keyword state.
    ///
    /// # Errors
    ///
    /// [`ProwlError::VariantNotFound`] when the combination was never
    /// registered; the caller gets no substitute.
    pub fn variant(&self, keywords: &KeywordState) -> Result<&ShaderVariant> {
        let hash = keywords.variant_hash();
        self.variants
            .get(&hash)
            .ok_or_else(|| ProwlError::VariantNotFound {
                pass: self.name.clone(),
                keywords: hash,
            })
    }

    /// Non-erroring variant lookup.
    #[must_use]
    pub fn try_variant(&self, keywords: &KeywordState) -> Option<&ShaderVariant> {
        self.variants.get(&keywords.variant_hash())
    }

    /// Number of registered variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}
