//! Rendering core: GPU context, pipeline caching, property binding,
//! command recording, shadow atlas, and the forward frame graph.

pub mod binding;
pub mod command_buffer;
pub mod context;
pub mod graph;
pub mod keyword;
pub mod pipeline;
pub mod properties;
pub mod renderable;
pub mod resources;
pub mod shader;
pub mod shadow_atlas;

pub use command_buffer::{BindContext, CommandBuffer};
pub use context::{GpuContext, RetireQueue, RetiredResource};
pub use graph::{DefaultRenderPipeline, RenderTarget};
pub use keyword::KeywordState;
pub use pipeline::{PipelineCache, PipelineHandle, PipelineRequest};
pub use properties::{FrameProperties, PropertyState, PropertyValue};
pub use renderable::{CullingData, LayerMask, Renderable, RenderingData};
pub use shader::{BindingKind, PassId, ShaderPass, ShaderVariant, VertexSemantic};
pub use shadow_atlas::ShadowAtlas;
