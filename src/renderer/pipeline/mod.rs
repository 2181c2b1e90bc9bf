//! Pipeline state caching.
//!
//! [`key`] defines the hashable identity of a pipeline;
//! [`cache`] owns the GPU objects and deduplicates creation.

pub mod cache;
pub mod key;

pub use cache::{PipelineCache, PipelineHandle, PipelineRequest, RenderPipelineId, ResourceLayoutId};
pub use key::{BlendComponentKey, BlendStateKey, GraphicsPipelineKey, OutputFormatKey, fx_hash_key};
