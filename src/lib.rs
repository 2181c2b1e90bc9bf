#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod settings;
pub mod utils;

pub use errors::{ProwlError, Result};
pub use renderer::{
    CommandBuffer, DefaultRenderPipeline, GpuContext, KeywordState, LayerMask, PipelineCache,
    PropertyState, Renderable, RenderTarget, ShadowAtlas,
};
pub use resources::{Material, Mesh, RenderTexture};
pub use scene::{Camera, Light};
pub use settings::RenderSettings;
pub use utils::interner;
