//! Frame graph passes, one file per stage.

pub mod blit;
pub mod geometry;
pub mod opaque;
pub mod prepass;
pub mod shadow;
pub mod skybox;
pub mod transparent;
