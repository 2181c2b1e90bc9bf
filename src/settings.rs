//! Renderer Settings
//!
//! Tunables for the forward pipeline: shadow atlas dimensions, shadow
//! distance policy, motion-vector history cleanup, and target formats.
//!
//! All values have working defaults; applications usually override only
//! the shadow budget.
//!
//! ```rust
//! use prowl::settings::RenderSettings;
//!
//! let settings = RenderSettings {
//!     shadow_atlas_size: 8192,
//!     max_shadow_size: 2048,
//!     ..Default::default()
//! };
//! assert_eq!(settings.shadow_tile_size, 32);
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for the default render pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Side length of the square shadow atlas texture, in pixels.
    /// Must be a multiple of [`Self::shadow_tile_size`].
    pub shadow_atlas_size: u32,

    /// Side length of one atlas tile, in pixels.
    pub shadow_tile_size: u32,

    /// Upper bound for a single light's shadow map resolution, in pixels.
    pub max_shadow_size: u32,

    /// Camera distance at which non-directional shadow resolution bottoms
    /// out at one tile.
    pub shadow_distance: f32,

    /// Maximum number of spot lights that receive shadow tiles per frame.
    pub max_spot_shadows: usize,

    /// Frames between sweeps of the motion-vector transform history.
    pub history_cleanup_interval: u64,

    /// MSAA sample count for the forward buffer.
    pub sample_count: u32,

    /// Render the forward buffer in HDR (`Rgba16Float`) instead of LDR.
    pub hdr: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadow_atlas_size: 4096,
            shadow_tile_size: 32,
            max_shadow_size: 1024,
            shadow_distance: 100.0,
            max_spot_shadows: 8,
            history_cleanup_interval: 120,
            sample_count: 1,
            hdr: true,
        }
    }
}

impl RenderSettings {
    /// Format of the forward color buffer.
    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        if self.hdr {
            wgpu::TextureFormat::Rgba16Float
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
    }

    /// Format used for depth attachments throughout the pipeline.
    #[inline]
    #[must_use]
    pub fn depth_format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Depth32Float
    }
}
