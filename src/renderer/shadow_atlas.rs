//! Shadow Atlas
//!
//! A single large depth texture subdivided into a grid of reservable
//! tiles, packing every shadow-casting light's map into one atlas. The
//! allocator is a greedy first-fit scan over the tile grid: reservations
//! are all-or-nothing rectangular blocks marked with the owning light id.
//!
//! Tile exhaustion is a *soft* failure — [`ShadowAtlas::reserve_tiles`]
//! returns `None` and the light simply renders without a shadow this
//! frame.
//!
//! # Resolution policy
//!
//! Non-directional lights get a resolution proportional to camera
//! proximity: linear between one tile at `max_distance` and
//! `max_shadow_size` at distance zero, rounded down to a tile multiple.
//! Directional lights use their explicitly configured map size.

use crate::settings::RenderSettings;

/// Grid allocator over a fixed-size square shadow atlas texture.
pub struct ShadowAtlas {
    size: u32,
    tile_size: u32,
    tile_count: u32,
    max_shadow_size: u32,
    /// Row-major `tile_count × tile_count` grid of owning light ids.
    grid: Vec<Option<u64>>,
    free_tiles: u32,
    texture: Option<AtlasTexture>,
}

/// GPU side of the atlas, created once per device.
pub struct AtlasTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl ShadowAtlas {
    /// Creates the allocator for a `size × size` pixel atlas with
    /// `tile_size` pixel tiles. `size` must be a tile multiple.
    #[must_use]
    pub fn new(size: u32, tile_size: u32, max_shadow_size: u32) -> Self {
        assert!(tile_size > 0 && size % tile_size == 0, "atlas size must be a tile multiple");
        let tile_count = size / tile_size;
        Self {
            size,
            tile_size,
            tile_count,
            max_shadow_size: max_shadow_size.min(size),
            grid: vec![None; (tile_count * tile_count) as usize],
            free_tiles: tile_count * tile_count,
            texture: None,
        }
    }

    /// Convenience constructor from settings.
    #[must_use]
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(
            settings.shadow_atlas_size,
            settings.shadow_tile_size,
            settings.max_shadow_size,
        )
    }

    /// Creates the backing depth texture. Idempotent.
    pub fn create_texture(&mut self, device: &wgpu::Device) {
        if self.texture.is_some() {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Atlas"),
            size: wgpu::Extent3d {
                width: self.size,
                height: self.size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.texture = Some(AtlasTexture { texture, view });
    }

    #[must_use]
    pub fn texture(&self) -> Option<&AtlasTexture> {
        self.texture.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of currently unreserved tiles.
    #[inline]
    #[must_use]
    pub fn free_tile_count(&self) -> u32 {
        self.free_tiles
    }

    // ── Reservation ──────────────────────────────────────────────────────────

    /// Reserves a `width × height` pixel block for `light_id`.
    ///
    /// Dimensions are rounded down to tile multiples (minimum one tile).
    /// The grid is scanned row-major for the first position where the
    /// whole block is free; on success every covered tile is marked and
    /// the pixel offset of the block's top-left corner is returned.
    ///
    /// Returns `None` when no fitting block exists. The grid is never
    /// partially modified: a failed reservation leaves it untouched.
    pub fn reserve_tiles(&mut self, width: u32, height: u32, light_id: u64) -> Option<(u32, u32)> {
        let tiles_w = (width / self.tile_size).max(1);
        let tiles_h = (height / self.tile_size).max(1);

        if tiles_w > self.tile_count || tiles_h > self.tile_count {
            return None;
        }
        if tiles_w * tiles_h > self.free_tiles {
            return None;
        }

        for y in 0..=(self.tile_count - tiles_h) {
            for x in 0..=(self.tile_count - tiles_w) {
                if self.block_free(x, y, tiles_w, tiles_h) {
                    self.mark_block(x, y, tiles_w, tiles_h, light_id);
                    return Some((x * self.tile_size, y * self.tile_size));
                }
            }
        }

        None
    }

    /// Releases every tile owned by `light_id`.
    ///
    /// Idempotent — freeing a light that owns nothing is a no-op.
    pub fn free_tiles(&mut self, light_id: u64) {
        for cell in &mut self.grid {
            if *cell == Some(light_id) {
                *cell = None;
                self.free_tiles += 1;
            }
        }
    }

    /// Unconditionally releases every tile.
    pub fn clear(&mut self) {
        self.grid.fill(None);
        self.free_tiles = self.tile_count * self.tile_count;
    }

    fn block_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        for row in y..y + h {
            for col in x..x + w {
                if self.grid[(row * self.tile_count + col) as usize].is_some() {
                    return false;
                }
            }
        }
        true
    }

    fn mark_block(&mut self, x: u32, y: u32, w: u32, h: u32, light_id: u64) {
        for row in y..y + h {
            for col in x..x + w {
                self.grid[(row * self.tile_count + col) as usize] = Some(light_id);
            }
        }
        self.free_tiles -= w * h;
    }

    // ── Resolution Policy ────────────────────────────────────────────────────

    /// Desired shadow-map resolution for a light at `distance` from the
    /// camera.
    ///
    /// Linear falloff: `max_shadow_size` at distance 0 down to one tile
    /// at `max_distance`, rounded down to a tile multiple.
    #[must_use]
    pub fn desired_resolution(&self, distance: f32, max_distance: f32) -> u32 {
        let t = if max_distance > 0.0 {
            (distance / max_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let floor = self.tile_size as f32;
        let ceiling = self.max_shadow_size as f32;
        let raw = floor + (ceiling - floor) * (1.0 - t);
        let snapped = (raw as u32 / self.tile_size) * self.tile_size;
        snapped.max(self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_marks_exact_tile_area() {
        let mut atlas = ShadowAtlas::new(256, 32, 128);
        let total = atlas.free_tile_count();

        let offset = atlas.reserve_tiles(64, 64, 7);
        assert_eq!(offset, Some((0, 0)));
        assert_eq!(atlas.free_tile_count(), total - 4);
    }

    #[test]
    fn failed_reservation_leaves_grid_unmodified() {
        let mut atlas = ShadowAtlas::new(64, 32, 64);
        // 2×2 tile grid: fill three tiles with one light.
        assert!(atlas.reserve_tiles(64, 32, 1).is_some());
        assert!(atlas.reserve_tiles(32, 32, 2).is_some());
        let free_before = atlas.free_tile_count();

        // A 2×1 block no longer fits anywhere.
        assert!(atlas.reserve_tiles(64, 32, 3).is_none());
        assert_eq!(atlas.free_tile_count(), free_before);
    }

    #[test]
    fn free_is_idempotent() {
        let mut atlas = ShadowAtlas::new(128, 32, 128);
        atlas.reserve_tiles(64, 64, 42);
        atlas.free_tiles(42);
        let free = atlas.free_tile_count();
        atlas.free_tiles(42);
        assert_eq!(atlas.free_tile_count(), free);
    }
}
