//! Shadow Stage
//!
//! Per frame: clear the atlas, then for every light that wants shadows,
//! compute its desired resolution (distance policy for spot lights,
//! configured size for directional), reserve atlas tiles, and render its
//! shadow-caster sub-pass into the reserved viewport with the light's
//! view-projection.
//!
//! Tile exhaustion and the spot-light cap are soft failures: affected
//! lights upload the `(-1, -1, 0)` sentinel and render unshadowed.

use rustc_hash::FxHashSet;

use crate::renderer::command_buffer::{BindContext, CommandBuffer};
use crate::renderer::graph::passes::geometry::{self, MaterialPass, SortOrder};
use crate::renderer::graph::view::CameraSnapshot;
use crate::renderer::renderable::Renderable;
use crate::renderer::shadow_atlas::ShadowAtlas;
use crate::scene::light::{GpuLight, Light};
use crate::settings::RenderSettings;

/// Pass tag shadow-caster passes carry.
pub const SHADOW_CASTER_TAG: &str = "ShadowCaster";

/// Runs the whole shadow stage and returns the per-light GPU records in
/// input order.
pub fn run(
    cb: &mut CommandBuffer,
    ctx: &mut BindContext<'_>,
    atlas: &mut ShadowAtlas,
    lights: &[Light],
    renderables: &mut [&mut dyn Renderable],
    snapshot: &CameraSnapshot,
    settings: &RenderSettings,
) -> crate::errors::Result<Vec<GpuLight>> {
    atlas.clear();

    // Shadow casting ignores camera culling: geometry behind the camera
    // still throws shadows into view.
    let no_exclusions = FxHashSet::default();

    let mut gpu_lights = Vec::with_capacity(lights.len());
    let mut spot_shadows = 0_usize;
    let mut atlas_cleared = false;

    for light in lights {
        let shadow_matrix = light.shadow_view_projection(snapshot.position);

        let over_spot_cap = !light.is_directional() && spot_shadows >= settings.max_spot_shadows;
        if !light.wants_shadows() || over_spot_cap {
            gpu_lights.push(light.upload_to_gpu(None, shadow_matrix));
            continue;
        }

        let resolution = if light.is_directional() {
            light.shadow.map_size.min(atlas.size())
        } else {
            let distance = light.position.distance(snapshot.position);
            atlas
                .desired_resolution(distance, settings.shadow_distance)
                .min(light.shadow.map_size.max(atlas.tile_size()))
        };

        let Some((x, y)) = atlas.reserve_tiles(resolution, resolution, light.id) else {
            // No fitting block; the light goes unshadowed this frame.
            gpu_lights.push(light.upload_to_gpu(None, shadow_matrix));
            continue;
        };

        if !light.is_directional() {
            spot_shadows += 1;
        }

        if let Some(texture) = atlas.texture() {
            // First reserved light clears the whole atlas depth.
            cb.set_depth_target(
                &texture.view,
                wgpu::TextureFormat::Depth32Float,
                if atlas_cleared { None } else { Some(1.0) },
            )?;
            atlas_cleared = true;
            cb.set_viewport(x as f32, y as f32, resolution as f32, resolution as f32)?;

            geometry::draw_list(
                cb,
                ctx,
                renderables,
                &no_exclusions,
                snapshot,
                shadow_matrix,
                SHADOW_CASTER_TAG,
                MaterialPass::Shadow,
                SortOrder::None,
                None,
            );
        }

        gpu_lights.push(light.upload_to_gpu(Some((x, y, resolution)), shadow_matrix));
    }

    Ok(gpu_lights)
}
