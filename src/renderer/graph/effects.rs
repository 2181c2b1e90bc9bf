//! Image Effects and the Ping-Pong Chain
//!
//! Post-processing effects implement [`ImageEffect`] and are chained
//! through alternating source/destination targets. The chain itself is
//! computed up front as a pure [`ChainPlan`] — which temporaries to
//! allocate (HDR or LDR), which buffer each effect reads and writes,
//! whether the result must be copied back into the forward buffer — and
//! then executed against the target pool.
//!
//! Temporaries are guaranteed released exactly once on **every** exit
//! path, including an effect panicking mid-chain: the executor holds
//! them in a drop guard that returns them to the pool on unwind.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::renderer::graph::view::CameraSnapshot;
use crate::resources::texture::{RenderTargetPool, RenderTexture, RenderTextureDesc};

// ─── Contract ─────────────────────────────────────────────────────────────────

/// Which half of the frame an effect runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTier {
    /// After the opaque + skybox passes, before transparents.
    Opaque,
    /// After transparents, before the final blit.
    Final,
}

/// Engine state handed to an effect while it renders.
pub struct EffectContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub snapshot: &'a CameraSnapshot,
}

/// A post-processing image effect.
pub trait ImageEffect {
    fn tier(&self) -> EffectTier {
        EffectTier::Final
    }

    /// Whether this effect's output collapses HDR to LDR (tonemappers).
    fn forces_ldr(&self) -> bool {
        false
    }

    /// Runs before the camera snapshot is taken; the effect may still
    /// mutate the live camera here.
    fn on_pre_cull(&mut self) {}

    fn on_pre_render(&mut self, _snapshot: &CameraSnapshot) {}

    /// Renders the effect from `source` into `dest`.
    fn on_render_image(
        &mut self,
        ctx: &mut EffectContext<'_>,
        source: &RenderTexture,
        dest: &RenderTexture,
    );

    fn on_post_render(&mut self, _snapshot: &CameraSnapshot) {}
}

// ─── Chain Plan ───────────────────────────────────────────────────────────────

/// A buffer position in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotId {
    /// The forward buffer the chain started from.
    Forward,
    /// Index into [`ChainPlan::temps`].
    Temp(usize),
}

/// Format class of one planned temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempSpec {
    pub ldr: bool,
}

/// One effect invocation in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStep {
    pub effect: usize,
    pub source: SlotId,
    pub dest: SlotId,
    /// Temp to release *before* this step (an HDR destination displaced
    /// by a fresh LDR one at the HDR→LDR switch).
    pub release_before: Option<usize>,
}

/// The complete, pure description of one effect chain execution.
#[derive(Debug, Clone, Default)]
pub struct ChainPlan {
    pub temps: Vec<TempSpec>,
    pub steps: Vec<ChainStep>,
    /// Slot holding the final result when it is not the forward buffer;
    /// the executor blits it back.
    pub copy_back: Option<SlotId>,
}

impl ChainPlan {
    /// Builds the plan for effects with the given `forces_ldr` flags,
    /// starting from a forward buffer that is HDR iff `source_is_hdr`.
    #[must_use]
    pub fn build(forces_ldr: &[bool], source_is_hdr: bool) -> Self {
        if forces_ldr.is_empty() {
            return Self::default();
        }

        let mut plan = Self::default();
        let mut hdr = source_is_hdr;
        let mut source = SlotId::Forward;

        // First destination: LDR if the first effect collapses to LDR,
        // otherwise match the source's HDR-ness.
        let mut dest = plan.alloc(forces_ldr[0] || !hdr);

        for (index, &effect_forces_ldr) in forces_ldr.iter().enumerate() {
            let mut release_before = None;
            if hdr && effect_forces_ldr && plan.is_hdr(dest, source_is_hdr) {
                // The pending destination is HDR but this effect writes
                // LDR: swap in a fresh LDR buffer. A displaced temp is
                // released; the forward buffer never is.
                if let SlotId::Temp(old) = dest {
                    release_before = Some(old);
                }
                dest = plan.alloc(true);
            }

            plan.steps.push(ChainStep {
                effect: index,
                source,
                dest,
                release_before,
            });

            if effect_forces_ldr {
                hdr = false;
            }
            std::mem::swap(&mut source, &mut dest);
        }

        // `source` now holds the result.
        if source != SlotId::Forward {
            plan.copy_back = Some(source);
        }
        plan
    }

    fn alloc(&mut self, ldr: bool) -> SlotId {
        self.temps.push(TempSpec { ldr });
        SlotId::Temp(self.temps.len() - 1)
    }

    fn is_hdr(&self, slot: SlotId, forward_is_hdr: bool) -> bool {
        match slot {
            SlotId::Temp(index) => !self.temps[index].ldr,
            SlotId::Forward => forward_is_hdr,
        }
    }
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Owns the chain's temporaries; returns every live one to the pool on
/// drop, which is what guarantees no leak when an effect unwinds.
struct TempGuard<'a> {
    pool: &'a mut RenderTargetPool,
    temps: Vec<Option<RenderTexture>>,
}

impl TempGuard<'_> {
    fn release(&mut self, index: usize) {
        if let Some(target) = self.temps[index].take() {
            self.pool.release(target);
        }
    }
}

impl Drop for TempGuard<'_> {
    fn drop(&mut self) {
        for target in &mut self.temps {
            if let Some(target) = target.take() {
                self.pool.release(target);
            }
        }
    }
}

/// Runs an effect chain over `forward`, ping-ponging through pooled
/// temporaries per the computed plan.
///
/// `blit` copies one target into another (format-converting fullscreen
/// draw); it is used for the final copy-back when the result ended up in
/// a temporary.
pub fn run_effect_chain(
    effects: &mut [&mut dyn ImageEffect],
    forward: &RenderTexture,
    ldr_format: wgpu::TextureFormat,
    pool: &mut RenderTargetPool,
    ctx: &mut EffectContext<'_>,
    blit: &mut dyn FnMut(&mut EffectContext<'_>, &RenderTexture, &RenderTexture),
) {
    let flags: Vec<bool> = effects.iter().map(|e| e.forces_ldr()).collect();
    let source_is_hdr = forward.color[0].format == wgpu::TextureFormat::Rgba16Float;
    let plan = ChainPlan::build(&flags, source_is_hdr);
    if plan.steps.is_empty() {
        return;
    }

    // Allocate every planned temporary up front, held by the guard.
    let mut guard = TempGuard {
        temps: plan
            .temps
            .iter()
            .map(|spec| {
                let desc = RenderTextureDesc {
                    width: forward.width,
                    height: forward.height,
                    color_formats: if spec.ldr {
                        std::iter::once(ldr_format).collect()
                    } else {
                        forward.color.iter().map(|c| c.format).take(1).collect()
                    },
                    depth_format: None,
                    sample_count: 1,
                    label: "Effect Chain Temp",
                };
                Some(pool.acquire(ctx.device, &desc))
            })
            .collect(),
        pool,
    };

    for step in &plan.steps {
        if let Some(release) = step.release_before {
            guard.release(release);
        }

        let source = match step.source {
            SlotId::Forward => Some(forward),
            SlotId::Temp(index) => guard.temps[index].as_ref(),
        };
        let dest = match step.dest {
            SlotId::Forward => Some(forward),
            SlotId::Temp(index) => guard.temps[index].as_ref(),
        };
        let (Some(source), Some(dest)) = (source, dest) else {
            log::error!("effect chain step references a released buffer, aborting chain");
            break;
        };

        let effect = &mut effects[step.effect];
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            effect.on_render_image(ctx, source, dest);
        }));
        if outcome.is_err() {
            log::error!(
                "image effect {} panicked during on_render_image; chain aborted",
                step.effect
            );
            break;
        }
    }

    if let Some(result_slot) = plan.copy_back
        && let SlotId::Temp(index) = result_slot
        && let Some(result) = guard.temps[index].as_ref()
    {
        blit(ctx, result, forward);
    }
    // Guard drop returns every remaining temp to the pool.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_hdr_effects_pingpong_and_copy_back() {
        let plan = ChainPlan::build(&[false, false], true);
        assert_eq!(plan.temps.len(), 1);
        assert!(!plan.temps[0].ldr);
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].source, SlotId::Forward);
        assert_eq!(plan.steps[0].dest, SlotId::Temp(0));
        assert_eq!(plan.steps[1].source, SlotId::Temp(0));
        assert_eq!(plan.steps[1].dest, SlotId::Forward);
        assert_eq!(plan.copy_back, None);
    }

    #[test]
    fn ldr_switch_allocates_fresh_buffer() {
        // HDR-preserving effect followed by a tonemapper.
        let plan = ChainPlan::build(&[false, true], true);
        assert_eq!(plan.temps.len(), 2);
        assert!(!plan.temps[0].ldr);
        assert!(plan.temps[1].ldr);
        // The tonemapper's destination would have been the HDR forward
        // buffer; a fresh LDR temp takes its place instead.
        assert_eq!(plan.steps[1].source, SlotId::Temp(0));
        assert_eq!(plan.steps[1].dest, SlotId::Temp(1));
        assert_eq!(plan.copy_back, Some(SlotId::Temp(1)));
    }

    #[test]
    fn first_effect_forcing_ldr_gets_ldr_dest() {
        let plan = ChainPlan::build(&[true], true);
        assert_eq!(plan.temps.len(), 1);
        assert!(plan.temps[0].ldr);
        assert_eq!(plan.copy_back, Some(SlotId::Temp(0)));
    }
}
