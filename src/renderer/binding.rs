//! Resource Binding
//!
//! Translates property values into GPU resource-set bindings.
//!
//! The flow per draw is *ensure → collect ids → check fingerprint →
//! rebind*: every declared slot resolves to a concrete GPU resource
//! (per-draw tier, then global tier, then default resource), the
//! resolved resource ids are compared against the ids the existing
//! `wgpu::BindGroup` was built from, and only a mismatch triggers
//! recreation. Unchanged draws reuse the previous bind group for free.
//!
//! Uniform buffer slots are backed by [`UniformStaging`]: a CPU scratch
//! block shaped by shader reflection, written member-by-member through a
//! change-detecting cache, uploaded only when something changed.

use glam::Mat4;
use smallvec::SmallVec;

use crate::renderer::properties::{AppliedValueCache, PropertyState, PropertyValue};
use crate::renderer::resources::{GpuBuffer, GpuResources, next_resource_id};
use crate::renderer::shader::{BindingKind, ResourceBinding, UniformBlock, UniformKind};

// ─── Uniform Staging ──────────────────────────────────────────────────────────

/// CPU staging + GPU buffer for one reflected uniform block.
pub struct UniformStaging {
    block: UniformBlock,
    data: Vec<u8>,
    gpu: GpuBuffer,
    applied: AppliedValueCache,
    dirty: bool,
}

impl UniformStaging {
    #[must_use]
    pub fn new(device: &wgpu::Device, block: UniformBlock) -> Self {
        let size = u64::from(block.size.max(16));
        let gpu = GpuBuffer::zeroed(
            device,
            size,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            "Uniform Block",
        );
        Self {
            data: vec![0_u8; size as usize],
            block,
            gpu,
            applied: AppliedValueCache::new(),
            dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.gpu.buffer
    }

    #[inline]
    #[must_use]
    pub fn resource_id(&self) -> u64 {
        self.gpu.id
    }

    /// Resolves every reflected member against the two property tiers
    /// and copies changed values into the staging block.
    ///
    /// Members absent from both tiers keep their previous GPU-side
    /// value; values of mismatched kind count as absent.
    pub fn update(&mut self, per_draw: &PropertyState, globals: &PropertyState) {
        // Borrow members out of the block so `self` stays splittable.
        let members = std::mem::take(&mut self.block.members);
        for member in &members {
            let value = per_draw
                .value_matching(member.name, member.kind)
                .or_else(|| globals.value_matching(member.name, member.kind));
            let Some(value) = value else {
                continue;
            };
            if self.applied.changed(member.name, value) {
                self.write_member(member.offset, member.kind, value);
                self.dirty = true;
            }
        }
        self.block.members = members;
    }

    fn write_member(&mut self, offset: u32, kind: UniformKind, value: &PropertyValue) {
        let start = offset as usize;
        let dst = &mut self.data;
        let mut put = |bytes: &[u8]| {
            let end = start + bytes.len();
            if end <= dst.len() {
                dst[start..end].copy_from_slice(bytes);
            }
        };

        match (kind, value) {
            (UniformKind::Float, PropertyValue::Float(v)) => put(&v.to_le_bytes()),
            (UniformKind::Int, PropertyValue::Int(v)) => put(&v.to_le_bytes()),
            (UniformKind::Vec2, PropertyValue::Vec2(v)) => put(bytemuck::bytes_of(v)),
            (UniformKind::Vec3, PropertyValue::Vec3(v)) => put(bytemuck::bytes_of(v)),
            (UniformKind::Vec4, PropertyValue::Vec4(v)) => put(bytemuck::bytes_of(v)),
            (UniformKind::Mat4, PropertyValue::Mat4(v)) => {
                put(bytemuck::bytes_of(&v.to_cols_array()));
            }
            (UniformKind::Mat4Array { count }, PropertyValue::Mat4Array(values)) => {
                // std140 array stride for mat4 is 64 bytes.
                let n = values.len().min(count as usize);
                let flat: Vec<[f32; 16]> =
                    values[..n].iter().map(Mat4::to_cols_array).collect();
                put(bytemuck::cast_slice(&flat));
            }
            _ => {}
        }
    }

    /// Uploads the staging block when any member changed since the last
    /// upload.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if self.dirty {
            queue.write_buffer(&self.gpu.buffer, 0, &self.data);
            self.dirty = false;
        }
    }

    /// Forgets change-tracking state (after device loss or reuse).
    pub fn reset(&mut self) {
        self.applied.reset();
        self.dirty = true;
    }
}

// ─── Resolved Slots ───────────────────────────────────────────────────────────

/// One declared slot resolved to a concrete GPU resource.
pub enum ResolvedSlot<'a> {
    Buffer { id: u64, buffer: &'a wgpu::Buffer },
    Texture { id: u64, view: &'a wgpu::TextureView },
    Sampler { id: u64, sampler: &'a wgpu::Sampler },
}

impl ResolvedSlot<'_> {
    #[must_use]
    pub fn resource_id(&self) -> u64 {
        match self {
            Self::Buffer { id, .. } | Self::Texture { id, .. } | Self::Sampler { id, .. } => *id,
        }
    }
}

/// Resolves declared bindings against the property tiers and the heap.
///
/// Fallback chain per slot: per-draw tier → global tier → default
/// resource matching the declared kind (white texture, zeroed buffer).
#[must_use]
pub fn resolve_bindings<'a>(
    bindings: &[ResourceBinding],
    per_draw: &PropertyState,
    globals: &PropertyState,
    heap: &'a GpuResources,
    uniforms: &'a [UniformStaging],
) -> SmallVec<[ResolvedSlot<'a>; 8]> {
    let defaults = &heap.defaults;
    bindings
        .iter()
        .map(|binding| match binding.kind {
            BindingKind::UniformBuffer => {
                match uniforms.iter().find(|u| u.block().binding == binding.binding) {
                    Some(staging) => ResolvedSlot::Buffer {
                        id: staging.resource_id(),
                        buffer: staging.buffer(),
                    },
                    None => ResolvedSlot::Buffer {
                        id: defaults.zero_uniform.id,
                        buffer: &defaults.zero_uniform.buffer,
                    },
                }
            }
            BindingKind::TextureReadOnly | BindingKind::TextureReadWrite => {
                let slot = per_draw
                    .texture_slot(binding.name)
                    .or_else(|| globals.texture_slot(binding.name));
                let texture = slot
                    .and_then(|s| heap.texture(s.texture))
                    .unwrap_or(&defaults.white);
                ResolvedSlot::Texture {
                    id: texture.id,
                    view: &texture.view,
                }
            }
            BindingKind::Sampler => {
                let slot = per_draw
                    .texture_slot(binding.name)
                    .or_else(|| globals.texture_slot(binding.name));
                let texture = slot
                    .and_then(|s| heap.texture(s.sampler.unwrap_or(s.texture)))
                    .unwrap_or(&defaults.white);
                ResolvedSlot::Sampler {
                    id: texture.id,
                    sampler: &texture.sampler,
                }
            }
            BindingKind::StructuredBufferReadOnly | BindingKind::StructuredBufferReadWrite => {
                let slot = per_draw
                    .buffer_slot(binding.name)
                    .or_else(|| globals.buffer_slot(binding.name));
                let buffer = slot
                    .and_then(|s| heap.buffer(s.buffer))
                    .unwrap_or(&defaults.zero_storage);
                ResolvedSlot::Buffer {
                    id: buffer.id,
                    buffer: &buffer.buffer,
                }
            }
        })
        .collect()
}

// ─── Bindable Resource Set ────────────────────────────────────────────────────

/// The bound collection of buffers/textures/samplers a pipeline reads
/// during a draw, with fingerprint-gated recreation.
pub struct BindableResourceSet {
    bindings: Vec<ResourceBinding>,
    /// Resource ids the current bind group was built from.
    fingerprint: SmallVec<[u64; 8]>,
    bind_group: Option<wgpu::BindGroup>,
    /// Process-unique id of the current bind group (changes on rebuild).
    bind_group_id: u64,
}

impl BindableResourceSet {
    #[must_use]
    pub fn new(bindings: Vec<ResourceBinding>) -> Self {
        Self {
            bindings,
            fingerprint: SmallVec::new(),
            bind_group: None,
            bind_group_id: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[ResourceBinding] {
        &self.bindings
    }

    #[inline]
    #[must_use]
    pub fn bind_group_id(&self) -> u64 {
        self.bind_group_id
    }

    /// Whether the currently-built bind group matches `ids`.
    #[must_use]
    pub fn fingerprint_matches(&self, ids: &[u64]) -> bool {
        self.bind_group.is_some() && self.fingerprint.as_slice() == ids
    }

    /// Ensures the bind group matches the resolved slots, recreating it
    /// only when some slot's resource actually changed.
    ///
    /// Returns the bind group plus the replaced (stale) one, which the
    /// caller must push into the retire queue rather than drop.
    pub fn bind(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        resolved: &[ResolvedSlot<'_>],
    ) -> (&wgpu::BindGroup, Option<wgpu::BindGroup>) {
        let ids: SmallVec<[u64; 8]> = resolved.iter().map(ResolvedSlot::resource_id).collect();

        if self.fingerprint_matches(&ids) {
            return (self.bind_group.as_ref().unwrap(), None);
        }

        let entries: Vec<wgpu::BindGroupEntry<'_>> = self
            .bindings
            .iter()
            .zip(resolved)
            .map(|(binding, slot)| wgpu::BindGroupEntry {
                binding: binding.binding,
                resource: match slot {
                    ResolvedSlot::Buffer { buffer, .. } => buffer.as_entire_binding(),
                    ResolvedSlot::Texture { view, .. } => {
                        wgpu::BindingResource::TextureView(view)
                    }
                    ResolvedSlot::Sampler { sampler, .. } => {
                        wgpu::BindingResource::Sampler(sampler)
                    }
                },
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pass Resource Set"),
            layout,
            entries: &entries,
        });

        let stale = self.bind_group.replace(bind_group);
        self.fingerprint = ids;
        self.bind_group_id = next_resource_id();
        (self.bind_group.as_ref().unwrap(), stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shader::BindingKind;

    #[test]
    fn fingerprint_requires_built_group() {
        let set = BindableResourceSet::new(vec![ResourceBinding::new(
            0,
            "_MainTex",
            BindingKind::TextureReadOnly,
        )]);
        assert!(!set.fingerprint_matches(&[]));
    }
}
