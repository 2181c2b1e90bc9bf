//! GPU Resource Heap
//!
//! Owns long-lived `wgpu::Texture` / `wgpu::Buffer` objects and hands out
//! slotmap handles. Consumers (property state, materials, renderables)
//! only ever hold [`TextureHandle`] / [`BufferHandle`]; the heap is the
//! single owner and release point.
//!
//! Every GPU object also carries a process-unique `u64` resource id used
//! by the binding layer's fingerprint check — ids change when a handle is
//! re-populated, so stale bind groups are detected by integer compare.

use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a texture owned by [`GpuResources`].
    pub struct TextureHandle;
    /// Handle to a buffer owned by [`GpuResources`].
    pub struct BufferHandle;
}

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique resource id.
#[inline]
#[must_use]
pub fn next_resource_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A sampled texture with its default view and sampler.
#[derive(Debug)]
pub struct GpuTexture {
    pub id: u64,
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub format: wgpu::TextureFormat,
}

impl GpuTexture {
    /// Creates a 1×1 texture filled with a constant color.
    ///
    /// Used for the default fallback textures property resolution
    /// substitutes when a shader samples a texture nothing bound.
    #[must_use]
    pub fn solid_color(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            texture.as_image_copy(),
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            id: next_resource_id(),
            texture,
            view,
            sampler,
            format: wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

impl GpuTexture {
    /// Wraps already-created GPU objects (render-target attachments
    /// registered for sampling). The clones share the underlying
    /// resource; dropping the wrapper never destroys the attachment.
    #[must_use]
    pub fn from_raw(
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        sampler: wgpu::Sampler,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            id: next_resource_id(),
            texture,
            view,
            sampler,
            format,
        }
    }
}

/// A raw GPU buffer plus bookkeeping.
#[derive(Debug)]
pub struct GpuBuffer {
    pub id: u64,
    pub buffer: wgpu::Buffer,
    pub size: u64,
}

impl GpuBuffer {
    /// Creates a zero-initialized buffer.
    #[must_use]
    pub fn zeroed(device: &wgpu::Device, size: u64, usage: wgpu::BufferUsages, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });
        Self {
            id: next_resource_id(),
            buffer,
            size,
        }
    }
}

/// Fallback resources substituted when a shader binding resolves to
/// nothing in either property tier.
#[derive(Debug)]
pub struct DefaultResources {
    pub white: GpuTexture,
    pub black: GpuTexture,
    /// Flat tangent-space normal (128, 128, 255).
    pub normal: GpuTexture,
    pub zero_uniform: GpuBuffer,
    pub zero_storage: GpuBuffer,
}

impl DefaultResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            white: GpuTexture::solid_color(device, queue, [255, 255, 255, 255], "Default White"),
            black: GpuTexture::solid_color(device, queue, [0, 0, 0, 255], "Default Black"),
            normal: GpuTexture::solid_color(device, queue, [128, 128, 255, 255], "Default Normal"),
            zero_uniform: GpuBuffer::zeroed(
                device,
                256,
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                "Default Uniform",
            ),
            zero_storage: GpuBuffer::zeroed(
                device,
                256,
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                "Default Storage",
            ),
        }
    }
}

/// Heap of handle-addressed GPU resources.
pub struct GpuResources {
    textures: SlotMap<TextureHandle, GpuTexture>,
    buffers: SlotMap<BufferHandle, GpuBuffer>,
    pub defaults: DefaultResources,
}

impl GpuResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            textures: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            defaults: DefaultResources::new(device, queue),
        }
    }

    pub fn insert_texture(&mut self, texture: GpuTexture) -> TextureHandle {
        self.textures.insert(texture)
    }

    pub fn insert_buffer(&mut self, buffer: GpuBuffer) -> BufferHandle {
        self.buffers.insert(buffer)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle)
    }

    #[must_use]
    pub fn buffer(&self, handle: BufferHandle) -> Option<&GpuBuffer> {
        self.buffers.get(handle)
    }

    /// Removes a texture, returning it for deferred disposal.
    pub fn remove_texture(&mut self, handle: TextureHandle) -> Option<GpuTexture> {
        self.textures.remove(handle)
    }

    /// Removes a buffer, returning it for deferred disposal.
    pub fn remove_buffer(&mut self, handle: BufferHandle) -> Option<GpuBuffer> {
        self.buffers.remove(handle)
    }
}
