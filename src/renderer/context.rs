//! GPU Context and Deferred Disposal
//!
//! [`GpuContext`] bundles the device/queue pair with the backend-derived
//! default keyword state. Platform bootstrap (instance, adapter, surface)
//! happens outside the render core; the context is constructed from an
//! already-created device.
//!
//! # Deferred disposal
//!
//! GPU resources replaced mid-frame (stale bind groups, resized buffers)
//! may still be referenced by in-flight command lists. [`RetireQueue`]
//! holds them until the submission that last used them is observed
//! complete (`on_submitted_work_done`), then drops them. This is the
//! *only* disposal path — there is no finalizer fallback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::renderer::keyword::KeywordState;
use crate::renderer::resources::{GpuBuffer, GpuTexture};

/// Device, queue, and backend-derived defaults.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub backend: wgpu::Backend,
    /// Capability keywords every variant lookup is combined with.
    pub default_keywords: KeywordState,
    pub retire: RetireQueue,
}

impl GpuContext {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, backend: wgpu::Backend) -> Self {
        crate::utils::interner::preload_common_names();
        Self {
            device,
            queue,
            backend,
            default_keywords: KeywordState::default_for(backend),
            retire: RetireQueue::new(),
        }
    }
}

/// A disposable GPU resource awaiting retirement.
#[derive(Debug)]
pub enum RetiredResource {
    Buffer(wgpu::Buffer),
    BindGroup(wgpu::BindGroup),
    Texture(wgpu::Texture),
    OwnedBuffer(GpuBuffer),
    OwnedTexture(GpuTexture),
}

struct RetireBatch {
    done: Arc<AtomicBool>,
    resources: Vec<RetiredResource>,
}

/// Retire-after-submission queue.
///
/// Resources submitted for disposal are grouped into batches; a batch is
/// sealed at submission time with a completion flag driven by
/// `Queue::on_submitted_work_done`, and its resources are dropped the
/// first time [`RetireQueue::collect`] sees the flag set.
#[derive(Default)]
pub struct RetireQueue {
    /// Resources disposed since the last submission.
    pending: Vec<RetiredResource>,
    in_flight: Vec<RetireBatch>,
}

impl RetireQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a resource for disposal after the *next* submission retires.
    pub fn dispose(&mut self, resource: RetiredResource) {
        self.pending.push(resource);
    }

    /// Seals the pending set against the submission that was just made.
    ///
    /// Call immediately after `Queue::submit`.
    pub fn seal_submission(&mut self, queue: &wgpu::Queue) {
        if self.pending.is_empty() {
            return;
        }
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        queue.on_submitted_work_done(move || flag.store(true, Ordering::Release));
        self.in_flight.push(RetireBatch {
            done,
            resources: std::mem::take(&mut self.pending),
        });
    }

    /// Drops every batch whose submission has been observed complete.
    pub fn collect(&mut self) {
        self.in_flight
            .retain(|batch| !batch.done.load(Ordering::Acquire));
    }

    /// Blocks until all GPU work retires, then drops everything.
    ///
    /// Used on shutdown; idempotent.
    pub fn flush(&mut self, device: &wgpu::Device) {
        if self.in_flight.is_empty() && self.pending.is_empty() {
            return;
        }
        let _ = device.poll(wgpu::PollType::wait_indefinitely());
        self.in_flight.clear();
        self.pending.clear();
    }

    /// Number of batches still waiting on the GPU.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
