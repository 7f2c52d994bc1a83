use std::sync::Arc;

use crate::{queue::Queue, types::QueueType, Backend};

/// The context is the entry point for Pal. It is used to create all other Pal objects.
///
/// The context also provides you with a selection of [`Queues`](Queue).
pub struct Context<B: Backend>(pub(crate) Arc<B>);

/// Information about the device a backend is running on.
#[derive(Debug, Clone)]
pub struct GraphicsProperties {
    /// Human readable name of the adapter.
    pub adapter_name: String,
    pub limits: GraphicsLimits,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GraphicsLimits {
    /// Largest width or height a 2D (or cube) texture may have.
    pub max_texture_dimension_2d: u32,
    /// Offsets into uniform buffers bound to descriptor sets must be multiples of this value.
    pub min_uniform_buffer_offset_alignment: u64,
}

impl<B: Backend> Context<B> {
    /// Creates a new Pal instance.
    ///
    /// # Arguments
    ///
    /// - `backend` - A backend object selected based on your system. See `/backends/` for a
    /// selection to choose from.
    #[inline(always)]
    pub fn new(backend: B) -> Self {
        Self(Arc::new(backend))
    }

    /// Gets a reference to the primary queue.
    ///
    /// # Supported Commands
    ///
    /// - [`render_pass`](crate::command_buffer::CommandBuffer::render_pass)
    /// - [`compute_pass`](crate::command_buffer::CommandBuffer::compute_pass)
    #[inline(always)]
    pub fn main(&self) -> Queue<B> {
        Queue::new(self.clone(), QueueType::Main)
    }

    /// Gets a reference to the compute queue.
    ///
    /// # Supported Commands
    ///
    /// - [`compute_pass`](crate::command_buffer::CommandBuffer::compute_pass)
    #[inline(always)]
    pub fn compute(&self) -> Queue<B> {
        Queue::new(self.clone(), QueueType::Compute)
    }

    #[inline(always)]
    pub fn properties(&self) -> &GraphicsProperties {
        unsafe { self.0.properties() }
    }

    /// Blocks until every job submitted to every queue has completed.
    #[inline(always)]
    pub fn wait_idle(&self) {
        unsafe { self.0.wait_idle() }
    }

    /// Direct access to the backend, for backend specific functionality (e.g. debug traces).
    #[inline(always)]
    pub fn backend(&self) -> &B {
        &self.0
    }
}

impl<B: Backend> Clone for Context<B> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
