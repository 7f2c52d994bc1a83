use bytemuck::Pod;

use crate::{context::Context, types::*, Backend};
use thiserror::Error;

pub struct BufferCreateInfo {
    /// The size in bytes of the buffer to create.
    pub size: u64,
    /// How many array elements this buffer supports. Each array element is of the same size as
    /// `size`.
    pub array_elements: usize,
    /// Describes the supported usage types of this buffer.
    pub buffer_usage: BufferUsage,
    /// The backend *should* use the provided debug name for easy identification.
    pub debug_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum BufferCreateError {
    #[error("out of device memory")]
    OutOfMemory,
    #[error("an error has occured: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum BufferWriteError {
    #[error("array element `{0}` is out of bounds")]
    OutOfBounds(usize),
    #[error("attempt to write {0} bytes to an array element of {1} bytes")]
    TooLarge(u64, u64),
    #[error("an error has occured: {0}")]
    Other(String),
}

/// A GPU memory buffer. For the purposes of synchronization, this is considered a resource.
pub struct Buffer<B: Backend> {
    ctx: Context<B>,
    size: u64,
    buffer_usage: BufferUsage,
    array_elements: usize,
    debug_name: Option<String>,
    pub(crate) id: B::Buffer,
}

impl<B: Backend> Buffer<B> {
    /// Creates a new buffer.
    ///
    /// # Arguments
    /// - `ctx` - The [`Context`] to create the buffer with.
    /// - `create_info` - Describes the buffer to create.
    ///
    /// # Panics
    /// - If `create_info.size` is `0`.
    /// - If `create_info.array_elements` is `0`.
    #[inline(always)]
    pub fn new(ctx: Context<B>, create_info: BufferCreateInfo) -> Result<Self, BufferCreateError> {
        assert_ne!(create_info.size, 0, "buffer size cannot be zero");
        assert_ne!(
            create_info.array_elements, 0,
            "buffer array elements cannot be zero"
        );
        let size = create_info.size;
        let buffer_usage = create_info.buffer_usage;
        let array_elements = create_info.array_elements;
        let debug_name = create_info.debug_name.clone();
        let id = unsafe { ctx.0.create_buffer(create_info)? };
        Ok(Self {
            ctx,
            id,
            size,
            buffer_usage,
            array_elements,
            debug_name,
        })
    }

    /// Creates a uniform buffer with one array element per value, initialized with `values`.
    ///
    /// This is a helper function to do the following:
    /// 1. Create a buffer that is [`UNIFORM_BUFFER`](BufferUsage) and
    /// [`TRANSFER_DST`](BufferUsage) with `values.len()` array elements.
    /// 2. Write each value to its array element.
    ///
    /// # Panics
    /// - If `values.is_empty()`.
    pub fn new_uniform<T: Pod>(
        ctx: Context<B>,
        debug_name: Option<String>,
        values: &[T],
    ) -> Result<Self, BufferCreateError> {
        let buffer = Buffer::new(
            ctx,
            BufferCreateInfo {
                size: std::mem::size_of::<T>() as u64,
                array_elements: values.len(),
                buffer_usage: BufferUsage::UNIFORM_BUFFER | BufferUsage::TRANSFER_DST,
                debug_name,
            },
        )?;

        for (i, value) in values.iter().enumerate() {
            buffer
                .write(i, bytemuck::bytes_of(value))
                .map_err(|err| BufferCreateError::Other(err.to_string()))?;
        }

        Ok(buffer)
    }

    /// Uploads `data` to the start of an array element of the buffer.
    ///
    /// # Synchronization
    /// The write is guaranteed to be visible to every job submitted after this call returns.
    pub fn write(&self, array_element: usize, data: &[u8]) -> Result<(), BufferWriteError> {
        if array_element >= self.array_elements {
            return Err(BufferWriteError::OutOfBounds(array_element));
        }
        if data.len() as u64 > self.size {
            return Err(BufferWriteError::TooLarge(data.len() as u64, self.size));
        }
        unsafe { self.ctx.0.write_buffer(&self.id, array_element, data) }
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::Buffer {
        &self.id
    }

    /// Size in bytes of a single array element.
    #[inline(always)]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline(always)]
    pub fn array_elements(&self) -> usize {
        self.array_elements
    }

    #[inline(always)]
    pub fn buffer_usage(&self) -> BufferUsage {
        self.buffer_usage
    }

    #[inline(always)]
    pub fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }
}

impl<B: Backend> Drop for Buffer<B> {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_buffer(&mut self.id);
        }
    }
}
