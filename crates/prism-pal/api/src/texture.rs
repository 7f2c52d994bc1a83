use std::ops::Shr;

use crate::{
    context::Context,
    types::{Filter, Format, SamplerAddressMode, TextureType, TextureUsage, CUBE_FACE_COUNT},
    Backend,
};
use ordered_float::NotNan;
use thiserror::Error;

pub struct TextureCreateInfo {
    pub format: Format,
    pub ty: TextureType,
    pub width: u32,
    pub height: u32,
    pub array_elements: usize,
    pub mip_levels: usize,
    pub texture_usage: TextureUsage,
    pub debug_name: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sampler {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmap_filter: Filter,
    pub address_u: SamplerAddressMode,
    pub address_v: SamplerAddressMode,
    pub address_w: SamplerAddressMode,
    pub min_lod: NotNan<f32>,
    pub max_lod: Option<NotNan<f32>>,
}

#[derive(Debug, Error)]
pub enum TextureCreateError {
    #[error("texture dimension {0} exceeds the device limit of {1}")]
    TooLarge(u32, u32),
    #[error("out of device memory")]
    OutOfMemory,
    #[error("an error has occured: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum TextureTransferError {
    #[error("array element `{0}` mip `{1}` is out of bounds")]
    OutOfBounds(usize, usize),
    #[error("expected {expected} bytes of texel data but got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("an error has occured: {0}")]
    Other(String),
}

pub struct Texture<B: Backend> {
    ctx: Context<B>,
    ty: TextureType,
    dims: (u32, u32),
    format: Format,
    array_elements: usize,
    mip_count: usize,
    usage: TextureUsage,
    pub(crate) id: B::Texture,
}

/// Number of mip levels in a full chain for a texture of the given size, which is
/// `floor(log2(max(width, height))) + 1`.
///
/// # Panics
/// - If both `width` and `height` are `0`.
#[inline(always)]
pub fn mip_level_count(width: u32, height: u32) -> usize {
    let max = width.max(height);
    assert_ne!(max, 0, "texture must not be empty");
    (u32::BITS - max.leading_zeros()) as usize
}

/// Dimension of a texture at a particular mip level.
#[inline(always)]
pub fn mip_dim(base: u32, mip_level: usize) -> u32 {
    base.shr(mip_level as u32).max(1)
}

impl<B: Backend> Texture<B> {
    /// Creates a new texture.
    ///
    /// # Panics
    /// - If the texture is empty.
    /// - If `mip_levels` is `0` or larger than a full mip chain.
    /// - If `ty` is [`TextureType::CubeMap`] and the texture is not square with
    /// [`CUBE_FACE_COUNT`] array elements.
    pub fn new(
        ctx: Context<B>,
        create_info: TextureCreateInfo,
    ) -> Result<Self, TextureCreateError> {
        assert_ne!(create_info.array_elements, 0, "texture must have array elements");
        assert!(
            create_info.mip_levels > 0
                && create_info.mip_levels <= mip_level_count(create_info.width, create_info.height),
            "invalid mip count `{}` for a {}x{} texture",
            create_info.mip_levels,
            create_info.width,
            create_info.height
        );
        if create_info.ty == TextureType::CubeMap {
            assert_eq!(create_info.width, create_info.height, "cube faces must be square");
            assert_eq!(
                create_info.array_elements, CUBE_FACE_COUNT,
                "cube maps must have exactly {CUBE_FACE_COUNT} faces"
            );
        }

        let max_dim = ctx.properties().limits.max_texture_dimension_2d;
        let dim = create_info.width.max(create_info.height);
        if dim > max_dim {
            return Err(TextureCreateError::TooLarge(dim, max_dim));
        }

        let ty = create_info.ty;
        let dims = (create_info.width, create_info.height);
        let format = create_info.format;
        let array_elements = create_info.array_elements;
        let mip_count = create_info.mip_levels;
        let usage = create_info.texture_usage;
        let id = unsafe { ctx.0.create_texture(create_info)? };

        Ok(Self {
            ctx,
            ty,
            dims,
            format,
            array_elements,
            mip_count,
            usage,
            id,
        })
    }

    /// Uploads tightly packed texels to one array element and mip level of the texture.
    ///
    /// # Synchronization
    /// The write is guaranteed to be visible to every job submitted after this call returns.
    pub fn write(
        &self,
        array_element: usize,
        mip_level: usize,
        data: &[u8],
    ) -> Result<(), TextureTransferError> {
        let expected = self.check_subresource(array_element, mip_level)?;
        if data.len() != expected {
            return Err(TextureTransferError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        unsafe {
            self.ctx
                .0
                .write_texture(&self.id, array_element, mip_level, data)
        }
    }

    /// Reads back one array element and mip level of the texture as tightly packed texels. This
    /// blocks until every previously submitted job has completed.
    pub fn read(
        &self,
        array_element: usize,
        mip_level: usize,
    ) -> Result<Vec<u8>, TextureTransferError> {
        self.check_subresource(array_element, mip_level)?;
        unsafe { self.ctx.0.read_texture(&self.id, array_element, mip_level) }
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::Texture {
        &self.id
    }

    #[inline(always)]
    pub fn ty(&self) -> TextureType {
        self.ty
    }

    #[inline(always)]
    pub fn dims(&self) -> (u32, u32) {
        self.dims
    }

    /// Width and height of a particular mip level.
    #[inline(always)]
    pub fn mip_dims(&self, mip_level: usize) -> (u32, u32) {
        (mip_dim(self.dims.0, mip_level), mip_dim(self.dims.1, mip_level))
    }

    #[inline(always)]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline(always)]
    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    #[inline(always)]
    pub fn array_elements(&self) -> usize {
        self.array_elements
    }

    #[inline(always)]
    pub fn mip_count(&self) -> usize {
        self.mip_count
    }

    /// Gets the size in bytes of a single array element of the texture, including all mips.
    #[inline(always)]
    pub fn size(&self) -> u64 {
        unsafe { self.ctx.0.texture_size(&self.id) }
    }

    fn check_subresource(
        &self,
        array_element: usize,
        mip_level: usize,
    ) -> Result<usize, TextureTransferError> {
        if array_element >= self.array_elements || mip_level >= self.mip_count {
            return Err(TextureTransferError::OutOfBounds(array_element, mip_level));
        }
        let (width, height) = self.mip_dims(mip_level);
        Ok(width as usize * height as usize * self.format.texel_size())
    }
}

impl<B: Backend> Drop for Texture<B> {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_texture(&mut self.id);
        }
    }
}

impl Default for TextureCreateInfo {
    #[inline(always)]
    fn default() -> Self {
        Self {
            format: Format::Rgba8Unorm,
            ty: TextureType::Type2D,
            width: 128,
            height: 128,
            array_elements: 1,
            mip_levels: 1,
            texture_usage: TextureUsage::empty(),
            debug_name: None,
        }
    }
}

impl Default for Sampler {
    #[inline(always)]
    fn default() -> Self {
        Self {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmap_filter: Filter::Linear,
            address_u: SamplerAddressMode::Repeat,
            address_v: SamplerAddressMode::Repeat,
            address_w: SamplerAddressMode::Repeat,
            min_lod: unsafe { NotNan::new_unchecked(0.0) },
            max_lod: None,
        }
    }
}
