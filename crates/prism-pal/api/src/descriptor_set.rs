use std::sync::Arc;
use thiserror::Error;

use crate::{
    buffer::Buffer,
    context::Context,
    texture::{Sampler, Texture},
    types::{Format, ShaderStage, TextureUsage, ViewDimension},
    Backend,
};

pub struct DescriptorSetCreateInfo<B: Backend> {
    /// The layout to create the set with.
    pub layout: DescriptorSetLayout<B>,
    /// The backend *should* use the provided debug name for easy identification.
    pub debug_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorSetLayoutCreateInfo {
    /// The bindings of this set.
    pub bindings: Vec<DescriptorBinding>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorBinding {
    /// The index of the binding within the set.
    pub binding: u32,
    /// Type of object held within this binding.
    pub ty: DescriptorType,
    /// The shader stages that have access to this binding.
    pub stage: ShaderStage,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorType {
    /// A read-only sampled texture.
    Texture {
        dimension: ViewDimension,
        /// If the texture may be read through a filtering sampler.
        filterable: bool,
    },
    /// A sampler used with sampled textures.
    Sampler { filtering: bool },
    /// A read-only uniform buffer object.
    UniformBuffer,
    /// A write-only storage image of a single mip level.
    StorageImage {
        format: Format,
        dimension: ViewDimension,
    },
}

#[derive(Debug, Error)]
pub enum DescriptorSetLayoutCreateError {
    #[error("an error has occured: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DescriptorSetCreateError {
    #[error("an error has occured: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DescriptorSetUpdateError {
    #[error("out of device memory")]
    OutOfMemory,
    #[error("an error has occured: {0}")]
    Other(String),
}

pub struct DescriptorSetLayout<B: Backend>(Arc<DescriptorSetLayoutInner<B>>);

pub struct DescriptorSet<B: Backend> {
    ctx: Context<B>,
    layout: DescriptorSetLayout<B>,
    pub(crate) id: B::DescriptorSet,
}

pub struct DescriptorSetUpdate<'a, B: Backend> {
    /// The binding to update within the set.
    pub binding: u32,
    /// The value to update the binding with.
    pub value: DescriptorValue<'a, B>,
}

pub enum DescriptorValue<'a, B: Backend> {
    UniformBuffer {
        /// The uniform buffer to bind.
        buffer: &'a Buffer<B>,
        /// The array element of the uniform buffer to bind.
        array_element: usize,
    },
    Texture {
        /// The texture to bind. Every array element is visible through the binding.
        texture: &'a Texture<B>,
        /// The base mip to bind.
        base_mip: usize,
        /// The number of mip levels to bind.
        mip_count: usize,
    },
    Sampler(Sampler),
    StorageImage {
        /// The texture to bind. Every array element is visible through the binding.
        texture: &'a Texture<B>,
        /// The mip level of the texture to bind.
        mip: usize,
    },
}

pub(crate) struct DescriptorSetLayoutInner<B: Backend> {
    ctx: Context<B>,
    bindings: Vec<DescriptorBinding>,
    pub(crate) id: B::DescriptorSetLayout,
}

impl<B: Backend> DescriptorSet<B> {
    /// Creates a new descriptor set.
    ///
    /// # Arguments
    /// - `ctx` - The [`Context`] to create the set with.
    /// - `create_info` - Describes the descriptor set to create.
    #[inline(always)]
    pub fn new(
        ctx: Context<B>,
        create_info: DescriptorSetCreateInfo<B>,
    ) -> Result<Self, DescriptorSetCreateError> {
        let layout = create_info.layout.clone();
        let id = unsafe { ctx.0.create_descriptor_set(create_info)? };
        Ok(Self { ctx, layout, id })
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::DescriptorSet {
        &self.id
    }

    #[inline(always)]
    pub fn layout(&self) -> &DescriptorSetLayout<B> {
        &self.layout
    }

    /// Updates the descriptor set with new values.
    ///
    /// # Arguments
    /// - `updates` - The updates to perform on the set.
    ///
    /// # Panics
    /// - If a binding does not exist in the layout of the set.
    /// - If a value does not match the type of its binding.
    /// - If a texture mip range is out of bounds or the texture lacks the required usage.
    ///
    /// # Errors
    /// Returns an error when the backend fails to rebuild the set, leaving it unbound.
    ///
    /// # Synchronization
    /// The backend *must* ensure that the descriptor set is not being accessed by any queue at the
    /// time of the update.
    pub fn update(
        &mut self,
        updates: &[DescriptorSetUpdate<B>],
    ) -> Result<(), DescriptorSetUpdateError> {
        for update in updates {
            let binding = self
                .layout
                .binding(update.binding)
                .unwrap_or_else(|| panic!("binding `{}` is not in the layout", update.binding));
            validate_value(binding, &update.value);
        }

        unsafe {
            self.ctx
                .0
                .update_descriptor_sets(&mut self.id, &self.layout.0.id, updates)
        }
    }
}

fn validate_value<B: Backend>(binding: &DescriptorBinding, value: &DescriptorValue<B>) {
    match (&binding.ty, value) {
        (DescriptorType::UniformBuffer, DescriptorValue::UniformBuffer { buffer, array_element }) => {
            assert!(
                *array_element < buffer.array_elements(),
                "uniform array element `{array_element}` is out of bounds"
            );
        }
        (
            DescriptorType::Texture { .. },
            DescriptorValue::Texture {
                texture,
                base_mip,
                mip_count,
            },
        ) => {
            assert!(
                texture.usage().contains(TextureUsage::SAMPLED),
                "texture bound to binding `{}` is not sampled",
                binding.binding
            );
            assert!(
                *mip_count > 0 && base_mip + mip_count <= texture.mip_count(),
                "mip range {base_mip}..{} is out of bounds",
                base_mip + mip_count
            );
        }
        (DescriptorType::Sampler { .. }, DescriptorValue::Sampler(_)) => {}
        (DescriptorType::StorageImage { format, .. }, DescriptorValue::StorageImage { texture, mip }) => {
            assert!(
                texture.usage().contains(TextureUsage::STORAGE),
                "texture bound to binding `{}` is not a storage image",
                binding.binding
            );
            assert_eq!(texture.format(), *format, "storage image format mismatch");
            assert!(*mip < texture.mip_count(), "storage mip `{mip}` is out of bounds");
        }
        (ty, _) => panic!(
            "value written to binding `{}` does not match `{ty:?}`",
            binding.binding
        ),
    }
}

impl<B: Backend> Drop for DescriptorSet<B> {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_descriptor_set(&mut self.id);
        }
    }
}

impl<B: Backend> DescriptorSetLayout<B> {
    #[inline(always)]
    pub fn new(
        ctx: Context<B>,
        create_info: DescriptorSetLayoutCreateInfo,
    ) -> Result<Self, DescriptorSetLayoutCreateError> {
        let bindings = create_info.bindings.clone();
        let id = unsafe { ctx.0.create_descriptor_set_layout(create_info)? };
        Ok(Self(Arc::new(DescriptorSetLayoutInner { ctx, bindings, id })))
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::DescriptorSetLayout {
        &self.0.id
    }

    #[inline(always)]
    pub fn bindings(&self) -> &[DescriptorBinding] {
        &self.0.bindings
    }

    #[inline(always)]
    pub fn binding(&self, binding: u32) -> Option<&DescriptorBinding> {
        self.0.bindings.iter().find(|b| b.binding == binding)
    }
}

impl<B: Backend> Clone for DescriptorSetLayout<B> {
    #[inline(always)]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<B: Backend> Drop for DescriptorSetLayoutInner<B> {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_descriptor_set_layout(&mut self.id);
        }
    }
}
