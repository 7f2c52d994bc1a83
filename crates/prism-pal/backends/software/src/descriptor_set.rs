use std::sync::Arc;

use api::descriptor_set::{DescriptorBinding, DescriptorSetUpdate, DescriptorValue};

use crate::{
    kernel::{Bound, SetBindings},
    texture::TextureView,
    SoftwareBackend,
};

pub struct DescriptorSetLayout {
    pub(crate) bindings: Vec<DescriptorBinding>,
}

pub struct DescriptorSet {
    pub(crate) bindings: SetBindings,
}

impl DescriptorSet {
    pub(crate) fn new() -> Self {
        Self {
            bindings: Arc::default(),
        }
    }

    /// Sets bound to a command keep the values they had when bound, so updates never affect
    /// recorded work.
    pub(crate) fn update(&mut self, updates: &[DescriptorSetUpdate<SoftwareBackend>]) {
        let bindings = Arc::make_mut(&mut self.bindings);
        for update in updates {
            let bound = match &update.value {
                DescriptorValue::UniformBuffer {
                    buffer,
                    array_element,
                } => Bound::Uniform {
                    buffer: buffer.internal().clone(),
                    array_element: *array_element,
                },
                DescriptorValue::Texture {
                    texture,
                    base_mip,
                    mip_count,
                } => Bound::Texture(TextureView {
                    texture: texture.internal().clone(),
                    base_mip: *base_mip,
                    mip_count: *mip_count,
                }),
                DescriptorValue::Sampler(sampler) => Bound::Sampler(*sampler),
                DescriptorValue::StorageImage { texture, mip } => Bound::Storage {
                    texture: texture.internal().clone(),
                    mip: *mip,
                },
            };
            bindings.insert(update.binding, bound);
        }
    }
}
