use api::{
    descriptor_set::{
        DescriptorBinding, DescriptorSetUpdate, DescriptorSetUpdateError, DescriptorType,
        DescriptorValue,
    },
    types::ViewDimension,
};
use rustc_hash::FxHashMap;

use crate::{util::to_wgpu_view_dimension, WebGpuBackend};

pub struct DescriptorSetLayout {
    pub(crate) layout: wgpu::BindGroupLayout,
    pub(crate) bindings: Vec<DescriptorBinding>,
}

/// Bind groups are immutable, so the set keeps every bound resource and rebuilds its bind group
/// once all bindings of the layout are filled.
pub struct DescriptorSet {
    pub(crate) debug_name: Option<String>,
    pub(crate) resources: FxHashMap<u32, Resource>,
    pub(crate) bind_group: Option<wgpu::BindGroup>,
}

pub(crate) enum Resource {
    Buffer {
        buffer: wgpu::Buffer,
        offset: u64,
        size: u64,
    },
    View(wgpu::TextureView),
    Sampler(wgpu::Sampler),
}

impl DescriptorSet {
    pub(crate) fn update(
        &mut self,
        backend: &WebGpuBackend,
        layout: &DescriptorSetLayout,
        updates: &[DescriptorSetUpdate<WebGpuBackend>],
    ) -> Result<(), DescriptorSetUpdateError> {
        for update in updates {
            let dimension = match layout
                .bindings
                .iter()
                .find(|binding| binding.binding == update.binding)
                .map(|binding| binding.ty)
            {
                Some(DescriptorType::Texture { dimension, .. })
                | Some(DescriptorType::StorageImage { dimension, .. }) => dimension,
                _ => ViewDimension::D2,
            };

            let resource = match &update.value {
                DescriptorValue::UniformBuffer {
                    buffer,
                    array_element,
                } => {
                    let buffer = buffer.internal();
                    Resource::Buffer {
                        buffer: buffer.buffer.clone(),
                        offset: buffer.offset(*array_element),
                        size: buffer.size,
                    }
                }
                DescriptorValue::Texture {
                    texture,
                    base_mip,
                    mip_count,
                } => Resource::View(texture.internal().texture.create_view(
                    &wgpu::TextureViewDescriptor {
                        label: self.debug_name.as_deref(),
                        dimension: Some(to_wgpu_view_dimension(dimension)),
                        base_mip_level: *base_mip as u32,
                        mip_level_count: Some(*mip_count as u32),
                        ..Default::default()
                    },
                )),
                DescriptorValue::Sampler(sampler) => Resource::Sampler(
                    backend
                        .samplers
                        .lock()
                        .unwrap()
                        .get(&backend.device, *sampler),
                ),
                DescriptorValue::StorageImage { texture, mip } => Resource::View(
                    texture
                        .internal()
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor {
                            label: self.debug_name.as_deref(),
                            dimension: Some(to_wgpu_view_dimension(dimension)),
                            base_mip_level: *mip as u32,
                            mip_level_count: Some(1),
                            ..Default::default()
                        }),
                ),
            };
            self.resources.insert(update.binding, resource);
        }

        self.bind_group = None;
        if !layout
            .bindings
            .iter()
            .all(|binding| self.resources.contains_key(&binding.binding))
        {
            return Ok(());
        }

        let entries: Vec<_> = layout
            .bindings
            .iter()
            .filter_map(|binding| {
                let resource = match self.resources.get(&binding.binding)? {
                    Resource::Buffer {
                        buffer,
                        offset,
                        size,
                    } => wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: *offset,
                        size: wgpu::BufferSize::new(*size),
                    }),
                    Resource::View(view) => wgpu::BindingResource::TextureView(view),
                    Resource::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
                };
                Some(wgpu::BindGroupEntry {
                    binding: binding.binding,
                    resource,
                })
            })
            .collect();

        let bind_group = backend.scoped(|| {
            backend.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: self.debug_name.as_deref(),
                layout: &layout.layout,
                entries: &entries,
            })
        })?;
        self.bind_group = Some(bind_group);

        Ok(())
    }
}
