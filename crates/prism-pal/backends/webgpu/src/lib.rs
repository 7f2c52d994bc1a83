use std::{sync::Mutex, time::Duration};

use api::{
    buffer::{BufferCreateError, BufferCreateInfo, BufferWriteError},
    command_buffer::Command,
    compute_pipeline::{ComputePipelineCreateError, ComputePipelineCreateInfo},
    context::{GraphicsLimits, GraphicsProperties},
    descriptor_set::{
        DescriptorSetCreateError, DescriptorSetCreateInfo, DescriptorSetLayoutCreateError,
        DescriptorSetLayoutCreateInfo, DescriptorSetUpdate, DescriptorSetUpdateError,
    },
    graphics_pipeline::{GraphicsPipelineCreateError, GraphicsPipelineCreateInfo},
    shader::{ShaderCreateError, ShaderCreateInfo},
    texture::{TextureCreateError, TextureCreateInfo, TextureTransferError},
    types::{BufferUsage, JobStatus, QueueType},
    Backend,
};
use buffer::Buffer;
use descriptor_set::{DescriptorSet, DescriptorSetLayout};
use pipeline::{ComputePipeline, GraphicsPipeline, Shader};
use prism_log::{error, info};
use queue::Job;
use sampler_cache::SamplerCache;
use texture::Texture;
use thiserror::Error;
use util::*;

pub use wgpu::Backends;

pub mod buffer;
pub mod descriptor_set;
pub mod pipeline;
pub mod queue;
pub mod texture;

mod sampler_cache;
mod util;

pub struct WebGpuBackendCreateInfo {
    /// Native APIs the adapter may be chosen from.
    pub backends: wgpu::Backends,
    /// Allow falling back to a software adapter when no hardware adapter is found.
    pub allow_fallback_adapter: bool,
}

#[derive(Debug, Error)]
pub enum WebGpuBackendCreateError {
    #[error("no suitable graphics adapter was found")]
    NoAdapter,
    #[error("unable to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Pal on top of [wgpu](https://wgpu.rs). Both queue types share the single wgpu queue.
pub struct WebGpuBackend {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) properties: GraphicsProperties,
    pub(crate) samplers: Mutex<SamplerCache>,
}

impl WebGpuBackend {
    pub fn new(create_info: WebGpuBackendCreateInfo) -> Result<Self, WebGpuBackendCreateError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: create_info.backends,
            ..Default::default()
        });

        let adapter = match pollster::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        )) {
            Some(adapter) => adapter,
            None if create_info.allow_fallback_adapter => {
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::LowPower,
                    compatible_surface: None,
                    force_fallback_adapter: true,
                }))
                .ok_or(WebGpuBackendCreateError::NoAdapter)?
            }
            None => return Err(WebGpuBackendCreateError::NoAdapter),
        };

        let adapter_info = adapter.get_info();
        info!(
            "using adapter `{}` ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("prism_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::default()
                },
                ..Default::default()
            },
            None,
        ))?;

        device.on_uncaptured_error(Box::new(|err| {
            error!("wgpu error: {err}");
        }));

        let limits = device.limits();
        Ok(Self {
            properties: GraphicsProperties {
                adapter_name: adapter_info.name,
                limits: GraphicsLimits {
                    max_texture_dimension_2d: limits.max_texture_dimension_2d,
                    min_uniform_buffer_offset_alignment: limits
                        .min_uniform_buffer_offset_alignment
                        as u64,
                },
            },
            device,
            queue,
            samplers: Mutex::new(SamplerCache::default()),
        })
    }

    /// Runs `create` inside out of memory and validation error scopes.
    pub(crate) fn scoped<T>(&self, create: impl FnOnce() -> T) -> Result<T, ScopeError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create();

        // Scopes pop in reverse order.
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if out_of_memory.is_some() {
            return Err(ScopeError::OutOfMemory);
        }
        match validation {
            Some(err) => Err(ScopeError::Invalid(err.to_string())),
            None => Ok(value),
        }
    }
}

/// An error captured by [`WebGpuBackend::scoped`].
#[derive(Debug, Error)]
pub(crate) enum ScopeError {
    #[error("out of device memory")]
    OutOfMemory,
    #[error("{0}")]
    Invalid(String),
}

impl From<ScopeError> for BufferCreateError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::OutOfMemory => BufferCreateError::OutOfMemory,
            ScopeError::Invalid(msg) => BufferCreateError::Other(msg),
        }
    }
}

impl From<ScopeError> for TextureCreateError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::OutOfMemory => TextureCreateError::OutOfMemory,
            ScopeError::Invalid(msg) => TextureCreateError::Other(msg),
        }
    }
}

impl From<ScopeError> for DescriptorSetUpdateError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::OutOfMemory => DescriptorSetUpdateError::OutOfMemory,
            ScopeError::Invalid(msg) => DescriptorSetUpdateError::Other(msg),
        }
    }
}

impl Backend for WebGpuBackend {
    type Buffer = Buffer;
    type Texture = Texture;
    type Shader = Shader;
    type GraphicsPipeline = GraphicsPipeline;
    type ComputePipeline = ComputePipeline;
    type DescriptorSetLayout = DescriptorSetLayout;
    type DescriptorSet = DescriptorSet;
    type Job = Job;

    unsafe fn properties(&self) -> &GraphicsProperties {
        &self.properties
    }

    unsafe fn submit_commands(
        &self,
        _queue: QueueType,
        debug_name: Option<&str>,
        commands: Vec<Command<'_, Self>>,
    ) -> Self::Job {
        let command_buffer = queue::encode(&self.device, debug_name, commands);
        Job {
            index: self.queue.submit(Some(command_buffer)),
        }
    }

    /// wgpu can't wait with a timeout, so this always blocks until the job is complete.
    unsafe fn wait_on(&self, job: &Self::Job, _timeout: Option<Duration>) -> JobStatus {
        self.device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(job.index.clone()));
        JobStatus::Complete
    }

    /// Reports completion only once the whole queue is empty.
    unsafe fn poll_status(&self, _job: &Self::Job) -> JobStatus {
        if self.device.poll(wgpu::Maintain::Poll).is_queue_empty() {
            JobStatus::Complete
        } else {
            JobStatus::Running
        }
    }

    unsafe fn wait_idle(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    unsafe fn create_buffer(
        &self,
        create_info: BufferCreateInfo,
    ) -> Result<Self::Buffer, BufferCreateError> {
        let stride = align_up(
            create_info.size,
            self.properties.limits.min_uniform_buffer_offset_alignment,
        );

        let mut usage = wgpu::BufferUsages::empty();
        if create_info.buffer_usage.contains(BufferUsage::UNIFORM_BUFFER) {
            usage |= wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST;
        }
        if create_info.buffer_usage.contains(BufferUsage::TRANSFER_DST) {
            usage |= wgpu::BufferUsages::COPY_DST;
        }
        if create_info.buffer_usage.contains(BufferUsage::TRANSFER_SRC) {
            usage |= wgpu::BufferUsages::COPY_SRC;
        }

        let buffer = self
            .scoped(|| {
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: create_info.debug_name.as_deref(),
                    size: stride * create_info.array_elements as u64,
                    usage,
                    mapped_at_creation: false,
                })
            })?;

        Ok(Buffer {
            buffer,
            size: create_info.size,
            stride,
        })
    }

    unsafe fn create_texture(
        &self,
        create_info: TextureCreateInfo,
    ) -> Result<Self::Texture, TextureCreateError> {
        let texture = self
            .scoped(|| {
                self.device.create_texture(&wgpu::TextureDescriptor {
                    label: create_info.debug_name.as_deref(),
                    size: wgpu::Extent3d {
                        width: create_info.width,
                        height: create_info.height,
                        depth_or_array_layers: create_info.array_elements as u32,
                    },
                    mip_level_count: create_info.mip_levels as u32,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: to_wgpu_format(create_info.format),
                    usage: to_wgpu_texture_usage(create_info.texture_usage),
                    view_formats: &[],
                })
            })?;

        Ok(Texture {
            texture,
            format: create_info.format,
            mip_count: create_info.mip_levels,
        })
    }

    unsafe fn create_shader(
        &self,
        create_info: ShaderCreateInfo,
    ) -> Result<Self::Shader, ShaderCreateError> {
        let module = self
            .scoped(|| {
                self.device
                    .create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: create_info.debug_name.as_deref(),
                        source: wgpu::ShaderSource::Wgsl(create_info.code.into()),
                    })
            })
            .map_err(|err| ShaderCreateError::Other(err.to_string()))?;

        Ok(Shader {
            module,
            entry_point: create_info.entry_point.to_owned(),
        })
    }

    unsafe fn create_graphics_pipeline(
        &self,
        create_info: GraphicsPipelineCreateInfo<Self>,
    ) -> Result<Self::GraphicsPipeline, GraphicsPipelineCreateError> {
        let layouts: Vec<_> = create_info
            .layouts
            .iter()
            .map(|layout| &layout.internal().layout)
            .collect();
        let targets: Vec<_> = create_info
            .color_formats
            .iter()
            .map(|format| {
                Some(wgpu::ColorTargetState {
                    format: to_wgpu_format(*format),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();
        let vertex = create_info.stages.vertex.internal();
        let fragment = create_info.stages.fragment.internal();

        let pipeline = self
            .scoped(|| {
                let layout = self
                    .device
                    .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: create_info.debug_name.as_deref(),
                        bind_group_layouts: &layouts,
                        push_constant_ranges: &[],
                    });
                self.device
                    .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: create_info.debug_name.as_deref(),
                        layout: Some(&layout),
                        vertex: wgpu::VertexState {
                            module: &vertex.module,
                            entry_point: Some(vertex.entry_point.as_str()),
                            compilation_options: Default::default(),
                            buffers: &[],
                        },
                        primitive: wgpu::PrimitiveState::default(),
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState::default(),
                        fragment: Some(wgpu::FragmentState {
                            module: &fragment.module,
                            entry_point: Some(fragment.entry_point.as_str()),
                            compilation_options: Default::default(),
                            targets: &targets,
                        }),
                        multiview: None,
                        cache: None,
                    })
            })
            .map_err(|err| GraphicsPipelineCreateError::Other(err.to_string()))?;

        Ok(GraphicsPipeline { pipeline })
    }

    unsafe fn create_compute_pipeline(
        &self,
        create_info: ComputePipelineCreateInfo<Self>,
    ) -> Result<Self::ComputePipeline, ComputePipelineCreateError> {
        let layouts: Vec<_> = create_info
            .layouts
            .iter()
            .map(|layout| &layout.internal().layout)
            .collect();
        let module = create_info.module.internal();

        let pipeline = self
            .scoped(|| {
                let layout = self
                    .device
                    .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: create_info.debug_name.as_deref(),
                        bind_group_layouts: &layouts,
                        push_constant_ranges: &[],
                    });
                self.device
                    .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                        label: create_info.debug_name.as_deref(),
                        layout: Some(&layout),
                        module: &module.module,
                        entry_point: Some(module.entry_point.as_str()),
                        compilation_options: Default::default(),
                        cache: None,
                    })
            })
            .map_err(|err| ComputePipelineCreateError::Other(err.to_string()))?;

        Ok(ComputePipeline { pipeline })
    }

    unsafe fn create_descriptor_set(
        &self,
        create_info: DescriptorSetCreateInfo<Self>,
    ) -> Result<Self::DescriptorSet, DescriptorSetCreateError> {
        Ok(DescriptorSet {
            debug_name: create_info.debug_name,
            resources: Default::default(),
            bind_group: None,
        })
    }

    unsafe fn create_descriptor_set_layout(
        &self,
        create_info: DescriptorSetLayoutCreateInfo,
    ) -> Result<Self::DescriptorSetLayout, DescriptorSetLayoutCreateError> {
        let entries: Vec<_> = create_info
            .bindings
            .iter()
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding: binding.binding,
                visibility: to_wgpu_shader_stages(binding.stage),
                ty: to_wgpu_binding_type(binding.ty),
                count: None,
            })
            .collect();

        let layout = self
            .scoped(|| {
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: None,
                        entries: &entries,
                    })
            })
            .map_err(|err| DescriptorSetLayoutCreateError::Other(err.to_string()))?;

        Ok(DescriptorSetLayout {
            layout,
            bindings: create_info.bindings,
        })
    }

    // Descriptor sets hold their own references to buffers and views, so resources are released
    // when the last of them is dropped.
    unsafe fn destroy_buffer(&self, _id: &mut Self::Buffer) {}

    unsafe fn destroy_texture(&self, _id: &mut Self::Texture) {}

    unsafe fn destroy_shader(&self, _id: &mut Self::Shader) {}

    unsafe fn destroy_graphics_pipeline(&self, _id: &mut Self::GraphicsPipeline) {}

    unsafe fn destroy_compute_pipeline(&self, _id: &mut Self::ComputePipeline) {}

    unsafe fn destroy_descriptor_set(&self, _id: &mut Self::DescriptorSet) {}

    unsafe fn destroy_descriptor_set_layout(&self, _id: &mut Self::DescriptorSetLayout) {}

    unsafe fn write_buffer(
        &self,
        id: &Self::Buffer,
        array_element: usize,
        data: &[u8],
    ) -> Result<(), BufferWriteError> {
        self.queue
            .write_buffer(&id.buffer, id.offset(array_element), data);
        Ok(())
    }

    unsafe fn write_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
        data: &[u8],
    ) -> Result<(), TextureTransferError> {
        let (width, height) = id.mip_dims(mip_level);
        self.queue.write_texture(
            id.copy_info(array_element, mip_level),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * id.format.texel_size() as u32),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    unsafe fn read_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
    ) -> Result<Vec<u8>, TextureTransferError> {
        id.read(&self.device, &self.queue, array_element, mip_level)
    }

    unsafe fn texture_size(&self, id: &Self::Texture) -> u64 {
        (0..id.mip_count)
            .map(|mip| {
                let (width, height) = id.mip_dims(mip);
                width as u64 * height as u64 * id.format.texel_size() as u64
            })
            .sum()
    }

    unsafe fn update_descriptor_sets(
        &self,
        id: &mut Self::DescriptorSet,
        layout: &Self::DescriptorSetLayout,
        updates: &[DescriptorSetUpdate<Self>],
    ) -> Result<(), DescriptorSetUpdateError> {
        id.update(self, layout, updates)
    }
}

#[cfg(test)]
mod tests;
