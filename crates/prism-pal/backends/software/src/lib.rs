//! A CPU implementation of Pal. Shader entry points resolve to Rust kernels registered in a
//! [`KernelTable`], and every submission is executed synchronously. The backend records a trace
//! of what it was asked to do so callers can inspect submissions and dispatches.

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
    types::{JobStatus, QueueType},
    Backend,
};
use prism_log::debug;

pub mod buffer;
pub mod descriptor_set;
pub mod exec;
pub mod kernel;
pub mod pipeline;
pub mod texture;
pub mod trace;

pub use kernel::*;
pub use texture::{Texel, TextureView};
pub use trace::*;

use buffer::Buffer;
use descriptor_set::{DescriptorSet, DescriptorSetLayout};
use pipeline::{ComputePipeline, GraphicsPipeline, Shader};
use texture::Texture;

pub struct SoftwareBackendCreateInfo {
    /// Kernels that shader entry points resolve to.
    pub kernels: KernelTable,
    pub limits: GraphicsLimits,
}

pub struct SoftwareBackend {
    properties: GraphicsProperties,
    kernels: KernelTable,
    trace: Mutex<Vec<TraceEvent>>,
}

impl SoftwareBackend {
    pub fn new(create_info: SoftwareBackendCreateInfo) -> Self {
        Self {
            properties: GraphicsProperties {
                adapter_name: String::from("software"),
                limits: create_info.limits,
            },
            kernels: create_info.kernels,
            trace: Mutex::new(Vec::default()),
        }
    }

    /// A copy of every event recorded so far.
    pub fn trace(&self) -> Vec<TraceEvent> {
        self.trace.lock().unwrap().clone()
    }

    /// Returns and clears the recorded events.
    pub fn take_trace(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.trace.lock().unwrap())
    }
}

impl Default for SoftwareBackendCreateInfo {
    fn default() -> Self {
        Self {
            kernels: KernelTable::default(),
            limits: GraphicsLimits {
                max_texture_dimension_2d: 8192,
                min_uniform_buffer_offset_alignment: 256,
            },
        }
    }
}

impl Backend for SoftwareBackend {
    type Buffer = Buffer;
    type Texture = Texture;
    type Shader = Shader;
    type GraphicsPipeline = GraphicsPipeline;
    type ComputePipeline = ComputePipeline;
    type DescriptorSetLayout = DescriptorSetLayout;
    type DescriptorSet = DescriptorSet;
    type Job = ();

    unsafe fn properties(&self) -> &GraphicsProperties {
        &self.properties
    }

    unsafe fn submit_commands(
        &self,
        queue: QueueType,
        debug_name: Option<&str>,
        commands: Vec<Command<'_, Self>>,
    ) -> Self::Job {
        debug!("executing `{}` on {queue:?}", debug_name.unwrap_or("unnamed"));
        let events = exec::Executor::default().run(commands);

        let mut trace = self.trace.lock().unwrap();
        trace.push(TraceEvent::Submit {
            queue,
            debug_name: debug_name.map(String::from),
        });
        trace.extend(events);
    }

    unsafe fn wait_on(&self, _job: &Self::Job, _timeout: Option<Duration>) -> JobStatus {
        JobStatus::Complete
    }

    unsafe fn poll_status(&self, _job: &Self::Job) -> JobStatus {
        JobStatus::Complete
    }

    unsafe fn wait_idle(&self) {}

    unsafe fn create_buffer(
        &self,
        create_info: BufferCreateInfo,
    ) -> Result<Self::Buffer, BufferCreateError> {
        Ok(Buffer::new(create_info.size, create_info.array_elements))
    }

    unsafe fn create_texture(
        &self,
        create_info: TextureCreateInfo,
    ) -> Result<Self::Texture, TextureCreateError> {
        debug!(
            "creating {}x{} texture `{}`",
            create_info.width,
            create_info.height,
            create_info.debug_name.as_deref().unwrap_or("unnamed")
        );
        Ok(Texture::new(create_info))
    }

    unsafe fn create_shader(
        &self,
        create_info: ShaderCreateInfo,
    ) -> Result<Self::Shader, ShaderCreateError> {
        match self.kernels.get(create_info.entry_point) {
            Some(kernel) => Ok(Shader {
                entry_point: create_info.entry_point.to_owned(),
                kernel,
            }),
            None => Err(ShaderCreateError::MissingEntryPoint(
                create_info.entry_point.to_owned(),
            )),
        }
    }

    unsafe fn create_graphics_pipeline(
        &self,
        create_info: GraphicsPipelineCreateInfo<Self>,
    ) -> Result<Self::GraphicsPipeline, GraphicsPipelineCreateError> {
        let vertex = create_info.stages.vertex.internal();
        let fragment = create_info.stages.fragment.internal();
        let (vertex, fragment) = match (vertex.kernel, fragment.kernel) {
            (Kernel::Vertex(vertex), Kernel::Fragment(fragment)) => (vertex, fragment),
            _ => {
                return Err(GraphicsPipelineCreateError::Other(format!(
                    "`{}` and `{}` are not a vertex and fragment pair",
                    vertex.entry_point, fragment.entry_point
                )))
            }
        };

        Ok(GraphicsPipeline {
            vertex,
            fragment,
            layouts: create_info
                .layouts
                .iter()
                .map(|layout| layout.internal().bindings.clone())
                .collect(),
            debug_name: create_info.debug_name,
        })
    }

    unsafe fn create_compute_pipeline(
        &self,
        create_info: ComputePipelineCreateInfo<Self>,
    ) -> Result<Self::ComputePipeline, ComputePipelineCreateError> {
        let shader = create_info.module.internal();
        let kernel = match shader.kernel {
            Kernel::Compute(kernel) => kernel,
            _ => {
                return Err(ComputePipelineCreateError::Other(format!(
                    "`{}` is not a compute kernel",
                    shader.entry_point
                )))
            }
        };

        Ok(ComputePipeline {
            kernel,
            layouts: create_info
                .layouts
                .iter()
                .map(|layout| layout.internal().bindings.clone())
                .collect(),
            work_group_size: create_info.work_group_size,
            debug_name: create_info.debug_name,
        })
    }

    unsafe fn create_descriptor_set(
        &self,
        _create_info: DescriptorSetCreateInfo<Self>,
    ) -> Result<Self::DescriptorSet, DescriptorSetCreateError> {
        Ok(DescriptorSet::new())
    }

    unsafe fn create_descriptor_set_layout(
        &self,
        create_info: DescriptorSetLayoutCreateInfo,
    ) -> Result<Self::DescriptorSetLayout, DescriptorSetLayoutCreateError> {
        Ok(DescriptorSetLayout {
            bindings: create_info.bindings,
        })
    }

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
        id.write(array_element, data);
        Ok(())
    }

    unsafe fn write_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
        data: &[u8],
    ) -> Result<(), TextureTransferError> {
        id.write_bytes(array_element, mip_level, data)
    }

    unsafe fn read_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
    ) -> Result<Vec<u8>, TextureTransferError> {
        Ok(id.read_bytes(array_element, mip_level))
    }

    unsafe fn texture_size(&self, id: &Self::Texture) -> u64 {
        id.size()
    }

    unsafe fn update_descriptor_sets(
        &self,
        id: &mut Self::DescriptorSet,
        _layout: &Self::DescriptorSetLayout,
        updates: &[DescriptorSetUpdate<Self>],
    ) -> Result<(), DescriptorSetUpdateError> {
        id.update(updates);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
