//! Pal is a graphics and compute library inspired by [Vulkan](https://www.vulkan.org/) and
//! [wgpu](https://github.com/gfx-rs/wgpu).
//!
//! To start using Pal, you must first choose a [`Backend`] and then create a
//! [`Context`](struct@context::Context).
//!
//! The key words *must*, *should* and *may* in the documentation of this crate are to be
//! interpreted as described in [RFC 2119](https://www.ietf.org/rfc/rfc2119.txt).

pub mod buffer;
pub mod command_buffer;
pub mod compute_pass;
pub mod compute_pipeline;
pub mod context;
pub mod descriptor_set;
pub mod graphics_pipeline;
pub mod queue;
pub mod render_pass;
pub mod shader;
pub mod texture;
pub mod types;

use std::time::Duration;

use buffer::{BufferCreateError, BufferCreateInfo, BufferWriteError};
use command_buffer::Command;
use compute_pipeline::{ComputePipelineCreateError, ComputePipelineCreateInfo};
use context::GraphicsProperties;
use descriptor_set::{
    DescriptorSetCreateError, DescriptorSetCreateInfo, DescriptorSetLayoutCreateError,
    DescriptorSetLayoutCreateInfo, DescriptorSetUpdate, DescriptorSetUpdateError,
};
use graphics_pipeline::{GraphicsPipelineCreateError, GraphicsPipelineCreateInfo};
use shader::{ShaderCreateError, ShaderCreateInfo};
use texture::{TextureCreateError, TextureCreateInfo, TextureTransferError};
use types::{JobStatus, QueueType};

/// A device capable of running the compute and render work submitted through Pal.
///
/// Every method is called by the safe wrappers of this crate after argument validation. Backends
/// *may* assume the wrappers' documented panics have already been checked. Commands submitted to
/// any queue *must* observe the effects of every previously submitted command.
#[allow(clippy::missing_safety_doc)]
pub trait Backend: Sized + 'static {
    type Buffer;
    type Texture;
    type Shader;
    type GraphicsPipeline;
    type ComputePipeline;
    type DescriptorSetLayout;
    type DescriptorSet;
    type Job;

    unsafe fn properties(&self) -> &GraphicsProperties;

    unsafe fn submit_commands(
        &self,
        queue: QueueType,
        debug_name: Option<&str>,
        commands: Vec<Command<'_, Self>>,
    ) -> Self::Job;
    unsafe fn wait_on(&self, job: &Self::Job, timeout: Option<Duration>) -> JobStatus;
    unsafe fn poll_status(&self, job: &Self::Job) -> JobStatus;
    unsafe fn wait_idle(&self);

    unsafe fn create_buffer(
        &self,
        create_info: BufferCreateInfo,
    ) -> Result<Self::Buffer, BufferCreateError>;
    unsafe fn create_texture(
        &self,
        create_info: TextureCreateInfo,
    ) -> Result<Self::Texture, TextureCreateError>;
    unsafe fn create_shader(
        &self,
        create_info: ShaderCreateInfo,
    ) -> Result<Self::Shader, ShaderCreateError>;
    unsafe fn create_graphics_pipeline(
        &self,
        create_info: GraphicsPipelineCreateInfo<Self>,
    ) -> Result<Self::GraphicsPipeline, GraphicsPipelineCreateError>;
    unsafe fn create_compute_pipeline(
        &self,
        create_info: ComputePipelineCreateInfo<Self>,
    ) -> Result<Self::ComputePipeline, ComputePipelineCreateError>;
    unsafe fn create_descriptor_set(
        &self,
        create_info: DescriptorSetCreateInfo<Self>,
    ) -> Result<Self::DescriptorSet, DescriptorSetCreateError>;
    unsafe fn create_descriptor_set_layout(
        &self,
        create_info: DescriptorSetLayoutCreateInfo,
    ) -> Result<Self::DescriptorSetLayout, DescriptorSetLayoutCreateError>;
    unsafe fn destroy_buffer(&self, id: &mut Self::Buffer);
    unsafe fn destroy_texture(&self, id: &mut Self::Texture);
    unsafe fn destroy_shader(&self, id: &mut Self::Shader);
    unsafe fn destroy_graphics_pipeline(&self, id: &mut Self::GraphicsPipeline);
    unsafe fn destroy_compute_pipeline(&self, id: &mut Self::ComputePipeline);
    unsafe fn destroy_descriptor_set(&self, id: &mut Self::DescriptorSet);
    unsafe fn destroy_descriptor_set_layout(&self, id: &mut Self::DescriptorSetLayout);

    unsafe fn write_buffer(
        &self,
        id: &Self::Buffer,
        array_element: usize,
        data: &[u8],
    ) -> Result<(), BufferWriteError>;
    unsafe fn write_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
        data: &[u8],
    ) -> Result<(), TextureTransferError>;
    unsafe fn read_texture(
        &self,
        id: &Self::Texture,
        array_element: usize,
        mip_level: usize,
    ) -> Result<Vec<u8>, TextureTransferError>;

    unsafe fn texture_size(&self, id: &Self::Texture) -> u64;

    unsafe fn update_descriptor_sets(
        &self,
        id: &mut Self::DescriptorSet,
        layout: &Self::DescriptorSetLayout,
        updates: &[DescriptorSetUpdate<Self>],
    ) -> Result<(), DescriptorSetUpdateError>;
}
