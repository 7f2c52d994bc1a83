pub use api::Backend;

cfg_if::cfg_if! {
    if #[cfg(feature = "webgpu")] {
        /// The backend used when none is requested explicitly.
        pub type DefaultBackend = webgpu::WebGpuBackend;
    } else {
        pub type DefaultBackend = software::SoftwareBackend;
    }
}

pub mod backend {
    pub use software::{
        DispatchRecord, DrawRecord, Fragment, Invocation, Kernel, KernelTable, SoftwareBackend,
        SoftwareBackendCreateInfo, Texel, TextureView, TraceEvent, UniformRecord, VertexOutput,
    };

    #[cfg(feature = "webgpu")]
    pub use webgpu::{Backends, WebGpuBackend, WebGpuBackendCreateError, WebGpuBackendCreateInfo};
}

pub mod prelude {
    pub use api::types::*;
    pub use api::Backend;

    pub use api::context::{Context, GraphicsLimits, GraphicsProperties};

    // Render pass
    pub use api::render_pass::{
        ColorAttachment, ColorAttachmentDestination, RenderPass, RenderPassDescriptor,
    };

    // Command buffer
    pub use api::command_buffer::CommandBuffer;
    pub use api::compute_pass::ComputePass;

    // Queue
    pub use api::queue::{Job, Queue};

    // Shader
    pub use api::shader::{Shader, ShaderCreateError, ShaderCreateInfo};

    // Graphics pipeline
    pub use api::graphics_pipeline::{
        GraphicsPipeline, GraphicsPipelineCreateError, GraphicsPipelineCreateInfo, ShaderStages,
    };

    // Compute pipeline
    pub use api::compute_pipeline::{
        ComputePipeline, ComputePipelineCreateError, ComputePipelineCreateInfo,
    };

    // Buffer
    pub use api::buffer::{Buffer, BufferCreateError, BufferCreateInfo, BufferWriteError};

    // Texture
    pub use api::texture::{
        mip_dim, mip_level_count, Sampler, Texture, TextureCreateError, TextureCreateInfo,
        TextureTransferError,
    };

    // Descriptor set & layout
    pub use api::descriptor_set::{
        DescriptorBinding, DescriptorSet, DescriptorSetCreateError, DescriptorSetCreateInfo,
        DescriptorSetLayout, DescriptorSetLayoutCreateError, DescriptorSetLayoutCreateInfo,
        DescriptorSetUpdate, DescriptorSetUpdateError, DescriptorType, DescriptorValue,
    };
}
