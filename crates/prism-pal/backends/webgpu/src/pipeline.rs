pub struct Shader {
    pub(crate) module: wgpu::ShaderModule,
    pub(crate) entry_point: String,
}

pub struct ComputePipeline {
    pub(crate) pipeline: wgpu::ComputePipeline,
}

pub struct GraphicsPipeline {
    pub(crate) pipeline: wgpu::RenderPipeline,
}
