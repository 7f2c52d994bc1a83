use prism_pal::prelude::*;
use thiserror::Error;

/// Failure to create or fill one of the resources used while preprocessing an environment.
#[derive(Debug, Error)]
pub enum IblError {
    #[error("shader creation failed: {0}")]
    Shader(#[from] ShaderCreateError),
    #[error("compute pipeline creation failed: {0}")]
    ComputePipeline(#[from] ComputePipelineCreateError),
    #[error("graphics pipeline creation failed: {0}")]
    GraphicsPipeline(#[from] GraphicsPipelineCreateError),
    #[error("descriptor set layout creation failed: {0}")]
    Layout(#[from] DescriptorSetLayoutCreateError),
    #[error("descriptor set creation failed: {0}")]
    DescriptorSet(#[from] DescriptorSetCreateError),
    #[error("descriptor set update failed: {0}")]
    DescriptorSetUpdate(#[from] DescriptorSetUpdateError),
    #[error("buffer creation failed: {0}")]
    Buffer(#[from] BufferCreateError),
    #[error("texture creation failed: {0}")]
    Texture(#[from] TextureCreateError),
    #[error("texture transfer failed: {0}")]
    Transfer(#[from] TextureTransferError),
    #[error("invalid IBL settings: {0}")]
    Settings(String),
}
