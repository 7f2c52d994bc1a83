use std::sync::Arc;

use crate::{
    context::Context, descriptor_set::DescriptorSetLayout, shader::Shader, types::Format, Backend,
};
use thiserror::Error;

/// The shader stages used by a graphics pipeline.
#[derive(Clone)]
pub struct ShaderStages<B: Backend> {
    pub vertex: Shader<B>,
    pub fragment: Shader<B>,
}

/// Pipelines draw triangle lists without vertex buffers. Vertex shaders are expected to generate
/// positions from the vertex index.
#[derive(Clone)]
pub struct GraphicsPipelineCreateInfo<B: Backend> {
    pub stages: ShaderStages<B>,
    pub layouts: Vec<DescriptorSetLayout<B>>,
    /// Formats of each color attachment the pipeline renders to.
    pub color_formats: Vec<Format>,
    /// The backend *should* use the provided debug name for easy identification.
    pub debug_name: Option<String>,
}

pub struct GraphicsPipeline<B: Backend>(pub(crate) Arc<GraphicsPipelineInner<B>>);

pub(crate) struct GraphicsPipelineInner<B: Backend> {
    ctx: Context<B>,
    pub(crate) layouts: Vec<DescriptorSetLayout<B>>,
    pub(crate) color_formats: Vec<Format>,
    pub(crate) debug_name: Option<String>,
    pub(crate) id: B::GraphicsPipeline,
}

#[derive(Debug, Error)]
pub enum GraphicsPipelineCreateError {
    #[error("no color attachments provided")]
    NoAttachments,
    #[error("an error occured: {0}")]
    Other(String),
}

impl<B: Backend> GraphicsPipeline<B> {
    /// Create a new graphics pipeline.
    ///
    /// # Arguments
    /// - `ctx` - The [`Context`] to create the pipeline with.
    /// - `create_info` - Describes the graphics pipeline to create.
    pub fn new(
        ctx: Context<B>,
        create_info: GraphicsPipelineCreateInfo<B>,
    ) -> Result<Self, GraphicsPipelineCreateError> {
        if create_info.color_formats.is_empty() {
            return Err(GraphicsPipelineCreateError::NoAttachments);
        }

        let layouts = create_info.layouts.clone();
        let color_formats = create_info.color_formats.clone();
        let debug_name = create_info.debug_name.clone();
        let id = unsafe { ctx.0.create_graphics_pipeline(create_info)? };
        Ok(Self(Arc::new(GraphicsPipelineInner {
            ctx,
            layouts,
            color_formats,
            debug_name,
            id,
        })))
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::GraphicsPipeline {
        &self.0.id
    }

    #[inline(always)]
    pub fn layouts(&self) -> &[DescriptorSetLayout<B>] {
        &self.0.layouts
    }

    #[inline(always)]
    pub fn color_formats(&self) -> &[Format] {
        &self.0.color_formats
    }

    #[inline(always)]
    pub fn debug_name(&self) -> Option<&str> {
        self.0.debug_name.as_deref()
    }
}

impl<B: Backend> Clone for GraphicsPipeline<B> {
    #[inline(always)]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<B: Backend> Drop for GraphicsPipelineInner<B> {
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_graphics_pipeline(&mut self.id);
        }
    }
}
