use std::sync::Arc;

use crate::{context::Context, Backend};
use thiserror::Error;

pub struct ShaderCreateInfo<'a> {
    /// WGSL source of the module. Backends without a shader compiler *may* ignore the source and
    /// resolve the module by `entry_point` alone.
    pub code: &'a str,
    /// Name of the function invoked by pipelines built from this module.
    pub entry_point: &'a str,
    /// The backend *should* use the provided debug name for easy identification.
    pub debug_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ShaderCreateError {
    #[error("entry point `{0}` does not exist")]
    MissingEntryPoint(String),
    #[error("an error occured: {0}")]
    Other(String),
}

pub struct Shader<B: Backend>(pub(crate) Arc<ShaderInner<B>>);

pub(crate) struct ShaderInner<B: Backend> {
    ctx: Context<B>,
    entry_point: String,
    pub(crate) id: B::Shader,
}

impl<B: Backend> Shader<B> {
    /// Creates a new shader.
    ///
    /// # Arguments
    /// - `ctx` - The [`Context`] to create the shader with.
    /// - `create_info` - Describes the shader to create.
    #[inline(always)]
    pub fn new(
        ctx: Context<B>,
        create_info: ShaderCreateInfo<'_>,
    ) -> Result<Self, ShaderCreateError> {
        let entry_point = create_info.entry_point.to_owned();
        let id = unsafe { ctx.0.create_shader(create_info)? };
        Ok(Shader(Arc::new(ShaderInner {
            ctx,
            entry_point,
            id,
        })))
    }

    #[inline(always)]
    pub fn internal(&self) -> &B::Shader {
        &self.0.id
    }

    #[inline(always)]
    pub fn entry_point(&self) -> &str {
        &self.0.entry_point
    }
}

impl<B: Backend> Drop for ShaderInner<B> {
    fn drop(&mut self) {
        unsafe {
            self.ctx.0.destroy_shader(&mut self.id);
        }
    }
}

impl<B: Backend> Clone for Shader<B> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
