use prism_formats::environment::Environment;
use prism_log::info;
use prism_math::{Mat4, Vec3};
use prism_pal::prelude::*;
use prism_render_ibl::{EnvironmentPipeline, EnvironmentState, IblData};

use crate::{config::RendererSettings, error::RendererError};

/// Backend independent view of a renderer.
pub trait Renderer {
    /// Name the renderer was created under in the registry.
    fn backend_name(&self) -> &str;

    fn properties(&self) -> &GraphicsProperties;

    /// Preprocesses `environment` and binds the result for shading. On failure the previously
    /// bound lighting is kept.
    fn update_environment(&mut self, environment: &Environment) -> Result<(), RendererError>;

    fn environment_state(&self) -> EnvironmentState;

    /// Rotation applied to the environment when shading.
    fn environment_transform(&self) -> Mat4;

    /// Rotates the environment about +Y. The baked lighting data is untouched.
    fn set_environment_rotation(&mut self, radians: f32);

    /// Copies every mip of the bound lighting data back to the host.
    fn read_ibl(&self) -> Result<IblData, RendererError>;
}

/// [`Renderer`] over any Pal backend.
pub struct IblRenderer<B: Backend> {
    name: String,
    ctx: Context<B>,
    environment: EnvironmentPipeline<B>,
    current: Option<Environment>,
    rotation: f32,
}

impl<B: Backend> IblRenderer<B> {
    pub fn new(
        name: impl Into<String>,
        ctx: Context<B>,
        settings: &RendererSettings,
    ) -> Result<Self, RendererError> {
        let name = name.into();
        info!(
            "creating `{name}` renderer on `{}`",
            ctx.properties().adapter_name
        );
        let environment = EnvironmentPipeline::new(&ctx, settings.ibl)?;
        Ok(Self {
            name,
            ctx,
            environment,
            current: None,
            rotation: 0.0,
        })
    }

    #[inline(always)]
    pub fn ctx(&self) -> &Context<B> {
        &self.ctx
    }

    #[inline(always)]
    pub fn environment(&self) -> &EnvironmentPipeline<B> {
        &self.environment
    }

    /// The environment whose lighting is currently bound.
    #[inline(always)]
    pub fn current_environment(&self) -> Option<&Environment> {
        self.current.as_ref()
    }
}

impl<B: Backend> Renderer for IblRenderer<B> {
    fn backend_name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> &GraphicsProperties {
        self.ctx.properties()
    }

    fn update_environment(&mut self, environment: &Environment) -> Result<(), RendererError> {
        self.environment.load_environment(environment)?;
        self.rotation = environment.rotation();
        self.current = Some(environment.clone());
        Ok(())
    }

    fn environment_state(&self) -> EnvironmentState {
        self.environment.state()
    }

    fn environment_transform(&self) -> Mat4 {
        Mat4::from_axis_angle(Vec3::Y, self.rotation)
    }

    fn set_environment_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        if let Some(current) = &mut self.current {
            current.set_rotation(radians);
        }
    }

    fn read_ibl(&self) -> Result<IblData, RendererError> {
        Ok(self.environment.ibl().read_back()?)
    }
}
