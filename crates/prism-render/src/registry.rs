use prism_log::{error, info};
use prism_pal::{
    backend::{SoftwareBackend, SoftwareBackendCreateInfo},
    prelude::*,
};
use rustc_hash::FxHashMap;

use crate::{
    config::RendererSettings,
    error::{RegistryError, RendererError},
    renderer::{IblRenderer, Renderer},
};

/// Backend used when the caller does not name one.
pub const DEFAULT_BACKEND: &str = "webgpu";

/// Creates a renderer for a single backend.
pub type RendererFactory = fn(&RendererSettings) -> Result<Box<dyn Renderer>, RendererError>;

/// Maps backend names to the factories that create them. Nothing is registered implicitly.
#[derive(Default)]
pub struct BackendRegistry {
    factories: FxHashMap<String, RendererFactory>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing every backend this build supports.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "webgpu")]
        {
            registry.factories.insert("webgpu".into(), webgpu);
            registry.factories.insert("vulkan".into(), vulkan);
        }
        registry.factories.insert("software".into(), software);

        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: RendererFactory,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    #[inline(always)]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Names of every registered backend in alphabetical order.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Creates the renderer registered as `name`, or [`DEFAULT_BACKEND`] when `name` is `None`.
    pub fn create(
        &self,
        name: Option<&str>,
        settings: &RendererSettings,
    ) -> Result<Box<dyn Renderer>, RegistryError> {
        let name = name.unwrap_or(DEFAULT_BACKEND);
        let factory = match self.factories.get(name) {
            Some(factory) => factory,
            None => {
                let available = self.available_backends();
                error!("unknown backend `{name}`, available backends are {available:?}");
                return Err(RegistryError::Unknown {
                    name: name.into(),
                    available,
                });
            }
        };

        info!("creating renderer with backend `{name}`");
        Ok(factory(settings)?)
    }
}

#[cfg(feature = "webgpu")]
fn webgpu(settings: &RendererSettings) -> Result<Box<dyn Renderer>, RendererError> {
    wgpu_renderer("webgpu", prism_pal::backend::Backends::PRIMARY, settings)
}

#[cfg(feature = "webgpu")]
fn vulkan(settings: &RendererSettings) -> Result<Box<dyn Renderer>, RendererError> {
    wgpu_renderer("vulkan", prism_pal::backend::Backends::VULKAN, settings)
}

#[cfg(feature = "webgpu")]
fn wgpu_renderer(
    name: &str,
    backends: prism_pal::backend::Backends,
    settings: &RendererSettings,
) -> Result<Box<dyn Renderer>, RendererError> {
    use prism_pal::backend::{WebGpuBackend, WebGpuBackendCreateInfo};

    let backend = WebGpuBackend::new(WebGpuBackendCreateInfo {
        backends,
        allow_fallback_adapter: false,
    })?;
    Ok(Box::new(IblRenderer::new(name, Context::new(backend), settings)?))
}

/// Runs everything on the CPU with the reference kernels.
pub fn software(settings: &RendererSettings) -> Result<Box<dyn Renderer>, RendererError> {
    let backend = SoftwareBackend::new(SoftwareBackendCreateInfo {
        kernels: prism_render_ibl::kernels::software_kernels(),
        ..Default::default()
    });
    Ok(Box::new(IblRenderer::new(
        "software",
        Context::new(backend),
        settings,
    )?))
}
