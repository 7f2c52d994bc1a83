use prism_render_ibl::IblError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[cfg(feature = "webgpu")]
    #[error("unable to create webgpu backend: {0}")]
    WebGpu(#[from] prism_pal::backend::WebGpuBackendCreateError),
    #[error("{0}")]
    Ibl(#[from] IblError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a backend named `{0}` is already registered")]
    Duplicate(String),
    #[error("unknown backend `{name}`, available backends are {available:?}")]
    Unknown {
        name: String,
        available: Vec<String>,
    },
    #[error("unable to create renderer: {0}")]
    Renderer(#[from] RendererError),
}
