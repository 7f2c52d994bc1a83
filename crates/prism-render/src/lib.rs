//! Renderer entry point handed to applications.
//!
//! Applications pick a backend by name from a [`BackendRegistry`] and talk to the resulting
//! [`Renderer`] without knowing which graphics API is underneath.

pub mod config;
pub mod error;
pub mod registry;
pub mod renderer;

pub use config::{RendererSettings, SettingsError};
pub use error::{RegistryError, RendererError};
pub use registry::{BackendRegistry, RendererFactory, DEFAULT_BACKEND};
pub use renderer::{IblRenderer, Renderer};

#[cfg(test)]
mod tests;
