use std::path::Path;

use prism_log::LevelFilter;
use prism_render_ibl::IblSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Name of the backend to create. `None` leaves the choice to the caller.
    pub backend: Option<String>,
    pub ibl: IblSettings,
    pub log_level: LevelFilter,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            backend: None,
            ibl: IblSettings::default(),
            log_level: LevelFilter::Info,
        }
    }
}

impl RendererSettings {
    /// Parses settings written in RON. Missing fields keep their defaults.
    pub fn from_ron(source: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }
}
