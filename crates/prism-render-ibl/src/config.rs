use serde::{Deserialize, Serialize};

use crate::error::IblError;

/// Sizes and sample counts used when preprocessing an environment.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IblSettings {
    /// Face size of the diffuse irradiance cube map.
    pub irradiance_size: u32,
    /// Face size of mip 0 of the prefiltered specular cube map.
    pub specular_size: u32,
    /// Width and height of the BRDF integration LUT.
    pub brdf_lut_size: u32,
    /// Panoramas wider than this are resized on the host before upload.
    pub max_panorama_width: u32,
    /// Step in radians used when integrating the hemisphere for irradiance.
    pub irradiance_sample_delta: f32,
    /// GGX samples used for specular mip 0. Doubles with every mip.
    pub specular_base_samples: u32,
    pub specular_max_samples: u32,
    pub brdf_samples: u32,
}

impl IblSettings {
    /// Rejects sizes and sample counts that no environment can be preprocessed with.
    pub fn validate(&self) -> Result<(), IblError> {
        let counts = [
            ("irradiance_size", self.irradiance_size),
            ("specular_size", self.specular_size),
            ("brdf_lut_size", self.brdf_lut_size),
            ("max_panorama_width", self.max_panorama_width),
            ("specular_base_samples", self.specular_base_samples),
            ("specular_max_samples", self.specular_max_samples),
            ("brdf_samples", self.brdf_samples),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(IblError::Settings(format!("`{name}` must be non-zero")));
        }

        if !(self.irradiance_sample_delta.is_finite() && self.irradiance_sample_delta > 0.0) {
            return Err(IblError::Settings(format!(
                "`irradiance_sample_delta` must be positive, got {}",
                self.irradiance_sample_delta
            )));
        }

        Ok(())
    }

    /// Number of GGX samples taken when prefiltering specular mip `mip`.
    #[inline(always)]
    pub fn specular_samples(&self, mip: usize) -> u32 {
        let samples = (self.specular_base_samples as u64) << (mip as u32).min(32);
        samples.min(self.specular_max_samples as u64) as u32
    }

    /// Roughness prefiltered into specular mip `mip` of a chain of `mip_count` levels. Mip `0` is
    /// always a perfect mirror and the last mip is fully rough.
    #[inline(always)]
    pub fn specular_roughness(mip: usize, mip_count: usize) -> f32 {
        if mip_count <= 1 {
            0.0
        } else {
            mip as f32 / (mip_count - 1) as f32
        }
    }
}

impl Default for IblSettings {
    fn default() -> Self {
        Self {
            irradiance_size: 64,
            specular_size: 512,
            brdf_lut_size: 128,
            max_panorama_width: prism_formats::panorama::DEFAULT_MAX_PANORAMA_WIDTH,
            irradiance_sample_delta: 0.025,
            specular_base_samples: 64,
            specular_max_samples: 1024,
            brdf_samples: 1024,
        }
    }
}
