use std::{path::Path, sync::Arc};

use prism_math::{Mat4, Vec3};

use crate::panorama::{Panorama, PanoramaError};

/// An HDR environment: the source panorama plus the rotation applied to it when shading.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    panorama: Arc<Panorama>,
    rotation: f32,
    transform: Mat4,
}

impl Environment {
    pub fn new(name: impl Into<String>, panorama: Panorama) -> Self {
        Self {
            name: name.into(),
            panorama: Arc::new(panorama),
            rotation: 0.0,
            transform: Mat4::IDENTITY,
        }
    }

    /// Loads the panorama at `path`. The environment is named after the path.
    pub fn load(path: impl AsRef<Path>, max_width: u32) -> Result<Self, PanoramaError> {
        let path = path.as_ref();
        let panorama = Panorama::from_path(path, max_width)?;
        Ok(Self::new(path.display().to_string(), panorama))
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn panorama(&self) -> &Panorama {
        &self.panorama
    }

    /// Rotation about +Y in radians.
    #[inline(always)]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Updates the rotation used when shading. Baked IBL textures are unaffected.
    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.transform = Mat4::from_axis_angle(Vec3::Y, radians);
    }

    #[inline(always)]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }
}
