use std::{path::Path, time::Instant};

use prism_log::info;
use rayon::prelude::*;
use thiserror::Error;

/// Panoramas wider than this are resized on the host before upload.
pub const DEFAULT_MAX_PANORAMA_WIDTH: u32 = 4096;

/// Number of `f32` channels per panorama texel.
pub const PANORAMA_CHANNELS: usize = 4;

/// An equirectangular HDR image with a 2:1 aspect ratio, stored as linear RGBA32F texels in
/// row-major order with the top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Panorama {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

#[derive(Debug, Error)]
pub enum PanoramaError {
    #[error("unable to read panorama: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to decode panorama: {0}")]
    Decode(String),
    #[error("panorama must have a 2:1 aspect ratio, got {0}x{1}")]
    AspectRatio(u32, u32),
    #[error("expected {expected} floats of texel data but got {actual}")]
    DataSize { expected: usize, actual: usize },
}

impl Panorama {
    /// Loads and decodes a panorama from disk. See [`Panorama::from_bytes`].
    pub fn from_path(path: impl AsRef<Path>, max_width: u32) -> Result<Self, PanoramaError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes, max_width)
    }

    /// Decodes an in-memory image (Radiance HDR, OpenEXR, or any other format `image` supports).
    /// Alpha is forced to `1`. Images wider than `max_width` are resized to
    /// `max_width x max_width / 2`.
    pub fn from_bytes(bytes: &[u8], max_width: u32) -> Result<Self, PanoramaError> {
        if bytes.is_empty() {
            return Err(PanoramaError::Decode(String::from("no image data")));
        }

        let begin = Instant::now();
        let image = image::load_from_memory(bytes)
            .map_err(|err| PanoramaError::Decode(err.to_string()))?
            .into_rgba32f();
        let (width, height) = image.dimensions();
        let mut data = image.into_raw();
        data.chunks_exact_mut(PANORAMA_CHANNELS)
            .for_each(|texel| texel[3] = 1.0);

        info!(
            "decoded {width}x{height} panorama in {:.2}ms",
            begin.elapsed().as_secs_f64() * 1000.0
        );

        Self::from_rgba32f(width, height, data, max_width)
    }

    /// Wraps already decoded RGBA32F texels.
    pub fn from_rgba32f(
        width: u32,
        height: u32,
        data: Vec<f32>,
        max_width: u32,
    ) -> Result<Self, PanoramaError> {
        if width == 0 || width != 2 * height {
            return Err(PanoramaError::AspectRatio(width, height));
        }

        let expected = width as usize * height as usize * PANORAMA_CHANNELS;
        if data.len() != expected {
            return Err(PanoramaError::DataSize {
                expected,
                actual: data.len(),
            });
        }

        let panorama = Panorama {
            width,
            height,
            data,
        };

        if width > max_width {
            Ok(panorama.downsample(max_width))
        } else {
            Ok(panorama)
        }
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline(always)]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Texel data ready for upload to an `Rgba32SFloat` texture.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    #[inline(always)]
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = (y as usize * self.width as usize + x as usize) * PANORAMA_CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Bilinear resize to `width x width / 2`. Corner texels map onto corner texels.
    fn downsample(self, width: u32) -> Panorama {
        let height = (width / 2).max(1);
        info!(
            "downsampling panorama from {}x{} to {width}x{height}",
            self.width, self.height
        );
        let begin = Instant::now();

        let scale_x = (self.width - 1) as f32 / (width - 1).max(1) as f32;
        let scale_y = (self.height - 1) as f32 / (height - 1).max(1) as f32;
        let src_w = self.width as usize;
        let max_x = self.width as usize - 1;
        let max_y = self.height as usize - 1;

        let mut data = vec![0.0; width as usize * height as usize * PANORAMA_CHANNELS];
        data.par_chunks_mut(width as usize * PANORAMA_CHANNELS)
            .enumerate()
            .for_each(|(j, row)| {
                let src_y = j as f32 * scale_y;
                let y0 = src_y.floor() as usize;
                let y1 = (y0 + 1).min(max_y);
                let dy = src_y - y0 as f32;

                for (i, texel) in row.chunks_exact_mut(PANORAMA_CHANNELS).enumerate() {
                    let src_x = i as f32 * scale_x;
                    let x0 = src_x.floor() as usize;
                    let x1 = (x0 + 1).min(max_x);
                    let dx = src_x - x0 as f32;

                    for (c, out) in texel.iter_mut().enumerate() {
                        let at = |x: usize, y: usize| self.data[(y * src_w + x) * PANORAMA_CHANNELS + c];
                        let top = at(x0, y0) + dx * (at(x1, y0) - at(x0, y0));
                        let bottom = at(x0, y1) + dx * (at(x1, y1) - at(x0, y1));
                        *out = top + dy * (bottom - top);
                    }
                }
            });

        info!(
            "downsampling took {:.2}ms",
            begin.elapsed().as_secs_f64() * 1000.0
        );

        Panorama {
            width,
            height,
            data,
        }
    }
}
