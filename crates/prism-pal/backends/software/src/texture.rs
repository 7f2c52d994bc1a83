use std::sync::{Arc, RwLock};

use api::{
    texture::{mip_dim, Sampler, TextureCreateInfo, TextureTransferError},
    types::{Filter, Format, SamplerAddressMode},
};
use half::f16;
use prism_math::{direction_to_face_uv, Vec2, Vec3};

pub type Texel = [f32; 4];

/// Texels are kept as linear `f32` values rounded to the precision of the texture format.
#[derive(Clone)]
pub struct Texture(pub(crate) Arc<TextureData>);

pub struct TextureData {
    pub format: Format,
    pub width: u32,
    pub height: u32,
    pub array_elements: usize,
    pub mip_count: usize,
    pub debug_name: Option<String>,
    /// Indexed by `array_element * mip_count + mip`.
    levels: Vec<RwLock<Vec<Texel>>>,
}

/// A range of mips of a texture bound to a descriptor set.
#[derive(Clone)]
pub struct TextureView {
    pub(crate) texture: Texture,
    pub(crate) base_mip: usize,
    pub(crate) mip_count: usize,
}

impl Texture {
    pub(crate) fn new(create_info: TextureCreateInfo) -> Self {
        let mut levels = Vec::with_capacity(create_info.array_elements * create_info.mip_levels);
        for _ in 0..create_info.array_elements {
            for mip in 0..create_info.mip_levels {
                let len = mip_dim(create_info.width, mip) as usize
                    * mip_dim(create_info.height, mip) as usize;
                levels.push(RwLock::new(vec![[0.0; 4]; len]));
            }
        }

        Texture(Arc::new(TextureData {
            format: create_info.format,
            width: create_info.width,
            height: create_info.height,
            array_elements: create_info.array_elements,
            mip_count: create_info.mip_levels,
            debug_name: create_info.debug_name,
            levels,
        }))
    }

    #[inline(always)]
    pub fn format(&self) -> Format {
        self.0.format
    }

    #[inline(always)]
    pub fn mip_dims(&self, mip: usize) -> (u32, u32) {
        (mip_dim(self.0.width, mip), mip_dim(self.0.height, mip))
    }

    /// Size in bytes of one array element including every mip.
    pub fn size(&self) -> u64 {
        (0..self.0.mip_count)
            .map(|mip| {
                let (w, h) = self.mip_dims(mip);
                w as u64 * h as u64 * self.0.format.texel_size() as u64
            })
            .sum()
    }

    /// Fetches a texel. Coordinates are clamped to the mip.
    pub fn load(&self, array_element: usize, mip: usize, x: i32, y: i32) -> Texel {
        let (w, h) = self.mip_dims(mip);
        let x = x.clamp(0, w as i32 - 1) as usize;
        let y = y.clamp(0, h as i32 - 1) as usize;
        let level = self.level(array_element, mip).read().unwrap();
        level[y * w as usize + x]
    }

    /// Stores a texel. Writes outside of the mip are discarded.
    pub fn store(&self, array_element: usize, mip: usize, x: u32, y: u32, value: Texel) {
        let (w, h) = self.mip_dims(mip);
        if x >= w || y >= h {
            return;
        }
        let value = quantize(self.0.format, value);
        let mut level = self.level(array_element, mip).write().unwrap();
        level[(y * w + x) as usize] = value;
    }

    pub fn fill(&self, array_element: usize, mip: usize, value: Texel) {
        let value = quantize(self.0.format, value);
        let mut level = self.level(array_element, mip).write().unwrap();
        level.iter_mut().for_each(|texel| *texel = value);
    }

    pub(crate) fn write_bytes(
        &self,
        array_element: usize,
        mip: usize,
        data: &[u8],
    ) -> Result<(), TextureTransferError> {
        let format = self.0.format;
        let texel_size = format.texel_size();
        let mut level = self.level(array_element, mip).write().unwrap();
        if data.len() != level.len() * texel_size {
            return Err(TextureTransferError::SizeMismatch {
                expected: level.len() * texel_size,
                actual: data.len(),
            });
        }
        for (texel, bytes) in level.iter_mut().zip(data.chunks_exact(texel_size)) {
            *texel = decode(format, bytes);
        }
        Ok(())
    }

    pub(crate) fn read_bytes(&self, array_element: usize, mip: usize) -> Vec<u8> {
        let format = self.0.format;
        let level = self.level(array_element, mip).read().unwrap();
        let mut out = Vec::with_capacity(level.len() * format.texel_size());
        level.iter().for_each(|texel| encode(format, *texel, &mut out));
        out
    }

    #[inline(always)]
    fn level(&self, array_element: usize, mip: usize) -> &RwLock<Vec<Texel>> {
        &self.0.levels[array_element * self.0.mip_count + mip]
    }
}

impl TextureView {
    /// Number of mips visible through the view.
    #[inline(always)]
    pub fn mip_count(&self) -> usize {
        self.mip_count
    }

    /// Dimensions of a mip relative to the base of the view.
    #[inline(always)]
    pub fn dims(&self, mip: usize) -> (u32, u32) {
        self.texture.mip_dims(self.base_mip + mip)
    }

    #[inline(always)]
    pub fn array_elements(&self) -> usize {
        self.texture.0.array_elements
    }

    /// `textureLoad` equivalent. `mip` is relative to the base of the view.
    #[inline(always)]
    pub fn load(&self, x: i32, y: i32, array_element: usize, mip: usize) -> Texel {
        self.texture
            .load(array_element, self.base_mip + mip, x, y)
    }

    /// `textureSampleLevel` equivalent for 2D and 2D array views.
    pub fn sample_2d(&self, sampler: &Sampler, uv: Vec2, array_element: usize, lod: f32) -> Texel {
        let max_lod = sampler
            .max_lod
            .map(|lod| lod.into_inner())
            .unwrap_or(f32::MAX)
            .min((self.mip_count - 1) as f32);
        let lod = lod.clamp(sampler.min_lod.into_inner().min(max_lod), max_lod);
        let filter = if lod > 0.0 {
            sampler.min_filter
        } else {
            sampler.mag_filter
        };

        match sampler.mipmap_filter {
            Filter::Nearest => {
                self.sample_mip(sampler, filter, uv, array_element, (lod + 0.5) as usize)
            }
            Filter::Linear => {
                let lo = lod.floor() as usize;
                let hi = lod.ceil() as usize;
                let a = self.sample_mip(sampler, filter, uv, array_element, lo);
                if hi == lo {
                    return a;
                }
                let b = self.sample_mip(sampler, filter, uv, array_element, hi);
                lerp(a, b, lod.fract())
            }
        }
    }

    /// `textureSampleLevel` equivalent for cube views.
    pub fn sample_cube(&self, sampler: &Sampler, dir: Vec3, lod: f32) -> Texel {
        let (face, uv) = direction_to_face_uv(dir);
        let mut sampler = *sampler;
        sampler.address_u = SamplerAddressMode::ClampToEdge;
        sampler.address_v = SamplerAddressMode::ClampToEdge;
        self.sample_2d(&sampler, uv, face, lod)
    }

    fn sample_mip(
        &self,
        sampler: &Sampler,
        filter: Filter,
        uv: Vec2,
        array_element: usize,
        mip: usize,
    ) -> Texel {
        let (w, h) = self.dims(mip);
        let fetch = |x: f32, y: f32| {
            let x = address(x as i32, w, sampler.address_u);
            let y = address(y as i32, h, sampler.address_v);
            self.load(x, y, array_element, mip)
        };

        match filter {
            Filter::Nearest => fetch((uv.x * w as f32).floor(), (uv.y * h as f32).floor()),
            Filter::Linear => {
                let x = uv.x * w as f32 - 0.5;
                let y = uv.y * h as f32 - 0.5;
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                let top = lerp(fetch(x0, y0), fetch(x0 + 1.0, y0), fx);
                let bottom = lerp(fetch(x0, y0 + 1.0), fetch(x0 + 1.0, y0 + 1.0), fx);
                lerp(top, bottom, fy)
            }
        }
    }
}

#[inline(always)]
fn address(coord: i32, size: u32, mode: SamplerAddressMode) -> i32 {
    let size = size as i32;
    match mode {
        SamplerAddressMode::Repeat => coord.rem_euclid(size),
        SamplerAddressMode::MirroredRepeat => {
            let period = coord.rem_euclid(2 * size);
            if period < size {
                period
            } else {
                2 * size - 1 - period
            }
        }
        SamplerAddressMode::ClampToEdge => coord.clamp(0, size - 1),
    }
}

#[inline(always)]
fn lerp(a: Texel, b: Texel, t: f32) -> Texel {
    [0, 1, 2, 3].map(|i| a[i] + (b[i] - a[i]) * t)
}

#[inline(always)]
fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
pub(crate) fn linear_to_srgb(value: f32) -> f32 {
    let value = value.clamp(0.0, 1.0);
    if value <= 0.0031308 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
pub(crate) fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Rounds a texel to what the format can represent.
pub(crate) fn quantize(format: Format, texel: Texel) -> Texel {
    match format {
        Format::Rgba32SFloat => texel,
        _ => {
            let mut bytes = Vec::with_capacity(format.texel_size());
            encode(format, texel, &mut bytes);
            decode(format, &bytes)
        }
    }
}

fn encode(format: Format, texel: Texel, out: &mut Vec<u8>) {
    match format {
        Format::Rgba8Unorm => out.extend(texel.map(unorm8)),
        Format::Rgba8Srgb => {
            out.extend(texel[..3].iter().map(|c| unorm8(linear_to_srgb(*c))));
            out.push(unorm8(texel[3]));
        }
        Format::Rgba16SFloat => texel
            .iter()
            .for_each(|c| out.extend(f16::from_f32(*c).to_le_bytes())),
        Format::Rgba32SFloat => texel.iter().for_each(|c| out.extend(c.to_le_bytes())),
    }
}

fn decode(format: Format, bytes: &[u8]) -> Texel {
    match format {
        Format::Rgba8Unorm => [0, 1, 2, 3].map(|i| bytes[i] as f32 / 255.0),
        Format::Rgba8Srgb => [0, 1, 2, 3].map(|i| {
            let value = bytes[i] as f32 / 255.0;
            if i == 3 {
                value
            } else {
                srgb_to_linear(value)
            }
        }),
        Format::Rgba16SFloat => {
            [0, 1, 2, 3].map(|i| f16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]).to_f32())
        }
        Format::Rgba32SFloat => [0, 1, 2, 3].map(|i| {
            f32::from_le_bytes([
                bytes[i * 4],
                bytes[i * 4 + 1],
                bytes[i * 4 + 2],
                bytes[i * 4 + 3],
            ])
        }),
    }
}
