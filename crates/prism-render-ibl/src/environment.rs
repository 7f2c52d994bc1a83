use std::time::Instant;

use half::f16;
use ordered_float::NotNan;
use prism_formats::{environment::Environment, panorama::Panorama};
use prism_log::{error, info};
use prism_pal::prelude::*;

use crate::{
    config::IblSettings,
    error::IblError,
    floor_pow2,
    mip::{MipGenerator, MipKind},
    precompute::{IblPrecomputer, ENVIRONMENT_SAMPLER},
    resample::PanoramaResampler,
};

/// The LUT is indexed by `(N.V, roughness)`, neither of which wraps.
pub const BRDF_LUT_SAMPLER: Sampler = Sampler {
    min_filter: Filter::Linear,
    mag_filter: Filter::Linear,
    mipmap_filter: Filter::Nearest,
    address_u: SamplerAddressMode::ClampToEdge,
    address_v: SamplerAddressMode::ClampToEdge,
    address_w: SamplerAddressMode::ClampToEdge,
    min_lod: unsafe { NotNan::new_unchecked(0.0) },
    max_lod: None,
};

/// Stages an environment load moves through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EnvironmentState {
    /// No environment has been requested yet. The flat default set is bound.
    Uninitialized,
    Resampling,
    MippingEnvironment,
    PrecomputingIbl,
    MippingIrradiance,
    /// A complete set derived from an environment is bound.
    Ready,
    /// The last load failed and no environment was ever loaded. The flat default set is bound.
    Unavailable,
}

/// The four textures handed to shading. They are never modified once the set is built.
pub struct IblTextures<B: Backend> {
    pub environment: Texture<B>,
    pub irradiance: Texture<B>,
    pub specular: Texture<B>,
    pub brdf_lut: Texture<B>,
}

/// Host copy of one mip of a texture. Texels of every array element are packed in layer order.
#[derive(Debug, Clone, PartialEq)]
pub struct MipData {
    pub width: u32,
    pub height: u32,
    pub layers: usize,
    pub format: Format,
    pub data: Vec<u8>,
}

/// Host copies of every mip of the four IBL products.
#[derive(Debug, Clone, PartialEq)]
pub struct IblData {
    pub environment: Vec<MipData>,
    pub irradiance: Vec<MipData>,
    pub specular: Vec<MipData>,
    pub brdf_lut: Vec<MipData>,
}

/// Builds and owns the IBL set for the current environment.
///
/// Loading runs panorama resampling, environment mips, irradiance, specular and BRDF
/// precomputation, then irradiance mips. The new set is only bound once every stage has been
/// submitted, so shading never observes a partial set.
pub struct EnvironmentPipeline<B: Backend> {
    ctx: Context<B>,
    settings: IblSettings,
    resampler: PanoramaResampler<B>,
    mips: MipGenerator<B>,
    precomputer: IblPrecomputer<B>,
    ibl: IblTextures<B>,
    state: EnvironmentState,
    loaded: bool,
}

impl<B: Backend> EnvironmentPipeline<B> {
    /// Builds every pipeline and binds a flat white default set.
    pub fn new(ctx: &Context<B>, settings: IblSettings) -> Result<Self, IblError> {
        settings.validate()?;
        let resampler = PanoramaResampler::new(ctx)?;
        let mips = MipGenerator::new(ctx)?;
        let precomputer = IblPrecomputer::new(ctx)?;
        let ibl = IblTextures::flat(ctx)?;

        Ok(Self {
            ctx: ctx.clone(),
            settings,
            resampler,
            mips,
            precomputer,
            ibl,
            state: EnvironmentState::Uninitialized,
            loaded: false,
        })
    }

    #[inline(always)]
    pub fn state(&self) -> EnvironmentState {
        self.state
    }

    #[inline(always)]
    pub fn ibl(&self) -> &IblTextures<B> {
        &self.ibl
    }

    #[inline(always)]
    pub fn settings(&self) -> &IblSettings {
        &self.settings
    }

    #[inline(always)]
    pub fn mip_generator(&self) -> &MipGenerator<B> {
        &self.mips
    }

    /// Replaces the bound IBL set with one derived from `environment`.
    ///
    /// On failure the previous set stays bound and the error is returned.
    pub fn load_environment(&mut self, environment: &Environment) -> Result<(), IblError> {
        let begin = Instant::now();
        info!("loading environment `{}`", environment.name());

        // The old set may still be read by in flight work.
        self.ctx.wait_idle();

        match self.build(environment.panorama()) {
            Ok(ibl) => {
                self.ibl = ibl;
                self.loaded = true;
                self.transition(EnvironmentState::Ready);
                info!(
                    "environment `{}` took {:.2}ms",
                    environment.name(),
                    begin.elapsed().as_secs_f64() * 1000.0
                );
                Ok(())
            }
            Err(err) => {
                error!("unable to load environment `{}`: {err}", environment.name());
                self.transition(if self.loaded {
                    EnvironmentState::Ready
                } else {
                    EnvironmentState::Unavailable
                });
                Err(err)
            }
        }
    }

    fn build(&mut self, panorama: &Panorama) -> Result<IblTextures<B>, IblError> {
        self.transition(EnvironmentState::Resampling);
        let env_size = floor_pow2(panorama.width());
        let ibl = IblTextures::new(&self.ctx, env_size, &self.settings)?;
        self.resampler.resample(panorama, &ibl.environment)?;

        self.transition(EnvironmentState::MippingEnvironment);
        self.mips.generate(&ibl.environment, MipKind::Float16Cube)?;

        self.transition(EnvironmentState::PrecomputingIbl);
        self.precomputer.generate(
            &ibl.environment,
            &ibl.irradiance,
            &ibl.specular,
            &ibl.brdf_lut,
            &self.settings,
        )?;

        self.transition(EnvironmentState::MippingIrradiance);
        self.mips.generate(&ibl.irradiance, MipKind::Float16Cube)?;

        Ok(ibl)
    }

    #[inline(always)]
    fn transition(&mut self, state: EnvironmentState) {
        info!("environment state {:?} -> {state:?}", self.state);
        self.state = state;
    }
}

impl<B: Backend> IblTextures<B> {
    /// Allocates an empty set for an environment cube of `env_size`.
    pub fn new(ctx: &Context<B>, env_size: u32, settings: &IblSettings) -> Result<Self, IblError> {
        let cube = |size: u32, name: &str| {
            Texture::new(
                ctx.clone(),
                MipKind::Float16Cube.create_info(size, size, Some(name.into())),
            )
        };

        Ok(Self {
            environment: cube(env_size, "environment_map")?,
            irradiance: cube(settings.irradiance_size, "irradiance_map")?,
            specular: cube(settings.specular_size, "specular_map")?,
            brdf_lut: Texture::new(
                ctx.clone(),
                TextureCreateInfo {
                    format: Format::Rgba16SFloat,
                    ty: TextureType::Type2D,
                    width: settings.brdf_lut_size,
                    height: settings.brdf_lut_size,
                    array_elements: 1,
                    mip_levels: 1,
                    texture_usage: TextureUsage::SAMPLED
                        | TextureUsage::STORAGE
                        | TextureUsage::TRANSFER_DST
                        | TextureUsage::TRANSFER_SRC,
                    debug_name: Some("brdf_lut".into()),
                },
            )?,
        })
    }

    /// 1x1 white cubes and a LUT that passes `F0` through unchanged.
    pub fn flat(ctx: &Context<B>) -> Result<Self, IblError> {
        let settings = IblSettings {
            irradiance_size: 1,
            specular_size: 1,
            brdf_lut_size: 1,
            ..Default::default()
        };
        let ibl = Self::new(ctx, 1, &settings)?;

        let white = rgba16([1.0, 1.0, 1.0, 1.0]);
        for cube in [&ibl.environment, &ibl.irradiance, &ibl.specular] {
            for face in CubeFace::ALL {
                cube.write(face.layer(), 0, &white)?;
            }
        }
        ibl.brdf_lut.write(0, 0, &rgba16([1.0, 0.0, 0.0, 1.0]))?;

        Ok(ibl)
    }

    /// Layout bindings of the shading contract, starting at `first`: environment, irradiance,
    /// specular and BRDF LUT textures followed by the environment and LUT samplers.
    pub fn layout_bindings(first: u32, stage: ShaderStage) -> Vec<DescriptorBinding> {
        let texture = |binding: u32, dimension: ViewDimension| DescriptorBinding {
            binding,
            ty: DescriptorType::Texture {
                dimension,
                filterable: true,
            },
            stage,
        };
        let sampler = |binding: u32| DescriptorBinding {
            binding,
            ty: DescriptorType::Sampler { filtering: true },
            stage,
        };

        vec![
            texture(first, ViewDimension::Cube),
            texture(first + 1, ViewDimension::Cube),
            texture(first + 2, ViewDimension::Cube),
            texture(first + 3, ViewDimension::D2),
            sampler(first + 4),
            sampler(first + 5),
        ]
    }

    /// Updates matching [`IblTextures::layout_bindings`].
    pub fn updates(&self, first: u32) -> Vec<DescriptorSetUpdate<'_, B>> {
        vec![
            texture_update(first, &self.environment),
            texture_update(first + 1, &self.irradiance),
            texture_update(first + 2, &self.specular),
            texture_update(first + 3, &self.brdf_lut),
            DescriptorSetUpdate {
                binding: first + 4,
                value: DescriptorValue::Sampler(ENVIRONMENT_SAMPLER),
            },
            DescriptorSetUpdate {
                binding: first + 5,
                value: DescriptorValue::Sampler(BRDF_LUT_SAMPLER),
            },
        ]
    }

    /// Reads every mip of every texture back to the host. Blocks until prior work completes.
    pub fn read_back(&self) -> Result<IblData, IblError> {
        Ok(IblData {
            environment: MipData::read_all(&self.environment)?,
            irradiance: MipData::read_all(&self.irradiance)?,
            specular: MipData::read_all(&self.specular)?,
            brdf_lut: MipData::read_all(&self.brdf_lut)?,
        })
    }
}

impl MipData {
    /// Reads every mip of `texture` back to the host.
    pub fn read_all<B: Backend>(texture: &Texture<B>) -> Result<Vec<MipData>, IblError> {
        let mut mips = Vec::with_capacity(texture.mip_count());
        for mip in 0..texture.mip_count() {
            let (width, height) = texture.mip_dims(mip);
            let mut data = Vec::default();
            for layer in 0..texture.array_elements() {
                data.extend(texture.read(layer, mip)?);
            }
            mips.push(MipData {
                width,
                height,
                layers: texture.array_elements(),
                format: texture.format(),
                data,
            });
        }
        Ok(mips)
    }

    /// Decodes the texel at `(x, y)` of `layer` to linear floats.
    pub fn texel(&self, layer: usize, x: u32, y: u32) -> [f32; 4] {
        let texel_size = self.format.texel_size();
        let index = (layer * self.width as usize * self.height as usize
            + y as usize * self.width as usize
            + x as usize)
            * texel_size;
        let bytes = &self.data[index..index + texel_size];

        match self.format {
            Format::Rgba8Unorm => [0, 1, 2, 3].map(|c| bytes[c] as f32 / 255.0),
            Format::Rgba8Srgb => [0, 1, 2, 3].map(|c| {
                let value = bytes[c] as f32 / 255.0;
                match c {
                    3 => value,
                    _ if value <= 0.04045 => value / 12.92,
                    _ => ((value + 0.055) / 1.055).powf(2.4),
                }
            }),
            Format::Rgba16SFloat => {
                [0, 1, 2, 3].map(|c| f16::from_le_bytes([bytes[c * 2], bytes[c * 2 + 1]]).to_f32())
            }
            Format::Rgba32SFloat => [0, 1, 2, 3].map(|c| {
                f32::from_le_bytes([
                    bytes[c * 4],
                    bytes[c * 4 + 1],
                    bytes[c * 4 + 2],
                    bytes[c * 4 + 3],
                ])
            }),
        }
    }

    /// Every texel of every layer, decoded.
    pub fn texels(&self) -> impl Iterator<Item = [f32; 4]> + '_ {
        (0..self.layers).flat_map(move |layer| {
            (0..self.height)
                .flat_map(move |y| (0..self.width).map(move |x| self.texel(layer, x, y)))
        })
    }
}

#[inline(always)]
fn texture_update<B: Backend>(binding: u32, texture: &Texture<B>) -> DescriptorSetUpdate<'_, B> {
    DescriptorSetUpdate {
        binding,
        value: DescriptorValue::Texture {
            texture,
            base_mip: 0,
            mip_count: texture.mip_count(),
        },
    }
}

#[inline(always)]
fn rgba16(texel: [f32; 4]) -> Vec<u8> {
    texel
        .iter()
        .flat_map(|c| f16::from_f32(*c).to_le_bytes())
        .collect()
}
