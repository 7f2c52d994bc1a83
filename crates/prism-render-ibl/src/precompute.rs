use std::f32::consts::FRAC_PI_2;

use bytemuck::{Pod, Zeroable};
use ordered_float::NotNan;
use prism_log::debug;
use prism_pal::prelude::*;

use crate::{
    config::IblSettings,
    dispatch_size,
    error::IblError,
    faces::{FaceSets, FACE_SET},
    mip::compute_pipeline,
    shaders,
};

pub(crate) const ENVIRONMENT_SAMPLER_BINDING: u32 = 0;
pub(crate) const ENVIRONMENT_BINDING: u32 = 1;
pub(crate) const IRRADIANCE_BINDING: u32 = 2;
pub(crate) const IRRADIANCE_PARAMS_BINDING: u32 = 3;

/// Set index of the per-mip specular bindings.
pub(crate) const SPECULAR_MIP_SET: usize = 2;
pub(crate) const SPECULAR_PARAMS_BINDING: u32 = 0;
pub(crate) const SPECULAR_MIP_BINDING: u32 = 1;

pub(crate) const BRDF_LUT_BINDING: u32 = 0;
pub(crate) const BRDF_PARAMS_BINDING: u32 = 1;

/// Sampler used to read the environment cube, both here and when shading.
pub const ENVIRONMENT_SAMPLER: Sampler = Sampler {
    min_filter: Filter::Linear,
    mag_filter: Filter::Linear,
    mipmap_filter: Filter::Linear,
    address_u: SamplerAddressMode::Repeat,
    address_v: SamplerAddressMode::Repeat,
    address_w: SamplerAddressMode::Repeat,
    min_lod: unsafe { NotNan::new_unchecked(0.0) },
    max_lod: None,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct IrradianceParams {
    /// Hemisphere step in radians.
    pub sample_delta: f32,
    /// Environment mip sampled by the convolution.
    pub source_lod: f32,
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpecularParams {
    pub roughness: f32,
    pub sample_count: u32,
    /// Face size of mip 0 of the environment.
    pub source_size: f32,
    /// Specular mip being written.
    pub mip: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct BrdfParams {
    pub sample_count: u32,
    pub _pad: [u32; 3],
}

/// Derives the diffuse irradiance map, the prefiltered specular chain and the BRDF LUT from a
/// mipped environment cube.
pub struct IblPrecomputer<B: Backend> {
    ctx: Context<B>,
    irradiance_layout: DescriptorSetLayout<B>,
    source_layout: DescriptorSetLayout<B>,
    specular_mip_layout: DescriptorSetLayout<B>,
    brdf_layout: DescriptorSetLayout<B>,
    irradiance_pipeline: ComputePipeline<B>,
    specular_pipeline: ComputePipeline<B>,
    brdf_pipeline: ComputePipeline<B>,
    faces: FaceSets<B>,
}

impl<B: Backend> IblPrecomputer<B> {
    pub fn new(ctx: &Context<B>) -> Result<Self, IblError> {
        let environment_bindings = [
            DescriptorBinding {
                binding: ENVIRONMENT_SAMPLER_BINDING,
                ty: DescriptorType::Sampler { filtering: true },
                stage: ShaderStage::Compute,
            },
            DescriptorBinding {
                binding: ENVIRONMENT_BINDING,
                ty: DescriptorType::Texture {
                    dimension: ViewDimension::Cube,
                    filterable: true,
                },
                stage: ShaderStage::Compute,
            },
        ];

        let mut irradiance_bindings = environment_bindings.to_vec();
        irradiance_bindings.push(DescriptorBinding {
            binding: IRRADIANCE_BINDING,
            ty: DescriptorType::StorageImage {
                format: Format::Rgba16SFloat,
                dimension: ViewDimension::D2Array,
            },
            stage: ShaderStage::Compute,
        });
        irradiance_bindings.push(DescriptorBinding {
            binding: IRRADIANCE_PARAMS_BINDING,
            ty: DescriptorType::UniformBuffer,
            stage: ShaderStage::Compute,
        });

        let irradiance_layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: irradiance_bindings,
            },
        )?;

        let source_layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: environment_bindings.to_vec(),
            },
        )?;

        let specular_mip_layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    DescriptorBinding {
                        binding: SPECULAR_PARAMS_BINDING,
                        ty: DescriptorType::UniformBuffer,
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: SPECULAR_MIP_BINDING,
                        ty: DescriptorType::StorageImage {
                            format: Format::Rgba16SFloat,
                            dimension: ViewDimension::D2Array,
                        },
                        stage: ShaderStage::Compute,
                    },
                ],
            },
        )?;

        let brdf_layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    DescriptorBinding {
                        binding: BRDF_LUT_BINDING,
                        ty: DescriptorType::StorageImage {
                            format: Format::Rgba16SFloat,
                            dimension: ViewDimension::D2,
                        },
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: BRDF_PARAMS_BINDING,
                        ty: DescriptorType::UniformBuffer,
                        stage: ShaderStage::Compute,
                    },
                ],
            },
        )?;

        let faces = FaceSets::new(ctx, "ibl")?;

        let irradiance_pipeline = compute_pipeline(
            ctx,
            vec![irradiance_layout.clone(), faces.layout().clone()],
            shaders::IRRADIANCE,
            "irradiance",
        )?;
        let specular_pipeline = compute_pipeline(
            ctx,
            vec![
                source_layout.clone(),
                faces.layout().clone(),
                specular_mip_layout.clone(),
            ],
            shaders::PREFILTER_SPECULAR,
            "prefilter_specular",
        )?;
        let brdf_pipeline = compute_pipeline(
            ctx,
            vec![brdf_layout.clone()],
            shaders::BRDF_LUT,
            "integrate_brdf",
        )?;

        Ok(Self {
            ctx: ctx.clone(),
            irradiance_layout,
            source_layout,
            specular_mip_layout,
            brdf_layout,
            irradiance_pipeline,
            specular_pipeline,
            brdf_pipeline,
            faces,
        })
    }

    /// Runs all three precomputations. Only mip 0 of `irradiance` is written.
    pub fn generate(
        &self,
        environment: &Texture<B>,
        irradiance: &Texture<B>,
        specular: &Texture<B>,
        brdf_lut: &Texture<B>,
        settings: &IblSettings,
    ) -> Result<(), IblError> {
        self.irradiance(environment, irradiance, settings)?;
        self.prefilter_specular(environment, specular, settings)?;
        self.integrate_brdf(brdf_lut, settings)
    }

    /// Convolves the environment over the hemisphere around every texel of mip 0 of `irradiance`.
    pub fn irradiance(
        &self,
        environment: &Texture<B>,
        irradiance: &Texture<B>,
        settings: &IblSettings,
    ) -> Result<(), IblError> {
        check_environment(environment);
        check_cube_target(irradiance);
        assert!(
            settings.irradiance_sample_delta > 0.0,
            "irradiance sample delta must be positive"
        );

        // Pick the mip whose texels are about as far apart as the hemisphere samples.
        let (env_size, _) = environment.dims();
        let texels_per_step = env_size as f32 * settings.irradiance_sample_delta / FRAC_PI_2;
        let source_lod = texels_per_step
            .log2()
            .clamp(0.0, (environment.mip_count() - 1) as f32);

        let params = Buffer::new_uniform(
            self.ctx.clone(),
            Some("irradiance_params".into()),
            &[IrradianceParams {
                sample_delta: settings.irradiance_sample_delta,
                source_lod,
                _pad: [0.0; 2],
            }],
        )?;

        let mut set = DescriptorSet::new(
            self.ctx.clone(),
            DescriptorSetCreateInfo {
                layout: self.irradiance_layout.clone(),
                debug_name: Some("irradiance_set".into()),
            },
        )?;
        let mut updates = environment_updates(environment);
        updates.push(DescriptorSetUpdate {
            binding: IRRADIANCE_BINDING,
            value: DescriptorValue::StorageImage {
                texture: irradiance,
                mip: 0,
            },
        });
        updates.push(DescriptorSetUpdate {
            binding: IRRADIANCE_PARAMS_BINDING,
            value: DescriptorValue::UniformBuffer {
                buffer: &params,
                array_element: 0,
            },
        });
        set.update(&updates)?;

        let (size, _) = irradiance.dims();
        debug!("convolving {size}x{size} irradiance from environment lod {source_lod:.2}");

        self.ctx.main().submit(Some("irradiance"), |commands| {
            for face in CubeFace::ALL {
                commands.compute_pass(&self.irradiance_pipeline, Some("irradiance"), |pass| {
                    pass.bind_sets(0, vec![&set]);
                    pass.bind_sets(FACE_SET, vec![self.faces.set(face)]);
                    dispatch_size(size, size)
                });
            }
        });

        Ok(())
    }

    /// Writes every mip of `specular`. Mip `m` holds the environment convolved with a GGX lobe of
    /// roughness [`IblSettings::specular_roughness`].
    pub fn prefilter_specular(
        &self,
        environment: &Texture<B>,
        specular: &Texture<B>,
        settings: &IblSettings,
    ) -> Result<(), IblError> {
        check_environment(environment);
        check_cube_target(specular);

        let mip_count = specular.mip_count();
        let (env_size, _) = environment.dims();
        let params: Vec<SpecularParams> = (0..mip_count)
            .map(|mip| SpecularParams {
                roughness: IblSettings::specular_roughness(mip, mip_count),
                sample_count: settings.specular_samples(mip),
                source_size: env_size as f32,
                mip: mip as u32,
            })
            .collect();
        let params_buffer = Buffer::new_uniform(
            self.ctx.clone(),
            Some("specular_params".into()),
            &params,
        )?;

        let mut source_set = DescriptorSet::new(
            self.ctx.clone(),
            DescriptorSetCreateInfo {
                layout: self.source_layout.clone(),
                debug_name: Some("prefilter_specular_source_set".into()),
            },
        )?;
        source_set.update(&environment_updates(environment))?;

        let mut mip_sets = Vec::with_capacity(mip_count);
        for mip in 0..mip_count {
            let mut set = DescriptorSet::new(
                self.ctx.clone(),
                DescriptorSetCreateInfo {
                    layout: self.specular_mip_layout.clone(),
                    debug_name: Some(format!("prefilter_specular_mip_set_{mip}")),
                },
            )?;
            set.update(&[
                DescriptorSetUpdate {
                    binding: SPECULAR_PARAMS_BINDING,
                    value: DescriptorValue::UniformBuffer {
                        buffer: &params_buffer,
                        array_element: mip,
                    },
                },
                DescriptorSetUpdate {
                    binding: SPECULAR_MIP_BINDING,
                    value: DescriptorValue::StorageImage {
                        texture: specular,
                        mip,
                    },
                },
            ])?;
            mip_sets.push(set);
        }

        debug!(
            "prefiltering {mip_count} specular mips with up to {} samples",
            settings.specular_samples(mip_count - 1)
        );

        self.ctx.main().submit(Some("prefilter_specular"), |commands| {
            for (mip, mip_set) in mip_sets.iter().enumerate() {
                let (w, h) = specular.mip_dims(mip);
                for face in CubeFace::ALL {
                    commands.compute_pass(
                        &self.specular_pipeline,
                        Some("prefilter_specular"),
                        |pass| {
                            pass.bind_sets(0, vec![&source_set, self.faces.set(face), mip_set]);
                            dispatch_size(w, h)
                        },
                    );
                }
            }
        });

        Ok(())
    }

    /// Fills the split sum LUT. Independent of any environment.
    pub fn integrate_brdf(
        &self,
        brdf_lut: &Texture<B>,
        settings: &IblSettings,
    ) -> Result<(), IblError> {
        assert_eq!(brdf_lut.ty(), TextureType::Type2D, "BRDF LUT must be 2D");
        assert_eq!(brdf_lut.format(), Format::Rgba16SFloat, "BRDF LUT must be Rgba16SFloat");
        assert!(
            brdf_lut.usage().contains(TextureUsage::STORAGE),
            "BRDF LUT must be a storage image"
        );
        assert_ne!(settings.brdf_samples, 0, "BRDF integration needs samples");

        let params = Buffer::new_uniform(
            self.ctx.clone(),
            Some("brdf_params".into()),
            &[BrdfParams {
                sample_count: settings.brdf_samples,
                _pad: [0; 3],
            }],
        )?;

        let mut set = DescriptorSet::new(
            self.ctx.clone(),
            DescriptorSetCreateInfo {
                layout: self.brdf_layout.clone(),
                debug_name: Some("integrate_brdf_set".into()),
            },
        )?;
        set.update(&[
            DescriptorSetUpdate {
                binding: BRDF_LUT_BINDING,
                value: DescriptorValue::StorageImage {
                    texture: brdf_lut,
                    mip: 0,
                },
            },
            DescriptorSetUpdate {
                binding: BRDF_PARAMS_BINDING,
                value: DescriptorValue::UniformBuffer {
                    buffer: &params,
                    array_element: 0,
                },
            },
        ])?;

        let (w, h) = brdf_lut.dims();
        self.ctx.main().submit(Some("integrate_brdf"), |commands| {
            commands.compute_pass(&self.brdf_pipeline, Some("integrate_brdf"), |pass| {
                pass.bind_sets(0, vec![&set]);
                dispatch_size(w, h)
            });
        });

        Ok(())
    }
}

fn environment_updates<B: Backend>(environment: &Texture<B>) -> Vec<DescriptorSetUpdate<'_, B>> {
    vec![
        DescriptorSetUpdate {
            binding: ENVIRONMENT_SAMPLER_BINDING,
            value: DescriptorValue::Sampler(ENVIRONMENT_SAMPLER),
        },
        DescriptorSetUpdate {
            binding: ENVIRONMENT_BINDING,
            value: DescriptorValue::Texture {
                texture: environment,
                base_mip: 0,
                mip_count: environment.mip_count(),
            },
        },
    ]
}

fn check_environment<B: Backend>(environment: &Texture<B>) {
    assert_eq!(environment.ty(), TextureType::CubeMap, "environment must be a cube map");
    assert_eq!(
        environment.format(),
        Format::Rgba16SFloat,
        "environment must be Rgba16SFloat"
    );
    assert!(
        environment.usage().contains(TextureUsage::SAMPLED),
        "environment must be sampled"
    );
}

fn check_cube_target<B: Backend>(target: &Texture<B>) {
    assert_eq!(target.ty(), TextureType::CubeMap, "target must be a cube map");
    assert_eq!(target.format(), Format::Rgba16SFloat, "target must be Rgba16SFloat");
    assert!(
        target.usage().contains(TextureUsage::STORAGE),
        "target must be a storage image"
    );
}
