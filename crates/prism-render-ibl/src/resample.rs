use ordered_float::NotNan;
use prism_formats::panorama::Panorama;
use prism_log::debug;
use prism_pal::prelude::*;

use crate::{
    dispatch_size,
    error::IblError,
    faces::{FaceSets, FACE_SET},
    mip::compute_pipeline,
    shaders,
};

pub(crate) const PANORAMA_SAMPLER_BINDING: u32 = 0;
pub(crate) const PANORAMA_BINDING: u32 = 1;
pub(crate) const CUBE_BINDING: u32 = 2;

/// Longitude wraps around the seam. Latitude stops at the poles. `Rgba32SFloat` isn't filterable,
/// so texels are fetched without filtering.
pub const PANORAMA_SAMPLER: Sampler = Sampler {
    min_filter: Filter::Nearest,
    mag_filter: Filter::Nearest,
    mipmap_filter: Filter::Nearest,
    address_u: SamplerAddressMode::Repeat,
    address_v: SamplerAddressMode::ClampToEdge,
    address_w: SamplerAddressMode::ClampToEdge,
    min_lod: unsafe { NotNan::new_unchecked(0.0) },
    max_lod: None,
};

/// Projects an equirectangular panorama onto mip 0 of a cube map, one dispatch per face.
pub struct PanoramaResampler<B: Backend> {
    ctx: Context<B>,
    layout: DescriptorSetLayout<B>,
    pipeline: ComputePipeline<B>,
    faces: FaceSets<B>,
}

impl<B: Backend> PanoramaResampler<B> {
    pub fn new(ctx: &Context<B>) -> Result<Self, IblError> {
        let layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    DescriptorBinding {
                        binding: PANORAMA_SAMPLER_BINDING,
                        ty: DescriptorType::Sampler { filtering: false },
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: PANORAMA_BINDING,
                        ty: DescriptorType::Texture {
                            dimension: ViewDimension::D2,
                            filterable: false,
                        },
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: CUBE_BINDING,
                        ty: DescriptorType::StorageImage {
                            format: Format::Rgba16SFloat,
                            dimension: ViewDimension::D2Array,
                        },
                        stage: ShaderStage::Compute,
                    },
                ],
            },
        )?;

        let faces = FaceSets::new(ctx, "panorama_to_cube")?;
        let pipeline = compute_pipeline(
            ctx,
            vec![layout.clone(), faces.layout().clone()],
            shaders::PANORAMA_TO_CUBE,
            "panorama_to_cube",
        )?;

        Ok(Self {
            ctx: ctx.clone(),
            layout,
            pipeline,
            faces,
        })
    }

    /// Uploads `panorama` and writes every face of mip 0 of `cube`. Other mips are untouched.
    ///
    /// # Panics
    /// - If `cube` is not an `Rgba16SFloat` cube map with storage usage.
    pub fn resample(&self, panorama: &Panorama, cube: &Texture<B>) -> Result<(), IblError> {
        assert_eq!(cube.ty(), TextureType::CubeMap, "resample target must be a cube map");
        assert_eq!(cube.array_elements(), CUBE_FACE_COUNT);
        assert_eq!(cube.format(), Format::Rgba16SFloat, "resample target must be Rgba16SFloat");
        assert!(
            cube.usage().contains(TextureUsage::STORAGE),
            "resample target must be a storage image"
        );

        let (size, _) = cube.dims();
        debug!(
            "resampling {}x{} panorama to {size}x{size} cube",
            panorama.width(),
            panorama.height()
        );

        let source = Texture::new(
            self.ctx.clone(),
            TextureCreateInfo {
                format: Format::Rgba32SFloat,
                ty: TextureType::Type2D,
                width: panorama.width(),
                height: panorama.height(),
                array_elements: 1,
                mip_levels: 1,
                texture_usage: TextureUsage::SAMPLED | TextureUsage::TRANSFER_DST,
                debug_name: Some("panorama".into()),
            },
        )?;
        source.write(0, 0, panorama.as_bytes())?;

        let mut set = DescriptorSet::new(
            self.ctx.clone(),
            DescriptorSetCreateInfo {
                layout: self.layout.clone(),
                debug_name: Some("panorama_to_cube_set".into()),
            },
        )?;
        set.update(&[
            DescriptorSetUpdate {
                binding: PANORAMA_SAMPLER_BINDING,
                value: DescriptorValue::Sampler(PANORAMA_SAMPLER),
            },
            DescriptorSetUpdate {
                binding: PANORAMA_BINDING,
                value: DescriptorValue::Texture {
                    texture: &source,
                    base_mip: 0,
                    mip_count: 1,
                },
            },
            DescriptorSetUpdate {
                binding: CUBE_BINDING,
                value: DescriptorValue::StorageImage {
                    texture: cube,
                    mip: 0,
                },
            },
        ])?;

        self.ctx.main().submit(Some("panorama_to_cube"), |commands| {
            for face in CubeFace::ALL {
                commands.compute_pass(&self.pipeline, Some("panorama_to_cube"), |pass| {
                    pass.bind_sets(0, vec![&set]);
                    pass.bind_sets(FACE_SET, vec![self.faces.set(face)]);
                    dispatch_size(size, size)
                });
            }
        });

        Ok(())
    }
}
