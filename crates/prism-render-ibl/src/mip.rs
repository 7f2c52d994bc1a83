use prism_log::debug;
use prism_pal::prelude::*;

use crate::{
    dispatch_size,
    error::IblError,
    faces::{FaceSets, FACE_SET},
    shaders, TILE_SIZE,
};

pub(crate) const MIP_SRC_BINDING: u32 = 0;
pub(crate) const MIP_DST_BINDING: u32 = 1;

/// Selects how [`MipGenerator`] filters a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MipKind {
    /// `Rgba8Unorm` data averaged per channel (ORM, AO, masks).
    LinearUNorm2D,
    /// `Rgba8Unorm` tangent space normals. Normals are decoded, averaged and re-normalized before
    /// being encoded again.
    Normal2D,
    /// `Rgba16SFloat` cube maps. Every face is filtered by its own dispatch.
    Float16Cube,
    /// `Rgba8Srgb` color. sRGB formats can't be storage images, so each mip is rendered with a
    /// fullscreen triangle instead.
    Srgb2D,
}

impl MipKind {
    #[inline(always)]
    pub fn format(&self) -> Format {
        match self {
            MipKind::LinearUNorm2D | MipKind::Normal2D => Format::Rgba8Unorm,
            MipKind::Float16Cube => Format::Rgba16SFloat,
            MipKind::Srgb2D => Format::Rgba8Srgb,
        }
    }

    #[inline(always)]
    pub fn texture_type(&self) -> TextureType {
        match self {
            MipKind::Float16Cube => TextureType::CubeMap,
            _ => TextureType::Type2D,
        }
    }

    /// Usage a texture must have to be mipped with this kind.
    #[inline(always)]
    pub fn required_usage(&self) -> TextureUsage {
        match self {
            MipKind::Srgb2D => TextureUsage::SAMPLED | TextureUsage::COLOR_ATTACHMENT,
            _ => TextureUsage::SAMPLED | TextureUsage::STORAGE,
        }
    }

    /// Describes a texture with a full mip chain that can be filled in by [`MipGenerator`] and
    /// transferred to and from the host.
    pub fn create_info(
        &self,
        width: u32,
        height: u32,
        debug_name: Option<String>,
    ) -> TextureCreateInfo {
        let ty = self.texture_type();
        TextureCreateInfo {
            format: self.format(),
            ty,
            width,
            height,
            array_elements: match ty {
                TextureType::CubeMap => CUBE_FACE_COUNT,
                TextureType::Type2D => 1,
            },
            mip_levels: mip_level_count(width, height),
            texture_usage: self.required_usage()
                | TextureUsage::TRANSFER_DST
                | TextureUsage::TRANSFER_SRC,
            debug_name,
        }
    }
}

/// Fills in the mip chain of a texture from its base level. Every level is filtered from the
/// level directly above it.
pub struct MipGenerator<B: Backend> {
    ctx: Context<B>,
    layout_2d: DescriptorSetLayout<B>,
    layout_cube: DescriptorSetLayout<B>,
    layout_srgb: DescriptorSetLayout<B>,
    linear_pipeline: ComputePipeline<B>,
    normal_pipeline: ComputePipeline<B>,
    cube_pipeline: ComputePipeline<B>,
    srgb_pipeline: GraphicsPipeline<B>,
    faces: FaceSets<B>,
}

impl<B: Backend> MipGenerator<B> {
    pub fn new(ctx: &Context<B>) -> Result<Self, IblError> {
        let layout_2d = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    DescriptorBinding {
                        binding: MIP_SRC_BINDING,
                        ty: DescriptorType::Texture {
                            dimension: ViewDimension::D2,
                            filterable: true,
                        },
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: MIP_DST_BINDING,
                        ty: DescriptorType::StorageImage {
                            format: Format::Rgba8Unorm,
                            dimension: ViewDimension::D2,
                        },
                        stage: ShaderStage::Compute,
                    },
                ],
            },
        )?;

        let layout_cube = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![
                    DescriptorBinding {
                        binding: MIP_SRC_BINDING,
                        ty: DescriptorType::Texture {
                            dimension: ViewDimension::D2Array,
                            filterable: true,
                        },
                        stage: ShaderStage::Compute,
                    },
                    DescriptorBinding {
                        binding: MIP_DST_BINDING,
                        ty: DescriptorType::StorageImage {
                            format: Format::Rgba16SFloat,
                            dimension: ViewDimension::D2Array,
                        },
                        stage: ShaderStage::Compute,
                    },
                ],
            },
        )?;

        let layout_srgb = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![DescriptorBinding {
                    binding: MIP_SRC_BINDING,
                    ty: DescriptorType::Texture {
                        dimension: ViewDimension::D2,
                        filterable: true,
                    },
                    stage: ShaderStage::Fragment,
                }],
            },
        )?;

        let faces = FaceSets::new(ctx, "mip_cube")?;

        let linear_pipeline = compute_pipeline(
            ctx,
            vec![layout_2d.clone()],
            shaders::MIP_2D,
            "mip_2d",
        )?;
        let normal_pipeline = compute_pipeline(
            ctx,
            vec![layout_2d.clone()],
            shaders::MIP_NORMAL_2D,
            "mip_normal_2d",
        )?;
        let cube_pipeline = compute_pipeline(
            ctx,
            vec![layout_cube.clone(), faces.layout().clone()],
            shaders::MIP_CUBE,
            "mip_cube",
        )?;

        let srgb_pipeline = GraphicsPipeline::new(
            ctx.clone(),
            GraphicsPipelineCreateInfo {
                stages: ShaderStages {
                    vertex: Shader::new(
                        ctx.clone(),
                        ShaderCreateInfo {
                            code: shaders::DOWNSAMPLE,
                            entry_point: "fullscreen_vs",
                            debug_name: Some("fullscreen_vs_shader".into()),
                        },
                    )?,
                    fragment: Shader::new(
                        ctx.clone(),
                        ShaderCreateInfo {
                            code: shaders::DOWNSAMPLE,
                            entry_point: "downsample_fs",
                            debug_name: Some("downsample_fs_shader".into()),
                        },
                    )?,
                },
                layouts: vec![layout_srgb.clone()],
                color_formats: vec![Format::Rgba8Srgb],
                debug_name: Some("mip_srgb_pipeline".into()),
            },
        )?;

        Ok(Self {
            ctx: ctx.clone(),
            layout_2d,
            layout_cube,
            layout_srgb,
            linear_pipeline,
            normal_pipeline,
            cube_pipeline,
            srgb_pipeline,
            faces,
        })
    }

    /// Generates mips `1..mip_count` of `texture` from its base level.
    ///
    /// # Panics
    /// - If the texture doesn't have a full mip chain.
    /// - If the format, type or usage of the texture doesn't match `kind`.
    pub fn generate(&self, texture: &Texture<B>, kind: MipKind) -> Result<(), IblError> {
        let (width, height) = texture.dims();
        assert_eq!(
            texture.mip_count(),
            mip_level_count(width, height),
            "a {width}x{height} texture must have a full mip chain"
        );
        assert_eq!(texture.format(), kind.format(), "format does not match {kind:?}");
        assert_eq!(texture.ty(), kind.texture_type(), "type does not match {kind:?}");
        assert!(
            texture.usage().contains(kind.required_usage()),
            "{kind:?} requires {:?} usage",
            kind.required_usage()
        );

        if texture.mip_count() == 1 {
            return Ok(());
        }

        debug!(
            "generating {} mips for {width}x{height} {kind:?} texture",
            texture.mip_count() - 1
        );

        match kind {
            MipKind::LinearUNorm2D => self.generate_2d(texture, &self.linear_pipeline),
            MipKind::Normal2D => self.generate_2d(texture, &self.normal_pipeline),
            MipKind::Float16Cube => self.generate_cube(texture),
            MipKind::Srgb2D => self.generate_srgb(texture),
        }
    }

    fn generate_2d(
        &self,
        texture: &Texture<B>,
        pipeline: &ComputePipeline<B>,
    ) -> Result<(), IblError> {
        let sets = self.mip_sets(texture, &self.layout_2d, "mip_2d_set", true)?;

        self.ctx.main().submit(Some("mip_2d"), |commands| {
            for (i, set) in sets.iter().enumerate() {
                let (w, h) = texture.mip_dims(i + 1);
                commands.compute_pass(pipeline, Some("mip_2d"), |pass| {
                    pass.bind_sets(0, vec![set]);
                    dispatch_size(w, h)
                });
            }
        });

        Ok(())
    }

    fn generate_cube(&self, texture: &Texture<B>) -> Result<(), IblError> {
        let sets = self.mip_sets(texture, &self.layout_cube, "mip_cube_set", true)?;

        self.ctx.main().submit(Some("mip_cube"), |commands| {
            for face in CubeFace::ALL {
                for (i, set) in sets.iter().enumerate() {
                    let (w, h) = texture.mip_dims(i + 1);
                    commands.compute_pass(&self.cube_pipeline, Some("mip_cube"), |pass| {
                        pass.bind_sets(0, vec![set]);
                        pass.bind_sets(FACE_SET, vec![self.faces.set(face)]);
                        dispatch_size(w, h)
                    });
                }
            }
        });

        Ok(())
    }

    fn generate_srgb(&self, texture: &Texture<B>) -> Result<(), IblError> {
        let sets = self.mip_sets(texture, &self.layout_srgb, "mip_srgb_set", false)?;

        self.ctx.main().submit(Some("mip_srgb"), |commands| {
            for (i, set) in sets.iter().enumerate() {
                commands.render_pass(
                    RenderPassDescriptor {
                        color_attachments: vec![ColorAttachment {
                            dst: ColorAttachmentDestination::Texture {
                                texture,
                                array_element: 0,
                                mip_level: i + 1,
                            },
                            load_op: LoadOp::Clear(ClearColor::RgbaF32(0.0, 0.0, 0.0, 0.0)),
                            store_op: StoreOp::Store,
                        }],
                    },
                    Some("mip_srgb"),
                    |pass| {
                        pass.bind_pipeline(self.srgb_pipeline.clone());
                        pass.bind_sets(0, vec![set]);
                        pass.draw(3, 1, 0, 0);
                    },
                );
            }
        });

        Ok(())
    }

    /// One set per mip transition. Set `i` reads mip `i` and, if `storage` is set, writes mip
    /// `i + 1`.
    fn mip_sets(
        &self,
        texture: &Texture<B>,
        layout: &DescriptorSetLayout<B>,
        debug_name: &str,
        storage: bool,
    ) -> Result<Vec<DescriptorSet<B>>, IblError> {
        let mut sets = Vec::with_capacity(texture.mip_count() - 1);
        for mip in 1..texture.mip_count() {
            let mut set = DescriptorSet::new(
                self.ctx.clone(),
                DescriptorSetCreateInfo {
                    layout: layout.clone(),
                    debug_name: Some(format!("{debug_name}_{mip}")),
                },
            )?;

            let mut updates = vec![DescriptorSetUpdate {
                binding: MIP_SRC_BINDING,
                value: DescriptorValue::Texture {
                    texture,
                    base_mip: mip - 1,
                    mip_count: 1,
                },
            }];
            if storage {
                updates.push(DescriptorSetUpdate {
                    binding: MIP_DST_BINDING,
                    value: DescriptorValue::StorageImage { texture, mip },
                });
            }
            set.update(&updates)?;
            sets.push(set);
        }
        Ok(sets)
    }
}

/// Builds a compute pipeline tiled by [`TILE_SIZE`]. The debug names of the shader and pipeline
/// are derived from `entry_point`.
pub(crate) fn compute_pipeline<B: Backend>(
    ctx: &Context<B>,
    layouts: Vec<DescriptorSetLayout<B>>,
    code: &str,
    entry_point: &str,
) -> Result<ComputePipeline<B>, IblError> {
    Ok(ComputePipeline::new(
        ctx.clone(),
        ComputePipelineCreateInfo {
            layouts,
            module: Shader::new(
                ctx.clone(),
                ShaderCreateInfo {
                    code,
                    entry_point,
                    debug_name: Some(format!("{entry_point}_shader")),
                },
            )?,
            work_group_size: (TILE_SIZE, TILE_SIZE, 1),
            debug_name: Some(format!("{entry_point}_pipeline")),
        },
    )?)
}
