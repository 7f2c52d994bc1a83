use api::{
    buffer::Buffer,
    compute_pipeline::{ComputePipeline, ComputePipelineCreateInfo},
    context::Context,
    descriptor_set::{
        DescriptorBinding, DescriptorSet, DescriptorSetCreateInfo, DescriptorSetLayout,
        DescriptorSetLayoutCreateInfo, DescriptorSetUpdate, DescriptorType, DescriptorValue,
    },
    shader::{Shader, ShaderCreateInfo},
    texture::{Sampler, Texture, TextureCreateInfo},
    types::*,
};
use half::f16;
use ordered_float::NotNan;
use prism_math::{Vec2, Vec3};

use super::*;

fn fill_kernel(inv: &Invocation) {
    let value: f32 = inv.bindings.uniform(0, 0);
    let (w, h) = inv.bindings.storage_dims(0, 1);
    if inv.global_id.x >= w || inv.global_id.y >= h {
        return;
    }
    inv.store(0, 1, inv.global_id.x, inv.global_id.y, 0, [value, inv.global_id.x as f32, 0.0, 1.0]);
}

fn context() -> Context<SoftwareBackend> {
    let mut kernels = KernelTable::default();
    kernels.register("fill", Kernel::Compute(fill_kernel));
    Context::new(SoftwareBackend::new(SoftwareBackendCreateInfo {
        kernels,
        ..Default::default()
    }))
}

fn storage_texture(ctx: &Context<SoftwareBackend>, format: Format, width: u32, height: u32) -> Texture<SoftwareBackend> {
    Texture::new(
        ctx.clone(),
        TextureCreateInfo {
            format,
            width,
            height,
            texture_usage: TextureUsage::SAMPLED | TextureUsage::STORAGE | TextureUsage::TRANSFER_SRC,
            ..Default::default()
        },
    )
    .unwrap()
}

fn read_f16(texture: &Texture<SoftwareBackend>) -> Vec<f32> {
    texture
        .read(0, 0)
        .unwrap()
        .chunks_exact(2)
        .map(|b| f16::from_le_bytes([b[0], b[1]]).to_f32())
        .collect()
}

#[test]
fn dispatch_writes_storage_and_records_trace() {
    let ctx = context();
    let target = storage_texture(&ctx, Format::Rgba16SFloat, 5, 3);
    let value = Buffer::new_uniform(ctx.clone(), None, &[0.5f32]).unwrap();

    let layout = DescriptorSetLayout::new(
        ctx.clone(),
        DescriptorSetLayoutCreateInfo {
            bindings: vec![
                DescriptorBinding {
                    binding: 0,
                    ty: DescriptorType::UniformBuffer,
                    stage: ShaderStage::Compute,
                },
                DescriptorBinding {
                    binding: 1,
                    ty: DescriptorType::StorageImage {
                        format: Format::Rgba16SFloat,
                        dimension: ViewDimension::D2,
                    },
                    stage: ShaderStage::Compute,
                },
            ],
        },
    )
    .unwrap();
    let module = Shader::new(
        ctx.clone(),
        ShaderCreateInfo {
            code: "",
            entry_point: "fill",
            debug_name: None,
        },
    )
    .unwrap();
    let pipeline = ComputePipeline::new(
        ctx.clone(),
        ComputePipelineCreateInfo {
            layouts: vec![layout.clone()],
            module,
            work_group_size: (4, 4, 1),
            debug_name: Some("fill".into()),
        },
    )
    .unwrap();
    let mut set = DescriptorSet::new(
        ctx.clone(),
        DescriptorSetCreateInfo {
            layout,
            debug_name: None,
        },
    )
    .unwrap();
    set.update(&[
        DescriptorSetUpdate {
            binding: 0,
            value: DescriptorValue::UniformBuffer {
                buffer: &value,
                array_element: 0,
            },
        },
        DescriptorSetUpdate {
            binding: 1,
            value: DescriptorValue::StorageImage {
                texture: &target,
                mip: 0,
            },
        },
    ])
    .unwrap();

    ctx.main()
        .submit(Some("fill_submit"), |cb| {
            cb.compute_pass(&pipeline, Some("fill_pass"), |pass| {
                pass.bind_sets(0, vec![&set]);
                (2, 1, 1)
            });
        })
        .wait_on(None);

    let texels = read_f16(&target);
    assert_eq!(texels.len(), 5 * 3 * 4);
    for y in 0..3 {
        for x in 0..5 {
            let i = (y * 5 + x) * 4;
            assert_eq!(texels[i], 0.5);
            assert_eq!(texels[i + 1], x as f32);
        }
    }

    let trace = ctx.backend().trace();
    assert_eq!(
        trace[0],
        TraceEvent::Submit {
            queue: QueueType::Main,
            debug_name: Some("fill_submit".into())
        }
    );
    let dispatch = trace[1].as_dispatch().unwrap();
    assert_eq!(dispatch.groups, (2, 1, 1));
    assert_eq!(dispatch.pipeline.as_deref(), Some("fill"));
    assert_eq!(dispatch.uniform::<f32>(0, 0), Some(0.5));
}

#[test]
#[should_panic(expected = "pipeline `fill` expects a resource at 0:1")]
fn dispatch_checks_layout_bindings() {
    let ctx = context();
    let value = Buffer::new_uniform(ctx.clone(), None, &[0.5f32]).unwrap();
    let layout = DescriptorSetLayout::new(
        ctx.clone(),
        DescriptorSetLayoutCreateInfo {
            bindings: vec![
                DescriptorBinding {
                    binding: 0,
                    ty: DescriptorType::UniformBuffer,
                    stage: ShaderStage::Compute,
                },
                DescriptorBinding {
                    binding: 1,
                    ty: DescriptorType::StorageImage {
                        format: Format::Rgba16SFloat,
                        dimension: ViewDimension::D2,
                    },
                    stage: ShaderStage::Compute,
                },
            ],
        },
    )
    .unwrap();
    let module = Shader::new(
        ctx.clone(),
        ShaderCreateInfo {
            code: "",
            entry_point: "fill",
            debug_name: None,
        },
    )
    .unwrap();
    let pipeline = ComputePipeline::new(
        ctx.clone(),
        ComputePipelineCreateInfo {
            layouts: vec![layout.clone()],
            module,
            work_group_size: (4, 4, 1),
            debug_name: Some("fill".into()),
        },
    )
    .unwrap();

    // Only the uniform is bound. The storage image declared by the layout is left empty.
    let mut set = DescriptorSet::new(
        ctx.clone(),
        DescriptorSetCreateInfo {
            layout,
            debug_name: None,
        },
    )
    .unwrap();
    set.update(&[DescriptorSetUpdate {
        binding: 0,
        value: DescriptorValue::UniformBuffer {
            buffer: &value,
            array_element: 0,
        },
    }])
    .unwrap();

    ctx.main()
        .submit(None, |cb| {
            cb.compute_pass(&pipeline, None, |pass| {
                pass.bind_sets(0, vec![&set]);
                (1, 1, 1)
            });
        })
        .wait_on(None);
}

#[test]
fn missing_entry_point_fails() {
    let ctx = context();
    let res = Shader::new(
        ctx,
        ShaderCreateInfo {
            code: "",
            entry_point: "does_not_exist",
            debug_name: None,
        },
    );
    assert!(matches!(
        res,
        Err(api::shader::ShaderCreateError::MissingEntryPoint(_))
    ));
}

#[test]
fn textures_over_the_limit_fail() {
    let ctx = Context::new(SoftwareBackend::new(SoftwareBackendCreateInfo {
        limits: GraphicsLimits {
            max_texture_dimension_2d: 16,
            min_uniform_buffer_offset_alignment: 256,
        },
        ..Default::default()
    }));
    let res = Texture::new(
        ctx,
        TextureCreateInfo {
            width: 32,
            height: 32,
            ..Default::default()
        },
    );
    assert!(matches!(
        res,
        Err(api::texture::TextureCreateError::TooLarge(32, 16))
    ));
}

#[test]
fn formats_quantize_on_store() {
    let tex = texture::Texture::new(TextureCreateInfo {
        format: Format::Rgba8Unorm,
        width: 1,
        height: 1,
        ..Default::default()
    });
    tex.store(0, 0, 0, 0, [0.5, 2.0, -1.0, 1.0]);
    assert_eq!(tex.load(0, 0, 0, 0), [128.0 / 255.0, 1.0, 0.0, 1.0]);

    let tex = texture::Texture::new(TextureCreateInfo {
        format: Format::Rgba8Srgb,
        width: 1,
        height: 1,
        ..Default::default()
    });
    tex.write_bytes(0, 0, &[188, 188, 188, 255]).unwrap();
    let texel = tex.load(0, 0, 0, 0);
    assert!((texel[0] - 0.5).abs() < 0.01);
    assert_eq!(tex.read_bytes(0, 0), vec![188, 188, 188, 255]);
}

#[test]
fn linear_sampling_and_cube_faces() {
    let tex = texture::Texture::new(TextureCreateInfo {
        format: Format::Rgba32SFloat,
        width: 2,
        height: 1,
        ..Default::default()
    });
    tex.store(0, 0, 0, 0, [0.0; 4]);
    tex.store(0, 0, 1, 0, [1.0; 4]);
    let view = TextureView {
        texture: tex,
        base_mip: 0,
        mip_count: 1,
    };
    let sampler = Sampler {
        address_u: SamplerAddressMode::ClampToEdge,
        address_v: SamplerAddressMode::ClampToEdge,
        ..Default::default()
    };
    let mid = view.sample_2d(&sampler, Vec2::new(0.5, 0.5), 0, 0.0);
    assert!((mid[0] - 0.5).abs() < 1e-6);
    let edge = view.sample_2d(&sampler, Vec2::new(0.0, 0.5), 0, 0.0);
    assert_eq!(edge[0], 0.0);

    let cube = texture::Texture::new(TextureCreateInfo {
        format: Format::Rgba32SFloat,
        ty: TextureType::CubeMap,
        width: 1,
        height: 1,
        array_elements: 6,
        ..Default::default()
    });
    for face in 0..6 {
        cube.fill(face, 0, [face as f32; 4]);
    }
    let view = TextureView {
        texture: cube,
        base_mip: 0,
        mip_count: 1,
    };
    let nearest = Sampler {
        min_filter: Filter::Nearest,
        mag_filter: Filter::Nearest,
        mipmap_filter: Filter::Nearest,
        min_lod: NotNan::new(0.0).unwrap(),
        ..Default::default()
    };
    let dirs = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
    for (face, dir) in dirs.into_iter().enumerate() {
        assert_eq!(view.sample_cube(&nearest, dir, 0.0)[0], face as f32);
    }
}
