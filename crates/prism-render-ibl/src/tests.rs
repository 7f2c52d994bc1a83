use prism_formats::{environment::Environment, panorama::Panorama};
use prism_math::{direction_to_face_uv, Vec3};
use prism_pal::{
    backend::{DispatchRecord, SoftwareBackend, SoftwareBackendCreateInfo, TraceEvent},
    prelude::*,
};

use crate::{
    faces::{FaceUniform, FACE_SET, FACE_SET_UNIFORM_BINDING},
    kernels,
    mip::{MIP_DST_BINDING, MIP_SRC_BINDING},
    precompute::*,
    resample::{CUBE_BINDING, PANORAMA_BINDING, PANORAMA_SAMPLER_BINDING},
    shaders, *,
};

fn context_with_limit(max_texture_dimension_2d: u32) -> Context<SoftwareBackend> {
    Context::new(SoftwareBackend::new(SoftwareBackendCreateInfo {
        kernels: kernels::software_kernels(),
        limits: GraphicsLimits {
            max_texture_dimension_2d,
            min_uniform_buffer_offset_alignment: 256,
        },
    }))
}

fn context() -> Context<SoftwareBackend> {
    context_with_limit(8192)
}

fn small_settings() -> IblSettings {
    IblSettings {
        irradiance_size: 4,
        specular_size: 8,
        brdf_lut_size: 8,
        max_panorama_width: 4096,
        irradiance_sample_delta: 0.25,
        specular_base_samples: 4,
        specular_max_samples: 16,
        brdf_samples: 16,
    }
}

fn panorama(width: u32, texel: impl Fn(u32, u32) -> [f32; 4]) -> Panorama {
    let height = width / 2;
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend(texel(x, y));
        }
    }
    Panorama::from_rgba32f(width, height, data, 4096).unwrap()
}

fn uniform_environment(width: u32, color: [f32; 4]) -> Environment {
    Environment::new("uniform", panorama(width, |_, _| color))
}

fn dispatches<'a>(
    trace: &'a [TraceEvent],
    pipeline: &'a str,
) -> impl Iterator<Item = &'a DispatchRecord> + 'a {
    trace
        .iter()
        .filter_map(TraceEvent::as_dispatch)
        .filter(move |d| d.pipeline.as_deref() == Some(pipeline))
}

fn faces_of(trace: &[TraceEvent], pipeline: &str) -> Vec<u32> {
    dispatches(trace, pipeline)
        .map(|d| d.uniform::<FaceUniform>(1, 0).unwrap().face)
        .collect()
}

fn assert_texel_eq(actual: [f32; 4], expected: [f32; 4], eps: f32) {
    for c in 0..4 {
        assert!(
            (actual[c] - expected[c]).abs() <= eps,
            "expected {expected:?} but got {actual:?}"
        );
    }
}

#[test]
fn mip_counts() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(1, 1024), 11);
    assert_eq!(mip_level_count(513, 513), 10);
    assert_eq!(mip_level_count(4096, 2048), 13);

    let info = MipKind::Float16Cube.create_info(513, 513, None);
    assert_eq!(info.mip_levels, 10);
    assert_eq!(info.array_elements, CUBE_FACE_COUNT);
    assert_eq!(mip_dim(513, 9), 1);
    assert_eq!(mip_dim(1024, 3), 128);
}

#[test]
fn helpers() {
    assert_eq!(floor_pow2(1), 1);
    assert_eq!(floor_pow2(8), 8);
    assert_eq!(floor_pow2(4095), 2048);
    assert_eq!(dispatch_size(1, 1), (1, 1, 1));
    assert_eq!(dispatch_size(8, 9), (1, 2, 1));
    assert_eq!(dispatch_size(512, 512), (64, 64, 1));
}

#[test]
fn settings() {
    let settings = IblSettings::default();
    assert_eq!(settings.irradiance_size, 64);
    assert_eq!(settings.specular_size, 512);
    assert_eq!(settings.brdf_lut_size, 128);
    assert_eq!(settings.specular_samples(0), 64);
    assert_eq!(settings.specular_samples(2), 256);
    assert_eq!(settings.specular_samples(9), 1024);
    assert_eq!(settings.specular_samples(40), 1024);

    assert_eq!(IblSettings::specular_roughness(0, 1), 0.0);
    assert_eq!(IblSettings::specular_roughness(0, 10), 0.0);
    assert_eq!(IblSettings::specular_roughness(9, 10), 1.0);

    let parsed = ron::from_str::<IblSettings>("(irradiance_size: 32, brdf_samples: 8)").unwrap();
    assert_eq!(parsed.irradiance_size, 32);
    assert_eq!(parsed.brdf_samples, 8);
    assert_eq!(parsed.specular_size, 512);
}

#[test]
fn invalid_settings_are_rejected() {
    IblSettings::default().validate().unwrap();
    small_settings().validate().unwrap();

    let ctx = context();
    let zero_size = ron::from_str::<IblSettings>("(irradiance_size: 0)").unwrap();
    let err = EnvironmentPipeline::new(&ctx, zero_size).err();
    assert!(matches!(&err, Some(IblError::Settings(msg)) if msg.contains("irradiance_size")));

    let zero_samples = IblSettings {
        brdf_samples: 0,
        ..small_settings()
    };
    let err = EnvironmentPipeline::new(&ctx, zero_samples).err();
    assert!(matches!(&err, Some(IblError::Settings(msg)) if msg.contains("brdf_samples")));

    for delta in [0.0, -0.1, f32::NAN, f32::INFINITY] {
        let settings = IblSettings {
            irradiance_sample_delta: delta,
            ..small_settings()
        };
        assert!(matches!(
            settings.validate(),
            Err(IblError::Settings(msg)) if msg.contains("irradiance_sample_delta")
        ));
    }
}

#[test]
fn descriptor_update_failures_are_ibl_errors() {
    let err = IblError::from(DescriptorSetUpdateError::OutOfMemory);
    assert!(matches!(
        err,
        IblError::DescriptorSetUpdate(DescriptorSetUpdateError::OutOfMemory)
    ));
    assert_eq!(
        err.to_string(),
        "descriptor set update failed: out of device memory"
    );
    assert_eq!(
        IblError::from(TextureCreateError::OutOfMemory).to_string(),
        "texture creation failed: out of device memory"
    );
}

#[test]
fn uniform_panorama_stays_constant() {
    let ctx = context();
    let resampler = PanoramaResampler::new(&ctx).unwrap();
    let mips = MipGenerator::new(&ctx).unwrap();
    let cube = Texture::new(ctx.clone(), MipKind::Float16Cube.create_info(8, 8, None)).unwrap();

    let color = [0.25, 0.5, 0.75, 1.0];
    resampler
        .resample(uniform_environment(32, color).panorama(), &cube)
        .unwrap();
    mips.generate(&cube, MipKind::Float16Cube).unwrap();

    let data = MipData::read_all(&cube).unwrap();
    assert_eq!(data.len(), 4);
    for mip in &data {
        for texel in mip.texels() {
            assert_texel_eq(texel, color, 1e-3);
        }
    }
}

#[test]
fn faces_match_panorama_regions() {
    let palette = [
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 1.0],
        [1.0, 1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0, 1.0],
        [1.0, 0.0, 1.0, 1.0],
    ];

    // Color every panorama texel by the cube face its direction falls on.
    let width = 64;
    let height = width / 2;
    let pano = panorama(width, |x, y| {
        let u = (x as f32 + 0.5) / width as f32;
        let v = (y as f32 + 0.5) / height as f32;
        let theta = (u * 2.0 - 1.0) * std::f32::consts::PI;
        let phi = -(v * 2.0 - 1.0) * std::f32::consts::FRAC_PI_2;
        let dir = Vec3::new(phi.cos() * theta.cos(), phi.sin(), phi.cos() * theta.sin());
        palette[direction_to_face_uv(dir).0]
    });

    let ctx = context();
    let resampler = PanoramaResampler::new(&ctx).unwrap();
    let cube = Texture::new(ctx.clone(), MipKind::Float16Cube.create_info(8, 8, None)).unwrap();
    resampler.resample(&pano, &cube).unwrap();

    let mip = &MipData::read_all(&cube).unwrap()[0];
    for (face, color) in palette.iter().enumerate() {
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            assert_texel_eq(mip.texel(face, x, y), *color, 1e-3);
        }
    }

    let trace = ctx.backend().take_trace();
    assert_eq!(faces_of(&trace, "panorama_to_cube_pipeline"), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn linear_mips_average_previous_level() {
    let ctx = context();
    let mips = MipGenerator::new(&ctx).unwrap();
    let texture =
        Texture::new(ctx.clone(), MipKind::LinearUNorm2D.create_info(4, 2, None)).unwrap();
    assert_eq!(texture.mip_count(), 3);

    let red = [0u8, 100, 200, 40, 20, 40, 0, 0];
    let bytes: Vec<u8> = red.iter().flat_map(|r| [*r, 0, 0, 255]).collect();
    texture.write(0, 0, &bytes).unwrap();
    mips.generate(&texture, MipKind::LinearUNorm2D).unwrap();

    assert_eq!(texture.read(0, 1).unwrap(), vec![40, 0, 0, 255, 60, 0, 0, 255]);
    assert_eq!(texture.read(0, 2).unwrap(), vec![50, 0, 0, 255]);

    let trace = ctx.backend().take_trace();
    let groups: Vec<_> = dispatches(&trace, "mip_2d_pipeline").map(|d| d.groups).collect();
    assert_eq!(groups, vec![(1, 1, 1), (1, 1, 1)]);
}

#[test]
fn normal_mips_are_renormalized() {
    let ctx = context();
    let mips = MipGenerator::new(&ctx).unwrap();
    let texture = Texture::new(ctx.clone(), MipKind::Normal2D.create_info(2, 2, None)).unwrap();

    let encode = |n: Vec3| {
        let e = n * 0.5 + 0.5;
        [e.x, e.y, e.z, 1.0].map(|c| (c * 255.0).round() as u8)
    };
    let decode = |b: &[u8]| Vec3::new(b[0] as f32, b[1] as f32, b[2] as f32) / 255.0 * 2.0 - 1.0;

    let normals = [
        Vec3::new(0.6, 0.0, 0.8),
        Vec3::new(-0.6, 0.0, 0.8),
        Vec3::new(0.0, 0.6, 0.8),
        Vec3::new(0.0, -0.6, 0.8),
    ];
    let bytes: Vec<u8> = normals.iter().flat_map(|n| encode(*n)).collect();
    texture.write(0, 0, &bytes).unwrap();

    // Averaging without re-normalizing shortens the normal.
    let naive = bytes.chunks_exact(4).map(decode).sum::<Vec3>() / 4.0;
    assert!(naive.length() < 0.9);

    mips.generate(&texture, MipKind::Normal2D).unwrap();
    let n = decode(&texture.read(0, 1).unwrap());
    assert!((n.length() - 1.0).abs() < 0.02, "{n:?} is not unit length");
    assert!(n.z > 0.99);
}

#[test]
fn srgb_mips_are_rendered() {
    let ctx = context();
    let mips = MipGenerator::new(&ctx).unwrap();
    let texture = Texture::new(ctx.clone(), MipKind::Srgb2D.create_info(2, 2, None)).unwrap();

    let bytes = [255u8, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, 255];
    texture.write(0, 0, &bytes).unwrap();
    mips.generate(&texture, MipKind::Srgb2D).unwrap();

    // The average is taken in linear space.
    let mip = &MipData::read_all(&texture).unwrap()[1];
    assert_texel_eq(mip.texel(0, 0, 0), [0.5, 0.5, 0.5, 1.0], 0.01);

    let trace = ctx.backend().take_trace();
    let draws: Vec<_> = trace
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Draw(draw) => Some(draw),
            _ => None,
        })
        .collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].pipeline.as_deref(), Some("mip_srgb_pipeline"));
    assert_eq!(draws[0].target_dims, (1, 1));
    assert_eq!(draws[0].vertex_count, 3);
}

#[test]
#[should_panic]
fn mip_kind_must_match_format() {
    let ctx = context();
    let mips = MipGenerator::new(&ctx).unwrap();
    let texture =
        Texture::new(ctx.clone(), MipKind::LinearUNorm2D.create_info(4, 4, None)).unwrap();
    let _ = mips.generate(&texture, MipKind::Float16Cube);
}

#[test]
#[should_panic]
fn mip_chain_must_be_complete() {
    let ctx = context();
    let mips = MipGenerator::new(&ctx).unwrap();
    let mut info = MipKind::Float16Cube.create_info(8, 8, None);
    info.mip_levels = 2;
    let texture = Texture::new(ctx.clone(), info).unwrap();
    let _ = mips.generate(&texture, MipKind::Float16Cube);
}

#[test]
fn starts_with_flat_set() {
    let ctx = context();
    let pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();
    assert_eq!(pipeline.state(), EnvironmentState::Uninitialized);

    let data = pipeline.ibl().read_back().unwrap();
    for cube in [&data.environment, &data.irradiance, &data.specular] {
        assert_eq!(cube.len(), 1);
        assert_eq!((cube[0].width, cube[0].height, cube[0].layers), (1, 1, 6));
        for texel in cube[0].texels() {
            assert_texel_eq(texel, [1.0; 4], 0.0);
        }
    }
    assert_texel_eq(data.brdf_lut[0].texel(0, 0, 0), [1.0, 0.0, 0.0, 1.0], 0.0);
}

#[test]
fn load_runs_every_stage_in_order() {
    let ctx = context();
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();
    ctx.backend().take_trace();

    pipeline
        .load_environment(&uniform_environment(16, [0.5, 0.25, 1.0, 1.0]))
        .unwrap();
    assert_eq!(pipeline.state(), EnvironmentState::Ready);

    let trace = ctx.backend().take_trace();
    let submits: Vec<_> = trace
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Submit { debug_name, .. } => debug_name.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(
        submits,
        vec![
            "panorama_to_cube",
            "mip_cube",
            "irradiance",
            "prefilter_specular",
            "integrate_brdf",
            "mip_cube",
        ]
    );

    let ibl = pipeline.ibl();
    assert_eq!(ibl.environment.dims(), (16, 16));
    assert_eq!(ibl.environment.mip_count(), 5);
    assert_eq!(ibl.irradiance.dims(), (4, 4));
    assert_eq!(ibl.irradiance.mip_count(), 3);
    assert_eq!(ibl.specular.dims(), (8, 8));
    assert_eq!(ibl.specular.mip_count(), 4);
    assert_eq!(ibl.brdf_lut.dims(), (8, 8));
    assert_eq!(ibl.brdf_lut.mip_count(), 1);
}

#[test]
fn every_per_face_pass_dispatches_faces_in_order() {
    let ctx = context();
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();
    ctx.backend().take_trace();
    pipeline
        .load_environment(&uniform_environment(16, [1.0; 4]))
        .unwrap();
    let trace = ctx.backend().take_trace();

    let in_order: Vec<u32> = (0..CUBE_FACE_COUNT as u32).collect();
    assert_eq!(faces_of(&trace, "panorama_to_cube_pipeline"), in_order);
    assert_eq!(faces_of(&trace, "irradiance_pipeline"), in_order);

    let specular = faces_of(&trace, "prefilter_specular_pipeline");
    assert_eq!(specular.len(), 4 * CUBE_FACE_COUNT);
    for chunk in specular.chunks(CUBE_FACE_COUNT) {
        assert_eq!(chunk, in_order.as_slice());
    }

    // Cube mips are generated one face at a time.
    let env_mips = faces_of(&trace, "mip_cube_pipeline");
    let expected: Vec<u32> = (0..CUBE_FACE_COUNT as u32)
        .flat_map(|face| std::iter::repeat(face).take(4))
        .collect();
    assert_eq!(env_mips[..expected.len()], expected[..]);
}

#[test]
fn specular_roughness_increases_with_mip() {
    let ctx = context();
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();
    ctx.backend().take_trace();
    pipeline
        .load_environment(&uniform_environment(16, [1.0; 4]))
        .unwrap();
    let trace = ctx.backend().take_trace();

    let mut per_face: Vec<Vec<SpecularParams>> = vec![Vec::default(); CUBE_FACE_COUNT];
    for dispatch in dispatches(&trace, "prefilter_specular_pipeline") {
        let face = dispatch.uniform::<FaceUniform>(1, 0).unwrap().face;
        let params = dispatch.uniform::<SpecularParams>(2, 0).unwrap();
        per_face[face as usize].push(params);
    }

    for params in &per_face {
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].roughness, 0.0);
        assert_eq!(params[3].roughness, 1.0);
        for pair in params.windows(2) {
            assert!(pair[1].roughness >= pair[0].roughness);
            assert!(pair[1].sample_count >= pair[0].sample_count);
            assert_eq!(pair[1].mip, pair[0].mip + 1);
        }
        assert_eq!(
            params.iter().map(|p| p.sample_count).collect::<Vec<_>>(),
            vec![4, 8, 16, 16]
        );
    }

    let irradiance = dispatches(&trace, "irradiance_pipeline").next().unwrap();
    let params = irradiance.uniform::<IrradianceParams>(0, 3).unwrap();
    assert_eq!(params.sample_delta, 0.25);
    assert!(params.source_lod >= 0.0 && params.source_lod <= 4.0);
}

#[test]
fn uniform_environment_gives_uniform_ibl() {
    let ctx = context();
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();
    let color = [0.5, 0.25, 1.0, 1.0];
    pipeline
        .load_environment(&uniform_environment(16, color))
        .unwrap();
    let data = pipeline.ibl().read_back().unwrap();

    // A weighted average of a constant is the constant.
    for mip in &data.specular {
        for texel in mip.texels() {
            assert_texel_eq(texel, color, 2e-3);
        }
    }

    // Every irradiance texel integrates the same field over the same hemisphere samples.
    let first = data.irradiance[0].texel(0, 0, 0);
    assert!(first[0] > 0.0);
    assert!((first[0] / first[2] - 0.5).abs() < 1e-2);
    for mip in &data.irradiance {
        for texel in mip.texels() {
            assert_texel_eq(texel, first, 2e-3);
        }
    }
}

#[test]
fn red_quadrant_scenario() {
    let ctx = context();
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();

    let red = [1.0, 0.0, 0.0, 1.0];
    let black = [0.0, 0.0, 0.0, 1.0];
    let environment = Environment::new(
        "red_quadrant",
        panorama(8, |x, y| if x < 4 && y < 2 { red } else { black }),
    );
    pipeline.load_environment(&environment).unwrap();
    assert_eq!(pipeline.ibl().environment.dims(), (8, 8));

    let data = pipeline.ibl().read_back().unwrap();

    // -Z looks into the left half of the panorama. Its upper half sees the red quadrant.
    let south = CubeFace::South.layer();
    let mip = &data.environment[0];
    for y in 0..8 {
        for x in 0..8 {
            let expected = if y < 4 { red } else { black };
            assert_texel_eq(mip.texel(south, x, y), expected, 1e-3);
        }
    }

    // The clear value is all zeros, so alpha shows every texel was written.
    let lut = &data.brdf_lut[0];
    assert_eq!((lut.width, lut.height), (8, 8));
    for texel in lut.texels() {
        assert!(texel.iter().all(|c| c.is_finite()));
        assert_eq!(texel[3], 1.0);
        assert!(texel[0] >= 0.0 && texel[1] >= 0.0);
        assert!(texel[0] + texel[1] <= 1.05);
    }
}

#[test]
fn failed_reload_keeps_previous_set() {
    let ctx = context_with_limit(16);
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();

    let green = [0.0, 1.0, 0.0, 1.0];
    pipeline
        .load_environment(&uniform_environment(16, green))
        .unwrap();
    assert_eq!(pipeline.state(), EnvironmentState::Ready);

    let err = pipeline
        .load_environment(&uniform_environment(64, [1.0; 4]))
        .unwrap_err();
    assert!(matches!(
        err,
        IblError::Texture(TextureCreateError::TooLarge(64, 16))
    ));
    assert_eq!(pipeline.state(), EnvironmentState::Ready);

    let ibl = pipeline.ibl();
    assert_eq!(ibl.environment.dims(), (16, 16));
    let data = ibl.read_back().unwrap();
    for texel in data.environment[0].texels() {
        assert_texel_eq(texel, green, 1e-3);
    }
}

#[test]
fn failed_first_load_is_unavailable() {
    let ctx = context_with_limit(16);
    let mut pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();

    assert!(pipeline
        .load_environment(&uniform_environment(64, [1.0; 4]))
        .is_err());
    assert_eq!(pipeline.state(), EnvironmentState::Unavailable);
    assert_eq!(pipeline.ibl().environment.dims(), (1, 1));
}

#[test]
fn shading_contract_binds() {
    let ctx = context();
    let pipeline = EnvironmentPipeline::new(&ctx, small_settings()).unwrap();

    let layout = DescriptorSetLayout::new(
        ctx.clone(),
        DescriptorSetLayoutCreateInfo {
            bindings: IblTextures::<SoftwareBackend>::layout_bindings(2, ShaderStage::Fragment),
        },
    )
    .unwrap();
    let bindings = layout.bindings();
    assert_eq!(bindings.len(), 6);
    assert_eq!(bindings[0].binding, 2);
    assert_eq!(
        bindings[3].ty,
        DescriptorType::Texture {
            dimension: ViewDimension::D2,
            filterable: true
        }
    );

    let mut set = DescriptorSet::new(
        ctx.clone(),
        DescriptorSetCreateInfo {
            layout,
            debug_name: None,
        },
    )
    .unwrap();
    set.update(&pipeline.ibl().updates(2)).unwrap();
}

/// Parses and validates `code`, panicking with a rendered diagnostic on failure.
fn validated(code: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(code)
        .unwrap_or_else(|err| panic!("{}", err.emit_to_string(code)));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .unwrap_or_else(|err| panic!("{}", err.emit_to_string(code)));
    module
}

fn resource_binding(module: &naga::Module, name: &str) -> (usize, u32) {
    module
        .global_variables
        .iter()
        .find(|(_, var)| var.name.as_deref() == Some(name))
        .and_then(|(_, var)| var.binding.as_ref())
        .map(|binding| (binding.group as usize, binding.binding))
        .unwrap_or_else(|| panic!("`{name}` is not a bound resource"))
}

fn assert_compute_entry(module: &naga::Module, name: &str) {
    let entry = module
        .entry_points
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("missing entry point `{name}`"));
    assert_eq!(entry.stage, naga::ShaderStage::Compute);
    assert_eq!(entry.workgroup_size, [TILE_SIZE, TILE_SIZE, 1]);
}

#[test]
fn shaders_validate() {
    for code in [
        shaders::MIP_2D,
        shaders::MIP_NORMAL_2D,
        shaders::MIP_CUBE,
        shaders::DOWNSAMPLE,
        shaders::PANORAMA_TO_CUBE,
        shaders::IRRADIANCE,
        shaders::PREFILTER_SPECULAR,
        shaders::BRDF_LUT,
    ] {
        validated(code);
    }
}

#[test]
fn shader_bindings_match_layouts() {
    let face = (FACE_SET, FACE_SET_UNIFORM_BINDING);

    for (code, entry) in [
        (shaders::MIP_2D, "mip_2d"),
        (shaders::MIP_NORMAL_2D, "mip_normal_2d"),
        (shaders::MIP_CUBE, "mip_cube"),
    ] {
        let module = validated(code);
        assert_compute_entry(&module, entry);
        assert_eq!(resource_binding(&module, "src_mip"), (0, MIP_SRC_BINDING));
        assert_eq!(resource_binding(&module, "dst_mip"), (0, MIP_DST_BINDING));
    }
    assert_eq!(resource_binding(&validated(shaders::MIP_CUBE), "face"), face);

    let module = validated(shaders::DOWNSAMPLE);
    let stages: Vec<_> = module
        .entry_points
        .iter()
        .map(|entry| (entry.name.as_str(), entry.stage))
        .collect();
    assert!(stages.contains(&("fullscreen_vs", naga::ShaderStage::Vertex)));
    assert!(stages.contains(&("downsample_fs", naga::ShaderStage::Fragment)));
    assert_eq!(resource_binding(&module, "src_mip"), (0, MIP_SRC_BINDING));

    let module = validated(shaders::PANORAMA_TO_CUBE);
    assert_compute_entry(&module, "panorama_to_cube");
    assert_eq!(
        resource_binding(&module, "panorama_sampler"),
        (0, PANORAMA_SAMPLER_BINDING)
    );
    assert_eq!(resource_binding(&module, "panorama"), (0, PANORAMA_BINDING));
    assert_eq!(resource_binding(&module, "cube"), (0, CUBE_BINDING));
    assert_eq!(resource_binding(&module, "face"), face);

    let module = validated(shaders::IRRADIANCE);
    assert_compute_entry(&module, "irradiance");
    assert_eq!(
        resource_binding(&module, "environment_sampler"),
        (0, ENVIRONMENT_SAMPLER_BINDING)
    );
    assert_eq!(
        resource_binding(&module, "environment"),
        (0, ENVIRONMENT_BINDING)
    );
    assert_eq!(
        resource_binding(&module, "irradiance_map"),
        (0, IRRADIANCE_BINDING)
    );
    assert_eq!(
        resource_binding(&module, "params"),
        (0, IRRADIANCE_PARAMS_BINDING)
    );
    assert_eq!(resource_binding(&module, "face"), face);

    let module = validated(shaders::PREFILTER_SPECULAR);
    assert_compute_entry(&module, "prefilter_specular");
    assert_eq!(
        resource_binding(&module, "environment_sampler"),
        (0, ENVIRONMENT_SAMPLER_BINDING)
    );
    assert_eq!(
        resource_binding(&module, "environment"),
        (0, ENVIRONMENT_BINDING)
    );
    assert_eq!(resource_binding(&module, "face"), face);
    assert_eq!(
        resource_binding(&module, "params"),
        (SPECULAR_MIP_SET, SPECULAR_PARAMS_BINDING)
    );
    assert_eq!(
        resource_binding(&module, "specular_mip"),
        (SPECULAR_MIP_SET, SPECULAR_MIP_BINDING)
    );

    let module = validated(shaders::BRDF_LUT);
    assert_compute_entry(&module, "integrate_brdf");
    assert_eq!(resource_binding(&module, "brdf_lut"), (0, BRDF_LUT_BINDING));
    assert_eq!(resource_binding(&module, "params"), (0, BRDF_PARAMS_BINDING));
}
