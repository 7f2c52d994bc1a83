use std::f32::consts::FRAC_PI_2;

use prism_formats::{environment::Environment, panorama::Panorama};
use prism_log::LevelFilter;
use prism_math::Vec3;
use prism_pal::{
    backend::{SoftwareBackend, SoftwareBackendCreateInfo},
    prelude::*,
};
use prism_render_ibl::{kernels, EnvironmentState, IblError};

use crate::{registry::software, *};

fn small_settings() -> RendererSettings {
    RendererSettings::from_ron(
        "(ibl: (irradiance_size: 4, specular_size: 8, brdf_lut_size: 8, \
         irradiance_sample_delta: 0.5, specular_base_samples: 4, specular_max_samples: 8, \
         brdf_samples: 8))",
    )
    .unwrap()
}

fn environment(width: u32, color: [f32; 4]) -> Environment {
    let height = width / 2;
    let data = color.repeat((width * height) as usize);
    Environment::new(
        "test",
        Panorama::from_rgba32f(width, height, data, 4096).unwrap(),
    )
}

/// Software renderer that refuses textures larger than 16 texels.
fn constrained(settings: &RendererSettings) -> Result<Box<dyn Renderer>, RendererError> {
    let backend = SoftwareBackend::new(SoftwareBackendCreateInfo {
        kernels: kernels::software_kernels(),
        limits: GraphicsLimits {
            max_texture_dimension_2d: 16,
            min_uniform_buffer_offset_alignment: 256,
        },
    });
    Ok(Box::new(IblRenderer::new(
        "constrained",
        Context::new(backend),
        settings,
    )?))
}

#[test]
fn default_backends() {
    let registry = BackendRegistry::with_defaults();
    assert!(registry.contains("software"));

    #[cfg(feature = "webgpu")]
    assert_eq!(
        registry.available_backends(),
        vec!["software", "vulkan", "webgpu"]
    );
    #[cfg(not(feature = "webgpu"))]
    assert_eq!(registry.available_backends(), vec!["software"]);

    assert!(BackendRegistry::new().available_backends().is_empty());
}

#[test]
fn duplicate_registration() {
    let mut registry = BackendRegistry::new();
    registry.register("custom", constrained).unwrap();
    assert!(matches!(
        registry.register("custom", software),
        Err(RegistryError::Duplicate(name)) if name == "custom"
    ));
}

#[test]
fn unknown_backend() {
    let registry = BackendRegistry::with_defaults();
    match registry.create(Some("metal"), &small_settings()) {
        Err(RegistryError::Unknown { name, available }) => {
            assert_eq!(name, "metal");
            assert_eq!(available, registry.available_backends());
        }
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("created an unregistered backend"),
    }
}

#[test]
fn unnamed_backend_uses_default() {
    let mut registry = BackendRegistry::new();
    registry
        .register(DEFAULT_BACKEND, software)
        .unwrap();
    let renderer = registry.create(None, &small_settings()).unwrap();
    assert_eq!(renderer.backend_name(), "software");

    let empty = BackendRegistry::new();
    assert!(matches!(
        empty.create(None, &small_settings()),
        Err(RegistryError::Unknown { name, .. }) if name == DEFAULT_BACKEND
    ));
}

#[test]
fn software_renderer_bakes_environment() {
    let registry = BackendRegistry::with_defaults();
    let mut renderer = registry.create(Some("software"), &small_settings()).unwrap();
    assert_eq!(renderer.backend_name(), "software");
    assert_eq!(renderer.properties().adapter_name, "software");
    assert_eq!(renderer.environment_state(), EnvironmentState::Uninitialized);

    renderer
        .update_environment(&environment(16, [0.25, 0.5, 1.0, 1.0]))
        .unwrap();
    assert_eq!(renderer.environment_state(), EnvironmentState::Ready);

    let ibl = renderer.read_ibl().unwrap();
    assert_eq!(ibl.environment.len(), 5);
    assert_eq!(ibl.irradiance.len(), 3);
    assert_eq!(ibl.specular.len(), 4);
    assert_eq!(ibl.brdf_lut.len(), 1);
    assert_eq!(ibl.environment[0].width, 16);
    assert_eq!(ibl.environment[0].layers, CUBE_FACE_COUNT);
}

#[test]
fn rotation_leaves_lighting_untouched() {
    let mut renderer = software(&small_settings()).unwrap();
    renderer
        .update_environment(&environment(16, [1.0, 0.5, 0.25, 1.0]))
        .unwrap();
    let before = renderer.read_ibl().unwrap();

    renderer.set_environment_rotation(FRAC_PI_2);
    let rotated = renderer.environment_transform().transform_vector3(Vec3::X);
    assert!((rotated - Vec3::NEG_Z).length() < 1e-5);

    let after = renderer.read_ibl().unwrap();
    assert_eq!(before.environment[0].data, after.environment[0].data);
    assert_eq!(before.specular[0].data, after.specular[0].data);
    assert_eq!(renderer.environment_state(), EnvironmentState::Ready);
}

#[test]
fn rotation_comes_from_environment() {
    let mut renderer = software(&small_settings()).unwrap();
    assert!(renderer
        .environment_transform()
        .abs_diff_eq(prism_math::Mat4::IDENTITY, 1e-6));

    let mut env = environment(16, [1.0; 4]);
    env.set_rotation(FRAC_PI_2);
    renderer.update_environment(&env).unwrap();
    assert!(renderer.environment_transform().abs_diff_eq(env.transform(), 1e-6));
}

#[test]
fn failed_update_reports_error() {
    let mut renderer = constrained(&small_settings()).unwrap();
    let err = renderer
        .update_environment(&environment(64, [1.0; 4]))
        .unwrap_err();
    assert!(matches!(
        err,
        RendererError::Ibl(IblError::Texture(TextureCreateError::TooLarge(64, 16)))
    ));
    assert_eq!(renderer.environment_state(), EnvironmentState::Unavailable);

    renderer
        .update_environment(&environment(16, [1.0; 4]))
        .unwrap();
    assert_eq!(renderer.environment_state(), EnvironmentState::Ready);
}

#[test]
fn invalid_settings_fail_renderer_creation() {
    let settings = RendererSettings::from_ron("(ibl: (specular_size: 0))").unwrap();
    let err = software(&settings).err();
    assert!(matches!(
        &err,
        Some(RendererError::Ibl(IblError::Settings(msg))) if msg.contains("specular_size")
    ));
}

#[test]
fn settings_from_ron() {
    let settings = RendererSettings::from_ron(
        "(backend: Some(\"software\"), ibl: (irradiance_size: 32), log_level: Warn)",
    )
    .unwrap();
    assert_eq!(settings.backend.as_deref(), Some("software"));
    assert_eq!(settings.ibl.irradiance_size, 32);
    assert_eq!(settings.ibl.specular_size, 512);
    assert_eq!(settings.log_level, LevelFilter::Warn);

    let partial = RendererSettings::from_ron("(backend: None)").unwrap();
    assert_eq!(partial, RendererSettings::default());
    assert!(matches!(
        RendererSettings::from_ron("(backend: 4)"),
        Err(SettingsError::Parse(_))
    ));
    assert!(matches!(
        RendererSettings::load("/nonexistent/prism.ron"),
        Err(SettingsError::Io(_))
    ));
}
