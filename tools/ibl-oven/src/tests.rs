use prism_formats::panorama::Panorama;
use prism_pal::prelude::{Filter, Format, CUBE_FACE_COUNT};
use prism_render::registry::software;

use super::*;

fn settings() -> RendererSettings {
    RendererSettings::from_ron(
        "(ibl: (irradiance_size: 4, specular_size: 4, brdf_lut_size: 4, \
         irradiance_sample_delta: 0.5, specular_base_samples: 4, specular_max_samples: 4, \
         brdf_samples: 4))",
    )
    .unwrap()
}

#[test]
fn writes_every_product() {
    let out = std::env::temp_dir().join(format!("ibl-oven-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&out);

    let panorama = Panorama::from_rgba32f(16, 8, [0.5f32; 4].repeat(16 * 8), 4096).unwrap();
    let environment = Environment::new("sky", panorama);
    let mut renderer = software(&settings()).unwrap();
    bake(renderer.as_mut(), &environment, &out, "sky").unwrap();

    let header: CubeMapHeader =
        bincode::deserialize(&std::fs::read(out.join("sky.prism_cube/header")).unwrap())
            .unwrap();
    assert_eq!(header.size, 16);
    assert_eq!(header.mip_count, 5);
    assert_eq!(header.format, Format::Rgba16SFloat);
    assert_eq!(header.sampler.mipmap_filter, Filter::Linear);
    for mip in 0..header.mip_count {
        let data = std::fs::read(out.join(format!("sky.prism_cube/{mip}"))).unwrap();
        assert_eq!(data.len(), header.mip_size(mip));
    }

    for name in ["sky.irr.prism_cube", "sky.spec.prism_cube"] {
        let header: CubeMapHeader =
            bincode::deserialize(&std::fs::read(out.join(name).join("header")).unwrap()).unwrap();
        assert_eq!(header.size, 4);
        assert_eq!(header.mip_count, 3);
        let last = std::fs::read(out.join(name).join("2")).unwrap();
        assert_eq!(last.len(), 8 * CUBE_FACE_COUNT);
    }

    let lut: TextureHeader =
        bincode::deserialize(&std::fs::read(out.join("sky.brdf.prism_tex/header")).unwrap())
            .unwrap();
    assert_eq!((lut.width, lut.height, lut.mip_count), (4, 4, 1));
    assert_eq!(lut.sampler.mipmap_filter, Filter::Nearest);
    assert_eq!(
        std::fs::read(out.join("sky.brdf.prism_tex/0")).unwrap().len(),
        4 * 4 * 8
    );

    std::fs::remove_dir_all(&out).unwrap();
}
