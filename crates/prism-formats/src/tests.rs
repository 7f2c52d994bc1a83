use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use prism_pal::prelude::{Filter, Format, SamplerAddressMode};

use crate::{
    cube_map::CubeMapHeader,
    environment::Environment,
    panorama::{Panorama, PanoramaError},
    texture::Sampler,
};

fn encode_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::default();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn gradient(width: u32, height: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as f32, y as f32, 0.5, 1.0]);
        }
    }
    data
}

#[test]
fn decode_forces_opaque_alpha() {
    let bytes = encode_png(8, 4, [255, 0, 0, 0]);
    let panorama = Panorama::from_bytes(&bytes, 4096).unwrap();
    assert_eq!((panorama.width(), panorama.height()), (8, 4));
    assert_eq!(panorama.texel(3, 2), [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(panorama.as_bytes().len(), 8 * 4 * 16);
}

#[test]
fn rejects_wrong_aspect_ratio() {
    let bytes = encode_png(8, 8, [0, 0, 0, 255]);
    assert!(matches!(
        Panorama::from_bytes(&bytes, 4096),
        Err(PanoramaError::AspectRatio(8, 8))
    ));
}

#[test]
fn rejects_empty_and_garbage_input() {
    assert!(matches!(
        Panorama::from_bytes(&[], 4096),
        Err(PanoramaError::Decode(_))
    ));
    assert!(matches!(
        Panorama::from_bytes(b"not an image", 4096),
        Err(PanoramaError::Decode(_))
    ));
    assert!(matches!(
        Panorama::from_path("./does/not/exist.hdr", 4096),
        Err(PanoramaError::Io(_))
    ));
}

#[test]
fn rejects_short_texel_data() {
    assert!(matches!(
        Panorama::from_rgba32f(4, 2, vec![0.0; 3], 4096),
        Err(PanoramaError::DataSize {
            expected: 32,
            actual: 3
        })
    ));
}

#[test]
fn wide_panoramas_are_downsampled() {
    let panorama = Panorama::from_rgba32f(16, 8, gradient(16, 8), 4).unwrap();
    assert_eq!((panorama.width(), panorama.height()), (4, 2));

    // Corners map onto corners and interior texels interpolate linearly.
    assert_eq!(panorama.texel(0, 0), [0.0, 0.0, 0.5, 1.0]);
    assert_eq!(panorama.texel(3, 1), [15.0, 7.0, 0.5, 1.0]);
    let mid = panorama.texel(1, 0);
    assert!((mid[0] - 5.0).abs() < 1e-5);
}

#[test]
fn narrow_panoramas_are_untouched() {
    let data = gradient(8, 4);
    let panorama = Panorama::from_rgba32f(8, 4, data.clone(), 4096).unwrap();
    assert_eq!(panorama.data(), data.as_slice());
}

#[test]
fn rotation_updates_transform() {
    let panorama = Panorama::from_rgba32f(2, 1, vec![1.0; 8], 4096).unwrap();
    let mut environment = Environment::new("flat", panorama);
    assert_eq!(environment.transform(), prism_math::Mat4::IDENTITY);

    environment.set_rotation(std::f32::consts::FRAC_PI_2);
    let x = environment.transform().transform_vector3(prism_math::Vec3::X);
    assert!((x - prism_math::Vec3::NEG_Z).length() < 1e-5);
    assert_eq!(environment.rotation(), std::f32::consts::FRAC_PI_2);
}

#[test]
fn cube_map_header_encodes_with_bincode() {
    let header = CubeMapHeader {
        size: 512,
        mip_count: 10,
        format: Format::Rgba16SFloat,
        sampler: Sampler {
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
            mipmap_filter: Filter::Linear,
            address_u: SamplerAddressMode::Repeat,
            address_v: SamplerAddressMode::Repeat,
        },
    };
    let bytes = bincode::serialize(&header).unwrap();
    let decoded: CubeMapHeader = bincode::deserialize(&bytes).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(header.mip_size(0), 512 * 512 * 8 * 6);
    assert_eq!(header.mip_size(12), 8 * 6);
    assert_eq!(Sampler::from(header.sampler.to_pal()), header.sampler);
}
