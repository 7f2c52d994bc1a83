//! CPU versions of the IBL shaders, used by the software backend.
//!
//! Each kernel mirrors the WGSL entry point of the same name, including its bind group layout.

use prism_math::{direction_to_equirect, face_direction, Vec2, Vec3, Vec4};
use prism_pal::backend::{Fragment, Invocation, Kernel, KernelTable, Texel, TextureView, VertexOutput};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::{
    faces::{FaceUniform, FACE_SET, FACE_SET_UNIFORM_BINDING},
    mip::{MIP_DST_BINDING, MIP_SRC_BINDING},
    precompute::{
        BrdfParams, IrradianceParams, SpecularParams, BRDF_LUT_BINDING, BRDF_PARAMS_BINDING,
        ENVIRONMENT_BINDING, ENVIRONMENT_SAMPLER_BINDING, IRRADIANCE_BINDING,
        IRRADIANCE_PARAMS_BINDING, SPECULAR_MIP_BINDING, SPECULAR_MIP_SET,
        SPECULAR_PARAMS_BINDING,
    },
    resample::{CUBE_BINDING, PANORAMA_BINDING, PANORAMA_SAMPLER_BINDING},
};

/// Registers every IBL kernel with `table`.
pub fn register(table: &mut KernelTable) {
    table
        .register("mip_2d", Kernel::Compute(mip_2d))
        .register("mip_normal_2d", Kernel::Compute(mip_normal_2d))
        .register("mip_cube", Kernel::Compute(mip_cube))
        .register("fullscreen_vs", Kernel::Vertex(fullscreen_vs))
        .register("downsample_fs", Kernel::Fragment(downsample_fs))
        .register("panorama_to_cube", Kernel::Compute(panorama_to_cube))
        .register("irradiance", Kernel::Compute(irradiance))
        .register("prefilter_specular", Kernel::Compute(prefilter_specular))
        .register("integrate_brdf", Kernel::Compute(integrate_brdf));
}

/// A kernel table containing only the IBL kernels.
pub fn software_kernels() -> KernelTable {
    let mut table = KernelTable::default();
    register(&mut table);
    table
}

fn mip_2d(inv: &Invocation) {
    let id = inv.global_id;
    let (w, h) = inv.bindings.storage_dims(0, MIP_DST_BINDING);
    if id.x >= w || id.y >= h {
        return;
    }

    let src = inv.bindings.texture(0, MIP_SRC_BINDING);
    let value = average(footprint(src, id.x, id.y, 0));
    inv.store(0, MIP_DST_BINDING, id.x, id.y, 0, value);
}

fn mip_normal_2d(inv: &Invocation) {
    let id = inv.global_id;
    let (w, h) = inv.bindings.storage_dims(0, MIP_DST_BINDING);
    if id.x >= w || id.y >= h {
        return;
    }

    let texels = footprint(inv.bindings.texture(0, MIP_SRC_BINDING), id.x, id.y, 0);
    let sum: Vec3 = texels
        .iter()
        .map(|t| Vec3::new(t[0], t[1], t[2]) * 2.0 - 1.0)
        .sum();
    let n = if sum.length_squared() > 1e-12 {
        sum.normalize()
    } else {
        Vec3::Z
    };
    let n = n * 0.5 + 0.5;
    let alpha = texels.iter().map(|t| t[3]).sum::<f32>() * 0.25;

    inv.store(0, MIP_DST_BINDING, id.x, id.y, 0, [n.x, n.y, n.z, alpha]);
}

fn mip_cube(inv: &Invocation) {
    let id = inv.global_id;
    let (w, h) = inv.bindings.storage_dims(0, MIP_DST_BINDING);
    if id.x >= w || id.y >= h {
        return;
    }

    let face = face(inv);
    let src = inv.bindings.texture(0, MIP_SRC_BINDING);
    let value = average(footprint(src, id.x, id.y, face));
    inv.store(0, MIP_DST_BINDING, id.x, id.y, face, value);
}

fn fullscreen_vs(index: u32) -> VertexOutput {
    let uv = Vec2::new(((index << 1) & 2) as f32, (index & 2) as f32);
    VertexOutput {
        position: Vec4::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0),
        uv,
    }
}

fn downsample_fs(fragment: &Fragment) -> Texel {
    let src = fragment.bindings.texture(0, MIP_SRC_BINDING);
    average(footprint(
        src,
        fragment.position.x.floor() as u32,
        fragment.position.y.floor() as u32,
        0,
    ))
}

fn panorama_to_cube(inv: &Invocation) {
    let id = inv.global_id;
    let dims = inv.bindings.storage_dims(0, CUBE_BINDING);
    if id.x >= dims.0 || id.y >= dims.1 {
        return;
    }

    let face = face(inv);
    let dir = texel_direction(face, id.x, id.y, dims);
    let color = inv.bindings.texture(0, PANORAMA_BINDING).sample_2d(
        inv.bindings.sampler(0, PANORAMA_SAMPLER_BINDING),
        direction_to_equirect(dir),
        0,
        0.0,
    );
    inv.store(0, CUBE_BINDING, id.x, id.y, face, [color[0], color[1], color[2], 1.0]);
}

fn irradiance(inv: &Invocation) {
    let id = inv.global_id;
    let dims = inv.bindings.storage_dims(0, IRRADIANCE_BINDING);
    if id.x >= dims.0 || id.y >= dims.1 {
        return;
    }

    let face = face(inv);
    let params: IrradianceParams = inv.bindings.uniform(0, IRRADIANCE_PARAMS_BINDING);
    let sampler = inv.bindings.sampler(0, ENVIRONMENT_SAMPLER_BINDING);
    let environment = inv.bindings.texture(0, ENVIRONMENT_BINDING);

    let n = texel_direction(face, id.x, id.y, dims);
    let up = if n.y.abs() < 0.999 { Vec3::Y } else { Vec3::Z };
    let right = up.cross(n).normalize();
    let up = n.cross(right);

    let mut sum = Vec3::ZERO;
    let mut count = 0.0f32;
    let mut phi = 0.0f32;
    while phi < TAU {
        let mut theta = 0.0f32;
        while theta < FRAC_PI_2 {
            let tangent = Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            );
            let dir = tangent.x * right + tangent.y * up + tangent.z * n;
            let radiance = rgb(environment.sample_cube(sampler, dir, params.source_lod));
            sum += radiance * theta.cos() * theta.sin();
            count += 1.0;
            theta += params.sample_delta;
        }
        phi += params.sample_delta;
    }

    let value = PI * sum / count;
    inv.store(0, IRRADIANCE_BINDING, id.x, id.y, face, [value.x, value.y, value.z, 1.0]);
}

fn prefilter_specular(inv: &Invocation) {
    let id = inv.global_id;
    let dims = inv.bindings.storage_dims(SPECULAR_MIP_SET, SPECULAR_MIP_BINDING);
    if id.x >= dims.0 || id.y >= dims.1 {
        return;
    }

    let face = face(inv);
    let params: SpecularParams = inv.bindings.uniform(SPECULAR_MIP_SET, SPECULAR_PARAMS_BINDING);
    let sampler = inv.bindings.sampler(0, ENVIRONMENT_SAMPLER_BINDING);
    let environment = inv.bindings.texture(0, ENVIRONMENT_BINDING);
    let n = texel_direction(face, id.x, id.y, dims);

    let store = |color: Vec3| {
        inv.store(
            SPECULAR_MIP_SET,
            SPECULAR_MIP_BINDING,
            id.x,
            id.y,
            face,
            [color.x, color.y, color.z, 1.0],
        )
    };

    if params.roughness <= 0.0 {
        store(rgb(environment.sample_cube(sampler, n, 0.0)));
        return;
    }

    let texel_solid_angle = 4.0 * PI / (6.0 * params.source_size * params.source_size);
    let mut sum = Vec3::ZERO;
    let mut weight = 0.0f32;
    for i in 0..params.sample_count {
        let h = importance_sample_ggx(hammersley(i, params.sample_count), n, params.roughness);
        let l = (2.0 * n.dot(h) * h - n).normalize();
        let n_dot_l = n.dot(l);
        if n_dot_l > 0.0 {
            let pdf = distribution_ggx(n.dot(h).max(0.0), params.roughness) / 4.0 + 0.0001;
            let sample_solid_angle = 1.0 / (params.sample_count as f32 * pdf + 0.0001);
            let lod = (0.5 * (sample_solid_angle / texel_solid_angle).log2()).max(0.0);
            sum += rgb(environment.sample_cube(sampler, l, lod)) * n_dot_l;
            weight += n_dot_l;
        }
    }

    store(sum / weight.max(0.0001));
}

fn integrate_brdf(inv: &Invocation) {
    let id = inv.global_id;
    let (w, h) = inv.bindings.storage_dims(0, BRDF_LUT_BINDING);
    if id.x >= w || id.y >= h {
        return;
    }

    let params: BrdfParams = inv.bindings.uniform(0, BRDF_PARAMS_BINDING);
    let n_dot_v = (id.x as f32 + 0.5) / w as f32;
    let roughness = (id.y as f32 + 0.5) / h as f32;
    let v = Vec3::new((1.0 - n_dot_v * n_dot_v).sqrt(), 0.0, n_dot_v);

    let mut scale = 0.0f32;
    let mut bias = 0.0f32;
    for i in 0..params.sample_count {
        let h = importance_sample_ggx(hammersley(i, params.sample_count), Vec3::Z, roughness);
        let l = (2.0 * v.dot(h) * h - v).normalize();
        let n_dot_l = l.z.max(0.0);
        if n_dot_l > 0.0 {
            let n_dot_h = h.z.max(0.0);
            let v_dot_h = v.dot(h).max(0.0);
            let g_vis = geometry_smith(n_dot_v, n_dot_l, roughness) * v_dot_h / (n_dot_h * n_dot_v);
            let fc = (1.0 - v_dot_h).powi(5);
            scale += (1.0 - fc) * g_vis;
            bias += fc * g_vis;
        }
    }

    let count = params.sample_count as f32;
    inv.store(0, BRDF_LUT_BINDING, id.x, id.y, 0, [scale / count, bias / count, 0.0, 1.0]);
}

#[inline(always)]
fn face(inv: &Invocation) -> usize {
    let face: FaceUniform = inv.bindings.uniform(FACE_SET, FACE_SET_UNIFORM_BINDING);
    face.face as usize
}

/// The 2x2 block of the previous mip covered by destination texel `(x, y)`. Loads are clamped, so
/// odd sized sources repeat their last row and column.
#[inline(always)]
fn footprint(src: &TextureView, x: u32, y: u32, layer: usize) -> [Texel; 4] {
    let (x, y) = (x as i32 * 2, y as i32 * 2);
    [
        src.load(x, y, layer, 0),
        src.load(x + 1, y, layer, 0),
        src.load(x, y + 1, layer, 0),
        src.load(x + 1, y + 1, layer, 0),
    ]
}

#[inline(always)]
fn average(texels: [Texel; 4]) -> Texel {
    [0, 1, 2, 3].map(|c| texels.iter().map(|t| t[c]).sum::<f32>() * 0.25)
}

#[inline(always)]
fn rgb(texel: Texel) -> Vec3 {
    Vec3::new(texel[0], texel[1], texel[2])
}

#[inline(always)]
fn texel_direction(face: usize, x: u32, y: u32, (w, h): (u32, u32)) -> Vec3 {
    let u = (x as f32 + 0.5) / w as f32 * 2.0 - 1.0;
    let v = (y as f32 + 0.5) / h as f32 * 2.0 - 1.0;
    face_direction(face, u, v).normalize()
}

#[inline(always)]
fn hammersley(i: u32, count: u32) -> Vec2 {
    Vec2::new(
        i as f32 / count as f32,
        i.reverse_bits() as f32 * 2.328_306_4e-10,
    )
}

fn importance_sample_ggx(xi: Vec2, n: Vec3, roughness: f32) -> Vec3 {
    let a = roughness * roughness;
    let phi = TAU * xi.x;
    let cos_theta = ((1.0 - xi.y) / (1.0 + (a * a - 1.0) * xi.y)).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let h = Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta);

    let up = if n.z.abs() < 0.999 { Vec3::Z } else { Vec3::X };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);
    (tangent * h.x + bitangent * h.y + n * h.z).normalize()
}

#[inline(always)]
fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    a2 / (PI * d * d)
}

/// Schlick-GGX with the IBL remapping `k = roughness^2 / 2`.
#[inline(always)]
fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let k = roughness * roughness / 2.0;
    let g = |n_dot_x: f32| n_dot_x / (n_dot_x * (1.0 - k) + k);
    g(n_dot_v) * g(n_dot_l)
}
