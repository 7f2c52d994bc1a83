pub use glam::*;

use std::f32::consts::{FRAC_PI_2, PI};

/// Direction through a point on a cube face.
///
/// Faces are ordered `+X, -X, +Y, -Y, +Z, -Z`. `u` and `v` are in `[-1, 1]`, with `(-1, -1)` at the
/// first texel of the face. The result is not normalized.
#[inline]
pub fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        5 => Vec3::new(-u, -v, -1.0),
        _ => panic!("invalid cube face `{face}`"),
    }
}

/// Inverse of [`face_direction`]. Returns the face and `(u, v)` in `[0, 1]`.
#[inline]
pub fn direction_to_face_uv(dir: Vec3) -> (usize, Vec2) {
    let abs = dir.abs();
    let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x >= 0.0 {
            (0, -dir.z, -dir.y, abs.x)
        } else {
            (1, dir.z, -dir.y, abs.x)
        }
    } else if abs.y >= abs.z {
        if dir.y >= 0.0 {
            (2, dir.x, dir.z, abs.y)
        } else {
            (3, dir.x, -dir.z, abs.y)
        }
    } else if dir.z >= 0.0 {
        (4, dir.x, -dir.y, abs.z)
    } else {
        (5, -dir.x, -dir.y, abs.z)
    };

    (face, Vec2::new(sc / ma + 1.0, tc / ma + 1.0) * 0.5)
}

/// Equirectangular texture coordinates of a unit direction. `u` wraps around the Y axis starting
/// at `-X`, and `v` runs from the top (`+Y`) to the bottom (`-Y`) of the panorama.
#[inline]
pub fn direction_to_equirect(dir: Vec3) -> Vec2 {
    let theta = dir.z.atan2(dir.x);
    let phi = dir.y.clamp(-1.0, 1.0).asin();
    Vec2::new((theta / PI + 1.0) * 0.5, (-phi / FRAC_PI_2 + 1.0) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_round_trip() {
        for face in 0..6 {
            for &(u, v) in &[(-0.75, -0.25), (0.5, 0.5), (0.0, 0.9)] {
                let (out_face, uv) = direction_to_face_uv(face_direction(face, u, v));
                assert_eq!(out_face, face);
                assert!((uv.x * 2.0 - 1.0 - u).abs() < 1e-5);
                assert!((uv.y * 2.0 - 1.0 - v).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn equirect_poles_and_seam() {
        assert!(direction_to_equirect(Vec3::Y).y.abs() < 1e-6);
        assert!((direction_to_equirect(-Vec3::Y).y - 1.0).abs() < 1e-6);
        let uv = direction_to_equirect(Vec3::X);
        assert!((uv.x - 0.5).abs() < 1e-6 && (uv.y - 0.5).abs() < 1e-6);
        // -Z lies in the first quarter of the panorama.
        assert!((direction_to_equirect(-Vec3::Z).x - 0.25).abs() < 1e-6);
    }
}
