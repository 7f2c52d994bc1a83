//! GPU preprocessing of HDR environments into image based lighting data.
//!
//! The pipeline is expressed against Pal and runs on any backend. Every shader entry point also
//! has a CPU kernel in [`kernels`] so the software backend can run the whole chain.

pub mod config;
pub mod environment;
pub mod error;
pub mod faces;
pub mod kernels;
pub mod mip;
pub mod precompute;
pub mod resample;
mod shaders;

pub use config::IblSettings;
pub use environment::{
    EnvironmentPipeline, EnvironmentState, IblData, IblTextures, MipData, BRDF_LUT_SAMPLER,
};
pub use error::IblError;
pub use mip::{MipGenerator, MipKind};
pub use precompute::{IblPrecomputer, ENVIRONMENT_SAMPLER};
pub use resample::{PanoramaResampler, PANORAMA_SAMPLER};

/// Width and height of the work groups used by every IBL compute shader.
pub const TILE_SIZE: u32 = 8;

/// Number of work groups needed to cover a `width x height` image with [`TILE_SIZE`] tiles.
#[inline(always)]
pub fn dispatch_size(width: u32, height: u32) -> (u32, u32, u32) {
    (width.div_ceil(TILE_SIZE), height.div_ceil(TILE_SIZE), 1)
}

/// Largest power of two that is less than or equal to `value`.
///
/// # Panics
/// - If `value` is `0`.
#[inline(always)]
pub fn floor_pow2(value: u32) -> u32 {
    assert_ne!(value, 0, "no power of two is <= 0");
    1 << (u32::BITS - 1 - value.leading_zeros())
}

#[cfg(test)]
mod tests;
