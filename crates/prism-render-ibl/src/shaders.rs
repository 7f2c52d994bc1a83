//! WGSL sources of every IBL entry point. Modules that need the shared helpers are prefixed with
//! `common.wgsl`.

macro_rules! with_common {
    ($path:literal) => {
        concat!(
            include_str!("../shaders/common.wgsl"),
            "\n",
            include_str!($path)
        )
    };
}

pub const MIP_2D: &str = include_str!("../shaders/mip_2d.wgsl");
pub const MIP_NORMAL_2D: &str = include_str!("../shaders/mip_normal_2d.wgsl");
pub const MIP_CUBE: &str = with_common!("../shaders/mip_cube.wgsl");
pub const DOWNSAMPLE: &str = include_str!("../shaders/downsample.wgsl");
pub const PANORAMA_TO_CUBE: &str = with_common!("../shaders/panorama_to_cube.wgsl");
pub const IRRADIANCE: &str = with_common!("../shaders/irradiance.wgsl");
pub const PREFILTER_SPECULAR: &str = with_common!("../shaders/prefilter_specular.wgsl");
pub const BRDF_LUT: &str = with_common!("../shaders/brdf_lut.wgsl");
