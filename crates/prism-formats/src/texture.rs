use ordered_float::NotNan;
use prism_pal::prelude::{self as pal, Filter, Format, SamplerAddressMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHeader {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    pub format: Format,
    pub sampler: Sampler,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sampler {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmap_filter: Filter,
    pub address_u: SamplerAddressMode,
    pub address_v: SamplerAddressMode,
}

impl Sampler {
    /// Expands into a sampler usable with Pal. The W axis shares the V address mode.
    pub fn to_pal(&self) -> pal::Sampler {
        pal::Sampler {
            min_filter: self.min_filter,
            mag_filter: self.mag_filter,
            mipmap_filter: self.mipmap_filter,
            address_u: self.address_u,
            address_v: self.address_v,
            address_w: self.address_v,
            min_lod: unsafe { NotNan::new_unchecked(0.0) },
            max_lod: None,
        }
    }
}

impl From<pal::Sampler> for Sampler {
    fn from(sampler: pal::Sampler) -> Self {
        Self {
            min_filter: sampler.min_filter,
            mag_filter: sampler.mag_filter,
            mipmap_filter: sampler.mipmap_filter,
            address_u: sampler.address_u,
            address_v: sampler.address_v,
        }
    }
}
