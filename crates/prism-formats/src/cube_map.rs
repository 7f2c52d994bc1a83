use prism_pal::prelude::Format;
use serde::{Deserialize, Serialize};

use crate::texture::Sampler;

/// Header of a baked cube map. Each mip is stored next to it with every face packed in array layer
/// order.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CubeMapHeader {
    pub size: u32,
    pub mip_count: u32,
    pub format: Format,
    pub sampler: Sampler,
}

impl CubeMapHeader {
    /// Size in bytes of every face of a mip level.
    #[inline(always)]
    pub fn mip_size(&self, mip: u32) -> usize {
        let dim = (self.size >> mip).max(1) as usize;
        dim * dim * self.format.texel_size() * prism_pal::prelude::CUBE_FACE_COUNT
    }
}
