use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of faces (array layers) in a cube texture.
pub const CUBE_FACE_COUNT: usize = 6;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    Rgba8Unorm,
    Rgba8Srgb,
    Rgba16SFloat,
    Rgba32SFloat,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CubeFace {
    /// +X
    East,
    /// -X
    West,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// +Z
    North,
    /// -Z
    South,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobStatus {
    /// The job is still running.
    Running,
    /// The job is complete.
    Complete,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueueType {
    /// The main queue is guaranteed to support graphics, transfer, and compute operations.
    Main,
    /// The compute queue is guaranteed to support compute operations. Backends with a single
    /// hardware queue *may* alias it with the main queue.
    Compute,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreOp {
    /// We don't care what happens to the contents of the image after the pass.
    DontCare,
    /// The contents of the image should be stored after the pass.
    Store,
}

#[derive(Debug, Copy, Clone)]
pub enum LoadOp {
    /// We don't care about the contents of the image.
    DontCare,
    /// The contents of the image should be loaded.
    Load,
    /// The contents of the image should be cleared with the specified color.
    Clear(ClearColor),
}

#[derive(Debug, Copy, Clone)]
pub enum ClearColor {
    RgbaF32(f32, f32, f32, f32),
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    AllGraphics,
    Vertex,
    Fragment,
    Compute,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SamplerAddressMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

bitflags! {
    #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[serde(transparent)]
    pub struct BufferUsage: u32 {
        const TRANSFER_SRC    = 0b0001;
        const TRANSFER_DST    = 0b0010;
        const UNIFORM_BUFFER  = 0b0100;
    }
}

bitflags! {
    #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[serde(transparent)]
    pub struct TextureUsage: u32 {
        const TRANSFER_SRC     = 0b00001;
        const TRANSFER_DST     = 0b00010;
        const SAMPLED          = 0b00100;
        const STORAGE          = 0b01000;
        const COLOR_ATTACHMENT = 0b10000;
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureType {
    Type2D,
    /// A square 2D texture with exactly [`CUBE_FACE_COUNT`] array elements.
    CubeMap,
}

/// How a texture is viewed when bound to a descriptor set.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewDimension {
    D2,
    D2Array,
    Cube,
}

impl Format {
    /// Size in bytes of a single texel.
    #[inline(always)]
    pub fn texel_size(&self) -> usize {
        match *self {
            Format::Rgba8Unorm | Format::Rgba8Srgb => 4,
            Format::Rgba16SFloat => 8,
            Format::Rgba32SFloat => 16,
        }
    }

    #[inline(always)]
    pub fn is_srgb(&self) -> bool {
        matches!(*self, Format::Rgba8Srgb)
    }

    /// Indicates if the format can be sampled with a linear filter without extra device features.
    #[inline(always)]
    pub fn is_filterable(&self) -> bool {
        !matches!(*self, Format::Rgba32SFloat)
    }

    /// Indicates if the format can be bound as a write-only storage image.
    #[inline(always)]
    pub fn supports_storage(&self) -> bool {
        !self.is_srgb()
    }
}

impl CubeFace {
    /// Every face in array layer order.
    pub const ALL: [CubeFace; CUBE_FACE_COUNT] = [
        CubeFace::East,
        CubeFace::West,
        CubeFace::Top,
        CubeFace::Bottom,
        CubeFace::North,
        CubeFace::South,
    ];

    /// The array layer of the face within a cube texture.
    #[inline(always)]
    pub fn layer(&self) -> usize {
        *self as usize
    }
}
