use std::{cell::RefCell, sync::Arc};

use api::texture::Sampler;
use bytemuck::Pod;
use prism_math::{UVec3, Vec2, Vec4};
use rustc_hash::FxHashMap;

use crate::{
    buffer::Buffer,
    texture::{Texel, Texture, TextureView},
};

pub type ComputeKernel = fn(&Invocation);
pub type VertexKernel = fn(u32) -> VertexOutput;
pub type FragmentKernel = fn(&Fragment) -> Texel;

/// CPU implementation of a shader entry point.
#[derive(Clone, Copy)]
pub enum Kernel {
    Compute(ComputeKernel),
    Vertex(VertexKernel),
    Fragment(FragmentKernel),
}

/// Maps shader entry points to the kernels that run in their place.
#[derive(Default, Clone)]
pub struct KernelTable {
    kernels: FxHashMap<String, Kernel>,
}

#[derive(Debug, Copy, Clone)]
pub struct VertexOutput {
    /// Clip space position.
    pub position: Vec4,
    pub uv: Vec2,
}

/// A single compute shader invocation.
pub struct Invocation<'a> {
    pub global_id: UVec3,
    pub bindings: &'a Bindings,
    pub(crate) writes: &'a RefCell<Vec<StorageWrite>>,
}

/// A single fragment shader invocation.
pub struct Fragment<'a> {
    /// Pixel center within the render target.
    pub position: Vec2,
    pub uv: Vec2,
    pub bindings: &'a Bindings,
}

#[derive(Clone)]
pub(crate) enum Bound {
    Uniform { buffer: Buffer, array_element: usize },
    Texture(TextureView),
    Sampler(Sampler),
    Storage { texture: Texture, mip: usize },
}

pub(crate) type SetBindings = Arc<FxHashMap<u32, Bound>>;

/// Resources visible to a kernel, indexed by set and binding.
#[derive(Default, Clone)]
pub struct Bindings {
    pub(crate) sets: Vec<Option<SetBindings>>,
}

pub(crate) struct StorageWrite {
    pub set: usize,
    pub binding: u32,
    pub array_element: usize,
    pub x: u32,
    pub y: u32,
    pub value: Texel,
}

impl KernelTable {
    pub fn register(&mut self, entry_point: impl Into<String>, kernel: Kernel) -> &mut Self {
        self.kernels.insert(entry_point.into(), kernel);
        self
    }

    #[inline(always)]
    pub fn get(&self, entry_point: &str) -> Option<Kernel> {
        self.kernels.get(entry_point).copied()
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.kernels.keys().map(String::as_str)
    }
}

impl Invocation<'_> {
    /// `textureStore` equivalent. Writes become visible once the dispatch completes.
    #[inline]
    pub fn store(&self, set: usize, binding: u32, x: u32, y: u32, array_element: usize, value: Texel) {
        self.writes.borrow_mut().push(StorageWrite {
            set,
            binding,
            array_element,
            x,
            y,
            value,
        });
    }
}

impl Bindings {
    /// Reads a uniform value from the bound array element of a uniform buffer.
    pub fn uniform<T: Pod>(&self, set: usize, binding: u32) -> T {
        match self.get(set, binding) {
            Bound::Uniform {
                buffer,
                array_element,
            } => buffer.read(*array_element),
            _ => panic!("binding {set}:{binding} is not a uniform buffer"),
        }
    }

    pub fn texture(&self, set: usize, binding: u32) -> &TextureView {
        match self.get(set, binding) {
            Bound::Texture(view) => view,
            _ => panic!("binding {set}:{binding} is not a texture"),
        }
    }

    pub fn sampler(&self, set: usize, binding: u32) -> &Sampler {
        match self.get(set, binding) {
            Bound::Sampler(sampler) => sampler,
            _ => panic!("binding {set}:{binding} is not a sampler"),
        }
    }

    /// Dimensions of the mip bound to a storage image binding.
    pub fn storage_dims(&self, set: usize, binding: u32) -> (u32, u32) {
        let (texture, mip) = self.storage(set, binding);
        texture.mip_dims(mip)
    }

    pub(crate) fn storage(&self, set: usize, binding: u32) -> (&Texture, usize) {
        match self.get(set, binding) {
            Bound::Storage { texture, mip } => (texture, *mip),
            _ => panic!("binding {set}:{binding} is not a storage image"),
        }
    }

    #[inline(always)]
    pub(crate) fn contains(&self, set: usize, binding: u32) -> bool {
        self.sets
            .get(set)
            .and_then(|set| set.as_ref())
            .map(|set| set.contains_key(&binding))
            .unwrap_or(false)
    }

    #[inline(always)]
    fn get(&self, set: usize, binding: u32) -> &Bound {
        self.sets
            .get(set)
            .and_then(|set| set.as_ref())
            .and_then(|set| set.get(&binding))
            .unwrap_or_else(|| panic!("nothing is bound to {set}:{binding}"))
    }
}
