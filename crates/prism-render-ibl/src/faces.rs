use bytemuck::{Pod, Zeroable};
use prism_pal::prelude::*;

use crate::error::IblError;

/// Uniform block selecting the cube face a per-face dispatch writes to.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct FaceUniform {
    pub face: u32,
    pub _pad: [u32; 3],
}

/// One descriptor set per cube face, each binding its own array element of a face index buffer.
/// Bound as a separate set so the face can change between dispatches while the rest of the
/// bindings stay put.
pub struct FaceSets<B: Backend> {
    layout: DescriptorSetLayout<B>,
    _buffer: Buffer<B>,
    sets: Vec<DescriptorSet<B>>,
}

/// Set index per-face sets are bound at.
pub(crate) const FACE_SET: usize = 1;
pub(crate) const FACE_SET_UNIFORM_BINDING: u32 = 0;

impl<B: Backend> FaceSets<B> {
    pub fn new(ctx: &Context<B>, debug_name: &str) -> Result<Self, IblError> {
        let layout = DescriptorSetLayout::new(
            ctx.clone(),
            DescriptorSetLayoutCreateInfo {
                bindings: vec![DescriptorBinding {
                    binding: FACE_SET_UNIFORM_BINDING,
                    ty: DescriptorType::UniformBuffer,
                    stage: ShaderStage::Compute,
                }],
            },
        )?;

        let faces: Vec<FaceUniform> = CubeFace::ALL
            .iter()
            .map(|face| FaceUniform {
                face: face.layer() as u32,
                _pad: [0; 3],
            })
            .collect();
        let buffer = Buffer::new_uniform(
            ctx.clone(),
            Some(format!("{debug_name}_face_buffer")),
            &faces,
        )?;

        let mut sets = Vec::with_capacity(CUBE_FACE_COUNT);
        for face in CubeFace::ALL {
            let mut set = DescriptorSet::new(
                ctx.clone(),
                DescriptorSetCreateInfo {
                    layout: layout.clone(),
                    debug_name: Some(format!("{debug_name}_face_set_{}", face.layer())),
                },
            )?;
            set.update(&[DescriptorSetUpdate {
                binding: FACE_SET_UNIFORM_BINDING,
                value: DescriptorValue::UniformBuffer {
                    buffer: &buffer,
                    array_element: face.layer(),
                },
            }])?;
            sets.push(set);
        }

        Ok(Self {
            layout,
            _buffer: buffer,
            sets,
        })
    }

    #[inline(always)]
    pub fn layout(&self) -> &DescriptorSetLayout<B> {
        &self.layout
    }

    #[inline(always)]
    pub fn set(&self, face: CubeFace) -> &DescriptorSet<B> {
        &self.sets[face.layer()]
    }
}
