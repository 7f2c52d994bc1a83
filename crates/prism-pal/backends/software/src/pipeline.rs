use api::descriptor_set::DescriptorBinding;

use crate::kernel::{ComputeKernel, FragmentKernel, Kernel, VertexKernel};

pub struct Shader {
    pub(crate) entry_point: String,
    pub(crate) kernel: Kernel,
}

#[derive(Clone)]
pub struct ComputePipeline {
    pub(crate) kernel: ComputeKernel,
    pub(crate) layouts: Vec<Vec<DescriptorBinding>>,
    pub(crate) work_group_size: (u32, u32, u32),
    pub(crate) debug_name: Option<String>,
}

#[derive(Clone)]
pub struct GraphicsPipeline {
    pub(crate) vertex: VertexKernel,
    pub(crate) fragment: FragmentKernel,
    pub(crate) layouts: Vec<Vec<DescriptorBinding>>,
    pub(crate) debug_name: Option<String>,
}

/// Panics if a binding declared by a pipeline layout has nothing bound to it, mirroring the
/// validation error a GPU backend would raise.
pub(crate) fn validate_bindings(
    layouts: &[Vec<DescriptorBinding>],
    bindings: &crate::kernel::Bindings,
    pipeline: Option<&str>,
) {
    for (set, layout) in layouts.iter().enumerate() {
        for binding in layout {
            assert!(
                bindings.contains(set, binding.binding),
                "pipeline `{}` expects a resource at {set}:{}",
                pipeline.unwrap_or("unnamed"),
                binding.binding
            );
        }
    }
}
