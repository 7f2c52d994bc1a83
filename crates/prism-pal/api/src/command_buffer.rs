use crate::{
    compute_pass::ComputePass,
    compute_pipeline::ComputePipeline,
    descriptor_set::DescriptorSet,
    graphics_pipeline::GraphicsPipeline,
    render_pass::{RenderPass, RenderPassDescriptor},
    types::{QueueType, ShaderStage},
    Backend,
};

pub enum Command<'a, B: Backend> {
    BeginRenderPass(RenderPassDescriptor<'a, B>, Option<&'a str>),
    EndRenderPass(Option<&'a str>),
    BeginComputePass(ComputePipeline<B>, Option<&'a str>),
    EndComputePass(u32, u32, u32, Option<&'a str>),
    BindGraphicsPipeline(GraphicsPipeline<B>),
    BindDescriptorSets {
        sets: Vec<&'a DescriptorSet<B>>,
        first: usize,
        stage: ShaderStage,
    },
    Draw {
        vertex_count: usize,
        instance_count: usize,
        first_vertex: usize,
        first_instance: usize,
    },
}

/// A command buffer is used to record commands which are the submitted to a queue.
pub struct CommandBuffer<'a, B: Backend> {
    pub(crate) queue_ty: QueueType,
    pub(crate) commands: Vec<Command<'a, B>>,
}

impl<'a, B: Backend> CommandBuffer<'a, B> {
    /// Begins a render pass scope.
    ///
    /// # Arguments
    /// - `descriptor` - A description of the render pass.
    /// - `pass` - A function that records render pass commands.
    ///
    /// # Panics
    /// - If the queue type this command buffer was created with does not support graphics
    /// commands.
    /// - If the descriptor has no color attachments.
    pub fn render_pass(
        &mut self,
        descriptor: RenderPassDescriptor<'a, B>,
        debug_name: Option<&'a str>,
        pass: impl FnOnce(&mut RenderPass<'a, B>),
    ) {
        assert_eq!(
            self.queue_ty,
            QueueType::Main,
            "queue `{:?}` does not support render passes",
            self.queue_ty
        );
        assert!(
            !descriptor.color_attachments.is_empty(),
            "render pass has no attachments"
        );

        self.commands
            .push(Command::BeginRenderPass(descriptor, debug_name));
        let mut render_pass = RenderPass {
            bound_pipeline: false,
            commands: Vec::default(),
        };
        pass(&mut render_pass);
        self.commands.extend(render_pass.commands);
        self.commands.push(Command::EndRenderPass(debug_name));
    }

    /// Begins a compute pass scope.
    ///
    /// # Arguments
    /// - `pipeline` - The pipeline used for this compute pass.
    /// - `pass` - A function that records compute commands. Returns the work groups for dispatch.
    ///
    /// # Panics
    /// - If the queue type this command buffer was created with does not support compute commands.
    /// - If any dimension of the returned work groups is `0`.
    pub fn compute_pass(
        &mut self,
        pipeline: &ComputePipeline<B>,
        debug_name: Option<&'a str>,
        pass: impl FnOnce(&mut ComputePass<'a, B>) -> (u32, u32, u32),
    ) {
        assert!(
            self.queue_ty == QueueType::Main || self.queue_ty == QueueType::Compute,
            "queue `{:?}` does not support compute passes",
            self.queue_ty
        );

        self.commands
            .push(Command::BeginComputePass(pipeline.clone(), debug_name));
        let mut compute_pass = ComputePass {
            commands: Vec::default(),
        };
        let workgroups = pass(&mut compute_pass);
        assert!(
            workgroups.0 > 0 && workgroups.1 > 0 && workgroups.2 > 0,
            "empty dispatch {workgroups:?}"
        );
        self.commands.extend(compute_pass.commands);
        self.commands.push(Command::EndComputePass(
            workgroups.0,
            workgroups.1,
            workgroups.2,
            debug_name,
        ));
    }
}
