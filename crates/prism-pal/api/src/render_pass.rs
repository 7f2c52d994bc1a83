use crate::{
    command_buffer::Command,
    descriptor_set::DescriptorSet,
    graphics_pipeline::GraphicsPipeline,
    texture::Texture,
    types::{LoadOp, ShaderStage, StoreOp},
    Backend,
};

/// Describes a render pass.
pub struct RenderPassDescriptor<'a, B: Backend> {
    /// The color attachments used by the render pass.
    pub color_attachments: Vec<ColorAttachment<'a, B>>,
}

/// Describes a color attachment of a render pass.
pub struct ColorAttachment<'a, B: Backend> {
    /// The destination image of the attachment.
    pub dst: ColorAttachmentDestination<'a, B>,
    /// How the color attachment should be loaded.
    pub load_op: LoadOp,
    /// How the color attachment should be stored.
    pub store_op: StoreOp,
}

/// The destination data of a color attachment.
pub enum ColorAttachmentDestination<'a, B: Backend> {
    Texture {
        texture: &'a Texture<B>,
        array_element: usize,
        mip_level: usize,
    },
}

pub struct RenderPass<'a, B: Backend> {
    pub(crate) bound_pipeline: bool,
    pub(crate) commands: Vec<Command<'a, B>>,
}

impl<'a, B: Backend> RenderPass<'a, B> {
    /// Binds a graphics pipeline to the pass.
    ///
    /// # Arguments
    /// - `pipeline` - The graphics pipeline to bind.
    #[inline]
    pub fn bind_pipeline(&mut self, pipeline: GraphicsPipeline<B>) {
        self.bound_pipeline = true;
        self.commands.push(Command::BindGraphicsPipeline(pipeline));
    }

    /// Binds one or more descriptor sets to the pass.
    ///
    /// # Arguments
    /// - `first` - An offset added to the set indices. For example, if you wanted to bind only the
    /// second set of your pipeline, you would set `first = 1`.
    /// - `sets` - The sets to bind.
    ///
    /// # Panics
    /// - If `sets.is_empty()`.
    /// - If there is no bound graphics pipeline.
    #[inline]
    pub fn bind_sets(&mut self, first: usize, sets: Vec<&'a DescriptorSet<B>>) {
        assert!(!sets.is_empty(), "no sets provided");
        assert!(self.bound_pipeline, "no bound graphics pipeline");
        self.commands.push(Command::BindDescriptorSets {
            sets,
            first,
            stage: ShaderStage::AllGraphics,
        });
    }

    /// Draw a non-indexed sequence of triangles.
    ///
    /// # Arguments
    /// - `vertex_count` - The number of vertices to draw.
    /// - `instance_count` - The number of instances to draw.
    /// - `first_vertex` - The offset in vertices to draw.
    /// - `first_instance` - The offset in instances to draw.
    ///
    /// # Panics
    /// - If `vertex_count` or `instance_count` is `0`.
    /// - If there is no bound graphics pipeline.
    #[inline]
    pub fn draw(
        &mut self,
        vertex_count: usize,
        instance_count: usize,
        first_vertex: usize,
        first_instance: usize,
    ) {
        assert_ne!(vertex_count, 0, "vertex count cannot be 0");
        assert_ne!(instance_count, 0, "instance count cannot be 0");
        assert!(self.bound_pipeline, "no bound graphics pipeline");
        self.commands.push(Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        });
    }
}
