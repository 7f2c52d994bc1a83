use api::{
    command_buffer::Command,
    compute_pipeline::ComputePipeline,
    descriptor_set::DescriptorSet,
    graphics_pipeline::GraphicsPipeline,
    render_pass::{ColorAttachmentDestination, RenderPassDescriptor},
    types::{ClearColor, LoadOp, StoreOp},
};

use crate::WebGpuBackend;

pub struct Job {
    pub(crate) index: wgpu::SubmissionIndex,
}

enum RenderOp<'a> {
    Pipeline(GraphicsPipeline<WebGpuBackend>),
    Sets(usize, Vec<&'a DescriptorSet<WebGpuBackend>>),
    Draw {
        vertices: std::ops::Range<u32>,
        instances: std::ops::Range<u32>,
    },
}

struct PendingRenderPass<'a> {
    descriptor: RenderPassDescriptor<'a, WebGpuBackend>,
    debug_name: Option<&'a str>,
    ops: Vec<RenderOp<'a>>,
}

#[inline(always)]
fn bind_group<'a>(set: &'a DescriptorSet<WebGpuBackend>) -> &'a wgpu::BindGroup {
    set.internal().bind_group.as_ref().unwrap_or_else(|| {
        panic!(
            "descriptor set `{}` was bound before every binding was written",
            set.internal().debug_name.as_deref().unwrap_or("unnamed")
        )
    })
}

/// Translates recorded commands into a single command buffer.
pub(crate) fn encode(
    device: &wgpu::Device,
    debug_name: Option<&str>,
    commands: Vec<Command<'_, WebGpuBackend>>,
) -> wgpu::CommandBuffer {
    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: debug_name });

    let mut compute: Option<ComputePipeline<WebGpuBackend>> = None;
    let mut compute_sets: Vec<(usize, Vec<&DescriptorSet<WebGpuBackend>>)> = Vec::default();
    let mut render: Option<PendingRenderPass> = None;

    for command in commands {
        match command {
            Command::BeginComputePass(pipeline, _) => {
                compute = Some(pipeline);
                compute_sets.clear();
            }
            Command::EndComputePass(x, y, z, name) => {
                let pipeline = match compute.take() {
                    Some(pipeline) => pipeline,
                    None => continue,
                };
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: name,
                    timestamp_writes: None,
                });
                pass.set_pipeline(&pipeline.internal().pipeline);
                for (first, sets) in compute_sets.drain(..) {
                    for (i, set) in sets.into_iter().enumerate() {
                        pass.set_bind_group((first + i) as u32, bind_group(set), &[]);
                    }
                }
                pass.dispatch_workgroups(x, y, z);
            }
            Command::BeginRenderPass(descriptor, debug_name) => {
                render = Some(PendingRenderPass {
                    descriptor,
                    debug_name,
                    ops: Vec::default(),
                });
            }
            Command::BindGraphicsPipeline(pipeline) => {
                if let Some(render) = render.as_mut() {
                    render.ops.push(RenderOp::Pipeline(pipeline));
                }
            }
            Command::BindDescriptorSets { sets, first, .. } => match render.as_mut() {
                Some(render) => render.ops.push(RenderOp::Sets(first, sets)),
                None => compute_sets.push((first, sets)),
            },
            Command::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => {
                if let Some(render) = render.as_mut() {
                    render.ops.push(RenderOp::Draw {
                        vertices: first_vertex as u32..(first_vertex + vertex_count) as u32,
                        instances: first_instance as u32
                            ..(first_instance + instance_count) as u32,
                    });
                }
            }
            Command::EndRenderPass(_) => {
                if let Some(pending) = render.take() {
                    encode_render_pass(&mut encoder, pending);
                }
            }
        }
    }

    encoder.finish()
}

fn encode_render_pass(encoder: &mut wgpu::CommandEncoder, pending: PendingRenderPass) {
    let views: Vec<_> = pending
        .descriptor
        .color_attachments
        .iter()
        .map(|attachment| match &attachment.dst {
            ColorAttachmentDestination::Texture {
                texture,
                array_element,
                mip_level,
            } => texture
                .internal()
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_mip_level: *mip_level as u32,
                    mip_level_count: Some(1),
                    base_array_layer: *array_element as u32,
                    array_layer_count: Some(1),
                    ..Default::default()
                }),
        })
        .collect();

    let attachments: Vec<_> = pending
        .descriptor
        .color_attachments
        .iter()
        .zip(views.iter())
        .map(|(attachment, view)| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: match attachment.load_op {
                        LoadOp::Clear(ClearColor::RgbaF32(r, g, b, a)) => {
                            wgpu::LoadOp::Clear(wgpu::Color {
                                r: r as f64,
                                g: g as f64,
                                b: b as f64,
                                a: a as f64,
                            })
                        }
                        LoadOp::Load | LoadOp::DontCare => wgpu::LoadOp::Load,
                    },
                    store: match attachment.store_op {
                        StoreOp::Store => wgpu::StoreOp::Store,
                        StoreOp::DontCare => wgpu::StoreOp::Discard,
                    },
                },
            })
        })
        .collect();

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: pending.debug_name,
        color_attachments: &attachments,
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    for op in &pending.ops {
        match op {
            RenderOp::Pipeline(pipeline) => pass.set_pipeline(&pipeline.internal().pipeline),
            RenderOp::Sets(first, sets) => {
                for (i, set) in sets.iter().enumerate() {
                    pass.set_bind_group((first + i) as u32, bind_group(set), &[]);
                }
            }
            RenderOp::Draw {
                vertices,
                instances,
            } => pass.draw(vertices.clone(), instances.clone()),
        }
    }
}
