use std::cell::RefCell;

use api::{
    command_buffer::Command,
    render_pass::{ColorAttachmentDestination, RenderPassDescriptor},
    types::{ClearColor, LoadOp},
};
use prism_math::{UVec3, Vec2, Vec3};
use rayon::prelude::*;

use crate::{
    kernel::{Bindings, Bound, Fragment, Invocation, StorageWrite, VertexOutput},
    pipeline::{validate_bindings, ComputePipeline, GraphicsPipeline},
    texture::{Texel, Texture},
    trace::{DispatchRecord, DrawRecord, TraceEvent, UniformRecord},
    SoftwareBackend,
};

struct Target {
    texture: Texture,
    array_element: usize,
    mip: usize,
}

/// Executes recorded commands in order on the calling thread. Work within a single dispatch or
/// draw is spread over the rayon pool.
#[derive(Default)]
pub(crate) struct Executor {
    bindings: Bindings,
    compute: Option<ComputePipeline>,
    graphics: Option<GraphicsPipeline>,
    targets: Vec<Target>,
    pass: Option<String>,
    events: Vec<TraceEvent>,
}

impl Executor {
    pub fn run(mut self, commands: Vec<Command<'_, SoftwareBackend>>) -> Vec<TraceEvent> {
        for command in commands {
            match command {
                Command::BeginComputePass(pipeline, debug_name) => {
                    self.begin_pass(debug_name);
                    self.compute = Some(pipeline.internal().clone());
                }
                Command::EndComputePass(x, y, z, _) => {
                    self.dispatch((x, y, z));
                    self.compute = None;
                }
                Command::BeginRenderPass(descriptor, debug_name) => {
                    self.begin_pass(debug_name);
                    self.begin_render_pass(descriptor);
                }
                Command::EndRenderPass(_) => {
                    self.graphics = None;
                    self.targets.clear();
                }
                Command::BindGraphicsPipeline(pipeline) => {
                    self.graphics = Some(pipeline.internal().clone());
                }
                Command::BindDescriptorSets { sets, first, .. } => {
                    for (i, set) in sets.into_iter().enumerate() {
                        let slot = first + i;
                        if self.bindings.sets.len() <= slot {
                            self.bindings.sets.resize(slot + 1, None);
                        }
                        self.bindings.sets[slot] = Some(set.internal().bindings.clone());
                    }
                }
                Command::Draw {
                    vertex_count,
                    instance_count,
                    first_vertex,
                    ..
                } => {
                    for _ in 0..instance_count {
                        self.draw(vertex_count, first_vertex);
                    }
                }
            }
        }
        self.events
    }

    fn begin_pass(&mut self, debug_name: Option<&str>) {
        self.pass = debug_name.map(String::from);
        self.bindings = Bindings::default();
    }

    fn begin_render_pass(&mut self, descriptor: RenderPassDescriptor<'_, SoftwareBackend>) {
        for attachment in descriptor.color_attachments {
            let target = match attachment.dst {
                ColorAttachmentDestination::Texture {
                    texture,
                    array_element,
                    mip_level,
                } => Target {
                    texture: texture.internal().clone(),
                    array_element,
                    mip: mip_level,
                },
            };

            if let LoadOp::Clear(ClearColor::RgbaF32(r, g, b, a)) = attachment.load_op {
                target
                    .texture
                    .fill(target.array_element, target.mip, [r, g, b, a]);
            }
            self.targets.push(target);
        }
    }

    fn dispatch(&mut self, groups: (u32, u32, u32)) {
        let pipeline = match &self.compute {
            Some(pipeline) => pipeline,
            None => return,
        };
        validate_bindings(
            &pipeline.layouts,
            &self.bindings,
            pipeline.debug_name.as_deref(),
        );
        self.events.push(TraceEvent::Dispatch(DispatchRecord {
            pipeline: pipeline.debug_name.clone(),
            pass: self.pass.clone(),
            groups,
            uniforms: uniform_records(&self.bindings),
        }));

        let (wx, wy, wz) = pipeline.work_group_size;
        let (nx, ny, nz) = (groups.0 * wx, groups.1 * wy, groups.2 * wz);
        let kernel = pipeline.kernel;
        let bindings = &self.bindings;

        let writes: Vec<Vec<StorageWrite>> = (0..ny * nz)
            .into_par_iter()
            .map(|row| {
                let writes = RefCell::new(Vec::default());
                for x in 0..nx {
                    kernel(&Invocation {
                        global_id: UVec3::new(x, row % ny, row / ny),
                        bindings,
                        writes: &writes,
                    });
                }
                writes.into_inner()
            })
            .collect();

        for write in writes.into_iter().flatten() {
            let (texture, mip) = bindings.storage(write.set, write.binding);
            texture.store(write.array_element, mip, write.x, write.y, write.value);
        }
    }

    fn draw(&mut self, vertex_count: usize, first_vertex: usize) {
        let pipeline = match &self.graphics {
            Some(pipeline) => pipeline,
            None => return,
        };
        validate_bindings(
            &pipeline.layouts,
            &self.bindings,
            pipeline.debug_name.as_deref(),
        );

        for target in &self.targets {
            let dims = target.texture.mip_dims(target.mip);
            self.events.push(TraceEvent::Draw(DrawRecord {
                pipeline: pipeline.debug_name.clone(),
                pass: self.pass.clone(),
                target_dims: dims,
                vertex_count,
            }));

            for tri in 0..vertex_count / 3 {
                let vertices = [0, 1, 2]
                    .map(|k| (pipeline.vertex)((first_vertex + tri * 3 + k) as u32));
                let texels = rasterize(
                    &vertices,
                    dims,
                    pipeline.fragment,
                    &self.bindings,
                );
                for (x, y, value) in texels {
                    target
                        .texture
                        .store(target.array_element, target.mip, x, y, value);
                }
            }
        }
    }
}

fn uniform_records(bindings: &Bindings) -> Vec<UniformRecord> {
    let mut records = Vec::default();
    for (set, bound) in bindings.sets.iter().enumerate() {
        let bound = match bound {
            Some(bound) => bound,
            None => continue,
        };
        for (binding, value) in bound.iter() {
            if let Bound::Uniform {
                buffer,
                array_element,
            } = value
            {
                records.push(UniformRecord {
                    set,
                    binding: *binding,
                    data: buffer.bytes(*array_element),
                });
            }
        }
    }
    records.sort_by_key(|record| (record.set, record.binding));
    records
}

/// Scan converts one triangle. Covered pixel centers are shaded by `fragment`.
fn rasterize(
    vertices: &[VertexOutput; 3],
    (width, height): (u32, u32),
    fragment: crate::kernel::FragmentKernel,
    bindings: &Bindings,
) -> Vec<(u32, u32, Texel)> {
    // Screen space position with `z` holding `1 / w` for perspective correct interpolation.
    let screen = vertices.map(|v| {
        let inv_w = 1.0 / v.position.w;
        Vec3::new(
            (v.position.x * inv_w + 1.0) * 0.5 * width as f32,
            (1.0 - v.position.y * inv_w) * 0.5 * height as f32,
            inv_w,
        )
    });

    let edge = |a: Vec3, b: Vec3, p: Vec2| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    let area = edge(screen[0], screen[1], Vec2::new(screen[2].x, screen[2].y));
    if area == 0.0 {
        return Vec::default();
    }

    let min_x = screen.iter().map(|s| s.x).fold(f32::MAX, f32::min).max(0.0) as u32;
    let min_y = screen.iter().map(|s| s.y).fold(f32::MAX, f32::min).max(0.0) as u32;
    let max_x = (screen.iter().map(|s| s.x).fold(f32::MIN, f32::max).ceil() as u32).min(width);
    let max_y = (screen.iter().map(|s| s.y).fold(f32::MIN, f32::max).ceil() as u32).min(height);

    (min_y..max_y)
        .into_par_iter()
        .flat_map_iter(|y| {
            (min_x..max_x).filter_map(move |x| {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(screen[1], screen[2], p) / area;
                let w1 = edge(screen[2], screen[0], p) / area;
                let w2 = edge(screen[0], screen[1], p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    return None;
                }

                let weights = [w0 * screen[0].z, w1 * screen[1].z, w2 * screen[2].z];
                let norm = weights.iter().sum::<f32>();
                let uv = (vertices[0].uv * weights[0]
                    + vertices[1].uv * weights[1]
                    + vertices[2].uv * weights[2])
                    / norm;

                Some((
                    x,
                    y,
                    fragment(&Fragment {
                        position: p,
                        uv,
                        bindings,
                    }),
                ))
            })
        })
        .collect()
}
