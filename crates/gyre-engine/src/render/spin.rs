use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

// ── rotation uniform ──────────────────────────────────────────────────────

/// Rotation uniform fed to the vertex shader.
///
/// `rot` is the (cos, sin) of the frame's angle; `aspect` is width/height of
/// the drawable so rotation does not shear on non-square targets.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpinUniform {
    rot: [f32; 2],
    aspect: f32,
    _pad: f32, // 16-byte alignment
}

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpinVertex {
    pos: [f32; 2],
    color: [f32; 4],
}

impl SpinVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpinVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const TRIANGLE: [SpinVertex; 3] = [
    SpinVertex {
        pos: [0.0, 0.6],
        color: [1.0, 0.2, 0.2, 1.0],
    },
    SpinVertex {
        pos: [-0.55, -0.45],
        color: [0.2, 1.0, 0.2, 1.0],
    },
    SpinVertex {
        pos: [0.55, -0.45],
        color: [0.2, 0.2, 1.0, 1.0],
    },
];

// ── pass ──────────────────────────────────────────────────────────────────

/// Per-slot uniform resources; one slot per frame in flight.
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Pipeline + buffers for the rotating-triangle pass.
///
/// Compiled once at init; per-frame work is one uniform write and one render
/// pass.
pub(crate) struct SpinPass {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    slots: Vec<UniformSlot>,
    clear_color: wgpu::Color,
}

impl SpinPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        slot_count: usize,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gyre spin shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/spin.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("gyre spin bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(uniform_min_binding_size()),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gyre spin pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gyre spin pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[SpinVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gyre spin vbo"),
            contents: bytemuck::cast_slice(&TRIANGLE),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let slots = (0..slot_count.max(1))
            .map(|_| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("gyre spin ubo"),
                    size: std::mem::size_of::<SpinUniform>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("gyre spin bind group"),
                    layout: &bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                UniformSlot { buffer, bind_group }
            })
            .collect();

        Self {
            pipeline,
            vertex_buffer,
            slots,
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
        }
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Uploads the frame's angle into `slot`.
    ///
    /// The caller guarantees (via the inflight gate) that the GPU is done
    /// reading this slot's previous contents.
    pub(crate) fn write_uniform(
        &self,
        queue: &wgpu::Queue,
        slot: usize,
        angle: f32,
        size: (u32, u32),
    ) {
        let aspect = if size.1 == 0 {
            1.0
        } else {
            size.0 as f32 / size.1 as f32
        };
        let uniform = SpinUniform {
            rot: [angle.cos(), angle.sin()],
            aspect,
            _pad: 0.0,
        };
        queue.write_buffer(&self.slots[slot].buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Records the pass into `encoder`, clearing the target first.
    pub(crate) fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        slot: usize,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gyre spin pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.slots[slot].bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.draw(0..3, 0..1);
    }
}

/// Minimum binding size for the rotation uniform buffer.
///
/// `SpinUniform` is 16 bytes, so the size is always non-zero; centralising
/// this avoids an `.unwrap()` at the pipeline-creation site.
fn uniform_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<SpinUniform>() as u64)
        .expect("SpinUniform has non-zero size by construction")
}
