use crate::renderer::targets::DepthTarget;
use pointform::{GeometryBuffer, GeometryId, PointVertex};
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

/// Uploaded point geometry.
struct PointsGpu {
    vtx: wgpu::Buffer,
    len: u32,
}

pub struct PointsPipeline {
    opaque: wgpu::RenderPipeline,
    /// Alpha-blended, no depth writes.
    blended: wgpu::RenderPipeline,
    quad_vb: wgpu::Buffer,
    uploads: HashMap<GeometryId, PointsGpu>,
}

impl PointsPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
        draw_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/points.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/points.wgsl").into()),
        });

        // Two triangles covering [-1, 1]^2
        let quad_corners: [[f32; 2]; 6] = [
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Sprite Quad VB"),
            contents: bytemuck::cast_slice(&quad_corners),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            // One instance per point
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            },
        ];

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points PipelineLayout"),
            bind_group_layouts: &[globals_layout, draw_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &vbuf_layouts,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTarget::FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_fmt,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        Self {
            opaque: build("Points Pipeline", None, true),
            blended: build(
                "Points Pipeline (blended)",
                Some(wgpu::BlendState::ALPHA_BLENDING),
                false,
            ),
            quad_vb,
            uploads: HashMap::new(),
        }
    }

    /// Uploads `geometry` unless a buffer for its identity already exists.
    pub fn upload(&mut self, device: &wgpu::Device, geometry: &GeometryBuffer) {
        if geometry.is_empty() || self.uploads.contains_key(&geometry.id()) {
            return;
        }
        let vertices = geometry.interleaved();
        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Instances"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::debug!("uploaded geometry {} ({} points)", geometry.id().get(), vertices.len());
        self.uploads.insert(
            geometry.id(),
            PointsGpu {
                vtx,
                len: vertices.len() as u32,
            },
        );
    }

    /// Drops uploads whose geometry was not drawn this frame.
    pub fn retain(&mut self, live: &HashSet<GeometryId>) {
        self.uploads.retain(|id, _| live.contains(id));
    }

    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        geometry: GeometryId,
        globals: &'a wgpu::BindGroup,
        draw: &'a wgpu::BindGroup,
        blended: bool,
    ) {
        let Some(gpu) = self.uploads.get(&geometry) else {
            return;
        };
        rpass.set_pipeline(if blended { &self.blended } else { &self.opaque });
        rpass.set_bind_group(0, globals, &[]);
        rpass.set_bind_group(1, draw, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, gpu.vtx.slice(..));
        rpass.draw(0..6, 0..gpu.len);
    }
}
