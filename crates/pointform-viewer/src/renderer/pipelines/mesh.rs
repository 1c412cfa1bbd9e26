use crate::renderer::primitives::{unit_cube, unit_plane, MeshVertex, Primitive};
use crate::renderer::targets::DepthTarget;
use crate::textures::TextureStore;
use pointform::{MeshShape, TextureHandle};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

struct PrimitiveGpu {
    vtx: wgpu::Buffer,
    tris: wgpu::Buffer,
    tri_len: u32,
    lines: wgpu::Buffer,
    line_len: u32,
}

impl PrimitiveGpu {
    fn new(device: &wgpu::Device, label: &str, prim: &Primitive) -> Self {
        let init = |contents: &[u8], usage| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
        };
        Self {
            vtx: init(bytemuck::cast_slice(&prim.vertices), wgpu::BufferUsages::VERTEX),
            tris: init(bytemuck::cast_slice(&prim.triangles), wgpu::BufferUsages::INDEX),
            tri_len: prim.triangles.len() as u32,
            lines: init(bytemuck::cast_slice(&prim.lines), wgpu::BufferUsages::INDEX),
            line_len: prim.lines.len() as u32,
        }
    }
}

pub struct MeshPipeline {
    fill: wgpu::RenderPipeline,
    wire: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// 1x1 white, bound when a mesh has no texture.
    blank: wgpu::BindGroup,
    textures: HashMap<TextureHandle, wgpu::BindGroup>,
    cube: PrimitiveGpu,
    plane: PrimitiveGpu,
}

impl MeshPipeline {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_fmt: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
        draw_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/mesh.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/mesh.wgsl").into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mesh Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[globals_layout, draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let vbuf_layouts = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
        }];

        let build = |label: &str, topology: wgpu::PrimitiveTopology| {
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
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTarget::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_fmt,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };
        let fill = build("Mesh Pipeline", wgpu::PrimitiveTopology::TriangleList);
        let wire = build("Mesh Pipeline (wireframe)", wgpu::PrimitiveTopology::LineList);

        let blank = Self::texture_bind_group(
            device,
            queue,
            &texture_layout,
            &sampler,
            "Blank Texture",
            1,
            1,
            &[255, 255, 255, 255],
        );

        Self {
            fill,
            wire,
            cube: PrimitiveGpu::new(device, "Unit Cube", &unit_cube()),
            plane: PrimitiveGpu::new(device, "Unit Plane", &unit_plane()),
            texture_layout,
            sampler,
            blank,
            textures: HashMap::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn texture_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Uploads a decoded texture the first time it is drawn.
    pub fn upload_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &TextureStore,
        handle: TextureHandle,
    ) {
        if self.textures.contains_key(&handle) {
            return;
        }
        let Some(decoded) = store.get(handle) else {
            log::warn!("texture {} is not loaded; drawing untextured", handle.0);
            return;
        };
        let bind = Self::texture_bind_group(
            device,
            queue,
            &self.texture_layout,
            &self.sampler,
            "Mesh Texture",
            decoded.width,
            decoded.height,
            &decoded.rgba,
        );
        self.textures.insert(handle, bind);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        shape: &MeshShape,
        wireframe: bool,
        texture: Option<TextureHandle>,
        globals: &'a wgpu::BindGroup,
        draw: &'a wgpu::BindGroup,
    ) {
        let prim = match shape {
            MeshShape::Cuboid { .. } => &self.cube,
            MeshShape::Plane { .. } => &self.plane,
        };
        let texture = texture
            .and_then(|h| self.textures.get(&h))
            .unwrap_or(&self.blank);

        rpass.set_pipeline(if wireframe { &self.wire } else { &self.fill });
        rpass.set_bind_group(0, globals, &[]);
        rpass.set_bind_group(1, draw, &[]);
        rpass.set_bind_group(2, texture, &[]);
        rpass.set_vertex_buffer(0, prim.vtx.slice(..));
        if wireframe {
            rpass.set_index_buffer(prim.lines.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..prim.line_len, 0, 0..1);
        } else {
            rpass.set_index_buffer(prim.tris.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..prim.tri_len, 0, 0..1);
        }
    }
}
