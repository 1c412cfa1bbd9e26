//! Owns the GPU context, depth target and pipelines, and turns a scene graph
//! into one render pass per frame.

pub mod context;
pub mod pipelines;
pub mod primitives;
pub mod targets;
pub mod types;

use self::{
    context::GfxContext,
    pipelines::{mesh::MeshPipeline, points::PointsPipeline},
    targets::DepthTarget,
    types::{uniform_layout, DrawSlots, DrawUniform, Globals, UniformSlot},
};
use crate::textures::TextureStore;
use glam::Vec3;
use pointform::{Camera, DrawItem, MeshShape, RenderError, SceneGraph, TextureHandle, Viewport};
use std::collections::HashSet;
use std::sync::Arc;
use winit::window::Window;

/// What to bind for one draw, resolved before the pass starts.
enum Planned<'g> {
    Points {
        geometry: pointform::GeometryId,
        blended: bool,
    },
    Mesh {
        shape: &'g MeshShape,
        wireframe: bool,
        texture: Option<TextureHandle>,
    },
}

pub struct Renderer {
    pub gfx: GfxContext,
    depth: DepthTarget,
    globals: UniformSlot,
    draws: DrawSlots,
    points: PointsPipeline,
    meshes: MeshPipeline,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, viewport: Viewport) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window, viewport).await?;
        let size = gfx.size();

        let globals_layout = uniform_layout(&gfx.device, "Globals UBO Layout", std::mem::size_of::<Globals>());
        let globals = UniformSlot::new(&gfx.device, &globals_layout, std::mem::size_of::<Globals>(), "Globals UBO");
        let draws = DrawSlots::new(&gfx.device);

        let points = PointsPipeline::new(&gfx.device, gfx.config.format, &globals_layout, &draws.layout);
        let meshes = MeshPipeline::new(
            &gfx.device,
            &gfx.queue,
            gfx.config.format,
            &globals_layout,
            &draws.layout,
        );
        let depth = DepthTarget::new(&gfx.device, size.width, size.height);

        Ok(Self {
            gfx,
            depth,
            globals,
            draws,
            points,
            meshes,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.gfx.resize(width, height);
            self.depth.resize(&self.gfx.device, width, height);
        }
    }

    pub fn render(
        &mut self,
        graph: &SceneGraph<'_>,
        camera: &Camera,
        textures: &TextureStore,
    ) -> Result<(), RenderError> {
        let frame = match self.gfx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.gfx.reconfigure();
                return Err(RenderError::TransientDraw(format!("surface {e}; reconfigured")));
            }
            Err(e) => return Err(RenderError::TransientDraw(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &self.gfx.device;
        let queue = &self.gfx.queue;

        let globals = Globals::new(camera, self.gfx.size(), &graph.lights());
        queue.write_buffer(&self.globals.buffer, 0, bytemuck::bytes_of(&globals));

        let items = graph.draw_list();
        let mut plan = Vec::with_capacity(items.len());
        let mut live = HashSet::new();
        for (slot, item) in items.iter().enumerate() {
            match *item {
                DrawItem::Points { cloud, world } => {
                    let geometry = cloud.geometry();
                    self.points.upload(device, geometry);
                    live.insert(geometry.id());
                    self.draws
                        .write(device, queue, slot, &DrawUniform::points(world, cloud.material()));
                    plan.push(Planned::Points {
                        geometry: geometry.id(),
                        blended: cloud.material().is_transparent(),
                    });
                }
                DrawItem::Mesh { mesh, world } => {
                    let size = match mesh.shape {
                        MeshShape::Cuboid { size } => size,
                        MeshShape::Plane { width, height } => Vec3::new(width, height, 1.0),
                    };
                    let texture = match mesh.material.surface {
                        pointform::Surface::Textured(handle) => {
                            self.meshes.upload_texture(device, queue, textures, handle);
                            Some(handle)
                        }
                        _ => None,
                    };
                    self.draws
                        .write(device, queue, slot, &DrawUniform::mesh(world, size, &mesh.material));
                    plan.push(Planned::Mesh {
                        shape: &mesh.shape,
                        wireframe: mesh.material.wireframe,
                        texture,
                    });
                }
            }
        }
        self.points.retain(&live);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let [r, g, b] = graph.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, planned) in plan.iter().enumerate() {
                let Some(draw) = self.draws.bind(slot) else {
                    continue;
                };
                match planned {
                    Planned::Points { geometry, blended } => {
                        self.points
                            .draw(&mut pass, *geometry, &self.globals.bind, draw, *blended)
                    }
                    Planned::Mesh {
                        shape,
                        wireframe,
                        texture,
                    } => self.meshes.draw(
                        &mut pass,
                        shape,
                        *wireframe,
                        *texture,
                        &self.globals.bind,
                        draw,
                    ),
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
