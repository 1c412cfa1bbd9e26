//! GPU-side uniform layouts. Field order and padding must match `shaders/*.wgsl`.

use glam::Mat4;
use pointform::{Camera, ColorMode, Light, MeshMaterial, PointMaterial, Surface, Viewport};

pub const MAX_POINT_LIGHTS: usize = 4;

/// Per-frame data, bind group 0 in both pipelines.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// Viewport width and height in pixels.
    pub viewport: [f32; 4],
    /// Summed ambient colour times intensity.
    pub ambient: [f32; 4],
    pub light_pos: [[f32; 4]; MAX_POINT_LIGHTS],
    /// Colour times intensity.
    pub light_color: [[f32; 4]; MAX_POINT_LIGHTS],
    pub light_count: [u32; 4],
}

impl Globals {
    pub fn new(camera: &Camera, viewport: Viewport, lights: &[Light]) -> Self {
        let mut globals = Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            viewport: [viewport.width as f32, viewport.height as f32, 0.0, 0.0],
            ambient: [0.0; 4],
            light_pos: [[0.0; 4]; MAX_POINT_LIGHTS],
            light_color: [[0.0; 4]; MAX_POINT_LIGHTS],
            light_count: [0; 4],
        };

        let mut n = 0;
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for c in 0..3 {
                        globals.ambient[c] += color[c] * intensity;
                    }
                }
                Light::Point {
                    position,
                    color,
                    intensity,
                } => {
                    if n == MAX_POINT_LIGHTS {
                        log::debug!("dropping point light beyond {MAX_POINT_LIGHTS}");
                        continue;
                    }
                    globals.light_pos[n] = position.extend(1.0).to_array();
                    globals.light_color[n] = [color[0] * intensity, color[1] * intensity, color[2] * intensity, 0.0];
                    n += 1;
                }
            }
        }
        globals.light_count[0] = n as u32;
        globals
    }
}

pub const SURFACE_SOLID: f32 = 0.0;
pub const SURFACE_GRADIENT: f32 = 1.0;
pub const SURFACE_TEXTURED: f32 = 2.0;

/// Per-draw data, bind group 1 in both pipelines.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Points: uniform colour and opacity. Meshes: solid or gradient bottom colour.
    pub color_a: [f32; 4],
    /// Gradient top colour.
    pub color_b: [f32; 4],
    /// Points: (world size, min pixel size, uniform colour flag, 0).
    /// Meshes: (surface kind, lit flag, 0, 0).
    pub params: [f32; 4],
}

impl DrawUniform {
    fn with_model(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color_a: [1.0; 4],
            color_b: [1.0; 4],
            params: [0.0; 4],
        }
    }

    pub fn points(world: Mat4, material: &PointMaterial) -> Self {
        let mut u = Self::with_model(world);
        let (rgb, uniform) = match material.color_mode {
            ColorMode::PerVertex => ([1.0; 3], 0.0),
            ColorMode::Uniform(rgb) => (rgb, 1.0),
        };
        u.color_a = [rgb[0], rgb[1], rgb[2], material.opacity];
        u.params = [material.size, material.point_size, uniform, 0.0];
        u
    }

    /// `size` scales the unit primitive before `world`.
    pub fn mesh(world: Mat4, size: glam::Vec3, material: &MeshMaterial) -> Self {
        let mut u = Self::with_model(world * Mat4::from_scale(size));
        let lit = if material.lit && !material.wireframe { 1.0 } else { 0.0 };
        let kind = match material.surface {
            Surface::Solid(rgb) => {
                u.color_a = [rgb[0], rgb[1], rgb[2], 1.0];
                SURFACE_SOLID
            }
            Surface::VerticalGradient { bottom, top } => {
                u.color_a = [bottom[0], bottom[1], bottom[2], 1.0];
                u.color_b = [top[0], top[1], top[2], 1.0];
                SURFACE_GRADIENT
            }
            Surface::Textured(_) => SURFACE_TEXTURED,
        };
        u.params = [kind, lit, 0.0, 0.0];
        u
    }
}

pub fn uniform_layout(device: &wgpu::Device, label: &str, size: usize) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        }],
    })
}

/// A uniform buffer and the bind group pointing at it.
pub struct UniformSlot {
    pub buffer: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
}

impl UniformSlot {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: usize, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind }
    }
}

/// Grow-only pool of per-draw uniform slots, reused frame to frame.
pub struct DrawSlots {
    pub layout: wgpu::BindGroupLayout,
    slots: Vec<UniformSlot>,
}

impl DrawSlots {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            layout: uniform_layout(device, "Draw UBO Layout", std::mem::size_of::<DrawUniform>()),
            slots: Vec::new(),
        }
    }

    /// Writes `data` into slot `i`, allocating slots up to `i` as needed.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, i: usize, data: &DrawUniform) {
        while self.slots.len() <= i {
            self.slots.push(UniformSlot::new(
                device,
                &self.layout,
                std::mem::size_of::<DrawUniform>(),
                "Draw UBO",
            ));
        }
        queue.write_buffer(&self.slots[i].buffer, 0, bytemuck::bytes_of(data));
    }

    pub fn bind(&self, i: usize) -> Option<&wgpu::BindGroup> {
        self.slots.get(i).map(|s| &s.bind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layouts_match_the_shaders() {
        assert_eq!(std::mem::size_of::<Globals>(), 240);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 176);
    }

    #[test]
    fn lights_are_packed() {
        let lights = [
            Light::ambient(0.2),
            Light::ambient(0.3),
            Light::point(Vec3::splat(5.0), 2.0),
        ];
        let g = Globals::new(&Camera::default(), Viewport::new(800, 600), &lights);
        assert!((g.ambient[0] - 0.5).abs() < 1e-6);
        assert_eq!(g.light_count[0], 1);
        assert_eq!(g.light_pos[0], [5.0, 5.0, 5.0, 1.0]);
        assert_eq!(g.light_color[0][1], 2.0);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let lights = vec![Light::point(Vec3::ONE, 1.0); MAX_POINT_LIGHTS + 2];
        let g = Globals::new(&Camera::default(), Viewport::new(1, 1), &lights);
        assert_eq!(g.light_count[0] as usize, MAX_POINT_LIGHTS);
    }

    #[test]
    fn uniform_points_carry_colour_and_opacity() {
        let u = DrawUniform::points(Mat4::IDENTITY, &PointMaterial::uniform([1.0; 3], 0.02, 0.6));
        assert_eq!(u.color_a, [1.0, 1.0, 1.0, 0.6]);
        assert_eq!(u.params, [0.02, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn wireframe_meshes_are_unlit() {
        let u = DrawUniform::mesh(Mat4::IDENTITY, Vec3::ONE, &MeshMaterial::wireframe([1.0; 3]));
        assert_eq!(u.params[1], 0.0);
        assert_eq!(u.params[0], SURFACE_SOLID);
    }
}
