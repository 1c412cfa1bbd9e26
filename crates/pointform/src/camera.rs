//! Perspective camera, viewport and orbit-control bounds.

use glam::{Mat4, Vec3};

/// Size of the container a surface is drawn into, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` for a collapsed container.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(75.0, Vec3::new(0.0, 0.0, 5.0))
    }
}

impl Camera {
    /// Camera at `position` looking at the origin.
    pub fn perspective(fov_y_deg: f32, position: Vec3) -> Self {
        Self {
            fov_y_deg,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            position,
            target: Vec3::ZERO,
        }
    }

    /// Updates the aspect ratio from a container size. Returns `false` and
    /// leaves the camera untouched for a collapsed container.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        match viewport.aspect() {
            Some(aspect) => {
                self.aspect = aspect;
                true
            }
            None => false,
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Moves the camera along its current line of sight to `distance`.
    pub fn set_distance(&mut self, distance: f32) {
        let dir = (self.position - self.target).normalize_or_zero();
        let dir = if dir == Vec3::ZERO { Vec3::Z } else { dir };
        self.position = self.target + dir * distance;
    }

    pub fn view(&self) -> Mat4 {
        let forward = (self.target - self.position).normalize_or_zero();
        // Looking straight along Y makes Y a useless up vector.
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    /// Right-handed projection with depth in [0, 1].
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Orbit-control limits. Consumed as configuration by whichever controller
/// the host wires up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            enable_zoom: true,
            enable_pan: true,
            enable_damping: false,
        }
    }
}

impl OrbitBounds {
    pub fn distance(min_distance: f32, max_distance: f32) -> Self {
        Self {
            min_distance,
            max_distance,
            ..Self::default()
        }
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}
