use glam::Vec3;
use pointform::{Camera, OrbitBounds};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Fraction of the pending rotation applied per update when damping is on.
const DAMPING: f32 = 0.05;
const ROTATE_SPEED: f32 = 0.005;
/// Keeps the polar angle off the poles.
const POLE_EPS: f32 = 1e-3;

/// Mouse-driven orbit around `camera.target`, limited by [`OrbitBounds`].
///
/// Left drag rotates, right drag pans, the wheel zooms.
pub struct OrbitController {
    bounds: OrbitBounds,
    rotating: bool,
    panning: bool,
    last_mouse: Option<(f64, f64)>,
    /// Pending (azimuth, polar) rotation in radians.
    pending: (f32, f32),
}

impl OrbitController {
    pub fn new(bounds: OrbitBounds) -> Self {
        Self {
            bounds,
            rotating: false,
            panning: false,
            last_mouse: None,
            pending: (0.0, 0.0),
        }
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let xy = (position.x, position.y);
                if let Some(last) = self.last_mouse {
                    let dx = (xy.0 - last.0) as f32;
                    let dy = (xy.1 - last.1) as f32;
                    if self.rotating {
                        self.rotate(dx, dy);
                    } else if self.panning {
                        self.pan(dx, dy, camera);
                    }
                }
                self.last_mouse = Some(xy);
                self.rotating || self.panning
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.zoom(scroll, camera);
                true
            }
            _ => false,
        }
    }

    /// Queues a rotation from a mouse drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending.0 -= dx * ROTATE_SPEED;
        self.pending.1 -= dy * ROTATE_SPEED;
    }

    /// Positive `scroll` zooms in.
    pub fn zoom(&mut self, scroll: f32, camera: &mut Camera) {
        if !self.bounds.enable_zoom {
            return;
        }
        let distance = camera.distance() * 1.1f32.powf(-scroll);
        camera.set_distance(self.bounds.clamp_distance(distance));
    }

    /// Slides camera and target together in the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &mut Camera) {
        if !self.bounds.enable_pan {
            return;
        }
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = camera.distance() * 0.001;
        let offset = (-right * dx + up * dy) * scale;
        camera.position += offset;
        camera.target += offset;
    }

    /// Applies pending rotation. Call once per frame.
    pub fn update(&mut self, camera: &mut Camera) {
        let (d_azimuth, d_polar) = if self.bounds.enable_damping {
            (self.pending.0 * DAMPING, self.pending.1 * DAMPING)
        } else {
            self.pending
        };
        if d_azimuth == 0.0 && d_polar == 0.0 {
            return;
        }

        let offset = camera.position - camera.target;
        let radius = self.bounds.clamp_distance(offset.length());
        let azimuth = offset.x.atan2(offset.z) + d_azimuth;
        let polar = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos()
            + d_polar;
        let polar = polar.clamp(POLE_EPS, std::f32::consts::PI - POLE_EPS);

        let (sin_p, cos_p) = polar.sin_cos();
        let (sin_a, cos_a) = azimuth.sin_cos();
        camera.position = camera.target + Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * radius;

        if self.bounds.enable_damping {
            self.pending.0 -= d_azimuth;
            self.pending.1 -= d_polar;
            if self.pending.0.abs() < 1e-5 && self.pending.1.abs() < 1e-5 {
                self.pending = (0.0, 0.0);
            }
        } else {
            self.pending = (0.0, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_respects_bounds() {
        let mut camera = Camera::perspective(50.0, Vec3::new(0.0, 0.0, 5.0));
        let mut ctl = OrbitController::new(OrbitBounds::distance(0.5, 10.0));
        for _ in 0..100 {
            ctl.zoom(-1.0, &mut camera);
        }
        assert!((camera.distance() - 10.0).abs() < 1e-4);
        for _ in 0..100 {
            ctl.zoom(1.0, &mut camera);
        }
        assert!((camera.distance() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn disabled_pan_leaves_camera_alone() {
        let mut camera = Camera::perspective(100.0, Vec3::new(0.0, 15.0, 10.0));
        let before = camera.clone();
        let mut ctl = OrbitController::new(OrbitBounds {
            enable_pan: false,
            ..OrbitBounds::default()
        });
        ctl.pan(40.0, 40.0, &mut camera);
        assert_eq!(camera, before);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut camera = Camera::perspective(50.0, Vec3::new(0.0, 0.0, 5.0));
        let mut ctl = OrbitController::new(OrbitBounds::default());
        ctl.rotate(100.0, 30.0);
        ctl.update(&mut camera);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn damping_eases_in() {
        let mut damped = Camera::perspective(50.0, Vec3::new(0.0, 0.0, 5.0));
        let mut direct = damped.clone();
        let mut slow = OrbitController::new(OrbitBounds {
            enable_damping: true,
            ..OrbitBounds::default()
        });
        let mut fast = OrbitController::new(OrbitBounds::default());
        slow.rotate(200.0, 0.0);
        fast.rotate(200.0, 0.0);
        slow.update(&mut damped);
        fast.update(&mut direct);
        assert!(damped.position.x.abs() < direct.position.x.abs());

        for _ in 0..1000 {
            slow.update(&mut damped);
        }
        assert!((damped.position - direct.position).length() < 1e-2);
    }
}
