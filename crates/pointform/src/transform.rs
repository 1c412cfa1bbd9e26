//! Rigid-body frames and the per-tick motion that drives them.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Rotation (Euler XYZ, radians), translation and per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Vec3,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: Vec3::ZERO,
        position: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local-to-parent matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

/// Position driven by elapsed time: `x = amplitude.x * sin(t)`,
/// `y = amplitude.y * cos(t)`. Z is left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sway {
    pub amplitude: Vec3,
}

/// Per-object animation applied once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Angular rate per axis in rad/s.
    pub spin: Vec3,
    pub sway: Option<Sway>,
}

impl Motion {
    pub fn spin(spin: Vec3) -> Self {
        Self { spin, sway: None }
    }

    pub fn with_sway(mut self, amplitude: Vec3) -> Self {
        self.sway = Some(Sway { amplitude });
        self
    }

    pub fn is_still(&self) -> bool {
        self.spin == Vec3::ZERO && self.sway.is_none()
    }

    /// Advances `transform` by `delta` seconds, at `elapsed` seconds since start.
    pub fn advance(&self, transform: &mut Transform, delta: f32, elapsed: f32) {
        transform.rotation += self.spin * delta;
        if let Some(sway) = self.sway {
            let (sin_t, cos_t) = elapsed.sin_cos();
            transform.position.x = sway.amplitude.x * sin_t;
            transform.position.y = sway.amplitude.y * cos_t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn spin_scales_with_delta() {
        let mut t = Transform::IDENTITY;
        let motion = Motion::spin(Vec3::new(0.0, 0.15, 0.0));
        motion.advance(&mut t, 0.5, 0.5);
        motion.advance(&mut t, 0.5, 1.0);
        assert!((t.rotation.y - 0.15).abs() < 1e-6);
        assert_eq!(t.rotation.x, 0.0);
    }

    #[test]
    fn sway_follows_elapsed_time() {
        let mut t = Transform::from_position(Vec3::new(9.0, 9.0, 3.0));
        let motion = Motion::default().with_sway(Vec3::new(1.0, 2.0, 0.0));
        motion.advance(&mut t, 0.016, FRAC_PI_2);
        assert!((t.position.x - 1.0).abs() < 1e-6);
        assert!(t.position.y.abs() < 1e-6);
        assert_eq!(t.position.z, 3.0);
    }

    #[test]
    fn matrix_applies_rotation_about_z() {
        let t = Transform::IDENTITY.with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_2));
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-6);
    }
}
