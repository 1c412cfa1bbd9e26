//! Deterministic deformations applied to every sampled point.

use crate::error::ShapeError;
use glam::Vec3;
use std::fmt;
use std::sync::Arc;

/// Coefficients of the berry deformation.
///
/// Applied in order: vertical stretch and bias, a taper that narrows the pole
/// as the horizontal radius grows, independent widening of the lower and
/// upper halves, and a final horizontal scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BerryWarp {
    pub stretch: f32,
    pub bias: f32,
    pub taper: f32,
    /// Horizontal factor for points that end up below `y = 0`.
    pub lower_widen: f32,
    /// Horizontal factor for points that end up above `y = 0`.
    pub upper_widen: f32,
    pub radial_scale: f32,
}

impl Default for BerryWarp {
    fn default() -> Self {
        Self {
            stretch: 1.2,
            bias: -0.1,
            taper: 0.5,
            lower_widen: 1.2,
            upper_widen: 1.2,
            radial_scale: 0.8,
        }
    }
}

impl BerryWarp {
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let Vec3 { mut x, mut y, mut z } = p;

        y = y * self.stretch + self.bias;
        let r = (x * x + z * z).sqrt();
        y *= 1.0 - r * self.taper;

        // y == 0 is left alone on purpose: it belongs to neither half.
        if y < 0.0 {
            x *= self.lower_widen;
            z *= self.lower_widen;
        }
        if y > 0.0 {
            x *= self.upper_widen;
            z *= self.upper_widen;
        }

        Vec3::new(x * self.radial_scale, y, z * self.radial_scale)
    }

    fn validate(&self) -> Result<(), ShapeError> {
        let fields = [
            ("warp stretch", self.stretch),
            ("warp bias", self.bias),
            ("warp taper", self.taper),
            ("warp lower widen", self.lower_widen),
            ("warp upper widen", self.upper_widen),
            ("warp radial scale", self.radial_scale),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ShapeError::NonFinite { name, value });
            }
        }
        Ok(())
    }
}

/// Deformation applied to each raw sample.
#[derive(Clone, Default)]
pub enum Warp {
    #[default]
    Identity,
    Berry(BerryWarp),
    /// Any other shape. Must be deterministic.
    Custom(Arc<dyn Fn(Vec3) -> Vec3 + Send + Sync>),
}

impl Warp {
    pub fn custom(f: impl Fn(Vec3) -> Vec3 + Send + Sync + 'static) -> Self {
        Warp::Custom(Arc::new(f))
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        match self {
            Warp::Identity => p,
            Warp::Berry(berry) => berry.apply(p),
            Warp::Custom(f) => f(p),
        }
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Warp::Berry(berry) => berry.validate(),
            Warp::Identity | Warp::Custom(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Warp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warp::Identity => f.write_str("Identity"),
            Warp::Berry(berry) => f.debug_tuple("Berry").field(berry).finish(),
            Warp::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn berry_north_pole() {
        // (0, 1, 0): y = 1.2 - 0.1 = 1.1, r = 0 so no taper, no horizontal change.
        let p = BerryWarp::default().apply(Vec3::Y);
        assert!((p.y - 1.1).abs() < 1e-6);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn berry_equator_is_widened_below_zero() {
        // (1, 0, 0): y = -0.1, r = 1 so y = -0.05; lower half widens x by 1.2,
        // then the radial scale of 0.8 applies.
        let p = BerryWarp::default().apply(Vec3::X);
        assert!((p.y + 0.05).abs() < 1e-6);
        assert!((p.x - 1.2 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn halves_widen_independently() {
        let warp = BerryWarp {
            lower_widen: 2.0,
            upper_widen: 1.0,
            radial_scale: 1.0,
            ..BerryWarp::default()
        };
        let below = warp.apply(Vec3::new(0.5, -0.5, 0.0));
        let above = warp.apply(Vec3::new(0.5, 0.5, 0.0));
        assert!((below.x - 1.0).abs() < 1e-6);
        assert!((above.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn custom_warp_is_used() {
        let warp = Warp::custom(|p| p * 2.0);
        assert_eq!(warp.apply(Vec3::ONE), Vec3::splat(2.0));
    }

    #[test]
    fn rejects_nan_coefficients() {
        let warp = Warp::Berry(BerryWarp {
            taper: f32::NAN,
            ..BerryWarp::default()
        });
        assert!(matches!(
            warp.validate(),
            Err(ShapeError::NonFinite { name: "warp taper", .. })
        ));
    }
}
