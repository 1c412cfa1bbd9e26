//! Per-point colour rules.

use crate::error::ShapeError;
use glam::Vec3;
use rand::Rng;

/// Converts an HSL triple (all components in [0,1]) to linear RGB in [0,1].
///
/// Hue wraps, saturation and lightness are clamped.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// How a sampled point gets its colour.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorRule {
    /// Every point gets the same colour.
    Solid([f32; 3]),
    /// Fixed hue and saturation, lightness drawn uniformly from `[min, max)`.
    HueBand {
        hue: f32,
        saturation: f32,
        lightness_min: f32,
        lightness_max: f32,
    },
}

impl ColorRule {
    /// Red band used for the berry body.
    pub const BERRY: ColorRule = ColorRule::HueBand {
        hue: 0.0,
        saturation: 1.0,
        lightness_min: 0.3,
        lightness_max: 0.6,
    };

    /// Green band used for the leaf cluster.
    pub const LEAF: ColorRule = ColorRule::HueBand {
        hue: 0.3,
        saturation: 0.8,
        lightness_min: 0.3,
        lightness_max: 0.6,
    };

    pub fn validate(&self) -> Result<(), ShapeError> {
        match *self {
            ColorRule::Solid(rgb) => {
                for value in rgb {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(ShapeError::OutOfRange {
                            name: "solid colour channel",
                            value,
                        });
                    }
                }
                Ok(())
            }
            ColorRule::HueBand {
                hue,
                saturation,
                lightness_min,
                lightness_max,
            } => {
                if !hue.is_finite() {
                    return Err(ShapeError::NonFinite { name: "hue", value: hue });
                }
                if !saturation.is_finite() {
                    return Err(ShapeError::NonFinite {
                        name: "saturation",
                        value: saturation,
                    });
                }
                let ordered = lightness_min <= lightness_max;
                let bounded = lightness_min >= 0.0 && lightness_max <= 1.0;
                if !(ordered && bounded) {
                    return Err(ShapeError::InvalidRange {
                        name: "lightness",
                        min: lightness_min,
                        max: lightness_max,
                    });
                }
                Ok(())
            }
        }
    }

    /// Colour for a point at `_position`. Band rules draw one value from `rng`.
    pub fn color<R: Rng + ?Sized>(&self, _position: Vec3, rng: &mut R) -> [f32; 3] {
        match *self {
            ColorRule::Solid(rgb) => rgb,
            ColorRule::HueBand {
                hue,
                saturation,
                lightness_min,
                lightness_max,
            } => {
                let lightness = lightness_min + rng.gen::<f32>() * (lightness_max - lightness_min);
                hsl_to_rgb(hue, saturation, lightness)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert_eq!(hsl_to_rgb(0.7, 0.0, 0.25), [0.25, 0.25, 0.25]);
    }

    #[test]
    fn berry_band_stays_red() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let [r, g, b] = ColorRule::BERRY.color(Vec3::ZERO, &mut rng);
            // hue 0, saturation 1: green and blue track each other, red dominates
            assert!((g - b).abs() < 1e-6);
            assert!(r >= 0.6 - 1e-6 && r <= 1.0 + 1e-6);
            assert!(g < 0.2 + 1e-6);
        }
    }

    #[test]
    fn rejects_inverted_lightness() {
        let rule = ColorRule::HueBand {
            hue: 0.0,
            saturation: 1.0,
            lightness_min: 0.6,
            lightness_max: 0.3,
        };
        assert!(matches!(
            rule.validate(),
            Err(ShapeError::InvalidRange { name: "lightness", .. })
        ));
    }
}
