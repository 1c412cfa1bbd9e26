//! Base distributions the sampler draws raw positions from.

use crate::error::ShapeError;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Draws a point uniformly on the unit sphere.
///
/// Uses inverse transform sampling on the polar angle (`phi = acos(2u - 1)`);
/// drawing `phi` uniformly instead would bunch points at the poles.
/// The pole axis is +Y.
pub fn sample_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
}

/// Radial spokes: points binned onto `spokes` evenly spaced angles.
#[derive(Debug, Clone, PartialEq)]
pub struct SpokeLayout {
    pub spokes: u32,
    /// Radius is drawn from `[0, radius_max)` before `radial_scale` applies.
    pub radius_max: f32,
    pub radial_scale: f32,
    /// Height is drawn from `[base_height, base_height + height_span)`.
    pub base_height: f32,
    pub height_span: f32,
}

impl Default for SpokeLayout {
    fn default() -> Self {
        Self {
            spokes: 7,
            radius_max: 0.6,
            radial_scale: 1.5,
            base_height: 0.8,
            height_span: 0.2,
        }
    }
}

/// Disc scatter with an unconstrained angle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterLayout {
    /// Angle is drawn from `[0, angle_span)`.
    pub angle_span: f32,
    pub radius_max: f32,
    pub radial_scale: f32,
    pub base_height: f32,
    pub height_span: f32,
}

impl ScatterLayout {
    /// Angle span used by the leaf cluster. It wraps the circle 22.5 times,
    /// which changes nothing for uniform draws but is kept so the density
    /// stays tunable. Use `TAU` for a single sweep.
    pub const LEAF_ANGLE_SPAN: f32 = 45.0 * PI;
}

impl Default for ScatterLayout {
    fn default() -> Self {
        Self {
            angle_span: Self::LEAF_ANGLE_SPAN,
            radius_max: 0.5,
            radial_scale: 1.2,
            base_height: 0.8,
            height_span: 0.5,
        }
    }
}

/// Base distribution of a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    /// Uniform areal density on the unit sphere.
    UnitSphere,
    /// Uniform volume density inside a ball.
    Ball { radius: f32 },
    Spokes(SpokeLayout),
    Scatter(ScatterLayout),
    /// Independent passes whose outputs are concatenated in order. The point
    /// count is split evenly, earlier passes taking the remainder.
    Concat(Vec<Distribution>),
}

impl Distribution {
    /// Spoke pass followed by a scatter pass, as used for the leaf cluster.
    pub fn leaf_cluster() -> Self {
        Distribution::Concat(vec![
            Distribution::Spokes(SpokeLayout::default()),
            Distribution::Scatter(ScatterLayout::default()),
        ])
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Distribution::UnitSphere => Ok(()),
            Distribution::Ball { radius } => positive("ball radius", *radius),
            Distribution::Spokes(layout) => {
                if layout.spokes == 0 {
                    return Err(ShapeError::NoSpokes);
                }
                non_negative("spoke radius", layout.radius_max)?;
                finite("spoke radial scale", layout.radial_scale)?;
                finite("spoke base height", layout.base_height)?;
                non_negative("spoke height span", layout.height_span)
            }
            Distribution::Scatter(layout) => {
                non_negative("scatter angle span", layout.angle_span)?;
                non_negative("scatter radius", layout.radius_max)?;
                finite("scatter radial scale", layout.radial_scale)?;
                finite("scatter base height", layout.base_height)?;
                non_negative("scatter height span", layout.height_span)
            }
            Distribution::Concat(parts) => {
                if parts.is_empty() {
                    return Err(ShapeError::EmptyComposite);
                }
                parts.iter().try_for_each(Distribution::validate)
            }
        }
    }

    /// Draws one raw position from a single-pass distribution.
    ///
    /// `Concat` is expanded by the sampler and never reaches this method;
    /// it falls back to its first pass.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self {
            Distribution::UnitSphere => sample_unit_sphere(rng),
            Distribution::Ball { radius } => {
                let dir = sample_unit_sphere(rng);
                dir * (radius * rng.gen::<f32>().cbrt())
            }
            Distribution::Spokes(layout) => {
                let angle = rng.gen::<f32>() * TAU;
                let radius = rng.gen::<f32>() * layout.radius_max;
                let height = rng.gen::<f32>() * layout.height_span;

                let step = TAU / layout.spokes as f32;
                let spoke_angle = (angle / step).floor() * step;
                let (sin_a, cos_a) = spoke_angle.sin_cos();

                Vec3::new(
                    radius * cos_a * layout.radial_scale,
                    height + layout.base_height,
                    radius * sin_a * layout.radial_scale,
                )
            }
            Distribution::Scatter(layout) => {
                let angle = rng.gen::<f32>() * layout.angle_span;
                let radius = rng.gen::<f32>() * layout.radius_max;
                let height = rng.gen::<f32>() * layout.height_span;
                let (sin_a, cos_a) = angle.sin_cos();

                Vec3::new(
                    radius * cos_a * layout.radial_scale,
                    height + layout.base_height,
                    radius * sin_a * layout.radial_scale,
                )
            }
            Distribution::Concat(parts) => match parts.first() {
                Some(first) => first.sample(rng),
                None => Vec3::ZERO,
            },
        }
    }
}

/// Splits `total` into `parts` counts that sum to `total`.
pub(crate) fn split_count(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let rem = total % parts;
    (0..parts).map(|i| base + usize::from(i < rem)).collect()
}

fn finite(name: &'static str, value: f32) -> Result<(), ShapeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ShapeError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ShapeError::OutOfRange { name, value });
    }
    Ok(())
}

fn positive(name: &'static str, value: f32) -> Result<(), ShapeError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(ShapeError::OutOfRange { name, value });
    }
    Ok(())
}
