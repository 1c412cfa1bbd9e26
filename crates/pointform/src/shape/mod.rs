//! Procedural point-set synthesis.
//!
//! A [`ShapeSpec`] describes how to draw a [`PointSet`]: how many points, the
//! base distribution they come from, the warp that deforms them and the rule
//! that colours them. [`generate`] is pure given a seeded RNG.

pub mod color;
pub mod distribution;
pub mod warp;

pub use self::color::{hsl_to_rgb, ColorRule};
pub use self::distribution::{sample_unit_sphere, Distribution, ScatterLayout, SpokeLayout};
pub use self::warp::{BerryWarp, Warp};

use crate::error::ShapeError;
use rand::Rng;

/// A coloured point in local shape space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: [f32; 3],
    /// Linear RGB, each channel in [0,1].
    pub color: [f32; 3],
}

/// Ordered, fixed-length set of generated points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

/// Everything the sampler needs to produce one shape.
#[derive(Debug, Clone)]
pub struct ShapeSpec {
    pub count: usize,
    pub distribution: Distribution,
    pub warp: Warp,
    pub color: ColorRule,
}

impl ShapeSpec {
    /// Points in the berry body and in the leaf cluster.
    pub const DEFAULT_COUNT: usize = 2000;

    pub fn new(count: usize, distribution: Distribution, warp: Warp, color: ColorRule) -> Self {
        Self {
            count,
            distribution,
            warp,
            color,
        }
    }

    /// Red, tapered sphere.
    pub fn berry(count: usize) -> Self {
        Self::new(
            count,
            Distribution::UnitSphere,
            Warp::Berry(BerryWarp::default()),
            ColorRule::BERRY,
        )
    }

    /// Green spokes plus scatter sitting on top of the berry.
    pub fn leaves(count: usize) -> Self {
        Self::new(
            count,
            Distribution::leaf_cluster(),
            Warp::Identity,
            ColorRule::LEAF,
        )
    }

    /// Ball of uniformly distributed points in a single colour.
    pub fn ball(count: usize, radius: f32, rgb: [f32; 3]) -> Self {
        Self::new(
            count,
            Distribution::Ball { radius },
            Warp::Identity,
            ColorRule::Solid(rgb),
        )
    }

    /// Replaces the count with a signed value, as read from user input.
    pub fn with_count(mut self, count: i64) -> Result<Self, ShapeError> {
        self.count = usize::try_from(count).map_err(|_| ShapeError::NegativeCount(count))?;
        Ok(self)
    }

    pub fn with_warp(mut self, warp: Warp) -> Self {
        self.warp = warp;
        self
    }

    pub fn with_color(mut self, color: ColorRule) -> Self {
        self.color = color;
        self
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        self.distribution.validate()?;
        self.warp.validate()?;
        self.color.validate()
    }
}

/// Draws `spec.count` points from `spec`.
///
/// The spec is validated first; a malformed spec never produces geometry.
/// For each point the RNG is consumed in a fixed order (position, then
/// colour), so a seeded RNG gives identical output on every call.
pub fn generate<R: Rng + ?Sized>(spec: &ShapeSpec, rng: &mut R) -> Result<PointSet, ShapeError> {
    spec.validate()?;

    let mut points = Vec::with_capacity(spec.count);
    sample_pass(&spec.distribution, spec.count, spec, rng, &mut points);

    log::debug!(
        "generated {} points ({:?}, {:?})",
        points.len(),
        spec.distribution,
        spec.warp
    );

    Ok(PointSet { points })
}

fn sample_pass<R: Rng + ?Sized>(
    distribution: &Distribution,
    count: usize,
    spec: &ShapeSpec,
    rng: &mut R,
    out: &mut Vec<Point>,
) {
    if let Distribution::Concat(parts) = distribution {
        let counts = distribution::split_count(count, parts.len());
        for (part, n) in parts.iter().zip(counts) {
            sample_pass(part, n, spec, rng, out);
        }
        return;
    }

    for _ in 0..count {
        let position = spec.warp.apply(distribution.sample(rng));
        let color = spec.color.color(position, rng);
        out.push(Point {
            position: position.to_array(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f32::consts::PI;

    /// Kolmogorov-Smirnov distance between `samples` and a uniform CDF on [lo, hi].
    fn ks_uniform(mut samples: Vec<f32>, lo: f32, hi: f32) -> f32 {
        samples.sort_by(f32::total_cmp);
        let n = samples.len() as f32;
        samples
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let cdf = ((s - lo) / (hi - lo)).clamp(0.0, 1.0);
                let above = (i as f32 + 1.0) / n - cdf;
                let below = cdf - i as f32 / n;
                above.max(below)
            })
            .fold(0.0, f32::max)
    }

    #[test]
    fn count_is_exact() {
        let mut rng = StdRng::seed_from_u64(0);
        for n in [0, 1, 2, 3, 17, 1000, 2001] {
            assert_eq!(generate(&ShapeSpec::berry(n), &mut rng).unwrap().len(), n);
            assert_eq!(generate(&ShapeSpec::leaves(n), &mut rng).unwrap().len(), n);
        }
    }

    #[test]
    fn zero_count_is_empty_not_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let set = generate(&ShapeSpec::berry(0), &mut rng).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn negative_count_fails_fast() {
        let err = ShapeSpec::berry(10).with_count(-5).unwrap_err();
        assert_eq!(err, ShapeError::NegativeCount(-5));
    }

    #[test]
    fn malformed_spec_produces_no_geometry() {
        let spec = ShapeSpec::berry(10).with_color(ColorRule::HueBand {
            hue: 0.0,
            saturation: 1.0,
            lightness_min: 0.2,
            lightness_max: 1.5,
        });
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate(&spec, &mut rng).is_err());
    }

    #[test]
    fn same_seed_same_points() {
        let spec = ShapeSpec::leaves(500);
        let a = generate(&spec, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate(&spec, &mut StdRng::seed_from_u64(42)).unwrap();
        let bits = |set: &PointSet| -> Vec<u32> {
            set.iter()
                .flat_map(|p| p.position.into_iter().chain(p.color))
                .map(f32::to_bits)
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));

        let c = generate(&spec, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn sphere_is_uniform_in_cos_phi_not_phi() {
        const N: usize = 20_000;
        let spec = ShapeSpec::new(
            N,
            Distribution::UnitSphere,
            Warp::Identity,
            ColorRule::Solid([1.0, 1.0, 1.0]),
        );
        let set = generate(&spec, &mut StdRng::seed_from_u64(9)).unwrap();

        // With the pole on +Y, y is cos(phi).
        let cos_phi: Vec<f32> = set.iter().map(|p| p.position[1]).collect();
        let phi: Vec<f32> = cos_phi.iter().map(|c| c.clamp(-1.0, 1.0).acos()).collect();

        // 0.1% critical value is about 1.95 / sqrt(N).
        let critical = 1.95 / (N as f32).sqrt();
        let d_cos = ks_uniform(cos_phi, -1.0, 1.0);
        assert!(d_cos < critical, "cos(phi) KS distance {d_cos} >= {critical}");

        // phi itself follows sin(phi)/2; its distance from uniform is about 0.105.
        let d_phi = ks_uniform(phi, 0.0, PI);
        assert!(d_phi > 5.0 * critical, "phi looks uniform: {d_phi}");
    }

    #[test]
    fn leaf_cluster_concatenates_spokes_then_scatter() {
        let set = generate(&ShapeSpec::leaves(2000), &mut StdRng::seed_from_u64(5)).unwrap();
        let (spokes, scatter) = set.points().split_at(1000);

        // Spoke pass: height in [0.8, 1.0], radius at most 0.6 * 1.5.
        for p in spokes {
            let [x, y, z] = p.position;
            assert!((0.8..=1.0).contains(&y));
            assert!(x.hypot(z) <= 0.9 + 1e-5);
        }
        // Scatter pass: height in [0.8, 1.3], radius at most 0.5 * 1.2.
        for p in scatter {
            let [x, y, z] = p.position;
            assert!((0.8..=1.3).contains(&y));
            assert!(x.hypot(z) <= 0.6 + 1e-5);
        }
    }

    #[test]
    fn berry_stays_within_expected_bounds() {
        let set = generate(&ShapeSpec::berry(2000), &mut StdRng::seed_from_u64(11)).unwrap();
        for p in set.iter() {
            let [x, y, z] = p.position;
            // Horizontal radius never exceeds 1.2 * 0.8; height is within the stretched range.
            assert!(x.hypot(z) <= 0.96 + 1e-5);
            assert!((-1.3..=1.1 + 1e-5).contains(&y));
        }
    }
}
