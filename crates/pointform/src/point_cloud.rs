//! Drawable point clouds.

use crate::error::ShapeError;
use crate::geometry::GeometryBuffer;
use crate::transform::Transform;

/// Where point colours come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMode {
    /// Use the colour stored with each vertex.
    PerVertex,
    /// Ignore vertex colours and draw everything in one colour.
    Uniform([f32; 3]),
}

/// Point-rendering attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Smallest on-screen sprite size in pixels.
    pub point_size: f32,
    pub color_mode: ColorMode,
    pub opacity: f32,
    /// Sprite size in world units; shrinks with distance.
    pub size: f32,
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self {
            point_size: 1.0,
            color_mode: ColorMode::PerVertex,
            opacity: 1.0,
            size: 0.01,
        }
    }
}

impl PointMaterial {
    pub fn per_vertex(size: f32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn uniform(rgb: [f32; 3], size: f32, opacity: f32) -> Self {
        Self {
            point_size: 1.0,
            color_mode: ColorMode::Uniform(rgb),
            opacity,
            size,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        if !(self.point_size.is_finite() && self.point_size >= 0.0) {
            return Err(ShapeError::InvalidMaterial(format!(
                "point size {} must be a non-negative number",
                self.point_size
            )));
        }
        if !(self.size.is_finite() && self.size >= 0.0) {
            return Err(ShapeError::InvalidMaterial(format!(
                "size {} must be a non-negative number",
                self.size
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ShapeError::InvalidMaterial(format!(
                "opacity {} must be within [0, 1]",
                self.opacity
            )));
        }
        if let ColorMode::Uniform(rgb) = self.color_mode {
            if rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(ShapeError::InvalidMaterial(format!(
                    "uniform colour {rgb:?} must be within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Geometry + material + the frame the render loop moves every tick.
#[derive(Debug)]
pub struct PointCloud {
    geometry: GeometryBuffer,
    material: PointMaterial,
    pub transform: Transform,
}

impl PointCloud {
    pub fn attach(geometry: GeometryBuffer, material: PointMaterial) -> Result<Self, ShapeError> {
        material.validate()?;
        Ok(Self {
            geometry,
            material,
            transform: Transform::IDENTITY,
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    pub fn material(&self) -> &PointMaterial {
        &self.material
    }

    /// Swaps in new geometry wholesale and returns the old buffer.
    pub fn rebuild(&mut self, geometry: GeometryBuffer) -> GeometryBuffer {
        log::debug!(
            "rebuilding point cloud geometry {} -> {} ({} points)",
            self.geometry.id().get(),
            geometry.id().get(),
            geometry.len()
        );
        std::mem::replace(&mut self.geometry, geometry)
    }
}
