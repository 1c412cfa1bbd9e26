//! Device-ready flattened geometry.

use crate::shape::PointSet;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one built buffer. Changes only when geometry is rebuilt, so
/// renderers can key GPU uploads on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        Self(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Interleaved per-vertex data. Must match the vertex layout of the point shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Flattened positions (`xyz xyz ...`) and colours (`rgb rgb ...`).
///
/// Immutable: there is no way to edit a built buffer, only to build a new one.
#[derive(Debug)]
pub struct GeometryBuffer {
    id: GeometryId,
    positions: Box<[f32]>,
    colors: Box<[f32]>,
}

impl GeometryBuffer {
    pub fn build(points: &PointSet) -> Self {
        let src = points.points();
        let mut positions = vec![0.0f32; src.len() * 3];
        let mut colors = vec![0.0f32; src.len() * 3];

        positions
            .par_chunks_mut(3)
            .zip(colors.par_chunks_mut(3))
            .zip(src.par_iter())
            .for_each(|((pos, col), point)| {
                pos.copy_from_slice(&point.position);
                col.copy_from_slice(&point.color);
            });

        Self {
            id: GeometryId::next(),
            positions: positions.into_boxed_slice(),
            colors: colors.into_boxed_slice(),
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Positions and colours woven into one vertex stream.
    pub fn interleaved(&self) -> Vec<PointVertex> {
        self.positions
            .chunks_exact(3)
            .zip(self.colors.chunks_exact(3))
            .map(|(p, c)| PointVertex {
                position: [p[0], p[1], p[2]],
                color: [c[0], c[1], c[2]],
            })
            .collect()
    }

    /// Axis-aligned bounds of the positions, or `None` when empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.is_empty() {
            return None;
        }
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in self.positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }
}
