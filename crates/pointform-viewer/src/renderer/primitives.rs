//! Unit primitives for the mesh pipeline. Shapes are scaled per draw.

/// Must match the vertex inputs of `shaders/mesh.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<u16>,
    /// Triangle edges as a line list, for wireframe drawing.
    pub lines: Vec<u16>,
}

impl Primitive {
    fn from_quads(quads: &[[MeshVertex; 4]]) -> Self {
        let mut vertices = Vec::with_capacity(quads.len() * 4);
        let mut triangles = Vec::with_capacity(quads.len() * 6);
        for quad in quads {
            let base = vertices.len() as u16;
            vertices.extend_from_slice(quad);
            triangles.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        let lines = triangles
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[1], t[1], t[2], t[2], t[0]])
            .collect();
        Self {
            vertices,
            triangles,
            lines,
        }
    }
}

/// Counter-clockwise quad around `normal` with edges `u` and `v`, centred on
/// `normal * 0.5`.
fn face(normal: [f32; 3], u: [f32; 3], v: [f32; 3]) -> [MeshVertex; 4] {
    let corner = |su: f32, sv: f32, uv: [f32; 2]| {
        let mut p = [0.0; 3];
        for i in 0..3 {
            p[i] = normal[i] * 0.5 + u[i] * su * 0.5 + v[i] * sv * 0.5;
        }
        MeshVertex {
            position: p,
            normal,
            uv,
        }
    };
    [
        corner(-1.0, -1.0, [0.0, 1.0]),
        corner(1.0, -1.0, [1.0, 1.0]),
        corner(1.0, 1.0, [1.0, 0.0]),
        corner(-1.0, 1.0, [0.0, 0.0]),
    ]
}

/// 1x1x1 cube centred on the origin.
pub fn unit_cube() -> Primitive {
    Primitive::from_quads(&[
        face([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        face([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        face([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        face([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        face([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        face([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ])
}

/// 1x1 quad in the XY plane facing +Z.
pub fn unit_plane() -> Primitive {
    let mut quad = face([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    for v in &mut quad {
        v.position[2] = 0.0;
    }
    Primitive::from_quads(&[quad])
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_is_closed_and_centred() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangles.len(), 36);
        assert_eq!(cube.lines.len(), 72);
        let sum: Vec3 = cube.vertices.iter().map(|v| Vec3::from(v.position)).sum();
        assert!(sum.length() < 1e-6);
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
    }

    #[test]
    fn faces_wind_counter_clockwise_outwards() {
        for prim in [unit_cube(), unit_plane()] {
            for t in prim.triangles.chunks_exact(3) {
                let [a, b, c] = [t[0], t[1], t[2]].map(|i| Vec3::from(prim.vertices[i as usize].position));
                let n = Vec3::from(prim.vertices[t[0] as usize].normal);
                assert!((b - a).cross(c - a).dot(n) > 0.0);
            }
        }
    }

    #[test]
    fn plane_is_flat() {
        let plane = unit_plane();
        assert_eq!(plane.vertices.len(), 4);
        assert!(plane.vertices.iter().all(|v| v.position[2] == 0.0));
    }
}
