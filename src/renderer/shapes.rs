//! Mesh generation for ornaments

use glam::Vec3;

use super::vertex::MeshVertex;

/// Flat-shaded octahedron (8 faces, 24 vertices) with the given circumradius
pub fn octahedron(radius: f32) -> Vec<MeshVertex> {
    let px = Vec3::X * radius;
    let nx = -Vec3::X * radius;
    let py = Vec3::Y * radius;
    let ny = -Vec3::Y * radius;
    let pz = Vec3::Z * radius;
    let nz = -Vec3::Z * radius;

    // Counter-clockwise seen from outside
    let faces = [
        [px, py, pz],
        [py, nx, pz],
        [nx, ny, pz],
        [ny, px, pz],
        [py, px, nz],
        [nx, py, nz],
        [ny, nx, nz],
        [px, ny, nz],
    ];

    let mut vertices = Vec::with_capacity(faces.len() * 3);
    for [a, b, c] in faces {
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        for p in [a, b, c] {
            vertices.push(MeshVertex::new(p.to_array(), normal));
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octahedron_faces_point_outward() {
        let mesh = octahedron(0.5);
        assert_eq!(mesh.len(), 24);
        for tri in mesh.chunks(3) {
            let centroid = tri
                .iter()
                .map(|v| Vec3::from_array(v.position))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from_array(tri[0].normal);
            assert!(normal.dot(centroid) > 0.0);
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_octahedron_vertices_on_radius() {
        for v in octahedron(0.5) {
            assert!((Vec3::from_array(v.position).length() - 0.5).abs() < 1e-6);
        }
    }
}
