//! Primitive meshes the figure is drawn with.
//!
//! All meshes are non-indexed triangle lists with one normal per vertex, triangles wound
//! counter clockwise when seen from outside.

use std::collections::HashMap;
use std::f32::consts::PI;
use crate::render_traits::Shape;

/// Segments used to approximate round shapes.
pub const ROUND_SEGMENTS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

impl MeshData {
    fn triangle(&mut self, vertices: [[f32; 3]; 3], normals: [[f32; 3]; 3]) {
        self.positions.extend_from_slice(&vertices);
        self.normals.extend_from_slice(&normals);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Unit cube centered at the origin, 36 vertices.
pub fn cube() -> MeshData {
    let corners: [[f32; 3]; 8] = [
        [-0.5, -0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [0.5, -0.5, 0.5],
        [-0.5, -0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, -0.5, -0.5],
    ];
    // Each face as a quad, counter clockwise from outside, with its normal
    let faces: [([usize; 4], [f32; 3]); 6] = [
        ([0, 3, 2, 1], [0.0, 0.0, 1.0]),
        ([3, 7, 6, 2], [1.0, 0.0, 0.0]),
        ([4, 7, 3, 0], [0.0, -1.0, 0.0]),
        ([1, 2, 6, 5], [0.0, 1.0, 0.0]),
        ([7, 4, 5, 6], [0.0, 0.0, -1.0]),
        ([4, 0, 1, 5], [-1.0, 0.0, 0.0]),
    ];

    let mut mesh = MeshData::default();
    for ([a, b, c, d], normal) in faces {
        mesh.triangle([corners[a], corners[b], corners[c]], [normal; 3]);
        mesh.triangle([corners[a], corners[c], corners[d]], [normal; 3]);
    }
    mesh
}

/// Closed cylinder along the Y axis, centered at the origin.
pub fn cylinder(radius: f32, height: f32, segments: usize) -> MeshData {
    let h2 = height / 2.0;
    let mut mesh = MeshData::default();
    for i in 0..segments {
        let (x1, z1) = rim(radius, i, segments, 2.0 * PI);
        let (x2, z2) = rim(radius, i + 1, segments, 2.0 * PI);
        let n1 = unit([x1, 0.0, z1]);
        let n2 = unit([x2, 0.0, z2]);
        let up = [0.0, 1.0, 0.0];
        let down = [0.0, -1.0, 0.0];

        mesh.triangle([[0.0, h2, 0.0], [x2, h2, z2], [x1, h2, z1]], [up; 3]);
        mesh.triangle([[0.0, -h2, 0.0], [x1, -h2, z1], [x2, -h2, z2]], [down; 3]);
        mesh.triangle([[x1, h2, z1], [x2, -h2, z2], [x1, -h2, z1]], [n1, n2, n1]);
        mesh.triangle([[x1, h2, z1], [x2, h2, z2], [x2, -h2, z2]], [n1, n2, n2]);
    }
    mesh
}

/// Half cylinder (crescent) along the Z axis, the arc spanning +Y.
pub fn claw(radius: f32, segments: usize, height: f32) -> MeshData {
    let h2 = height / 2.0;
    let mut mesh = MeshData::default();
    for i in 0..segments {
        let (x1, y1) = rim(radius, i, segments, PI);
        let (x2, y2) = rim(radius, i + 1, segments, PI);
        let n1 = unit([x1, y1, 0.0]);
        let n2 = unit([x2, y2, 0.0]);
        let front = [0.0, 0.0, 1.0];
        let back = [0.0, 0.0, -1.0];

        mesh.triangle([[0.0, 0.0, h2], [x1, y1, h2], [x2, y2, h2]], [front; 3]);
        mesh.triangle([[0.0, 0.0, -h2], [x2, y2, -h2], [x1, y1, -h2]], [back; 3]);
        mesh.triangle([[x1, y1, h2], [x1, y1, -h2], [x2, y2, -h2]], [n1, n1, n2]);
        mesh.triangle([[x1, y1, h2], [x2, y2, -h2], [x2, y2, h2]], [n1, n2, n2]);
    }
    mesh
}

/// Flat disc in the XY plane facing +Z.
pub fn disc(radius: f32, segments: usize) -> MeshData {
    let mut mesh = MeshData::default();
    let front = [0.0, 0.0, 1.0];
    for i in 0..segments {
        let (x1, y1) = rim(radius, i, segments, 2.0 * PI);
        let (x2, y2) = rim(radius, i + 1, segments, 2.0 * PI);
        mesh.triangle([[0.0, 0.0, 0.0], [x1, y1, 0.0], [x2, y2, 0.0]], [front; 3]);
    }
    mesh
}

/// Point `i` of `segments` on an arc of `sweep` radians.
fn rim(radius: f32, i: usize, segments: usize, sweep: f32) -> (f32, f32) {
    let theta = i as f32 / segments as f32 * sweep;
    (radius * theta.cos(), radius * theta.sin())
}

fn unit(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        v
    }
}

/// Meshes for every [`Shape`], built once.
#[derive(Debug, Clone)]
pub struct MeshLibrary {
    meshes: HashMap<Shape, MeshData>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        let mut meshes = HashMap::new();
        meshes.insert(Shape::Cube, cube());
        meshes.insert(Shape::Cylinder, cylinder(0.6, 0.5, ROUND_SEGMENTS));
        meshes.insert(Shape::EyeInner, cylinder(0.6, 0.5, ROUND_SEGMENTS));
        meshes.insert(Shape::Tread, cylinder(0.6, 0.5, ROUND_SEGMENTS));
        meshes.insert(Shape::Claw, claw(0.3, ROUND_SEGMENTS, 0.1));
        meshes.insert(Shape::Disc, disc(1.0, ROUND_SEGMENTS));
        MeshLibrary { meshes }
    }

    pub fn get(&self, shape: Shape) -> Option<&MeshData> {
        self.meshes.get(&shape)
    }
}

impl Default for MeshLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every triangle's geometric normal agrees with its vertex normals.
    fn assert_outward(mesh: &MeshData) {
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = [mesh.positions[3 * t], mesh.positions[3 * t + 1], mesh.positions[3 * t + 2]];
            let face = cross(sub(b, a), sub(c, a));
            let normal = mesh.normals[3 * t];
            assert!(dot(face, normal) > 0.0, "Triangle {} is wound inwards", t);
        }
    }

    #[test]
    fn test_cube() {
        let mesh = cube();
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.normals.len(), 36);
        assert!(mesh.positions.iter().flatten().all(|c| c.abs() == 0.5));
        assert_outward(&mesh);
    }

    #[test]
    fn test_cylinder() {
        let mesh = cylinder(0.6, 0.5, 20);
        assert_eq!(mesh.triangle_count(), 80);
        for p in &mesh.positions {
            assert!(p[1].abs() <= 0.25 + 1e-6);
            assert!((p[0] * p[0] + p[2] * p[2]).sqrt() <= 0.6 + 1e-6);
        }
        assert_outward(&mesh);
    }

    #[test]
    fn test_claw_spans_upper_half() {
        let mesh = claw(0.3, 20, 0.1);
        assert_eq!(mesh.triangle_count(), 80);
        assert!(mesh.positions.iter().all(|p| p[1] >= -1e-6));
        assert_outward(&mesh);
    }

    #[test]
    fn test_disc_is_flat() {
        let mesh = disc(1.0, 20);
        assert_eq!(mesh.triangle_count(), 20);
        assert!(mesh.positions.iter().all(|p| p[2] == 0.0));
        assert_outward(&mesh);
    }

    #[test]
    fn test_library_has_every_shape() {
        let library = MeshLibrary::new();
        for shape in Shape::ALL {
            assert!(library.get(shape).is_some(), "{:?} missing", shape);
        }
    }
}
