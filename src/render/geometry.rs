//! Box geometry for model elements.

use crate::resource_pack::{BoxElement, FaceDescriptor};
use crate::types::Direction;
use glam::{Affine2, Vec2};

/// A vertex of a box face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in unit-cube space (origin at the block centre).
    pub position: [f32; 3],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Face-local texture coordinates, v pointing up (0,0 bottom-left).
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A run of indices drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    pub direction: Direction,
    /// First index into [`Mesh::indices`].
    pub start: usize,
    /// Number of indices.
    pub count: usize,
}

/// A triangle mesh split into per-face material groups.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// One group per face, in [`Direction::BOX_ORDER`].
    pub groups: Vec<FaceGroup>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a quad (two triangles) by vertex indices, given in order around the quad.
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.add_triangle(i0, i2, i1);
        self.add_triangle(i0, i3, i2);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Build the six-face box for a model element.
    ///
    /// Elements are scaled from block space (0..16) into a unit cube centred
    /// at the origin. Every face is emitted, textured or not, so each box
    /// always has six groups.
    pub fn from_element(element: &BoxElement) -> Self {
        let center = element.normalized_center();
        let size = element.normalized_size();
        let from = [
            center[0] - size[0] / 2.0,
            center[1] - size[1] / 2.0,
            center[2] - size[2] / 2.0,
        ];
        let to = [
            center[0] + size[0] / 2.0,
            center[1] + size[1] / 2.0,
            center[2] + size[2] / 2.0,
        ];

        let mut mesh = Mesh::new();
        for direction in Direction::BOX_ORDER {
            let start = mesh.indices.len();
            let positions = face_positions(direction, from, to);
            let normal = direction.normal();

            // TL, TR, BR, BL
            let corner_uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
            let base = mesh.vertices.len() as u32;
            for (position, uv) in positions.into_iter().zip(corner_uvs) {
                mesh.add_vertex(Vertex::new(position, normal, uv));
            }
            mesh.add_quad(base, base + 1, base + 2, base + 3);

            mesh.groups.push(FaceGroup {
                direction,
                start,
                count: mesh.indices.len() - start,
            });
        }
        mesh
    }
}

/// The four corners of a face as seen from outside: TL, TR, BR, BL.
fn face_positions(direction: Direction, from: [f32; 3], to: [f32; 3]) -> [[f32; 3]; 4] {
    match direction {
        Direction::Down => [
            [from[0], from[1], to[2]],
            [to[0], from[1], to[2]],
            [to[0], from[1], from[2]],
            [from[0], from[1], from[2]],
        ],
        Direction::Up => [
            [from[0], to[1], from[2]],
            [to[0], to[1], from[2]],
            [to[0], to[1], to[2]],
            [from[0], to[1], to[2]],
        ],
        Direction::North => [
            [to[0], to[1], from[2]],
            [from[0], to[1], from[2]],
            [from[0], from[1], from[2]],
            [to[0], from[1], from[2]],
        ],
        Direction::South => [
            [from[0], to[1], to[2]],
            [to[0], to[1], to[2]],
            [to[0], from[1], to[2]],
            [from[0], from[1], to[2]],
        ],
        Direction::West => [
            [from[0], to[1], from[2]],
            [from[0], to[1], to[2]],
            [from[0], from[1], to[2]],
            [from[0], from[1], from[2]],
        ],
        Direction::East => [
            [to[0], to[1], to[2]],
            [to[0], to[1], from[2]],
            [to[0], from[1], from[2]],
            [to[0], from[1], to[2]],
        ],
    }
}

/// Maps face-local UVs into texture space (v up, 0..1).
///
/// With a UV region the window is offset to `(u_min, 1 - v_max)` and scaled
/// to the region size, then rotated by the negated face rotation about the
/// texture centre. Without one the whole texture is used unrotated.
pub fn face_uv_transform(face: &FaceDescriptor) -> Affine2 {
    let Some([u1, v1, u2, v2]) = face.uv else {
        return Affine2::IDENTITY;
    };

    let u_min = u1.min(u2) / 16.0;
    let u_max = u1.max(u2) / 16.0;
    let v_min = v1.min(v2) / 16.0;
    let v_max = v1.max(v2) / 16.0;

    let offset = Vec2::new(u_min, 1.0 - v_max);
    let repeat = Vec2::new(u_max - u_min, v_max - v_min);
    let center = Vec2::splat(0.5);
    let angle = -(face.rotation as f32).to_radians();

    if face.rotation == 0 {
        return Affine2::from_translation(offset) * Affine2::from_scale(repeat);
    }

    // Scale, rotate about the centre, then offset
    let (sin, cos) = angle.sin_cos();
    let x_axis = Vec2::new(repeat.x * cos, -repeat.y * sin);
    let y_axis = Vec2::new(repeat.x * sin, repeat.y * cos);
    let translation = Vec2::new(
        -repeat.x * (cos * center.x + sin * center.y) + center.x + offset.x,
        -repeat.y * (-sin * center.x + cos * center.y) + center.y + offset.y,
    );
    Affine2::from_cols(x_axis, y_axis, translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn full_cube() -> BoxElement {
        BoxElement {
            from: [0.0, 0.0, 0.0],
            to: [16.0, 16.0, 16.0],
            faces: IndexMap::new(),
        }
    }

    #[test]
    fn test_mesh_quad() {
        let mut mesh = Mesh::new();

        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([1.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]));
        let v3 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));

        mesh.add_quad(v0, v1, v2, v3);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn test_box_has_six_groups_even_without_faces() {
        let mesh = Mesh::from_element(&full_cube());
        assert_eq!(mesh.groups.len(), 6);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        let order: Vec<_> = mesh.groups.iter().map(|g| g.direction).collect();
        assert_eq!(order, Direction::BOX_ORDER.to_vec());
    }

    #[test]
    fn test_box_is_centred_unit_cube() {
        let mesh = Mesh::from_element(&full_cube());
        for vertex in &mesh.vertices {
            for axis in vertex.position {
                assert!((axis.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_partial_element_position() {
        let element = BoxElement {
            from: [6.0, 0.0, 6.0],
            to: [10.0, 8.0, 10.0],
            faces: IndexMap::new(),
        };
        let mesh = Mesh::from_element(&element);
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        let min_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MAX, f32::min);
        assert!((max_y - 0.0).abs() < 1e-6);
        assert!((min_x + 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_uv_window_flips_v() {
        let face = FaceDescriptor {
            uv: Some([0.0, 0.0, 8.0, 4.0]),
            texture: None,
            rotation: 0,
        };
        let transform = face_uv_transform(&face);

        // Local top-left maps to the top of the window (v up)
        let top_left = transform.transform_point2(Vec2::new(0.0, 1.0));
        assert!((top_left - Vec2::new(0.0, 1.0)).length() < 1e-6);
        let bottom_right = transform.transform_point2(Vec2::new(1.0, 0.0));
        assert!((bottom_right - Vec2::new(0.5, 0.75)).length() < 1e-6);
    }

    #[test]
    fn test_uv_rotation_about_centre() {
        let face = FaceDescriptor {
            uv: Some([0.0, 0.0, 16.0, 16.0]),
            texture: None,
            rotation: 90,
        };
        let transform = face_uv_transform(&face);

        // Centre is fixed, corners move
        let centre = transform.transform_point2(Vec2::splat(0.5));
        assert!((centre - Vec2::splat(0.5)).length() < 1e-5);
        let corner = transform.transform_point2(Vec2::new(0.0, 0.0));
        assert!((corner - Vec2::new(0.0, 0.0)).length() > 0.5);
    }

    #[test]
    fn test_no_uv_is_identity() {
        let face = FaceDescriptor::textured("#0");
        assert_eq!(face_uv_transform(&face), Affine2::IDENTITY);
    }
}
