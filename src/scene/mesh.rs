use glam::Vec3;
use std::sync::Arc;

use crate::math::AABB;

/// Vertex layout shared by every mesh and by the GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

/// RGBA8 texture pixels
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Material {
    /// Linear RGBA
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub texture: Option<Arc<TextureData>>,
}

impl Material {
    pub fn new(base_color: [f32; 3], roughness: f32, metalness: f32) -> Self {
        Self {
            base_color: [base_color[0], base_color[1], base_color[2], 1.0],
            roughness,
            metalness,
            texture: None,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0], 1.0, 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl Mesh {
    pub fn bounds(&self) -> AABB {
        AABB::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned box centred on the origin, one quad per face.
    pub fn cuboid(width: f32, height: f32, depth: f32, material: Material) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;
        // (normal, u, v) with u x v == normal so every face winds counter-clockwise
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            let n = normal * (normal.abs() * half).element_sum();
            let hu = u * (u.abs() * half).element_sum();
            let hv = v * (v.abs() * half).element_sum();

            let corners = [
                (n - hu - hv, [0.0, 1.0]),
                (n + hu - hv, [1.0, 1.0]),
                (n + hu + hv, [1.0, 0.0]),
                (n - hu + hv, [0.0, 0.0]),
            ];
            for (position, uv) in corners {
                vertices.push(Vertex::new(position.to_array(), normal.to_array(), uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: Some("box".to_string()),
            vertices,
            indices,
            material,
        }
    }

    /// Quad in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32, material: Material) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-hw, -hh, 0.0], normal, [0.0, 1.0]),
            Vertex::new([hw, -hh, 0.0], normal, [1.0, 1.0]),
            Vertex::new([hw, hh, 0.0], normal, [1.0, 0.0]),
            Vertex::new([-hw, hh, 0.0], normal, [0.0, 0.0]),
        ];

        Self {
            name: Some("plane".to_string()),
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            material,
        }
    }
}

/// Area-weighted vertex normals for an indexed triangle list
pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_counts() {
        let mesh = Mesh::cuboid(1.0, 1.0, 1.0, Material::default());
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_cuboid_bounds() {
        let mesh = Mesh::cuboid(2.0, 4.0, 6.0, Material::default());
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_cuboid_faces_wind_outward() {
        let mesh = Mesh::cuboid(1.0, 1.0, 1.0, Material::default());
        for tri in mesh.indices.chunks_exact(3) {
            let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            let normal = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!(face.dot(normal) > 0.0);
        }
    }

    #[test]
    fn test_plane_is_flat() {
        let mesh = Mesh::plane(50.0, 50.0, Material::default());
        let bounds = mesh.bounds();
        assert_eq!(bounds.size(), Vec3::new(50.0, 50.0, 0.0));
    }

    #[test]
    fn test_compute_normals_single_triangle() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_compute_normals_unreferenced_vertex() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::splat(5.0)];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], Vec3::Y);
    }
}
