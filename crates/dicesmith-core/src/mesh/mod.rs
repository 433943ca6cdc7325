//! Triangle meshes and mesh generation from SDFs
//!
//! SDFs are turned into meshes with surface nets; exact boxes can be built
//! directly with [`Mesh::cuboid`]. Grid sampling runs on Rayon.

mod surface_nets;

use crate::Result;
use crate::sdf::{Aabb, Sdf};
use glam::{Vec2, Vec3};

/// A vertex with position, normal, and UV coordinates
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// A triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// Face directions of a cuboid with their (u, v) axes
const CUBOID_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box with flat-shaded faces: 24 vertices, 12 triangles
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let mut mesh = Self::new();

        for (normal, u, v) in CUBOID_FACES {
            let base = mesh.vertices.len() as u32;
            let face_center = center + normal * half_extents;
            let du = u * half_extents;
            let dv = v * half_extents;

            // Counter-clockwise seen from outside: u × v == normal
            let corners = [
                (face_center - du - dv, Vec2::new(0.0, 1.0)),
                (face_center + du - dv, Vec2::new(1.0, 1.0)),
                (face_center + du + dv, Vec2::new(1.0, 0.0)),
                (face_center - du + dv, Vec2::new(0.0, 0.0)),
            ];
            for (position, uv) in corners {
                mesh.vertices.push(Vertex::new(position, normal, uv));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Get number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, keeping both sets of triangles
    pub fn merge(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + base));
    }

    /// Move every vertex by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            v.position = (v.position() + offset).to_array();
        }
    }

    /// Bounding box of all vertex positions
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(Vertex::position))
    }

    /// Move the geometry so its bounding box is centered on the origin.
    ///
    /// Returns the offset that was applied.
    pub fn recenter_bounds(&mut self) -> Vec3 {
        let Some(bounds) = self.bounds() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    /// Generate box projection UVs (6 faces)
    ///
    /// Projects each triangle onto the axis-aligned face most aligned with its
    /// normal. With `scale = 1 / extent` each face of a box centered on
    /// `center` spans the whole 0..1 UV square.
    pub fn generate_uvs_box(&mut self, center: Vec3, scale: f32) {
        for tri in self.indices.chunks(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = self.vertices[i0].position();
            let p1 = self.vertices[i1].position();
            let p2 = self.vertices[i2].position();

            let abs_normal = (p1 - p0).cross(p2 - p0).abs();

            // Determine dominant axis
            let (u_axis, v_axis) = if abs_normal.x >= abs_normal.y && abs_normal.x >= abs_normal.z
            {
                (Vec3::Y, Vec3::Z)
            } else if abs_normal.y >= abs_normal.z {
                (Vec3::X, Vec3::Z)
            } else {
                (Vec3::X, Vec3::Y)
            };

            for idx in [i0, i1, i2] {
                let p = self.vertices[idx].position() - center;
                self.vertices[idx].uv = [
                    p.dot(u_axis) * scale + 0.5,
                    0.5 - p.dot(v_axis) * scale,
                ];
            }
        }
    }
}

/// Configuration for mesh generation
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Grid resolution (number of cells along each axis)
    pub resolution: u32,
    /// Bounding box to sample within
    pub bounds: Aabb,
    /// ISO level (distance value for surface extraction)
    pub iso_level: f32,
    /// Whether to compute normals from the SDF gradient
    pub compute_normals: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            resolution: 64,
            bounds: Aabb::cube(2.0),
            iso_level: 0.0,
            compute_normals: true,
        }
    }
}

impl MeshConfig {
    /// Largest accepted `resolution`
    pub const MAX_RESOLUTION: u32 = 1024;

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }
}

/// Extension trait to generate meshes from SDFs
pub trait SdfToMesh: Sdf + Sync {
    /// Generate a mesh from this SDF
    fn to_mesh(&self, config: MeshConfig) -> Result<Mesh> {
        generate_mesh(self, &config)
    }

    /// Generate a mesh sampling this SDF's own bounds plus a margin
    fn to_mesh_auto(&self, resolution: u32) -> Result<Mesh> {
        let bounds = self.bounds();
        let margin = bounds.size().max_element() * 0.05;
        self.to_mesh(
            MeshConfig::default()
                .with_resolution(resolution)
                .with_bounds(bounds.expand(margin)),
        )
    }
}

impl<T: Sdf + Sync> SdfToMesh for T {}

/// Generate a mesh from an SDF using surface nets
///
/// The result has box-projected UVs spanning 0..1 across the sampled bounds.
pub fn generate_mesh<S: Sdf + ?Sized + Sync>(sdf: &S, config: &MeshConfig) -> Result<Mesh> {
    let mut mesh = surface_nets::extract(sdf, config)?;

    let extent = config.bounds.size().max_element();
    mesh.generate_uvs_box(config.bounds.center(), 1.0 / extent);

    Ok(mesh)
}

/// Compute the gradient (normal) of an SDF at a point
pub(crate) fn compute_gradient<S: Sdf + ?Sized>(sdf: &S, p: Vec3, eps: f32) -> Vec3 {
    let dx = sdf.distance(p + Vec3::X * eps) - sdf.distance(p - Vec3::X * eps);
    let dy = sdf.distance(p + Vec3::Y * eps) - sdf.distance(p - Vec3::Y * eps);
    let dz = sdf.distance(p + Vec3::Z * eps) - sdf.distance(p - Vec3::Z * eps);
    Vec3::new(dx, dy, dz).normalize_or_zero()
}
