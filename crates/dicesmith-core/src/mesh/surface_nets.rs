//! Naive surface nets
//!
//! One vertex per grid cell that straddles the surface, placed at the mean of
//! the cell's edge crossings; one quad per grid edge with a sign change,
//! joining the four cells around it. Needs no case tables and keeps flat
//! faces flat, which suits hard-surface shapes like dice.

use super::{Mesh, MeshConfig, Vertex, compute_gradient};
use crate::sdf::Sdf;
use crate::{Error, Result};
use glam::{UVec3, Vec2, Vec3};
use rayon::prelude::*;

const NO_VERTEX: u32 = u32::MAX;

/// Cell corner offsets; bit 0 = x, bit 1 = y, bit 2 = z
const CORNERS: [UVec3; 8] = [
    UVec3::new(0, 0, 0),
    UVec3::new(1, 0, 0),
    UVec3::new(0, 1, 0),
    UVec3::new(1, 1, 0),
    UVec3::new(0, 0, 1),
    UVec3::new(1, 0, 1),
    UVec3::new(0, 1, 1),
    UVec3::new(1, 1, 1),
];

struct Grid {
    res: u32,
    points: usize,
    origin: Vec3,
    step: Vec3,
}

impl Grid {
    fn point_index(&self, p: UVec3) -> usize {
        (p.z as usize * self.points + p.y as usize) * self.points + p.x as usize
    }

    fn cell_index(&self, c: UVec3) -> usize {
        let res = self.res as usize;
        (c.z as usize * res + c.y as usize) * res + c.x as usize
    }

    fn cell_coords(&self, idx: usize) -> UVec3 {
        let res = self.res as usize;
        UVec3::new(
            (idx % res) as u32,
            ((idx / res) % res) as u32,
            (idx / (res * res)) as u32,
        )
    }

    fn position(&self, p: UVec3) -> Vec3 {
        self.origin + p.as_vec3() * self.step
    }
}

/// Extract a triangle mesh for the `config.iso_level` surface of `sdf`
pub(super) fn extract<S: Sdf + ?Sized + Sync>(sdf: &S, config: &MeshConfig) -> Result<Mesh> {
    if config.resolution == 0 || config.resolution > MeshConfig::MAX_RESOLUTION {
        return Err(Error::InvalidParameter(format!(
            "mesh resolution must be between 1 and {}, got {}",
            MeshConfig::MAX_RESOLUTION,
            config.resolution
        )));
    }
    if !config.bounds.is_valid() {
        return Err(Error::InvalidParameter(format!(
            "mesh bounds are empty: {:?}",
            config.bounds
        )));
    }

    let res = config.resolution;
    let points = (res + 1) as usize;
    let grid = Grid {
        res,
        points,
        origin: config.bounds.min,
        step: config.bounds.size() / res as f32,
    };
    let iso = config.iso_level;

    // === Phase 1: Parallel SDF sampling ===
    let values: Vec<f32> = (0..points * points * points)
        .into_par_iter()
        .map(|idx| {
            let p = UVec3::new(
                (idx % points) as u32,
                ((idx / points) % points) as u32,
                (idx / (points * points)) as u32,
            );
            sdf.distance(grid.position(p))
        })
        .collect();

    // === Phase 2: Parallel cell vertex placement ===
    let cells = res as usize;
    let total_cells = cells * cells * cells;
    let cell_points: Vec<Option<Vec3>> = (0..total_cells)
        .into_par_iter()
        .map(|cell_idx| cell_vertex(&grid, &values, grid.cell_coords(cell_idx), iso))
        .collect();

    let mut cell_vertex_index = vec![NO_VERTEX; total_cells];
    let mut positions = Vec::new();
    for (idx, point) in cell_points.iter().enumerate() {
        if let Some(p) = point {
            cell_vertex_index[idx] = positions.len() as u32;
            positions.push(*p);
        }
    }

    let vertices: Vec<Vertex> = positions
        .par_iter()
        .map(|&pos| {
            let normal = if config.compute_normals {
                compute_gradient(sdf, pos, grid.step.min_element() * 0.25)
            } else {
                Vec3::Z
            };
            Vertex::new(pos, normal, Vec2::ZERO)
        })
        .collect();

    // === Phase 3: Quads across sign-changing grid edges ===
    let mut indices = Vec::new();
    for axis in 0..3 {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        let e_axis = unit(axis);
        let e_u = unit(u);
        let e_v = unit(v);

        for z in 0..=res {
            for y in 0..=res {
                for x in 0..=res {
                    let p = UVec3::new(x, y, z);
                    // Edge must run inside the grid and have four cells around it
                    if p[axis] >= res || p[u] == 0 || p[v] == 0 || p[u] >= res || p[v] >= res {
                        continue;
                    }

                    let inside_start = values[grid.point_index(p)] < iso;
                    let inside_end = values[grid.point_index(p + e_axis)] < iso;
                    if inside_start == inside_end {
                        continue;
                    }

                    let quad = [p - e_u - e_v, p - e_v, p, p - e_u]
                        .map(|c| cell_vertex_index[grid.cell_index(c)]);
                    if quad.contains(&NO_VERTEX) {
                        continue;
                    }

                    // Quad order faces +axis; flip when the surface faces -axis
                    if inside_start {
                        indices.extend_from_slice(&[quad[0], quad[1], quad[2]]);
                        indices.extend_from_slice(&[quad[0], quad[2], quad[3]]);
                    } else {
                        indices.extend_from_slice(&[quad[0], quad[2], quad[1]]);
                        indices.extend_from_slice(&[quad[0], quad[3], quad[2]]);
                    }
                }
            }
        }
    }

    if indices.is_empty() {
        return Err(Error::MeshGeneration(
            "no surface found within the sampled bounds".to_string(),
        ));
    }

    Ok(Mesh { vertices, indices })
}

fn unit(axis: usize) -> UVec3 {
    match axis {
        0 => UVec3::X,
        1 => UVec3::Y,
        _ => UVec3::Z,
    }
}

/// Mean of the surface crossings on the cell's edges, if the cell is mixed
fn cell_vertex(grid: &Grid, values: &[f32], cell: UVec3, iso: f32) -> Option<Vec3> {
    let corner_values = CORNERS.map(|c| values[grid.point_index(cell + c)]);

    let inside = corner_values.iter().filter(|&&d| d < iso).count();
    if inside == 0 || inside == 8 {
        return None;
    }

    let mut sum = Vec3::ZERO;
    let mut crossings = 0u32;

    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            if a & bit != 0 {
                continue;
            }
            let b = a | bit;
            let (va, vb) = (corner_values[a], corner_values[b]);
            if (va < iso) == (vb < iso) {
                continue;
            }

            let t = if (vb - va).abs() > 0.00001 {
                (iso - va) / (vb - va)
            } else {
                0.5
            };
            let pa = grid.position(cell + CORNERS[a]);
            let pb = grid.position(cell + CORNERS[b]);
            sum += pa.lerp(pb, t);
            crossings += 1;
        }
    }

    Some(sum / crossings as f32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sdf::{Aabb, SdfExt, cube};
    use approx::assert_relative_eq;

    fn config(res: u32, half: f32) -> MeshConfig {
        MeshConfig::default()
            .with_resolution(res)
            .with_bounds(Aabb::cube(half))
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(matches!(
            extract(&cube(1.0), &config(0, 1.0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            extract(&cube(1.0), &config(MeshConfig::MAX_RESOLUTION + 1, 1.0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            extract(&cube(1.0), &config(8, 0.0)),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_no_surface_is_an_error() {
        // Shape entirely outside the sampled region
        let far = cube(0.5).translate_x(10.0);
        assert!(matches!(
            extract(&far, &config(8, 1.0)),
            Err(Error::MeshGeneration(_))
        ));
    }

    #[test]
    fn test_cube_mesh_is_closed() {
        let mesh = extract(&cube(1.0), &config(10, 0.8)).unwrap();

        // Every edge of a closed, consistently wound surface is used once in
        // each direction
        let mut edges = std::collections::HashMap::new();
        for tri in mesh.indices.chunks(3) {
            for i in 0..3 {
                *edges.entry((tri[i], tri[(i + 1) % 3])).or_insert(0) += 1;
            }
        }
        for (&(a, b), &count) in &edges {
            assert_eq!(count, 1, "edge {a}->{b} used {count} times");
            assert_eq!(edges.get(&(b, a)), Some(&1), "edge {a}->{b} has no twin");
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = extract(&cube(1.0), &config(10, 0.8)).unwrap();
        for v in &mesh.vertices {
            assert!(v.normal().dot(v.position()) > 0.0);
            assert_relative_eq!(v.normal().length(), 1.0, epsilon = 1e-4);
        }

        // Outward winding gives a positive enclosed volume close to the cube's
        let volume: f32 = mesh
            .indices
            .chunks(3)
            .map(|tri| {
                let p0 = mesh.vertices[tri[0] as usize].position();
                let p1 = mesh.vertices[tri[1] as usize].position();
                let p2 = mesh.vertices[tri[2] as usize].position();
                p0.dot(p1.cross(p2)) / 6.0
            })
            .sum();
        assert!(volume > 0.8 && volume < 1.05, "volume {volume}");
    }

    #[test]
    fn test_flat_faces_stay_flat() {
        let mesh = extract(&cube(1.0), &config(10, 0.8)).unwrap();
        // Vertices away from edges sit exactly on the face planes
        for v in &mesh.vertices {
            let p = v.position();
            let abs = p.abs();
            let major = abs.max_element();
            let near_axis = [abs.x < 0.35, abs.y < 0.35, abs.z < 0.35];
            if near_axis.iter().filter(|&&n| n).count() >= 2 {
                assert_relative_eq!(major, 0.5, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = extract(&cube(1.0).translate_z(0.05), &config(12, 0.8)).unwrap();
        let b = extract(&cube(1.0).translate_z(0.05), &config(12, 0.8)).unwrap();
        assert_eq!(a, b);
    }
}
