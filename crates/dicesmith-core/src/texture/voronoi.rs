//! Cellular distance-to-edge noise

use super::Texture;
use glam::Vec2;
use noise::{NoiseFn, Perlin};

/// Distance from each point to the nearest Voronoi cell border
///
/// Zero on the borders, growing towards feature points; in cell units, so
/// values stay below about 0.7. Thresholding it near zero gives a network of
/// thin lines that reads as cracks. Computed exactly with the two-pass
/// nearest-point / nearest-bisector search rather than the `F2 - F1`
/// approximation.
pub struct VoronoiEdge {
    scale: f32,
    seed: u32,
    jitter: f32,
    warp: Perlin,
}

impl VoronoiEdge {
    pub fn new(scale: f32) -> Self {
        Self::with_seed(0, scale)
    }

    pub fn with_seed(seed: u32, scale: f32) -> Self {
        Self {
            scale,
            seed,
            jitter: 0.0,
            warp: Perlin::new(seed),
        }
    }

    /// Wobble the cell borders with Perlin noise, in cell units
    pub fn jitter(mut self, amount: f32) -> Self {
        self.jitter = amount;
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn feature_point(&self, cell: Vec2) -> Vec2 {
        hash_vec2(cell, self.seed)
    }

    fn warped(&self, p: Vec2) -> Vec2 {
        if self.jitter == 0.0 {
            return p;
        }
        let q = [f64::from(p.x) * 0.5, f64::from(p.y) * 0.5];
        let wx = self.warp.get(q) as f32;
        let wy = self.warp.get([q[0] + 17.3, q[1] - 9.1]) as f32;
        p + Vec2::new(wx, wy) * self.jitter
    }
}

impl Texture for VoronoiEdge {
    fn sample(&self, uv: Vec2) -> f32 {
        let p = self.warped(uv * self.scale);
        let cell = p.floor();
        let fract = p - cell;

        // Pass 1: nearest feature point
        let mut nearest_offset = Vec2::ZERO;
        let mut nearest_cell = Vec2::ZERO;
        let mut min_dist = f32::MAX;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let neighbor = Vec2::new(dx as f32, dy as f32);
                let r = neighbor + self.feature_point(cell + neighbor) - fract;
                let d = r.length_squared();
                if d < min_dist {
                    min_dist = d;
                    nearest_offset = r;
                    nearest_cell = neighbor;
                }
            }
        }

        // Pass 2: nearest bisector between that point and its neighbors
        let mut edge_dist = f32::MAX;
        for dy in -2..=2 {
            for dx in -2..=2 {
                let neighbor = nearest_cell + Vec2::new(dx as f32, dy as f32);
                let r = neighbor + self.feature_point(cell + neighbor) - fract;
                let between = r - nearest_offset;
                if between.length_squared() > 0.00001 {
                    let d = (0.5 * (nearest_offset + r)).dot(between.normalize());
                    edge_dist = edge_dist.min(d);
                }
            }
        }

        edge_dist.max(0.0)
    }
}

// Simple hash function for cellular noise
// Note: These magic constants are arbitrary hash coefficients, not math constants
#[allow(clippy::approx_constant)]
fn hash_vec2(p: Vec2, seed: u32) -> Vec2 {
    let k = Vec2::new(0.3183099, 0.3678794);
    let p = p + Vec2::splat(seed as f32 * 0.1);
    let p = p * k + Vec2::new(k.y, k.x);
    Vec2::new(
        (16.0 * (p.x * p.y * (p.x + p.y)).rem_euclid(1.0)).rem_euclid(1.0),
        (16.0 * (p.y * p.x * (p.y - p.x + 1.0)).rem_euclid(1.0)).rem_euclid(1.0),
    )
}

/// Create distance-to-edge cellular noise
pub fn voronoi_edge(scale: f32) -> VoronoiEdge {
    VoronoiEdge::new(scale)
}
