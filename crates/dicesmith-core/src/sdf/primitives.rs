//! SDF Primitive shapes
//!
//! All primitives are centered at the origin. Use transforms to position them.

use super::{Aabb, Sdf, SdfNode};
use glam::Vec3;

// ============================================================================
// Constructor functions (ergonomic API)
// ============================================================================

/// Create a box with given half-extents (size/2 in each direction)
pub fn box3(half_extents: Vec3) -> Box3 {
    Box3::new(half_extents)
}

/// Create a cube with given edge length
pub fn cube(size: f32) -> Box3 {
    Box3::new(Vec3::splat(size * 0.5))
}

/// Create a box whose edges are rounded with `radius`
pub fn rounded_box(half_extents: Vec3, radius: f32) -> RoundedBox {
    RoundedBox::new(half_extents, radius)
}

/// Create a box whose edges are cut by a flat 45° chamfer of width `amount`
pub fn chamfered_box(half_extents: Vec3, amount: f32) -> ChamferedBox {
    ChamferedBox::new(half_extents, amount)
}

/// Bevel the edges of a box.
///
/// `amount` is how far the new edges sit from the original edge along each
/// face. One segment gives a flat chamfer, two or more a round profile, zero
/// leaves the edges sharp.
pub fn bevelled_box(half_extents: Vec3, amount: f32, segments: u32) -> SdfNode {
    if amount <= 0.0 || segments == 0 {
        SdfNode::new(box3(half_extents))
    } else if segments == 1 {
        SdfNode::new(chamfered_box(half_extents, amount))
    } else {
        SdfNode::new(rounded_box(half_extents, amount))
    }
}

// ============================================================================
// Primitive Structs
// ============================================================================

/// Axis-aligned box (rectangular prism)
#[derive(Debug, Clone, Copy)]
pub struct Box3 {
    pub half_extents: Vec3,
}

impl Box3 {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

impl Sdf for Box3 {
    fn distance(&self, p: Vec3) -> f32 {
        let q = p.abs() - self.half_extents;
        q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(-self.half_extents, self.half_extents)
    }
}

/// Box with rounded edges
#[derive(Debug, Clone, Copy)]
pub struct RoundedBox {
    pub half_extents: Vec3,
    pub radius: f32,
}

impl RoundedBox {
    pub fn new(half_extents: Vec3, radius: f32) -> Self {
        Self {
            half_extents,
            radius,
        }
    }
}

impl Sdf for RoundedBox {
    fn distance(&self, p: Vec3) -> f32 {
        let q = p.abs() - self.half_extents + Vec3::splat(self.radius);
        q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0) - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(-self.half_extents, self.half_extents)
    }
}

/// Box with its twelve edges cut flat at 45°
#[derive(Debug, Clone, Copy)]
pub struct ChamferedBox {
    pub half_extents: Vec3,
    pub amount: f32,
}

impl ChamferedBox {
    pub fn new(half_extents: Vec3, amount: f32) -> Self {
        Self {
            half_extents,
            amount,
        }
    }

    // Signed distance to the chamfer plane cutting the edge between two axes
    fn edge_plane(a: f32, b: f32, ha: f32, hb: f32, amount: f32) -> f32 {
        (a.abs() + b.abs() - (ha + hb - amount)) * std::f32::consts::FRAC_1_SQRT_2
    }
}

impl Sdf for ChamferedBox {
    fn distance(&self, p: Vec3) -> f32 {
        let h = self.half_extents;
        let k = self.amount;
        let base = Box3::new(h).distance(p);

        let xy = Self::edge_plane(p.x, p.y, h.x, h.y, k);
        let yz = Self::edge_plane(p.y, p.z, h.y, h.z, k);
        let zx = Self::edge_plane(p.z, p.x, h.z, h.x, k);

        base.max(xy).max(yz).max(zx)
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(-self.half_extents, self.half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_distance() {
        let c = cube(2.0);
        assert_relative_eq!(c.distance(Vec3::ZERO), -1.0);
        assert_relative_eq!(c.distance(Vec3::new(2.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(c.distance(Vec3::new(1.0, 0.5, 0.0)), 0.0);
    }

    #[test]
    fn test_chamfer_cuts_edges_not_faces() {
        let h = Vec3::splat(1.0);
        let plain = box3(h);
        let chamfered = chamfered_box(h, 0.08);

        // Face centers are untouched
        assert_relative_eq!(chamfered.distance(Vec3::new(1.0, 0.0, 0.0)), 0.0);

        // The old edge is now outside
        let edge = Vec3::new(1.0, 1.0, 0.0);
        assert_relative_eq!(plain.distance(edge), 0.0);
        assert!(chamfered.distance(edge) > 0.0);

        // New edge lies `amount` in from the old one along the face
        assert_relative_eq!(
            chamfered.distance(Vec3::new(1.0, 0.92, 0.0)),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_rounded_box_corner() {
        let r = rounded_box(Vec3::splat(1.0), 0.1);
        assert_relative_eq!(r.distance(Vec3::new(1.0, 0.0, 0.0)), 0.0, epsilon = 1e-6);
        assert!(r.distance(Vec3::splat(1.0)) > 0.0);
    }

    #[test]
    fn test_bevelled_box_profiles() {
        let corner = Vec3::new(1.0, 1.0, 0.0);
        let sharp = bevelled_box(Vec3::splat(1.0), 0.0, 2);
        let chamfer = bevelled_box(Vec3::splat(1.0), 0.08, 1);
        let round = bevelled_box(Vec3::splat(1.0), 0.08, 2);

        assert_relative_eq!(sharp.distance(corner), 0.0);
        assert!(chamfer.distance(corner) > 0.0);
        assert!(round.distance(corner) > 0.0);
        // The round profile bulges out past the chamfer's flat cut
        assert!(round.distance(corner) < chamfer.distance(corner));
    }
}
