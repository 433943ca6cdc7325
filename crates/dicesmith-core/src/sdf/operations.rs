//! SDF Operations - Boolean combinations

use super::{Aabb, Sdf, SdfNode};
use glam::Vec3;

// ============================================================================
// Boolean Operations
// ============================================================================

/// Union of two SDFs (combine shapes)
pub struct Union<A: Sdf, B: Sdf> {
    pub a: A,
    pub b: B,
}

impl<A: Sdf, B: Sdf> Union<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Sdf + Send + Sync, B: Sdf + Send + Sync> Sdf for Union<A, B> {
    fn distance(&self, p: Vec3) -> f32 {
        self.a.distance(p).min(self.b.distance(p))
    }

    fn bounds(&self) -> Aabb {
        self.a.bounds().union(&self.b.bounds())
    }
}

/// Subtraction of two SDFs (cut B from A), the boolean difference
pub struct Subtract<A: Sdf, B: Sdf> {
    pub a: A,
    pub b: B,
}

impl<A: Sdf, B: Sdf> Subtract<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Sdf + Send + Sync, B: Sdf + Send + Sync> Sdf for Subtract<A, B> {
    fn distance(&self, p: Vec3) -> f32 {
        self.a.distance(p).max(-self.b.distance(p))
    }

    fn bounds(&self) -> Aabb {
        self.a.bounds() // Subtraction can only reduce, not expand
    }
}

/// Union of an arbitrary list of shapes
///
/// An empty list is "nothing": every point is infinitely far outside.
pub struct UnionAll {
    pub shapes: Vec<SdfNode>,
    bounds: Option<Aabb>,
}

impl UnionAll {
    pub fn new(shapes: Vec<SdfNode>) -> Self {
        let bounds = shapes
            .iter()
            .map(|s| s.bounds())
            .reduce(|acc, b| acc.union(&b));
        Self { shapes, bounds }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Sdf for UnionAll {
    fn distance(&self, p: Vec3) -> f32 {
        self.shapes
            .iter()
            .map(|s| s.distance(p))
            .fold(f32::INFINITY, f32::min)
    }

    fn bounds(&self) -> Aabb {
        self.bounds.unwrap_or_else(|| Aabb::cube(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdf::{SdfExt, cube};
    use approx::assert_relative_eq;

    #[test]
    fn test_subtract_opens_a_hole() {
        let body = cube(2.0);
        let cutter = cube(0.5).translate_z(1.0);
        let holed = Subtract::new(body, cutter);

        // Just below the face, inside the cutter: now empty space
        assert!(holed.distance(Vec3::new(0.0, 0.0, 0.9)) > 0.0);
        // Away from the cutter the body is unchanged
        assert_relative_eq!(holed.distance(Vec3::new(0.5, 0.5, 0.0)), -0.5);
    }

    #[test]
    fn test_union_all_matches_chained_union() {
        let a = cube(1.0).translate_x(-1.0);
        let b = cube(1.0).translate_x(1.0);
        let c = cube(1.0).translate(0.0, 2.0, 0.0);

        let chained = a.clone().union(b.clone()).union(c.clone());
        let flat = UnionAll::new(vec![a, b, c]);

        for p in [
            Vec3::ZERO,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.3, 2.2, -0.1),
            Vec3::splat(3.0),
        ] {
            assert_relative_eq!(flat.distance(p), chained.distance(p));
        }

        let bounds = flat.bounds();
        assert_relative_eq!(bounds.min.x, -1.5);
        assert_relative_eq!(bounds.max.y, 2.5);
    }

    #[test]
    fn test_empty_union_is_nothing() {
        let empty = UnionAll::new(Vec::new());
        assert!(empty.is_empty());
        assert!(empty.distance(Vec3::ZERO).is_infinite());
    }
}
