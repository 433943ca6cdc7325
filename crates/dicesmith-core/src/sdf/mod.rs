//! Signed Distance Functions (SDF) for solid modelling
//!
//! SDFs represent shapes as functions that return the distance from any
//! point in space to the nearest surface. Negative values are inside,
//! positive values are outside, and zero is exactly on the surface.
//!
//! Boolean operations fall out of this directly, which is what lets a die be
//! modelled as "bevelled cube minus a pile of small cubes".
//!
//! ## Example
//!
//! ```rust
//! use dicesmith_core::prelude::*;
//!
//! let body = cube(2.0).subtract(cube(0.35).translate_z(1.125));
//! assert!(body.distance(Vec3::ZERO) < 0.0);
//! assert!(body.distance(Vec3::new(0.0, 0.0, 0.99)) > 0.0);
//! ```

pub mod operations;
pub mod primitives;
pub mod transforms;

use glam::Vec3;

/// The core SDF trait - any type that can compute distance from a point
pub trait Sdf: Send + Sync {
    /// Calculate the signed distance from point `p` to the surface.
    ///
    /// - Returns negative values for points inside the shape
    /// - Returns positive values for points outside the shape
    /// - Returns zero for points exactly on the surface
    fn distance(&self, p: Vec3) -> f32;

    /// Get an approximate bounding box for this SDF.
    /// Used to size the sampling grid during mesh generation.
    fn bounds(&self) -> Aabb {
        // Default: large bounding box, can be overridden for better performance
        Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0))
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a cube centered at origin
    pub fn cube(half_size: f32) -> Self {
        Self::new(Vec3::splat(-half_size), Vec3::splat(half_size))
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self::new(p, p)),
            Some(b) => Some(Self::new(b.min.min(p), b.max.max(p))),
        })
    }

    /// Expand the bounding box by a margin
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min - Vec3::splat(margin),
            self.max + Vec3::splat(margin),
        )
    }

    /// Merge two bounding boxes
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Get the size of the bounding box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when every extent is positive
    pub fn is_valid(&self) -> bool {
        let size = self.size();
        size.x > 0.0 && size.y > 0.0 && size.z > 0.0
    }
}

/// An SDF node that can be composed and shared
#[derive(Clone)]
pub struct SdfNode {
    inner: std::sync::Arc<dyn Sdf>,
}

impl SdfNode {
    /// Create a new SDF node from any type implementing Sdf
    pub fn new<S: Sdf + 'static>(sdf: S) -> Self {
        Self {
            inner: std::sync::Arc::new(sdf),
        }
    }
}

impl Sdf for SdfNode {
    fn distance(&self, p: Vec3) -> f32 {
        self.inner.distance(p)
    }

    fn bounds(&self) -> Aabb {
        self.inner.bounds()
    }
}

/// Union of any number of shapes
///
/// Flat alternative to chaining `.union()`, which nests one level per shape.
pub fn union_all<I: IntoIterator<Item = SdfNode>>(shapes: I) -> SdfNode {
    SdfNode::new(operations::UnionAll::new(shapes.into_iter().collect()))
}

/// Extension trait providing chainable operations on SDFs
pub trait SdfExt: Sdf + Sized + 'static {
    /// Type-erase into a shareable node
    fn node(self) -> SdfNode {
        SdfNode::new(self)
    }

    // === Boolean Operations ===

    /// Union: combine two shapes (OR)
    fn union<S: Sdf + 'static>(self, other: S) -> SdfNode {
        SdfNode::new(operations::Union::new(self, other))
    }

    /// Subtraction: cut shape `other` from `self`
    fn subtract<S: Sdf + 'static>(self, other: S) -> SdfNode {
        SdfNode::new(operations::Subtract::new(self, other))
    }

    // === Transforms ===

    /// Translate (move) the shape
    fn translate(self, x: f32, y: f32, z: f32) -> SdfNode {
        self.translate_by(Vec3::new(x, y, z))
    }

    /// Translate by a vector
    fn translate_by(self, offset: Vec3) -> SdfNode {
        SdfNode::new(transforms::Translate::new(self, offset))
    }

    /// Translate along X axis
    fn translate_x(self, x: f32) -> SdfNode {
        self.translate(x, 0.0, 0.0)
    }

    /// Translate along Z axis
    fn translate_z(self, z: f32) -> SdfNode {
        self.translate(0.0, 0.0, z)
    }
}

// Implement SdfExt for all types that implement Sdf
impl<T: Sdf + 'static> SdfExt for T {}

// Re-exports
pub use operations::*;
pub use primitives::*;
pub use transforms::*;
