//! SDF Transforms - Translation

use super::{Aabb, Sdf};
use glam::Vec3;

/// Translation transform
pub struct Translate<S: Sdf> {
    pub inner: S,
    pub offset: Vec3,
}

impl<S: Sdf> Translate<S> {
    pub fn new(inner: S, offset: Vec3) -> Self {
        Self { inner, offset }
    }
}

impl<S: Sdf + Send + Sync> Sdf for Translate<S> {
    fn distance(&self, p: Vec3) -> f32 {
        self.inner.distance(p - self.offset)
    }

    fn bounds(&self) -> Aabb {
        let b = self.inner.bounds();
        Aabb::new(b.min + self.offset, b.max + self.offset)
    }
}
