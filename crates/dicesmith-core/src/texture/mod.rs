//! Procedural texture generation
//!
//! 2D textures are plain functions of UV, composed like SDFs and baked to
//! images on demand. Only what surface detailing needs is here: a cellular
//! edge pattern, a color ramp to sharpen it, and a bump-to-normal converter.

pub mod ops;
pub mod voronoi;

pub use ops::{ColorRamp, RampStop, ToNormal};
pub use voronoi::VoronoiEdge;

use glam::Vec2;
use image::RgbaImage;
use rayon::prelude::*;

/// Trait for texture generators
pub trait Texture: Send + Sync {
    /// Sample the texture at UV coordinates (0..1)
    fn sample(&self, uv: Vec2) -> f32;

    /// Sample with color output
    fn sample_color(&self, uv: Vec2) -> [f32; 4] {
        let v = self.sample(uv);
        [v, v, v, 1.0]
    }
}

impl<T: Texture + ?Sized> Texture for std::sync::Arc<T> {
    fn sample(&self, uv: Vec2) -> f32 {
        (**self).sample(uv)
    }

    fn sample_color(&self, uv: Vec2) -> [f32; 4] {
        (**self).sample_color(uv)
    }
}

/// Extension trait for texture operations
pub trait TextureExt: Texture + Sized + 'static {
    /// Map values through a linear color ramp
    fn color_ramp(self, stops: Vec<RampStop>) -> ColorRamp<Self> {
        ColorRamp::new(self, stops)
    }

    /// Treat values as a height field and convert to a tangent-space normal map
    fn as_normal(self, strength: f32) -> ToNormal<Self> {
        ToNormal::new(self, strength)
    }
}

impl<T: Texture + 'static> TextureExt for T {}

/// Bake a texture into a square RGBA image, one row per Rayon task
///
/// Pixels are sampled at their centers; row 0 is `v` near 0.
pub fn rasterize<T: Texture + ?Sized>(tex: &T, size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let row_len = size as usize * 4;
    if row_len == 0 {
        return img;
    }

    img.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let v = (y as f32 + 0.5) / size as f32;
            for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                let u = (x as f32 + 0.5) / size as f32;
                let color = tex.sample_color(Vec2::new(u, v));
                for (dst, c) in pixel.iter_mut().zip(color) {
                    *dst = to_u8(c);
                }
            }
        });

    img
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Constant value texture
pub struct Constant {
    pub value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Texture for Constant {
    fn sample(&self, _uv: Vec2) -> f32 {
        self.value
    }
}

/// Create a constant texture
pub fn constant(value: f32) -> Constant {
    Constant::new(value)
}
