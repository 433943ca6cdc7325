//! Texture operations - color mapping and normal conversion

use super::Texture;
use glam::{Vec2, Vec3, Vec4};

/// One stop of a [`ColorRamp`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStop {
    pub position: f32,
    pub color: [f32; 4],
}

impl RampStop {
    pub fn new(position: f32, color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// Opaque gray stop
    pub fn gray(position: f32, value: f32) -> Self {
        Self::new(position, [value, value, value, 1.0])
    }
}

/// Map the inner value through piecewise-linear color stops
///
/// Values before the first stop take its color, values after the last take
/// the last one's. The grayscale value is the Rec. 709 luminance.
pub struct ColorRamp<T: Texture> {
    inner: T,
    stops: Vec<RampStop>,
}

impl<T: Texture> ColorRamp<T> {
    pub fn new(inner: T, mut stops: Vec<RampStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { inner, stops }
    }

    pub fn stops(&self) -> &[RampStop] {
        &self.stops
    }

    fn eval(&self, fac: f32) -> [f32; 4] {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return [fac, fac, fac, 1.0];
        };
        if fac <= first.position {
            return first.color;
        }
        if fac >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if fac <= b.position {
                let span = b.position - a.position;
                let t = if span > 0.0 {
                    (fac - a.position) / span
                } else {
                    1.0
                };
                return Vec4::from_array(a.color)
                    .lerp(Vec4::from_array(b.color), t)
                    .to_array();
            }
        }
        last.color
    }
}

impl<T: Texture> Texture for ColorRamp<T> {
    fn sample(&self, uv: Vec2) -> f32 {
        let [r, g, b, _] = self.eval(self.inner.sample(uv));
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    fn sample_color(&self, uv: Vec2) -> [f32; 4] {
        self.eval(self.inner.sample(uv))
    }
}

/// Convert a height field to a tangent-space normal map
///
/// Heights are differenced one `step` apart in UV space; `strength` scales
/// the slope. Output is already encoded for storage (`n * 0.5 + 0.5`), with
/// +Y pointing towards decreasing `v` as glTF expects.
pub struct ToNormal<T: Texture> {
    inner: T,
    strength: f32,
    step: f32,
}

impl<T: Texture> ToNormal<T> {
    pub fn new(inner: T, strength: f32) -> Self {
        Self {
            inner,
            strength,
            step: 1.0 / 512.0,
        }
    }

    /// Finite-difference distance; one texel of the baked map works well
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Unit tangent-space normal at `uv`
    pub fn normal_at(&self, uv: Vec2) -> Vec3 {
        let eps = self.step;

        let h_l = self.inner.sample(uv - Vec2::new(eps, 0.0));
        let h_r = self.inner.sample(uv + Vec2::new(eps, 0.0));
        let h_up = self.inner.sample(uv - Vec2::new(0.0, eps));
        let h_down = self.inner.sample(uv + Vec2::new(0.0, eps));

        let dx = (h_r - h_l) * self.strength;
        let dy = (h_up - h_down) * self.strength;

        Vec3::new(-dx, -dy, 1.0).normalize()
    }
}

impl<T: Texture> Texture for ToNormal<T> {
    /// Height of the underlying field
    fn sample(&self, uv: Vec2) -> f32 {
        self.inner.sample(uv)
    }

    fn sample_color(&self, uv: Vec2) -> [f32; 4] {
        let n = self.normal_at(uv);
        [n.x * 0.5 + 0.5, n.y * 0.5 + 0.5, n.z * 0.5 + 0.5, 1.0]
    }
}
