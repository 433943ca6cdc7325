//! Material definitions for procedural assets

use crate::texture::{Texture, rasterize};
use image::RgbaImage;
use std::sync::Arc;

/// A named metallic-roughness PBR material
///
/// Color, roughness and metallic are constant factors; the normal channel is
/// any procedural texture and gets baked to an image on export. Texture
/// outputs are expected to be encoded already (`n * 0.5 + 0.5`), as
/// [`ToNormal`](crate::texture::ToNormal) produces.
#[derive(Clone)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub normal: Option<Arc<dyn Texture>>,
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("base_color", &self.base_color)
            .field("roughness", &self.roughness)
            .field("metallic", &self.metallic)
            .field("normal", &self.normal.is_some())
            .finish()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Material".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            normal: None,
        }
    }
}

impl Material {
    /// Create a new PBR material with defaults
    pub fn pbr() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set albedo color
    pub fn albedo_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b, 1.0];
        self
    }

    /// Set albedo color including alpha
    pub fn base_color(mut self, rgba: [f32; 4]) -> Self {
        self.base_color = rgba;
        self
    }

    /// Set roughness value
    pub fn roughness(mut self, value: f32) -> Self {
        self.roughness = value;
        self
    }

    /// Set metallic value
    pub fn metallic(mut self, value: f32) -> Self {
        self.metallic = value;
        self
    }

    /// Set normal map
    pub fn normal<T: Texture + 'static>(mut self, tex: T) -> Self {
        self.normal = Some(Arc::new(tex));
        self
    }

    /// Replace the normal map of an existing material
    pub fn set_normal(&mut self, tex: Arc<dyn Texture>) {
        self.normal = Some(tex);
    }

    pub fn has_textures(&self) -> bool {
        self.normal.is_some()
    }

    /// Bake the normal channel into a `size`×`size` image
    pub fn rasterize_normal(&self, size: u32) -> Option<RgbaImage> {
        self.normal.as_ref().map(|n| rasterize(n.as_ref(), size))
    }
}

/// Shorthand for creating a PBR material
pub fn pbr() -> Material {
    Material::pbr()
}

/// Encode an image as PNG bytes
pub fn encode_png(img: &RgbaImage) -> crate::Result<Vec<u8>> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::texture::{TextureExt, constant};

    #[test]
    fn test_builder() {
        let mat = pbr()
            .named("BodyMat_Red")
            .albedo_color(0.8, 0.0, 0.0)
            .roughness(0.3)
            .metallic(0.1);
        assert_eq!(mat.name, "BodyMat_Red");
        assert_eq!(mat.base_color, [0.8, 0.0, 0.0, 1.0]);
        assert_eq!(mat.roughness, 0.3);
        assert_eq!(mat.metallic, 0.1);
        assert!(!mat.has_textures());
        assert!(mat.rasterize_normal(4).is_none());
    }

    #[test]
    fn test_flat_normal_bakes_to_neutral_blue() {
        let mat = pbr().normal(constant(0.5).as_normal(2.0));
        let img = mat.rasterize_normal(8).unwrap();
        assert_eq!(img.dimensions(), (8, 8));
        assert!(img.pixels().all(|p| p.0 == [128, 128, 255, 255]));
    }

    #[test]
    fn test_encode_png_roundtrip_dimensions() {
        let img = RgbaImage::new(5, 3);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }
}
