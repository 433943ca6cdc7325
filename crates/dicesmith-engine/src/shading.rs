//! Die materials and the crack normal map
//!
//! Cracks are a height field built from cellular distance-to-edge noise
//! pushed through a narrow ramp, so only thin lines along the cell borders
//! differ from the flat surface. The height field then drives the body
//! material's normal channel.

use crate::config::{ColorEntry, CrackConfig, DiceConfig};
use crate::scene::Scene;
use dicesmith_core::material::{Material, pbr};
use dicesmith_core::texture::{ColorRamp, RampStop, Texture, TextureExt, VoronoiEdge};
use std::sync::Arc;
use tracing::{info, warn};

/// Body material for one palette color
pub fn body_material(config: &DiceConfig, color: &ColorEntry) -> Material {
    pbr()
        .named(config.variant.body_material_name(&color.name))
        .base_color(color.body)
        .roughness(config.finish.body_roughness)
        .metallic(config.finish.body_metallic)
}

/// Pip material for one palette color
pub fn pip_material(config: &DiceConfig, color: &ColorEntry) -> Material {
    pbr()
        .named(config.variant.pip_material_name(&color.name))
        .base_color(color.pip)
        .roughness(config.finish.pip_roughness)
        .metallic(config.finish.pip_metallic)
}

/// Crack height: 1 on the cell borders, falling to 0 between `edge_start`
/// and `edge_end`
pub fn crack_height(cracks: &CrackConfig) -> ColorRamp<VoronoiEdge> {
    VoronoiEdge::with_seed(cracks.seed, cracks.scale)
        .jitter(cracks.jitter)
        .color_ramp(vec![
            RampStop::gray(cracks.edge_start, 1.0),
            RampStop::gray(cracks.edge_end, 0.0),
        ])
}

/// Crack normal map, differenced one texel of the baked image apart
pub fn crack_normal(cracks: &CrackConfig) -> Arc<dyn Texture> {
    let step = 1.0 / cracks.texture_size.max(1) as f32;
    Arc::new(crack_height(cracks).as_normal(cracks.depth).with_step(step))
}

/// Wire the crack normal map into the named material and raise its roughness
///
/// A missing material is logged and skipped. Returns whether the material
/// was found.
pub fn apply_cracks(scene: &mut Scene, material_name: &str, cracks: &CrackConfig) -> bool {
    let Some(material) = scene.material_mut(material_name) else {
        warn!("Material '{}' not found, skipping cracks", material_name);
        return false;
    };

    material.set_normal(crack_normal(cracks));
    material.roughness = cracks.roughness;
    info!(
        "Applied cracks to {} (scale {}, depth {})",
        material_name, cracks.scale, cracks.depth
    );
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dicesmith_core::texture::rasterize;
    use glam::Vec2;

    #[test]
    fn test_materials_follow_variant() {
        let config = DiceConfig::cracked();
        let red = config.color("Red").unwrap();
        let body = body_material(&config, red);
        let pip = pip_material(&config, red);

        assert_eq!(body.name, "BodyMat_Red");
        assert_eq!(body.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(body.roughness, 0.3);
        assert_eq!(pip.name, "PipMat_Red");
        assert_eq!(pip.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(pip.roughness, 0.4);

        let config = DiceConfig::smooth();
        let black = config.color("Black").unwrap();
        let body = body_material(&config, black);
        assert_eq!(body.name, "Dice_Body_Black");
        assert_eq!(body.metallic, 0.1);
        assert_eq!(pip_material(&config, black).name, "Pip_Material_Black");
    }

    #[test]
    fn test_crack_height_is_thin_lines() {
        let cracks = DiceConfig::cracked().cracks;
        let height = crack_height(&cracks);

        let n = 64;
        let mut cracked = 0;
        for y in 0..n {
            for x in 0..n {
                let uv = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / n as f32;
                let h = height.sample(uv);
                assert!((0.0..=1.0).contains(&h));
                if h > 0.5 {
                    cracked += 1;
                }
            }
        }
        let fraction = cracked as f32 / (n * n) as f32;
        assert!(fraction > 0.0, "no cracks at all");
        assert!(fraction < 0.5, "cracks cover {fraction}");
    }

    #[test]
    fn test_crack_normal_bakes_with_variation() {
        let mut cracks = DiceConfig::cracked().cracks;
        cracks.texture_size = 32;
        let img = rasterize(crack_normal(&cracks).as_ref(), 32);

        let flat = img.pixels().filter(|p| p.0 == [128, 128, 255, 255]).count();
        assert!(flat > 0);
        assert!(flat < 32 * 32);
    }

    #[test]
    fn test_apply_cracks_by_name() {
        let config = DiceConfig::cracked();
        let red = config.color("Red").unwrap();
        let mut scene = Scene::new();
        scene.add_material(body_material(&config, red));

        assert!(apply_cracks(&mut scene, "BodyMat_Red", &config.cracks));
        let material = scene.material("BodyMat_Red").unwrap();
        assert!(material.has_textures());
        assert_eq!(material.roughness, 0.9);
    }

    #[test]
    fn test_apply_cracks_missing_material_continues() {
        let mut scene = Scene::new();
        assert!(!apply_cracks(
            &mut scene,
            "BodyMat_Red",
            &DiceConfig::cracked().cracks
        ));
        assert_eq!(scene.material_count(), 0);
    }
}
