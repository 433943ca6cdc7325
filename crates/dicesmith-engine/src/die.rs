//! Die geometry
//!
//! The body is a bevelled cube with one small cube subtracted per pip; each
//! hole then receives a slightly smaller fill cube sunk into it. Both sets of
//! geometry belong to one object and share its origin, placed at the center
//! of their combined bounds.

use crate::config::{ColorEntry, DiceConfig};
use crate::scene::{Scene, SceneError, SceneObject};
use crate::shading::{body_material, pip_material};
use dicesmith_core::Result;
use dicesmith_core::material::Material;
use dicesmith_core::mesh::{Mesh, MeshConfig, SdfToMesh};
use dicesmith_core::sdf::{Aabb, SdfExt, SdfNode, bevelled_box, cube, union_all};
use dicesmith_layout::{PipLayout, PipPlacement};
use glam::Vec3;
use tracing::debug;

/// One finished die before it enters the scene
#[derive(Debug, Clone)]
pub struct DieObject {
    pub name: String,
    pub color: String,
    /// World position of the object origin
    pub translation: Vec3,
    /// Bevelled body with pip holes, in object space
    pub body: Mesh,
    /// All pip fills joined into one mesh, in object space
    pub pips: Mesh,
    pub body_material: Material,
    pub pip_material: Material,
}

impl DieObject {
    pub fn vertex_count(&self) -> usize {
        self.body.vertex_count() + self.pips.vertex_count()
    }

    /// Polygon count of the die
    pub fn triangle_count(&self) -> usize {
        self.body.triangle_count() + self.pips.triangle_count()
    }

    /// Move the die into the scene with its two materials
    pub fn add_to_scene(self, scene: &mut Scene) -> std::result::Result<(), SceneError> {
        let object = SceneObject::new(self.name, self.translation)
            .with_part(self.body, self.body_material.name.clone())
            .with_part(self.pips, self.pip_material.name.clone());
        scene.add_material(self.body_material);
        scene.add_material(self.pip_material);
        scene.add_object(object)
    }
}

/// Pip positions for the configured geometry
pub fn pip_layout(config: &DiceConfig) -> PipLayout {
    let g = &config.geometry;
    PipLayout::new(g.dice_size, g.pip_depth, g.pip_spacing).with_fill_inset(g.fill_inset)
}

/// Bevelled body minus one cutter cube per pip
pub fn body_sdf(config: &DiceConfig, placements: &[PipPlacement]) -> SdfNode {
    let g = &config.geometry;
    let body = bevelled_box(Vec3::splat(g.dice_size * 0.5), g.bevel_amount, g.bevel_segments);
    let cutters = union_all(
        placements
            .iter()
            .map(|p| cube(g.pip_size).translate_by(p.cutter_center)),
    );
    body.subtract(cutters)
}

/// Every fill cube joined into one mesh
pub fn pip_fills(config: &DiceConfig, placements: &[PipPlacement]) -> Mesh {
    let half = Vec3::splat(config.geometry.pip_size * config.geometry.fill_scale * 0.5);
    let mut pips = Mesh::new();
    for placement in placements {
        pips.merge(&Mesh::cuboid(placement.fill_center, half));
    }
    pips
}

/// Build the die for one palette color, origin placed at `translation`
pub fn build_die(config: &DiceConfig, color: &ColorEntry, translation: Vec3) -> Result<DieObject> {
    let g = &config.geometry;
    let placements = pip_layout(config).placements();

    let mesh_config = MeshConfig::default()
        .with_resolution(g.resolution)
        .with_bounds(Aabb::cube(g.dice_size * 0.55));
    let mut body = body_sdf(config, &placements).to_mesh(mesh_config)?;
    let mut pips = pip_fills(config, &placements);

    // Origin to the center of the joined geometry
    if let (Some(body_bounds), Some(pip_bounds)) = (body.bounds(), pips.bounds()) {
        let offset = -body_bounds.union(&pip_bounds).center();
        body.translate(offset);
        pips.translate(offset);
    }

    let die = DieObject {
        name: config.variant.object_name(&color.name),
        color: color.name.clone(),
        translation,
        body,
        pips,
        body_material: body_material(config, color),
        pip_material: pip_material(config, color),
    };
    debug!(
        "Built {} ({} pips, {} triangles)",
        die.name,
        placements.len(),
        die.triangle_count()
    );
    Ok(die)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dicesmith_core::sdf::Sdf;

    fn small_config() -> DiceConfig {
        let mut config = DiceConfig::cracked();
        config.geometry.resolution = 24;
        config
    }

    #[test]
    fn test_body_has_pip_holes() {
        let config = small_config();
        let placements = pip_layout(&config).placements();
        let sdf = body_sdf(&config, &placements);

        // Just under the face at the single pip of face 1: carved out
        let hole = Vec3::new(0.0, 0.0, 0.98);
        assert!(sdf.distance(hole) > 0.0);
        // Same depth between pips: solid
        let solid = Vec3::new(0.25, 0.0, 0.98);
        assert!(sdf.distance(solid) < 0.0);
        assert!(sdf.distance(Vec3::ZERO) < 0.0);
    }

    #[test]
    fn test_fills_one_cube_per_pip() {
        let config = small_config();
        let placements = pip_layout(&config).placements();
        let pips = pip_fills(&config, &placements);

        assert_eq!(placements.len(), 21);
        assert_eq!(pips.triangle_count(), 21 * 12);
        assert_eq!(pips.vertex_count(), 21 * 24);

        let bounds = pips.bounds().unwrap();
        assert!(bounds.max.max_element() < config.geometry.dice_size * 0.5);
    }

    #[test]
    fn test_build_die() {
        let config = small_config();
        let red = config.color("Red").unwrap();
        let die = build_die(&config, red, Vec3::new(6.0, 0.0, 0.0)).unwrap();

        assert_eq!(die.name, "D6_Red_Final");
        assert_eq!(die.translation, Vec3::new(6.0, 0.0, 0.0));
        assert_eq!(die.body_material.name, "BodyMat_Red");
        assert_eq!(die.pip_material.name, "PipMat_Red");
        assert!(die.body.triangle_count() > 0);

        let bounds = die.body.bounds().unwrap().union(&die.pips.bounds().unwrap());
        assert!(bounds.center().length() < 1e-4);
        assert!(bounds.size().max_element() <= config.geometry.dice_size + 0.05);
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = small_config();
        let blue = config.color("Blue").unwrap();
        let a = build_die(&config, blue, Vec3::ZERO).unwrap();
        let b = build_die(&config, blue, Vec3::ZERO).unwrap();
        assert_eq!(a.triangle_count(), b.triangle_count());
        assert_eq!(a.vertex_count(), b.vertex_count());
    }

    #[test]
    fn test_add_to_scene() {
        let config = small_config();
        let white = config.color("White").unwrap();
        let die = build_die(&config, white, Vec3::ZERO).unwrap();
        let triangles = die.triangle_count();

        let mut scene = Scene::new();
        die.add_to_scene(&mut scene).unwrap();

        let object = scene.object("D6_White_Final").unwrap();
        assert_eq!(object.parts.len(), 2);
        assert_eq!(object.triangle_count(), triangles);
        assert!(scene.material("BodyMat_White").is_some());
        assert!(scene.material("PipMat_White").is_some());
    }
}
