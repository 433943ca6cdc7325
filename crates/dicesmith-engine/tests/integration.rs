//! End-to-end runs writing real files into a temporary project

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use dicesmith_engine::{DiceConfig, DiceFactory, ExportFormat, ExportOutcome, Variant, inspect};
use std::path::Path;

fn test_config(variant: Variant, project: &Path) -> DiceConfig {
    let mut config = DiceConfig::preset(variant);
    config.geometry.resolution = 24;
    config.cracks.texture_size = 32;
    config.output.project_dir = project.to_path_buf();
    config
}

#[test]
fn test_cracked_run_writes_one_asset_per_color() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Cracked, dir.path());
    config.select_colors(&["Red", "Green"]).unwrap();

    let report = DiceFactory::new(config).unwrap().run().unwrap();

    assert_eq!(report.variant, Variant::Cracked);
    assert_eq!(report.dice.len(), 2);
    assert_eq!(report.exported().count(), 2);

    let models = dir.path().join("assets/models_cracked_normal");
    let red = models.join("0_dice_red_cracked.gltf");
    assert!(red.exists());
    assert!(models.join("0_dice_red_cracked.bin").exists());
    assert!(models.join("0_dice_red_cracked_bodymat_red_normal.png").exists());
    assert!(models.join("0_dice_green_cracked.gltf").exists());
    assert!(!models.join("0_dice_blue_cracked.gltf").exists());

    let summary = inspect(&red).unwrap();
    assert_eq!(summary.nodes, vec!["D6_Red_Final".to_string()]);
    assert_eq!(summary.meshes, 1);
    assert_eq!(summary.primitives, 2);
    assert_eq!(summary.materials, vec!["BodyMat_Red", "PipMat_Red"]);
    assert_eq!(summary.images, 1);
    assert_eq!(summary.cameras, 0);
    assert_eq!(summary.lights, 0);

    let result = report.dice[0].outcome.result().unwrap();
    assert_eq!(summary.triangle_count, result.triangle_count);
    assert_eq!(summary.vertex_count, result.vertex_count);
}

#[test]
fn test_cracked_preview_holds_last_die_and_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Cracked, dir.path());
    config.select_colors(&["Blue", "White"]).unwrap();

    let mut factory = DiceFactory::new(config).unwrap();
    let report = factory.run().unwrap();

    // Meshes are cleared between dice, so only the last one remains
    assert_eq!(factory.scene().objects().len(), 1);
    assert!(factory.scene().object("D6_White_Final").is_some());

    let preview = report.preview.unwrap();
    let summary = inspect(&preview.path).unwrap();
    assert_eq!(summary.meshes, 1);
    assert_eq!(summary.cameras, 1);
    assert_eq!(summary.lights, 1);
}

#[test]
fn test_smooth_run_reports_unbuilt_colors_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Smooth, dir.path());
    config.output.write_preview = false;
    config.select_colors(&["White", "Red"]).unwrap();

    let mut factory = DiceFactory::new(config).unwrap();
    let report = factory.run().unwrap();

    let colors: Vec<_> = report.dice.iter().map(|d| d.color.as_str()).collect();
    assert_eq!(colors, vec!["Black", "Blue", "Green", "Red", "White"]);
    assert_eq!(report.exported().count(), 2);
    assert_eq!(report.missing().count(), 3);
    assert!(report.preview.is_none());

    let blue = &report.dice[1];
    assert_eq!(blue.object, "D6_Dice_Blue");
    assert!(matches!(blue.outcome, ExportOutcome::Missing { .. }));

    let models = dir.path().join("assets/models");
    assert!(models.join("dice_white.gltf").exists());
    assert!(models.join("dice_red.gltf").exists());
    assert!(!models.join("dice_blue.gltf").exists());
    assert!(!models.join("preview.gltf").exists());

    // Smooth dice keep their place in the row
    assert_eq!(factory.scene().objects().len(), 2);
    let red = factory.scene().object("D6_Dice_Red").unwrap();
    let white = factory.scene().object("D6_Dice_White").unwrap();
    assert_eq!(red.translation.x, 0.0);
    assert_eq!(white.translation.x, 6.0);

    let summary = inspect(models.join("dice_white.gltf")).unwrap();
    assert_eq!(summary.materials, vec!["Dice_Body_White", "Pip_Material_White"]);
    assert_eq!(summary.images, 0);
}

#[test]
fn test_glb_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Cracked, dir.path());
    config.output.format = ExportFormat::Glb;
    config.select_colors(&["Black"]).unwrap();

    let report = DiceFactory::new(config).unwrap().run().unwrap();
    let result = report.exported().next().unwrap();

    assert_eq!(result.files.len(), 1);
    assert!(result.path.ends_with("0_dice_black_cracked.glb"));

    let summary = inspect(&result.path).unwrap();
    assert_eq!(summary.images, 1);
    assert_eq!(summary.primitives, 2);
}

#[test]
fn test_generation_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Cracked, dir.path());
    config.output.write_preview = false;
    config.select_colors(&["Red"]).unwrap();

    let mut factory = DiceFactory::new(config).unwrap();
    let first = factory.run().unwrap();
    let second = factory.run().unwrap();

    let a = first.exported().next().unwrap();
    let b = second.exported().next().unwrap();
    assert_eq!(a.triangle_count, b.triangle_count);
    assert_eq!(a.vertex_count, b.vertex_count);
}

fn camera_translation(path: &Path) -> [f32; 3] {
    let (doc, _, _) = gltf::import(path).unwrap();
    let node = doc.nodes().find(|n| n.camera().is_some()).unwrap();
    node.transform().decomposed().0
}

#[test]
fn test_axis_conversion_follows_output_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(Variant::Cracked, dir.path());
    config.select_colors(&["Red"]).unwrap();

    let report = DiceFactory::new(config.clone()).unwrap().run().unwrap();
    let converted = camera_translation(&report.preview.unwrap().path);
    // Camera sits at (5, -5, 4) Z-up
    assert_relative_eq!(converted[0], 5.0, epsilon = 1e-5);
    assert_relative_eq!(converted[1], 4.0, epsilon = 1e-5);
    assert_relative_eq!(converted[2], 5.0, epsilon = 1e-5);

    config.output.z_up_to_y_up = false;
    let report = DiceFactory::new(config).unwrap().run().unwrap();
    let native = camera_translation(&report.preview.unwrap().path);
    assert_relative_eq!(native[0], 5.0, epsilon = 1e-5);
    assert_relative_eq!(native[1], -5.0, epsilon = 1e-5);
    assert_relative_eq!(native[2], 4.0, epsilon = 1e-5);
}

#[test]
fn test_inspect_missing_file() {
    assert!(inspect("/nonexistent/dice.gltf").is_err());
}
