//! dicesmith engine - builds dice and writes them as glTF assets
//!
//! The engine is the orchestration layer over dicesmith-core and
//! dicesmith-layout: it turns a [`DiceConfig`] into dice objects in a
//! [`Scene`], shades them, and exports them the way the configured
//! [`Variant`] asks for.
//!
//! ## Example
//!
//! ```ignore
//! use dicesmith_engine::{DiceConfig, DiceFactory};
//!
//! let mut config = DiceConfig::smooth();
//! config.output.project_dir = "out".into();
//! config.select_colors(&["Red", "White"])?;
//!
//! let report = DiceFactory::new(config)?.run()?;
//! println!("{report}");
//! ```

pub mod config;
pub mod die;
pub mod export;
pub mod inspect;
pub mod scene;
pub mod shading;

use anyhow::{Context, Result};
use glam::Vec3;
use std::fmt;
use tracing::info;

// Re-export commonly used types from dependencies
pub use dicesmith_core::export::{ExportFormat, GltfExportOptions};
pub use dicesmith_layout::PipLayout;

// Re-export our own types
pub use config::{ColorEntry, ConfigError, DiceConfig, Variant};
pub use die::{DieObject, build_die};
pub use export::{ExportOutcome, ExportResult, export_object, export_scene};
pub use inspect::{AssetSummary, inspect};
pub use scene::{Scene, SceneError, SceneObject};

/// Outcome for one color of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieReport {
    pub color: String,
    pub object: String,
    pub outcome: ExportOutcome,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub variant: Variant,
    pub dice: Vec<DieReport>,
    pub preview: Option<ExportResult>,
}

impl RunReport {
    pub fn exported(&self) -> impl Iterator<Item = &ExportResult> {
        self.dice.iter().filter_map(|d| d.outcome.result())
    }

    pub fn missing(&self) -> impl Iterator<Item = &DieReport> {
        self.dice.iter().filter(|d| !d.outcome.is_exported())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} dice:", self.variant)?;
        for die in &self.dice {
            writeln!(f, "  {:<6} {}", die.color, die.outcome)?;
        }
        if let Some(preview) = &self.preview {
            writeln!(f, "Preview: {}", preview)?;
        }
        Ok(())
    }
}

/// Runs one generation pass for a configuration
///
/// The scene is owned here and survives the run, so it can be examined or
/// exported again afterwards.
pub struct DiceFactory {
    config: DiceConfig,
    scene: Scene,
}

impl DiceFactory {
    /// Create a factory for a validated configuration
    pub fn new(config: DiceConfig) -> Result<Self> {
        config.validate().context("Invalid dice configuration")?;
        Ok(Self {
            config,
            scene: Scene::new(),
        })
    }

    pub fn config(&self) -> &DiceConfig {
        &self.config
    }

    /// Scene as left by the last run
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn export_options(&self) -> GltfExportOptions {
        GltfExportOptions::default()
            .with_texture_size(self.config.cracks.texture_size)
            .with_z_up_to_y_up(self.config.output.z_up_to_y_up)
    }

    /// Build, shade and export every enabled color
    pub fn run(&mut self) -> Result<RunReport> {
        let variant = self.config.variant;
        let options = self.export_options();
        let mut dice = Vec::new();

        self.scene.reset();
        info!(
            "Generating {} dice into {}",
            variant,
            self.config.models_dir().display()
        );

        let colors: Vec<ColorEntry> = self.config.enabled_colors().cloned().collect();
        for (index, color) in colors.iter().enumerate() {
            info!("Creating {} die...", color.name);

            if variant == Variant::Cracked && index > 0 {
                self.scene.remove_meshes();
            }

            let g = &self.config.geometry;
            let offset = Vec3::X * (index as f32 * g.dice_size * g.row_spacing);
            let die = build_die(&self.config, color, offset)
                .with_context(|| format!("Failed to build {} die", color.name))?;
            let object = die.name.clone();
            let body_material = die.body_material.name.clone();
            info!("  {} triangles", die.triangle_count());
            die.add_to_scene(&mut self.scene)?;

            if self.config.cracks.enabled {
                shading::apply_cracks(&mut self.scene, &body_material, &self.config.cracks);
            }

            if variant == Variant::Cracked {
                let path = self.config.output_path(&color.name);
                let outcome = export_object(&self.scene, &object, &path, &options)?;
                dice.push(DieReport {
                    color: color.name.clone(),
                    object,
                    outcome,
                });
            }
        }

        self.scene.stage_preview(&self.config.stage);

        if variant == Variant::Smooth {
            // Every palette color is expected, built or not
            let mut names: Vec<&str> =
                self.config.palette.iter().map(|c| c.name.as_str()).collect();
            names.sort_unstable();
            for name in names {
                let object = variant.object_name(name);
                let path = self.config.output_path(name);
                let outcome = export_object(&self.scene, &object, &path, &options)?;
                dice.push(DieReport {
                    color: name.to_string(),
                    object,
                    outcome,
                });
            }
        }

        let preview = if self.config.output.write_preview {
            Some(export_scene(&self.scene, self.config.preview_path(), &options)?)
        } else {
            None
        };

        let report = RunReport {
            variant,
            dice,
            preview,
        };
        info!("Done: {} dice exported", report.exported().count());
        Ok(report)
    }
}
