//! Writing scene objects to glTF files
//!
//! Export looks objects up by name. A missing object is not an error: it is
//! logged and reported so the rest of the run continues.

use crate::scene::Scene;
use anyhow::{Context, Result};
use dicesmith_core::export::{GltfExportOptions, WrittenFiles};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Result of a successful export operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Object that was written
    pub object: String,

    /// Path of the glTF/GLB file
    pub path: PathBuf,

    /// Every file written, companions included
    pub files: WrittenFiles,

    /// Number of vertices over all primitives
    pub vertex_count: usize,

    /// Number of triangles over all primitives
    pub triangle_count: usize,
}

impl std::fmt::Display for ExportResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Exported {} ({} vertices, {} triangles)",
            self.path.display(),
            self.vertex_count,
            self.triangle_count
        )
    }
}

/// What happened to one requested export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported(ExportResult),
    /// The named object was not in the scene; nothing was written
    Missing { object: String, path: PathBuf },
}

impl ExportOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, Self::Exported(_))
    }

    pub fn result(&self) -> Option<&ExportResult> {
        match self {
            Self::Exported(result) => Some(result),
            Self::Missing { .. } => None,
        }
    }
}

impl std::fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exported(result) => result.fmt(f),
            Self::Missing { object, .. } => write!(f, "{object} not found, skipped"),
        }
    }
}

/// Write the named object alone, without lights or camera
pub fn export_object(
    scene: &Scene,
    name: &str,
    path: impl AsRef<Path>,
    options: &GltfExportOptions,
) -> Result<ExportOutcome> {
    let path = path.as_ref();
    let Some(object) = scene.object(name) else {
        error!("❌ {} not found!", name);
        return Ok(ExportOutcome::Missing {
            object: name.to_string(),
            path: path.to_path_buf(),
        });
    };

    let builder = scene.to_gltf(|o| o.name == name, false)?;
    let files = builder
        .write(path, options)
        .with_context(|| format!("Failed to export {name} to {}", path.display()))?;

    let result = ExportResult {
        object: name.to_string(),
        path: path.to_path_buf(),
        files,
        vertex_count: object.vertex_count(),
        triangle_count: object.triangle_count(),
    };
    info!("✅ {}", result);
    Ok(ExportOutcome::Exported(result))
}

/// Write every object in the scene together with its lights and camera
pub fn export_scene(
    scene: &Scene,
    path: impl AsRef<Path>,
    options: &GltfExportOptions,
) -> Result<ExportResult> {
    let path = path.as_ref();
    let builder = scene.to_gltf(|_| true, true)?;
    let files = builder
        .write(path, options)
        .with_context(|| format!("Failed to export scene to {}", path.display()))?;

    let objects = scene.objects();
    let result = ExportResult {
        object: "scene".to_string(),
        path: path.to_path_buf(),
        files,
        vertex_count: objects.iter().map(|o| o.vertex_count()).sum(),
        triangle_count: objects.iter().map(|o| o.triangle_count()).sum(),
    };
    info!("{}", result);
    Ok(result)
}
