//! Export functionality for meshes and materials

mod gltf_export;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use gltf_export::{CameraDesc, GltfBuilder, GltfExportOptions, SunLightDesc, WrittenFiles};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON with companion `.bin` and `.png` files
    #[default]
    Gltf,
    /// Single binary file
    Glb,
}

impl ExportFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("gltf") {
            Some(Self::Gltf)
        } else if ext.eq_ignore_ascii_case("glb") {
            Some(Self::Glb)
        } else {
            None
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::Gltf => "gltf",
        }
    }
}
