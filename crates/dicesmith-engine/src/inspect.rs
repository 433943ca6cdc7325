//! Reading written assets back for a summary

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// What a glTF/GLB file contains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSummary {
    pub nodes: Vec<String>,
    pub meshes: usize,
    pub primitives: usize,
    pub materials: Vec<String>,
    pub images: usize,
    pub cameras: usize,
    pub lights: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl fmt::Display for AssetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes:      {}", self.nodes.join(", "))?;
        writeln!(f, "Meshes:     {} ({} primitives)", self.meshes, self.primitives)?;
        writeln!(f, "Materials:  {}", self.materials.join(", "))?;
        writeln!(f, "Images:     {}", self.images)?;
        writeln!(f, "Cameras:    {}", self.cameras)?;
        writeln!(f, "Lights:     {}", self.lights)?;
        writeln!(f, "Vertices:   {}", self.vertex_count)?;
        write!(f, "Triangles:  {}", self.triangle_count)
    }
}

/// Load a glTF/GLB file with its buffers and images and summarize it
pub fn inspect(path: impl AsRef<Path>) -> Result<AssetSummary> {
    let path = path.as_ref();
    let (document, _buffers, images) =
        gltf::import(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut summary = AssetSummary {
        nodes: document
            .nodes()
            .map(|n| n.name().unwrap_or("<unnamed>").to_string())
            .collect(),
        meshes: document.meshes().count(),
        materials: document
            .materials()
            .map(|m| m.name().unwrap_or("<unnamed>").to_string())
            .collect(),
        images: images.len(),
        cameras: document.cameras().count(),
        lights: document.lights().map_or(0, |lights| lights.count()),
        ..AssetSummary::default()
    };

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            summary.primitives += 1;
            let vertices = primitive
                .get(&gltf::Semantic::Positions)
                .map_or(0, |a| a.count());
            summary.vertex_count += vertices;
            // Non-indexed primitives draw their vertices in order
            let indices = primitive.indices().map_or(vertices, |a| a.count());
            summary.triangle_count += indices / 3;
        }
    }

    Ok(summary)
}
