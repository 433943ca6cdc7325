//! Error types for dicesmith-core

use thiserror::Error;

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while modelling or exporting
#[derive(Error, Debug)]
pub enum Error {
    /// Mesh generation failed
    #[error("Mesh generation failed: {0}")]
    MeshGeneration(String),

    /// Export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// glTF JSON serialization error
    #[error("GLTF error: {0}")]
    Json(#[from] serde_json::Error),
}
