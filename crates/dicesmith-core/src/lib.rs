//! # Dicesmith Core
//!
//! The modelling toolkit behind dicesmith: just enough solid modelling,
//! meshing, material and export machinery to build a die.
//!
//! Shapes are Signed Distance Functions (SDFs), so boolean difference is a
//! `max` and bevels are closed-form. Meshes are extracted with surface nets,
//! materials are PBR factors plus baked procedural normal maps, and assets
//! leave as glTF.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dicesmith_core::prelude::*;
//!
//! let body = chamfered_box(Vec3::splat(1.0), 0.08)
//!     .subtract(cube(0.35).translate(0.0, 0.0, 1.125));
//!
//! let mesh = body.to_mesh(MeshConfig::default().with_bounds(Aabb::cube(1.1)))?;
//!
//! let mut gltf = GltfBuilder::new();
//! let mat = gltf.add_material(&Material::pbr().named("Body"));
//! gltf.add_mesh_node("Die", Vec3::ZERO, &[(&mesh, Some(mat))]);
//! gltf.write("die.gltf", &GltfExportOptions::default())?;
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: Arbitrary units, `1.0` = 1 meter on export
//! - **Angles**: Radians, except where a type says degrees
//! - **Coordinate system**: Right-handed, Z-up while modelling; export
//!   converts to glTF's Y-up

pub mod export;
pub mod material;
pub mod mesh;
pub mod sdf;
pub mod texture;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // SDF primitives
    pub use crate::sdf::{Aabb, Sdf, SdfExt, SdfNode, primitives::*, union_all};

    // Texture generation
    pub use crate::texture::{ColorRamp, RampStop, Texture, TextureExt, ToNormal, VoronoiEdge};

    // Mesh generation
    pub use crate::mesh::{Mesh, MeshConfig, SdfToMesh, Vertex};

    // Materials
    pub use crate::material::Material;

    // Export
    pub use crate::export::{
        CameraDesc, ExportFormat, GltfBuilder, GltfExportOptions, SunLightDesc, WrittenFiles,
    };

    // Math (re-export glam)
    pub use glam::{Quat, Vec2, Vec3, Vec4};

    // Error handling
    pub use crate::{Error, Result};
}
