//! Scene state shared by one generation run
//!
//! The scene owns every built die, the materials they reference by name, and
//! the preview lights and camera. It is a single mutable value owned by the
//! factory; the run mutates it in place (reset at the start, meshes removed
//! between dice in the cracked variant).

use crate::config::StageConfig;
use dicesmith_core::export::{CameraDesc, GltfBuilder, SunLightDesc};
use dicesmith_core::material::Material;
use dicesmith_core::mesh::Mesh;
use glam::{EulerRot, Quat, Vec3};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when working with scenes
#[derive(Error, Debug)]
pub enum SceneError {
    /// An object with this name already exists
    #[error("Object '{0}' already exists in the scene")]
    DuplicateObject(String),

    /// An object part refers to a material that was never added
    #[error("Object '{object}' uses unknown material '{material}'")]
    MissingMaterial { object: String, material: String },
}

/// One mesh of an object with the name of its material
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub mesh: Mesh,
    pub material: String,
}

/// A named object made of one or more material parts
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub translation: Vec3,
    pub parts: Vec<MeshPart>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, translation: Vec3) -> Self {
        Self {
            name: name.into(),
            translation,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, mesh: Mesh, material: impl Into<String>) -> Self {
        self.parts.push(MeshPart {
            mesh,
            material: material.into(),
        });
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.triangle_count()).sum()
    }
}

/// Rotation from XYZ Euler angles in degrees, applied about the fixed X, then
/// Y, then Z axes
pub fn euler_degrees(rotation: [f32; 3]) -> Quat {
    let [x, y, z] = rotation.map(f32::to_radians);
    Quat::from_euler(EulerRot::ZYX, z, y, x)
}

/// Objects, materials, lights and camera of one run
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    materials: HashMap<String, Material>,
    lights: Vec<SunLightDesc>,
    camera: Option<CameraDesc>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove everything
    pub fn reset(&mut self) {
        self.objects.clear();
        self.materials.clear();
        self.lights.clear();
        self.camera = None;
    }

    /// Add an object; names are unique
    pub fn add_object(&mut self, object: SceneObject) -> Result<(), SceneError> {
        if self.object(&object.name).is_some() {
            return Err(SceneError::DuplicateObject(object.name));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Remove every mesh object, keeping materials, lights and camera
    ///
    /// Returns the number of objects removed.
    pub fn remove_meshes(&mut self) -> usize {
        let removed = self.objects.len();
        self.objects.clear();
        removed
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Add or replace a material by name
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn material_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.get_mut(name)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn add_light(&mut self, light: SunLightDesc) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[SunLightDesc] {
        &self.lights
    }

    pub fn set_camera(&mut self, camera: CameraDesc) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&CameraDesc> {
        self.camera.as_ref()
    }

    /// Place the configured sun lights and camera
    pub fn stage_preview(&mut self, stage: &StageConfig) {
        for sun in &stage.lights {
            self.add_light(SunLightDesc::new(
                sun.name.clone(),
                Vec3::from_array(sun.location),
                euler_degrees(sun.rotation),
                sun.energy,
            ));
        }

        let cam = &stage.camera;
        let mut camera = CameraDesc::perspective(
            cam.name.clone(),
            Vec3::from_array(cam.location),
            euler_degrees(cam.rotation),
        );
        camera.yfov = CameraDesc::yfov_from_lens(cam.focal_length, cam.sensor_width, cam.aspect_ratio);
        camera.aspect_ratio = Some(cam.aspect_ratio);
        self.set_camera(camera);
    }

    /// Collect objects accepted by `filter` into a glTF builder
    ///
    /// Only the materials those objects use are included. Lights and camera
    /// are added when `with_stage` is set.
    pub fn to_gltf<F>(&self, filter: F, with_stage: bool) -> Result<GltfBuilder, SceneError>
    where
        F: Fn(&SceneObject) -> bool,
    {
        let mut builder = GltfBuilder::new();
        let mut material_indices: HashMap<&str, usize> = HashMap::new();

        for object in self.objects.iter().filter(|o| filter(o)) {
            let mut primitives = Vec::with_capacity(object.parts.len());
            for part in &object.parts {
                let index = match material_indices.get(part.material.as_str()) {
                    Some(&index) => index,
                    None => {
                        let material = self.material(&part.material).ok_or_else(|| {
                            SceneError::MissingMaterial {
                                object: object.name.clone(),
                                material: part.material.clone(),
                            }
                        })?;
                        let index = builder.add_material(material);
                        material_indices.insert(part.material.as_str(), index);
                        index
                    }
                };
                primitives.push((&part.mesh, Some(index)));
            }
            builder.add_mesh_node(object.name.clone(), object.translation, &primitives);
        }

        if with_stage {
            if let Some(camera) = &self.camera {
                builder.add_camera(camera.clone());
            }
            for light in &self.lights {
                builder.add_sun(light.clone());
            }
        }

        Ok(builder)
    }
}
