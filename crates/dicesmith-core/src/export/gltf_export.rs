//! glTF 2.0 scene export: meshes with PBR materials, cameras and sun lights
//!
//! Geometry is modelled Z-up and converted to glTF's Y-up on write unless
//! disabled. Normal maps are baked from their procedural textures at write
//! time.

use super::ExportFormat;
use crate::material::{Material, encode_png};
use crate::mesh::Mesh;
use crate::{Error, Result};
use glam::{Quat, Vec3};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const LIGHTS_EXTENSION: &str = "KHR_lights_punctual";

/// Export options for glTF
#[derive(Debug, Clone)]
pub struct GltfExportOptions {
    /// Rotate Z-up geometry, lights and cameras into glTF's Y-up frame
    pub z_up_to_y_up: bool,
    /// Edge length of baked normal maps
    pub texture_size: u32,
    /// Written to `asset.generator`
    pub generator: String,
}

impl Default for GltfExportOptions {
    fn default() -> Self {
        Self {
            z_up_to_y_up: true,
            texture_size: 512,
            generator: concat!("dicesmith ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GltfExportOptions {
    pub fn with_texture_size(mut self, size: u32) -> Self {
        self.texture_size = size;
        self
    }

    pub fn with_z_up_to_y_up(mut self, convert: bool) -> Self {
        self.z_up_to_y_up = convert;
        self
    }
}

/// A perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDesc {
    pub name: String,
    pub translation: Vec3,
    /// Camera looks down its local -Z with +Y up
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub yfov: f32,
    pub aspect_ratio: Option<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl CameraDesc {
    /// 50 mm lens on a 36 mm sensor at 16:9
    pub fn perspective(name: impl Into<String>, translation: Vec3, rotation: Quat) -> Self {
        let aspect = 16.0 / 9.0;
        Self {
            name: name.into(),
            translation,
            rotation,
            yfov: Self::yfov_from_lens(50.0, 36.0, aspect),
            aspect_ratio: Some(aspect),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    /// Vertical field of view of a lens whose sensor width spans the larger
    /// image dimension
    pub fn yfov_from_lens(focal_mm: f32, sensor_mm: f32, aspect: f32) -> f32 {
        let half_sensor = sensor_mm * 0.5 / focal_mm;
        if aspect >= 1.0 {
            2.0 * (half_sensor / aspect).atan()
        } else {
            2.0 * half_sensor.atan()
        }
    }
}

/// A directional light (`KHR_lights_punctual`)
#[derive(Debug, Clone, PartialEq)]
pub struct SunLightDesc {
    pub name: String,
    pub translation: Vec3,
    /// Light shines down its local -Z
    pub rotation: Quat,
    pub color: [f32; 3],
    /// Illuminance in lux
    pub intensity: f32,
}

impl SunLightDesc {
    pub fn new(name: impl Into<String>, translation: Vec3, rotation: Quat, intensity: f32) -> Self {
        Self {
            name: name.into(),
            translation,
            rotation,
            color: [1.0, 1.0, 1.0],
            intensity,
        }
    }
}

/// Files produced by one write, the glTF/GLB itself first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFiles {
    pub files: Vec<PathBuf>,
}

impl WrittenFiles {
    pub fn primary(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }
}

struct PrimitiveDesc {
    mesh: Mesh,
    material: Option<usize>,
}

struct MeshNodeDesc {
    name: String,
    translation: Vec3,
    primitives: Vec<PrimitiveDesc>,
}

/// Collects a scene and writes it as `.gltf` or `.glb`
#[derive(Default)]
pub struct GltfBuilder {
    materials: Vec<Material>,
    nodes: Vec<MeshNodeDesc>,
    cameras: Vec<CameraDesc>,
    lights: Vec<SunLightDesc>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material, returning its index
    pub fn add_material(&mut self, material: &Material) -> usize {
        self.materials.push(material.clone());
        self.materials.len() - 1
    }

    /// Add a node holding one mesh made of several primitives, each with its
    /// own material. Empty meshes are dropped.
    pub fn add_mesh_node(
        &mut self,
        name: impl Into<String>,
        translation: Vec3,
        primitives: &[(&Mesh, Option<usize>)],
    ) -> usize {
        self.nodes.push(MeshNodeDesc {
            name: name.into(),
            translation,
            primitives: primitives
                .iter()
                .filter(|(mesh, _)| !mesh.is_empty())
                .map(|&(mesh, material)| PrimitiveDesc {
                    mesh: mesh.clone(),
                    material,
                })
                .collect(),
        });
        self.nodes.len() - 1
    }

    pub fn add_camera(&mut self, camera: CameraDesc) {
        self.cameras.push(camera);
    }

    pub fn add_sun(&mut self, light: SunLightDesc) {
        self.lights.push(light);
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len() + self.cameras.len() + self.lights.len()
    }

    /// Write the scene, choosing the format from the file extension
    ///
    /// `.gltf` writes `{stem}.bin` and one `{stem}_{material}_normal.png` per
    /// normal-mapped material next to it; `.glb` embeds everything.
    pub fn write(&self, path: impl AsRef<Path>, options: &GltfExportOptions) -> Result<WrittenFiles> {
        let path = path.as_ref();
        let format = ExportFormat::from_extension(path).ok_or_else(|| {
            Error::Export(format!("unsupported export extension: {}", path.display()))
        })?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Export(format!("invalid output path: {}", path.display())))?;
        let parent = path.parent().unwrap_or(Path::new(""));
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }

        let textures = self.bake_normal_maps(stem, options.texture_size)?;
        let (document, buffer) = self.build_document(format, stem, &textures, options);

        let mut written = WrittenFiles::default();
        match format {
            ExportFormat::Glb => {
                let json = serde_json::to_vec(&document)?;
                std::fs::write(path, glb_bytes(&json, &buffer))?;
                written.files.push(path.to_path_buf());
            }
            ExportFormat::Gltf => {
                std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
                written.files.push(path.to_path_buf());

                let bin_path = parent.join(format!("{stem}.bin"));
                std::fs::write(&bin_path, &buffer)?;
                written.files.push(bin_path);

                for texture in &textures {
                    let tex_path = parent.join(&texture.file_name);
                    std::fs::write(&tex_path, &texture.png)?;
                    written.files.push(tex_path);
                }
            }
        }

        Ok(written)
    }

    fn bake_normal_maps(&self, stem: &str, size: u32) -> Result<Vec<BakedTexture>> {
        let mut used = HashSet::new();
        let mut baked = Vec::new();

        for (material_index, material) in self.materials.iter().enumerate() {
            let Some(image) = material.rasterize_normal(size) else {
                continue;
            };
            let mut file_name = format!("{stem}_{}_normal.png", sanitize(&material.name));
            if !used.insert(file_name.clone()) {
                file_name = format!("{stem}_{}_{material_index}_normal.png", sanitize(&material.name));
                used.insert(file_name.clone());
            }
            baked.push(BakedTexture {
                material_index,
                file_name,
                png: encode_png(&image)?,
            });
        }

        Ok(baked)
    }

    #[allow(clippy::too_many_lines)]
    fn build_document(
        &self,
        format: ExportFormat,
        stem: &str,
        textures: &[BakedTexture],
        options: &GltfExportOptions,
    ) -> (Value, Vec<u8>) {
        let axis = if options.z_up_to_y_up {
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)
        } else {
            Quat::IDENTITY
        };

        let mut bin = BinBuffer::default();
        let mut accessors = Vec::new();
        let mut meshes = Vec::new();
        let mut nodes = Vec::new();

        // === Meshes ===
        for node in &self.nodes {
            let mut node_json = json!({
                "name": node.name,
                "translation": (axis * node.translation).to_array(),
            });

            if !node.primitives.is_empty() {
                let primitives: Vec<Value> = node
                    .primitives
                    .iter()
                    .map(|prim| {
                        let mut p = write_primitive(&prim.mesh, axis, &mut bin, &mut accessors);
                        if let Some(material) = prim.material {
                            p["material"] = json!(material);
                        }
                        p
                    })
                    .collect();
                node_json["mesh"] = json!(meshes.len());
                meshes.push(json!({ "name": node.name, "primitives": primitives }));
            }
            nodes.push(node_json);
        }

        // === Cameras ===
        let mut cameras = Vec::new();
        for (i, camera) in self.cameras.iter().enumerate() {
            let mut perspective = json!({
                "yfov": camera.yfov,
                "znear": camera.znear,
                "zfar": camera.zfar,
            });
            if let Some(aspect) = camera.aspect_ratio {
                perspective["aspectRatio"] = json!(aspect);
            }
            cameras.push(json!({
                "name": camera.name,
                "type": "perspective",
                "perspective": perspective,
            }));
            nodes.push(json!({
                "name": camera.name,
                "camera": i,
                "translation": (axis * camera.translation).to_array(),
                "rotation": (axis * camera.rotation).normalize().to_array(),
            }));
        }

        // === Lights ===
        let mut lights = Vec::new();
        for (i, light) in self.lights.iter().enumerate() {
            lights.push(json!({
                "name": light.name,
                "type": "directional",
                "color": light.color,
                "intensity": light.intensity,
            }));
            nodes.push(json!({
                "name": light.name,
                "translation": (axis * light.translation).to_array(),
                "rotation": (axis * light.rotation).normalize().to_array(),
                "extensions": { LIGHTS_EXTENSION: { "light": i } },
            }));
        }

        // === Materials and textures ===
        let mut images = Vec::new();
        let mut texture_json = Vec::new();
        let mut normal_texture = vec![None; self.materials.len()];
        for texture in textures {
            let image = match format {
                ExportFormat::Glb => json!({
                    "bufferView": bin.push_view(&texture.png, None),
                    "mimeType": "image/png",
                }),
                ExportFormat::Gltf => json!({ "uri": texture.file_name }),
            };
            normal_texture[texture.material_index] = Some(texture_json.len());
            texture_json.push(json!({ "source": images.len(), "sampler": 0 }));
            images.push(image);
        }

        let materials: Vec<Value> = self
            .materials
            .iter()
            .zip(&normal_texture)
            .map(|(material, normal)| {
                let mut m = json!({
                    "name": material.name,
                    "pbrMetallicRoughness": {
                        "baseColorFactor": material.base_color,
                        "metallicFactor": material.metallic,
                        "roughnessFactor": material.roughness,
                    },
                });
                if let Some(index) = normal {
                    m["normalTexture"] = json!({ "index": index, "scale": 1.0 });
                }
                m
            })
            .collect();

        // === Document ===
        let mut buffer = json!({ "byteLength": bin.data.len() });
        if format == ExportFormat::Gltf {
            buffer["uri"] = json!(format!("{stem}.bin"));
        }

        let mut doc = json!({
            "asset": { "version": "2.0", "generator": options.generator },
            "scene": 0,
            "scenes": [{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }],
            "nodes": nodes,
            "buffers": [buffer],
        });
        if !meshes.is_empty() {
            doc["meshes"] = json!(meshes);
            doc["accessors"] = json!(accessors);
        }
        if !bin.views.is_empty() {
            doc["bufferViews"] = json!(bin.views);
        }
        if !materials.is_empty() {
            doc["materials"] = json!(materials);
        }
        if !texture_json.is_empty() {
            doc["textures"] = json!(texture_json);
            doc["images"] = json!(images);
            doc["samplers"] = json!([{
                "magFilter": 9729,  // LINEAR
                "minFilter": 9987,  // LINEAR_MIPMAP_LINEAR
                "wrapS": 33071,     // CLAMP_TO_EDGE
                "wrapT": 33071,
            }]);
        }
        if !cameras.is_empty() {
            doc["cameras"] = json!(cameras);
        }
        if !lights.is_empty() {
            doc["extensionsUsed"] = json!([LIGHTS_EXTENSION]);
            doc["extensions"] = json!({ LIGHTS_EXTENSION: { "lights": lights } });
        }

        (doc, bin.data)
    }
}

struct BakedTexture {
    material_index: usize,
    file_name: String,
    png: Vec<u8>,
}

/// The single binary buffer and the views into it
#[derive(Default)]
struct BinBuffer {
    data: Vec<u8>,
    views: Vec<Value>,
}

impl BinBuffer {
    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
        let padding = (4 - self.data.len() % 4) % 4;
        self.data.extend(std::iter::repeat_n(0u8, padding));

        let mut view = json!({
            "buffer": 0,
            "byteOffset": self.data.len(),
            "byteLength": bytes.len(),
        });
        if let Some(target) = target {
            view["target"] = json!(target);
        }
        self.data.extend_from_slice(bytes);
        self.views.push(view);
        self.views.len() - 1
    }
}

fn write_primitive(
    mesh: &Mesh,
    axis: Quat,
    bin: &mut BinBuffer,
    accessors: &mut Vec<Value>,
) -> Value {
    let positions: Vec<[f32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| (axis * v.position()).to_array())
        .collect();
    let normals: Vec<[f32; 3]> = mesh
        .vertices
        .iter()
        .map(|v| (axis * v.normal()).to_array())
        .collect();
    let uvs: Vec<[f32; 2]> = mesh.vertices.iter().map(|v| v.uv).collect();

    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in &positions {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }

    let count = mesh.vertices.len();
    let mut accessor = |view: usize, component: u32, count: usize, kind: &str| {
        accessors.push(json!({
            "bufferView": view,
            "componentType": component,
            "count": count,
            "type": kind,
        }));
        accessors.len() - 1
    };

    let position_view = bin.push_view(bytemuck::cast_slice(&positions), Some(ARRAY_BUFFER));
    let position = accessor(position_view, FLOAT, count, "VEC3");
    let normal_view = bin.push_view(bytemuck::cast_slice(&normals), Some(ARRAY_BUFFER));
    let normal = accessor(normal_view, FLOAT, count, "VEC3");
    let uv_view = bin.push_view(bytemuck::cast_slice(&uvs), Some(ARRAY_BUFFER));
    let uv = accessor(uv_view, FLOAT, count, "VEC2");
    let index_view = bin.push_view(
        bytemuck::cast_slice(&mesh.indices),
        Some(ELEMENT_ARRAY_BUFFER),
    );
    let indices = accessor(index_view, UNSIGNED_INT, mesh.indices.len(), "SCALAR");

    accessors[position]["min"] = json!(min);
    accessors[position]["max"] = json!(max);

    json!({
        "attributes": { "POSITION": position, "NORMAL": normal, "TEXCOORD_0": uv },
        "indices": indices,
    })
}

/// Assemble a GLB container: header, JSON chunk (space padded), BIN chunk
fn glb_bytes(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let json_padding = (4 - json.len() % 4) % 4;
    let bin_padding = (4 - bin.len() % 4) % 4;
    let json_chunk = json.len() + json_padding;
    let bin_chunk = bin.len() + bin_padding;
    let total = 12 + 8 + json_chunk + 8 + bin_chunk;

    let mut out = Vec::with_capacity(total);

    // GLB header
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    // JSON chunk
    out.extend_from_slice(&(json_chunk as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534A_u32.to_le_bytes()); // "JSON"
    out.extend_from_slice(json);
    out.extend(std::iter::repeat_n(b' ', json_padding));

    // BIN chunk
    out.extend_from_slice(&(bin_chunk as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942_u32.to_le_bytes()); // "BIN\0"
    out.extend_from_slice(bin);
    out.extend(std::iter::repeat_n(0u8, bin_padding));

    out
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::texture::{TextureExt, VoronoiEdge};
    use approx::assert_relative_eq;

    fn builder_with_two_materials() -> GltfBuilder {
        let body = Mesh::cuboid(Vec3::ZERO, Vec3::splat(1.0));
        let pips = Mesh::cuboid(Vec3::new(0.0, 0.0, 1.2), Vec3::splat(0.1));

        let mut gltf = GltfBuilder::new();
        let body_mat = gltf.add_material(
            &Material::pbr()
                .named("BodyMat_Red")
                .albedo_color(0.8, 0.0, 0.0)
                .roughness(0.9)
                .normal(VoronoiEdge::new(3.5).as_normal(2.0)),
        );
        let pip_mat = gltf.add_material(&Material::pbr().named("PipMat_Red").roughness(0.4));
        gltf.add_mesh_node("D6_Red_Final", Vec3::ZERO, &[(&body, Some(body_mat)), (&pips, Some(pip_mat))]);
        gltf
    }

    #[test]
    fn test_yfov_from_lens() {
        // 50 mm on 36 mm, landscape 16:9
        let yfov = CameraDesc::yfov_from_lens(50.0, 36.0, 16.0 / 9.0);
        assert_relative_eq!(yfov.to_degrees(), 22.9, epsilon = 0.1);
        // Portrait keeps the sensor on the vertical
        let portrait = CameraDesc::yfov_from_lens(50.0, 36.0, 0.5);
        assert_relative_eq!(portrait.to_degrees(), 39.6, epsilon = 0.1);
    }

    #[test]
    fn test_write_gltf_with_companions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("0_dice_red_cracked.gltf");
        let options = GltfExportOptions::default().with_texture_size(16);

        let written = builder_with_two_materials().write(&path, &options).unwrap();
        assert_eq!(written.primary(), Some(path.as_path()));
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(Path::exists));
        assert!(dir.path().join("models/0_dice_red_cracked.bin").exists());
        assert!(
            dir.path()
                .join("models/0_dice_red_cracked_bodymat_red_normal.png")
                .exists()
        );

        let (doc, _, images) = gltf::import(&path).unwrap();
        let mesh = doc.meshes().next().unwrap();
        assert_eq!(mesh.primitives().count(), 2);
        let names: Vec<_> = doc.materials().filter_map(|m| m.name().map(str::to_string)).collect();
        assert_eq!(names, vec!["BodyMat_Red", "PipMat_Red"]);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width, 16);

        let body = doc.materials().next().unwrap();
        assert!(body.normal_texture().is_some());
        assert_relative_eq!(body.pbr_metallic_roughness().roughness_factor(), 0.9);
    }

    #[test]
    fn test_z_up_converted_to_y_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tall.glb");

        let mut gltf = GltfBuilder::new();
        let mesh = Mesh::cuboid(Vec3::new(0.0, 0.0, 2.0), Vec3::splat(0.5));
        gltf.add_mesh_node("Tall", Vec3::ZERO, &[(&mesh, None)]);
        gltf.write(&path, &GltfExportOptions::default()).unwrap();

        let (doc, _, _) = gltf::import(&path).unwrap();
        let prim = doc.meshes().next().unwrap().primitives().next().unwrap();
        let bounds = prim.bounding_box();
        // +Z up becomes +Y up; +Y becomes -Z
        assert_relative_eq!(bounds.max[1], 2.5, epsilon = 1e-5);
        assert_relative_eq!(bounds.min[1], 1.5, epsilon = 1e-5);
        assert_relative_eq!(bounds.max[2], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_lights_and_camera() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.gltf");

        let mut gltf = builder_with_two_materials();
        gltf.add_sun(SunLightDesc::new("Sun", Vec3::new(5.0, -5.0, 8.0), Quat::IDENTITY, 3.0));
        gltf.add_camera(CameraDesc::perspective("Camera", Vec3::new(5.0, -5.0, 4.0), Quat::IDENTITY));
        assert_eq!(gltf.node_count(), 3);
        gltf.write(&path, &GltfExportOptions::default().with_texture_size(8))
            .unwrap();

        let json: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["extensionsUsed"], json!(["KHR_lights_punctual"]));
        assert!(json.get("extensionsRequired").is_none());
        assert_eq!(json["extensions"]["KHR_lights_punctual"]["lights"][0]["intensity"], json!(3.0));

        // A sun pointing straight down in Z-up points down -Y after conversion
        let sun = &json["nodes"][2];
        let q: Vec<f32> = serde_json::from_value(sun["rotation"].clone()).unwrap();
        let rotation = Quat::from_xyzw(q[0], q[1], q[2], q[3]);
        let dir_y_up = rotation * Vec3::NEG_Z;
        assert_relative_eq!(dir_y_up.y, -1.0, epsilon = 1e-5);
        let t: Vec<f32> = serde_json::from_value(sun["translation"].clone()).unwrap();
        assert_relative_eq!(t[0], 5.0, epsilon = 1e-5);
        assert_relative_eq!(t[1], 8.0, epsilon = 1e-5);
        assert_relative_eq!(t[2], 5.0, epsilon = 1e-5);

        let (doc, _, _) = gltf::import(&path).unwrap();
        assert_eq!(doc.cameras().count(), 1);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = GltfBuilder::new()
            .write(dir.path().join("x.obj"), &GltfExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Export(_)));
    }
}
