//! Generation parameters
//!
//! Everything that shapes a run lives in [`DiceConfig`]: geometry, crack
//! shading, material finish, the color palette, output locations and the
//! preview stage. Two presets reproduce the two supported looks; a TOML file
//! only needs to list what it changes, the rest comes from the preset named
//! by its `variant` key.

use dicesmith_core::export::ExportFormat;
use dicesmith_core::mesh::MeshConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors from loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown variant '{0}' (expected 'cracked' or 'smooth')")]
    UnknownVariant(String),

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be between 0 and 1 (exclusive), got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("Resolution {value} exceeds the maximum of {max}")]
    ResolutionTooLarge { value: u32, max: u32 },

    #[error("Bevel amount {bevel} must be smaller than half the die size {half}")]
    BevelTooLarge { bevel: f32, half: f32 },

    #[error("Pip depth {depth} must be smaller than half the die size {half}")]
    PipTooDeep { depth: f32, half: f32 },

    #[error("Pips reach {extent} from the face center but the flat face ends at {limit}")]
    PipsOutsideFace { extent: f32, limit: f32 },

    #[error("Palette is empty")]
    EmptyPalette,

    #[error("Palette color name must not be empty")]
    EmptyColorName,

    #[error("Color name '{0}' may only contain letters, digits, spaces, '-' and '_'")]
    InvalidColorName(String),

    #[error("Palette lists '{0}' more than once")]
    DuplicateColor(String),

    #[error("Color '{0}' is not in the palette")]
    UnknownColor(String),
}

/// Which of the two dice looks to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Chamfered edges, crack normal map, one file per die as it is built
    #[default]
    Cracked,
    /// Rounded edges, plain finish, dice laid out in a row and exported last
    Smooth,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Cracked, Variant::Smooth];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cracked => "cracked",
            Self::Smooth => "smooth",
        }
    }

    /// Scene object name of the finished die
    pub fn object_name(self, color: &str) -> String {
        match self {
            Self::Cracked => format!("D6_{color}_Final"),
            Self::Smooth => format!("D6_Dice_{color}"),
        }
    }

    pub fn body_material_name(self, color: &str) -> String {
        match self {
            Self::Cracked => format!("BodyMat_{color}"),
            Self::Smooth => format!("Dice_Body_{color}"),
        }
    }

    pub fn pip_material_name(self, color: &str) -> String {
        match self {
            Self::Cracked => format!("PipMat_{color}"),
            Self::Smooth => format!("Pip_Material_{color}"),
        }
    }

    /// Output file stem for one color
    pub fn file_stem(self, color: &str) -> String {
        let lower = color.to_lowercase();
        match self {
            Self::Cracked => format!("0_dice_{lower}_cracked"),
            Self::Smooth => format!("dice_{lower}"),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cracked" => Ok(Self::Cracked),
            "smooth" => Ok(Self::Smooth),
            _ => Err(ConfigError::UnknownVariant(s.to_string())),
        }
    }
}

/// Die body and pip dimensions, in scene units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Edge length of the die
    pub dice_size: f32,
    /// Edge length of a pip cutter cube
    pub pip_size: f32,
    /// How far the pip cutters reach below the face
    pub pip_depth: f32,
    /// Distance between neighboring pip centers on a face
    pub pip_spacing: f32,
    /// Bevel width along each face
    pub bevel_amount: f32,
    /// 1 = flat chamfer, 2 or more = rounded
    pub bevel_segments: u32,
    /// Fill cube edge as a fraction of `pip_size`
    pub fill_scale: f32,
    /// Fill depth below the face as a fraction of `pip_depth`
    pub fill_inset: f32,
    /// Distance between dice in the row, in multiples of `dice_size`
    pub row_spacing: f32,
    /// Surface extraction cells along each axis
    pub resolution: u32,
}

/// Crack normal-map parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackConfig {
    pub enabled: bool,
    /// Voronoi cells per UV unit; larger gives finer cracks
    pub scale: f32,
    /// Bump strength
    pub depth: f32,
    /// Body roughness once cracks are applied
    pub roughness: f32,
    /// Edge distance below which the surface is fully cracked
    pub edge_start: f32,
    /// Edge distance above which the surface is untouched
    pub edge_end: f32,
    pub seed: u32,
    /// Perlin wobble of the crack lines, in cell units
    pub jitter: f32,
    /// Edge length of the baked normal map
    pub texture_size: u32,
}

/// Material factors shared by every color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishConfig {
    pub body_roughness: f32,
    pub body_metallic: f32,
    pub pip_roughness: f32,
    pub pip_metallic: f32,
}

/// One palette color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    pub name: String,
    /// Body base color, linear RGBA
    pub body: [f32; 4],
    /// Pip base color, linear RGBA
    pub pip: [f32; 4],
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ColorEntry {
    pub fn new(name: impl Into<String>, body: [f32; 4], pip: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            body,
            pip,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where files go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Project root; per-color files go to `{project_dir}/{models_dir}`
    pub project_dir: PathBuf,
    pub models_dir: PathBuf,
    pub format: ExportFormat,
    /// Also write the whole staged scene to `{models_dir}/preview.{ext}`
    pub write_preview: bool,
    /// Rotate the Z-up scene into glTF's Y-up frame on export
    #[serde(default = "default_true")]
    pub z_up_to_y_up: bool,
}

/// A directional light of the preview stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunConfig {
    pub name: String,
    pub location: [f32; 3],
    /// XYZ Euler angles in degrees
    pub rotation: [f32; 3],
    pub energy: f32,
}

/// The preview camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub location: [f32; 3],
    /// XYZ Euler angles in degrees
    pub rotation: [f32; 3],
    pub focal_length: f32,
    pub sensor_width: f32,
    pub aspect_ratio: f32,
}

/// Lights and camera placed after the dice are built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub lights: Vec<SunConfig>,
    pub camera: CameraConfig,
}

/// Complete configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceConfig {
    pub variant: Variant,
    pub geometry: GeometryConfig,
    pub cracks: CrackConfig,
    pub finish: FinishConfig,
    pub palette: Vec<ColorEntry>,
    pub output: OutputConfig,
    pub stage: StageConfig,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self::cracked()
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

fn camera() -> CameraConfig {
    CameraConfig {
        name: "Camera".to_string(),
        location: [5.0, -5.0, 4.0],
        rotation: [65.0, 0.0, 45.0],
        focal_length: 50.0,
        sensor_width: 36.0,
        aspect_ratio: 16.0 / 9.0,
    }
}

impl DiceConfig {
    /// Chamfered dice with cracks, each exported as soon as it is built
    pub fn cracked() -> Self {
        Self {
            variant: Variant::Cracked,
            geometry: GeometryConfig {
                dice_size: 2.0,
                pip_size: 0.35,
                pip_depth: 0.25,
                pip_spacing: 0.5,
                bevel_amount: 0.08,
                bevel_segments: 1,
                fill_scale: 0.9,
                fill_inset: 0.7,
                row_spacing: 0.0,
                resolution: 128,
            },
            cracks: CrackConfig {
                enabled: true,
                scale: 3.5,
                depth: 2.0,
                roughness: 0.9,
                edge_start: 0.02,
                edge_end: 0.05,
                seed: 0,
                jitter: 0.0,
                texture_size: 512,
            },
            finish: FinishConfig {
                body_roughness: 0.3,
                body_metallic: 0.0,
                pip_roughness: 0.4,
                pip_metallic: 0.0,
            },
            palette: vec![
                ColorEntry::new("Red", [1.0, 0.0, 0.0, 1.0], WHITE),
                ColorEntry::new("Blue", [0.0, 0.0, 1.0, 1.0], WHITE),
                ColorEntry::new("Green", [0.0, 1.0, 0.0, 1.0], BLACK),
                ColorEntry::new("White", WHITE, BLACK),
                ColorEntry::new("Black", BLACK, WHITE),
            ],
            output: OutputConfig {
                project_dir: PathBuf::from("."),
                models_dir: PathBuf::from("assets/models_cracked_normal"),
                format: ExportFormat::Gltf,
                write_preview: true,
                z_up_to_y_up: true,
            },
            stage: StageConfig {
                lights: vec![SunConfig {
                    name: "Sun".to_string(),
                    location: [5.0, -5.0, 8.0],
                    rotation: [0.0, 0.0, 0.0],
                    energy: 3.0,
                }],
                camera: camera(),
            },
        }
    }

    /// Rounded, uncracked dice in a row, exported together at the end
    pub fn smooth() -> Self {
        let base = Self::cracked();
        Self {
            variant: Variant::Smooth,
            geometry: GeometryConfig {
                bevel_segments: 2,
                row_spacing: 3.0,
                ..base.geometry
            },
            cracks: CrackConfig {
                enabled: false,
                ..base.cracks
            },
            finish: FinishConfig {
                body_roughness: 0.3,
                body_metallic: 0.1,
                pip_roughness: 0.4,
                pip_metallic: 0.0,
            },
            palette: vec![
                ColorEntry::new("Red", [1.0, 0.0, 0.0, 1.0], BLACK),
                ColorEntry::new("Blue", [0.0, 0.0, 1.0, 1.0], BLACK),
                ColorEntry::new("Green", [0.0, 1.0, 0.0, 1.0], BLACK),
                ColorEntry::new("White", WHITE, BLACK),
                ColorEntry::new("Black", [0.1, 0.1, 0.1, 1.0], WHITE),
            ],
            output: OutputConfig {
                models_dir: PathBuf::from("assets/models"),
                ..base.output
            },
            stage: StageConfig {
                lights: vec![
                    SunConfig {
                        name: "Sun".to_string(),
                        location: [5.0, -5.0, 8.0],
                        rotation: [45.0, 0.0, 45.0],
                        energy: 3.0,
                    },
                    SunConfig {
                        name: "Fill".to_string(),
                        location: [-3.0, 3.0, 6.0],
                        rotation: [60.0, 0.0, -135.0],
                        energy: 1.0,
                    },
                ],
                camera: camera(),
            },
        }
    }

    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Cracked => Self::cracked(),
            Variant::Smooth => Self::smooth(),
        }
    }

    /// Load a TOML file on top of the preset named by its `variant` key
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text on top of the preset named by its `variant` key
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let overlay: toml::Table = toml::from_str(text)?;
        let variant = match overlay.get("variant") {
            Some(toml::Value::String(name)) => name.parse()?,
            Some(other) => return Err(ConfigError::UnknownVariant(other.to_string())),
            None => Variant::default(),
        };

        let mut merged = toml::Value::try_from(Self::preset(variant))?;
        if let toml::Value::Table(base) = &mut merged {
            merge_tables(base, overlay);
        }

        let config: Self = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Directory that receives per-color files
    pub fn models_dir(&self) -> PathBuf {
        self.output.project_dir.join(&self.output.models_dir)
    }

    /// Output file for one color
    pub fn output_path(&self, color: &str) -> PathBuf {
        self.models_dir().join(format!(
            "{}.{}",
            self.variant.file_stem(color),
            self.output.format.extension()
        ))
    }

    pub fn preview_path(&self) -> PathBuf {
        self.models_dir()
            .join(format!("preview.{}", self.output.format.extension()))
    }

    /// Palette entries that will be built, in palette order
    pub fn enabled_colors(&self) -> impl Iterator<Item = &ColorEntry> {
        self.palette.iter().filter(|c| c.enabled)
    }

    pub fn color(&self, name: &str) -> Option<&ColorEntry> {
        self.palette
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Build only the named colors; the rest of the palette stays known but
    /// disabled
    pub fn select_colors<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), ConfigError> {
        for name in names {
            let name = name.as_ref();
            if self.color(name).is_none() {
                return Err(ConfigError::UnknownColor(name.to_string()));
            }
        }
        for entry in &mut self.palette {
            entry.enabled = names
                .iter()
                .any(|n| n.as_ref().eq_ignore_ascii_case(&entry.name));
        }
        Ok(())
    }

    /// Check that the parameters describe a buildable die
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_finite()?;

        let g = &self.geometry;
        positive("geometry.dice_size", g.dice_size)?;
        positive("geometry.pip_size", g.pip_size)?;
        positive("geometry.pip_depth", g.pip_depth)?;
        positive("geometry.resolution", g.resolution as f32)?;
        if g.resolution > MeshConfig::MAX_RESOLUTION {
            return Err(ConfigError::ResolutionTooLarge {
                value: g.resolution,
                max: MeshConfig::MAX_RESOLUTION,
            });
        }
        if g.pip_spacing < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "geometry.pip_spacing",
                value: f64::from(g.pip_spacing),
            });
        }

        let half = g.dice_size * 0.5;
        if g.bevel_amount < 0.0 || g.bevel_amount >= half {
            return Err(ConfigError::BevelTooLarge {
                bevel: g.bevel_amount,
                half,
            });
        }
        if g.pip_depth >= half {
            return Err(ConfigError::PipTooDeep {
                depth: g.pip_depth,
                half,
            });
        }
        let extent = g.pip_spacing + g.pip_size * 0.5;
        let limit = half - g.bevel_amount;
        if extent > limit {
            return Err(ConfigError::PipsOutsideFace { extent, limit });
        }
        unit_range("geometry.fill_inset", g.fill_inset)?;
        if g.fill_scale <= 0.0 || g.fill_scale > 1.0 {
            return Err(ConfigError::OutOfUnitRange {
                field: "geometry.fill_scale",
                value: g.fill_scale,
            });
        }

        if self.cracks.enabled {
            positive("cracks.scale", self.cracks.scale)?;
            positive("cracks.texture_size", self.cracks.texture_size as f32)?;
        }

        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for (i, entry) in self.palette.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::EmptyColorName);
            }
            // The name ends up in file names under models_dir
            if !entry
                .name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
            {
                return Err(ConfigError::InvalidColorName(entry.name.clone()));
            }
            if self.palette[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&entry.name))
            {
                return Err(ConfigError::DuplicateColor(entry.name.clone()));
            }
        }

        Ok(())
    }

    fn check_finite(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        let c = &self.cracks;
        let f = &self.finish;
        let scalars = [
            ("geometry.dice_size", g.dice_size),
            ("geometry.pip_size", g.pip_size),
            ("geometry.pip_depth", g.pip_depth),
            ("geometry.pip_spacing", g.pip_spacing),
            ("geometry.bevel_amount", g.bevel_amount),
            ("geometry.fill_scale", g.fill_scale),
            ("geometry.fill_inset", g.fill_inset),
            ("geometry.row_spacing", g.row_spacing),
            ("cracks.scale", c.scale),
            ("cracks.depth", c.depth),
            ("cracks.roughness", c.roughness),
            ("cracks.edge_start", c.edge_start),
            ("cracks.edge_end", c.edge_end),
            ("cracks.jitter", c.jitter),
            ("finish.body_roughness", f.body_roughness),
            ("finish.body_metallic", f.body_metallic),
            ("finish.pip_roughness", f.pip_roughness),
            ("finish.pip_metallic", f.pip_metallic),
            ("stage.camera.focal_length", self.stage.camera.focal_length),
            ("stage.camera.sensor_width", self.stage.camera.sensor_width),
            ("stage.camera.aspect_ratio", self.stage.camera.aspect_ratio),
        ];
        for (field, value) in scalars {
            finite(field, value)?;
        }

        for entry in &self.palette {
            finite_all("palette.body", &entry.body)?;
            finite_all("palette.pip", &entry.pip)?;
        }
        for light in &self.stage.lights {
            finite_all("stage.lights.location", &light.location)?;
            finite_all("stage.lights.rotation", &light.rotation)?;
            finite("stage.lights.energy", light.energy)?;
        }
        finite_all("stage.camera.location", &self.stage.camera.location)?;
        finite_all("stage.camera.rotation", &self.stage.camera.rotation)?;
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn finite_all(field: &'static str, values: &[f32]) -> Result<(), ConfigError> {
    values.iter().try_for_each(|&v| finite(field, v))
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: f64::from(value),
        })
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

/// Overlay `overlay` onto `base`; tables merge key by key, anything else
/// (arrays included) replaces
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(over_table)) => {
                merge_tables(base_table, over_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
