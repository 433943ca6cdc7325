//! Dicesmith Layout - Pip and face lookup tables for six-sided dice
//!
//! Everything here is a constant lookup shared read-only by every die a run
//! produces. The tables describe where pips go; the modelling crates decide
//! what to put there.
//!
//! # Conventions
//!
//! - Right-handed, Z-up (the glTF writer converts to Y-up on export)
//! - Pip offsets are face-plane coordinates measured from the face center
//! - Rotation triples are XYZ Euler angles in **degrees**
//!
//! # Example
//!
//! ```rust
//! use dicesmith_layout::{PipLayout, pip_offsets};
//!
//! let five = pip_offsets(5, 0.5).unwrap();
//! assert_eq!(five.len(), 5);
//!
//! let layout = PipLayout::new(2.0, 0.25, 0.5);
//! assert_eq!(layout.placements().len(), 21);
//! ```

use glam::{EulerRot, IVec3, Quat, Vec2, Vec3};
use thiserror::Error;

/// Number of faces on the die
pub const FACE_COUNT: usize = 6;

/// Errors from table lookups
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Face value outside 1..=6
    #[error("Invalid face value {0}: expected 1..=6")]
    InvalidFace(u8),

    /// Normal that is not one of the six axis directions
    #[error("Normal {0:?} is not a unit axis direction")]
    InvalidNormal(IVec3),
}

/// Result type alias for layout lookups
pub type Result<T> = std::result::Result<T, LayoutError>;

/// One face of the die: its value, outward normal and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Number of pips shown on this face
    pub value: u8,
    /// Outward unit normal
    pub normal: IVec3,
    /// XYZ Euler rotation (degrees) that turns +Z onto `normal`
    pub rotation: [f32; 3],
}

impl Face {
    /// Outward normal as a float vector
    pub fn normal_f32(&self) -> Vec3 {
        self.normal.as_vec3()
    }

    /// Orientation quaternion built from the rotation triple, applied about
    /// the fixed X, then Y, then Z axes
    pub fn orientation(&self) -> Quat {
        let [x, y, z] = self.rotation.map(f32::to_radians);
        Quat::from_euler(EulerRot::ZYX, z, y, x)
    }
}

/// Faces in generation order. Opposite faces sum to seven.
pub const FACES: [Face; FACE_COUNT] = [
    Face {
        value: 1,
        normal: IVec3::new(0, 0, 1),
        rotation: [0.0, 0.0, 0.0],
    },
    Face {
        value: 6,
        normal: IVec3::new(0, 0, -1),
        rotation: [180.0, 0.0, 0.0],
    },
    Face {
        value: 2,
        normal: IVec3::new(1, 0, 0),
        rotation: [0.0, 90.0, 0.0],
    },
    Face {
        value: 5,
        normal: IVec3::new(-1, 0, 0),
        rotation: [0.0, -90.0, 0.0],
    },
    Face {
        value: 3,
        normal: IVec3::new(0, 1, 0),
        rotation: [-90.0, 0.0, 0.0],
    },
    Face {
        value: 4,
        normal: IVec3::new(0, -1, 0),
        rotation: [90.0, 0.0, 0.0],
    },
];

/// Look up a face by its value
pub fn face(value: u8) -> Result<&'static Face> {
    FACES
        .iter()
        .find(|f| f.value == value)
        .ok_or(LayoutError::InvalidFace(value))
}

// Pip patterns as unit grid steps; scaled by the pip spacing on lookup.
const PATTERN_1: &[[i8; 2]] = &[[0, 0]];
const PATTERN_2: &[[i8; 2]] = &[[-1, 1], [1, -1]];
const PATTERN_3: &[[i8; 2]] = &[[-1, 1], [0, 0], [1, -1]];
const PATTERN_4: &[[i8; 2]] = &[[-1, 1], [1, 1], [-1, -1], [1, -1]];
const PATTERN_5: &[[i8; 2]] = &[[-1, 1], [1, 1], [0, 0], [-1, -1], [1, -1]];
const PATTERN_6: &[[i8; 2]] = &[[-1, 1], [1, 1], [-1, 0], [1, 0], [-1, -1], [1, -1]];

/// Unit-grid pip pattern for a face value
pub fn pip_pattern(value: u8) -> Result<&'static [[i8; 2]]> {
    match value {
        1 => Ok(PATTERN_1),
        2 => Ok(PATTERN_2),
        3 => Ok(PATTERN_3),
        4 => Ok(PATTERN_4),
        5 => Ok(PATTERN_5),
        6 => Ok(PATTERN_6),
        other => Err(LayoutError::InvalidFace(other)),
    }
}

/// Ordered pip centers for a face value, in face-plane coordinates
pub fn pip_offsets(value: u8, spacing: f32) -> Result<Vec<Vec2>> {
    Ok(pip_pattern(value)?
        .iter()
        .map(|&[x, y]| Vec2::new(f32::from(x), f32::from(y)) * spacing)
        .collect())
}

/// Map a face-plane offset and a height along the normal to a 3D point.
///
/// The mapping is axis-wise, not rotational: ±Z faces use (px, py),
/// ±X faces use (py, pz) = (px, py), ±Y faces use (px, pz) = (px, py).
pub fn face_point(normal: IVec3, offset: Vec2, height: f32) -> Result<Vec3> {
    let Vec2 { x: px, y: py } = offset;
    match (normal.x, normal.y, normal.z) {
        (0, 0, s @ (1 | -1)) => Ok(Vec3::new(px, py, s as f32 * height)),
        (s @ (1 | -1), 0, 0) => Ok(Vec3::new(s as f32 * height, px, py)),
        (0, s @ (1 | -1), 0) => Ok(Vec3::new(px, s as f32 * height, py)),
        _ => Err(LayoutError::InvalidNormal(normal)),
    }
}

/// A single pip, positioned on the die
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipPlacement {
    /// Face value this pip belongs to
    pub face: u8,
    /// Face-plane offset from the face center
    pub offset: Vec2,
    /// Center of the cube subtracted from the body
    pub cutter_center: Vec3,
    /// Center of the inset cube that fills the hole
    pub fill_center: Vec3,
}

/// Geometric parameters that turn the tables into 3D positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipLayout {
    /// Edge length of the die body
    pub dice_size: f32,
    /// How far pip cutters reach past the face
    pub pip_depth: f32,
    /// Distance between neighbouring pips
    pub pip_spacing: f32,
    /// Fraction of `pip_depth` the fill sits below the face
    pub fill_inset: f32,
}

impl PipLayout {
    /// Default fill inset fraction
    pub const DEFAULT_FILL_INSET: f32 = 0.7;

    pub fn new(dice_size: f32, pip_depth: f32, pip_spacing: f32) -> Self {
        Self {
            dice_size,
            pip_depth,
            pip_spacing,
            fill_inset: Self::DEFAULT_FILL_INSET,
        }
    }

    pub fn with_fill_inset(mut self, fill_inset: f32) -> Self {
        self.fill_inset = fill_inset;
        self
    }

    /// Half the die edge: distance from center to any face
    pub fn half_size(&self) -> f32 {
        self.dice_size * 0.5
    }

    /// Height of cutter centers above the die center
    pub fn cutter_height(&self) -> f32 {
        self.half_size() + self.pip_depth * 0.5
    }

    /// Height of fill centers above the die center
    pub fn fill_height(&self) -> f32 {
        self.half_size() - self.pip_depth * self.fill_inset
    }

    /// All pips of all faces, in face order then pattern order
    pub fn placements(&self) -> Vec<PipPlacement> {
        let cutter = self.cutter_height();
        let fill = self.fill_height();

        FACES
            .iter()
            .flat_map(|face| {
                // FACES only holds valid values and axis normals
                let offsets = pip_offsets(face.value, self.pip_spacing).unwrap_or_default();
                offsets.into_iter().filter_map(move |offset| {
                    Some(PipPlacement {
                        face: face.value,
                        offset,
                        cutter_center: face_point(face.normal, offset, cutter).ok()?,
                        fill_center: face_point(face.normal, offset, fill).ok()?,
                    })
                })
            })
            .collect()
    }

    /// Total pip count over all faces
    pub fn pip_count(&self) -> usize {
        FACES.iter().map(|f| f.value as usize).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_pip_count_matches_face_value() {
        for value in 1..=6u8 {
            let offsets = pip_offsets(value, 0.5).unwrap();
            assert_eq!(offsets.len(), value as usize, "face {value}");
        }
    }

    #[test]
    fn test_invalid_face_values() {
        assert_eq!(pip_offsets(0, 0.5), Err(LayoutError::InvalidFace(0)));
        assert_eq!(pip_offsets(7, 0.5), Err(LayoutError::InvalidFace(7)));
        assert!(face(9).is_err());
    }

    #[test]
    fn test_offsets_scale_with_spacing() {
        let six = pip_offsets(6, 0.25).unwrap();
        assert_eq!(six[0], Vec2::new(-0.25, 0.25));
        assert_eq!(six[3], Vec2::new(0.25, 0.0));
        assert_eq!(pip_offsets(1, 3.0).unwrap(), vec![Vec2::ZERO]);
    }

    #[test]
    fn test_normals_cover_each_axis_once() {
        let normals: HashSet<IVec3> = FACES.iter().map(|f| f.normal).collect();
        assert_eq!(normals.len(), FACE_COUNT);

        let expected: HashSet<IVec3> = [
            IVec3::X,
            IVec3::NEG_X,
            IVec3::Y,
            IVec3::NEG_Y,
            IVec3::Z,
            IVec3::NEG_Z,
        ]
        .into_iter()
        .collect();
        assert_eq!(normals, expected);

        for f in &FACES {
            assert_eq!(f.normal.abs().element_sum(), 1, "face {} not unit", f.value);
        }
    }

    #[test]
    fn test_values_are_a_permutation() {
        let mut values: Vec<u8> = FACES.iter().map(|f| f.value).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_opposite_faces_sum_to_seven() {
        for f in &FACES {
            let opposite = FACES.iter().find(|g| g.normal == -f.normal).unwrap();
            assert_eq!(f.value + opposite.value, 7);
        }
    }

    #[test]
    fn test_rotation_maps_z_onto_normal() {
        for f in &FACES {
            let rotated = f.orientation() * Vec3::Z;
            let n = f.normal_f32();
            assert_relative_eq!(rotated.x, n.x, epsilon = 1e-5);
            assert_relative_eq!(rotated.y, n.y, epsilon = 1e-5);
            assert_relative_eq!(rotated.z, n.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_face_point_axis_mapping() {
        let o = Vec2::new(0.5, -0.5);
        assert_eq!(face_point(IVec3::Z, o, 1.0).unwrap(), Vec3::new(0.5, -0.5, 1.0));
        assert_eq!(face_point(IVec3::NEG_X, o, 1.0).unwrap(), Vec3::new(-1.0, 0.5, -0.5));
        assert_eq!(face_point(IVec3::Y, o, 1.0).unwrap(), Vec3::new(0.5, 1.0, -0.5));
        assert_eq!(
            face_point(IVec3::new(1, 1, 0), o, 1.0),
            Err(LayoutError::InvalidNormal(IVec3::new(1, 1, 0)))
        );
    }

    #[test]
    fn test_fill_between_center_and_face() {
        let layout = PipLayout::new(2.0, 0.25, 0.5);
        let fill = layout.fill_height();
        assert!(fill > 0.0 && fill < layout.half_size());
        assert_relative_eq!(fill, 1.0 - 0.175, epsilon = 1e-6);

        for p in layout.placements() {
            let along = p.fill_center.dot(face(p.face).unwrap().normal_f32());
            assert!(along > 0.0 && along < layout.half_size());
        }
    }

    #[test]
    fn test_fill_height_monotonic_in_inset() {
        let base = PipLayout::new(2.0, 0.25, 0.5);
        let mut previous = f32::MAX;
        for step in 1..10 {
            let inset = step as f32 / 10.0;
            let h = base.with_fill_inset(inset).fill_height();
            assert!(h < previous, "inset {inset} did not move the fill inward");
            assert!(h > 0.0 && h < base.half_size());
            previous = h;
        }
    }

    #[test]
    fn test_cutter_straddles_face() {
        let layout = PipLayout::new(2.0, 0.25, 0.5);
        let h = layout.cutter_height();
        let pip_half = 0.35 * 0.5;
        assert!(h - pip_half < layout.half_size());
        assert!(h + pip_half > layout.half_size());
    }

    #[test]
    fn test_placements_cover_all_pips() {
        let layout = PipLayout::new(2.0, 0.25, 0.5);
        let placements = layout.placements();
        assert_eq!(placements.len(), 21);
        assert_eq!(layout.pip_count(), 21);

        let top: Vec<_> = placements.iter().filter(|p| p.face == 1).collect();
        assert_eq!(top.len(), 1);
        assert_relative_eq!(top[0].cutter_center.z, 1.125, epsilon = 1e-6);
    }
}
