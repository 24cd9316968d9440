//! # Model Value Types
//!
//! Plain, serializable values passed through the session to the host: material
//! properties, section modifiers, restraints, loads and new-model templates.
//! Defaults match the ones the host applies when an argument is omitted.

use serde::{Deserialize, Serialize};

use crate::codes::{CoordinateSystem, Direction, DistributedLoadType};
use crate::errors::{BotError, BotResult};

// ============================================================================
// Materials and sections
// ============================================================================

/// Isotropic mechanical properties (`SetMPIsotropic`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsotropicProperties {
    /// Modulus of elasticity
    pub e: f64,
    /// Poisson's ratio
    pub u: f64,
    /// Coefficient of thermal expansion
    pub a: f64,
    /// Temperature at which the properties apply
    #[serde(default)]
    pub temp: f64,
}

impl IsotropicProperties {
    pub fn new(e: f64, u: f64, a: f64) -> Self {
        IsotropicProperties { e, u, a, temp: 0.0 }
    }

    pub fn at_temperature(mut self, temp: f64) -> Self {
        self.temp = temp;
        self
    }

    pub fn validate(&self) -> BotResult<()> {
        if !(self.e.is_finite() && self.e > 0.0) {
            return Err(BotError::invalid_input("e", self.e.to_string(), "Modulus must be positive"));
        }
        // Isotropic materials need -1 < u < 0.5 for a positive-definite stiffness
        if !(self.u > -1.0 && self.u < 0.5) {
            return Err(BotError::invalid_input("u", self.u.to_string(), "Poisson's ratio must be in (-1, 0.5)"));
        }
        if !self.a.is_finite() || !self.temp.is_finite() {
            return Err(BotError::invalid_input("a", self.a.to_string(), "Values must be finite"));
        }
        Ok(())
    }
}

/// Property modifiers for a frame section (`PropFrame.SetModifiers`).
///
/// Every modifier defaults to 1 (no modification).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameModifiers {
    pub area: f64,
    pub shear_2: f64,
    pub shear_3: f64,
    pub torsion: f64,
    pub moment_2: f64,
    pub moment_3: f64,
    pub mass: f64,
    pub weight: f64,
}

impl Default for FrameModifiers {
    fn default() -> Self {
        FrameModifiers {
            area: 1.0,
            shear_2: 1.0,
            shear_3: 1.0,
            torsion: 1.0,
            moment_2: 1.0,
            moment_3: 1.0,
            mass: 1.0,
            weight: 1.0,
        }
    }
}

impl FrameModifiers {
    /// Cracked-section modifiers commonly used for concrete beams
    pub fn cracked_beam() -> Self {
        FrameModifiers {
            torsion: 0.01,
            moment_2: 0.35,
            moment_3: 0.35,
            ..Default::default()
        }
    }

    /// Host argument order: A, AS2, AS3, J, I22, I33, Mass, Weight
    pub fn to_array(&self) -> [f64; 8] {
        [
            self.area,
            self.shear_2,
            self.shear_3,
            self.torsion,
            self.moment_2,
            self.moment_3,
            self.mass,
            self.weight,
        ]
    }

    pub fn validate(&self) -> BotResult<()> {
        let names = ["area", "shear_2", "shear_3", "torsion", "moment_2", "moment_3", "mass", "weight"];
        for (name, value) in names.iter().zip(self.to_array()) {
            if !(value.is_finite() && value >= 0.0) {
                return Err(BotError::invalid_input(*name, value.to_string(), "Modifier must be finite and non-negative"));
            }
        }
        Ok(())
    }
}

/// Rectangular section dimensions (`PropFrame.SetRectangle`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangularSection {
    /// Depth, along local 2
    pub t3: f64,
    /// Width, along local 3
    pub t2: f64,
}

impl RectangularSection {
    pub fn validate(&self) -> BotResult<()> {
        for (field, value) in [("t3", self.t3), ("t2", self.t2)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BotError::invalid_input(field, value.to_string(), "Dimension must be positive"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Supports and loads
// ============================================================================

/// Joint restraint flags, U1..U3 translations and R1..R3 rotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Restraint {
    pub u1: bool,
    pub u2: bool,
    pub u3: bool,
    pub r1: bool,
    pub r2: bool,
    pub r3: bool,
}

impl Restraint {
    pub fn free() -> Self {
        Restraint::default()
    }

    pub fn fixed() -> Self {
        Restraint::from_array([true; 6])
    }

    pub fn pinned() -> Self {
        Restraint::from_array([true, true, true, false, false, false])
    }

    pub fn from_array(values: [bool; 6]) -> Self {
        let [u1, u2, u3, r1, r2, r3] = values;
        Restraint { u1, u2, u3, r1, r2, r3 }
    }

    pub fn to_array(&self) -> [bool; 6] {
        [self.u1, self.u2, self.u3, self.r1, self.r2, self.r3]
    }
}

/// Joint forces F1..F3 and moments M1..M3
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PointForces {
    pub f1: f64,
    pub f2: f64,
    pub f3: f64,
    pub m1: f64,
    pub m2: f64,
    pub m3: f64,
}

impl PointForces {
    pub fn to_array(&self) -> [f64; 6] {
        [self.f1, self.f2, self.f3, self.m1, self.m2, self.m3]
    }
}

/// A joint load (`PointObj.SetLoadForce`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointLoad {
    #[serde(flatten)]
    pub forces: PointForces,
    /// Replace existing loads of the same pattern instead of adding
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub csys: CoordinateSystem,
}

/// A distributed frame load (`FrameObj.SetLoadDistributed`), minus its
/// direction, which is translated and checked separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Start distance along the frame
    pub dist1: f64,
    /// End distance along the frame
    pub dist2: f64,
    /// Load value at `dist1`
    pub val1: f64,
    /// Load value at `dist2`
    pub val2: f64,
    #[serde(default)]
    pub load_type: DistributedLoadType,
    /// Distances are fractions of the frame length
    #[serde(default)]
    pub relative_distance: bool,
    #[serde(default)]
    pub replace: bool,
    #[serde(default)]
    pub csys: CoordinateSystem,
}

impl DistributedLoad {
    /// Load between `dist1` and `dist2` (absolute distances), global csys, force type
    pub fn new(dist1: f64, dist2: f64, val1: f64, val2: f64) -> Self {
        DistributedLoad {
            dist1,
            dist2,
            val1,
            val2,
            load_type: DistributedLoadType::Force,
            relative_distance: false,
            replace: false,
            csys: CoordinateSystem::Global,
        }
    }

    /// Uniform load over the whole frame
    pub fn uniform(value: f64) -> Self {
        DistributedLoad {
            relative_distance: true,
            ..DistributedLoad::new(0.0, 1.0, value, value)
        }
    }

    pub fn in_csys(mut self, csys: impl Into<CoordinateSystem>) -> Self {
        self.csys = csys.into();
        self
    }

    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    pub fn validate(&self) -> BotResult<()> {
        if !(self.dist1.is_finite() && self.dist2.is_finite() && self.val1.is_finite() && self.val2.is_finite()) {
            return Err(BotError::invalid_input("load", format!("{:?}", self), "Values must be finite"));
        }
        if self.dist1 < 0.0 || self.dist2 < self.dist1 {
            return Err(BotError::invalid_input(
                "dist",
                format!("{}..{}", self.dist1, self.dist2),
                "Distances must satisfy 0 <= dist1 <= dist2",
            ));
        }
        if self.relative_distance && self.dist2 > 1.0 {
            return Err(BotError::invalid_input(
                "dist2",
                self.dist2.to_string(),
                "Relative distances must not exceed 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Query results
// ============================================================================

/// End releases of a frame (`FrameObj.GetReleases`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReleases {
    /// Released degrees of freedom at the I end (P, V2, V3, T, M2, M3)
    pub i_end: [bool; 6],
    /// Released degrees of freedom at the J end
    pub j_end: [bool; 6],
    /// Partial fixity springs at the I end
    pub start_values: [f64; 6],
    /// Partial fixity springs at the J end
    pub end_values: [f64; 6],
}

/// One distributed load assigned to a frame (`FrameObj.GetLoadDistributed`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoadAssignment {
    pub frame: String,
    pub pattern: String,
    pub direction: Direction,
    pub load: DistributedLoad,
}

// ============================================================================
// Object options
// ============================================================================

/// Options shared by the frame and area drawing calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectOptions {
    /// Section (frame) or property (area) name
    pub prop_name: String,
    /// Name to give the object; empty lets the host choose
    pub user_name: String,
    pub csys: CoordinateSystem,
}

impl Default for ObjectOptions {
    fn default() -> Self {
        ObjectOptions {
            prop_name: "Default".to_string(),
            user_name: String::new(),
            csys: CoordinateSystem::Global,
        }
    }
}

impl ObjectOptions {
    pub fn with_prop(prop_name: impl Into<String>) -> Self {
        ObjectOptions {
            prop_name: prop_name.into(),
            ..Default::default()
        }
    }

    pub fn named(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }
}

// ============================================================================
// New model templates
// ============================================================================

/// Story and grid layout for the grid-only and steel-deck templates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTemplate {
    pub stories: u32,
    pub typical_story_height: f64,
    pub bottom_story_height: f64,
    pub lines_x: u32,
    pub lines_y: u32,
    pub spacing_x: f64,
    pub spacing_y: f64,
}

impl Default for GridTemplate {
    fn default() -> Self {
        GridTemplate {
            stories: 3,
            typical_story_height: 3.0,
            bottom_story_height: 3.0,
            lines_x: 4,
            lines_y: 4,
            spacing_x: 5.0,
            spacing_y: 5.0,
        }
    }
}

impl GridTemplate {
    /// Build from the host's positional arguments:
    /// stories, typical height, bottom height, X lines, Y lines, X spacing, Y spacing
    pub fn from_args(args: &[f64]) -> BotResult<Self> {
        let [stories, typical, bottom, lines_x, lines_y, spacing_x, spacing_y] = <[f64; 7]>::try_from(args)
            .map_err(|_| {
                BotError::invalid_input("args", format!("{:?}", args), "Grid templates take exactly 7 arguments")
            })?;
        let count = |field: &str, v: f64| -> BotResult<u32> {
            if v.fract() != 0.0 || v < 1.0 || v > f64::from(u32::MAX) {
                return Err(BotError::invalid_input(field, v.to_string(), "Must be a positive whole number"));
            }
            Ok(v as u32)
        };
        let grid = GridTemplate {
            stories: count("stories", stories)?,
            typical_story_height: typical,
            bottom_story_height: bottom,
            lines_x: count("lines_x", lines_x)?,
            lines_y: count("lines_y", lines_y)?,
            spacing_x,
            spacing_y,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> BotResult<()> {
        for (field, value) in [("stories", self.stories), ("lines_x", self.lines_x), ("lines_y", self.lines_y)] {
            if value == 0 {
                return Err(BotError::invalid_input(field, "0", "Must be at least 1"));
            }
        }
        for (field, value) in [
            ("typical_story_height", self.typical_story_height),
            ("bottom_story_height", self.bottom_story_height),
            ("spacing_x", self.spacing_x),
            ("spacing_y", self.spacing_y),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BotError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        Ok(())
    }
}

/// Starting point for a new model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum NewModelTemplate {
    /// Empty model (`File.NewBlank`)
    Blank,
    /// Grid lines and stories only (`File.NewGridOnly`)
    GridOnly(GridTemplate),
    /// Steel deck building (`File.NewSteelDeck`)
    SteelDeck(GridTemplate),
}

impl NewModelTemplate {
    /// Map the numeric template option (1 blank, 2 grid only, 3 steel deck).
    ///
    /// Empty `args` means the default grid.
    pub fn from_option(option: i64, args: &[f64]) -> BotResult<Self> {
        let grid = || {
            if args.is_empty() {
                Ok(GridTemplate::default())
            } else {
                GridTemplate::from_args(args)
            }
        };
        match option {
            1 => Ok(NewModelTemplate::Blank),
            2 => Ok(NewModelTemplate::GridOnly(grid()?)),
            3 => Ok(NewModelTemplate::SteelDeck(grid()?)),
            other => Err(BotError::invalid_input(
                "template",
                other.to_string(),
                "Not available template option (expected 1, 2 or 3)",
            )),
        }
    }

    pub fn option(&self) -> i64 {
        match self {
            NewModelTemplate::Blank => 1,
            NewModelTemplate::GridOnly(_) => 2,
            NewModelTemplate::SteelDeck(_) => 3,
        }
    }
}
