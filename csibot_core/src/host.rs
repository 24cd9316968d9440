//! # Host Boundary
//!
//! Traits describing the automation object model of the host applications.
//! Each method corresponds to one host call; arguments are already translated
//! into typed codes, so an implementation only has to marshal them (for a COM
//! backend, `code()` gives the integer the host expects).
//!
//! Host calls report success with a zero return code. Backends turn a non-zero
//! code into [`BotError::HostCall`] with [`check_ret`].
//!
//! ```text
//! Session ──(typed codes)──▶ StructuralModel ──▶ host application
//!                                ▲
//!            HostConnector ──────┘ (attach / start)
//! ```

use std::path::Path;

use crate::codes::{CoordinateSystem, Direction, ItemType, LoadPatternType, MaterialType, UnitSystem};
use crate::errors::{BotError, BotResult};
use crate::geometry::Point3D;
use crate::model::{
    DistributedLoad, DistributedLoadAssignment, FrameModifiers, FrameReleases, GridTemplate, IsotropicProperties,
    PointForces, RectangularSection, Restraint,
};

/// Program id of the structural-analysis application's API object
pub const ETABS_PROG_ID: &str = "CSI.ETABS.API.ETABSObject";

/// Program id of the CAD application
pub const CAD_PROG_ID: &str = "AutoCAD.Application";

/// Map a host return code to a result
pub fn check_ret(operation: &str, ret: i32) -> BotResult<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(BotError::host_call(operation, ret))
    }
}

/// The structural-analysis model object (`SapModel`).
///
/// Methods are grouped the way the host groups them: file, analysis, property
/// definitions, object creation, assignments and queries.
pub trait StructuralModel {
    // --- model and file ---

    fn initialize_new_model(&mut self, units: UnitSystem) -> BotResult<()>;

    fn new_blank(&mut self) -> BotResult<()>;

    fn new_grid_only(&mut self, grid: &GridTemplate) -> BotResult<()>;

    fn new_steel_deck(&mut self, grid: &GridTemplate) -> BotResult<()>;

    fn save(&mut self, path: &Path) -> BotResult<()>;

    fn run_analysis(&mut self) -> BotResult<()>;

    fn set_present_units(&mut self, units: UnitSystem) -> BotResult<()>;

    // --- property definitions ---

    fn set_material(&mut self, name: &str, mat_type: MaterialType) -> BotResult<()>;

    fn set_mp_isotropic(&mut self, name: &str, props: &IsotropicProperties) -> BotResult<()>;

    fn set_rectangle(&mut self, name: &str, material: &str, section: &RectangularSection) -> BotResult<()>;

    fn set_frame_modifiers(&mut self, name: &str, modifiers: &FrameModifiers) -> BotResult<()>;

    fn add_load_pattern(
        &mut self,
        name: &str,
        pattern_type: LoadPatternType,
        self_weight_multiplier: f64,
        add_analysis_case: bool,
    ) -> BotResult<()>;

    // --- objects ---

    /// Returns the name the host gave the new frame
    fn frame_add_by_coord(
        &mut self,
        i: Point3D,
        j: Point3D,
        prop_name: &str,
        user_name: &str,
        csys: &CoordinateSystem,
    ) -> BotResult<String>;

    /// Returns the name the host gave the new area
    fn area_add_by_coord(
        &mut self,
        points: &[Point3D],
        prop_name: &str,
        user_name: &str,
        csys: &CoordinateSystem,
    ) -> BotResult<String>;

    /// Returns the name the host gave the new area
    fn area_add_by_point(&mut self, point_names: &[String], prop_name: &str, user_name: &str) -> BotResult<String>;

    // --- assignments ---

    fn point_set_restraint(&mut self, name: &str, restraint: &Restraint, item_type: ItemType) -> BotResult<()>;

    fn point_set_load_force(
        &mut self,
        name: &str,
        pattern: &str,
        forces: &PointForces,
        replace: bool,
        csys: &CoordinateSystem,
        item_type: ItemType,
    ) -> BotResult<()>;

    fn frame_set_load_distributed(
        &mut self,
        name: &str,
        pattern: &str,
        direction: Direction,
        load: &DistributedLoad,
        item_type: ItemType,
    ) -> BotResult<()>;

    // --- queries ---

    /// Names of the I-end and J-end points of a frame
    fn frame_get_points(&self, name: &str) -> BotResult<(String, String)>;

    fn frame_get_releases(&self, name: &str) -> BotResult<FrameReleases>;

    fn frame_get_load_distributed(&self, name: &str, item_type: ItemType) -> BotResult<Vec<DistributedLoadAssignment>>;

    // --- view ---

    fn refresh_view(&mut self, window: i32, zoom: bool) -> BotResult<()>;
}

/// Gets hold of a running host, or starts one.
///
/// The three methods correspond to the launch strategies in
/// [`LaunchStrategy`](crate::config::LaunchStrategy). `start_*` methods also
/// start the application before returning its model.
pub trait HostConnector {
    type Model: StructuralModel;

    fn attach(&mut self, prog_id: &str) -> BotResult<Self::Model>;

    fn start_from_path(&mut self, program_path: &Path) -> BotResult<Self::Model>;

    fn start_from_prog_id(&mut self, prog_id: &str) -> BotResult<Self::Model>;
}

/// The CAD application.
pub trait CadApplication {
    /// Handle to the model space of the active drawing
    type ModelSpace;

    /// Model space of the active drawing of the instance registered as `prog_id`
    fn active_model_space(&mut self, prog_id: &str) -> BotResult<Self::ModelSpace>;
}
