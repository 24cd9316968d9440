//! # Recording Backend
//!
//! [`RecordingModel`] is an in-memory [`StructuralModel`]: it keeps a small
//! snapshot of the model (materials, sections, patterns, points, frames,
//! areas, supports and loads) and a journal entry for every call it receives,
//! with the return code it answered. It is what dry runs and tests drive.
//!
//! It behaves like the host where that matters to a caller: points at the same
//! coordinates are shared, new objects are named `"1"`, `"2"`, ... unless a
//! user name is given, references to missing materials, sections, patterns,
//! frames or points are refused with a non-zero return code, and analysis
//! needs a saved model.
//!
//! Saving writes the whole recording as JSON (see [`crate::file_io`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nalgebra as na;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codes::{
    CoordinateSystem, Direction, ItemType, LoadPatternType, MaterialType, UnitSystem,
};
use crate::config::LaunchStrategy;
use crate::errors::{BotError, BotResult};
use crate::file_io::{save_recording, SCHEMA_VERSION};
use crate::geometry::Point3D;
use crate::host::{check_ret, HostConnector, StructuralModel};
use crate::model::{
    DistributedLoad, DistributedLoadAssignment, FrameModifiers, FrameReleases, GridTemplate, IsotropicProperties,
    NewModelTemplate, PointForces, RectangularSection, Restraint,
};

/// Points closer than this share one joint
pub const MERGE_TOLERANCE: f64 = 1e-6;

/// Return code for a refused call
const REFUSED: i32 = 1;

/// Name of the section the host uses when none is given
const DEFAULT_PROP: &str = "Default";

// ============================================================================
// Journal
// ============================================================================

/// One call received by the recording host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call")]
pub enum HostCall {
    InitializeNewModel { units: UnitSystem },
    NewBlank,
    NewGridOnly { grid: GridTemplate },
    NewSteelDeck { grid: GridTemplate },
    Save { path: PathBuf },
    RunAnalysis,
    SetPresentUnits { units: UnitSystem },
    SetMaterial { name: String, mat_type: MaterialType },
    SetMpIsotropic { name: String, props: IsotropicProperties },
    SetRectangle { name: String, material: String, section: RectangularSection },
    SetModifiers { name: String, modifiers: FrameModifiers },
    AddLoadPattern {
        name: String,
        pattern_type: LoadPatternType,
        self_weight_multiplier: f64,
        add_analysis_case: bool,
    },
    FrameAddByCoord {
        i: Point3D,
        j: Point3D,
        prop_name: String,
        user_name: String,
        csys: CoordinateSystem,
    },
    AreaAddByCoord {
        points: Vec<Point3D>,
        prop_name: String,
        user_name: String,
        csys: CoordinateSystem,
    },
    AreaAddByPoint {
        point_names: Vec<String>,
        prop_name: String,
        user_name: String,
    },
    PointSetRestraint { name: String, restraint: Restraint, item_type: ItemType },
    PointSetLoadForce {
        name: String,
        pattern: String,
        forces: PointForces,
        replace: bool,
        csys: CoordinateSystem,
        item_type: ItemType,
    },
    FrameSetLoadDistributed {
        name: String,
        pattern: String,
        direction: Direction,
        load: DistributedLoad,
        item_type: ItemType,
    },
    RefreshView { window: i32, zoom: bool },
}

impl HostCall {
    /// Host-side name of the call, e.g. `FrameObj.AddByCoord`
    pub fn operation(&self) -> &'static str {
        match self {
            HostCall::InitializeNewModel { .. } => "InitializeNewModel",
            HostCall::NewBlank => "File.NewBlank",
            HostCall::NewGridOnly { .. } => "File.NewGridOnly",
            HostCall::NewSteelDeck { .. } => "File.NewSteelDeck",
            HostCall::Save { .. } => "File.Save",
            HostCall::RunAnalysis => "Analyze.RunAnalysis",
            HostCall::SetPresentUnits { .. } => "SetPresentUnits",
            HostCall::SetMaterial { .. } => "PropMaterial.SetMaterial",
            HostCall::SetMpIsotropic { .. } => "PropMaterial.SetMPIsotropic",
            HostCall::SetRectangle { .. } => "PropFrame.SetRectangle",
            HostCall::SetModifiers { .. } => "PropFrame.SetModifiers",
            HostCall::AddLoadPattern { .. } => "LoadPatterns.Add",
            HostCall::FrameAddByCoord { .. } => "FrameObj.AddByCoord",
            HostCall::AreaAddByCoord { .. } => "AreaObj.AddByCoord",
            HostCall::AreaAddByPoint { .. } => "AreaObj.AddByPoint",
            HostCall::PointSetRestraint { .. } => "PointObj.SetRestraint",
            HostCall::PointSetLoadForce { .. } => "PointObj.SetLoadForce",
            HostCall::FrameSetLoadDistributed { .. } => "FrameObj.SetLoadDistributed",
            HostCall::RefreshView { .. } => "View.RefreshView",
        }
    }
}

/// A journaled call and the code the recording host answered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub ret: i32,
    #[serde(flatten)]
    pub call: HostCall,
}

// ============================================================================
// Model snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub mat_type: MaterialType,
    pub props: Option<IsotropicProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub material: String,
    pub section: RectangularSection,
    pub modifiers: FrameModifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub pattern_type: LoadPatternType,
    pub self_weight_multiplier: f64,
    pub analysis_case: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoadRecord {
    pub pattern: String,
    pub forces: PointForces,
    pub csys: CoordinateSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub coord: Point3D,
    pub restraint: Restraint,
    pub loads: Vec<PointLoadRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub i_point: String,
    pub j_point: String,
    pub prop_name: String,
    pub length: f64,
    pub releases: FrameReleases,
    pub loads: Vec<DistributedLoadAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub points: Vec<String>,
    pub prop_name: String,
}

/// What the recording host knows about the model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelState {
    pub units: Option<UnitSystem>,
    pub present_units: Option<UnitSystem>,
    pub template: Option<NewModelTemplate>,
    pub materials: BTreeMap<String, MaterialRecord>,
    pub sections: BTreeMap<String, SectionRecord>,
    pub load_patterns: BTreeMap<String, PatternRecord>,
    pub points: BTreeMap<String, PointRecord>,
    pub frames: BTreeMap<String, FrameRecord>,
    pub areas: BTreeMap<String, AreaRecord>,
    pub saved_to: Option<PathBuf>,
    pub analyzed: bool,
    pub view_refreshes: u32,
    next_point: u32,
    next_frame: u32,
    next_area: u32,
}

impl ModelState {
    fn initialized(&self) -> bool {
        self.units.is_some()
    }

    /// Drop every object and definition, keeping the units
    fn clear_model(&mut self) {
        *self = ModelState {
            units: self.units,
            present_units: self.present_units,
            ..Default::default()
        };
    }

    fn find_point(&self, coord: Point3D) -> Option<&str> {
        self.points
            .iter()
            .find(|(_, p)| na::distance(&p.coord, &coord) <= MERGE_TOLERANCE)
            .map(|(name, _)| name.as_str())
    }

    fn point_at(&mut self, coord: Point3D) -> String {
        if let Some(name) = self.find_point(coord) {
            return name.to_string();
        }
        self.next_point += 1;
        let name = self.next_point.to_string();
        self.points.insert(
            name.clone(),
            PointRecord {
                coord,
                restraint: Restraint::default(),
                loads: Vec::new(),
            },
        );
        name
    }

    /// Name for a new object: the user's name if free, otherwise the next number
    fn object_name(user_name: &str, counter: &mut u32, taken: impl Fn(&str) -> bool) -> Option<String> {
        if !user_name.is_empty() {
            return if taken(user_name) { None } else { Some(user_name.to_string()) };
        }
        loop {
            *counter += 1;
            let name = counter.to_string();
            if !taken(&name) {
                return Some(name);
            }
        }
    }
}

/// Descriptive header of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    /// Schema version of the saved recording
    pub version: String,
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// In-memory host that records every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingModel {
    pub meta: RecordingMeta,
    pub state: ModelState,
    pub journal: Vec<JournalEntry>,
}

impl Default for RecordingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingModel {
    pub fn new() -> Self {
        let now = Utc::now();
        RecordingModel {
            meta: RecordingMeta {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                created: now,
                modified: now,
            },
            state: ModelState::default(),
            journal: Vec::new(),
        }
    }

    /// Journal a call with its return code and turn the code into a result
    fn record(&mut self, call: HostCall, ret: i32) -> BotResult<()> {
        let operation = call.operation();
        if ret == 0 {
            debug!(operation, "recorded");
        } else {
            warn!(operation, ret, "refused");
        }
        let now = Utc::now();
        self.meta.modified = now;
        self.journal.push(JournalEntry { at: now, ret, call });
        check_ret(operation, ret)
    }

    /// Journal a refused call and fail with its host error
    fn refuse<T>(&mut self, call: HostCall) -> BotResult<T> {
        let operation = call.operation();
        self.record(call, REFUSED)?;
        Err(BotError::host_call(operation, REFUSED))
    }

    /// Calls the host refused
    pub fn refused_calls(&self) -> impl Iterator<Item = &JournalEntry> {
        self.journal.iter().filter(|e| e.ret != 0)
    }

    /// One-line summary of the model contents
    pub fn summary(&self) -> String {
        let s = &self.state;
        format!(
            "{} materials, {} sections, {} load patterns, {} points, {} frames, {} areas, {} calls",
            s.materials.len(),
            s.sections.len(),
            s.load_patterns.len(),
            s.points.len(),
            s.frames.len(),
            s.areas.len(),
            self.journal.len()
        )
    }

    fn new_template(&mut self, template: NewModelTemplate, call: HostCall) -> BotResult<()> {
        let ret = if self.state.initialized() {
            self.state.clear_model();
            self.state.template = Some(template);
            0
        } else {
            REFUSED
        };
        self.record(call, ret)
    }

    fn frame(&self, name: &str) -> BotResult<&FrameRecord> {
        self.state
            .frames
            .get(name)
            .ok_or_else(|| BotError::not_found("Frame", name))
    }
}

impl StructuralModel for RecordingModel {
    fn initialize_new_model(&mut self, units: UnitSystem) -> BotResult<()> {
        self.state = ModelState {
            units: Some(units),
            present_units: Some(units),
            ..Default::default()
        };
        self.record(HostCall::InitializeNewModel { units }, 0)
    }

    fn new_blank(&mut self) -> BotResult<()> {
        self.new_template(NewModelTemplate::Blank, HostCall::NewBlank)
    }

    fn new_grid_only(&mut self, grid: &GridTemplate) -> BotResult<()> {
        self.new_template(NewModelTemplate::GridOnly(*grid), HostCall::NewGridOnly { grid: *grid })
    }

    fn new_steel_deck(&mut self, grid: &GridTemplate) -> BotResult<()> {
        self.new_template(NewModelTemplate::SteelDeck(*grid), HostCall::NewSteelDeck { grid: *grid })
    }

    fn save(&mut self, path: &Path) -> BotResult<()> {
        if !self.state.initialized() {
            return self.record(HostCall::Save { path: path.to_path_buf() }, REFUSED);
        }
        let previous = self.state.saved_to.replace(path.to_path_buf());
        self.record(HostCall::Save { path: path.to_path_buf() }, 0)?;
        if let Err(e) = save_recording(self, path) {
            self.state.saved_to = previous;
            if let Some(entry) = self.journal.last_mut() {
                entry.ret = REFUSED;
            }
            return Err(e);
        }
        Ok(())
    }

    fn run_analysis(&mut self) -> BotResult<()> {
        // The host analyses the saved file, so an unsaved model cannot run
        let ret = if self.state.initialized() && self.state.saved_to.is_some() {
            self.state.analyzed = true;
            0
        } else {
            REFUSED
        };
        self.record(HostCall::RunAnalysis, ret)
    }

    fn set_present_units(&mut self, units: UnitSystem) -> BotResult<()> {
        let ret = if self.state.initialized() {
            self.state.present_units = Some(units);
            0
        } else {
            REFUSED
        };
        self.record(HostCall::SetPresentUnits { units }, ret)
    }

    fn set_material(&mut self, name: &str, mat_type: MaterialType) -> BotResult<()> {
        let ret = if self.state.initialized() {
            self.state
                .materials
                .insert(name.to_string(), MaterialRecord { mat_type, props: None });
            0
        } else {
            REFUSED
        };
        self.record(
            HostCall::SetMaterial {
                name: name.to_string(),
                mat_type,
            },
            ret,
        )
    }

    fn set_mp_isotropic(&mut self, name: &str, props: &IsotropicProperties) -> BotResult<()> {
        let ret = match self.state.materials.get_mut(name) {
            Some(material) => {
                material.props = Some(*props);
                0
            }
            None => REFUSED,
        };
        self.record(
            HostCall::SetMpIsotropic {
                name: name.to_string(),
                props: *props,
            },
            ret,
        )
    }

    fn set_rectangle(&mut self, name: &str, material: &str, section: &RectangularSection) -> BotResult<()> {
        let ret = if self.state.materials.contains_key(material) {
            self.state.sections.insert(
                name.to_string(),
                SectionRecord {
                    material: material.to_string(),
                    section: *section,
                    modifiers: FrameModifiers::default(),
                },
            );
            0
        } else {
            REFUSED
        };
        self.record(
            HostCall::SetRectangle {
                name: name.to_string(),
                material: material.to_string(),
                section: *section,
            },
            ret,
        )
    }

    fn set_frame_modifiers(&mut self, name: &str, modifiers: &FrameModifiers) -> BotResult<()> {
        let ret = match self.state.sections.get_mut(name) {
            Some(section) => {
                section.modifiers = *modifiers;
                0
            }
            None => REFUSED,
        };
        self.record(
            HostCall::SetModifiers {
                name: name.to_string(),
                modifiers: *modifiers,
            },
            ret,
        )
    }

    fn add_load_pattern(
        &mut self,
        name: &str,
        pattern_type: LoadPatternType,
        self_weight_multiplier: f64,
        add_analysis_case: bool,
    ) -> BotResult<()> {
        let ret = if self.state.initialized() && !self.state.load_patterns.contains_key(name) {
            self.state.load_patterns.insert(
                name.to_string(),
                PatternRecord {
                    pattern_type,
                    self_weight_multiplier,
                    analysis_case: add_analysis_case,
                },
            );
            0
        } else {
            REFUSED
        };
        self.record(
            HostCall::AddLoadPattern {
                name: name.to_string(),
                pattern_type,
                self_weight_multiplier,
                add_analysis_case,
            },
            ret,
        )
    }

    fn frame_add_by_coord(
        &mut self,
        i: Point3D,
        j: Point3D,
        prop_name: &str,
        user_name: &str,
        csys: &CoordinateSystem,
    ) -> BotResult<String> {
        let call = HostCall::FrameAddByCoord {
            i,
            j,
            prop_name: prop_name.to_string(),
            user_name: user_name.to_string(),
            csys: csys.clone(),
        };

        let prop_ok = prop_name == DEFAULT_PROP || self.state.sections.contains_key(prop_name);
        let usable = self.state.initialized()
            && prop_ok
            && *csys != CoordinateSystem::Local
            && na::distance(&i, &j) > MERGE_TOLERANCE;
        if !usable {
            return self.refuse(call);
        }

        let frames = &self.state.frames;
        let Some(name) = ModelState::object_name(user_name, &mut self.state.next_frame, |n| frames.contains_key(n))
        else {
            return self.refuse(call);
        };

        let i_point = self.state.point_at(i);
        let j_point = self.state.point_at(j);
        self.state.frames.insert(
            name.clone(),
            FrameRecord {
                i_point,
                j_point,
                prop_name: prop_name.to_string(),
                length: na::distance(&i, &j),
                releases: FrameReleases::default(),
                loads: Vec::new(),
            },
        );
        self.record(call, 0)?;
        Ok(name)
    }

    fn area_add_by_coord(
        &mut self,
        points: &[Point3D],
        prop_name: &str,
        user_name: &str,
        csys: &CoordinateSystem,
    ) -> BotResult<String> {
        let call = HostCall::AreaAddByCoord {
            points: points.to_vec(),
            prop_name: prop_name.to_string(),
            user_name: user_name.to_string(),
            csys: csys.clone(),
        };
        if !self.state.initialized() || points.len() < 3 || *csys == CoordinateSystem::Local {
            return self.refuse(call);
        }

        let names: Vec<String> = points.iter().map(|&p| self.state.point_at(p)).collect();
        self.add_area(names, prop_name, user_name, call)
    }

    fn area_add_by_point(&mut self, point_names: &[String], prop_name: &str, user_name: &str) -> BotResult<String> {
        let call = HostCall::AreaAddByPoint {
            point_names: point_names.to_vec(),
            prop_name: prop_name.to_string(),
            user_name: user_name.to_string(),
        };
        let all_known = point_names.iter().all(|n| self.state.points.contains_key(n));
        if !self.state.initialized() || point_names.len() < 3 || !all_known {
            return self.refuse(call);
        }
        self.add_area(point_names.to_vec(), prop_name, user_name, call)
    }

    fn point_set_restraint(&mut self, name: &str, restraint: &Restraint, item_type: ItemType) -> BotResult<()> {
        let ret = match item_type {
            ItemType::Objects => match self.state.points.get_mut(name) {
                Some(point) => {
                    point.restraint = *restraint;
                    0
                }
                None => REFUSED,
            },
            // No groups are defined through this interface
            ItemType::Group => REFUSED,
            // Nothing is ever selected
            ItemType::SelectedObjects => 0,
        };
        self.record(
            HostCall::PointSetRestraint {
                name: name.to_string(),
                restraint: *restraint,
                item_type,
            },
            ret,
        )
    }

    fn point_set_load_force(
        &mut self,
        name: &str,
        pattern: &str,
        forces: &PointForces,
        replace: bool,
        csys: &CoordinateSystem,
        item_type: ItemType,
    ) -> BotResult<()> {
        let pattern_ok = self.state.load_patterns.contains_key(pattern);
        let ret = match item_type {
            ItemType::Objects => match self.state.points.get_mut(name) {
                Some(point) if pattern_ok => {
                    if replace {
                        point.loads.retain(|l| l.pattern != pattern);
                    }
                    point.loads.push(PointLoadRecord {
                        pattern: pattern.to_string(),
                        forces: *forces,
                        csys: csys.clone(),
                    });
                    0
                }
                _ => REFUSED,
            },
            ItemType::Group => REFUSED,
            ItemType::SelectedObjects => {
                if pattern_ok {
                    0
                } else {
                    REFUSED
                }
            }
        };
        self.record(
            HostCall::PointSetLoadForce {
                name: name.to_string(),
                pattern: pattern.to_string(),
                forces: *forces,
                replace,
                csys: csys.clone(),
                item_type,
            },
            ret,
        )
    }

    fn frame_set_load_distributed(
        &mut self,
        name: &str,
        pattern: &str,
        direction: Direction,
        load: &DistributedLoad,
        item_type: ItemType,
    ) -> BotResult<()> {
        let pattern_ok = self.state.load_patterns.contains_key(pattern);
        let ret = match item_type {
            ItemType::Objects => match self.state.frames.get_mut(name) {
                Some(frame) if pattern_ok => {
                    let beyond_end = !load.relative_distance && load.dist2 > frame.length + MERGE_TOLERANCE;
                    if beyond_end {
                        REFUSED
                    } else {
                        if load.replace {
                            frame.loads.retain(|l| l.pattern != pattern);
                        }
                        frame.loads.push(DistributedLoadAssignment {
                            frame: name.to_string(),
                            pattern: pattern.to_string(),
                            direction,
                            load: load.clone(),
                        });
                        0
                    }
                }
                _ => REFUSED,
            },
            ItemType::Group => REFUSED,
            ItemType::SelectedObjects => {
                if pattern_ok {
                    0
                } else {
                    REFUSED
                }
            }
        };
        self.record(
            HostCall::FrameSetLoadDistributed {
                name: name.to_string(),
                pattern: pattern.to_string(),
                direction,
                load: load.clone(),
                item_type,
            },
            ret,
        )
    }

    fn frame_get_points(&self, name: &str) -> BotResult<(String, String)> {
        let frame = self.frame(name)?;
        Ok((frame.i_point.clone(), frame.j_point.clone()))
    }

    fn frame_get_releases(&self, name: &str) -> BotResult<FrameReleases> {
        Ok(self.frame(name)?.releases)
    }

    fn frame_get_load_distributed(&self, name: &str, item_type: ItemType) -> BotResult<Vec<DistributedLoadAssignment>> {
        match item_type {
            ItemType::Objects => Ok(self.frame(name)?.loads.clone()),
            ItemType::Group => Err(BotError::not_found("Group", name)),
            ItemType::SelectedObjects => Ok(Vec::new()),
        }
    }

    fn refresh_view(&mut self, window: i32, zoom: bool) -> BotResult<()> {
        self.state.view_refreshes += 1;
        self.record(HostCall::RefreshView { window, zoom }, 0)
    }
}

impl RecordingModel {
    fn add_area(&mut self, points: Vec<String>, prop_name: &str, user_name: &str, call: HostCall) -> BotResult<String> {
        let mut distinct = points.clone();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < 3 {
            return self.refuse(call);
        }

        let areas = &self.state.areas;
        let Some(name) = ModelState::object_name(user_name, &mut self.state.next_area, |n| areas.contains_key(n))
        else {
            return self.refuse(call);
        };
        self.state.areas.insert(
            name.clone(),
            AreaRecord {
                points,
                prop_name: prop_name.to_string(),
            },
        );
        self.record(call, 0)?;
        Ok(name)
    }
}

/// Connector handing out fresh [`RecordingModel`]s.
///
/// `running_instance` decides whether attaching succeeds, so the fatal
/// bootstrap path can be exercised without a host.
#[derive(Debug, Clone)]
pub struct RecordingConnector {
    pub running_instance: bool,
    /// Strategies used so far, in order
    pub launches: Vec<LaunchStrategy>,
}

impl Default for RecordingConnector {
    fn default() -> Self {
        RecordingConnector {
            running_instance: true,
            launches: Vec::new(),
        }
    }
}

impl HostConnector for RecordingConnector {
    type Model = RecordingModel;

    fn attach(&mut self, prog_id: &str) -> BotResult<RecordingModel> {
        if !self.running_instance {
            return Err(BotError::launch_failed(
                LaunchStrategy::AttachToInstance.name(),
                format!("No running instance of {} found", prog_id),
            ));
        }
        self.launches.push(LaunchStrategy::AttachToInstance);
        Ok(RecordingModel::new())
    }

    fn start_from_path(&mut self, program_path: &Path) -> BotResult<RecordingModel> {
        debug!(path = %program_path.display(), "starting recording host");
        self.launches.push(LaunchStrategy::StartFromPath);
        Ok(RecordingModel::new())
    }

    fn start_from_prog_id(&mut self, prog_id: &str) -> BotResult<RecordingModel> {
        debug!(prog_id, "starting recording host");
        self.launches.push(LaunchStrategy::StartFromProgId);
        Ok(RecordingModel::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> RecordingModel {
        let mut m = RecordingModel::new();
        m.initialize_new_model(UnitSystem::KnMC).unwrap();
        m.new_blank().unwrap();
        m
    }

    fn origin() -> Point3D {
        Point3D::new(0.0, 0.0, 0.0)
    }

    #[test]
    fn test_refuses_calls_before_initialize() {
        let mut m = RecordingModel::new();
        assert!(m.new_blank().is_err());
        assert!(m.set_present_units(UnitSystem::NMC).is_err());
        assert_eq!(m.refused_calls().count(), 2);
    }

    #[test]
    fn test_points_are_shared_and_named_in_order() {
        let mut m = model();
        let g = CoordinateSystem::Global;
        let a = m
            .frame_add_by_coord(origin(), Point3D::new(0.0, 0.0, 3.0), "Default", "", &g)
            .unwrap();
        let b = m
            .frame_add_by_coord(Point3D::new(0.0, 0.0, 3.0 + 1e-9), Point3D::new(5.0, 0.0, 3.0), "Default", "", &g)
            .unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("1", "2"));
        assert_eq!(m.state.points.len(), 3);
        assert_eq!(m.frame_get_points("2").unwrap(), ("2".to_string(), "3".to_string()));
    }

    #[test]
    fn test_user_names() {
        let mut m = model();
        let g = CoordinateSystem::Global;
        let name = m
            .frame_add_by_coord(origin(), Point3D::new(1.0, 0.0, 0.0), "Default", "B1", &g)
            .unwrap();
        assert_eq!(name, "B1");
        assert!(m
            .frame_add_by_coord(origin(), Point3D::new(0.0, 1.0, 0.0), "Default", "B1", &g)
            .is_err());
    }

    #[test]
    fn test_frame_refusals() {
        let mut m = model();
        let g = CoordinateSystem::Global;
        // Unknown section
        assert!(m
            .frame_add_by_coord(origin(), Point3D::new(1.0, 0.0, 0.0), "W12x26", "", &g)
            .is_err());
        // Zero length
        assert!(m.frame_add_by_coord(origin(), origin(), "Default", "", &g).is_err());
        assert!(m.state.frames.is_empty());
        assert_eq!(m.refused_calls().count(), 2);
    }

    #[test]
    fn test_area_by_point() {
        let mut m = model();
        let g = CoordinateSystem::Global;
        m.area_add_by_coord(
            &[origin(), Point3D::new(4.0, 0.0, 0.0), Point3D::new(4.0, 4.0, 0.0)],
            "Slab",
            "",
            &g,
        )
        .unwrap();
        let names: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(m.area_add_by_point(&names, "Slab", "").unwrap(), "2");

        let unknown: Vec<String> = ["1", "2", "9"].iter().map(|s| s.to_string()).collect();
        assert!(m.area_add_by_point(&unknown, "Slab", "").is_err());

        // Repeated vertices do not make an area
        let repeated: Vec<String> = ["1", "1", "2"].iter().map(|s| s.to_string()).collect();
        assert!(m.area_add_by_point(&repeated, "Slab", "").is_err());
    }

    #[test]
    fn test_distributed_load_replace_and_bounds() {
        let mut m = model();
        let g = CoordinateSystem::Global;
        m.add_load_pattern("DEAD", LoadPatternType::Dead, 1.0, true).unwrap();
        let f = m
            .frame_add_by_coord(origin(), Point3D::new(4.0, 0.0, 0.0), "Default", "", &g)
            .unwrap();

        let load = DistributedLoad::new(0.0, 4.0, -1.0, -1.0);
        m.frame_set_load_distributed(&f, "DEAD", Direction::Gravity, &load, ItemType::Objects)
            .unwrap();
        m.frame_set_load_distributed(&f, "DEAD", Direction::Gravity, &load, ItemType::Objects)
            .unwrap();
        assert_eq!(m.frame_get_load_distributed(&f, ItemType::Objects).unwrap().len(), 2);

        let replacing = DistributedLoad::uniform(-3.0).replacing();
        m.frame_set_load_distributed(&f, "DEAD", Direction::Gravity, &replacing, ItemType::Objects)
            .unwrap();
        let loads = m.frame_get_load_distributed(&f, ItemType::Objects).unwrap();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].load.val1, -3.0);

        let too_long = DistributedLoad::new(0.0, 5.0, -1.0, -1.0);
        assert!(m
            .frame_set_load_distributed(&f, "DEAD", Direction::Gravity, &too_long, ItemType::Objects)
            .is_err());
        assert!(m
            .frame_set_load_distributed(&f, "WIND", Direction::X, &load, ItemType::Objects)
            .is_err());
        assert!(m.frame_get_load_distributed(&f, ItemType::Group).is_err());
    }

    #[test]
    fn test_duplicate_load_pattern_refused() {
        let mut m = model();
        m.add_load_pattern("LIVE", LoadPatternType::Live, 0.0, true).unwrap();
        let err = m.add_load_pattern("LIVE", LoadPatternType::Live, 0.0, true).unwrap_err();
        assert_eq!(err, BotError::host_call("LoadPatterns.Add", 1));
    }

    #[test]
    fn test_analysis_needs_saved_model() {
        let mut m = model();
        assert!(m.run_analysis().is_err());
        assert!(!m.state.analyzed);
    }

    #[test]
    fn test_new_template_clears_objects() {
        let mut m = model();
        m.set_material("S355", MaterialType::Steel).unwrap();
        m.new_grid_only(&GridTemplate::default()).unwrap();
        assert!(m.state.materials.is_empty());
        assert_eq!(m.state.units, Some(UnitSystem::KnMC));
        assert_eq!(m.state.template, Some(NewModelTemplate::GridOnly(GridTemplate::default())));
    }

    #[test]
    fn test_journal_json_shape() {
        let mut m = model();
        m.refresh_view(0, true).unwrap();
        let json = serde_json::to_value(m.journal.last().unwrap()).unwrap();
        assert_eq!(json["call"], "RefreshView");
        assert_eq!(json["ret"], 0);
        assert_eq!(json["zoom"], true);
    }

    #[test]
    fn test_connector_attach() {
        let mut connector = RecordingConnector::default();
        assert!(connector.attach("CSI.ETABS.API.ETABSObject").is_ok());
        connector.running_instance = false;
        let err = connector.attach("CSI.ETABS.API.ETABSObject").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(connector.launches, vec![LaunchStrategy::AttachToInstance]);
    }
}
