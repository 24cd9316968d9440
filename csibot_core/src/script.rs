//! # Scripts
//!
//! A [`Script`] is a JSON list of session operations, one tagged object per
//! step. Codes may be given as integers or labels, exactly as in the session
//! API:
//!
//! ```json
//! {
//!   "name": "portal",
//!   "steps": [
//!     { "op": "initialize", "units": "kN_m_C" },
//!     { "op": "new_model", "template": 1 },
//!     { "op": "define_load_pattern", "name": "DEAD", "pattern_type": "Dead", "self_weight_multiplier": 1.0 },
//!     { "op": "draw_frame", "i": [0, 0, 0], "j": [0, 0, 3], "user_name": "C1" },
//!     { "op": "assign_frame_dist_load", "frame": "C1", "pattern": "DEAD", "direction": "Gravity",
//!       "dist1": 0, "dist2": 1, "val1": -2, "val2": -2, "relative_distance": true },
//!     { "op": "save" }
//!   ]
//! }
//! ```
//!
//! [`run_script`] executes the steps in order and stops at the first failure,
//! reporting its zero-based index.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codes::{CodeInput, ItemType};
use crate::errors::{BotError, BotResult};
use crate::geometry::Point3D;
use crate::host::StructuralModel;
use crate::model::{
    DistributedLoad, FrameModifiers, IsotropicProperties, NewModelTemplate, ObjectOptions, PointLoad,
    RectangularSection, Restraint,
};
use crate::session::Session;

fn default_units() -> CodeInput {
    CodeInput::Label("tonf_m_C".to_string())
}

fn default_direction() -> CodeInput {
    CodeInput::Label("Gravity".to_string())
}

fn yes() -> bool {
    true
}

/// One session operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Initialize {
        #[serde(default = "default_units")]
        units: CodeInput,
    },
    NewModel {
        /// 1 blank, 2 grid only, 3 steel deck
        template: i64,
        #[serde(default)]
        args: Vec<f64>,
    },
    SwitchUnits {
        units: CodeInput,
    },
    DefineMaterial {
        name: String,
        mat_type: CodeInput,
        #[serde(flatten)]
        props: IsotropicProperties,
    },
    DefineRectangularFrameSection {
        name: String,
        material: String,
        #[serde(flatten)]
        section: RectangularSection,
        #[serde(default)]
        modifiers: FrameModifiers,
    },
    DefineLoadPattern {
        name: String,
        pattern_type: CodeInput,
        #[serde(default)]
        self_weight_multiplier: f64,
        #[serde(default = "yes")]
        add_analysis_case: bool,
    },
    DrawFrame {
        i: Point3D,
        j: Point3D,
        #[serde(flatten)]
        options: ObjectOptions,
    },
    DrawArea {
        points: Vec<Point3D>,
        /// Order the vertices clockwise about their centroid first
        #[serde(default)]
        sort: bool,
        #[serde(flatten)]
        options: ObjectOptions,
    },
    DrawAreaByPoint {
        point_names: Vec<String>,
        #[serde(flatten)]
        options: ObjectOptions,
    },
    GetPoints {
        frame: String,
    },
    AssignRestraints {
        point: String,
        restraint: Restraint,
        #[serde(default)]
        item_type: ItemType,
    },
    AssignPointLoad {
        point: String,
        pattern: String,
        #[serde(flatten)]
        load: PointLoad,
        #[serde(default)]
        item_type: ItemType,
    },
    AssignFrameDistLoad {
        frame: String,
        pattern: String,
        #[serde(default = "default_direction")]
        direction: CodeInput,
        #[serde(flatten)]
        load: DistributedLoad,
        #[serde(default)]
        item_type: ItemType,
    },
    RunAnalysis,
    Save,
    RefreshView {
        #[serde(default)]
        window: i32,
        #[serde(default = "yes")]
        zoom: bool,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::Initialize { .. } => "initialize",
            Step::NewModel { .. } => "new_model",
            Step::SwitchUnits { .. } => "switch_units",
            Step::DefineMaterial { .. } => "define_material",
            Step::DefineRectangularFrameSection { .. } => "define_rectangular_frame_section",
            Step::DefineLoadPattern { .. } => "define_load_pattern",
            Step::DrawFrame { .. } => "draw_frame",
            Step::DrawArea { .. } => "draw_area",
            Step::DrawAreaByPoint { .. } => "draw_area_by_point",
            Step::GetPoints { .. } => "get_points",
            Step::AssignRestraints { .. } => "assign_restraints",
            Step::AssignPointLoad { .. } => "assign_point_load",
            Step::AssignFrameDistLoad { .. } => "assign_frame_dist_load",
            Step::RunAnalysis => "run_analysis",
            Step::Save => "save",
            Step::RefreshView { .. } => "refresh_view",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: String,
    pub steps: Vec<Step>,
}

/// What a completed step produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub op: String,
    /// Resolved code or name the host gave a new object, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

pub fn load_script(path: &Path) -> BotResult<Script> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BotError::file_error("read script", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| BotError::SerializationError {
        reason: format!("Invalid script {}: {}", path.display(), e),
    })
}

fn run_step<M: StructuralModel>(session: &mut Session<M>, step: &Step) -> BotResult<Option<String>> {
    let output = match step {
        Step::Initialize { units } => Some(session.initialize(units.clone())?.to_string()),
        Step::NewModel { template, args } => {
            session.new_model(&NewModelTemplate::from_option(*template, args)?)?;
            None
        }
        Step::SwitchUnits { units } => Some(session.switch_units(units.clone())?.to_string()),
        Step::DefineMaterial { name, mat_type, props } => {
            Some(session.define_material(name, mat_type.clone(), props)?.to_string())
        }
        Step::DefineRectangularFrameSection {
            name,
            material,
            section,
            modifiers,
        } => {
            session.define_rectangular_frame_section(name, material, section, modifiers)?;
            None
        }
        Step::DefineLoadPattern {
            name,
            pattern_type,
            self_weight_multiplier,
            add_analysis_case,
        } => Some(
            session
                .define_load_pattern(name, pattern_type.clone(), *self_weight_multiplier, *add_analysis_case)?
                .to_string(),
        ),
        Step::DrawFrame { i, j, options } => Some(session.draw_frame(*i, *j, options)?),
        Step::DrawArea { points, sort, options } => Some(if *sort {
            session.draw_area_sorted(points, options)?
        } else {
            session.draw_area(points, options)?
        }),
        Step::DrawAreaByPoint { point_names, options } => Some(session.draw_area_by_point(point_names, options)?),
        Step::GetPoints { frame } => {
            let (i, j) = session.get_points(frame)?;
            Some(format!("{},{}", i, j))
        }
        Step::AssignRestraints {
            point,
            restraint,
            item_type,
        } => {
            session.assign_restraints(point, restraint, *item_type)?;
            None
        }
        Step::AssignPointLoad {
            point,
            pattern,
            load,
            item_type,
        } => {
            session.assign_point_load(point, pattern, load, *item_type)?;
            None
        }
        Step::AssignFrameDistLoad {
            frame,
            pattern,
            direction,
            load,
            item_type,
        } => Some(
            session
                .assign_frame_dist_load(frame, pattern, direction.clone(), load, *item_type)?
                .to_string(),
        ),
        Step::RunAnalysis => {
            session.run_analysis()?;
            None
        }
        Step::Save => {
            session.save_model()?;
            None
        }
        Step::RefreshView { window, zoom } => {
            session.refresh_view(*window, *zoom)?;
            None
        }
    };
    Ok(output)
}

/// Run every step in order; the first failure stops the script.
pub fn run_script<M: StructuralModel>(session: &mut Session<M>, script: &Script) -> BotResult<Vec<StepRecord>> {
    info!(name = %script.name, steps = script.steps.len(), "running script");
    let mut records = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let op = step.op();
        let output = run_step(session, step).map_err(|e| BotError::script_failed(index, op, e))?;
        debug!(step = index, op, output = ?output, "step done");
        records.push(StepRecord {
            step: index,
            op: op.to_string(),
            output,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::Direction;
    use crate::recording::RecordingModel;
    use std::env::temp_dir;

    const PORTAL: &str = r#"{
        "name": "portal",
        "steps": [
            { "op": "initialize", "units": 6 },
            { "op": "new_model", "template": 1 },
            { "op": "define_material", "name": "C25", "mat_type": "Concrete", "e": 2.5e7, "u": 0.2, "a": 9.9e-6 },
            { "op": "define_rectangular_frame_section", "name": "C40", "material": "C25", "t3": 0.4, "t2": 0.4 },
            { "op": "define_load_pattern", "name": "DEAD", "pattern_type": "Dead", "self_weight_multiplier": 1.0 },
            { "op": "draw_frame", "i": [0, 0, 0], "j": [0, 0, 3], "prop_name": "C40", "user_name": "C1" },
            { "op": "draw_frame", "i": [6, 0, 0], "j": [6, 0, 3], "prop_name": "C40", "user_name": "C2" },
            { "op": "draw_frame", "i": [0, 0, 3], "j": [6, 0, 3], "prop_name": "C40", "user_name": "B1" },
            { "op": "get_points", "frame": "C1" },
            { "op": "assign_restraints", "point": "1", "restraint": { "u1": true, "u2": true, "u3": true } },
            { "op": "assign_frame_dist_load", "frame": "B1", "pattern": "DEAD",
              "dist1": 0, "dist2": 1, "val1": -12, "val2": -12, "relative_distance": true },
            { "op": "refresh_view" }
        ]
    }"#;

    fn session() -> Session<RecordingModel> {
        Session::new(RecordingModel::new(), temp_dir().join("csibot_script_unused.edb"))
    }

    #[test]
    fn test_portal_script() {
        let script: Script = serde_json::from_str(PORTAL).unwrap();
        let mut s = session();
        let records = run_script(&mut s, &script).unwrap();

        assert_eq!(records.len(), script.steps.len());
        assert_eq!(records[0].output.as_deref(), Some("kN_m_C"));
        assert_eq!(records[5].output.as_deref(), Some("C1"));
        assert_eq!(records[8].output.as_deref(), Some("1,2"));
        assert_eq!(records[10].output.as_deref(), Some("Gravity"));

        let state = &s.model().state;
        assert_eq!(state.frames.len(), 3);
        assert_eq!(state.points.len(), 4);
        assert!(state.points["1"].restraint.u3);
        assert_eq!(state.frames["B1"].loads[0].direction, Direction::Gravity);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let script: Script = serde_json::from_str(
            r#"{ "steps": [
                { "op": "initialize" },
                { "op": "new_model", "template": 1 },
                { "op": "define_load_pattern", "name": "DEAD", "pattern_type": "Dead" },
                { "op": "draw_frame", "i": [0, 0, 0], "j": [4, 0, 0] },
                { "op": "assign_frame_dist_load", "frame": "1", "pattern": "DEAD", "direction": "Gravity",
                  "dist1": 0, "dist2": 4, "val1": -1, "val2": -1, "csys": "Local" },
                { "op": "refresh_view" }
            ] }"#,
        )
        .unwrap();
        let mut s = session();
        let err = run_script(&mut s, &script).unwrap_err();
        match err {
            BotError::ScriptFailed { step, op, source } => {
                assert_eq!(step, 4);
                assert_eq!(op, "assign_frame_dist_load");
                assert_eq!(source.error_code(), "INCOMPATIBLE_CSYS");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(s.model().state.view_refreshes, 0);
    }

    #[test]
    fn test_defaults() {
        let step: Step = serde_json::from_str(r#"{ "op": "initialize" }"#).unwrap();
        assert_eq!(step, Step::Initialize { units: default_units() });

        let step: Step = serde_json::from_str(r#"{ "op": "draw_frame", "i": [0, 0, 0], "j": [1, 0, 0] }"#).unwrap();
        match step {
            Step::DrawFrame { options, .. } => assert_eq!(options, ObjectOptions::default()),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(serde_json::from_str::<Step>(r#"{ "op": "explode" }"#).is_err());
    }

    #[test]
    fn test_load_script_file() {
        let path = temp_dir().join(format!("csibot_script_{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, PORTAL).unwrap();
        let script = load_script(&path).unwrap();
        assert_eq!(script.name, "portal");
        let _ = fs::remove_file(&path);

        assert_eq!(load_script(&path).unwrap_err().error_code(), "FILE_ERROR");
    }
}
