//! # Session
//!
//! [`Session`] is the translation layer: it resolves labels into host codes,
//! checks cross-field rules, and forwards each call to a [`StructuralModel`].
//! A rejected request never reaches the host; the caller gets the reason as a
//! [`BotError`].
//!
//! ## Example
//!
//! ```rust
//! use csibot_core::codes::ItemType;
//! use csibot_core::geometry::Point3D;
//! use csibot_core::model::{DistributedLoad, NewModelTemplate, ObjectOptions};
//! use csibot_core::recording::RecordingModel;
//! use csibot_core::session::Session;
//!
//! let mut session = Session::new(RecordingModel::new(), "model.edb");
//! session.initialize("kN_m_C").unwrap();
//! session.new_model(&NewModelTemplate::Blank).unwrap();
//! session.define_load_pattern("DEAD", "Dead", 1.0, true).unwrap();
//!
//! let beam = session
//!     .draw_frame(Point3D::new(0.0, 0.0, 3.0), Point3D::new(6.0, 0.0, 3.0), &ObjectOptions::default())
//!     .unwrap();
//!
//! // Gravity loads must be given in the global system
//! let load = DistributedLoad::uniform(-10.0);
//! session.assign_frame_dist_load(&beam, "DEAD", "Gravity", &load, ItemType::Objects).unwrap();
//! assert!(session
//!     .assign_frame_dist_load(&beam, "DEAD", "Gravity", &load.clone().in_csys("Local"), ItemType::Objects)
//!     .is_err());
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codes::{
    check_coordinate_system, CodeInput, Direction, HostCode, ItemType, LoadPatternType, MaterialType, UnitSystem,
};
use crate::config::{prepare_api_dir, LaunchStrategy, SessionConfig};
use crate::errors::{BotError, BotResult};
use crate::geometry::{is_finite, sort_clockwise_about_centroid, Point2D, Point3D};
use crate::host::{CadApplication, HostConnector, StructuralModel, CAD_PROG_ID};
use crate::lock::{current_user, ModelLock};
use crate::model::{
    DistributedLoad, DistributedLoadAssignment, FrameModifiers, FrameReleases, IsotropicProperties, NewModelTemplate,
    ObjectOptions, PointLoad, RectangularSection, Restraint,
};

/// A connection to one structural model.
pub struct Session<M: StructuralModel> {
    model: M,
    model_path: PathBuf,
    present_units: Option<UnitSystem>,
    _lock: Option<ModelLock>,
}

fn require_name(field: &str, name: &str) -> BotResult<()> {
    if name.trim().is_empty() {
        return Err(BotError::invalid_input(field, name, "Name must not be empty"));
    }
    Ok(())
}

impl<M: StructuralModel> Session<M> {
    /// Wrap an already connected model. Use [`connect`] to go through the
    /// configured launch strategy instead.
    pub fn new(model: M, model_path: impl Into<PathBuf>) -> Self {
        Session {
            model,
            model_path: model_path.into(),
            present_units: None,
            _lock: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Close the session, releasing the model lock, and hand back the model
    pub fn into_model(self) -> M {
        self.model
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Units set by the last `initialize` or `switch_units`
    pub fn present_units(&self) -> Option<UnitSystem> {
        self.present_units
    }

    // ------------------------------------------------------------------------
    // Model and file
    // ------------------------------------------------------------------------

    /// Start a new model in the given unit system (`"tonf_m_C"` is the usual default).
    pub fn initialize(&mut self, units: impl Into<CodeInput>) -> BotResult<UnitSystem> {
        let units = UnitSystem::resolve(units)?;
        debug!(units = %units, code = units.code(), "InitializeNewModel");
        self.model.initialize_new_model(units)?;
        self.present_units = Some(units);
        Ok(units)
    }

    pub fn new_model(&mut self, template: &NewModelTemplate) -> BotResult<()> {
        debug!(template = template.option(), "new model");
        match template {
            NewModelTemplate::Blank => self.model.new_blank(),
            NewModelTemplate::GridOnly(grid) => {
                grid.validate()?;
                self.model.new_grid_only(grid)
            }
            NewModelTemplate::SteelDeck(grid) => {
                grid.validate()?;
                self.model.new_steel_deck(grid)
            }
        }
    }

    /// Save to the session's model path
    pub fn save_model(&mut self) -> BotResult<()> {
        info!(path = %self.model_path.display(), "saving model");
        self.model.save(&self.model_path)
    }

    pub fn run_analysis(&mut self) -> BotResult<()> {
        info!("running analysis");
        self.model.run_analysis()
    }

    pub fn switch_units(&mut self, units: impl Into<CodeInput>) -> BotResult<UnitSystem> {
        let units = UnitSystem::resolve(units)?;
        debug!(
            units = %units,
            force = units.force_unit(),
            length = units.length_unit(),
            temperature = units.temperature_unit(),
            "SetPresentUnits"
        );
        self.model.set_present_units(units)?;
        self.present_units = Some(units);
        Ok(units)
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    /// Define (or redefine) an isotropic material.
    pub fn define_material(
        &mut self,
        name: &str,
        mat_type: impl Into<CodeInput>,
        props: &IsotropicProperties,
    ) -> BotResult<MaterialType> {
        require_name("name", name)?;
        let mat_type = MaterialType::resolve(mat_type)?;
        props.validate()?;
        debug!(name, mat_type = %mat_type, e = props.e, u = props.u, "define material");
        self.model.set_material(name, mat_type)?;
        self.model.set_mp_isotropic(name, props)?;
        Ok(mat_type)
    }

    pub fn define_rectangular_frame_section(
        &mut self,
        name: &str,
        material: &str,
        section: &RectangularSection,
        modifiers: &FrameModifiers,
    ) -> BotResult<()> {
        require_name("name", name)?;
        require_name("material", material)?;
        section.validate()?;
        modifiers.validate()?;
        debug!(name, material, t3 = section.t3, t2 = section.t2, "define rectangular section");
        self.model.set_rectangle(name, material, section)?;
        self.model.set_frame_modifiers(name, modifiers)
    }

    pub fn define_load_pattern(
        &mut self,
        name: &str,
        pattern_type: impl Into<CodeInput>,
        self_weight_multiplier: f64,
        add_analysis_case: bool,
    ) -> BotResult<LoadPatternType> {
        require_name("name", name)?;
        let pattern_type = LoadPatternType::resolve(pattern_type)?;
        if !self_weight_multiplier.is_finite() {
            return Err(BotError::invalid_input(
                "self_weight_multiplier",
                self_weight_multiplier.to_string(),
                "Must be finite",
            ));
        }
        debug!(name, pattern_type = %pattern_type, self_weight_multiplier, "add load pattern");
        self.model
            .add_load_pattern(name, pattern_type, self_weight_multiplier, add_analysis_case)?;
        Ok(pattern_type)
    }

    // ------------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------------

    /// Draw a frame between two points; returns the frame's name.
    pub fn draw_frame(&mut self, i: Point3D, j: Point3D, options: &ObjectOptions) -> BotResult<String> {
        if !is_finite(&i) || !is_finite(&j) {
            return Err(BotError::invalid_input("coordinates", format!("{:?} {:?}", i, j), "Coordinates must be finite"));
        }
        let name = self
            .model
            .frame_add_by_coord(i, j, &options.prop_name, &options.user_name, &options.csys)?;
        debug!(name = %name, prop = %options.prop_name, "frame added");
        Ok(name)
    }

    /// Draw an area through `points` in the order given; returns the area's name.
    pub fn draw_area(&mut self, points: &[Point3D], options: &ObjectOptions) -> BotResult<String> {
        if points.len() < 3 {
            return Err(BotError::invalid_input(
                "points",
                points.len().to_string(),
                "An area needs at least 3 points",
            ));
        }
        if let Some(p) = points.iter().find(|p| !is_finite(p)) {
            return Err(BotError::invalid_input("points", format!("{:?}", p), "Coordinates must be finite"));
        }
        let name = self
            .model
            .area_add_by_coord(points, &options.prop_name, &options.user_name, &options.csys)?;
        debug!(name = %name, points = points.len(), "area added");
        Ok(name)
    }

    /// Draw an area from an unordered vertex set.
    ///
    /// Vertices are ordered clockwise about their plan centroid first, which
    /// gives a simple boundary for any convex (or star-shaped about the
    /// centroid) outline.
    pub fn draw_area_sorted(&mut self, points: &[Point3D], options: &ObjectOptions) -> BotResult<String> {
        let plan: Vec<Point2D> = points.iter().map(|p| p.xy()).collect();
        let order = sort_clockwise_about_centroid(&plan)?;

        let mut remaining: Vec<Point3D> = points.to_vec();
        let mut sorted = Vec::with_capacity(points.len());
        for p in order {
            if let Some(pos) = remaining.iter().position(|q| q.xy() == p) {
                sorted.push(remaining.swap_remove(pos));
            }
        }
        self.draw_area(&sorted, options)
    }

    /// Draw an area through existing points; the options' coordinate system is not used.
    pub fn draw_area_by_point(&mut self, point_names: &[String], options: &ObjectOptions) -> BotResult<String> {
        if point_names.len() < 3 {
            return Err(BotError::invalid_input(
                "point_names",
                point_names.len().to_string(),
                "An area needs at least 3 points",
            ));
        }
        let name = self
            .model
            .area_add_by_point(point_names, &options.prop_name, &options.user_name)?;
        debug!(name = %name, "area added by points");
        Ok(name)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn get_points(&self, frame: &str) -> BotResult<(String, String)> {
        self.model.frame_get_points(frame)
    }

    pub fn get_releases(&self, frame: &str) -> BotResult<FrameReleases> {
        self.model.frame_get_releases(frame)
    }

    pub fn get_loads_distributed(&self, name: &str, item_type: ItemType) -> BotResult<Vec<DistributedLoadAssignment>> {
        self.model.frame_get_load_distributed(name, item_type)
    }

    // ------------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------------

    pub fn assign_restraints(&mut self, point: &str, restraint: &Restraint, item_type: ItemType) -> BotResult<()> {
        debug!(point, restraint = ?restraint.to_array(), "assign restraint");
        self.model.point_set_restraint(point, restraint, item_type)
    }

    pub fn assign_point_load(
        &mut self,
        point: &str,
        pattern: &str,
        load: &PointLoad,
        item_type: ItemType,
    ) -> BotResult<()> {
        if load.forces.to_array().iter().any(|v| !v.is_finite()) {
            return Err(BotError::invalid_input("forces", format!("{:?}", load.forces), "Values must be finite"));
        }
        debug!(point, pattern, forces = ?load.forces.to_array(), csys = %load.csys, "assign point load");
        self.model
            .point_set_load_force(point, pattern, &load.forces, load.replace, &load.csys, item_type)
    }

    /// Assign a distributed load to a frame.
    ///
    /// The direction is resolved first and then checked against the load's
    /// coordinate system; either failure returns an error without calling the host.
    pub fn assign_frame_dist_load(
        &mut self,
        frame: &str,
        pattern: &str,
        direction: impl Into<CodeInput>,
        load: &DistributedLoad,
        item_type: ItemType,
    ) -> BotResult<Direction> {
        let direction = Direction::resolve(direction)?;
        check_coordinate_system(direction, &load.csys)?;
        load.validate()?;
        debug!(frame, pattern, direction = %direction, csys = %load.csys, "assign distributed load");
        self.model
            .frame_set_load_distributed(frame, pattern, direction, load, item_type)?;
        Ok(direction)
    }

    pub fn refresh_view(&mut self, window: i32, zoom: bool) -> BotResult<()> {
        self.model.refresh_view(window, zoom)
    }
}

fn launch_error(strategy: LaunchStrategy, context: String, err: BotError) -> BotError {
    match err {
        BotError::LaunchFailed { .. } => err,
        other => BotError::launch_failed(strategy.name(), format!("{}: {}", context, other)),
    }
}

/// Open a session as described by `config`.
///
/// Prepares the model directory, takes the model lock (if configured) and
/// gets hold of the host through `connector` using the configured strategy.
/// Failing to reach the host returns `BotError::LaunchFailed`, which callers
/// should treat as fatal.
pub fn connect<C: HostConnector>(config: &SessionConfig, connector: &mut C) -> BotResult<Session<C::Model>> {
    config.validate()?;
    prepare_api_dir(config);

    let model_path = config.model_path();
    let lock = if config.lock_model {
        Some(ModelLock::acquire(&model_path, current_user())?)
    } else {
        None
    };

    let strategy = config.launch;
    info!(strategy = %strategy, "connecting to host");
    let model = match strategy {
        LaunchStrategy::AttachToInstance => connector.attach(&config.prog_id).map_err(|e| {
            launch_error(
                strategy,
                "No running instance of the program found or failed to attach".to_string(),
                e,
            )
        })?,
        LaunchStrategy::StartFromPath => connector.start_from_path(&config.program_path).map_err(|e| {
            launch_error(
                strategy,
                format!("Cannot start a new instance of the program from {}", config.program_path.display()),
                e,
            )
        })?,
        LaunchStrategy::StartFromProgId => connector
            .start_from_prog_id(&config.prog_id)
            .map_err(|e| launch_error(strategy, "Cannot start a new instance of the program".to_string(), e))?,
    };

    info!(model = %model_path.display(), "session open");
    Ok(Session {
        model,
        model_path,
        present_units: None,
        _lock: lock,
    })
}

/// A connection to the CAD application's active drawing.
pub struct CadSession<C: CadApplication> {
    app: C,
    model_space: C::ModelSpace,
}

impl<C: CadApplication> CadSession<C> {
    /// Grab the model space of the active drawing; failure is a launch failure.
    pub fn connect(mut app: C) -> BotResult<Self> {
        let model_space = app
            .active_model_space(CAD_PROG_ID)
            .map_err(|e| launch_error(LaunchStrategy::AttachToInstance, "No active CAD drawing".to_string(), e))?;
        info!("CAD session open");
        Ok(CadSession { app, model_space })
    }

    pub fn app(&self) -> &C {
        &self.app
    }

    pub fn model_space(&self) -> &C::ModelSpace {
        &self.model_space
    }

    pub fn model_space_mut(&mut self) -> &mut C::ModelSpace {
        &mut self.model_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{HostCall, RecordingConnector, RecordingModel};
    use std::env::temp_dir;

    fn session() -> Session<RecordingModel> {
        let mut s = Session::new(RecordingModel::new(), temp_dir().join("csibot_session_unused.edb"));
        s.initialize("tonf_m_C").unwrap();
        s.new_model(&NewModelTemplate::Blank).unwrap();
        s
    }

    fn journal_len(s: &Session<RecordingModel>) -> usize {
        s.model().journal.len()
    }

    fn temp_config(name: &str) -> SessionConfig {
        SessionConfig::default().with_api_dir(temp_dir().join(format!(
            "csibot_session_test_{}_{}",
            name,
            uuid::Uuid::new_v4()
        )))
    }

    #[test]
    fn test_initialize_accepts_code_or_label() {
        let mut s = Session::new(RecordingModel::new(), "unused.edb");
        assert_eq!(s.initialize(6).unwrap(), UnitSystem::KnMC);
        assert_eq!(s.initialize("kip_in_F").unwrap(), UnitSystem::KipInF);
        assert_eq!(s.initialize(UnitSystem::NMmC).unwrap(), UnitSystem::NMmC);
        assert_eq!(s.present_units(), Some(UnitSystem::NMmC));
    }

    #[test]
    fn test_initialize_rejects_unknown_units() {
        let mut s = Session::new(RecordingModel::new(), "unused.edb");
        let err = s.initialize("tonf_km_C").unwrap_err();
        assert_eq!(err.to_string(), "Not recognized units: tonf_km_C");
        assert!(s.initialize(17).is_err());
        assert!(s.initialize(0).is_err());
        assert_eq!(journal_len(&s), 0);
    }

    #[test]
    fn test_switch_units() {
        let mut s = session();
        assert_eq!(s.switch_units("kN_mm_C").unwrap(), UnitSystem::KnMmC);
        assert_eq!(s.model().state.present_units, Some(UnitSystem::KnMmC));

        let before = journal_len(&s);
        assert!(s.switch_units("bogus").is_err());
        assert_eq!(journal_len(&s), before);
        assert_eq!(s.present_units(), Some(UnitSystem::KnMmC));
    }

    #[test]
    fn test_define_material_forwards_two_calls() {
        let mut s = session();
        let before = journal_len(&s);
        let props = IsotropicProperties::new(2.5e6, 0.2, 9.9e-6);
        assert_eq!(s.define_material("C25", "Concrete", &props).unwrap(), MaterialType::Concrete);

        let calls: Vec<&HostCall> = s.model().journal[before..].iter().map(|e| &e.call).collect();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], HostCall::SetMaterial { mat_type: MaterialType::Concrete, .. }));
        assert!(matches!(calls[1], HostCall::SetMpIsotropic { .. }));
    }

    #[test]
    fn test_define_material_rejects_unknown_type() {
        let mut s = session();
        let before = journal_len(&s);
        let props = IsotropicProperties::new(2.5e6, 0.2, 9.9e-6);
        let err = s.define_material("W1", "Wood", &props).unwrap_err();
        assert!(matches!(err, BotError::UnrecognizedCode { ref kind, .. } if kind == "material type"));
        assert!(s.define_material("W1", 9, &props).is_err());
        assert_eq!(journal_len(&s), before);
    }

    #[test]
    fn test_define_section_and_pattern() {
        let mut s = session();
        s.define_material("C25", MaterialType::Concrete, &IsotropicProperties::new(2.5e6, 0.2, 9.9e-6))
            .unwrap();
        s.define_rectangular_frame_section(
            "B30x50",
            "C25",
            &RectangularSection { t3: 0.5, t2: 0.3 },
            &FrameModifiers::cracked_beam(),
        )
        .unwrap();
        let section = &s.model().state.sections["B30x50"];
        assert_eq!(section.modifiers, FrameModifiers::cracked_beam());

        assert_eq!(s.define_load_pattern("LIVE", 3, 0.0, true).unwrap(), LoadPatternType::Live);
        assert!(s.define_load_pattern("SNOW", "snow", 0.0, true).is_err());
        assert!(s.define_load_pattern("", "Snow", 0.0, true).is_err());
    }

    #[test]
    fn test_section_with_unknown_material_is_host_error() {
        let mut s = session();
        let err = s
            .define_rectangular_frame_section(
                "B1",
                "Missing",
                &RectangularSection { t3: 0.5, t2: 0.3 },
                &FrameModifiers::default(),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "HOST_CALL_FAILED");
    }

    #[test]
    fn test_frame_dist_load_direction_rules() {
        let mut s = session();
        s.define_load_pattern("DEAD", "Dead", 1.0, true).unwrap();
        let frame = s
            .draw_frame(Point3D::new(0.0, 0.0, 0.0), Point3D::new(5.0, 0.0, 0.0), &ObjectOptions::default())
            .unwrap();

        let global = DistributedLoad::uniform(-1.0);
        let local = global.clone().in_csys("Local");

        assert_eq!(
            s.assign_frame_dist_load(&frame, "DEAD", "Gravity", &global, ItemType::Objects).unwrap(),
            Direction::Gravity
        );
        assert_eq!(
            s.assign_frame_dist_load(&frame, "DEAD", 2, &local, ItemType::Objects).unwrap(),
            Direction::Local2
        );
        assert_eq!(
            s.assign_frame_dist_load(&frame, "DEAD", "Projected X", &global, ItemType::Objects).unwrap(),
            Direction::ProjectedX
        );

        let before = journal_len(&s);
        let err = s
            .assign_frame_dist_load(&frame, "DEAD", "Gravity", &local, ItemType::Objects)
            .unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_CSYS");
        let err = s
            .assign_frame_dist_load(&frame, "DEAD", "Local 1", &global, ItemType::Objects)
            .unwrap_err();
        assert_eq!(err.error_code(), "INCOMPATIBLE_CSYS");
        let err = s
            .assign_frame_dist_load(&frame, "DEAD", "Down", &global, ItemType::Objects)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNRECOGNIZED_CODE");
        assert_eq!(journal_len(&s), before);

        let loads = s.get_loads_distributed(&frame, ItemType::Objects).unwrap();
        assert_eq!(loads.len(), 3);
        assert_eq!(loads[0].direction, Direction::Gravity);
    }

    #[test]
    fn test_draw_frame_and_query_points() {
        let mut s = session();
        let a = s
            .draw_frame(Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.0, 3.0), &ObjectOptions::default())
            .unwrap();
        let b = s
            .draw_frame(Point3D::new(0.0, 0.0, 3.0), Point3D::new(6.0, 0.0, 3.0), &ObjectOptions::default())
            .unwrap();
        let (_, a_top) = s.get_points(&a).unwrap();
        let (b_start, _) = s.get_points(&b).unwrap();
        assert_eq!(a_top, b_start);
        assert_eq!(s.get_releases(&a).unwrap(), FrameReleases::default());
        assert!(s.get_points("nope").is_err());
    }

    #[test]
    fn test_draw_area_sorted_orders_vertices() {
        let mut s = session();
        let shuffled = [
            Point3D::new(1.0, 3.0, 0.0),
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(0.0, 3.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
        ];
        s.draw_area_sorted(&shuffled, &ObjectOptions::default()).unwrap();
        let last = &s.model().journal.last().unwrap().call;
        match last {
            HostCall::AreaAddByCoord { points, .. } => {
                let plan: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
                assert_eq!(plan, vec![[1.0, 0.0], [0.0, 0.0], [0.0, 3.0], [1.0, 3.0]]);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_draw_area_needs_three_points() {
        let mut s = session();
        let two = [Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.0)];
        assert!(s.draw_area(&two, &ObjectOptions::default()).is_err());
        let names = vec!["1".to_string(), "2".to_string()];
        assert!(s.draw_area_by_point(&names, &ObjectOptions::default()).is_err());
    }

    #[test]
    fn test_restraints_and_point_loads() {
        let mut s = session();
        s.define_load_pattern("LIVE", "Live", 0.0, true).unwrap();
        let col = s
            .draw_frame(Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.0, 3.0), &ObjectOptions::default())
            .unwrap();
        let (base, top) = s.get_points(&col).unwrap();

        s.assign_restraints(&base, &Restraint::fixed(), ItemType::Objects).unwrap();
        assert_eq!(s.model().state.points[&base].restraint, Restraint::fixed());

        let load = PointLoad {
            forces: crate::model::PointForces { f3: -5.0, ..Default::default() },
            ..Default::default()
        };
        s.assign_point_load(&top, "LIVE", &load, ItemType::Objects).unwrap();
        assert!(s.assign_point_load(&top, "WIND", &load, ItemType::Objects).is_err());
    }

    #[test]
    fn test_save_writes_recording() {
        let config = temp_config("save");
        let mut s = session();
        s.model_path = config.model_path();
        std::fs::create_dir_all(&config.api_dir).unwrap();
        s.save_model().unwrap();
        assert!(config.model_path().exists());
        let loaded = crate::file_io::load_recording(&config.model_path()).unwrap();
        assert!(matches!(loaded.journal.last().unwrap().call, HostCall::Save { .. }));
        let _ = std::fs::remove_dir_all(&config.api_dir);
    }

    #[test]
    fn test_connect_with_each_strategy() {
        for strategy in [
            LaunchStrategy::AttachToInstance,
            LaunchStrategy::StartFromPath,
            LaunchStrategy::StartFromProgId,
        ] {
            let config = temp_config("connect").with_launch(strategy);
            let mut connector = RecordingConnector::default();
            let session = connect(&config, &mut connector).unwrap();
            assert_eq!(session.model_path(), config.model_path());
            assert!(config.api_dir.is_dir());
            assert_eq!(connector.launches, vec![strategy]);
            drop(session);
            let _ = std::fs::remove_dir_all(&config.api_dir);
        }
    }

    #[test]
    fn test_connect_attach_failure_is_fatal() {
        let config = temp_config("fatal");
        let mut connector = RecordingConnector {
            running_instance: false,
            ..Default::default()
        };
        let err = connect(&config, &mut connector).err().unwrap();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("No running instance"));
        let _ = std::fs::remove_dir_all(&config.api_dir);
    }

    #[test]
    fn test_connect_holds_model_lock() {
        let config = temp_config("lock");
        let mut connector = RecordingConnector::default();
        let first = connect(&config, &mut connector).unwrap();
        let err = connect(&config, &mut connector).err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        drop(first);
        assert!(connect(&config, &mut connector).is_ok());
        let _ = std::fs::remove_dir_all(&config.api_dir);
    }

    struct FakeCad {
        has_drawing: bool,
        asked_for: Option<String>,
    }

    impl CadApplication for FakeCad {
        type ModelSpace = Vec<String>;

        fn active_model_space(&mut self, prog_id: &str) -> BotResult<Self::ModelSpace> {
            self.asked_for = Some(prog_id.to_string());
            if self.has_drawing {
                Ok(Vec::new())
            } else {
                Err(BotError::host_call("ActiveDocument", 1))
            }
        }
    }

    #[test]
    fn test_cad_session() {
        let mut cad = CadSession::connect(FakeCad {
            has_drawing: true,
            asked_for: None,
        })
        .unwrap();
        cad.model_space_mut().push("LINE".to_string());
        assert_eq!(cad.model_space().len(), 1);
        assert!(cad.app().has_drawing);
        assert_eq!(cad.app().asked_for.as_deref(), Some("AutoCAD.Application"));

        let err = CadSession::connect(FakeCad {
            has_drawing: false,
            asked_for: None,
        })
        .err()
        .unwrap();
        assert!(err.is_fatal());
    }
}
