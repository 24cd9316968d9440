//! # CSIBot CLI
//!
//! Command line front end for `csibot_core`: clockwise point sorting, the host
//! code tables, the direction / coordinate-system check, and dry runs of
//! session scripts against the recording backend.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use csibot_core::codes::{
    validate_coordinate_system, CodeInput, CoordinateSystem, Direction, DistributedLoadType, HostCode, ItemType,
    LoadPatternType, MaterialType, UnitSystem,
};
use csibot_core::config::{load_config, LaunchStrategy, SessionConfig};
use csibot_core::errors::BotError;
use csibot_core::file_io::save_recording;
use csibot_core::geometry::{format_point, sort_clockwise, AngleDistanceKey, Point2D, Vector2D};
use csibot_core::recording::RecordingConnector;
use csibot_core::script::{load_script, run_script, Script};
use csibot_core::session::connect;

#[derive(Parser)]
#[command(name = "csibot")]
#[command(about = "Parameter translation for structural analysis automation")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print points in clockwise order about an origin
    Sort {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        origin: Point2D,
        /// Direction of angle zero
        #[arg(long, value_parser = parse_vector, default_value = "1,0", allow_hyphen_values = true)]
        reference: Vector2D,
        /// Points as X,Y
        #[arg(value_parser = parse_point, required = true, allow_hyphen_values = true)]
        points: Vec<Point2D>,
        #[arg(long)]
        json: bool,
    },
    /// Print the host code tables
    Codes {
        table: Option<Table>,
    },
    /// Check whether a load direction may be used in a coordinate system
    CheckDirection { direction: String, csys: String },
    /// Run a script against the recording backend and save the recording
    DryRun {
        script: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// attach, path or prog-id
        #[arg(long)]
        strategy: Option<LaunchStrategy>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Units,
    Material,
    LoadPattern,
    Direction,
    Item,
    LoadType,
}

fn parse_point(s: &str) -> std::result::Result<Point2D, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("bad X in '{}'", s))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("bad Y in '{}'", s))?;
    Ok(Point2D::new(x, y))
}

fn parse_vector(s: &str) -> std::result::Result<Vector2D, String> {
    parse_point(s).map(|p| p.coords)
}

/// Integers are codes, anything else is a label
fn code_input(s: &str) -> CodeInput {
    s.trim()
        .parse::<i64>()
        .map(CodeInput::Code)
        .unwrap_or_else(|_| CodeInput::from(s))
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sort {
            origin,
            reference,
            points,
            json,
        } => sort(origin, reference, &points, json),
        Action::Codes { table } => {
            codes(table);
            Ok(ExitCode::SUCCESS)
        }
        Action::CheckDirection { direction, csys } => check_direction(&direction, &csys),
        Action::DryRun {
            script,
            config,
            strategy,
        } => dry_run(script, config, strategy),
    }
}

fn sort(origin: Point2D, reference: Vector2D, points: &[Point2D], json: bool) -> Result<ExitCode> {
    let sorted = sort_clockwise(points, origin, reference)?;
    if json {
        println!("{}", serde_json::to_string(&sorted)?);
        return Ok(ExitCode::SUCCESS);
    }
    for p in sorted {
        let key = AngleDistanceKey::compute(p, origin, reference);
        println!("{:<24} angle {:>9.5}  distance {:>9.4}", format_point(&p), key.angle, key.distance);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table<T: HostCode>() {
    println!("{}:", T::KIND);
    for (code, label) in T::table() {
        println!("  {:>3}  {}", code, label);
    }
}

fn codes(table: Option<Table>) {
    let tables = match table {
        Some(t) => vec![t],
        None => vec![
            Table::Units,
            Table::Material,
            Table::LoadPattern,
            Table::Direction,
            Table::Item,
            Table::LoadType,
        ],
    };
    for t in tables {
        match t {
            Table::Units => print_table::<UnitSystem>(),
            Table::Material => print_table::<MaterialType>(),
            Table::LoadPattern => print_table::<LoadPatternType>(),
            Table::Direction => print_table::<Direction>(),
            Table::Item => print_table::<ItemType>(),
            Table::LoadType => print_table::<DistributedLoadType>(),
        }
    }
}

/// Whether the direction is allowed in the coordinate system, with the line to print
fn direction_verdict(direction: &str, csys: &str) -> Result<(bool, String)> {
    let direction = Direction::resolve(code_input(direction))?;
    let csys = CoordinateSystem::from(csys);
    if validate_coordinate_system(direction, &csys) {
        Ok((true, format!("accepted: {} in {}", direction, csys)))
    } else {
        Ok((false, format!("rejected: {} is not valid in {}", direction, csys)))
    }
}

fn check_direction(direction: &str, csys: &str) -> Result<ExitCode> {
    let (accepted, verdict) = direction_verdict(direction, csys)?;
    println!("{}", verdict);
    Ok(if accepted { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// How a dry run ended
#[derive(Debug)]
enum DryRunOutcome {
    Completed,
    StepFailed,
    /// No host to talk to; the process exits with -1
    LaunchFailed(BotError),
}

fn dry_run(script_path: PathBuf, config_path: Option<PathBuf>, strategy: Option<LaunchStrategy>) -> Result<ExitCode> {
    let mut config = match &config_path {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(strategy) = strategy {
        config = config.with_launch(strategy);
    }
    let script = load_script(&script_path)?;

    match run_dry(&script, &config, &mut RecordingConnector::default())? {
        DryRunOutcome::Completed => Ok(ExitCode::SUCCESS),
        DryRunOutcome::StepFailed => Ok(ExitCode::FAILURE),
        DryRunOutcome::LaunchFailed(e) => {
            eprintln!("{}", e);
            std::process::exit(-1);
        }
    }
}

fn run_dry(script: &Script, config: &SessionConfig, connector: &mut RecordingConnector) -> Result<DryRunOutcome> {
    let mut session = match connect(config, connector) {
        Ok(session) => session,
        Err(e) if e.is_fatal() => return Ok(DryRunOutcome::LaunchFailed(e)),
        Err(e) => return Err(e.into()),
    };

    let outcome = run_script(&mut session, script);
    save_recording(session.model(), session.model_path())?;
    tracing::info!(path = %session.model_path().display(), "recording saved");

    match outcome {
        Ok(records) => {
            for record in &records {
                match &record.output {
                    Some(output) => println!("{:>3}  {:<34} {}", record.step, record.op, output),
                    None => println!("{:>3}  {}", record.step, record.op),
                }
            }
            println!("{}", session.model().summary());
            Ok(DryRunOutcome::Completed)
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", session.model().summary());
            Ok(DryRunOutcome::StepFailed)
        }
    }
}
