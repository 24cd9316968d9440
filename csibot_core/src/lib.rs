//! # csibot_core - Parameter Translation for Structural Analysis Automation
//!
//! `csibot_core` sits between a script and the automation interface of a
//! structural-analysis application (and a CAD application). It turns friendly
//! inputs into the integer codes and positional arguments the host expects,
//! checks the rules the host would otherwise reject or silently misapply, and
//! forwards the calls.
//!
//! ## Design Philosophy
//!
//! - **Typed codes**: units, material types, load patterns and directions are
//!   enums with a fixed code/label table, accepted as either form
//! - **Explicit rejections**: every invalid request comes back as a
//!   [`BotError`] and never reaches the host
//! - **Host behind traits**: [`host::StructuralModel`] is the whole host
//!   surface; [`recording::RecordingModel`] implements it in memory
//! - **JSON-First**: all inputs and results implement Serialize/Deserialize
//!
//! ## Quick Start
//!
//! ```rust
//! use csibot_core::geometry::{default_reference, sort_clockwise, Point2D};
//!
//! let points = [Point2D::new(2.0, 3.0), Point2D::new(5.0, 2.0), Point2D::new(1.0, 2.0)];
//! let sorted = sort_clockwise(&points, Point2D::new(3.0, 2.0), default_reference()).unwrap();
//! assert_eq!(sorted[0], Point2D::new(5.0, 2.0));
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Clockwise angular sort key and point ordering
//! - [`codes`] - Host code tables and the direction / coordinate-system rule
//! - [`model`] - Material, section, load and template values
//! - [`host`] - Traits for the host applications
//! - [`session`] - Translation layer and bootstrap
//! - [`config`] - Launch strategy and model location
//! - [`recording`] - In-memory host that journals every call
//! - [`script`] - JSON scripts of session operations
//! - [`errors`] - Structured error types
//! - [`file_io`] - Recording files with atomic saves
//! - [`lock`] - Advisory lock on the model file

pub mod codes;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod host;
pub mod lock;
pub mod model;
pub mod recording;
pub mod script;
pub mod session;

// Re-export commonly used types at crate root for convenience
pub use codes::{CodeInput, CoordinateSystem, Direction, HostCode, LoadPatternType, MaterialType, UnitSystem};
pub use config::{LaunchStrategy, SessionConfig};
pub use errors::{BotError, BotResult};
pub use geometry::{sort_clockwise, AngleDistanceKey, Point2D, Point3D, Vector2D};
pub use session::{connect, Session};
