//! # Session Configuration
//!
//! How a session reaches the host application and where it keeps its model
//! file. The launch mode is an explicit [`LaunchStrategy`] chosen once, before
//! connecting.
//!
//! Configuration is plain JSON; every field is optional:
//!
//! ```json
//! {
//!   "launch": { "strategy": "start_from_path" },
//!   "program_path": "C:\\Program Files\\Computers and Structures\\ETABS 20",
//!   "api_dir": "D:\\Models\\CSIBot",
//!   "model_file": "API_1-001.edb"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{BotError, BotResult};
use crate::host::ETABS_PROG_ID;

/// How to get hold of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LaunchStrategy {
    /// Attach to an instance that is already running
    #[default]
    AttachToInstance,
    /// Start a new instance from `program_path`
    StartFromPath,
    /// Start a new instance of the registered program id
    StartFromProgId,
}

impl LaunchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LaunchStrategy::AttachToInstance => "attach_to_instance",
            LaunchStrategy::StartFromPath => "start_from_path",
            LaunchStrategy::StartFromProgId => "start_from_prog_id",
        }
    }
}

impl std::str::FromStr for LaunchStrategy {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attach" | "attach_to_instance" => Ok(LaunchStrategy::AttachToInstance),
            "path" | "start_from_path" => Ok(LaunchStrategy::StartFromPath),
            "prog-id" | "start_from_prog_id" => Ok(LaunchStrategy::StartFromProgId),
            other => Err(BotError::unrecognized("launch strategy", other)),
        }
    }
}

impl std::fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything needed to open a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub launch: LaunchStrategy,
    /// Installation directory, used by [`LaunchStrategy::StartFromPath`]
    pub program_path: PathBuf,
    /// Program id, used by attach and [`LaunchStrategy::StartFromProgId`]
    pub prog_id: String,
    /// Directory holding the model file; created on connect
    pub api_dir: PathBuf,
    /// Model file name inside `api_dir`
    pub model_file: String,
    /// Hold an advisory lock on the model file for the session's lifetime
    pub lock_model: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            launch: LaunchStrategy::AttachToInstance,
            program_path: PathBuf::from(r"C:\Program Files\Computers and Structures\ETABS 20"),
            prog_id: ETABS_PROG_ID.to_string(),
            api_dir: PathBuf::from("CSIBotModels"),
            model_file: "API_1-001.edb".to_string(),
            lock_model: true,
        }
    }
}

impl SessionConfig {
    /// Full path of the model file
    pub fn model_path(&self) -> PathBuf {
        self.api_dir.join(&self.model_file)
    }

    pub fn with_launch(mut self, launch: LaunchStrategy) -> Self {
        self.launch = launch;
        self
    }

    pub fn with_api_dir(mut self, api_dir: impl Into<PathBuf>) -> Self {
        self.api_dir = api_dir.into();
        self
    }

    pub fn validate(&self) -> BotResult<()> {
        if self.model_file.trim().is_empty() {
            return Err(BotError::invalid_input("model_file", "", "Model file name must not be empty"));
        }
        if Path::new(&self.model_file).components().count() != 1 {
            return Err(BotError::invalid_input(
                "model_file",
                self.model_file.clone(),
                "Model file must be a plain file name",
            ));
        }
        if self.prog_id.trim().is_empty() {
            return Err(BotError::invalid_input("prog_id", "", "Program id must not be empty"));
        }
        Ok(())
    }
}

/// Load a configuration file.
pub fn load_config(path: &Path) -> BotResult<SessionConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BotError::file_error("read config", path.display().to_string(), e.to_string()))?;

    let config: SessionConfig = serde_json::from_str(&contents).map_err(|e| BotError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    config.validate()?;
    debug!(path = %path.display(), launch = %config.launch, "loaded session config");
    Ok(config)
}

/// Create the model directory if it is missing.
///
/// A failure is logged and otherwise ignored; saving the model will report it
/// again if the directory is really unusable.
pub fn prepare_api_dir(config: &SessionConfig) -> bool {
    if config.api_dir.as_os_str().is_empty() || config.api_dir.is_dir() {
        return true;
    }
    match fs::create_dir_all(&config.api_dir) {
        Ok(()) => {
            debug!(dir = %config.api_dir.display(), "created model directory");
            true
        }
        Err(e) => {
            warn!(dir = %config.api_dir.display(), error = %e, "could not create model directory");
            false
        }
    }
}
