//! # File I/O
//!
//! Saving and loading recordings of a model session.
//!
//! A recording is the JSON form of a [`RecordingModel`]: its header, the model
//! snapshot and the call journal. Saves are atomic (write `.tmp`, fsync,
//! rename) so an interrupted save never leaves a truncated file behind, and
//! loads check the schema version.
//!
//! ```rust,no_run
//! use csibot_core::file_io::load_recording;
//! use std::path::Path;
//!
//! let recording = load_recording(Path::new("CSIBotModels/API_1-001.edb"))?;
//! println!("{}", recording.summary());
//! # Ok::<(), csibot_core::errors::BotError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{BotError, BotResult};
use crate::lock::{LockInfo, ModelLock};
use crate::recording::RecordingModel;

/// Schema version written into every recording
pub const SCHEMA_VERSION: &str = "0.1.0";

/// `model.edb` → `model.edb.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp_path = path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

/// Save a recording with atomic write semantics.
pub fn save_recording(recording: &RecordingModel, path: &Path) -> BotResult<()> {
    let json = serde_json::to_string_pretty(recording)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| BotError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| BotError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| BotError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BotError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), calls = recording.journal.len(), "recording saved");
    Ok(())
}

/// Load a recording.
///
/// # Errors
///
/// * `BotError::FileError` - the file cannot be read
/// * `BotError::SerializationError` - the file is not a recording
/// * `BotError::VersionMismatch` - the file was written by a newer schema
pub fn load_recording(path: &Path) -> BotResult<RecordingModel> {
    let contents = fs::read_to_string(path)
        .map_err(|e| BotError::file_error("read", path.display().to_string(), e.to_string()))?;

    let recording: RecordingModel = serde_json::from_str(&contents).map_err(|e| BotError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&recording.meta.version)?;
    Ok(recording)
}

/// Load a recording along with the current holder of its model lock, if any
pub fn load_recording_with_lock_check(path: &Path) -> BotResult<(RecordingModel, Option<LockInfo>)> {
    let recording = load_recording(path)?;
    Ok((recording, ModelLock::check(path)))
}

/// Major versions must match; while on 0.x, files from a newer minor are refused.
fn validate_version(file_version: &str) -> BotResult<()> {
    let mismatch = || BotError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };
    let (Some(file_parts), Some(current_parts)) = (parse(file_version), parse(SCHEMA_VERSION)) else {
        return Err(mismatch());
    };
    if file_parts.len() < 2 || current_parts.len() < 2 {
        return Err(mismatch());
    }

    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::UnitSystem;
    use crate::host::StructuralModel;
    use std::env::temp_dir;

    fn temp_recording_path(name: &str) -> PathBuf {
        temp_dir().join(format!("csibot_file_io_test_{}_{}.edb", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_tmp_path_generation() {
        assert_eq!(tmp_path_for(Path::new("/models/a.edb")), Path::new("/models/a.edb.tmp"));
        assert_eq!(tmp_path_for(Path::new("model")), Path::new("model.tmp"));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_recording_path("roundtrip");
        let mut recording = RecordingModel::new();
        recording.initialize_new_model(UnitSystem::KipFtF).unwrap();
        recording.add_load_pattern("DEAD", crate::codes::LoadPatternType::Dead, 1.0, true).unwrap();

        save_recording(&recording, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let loaded = load_recording(&path).unwrap();
        assert_eq!(loaded, recording);
        assert_eq!(loaded.state.units, Some(UnitSystem::KipFtF));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_reports_lock_holder() {
        let path = temp_recording_path("locked");
        save_recording(&RecordingModel::new(), &path).unwrap();

        let (_, holder) = load_recording_with_lock_check(&path).unwrap();
        assert!(holder.is_none());

        let lock = ModelLock::acquire(&path, "drafter").unwrap();
        let (_, holder) = load_recording_with_lock_check(&path).unwrap();
        assert_eq!(holder.map(|h| h.owner), Some("drafter".to_string()));

        drop(lock);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_recording_path("garbage");
        fs::write(&path, "not a recording").unwrap();
        assert_eq!(load_recording(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);

        assert_eq!(load_recording(&path).unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.0.7").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("one").is_err());
    }

    #[test]
    fn test_newer_file_is_refused() {
        let path = temp_recording_path("newer");
        let mut recording = RecordingModel::new();
        recording.meta.version = "0.9.0".to_string();
        save_recording(&recording, &path).unwrap();

        let err = load_recording(&path).unwrap_err();
        assert!(matches!(err, BotError::VersionMismatch { .. }));
        let _ = fs::remove_file(&path);
    }
}
