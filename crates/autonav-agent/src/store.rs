//! Persistent vehicle state storage.
//!
//! One JSON record per file, replaced atomically (write-then-rename) so a
//! crashed write never leaves a torn record for the next load.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use autonav_core::VehicleState;
use thiserror::Error;

use crate::events::EventLog;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("persistence failure: {0}")]
    Persistence(#[from] io::Error),
    /// State record failed to decode (or encode).
    #[error("stored state corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    saves: AtomicU64,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            saves: AtomicU64::new(0),
        }
    }

    /// Load the persisted state. `Ok(None)` means no prior state exists.
    pub fn load(&self) -> Result<Option<VehicleState>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Persist the state: write a sibling temp file, then rename it over the
    /// target.
    pub fn save(&self, state: &VehicleState) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &self.path)?;
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Completed saves since creation, for diagnostics.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

/// Load the persisted state, defaulting on absence or on an unusable file,
/// and emit the matching lifecycle event.
///
/// An undecodable or unreadable state file is logged as a warning and
/// treated exactly like a fresh start; it never propagates.
pub fn init_state(store: &StateStore, events: &EventLog) -> VehicleState {
    match store.load() {
        Ok(Some(state)) => {
            events.emit("resumed vehicle state from persistent storage");
            state
        }
        Ok(None) => {
            events.emit("vehicle state initialized");
            VehicleState::default()
        }
        Err(err) => {
            tracing::warn!("stored state unusable, starting fresh: {}", err);
            events.emit("vehicle state initialized");
            VehicleState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> (StateStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("autonav-{}-{}.json", tag, uuid::Uuid::new_v4()));
        (StateStore::new(&path), path)
    }

    fn temp_log(tag: &str) -> (EventLog, PathBuf) {
        let path = std::env::temp_dir().join(format!("autonav-{}-{}.log", tag, uuid::Uuid::new_v4()));
        (EventLog::new(&path), path)
    }

    #[test]
    fn load_absent_file_is_none() {
        let (store, _path) = temp_store("absent");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (store, path) = temp_store("roundtrip");
        let mut state = VehicleState::default();
        state.iteration_count = 7;
        state.last_scene = "clear highway cruise".to_string();

        store.save(&state).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(store.save_count(), 1);

        // No temp artifact left behind after the rename.
        assert!(!path.with_extension("tmp").exists());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn corrupt_file_reports_corrupt() {
        let (store, path) = temp_store("corrupt");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn init_state_defaults_on_missing_file_and_emits_initialized() {
        let (store, _state_path) = temp_store("init-fresh");
        let (events, log_path) = temp_log("init-fresh");

        let state = init_state(&store, &events);
        assert_eq!(state.iteration_count, 0);
        assert!(state.last_scene.is_empty());

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("vehicle state initialized"));
        assert!(!log.contains("resumed"));
        fs::remove_file(&log_path).ok();
    }

    #[test]
    fn init_state_defaults_on_corrupt_file() {
        let (store, state_path) = temp_store("init-corrupt");
        let (events, log_path) = temp_log("init-corrupt");
        fs::write(&state_path, b"not a state record").unwrap();

        let state = init_state(&store, &events);
        assert_eq!(state.iteration_count, 0);

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("vehicle state initialized"));
        fs::remove_file(&state_path).ok();
        fs::remove_file(&log_path).ok();
    }

    #[test]
    fn init_state_resumes_existing_record() {
        let (store, state_path) = temp_store("init-resume");
        let (events, log_path) = temp_log("init-resume");

        let mut persisted = VehicleState::default();
        persisted.iteration_count = 99;
        store.save(&persisted).unwrap();

        let state = init_state(&store, &events);
        assert_eq!(state.iteration_count, 99);

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("resumed vehicle state"));
        fs::remove_file(&state_path).ok();
        fs::remove_file(&log_path).ok();
    }
}
