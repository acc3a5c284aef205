//! JSON file state store.
//!
//! Keeps the record in a single pretty-printed JSON file:
//!
//! ```json
//! {
//!   "activeEvents": [],
//!   "currentTeams": {}
//! }
//! ```
//!
//! Every mutation is a full read-modify-write. Within one process the
//! cycles are serialized behind an async mutex; between processes the last
//! writer wins. Writes go to a sibling temp file and are renamed into place
//! so readers never see a half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use kultoura_types::{EventId, EventState, TeamId};

use crate::{EventStateStore, StoreError};

/// Default location of the state file, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = "data/admin-state.json";

/// An [`EventStateStore`] backed by a JSON file on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating the data directory and an empty
    /// record if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the directory or the initial file
    /// cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        store.ensure_dir().await?;
        if !tokio::fs::try_exists(&store.path)
            .await
            .map_err(|source| store.write_error(source))?
        {
            store.write(&EventState::default()).await?;
            info!(path = %store.path.display(), "Initialized event state file");
        }

        Ok(store)
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<EventState, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(EventState::default()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write(&self, state: &EventState) -> Result<(), StoreError> {
        self.ensure_dir().await?;

        let mut contents = serde_json::to_string_pretty(state)?;
        contents.push('\n');

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|source| self.write_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.write_error(source))?;
        Ok(())
    }

    async fn update(&self, mutate: impl FnOnce(&mut EventState) + Send) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        // Only a corrupt record is replaced; I/O faults fail the write.
        let mut state = match self.read().await {
            Ok(state) => state,
            Err(StoreError::Serialization(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Corrupt event state, rewriting from defaults"
                );
                EventState::default()
            }
            Err(e) => return Err(e),
        };
        mutate(&mut state);
        self.write(&state).await?;

        debug!(path = %self.path.display(), "Wrote event state");
        Ok(())
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| self.write_error(source)),
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl EventStateStore for JsonFileStore {
    async fn snapshot(&self) -> Result<EventState, StoreError> {
        self.read().await
    }

    async fn set_event_active(&self, event_id: &EventId, active: bool) -> Result<(), StoreError> {
        self.update(|state| state.set_active(event_id, active)).await
    }

    async fn set_current_team(
        &self,
        event_id: &EventId,
        team_id: Option<&TeamId>,
    ) -> Result<(), StoreError> {
        self.update(|state| state.set_current_team(event_id, team_id))
            .await
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
