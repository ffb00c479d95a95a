//! JSON-backed record stores for tasks and teams.
//!
//! Each store is a flat JSON document (pretty-printed, 2-space indent)
//! rewritten in full after every mutating command. A missing file is an
//! empty store, persisted as such on first load; a present but malformed
//! file is a hard [`StoreError::Corrupt`].
//!
//! The process shares one [`Stores`] instance behind a `tokio::sync::Mutex`
//! (see [`SharedStores`]) so background jobs and command handlers never
//! interleave a load-mutate-save sequence. Saves go through a temp file
//! and rename, so a failed write never truncates the live document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use taskbot_core::task::TaskRecord;
use taskbot_core::team::TeamRecord;

/// Errors that can occur while loading or saving a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file exists but could not be read.
    #[error("failed to read store file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file exists but is not well-formed JSON for this store.
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the malformed document.
        path: PathBuf,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// Writing the store back to disk failed (disk full, permissions, ...).
    #[error("failed to write store file {path}: {source}")]
    Write {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The store could not be serialized.
    #[error("failed to serialize store: {0}")]
    Serialize(serde_json::Error),
}

/// Serializes `value` pretty-printed and swaps it into place atomically.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).map_err(|source| StoreError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and deserializes a store document, mapping a missing file to `None`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// The ordered collection of task records plus its backing file.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<TaskRecord>,
}

impl TaskStore {
    /// Loads the task file, creating an empty persisted store if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or
    /// parsed, or if persisting the initial empty store fails.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match read_json(&path)? {
            Some(tasks) => Ok(Self { path, tasks }),
            None => {
                let store = Self {
                    path,
                    tasks: Vec::new(),
                };
                store.save()?;
                Ok(store)
            }
        }
    }

    /// Rewrites the full store to its backing file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or I/O failure.
    pub fn save(&self) -> Result<(), StoreError> {
        write_json(&self.path, &self.tasks)
    }

    /// The next task id: 1 for an empty store, else `max(id) + 1`.
    ///
    /// Deliberately recomputed from the current maximum rather than kept
    /// as a counter, so deleting the highest-numbered task reissues its id.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().map_or(1, |m| m + 1)
    }

    /// All tasks in creation order.
    #[must_use]
    pub fn all(&self) -> &[TaskRecord] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Looks up a task by id for mutation.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut TaskRecord> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Appends a new task record.
    pub fn push(&mut self, task: TaskRecord) {
        self.tasks.push(task);
    }

    /// Removes and returns the task with the given id, if present.
    pub fn remove(&mut self, id: u64) -> Option<TaskRecord> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Mutable iterator over every task (used by the team-delete cascade).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TaskRecord> {
        self.tasks.iter_mut()
    }
}

/// The mapping from team name to team record plus its backing file.
#[derive(Debug)]
pub struct TeamStore {
    path: PathBuf,
    teams: BTreeMap<String, TeamRecord>,
}

impl TeamStore {
    /// Loads the team file, creating an empty persisted store if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or
    /// parsed, or if persisting the initial empty store fails.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match read_json(&path)? {
            Some(teams) => Ok(Self { path, teams }),
            None => {
                let store = Self {
                    path,
                    teams: BTreeMap::new(),
                };
                store.save()?;
                Ok(store)
            }
        }
    }

    /// Rewrites the full store to its backing file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on serialization or I/O failure.
    pub fn save(&self) -> Result<(), StoreError> {
        write_json(&self.path, &self.teams)
    }

    /// Whether a team with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    /// Looks up a team by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TeamRecord> {
        self.teams.get(name)
    }

    /// Looks up a team by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TeamRecord> {
        self.teams.get_mut(name)
    }

    /// Inserts a team under the given name.
    pub fn insert(&mut self, name: String, team: TeamRecord) {
        self.teams.insert(name, team);
    }

    /// Removes and returns the team with the given name, if present.
    pub fn remove(&mut self, name: &str) -> Option<TeamRecord> {
        self.teams.remove(name)
    }

    /// All teams, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TeamRecord)> {
        self.teams.iter()
    }

    /// Number of teams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the store holds no teams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Both record stores, guarded together.
///
/// One lock covers the whole data directory: the team-delete cascade
/// touches both files, so a per-store lock would still need an ordering
/// discipline.
#[derive(Debug)]
pub struct Stores {
    /// The task store (`tasks.json`).
    pub tasks: TaskStore,
    /// The team store (`teams.json`).
    pub teams: TeamStore,
}

impl Stores {
    /// Opens (or initializes) both stores under the given data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or either
    /// file fails to load.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Write {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            tasks: TaskStore::load(data_dir.join("tasks.json"))?,
            teams: TeamStore::load(data_dir.join("teams.json"))?,
        })
    }
}

/// The process-wide store handle shared by handlers and background jobs.
pub type SharedStores = Arc<Mutex<Stores>>;
