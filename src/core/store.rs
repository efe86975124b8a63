//! Persistent enrollment state
//!
//! One [`EnrollmentStore`] owns every piece of in-progress enrollment data:
//! the three group drafts and the set of completed steps. It is rewritten to
//! durable storage after every mutation and restored on startup. Storage
//! problems never surface to the wizard; they are logged and the in-memory
//! state stays authoritative.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::core::navigation::Step;
use crate::entities::{
    AcademicDraft, AddressGuardianDraft, EnrollmentDraft, FormGroup, Group, GroupPatch,
    StudentDraft,
};

/// Key under which the envelope is kept in key/value storage
pub const STORAGE_KEY: &str = "enrollment_form_data";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("Failed to encode enrollment state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// The durable envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub student_details: StudentDraft,
    pub academic_details: AcademicDraft,
    pub address_guardian: AddressGuardianDraft,
    pub completed_steps: BTreeSet<u8>,
}

impl PersistedState {
    /// Decode an envelope, dropping step markers outside 1..=3
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut state: PersistedState = serde_json::from_str(text)?;
        state
            .completed_steps
            .retain(|n| Step::from_number(*n).is_some());
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Where the envelope lives between runs
pub trait StateStorage {
    /// The stored envelope text, or `None` if nothing was saved
    fn read(&self) -> Result<Option<String>, StoreError>;

    fn write(&self, contents: &str) -> Result<(), StoreError>;

    /// Delete the stored envelope; deleting nothing is not an error
    fn remove(&self) -> Result<(), StoreError>;

    /// Human readable location for messages
    fn describe(&self) -> String;
}

/// Envelope kept as one JSON file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            location: self.path.display().to_string(),
            source,
        }
    }
}

impl StateStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Write-then-rename so a crash never leaves a half-written envelope
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory key/value storage; clones share the same slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored envelope, if any
    pub fn contents(&self) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(STORAGE_KEY)
            .cloned()
    }

    /// Replace the stored envelope text
    pub fn seed(&self, contents: &str) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(STORAGE_KEY.to_string(), contents.to_string());
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        self.seed(contents);
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(STORAGE_KEY);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", STORAGE_KEY)
    }
}

/// Single owner of all persisted enrollment state
pub struct EnrollmentStore {
    storage: Box<dyn StateStorage>,
    state: PersistedState,
}

impl EnrollmentStore {
    /// Restore state from `storage`.
    ///
    /// Missing, unreadable or malformed envelopes yield empty defaults.
    pub fn load(storage: impl StateStorage + 'static) -> Self {
        let state = match storage.read() {
            Ok(Some(text)) => match PersistedState::from_json(&text) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        "Discarding malformed enrollment state in {}: {}",
                        storage.describe(),
                        e
                    );
                    PersistedState::default()
                }
            },
            Ok(None) => {
                tracing::debug!("No saved enrollment state in {}", storage.describe());
                PersistedState::default()
            }
            Err(e) => {
                tracing::warn!("Could not read enrollment state: {}", e);
                PersistedState::default()
            }
        };

        Self {
            storage: Box::new(storage),
            state,
        }
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    /// Current draft of one group
    pub fn group<G: FormGroup>(&self) -> &G {
        G::slice(&self.state)
    }

    /// Shallow-merge the patch's present fields into its group and persist
    pub fn update_group(&mut self, patch: impl Into<GroupPatch>) {
        match patch.into() {
            GroupPatch::Student(draft) => self.state.student_details.merge(draft),
            GroupPatch::Academic(draft) => self.state.academic_details.merge(draft),
            GroupPatch::AddressGuardian(draft) => self.state.address_guardian.merge(draft),
        }
        self.persist();
    }

    /// Remove one field from a group and persist
    pub fn clear_field(&mut self, group: Group, field: &str) {
        match group {
            Group::Student => self.state.student_details.clear_field(field),
            Group::Academic => self.state.academic_details.clear_field(field),
            Group::AddressGuardian => self.state.address_guardian.clear_field(field),
        }
        self.persist();
    }

    /// Record a step as completed. Marking twice changes nothing.
    pub fn mark_step_completed(&mut self, step: Step) {
        self.state.completed_steps.insert(step.number());
        self.persist();
    }

    pub fn is_completed(&self, step: Step) -> bool {
        self.state.completed_steps.contains(&step.number())
    }

    pub fn completed_steps(&self) -> &BTreeSet<u8> {
        &self.state.completed_steps
    }

    /// All three groups merged into one draft record
    pub fn get_all(&self) -> EnrollmentDraft {
        EnrollmentDraft {
            student: self.state.student_details.clone(),
            academic: self.state.academic_details.clone(),
            address: self.state.address_guardian.clone(),
        }
    }

    /// Forget everything, including the durable copy
    pub fn clear_all(&mut self) {
        self.state = PersistedState::default();
        if let Err(e) = self.storage.remove() {
            tracing::warn!("Could not remove saved enrollment state: {}", e);
        }
    }

    /// Where state is persisted
    pub fn location(&self) -> String {
        self.storage.describe()
    }

    /// Write the envelope, reporting failure to the caller
    pub fn try_persist(&self) -> Result<(), StoreError> {
        let json = self.state.to_json()?;
        self.storage.write(&json)
    }

    fn persist(&self) {
        match self.try_persist() {
            Ok(()) => tracing::trace!("Saved enrollment state to {}", self.storage.describe()),
            Err(e) => tracing::warn!("Could not save enrollment state: {}", e),
        }
    }
}

impl std::fmt::Debug for EnrollmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentStore")
            .field("storage", &self.storage.describe())
            .field("state", &self.state)
            .finish()
    }
}
