//! JSON file store for clinic records.
//!
//! Each record type lives in its own file under the data directory as a
//! pretty-printed JSON array. Every mutation loads the whole list, changes it
//! in memory and replaces the file through a temp-file rename, so a crash
//! mid-write leaves the previous version intact.

mod appointments;
mod doctors;
mod patients;
mod records;
mod visits;

pub use patients::{PatientSummary, PaymentRecord, FUZZY_NAME_THRESHOLD};
pub use records::Record;

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::config::ClinicConfig;
use crate::models::ValidationError;
use crate::workflow::{VisitWorkflow, WorkflowError};

/// High-water marks of issued IDs, keyed by prefix.
pub const SEQUENCE_FILE: &str = "id_sequences.json";

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Status change rejected: {0}")]
    Transition(#[from] WorkflowError),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

type Sequences = BTreeMap<String, u64>;

/// Handle on a clinic data directory.
#[derive(Debug)]
pub struct Store {
    config: ClinicConfig,
    workflow: VisitWorkflow,
}

impl Store {
    /// Open the data directory, creating it if needed.
    pub fn open(config: ClinicConfig) -> StoreResult<Self> {
        fs::create_dir_all(config.data_dir())?;
        debug!("opened clinic store at {}", config.data_dir().display());
        let workflow = VisitWorkflow::new(config.transition_policy());
        Ok(Self { config, workflow })
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        self.config.data_dir()
    }

    pub fn workflow(&self) -> &VisitWorkflow {
        &self.workflow
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.data_dir().join(file_name)
    }

    // =========================================================================
    // Raw JSON files
    // =========================================================================

    /// Read a JSON file. A missing or blank file reads as `None`.
    fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> StoreResult<Option<T>> {
        let path = self.path_of(file_name);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Replace a JSON file atomically (2-space indent, UTF-8).
    ///
    /// An existing file keeps its permissions. A new file gets the temp
    /// file's owner-only mode.
    fn write_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> StoreResult<()> {
        let target = self.path_of(file_name);
        let mut temp = NamedTempFile::new_in(self.data_dir())?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        if let Ok(existing) = fs::metadata(&target) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        debug!("wrote {}", target.display());
        Ok(())
    }

    // =========================================================================
    // Record lists
    // =========================================================================

    /// Load every record of type `R` in storage order.
    pub fn load_all<R: Record>(&self) -> StoreResult<Vec<R>> {
        Ok(self.read_json(R::FILE_NAME)?.unwrap_or_default())
    }

    /// Replace the whole record list for `R`.
    pub fn save_all<R: Record>(&self, records: &[R]) -> StoreResult<()> {
        self.write_json(R::FILE_NAME, records)
    }

    /// Reserve the next ID for `R`.
    ///
    /// The number is one past both the largest suffix in `existing` and the
    /// persisted high-water mark, so IDs of deleted records are never reissued.
    fn allocate_id<R: Record>(&self, existing: &[R]) -> StoreResult<String> {
        let mut sequences: Sequences = self.read_json(SEQUENCE_FILE)?.unwrap_or_default();
        let highest_existing = existing
            .iter()
            .filter_map(|r| records::numeric_suffix(r.id(), R::ID_PREFIX))
            .max()
            .unwrap_or(0);
        let high_water = sequences.get(R::ID_PREFIX).copied().unwrap_or(0);
        let next = highest_existing.max(high_water) + 1;

        sequences.insert(R::ID_PREFIX.to_string(), next);
        self.write_json(SEQUENCE_FILE, &sequences)?;
        Ok(records::format_id(R::ID_PREFIX, next))
    }

    /// Append a new record, assigning its ID.
    pub(crate) fn insert_record<R: Record>(&self, mut record: R) -> StoreResult<R> {
        let mut records = self.load_all::<R>()?;
        let id = self.allocate_id(&records)?;
        record.set_id(id);
        records.push(record.clone());
        self.save_all(&records)?;
        Ok(record)
    }

    /// Find a record by ID.
    pub(crate) fn find_record<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        Ok(self.load_all::<R>()?.into_iter().find(|r| r.id() == id))
    }

    /// Mutate one record in place and persist.
    ///
    /// Returns `false` without writing when no record has `id`. If `change`
    /// fails nothing is written.
    pub(crate) fn modify_record<R, F>(&self, id: &str, change: F) -> StoreResult<bool>
    where
        R: Record,
        F: FnOnce(&mut R) -> StoreResult<()>,
    {
        let mut records = self.load_all::<R>()?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        change(record)?;
        self.save_all(&records)?;
        Ok(true)
    }

    /// Delete a record by ID. Returns `false` without writing when absent.
    pub(crate) fn remove_record<R: Record>(&self, id: &str) -> StoreResult<bool> {
        let mut records = self.load_all::<R>()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save_all(&records)?;
        Ok(true)
    }

    // =========================================================================
    // Backups
    // =========================================================================

    /// Copy `<stem>.json` to `<stem>_backup_<YYYYmmdd_HHMMSS>.json`.
    ///
    /// Returns the backup path, or `None` if the source file does not exist.
    pub fn backup(&self, file_name: &str) -> StoreResult<Option<PathBuf>> {
        let source = self.path_of(file_name);
        if !source.exists() {
            return Ok(None);
        }
        let stem = file_name.split('.').next().unwrap_or(file_name);
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup = self.path_of(&format!("{}_backup_{}.json", stem, stamp));
        fs::copy(&source, &backup)?;
        debug!("backed up {} to {}", source.display(), backup.display());
        Ok(Some(backup))
    }

    /// Back up all record files that exist.
    pub fn backup_all(&self) -> StoreResult<Vec<PathBuf>> {
        let files = [
            crate::models::Patient::FILE_NAME,
            crate::models::Appointment::FILE_NAME,
            crate::models::Doctor::FILE_NAME,
            crate::models::Visit::FILE_NAME,
        ];
        let mut written = Vec::new();
        for file in files {
            if let Some(path) = self.backup(file)? {
                written.push(path);
            }
        }
        Ok(written)
    }
}

/// Case-insensitive containment for optional text fields. `query` must
/// already be lowercase.
pub(crate) fn contains_lower(field: Option<&str>, query: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(query))
}
