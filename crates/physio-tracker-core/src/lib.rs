//! Physio Tracker Core Library
//!
//! Local-first patient and progress store for a physiotherapy mobile app.
//!
//! # Architecture
//!
//! ```text
//!      Mobile UI (Swift / Kotlin)
//!                │
//!                ▼
//!      PhysioTrackerCore  (UniFFI object, one lock around the store)
//!                │
//!      ┌─────────┴──────────┐
//!      ▼                    ▼
//!  Query layer          Entity helpers
//!  (db::patients,       (models: dates, pain buckets,
//!   db::progress)        ROM improvement)
//!      │
//!      ▼
//!  ChangeSet ──persist──► SQLite (patients 1─* progress_entries)
//! ```
//!
//! # Core Principle
//!
//! **Every mutation is persisted before the call returns, or it fails as a
//! whole.** Reads report store errors instead of returning empty results.
//!
//! # Modules
//!
//! - [`db`]: SQLite record store and queries
//! - [`models`]: Domain types (Patient, ProgressEntry, AssessmentScale, etc.)
//! - [`search`]: Case/diacritic folding for patient search
//! - [`validation`]: Registration form checks for the calling layer
//! - [`config`]: File and environment configuration
//! - [`logging`]: `tracing` subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod search;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use db::{ChangeSet, Database, DbError, DbResult, StoreOptions};
pub use models::{
    available_assessment_scales, pain_level_description, AssessmentScale, NewPatient,
    NewProgressEntry, PainCategory, Patient, ProgressEntry, RangeOfMotion, RomUpdate,
};
pub use validation::{RegistrationForm, ValidationError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum PhysioTrackerError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<DbError> for PhysioTrackerError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::StoreUnavailable { .. } => PhysioTrackerError::StoreUnavailable(e.to_string()),
            DbError::PersistenceFailure { .. } => {
                PhysioTrackerError::PersistenceFailure(e.to_string())
            }
            DbError::NotFound(what) => PhysioTrackerError::NotFound(what),
            DbError::Sqlite(_) => PhysioTrackerError::DatabaseError(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for PhysioTrackerError {
    fn from(e: anyhow::Error) -> Self {
        PhysioTrackerError::ConfigError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for PhysioTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PhysioTrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PhysioTrackerCore>, PhysioTrackerError> {
    let db = Database::open(&path)?;
    Ok(PhysioTrackerCore::wrap(db))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PhysioTrackerCore>, PhysioTrackerError> {
    let db = Database::open_in_memory()?;
    Ok(PhysioTrackerCore::wrap(db))
}

/// Load configuration (default location when `config_path` is None), install
/// its log filter and open its store.
#[uniffi::export]
pub fn open_database_from_config(
    config_path: Option<String>,
) -> Result<Arc<PhysioTrackerCore>, PhysioTrackerError> {
    let config = match config_path {
        Some(path) => Config::load_from_path(&PathBuf::from(path))?,
        None => Config::load()?,
    };
    logging::init_from_config(&config);
    let db = Database::open_with_options(config.database_path(), &config.store_options())?;
    Ok(PhysioTrackerCore::wrap(db))
}

/// Route `tracing` output to stderr. Returns false if already initialized.
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init(&filter)
}

/// Built-in assessment scale labels, in selection order.
#[uniffi::export]
pub fn assessment_scales() -> Vec<String> {
    available_assessment_scales()
}

/// Describe a 0-10 pain level.
#[uniffi::export]
pub fn describe_pain_level(level: i32) -> String {
    pain_level_description(level).to_string()
}

/// Dashboard label such as "👥 3 patients registered".
#[uniffi::export]
pub fn patient_count_label(count: u64) -> String {
    models::patient_count_label(count)
}

/// Validate raw registration input. Returns one message per failed rule.
#[uniffi::export]
pub fn validate_patient_registration(form: FfiRegistrationForm) -> Vec<String> {
    match RegistrationForm::from(form).validate() {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PhysioTrackerCore {
    db: Arc<Mutex<Database>>,
}

impl PhysioTrackerCore {
    fn wrap(db: Database) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn patient_or_not_found(db: &Database, id: &str) -> Result<Patient, PhysioTrackerError> {
        db.get_patient(id)?
            .ok_or_else(|| PhysioTrackerError::NotFound(format!("patient {}", id)))
    }

    fn entry_or_not_found(db: &Database, id: &str) -> Result<ProgressEntry, PhysioTrackerError> {
        db.get_progress_entry(id)?
            .ok_or_else(|| PhysioTrackerError::NotFound(format!("progress entry {}", id)))
    }
}

#[uniffi::export]
impl PhysioTrackerCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient. Input is expected to be validated already.
    pub fn create_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        let created = db.create_patient(patient.into())?;
        Ok(created.into())
    }

    /// Validate raw form input and register the patient.
    ///
    /// Fails with `InvalidInput` listing every failed rule, one per line.
    pub fn register_patient(
        &self,
        form: FfiRegistrationForm,
    ) -> Result<FfiPatient, PhysioTrackerError> {
        let fields = RegistrationForm::from(form)
            .validate()
            .map_err(|errors| PhysioTrackerError::InvalidInput(validation::summarize(&errors)))?;
        let mut db = self.db.lock()?;
        let created = db.create_patient(fields)?;
        Ok(created.into())
    }

    /// Register a patient together with initial progress entries, atomically.
    pub fn create_patient_with_entries(
        &self,
        patient: FfiNewPatient,
        entries: Vec<FfiNewProgressEntry>,
    ) -> Result<FfiPatient, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        let created = db.transaction(|changes| {
            let created = changes.create_patient(patient.into());
            for entry in entries {
                changes.create_progress_entry(&created, entry.into());
            }
            created
        })?;
        Ok(created.into())
    }

    /// All patients, most recently registered first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, PhysioTrackerError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, PhysioTrackerError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Search patients by name or phone number.
    pub fn search_patients(&self, text: String) -> Result<Vec<FfiPatient>, PhysioTrackerError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&text)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Update any subset of a patient's ROM values.
    pub fn update_patient_rom(
        &self,
        id: String,
        shoulder: Option<f64>,
        knee: Option<f64>,
        elbow: Option<f64>,
        hip: Option<f64>,
    ) -> Result<FfiPatient, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        let update = RomUpdate {
            shoulder,
            knee,
            elbow,
            hip,
        };
        let patient = db.update_patient_rom(&id, update)?;
        Ok(patient.into())
    }

    /// Delete a patient and their progress entries. Returns false if absent.
    pub fn delete_patient(&self, id: String) -> Result<bool, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        Ok(db.delete_patient(&id)?)
    }

    pub fn total_patient_count(&self) -> Result<u64, PhysioTrackerError> {
        let db = self.db.lock()?;
        Ok(db.count_patients()?)
    }

    // =========================================================================
    // Progress Entry Operations
    // =========================================================================

    /// Record a progress entry for an existing patient.
    pub fn create_progress_entry(
        &self,
        patient_id: String,
        entry: FfiNewProgressEntry,
    ) -> Result<FfiProgressEntry, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        let patient = Self::patient_or_not_found(&db, &patient_id)?;
        let created = db.create_progress_entry(&patient, entry.into())?;
        let improved = db.has_rom_improvement(&created)?;
        Ok(FfiProgressEntry::new(created, improved))
    }

    /// A patient's entries, oldest first.
    pub fn list_progress_entries(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiProgressEntry>, PhysioTrackerError> {
        let db = self.db.lock()?;
        let entries = db.list_progress_entries(&patient_id)?;

        let mut previous: Option<&ProgressEntry> = None;
        let mut out = Vec::with_capacity(entries.len());
        for entry in &entries {
            let improved = entry.has_rom_improvement_over(previous);
            out.push(FfiProgressEntry::new(entry.clone(), improved));
            previous = Some(entry);
        }
        Ok(out)
    }

    pub fn latest_progress_entry(
        &self,
        patient_id: String,
    ) -> Result<Option<FfiProgressEntry>, PhysioTrackerError> {
        let db = self.db.lock()?;
        match db.latest_progress_entry(&patient_id)? {
            Some(entry) => {
                let improved = db.has_rom_improvement(&entry)?;
                Ok(Some(FfiProgressEntry::new(entry, improved)))
            }
            None => Ok(None),
        }
    }

    /// Whether an entry improved total ROM over the previous one.
    pub fn has_rom_improvement(&self, entry_id: String) -> Result<bool, PhysioTrackerError> {
        let db = self.db.lock()?;
        let entry = Self::entry_or_not_found(&db, &entry_id)?;
        Ok(db.has_rom_improvement(&entry)?)
    }

    /// Delete a single progress entry. Returns false if absent.
    pub fn delete_progress_entry(&self, entry_id: String) -> Result<bool, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        Ok(db.delete_progress_entry(&entry_id)?)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Delete all records. Returns the tables that could not be cleared.
    pub fn reset(&self) -> Result<Vec<String>, PhysioTrackerError> {
        let mut db = self.db.lock()?;
        let summary = db.reset();
        Ok(summary
            .failed
            .into_iter()
            .map(|(table, error)| format!("{}: {}", table, error))
            .collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub address: String,
    pub phone_number: String,
    /// RFC 3339
    pub registration_date: String,
    pub formatted_registration_date: String,
    pub details_line: String,
    pub selected_assessment_scale: String,
    pub shoulder_rom: f64,
    pub knee_rom: f64,
    pub elbow_rom: f64,
    pub hip_rom: f64,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            formatted_registration_date: patient.formatted_registration_date(),
            details_line: patient.details_line(),
            registration_date: patient.registration_date.to_rfc3339(),
            id: patient.id,
            name: patient.name,
            age: patient.age,
            weight: patient.weight,
            address: patient.address,
            phone_number: patient.phone_number,
            selected_assessment_scale: patient.selected_assessment_scale,
            shoulder_rom: patient.rom.shoulder,
            knee_rom: patient.rom.knee,
            elbow_rom: patient.rom.elbow,
            hip_rom: patient.rom.hip,
        }
    }
}

/// FFI-safe patient registration fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub address: String,
    pub phone_number: String,
    pub selected_assessment_scale: String,
}

impl From<FfiNewPatient> for NewPatient {
    fn from(p: FfiNewPatient) -> Self {
        NewPatient {
            name: p.name,
            age: p.age,
            weight: p.weight,
            address: p.address,
            phone_number: p.phone_number,
            selected_assessment_scale: p.selected_assessment_scale,
            rom: RangeOfMotion::default(),
        }
    }
}

/// FFI-safe progress entry with display fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProgressEntry {
    pub id: String,
    pub patient_id: String,
    /// RFC 3339
    pub date: String,
    pub formatted_date: String,
    pub short_date: String,
    pub notes: String,
    pub shoulder_rom: f64,
    pub knee_rom: f64,
    pub elbow_rom: f64,
    pub hip_rom: f64,
    pub pain_level: i32,
    pub pain_level_description: String,
    pub assessment_scale: String,
    pub assessment_score: f64,
    pub has_rom_improvement: bool,
}

impl FfiProgressEntry {
    fn new(entry: ProgressEntry, has_rom_improvement: bool) -> Self {
        Self {
            formatted_date: entry.formatted_date(),
            short_date: entry.short_date_string(),
            pain_level_description: entry.pain_level_description().to_string(),
            date: entry.date.to_rfc3339(),
            id: entry.id,
            patient_id: entry.patient_id,
            notes: entry.notes,
            shoulder_rom: entry.rom.shoulder,
            knee_rom: entry.rom.knee,
            elbow_rom: entry.rom.elbow,
            hip_rom: entry.rom.hip,
            pain_level: entry.pain_level,
            assessment_scale: entry.assessment_scale,
            assessment_score: entry.assessment_score,
            has_rom_improvement,
        }
    }
}

/// FFI-safe progress entry fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewProgressEntry {
    pub notes: String,
    pub shoulder_rom: f64,
    pub knee_rom: f64,
    pub elbow_rom: f64,
    pub hip_rom: f64,
    pub pain_level: i32,
    pub assessment_scale: String,
    pub assessment_score: f64,
}

impl From<FfiNewProgressEntry> for NewProgressEntry {
    fn from(e: FfiNewProgressEntry) -> Self {
        NewProgressEntry {
            notes: e.notes,
            rom: RangeOfMotion::new(e.shoulder_rom, e.knee_rom, e.elbow_rom, e.hip_rom),
            pain_level: e.pain_level,
            assessment_scale: e.assessment_scale,
            assessment_score: e.assessment_score,
        }
    }
}

/// FFI-safe raw registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegistrationForm {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub address: String,
    pub phone_number: String,
    pub assessment_scale: Option<String>,
}

impl From<FfiRegistrationForm> for RegistrationForm {
    fn from(form: FfiRegistrationForm) -> Self {
        RegistrationForm {
            name: form.name,
            age: form.age,
            weight: form.weight,
            address: form.address,
            phone_number: form.phone_number,
            assessment_scale: form.assessment_scale,
        }
    }
}
