//! Staged mutations.

use rusqlite::Connection;

use super::{patients, progress, DbError, DbResult};
use crate::models::{NewPatient, NewProgressEntry, Patient, ProgressEntry, RomUpdate};

/// A single pending mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    InsertPatient(Patient),
    UpdatePatientRom { patient_id: String, update: RomUpdate },
    /// Also removes the patient's progress entries
    DeletePatient { patient_id: String },
    InsertProgressEntry(ProgressEntry),
    DeleteProgressEntry { entry_id: String },
}

impl Change {
    /// Short description used in error messages and logs.
    pub fn describe(&self) -> String {
        match self {
            Change::InsertPatient(p) => format!("insert patient {}", p.id),
            Change::UpdatePatientRom { patient_id, .. } => {
                format!("update ROM of patient {}", patient_id)
            }
            Change::DeletePatient { patient_id } => format!("delete patient {}", patient_id),
            Change::InsertProgressEntry(e) => format!("insert progress entry {}", e.id),
            Change::DeleteProgressEntry { entry_id } => {
                format!("delete progress entry {}", entry_id)
            }
        }
    }

    /// Execute against an open transaction, returning rows written.
    pub(crate) fn apply(&self, conn: &Connection) -> DbResult<usize> {
        let result = match self {
            Change::InsertPatient(patient) => patients::insert_patient(conn, patient),
            Change::UpdatePatientRom { patient_id, update } => {
                let rows = patients::update_patient_rom(conn, patient_id, update)
                    .map_err(|source| self.failure(source))?;
                if rows == 0 {
                    return Err(DbError::NotFound(format!("patient {}", patient_id)));
                }
                return Ok(rows);
            }
            Change::DeletePatient { patient_id } => patients::delete_patient(conn, patient_id),
            Change::InsertProgressEntry(entry) => progress::insert_progress_entry(conn, entry),
            Change::DeleteProgressEntry { entry_id } => {
                progress::delete_progress_entry(conn, entry_id)
            }
        };
        result.map_err(|source| self.failure(source))
    }

    fn failure(&self, source: rusqlite::Error) -> DbError {
        DbError::PersistenceFailure {
            change: self.describe(),
            source,
        }
    }
}

/// An ordered batch of changes waiting for [`super::Database::persist`].
///
/// Records created through the set get their IDs and timestamps
/// immediately, so later changes in the same batch can refer to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Stage a new patient and return the record that will be stored.
    pub fn create_patient(&mut self, fields: NewPatient) -> Patient {
        let patient = Patient::new(fields);
        self.push(Change::InsertPatient(patient.clone()));
        patient
    }

    /// Stage a new progress entry for `patient`.
    pub fn create_progress_entry(
        &mut self,
        patient: &Patient,
        fields: NewProgressEntry,
    ) -> ProgressEntry {
        let entry = ProgressEntry::new(patient, fields);
        self.push(Change::InsertProgressEntry(entry.clone()));
        entry
    }

    pub fn update_patient_rom(&mut self, patient_id: &str, update: RomUpdate) {
        self.push(Change::UpdatePatientRom {
            patient_id: patient_id.to_string(),
            update,
        });
    }

    pub fn delete_patient(&mut self, patient_id: &str) {
        self.push(Change::DeletePatient {
            patient_id: patient_id.to_string(),
        });
    }

    pub fn delete_progress_entry(&mut self, entry_id: &str) {
        self.push(Change::DeleteProgressEntry {
            entry_id: entry_id.to_string(),
        });
    }
}
