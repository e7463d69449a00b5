//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{encode_timestamp, timestamp_column, ChangeSet, Database, DbError, DbResult};
use crate::models::{NewPatient, Patient, RangeOfMotion, RomUpdate};
use crate::search;

const PATIENT_COLUMNS: &str = "id, name, age, weight_kg, address, phone_number, registration_date, \
     selected_assessment_scale, shoulder_rom, knee_rom, elbow_rom, hip_rom";

fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        weight: row.get(3)?,
        address: row.get(4)?,
        phone_number: row.get(5)?,
        registration_date: timestamp_column(row, 6)?,
        selected_assessment_scale: row.get(7)?,
        rom: RangeOfMotion {
            shoulder: row.get(8)?,
            knee: row.get(9)?,
            elbow: row.get(10)?,
            hip: row.get(11)?,
        },
    })
}

pub(super) fn insert_patient(conn: &Connection, patient: &Patient) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO patients (
            id, name, age, weight_kg, address, phone_number, registration_date,
            selected_assessment_scale, shoulder_rom, knee_rom, elbow_rom, hip_rom
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            patient.id,
            patient.name,
            patient.age,
            patient.weight,
            patient.address,
            patient.phone_number,
            encode_timestamp(&patient.registration_date),
            patient.selected_assessment_scale,
            patient.rom.shoulder,
            patient.rom.knee,
            patient.rom.elbow,
            patient.rom.hip,
        ],
    )
}

pub(super) fn update_patient_rom(
    conn: &Connection,
    patient_id: &str,
    update: &RomUpdate,
) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE patients SET
            shoulder_rom = COALESCE(?2, shoulder_rom),
            knee_rom = COALESCE(?3, knee_rom),
            elbow_rom = COALESCE(?4, elbow_rom),
            hip_rom = COALESCE(?5, hip_rom)
        WHERE id = ?1
        "#,
        params![
            patient_id,
            update.shoulder,
            update.knee,
            update.elbow,
            update.hip,
        ],
    )
}

/// Progress entries go with it through `ON DELETE CASCADE`.
pub(super) fn delete_patient(conn: &Connection, patient_id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM patients WHERE id = ?", [patient_id])
}

impl Database {
    /// Register a new patient. The caller is responsible for validating `fields`.
    pub fn create_patient(&mut self, fields: NewPatient) -> DbResult<Patient> {
        let mut changes = ChangeSet::new();
        let patient = changes.create_patient(fields);
        self.persist(&mut changes)?;
        debug!(patient_id = %patient.id, "created patient");
        Ok(patient)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                row_to_patient,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients, most recently registered first.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY registration_date DESC, seq DESC",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients by name or phone number.
    ///
    /// Substring match, ignoring case and diacritics, ordered by name.
    /// Empty text matches every patient.
    pub fn search_patients(&self, text: &str) -> DbResult<Vec<Patient>> {
        let needle = search::fold(text);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {columns}
            FROM patients
            WHERE instr({fold}(name), ?1) > 0
               OR instr({fold}(phone_number), ?1) > 0
            ORDER BY name, seq
            "#,
            columns = PATIENT_COLUMNS,
            fold = search::FOLD_FUNCTION,
        ))?;

        let rows = stmt.query_map([needle], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Count all patients.
    pub fn count_patients(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Partially update a patient's range of motion and persist it.
    ///
    /// An update with no values writes nothing.
    pub fn update_patient_rom(&mut self, id: &str, update: RomUpdate) -> DbResult<Patient> {
        let mut patient = self
            .get_patient(id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))?;
        if update.is_empty() {
            return Ok(patient);
        }

        let mut changes = ChangeSet::new();
        changes.update_patient_rom(id, update);
        self.persist(&mut changes)?;
        debug!(patient_id = %id, "updated patient ROM");

        patient.update_rom(&update);
        Ok(patient)
    }

    /// Delete a patient and all of their progress entries.
    pub fn delete_patient(&mut self, id: &str) -> DbResult<bool> {
        let mut changes = ChangeSet::new();
        changes.delete_patient(id);
        let rows = self.persist(&mut changes)?;
        debug!(patient_id = %id, deleted = rows > 0, "deleted patient");
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProgressEntry;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn new_patient(name: &str, phone: &str) -> NewPatient {
        NewPatient {
            name: name.into(),
            age: 40,
            weight: 75.5,
            address: "221B Baker Street".into(),
            phone_number: phone.into(),
            selected_assessment_scale: "Oswestry Disability Index".into(),
            rom: RangeOfMotion::default(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let mut db = setup_db();

        let patient = db
            .create_patient(new_patient("John Smith", "555-0100"))
            .unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
        assert_eq!(retrieved.name, "John Smith");
        assert_eq!(retrieved.weight, 75.5);
        assert_eq!(retrieved.selected_assessment_scale, "Oswestry Disability Index");
    }

    #[test]
    fn test_registration_date_is_creation_instant() {
        let mut db = setup_db();

        let before = crate::models::now();
        let patient = db.create_patient(new_patient("Max", "1")).unwrap();
        let after = crate::models::now();

        assert!(before <= patient.registration_date);
        assert!(patient.registration_date <= after);

        let stored = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(stored.registration_date, patient.registration_date);
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_patient("no-such-id").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let mut db = setup_db();

        let first = db.create_patient(new_patient("Alice", "1")).unwrap();
        let second = db.create_patient(new_patient("Bob", "2")).unwrap();
        let third = db.create_patient(new_patient("Carol", "3")).unwrap();

        let ids: Vec<_> = db.list_patients().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_search_patients() {
        let mut db = setup_db();

        db.create_patient(new_patient("John Smith", "555-0100")).unwrap();
        db.create_patient(new_patient("Ann Lee", "555-SMITH")).unwrap();
        db.create_patient(new_patient("Luna Park", "555-0199")).unwrap();

        let results = db.search_patients("smith").unwrap();
        let names: Vec<_> = results.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ann Lee", "John Smith"]);
    }

    #[test]
    fn test_search_ignores_diacritics() {
        let mut db = setup_db();

        db.create_patient(new_patient("José Álvarez", "555-0100")).unwrap();
        db.create_patient(new_patient("Jose Alvarez", "555-0101")).unwrap();

        assert_eq!(db.search_patients("alvarez").unwrap().len(), 2);
        assert_eq!(db.search_patients("ÁLVAREZ").unwrap().len(), 2);
        assert_eq!(db.search_patients("josé").unwrap().len(), 2);
    }

    #[test]
    fn test_search_folds_romanian_and_vietnamese_names() {
        let mut db = setup_db();

        db.create_patient(new_patient("Ștefan Țurcanu", "555-0100")).unwrap();
        db.create_patient(new_patient("Nguyễn Văn An", "555-0101")).unwrap();
        db.create_patient(new_patient("Ạnh Lê", "555-0102")).unwrap();
        db.create_patient(new_patient("Dương Thị", "555-0103")).unwrap();

        let names = |text: &str| -> Vec<String> {
            db.search_patients(text)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect()
        };

        assert_eq!(names("stefan"), vec!["Ștefan Țurcanu"]);
        assert_eq!(names("turcanu"), vec!["Ștefan Țurcanu"]);
        assert_eq!(names("nguyen"), vec!["Nguyễn Văn An"]);
        assert_eq!(names("anh"), vec!["Ạnh Lê"]);
        assert_eq!(names("duong"), vec!["Dương Thị"]);
        assert_eq!(names("DƯƠNG"), vec!["Dương Thị"]);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let mut db = setup_db();
        db.create_patient(new_patient("Max", "555-0100")).unwrap();

        assert!(db.search_patients("%").unwrap().is_empty());
        assert!(db.search_patients("_").unwrap().is_empty());
    }

    #[test]
    fn test_search_empty_matches_all() {
        let mut db = setup_db();
        db.create_patient(new_patient("Max", "1")).unwrap();
        db.create_patient(new_patient("Luna", "2")).unwrap();

        let names: Vec<_> = db
            .search_patients("")
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Luna", "Max"]);
    }

    #[test]
    fn test_update_rom_partial() {
        let mut db = setup_db();
        let mut fields = new_patient("Max", "1");
        fields.rom = RangeOfMotion::new(10.0, 20.0, 30.0, 40.0);
        let patient = db.create_patient(fields).unwrap();

        let updated = db
            .update_patient_rom(&patient.id, RomUpdate::shoulder(45.0))
            .unwrap();
        assert_eq!(updated.rom, RangeOfMotion::new(45.0, 20.0, 30.0, 40.0));

        let refetched = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(refetched.rom, updated.rom);
        assert_eq!(refetched.registration_date, patient.registration_date);
    }

    #[test]
    fn test_empty_rom_update_writes_nothing() {
        let mut db = setup_db();
        let patient = db.create_patient(new_patient("Max", "1")).unwrap();

        let unchanged = db
            .update_patient_rom(&patient.id, RomUpdate::default())
            .unwrap();
        assert_eq!(unchanged, patient);

        let err = db
            .update_patient_rom("missing", RomUpdate::default())
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_update_rom_missing() {
        let mut db = setup_db();
        let err = db
            .update_patient_rom("missing", RomUpdate::shoulder(1.0))
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_delete_cascades() {
        let mut db = setup_db();
        let patient = db.create_patient(new_patient("Max", "1")).unwrap();
        let other = db.create_patient(new_patient("Luna", "2")).unwrap();
        for _ in 0..2 {
            db.create_progress_entry(&patient, NewProgressEntry::default())
                .unwrap();
        }
        db.create_progress_entry(&other, NewProgressEntry::default())
            .unwrap();

        assert!(db.delete_patient(&patient.id).unwrap());

        assert!(db.get_patient(&patient.id).unwrap().is_none());
        assert!(db.list_progress_entries(&patient.id).unwrap().is_empty());
        assert_eq!(db.list_progress_entries(&other.id).unwrap().len(), 1);

        // Deleting again is a no-op
        assert!(!db.delete_patient(&patient.id).unwrap());
    }

    #[test]
    fn test_count_matches_list() {
        let mut db = setup_db();
        assert_eq!(db.count_patients().unwrap(), 0);

        let a = db.create_patient(new_patient("A", "1")).unwrap();
        db.create_patient(new_patient("B", "2")).unwrap();
        assert_eq!(db.count_patients().unwrap(), db.list_patients().unwrap().len() as u64);

        db.delete_patient(&a.id).unwrap();
        assert_eq!(db.count_patients().unwrap(), 1);
        assert_eq!(db.count_patients().unwrap(), db.list_patients().unwrap().len() as u64);
    }
}
