//! Record store integration tests.

use physio_tracker_core::db::{ChangeSet, Database, DbError, SCHEMA_VERSION};
use physio_tracker_core::models::{NewPatient, NewProgressEntry, RangeOfMotion, RomUpdate};

fn new_patient(name: &str, phone: &str) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        age: 57,
        weight: 82.3,
        address: "4 Elm Row".to_string(),
        phone_number: phone.to_string(),
        selected_assessment_scale: "Shoulder Pain and Disability Index (SPADI)".to_string(),
        rom: RangeOfMotion::new(90.0, 120.0, 135.0, 100.0),
    }
}

fn entry_with_total(total: f64, pain: i32) -> NewProgressEntry {
    let quarter = total / 4.0;
    NewProgressEntry {
        notes: format!("Total ROM {}", total),
        rom: RangeOfMotion::new(quarter, quarter, quarter, quarter),
        pain_level: pain,
        assessment_scale: "Shoulder Pain and Disability Index (SPADI)".to_string(),
        assessment_score: 48.0,
    }
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite");

    let (patient, entry) = {
        let mut db = Database::open(&path).unwrap();
        let patient = db.create_patient(new_patient("Grace Hopper", "555-1906")).unwrap();
        let entry = db
            .create_progress_entry(&patient, entry_with_total(100.0, 3))
            .unwrap();
        (patient, entry)
    };

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_patient(&patient.id).unwrap(), Some(patient.clone()));
    assert_eq!(db.list_progress_entries(&patient.id).unwrap(), vec![entry]);
}

#[test]
fn test_garbage_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-db.sqlite");
    std::fs::write(&path, b"definitely not sqlite, just some bytes padding it out").unwrap();

    let err = Database::open(&path).err().unwrap();
    assert!(matches!(err, DbError::StoreUnavailable { .. }), "{:?}", err);
}

#[test]
fn test_newer_schema_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
    }

    let err = Database::open(&path).err().unwrap();
    match err {
        DbError::StoreUnavailable { reason, .. } => assert!(reason.contains("newer")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_patient_lifecycle() {
    let mut db = Database::open_in_memory().unwrap();

    let smith = db.create_patient(new_patient("John Smith", "555-0100")).unwrap();
    let letters = db.create_patient(new_patient("Ada Byron", "555-SMITH")).unwrap();
    let other = db.create_patient(new_patient("Luna Park", "555-0199")).unwrap();

    // Newest first
    let listed: Vec<_> = db.list_patients().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(listed, vec![other.id.clone(), letters.id.clone(), smith.id.clone()]);

    // Search by name or phone
    let found: Vec<_> = db
        .search_patients("SMITH")
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(found, vec![letters.id.clone(), smith.id.clone()]);

    // ROM update leaves other regions alone
    let updated = db
        .update_patient_rom(&smith.id, RomUpdate::shoulder(45.0))
        .unwrap();
    assert_eq!(updated.rom, RangeOfMotion::new(45.0, 120.0, 135.0, 100.0));

    // Cascade delete
    db.create_progress_entry(&smith, entry_with_total(100.0, 6)).unwrap();
    db.create_progress_entry(&smith, entry_with_total(120.0, 4)).unwrap();
    assert!(db.delete_patient(&smith.id).unwrap());
    assert!(db.get_patient(&smith.id).unwrap().is_none());
    assert!(db.list_progress_entries(&smith.id).unwrap().is_empty());

    assert_eq!(db.count_patients().unwrap(), 2);
    assert_eq!(db.count_patients().unwrap(), db.list_patients().unwrap().len() as u64);
}

#[test]
fn test_rom_improvement_sequence() {
    let mut db = Database::open_in_memory().unwrap();
    let patient = db.create_patient(new_patient("Rehab", "555-0000")).unwrap();

    let e1 = db.create_progress_entry(&patient, entry_with_total(100.0, 7)).unwrap();
    let e2 = db.create_progress_entry(&patient, entry_with_total(120.0, 5)).unwrap();
    let e3 = db.create_progress_entry(&patient, entry_with_total(110.0, 2)).unwrap();

    assert!(!db.has_rom_improvement(&e1).unwrap());
    assert!(db.has_rom_improvement(&e2).unwrap());
    assert!(!db.has_rom_improvement(&e3).unwrap());

    assert_eq!(e1.pain_level_description(), "Severe Pain");
    assert_eq!(e2.pain_level_description(), "Moderate Pain");
    assert_eq!(e3.pain_level_description(), "Mild Pain");

    assert_eq!(db.latest_progress_entry(&patient.id).unwrap(), Some(e3));
}

#[test]
fn test_batch_with_entries_is_all_or_nothing() {
    let mut db = Database::open_in_memory().unwrap();

    let mut changes = ChangeSet::new();
    let patient = changes.create_patient(new_patient("Batch", "555-7777"));
    changes.create_progress_entry(&patient, entry_with_total(80.0, 1));
    changes.update_patient_rom("does-not-exist", RomUpdate::shoulder(1.0));

    assert!(db.persist(&mut changes).is_err());
    assert_eq!(db.count_patients().unwrap(), 0);
    assert!(db.list_progress_entries(&patient.id).unwrap().is_empty());
}
