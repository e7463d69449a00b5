//! Progress entry database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{encode_timestamp, timestamp_column, ChangeSet, Database, DbResult};
use crate::models::{NewProgressEntry, Patient, ProgressEntry, RangeOfMotion};

const ENTRY_COLUMNS: &str = "id, patient_id, recorded_at, notes, shoulder_rom, knee_rom, \
     elbow_rom, hip_rom, pain_level, assessment_scale, assessment_score";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ProgressEntry> {
    Ok(ProgressEntry {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        date: timestamp_column(row, 2)?,
        notes: row.get(3)?,
        rom: RangeOfMotion {
            shoulder: row.get(4)?,
            knee: row.get(5)?,
            elbow: row.get(6)?,
            hip: row.get(7)?,
        },
        pain_level: row.get(8)?,
        assessment_scale: row.get(9)?,
        assessment_score: row.get(10)?,
    })
}

pub(super) fn insert_progress_entry(
    conn: &Connection,
    entry: &ProgressEntry,
) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO progress_entries (
            id, patient_id, recorded_at, notes, shoulder_rom, knee_rom,
            elbow_rom, hip_rom, pain_level, assessment_scale, assessment_score
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            entry.id,
            entry.patient_id,
            encode_timestamp(&entry.date),
            entry.notes,
            entry.rom.shoulder,
            entry.rom.knee,
            entry.rom.elbow,
            entry.rom.hip,
            entry.pain_level,
            entry.assessment_scale,
            entry.assessment_score,
        ],
    )
}

pub(super) fn delete_progress_entry(conn: &Connection, entry_id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM progress_entries WHERE id = ?", [entry_id])
}

impl Database {
    /// Record a progress entry for `patient`.
    pub fn create_progress_entry(
        &mut self,
        patient: &Patient,
        fields: NewProgressEntry,
    ) -> DbResult<ProgressEntry> {
        let mut changes = ChangeSet::new();
        let entry = changes.create_progress_entry(patient, fields);
        self.persist(&mut changes)?;
        debug!(entry_id = %entry.id, patient_id = %patient.id, "created progress entry");
        Ok(entry)
    }

    /// Get a progress entry by ID.
    pub fn get_progress_entry(&self, id: &str) -> DbResult<Option<ProgressEntry>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM progress_entries WHERE id = ?", ENTRY_COLUMNS),
                [id],
                row_to_entry,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All entries for a patient, oldest first. Same-instant entries keep insertion order.
    pub fn list_progress_entries(&self, patient_id: &str) -> DbResult<Vec<ProgressEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM progress_entries
            WHERE patient_id = ?
            ORDER BY recorded_at ASC, seq ASC
            "#,
            ENTRY_COLUMNS
        ))?;

        let rows = stmt.query_map([patient_id], row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The most recent entry for a patient.
    pub fn latest_progress_entry(&self, patient_id: &str) -> DbResult<Option<ProgressEntry>> {
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {}
                    FROM progress_entries
                    WHERE patient_id = ?
                    ORDER BY recorded_at DESC, seq DESC
                    LIMIT 1
                    "#,
                    ENTRY_COLUMNS
                ),
                [patient_id],
                row_to_entry,
            )
            .optional()
            .map_err(Into::into)
    }

    /// The entry immediately before `entry` for the same patient.
    pub fn previous_progress_entry(&self, entry: &ProgressEntry) -> DbResult<Option<ProgressEntry>> {
        let columns = ENTRY_COLUMNS
            .split(", ")
            .map(|c| format!("prev.{}", c))
            .collect::<Vec<_>>()
            .join(", ");

        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {}
                    FROM progress_entries prev
                    JOIN progress_entries cur ON cur.id = ?1
                    WHERE prev.patient_id = cur.patient_id
                      AND (prev.recorded_at < cur.recorded_at
                           OR (prev.recorded_at = cur.recorded_at AND prev.seq < cur.seq))
                    ORDER BY prev.recorded_at DESC, prev.seq DESC
                    LIMIT 1
                    "#,
                    columns
                ),
                params![entry.id],
                row_to_entry,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Whether `entry` improved total ROM over the entry before it.
    pub fn has_rom_improvement(&self, entry: &ProgressEntry) -> DbResult<bool> {
        let previous = self.previous_progress_entry(entry)?;
        Ok(entry.has_rom_improvement_over(previous.as_ref()))
    }

    /// Delete a single progress entry.
    pub fn delete_progress_entry(&mut self, id: &str) -> DbResult<bool> {
        let mut changes = ChangeSet::new();
        changes.delete_progress_entry(id);
        let rows = self.persist(&mut changes)?;
        debug!(entry_id = %id, deleted = rows > 0, "deleted progress entry");
        Ok(rows > 0)
    }
}
