//! SQLite schema definition.

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Tables in the order rows must be cleared (children first).
pub const TABLES: [&str; 2] = ["progress_entries", "patients"];

/// Complete database schema for the physio tracker.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,        -- insertion order, never reused
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    weight_kg REAL NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    phone_number TEXT NOT NULL,
    registration_date TEXT NOT NULL,              -- RFC 3339 UTC, microseconds
    selected_assessment_scale TEXT NOT NULL,
    shoulder_rom REAL NOT NULL DEFAULT 0.0,
    knee_rom REAL NOT NULL DEFAULT 0.0,
    elbow_rom REAL NOT NULL DEFAULT 0.0,
    hip_rom REAL NOT NULL DEFAULT 0.0
);

CREATE INDEX IF NOT EXISTS idx_patients_registration ON patients(registration_date);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Progress Entries
-- ============================================================================

CREATE TABLE IF NOT EXISTS progress_entries (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    recorded_at TEXT NOT NULL,                    -- RFC 3339 UTC, microseconds
    notes TEXT NOT NULL DEFAULT '',
    shoulder_rom REAL NOT NULL DEFAULT 0.0,
    knee_rom REAL NOT NULL DEFAULT 0.0,
    elbow_rom REAL NOT NULL DEFAULT 0.0,
    hip_rom REAL NOT NULL DEFAULT 0.0,
    pain_level INTEGER NOT NULL DEFAULT 0,
    assessment_scale TEXT NOT NULL,
    assessment_score REAL NOT NULL DEFAULT 0.0
);

CREATE INDEX IF NOT EXISTS idx_progress_patient_date ON progress_entries(patient_id, recorded_at, seq);
"#;
