//! Progress entry models.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::PainCategory;
use super::dates;
use super::patient::Patient;
use super::rom::RangeOfMotion;

/// A timestamped clinical observation for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEntry {
    /// UUID, generated at creation
    pub id: String,
    /// Owning patient's ID
    pub patient_id: String,
    /// When the observation was recorded
    pub date: DateTime<Utc>,
    pub notes: String,
    pub rom: RangeOfMotion,
    /// 0 (none) to 10 (worst)
    pub pain_level: i32,
    /// Scale the score was computed under
    pub assessment_scale: String,
    pub assessment_score: f64,
}

/// Fields supplied by the caller when recording progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewProgressEntry {
    pub notes: String,
    #[serde(default)]
    pub rom: RangeOfMotion,
    #[serde(default)]
    pub pain_level: i32,
    pub assessment_scale: String,
    #[serde(default)]
    pub assessment_score: f64,
}

impl ProgressEntry {
    /// Build an entry bound to `patient` with a fresh ID and date.
    pub fn new(patient: &Patient, fields: NewProgressEntry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient.id.clone(),
            date: dates::now(),
            notes: fields.notes,
            rom: fields.rom,
            pain_level: fields.pain_level,
            assessment_scale: fields.assessment_scale,
            assessment_score: fields.assessment_score,
        }
    }

    pub fn pain_category(&self) -> PainCategory {
        PainCategory::from_level(self.pain_level)
    }

    pub fn pain_level_description(&self) -> &'static str {
        self.pain_category().description()
    }

    /// True if this entry's total ROM beats `previous`. No previous entry means no improvement.
    pub fn has_rom_improvement_over(&self, previous: Option<&ProgressEntry>) -> bool {
        previous.is_some_and(|prev| self.rom.total() > prev.rom.total())
    }

    /// Date and time in the device time zone.
    pub fn formatted_date(&self) -> String {
        self.formatted_date_in(&Local)
    }

    pub fn formatted_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        dates::medium_date_time(&self.date, tz)
    }

    /// Numeric date in the device time zone.
    pub fn short_date_string(&self) -> String {
        self.short_date_string_in(&Local)
    }

    pub fn short_date_string_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        dates::short_date(&self.date, tz)
    }
}
