//! Patient models.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::dates;
use super::rom::{RangeOfMotion, RomUpdate};

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// UUID, generated at registration
    pub id: String,
    /// Display name
    pub name: String,
    /// Age in years (caller-validated 1-150)
    pub age: i32,
    /// Weight in kg
    pub weight: f64,
    pub address: String,
    pub phone_number: String,
    /// Set once at registration
    pub registration_date: DateTime<Utc>,
    /// Label of the chosen assessment scale, or a custom value
    pub selected_assessment_scale: String,
    /// Current range of motion
    pub rom: RangeOfMotion,
}

/// Fields supplied by the caller when registering a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub address: String,
    pub phone_number: String,
    pub selected_assessment_scale: String,
    #[serde(default)]
    pub rom: RangeOfMotion,
}

impl Patient {
    /// Build a patient record with a fresh ID and registration date.
    pub fn new(fields: NewPatient) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            age: fields.age,
            weight: fields.weight,
            address: fields.address,
            phone_number: fields.phone_number,
            registration_date: dates::now(),
            selected_assessment_scale: fields.selected_assessment_scale,
            rom: fields.rom,
        }
    }

    /// Apply a partial ROM update to this copy. [`Database::update_patient_rom`]
    /// persists the same update.
    ///
    /// [`Database::update_patient_rom`]: crate::db::Database::update_patient_rom
    pub fn update_rom(&mut self, update: &RomUpdate) {
        self.rom.apply(update);
    }

    /// Registration date in the device time zone, e.g. `Oct 19, 2026`.
    pub fn formatted_registration_date(&self) -> String {
        self.formatted_registration_date_in(&Local)
    }

    pub fn formatted_registration_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        dates::medium_date(&self.registration_date, tz)
    }

    /// One-line summary shown in the patient library.
    pub fn details_line(&self) -> String {
        format!(
            "Age: {} • Weight: {:.1}kg • 📞 {}",
            self.age, self.weight, self.phone_number
        )
    }
}

/// Dashboard label for the number of registered patients.
pub fn patient_count_label(count: u64) -> String {
    let noun = if count == 1 { "patient" } else { "patients" };
    format!("👥 {} {} registered", count, noun)
}
