//! Registration form validation.
//!
//! The store accepts whatever it is given; these checks belong to the
//! calling layer and run on the raw text a user typed before
//! [`crate::Database::create_patient`] is called.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NewPatient;

/// Oldest accepted age in years.
pub const MAX_AGE: i32 = 150;

/// A single failed registration rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Patient name is required")]
    NameRequired,

    #[error("Age is required")]
    AgeRequired,

    #[error("Please enter a valid age (1-150)")]
    AgeOutOfRange,

    #[error("Weight is required")]
    WeightRequired,

    #[error("Please enter a valid weight")]
    WeightInvalid,

    #[error("Phone number is required")]
    PhoneRequired,

    #[error("Please select an assessment scale")]
    AssessmentScaleRequired,
}

/// Raw registration input as entered in the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub address: String,
    pub phone_number: String,
    pub assessment_scale: Option<String>,
}

impl RegistrationForm {
    /// Check every rule, collecting all failures in form order.
    pub fn validate(&self) -> Result<NewPatient, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::NameRequired);
        }

        let age = match parse_age(&self.age) {
            Ok(age) => Some(age),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let weight = match parse_weight(&self.weight) {
            Ok(weight) => Some(weight),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let phone = self.phone_number.trim();
        if phone.is_empty() {
            errors.push(ValidationError::PhoneRequired);
        }

        let scale = self
            .assessment_scale
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if scale.is_none() {
            errors.push(ValidationError::AssessmentScaleRequired);
        }

        match (age, weight, scale) {
            (Some(age), Some(weight), Some(scale)) if errors.is_empty() => Ok(NewPatient {
                name: name.to_string(),
                age,
                weight,
                address: self.address.trim().to_string(),
                phone_number: phone.to_string(),
                selected_assessment_scale: scale.to_string(),
                ..NewPatient::default()
            }),
            _ => Err(errors),
        }
    }
}

fn parse_age(text: &str) -> Result<i32, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::AgeRequired);
    }
    match text.parse::<i32>() {
        Ok(age) if (1..=MAX_AGE).contains(&age) => Ok(age),
        _ => Err(ValidationError::AgeOutOfRange),
    }
}

fn parse_weight(text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::WeightRequired);
    }
    match text.parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => Ok(weight),
        _ => Err(ValidationError::WeightInvalid),
    }
}

/// Bulleted, newline-separated message for an error dialog.
pub fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("• {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
