//! Range-of-motion measurements.

use serde::{Deserialize, Serialize};

/// Range of motion in degrees for the four tracked body regions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RangeOfMotion {
    pub shoulder: f64,
    pub knee: f64,
    pub elbow: f64,
    pub hip: f64,
}

impl RangeOfMotion {
    pub fn new(shoulder: f64, knee: f64, elbow: f64, hip: f64) -> Self {
        Self {
            shoulder,
            knee,
            elbow,
            hip,
        }
    }

    /// Sum of all four regions, used for improvement comparison.
    pub fn total(&self) -> f64 {
        self.shoulder + self.knee + self.elbow + self.hip
    }

    /// Overwrite the regions present in `update`, leave the rest unchanged.
    pub fn apply(&mut self, update: &RomUpdate) {
        if let Some(shoulder) = update.shoulder {
            self.shoulder = shoulder;
        }
        if let Some(knee) = update.knee {
            self.knee = knee;
        }
        if let Some(elbow) = update.elbow {
            self.elbow = elbow;
        }
        if let Some(hip) = update.hip {
            self.hip = hip;
        }
    }
}

/// Partial range-of-motion update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RomUpdate {
    pub shoulder: Option<f64>,
    pub knee: Option<f64>,
    pub elbow: Option<f64>,
    pub hip: Option<f64>,
}

impl RomUpdate {
    pub fn shoulder(value: f64) -> Self {
        Self {
            shoulder: Some(value),
            ..Self::default()
        }
    }

    /// True when no region would change.
    pub fn is_empty(&self) -> bool {
        self.shoulder.is_none() && self.knee.is_none() && self.elbow.is_none() && self.hip.is_none()
    }
}
