//! Assessment scales and pain-level bucketing.

use serde::{Deserialize, Serialize};

/// Clinical scoring instrument a patient is assessed against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssessmentScale {
    VisualAnalog,
    NumericPainRating,
    OxfordKnee,
    Spadi,
    Hoos,
    QuickDash,
    Oswestry,
    NeckDisability,
    Custom,
}

impl AssessmentScale {
    /// All scales in selection order.
    pub const ALL: [AssessmentScale; 9] = [
        AssessmentScale::VisualAnalog,
        AssessmentScale::NumericPainRating,
        AssessmentScale::OxfordKnee,
        AssessmentScale::Spadi,
        AssessmentScale::Hoos,
        AssessmentScale::QuickDash,
        AssessmentScale::Oswestry,
        AssessmentScale::NeckDisability,
        AssessmentScale::Custom,
    ];

    /// Display label, also the value stored on patients and entries.
    pub fn label(&self) -> &'static str {
        match self {
            AssessmentScale::VisualAnalog => "Visual Analog Scale (VAS)",
            AssessmentScale::NumericPainRating => "Numeric Pain Rating Scale",
            AssessmentScale::OxfordKnee => "Oxford Knee Score",
            AssessmentScale::Spadi => "Shoulder Pain and Disability Index (SPADI)",
            AssessmentScale::Hoos => "Hip Disability and Osteoarthritis Outcome Score (HOOS)",
            AssessmentScale::QuickDash => "Quick Disabilities of Arm, Shoulder & Hand (QuickDASH)",
            AssessmentScale::Oswestry => "Oswestry Disability Index",
            AssessmentScale::NeckDisability => "Neck Disability Index",
            AssessmentScale::Custom => "Custom Assessment Scale",
        }
    }
}

impl std::fmt::Display for AssessmentScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Labels of every built-in scale, in selection order.
pub fn available_assessment_scales() -> Vec<String> {
    AssessmentScale::ALL
        .iter()
        .map(|scale| scale.label().to_string())
        .collect()
}

/// Display bucket for a 0-10 pain level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PainCategory {
    NoPain,
    Mild,
    Moderate,
    Severe,
    Unknown,
}

impl PainCategory {
    pub fn from_level(level: i32) -> Self {
        match level {
            0 => PainCategory::NoPain,
            1..=3 => PainCategory::Mild,
            4..=6 => PainCategory::Moderate,
            7..=10 => PainCategory::Severe,
            _ => PainCategory::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PainCategory::NoPain => "No Pain",
            PainCategory::Mild => "Mild Pain",
            PainCategory::Moderate => "Moderate Pain",
            PainCategory::Severe => "Severe Pain",
            PainCategory::Unknown => "Unknown",
        }
    }
}

/// Describe a pain level; anything outside 0-10 is "Unknown".
pub fn pain_level_description(level: i32) -> &'static str {
    PainCategory::from_level(level).description()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scale_order() {
        let scales = available_assessment_scales();
        assert_eq!(scales.len(), 9);
        assert_eq!(scales[0], "Visual Analog Scale (VAS)");
        assert_eq!(scales[6], "Oswestry Disability Index");
        assert_eq!(scales[8], "Custom Assessment Scale");
    }

    #[test]
    fn test_pain_buckets() {
        assert_eq!(pain_level_description(0), "No Pain");
        assert_eq!(pain_level_description(1), "Mild Pain");
        assert_eq!(pain_level_description(3), "Mild Pain");
        assert_eq!(pain_level_description(4), "Moderate Pain");
        assert_eq!(pain_level_description(6), "Moderate Pain");
        assert_eq!(pain_level_description(7), "Severe Pain");
        assert_eq!(pain_level_description(10), "Severe Pain");
        assert_eq!(pain_level_description(11), "Unknown");
        assert_eq!(pain_level_description(-1), "Unknown");
    }

    proptest! {
        #[test]
        fn pain_levels_in_range_are_named(level in 0i32..=10) {
            let description = pain_level_description(level);
            prop_assert!(
                ["No Pain", "Mild Pain", "Moderate Pain", "Severe Pain"].contains(&description)
            );
            prop_assert_eq!(description, pain_level_description(level));
        }

        #[test]
        fn pain_levels_out_of_range_are_unknown(level in any::<i32>().prop_filter("outside 0-10", |l| !(0..=10).contains(l))) {
            prop_assert_eq!(pain_level_description(level), "Unknown");
        }
    }
}
