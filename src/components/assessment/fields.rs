// ABOUTME: Static field catalogue for the heart health assessment
// Defines every field, its input affordance, and the fixed step grouping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The predefined assessment fields, in canonical (wire) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Age,
    Sex,
    Cp,
    Trestbps,
    Chol,
    Fbs,
    Restecg,
    Thalach,
    Exang,
    Oldpeak,
    Slope,
    Ca,
    Thal,
}

impl FieldName {
    /// All fields in canonical order
    pub fn all() -> &'static [FieldName] {
        &[
            Self::Age,
            Self::Sex,
            Self::Cp,
            Self::Trestbps,
            Self::Chol,
            Self::Fbs,
            Self::Restecg,
            Self::Thalach,
            Self::Exang,
            Self::Oldpeak,
            Self::Slope,
            Self::Ca,
            Self::Thal,
        ]
    }

    /// Key used by the prediction API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Cp => "cp",
            Self::Trestbps => "trestbps",
            Self::Chol => "chol",
            Self::Fbs => "fbs",
            Self::Restecg => "restecg",
            Self::Thalach => "thalach",
            Self::Exang => "exang",
            Self::Oldpeak => "oldpeak",
            Self::Slope => "slope",
            Self::Ca => "ca",
            Self::Thal => "thal",
        }
    }

    /// Static definition for this field
    pub fn definition(&self) -> &'static FieldDefinition {
        definition(*self)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .find(|f| f.as_str() == key)
            .copied()
            .ok_or_else(|| format!("Unknown field '{}'", s))
    }
}

/// One selectable answer of a choice field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption {
    pub code: u8,
    pub label: &'static str,
    pub description: &'static str,
}

/// Input affordance for a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefinition {
    /// Free-form number with optional quick-fill suggestions.
    /// The range in `help` is advisory and never enforced client-side.
    Numeric {
        label: &'static str,
        unit: Option<&'static str>,
        help: Option<&'static str>,
        suggestions: &'static [f64],
    },
    /// One of a small set of labeled codes
    Choice {
        label: &'static str,
        options: &'static [ChoiceOption],
    },
}

impl FieldDefinition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Numeric { label, .. } | Self::Choice { label, .. } => *label,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Choice { .. })
    }

    /// Options for choice fields, empty for numeric ones
    pub fn options(&self) -> &'static [ChoiceOption] {
        match self {
            Self::Choice { options, .. } => *options,
            Self::Numeric { .. } => &[],
        }
    }

    /// Quick-fill values for numeric fields, empty for choice ones
    pub fn suggestions(&self) -> &'static [f64] {
        match self {
            Self::Numeric { suggestions, .. } => *suggestions,
            Self::Choice { .. } => &[],
        }
    }
}

const AGE: FieldDefinition = FieldDefinition::Numeric {
    label: "Age",
    unit: Some("years"),
    help: Some("Enter your age in years (29-77)"),
    suggestions: &[30.0, 45.0, 60.0, 75.0],
};

const SEX: FieldDefinition = FieldDefinition::Choice {
    label: "Biological Sex",
    options: &[
        ChoiceOption { code: 0, label: "Prefer not to say", description: "Keep this information private" },
        ChoiceOption { code: 1, label: "Female", description: "Assigned female at birth" },
        ChoiceOption { code: 2, label: "Male", description: "Assigned male at birth" },
    ],
};

const CP: FieldDefinition = FieldDefinition::Choice {
    label: "Chest Pain Type",
    options: &[
        ChoiceOption {
            code: 1,
            label: "Typical Angina",
            description: "Chest pain related to decreased blood flow to the heart",
        },
        ChoiceOption { code: 2, label: "Atypical Angina", description: "Chest pain not typical of heart disease" },
        ChoiceOption { code: 3, label: "Non-anginal Pain", description: "Chest pain not caused by reduced blood flow" },
        ChoiceOption { code: 4, label: "Asymptomatic", description: "No chest pain symptoms" },
    ],
};

const TRESTBPS: FieldDefinition = FieldDefinition::Numeric {
    label: "Resting Blood Pressure",
    unit: Some("mm Hg"),
    help: Some("Your blood pressure at rest (94-200)"),
    suggestions: &[120.0, 140.0, 160.0, 180.0],
};

const CHOL: FieldDefinition = FieldDefinition::Numeric {
    label: "Cholesterol Level",
    unit: Some("mg/dl"),
    help: Some("Serum cholesterol in mg/dl (126-564)"),
    suggestions: &[200.0, 240.0, 280.0, 320.0],
};

const FBS: FieldDefinition = FieldDefinition::Choice {
    label: "Fasting Blood Sugar",
    options: &[
        ChoiceOption { code: 0, label: "Not sure", description: "I don't know my fasting blood sugar" },
        ChoiceOption { code: 1, label: "Normal (< 120 mg/dl)", description: "Fasting blood sugar below 120 mg/dl" },
        ChoiceOption { code: 2, label: "High (> 120 mg/dl)", description: "Fasting blood sugar above 120 mg/dl" },
    ],
};

const RESTECG: FieldDefinition = FieldDefinition::Choice {
    label: "Resting ECG",
    options: &[
        ChoiceOption { code: 0, label: "Not sure", description: "I don't know my ECG results" },
        ChoiceOption { code: 1, label: "Normal", description: "Normal resting electrocardiogram" },
        ChoiceOption { code: 2, label: "ST-T Abnormality", description: "Abnormal ST-T wave changes" },
        ChoiceOption { code: 3, label: "LV Hypertrophy", description: "Left ventricular hypertrophy" },
    ],
};

const THALACH: FieldDefinition = FieldDefinition::Numeric {
    label: "Max Heart Rate",
    unit: Some("bpm"),
    help: Some("Highest heart rate achieved (71-202)"),
    suggestions: &[120.0, 150.0, 180.0, 200.0],
};

const EXANG: FieldDefinition = FieldDefinition::Choice {
    label: "Exercise Angina",
    options: &[
        ChoiceOption {
            code: 0,
            label: "Not sure",
            description: "I don't know if I have exercise-induced angina",
        },
        ChoiceOption { code: 1, label: "No", description: "No chest pain during exercise" },
        ChoiceOption { code: 2, label: "Yes", description: "Experience chest pain during exercise" },
    ],
};

const OLDPEAK: FieldDefinition = FieldDefinition::Numeric {
    label: "ST Depression",
    unit: Some("mm"),
    help: Some("ST depression induced by exercise (0-6.2)"),
    suggestions: &[1.0, 2.0, 3.0, 4.0],
};

const SLOPE: FieldDefinition = FieldDefinition::Choice {
    label: "ST Slope",
    options: &[
        ChoiceOption { code: 0, label: "Not sure", description: "I don't know my ST slope results" },
        ChoiceOption { code: 1, label: "Upsloping", description: "Upward sloping ST segment" },
        ChoiceOption { code: 2, label: "Flat", description: "Flat ST segment" },
        ChoiceOption { code: 3, label: "Downsloping", description: "Downward sloping ST segment" },
    ],
};

const CA: FieldDefinition = FieldDefinition::Numeric {
    label: "Major Vessels",
    unit: None,
    help: Some("Number of major vessels (0-4) colored by fluoroscopy"),
    suggestions: &[0.0, 1.0, 2.0, 3.0, 4.0],
};

const THAL: FieldDefinition = FieldDefinition::Choice {
    label: "Thalassemia",
    options: &[
        ChoiceOption { code: 0, label: "Not sure", description: "I don't know my thalassemia results" },
        ChoiceOption { code: 1, label: "Normal", description: "Normal blood flow" },
        ChoiceOption { code: 2, label: "Fixed Defect", description: "Permanent blood flow defect" },
        ChoiceOption { code: 3, label: "Reversible Defect", description: "Temporary blood flow defect" },
    ],
};

fn definition(field: FieldName) -> &'static FieldDefinition {
    match field {
        FieldName::Age => &AGE,
        FieldName::Sex => &SEX,
        FieldName::Cp => &CP,
        FieldName::Trestbps => &TRESTBPS,
        FieldName::Chol => &CHOL,
        FieldName::Fbs => &FBS,
        FieldName::Restecg => &RESTECG,
        FieldName::Thalach => &THALACH,
        FieldName::Exang => &EXANG,
        FieldName::Oldpeak => &OLDPEAK,
        FieldName::Slope => &SLOPE,
        FieldName::Ca => &CA,
        FieldName::Thal => &THAL,
    }
}

/// Fields shown together on each wizard step. Partitions `FieldName::all()`.
pub const STEP_GROUPS: &[&[FieldName]] = &[
    &[FieldName::Age, FieldName::Sex, FieldName::Cp],
    &[FieldName::Trestbps, FieldName::Chol, FieldName::Fbs],
    &[FieldName::Restecg, FieldName::Thalach, FieldName::Exang],
    &[FieldName::Oldpeak, FieldName::Slope, FieldName::Ca, FieldName::Thal],
];

/// Short titles for the progress header
pub const STEP_TITLES: &[&str] = &["Basics", "Vitals", "Cardiac Tests", "Stress Test"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_step_groups_partition_fields() {
        let mut seen = HashSet::new();
        for group in STEP_GROUPS {
            for field in *group {
                assert!(seen.insert(*field), "{} appears in more than one step", field);
            }
        }
        assert_eq!(seen.len(), FieldName::all().len());
        assert_eq!(STEP_TITLES.len(), STEP_GROUPS.len());
    }

    #[test]
    fn test_field_name_round_trip_through_str() {
        for field in FieldName::all() {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), *field);
        }
        assert_eq!(" Thalach ".parse::<FieldName>().unwrap(), FieldName::Thalach);
        assert!("bmi".parse::<FieldName>().is_err());
    }

    #[test]
    fn test_definition_kinds() {
        assert!(!FieldName::Age.definition().is_choice());
        assert!(FieldName::Sex.definition().is_choice());
        assert!(!FieldName::Ca.definition().is_choice());
        assert_eq!(FieldName::Cp.definition().options()[0].label, "Typical Angina");
        assert_eq!(FieldName::Age.definition().suggestions(), &[30.0, 45.0, 60.0, 75.0]);
    }

    #[test]
    fn test_option_codes_unique_per_field() {
        for field in FieldName::all() {
            let codes: HashSet<u8> = field.definition().options().iter().map(|o| o.code).collect();
            assert_eq!(codes.len(), field.definition().options().len());
        }
    }
}
