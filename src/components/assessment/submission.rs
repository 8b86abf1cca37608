// ABOUTME: Submission boundary of the assessment wizard
// Normalized record handed to the prediction service, its outcome, and the failure type

use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

use super::fields::FieldName;

/// Phrase the prediction service uses for a negative result
const LOW_RISK_PHRASE: &str = "not likely";

/// Fully numeric record sent to the prediction service.
///
/// Holds every predefined field. Unanswered fields are present with value 0;
/// `defaulted()` lists them so callers can tell a default from a typed 0.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSubmission {
    values: BTreeMap<FieldName, f64>,
    defaulted: Vec<FieldName>,
}

impl NormalizedSubmission {
    pub(crate) fn new(values: BTreeMap<FieldName, f64>, defaulted: Vec<FieldName>) -> Self {
        Self { values, defaulted }
    }

    pub fn get(&self, field: FieldName) -> Option<f64> {
        self.values.get(&field).copied()
    }

    pub fn values(&self) -> &BTreeMap<FieldName, f64> {
        &self.values
    }

    /// Fields that had no answer and were sent as 0
    pub fn defaulted(&self) -> &[FieldName] {
        &self.defaulted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// Whole numbers go out as integers; the service casts most fields with int()
impl Serialize for NormalizedSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                map.serialize_entry(field.as_str(), &(*value as i64))?;
            } else {
                map.serialize_entry(field.as_str(), value)?;
            }
        }
        map.end()
    }
}

/// Successful answer from the prediction service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub message: String,
}

impl PredictionOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn banner(&self) -> RiskBanner {
        RiskBanner::classify(&self.message)
    }
}

/// How a result message is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBanner {
    LowRisk,
    PotentialRisk,
}

impl RiskBanner {
    pub fn classify(message: &str) -> Self {
        if message.contains(LOW_RISK_PHRASE) {
            Self::LowRisk
        } else {
            Self::PotentialRisk
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LowRisk => "✅ Low Risk Detected",
            Self::PotentialRisk => "⚠️ Potential Risk Detected",
        }
    }

    pub fn has_risk(&self) -> bool {
        matches!(self, Self::PotentialRisk)
    }
}

/// The single failure kind of a submission: the service call did not produce a prediction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Could not reach prediction service: {0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("Unexpected response from prediction service: {0}")]
    MalformedResponse(String),
}

/// The submit collaborator of the wizard
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(
        &self,
        submission: &NormalizedSubmission,
    ) -> Result<PredictionOutcome, SubmissionError>;
}
