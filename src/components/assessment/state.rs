// ABOUTME: State management for the assessment wizard
// Owns step navigation, field values, transition direction, and submission gating

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields::{FieldDefinition, FieldName, STEP_GROUPS, STEP_TITLES};
use super::submission::{NormalizedSubmission, PredictionOutcome, PredictionService, SubmissionError};

/// Raw value of a field as edited by the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Unset,
    /// Numeric fields are edited as text and parsed at submission
    Text(String),
    /// Choice fields store the selected option code
    Code(u8),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text of a numeric value, empty for anything else
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    pub fn code(&self) -> Option<u8> {
        match self {
            Self::Code(code) => Some(*code),
            _ => None,
        }
    }

    /// True when nothing meaningful has been entered
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Code(_) => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Text(_) => "text",
            Self::Code(_) => "option",
        }
    }
}

/// Direction of the last step change, kept as visual metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionDirection {
    #[default]
    Forward,
    Backward,
}

impl TransitionDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Forward => "→",
            Self::Backward => "←",
        }
    }
}

/// Snapshot of the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub current_step: usize,
    pub values: BTreeMap<FieldName, FieldValue>,
    pub direction: TransitionDirection,
}

impl WizardState {
    fn new() -> Self {
        Self {
            current_step: 0,
            values: FieldName::all().iter().map(|f| (*f, FieldValue::Unset)).collect(),
            direction: TransitionDirection::Forward,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Field '{field}' is not on step {}", .step + 1)]
    FieldNotOnCurrentStep { field: FieldName, step: usize },

    #[error("Field '{field}' does not accept {kind} values")]
    ValueKindMismatch { field: FieldName, kind: &'static str },

    #[error("Step {} does not exist", .target + 1)]
    StepOutOfRange { target: usize },

    #[error("Cannot jump from step {} to step {}", .from + 1, .to + 1)]
    NonAdjacentStep { from: usize, to: usize },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the final step")]
    AtFinalStep,

    #[error("Submission is only available on the final step (currently on step {})", .step + 1)]
    NotAtFinalStep { step: usize },

    #[error("A submission is already in progress")]
    SubmissionPending,

    #[error("'{raw}' is not a number (field '{field}')")]
    InvalidNumber { field: FieldName, raw: String },
}

/// Failure of `StepFormController::submit`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The wizard refused to submit; the service was not called
    #[error(transparent)]
    Refused(#[from] WizardError),

    /// The service was called and failed
    #[error(transparent)]
    Failed(#[from] SubmissionError),
}

/// Wizard controller for the heart health assessment
#[derive(Debug, Clone)]
pub struct StepFormController {
    state: WizardState,
    submitting: bool,
}

impl StepFormController {
    pub fn new() -> Self {
        Self {
            state: WizardState::new(),
            submitting: false,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn step_count(&self) -> usize {
        STEP_GROUPS.len()
    }

    pub fn last_step(&self) -> usize {
        STEP_GROUPS.len() - 1
    }

    pub fn direction(&self) -> TransitionDirection {
        self.state.direction
    }

    pub fn step_title(&self) -> &'static str {
        STEP_TITLES[self.state.current_step]
    }

    /// Fields visible on the current step
    pub fn current_fields(&self) -> &'static [FieldName] {
        STEP_GROUPS[self.state.current_step]
    }

    pub fn value(&self, field: FieldName) -> &FieldValue {
        self.state.values.get(&field).unwrap_or(&FieldValue::Unset)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_go_back(&self) -> bool {
        self.state.current_step > 0 && !self.submitting
    }

    pub fn is_final_step(&self) -> bool {
        self.state.current_step == self.last_step()
    }

    /// Fields that would be sent as 0 if submitted now
    pub fn unanswered_fields(&self) -> Vec<FieldName> {
        FieldName::all()
            .iter()
            .copied()
            .filter(|f| self.value(*f).is_blank())
            .collect()
    }

    /// Replace the value of a field on the current step.
    /// Ranges are not checked; the prediction service validates semantics.
    pub fn set_field_value(&mut self, field: FieldName, value: FieldValue) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionPending);
        }

        if !self.current_fields().contains(&field) {
            return Err(WizardError::FieldNotOnCurrentStep {
                field,
                step: self.state.current_step,
            });
        }

        let accepted = match (field.definition(), &value) {
            (_, FieldValue::Unset) => true,
            (FieldDefinition::Numeric { .. }, FieldValue::Text(_)) => true,
            (FieldDefinition::Choice { .. }, FieldValue::Code(_)) => true,
            _ => false,
        };
        if !accepted {
            return Err(WizardError::ValueKindMismatch {
                field,
                kind: value.kind(),
            });
        }

        debug!(field = %field, kind = value.kind(), "Assessment field updated");
        self.state.values.insert(field, value);
        Ok(())
    }

    /// Move to an adjacent step
    pub fn go_to_step(&mut self, target: usize) -> Result<(), WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionPending);
        }
        if target > self.last_step() {
            return Err(WizardError::StepOutOfRange { target });
        }

        let from = self.state.current_step;
        if target.abs_diff(from) != 1 {
            return Err(WizardError::NonAdjacentStep { from, to: target });
        }

        self.state.direction = if target > from {
            TransitionDirection::Forward
        } else {
            TransitionDirection::Backward
        };
        self.state.current_step = target;
        debug!(from, to = target, "Assessment step changed");
        Ok(())
    }

    pub fn next_step(&mut self) -> Result<(), WizardError> {
        if self.is_final_step() {
            return Err(WizardError::AtFinalStep);
        }
        self.go_to_step(self.state.current_step + 1)
    }

    pub fn previous_step(&mut self) -> Result<(), WizardError> {
        let target = self
            .state
            .current_step
            .checked_sub(1)
            .ok_or(WizardError::AtFirstStep)?;
        self.go_to_step(target)
    }

    /// Coerce every raw value to a number: blank → 0, text → parsed, code → code
    pub fn normalize(&self) -> Result<NormalizedSubmission, WizardError> {
        let mut values = BTreeMap::new();
        let mut defaulted = Vec::new();

        for field in FieldName::all().iter().copied() {
            let number = match self.value(field) {
                FieldValue::Unset => {
                    defaulted.push(field);
                    0.0
                }
                FieldValue::Text(raw) => {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        defaulted.push(field);
                        0.0
                    } else {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .filter(|n| n.is_finite())
                            .ok_or_else(|| WizardError::InvalidNumber {
                                field,
                                raw: trimmed.to_string(),
                            })?
                    }
                }
                FieldValue::Code(code) => f64::from(*code),
            };
            values.insert(field, number);
        }

        Ok(NormalizedSubmission::new(values, defaulted))
    }

    /// Freeze the submission and enter the submitting state.
    /// Pair with `finish_submit` once the service call resolves.
    pub fn begin_submit(&mut self) -> Result<NormalizedSubmission, WizardError> {
        if self.submitting {
            return Err(WizardError::SubmissionPending);
        }
        if !self.is_final_step() {
            return Err(WizardError::NotAtFinalStep {
                step: self.state.current_step,
            });
        }

        let submission = self.normalize()?;
        if !submission.defaulted().is_empty() {
            let names: Vec<&str> = submission.defaulted().iter().map(FieldName::as_str).collect();
            warn!(fields = ?names, "Unanswered assessment fields submitted as 0");
        }

        self.submitting = true;
        info!("Assessment submission started");
        Ok(submission)
    }

    /// Leave the submitting state. Values and step are kept either way.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    /// Submit through `service`, calling it exactly once.
    /// On failure the wizard stays on the final step with every value intact.
    pub async fn submit<S>(&mut self, service: &S) -> Result<PredictionOutcome, SubmitError>
    where
        S: PredictionService + ?Sized,
    {
        let submission = self.begin_submit()?;
        let result = service.predict(&submission).await;
        self.finish_submit();

        match &result {
            Ok(_) => info!("Assessment submission succeeded"),
            Err(e) => warn!("Assessment submission failed: {}", e),
        }
        result.map_err(SubmitError::from)
    }

    /// Back to step 0 with every value unset
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StepFormController {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor position within the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentFocus {
    /// Index into the current step's fields
    pub field_index: usize,
    /// Highlighted option or quick-fill shortcut of the focused field
    pub highlight: usize,
    pub show_help: bool,
    pub show_cursor: bool,
}

impl AssessmentFocus {
    pub fn new() -> Self {
        Self {
            field_index: 0,
            highlight: 0,
            show_help: false,
            show_cursor: true,
        }
    }

    pub fn focused_field(&self, controller: &StepFormController) -> Option<FieldName> {
        controller.current_fields().get(self.field_index).copied()
    }

    /// Called after a step change
    pub fn reset_for_step(&mut self) {
        self.field_index = 0;
        self.highlight = 0;
    }

    pub fn next_field(&mut self, field_count: usize) {
        if field_count > 0 {
            self.field_index = (self.field_index + 1) % field_count;
            self.highlight = 0;
        }
    }

    pub fn previous_field(&mut self, field_count: usize) {
        if field_count > 0 {
            self.field_index = (self.field_index + field_count - 1) % field_count;
            self.highlight = 0;
        }
    }

    pub fn highlight_next(&mut self, item_count: usize) {
        if item_count > 0 {
            self.highlight = (self.highlight + 1) % item_count;
        }
    }

    pub fn highlight_previous(&mut self, item_count: usize) {
        if item_count > 0 {
            self.highlight = (self.highlight + item_count - 1) % item_count;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_cursor(&mut self) {
        self.show_cursor = !self.show_cursor;
    }
}

impl Default for AssessmentFocus {
    fn default() -> Self {
        Self::new()
    }
}
