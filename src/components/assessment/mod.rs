// ABOUTME: Heart health assessment wizard module
// Collects the thirteen clinical fields over four steps and submits them for a risk prediction

pub mod component;
pub mod fields;
pub mod renderer;
pub mod state;
pub mod submission;

pub use component::AssessmentComponent;
pub use fields::{ChoiceOption, FieldDefinition, FieldName, STEP_GROUPS, STEP_TITLES};
pub use renderer::{FieldFocus, FieldRenderer, FieldView, OptionView};
pub use state::{AssessmentFocus, FieldValue, StepFormController, SubmitError, TransitionDirection, WizardError, WizardState};
pub use submission::{NormalizedSubmission, PredictionOutcome, PredictionService, RiskBanner, SubmissionError};
