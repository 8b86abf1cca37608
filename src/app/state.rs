// ABOUTME: Application state for the TUI: views, login form, assessment wizard, results
// App wraps the state with the API client and drains results of background requests on tick

use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{CardioApiClient, Coordinates, Hospital, RegisterRequest, UserDetails};
use crate::components::assessment::{
    AssessmentFocus, FieldDefinition, FieldName, FieldRenderer, FieldValue, FieldView, NormalizedSubmission,
    PredictionOutcome, PredictionService, RiskBanner, StepFormController, SubmissionError,
};
use crate::config::AppConfig;
use crate::session::{SessionContext, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn success(message: String) -> Self {
        Self::with_duration(message, NotificationType::Success, 3)
    }

    pub fn error(message: String) -> Self {
        Self::with_duration(message, NotificationType::Error, 6)
    }

    pub fn info(message: String) -> Self {
        Self::with_duration(message, NotificationType::Info, 3)
    }

    pub fn warning(message: String) -> Self {
        Self::with_duration(message, NotificationType::Warning, 4)
    }

    fn with_duration(message: String, notification_type: NotificationType, secs: u64) -> Self {
        Self {
            message,
            notification_type,
            created_at: Instant::now(),
            duration: Duration::from_secs(secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Assessment,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    FirstName,
    LastName,
    Phone,
}

impl LoginField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Password => "Password",
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Phone => "Phone (optional)",
        }
    }
}

/// Sign-in / sign-up form
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub focus_index: usize,
    pub in_flight: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            focus_index: 0,
            in_flight: false,
        }
    }

    /// Fields shown in the current mode, top to bottom
    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            AuthMode::Login => &[LoginField::Email, LoginField::Password],
            AuthMode::Register => &[
                LoginField::Email,
                LoginField::Password,
                LoginField::FirstName,
                LoginField::LastName,
                LoginField::Phone,
            ],
        }
    }

    pub fn focused_field(&self) -> LoginField {
        let fields = self.fields();
        fields[self.focus_index.min(fields.len() - 1)]
    }

    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::Email => &self.email,
            LoginField::Password => &self.password,
            LoginField::FirstName => &self.first_name,
            LoginField::LastName => &self.last_name,
            LoginField::Phone => &self.phone,
        }
    }

    fn value_mut(&mut self, field: LoginField) -> &mut String {
        match field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::FirstName => &mut self.first_name,
            LoginField::LastName => &mut self.last_name,
            LoginField::Phone => &mut self.phone,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let field = self.focused_field();
        self.value_mut(field).push(c);
    }

    pub fn input_str(&mut self, text: &str) {
        let field = self.focused_field();
        self.value_mut(field).push_str(text.trim_end_matches(['\r', '\n']));
    }

    pub fn backspace(&mut self) {
        let field = self.focused_field();
        self.value_mut(field).pop();
    }

    pub fn next_field(&mut self) {
        self.focus_index = (self.focus_index + 1) % self.fields().len();
    }

    pub fn previous_field(&mut self) {
        let count = self.fields().len();
        self.focus_index = (self.focus_index + count - 1) % count;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.focus_index = 0;
    }

    /// Build the request for the current mode, or say what is missing
    pub fn to_action(&self) -> Result<AsyncAction, String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }

        match self.mode {
            AuthMode::Login => Ok(AsyncAction::Login {
                email: email.to_string(),
                password: self.password.clone(),
            }),
            AuthMode::Register => {
                if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
                    return Err("First and last name are required".to_string());
                }
                let phone = self.phone.trim();
                Ok(AsyncAction::Register(RegisterRequest {
                    email: email.to_string(),
                    password: self.password.clone(),
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    phone_number: (!phone.is_empty()).then(|| phone.to_string()),
                }))
            }
        }
    }

    /// Forget typed secrets after a successful sign-in
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.in_flight = false;
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HospitalsStatus {
    /// No location configured
    Unavailable,
    Loading,
    Loaded(Vec<Hospital>),
    Failed(String),
}

/// Nearby cardiac centres shown under the result
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalsState {
    pub status: HospitalsStatus,
    pub selected: usize,
}

impl HospitalsState {
    pub fn new() -> Self {
        Self {
            status: HospitalsStatus::Unavailable,
            selected: 0,
        }
    }

    pub fn hospitals(&self) -> &[Hospital] {
        match &self.status {
            HospitalsStatus::Loaded(hospitals) => hospitals,
            _ => &[],
        }
    }

    pub fn selected_hospital(&self) -> Option<&Hospital> {
        self.hospitals().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let count = self.hospitals().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.hospitals().len();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }
}

impl Default for HospitalsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Work that needs the API client or the OS and runs from `App::tick`
#[derive(Debug, Clone)]
pub enum AsyncAction {
    Login { email: String, password: String },
    Register(RegisterRequest),
    Logout,
    SubmitPrediction(NormalizedSubmission),
    FetchHospitals(Coordinates),
    CopyToClipboard(String),
}

/// Outcome of a background request
#[derive(Debug)]
pub enum AsyncResult {
    Authenticated(Result<(String, Option<UserDetails>), String>),
    Prediction(Result<PredictionOutcome, SubmissionError>),
    Hospitals(Result<Vec<Hospital>, String>),
}

pub struct AppState {
    pub current_view: View,
    pub config: AppConfig,
    pub session: SessionContext,
    pub login: LoginForm,
    pub assessment: StepFormController,
    pub focus: AssessmentFocus,
    pub prediction: Option<PredictionOutcome>,
    pub hospitals: HospitalsState,
    /// Overrides the configured location for hospital lookup
    pub location: Option<Coordinates>,
    pub notifications: Vec<Notification>,
    pub pending_async_action: Option<AsyncAction>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, session: SessionContext) -> Self {
        let current_view = if session.is_authenticated() {
            View::Assessment
        } else {
            View::Login
        };

        let mut focus = AssessmentFocus::new();
        focus.show_help = config.ui_preferences.show_help_on_start;

        Self {
            current_view,
            location: config.location.map(Coordinates::from),
            config,
            session,
            login: LoginForm::new(),
            assessment: StepFormController::new(),
            focus,
            prediction: None,
            hospitals: HospitalsState::new(),
            notifications: Vec::new(),
            pending_async_action: None,
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn add_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn cleanup_expired_notifications(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    // Login view

    pub fn submit_login(&mut self) {
        if self.login.in_flight {
            return;
        }
        match self.login.to_action() {
            Ok(action) => {
                self.login.in_flight = true;
                self.pending_async_action = Some(action);
            }
            Err(message) => self.add_notification(Notification::warning(message)),
        }
    }

    pub fn apply_authenticated(&mut self, result: Result<(String, Option<UserDetails>), String>) {
        self.login.in_flight = false;
        match result {
            Ok((token, user)) => {
                let greeting = user
                    .as_ref()
                    .map(|u| format!("Welcome, {}", u.display_name()))
                    .unwrap_or_else(|| "Signed in".to_string());
                self.session.establish(token, user);
                self.login.clear_secrets();
                self.reset_assessment();
                self.current_view = View::Assessment;
                self.add_notification(Notification::success(greeting));
            }
            Err(message) => {
                warn!("Authentication failed: {}", message);
                self.add_notification(Notification::error(message));
            }
        }
    }

    pub fn request_logout(&mut self) {
        if self.assessment.is_submitting() {
            self.add_notification(Notification::warning("Wait for the prediction to finish".to_string()));
            return;
        }
        self.pending_async_action = Some(AsyncAction::Logout);
    }

    /// Drop session data and go back to the login view
    pub fn end_session(&mut self) {
        self.session.teardown();
        self.reset_assessment();
        self.login = LoginForm::new();
        self.current_view = View::Login;
    }

    // Assessment view

    pub fn reset_assessment(&mut self) {
        self.assessment.reset();
        self.focus.reset_for_step();
        self.prediction = None;
        self.hospitals = HospitalsState::new();
    }

    fn focused_definition(&self) -> Option<(FieldName, &'static FieldDefinition)> {
        self.focus
            .focused_field(&self.assessment)
            .map(|field| (field, field.definition()))
    }

    fn set_focused_value(&mut self, value: FieldValue) {
        let Some((field, _)) = self.focused_definition() else {
            return;
        };
        if let Err(e) = self.assessment.set_field_value(field, value) {
            debug!("Edit refused: {}", e);
            self.add_notification(Notification::warning(e.to_string()));
        }
    }

    pub fn focus_next_field(&mut self) {
        self.focus.next_field(self.assessment.current_fields().len());
        self.sync_highlight();
    }

    pub fn focus_previous_field(&mut self) {
        self.focus.previous_field(self.assessment.current_fields().len());
        self.sync_highlight();
    }

    /// Start the highlight on the selected option of a choice field
    fn sync_highlight(&mut self) {
        if let Some((field, definition)) = self.focused_definition() {
            let view = FieldRenderer::view(definition, self.assessment.value(field));
            if let FieldView::Choice { options, .. } = &view {
                if let Some(idx) = options.iter().position(|o| o.selected) {
                    self.focus.highlight = idx;
                }
            }
        }
    }

    fn focused_item_count(&self) -> usize {
        self.focused_definition()
            .map(|(field, definition)| FieldRenderer::view(definition, self.assessment.value(field)).item_count())
            .unwrap_or(0)
    }

    pub fn highlight_next(&mut self) {
        let count = self.focused_item_count();
        self.focus.highlight_next(count);
    }

    pub fn highlight_previous(&mut self) {
        let count = self.focused_item_count();
        self.focus.highlight_previous(count);
    }

    /// Select the highlighted option, or apply the highlighted quick fill
    pub fn apply_highlight(&mut self) {
        let Some((_, definition)) = self.focused_definition() else {
            return;
        };
        let value = if definition.is_choice() {
            FieldRenderer::select_option(definition, self.focus.highlight)
        } else {
            FieldRenderer::quick_fill(definition, self.focus.highlight)
        };
        if let Some(value) = value {
            self.set_focused_value(value);
        }
    }

    /// Typed character: edits numeric text, or picks the n-th option of a choice field
    pub fn input_char(&mut self, c: char) {
        let Some((field, definition)) = self.focused_definition() else {
            return;
        };

        if definition.is_choice() {
            if let Some(idx) = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1)) {
                if let Some(value) = FieldRenderer::select_option(definition, idx) {
                    self.focus.highlight = idx;
                    self.set_focused_value(value);
                }
            }
            return;
        }

        if c.is_ascii_digit() || c == '.' || c == '-' {
            let mut text = self.assessment.value(field).as_text().to_string();
            text.push(c);
            self.set_focused_value(FieldValue::Text(text));
        }
    }

    pub fn backspace(&mut self) {
        let Some((field, definition)) = self.focused_definition() else {
            return;
        };
        if definition.is_choice() {
            return;
        }

        let mut text = self.assessment.value(field).as_text().to_string();
        text.pop();
        let value = if text.is_empty() {
            FieldValue::Unset
        } else {
            FieldValue::Text(text)
        };
        self.set_focused_value(value);
    }

    /// Clear the focused field back to unanswered
    pub fn clear_field(&mut self) {
        self.set_focused_value(FieldValue::Unset);
    }

    pub fn previous_step(&mut self) {
        match self.assessment.previous_step() {
            Ok(()) => {
                self.focus.reset_for_step();
                self.sync_highlight();
            }
            Err(e) => debug!("Previous step refused: {}", e),
        }
    }

    pub fn next_step(&mut self) {
        match self.assessment.next_step() {
            Ok(()) => {
                self.focus.reset_for_step();
                self.sync_highlight();
            }
            Err(e) => debug!("Next step refused: {}", e),
        }
    }

    /// Enter: next step, or submit from the final step
    pub fn advance(&mut self) {
        if self.assessment.is_final_step() {
            self.request_submit();
        } else {
            self.next_step();
        }
    }

    pub fn request_submit(&mut self) {
        match self.assessment.begin_submit() {
            Ok(submission) => {
                let defaulted = submission.defaulted().len();
                if defaulted > 0 {
                    self.add_notification(Notification::warning(format!(
                        "{} unanswered field(s) sent as 0",
                        defaulted
                    )));
                }
                self.pending_async_action = Some(AsyncAction::SubmitPrediction(submission));
            }
            Err(e) => self.add_notification(Notification::error(e.to_string())),
        }
    }

    pub fn apply_prediction(&mut self, result: Result<PredictionOutcome, SubmissionError>) {
        self.assessment.finish_submit();

        match result {
            Ok(outcome) => {
                info!(banner = ?outcome.banner(), "Prediction received");
                self.prediction = Some(outcome);
                self.current_view = View::Results;
                self.hospitals = HospitalsState::new();

                if let Some(location) = self.location {
                    self.hospitals.status = HospitalsStatus::Loading;
                    self.pending_async_action = Some(AsyncAction::FetchHospitals(location));
                }
            }
            Err(SubmissionError::NotAuthenticated) => {
                self.add_notification(Notification::error("Session expired, please log in again".to_string()));
                self.pending_async_action = Some(AsyncAction::Logout);
            }
            Err(e) => {
                error!("Prediction failed: {}", e);
                self.add_notification(Notification::error(format!("Prediction failed: {}", e)));
            }
        }
    }

    // Results view

    pub fn banner(&self) -> Option<RiskBanner> {
        self.prediction.as_ref().map(PredictionOutcome::banner)
    }

    pub fn apply_hospitals(&mut self, result: Result<Vec<Hospital>, String>) {
        self.hospitals.selected = 0;
        self.hospitals.status = match result {
            Ok(hospitals) => HospitalsStatus::Loaded(hospitals),
            Err(message) => {
                warn!("Hospital lookup failed: {}", message);
                HospitalsStatus::Failed(message)
            }
        };
    }

    pub fn copy_directions(&mut self) {
        match self.hospitals.selected_hospital() {
            Some(hospital) => {
                self.pending_async_action = Some(AsyncAction::CopyToClipboard(hospital.directions_url()));
            }
            None => self.add_notification(Notification::info("No hospital selected".to_string())),
        }
    }

    pub fn start_new_assessment(&mut self) {
        self.reset_assessment();
        self.current_view = View::Assessment;
    }

    /// Apply the result of a background request
    pub fn apply_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::Authenticated(result) => self.apply_authenticated(result),
            AsyncResult::Prediction(result) => self.apply_prediction(result),
            AsyncResult::Hospitals(result) => self.apply_hospitals(result),
        }
    }
}

pub struct App {
    pub state: AppState,
    client: CardioApiClient,
    store: Option<SessionStore>,
    results_tx: mpsc::UnboundedSender<AsyncResult>,
    results_rx: mpsc::UnboundedReceiver<AsyncResult>,
    last_blink: Instant,
}

impl App {
    pub fn new(config: AppConfig, session: SessionContext, client: CardioApiClient, store: Option<SessionStore>) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let client = client.with_token(session.bearer().map(str::to_string));

        Self {
            state: AppState::new(config, session),
            client,
            store,
            results_tx,
            results_rx,
            last_blink: Instant::now(),
        }
    }

    /// Called on every UI tick
    pub async fn tick(&mut self) -> anyhow::Result<()> {
        self.state.cleanup_expired_notifications();

        if self.state.config.ui_preferences.cursor_blink && self.last_blink.elapsed() >= Duration::from_millis(500) {
            self.state.focus.toggle_cursor();
            self.last_blink = Instant::now();
        }

        while let Ok(result) = self.results_rx.try_recv() {
            let authenticated = matches!(&result, AsyncResult::Authenticated(Ok(_)));
            self.state.apply_result(result);
            if authenticated {
                self.on_authenticated();
            }
        }

        if let Some(action) = self.state.pending_async_action.take() {
            self.dispatch(action);
        }

        Ok(())
    }

    fn on_authenticated(&mut self) {
        self.client.set_token(self.state.session.bearer().map(str::to_string));
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.state.session) {
                warn!("Failed to persist session: {}", e);
                self.state
                    .add_notification(Notification::warning(format!("Session not saved: {}", e)));
            }
        }
    }

    fn dispatch(&mut self, action: AsyncAction) {
        match action {
            AsyncAction::Login { email, password } => {
                let client = self.client.clone();
                let tx = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = match client.login(&email, &password).await {
                        Ok(token) => Ok(fetch_user(client, token).await),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(AsyncResult::Authenticated(result));
                });
            }
            AsyncAction::Register(request) => {
                let client = self.client.clone();
                let tx = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = match client.register(&request).await {
                        Ok(token) => Ok(fetch_user(client, token).await),
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(AsyncResult::Authenticated(result));
                });
            }
            AsyncAction::Logout => {
                if let Some(store) = &self.store {
                    if let Err(e) = store.clear() {
                        warn!("Failed to clear stored session: {}", e);
                    }
                }
                self.client.set_token(None);
                self.state.end_session();
                self.state.add_notification(Notification::info("Logged out".to_string()));
            }
            AsyncAction::SubmitPrediction(submission) => {
                spawn_prediction(self.client.clone(), submission, self.results_tx.clone());
            }
            AsyncAction::FetchHospitals(location) => {
                let client = self.client.clone();
                let tx = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = client.nearby_hospitals(location).await.map_err(|e| e.to_string());
                    let _ = tx.send(AsyncResult::Hospitals(result));
                });
            }
            AsyncAction::CopyToClipboard(text) => match copy_to_clipboard(&text) {
                Ok(()) => self
                    .state
                    .add_notification(Notification::success("Directions link copied".to_string())),
                Err(e) => {
                    warn!("Clipboard unavailable: {}", e);
                    self.state.add_notification(Notification::info(text));
                }
            },
        }
    }
}

/// Run the prediction in its own task and always report back, even if that task dies,
/// so the wizard never stays stuck in submitting
fn spawn_prediction<S>(service: S, submission: NormalizedSubmission, tx: mpsc::UnboundedSender<AsyncResult>)
where
    S: PredictionService + 'static,
{
    let request = tokio::spawn(async move { service.predict(&submission).await });
    tokio::spawn(async move {
        let result = match request.await {
            Ok(result) => result,
            Err(e) => {
                error!("Prediction task failed: {}", e);
                Err(SubmissionError::Transport(format!("prediction task failed: {}", e)))
            }
        };
        let _ = tx.send(AsyncResult::Prediction(result));
    });
}

/// User details are best effort; a session without them is still valid
async fn fetch_user(client: CardioApiClient, token: String) -> (String, Option<UserDetails>) {
    let client = client.with_token(Some(token.clone()));
    match client.user_details().await {
        Ok(user) => (token, Some(user)),
        Err(e) => {
            warn!("Could not fetch user details: {}", e);
            (token, None)
        }
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), String> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
}

/// Read text from the system clipboard for pasting into the login form
pub fn read_clipboard() -> Result<String, String> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.get_text().map_err(|e| e.to_string())
}
