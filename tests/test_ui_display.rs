// ABOUTME: Test UI display of each view through the top-level layout using a headless backend

use cardiocheck::api::Hospital;
use cardiocheck::app::{state::HospitalsStatus, AppState, Notification, View};
use cardiocheck::components::assessment::{FieldName, FieldValue, PredictionOutcome};
use cardiocheck::components::LayoutComponent;
use cardiocheck::config::AppConfig;
use cardiocheck::session::SessionContext;
use ratatui::{backend::TestBackend, Terminal};

fn render(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).unwrap();
    let layout = LayoutComponent::new();

    terminal.draw(|frame| layout.render(frame, state)).unwrap();

    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(ratatui::buffer::Cell::symbol).collect()
}

fn signed_in_state() -> AppState {
    let mut session = SessionContext::new();
    session.establish("tok", None);
    AppState::new(AppConfig::default(), session)
}

fn hospital(name: &str) -> Hospital {
    serde_json::from_value(serde_json::json!({
        "place_id": name,
        "name": name,
        "vicinity": "12 Main Street",
        "rating": 4.2,
        "user_ratings_total": 87,
        "opening_hours": {"open_now": false},
        "geometry": {"location": {"lat": 12.97, "lng": 77.59}}
    }))
    .unwrap()
}

#[test]
fn test_login_view_masks_password() {
    let mut state = AppState::new(AppConfig::default(), SessionContext::new());
    state.login.email = "ada@example.com".to_string();
    state.login.password = "hunter2".to_string();

    let content = render(&state);

    assert!(content.contains("Sign In"));
    assert!(content.contains("ada@example.com"));
    assert!(!content.contains("hunter2"));
    assert!(content.contains("Not signed in"));
}

#[test]
fn test_register_mode_shows_name_fields() {
    let mut state = AppState::new(AppConfig::default(), SessionContext::new());
    state.login.toggle_mode();

    let content = render(&state);

    assert!(content.contains("Create Account"));
    assert!(content.contains("First name"));
    assert!(content.contains("Phone (optional)"));
}

#[test]
fn test_assessment_view_shows_progress_and_fields() {
    let mut state = signed_in_state();
    state
        .assessment
        .set_field_value(FieldName::Age, FieldValue::text("54"))
        .unwrap();

    let content = render(&state);

    assert!(content.contains("Heart Health Assessment"));
    assert!(content.contains("Step 1 of 4"));
    assert!(content.contains("Age"));
    assert!(content.contains("54"));
    assert!(content.contains("Chest Pain Type"));
    assert!(content.contains("Signed in"));
}

#[test]
fn test_notifications_are_drawn() {
    let mut state = signed_in_state();
    state.add_notification(Notification::warning("3 unanswered field(s) sent as 0".to_string()));

    let content = render(&state);

    assert!(content.contains("3 unanswered field(s) sent as 0"));
}

#[test]
fn test_results_view_low_risk() {
    let mut state = signed_in_state();
    state.prediction = Some(PredictionOutcome::new("You are not likely to have heart disease"));
    state.current_view = View::Results;

    let content = render(&state);

    assert!(content.contains("Low Risk Detected"));
    assert!(content.contains("You are not likely to have heart disease"));
    assert!(content.contains("Cardiac Health Resources"));
    assert!(content.contains("--lat/--lng"));
}

#[test]
fn test_results_view_lists_hospitals_on_risk() {
    let mut state = signed_in_state();
    state.prediction = Some(PredictionOutcome::new("You are likely to have heart disease"));
    state.current_view = View::Results;
    state.hospitals.status = HospitalsStatus::Loaded(vec![hospital("City Heart Institute"), hospital("Metro Cardiac")]);

    let content = render(&state);

    assert!(content.contains("Potential Risk Detected"));
    assert!(content.contains("Recommended Cardiac Centers"));
    assert!(content.contains("City Heart Institute"));
    assert!(content.contains("Metro Cardiac"));
}

#[test]
fn test_results_view_reports_lookup_failure() {
    let mut state = signed_in_state();
    state.prediction = Some(PredictionOutcome::new("You are likely to have heart disease"));
    state.current_view = View::Results;
    state.apply_hospitals(Err("timed out".to_string()));

    let content = render(&state);

    assert!(content.contains("Could not load hospitals: timed out"));
}
