// ABOUTME: Unit tests for event handling to ensure keyboard inputs drive the wizard correctly

use cardiocheck::api::CardioApiClient;
use cardiocheck::app::{state::AsyncAction, App, AppEvent, AppState, EventHandler, View};
use cardiocheck::components::assessment::{FieldName, FieldValue, PredictionOutcome};
use cardiocheck::config::AppConfig;
use cardiocheck::session::SessionContext;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const fn create_key_event(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

const fn create_key_event_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn signed_in_state() -> AppState {
    let mut session = SessionContext::new();
    session.establish("tok", None);
    AppState::new(AppConfig::default(), session)
}

/// Feed keys through the handler the way the TUI loop does
fn press(state: &mut AppState, codes: &[KeyCode]) {
    for code in codes {
        if let Some(event) = EventHandler::handle_key_event(create_key_event(*code), state) {
            EventHandler::process_event(event, state);
        }
    }
}

fn type_text(state: &mut AppState, text: &str) {
    let codes: Vec<KeyCode> = text.chars().map(KeyCode::Char).collect();
    press(state, &codes);
}

#[test]
fn test_quit_key_events() {
    let mut state = signed_in_state();

    let esc = EventHandler::handle_key_event(create_key_event(KeyCode::Esc), &mut state);
    assert_eq!(esc, Some(AppEvent::Quit));

    let ctrl_c = EventHandler::handle_key_event(
        create_key_event_with_modifiers(KeyCode::Char('c'), KeyModifiers::CONTROL),
        &mut state,
    );
    assert_eq!(ctrl_c, Some(AppEvent::Quit));

    EventHandler::process_event(AppEvent::Quit, &mut state);
    assert!(state.should_quit);
}

#[test]
fn test_q_is_text_in_login_form() {
    let mut state = AppState::new(AppConfig::default(), SessionContext::new());
    assert_eq!(state.current_view, View::Login);

    type_text(&mut state, "quinn@example.com");

    assert!(!state.should_quit);
    assert_eq!(state.login.email, "quinn@example.com");
}

#[test]
fn test_login_submit_queues_request() {
    let mut state = AppState::new(AppConfig::default(), SessionContext::new());

    type_text(&mut state, "ada@example.com");
    press(&mut state, &[KeyCode::Tab]);
    type_text(&mut state, "secret");
    press(&mut state, &[KeyCode::Enter]);

    match &state.pending_async_action {
        Some(AsyncAction::Login { email, password }) => {
            assert_eq!(email, "ada@example.com");
            assert_eq!(password, "secret");
        }
        other => panic!("expected login action, got {other:?}"),
    }
    assert!(state.login.in_flight);
}

#[test]
fn test_logout_shortcut_requires_session() {
    let mut anonymous = AppState::new(AppConfig::default(), SessionContext::new());
    let ctrl_l = create_key_event_with_modifiers(KeyCode::Char('l'), KeyModifiers::CONTROL);
    assert_ne!(EventHandler::handle_key_event(ctrl_l, &mut anonymous), Some(AppEvent::Logout));

    let mut state = signed_in_state();
    assert_eq!(EventHandler::handle_key_event(ctrl_l, &mut state), Some(AppEvent::Logout));
}

#[test]
fn test_typing_fills_focused_numeric_field() {
    let mut state = signed_in_state();

    type_text(&mut state, "5a4");
    assert_eq!(state.assessment.value(FieldName::Age), &FieldValue::text("54"));

    press(&mut state, &[KeyCode::Backspace]);
    assert_eq!(state.assessment.value(FieldName::Age), &FieldValue::text("5"));

    press(&mut state, &[KeyCode::Delete]);
    assert_eq!(state.assessment.value(FieldName::Age), &FieldValue::Unset);
}

#[test]
fn test_digit_picks_choice_option() {
    let mut state = signed_in_state();

    // Sex: options are listed from code 0
    press(&mut state, &[KeyCode::Tab, KeyCode::Char('3')]);
    assert_eq!(state.assessment.value(FieldName::Sex), &FieldValue::Code(2));

    // Chest pain: options are listed from code 1
    press(&mut state, &[KeyCode::Tab, KeyCode::Char('4')]);
    assert_eq!(state.assessment.value(FieldName::Cp), &FieldValue::Code(4));

    // Out-of-range digits are ignored
    press(&mut state, &[KeyCode::Char('9')]);
    assert_eq!(state.assessment.value(FieldName::Cp), &FieldValue::Code(4));
}

#[test]
fn test_highlight_and_space_select_option() {
    let mut state = signed_in_state();

    press(&mut state, &[KeyCode::Tab, KeyCode::Right, KeyCode::Char(' ')]);

    assert_eq!(state.assessment.value(FieldName::Sex), &FieldValue::Code(1));
}

#[test]
fn test_quick_fill_applies_suggestion() {
    let mut state = signed_in_state();

    press(&mut state, &[KeyCode::Right, KeyCode::Char(' ')]);

    assert_eq!(state.assessment.value(FieldName::Age), &FieldValue::text("45"));
}

#[test]
fn test_enter_walks_steps_and_page_up_goes_back() {
    let mut state = signed_in_state();
    type_text(&mut state, "61");

    press(&mut state, &[KeyCode::Enter, KeyCode::Enter]);
    assert_eq!(state.assessment.current_step(), 2);

    press(&mut state, &[KeyCode::PageUp, KeyCode::PageUp]);
    assert_eq!(state.assessment.current_step(), 0);
    assert_eq!(state.assessment.value(FieldName::Age), &FieldValue::text("61"));

    // Already on the first step
    press(&mut state, &[KeyCode::PageUp]);
    assert_eq!(state.assessment.current_step(), 0);
}

#[test]
fn test_enter_on_final_step_submits_once() {
    let mut state = signed_in_state();
    press(&mut state, &[KeyCode::PageDown, KeyCode::PageDown, KeyCode::PageDown]);
    assert!(state.assessment.is_final_step());

    press(&mut state, &[KeyCode::Enter]);
    assert!(state.assessment.is_submitting());
    assert!(matches!(state.pending_async_action, Some(AsyncAction::SubmitPrediction(_))));

    // Only Esc is honoured while the prediction is pending
    let again = EventHandler::handle_key_event(create_key_event(KeyCode::Enter), &mut state);
    assert_eq!(again, None);
    let back = EventHandler::handle_key_event(create_key_event(KeyCode::PageUp), &mut state);
    assert_eq!(back, None);
}

#[test]
fn test_help_toggle() {
    let mut state = signed_in_state();
    assert!(!state.focus.show_help);

    press(&mut state, &[KeyCode::Char('?')]);
    assert!(state.focus.show_help);

    press(&mut state, &[KeyCode::F(1)]);
    assert!(!state.focus.show_help);
}

#[test]
fn test_results_keys() {
    let mut state = signed_in_state();
    state.prediction = Some(PredictionOutcome::new("You are not likely to have heart disease"));
    state.current_view = View::Results;

    let quit = EventHandler::handle_key_event(create_key_event(KeyCode::Char('q')), &mut state);
    assert_eq!(quit, Some(AppEvent::Quit));

    press(&mut state, &[KeyCode::Char('n')]);
    assert_eq!(state.current_view, View::Assessment);
    assert!(state.prediction.is_none());
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let config = AppConfig::default();
    let mut session = SessionContext::new();
    session.establish("tok", None);
    let client = CardioApiClient::new(&config).unwrap();
    let mut app = App::new(config, session, client, None);

    type_text(&mut app.state, "50");
    let ctrl_l = create_key_event_with_modifiers(KeyCode::Char('l'), KeyModifiers::CONTROL);
    if let Some(event) = EventHandler::handle_key_event(ctrl_l, &mut app.state) {
        EventHandler::process_event(event, &mut app.state);
    }
    app.tick().await.unwrap();

    assert_eq!(app.state.current_view, View::Login);
    assert!(!app.state.session.is_authenticated());
    assert_eq!(app.state.assessment.value(FieldName::Age), &FieldValue::Unset);
}
