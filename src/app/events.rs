// ABOUTME: Event handling system for keyboard input and app actions
// Maps key presses to AppEvents per view and applies them to AppState

use crate::app::{
    state::{read_clipboard, View},
    AppState,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    Logout,
    // Login view
    LoginInputChar(char),
    LoginPaste,
    LoginBackspace,
    LoginNextField,
    LoginPreviousField,
    LoginToggleMode,
    LoginSubmit,
    // Assessment view
    NextField,
    PreviousField,
    HighlightNext,
    HighlightPrevious,
    ApplyHighlight,
    FieldInputChar(char),
    FieldBackspace,
    ClearField,
    Advance,
    PreviousStep,
    NextStep,
    ToggleHelp,
    // Results view
    NextHospital,
    PreviousHospital,
    CopyDirections,
    NewAssessment,
}

pub struct EventHandler;

impl EventHandler {
    pub fn handle_key_event(key_event: KeyEvent, state: &mut AppState) -> Option<AppEvent> {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

        // Global shortcuts
        if ctrl {
            match key_event.code {
                KeyCode::Char('c') | KeyCode::Char('q') => return Some(AppEvent::Quit),
                KeyCode::Char('l') if state.session.is_authenticated() => return Some(AppEvent::Logout),
                _ => {}
            }
        }

        match state.current_view {
            View::Login => Self::handle_login_keys(key_event, ctrl),
            View::Assessment => Self::handle_assessment_keys(key_event, state),
            View::Results => Self::handle_results_keys(key_event),
        }
    }

    fn handle_login_keys(key_event: KeyEvent, ctrl: bool) -> Option<AppEvent> {
        match key_event.code {
            KeyCode::Esc => Some(AppEvent::Quit),
            KeyCode::Enter => Some(AppEvent::LoginSubmit),
            KeyCode::Tab | KeyCode::Down => Some(AppEvent::LoginNextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppEvent::LoginPreviousField),
            KeyCode::F(2) => Some(AppEvent::LoginToggleMode),
            KeyCode::Backspace => Some(AppEvent::LoginBackspace),
            KeyCode::Char('v') if ctrl => Some(AppEvent::LoginPaste),
            KeyCode::Char('r') if ctrl => Some(AppEvent::LoginToggleMode),
            KeyCode::Char(c) if !ctrl => Some(AppEvent::LoginInputChar(c)),
            _ => None,
        }
    }

    fn handle_assessment_keys(key_event: KeyEvent, state: &AppState) -> Option<AppEvent> {
        // Only quitting is possible while a prediction is pending
        if state.assessment.is_submitting() {
            return match key_event.code {
                KeyCode::Esc => Some(AppEvent::Quit),
                _ => None,
            };
        }

        match key_event.code {
            KeyCode::Esc => Some(AppEvent::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => Some(AppEvent::ToggleHelp),
            KeyCode::Tab | KeyCode::Down => Some(AppEvent::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppEvent::PreviousField),
            KeyCode::Right => Some(AppEvent::HighlightNext),
            KeyCode::Left => Some(AppEvent::HighlightPrevious),
            KeyCode::Char(' ') => Some(AppEvent::ApplyHighlight),
            KeyCode::Enter => Some(AppEvent::Advance),
            KeyCode::PageUp => Some(AppEvent::PreviousStep),
            KeyCode::PageDown => Some(AppEvent::NextStep),
            KeyCode::Backspace => Some(AppEvent::FieldBackspace),
            KeyCode::Delete => Some(AppEvent::ClearField),
            KeyCode::Char(c) => Some(AppEvent::FieldInputChar(c)),
            _ => None,
        }
    }

    fn handle_results_keys(key_event: KeyEvent) -> Option<AppEvent> {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(AppEvent::Quit),
            KeyCode::Down | KeyCode::Char('j') => Some(AppEvent::NextHospital),
            KeyCode::Up | KeyCode::Char('k') => Some(AppEvent::PreviousHospital),
            KeyCode::Char('c') => Some(AppEvent::CopyDirections),
            KeyCode::Char('n') | KeyCode::Enter => Some(AppEvent::NewAssessment),
            _ => None,
        }
    }

    pub fn process_event(event: AppEvent, state: &mut AppState) {
        debug!("Processing event {:?}", event);
        match event {
            AppEvent::Quit => {
                info!("Quit requested");
                state.quit();
            }
            AppEvent::Logout => state.request_logout(),
            AppEvent::LoginInputChar(c) => state.login.input_char(c),
            AppEvent::LoginPaste => match read_clipboard() {
                Ok(text) => state.login.input_str(&text),
                Err(e) => debug!("Paste unavailable: {}", e),
            },
            AppEvent::LoginBackspace => state.login.backspace(),
            AppEvent::LoginNextField => state.login.next_field(),
            AppEvent::LoginPreviousField => state.login.previous_field(),
            AppEvent::LoginToggleMode => state.login.toggle_mode(),
            AppEvent::LoginSubmit => state.submit_login(),
            AppEvent::NextField => state.focus_next_field(),
            AppEvent::PreviousField => state.focus_previous_field(),
            AppEvent::HighlightNext => state.highlight_next(),
            AppEvent::HighlightPrevious => state.highlight_previous(),
            AppEvent::ApplyHighlight => state.apply_highlight(),
            AppEvent::FieldInputChar(c) => state.input_char(c),
            AppEvent::FieldBackspace => state.backspace(),
            AppEvent::ClearField => state.clear_field(),
            AppEvent::Advance => state.advance(),
            AppEvent::PreviousStep => state.previous_step(),
            AppEvent::NextStep => state.next_step(),
            AppEvent::ToggleHelp => state.focus.toggle_help(),
            AppEvent::NextHospital => state.hospitals.select_next(),
            AppEvent::PreviousHospital => state.hospitals.select_previous(),
            AppEvent::CopyDirections => state.copy_directions(),
            AppEvent::NewAssessment => state.start_new_assessment(),
        }
    }
}
