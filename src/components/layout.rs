// ABOUTME: Top-level layout that routes rendering to the active view
// Draws login, assessment or results, then the status bar and notification toasts on top

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{AssessmentComponent, LoginComponent, ResultsComponent};
use crate::app::{state::NotificationType, AppState, View};

const CORNFLOWER_BLUE: Color = Color::Rgb(100, 149, 237);
const SELECTION_GREEN: Color = Color::Rgb(100, 200, 100);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const ERROR_RED: Color = Color::Rgb(230, 100, 100);
const WARNING_ORANGE: Color = Color::Rgb(255, 165, 0);

const NOTIFICATION_WIDTH: u16 = 50;

pub struct LayoutComponent {
    login: LoginComponent,
    assessment: AssessmentComponent,
    results: ResultsComponent,
}

impl LayoutComponent {
    pub fn new() -> Self {
        Self {
            login: LoginComponent::new(),
            assessment: AssessmentComponent::new(),
            results: ResultsComponent::new(),
        }
    }

    pub fn render(&self, frame: &mut Frame, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.size());

        match state.current_view {
            View::Login => self.login.render(frame, chunks[0], &state.login),
            View::Assessment => self.assessment.render(frame, chunks[0], &state.assessment, &state.focus),
            View::Results => self.results.render(frame, chunks[0], state),
        }

        self.render_status_bar(frame, chunks[1], state);
        self.render_notifications(frame, chunks[0], state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let who = match (state.session.is_authenticated(), state.session.user()) {
            (true, Some(user)) => format!("Signed in as {}", user.display_name()),
            (true, None) => "Signed in".to_string(),
            (false, _) => "Not signed in".to_string(),
        };

        let mut spans = vec![
            Span::styled(" ❤ CardioCheck ", Style::default().fg(CORNFLOWER_BLUE).add_modifier(Modifier::BOLD)),
            Span::styled(format!("│ {} ", who), Style::default().fg(MUTED_GRAY)),
            Span::styled(format!("│ {} ", state.config.api.base_url), Style::default().fg(MUTED_GRAY)),
        ];
        if state.session.is_authenticated() {
            spans.push(Span::styled("│ Ctrl+L Log out ", Style::default().fg(MUTED_GRAY)));
        }

        let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(DARK_BG));
        frame.render_widget(bar, area);
    }

    /// Toasts stacked in the top-right corner, newest last
    fn render_notifications(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let notifications: Vec<_> = state.notifications.iter().filter(|n| !n.is_expired()).collect();
        if notifications.is_empty() {
            return;
        }

        let width = NOTIFICATION_WIDTH.min(area.width);
        for (i, notification) in notifications.iter().enumerate() {
            let y = area.y + 1 + i as u16 * 3;
            if y + 3 > area.y + area.height {
                break;
            }

            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(width + 2),
                y,
                width,
                height: 3,
            };

            let (icon, color) = match notification.notification_type {
                NotificationType::Success => ("✓ ", SELECTION_GREEN),
                NotificationType::Error => ("✗ ", ERROR_RED),
                NotificationType::Warning => ("⚠ ", WARNING_ORANGE),
                NotificationType::Info => ("ℹ ", CORNFLOWER_BLUE),
            };

            let line = Line::from(vec![
                Span::styled(icon, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(notification.message.as_str(), Style::default().fg(color)),
            ]);

            let toast = Paragraph::new(line)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(color))
                        .style(Style::default().bg(PANEL_BG)),
                )
                .wrap(Wrap { trim: true });

            frame.render_widget(Clear, toast_area);
            frame.render_widget(toast, toast_area);
        }
    }
}

impl Default for LayoutComponent {
    fn default() -> Self {
        Self::new()
    }
}
