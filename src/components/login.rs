// ABOUTME: Sign-in and sign-up screen
// Shows the credential fields for the current mode and the key hints

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::state::{AuthMode, LoginField, LoginForm};

const CORNFLOWER_BLUE: Color = Color::Rgb(100, 149, 237);
const GOLD: Color = Color::Rgb(255, 215, 0);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const SOFT_WHITE: Color = Color::Rgb(220, 220, 230);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const SUBDUED_BORDER: Color = Color::Rgb(60, 60, 80);

pub struct LoginComponent;

impl LoginComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(DARK_BG)), area);

        let fields = form.fields();
        let panel_height = (fields.len() as u16 * 3 + 8).min(area.height);
        let panel_width = 60.min(area.width);
        let panel = Rect {
            x: area.x + (area.width - panel_width) / 2,
            y: area.y + (area.height - panel_height) / 2,
            width: panel_width,
            height: panel_height,
        };

        let title = match form.mode {
            AuthMode::Login => " Sign In ",
            AuthMode::Register => " Create Account ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(CORNFLOWER_BLUE))
            .style(Style::default().bg(PANEL_BG))
            .title(title)
            .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));

        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(2));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints(constraints)
            .split(inner);

        let heading = Paragraph::new(Line::from(vec![
            Span::styled("❤️ ", Style::default()),
            Span::styled("CardioCheck", Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
            Span::styled(" heart health assessment", Style::default().fg(MUTED_GRAY)),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(heading, rows[0]);

        let focused = form.focused_field();
        for (idx, field) in fields.iter().enumerate() {
            self.render_input(frame, rows[idx + 1], form, *field, *field == focused);
        }

        let status = if form.in_flight {
            "⏳ Contacting server..."
        } else {
            ""
        };
        let switch_hint = match form.mode {
            AuthMode::Login => " New here? Create account",
            AuthMode::Register => " Have an account? Sign in",
        };
        let hints = Paragraph::new(vec![
            Line::from(Span::styled(status, Style::default().fg(GOLD))),
            Line::from(vec![
                Span::styled("[Enter]", Style::default().fg(GOLD)),
                Span::styled(" Submit  ", Style::default().fg(MUTED_GRAY)),
                Span::styled("[Tab]", Style::default().fg(GOLD)),
                Span::styled(" Next  ", Style::default().fg(MUTED_GRAY)),
                Span::styled("[F2]", Style::default().fg(GOLD)),
                Span::styled(switch_hint, Style::default().fg(MUTED_GRAY)),
                Span::styled("  [Esc]", Style::default().fg(GOLD)),
                Span::styled(" Quit", Style::default().fg(MUTED_GRAY)),
            ]),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hints, rows[rows.len() - 1]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, form: &LoginForm, field: LoginField, focused: bool) {
        let raw = form.value(field);
        let shown = if field == LoginField::Password {
            "•".repeat(raw.chars().count())
        } else {
            raw.to_string()
        };
        let text = if focused { format!("{}│", shown) } else { shown };

        let input = Paragraph::new(Span::styled(text, Style::default().fg(SOFT_WHITE))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if focused { GOLD } else { SUBDUED_BORDER }))
                .title(format!(" {} ", field.label()))
                .title_style(Style::default().fg(if focused { GOLD } else { MUTED_GRAY })),
        );
        frame.render_widget(input, area);
    }
}

impl Default for LoginComponent {
    fn default() -> Self {
        Self::new()
    }
}
