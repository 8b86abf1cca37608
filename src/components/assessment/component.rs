// ABOUTME: Assessment wizard component
// Renders the progress header, the fields of the current step, and the navigation footer

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::fields::STEP_TITLES;
use super::renderer::{FieldFocus, FieldRenderer};
use super::state::{AssessmentFocus, StepFormController};

const CORNFLOWER_BLUE: Color = Color::Rgb(100, 149, 237);
const GOLD: Color = Color::Rgb(255, 215, 0);
const SELECTION_GREEN: Color = Color::Rgb(100, 200, 100);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const SOFT_WHITE: Color = Color::Rgb(220, 220, 230);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const SUBDUED_BORDER: Color = Color::Rgb(60, 60, 80);
const WARNING_YELLOW: Color = Color::Rgb(220, 180, 80);

const HELP_TEXT: &str = "Please provide accurate medical information for the best prediction results. \
All data is securely processed and never stored.";

/// The heart health assessment wizard
pub struct AssessmentComponent;

impl AssessmentComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        controller: &StepFormController,
        focus: &AssessmentFocus,
    ) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(DARK_BG)), area);

        let unanswered = controller.unanswered_fields().len();
        let show_notice = controller.is_final_step() && unanswered > 0;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),                        // Header with progress
                Constraint::Min(8),                           // Fields
                Constraint::Length(u16::from(show_notice)),   // Unanswered notice
                Constraint::Length(3),                        // Navigation footer
            ])
            .split(area);

        self.render_header(frame, layout[0], controller);

        if focus.show_help {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(layout[1]);
            self.render_fields(frame, columns[0], controller, focus);
            self.render_help(frame, columns[1]);
        } else {
            self.render_fields(frame, layout[1], controller, focus);
        }

        if show_notice {
            let notice = Paragraph::new(Line::from(vec![
                Span::styled("  ⚠ ", Style::default().fg(WARNING_YELLOW)),
                Span::styled(
                    format!("{} unanswered field(s) will be sent as 0", unanswered),
                    Style::default().fg(WARNING_YELLOW),
                ),
            ]));
            frame.render_widget(notice, layout[2]);
        }

        self.render_navigation(frame, layout[3], controller);

        if controller.is_submitting() {
            self.render_submitting(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, controller: &StepFormController) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(CORNFLOWER_BLUE))
            .style(Style::default().bg(PANEL_BG));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header_layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("❤️ ", Style::default()),
            Span::styled(
                "Heart Health Assessment",
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {} Step {} of {}",
                    controller.direction().arrow(),
                    controller.current_step() + 1,
                    controller.step_count()
                ),
                Style::default().fg(MUTED_GRAY),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, header_layout[0]);

        self.render_progress(frame, header_layout[1], controller);
    }

    /// Step progress dots
    fn render_progress(&self, frame: &mut Frame, area: Rect, controller: &StepFormController) {
        let current = controller.current_step();
        let mut spans = vec![Span::styled("  ", Style::default())];

        for (idx, title) in STEP_TITLES.iter().enumerate() {
            let (icon, style) = if idx < current {
                ("●", Style::default().fg(SELECTION_GREEN))
            } else if idx == current {
                ("◉", Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
            } else {
                ("○", Style::default().fg(MUTED_GRAY))
            };

            spans.push(Span::styled(icon, style));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                *title,
                if idx == current {
                    Style::default().fg(SOFT_WHITE)
                } else {
                    Style::default().fg(MUTED_GRAY)
                },
            ));

            if idx < STEP_TITLES.len() - 1 {
                spans.push(Span::styled(" → ", Style::default().fg(SUBDUED_BORDER)));
            }
        }

        let progress = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(progress, area);
    }

    fn render_fields(
        &self,
        frame: &mut Frame,
        area: Rect,
        controller: &StepFormController,
        focus: &AssessmentFocus,
    ) {
        let fields = controller.current_fields();
        let views: Vec<_> = fields
            .iter()
            .map(|field| FieldRenderer::view(field.definition(), controller.value(*field)))
            .collect();

        let mut constraints: Vec<Constraint> = views
            .iter()
            .map(|view| Constraint::Length(FieldRenderer::height(view)))
            .collect();
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints(constraints)
            .split(area);

        for (idx, view) in views.iter().enumerate() {
            let focused = idx == focus.field_index && !controller.is_submitting();
            let field_focus = FieldFocus {
                focused,
                highlight: focused.then_some(focus.highlight),
                show_cursor: focus.show_cursor,
            };
            FieldRenderer::render(frame, rows[idx], view, field_focus);
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(CORNFLOWER_BLUE))
            .style(Style::default().bg(PANEL_BG))
            .title(" Need Help? ")
            .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));

        let keys = [
            ("Tab/↓", "Next field"),
            ("⇧Tab/↑", "Previous field"),
            ("←/→", "Move highlight"),
            ("Space", "Select option / quick fill"),
            ("0-9 . -", "Type a number"),
            ("PgUp/PgDn", "Previous / next step"),
        ];

        let mut lines = vec![
            Line::from(Span::styled(HELP_TEXT, Style::default().fg(SOFT_WHITE))),
            Line::from(""),
        ];
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>10} ", key), Style::default().fg(GOLD)),
                Span::styled(action, Style::default().fg(MUTED_GRAY)),
            ]));
        }

        let help = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(help, area);
    }

    fn render_navigation(&self, frame: &mut Frame, area: Rect, controller: &StepFormController) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(SUBDUED_BORDER))
            .style(Style::default().bg(DARK_BG));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let key_style = |enabled: bool| {
            if enabled {
                Style::default().fg(GOLD)
            } else {
                Style::default().fg(MUTED_GRAY)
            }
        };
        let label_style = |enabled: bool| {
            if enabled {
                Style::default().fg(SOFT_WHITE)
            } else {
                Style::default().fg(SUBDUED_BORDER)
            }
        };

        let can_go_back = controller.can_go_back();
        let can_advance = !controller.is_submitting();
        let advance_text = if controller.is_submitting() {
            "Analyzing..."
        } else if controller.is_final_step() {
            "Get Prediction"
        } else {
            "Next"
        };

        let spans = vec![
            Span::styled("  [", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("PgUp", key_style(can_go_back)),
            Span::styled("]", Style::default().fg(SUBDUED_BORDER)),
            Span::styled(" Previous", label_style(can_go_back)),
            Span::styled("  |  ", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("[", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("Enter", key_style(can_advance)),
            Span::styled("]", Style::default().fg(SUBDUED_BORDER)),
            Span::styled(format!(" {}", advance_text), label_style(can_advance)),
            Span::styled("  |  ", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("[", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("?", Style::default().fg(GOLD)),
            Span::styled("]", Style::default().fg(SUBDUED_BORDER)),
            Span::styled(" Help", Style::default().fg(MUTED_GRAY)),
            Span::styled("  |  ", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("[", Style::default().fg(SUBDUED_BORDER)),
            Span::styled("Esc", Style::default().fg(GOLD)),
            Span::styled("]", Style::default().fg(SUBDUED_BORDER)),
            Span::styled(" Quit", Style::default().fg(MUTED_GRAY)),
        ];

        let nav = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(nav, inner);
    }

    fn render_submitting(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(44, 5, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(GOLD))
            .style(Style::default().bg(PANEL_BG));

        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "⏳ Analyzing your heart health data...",
                Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(text, popup);
    }
}

impl Default for AssessmentComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-size rectangle centered in `area`, clamped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::assessment::fields::FieldName;
    use crate::components::assessment::state::FieldValue;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(controller: &StepFormController, focus: &AssessmentFocus) -> String {
        let backend = TestBackend::new(110, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| AssessmentComponent::new().render(f, f.size(), controller, focus))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_first_step_renders_basics() {
        let controller = StepFormController::new();
        let text = render_to_string(&controller, &AssessmentFocus::new());

        assert!(text.contains("Heart Health Assessment"));
        assert!(text.contains("Step 1 of 4"));
        assert!(text.contains("Biological Sex"));
        assert!(text.contains("Chest Pain Type"));
        assert!(!text.contains("Cholesterol Level"));
        assert!(text.contains("Next"));
    }

    #[test]
    fn test_final_step_offers_prediction_and_notice() {
        let mut controller = StepFormController::new();
        for _ in 0..3 {
            controller.next_step().unwrap();
        }
        controller.set_field_value(FieldName::Thal, FieldValue::Code(1)).unwrap();

        let text = render_to_string(&controller, &AssessmentFocus::new());
        assert!(text.contains("Get Prediction"));
        assert!(text.contains("12 unanswered field(s)"));
        assert!(text.contains("Thalassemia"));
    }

    #[test]
    fn test_help_panel_toggle() {
        let controller = StepFormController::new();
        let mut focus = AssessmentFocus::new();
        focus.toggle_help();

        let text = render_to_string(&controller, &focus);
        assert!(text.contains("Need Help?"));
    }

    #[test]
    fn test_submitting_overlay() {
        let mut controller = StepFormController::new();
        for _ in 0..3 {
            controller.next_step().unwrap();
        }
        controller.begin_submit().unwrap();

        let text = render_to_string(&controller, &AssessmentFocus::new());
        assert!(text.contains("Analyzing your heart health data"));
    }
}
