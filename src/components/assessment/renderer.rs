// ABOUTME: Field renderer for the assessment wizard
// Maps a field definition and its current value to an input affordance, and relays edits

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use super::fields::FieldDefinition;
use super::state::FieldValue;

const CORNFLOWER_BLUE: Color = Color::Rgb(100, 149, 237);
const GOLD: Color = Color::Rgb(255, 215, 0);
const SELECTION_GREEN: Color = Color::Rgb(100, 200, 100);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const HIGHLIGHT_BG: Color = Color::Rgb(40, 40, 60);
const SOFT_WHITE: Color = Color::Rgb(220, 220, 230);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const SUBDUED_BORDER: Color = Color::Rgb(60, 60, 80);

/// One option of a choice field as presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub code: u8,
    pub label: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

/// Presentation of a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView {
    Numeric {
        label: &'static str,
        unit: Option<&'static str>,
        help: Option<&'static str>,
        text: String,
        suggestions: Vec<String>,
    },
    Choice {
        label: &'static str,
        options: Vec<OptionView>,
    },
}

impl FieldView {
    /// Number of selectable items (options or quick-fill shortcuts)
    pub fn item_count(&self) -> usize {
        match self {
            Self::Numeric { suggestions, .. } => suggestions.len(),
            Self::Choice { options, .. } => options.len(),
        }
    }

    pub fn selected_option(&self) -> Option<&OptionView> {
        match self {
            Self::Choice { options, .. } => options.iter().find(|o| o.selected),
            Self::Numeric { .. } => None,
        }
    }
}

/// Focus information supplied by the wizard when drawing a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFocus {
    pub focused: bool,
    /// Highlighted option or quick-fill index
    pub highlight: Option<usize>,
    pub show_cursor: bool,
}

/// Stateless renderer for assessment fields
pub struct FieldRenderer;

impl FieldRenderer {
    pub fn view(definition: &FieldDefinition, value: &FieldValue) -> FieldView {
        match definition {
            FieldDefinition::Choice { label, options } => FieldView::Choice {
                label: *label,
                options: options
                    .iter()
                    .map(|option| OptionView {
                        code: option.code,
                        label: option.label,
                        description: option.description,
                        selected: value.code() == Some(option.code),
                    })
                    .collect(),
            },
            FieldDefinition::Numeric {
                label,
                unit,
                help,
                suggestions,
            } => FieldView::Numeric {
                label: *label,
                unit: *unit,
                help: *help,
                text: value.as_text().to_string(),
                suggestions: suggestions.iter().map(|s| Self::format_number(*s)).collect(),
            },
        }
    }

    /// Value produced by picking option `index` of a choice field
    pub fn select_option(definition: &FieldDefinition, index: usize) -> Option<FieldValue> {
        definition
            .options()
            .get(index)
            .map(|option| FieldValue::Code(option.code))
    }

    /// Value produced by a quick-fill shortcut; same as typing the number
    pub fn quick_fill(definition: &FieldDefinition, index: usize) -> Option<FieldValue> {
        definition
            .suggestions()
            .get(index)
            .map(|s| FieldValue::Text(Self::format_number(*s)))
    }

    /// Shortest text for a suggestion: `45`, `2.5`
    pub fn format_number(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{:.0}", value)
        } else {
            value.to_string()
        }
    }

    /// Rows needed to draw `view`
    pub fn height(view: &FieldView) -> u16 {
        let body = match view {
            FieldView::Choice { options, .. } => options.len() as u16,
            FieldView::Numeric { help, .. } => 2 + u16::from(help.is_some()),
        };
        body + 2
    }

    pub fn render(frame: &mut Frame, area: Rect, view: &FieldView, focus: FieldFocus) {
        let border_color = if focus.focused { GOLD } else { SUBDUED_BORDER };

        let title = match view {
            FieldView::Numeric {
                label,
                unit: Some(unit),
                ..
            } => format!(" {} ({}) ", label, unit),
            FieldView::Numeric { label, .. } | FieldView::Choice { label, .. } => {
                format!(" {} ", label)
            }
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(PANEL_BG))
            .title(title)
            .title_style(if focus.focused {
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(SOFT_WHITE)
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match view {
            FieldView::Choice { options, .. } => Self::choice_lines(options, focus),
            FieldView::Numeric {
                label,
                help,
                text,
                suggestions,
                ..
            } => Self::numeric_lines(label, *help, text, suggestions, focus),
        };

        let body = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(body, inner);
    }

    fn choice_lines(options: &[OptionView], focus: FieldFocus) -> Vec<Line<'static>> {
        options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let highlighted = focus.focused && focus.highlight == Some(idx);

                let (icon, icon_color) = if option.selected {
                    ("◉", SELECTION_GREEN)
                } else {
                    ("○", MUTED_GRAY)
                };

                let label_style = if highlighted {
                    Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
                } else if option.selected {
                    Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(SOFT_WHITE)
                };

                let mut spans = vec![
                    Span::styled(if highlighted { "▶ " } else { "  " }, Style::default().fg(GOLD)),
                    Span::styled(icon, Style::default().fg(icon_color)),
                    Span::raw(" "),
                    Span::styled(option.label, label_style),
                    Span::styled(format!("  {}", option.description), Style::default().fg(MUTED_GRAY)),
                ];
                if option.selected {
                    spans.push(Span::styled("  ✓ Selected", Style::default().fg(SELECTION_GREEN)));
                }

                if highlighted {
                    for span in &mut spans {
                        span.style = span.style.bg(HIGHLIGHT_BG);
                    }
                }
                Line::from(spans)
            })
            .collect()
    }

    fn numeric_lines(
        label: &str,
        help: Option<&'static str>,
        text: &str,
        suggestions: &[String],
        focus: FieldFocus,
    ) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let input = if text.is_empty() && !focus.focused {
            Span::styled(format!("Enter {}", label), Style::default().fg(MUTED_GRAY))
        } else if focus.focused && focus.show_cursor {
            Span::styled(format!("{}│", text), Style::default().fg(SOFT_WHITE))
        } else {
            Span::styled(text.to_string(), Style::default().fg(SOFT_WHITE))
        };
        let mut input_spans = vec![
            Span::styled("  ", Style::default()),
            Span::styled("› ", Style::default().fg(CORNFLOWER_BLUE)),
            input,
        ];
        for span in &mut input_spans {
            span.style = span.style.bg(DARK_BG);
        }
        lines.push(Line::from(input_spans));

        let mut shortcut_spans = vec![Span::styled("  Quick fill: ", Style::default().fg(MUTED_GRAY))];
        for (idx, suggestion) in suggestions.iter().enumerate() {
            let highlighted = focus.focused && focus.highlight == Some(idx);
            let style = if highlighted {
                Style::default().fg(DARK_BG).bg(GOLD).add_modifier(Modifier::BOLD)
            } else if suggestion == text {
                Style::default().fg(SELECTION_GREEN)
            } else {
                Style::default().fg(SOFT_WHITE)
            };
            shortcut_spans.push(Span::styled(format!("[{}]", suggestion), style));
            shortcut_spans.push(Span::raw(" "));
        }
        lines.push(Line::from(shortcut_spans));

        if let Some(help) = help {
            lines.push(Line::from(Span::styled(
                format!("  {}", help),
                Style::default().fg(MUTED_GRAY),
            )));
        }

        lines
    }
}
