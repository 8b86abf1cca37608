// ABOUTME: Prediction result screen
// Shows the risk banner with the service message and nearby cardiac centres

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::api::Hospital;
use crate::app::state::HospitalsStatus;
use crate::app::AppState;
use crate::components::assessment::RiskBanner;

const CORNFLOWER_BLUE: Color = Color::Rgb(100, 149, 237);
const GOLD: Color = Color::Rgb(255, 215, 0);
const SELECTION_GREEN: Color = Color::Rgb(100, 200, 100);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const HIGHLIGHT_BG: Color = Color::Rgb(40, 40, 60);
const SOFT_WHITE: Color = Color::Rgb(220, 220, 230);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const SUBDUED_BORDER: Color = Color::Rgb(60, 60, 80);
const ERROR_RED: Color = Color::Rgb(220, 80, 80);

/// Heading and advice under the banner
fn recommendation_text(banner: RiskBanner) -> (&'static str, &'static str) {
    if banner.has_risk() {
        (
            "Recommended Cardiac Centers",
            "⚠️ Please consult a cardiologist within the next 48 hours",
        )
    } else {
        ("Cardiac Health Resources", "✅ Regular checkups help maintain heart health")
    }
}

pub struct ResultsComponent;

impl ResultsComponent {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(DARK_BG)), area);

        let Some(outcome) = &state.prediction else {
            let empty = Paragraph::new("No prediction yet")
                .style(Style::default().fg(MUTED_GRAY))
                .alignment(Alignment::Center);
            frame.render_widget(empty, area);
            return;
        };
        let banner = outcome.banner();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(6), // Banner
                Constraint::Min(6),    // Hospitals
                Constraint::Length(3), // Footer
            ])
            .split(area);

        let color = if banner.has_risk() { ERROR_RED } else { SELECTION_GREEN };
        let banner_widget = Paragraph::new(vec![
            Line::from(Span::styled(banner.title(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(Span::styled(outcome.message.as_str(), Style::default().fg(SOFT_WHITE))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(PANEL_BG)),
        );
        frame.render_widget(banner_widget, layout[0]);

        self.render_hospitals(frame, layout[1], state, banner);
        self.render_footer(frame, layout[2]);
    }

    fn render_hospitals(&self, frame: &mut Frame, area: Rect, state: &AppState, banner: RiskBanner) {
        let (heading, advice) = recommendation_text(banner);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(CORNFLOWER_BLUE))
            .style(Style::default().bg(PANEL_BG))
            .title(format!(" {} ", heading))
            .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {}", advice), Style::default().fg(SOFT_WHITE))),
            rows[0],
        );

        let message = match &state.hospitals.status {
            HospitalsStatus::Unavailable => {
                Some("Set [location] in config.toml or pass --lat/--lng to see nearby cardiac centres".to_string())
            }
            HospitalsStatus::Loading => Some("⏳ Finding nearby cardiac centres...".to_string()),
            HospitalsStatus::Failed(e) => Some(format!("Could not load hospitals: {}", e)),
            HospitalsStatus::Loaded(hospitals) if hospitals.is_empty() => {
                Some("No cardiac centres found nearby".to_string())
            }
            HospitalsStatus::Loaded(_) => None,
        };

        if let Some(message) = message {
            let text = Paragraph::new(Span::styled(message, Style::default().fg(MUTED_GRAY)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(text, rows[1]);
            return;
        }

        let items: Vec<ListItem> = state
            .hospitals
            .hospitals()
            .iter()
            .enumerate()
            .map(|(idx, hospital)| hospital_item(hospital, idx == state.hospitals.selected))
            .collect();
        frame.render_widget(List::new(items), rows[1]);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(SUBDUED_BORDER));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let keys = [("↑/↓", "Select"), ("c", "Copy directions"), ("n", "New assessment"), ("Esc", "Quit")];
        let mut spans = Vec::new();
        for (idx, (key, label)) in keys.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled("  |  ", Style::default().fg(SUBDUED_BORDER)));
            }
            spans.push(Span::styled(format!("[{}]", key), Style::default().fg(GOLD)));
            spans.push(Span::styled(format!(" {}", label), Style::default().fg(MUTED_GRAY)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), inner);
    }
}

impl Default for ResultsComponent {
    fn default() -> Self {
        Self::new()
    }
}

fn hospital_item(hospital: &Hospital, selected: bool) -> ListItem<'static> {
    let marker = if selected { "▶ " } else { "  " };
    let name_style = if selected {
        Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD)
    };

    let mut details = vec![Span::raw("    ")];
    if let Some(rating) = hospital.rating {
        details.push(Span::styled(format!("★ {:.1}", rating), Style::default().fg(GOLD)));
        if let Some(total) = hospital.user_ratings_total {
            details.push(Span::styled(format!(" ({} reviews)", total), Style::default().fg(MUTED_GRAY)));
        }
        details.push(Span::raw("  "));
    }
    match hospital.is_open_now() {
        Some(true) => details.push(Span::styled("Open now", Style::default().fg(SELECTION_GREEN))),
        Some(false) => details.push(Span::styled("Closed", Style::default().fg(ERROR_RED))),
        None => {}
    }

    let mut lines = vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(GOLD)),
            Span::styled(hospital.name.clone(), name_style),
        ]),
        Line::from(Span::styled(format!("    {}", hospital.vicinity), Style::default().fg(MUTED_GRAY))),
        Line::from(details),
    ];
    if selected {
        lines.push(Line::from(Span::styled(
            format!("    {}", hospital.directions_url()),
            Style::default().fg(CORNFLOWER_BLUE),
        )));
    }

    let item = ListItem::new(lines);
    if selected {
        item.style(Style::default().bg(HIGHLIGHT_BG))
    } else {
        item
    }
}
