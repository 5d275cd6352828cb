//! Welcome screen.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::BackendStatus;
use crate::tui::styles::{CareTheme, LOGO};

use super::render_footer;

const HIGHLIGHTS: [(&str, &str); 3] = [
    (
        "Accurate Predictions",
        "Random Forest ML model trained on 10,000+ facilities",
    ),
    (
        "AI Recommendations",
        "Dynamic insights based on your facility's data",
    ),
    (
        "Risk Drivers",
        "Identify top factors contributing to enforcement risk",
    ),
];

pub fn render_welcome(f: &mut Frame, area: Rect, backend: BackendStatus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Logo
            Constraint::Length(3), // Subtitle
            Constraint::Length(6), // Highlights
            Constraint::Length(3), // Backend status
            Constraint::Min(0),
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let logo = Paragraph::new(
        LOGO.lines()
            .map(|l| Line::from(Span::styled(l, CareTheme::subtitle())))
            .collect::<Vec<_>>(),
    )
    .alignment(Alignment::Center);
    f.render_widget(logo, chunks[0]);

    let subtitle = Paragraph::new(vec![
        Line::from(Span::styled(
            "California's Long-Term Care Facility Risk Assessment",
            CareTheme::title(),
        )),
        Line::from(Span::styled(
            "California Health and Human Services Agency",
            CareTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(subtitle, chunks[1]);

    render_highlights(f, chunks[2]);
    render_backend_status(f, chunks[3], backend);

    render_footer(
        f,
        chunks[5],
        &[("Enter", "Start Risk Assessment"), ("Ctrl+Q", "Quit")],
    );
}

fn render_highlights(f: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .horizontal_margin(2)
        .split(area);

    for ((title, body), column) in HIGHLIGHTS.iter().zip(columns.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(*body, CareTheme::text_secondary())))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(format!(" {title} "), CareTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(CareTheme::border()),
            );
        f.render_widget(card, *column);
    }
}

fn render_backend_status(f: &mut Frame, area: Rect, backend: BackendStatus) {
    let (label, style) = match backend {
        BackendStatus::Checking => ("Checking...", CareTheme::text_muted()),
        BackendStatus::Online => ("Online", CareTheme::success()),
        BackendStatus::Offline => ("Offline", CareTheme::warning()),
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled("Prediction service: ", CareTheme::text_secondary()),
        Span::styled(label, style),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(status, area);
}
