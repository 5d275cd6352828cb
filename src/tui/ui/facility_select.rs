//! Facility type selection.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::FacilityKind;
use crate::tui::styles::CareTheme;

use super::{render_footer, render_header};

pub fn render_facility_select(f: &mut Frame, area: Rect, cursor: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(2), // Prompt
            Constraint::Min(8),    // Cards
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Select Facility Type", "CareEnforced AI");

    let prompt = Paragraph::new(Span::styled(
        "Choose the type of healthcare facility you want to assess",
        CareTheme::text_secondary(),
    ))
    .alignment(Alignment::Center);
    f.render_widget(prompt, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(chunks[2]);

    for (index, kind) in FacilityKind::ALL.iter().enumerate() {
        render_card(f, columns[index], *kind, index, index == cursor);
    }

    render_footer(
        f,
        chunks[3],
        &[
            ("←→", "Choose"),
            ("Enter", "Continue"),
            ("1/2", "Quick Select"),
            ("Esc", "Back"),
        ],
    );
}

fn render_card(f: &mut Frame, area: Rect, kind: FacilityKind, index: usize, selected: bool) {
    let (border, title_style) = if selected {
        (CareTheme::border_focused(), CareTheme::focused())
    } else {
        (CareTheme::border(), CareTheme::text_secondary())
    };

    let impact_note = if kind.all_fields_high_impact() {
        "All parameters are top model features".to_string()
    } else {
        "Top model features are flagged as you type".to_string()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(kind.title(), CareTheme::title())),
        Line::from(""),
        Line::from(Span::styled(kind.description(), CareTheme::text_secondary())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} parameters", kind.fields().len()), CareTheme::text()),
            Span::styled(" · ", CareTheme::text_muted()),
            Span::styled(impact_note, CareTheme::text_muted()),
        ]),
    ];

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(format!(" [{}] ", index + 1), title_style))
                .borders(Borders::ALL)
                .border_style(border),
        );

    f.render_widget(card, area);
}
