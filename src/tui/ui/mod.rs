//! UI module: View components for the TUI.

pub mod facility_select;
pub mod input;
pub mod loading;
pub mod results;
pub mod welcome;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::application::Notice;
use crate::tui::styles::CareTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "Predictions are indicative estimates from a statistical model and do not replace a regulatory compliance review.",
        CareTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(CareTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Title bar with a bottom border.
pub fn render_header(f: &mut Frame, area: Rect, title: &str, context: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CareTheme::text()),
        Span::styled(title.to_string(), CareTheme::title()),
        Span::styled(format!(" │ {context}"), CareTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CareTheme::border()),
    );

    f.render_widget(header, area);
}

/// Key hints, e.g. `[Enter] Submit`.
pub fn render_footer(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), CareTheme::key_hint()),
                Span::styled(format!("{desc} "), CareTheme::key_desc()),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CareTheme::border()),
    );

    f.render_widget(footer, area);
}

/// Modal notice drawn over the current screen.
pub fn render_notice(f: &mut Frame, notice: &Notice) {
    let (title, message, style) = match notice {
        Notice::Error(message) => (" Error ", message, CareTheme::danger()),
        Notice::Info(message) => (" Notice ", message, CareTheme::info()),
    };

    let area = centered_rect(60, 30, f.area());
    let mut lines = vec![Line::from("")];
    lines.extend(
        wrap_words(message, area.width.saturating_sub(4) as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, CareTheme::text()))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Enter] ", CareTheme::key_hint()),
        Span::styled("Dismiss", CareTheme::key_desc()),
    ]));

    let popup = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(Span::styled(title, style))
            .borders(Borders::ALL)
            .border_style(style),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

/// Rect of `percent_x` by `percent_y` centred in `area`.
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Greedy word wrap to `width` columns. Words longer than `width` are split.
#[must_use]
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_words_breaks_on_spaces() {
        assert_eq!(
            wrap_words("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_words_splits_long_words() {
        assert_eq!(wrap_words("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_words_empty_is_one_blank_line() {
        assert_eq!(wrap_words("", 10), vec![String::new()]);
    }
}
