//! Facility parameter form and county picker.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::domain::{
    is_high_impact, region, FacilityInput, FieldKind, FieldSpec, FieldValue, RegionSelector,
    TopFeature,
};
use crate::tui::styles::CareTheme;

use super::{centered_rect, render_footer, render_header};

/// Cursor and in-progress text edit for the parameter form.
#[derive(Debug, Clone, Default)]
pub struct FormCursor {
    pub focus: usize,
    /// Raw text being typed into the focused numeric field
    pub buffer: Option<String>,
}

impl FormCursor {
    pub fn next(&mut self, len: usize) {
        if len > 0 {
            self.focus = (self.focus + 1) % len;
        }
    }

    pub fn prev(&mut self, len: usize) {
        if len > 0 {
            self.focus = self.focus.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Accept a typed character. Only digits, `.` and a leading `-` are kept.
    pub fn input_char(&mut self, c: char) {
        let buffer = self.buffer.get_or_insert_with(String::new);
        let accepted = c.is_ascii_digit()
            || (c == '.' && !buffer.contains('.'))
            || (c == '-' && buffer.is_empty());
        if accepted {
            buffer.push(c);
        }
    }

    /// Delete the last character, starting from `current` when not editing.
    pub fn backspace(&mut self, current: &str) {
        let buffer = self
            .buffer
            .get_or_insert_with(|| current.chars().filter(|c| *c != ',').collect());
        buffer.pop();
    }

    /// Finish the edit, returning the typed text.
    pub fn take_buffer(&mut self) -> Option<String> {
        self.buffer.take()
    }
}

/// Format `value` with thousands separators and as many decimals as `step`.
#[must_use]
pub fn format_number(value: f64, step: f64) -> String {
    let decimals = step_decimals(step);
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (raw.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let nonzero = raw.chars().any(|c| c.is_ascii_digit() && c != '0');
    if value < 0.0 && nonzero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn step_decimals(step: f64) -> usize {
    if !(step > 0.0 && step < 1.0) {
        return 0;
    }
    let text = format!("{step}");
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

/// Display text for `value` under `spec`.
#[must_use]
pub fn display_value(spec: &FieldSpec, value: Option<&FieldValue>) -> String {
    match (spec.kind, value) {
        (FieldKind::Number { step, .. }, Some(FieldValue::Number(v))) => format_number(*v, step),
        (_, Some(FieldValue::Text(text))) => text.clone(),
        (_, Some(FieldValue::Number(v))) => v.to_string(),
        (_, None) => "-".to_string(),
    }
}

fn in_bounds(spec: &FieldSpec, value: Option<&FieldValue>) -> bool {
    match (spec.kind, value) {
        (FieldKind::Number { min, max, .. }, Some(FieldValue::Number(v))) => {
            v.is_finite() && *v >= min && *v <= max
        }
        (FieldKind::Region { .. }, Some(FieldValue::Text(_))) => true,
        _ => false,
    }
}

pub struct InputView<'a> {
    pub input: &'a FacilityInput,
    pub cursor: &'a FormCursor,
    pub top_features: &'a [TopFeature],
    pub picker: Option<&'a RegionSelector>,
    /// A report exists for this input (edit mode)
    pub has_results: bool,
}

pub fn render_input(f: &mut Frame, area: Rect, view: &InputView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let kind = view.input.kind();
    render_header(f, chunks[0], "Step 1: Facility Parameters", kind.title());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .margin(1)
        .split(chunks[1]);

    render_fields(f, columns[0], view);
    render_field_detail(f, columns[1], view);

    let back = if view.has_results {
        "Back to Results"
    } else {
        "Back"
    };
    let mut hints = vec![
        ("↑↓", "Field"),
        ("←→", "Adjust"),
        ("0-9", "Type"),
        ("Enter", "Calculate Risk"),
    ];
    if has_region_field(view.input) {
        hints.push(("C", "County"));
    }
    hints.push(("N", "New"));
    hints.push(("Esc", back));
    render_footer(f, chunks[2], &hints);

    if let Some(picker) = view.picker {
        render_county_picker(f, picker);
    }
}

fn has_region_field(input: &FacilityInput) -> bool {
    input
        .kind()
        .fields()
        .iter()
        .any(|spec| matches!(spec.kind, FieldKind::Region { .. }))
}

/// Columns reserved for the value, wide enough for a region label.
const VALUE_WIDTH: usize = 16;

const HIGH_IMPACT: &str = "★ High Impact";

/// Pad or shorten `label` to exactly `width` columns.
fn fit_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return format!("{label:<width$}");
    }
    let mut cut: String = label.chars().take(width.saturating_sub(1)).collect();
    if width > 0 {
        cut.push('…');
    }
    cut
}

fn render_fields(f: &mut Frame, area: Rect, view: &InputView<'_>) {
    let kind = view.input.kind();
    let fields = kind.fields();
    let any_high_impact = fields
        .iter()
        .any(|spec| is_high_impact(kind, spec.key, view.top_features));

    let mut block = Block::default()
        .title(Span::styled(" Parameters ", CareTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CareTheme::border_focused());
    if any_high_impact {
        block = block.title_bottom(Span::styled(
            format!(" {HIGH_IMPACT} "),
            CareTheme::high_impact(),
        ));
    }
    let inner = block.inner(area);
    f.render_widget(block, area);

    // marker + star + label + gap + value
    let longest = fields.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let label_width = longest.min(
        usize::from(inner.width)
            .saturating_sub(2 + 2 + 2 + VALUE_WIDTH)
            .max(8),
    );

    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let focused = i == view.cursor.focus;
            let value = view.input.get(spec.key);

            let marker = if focused { "▶ " } else { "  " };
            let star = if is_high_impact(kind, spec.key, view.top_features) {
                "★ "
            } else {
                "  "
            };
            let label_style = if focused {
                CareTheme::focused()
            } else {
                CareTheme::text_secondary()
            };

            let value_span = match (&view.cursor.buffer, focused) {
                (Some(buffer), true) => Span::styled(format!("{buffer}▌"), CareTheme::focused()),
                _ => {
                    let style = if in_bounds(spec, value) {
                        CareTheme::text()
                    } else {
                        CareTheme::danger()
                    };
                    Span::styled(display_value(spec, value), style)
                }
            };

            Line::from(vec![
                Span::styled(marker, CareTheme::focused()),
                Span::styled(star, CareTheme::high_impact()),
                Span::styled(
                    format!("{}  ", fit_label(spec.label, label_width)),
                    label_style,
                ),
                value_span,
            ])
        })
        .collect();

    let height = inner.height as usize;
    let offset = view.cursor.focus.saturating_sub(height.saturating_sub(1)) as u16;
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

fn render_field_detail(f: &mut Frame, area: Rect, view: &InputView<'_>) {
    let fields = view.input.kind().fields();
    let Some(spec) = fields.get(view.cursor.focus) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(spec.label, CareTheme::title())),
        Line::from(Span::styled(spec.key, CareTheme::text_muted())),
    ];
    if is_high_impact(view.input.kind(), spec.key, view.top_features) {
        lines.push(Line::from(Span::styled(HIGH_IMPACT, CareTheme::high_impact())));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(spec.description, CareTheme::text_secondary())),
        Line::from(""),
    ]);

    match spec.kind {
        FieldKind::Number {
            min,
            max,
            step,
            default,
        } => {
            lines.push(Line::from(vec![
                Span::styled("Range:   ", CareTheme::text_muted()),
                Span::styled(
                    format!("{} – {}", format_number(min, step), format_number(max, step)),
                    CareTheme::text(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Step:    ", CareTheme::text_muted()),
                Span::styled(format_number(step, step), CareTheme::text()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Default: ", CareTheme::text_muted()),
                Span::styled(format_number(default, step), CareTheme::text()),
            ]));
        }
        FieldKind::Region { .. } => {
            let current = display_value(spec, view.input.get(spec.key));
            lines.push(Line::from(vec![
                Span::styled("Region:  ", CareTheme::text_muted()),
                Span::styled(current, CareTheme::text()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Use ←→ to cycle regions or [C] to pick a county.",
                CareTheme::text_muted(),
            )));
        }
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(" Field Details ", CareTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(CareTheme::border()),
    );
    f.render_widget(panel, area);
}

fn render_county_picker(f: &mut Frame, picker: &RegionSelector) {
    let area = centered_rect(50, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(Span::styled(" Select County ", CareTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CareTheme::border_focused());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(inner);

    let (county, hovered_region) = picker.hovered();
    let preview = match hovered_region {
        Some(region) => Span::styled(format!("HSA: {}", region.label()), CareTheme::focused()),
        None => Span::styled("Not mapped", CareTheme::text_muted()),
    };
    let heading = Paragraph::new(Line::from(vec![
        Span::styled(format!("{county}  "), CareTheme::title()),
        preview,
    ]))
    .alignment(Alignment::Center);
    f.render_widget(heading, chunks[0]);

    let majors = region::MAJOR_COUNTIES.len();
    let items: Vec<ListItem> = picker
        .counties()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let style = if picker.is_selected(name) {
                CareTheme::success()
            } else {
                CareTheme::text()
            };
            let tag = if i < majors { "★ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(tag, CareTheme::high_impact()),
                Span::styled(*name, style),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(CareTheme::selected());
    let mut state = ListState::default().with_selected(Some(picker.cursor()));
    f.render_stateful_widget(list, chunks[1], &mut state);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[↑↓] ", CareTheme::key_hint()),
        Span::styled("Browse ", CareTheme::key_desc()),
        Span::styled("[Enter] ", CareTheme::key_hint()),
        Span::styled("Select ", CareTheme::key_desc()),
        Span::styled("[Esc] ", CareTheme::key_hint()),
        Span::styled("Close", CareTheme::key_desc()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hints, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FacilityKind;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw_form(width: u16, input: &FacilityInput, top_features: &[TopFeature]) -> Vec<String> {
        let cursor = FormCursor::default();
        let view = InputView {
            input,
            cursor: &cursor,
            top_features,
            picker: None,
            has_results: false,
        };
        let mut terminal = Terminal::new(TestBackend::new(width, 30)).expect("terminal");
        terminal
            .draw(|f| render_input(f, f.area(), &view))
            .expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(15_000.0, 100.0), "15,000");
        assert_eq!(format_number(5_000_000.0, 1_000.0), "5,000,000");
        assert_eq!(format_number(500.0, 10.0), "500");
        assert_eq!(format_number(-250_000.0, 10_000.0), "-250,000");
    }

    #[test]
    fn test_format_number_uses_step_decimals() {
        assert_eq!(format_number(4.5, 0.1), "4.5");
        assert_eq!(format_number(1234.25, 0.01), "1,234.25");
        assert_eq!(format_number(-0.01, 0.1), "0.0");
    }

    #[test]
    fn test_cursor_editing() {
        let mut cursor = FormCursor::default();
        cursor.input_char('-');
        cursor.input_char('1');
        cursor.input_char('.');
        cursor.input_char('.');
        cursor.input_char('5');
        cursor.input_char('x');
        assert_eq!(cursor.buffer.as_deref(), Some("-1.5"));
        assert_eq!(cursor.take_buffer().as_deref(), Some("-1.5"));
        assert!(cursor.buffer.is_none());

        cursor.backspace("15,000");
        assert_eq!(cursor.buffer.as_deref(), Some("1500"));
    }

    #[test]
    fn test_cursor_wraps() {
        let mut cursor = FormCursor::default();
        cursor.prev(9);
        assert_eq!(cursor.focus, 8);
        cursor.next(9);
        assert_eq!(cursor.focus, 0);
    }

    #[test]
    fn test_display_value_per_field_kind() {
        let input = FacilityInput::defaults(FacilityKind::Hospital);
        let spec = FacilityKind::Hospital.field("TOT_ALOS_PY").expect("field");
        assert_eq!(display_value(spec, input.get(spec.key)), "4.5");

        let input = FacilityInput::defaults(FacilityKind::LongTermCare);
        let spec = FacilityKind::LongTermCare.field("HSA").expect("field");
        assert_eq!(display_value(spec, input.get(spec.key)), "11 - Los Angeles");
    }

    #[test]
    fn test_high_impact_badge_visible_at_common_widths() {
        let input = FacilityInput::defaults(FacilityKind::LongTermCare);
        let top = vec![TopFeature {
            name: "TOT_PAT_DAYS_FOR".into(),
        }];

        for width in [80, 100] {
            let rows = draw_form(width, &input, &top);
            let row = rows
                .iter()
                .find(|r| r.contains("Total Patient Days"))
                .unwrap_or_else(|| panic!("field row missing at width {width}"));
            assert!(row.contains("★ Total Patient Days"), "width {width}: {row}");
            assert!(row.contains("15,000"), "width {width}: {row}");
            assert!(rows.join("\n").contains("High Impact"), "width {width}");
        }
    }

    #[test]
    fn test_no_badge_without_top_features() {
        let input = FacilityInput::defaults(FacilityKind::LongTermCare);
        let text = draw_form(100, &input, &[]).join("\n");
        assert!(!text.contains('★'));
        assert!(!text.contains("High Impact"));
    }

    #[test]
    fn test_fit_label_truncates_long_labels() {
        assert_eq!(fit_label("Beds", 6), "Beds  ");
        assert_eq!(fit_label("Administrative Expenses", 8), "Adminis…");
    }
}
