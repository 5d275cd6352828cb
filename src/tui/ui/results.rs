//! Results report: score gauge, category badge, driver bars and
//! recommendation cards.
//!
//! The report is laid out as one tall widget. The screen shows a scrolling
//! window onto it; export renders the same widget at a fixed width and reads
//! the cells back as text rows.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    symbols,
    text::{Line, Span},
    widgets::{LineGauge, Paragraph, Widget},
    Frame,
};

use crate::domain::Report;
use crate::tui::styles::CareTheme;

use super::{render_footer, render_header, wrap_words};

const DISCLAIMER: &str = "Predictions are indicative estimates from a statistical model and do not replace a regulatory compliance review.";

pub struct ReportView<'a> {
    report: &'a Report,
}

impl<'a> ReportView<'a> {
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Rows needed at `width`.
    #[must_use]
    pub fn height(&self, width: u16) -> u16 {
        u16::try_from(self.layout(width).0.len()).unwrap_or(u16::MAX)
    }

    /// Text lines plus the row reserved for the score gauge.
    fn layout(&self, width: u16) -> (Vec<Line<'static>>, u16) {
        let report = self.report;
        let text_width = usize::from(width.saturating_sub(2)).max(10);
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(vec![
            Span::styled(" CareEnforced AI", CareTheme::title()),
            Span::styled(" │ Enforcement Risk Report", CareTheme::text_secondary()),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                " {} · Generated {}",
                report.kind.title(),
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            CareTheme::text_muted(),
        )));
        lines.push(Line::from(""));

        lines.push(section_heading("Predicted Risk Score", width));
        let gauge_row = lines.len() as u16;
        lines.push(Line::from(""));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!(" {} RISK ", report.risk_level.to_string().to_uppercase()),
                CareTheme::risk_badge(report.risk_level),
            ),
        ]));
        lines.push(Line::from(""));
        push_wrapped(&mut lines, &report.summary(), text_width, 1, CareTheme::text());
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" What this means:", CareTheme::subtitle())));
        push_wrapped(
            &mut lines,
            report.risk_level.guidance(),
            text_width,
            1,
            CareTheme::text_secondary(),
        );
        lines.push(Line::from(""));

        lines.push(section_heading("Top Risk Drivers", width));
        if report.drivers.is_empty() {
            lines.push(Line::from(Span::styled(
                " No risk drivers identified",
                CareTheme::text_muted(),
            )));
        } else {
            lines.extend(driver_lines(report, width));
        }
        lines.push(Line::from(""));

        lines.push(section_heading("AI Recommendations", width));
        if report.recommendations.is_empty() {
            lines.push(Line::from(Span::styled(
                " No recommendations available",
                CareTheme::text_muted(),
            )));
        } else {
            for (i, rec) in report.recommendations.iter().enumerate() {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(vec![
                    Span::styled(" ▸ ", CareTheme::info()),
                    Span::styled(rec.title.clone(), CareTheme::title()),
                    Span::raw("  "),
                    Span::styled(format!("[{}]", rec.impact), CareTheme::impact(rec.impact)),
                ]));
                push_wrapped(
                    &mut lines,
                    &rec.description,
                    text_width.saturating_sub(3),
                    4,
                    CareTheme::text_secondary(),
                );
            }
        }
        lines.push(Line::from(""));
        push_wrapped(&mut lines, DISCLAIMER, text_width, 1, CareTheme::text_muted());

        (lines, gauge_row)
    }
}

impl Widget for ReportView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (lines, gauge_row) = self.layout(area.width);
        Paragraph::new(lines).render(area, buf);

        if gauge_row < area.height {
            let report = self.report;
            let style = CareTheme::risk_level(report.risk_level);
            let gauge = LineGauge::default()
                .ratio(report.risk_score.unwrap_or(0.0).clamp(0.0, 1.0))
                .label(Span::styled(
                    format!("{:>6} ", report.percentage_label()),
                    style.add_modifier(Modifier::BOLD),
                ))
                .line_set(symbols::line::THICK)
                .filled_style(style)
                .unfilled_style(CareTheme::text_muted());
            let row = Rect::new(
                area.x + 1,
                area.y + gauge_row,
                area.width.saturating_sub(2),
                1,
            );
            gauge.render(row, buf);
        }
    }
}

fn section_heading(title: &str, width: u16) -> Line<'static> {
    let rule = usize::from(width).saturating_sub(title.len() + 3);
    Line::from(vec![
        Span::styled(format!(" {} ", title.to_uppercase()), CareTheme::subtitle()),
        Span::styled("─".repeat(rule), CareTheme::border()),
    ])
}

fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    width: usize,
    indent: usize,
    style: ratatui::style::Style,
) {
    let pad = " ".repeat(indent);
    for row in wrap_words(text, width) {
        lines.push(Line::from(Span::styled(format!("{pad}{row}"), style)));
    }
}

/// Filled cells for each driver bar, relative to the largest contribution.
#[must_use]
pub fn bar_cells(fractions: &[f64], bar_width: usize) -> Vec<usize> {
    fractions
        .iter()
        .map(|f| ((f * bar_width as f64).round() as usize).min(bar_width))
        .collect()
}

fn driver_lines(report: &Report, width: u16) -> Vec<Line<'static>> {
    let name_width = report
        .drivers
        .iter()
        .map(|d| d.feature.chars().count())
        .max()
        .unwrap_or(0)
        .min(usize::from(width) / 3)
        .max(8);
    // " 10. " + name + "  " + bar + "  " + value
    let bar_width = usize::from(width)
        .saturating_sub(5 + name_width + 2 + 2 + 8)
        .max(10);

    let cells = bar_cells(&report.driver_fractions(), bar_width);

    report
        .drivers
        .iter()
        .zip(cells)
        .enumerate()
        .map(|(i, (driver, filled))| {
            let name: String = driver.feature.chars().take(name_width).collect();
            Line::from(vec![
                Span::styled(format!(" {:>2}. ", i + 1), CareTheme::text_muted()),
                Span::styled(format!("{name:<name_width$}  "), CareTheme::text()),
                Span::styled("█".repeat(filled), CareTheme::info()),
                Span::styled("░".repeat(bar_width - filled), CareTheme::text_muted()),
                Span::styled(
                    format!("  {:>6.3}", driver.contribution),
                    CareTheme::text_secondary(),
                ),
            ])
        })
        .collect()
}

/// Render `report` at `width` and read it back as text rows.
#[must_use]
pub fn rasterize(report: &Report, width: u16) -> Vec<String> {
    let view = ReportView::new(report);
    let area = Rect::new(0, 0, width, view.height(width));
    let mut buf = Buffer::empty(area);
    view.render(area, &mut buf);

    buf.content
        .chunks(usize::from(width.max(1)))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

/// Draw the results screen. Returns the largest useful scroll offset.
pub fn render_results(
    f: &mut Frame,
    area: Rect,
    report: &Report,
    scroll: u16,
    exporting: bool,
) -> u16 {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Report
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], "Step 2: Analysis Results", report.kind.title());

    let body = chunks[1];
    let view = ReportView::new(report);
    let full_height = view.height(body.width);
    let max_scroll = full_height.saturating_sub(body.height);
    let scroll = scroll.min(max_scroll);

    let full = Rect::new(0, 0, body.width, full_height);
    let mut offscreen = Buffer::empty(full);
    view.render(full, &mut offscreen);

    let frame_buf = f.buffer_mut();
    for y in 0..body.height.min(full_height - scroll) {
        for x in 0..body.width {
            if let (Some(src), Some(dst)) = (
                offscreen.cell((x, y + scroll)),
                frame_buf.cell_mut((body.x + x, body.y + y)),
            ) {
                *dst = src.clone();
            }
        }
    }

    let export_hint = if exporting {
        ("…", "Generating report")
    } else {
        ("D", "Download Report")
    };
    render_footer(
        f,
        chunks[2],
        &[
            ("↑↓", "Scroll"),
            export_hint,
            ("E", "Edit Parameters"),
            ("N", "New Analysis"),
        ],
    );

    max_scroll
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FacilityKind, ImpactLevel, PredictionResult, Recommendation, RiskDriver, RiskLevel,
    };

    fn report(drivers: Vec<RiskDriver>, recommendations: Vec<Recommendation>) -> Report {
        PredictionResult {
            risk_score: Some(0.85),
            risk_level: Some(RiskLevel::High),
            top_risk_drivers: drivers,
            recommendations,
            explanation_type: None,
        }
        .into_report(FacilityKind::LongTermCare)
        .expect("renderable")
    }

    fn driver(feature: &str, contribution: f64) -> RiskDriver {
        RiskDriver {
            feature: feature.into(),
            contribution,
        }
    }

    #[test]
    fn test_bar_cells_scale_to_max() {
        let fractions = crate::domain::bar_fractions(&[
            driver("f1", 5.0),
            driver("f2", 10.0),
            driver("f3", 2.0),
        ]);
        assert_eq!(bar_cells(&fractions, 20), vec![10, 20, 4]);
    }

    #[test]
    fn test_rasterize_contains_report_content() {
        let report = report(
            vec![driver("TOT_LIC_BEDS", 0.3), driver("HSA", 0.1)],
            vec![Recommendation {
                title: "Increase staffing".into(),
                description: "Review nurse staffing ratios on night shifts.".into(),
                impact: ImpactLevel::High,
            }],
        );
        let rows = rasterize(&report, 88);
        let text = rows.join("\n");

        assert!(rows.iter().all(|r| r.chars().count() == 88));
        assert!(text.contains("85.0%"));
        assert!(text.contains("HIGH RISK"));
        assert!(text.contains("TOT_LIC_BEDS"));
        assert!(text.contains("Increase staffing"));
        assert!(text.contains("[HIGH]"));
        assert!(text.contains("What this means:"));
    }

    #[test]
    fn test_placeholders_for_empty_sections() {
        let text = rasterize(&report(Vec::new(), Vec::new()), 88).join("\n");
        assert!(text.contains("No risk drivers identified"));
        assert!(text.contains("No recommendations available"));
    }

    #[test]
    fn test_unspecified_impact_renders_neutral_tag() {
        let report = report(
            Vec::new(),
            vec![Recommendation {
                title: "Audit".into(),
                description: "Quarterly.".into(),
                impact: ImpactLevel::Unspecified,
            }],
        );
        let text = rasterize(&report, 88).join("\n");
        assert!(text.contains("Audit  [-]"));
    }

    #[test]
    fn test_height_grows_with_narrow_width() {
        let report = report(Vec::new(), Vec::new());
        let view = ReportView::new(&report);
        assert!(view.height(40) > view.height(120));
    }
}
