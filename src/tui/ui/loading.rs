//! Loading screen shown while an assessment is in flight.

use std::time::{Duration, Instant};

use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::CareTheme;

use super::{render_footer, render_header};

pub const FUN_FACTS: [&str; 8] = [
    "California has over 1,200 skilled nursing facilities serving more than 100,000 residents.",
    "Random Forest models can analyze thousands of data points to predict enforcement risk patterns.",
    "Machine learning helps identify risk factors before they become compliance issues.",
    "The CDPH conducts routine inspections to ensure quality care standards are maintained.",
    "Data-driven insights help facilities improve patient safety and care quality.",
    "California's long-term care facilities employ over 200,000 healthcare professionals.",
    "Early risk detection can help facilities implement preventive measures proactively.",
    "AI models are trained on historical data spanning multiple years for accuracy.",
];

const FACT_ROTATION: Duration = Duration::from_secs(4);

const STATUS_LINES: [&str; 3] = [
    "Running Random Forest model...",
    "Analyzing feature contributions...",
    "Generating AI recommendations...",
];

/// Highest progress shown before results are revealed.
const PROGRESS_CEILING: f64 = 0.95;

/// Animation state for one visit to the loading screen.
#[derive(Debug, Clone)]
pub struct LoadingAnimation {
    started_at: Instant,
    first_fact: usize,
    gate: Duration,
}

impl LoadingAnimation {
    /// Start at a random fact.
    #[must_use]
    pub fn start(now: Instant, gate: Duration) -> Self {
        let first_fact = rand::thread_rng().gen_range(0..FUN_FACTS.len());
        Self::with_first_fact(now, gate, first_fact)
    }

    #[must_use]
    pub fn with_first_fact(now: Instant, gate: Duration, first_fact: usize) -> Self {
        Self {
            started_at: now,
            first_fact: first_fact % FUN_FACTS.len(),
            gate,
        }
    }

    #[must_use]
    pub fn fact_index(&self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.started_at);
        let rotations = (elapsed.as_millis() / FACT_ROTATION.as_millis()) as usize;
        (self.first_fact + rotations) % FUN_FACTS.len()
    }

    #[must_use]
    pub fn progress(&self, now: Instant) -> f64 {
        loading_progress(now.saturating_duration_since(self.started_at), self.gate)
    }
}

/// Eased progress that approaches but never reaches the ceiling.
///
/// At `elapsed == gate` the bar sits near 90%.
#[must_use]
pub fn loading_progress(elapsed: Duration, gate: Duration) -> f64 {
    let tau = if gate.is_zero() {
        1.0
    } else {
        gate.as_secs_f64() / 3.0
    };
    let k = 1.0 - (-elapsed.as_secs_f64() / tau).exp();
    (PROGRESS_CEILING * k).clamp(0.0, PROGRESS_CEILING)
}

pub fn render_loading(f: &mut Frame, area: Rect, animation: &LoadingAnimation, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Title
            Constraint::Length(3), // Progress
            Constraint::Length(6), // Fun fact
            Constraint::Length(4), // Status lines
            Constraint::Min(0),
            Constraint::Length(3), // Footer
        ])
        .horizontal_margin(2)
        .split(area);

    render_header(f, chunks[0], "Analyzing Your Facility", "Risk Assessment");

    let title = Paragraph::new(vec![
        Line::from(Span::styled("Analyzing Your Facility", CareTheme::title())),
        Line::from(Span::styled(
            "Our AI is processing your data...",
            CareTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let progress = animation.progress(now);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Progress ", CareTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(CareTheme::border()),
        )
        .gauge_style(CareTheme::info())
        .ratio(progress)
        .label(format!("{:.0}%", (progress * 100.0).floor()));
    f.render_widget(gauge, chunks[2]);

    let fact = Paragraph::new(Span::styled(
        FUN_FACTS[animation.fact_index(now)],
        CareTheme::text(),
    ))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Did You Know? ", CareTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(CareTheme::border_focused()),
    );
    f.render_widget(fact, chunks[3]);

    // Dots pulse out of phase, 200 ms apart.
    let elapsed_ms = now.saturating_duration_since(animation.started_at).as_millis();
    let status: Vec<Line> = STATUS_LINES
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let phase = (elapsed_ms + 200 * i as u128) / 600 % 2;
            let dot = if phase == 0 { "● " } else { "○ " };
            Line::from(vec![
                Span::styled(dot, CareTheme::info()),
                Span::styled(*text, CareTheme::text_muted()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(status), chunks[4]);

    render_footer(f, chunks[6], &[("Esc", "Cancel")]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_never_reaches_full() {
        let gate = Duration::from_millis(7_000);
        let mut last = 0.0;
        for ms in [0, 500, 3_500, 7_000, 20_000, 600_000] {
            let p = loading_progress(Duration::from_millis(ms), gate);
            assert!(p >= last);
            assert!(p < 1.0);
            last = p;
        }
        assert_eq!(loading_progress(Duration::ZERO, gate), 0.0);
        assert!(loading_progress(gate, gate) > 0.85);
    }

    #[test]
    fn test_facts_rotate_every_four_seconds() {
        let t0 = Instant::now();
        let anim = LoadingAnimation::with_first_fact(t0, Duration::from_secs(7), 6);
        assert_eq!(anim.fact_index(t0), 6);
        assert_eq!(anim.fact_index(t0 + Duration::from_millis(3_999)), 6);
        assert_eq!(anim.fact_index(t0 + Duration::from_secs(4)), 7);
        assert_eq!(anim.fact_index(t0 + Duration::from_secs(8)), 0);
    }

    #[test]
    fn test_random_start_is_in_range() {
        let anim = LoadingAnimation::start(Instant::now(), Duration::from_secs(7));
        assert!(anim.first_fact < FUN_FACTS.len());
    }
}
