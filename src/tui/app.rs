//! Main TUI application.
//!
//! Handles:
//! - Key input, translated into wizard events
//! - Effect execution (workers, reveal timers, export)
//! - Per-screen view state (cursors, scroll, animation)

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::{DocxReportSink, HttpRiskApi};
use crate::application::report_export::PAGE_COLUMNS;
use crate::application::{
    reduce, AssessmentService, Effect, Event, ReportExporter, Screen, Ticket, WizardState,
};
use crate::config::Config;
use crate::domain::{
    FacilityKind, FieldKind, FieldSpec, FieldValue, HsaRegion, RegionSelector, Report,
};
use crate::ports::{ReportSink, RiskApi};

use super::ui::{
    facility_select::render_facility_select,
    input::{display_value, render_input, FormCursor, InputView},
    loading::{render_loading, LoadingAnimation},
    render_disclaimer, render_notice,
    results::{rasterize, render_results},
    welcome::render_welcome,
};
use super::worker::{AssessmentWorkers, WorkerUpdate};

const TICK: Duration = Duration::from_millis(50);

/// Main application state
pub struct App {
    state: WizardState,
    should_quit: bool,

    workers: AssessmentWorkers<dyn RiskApi>,
    exporter: ReportExporter<dyn ReportSink>,

    /// Pending `RevealResults` deliveries
    reveal_timers: Vec<(Ticket, Instant)>,

    facility_cursor: usize,
    form: FormCursor,
    county_picker: Option<RegionSelector>,
    loading: Option<LoadingAnimation>,
    results_scroll: u16,
    results_max_scroll: u16,
}

impl App {
    /// Create the application with the HTTP client and docx writer.
    ///
    /// # Errors
    /// Returns error if the export directory cannot be prepared.
    pub fn new(config: &Config) -> Result<Self> {
        tracing::info!(
            "Prediction service at {}, exports to {}",
            config.api_url,
            config.export_dir.display()
        );
        std::fs::create_dir_all(&config.export_dir)?;
        let api: Arc<dyn RiskApi> = Arc::new(HttpRiskApi::new(config));
        let sink: Arc<dyn ReportSink> = Arc::new(DocxReportSink::new(config.export_dir.clone()));
        Ok(Self::with_dependencies(config, api, sink))
    }

    /// Create the application with injected adapters.
    pub fn with_dependencies(
        config: &Config,
        api: Arc<dyn RiskApi>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let boot = WizardState::boot(config.min_loading);
        let mut app = Self {
            state: boot.state,
            should_quit: false,
            workers: AssessmentWorkers::new(AssessmentService::new(api)),
            exporter: ReportExporter::new(sink),
            reveal_timers: Vec::new(),
            facility_cursor: 0,
            form: FormCursor::default(),
            county_picker: None,
            loading: None,
            results_scroll: 0,
            results_max_scroll: 0,
        };
        app.run_effects(boot.effects);
        app
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.tick(Instant::now());

            terminal.draw(|f| self.draw(f))?;

            if event::poll(TICK)? {
                if let event::Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Drain worker results and fire due timers.
    fn tick(&mut self, now: Instant) {
        while let Some(update) = self.workers.try_recv() {
            let event = match update {
                WorkerUpdate::Health(report) => Event::HealthChecked(report),
                WorkerUpdate::TopFeatures(features) => Event::TopFeaturesLoaded(features),
                WorkerUpdate::Prediction {
                    ticket,
                    outcome: Ok(result),
                } => Event::PredictionSucceeded {
                    ticket,
                    result,
                    now: Instant::now(),
                },
                WorkerUpdate::Prediction {
                    ticket,
                    outcome: Err(message),
                } => Event::PredictionFailed { ticket, message },
            };
            self.dispatch(event);
        }

        let (due, pending): (Vec<_>, Vec<_>) = self
            .reveal_timers
            .drain(..)
            .partition(|(_, deadline)| *deadline <= now);
        self.reveal_timers = pending;
        for (ticket, _) in due {
            self.dispatch(Event::RevealResults { ticket });
        }
    }

    /// Apply `event` and everything its effects trigger synchronously.
    fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let before = self.state.screen();
            let transition = reduce(self.state.clone(), event);
            self.state = transition.state;
            self.on_screen_change(before);
            queue.extend(self.run_effects(transition.effects));
        }
    }

    /// Execute effects, returning events produced without waiting.
    fn run_effects(&mut self, effects: Vec<Effect>) -> Vec<Event> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::CheckHealth => self.workers.spawn_health_check(),
                Effect::FetchTopFeatures => self.workers.spawn_top_features(),
                Effect::RequestPrediction { ticket, input } => {
                    self.workers.spawn_prediction(ticket, input);
                }
                Effect::CancelPrediction { ticket } => {
                    self.workers.cancel(ticket);
                    self.reveal_timers.retain(|(t, _)| *t != ticket);
                }
                Effect::ScheduleReveal { ticket, delay } => {
                    self.reveal_timers.push((ticket, Instant::now() + delay));
                }
                Effect::ExportReport { report } => {
                    follow_ups.push(Event::ExportFinished(self.export(&report)));
                }
            }
        }
        follow_ups
    }

    fn export(&self, report: &Report) -> std::result::Result<std::path::PathBuf, String> {
        let rows = rasterize(report, PAGE_COLUMNS);
        let today = chrono::Local::now().date_naive();
        self.exporter.export(&rows, today).map_err(|e| {
            tracing::error!("{}", e);
            e.user_message()
        })
    }

    fn on_screen_change(&mut self, before: Screen) {
        let after = self.state.screen();
        if before == after {
            return;
        }
        tracing::debug!("Screen {:?} -> {:?}", before, after);

        match after {
            Screen::Loading => {
                self.loading = Some(LoadingAnimation::start(
                    Instant::now(),
                    self.state.min_loading(),
                ));
            }
            Screen::ParameterInput if before == Screen::FacilityTypeSelect => {
                self.form = FormCursor::default();
            }
            Screen::Results => self.results_scroll = 0,
            _ => {}
        }
        if after != Screen::Loading {
            self.loading = None;
        }
        if after != Screen::ParameterInput {
            self.county_picker = None;
            self.form.buffer = None;
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());
        let content_area = chunks[0];

        match self.state.screen() {
            Screen::Welcome => render_welcome(f, content_area, self.state.backend()),
            Screen::FacilityTypeSelect => {
                render_facility_select(f, content_area, self.facility_cursor);
            }
            Screen::ParameterInput => {
                if let Some(input) = self.state.input() {
                    let view = InputView {
                        input,
                        cursor: &self.form,
                        top_features: self.state.top_features(),
                        picker: self.county_picker.as_ref(),
                        has_results: self.state.report().is_some(),
                    };
                    render_input(f, content_area, &view);
                }
            }
            Screen::Loading => {
                let now = Instant::now();
                let animation = self.loading.get_or_insert_with(|| {
                    LoadingAnimation::start(now, self.state.min_loading())
                });
                render_loading(f, content_area, animation, now);
            }
            Screen::Results => {
                if let Some(report) = self.state.report() {
                    self.results_max_scroll = render_results(
                        f,
                        content_area,
                        report,
                        self.results_scroll,
                        self.state.is_exporting(),
                    );
                }
            }
        }

        render_disclaimer(f, chunks[1]);

        if let Some(notice) = self.state.notice() {
            render_notice(f, notice);
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.state.notice().is_some() {
            if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.dispatch(Event::DismissNotice);
            }
            return;
        }

        match self.state.screen() {
            Screen::Welcome => self.handle_welcome_key(key),
            Screen::FacilityTypeSelect => self.handle_facility_key(key),
            Screen::ParameterInput => {
                if self.county_picker.is_some() {
                    self.handle_picker_key(key);
                } else {
                    self.handle_input_key(key);
                }
            }
            Screen::Loading => {
                if key == KeyCode::Esc {
                    self.dispatch(Event::CancelLoading);
                }
            }
            Screen::Results => self.handle_results_key(key),
        }
    }

    fn handle_welcome_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('S') => {
                self.dispatch(Event::Start);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_facility_key(&mut self, key: KeyCode) {
        let count = FacilityKind::ALL.len();
        match key {
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                self.facility_cursor = (self.facility_cursor + count - 1) % count;
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                self.facility_cursor = (self.facility_cursor + 1) % count;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(kind) = FacilityKind::ALL.get(index) {
                    self.facility_cursor = index;
                    self.dispatch(Event::SelectFacility(*kind));
                }
            }
            KeyCode::Enter => {
                let kind = FacilityKind::ALL[self.facility_cursor % count];
                self.dispatch(Event::SelectFacility(kind));
            }
            KeyCode::Esc => self.dispatch(Event::ReturnHome),
            _ => {}
        }
    }

    fn focused_spec(&self) -> Option<&'static FieldSpec> {
        let kind = self.state.input()?.kind();
        kind.fields().get(self.form.focus)
    }

    /// Store the typed text of the focused field. Unparsable text becomes 0.
    fn commit_edit(&mut self) {
        let Some(text) = self.form.take_buffer() else {
            return;
        };
        if let Some(spec) = self.focused_spec() {
            self.dispatch(Event::EditField {
                key: spec.key.to_string(),
                text,
            });
        }
    }

    fn adjust_focused(&mut self, steps: i32) {
        self.commit_edit();
        let Some(spec) = self.focused_spec() else {
            return;
        };
        match spec.kind {
            FieldKind::Number { .. } => self.dispatch(Event::NudgeField {
                key: spec.key.to_string(),
                steps,
            }),
            FieldKind::Region { .. } => {
                let current = self
                    .state
                    .input()
                    .and_then(|i| i.get(spec.key))
                    .and_then(FieldValue::as_text)
                    .and_then(HsaRegion::from_label)
                    .unwrap_or_default();
                let regions = HsaRegion::ALL;
                let index = regions.iter().position(|r| *r == current).unwrap_or(0);
                let len = regions.len() as i32;
                let next = (index as i32 + steps.signum()).rem_euclid(len) as usize;
                self.dispatch(Event::SetField {
                    key: spec.key.to_string(),
                    value: FieldValue::Text(regions[next].label().to_string()),
                });
            }
        }
    }

    fn handle_input_key(&mut self, key: KeyCode) {
        let field_count = self
            .state
            .input()
            .map_or(0, |input| input.kind().fields().len());

        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.commit_edit();
                self.form.prev(field_count);
            }
            KeyCode::Down | KeyCode::Tab => {
                self.commit_edit();
                self.form.next(field_count);
            }
            KeyCode::Left => self.adjust_focused(-1),
            KeyCode::Right => self.adjust_focused(1),
            KeyCode::PageDown => self.adjust_focused(-10),
            KeyCode::PageUp => self.adjust_focused(10),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if matches!(
                    self.focused_spec().map(|s| s.kind),
                    Some(FieldKind::Number { .. })
                ) {
                    self.form.input_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(spec) = self.focused_spec() {
                    if matches!(spec.kind, FieldKind::Number { .. }) {
                        let current =
                            display_value(spec, self.state.input().and_then(|i| i.get(spec.key)));
                        self.form.backspace(&current);
                    }
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => self.open_county_picker(),
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form.buffer = None;
                self.dispatch(Event::NewAnalysis);
            }
            KeyCode::Enter => {
                self.commit_edit();
                self.dispatch(Event::Submit {
                    now: Instant::now(),
                });
            }
            KeyCode::Esc => {
                if self.form.take_buffer().is_some() {
                    return;
                }
                if self.state.report().is_some() {
                    self.dispatch(Event::ShowResults);
                } else {
                    self.dispatch(Event::NewAnalysis);
                }
            }
            _ => {}
        }
    }

    fn open_county_picker(&mut self) {
        let Some(input) = self.state.input() else {
            return;
        };
        let region_value = input.kind().fields().iter().find_map(|spec| match spec.kind {
            FieldKind::Region { .. } => Some(
                input
                    .get(spec.key)
                    .and_then(FieldValue::as_text)
                    .and_then(HsaRegion::from_label)
                    .unwrap_or_default(),
            ),
            FieldKind::Number { .. } => None,
        });
        if let Some(region) = region_value {
            self.commit_edit();
            self.county_picker = Some(RegionSelector::new(region));
        }
    }

    fn handle_picker_key(&mut self, key: KeyCode) {
        let Some(picker) = self.county_picker.as_mut() else {
            return;
        };
        match key {
            KeyCode::Up => picker.prev(),
            KeyCode::Down => picker.next(),
            KeyCode::Enter => {
                let (county, _) = picker.hovered();
                self.county_picker = None;
                self.dispatch(Event::SelectCounty(county.to_string()));
            }
            KeyCode::Esc => self.county_picker = None,
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.results_scroll = self.results_scroll.saturating_sub(1),
            KeyCode::Down => {
                self.results_scroll = (self.results_scroll + 1).min(self.results_max_scroll);
            }
            KeyCode::PageUp => self.results_scroll = self.results_scroll.saturating_sub(10),
            KeyCode::PageDown => {
                self.results_scroll = (self.results_scroll + 10).min(self.results_max_scroll);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.dispatch(Event::ExportRequested),
            KeyCode::Char('e') | KeyCode::Char('E') => self.dispatch(Event::EditInput),
            KeyCode::Char('n') | KeyCode::Char('N') => self.dispatch(Event::NewAnalysis),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Notice;
    use crate::domain::{
        FacilityInput, HealthReport, PredictionResult, RiskLevel, TopFeature,
    };
    use crate::ports::{ApiError, ExportError, ReportPage};
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeApi {
        response: Result<PredictionResult, ApiError>,
    }

    impl RiskApi for FakeApi {
        fn check_health(&self) -> HealthReport {
            HealthReport::offline()
        }

        fn top_features(&self) -> Vec<TopFeature> {
            vec![TopFeature {
                name: "TOT_PAT_DAYS_FOR".into(),
            }]
        }

        fn predict(&self, _input: &FacilityInput) -> Result<PredictionResult, ApiError> {
            self.response.clone()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        pages: Mutex<Vec<ReportPage>>,
    }

    impl ReportSink for MemorySink {
        fn write(
            &self,
            pages: &[ReportPage],
            _date: chrono::NaiveDate,
        ) -> std::result::Result<PathBuf, ExportError> {
            if let Ok(mut stored) = self.pages.lock() {
                stored.extend_from_slice(pages);
            }
            Ok(PathBuf::from("report.docx"))
        }
    }

    fn app_with(response: Result<PredictionResult, ApiError>) -> (App, Arc<MemorySink>) {
        let config = Config {
            min_loading: Duration::ZERO,
            ..Config::default()
        };
        let sink = Arc::new(MemorySink::default());
        let app = App::with_dependencies(
            &config,
            Arc::new(FakeApi { response }),
            Arc::clone(&sink) as Arc<dyn ReportSink>,
        );
        (app, sink)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    /// Tick until `done` holds or a second passes.
    fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(1);
        while !done(app) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            app.tick(Instant::now());
        }
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("terminal");
        terminal.draw(|f| app.draw(f)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn scored(score: f64) -> PredictionResult {
        PredictionResult {
            risk_score: Some(score),
            risk_level: Some(RiskLevel::from_score(score)),
            ..Default::default()
        }
    }

    #[test]
    fn test_startup_fetches_arrive() {
        let (mut app, _) = app_with(Ok(scored(0.2)));
        settle(&mut app, |a| !a.state.top_features().is_empty());
        assert_eq!(app.state.top_features().len(), 1);
        assert!(draw(&mut app).contains("Start Risk Assessment"));
    }

    #[test]
    fn test_typed_value_commits_and_submission_reaches_results() {
        let (mut app, _) = app_with(Ok(scored(0.85)));
        settle(&mut app, |a| !a.state.top_features().is_empty());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.screen(), Screen::ParameterInput);
        assert!(draw(&mut app).contains("High Impact"));

        press(&mut app, KeyCode::Down);
        for c in "2500".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.screen(), Screen::Loading);
        assert_eq!(
            app.state.input().and_then(|i| i.number("TOT_PAT_DAYS_FOR")),
            Some(2500.0)
        );
        assert!(draw(&mut app).contains("Did You Know?"));

        settle(&mut app, |a| a.state.screen() == Screen::Results);
        assert_eq!(app.state.screen(), Screen::Results);
        assert!(draw(&mut app).contains("HIGH RISK"));
    }

    #[test]
    fn test_failure_shows_notice_and_keeps_input() {
        let (mut app, _) = app_with(Err(ApiError::Server {
            status: 503,
            detail: Some("Model not loaded".into()),
        }));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Right);
        let edited = app.state.input().cloned();
        press(&mut app, KeyCode::Enter);

        settle(&mut app, |a| a.state.notice().is_some());
        assert_eq!(app.state.screen(), Screen::ParameterInput);
        assert_eq!(app.state.input().cloned(), edited);
        assert_eq!(
            app.state.notice(),
            Some(&Notice::Error(
                "Failed to calculate risk: Model not loaded".into()
            ))
        );
        assert!(draw(&mut app).contains("Model not loaded"));

        press(&mut app, KeyCode::Enter);
        assert!(app.state.notice().is_none());
    }

    #[test]
    fn test_county_picker_sets_region() {
        let (mut app, _) = app_with(Ok(scored(0.1)));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.county_picker.is_some());
        assert!(draw(&mut app).contains("Select County"));

        // Third entry in the major-county list is San Diego.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(app.county_picker.is_none());
        assert_eq!(
            app.state
                .input()
                .and_then(|i| i.get("HSA"))
                .and_then(FieldValue::as_text),
            Some("14 - San Diego/Imperial")
        );
    }

    #[test]
    fn test_export_from_results() {
        let (mut app, sink) = app_with(Ok(scored(0.5)));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app, |a| a.state.screen() == Screen::Results);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(
            app.state.notice(),
            Some(&Notice::Info("Report saved to report.docx".into()))
        );
        let pages = sink.pages.lock().expect("lock");
        assert!(!pages.is_empty());
        assert!(pages[0].rows.iter().any(|r| r.contains("MEDIUM RISK")));
    }

    #[test]
    fn test_escape_cancels_loading() {
        let config = Config {
            min_loading: Duration::from_secs(30),
            ..Config::default()
        };
        let mut app = App::with_dependencies(
            &config,
            Arc::new(FakeApi {
                response: Ok(scored(0.9)),
            }),
            Arc::new(MemorySink::default()),
        );
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.screen(), Screen::Loading);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.screen(), Screen::ParameterInput);
        settle(&mut app, |a| a.workers.pending_predictions() == 0);
        app.tick(Instant::now() + Duration::from_secs(60));
        assert_eq!(app.state.screen(), Screen::ParameterInput);
        assert!(app.reveal_timers.is_empty());
    }
}
