//! End-to-end assessment flow without a terminal: wizard reducer, background
//! workers against a fake prediction service, and document export.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use careenforced::adapters::DocxReportSink;
use careenforced::application::report_export::{PAGE_COLUMNS, PAGE_ROWS};
use careenforced::application::{
    reduce, AssessmentService, Effect, Event, Notice, ReportExporter, Screen, Transition,
    WizardState,
};
use careenforced::domain::{
    FacilityInput, FieldValue, HealthReport, ImpactLevel, PredictionResult, Recommendation,
    RiskDriver, RiskLevel, TopFeature,
};
use careenforced::ports::{ApiError, RiskApi};
use careenforced::tui::{rasterize, AssessmentWorkers, WorkerUpdate};
use careenforced::FacilityKind;

const WAIT: Duration = Duration::from_secs(2);

fn sample_result() -> PredictionResult {
    PredictionResult {
        risk_score: Some(0.42),
        risk_level: Some(RiskLevel::Medium),
        top_risk_drivers: vec![
            RiskDriver {
                feature: "TOT_PAT_DAYS_FOR".into(),
                contribution: 0.21,
            },
            RiskDriver {
                feature: "EXP_ADMN".into(),
                contribution: -0.05,
            },
        ],
        recommendations: vec![Recommendation {
            title: "Review staffing levels".into(),
            description: "Compare nurse hours per patient day against the regional median."
                .into(),
            impact: ImpactLevel::Medium,
        }],
        explanation_type: Some("shap".into()),
    }
}

/// Fake service that records submissions and optionally holds predictions
/// until the test releases them.
struct FakeService {
    submitted: Mutex<Vec<FacilityInput>>,
    gate: Option<Mutex<Receiver<()>>>,
}

impl FakeService {
    fn immediate() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn gated() -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let service = Self {
            submitted: Mutex::new(Vec::new()),
            gate: Some(Mutex::new(rx)),
        };
        (service, tx)
    }
}

impl RiskApi for FakeService {
    fn check_health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".into(),
            model_loaded: Some(true),
        }
    }

    fn top_features(&self) -> Vec<TopFeature> {
        vec![TopFeature {
            name: "TOT_PAT_DAYS_FOR".into(),
        }]
    }

    fn predict(&self, input: &FacilityInput) -> Result<PredictionResult, ApiError> {
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(input.clone());
        }
        if let Some(gate) = &self.gate {
            let released = gate.lock().map(|rx| rx.recv_timeout(WAIT).is_ok());
            if !matches!(released, Ok(true)) {
                return Err(ApiError::Transport("gate never opened".into()));
            }
        }
        Ok(sample_result())
    }
}

/// Minimal host loop: apply effects, feed worker updates back as events.
struct Driver {
    state: WizardState,
    workers: AssessmentWorkers<FakeService>,
    scheduled: Vec<Effect>,
}

impl Driver {
    fn new(api: Arc<FakeService>, min_loading: Duration) -> Self {
        let workers = AssessmentWorkers::new(AssessmentService::new(api));
        let Transition { state, effects } = WizardState::boot(min_loading);
        let mut driver = Self {
            state,
            workers,
            scheduled: Vec::new(),
        };
        driver.apply(effects);
        driver
    }

    fn send(&mut self, event: Event) {
        let state = std::mem::replace(&mut self.state, WizardState::new(Duration::ZERO));
        let Transition { state, effects } = reduce(state, event);
        self.state = state;
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CheckHealth => self.workers.spawn_health_check(),
                Effect::FetchTopFeatures => self.workers.spawn_top_features(),
                Effect::RequestPrediction { ticket, input } => {
                    self.workers.spawn_prediction(ticket, input);
                }
                Effect::CancelPrediction { ticket } => self.workers.cancel(ticket),
                other => self.scheduled.push(other),
            }
        }
    }

    /// Deliver worker updates until `done` holds or the wait runs out.
    fn pump_until(&mut self, done: impl Fn(&WizardState) -> bool) {
        let deadline = Instant::now() + WAIT;
        while !done(&self.state) && Instant::now() < deadline {
            let Some(update) = self.workers.recv_timeout(Duration::from_millis(20)) else {
                continue;
            };
            let event = match update {
                WorkerUpdate::Health(health) => Event::HealthChecked(health),
                WorkerUpdate::TopFeatures(features) => Event::TopFeaturesLoaded(features),
                WorkerUpdate::Prediction { ticket, outcome } => match outcome {
                    Ok(result) => Event::PredictionSucceeded {
                        ticket,
                        result,
                        now: Instant::now(),
                    },
                    Err(message) => Event::PredictionFailed { ticket, message },
                },
            };
            self.send(event);
        }
    }

    fn open_form(&mut self, kind: FacilityKind) {
        self.send(Event::Start);
        self.send(Event::SelectFacility(kind));
        assert_eq!(self.state.screen(), Screen::ParameterInput);
    }
}

#[test]
fn submission_reaches_results_and_exports() {
    let api = Arc::new(FakeService::immediate());
    let mut driver = Driver::new(Arc::clone(&api), Duration::ZERO);
    driver.pump_until(|s| !s.top_features().is_empty());

    driver.open_form(FacilityKind::LongTermCare);
    driver.send(Event::SetField {
        key: "TOT_PAT_DAYS_FOR".into(),
        value: FieldValue::Number(22_000.0),
    });
    driver.send(Event::Submit { now: Instant::now() });
    assert_eq!(driver.state.screen(), Screen::Loading);

    driver.pump_until(|s| s.screen() == Screen::Results);
    assert_eq!(driver.state.screen(), Screen::Results);

    let submitted = api.submitted.lock().map(|s| s.clone()).unwrap_or_default();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].number("TOT_PAT_DAYS_FOR"), Some(22_000.0));

    driver.send(Event::ExportRequested);
    let report = match driver.scheduled.pop() {
        Some(Effect::ExportReport { report }) => report,
        other => panic!("expected export effect, got {other:?}"),
    };
    assert_eq!(report.percentage_label(), "42.0%");

    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = ReportExporter::new(Arc::new(DocxReportSink::new(dir.path())));
    let rows = rasterize(&report, PAGE_COLUMNS);
    assert!(rows.len() < PAGE_ROWS * 3);

    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
    let outcome = exporter.export(&rows, date).map_err(|e| e.to_string());
    let path = outcome.clone().expect("export succeeds");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("CareEnforced_Risk_Report_2024-03-09.docx")
    );
    assert!(std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));

    driver.send(Event::ExportFinished(outcome));
    assert!(!driver.state.is_exporting());
    assert!(matches!(driver.state.notice(), Some(Notice::Info(msg)) if msg.starts_with("Report saved to")));
}

#[test]
fn early_response_waits_for_the_loading_gate() {
    let api = Arc::new(FakeService::immediate());
    let gate = Duration::from_secs(5);
    let mut driver = Driver::new(api, gate);

    driver.open_form(FacilityKind::Hospital);
    driver.send(Event::Submit { now: Instant::now() });
    driver.pump_until(|s| s.awaiting_reveal().is_some());

    assert_eq!(driver.state.screen(), Screen::Loading);
    let (ticket, delay) = match driver.scheduled.pop() {
        Some(Effect::ScheduleReveal { ticket, delay }) => (ticket, delay),
        other => panic!("expected scheduled reveal, got {other:?}"),
    };
    assert!(delay > Duration::ZERO && delay <= gate);

    driver.send(Event::RevealResults { ticket });
    assert_eq!(driver.state.screen(), Screen::Results);
    assert_eq!(
        driver.state.report().map(|r| r.kind),
        Some(FacilityKind::Hospital)
    );
}

#[test]
fn cancelled_prediction_is_never_delivered() {
    let (service, release) = FakeService::gated();
    let api = Arc::new(service);
    let mut driver = Driver::new(Arc::clone(&api), Duration::ZERO);
    driver.pump_until(|s| !s.top_features().is_empty());

    driver.open_form(FacilityKind::LongTermCare);
    driver.send(Event::Submit { now: Instant::now() });
    let ticket = driver.state.in_flight().expect("submission in flight");

    driver.send(Event::CancelLoading);
    assert_eq!(driver.state.screen(), Screen::ParameterInput);
    assert_eq!(driver.workers.pending_predictions(), 0);

    release.send(()).expect("worker waiting on gate");

    let deadline = Instant::now() + Duration::from_millis(300);
    while Instant::now() < deadline {
        if let Some(WorkerUpdate::Prediction { ticket: got, .. }) =
            driver.workers.recv_timeout(Duration::from_millis(20))
        {
            panic!("cancelled prediction {got} was delivered (submitted {ticket})");
        }
    }
    assert_eq!(driver.state.screen(), Screen::ParameterInput);
    assert!(driver.state.report().is_none());
}
