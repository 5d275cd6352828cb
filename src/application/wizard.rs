//! Assessment wizard state machine.
//!
//! Every transition goes through [`reduce`], a pure function of the current
//! state and one event. Side effects (network calls, timers, export) come back
//! as [`Effect`] values for the caller to execute; their outcomes return as
//! events. Timestamps are part of the events, so the loading gate can be
//! exercised without sleeping.
//!
//! ```text
//! Welcome -> FacilityTypeSelect -> ParameterInput -> Loading -> Results
//!                  ^                   |    ^           |          |
//!                  +---- new analysis -+    +-- failure -+          |
//!                  +------------------------ new analysis ---------+
//!                                      ^------------ edit ---------+
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::CareEnforcedError;
use crate::domain::{
    FacilityInput, FacilityKind, FieldKind, FieldValue, HealthReport, HsaRegion,
    PredictionResult, RegionSelector, Report, TopFeature,
};

/// Default minimum time the loading screen stays up.
pub const MIN_LOADING: Duration = Duration::from_millis(7_000);

/// Screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    FacilityTypeSelect,
    ParameterInput,
    Loading,
    Results,
}

/// Identifies one submission. A newer ticket retires all older ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reachability of the prediction service, from the startup health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Online,
    Offline,
}

/// Blocking message shown over the current screen until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    ticket: Ticket,
    started_at: Instant,
}

/// A response held back by the loading gate.
#[derive(Debug, Clone, PartialEq)]
struct Arrived {
    ticket: Ticket,
    result: PredictionResult,
}

/// Complete wizard state. Only [`reduce`] produces new values.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    screen: Screen,
    min_loading: Duration,
    input: Option<FacilityInput>,
    report: Option<Report>,
    in_flight: Option<InFlight>,
    arrived: Option<Arrived>,
    next_ticket: u64,
    notice: Option<Notice>,
    backend: BackendStatus,
    top_features: Vec<TopFeature>,
    exporting: bool,
}

/// Everything that can happen to the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    ReturnHome,
    SelectFacility(FacilityKind),
    SetField { key: String, value: FieldValue },
    /// Typed text for a field; unparsable numbers become 0.
    EditField { key: String, text: String },
    NudgeField { key: String, steps: i32 },
    SelectCounty(String),
    Submit { now: Instant },
    PredictionSucceeded {
        ticket: Ticket,
        result: PredictionResult,
        now: Instant,
    },
    PredictionFailed { ticket: Ticket, message: String },
    RevealResults { ticket: Ticket },
    CancelLoading,
    ShowResults,
    EditInput,
    NewAnalysis,
    HealthChecked(HealthReport),
    TopFeaturesLoaded(Vec<TopFeature>),
    ExportRequested,
    ExportFinished(Result<PathBuf, String>),
    DismissNotice,
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CheckHealth,
    FetchTopFeatures,
    RequestPrediction { ticket: Ticket, input: FacilityInput },
    CancelPrediction { ticket: Ticket },
    /// Deliver `RevealResults { ticket }` after `delay`.
    ScheduleReveal { ticket: Ticket, delay: Duration },
    ExportReport { report: Report },
}

/// Result of one reduction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WizardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn only(state: WizardState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(state: WizardState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }
}

impl WizardState {
    /// Fresh state on the welcome screen.
    #[must_use]
    pub fn new(min_loading: Duration) -> Self {
        Self {
            screen: Screen::Welcome,
            min_loading,
            input: None,
            report: None,
            in_flight: None,
            arrived: None,
            next_ticket: 1,
            notice: None,
            backend: BackendStatus::Checking,
            top_features: Vec::new(),
            exporting: false,
        }
    }

    /// Fresh state plus the two independent startup fetches.
    #[must_use]
    pub fn boot(min_loading: Duration) -> Transition {
        Transition::with(
            Self::new(min_loading),
            vec![Effect::CheckHealth, Effect::FetchTopFeatures],
        )
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn input(&self) -> Option<&FacilityInput> {
        self.input.as_ref()
    }

    #[must_use]
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn backend(&self) -> BackendStatus {
        self.backend
    }

    #[must_use]
    pub fn top_features(&self) -> &[TopFeature] {
        &self.top_features
    }

    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    #[must_use]
    pub fn min_loading(&self) -> Duration {
        self.min_loading
    }

    /// Submission whose response is still outstanding.
    #[must_use]
    pub fn in_flight(&self) -> Option<Ticket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }

    /// Submission whose response is waiting for the gate to open.
    #[must_use]
    pub fn awaiting_reveal(&self) -> Option<Ticket> {
        self.arrived.as_ref().map(|a| a.ticket)
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Retire any outstanding submission.
    fn retire_submission(&mut self) -> Vec<Effect> {
        self.arrived = None;
        self.in_flight
            .take()
            .map(|f| Effect::CancelPrediction { ticket: f.ticket })
            .into_iter()
            .collect()
    }

    fn reset_to(&mut self, screen: Screen) -> Vec<Effect> {
        let effects = self.retire_submission();
        self.screen = screen;
        self.input = None;
        self.report = None;
        effects
    }
}

/// Apply `event` to `state`.
#[must_use]
pub fn reduce(mut state: WizardState, event: Event) -> Transition {
    match event {
        Event::Start => {
            if state.screen == Screen::Welcome {
                state.screen = Screen::FacilityTypeSelect;
            }
            Transition::only(state)
        }

        Event::ReturnHome => {
            if state.screen == Screen::FacilityTypeSelect {
                state.screen = Screen::Welcome;
            }
            Transition::only(state)
        }

        Event::SelectFacility(kind) => {
            if state.screen == Screen::FacilityTypeSelect {
                state.input = Some(FacilityInput::defaults(kind));
                state.report = None;
                state.notice = None;
                state.screen = Screen::ParameterInput;
            }
            Transition::only(state)
        }

        Event::SetField { key, value } => edit_input(state, |input| input.set(&key, value)),

        Event::EditField { key, text } => {
            edit_input(state, |input| input.set_from_text(&key, &text))
        }

        Event::NudgeField { key, steps } => edit_input(state, |input| input.nudge(&key, steps)),

        Event::SelectCounty(county) => edit_input(state, |input| select_county(input, &county)),

        Event::Submit { now } => submit(state, now),

        Event::PredictionSucceeded {
            ticket,
            result,
            now,
        } => {
            let Some(in_flight) = state.in_flight.take_if(|f| f.ticket == ticket) else {
                tracing::debug!("Dropping response for retired submission {}", ticket);
                return Transition::only(state);
            };

            let elapsed = now.saturating_duration_since(in_flight.started_at);
            let delay = state.min_loading.saturating_sub(elapsed);
            state.arrived = Some(Arrived { ticket, result });

            if delay.is_zero() {
                reveal(state, ticket)
            } else {
                Transition::with(state, vec![Effect::ScheduleReveal { ticket, delay }])
            }
        }

        Event::PredictionFailed { ticket, message } => {
            if state.in_flight.take_if(|f| f.ticket == ticket).is_none() {
                tracing::debug!("Dropping failure for retired submission {}", ticket);
                return Transition::only(state);
            }
            state.screen = Screen::ParameterInput;
            state.notice = Some(Notice::Error(message));
            Transition::only(state)
        }

        Event::RevealResults { ticket } => reveal(state, ticket),

        Event::CancelLoading => {
            if state.screen != Screen::Loading {
                return Transition::only(state);
            }
            let effects = state.retire_submission();
            state.screen = Screen::ParameterInput;
            state.notice = Some(Notice::Info("Assessment cancelled.".to_string()));
            Transition::with(state, effects)
        }

        Event::ShowResults => {
            if state.report.is_some() {
                state.screen = Screen::Results;
                Transition::only(state)
            } else {
                let effects = state.reset_to(Screen::Welcome);
                Transition::with(state, effects)
            }
        }

        Event::EditInput => {
            if state.screen == Screen::Results && state.input.is_some() {
                state.screen = Screen::ParameterInput;
            }
            Transition::only(state)
        }

        Event::NewAnalysis => {
            if matches!(
                state.screen,
                Screen::Results | Screen::ParameterInput | Screen::Loading
            ) {
                state.notice = None;
                let effects = state.reset_to(Screen::FacilityTypeSelect);
                return Transition::with(state, effects);
            }
            Transition::only(state)
        }

        Event::HealthChecked(health) => {
            state.backend = if health.is_healthy() {
                BackendStatus::Online
            } else {
                BackendStatus::Offline
            };
            Transition::only(state)
        }

        Event::TopFeaturesLoaded(features) => {
            state.top_features = features;
            Transition::only(state)
        }

        Event::ExportRequested => {
            if state.screen != Screen::Results || state.exporting {
                return Transition::only(state);
            }
            match state.report.clone() {
                Some(report) => {
                    state.exporting = true;
                    Transition::with(state, vec![Effect::ExportReport { report }])
                }
                None => Transition::only(state),
            }
        }

        Event::ExportFinished(outcome) => {
            state.exporting = false;
            state.notice = Some(match outcome {
                Ok(path) => Notice::Info(format!("Report saved to {}", path.display())),
                Err(message) => Notice::Error(format!(
                    "Failed to generate report: {message}. Please try again."
                )),
            });
            Transition::only(state)
        }

        Event::DismissNotice => {
            state.notice = None;
            Transition::only(state)
        }
    }
}

/// Apply `edit` on the form. A report computed from different values no
/// longer describes the input, so it is dropped once a value changes.
fn edit_input(
    mut state: WizardState,
    edit: impl FnOnce(&mut FacilityInput) -> bool,
) -> Transition {
    if state.screen != Screen::ParameterInput {
        return Transition::only(state);
    }
    let Some(input) = state.input.as_mut() else {
        return Transition::only(state);
    };

    let before = input.clone();
    if edit(input) && *input != before && state.report.take().is_some() {
        tracing::debug!("Input changed; previous results discarded");
    }
    Transition::only(state)
}

/// Route `county` through a selector seeded with the current region.
/// Unmapped counties leave the input untouched.
fn select_county(input: &mut FacilityInput, county: &str) -> bool {
    let Some(field) = input
        .kind()
        .fields()
        .iter()
        .find(|f| matches!(f.kind, FieldKind::Region { .. }))
    else {
        return false;
    };
    let current = input
        .get(field.key)
        .and_then(FieldValue::as_text)
        .and_then(HsaRegion::from_label)
        .unwrap_or_default();

    let mut selector = RegionSelector::new(current);
    if selector.select_county(county).is_none() {
        return false;
    }
    input.set(field.key, FieldValue::Text(selector.selected().label().to_string()))
}

fn submit(mut state: WizardState, now: Instant) -> Transition {
    if state.screen != Screen::ParameterInput {
        return Transition::only(state);
    }
    let Some(input) = state.input.clone() else {
        return Transition::only(state);
    };

    if let Err(errors) = input.validate() {
        let problems = CareEnforcedError::Validation(errors.join("; "));
        state.notice = Some(Notice::Error(problems.user_message()));
        return Transition::only(state);
    }

    let mut effects = state.retire_submission();
    let ticket = state.issue_ticket();
    state.in_flight = Some(InFlight {
        ticket,
        started_at: now,
    });
    state.notice = None;
    state.screen = Screen::Loading;
    effects.push(Effect::RequestPrediction { ticket, input });

    Transition::with(state, effects)
}

fn reveal(mut state: WizardState, ticket: Ticket) -> Transition {
    let Some(arrived) = state.arrived.take_if(|a| a.ticket == ticket) else {
        return Transition::only(state);
    };
    let kind = match state.input.as_ref() {
        Some(input) => input.kind(),
        None => return Transition::only(state),
    };

    match arrived.result.into_report(kind) {
        Some(report) => {
            tracing::info!(
                "Assessment {} complete: {} risk ({})",
                ticket,
                report.risk_level,
                report.percentage_label()
            );
            state.report = Some(report);
            state.screen = Screen::Results;
            Transition::only(state)
        }
        None => {
            tracing::warn!(
                "Assessment {} returned neither a risk score nor a category; returning to start",
                ticket
            );
            let effects = state.reset_to(Screen::Welcome);
            Transition::with(state, effects)
        }
    }
}
