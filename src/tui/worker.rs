//! Background workers for blocking service calls.
//!
//! Each request runs on its own thread and reports back over a shared mpsc
//! channel that the UI loop drains without blocking. Predictions carry their
//! wizard ticket and a cancel flag; a cancelled prediction never reports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::application::{AssessmentService, Ticket};
use crate::domain::{FacilityInput, HealthReport, PredictionResult, TopFeature};
use crate::ports::RiskApi;

/// Updates from background workers.
#[derive(Debug, Clone)]
pub enum WorkerUpdate {
    Health(HealthReport),
    TopFeatures(Vec<TopFeature>),
    Prediction {
        ticket: Ticket,
        /// Error holds the user-facing message.
        outcome: Result<PredictionResult, String>,
    },
}

/// Spawns service calls and collects their results.
pub struct AssessmentWorkers<A>
where
    A: RiskApi + ?Sized + 'static,
{
    service: AssessmentService<A>,
    tx: Sender<WorkerUpdate>,
    rx: Receiver<WorkerUpdate>,
    cancel_flags: HashMap<Ticket, Arc<AtomicBool>>,
}

impl<A> AssessmentWorkers<A>
where
    A: RiskApi + ?Sized + 'static,
{
    pub fn new(service: AssessmentService<A>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            cancel_flags: HashMap::new(),
        }
    }

    pub fn spawn_health_check(&self) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(WorkerUpdate::Health(service.health()));
        });
    }

    pub fn spawn_top_features(&self) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(WorkerUpdate::TopFeatures(service.top_features()));
        });
    }

    pub fn spawn_prediction(&mut self, ticket: Ticket, input: FacilityInput) {
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel_flags.insert(ticket, Arc::clone(&cancel));

        let service = self.service.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = service.assess(&input).map_err(|e| e.user_message());

            if cancel.load(Ordering::Acquire) {
                tracing::debug!("Prediction {} finished after cancellation; discarded", ticket);
                return;
            }
            let _ = tx.send(WorkerUpdate::Prediction { ticket, outcome });
        });
    }

    /// Suppress delivery of `ticket`'s result. The HTTP call itself runs to
    /// completion or timeout.
    pub fn cancel(&mut self, ticket: Ticket) {
        if let Some(flag) = self.cancel_flags.remove(&ticket) {
            flag.store(true, Ordering::Release);
            tracing::debug!("Cancelled prediction {}", ticket);
        }
    }

    /// Predictions still running and not cancelled.
    #[must_use]
    pub fn pending_predictions(&self) -> usize {
        self.cancel_flags.len()
    }

    /// Next finished update, if any (non-blocking).
    pub fn try_recv(&mut self) -> Option<WorkerUpdate> {
        let update = self.rx.try_recv().ok()?;
        if let WorkerUpdate::Prediction { ticket, .. } = &update {
            self.cancel_flags.remove(ticket);
        }
        Some(update)
    }

    /// Wait for the next update (for tests and headless use).
    pub fn recv_timeout(&mut self, timeout: std::time::Duration) -> Option<WorkerUpdate> {
        let update = self.rx.recv_timeout(timeout).ok()?;
        if let WorkerUpdate::Prediction { ticket, .. } = &update {
            self.cancel_flags.remove(ticket);
        }
        Some(update)
    }
}
