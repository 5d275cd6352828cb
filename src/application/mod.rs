//! Application layer: Use cases and the wizard state machine.
//!
//! This module orchestrates domain logic with ports to implement
//! the assessment flow.

mod assessment;
pub mod report_export;
pub mod wizard;

pub use assessment::AssessmentService;
pub use report_export::{paginate, ReportExporter};
pub use wizard::{
    reduce, BackendStatus, Effect, Event, Notice, Screen, Ticket, Transition, WizardState,
};
