//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (prediction service, report sink).

mod report_sink;
mod risk_api;

pub use report_sink::{ExportError, ReportPage, ReportSink};
pub use risk_api::{ApiError, RiskApi};
