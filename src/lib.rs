//! # CareEnforced
//!
//! Terminal client for healthcare-facility enforcement-risk assessment.
//!
//! This crate provides:
//! - A five-screen assessment wizard with a minimum-duration loading gate
//! - An HTTP client for the external risk prediction service
//! - A results report with gauges, driver bars and a paginated document export
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (facility input schemas, regions, prediction results)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (HTTP client, DOCX export, log sanitizing)
//! - `application`: Wizard state machine and assessment use cases
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::Config;
pub use domain::{FacilityInput, FacilityKind, PredictionResult, RiskLevel};

/// Result type for CareEnforced operations
pub type Result<T> = std::result::Result<T, CareEnforcedError>;

/// Main error type for CareEnforced
#[derive(Debug, thiserror::Error)]
pub enum CareEnforcedError {
    #[error("Prediction service error: {0}")]
    Api(#[from] ports::ApiError),

    #[error("Report export failed: {0}")]
    Export(#[from] ports::ExportError),

    #[error("Invalid facility input: {0}")]
    Validation(String),
}

impl CareEnforcedError {
    /// Message shown in the notice popup.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Export(e) => e.to_string(),
            Self::Validation(problems) => format!("Please correct the following: {problems}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_per_variant() {
        let err = CareEnforcedError::from(ports::ApiError::Transport("Connection refused".into()));
        assert_eq!(err.user_message(), "Failed to calculate risk: Connection refused");

        let err = CareEnforcedError::from(ports::ExportError::EmptyReport);
        assert_eq!(err.user_message(), "Nothing to export");
        assert_eq!(err.to_string(), "Report export failed: Nothing to export");

        let err = CareEnforcedError::Validation("Net Income ($): Out of range".into());
        assert_eq!(
            err.user_message(),
            "Please correct the following: Net Income ($): Out of range"
        );
    }
}
