//! Risk API port: Trait for the external prediction service.
//!
//! This trait abstracts the HTTP transport from the wizard and its workers.

use crate::domain::{FacilityInput, HealthReport, PredictionResult, TopFeature};

/// Errors that can occur when requesting a prediction.
///
/// The user-facing message is the same for every variant; the split exists for logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),

    #[error("{}", server_message(.status, .detail))]
    Server { status: u16, detail: Option<String> },

    #[error("Malformed response: {0}")]
    Decode(String),
}

fn server_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("Request failed with status code {status}"),
    }
}

impl ApiError {
    /// Message shown to the user after a failed submission.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Failed to calculate risk: {self}")
    }
}

/// Trait for the remote risk prediction service.
///
/// Health and feature lookups never fail; they degrade to fallback values.
pub trait RiskApi: Send + Sync {
    /// Query `/health`. Returns the offline sentinel when unreachable.
    fn check_health(&self) -> HealthReport;

    /// Query `/top-features`. Returns an empty list when unreachable.
    fn top_features(&self) -> Vec<TopFeature>;

    /// Submit `input` to the prediction endpoint of its facility kind.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or an unreadable body.
    fn predict(&self, input: &FacilityInput) -> Result<PredictionResult, ApiError>;
}
