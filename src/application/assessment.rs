//! Assessment service: Runs risk predictions against the remote service.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{FacilityInput, HealthReport, PredictionResult, TopFeature};
use crate::ports::RiskApi;
use crate::{CareEnforcedError, Result};

/// Service wrapping a [`RiskApi`] with timing and logging.
pub struct AssessmentService<A>
where
    A: RiskApi + ?Sized,
{
    api: Arc<A>,
}

impl<A> Clone for AssessmentService<A>
where
    A: RiskApi + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A> AssessmentService<A>
where
    A: RiskApi + ?Sized,
{
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Probe the service. Never fails.
    pub fn health(&self) -> HealthReport {
        self.api.check_health()
    }

    /// Fetch the features used for "High Impact" badges. Never fails.
    pub fn top_features(&self) -> Vec<TopFeature> {
        self.api.top_features()
    }

    /// Submit `input` for scoring.
    ///
    /// # Errors
    /// Returns `Validation` without calling the service when a field is out of
    /// bounds, `Api` when the call fails.
    pub fn assess(&self, input: &FacilityInput) -> Result<PredictionResult> {
        let kind = input.kind();
        input
            .validate()
            .map_err(|problems| CareEnforcedError::Validation(problems.join("; ")))?;
        tracing::info!("Requesting {} risk assessment", kind);

        let start = Instant::now();
        let result = self.api.predict(input);
        let elapsed = start.elapsed();

        match &result {
            Ok(prediction) => tracing::info!(
                "{} assessment answered in {:?} (score: {:?}, drivers: {}, recommendations: {})",
                kind,
                elapsed,
                prediction.risk_score,
                prediction.top_risk_drivers.len(),
                prediction.recommendations.len()
            ),
            Err(e) => tracing::warn!("{} assessment failed after {:?}: {:?}", kind, elapsed, e),
        }

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FacilityKind, FieldValue};
    use crate::ports::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingApi {
        calls: AtomicUsize,
        response: std::result::Result<PredictionResult, ApiError>,
    }

    impl RiskApi for CountingApi {
        fn check_health(&self) -> HealthReport {
            HealthReport::offline()
        }

        fn top_features(&self) -> Vec<TopFeature> {
            Vec::new()
        }

        fn predict(
            &self,
            _input: &FacilityInput,
        ) -> std::result::Result<PredictionResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn service(
        response: std::result::Result<PredictionResult, ApiError>,
    ) -> (AssessmentService<CountingApi>, Arc<CountingApi>) {
        let api = Arc::new(CountingApi {
            calls: AtomicUsize::new(0),
            response,
        });
        (AssessmentService::new(Arc::clone(&api)), api)
    }

    #[test]
    fn test_invalid_input_never_reaches_service() {
        let (service, api) = service(Ok(PredictionResult::default()));
        let mut input = FacilityInput::defaults(FacilityKind::LongTermCare);
        input.set("TOT_LIC_BEDS", FieldValue::Number(-1.0));

        let err = service.assess(&input).expect_err("out of range");
        assert!(matches!(err, CareEnforcedError::Validation(_)));
        assert!(err.user_message().starts_with("Please correct the following: "));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_api_failure_keeps_its_message() {
        let (service, api) = service(Err(ApiError::Server {
            status: 400,
            detail: Some("Model not loaded".into()),
        }));
        let err = service
            .assess(&FacilityInput::defaults(FacilityKind::Hospital))
            .expect_err("server error");
        assert_eq!(err.user_message(), "Failed to calculate risk: Model not loaded");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }
}
