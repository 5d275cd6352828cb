//! HTTP client for the prediction service, using ureq.
//!
//! Endpoints:
//! - `GET  /health`
//! - `GET  /top-features`
//! - `POST /predict` and `POST /predict/hospital` with `{"features": {...}}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::config::Config;
use crate::domain::{FacilityInput, FieldValue, HealthReport, PredictionResult, TopFeature};
use crate::ports::{ApiError, RiskApi};

#[derive(Serialize)]
struct PredictRequest<'a> {
    features: &'a BTreeMap<String, FieldValue>,
}

#[derive(Deserialize)]
struct TopFeaturesPayload {
    #[serde(default)]
    top_features: Vec<TopFeature>,
}

/// Blocking client for the risk prediction service.
pub struct HttpRiskApi {
    agent: Agent,
    base_url: String,
}

impl HttpRiskApi {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.http_timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: Agent::new_with_config(agent_config),
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut response = self
            .agent
            .get(&self.url(path))
            .call()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail: None,
            });
        }

        response
            .body_mut()
            .read_json::<T>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl RiskApi for HttpRiskApi {
    fn check_health(&self) -> HealthReport {
        match self.get_json::<HealthReport>("/health") {
            Ok(report) => {
                tracing::info!(
                    "Prediction service status: {} (model loaded: {:?})",
                    report.status,
                    report.model_loaded
                );
                report
            }
            Err(e) => {
                tracing::warn!("Health check against {} failed: {}", self.base_url, e);
                HealthReport::offline()
            }
        }
    }

    fn top_features(&self) -> Vec<TopFeature> {
        match self.get_json::<TopFeaturesPayload>("/top-features") {
            Ok(payload) => {
                tracing::debug!("Loaded {} top features", payload.top_features.len());
                payload.top_features
            }
            Err(e) => {
                tracing::warn!("Failed to get top features: {}", e);
                Vec::new()
            }
        }
    }

    fn predict(&self, input: &FacilityInput) -> Result<PredictionResult, ApiError> {
        let path = input.kind().predict_path();
        tracing::debug!("POST {}{}", self.base_url, path);

        let body = PredictRequest {
            features: input.values(),
        };
        let mut response = self
            .agent
            .post(&self.url(path))
            .send_json(&body)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.body_mut().read_to_string().unwrap_or_default();
            tracing::warn!("Prediction request returned {}: {}", status, text);
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail: error_detail(&text),
            });
        }

        response
            .body_mut()
            .read_json::<PredictionResult>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Extract the `detail` field from an error body.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
