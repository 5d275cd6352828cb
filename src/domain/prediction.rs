//! Prediction result types.
//!
//! `PredictionResult` mirrors the service payload as received. `Report` is the
//! checked form the results view renders.

use serde::{Deserialize, Serialize};

use super::facility::FacilityKind;

/// Risk category assigned by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Category for a score, using the service's thresholds.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            Self::Low
        } else if score < 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// "What this means" guidance for the category.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::High => "This facility should prioritize immediate compliance improvements and closely monitor all risk factors.",
            Self::Medium => "This facility should address identified risk factors proactively to prevent escalation.",
            Self::Low => "This facility maintains good compliance standards. Continue monitoring to sustain performance.",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Expected impact of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unspecified,
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
            Self::Unspecified => write!(f, "-"),
        }
    }
}

/// One feature's contribution to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDriver {
    pub feature: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(default = "unspecified_impact")]
    pub impact: ImpactLevel,
}

fn unspecified_impact() -> ImpactLevel {
    ImpactLevel::Unspecified
}

/// Payload returned by `/predict` and `/predict/hospital`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(default)]
    pub risk_score: Option<f64>,

    #[serde(default, alias = "risk_category")]
    pub risk_level: Option<RiskLevel>,

    #[serde(default)]
    pub top_risk_drivers: Vec<RiskDriver>,

    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    /// `shap` or `feature_importance` when the service reports it
    #[serde(default)]
    pub explanation_type: Option<String>,
}

impl PredictionResult {
    /// Whether the payload carries enough to render a report.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.risk_score.is_some() || self.risk_level.is_some()
    }

    /// Convert into a renderable report for `kind`.
    ///
    /// Returns `None` when both the score and the category are absent.
    #[must_use]
    pub fn into_report(self, kind: FacilityKind) -> Option<Report> {
        if !self.is_renderable() {
            return None;
        }

        let risk_score = self.risk_score.map(|s| s.clamp(0.0, 1.0));
        let risk_level = self
            .risk_level
            .or_else(|| risk_score.map(RiskLevel::from_score))?;

        Some(Report {
            kind,
            risk_score,
            risk_level,
            drivers: self.top_risk_drivers,
            recommendations: self.recommendations,
            generated_at: chrono::Utc::now(),
        })
    }
}

/// A checked prediction ready for the results view.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: FacilityKind,
    pub risk_score: Option<f64>,
    pub risk_level: RiskLevel,
    pub drivers: Vec<RiskDriver>,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl Report {
    /// Score as a percentage with one decimal, e.g. `42.0%`.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        match self.risk_score {
            Some(score) => format!("{:.1}%", score * 100.0),
            None => "n/a".to_string(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Based on the facility parameters you provided, this facility has a {} probability ({}) of enforcement action.",
            self.risk_level.to_string().to_lowercase(),
            self.percentage_label()
        )
    }

    /// Driver bar widths relative to the largest contribution.
    #[must_use]
    pub fn driver_fractions(&self) -> Vec<f64> {
        bar_fractions(&self.drivers)
    }
}

/// Bar width of each driver as a fraction of the maximum contribution.
///
/// A non-positive maximum yields zero-width bars.
#[must_use]
pub fn bar_fractions(drivers: &[RiskDriver]) -> Vec<f64> {
    let max = drivers
        .iter()
        .map(|d| d.contribution)
        .fold(f64::NEG_INFINITY, f64::max);

    drivers
        .iter()
        .map(|d| {
            if max > 0.0 && d.contribution.is_finite() {
                (d.contribution / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Payload of `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

impl HealthReport {
    /// Sentinel returned when the service cannot be reached.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            status: "offline".to_string(),
            model_loaded: None,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
