//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! Field schemas and the county table are static data.

mod facility;
mod prediction;
pub mod region;

pub use facility::{
    is_high_impact, FacilityInput, FacilityKind, FieldKind, FieldSpec, FieldValue, TopFeature,
};
pub use prediction::{
    bar_fractions, HealthReport, ImpactLevel, PredictionResult, Recommendation, Report,
    RiskDriver, RiskLevel,
};
pub use region::{HsaRegion, RegionSelector};
