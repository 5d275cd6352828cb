//! Facility kinds and their input schemas.
//!
//! Field metadata is static data; the wizard never branches on field keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::region::HsaRegion;

/// Kind of healthcare facility being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    /// Skilled nursing, assisted living, long-term care centers
    #[serde(rename = "longterm")]
    LongTermCare,
    /// Acute care and community hospitals
    Hospital,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 2] = [Self::LongTermCare, Self::Hospital];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::LongTermCare => "Long-Term Care Facility",
            Self::Hospital => "Hospital",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::LongTermCare => {
                "Skilled nursing facilities, assisted living, and long-term care centers"
            }
            Self::Hospital => "Acute care hospitals, community hospitals, and medical centers",
        }
    }

    /// Path of the prediction endpoint for this kind.
    #[must_use]
    pub fn predict_path(&self) -> &'static str {
        match self {
            Self::LongTermCare => "/predict",
            Self::Hospital => "/predict/hospital",
        }
    }

    /// Input schema in display order.
    #[must_use]
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::LongTermCare => &LONG_TERM_CARE_FIELDS,
            Self::Hospital => &HOSPITAL_FIELDS,
        }
    }

    /// The hospital schema is exactly the model's top features.
    #[must_use]
    pub fn all_fields_high_impact(&self) -> bool {
        matches!(self, Self::Hospital)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }
}

impl std::fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// How a field is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Number {
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    /// Health Service Area picked through the county selector
    Region { default: HsaRegion },
}

/// Static metadata for one input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn number(
        key: &'static str,
        label: &'static str,
        description: &'static str,
        (min, max, step): (f64, f64, f64),
        default: f64,
    ) -> Self {
        Self {
            key,
            label,
            description,
            kind: FieldKind::Number {
                min,
                max,
                step,
                default,
            },
        }
    }

    #[must_use]
    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Number { default, .. } => FieldValue::Number(default),
            FieldKind::Region { default } => FieldValue::Text(default.label().to_string()),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), String> {
        match (self.kind, value) {
            (FieldKind::Number { min, max, .. }, FieldValue::Number(v)) => {
                if !v.is_finite() {
                    Err(format!("{}: Invalid number", self.label))
                } else if *v < min || *v > max {
                    Err(format!(
                        "{}: Value must be between {} and {}",
                        self.label, min, max
                    ))
                } else {
                    Ok(())
                }
            }
            (FieldKind::Region { .. }, FieldValue::Text(label)) => {
                if HsaRegion::from_label(label).is_some() {
                    Ok(())
                } else {
                    Err(format!("{}: Unknown region '{}'", self.label, label))
                }
            }
            _ => Err(format!("{}: Wrong value type", self.label)),
        }
    }
}

const LONG_TERM_CARE_FIELDS: [FieldSpec; 9] = [
    FieldSpec {
        key: "HSA",
        label: "Health Service Area",
        description: "Geographic region of the facility",
        kind: FieldKind::Region {
            default: HsaRegion::LosAngeles,
        },
    },
    FieldSpec::number(
        "TOT_PAT_DAYS_FOR",
        "Total Patient Days",
        "Total patient days for the reporting period",
        (0.0, 50_000.0, 100.0),
        15_000.0,
    ),
    FieldSpec::number(
        "HFPA",
        "HFPA (Healthcare Facility Patient Assessment)",
        "Healthcare facility patient-day assessment value",
        (0.0, 5_000.0, 10.0),
        500.0,
    ),
    FieldSpec::number(
        "DISCHARGES_7_MONTHS_AND_LT_1_YR",
        "Discharges (7-12 Months)",
        "Number of patient discharges between 7 and 12 months",
        (0.0, 500.0, 1.0),
        50.0,
    ),
    FieldSpec::number(
        "DISCHARGES_3_MONTHS_AND_LT_7_MONTHS",
        "Discharges (3-7 Months)",
        "Number of patient discharges between 3 and 7 months",
        (0.0, 500.0, 1.0),
        30.0,
    ),
    FieldSpec::number(
        "EXP_ADMN",
        "Administrative Expenses ($)",
        "Total administrative expenses",
        (0.0, 5_000_000.0, 1_000.0),
        200_000.0,
    ),
    FieldSpec::number(
        "SN_PAT_DAYS_FOR",
        "Skilled Nursing Patient Days",
        "Total skilled nursing patient days",
        (0.0, 40_000.0, 100.0),
        12_000.0,
    ),
    FieldSpec::number(
        "PPE_BED",
        "Property & Equipment per Bed ($)",
        "Property and equipment value per licensed bed",
        (0.0, 100_000.0, 100.0),
        15_000.0,
    ),
    FieldSpec::number(
        "TOT_LIC_BEDS",
        "Total Licensed Beds",
        "Total number of licensed beds in facility",
        (1.0, 500.0, 1.0),
        100.0,
    ),
];

const HOSPITAL_FIELDS: [FieldSpec; 10] = [
    FieldSpec::number(
        "OUTPATIENT_AVG_PER_SURGERY",
        "Outpatient Average Per Surgery (minutes)",
        "Average time per outpatient surgical procedure",
        (30.0, 600.0, 5.0),
        180.0,
    ),
    FieldSpec::number(
        "TOT_ALOS_PY",
        "Total Average Length of Stay - Previous Year (days)",
        "Average patient length of stay from previous year",
        (1.0, 30.0, 0.1),
        4.5,
    ),
    FieldSpec::number(
        "PEDIATRIC_ALOS_PY",
        "Pediatric Average Length of Stay - Previous Year (days)",
        "Average pediatric patient length of stay from previous year",
        (1.0, 20.0, 0.1),
        3.2,
    ),
    FieldSpec::number(
        "NET_INCOME",
        "Net Income ($)",
        "Total net income (profit or loss)",
        (-5_000_000.0, 10_000_000.0, 10_000.0),
        500_000.0,
    ),
    FieldSpec::number(
        "EMS_VISITS_CRITICAL_ADMITTED",
        "Critical EMS Visits Admitted",
        "Number of critical emergency visits resulting in admission",
        (0.0, 1_000.0, 1.0),
        150.0,
    ),
    FieldSpec::number(
        "EMS_VISITS_CRITICAL_TOT",
        "Total Critical EMS Visits",
        "Total number of critical emergency medical service visits",
        (0.0, 2_000.0, 1.0),
        200.0,
    ),
    FieldSpec::number(
        "CONST_PROG",
        "Construction in Progress ($)",
        "Value of ongoing construction projects",
        (0.0, 10_000_000.0, 10_000.0),
        100_000.0,
    ),
    FieldSpec::number(
        "GR_IP_MCAR_TR",
        "Gross Inpatient Medicare Revenue ($)",
        "Gross revenue from Medicare inpatient services",
        (0.0, 20_000_000.0, 10_000.0),
        2_000_000.0,
    ),
    FieldSpec::number(
        "INC_INVEST",
        "Investment Income ($)",
        "Income generated from investments",
        (0.0, 1_000_000.0, 1_000.0),
        50_000.0,
    ),
    FieldSpec::number(
        "GR_OP_THRD_TR",
        "Gross Outpatient Third Party Revenue ($)",
        "Gross revenue from third-party outpatient services",
        (0.0, 20_000_000.0, 10_000.0),
        1_500_000.0,
    ),
];

/// A single field value as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// Form values for one facility kind, keyed by field key.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityInput {
    kind: FacilityKind,
    values: BTreeMap<String, FieldValue>,
}

impl FacilityInput {
    /// Input pre-seeded with the schema defaults.
    #[must_use]
    pub fn defaults(kind: FacilityKind) -> Self {
        let values = kind
            .fields()
            .iter()
            .map(|spec| (spec.key.to_string(), spec.default_value()))
            .collect();
        Self { kind, values }
    }

    #[must_use]
    pub fn kind(&self) -> FacilityKind {
        self.kind
    }

    /// Values as submitted in the `features` object.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    /// Set a field value. Keys outside the schema are rejected.
    pub fn set(&mut self, key: &str, value: FieldValue) -> bool {
        if self.kind.field(key).is_none() {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    /// Set a numeric field from user text; unparsable text becomes 0.
    pub fn set_from_text(&mut self, key: &str, text: &str) -> bool {
        let Some(spec) = self.kind.field(key) else {
            return false;
        };
        let value = match spec.kind {
            FieldKind::Number { .. } => FieldValue::Number(parse_or_zero(text)),
            FieldKind::Region { .. } => FieldValue::Text(text.to_string()),
        };
        self.set(key, value)
    }

    /// Move a numeric field by `steps` increments, clamped to its bounds.
    pub fn nudge(&mut self, key: &str, steps: i32) -> bool {
        let Some(FieldKind::Number { min, max, step, .. }) = self.kind.field(key).map(|f| f.kind)
        else {
            return false;
        };
        let current = self.number(key).unwrap_or(min);
        let next = (current + step * f64::from(steps)).clamp(min, max);
        // Keep decimal steps such as 0.1 from accumulating float noise.
        let next = (next * 1e6).round() / 1e6;
        self.set(key, FieldValue::Number(next))
    }

    /// Check that every schema field is present with a valid value.
    ///
    /// # Errors
    /// Returns one message per offending field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .kind
            .fields()
            .iter()
            .filter_map(|spec| match self.values.get(spec.key) {
                None => Some(format!("{}: Missing value", spec.label)),
                Some(value) => spec.check(value).err(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parse a user-entered number; anything unparsable or non-finite is 0.
#[must_use]
fn parse_or_zero(text: &str) -> f64 {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Feature name reported by `/top-features`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopFeature {
    pub name: String,
}

/// Whether a field should carry the "High Impact" badge.
///
/// Long-term-care fields match when any top feature name contains the first
/// `_`-separated segment of the field key.
#[must_use]
pub fn is_high_impact(kind: FacilityKind, key: &str, top_features: &[TopFeature]) -> bool {
    if kind.all_fields_high_impact() {
        return true;
    }
    let prefix = key.split('_').next().unwrap_or(key);
    top_features.iter().any(|f| f.name.contains(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete_and_valid() {
        for kind in FacilityKind::ALL {
            let input = FacilityInput::defaults(kind);
            assert_eq!(input.values().len(), kind.fields().len());
            assert!(input.validate().is_ok(), "{kind} defaults must validate");
        }
    }

    #[test]
    fn test_long_term_care_default_region() {
        let input = FacilityInput::defaults(FacilityKind::LongTermCare);
        assert_eq!(
            input.get("HSA").and_then(FieldValue::as_text),
            Some("11 - Los Angeles")
        );
        assert_eq!(input.number("TOT_LIC_BEDS"), Some(100.0));
    }

    #[test]
    fn test_invalid_text_parses_to_zero() {
        let mut input = FacilityInput::defaults(FacilityKind::Hospital);
        assert!(input.set_from_text("NET_INCOME", "lots"));
        assert_eq!(input.number("NET_INCOME"), Some(0.0));

        assert!(input.set_from_text("NET_INCOME", "1,250,000"));
        assert_eq!(input.number("NET_INCOME"), Some(1_250_000.0));

        assert!(input.set_from_text("TOT_ALOS_PY", ""));
        assert_eq!(input.number("TOT_ALOS_PY"), Some(0.0));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut input = FacilityInput::defaults(FacilityKind::Hospital);
        assert!(!input.set("HSA", FieldValue::Text("11 - Los Angeles".into())));
        assert!(input.get("HSA").is_none());
    }

    #[test]
    fn test_validation_reports_out_of_range_fields() {
        let mut input = FacilityInput::defaults(FacilityKind::LongTermCare);
        input.set("TOT_LIC_BEDS", FieldValue::Number(0.0));
        input.set("HSA", FieldValue::Text("99 - Nowhere".into()));

        let errors = input.validate().expect_err("should fail");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.starts_with("Total Licensed Beds")));
        assert!(errors.iter().any(|e| e.starts_with("Health Service Area")));
    }

    #[test]
    fn test_nudge_clamps_and_rounds() {
        let mut input = FacilityInput::defaults(FacilityKind::Hospital);
        input.nudge("TOT_ALOS_PY", 1);
        assert_eq!(input.number("TOT_ALOS_PY"), Some(4.6));

        input.nudge("EMS_VISITS_CRITICAL_TOT", -1_000);
        assert_eq!(input.number("EMS_VISITS_CRITICAL_TOT"), Some(0.0));

        assert!(!input.nudge("DOES_NOT_EXIST", 1));
    }

    #[test]
    fn test_wire_shape() {
        let input = FacilityInput::defaults(FacilityKind::LongTermCare);
        let json = serde_json::to_value(input.values()).expect("serialize");
        assert_eq!(json["HSA"], "11 - Los Angeles");
        assert_eq!(json["HFPA"], 500.0);
    }

    #[test]
    fn test_high_impact_rule() {
        let top = vec![
            TopFeature {
                name: "TOT_PAT_DAYS_FOR".into(),
            },
            TopFeature {
                name: "num__HFPA".into(),
            },
        ];
        let kind = FacilityKind::LongTermCare;
        assert!(is_high_impact(kind, "TOT_LIC_BEDS", &top));
        assert!(is_high_impact(kind, "HFPA", &top));
        assert!(!is_high_impact(kind, "PPE_BED", &top));
        assert!(!is_high_impact(kind, "PPE_BED", &[]));
        assert!(is_high_impact(FacilityKind::Hospital, "NET_INCOME", &[]));
    }
}
