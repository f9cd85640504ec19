//! The four hazard pipelines
//!
//! Each pipeline owns its fitted preprocessing objects and estimator and
//! follows the same lifecycle: `fit` on a loaded DataFrame, inspect
//! `metrics`/`feature_importance`, `predict` single records, persist via
//! [`crate::artifact`].

pub mod cyclone;
pub mod erosion;
pub mod pollution;
pub mod storm;

pub use cyclone::{CycloneFormationModel, CycloneRecord};
pub use erosion::{ErosionRiskModel, ErosionRecord};
pub use pollution::{PollutionRecord, PollutionRiskModel};
pub use storm::{StormAlertModel, StormPrediction, StormRecord};

use crate::error::{HazardError, Result};
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Which hazard a model or artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Erosion,
    Cyclone,
    Storm,
    Pollution,
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HazardKind::Erosion => "erosion",
            HazardKind::Cyclone => "cyclone",
            HazardKind::Storm => "storm",
            HazardKind::Pollution => "pollution",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for HazardKind {
    type Err = HazardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "erosion" | "coastal_erosion" => Ok(HazardKind::Erosion),
            "cyclone" => Ok(HazardKind::Cyclone),
            "storm" => Ok(HazardKind::Storm),
            "pollution" => Ok(HazardKind::Pollution),
            other => Err(HazardError::InvalidInput(format!(
                "unknown hazard kind: {}",
                other
            ))),
        }
    }
}

/// Extract the numeric fields of a record as a name → value map.
/// Non-numeric fields (e.g. categorical strings) are skipped.
pub(crate) fn numeric_fields<T: Serialize>(record: &T) -> Result<BTreeMap<String, f64>> {
    let value = serde_json::to_value(record)?;
    let obj = value
        .as_object()
        .ok_or_else(|| HazardError::InvalidInput("record must be a JSON object".to_string()))?;

    let mut map = BTreeMap::new();
    for (k, v) in obj {
        if let Some(f) = v.as_f64() {
            map.insert(k.clone(), f);
        }
    }
    Ok(map)
}

/// Assemble a single-row feature matrix following `feature_order`.
/// Columns absent from `fields` are filled with zero and logged.
pub(crate) fn assemble_features(
    fields: &BTreeMap<String, f64>,
    feature_order: &[String],
) -> Result<Array2<f64>> {
    let mut missing: Vec<&str> = Vec::new();
    let row: Vec<f64> = feature_order
        .iter()
        .map(|name| match fields.get(name) {
            Some(&v) => v,
            None => {
                missing.push(name.as_str());
                0.0
            }
        })
        .collect();

    if !missing.is_empty() {
        warn!(columns = ?missing, "Filling absent feature columns with zero");
    }

    Array2::from_shape_vec((1, feature_order.len()), row).map_err(HazardError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Sample {
        a: f64,
        b: f64,
        label: String,
    }

    #[test]
    fn test_hazard_kind_round_trip() {
        for kind in ["erosion", "cyclone", "storm", "pollution"] {
            let parsed: HazardKind = kind.parse().unwrap();
            assert_eq!(parsed.to_string(), kind);
        }
        assert!("tsunami".parse::<HazardKind>().is_err());
    }

    #[test]
    fn test_numeric_fields_skips_strings() {
        let sample = Sample {
            a: 1.5,
            b: 2.5,
            label: "x".to_string(),
        };
        let fields = numeric_fields(&sample).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["a"], 1.5);
    }

    #[test]
    fn test_assemble_zero_fills_missing() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), 3.0);

        let order = vec!["a".to_string(), "b".to_string()];
        let x = assemble_features(&fields, &order).unwrap();
        assert_eq!(x[[0, 0]], 3.0);
        assert_eq!(x[[0, 1]], 0.0);
    }
}
