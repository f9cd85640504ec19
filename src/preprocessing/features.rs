//! Ratio feature engineering
//!
//! Derived columns of the form `numerator / (denominator + 1e-6)`, computed
//! from two raw feature columns before scaling.

use crate::error::{HazardError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Epsilon added to ratio denominators to avoid division by zero
pub const RATIO_EPS: f64 = 1e-6;

/// A derived ratio feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioFeature {
    /// Name of the derived column
    pub name: String,
    /// Numerator column
    pub numerator: String,
    /// Denominator column
    pub denominator: String,
}

impl RatioFeature {
    pub fn new(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    /// Compute the ratio for a single record
    pub fn compute(&self, numerator: f64, denominator: f64) -> f64 {
        numerator / (denominator + RATIO_EPS)
    }

    /// Append the derived column to a DataFrame.
    /// A no-op when either source column is absent.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let (num, den) = match (df.column(&self.numerator), df.column(&self.denominator)) {
            (Ok(num), Ok(den)) => (num, den),
            _ => return Ok(df.clone()),
        };

        let num = num
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| HazardError::DataError(e.to_string()))?;
        let den = den
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| HazardError::DataError(e.to_string()))?;

        let num = num
            .f64()
            .map_err(|e| HazardError::DataError(e.to_string()))?;
        let den = den
            .f64()
            .map_err(|e| HazardError::DataError(e.to_string()))?;

        let values: Float64Chunked = num
            .into_iter()
            .zip(den.into_iter())
            .map(|(n, d)| match (n, d) {
                (Some(n), Some(d)) => Some(self.compute(n, d)),
                _ => None,
            })
            .collect();

        let mut result = df.clone();
        result
            .with_column(values.with_name(self.name.as_str().into()).into_series())
            .map_err(|e| HazardError::DataError(e.to_string()))?;
        Ok(result)
    }
}
