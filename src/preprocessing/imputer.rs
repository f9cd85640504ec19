//! Missing value imputation

use crate::error::{HazardError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for imputing missing numeric values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column mean
    Mean,
    /// Replace with the column median
    Median,
}

/// Imputer for handling missing values in numeric feature columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, f64>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| HazardError::FeatureNotFound(col_name.clone()))?;

            let ca = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| HazardError::DataError(e.to_string()))?;
            let ca = ca
                .f64()
                .map_err(|e| HazardError::DataError(e.to_string()))?
                .clone();

            let fill_value = match self.strategy {
                ImputeStrategy::Mean => ca.mean().unwrap_or(0.0),
                ImputeStrategy::Median => ca.median().unwrap_or(0.0),
            };
            self.fill_values.insert(col_name.clone(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by filling nulls with the fitted values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(HazardError::ModelNotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if let Ok(col) = df.column(col_name) {
                let ca = col
                    .as_materialized_series()
                    .cast(&DataType::Float64)
                    .map_err(|e| HazardError::DataError(e.to_string()))?;
                let ca = ca
                    .f64()
                    .map_err(|e| HazardError::DataError(e.to_string()))?
                    .clone();

                let filled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*fill_value)))
                    .collect();

                result = result
                    .with_column(filled.with_name(col_name.as_str().into()).into_series())
                    .map_err(|e| HazardError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted fill value for a column, if any
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values.get(column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_imputation() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[Some(1.0), None, Some(3.0), Some(5.0)],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Median);
        let result = imputer
            .fit_transform(&df, &["a".to_string()])
            .unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        // Median of [1, 3, 5] = 3
        assert!((col.get(1).unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_imputation() {
        let df = DataFrame::new(vec![Column::new(
            "a".into(),
            &[Some(1.0), None, Some(3.0), Some(4.0)],
        )])
        .unwrap();

        let mut imputer = Imputer::new(ImputeStrategy::Mean);
        let result = imputer.fit_transform(&df, &["a".to_string()]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        assert!((col.get(1).unwrap() - 8.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = df!("a" => &[1.0, 2.0]).unwrap();
        let imputer = Imputer::new(ImputeStrategy::Mean);
        assert!(matches!(
            imputer.transform(&df),
            Err(HazardError::ModelNotFitted)
        ));
    }
}
