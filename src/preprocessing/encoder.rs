//! Label encoding for categorical values

use crate::error::{HazardError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Maps categorical labels to integer codes and back.
///
/// Classes are stored sorted, so code `i` is the i-th label in
/// lexicographic order. Probability vectors produced by classifiers are
/// indexed by the same ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
    is_fitted: bool,
}

impl LabelEncoder {
    /// Create a new, unfitted encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the encoder to a string series
    pub fn fit(&mut self, series: &Series) -> Result<&mut Self> {
        let ca = series
            .str()
            .map_err(|e| HazardError::DataError(e.to_string()))?;

        let mut classes: Vec<String> = ca
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(HazardError::EncodingError(
                "no labels to fit encoder on".to_string(),
            ));
        }

        self.classes = classes;
        self.is_fitted = true;
        Ok(self)
    }

    /// Encode a single label to its integer code
    pub fn transform(&self, label: &str) -> Result<f64> {
        if !self.is_fitted {
            return Err(HazardError::ModelNotFitted);
        }
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| i as f64)
            .ok_or_else(|| HazardError::EncodingError(format!("unknown label: {}", label)))
    }

    /// Encode a string series to integer codes
    pub fn transform_series(&self, series: &Series) -> Result<Vec<f64>> {
        let ca = series
            .str()
            .map_err(|e| HazardError::DataError(e.to_string()))?;

        ca.into_iter()
            .map(|opt| match opt {
                Some(label) => self.transform(label),
                None => Err(HazardError::EncodingError(
                    "null label in series".to_string(),
                )),
            })
            .collect()
    }

    /// Fit and encode in one step
    pub fn fit_transform(&mut self, series: &Series) -> Result<Vec<f64>> {
        self.fit(series)?;
        self.transform_series(series)
    }

    /// Map an integer code back to its original label
    pub fn inverse_transform(&self, code: f64) -> Result<&str> {
        if !self.is_fitted {
            return Err(HazardError::ModelNotFitted);
        }
        let idx = code.round() as usize;
        self.classes
            .get(idx)
            .map(|s| s.as_str())
            .ok_or_else(|| HazardError::EncodingError(format!("unknown class code: {}", code)))
    }

    /// Ordered class labels (code `i` maps to `classes()[i]`)
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the encoder has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_classes() {
        let series = Series::new("risk".into(), &["Medium", "Low", "High", "Low"]);
        let mut encoder = LabelEncoder::new();
        encoder.fit(&series).unwrap();

        assert_eq!(encoder.classes(), &["High", "Low", "Medium"]);
    }

    #[test]
    fn test_round_trip() {
        let series = Series::new("risk".into(), &["Low", "High", "Low"]);
        let mut encoder = LabelEncoder::new();
        let codes = encoder.fit_transform(&series).unwrap();

        assert_eq!(codes, vec![1.0, 0.0, 1.0]);
        assert_eq!(encoder.inverse_transform(1.0).unwrap(), "Low");
        assert_eq!(encoder.inverse_transform(0.0).unwrap(), "High");
    }

    #[test]
    fn test_unknown_label() {
        let series = Series::new("risk".into(), &["Low", "High"]);
        let mut encoder = LabelEncoder::new();
        encoder.fit(&series).unwrap();

        assert!(matches!(
            encoder.transform("Severe"),
            Err(HazardError::EncodingError(_))
        ));
    }
}
