//! Feature scaling

use crate::error::{HazardError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean
    scale: f64,  // std
}

/// Standard scaler (z-score normalization): (x - mean) / std.
///
/// Fitted on a fixed-order feature matrix; columns with zero variance get
/// scale 1.0 so transform stays finite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to a matrix whose columns follow `columns` order
    pub fn fit(&mut self, x: &Array2<f64>, columns: &[String]) -> Result<&mut Self> {
        if x.ncols() != columns.len() {
            return Err(HazardError::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let n = x.nrows() as f64;
        let mut params = Vec::with_capacity(columns.len());

        for j in 0..x.ncols() {
            let col = x.column(j);
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            params.push(ScalerParams {
                center: mean,
                scale: if std == 0.0 { 1.0 } else { std },
            });
        }

        self.columns = columns.to_vec();
        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a matrix using the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_shape(x)?;
        let mut out = x.clone();
        for (j, p) in self.params.iter().enumerate() {
            out.column_mut(j).mapv_inplace(|v| (v - p.center) / p.scale);
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, columns: &[String]) -> Result<Array2<f64>> {
        self.fit(x, columns)?;
        self.transform(x)
    }

    /// Map scaled values back to the original feature space
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_shape(x)?;
        let mut out = x.clone();
        for (j, p) in self.params.iter().enumerate() {
            out.column_mut(j).mapv_inplace(|v| v * p.scale + p.center);
        }
        Ok(out)
    }

    fn check_shape(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(HazardError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(HazardError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }

    /// Column names the scaler was fitted on, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the scaler has been fitted
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_standard_scaling() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &cols(&["a"])).unwrap();

        let mean: f64 = scaled.column(0).sum() / 5.0;
        assert!(mean.abs() < 1e-10);
    }

    #[test]
    fn test_zero_variance_column() {
        let x = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &cols(&["a", "b"])).unwrap();

        // Constant column scales to zero, not NaN
        for v in scaled.column(1) {
            assert_eq!(*v, 0.0);
        }
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &cols(&["a", "b"])).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (orig, rest) in x.iter().zip(restored.iter()) {
            assert!((orig - rest).abs() < 1e-10);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0, 2.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x, &cols(&["a", "b"])).unwrap();

        let bad = array![[1.0]];
        assert!(matches!(
            scaler.transform(&bad),
            Err(HazardError::ShapeError { .. })
        ));
    }
}
