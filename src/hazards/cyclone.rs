//! Cyclone formation probability model
//!
//! Random-forest regressor over atmospheric and sea-surface measurements.
//! Features are used unscaled on both the training and inference paths.

use super::{assemble_features, numeric_fields};
use crate::data::{column_to_array1, columns_to_array2};
use crate::error::{HazardError, Result};
use crate::preprocessing::{Imputer, ImputeStrategy};
use crate::training::{
    cross_val_r2, mean_absolute_error, mean_squared_error, r2_score, rank_importances,
    train_test_split, FeatureImportance, ForestParams, RandomForest, RegressionMetrics, Stratify,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Target column for cyclone training data
pub const TARGET_COLUMN: &str = "cyclone_formation_probability";

fn feature_columns() -> Vec<String> {
    [
        "central_pressure",
        "wind_speed",
        "wind_shear",
        "sea_surface_temp",
        "cloud_top_temp",
        "vorticity",
        "convective_activity",
        "humidity",
        "precipitation",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_params() -> ForestParams {
    ForestParams {
        n_estimators: 100,
        max_depth: Some(10),
        min_samples_split: 5,
        min_samples_leaf: 2,
    }
}

/// A single cyclone observation, as received by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycloneRecord {
    pub central_pressure: f64,
    pub wind_speed: f64,
    pub wind_shear: f64,
    pub sea_surface_temp: f64,
    pub cloud_top_temp: f64,
    pub vorticity: f64,
    pub convective_activity: f64,
    pub humidity: f64,
    pub precipitation: f64,
}

/// Cyclone formation probability pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycloneFormationModel {
    random_state: u64,
    feature_columns: Vec<String>,
    imputer: Imputer,
    forest: Option<RandomForest>,
    metrics: Option<RegressionMetrics>,
}

impl CycloneFormationModel {
    /// Create an unfitted model
    pub fn new(random_state: u64) -> Self {
        Self {
            random_state,
            feature_columns: feature_columns(),
            imputer: Imputer::new(ImputeStrategy::Mean),
            forest: None,
            metrics: None,
        }
    }

    /// Train on a loaded DataFrame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let filled = self.imputer.fit_transform(df, &self.feature_columns)?;

        df.column(TARGET_COLUMN)
            .map_err(|_| HazardError::TargetNotFound(TARGET_COLUMN.to_string()))?;
        let y = column_to_array1(df, TARGET_COLUMN)?;

        let x = columns_to_array2(&filled, &self.feature_columns)?;
        info!(
            rows = x.nrows(),
            features = x.ncols(),
            "Cyclone training data prepared"
        );

        // Stratify the split over 5 equal-width bins of the target
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, self.random_state, Stratify::Bins(5))?;

        let params = default_params();
        let mut forest = params.build_regressor(self.random_state);
        forest.fit(&x_train, &y_train)?;

        let train_pred = forest.predict(&x_train)?;
        let test_pred = forest.predict(&x_test)?;
        let cv = cross_val_r2(&x_train, &y_train, &params, 5, self.random_state)?;

        self.metrics = Some(RegressionMetrics {
            train_mse: mean_squared_error(&y_train, &train_pred),
            test_mse: mean_squared_error(&y_test, &test_pred),
            train_mae: mean_absolute_error(&y_train, &train_pred),
            test_mae: mean_absolute_error(&y_test, &test_pred),
            train_r2: r2_score(&y_train, &train_pred),
            test_r2: r2_score(&y_test, &test_pred),
            cv_r2_mean: cv.mean,
            n_train_samples: y_train.len(),
            n_test_samples: y_test.len(),
        });
        self.forest = Some(forest);

        info!("Cyclone model training completed");
        Ok(self)
    }

    /// Predict the formation probability for one record (unscaled features)
    pub fn predict(&self, record: &CycloneRecord) -> Result<f64> {
        let forest = self.forest.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let fields = numeric_fields(record)?;
        let x = assemble_features(&fields, &self.feature_columns)?;
        Ok(forest.predict(&x)?[0])
    }

    /// Held-out metrics from the last fit
    pub fn metrics(&self) -> Option<&RegressionMetrics> {
        self.metrics.as_ref()
    }

    /// Feature importances sorted descending
    pub fn feature_importance(&self) -> Result<Vec<FeatureImportance>> {
        let forest = self.forest.as_ref().ok_or(HazardError::ModelNotFitted)?;
        let importances = forest
            .feature_importances()
            .ok_or(HazardError::ModelNotFitted)?;
        Ok(rank_importances(&self.feature_columns, importances))
    }

    /// The ordered list of columns the fitted estimator expects
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Number of fitted trees (0 before fit)
    pub fn n_trees(&self) -> usize {
        self.forest.as_ref().map_or(0, |f| f.n_trees())
    }

    pub fn is_fitted(&self) -> bool {
        self.forest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn training_frame(n: usize) -> DataFrame {
        // Probability tracks a smooth function of the inputs
        let mut cols: Vec<Column> = Vec::new();
        for (k, name) in feature_columns().iter().enumerate() {
            let values: Vec<f64> = (0..n)
                .map(|i| (i as f64 / n as f64) * 10.0 + k as f64)
                .collect();
            cols.push(Column::new(name.as_str().into(), values));
        }
        let target: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        cols.push(Column::new(TARGET_COLUMN.into(), target));
        DataFrame::new(cols).unwrap()
    }

    fn sample_record(level: f64) -> CycloneRecord {
        CycloneRecord {
            central_pressure: level,
            wind_speed: level + 1.0,
            wind_shear: level + 2.0,
            sea_surface_temp: level + 3.0,
            cloud_top_temp: level + 4.0,
            vorticity: level + 5.0,
            convective_activity: level + 6.0,
            humidity: level + 7.0,
            precipitation: level + 8.0,
        }
    }

    #[test]
    fn test_fit_and_predict_ordering() {
        let df = training_frame(50);
        let mut model = CycloneFormationModel::new(42);
        model.fit(&df).unwrap();

        let low = model.predict(&sample_record(0.5)).unwrap();
        let high = model.predict(&sample_record(9.5)).unwrap();
        assert!(high > low, "higher inputs should score higher: {} vs {}", high, low);
        assert!((0.0..=1.0).contains(&low));
    }

    #[test]
    fn test_regression_metrics() {
        let df = training_frame(50);
        let mut model = CycloneFormationModel::new(42);
        model.fit(&df).unwrap();

        let metrics = model.metrics().unwrap();
        assert!(metrics.test_r2 > 0.5, "test R² too low: {}", metrics.test_r2);
        assert!(metrics.test_mse >= 0.0);
    }

    #[test]
    fn test_missing_target_fails() {
        let df = training_frame(20).drop(TARGET_COLUMN).unwrap();
        let mut model = CycloneFormationModel::new(42);
        assert!(matches!(
            model.fit(&df),
            Err(HazardError::TargetNotFound(_))
        ));
    }
}
