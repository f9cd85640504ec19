//! Storm alert level model
//!
//! Random-forest classifier over water-level, wave, tide, current, wind and
//! atmospheric measurements. Predicts a risk level plus per-class
//! probabilities.

use super::{assemble_features, numeric_fields};
use crate::data::{column_to_array1, columns_to_array2};
use crate::error::{HazardError, Result};
use crate::preprocessing::{Imputer, ImputeStrategy, LabelEncoder, StandardScaler};
use crate::training::{
    accuracy, cross_val_accuracy, rank_importances, search_forest_classifier, train_test_split,
    weighted_precision_recall_f1, ClassificationMetrics, FeatureImportance, ForestParamGrid,
    ForestParams, RandomForest, Stratify,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Target column for storm training data
pub const TARGET_COLUMN: &str = "risk_level";

fn feature_columns() -> Vec<String> {
    [
        "water_level",
        "surge_height",
        "wave_height",
        "wave_period",
        "wave_direction",
        "tidal_level",
        "tidal_range",
        "current_speed",
        "current_direction",
        "wind_speed",
        "wind_direction",
        "wind_gusts",
        "atmospheric_pressure",
        "pressure_trend",
        "air_temperature",
        "sea_surface_temp",
        "flood_depth",
        "inundation_area",
        "drainage_rate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_params() -> ForestParams {
    ForestParams {
        n_estimators: 200,
        max_depth: Some(15),
        min_samples_split: 5,
        min_samples_leaf: 2,
    }
}

fn tuning_grid() -> ForestParamGrid {
    ForestParamGrid {
        n_estimators: vec![100, 200, 300],
        max_depth: vec![Some(10), Some(15), Some(20), None],
        min_samples_split: vec![2, 5, 10],
        min_samples_leaf: vec![1, 2, 4],
    }
}

/// A single storm observation, as received by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormRecord {
    pub water_level: f64,
    pub surge_height: f64,
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_direction: f64,
    pub tidal_level: f64,
    pub tidal_range: f64,
    pub current_speed: f64,
    pub current_direction: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub wind_gusts: f64,
    pub atmospheric_pressure: f64,
    pub pressure_trend: f64,
    pub air_temperature: f64,
    pub sea_surface_temp: f64,
    pub flood_depth: f64,
    pub inundation_area: f64,
    pub drainage_rate: f64,
}

/// A storm prediction: the winning label and the full probability map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormPrediction {
    pub risk_level: String,
    /// Probability per class label; sums to 1.0 within tolerance
    pub class_probabilities: BTreeMap<String, f64>,
}

/// Storm alert level pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormAlertModel {
    random_state: u64,
    feature_columns: Vec<String>,
    imputer: Imputer,
    scaler: StandardScaler,
    label_encoder: LabelEncoder,
    forest: Option<RandomForest>,
    metrics: Option<ClassificationMetrics>,
}

impl StormAlertModel {
    /// Create an unfitted model
    pub fn new(random_state: u64) -> Self {
        Self {
            random_state,
            feature_columns: feature_columns(),
            imputer: Imputer::new(ImputeStrategy::Median),
            scaler: StandardScaler::new(),
            label_encoder: LabelEncoder::new(),
            forest: None,
            metrics: None,
        }
    }

    /// Train on a loaded DataFrame. `tune` runs the hyperparameter grid
    /// search instead of the fixed default configuration.
    pub fn fit(&mut self, df: &DataFrame, tune: bool) -> Result<&mut Self> {
        let present: Vec<String> = self
            .feature_columns
            .iter()
            .filter(|c| df.column(c).is_ok())
            .cloned()
            .collect();
        let dropped: Vec<&String> = self
            .feature_columns
            .iter()
            .filter(|c| !present.contains(*c))
            .collect();
        if !dropped.is_empty() {
            warn!(columns = ?dropped, "Missing feature columns, using available features");
        }
        self.feature_columns = present;

        let filled = self.imputer.fit_transform(df, &self.feature_columns)?;

        let target = df
            .column(TARGET_COLUMN)
            .map_err(|_| HazardError::TargetNotFound(TARGET_COLUMN.to_string()))?;
        let target = target.as_materialized_series();
        let y = if target.dtype() == &DataType::String {
            ndarray::Array1::from_vec(self.label_encoder.fit_transform(target)?)
        } else {
            column_to_array1(df, TARGET_COLUMN)?
        };

        let x = columns_to_array2(&filled, &self.feature_columns)?;
        info!(
            rows = x.nrows(),
            features = x.ncols(),
            classes = self.label_encoder.classes().len(),
            "Storm training data prepared"
        );

        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, self.random_state, Stratify::Labels)?;

        let x_train = self.scaler.fit_transform(&x_train, &self.feature_columns)?;
        let x_test = self.scaler.transform(&x_test)?;

        let params = if tune {
            let result = search_forest_classifier(
                &x_train,
                &y_train,
                &tuning_grid(),
                5,
                self.random_state,
            )?;
            info!(params = ?result.best_params, score = result.best_score, "Tuned parameters selected");
            result.best_params
        } else {
            default_params()
        };

        let mut forest = params.build_classifier(self.random_state);
        forest.fit(&x_train, &y_train)?;

        let train_pred = forest.predict(&x_train)?;
        let test_pred = forest.predict(&x_test)?;
        let cv = cross_val_accuracy(&x_train, &y_train, &params, 5, self.random_state)?;
        let (precision, recall, f1_score) = weighted_precision_recall_f1(&y_test, &test_pred);

        self.metrics = Some(ClassificationMetrics {
            train_accuracy: accuracy(&y_train, &train_pred),
            test_accuracy: accuracy(&y_test, &test_pred),
            cv_accuracy_mean: cv.mean,
            cv_accuracy_std: cv.std,
            precision,
            recall,
            f1_score,
            n_train_samples: y_train.len(),
            n_test_samples: y_test.len(),
        });
        self.forest = Some(forest);

        info!("Storm model training completed");
        Ok(self)
    }

    /// Predict the risk level and class probabilities for one record
    pub fn predict(&self, record: &StormRecord) -> Result<StormPrediction> {
        let forest = self.forest.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let fields = numeric_fields(record)?;
        let x = assemble_features(&fields, &self.feature_columns)?;
        let x_scaled = self.scaler.transform(&x)?;

        let code = forest.predict(&x_scaled)?[0];
        let proba = forest.predict_proba(&x_scaled)?;

        let risk_level = if self.label_encoder.is_fitted() {
            self.label_encoder.inverse_transform(code)?.to_string()
        } else {
            format!("{}", code)
        };

        // Forest classes are sorted codes, matching the encoder's class order
        let mut class_probabilities = BTreeMap::new();
        for (idx, &class_code) in forest.classes().iter().enumerate() {
            let label = if self.label_encoder.is_fitted() {
                self.label_encoder.inverse_transform(class_code)?.to_string()
            } else {
                format!("{}", class_code)
            };
            class_probabilities.insert(label, proba[[0, idx]]);
        }

        Ok(StormPrediction {
            risk_level,
            class_probabilities,
        })
    }

    /// Held-out metrics from the last fit
    pub fn metrics(&self) -> Option<&ClassificationMetrics> {
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

    /// Risk labels seen during training
    pub fn class_labels(&self) -> &[String] {
        self.label_encoder.classes()
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
        // Three regimes: Watch / Warning / Emergency
        let mut cols: Vec<Column> = Vec::new();
        for name in feature_columns() {
            let values: Vec<f64> = (0..n)
                .map(|i| {
                    let regime = i * 3 / n;
                    regime as f64 * 10.0 + (i % 4) as f64 * 0.2
                })
                .collect();
            cols.push(Column::new(name.as_str().into(), values));
        }
        let labels: Vec<&str> = (0..n)
            .map(|i| match i * 3 / n {
                0 => "Watch",
                1 => "Warning",
                _ => "Emergency",
            })
            .collect();
        cols.push(Column::new(TARGET_COLUMN.into(), labels));
        DataFrame::new(cols).unwrap()
    }

    pub(crate) fn sample_record(level: f64) -> StormRecord {
        StormRecord {
            water_level: level,
            surge_height: level,
            wave_height: level,
            wave_period: level,
            wave_direction: level,
            tidal_level: level,
            tidal_range: level,
            current_speed: level,
            current_direction: level,
            wind_speed: level,
            wind_direction: level,
            wind_gusts: level,
            atmospheric_pressure: level,
            pressure_trend: level,
            air_temperature: level,
            sea_surface_temp: level,
            flood_depth: level,
            inundation_area: level,
            drainage_rate: level,
        }
    }

    #[test]
    fn test_fit_and_predict() {
        let df = training_frame(60);
        let mut model = StormAlertModel::new(42);
        model.fit(&df, false).unwrap();

        let calm = model.predict(&sample_record(0.1)).unwrap();
        let severe = model.predict(&sample_record(20.5)).unwrap();
        assert_eq!(calm.risk_level, "Watch");
        assert_eq!(severe.risk_level, "Emergency");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let df = training_frame(60);
        let mut model = StormAlertModel::new(42);
        model.fit(&df, false).unwrap();

        let prediction = model.predict(&sample_record(10.0)).unwrap();
        assert_eq!(prediction.class_probabilities.len(), 3);
        let total: f64 = prediction.class_probabilities.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "probabilities sum to {}", total);
    }

    #[test]
    fn test_winning_label_has_max_probability() {
        let df = training_frame(60);
        let mut model = StormAlertModel::new(42);
        model.fit(&df, false).unwrap();

        let prediction = model.predict(&sample_record(20.5)).unwrap();
        let max_label = prediction
            .class_probabilities
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(label, _)| label.clone())
            .unwrap();
        assert_eq!(prediction.risk_level, max_label);
    }

    #[test]
    fn test_missing_target_fails() {
        let df = training_frame(30).drop(TARGET_COLUMN).unwrap();
        let mut model = StormAlertModel::new(42);
        assert!(matches!(
            model.fit(&df, false),
            Err(HazardError::TargetNotFound(_))
        ));
    }
}
