//! Coastal erosion risk model
//!
//! Random-forest classifier over shoreline, beach, dune, wave, tide and wind
//! measurements, plus two engineered ratio features. Predicts a categorical
//! risk assessment.

use super::{assemble_features, numeric_fields};
use crate::data::{column_to_array1, columns_to_array2};
use crate::error::{HazardError, Result};
use crate::preprocessing::{Imputer, ImputeStrategy, LabelEncoder, RatioFeature, StandardScaler};
use crate::training::{
    accuracy, cross_val_accuracy, rank_importances, search_forest_classifier, train_test_split,
    weighted_precision_recall_f1, ClassificationMetrics, FeatureImportance, ForestParamGrid,
    ForestParams, RandomForest, Stratify,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Target column for erosion training data
pub const TARGET_COLUMN: &str = "risk_assessment";

fn base_feature_columns() -> Vec<String> {
    [
        "shoreline_position",
        "beach_width",
        "beach_volume",
        "dune_height",
        "dune_width",
        "cliff_retreat_rate",
        "wave_height",
        "wave_period",
        "wave_energy",
        "tidal_range",
        "storm_surge_frequency",
        "wind_speed",
        "wind_direction",
        "sea_level_rise",
        "relative_sea_level_change",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn ratio_features() -> Vec<RatioFeature> {
    vec![
        RatioFeature::new("wave_steepness", "wave_height", "wave_period"),
        RatioFeature::new("beach_stability_ratio", "beach_volume", "beach_width"),
    ]
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
        n_estimators: vec![100, 200],
        max_depth: vec![Some(10), Some(15), Some(20), None],
        min_samples_split: vec![2, 5, 10],
        min_samples_leaf: vec![1, 2, 4],
    }
}

/// A single erosion observation, as received by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErosionRecord {
    pub shoreline_position: f64,
    pub beach_width: f64,
    pub beach_volume: f64,
    pub dune_height: f64,
    pub dune_width: f64,
    pub cliff_retreat_rate: f64,
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_energy: f64,
    pub tidal_range: f64,
    pub storm_surge_frequency: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub sea_level_rise: f64,
    pub relative_sea_level_change: f64,
}

/// Coastal erosion risk pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErosionRiskModel {
    random_state: u64,
    /// Raw feature columns found in the training data, in canonical order
    feature_columns: Vec<String>,
    /// Raw + engineered columns, the order presented to scaler and forest
    final_features: Vec<String>,
    imputer: Imputer,
    scaler: StandardScaler,
    label_encoder: LabelEncoder,
    forest: Option<RandomForest>,
    metrics: Option<ClassificationMetrics>,
}

impl ErosionRiskModel {
    /// Create an unfitted model
    pub fn new(random_state: u64) -> Self {
        Self {
            random_state,
            feature_columns: base_feature_columns(),
            final_features: Vec::new(),
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
        // Keep only the canonical columns that exist in this dataset
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

        // Target: encode string labels, pass numeric codes through
        let target = df
            .column(TARGET_COLUMN)
            .map_err(|_| HazardError::TargetNotFound(TARGET_COLUMN.to_string()))?;
        let target = target.as_materialized_series();
        let y = if target.dtype() == &DataType::String {
            ndarray::Array1::from_vec(self.label_encoder.fit_transform(target)?)
        } else {
            column_to_array1(df, TARGET_COLUMN)?
        };

        // Engineered ratio columns, appended after the raw features
        let mut engineered = filled.clone();
        for ratio in ratio_features() {
            engineered = ratio.apply(&engineered)?;
        }
        let mut final_features = self.feature_columns.clone();
        for ratio in ratio_features() {
            if engineered.column(&ratio.name).is_ok() {
                final_features.push(ratio.name.clone());
            }
        }
        self.final_features = final_features;

        let x = columns_to_array2(&engineered, &self.final_features)?;
        info!(
            rows = x.nrows(),
            features = x.ncols(),
            "Erosion training data prepared"
        );

        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, self.random_state, Stratify::Labels)?;

        let x_train = self.scaler.fit_transform(&x_train, &self.final_features)?;
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

        info!("Erosion model training completed");
        Ok(self)
    }

    /// Predict the risk label for one record
    pub fn predict(&self, record: &ErosionRecord) -> Result<String> {
        let forest = self.forest.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let mut fields = numeric_fields(record)?;
        for ratio in ratio_features() {
            let num = fields.get(&ratio.numerator).copied();
            let den = fields.get(&ratio.denominator).copied();
            if let (Some(num), Some(den)) = (num, den) {
                fields.insert(ratio.name.clone(), ratio.compute(num, den));
            }
        }

        let x = assemble_features(&fields, &self.final_features)?;
        let x_scaled = self.scaler.transform(&x)?;
        let code = forest.predict(&x_scaled)?[0];

        if self.label_encoder.is_fitted() {
            Ok(self.label_encoder.inverse_transform(code)?.to_string())
        } else {
            Ok(format!("{}", code))
        }
    }

    /// Held-out metrics from the last fit
    pub fn metrics(&self) -> Option<&ClassificationMetrics> {
        self.metrics.as_ref()
    }

    /// Feature importances over the final feature list, sorted descending
    pub fn feature_importance(&self) -> Result<Vec<FeatureImportance>> {
        let forest = self.forest.as_ref().ok_or(HazardError::ModelNotFitted)?;
        let importances = forest
            .feature_importances()
            .ok_or(HazardError::ModelNotFitted)?;
        Ok(rank_importances(&self.final_features, importances))
    }

    /// The ordered list of columns the fitted estimator expects
    pub fn final_features(&self) -> &[String] {
        &self.final_features
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
