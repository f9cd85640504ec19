//! Marine pollution risk model
//!
//! Unsupervised pipeline: k-means clusters over normalized water-quality
//! indicators, then each cluster is assigned a risk label by a weighted
//! score computed from the de-scaled cluster centroids.

use super::assemble_features;
use crate::data::{columns_to_array2, numeric_column_names};
use crate::error::{HazardError, Result};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::training::KMeans;
use ndarray::{Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Categorical column carrying the toxicity class in training data
pub const TOXICITY_COLUMN: &str = "toxicity_level";

/// Name of the encoded toxicity feature
const ENCODED_TOXICITY: &str = "toxicity_level_encoded";

/// Ordered risk labels for clusters sorted by ascending score.
/// Clusters beyond the list fall back to [`SURPLUS_RISK_LEVEL`].
pub const RISK_LEVELS: [&str; 4] = ["Low", "Medium", "High", "Very High"];

/// Label for surplus clusters when k exceeds the ordered label set
pub const SURPLUS_RISK_LEVEL: &str = "Critical";

/// Indicator weights for the cluster risk score
fn risk_indicator_weights() -> [(&'static str, f64); 6] {
    [
        ("chemical_oxygen_demand", 0.25),
        ("bacterial_count", 0.20),
        ("fish_mortality_rate", 0.15),
        ("coral_bleaching_index", 0.15),
        ("industrial_waste_indicator", 0.15),
        ("domestic_sewage_index", 0.10),
    ]
}

/// Normalize an indicator value for scoring. Chemical oxygen demand and
/// bacterial count live on much larger scales than the index features.
fn normalize_indicator(feature: &str, value: f64) -> f64 {
    match feature {
        "chemical_oxygen_demand" => (value / 100.0).min(1.0),
        "bacterial_count" => (value / 30_000.0).min(1.0),
        _ => value,
    }
}

/// A single water-quality observation, as received by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollutionRecord {
    #[serde(rename = "pH")]
    pub ph: f64,
    pub dissolved_oxygen: f64,
    pub biochemical_oxygen_demand: f64,
    pub chemical_oxygen_demand: f64,
    pub nitrates: f64,
    pub phosphates: f64,
    pub toxicity_level: String,
    pub turbidity: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub bacterial_count: f64,
    pub algal_bloom_risk: f64,
    pub coral_bleaching_index: f64,
    pub fish_mortality_rate: f64,
    pub industrial_waste_indicator: f64,
    pub agricultural_runoff_index: f64,
    pub domestic_sewage_index: f64,
}

/// Pollution risk clustering pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollutionRiskModel {
    n_clusters: usize,
    random_state: u64,
    scaler: StandardScaler,
    toxicity_encoder: LabelEncoder,
    kmeans: Option<KMeans>,
    /// Feature order presented to scaler and k-means
    feature_names: Vec<String>,
    /// Risk label per cluster id
    cluster_risk: Vec<String>,
}

impl PollutionRiskModel {
    /// Create an unfitted model with the default 4 clusters
    pub fn new(random_state: u64) -> Self {
        Self::with_clusters(4, random_state)
    }

    /// Create an unfitted model with a chosen cluster count
    pub fn with_clusters(n_clusters: usize, random_state: u64) -> Self {
        Self {
            n_clusters,
            random_state,
            scaler: StandardScaler::new(),
            toxicity_encoder: LabelEncoder::new(),
            kmeans: None,
            feature_names: Vec::new(),
            cluster_risk: Vec::new(),
        }
    }

    /// Fit clusters and the cluster→risk mapping on a loaded DataFrame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric_cols = numeric_column_names(df);
        if numeric_cols.is_empty() {
            return Err(HazardError::DataError(
                "no numeric feature columns in data".to_string(),
            ));
        }

        let x_numeric = columns_to_array2(df, &numeric_cols)?;
        let mut feature_names = numeric_cols;

        // Encode the categorical toxicity column, appended as the last feature
        let x = match df.column(TOXICITY_COLUMN) {
            Ok(col) => {
                let codes = self
                    .toxicity_encoder
                    .fit_transform(col.as_materialized_series())?;
                let codes_col = Array2::from_shape_vec((codes.len(), 1), codes)?;
                feature_names.push(ENCODED_TOXICITY.to_string());
                ndarray::concatenate(Axis(1), &[x_numeric.view(), codes_col.view()])?
            }
            Err(_) => x_numeric,
        };
        self.feature_names = feature_names;

        let x_scaled = self.scaler.fit_transform(&x, &self.feature_names)?;

        let mut kmeans = KMeans::new(self.n_clusters)
            .with_n_init(10)
            .with_random_state(self.random_state);
        kmeans.fit(&x_scaled)?;

        self.cluster_risk = self.risk_mapping(&kmeans)?;
        info!(
            clusters = self.n_clusters,
            features = self.feature_names.len(),
            mapping = ?self.cluster_risk,
            "Pollution model training completed"
        );
        self.kmeans = Some(kmeans);

        Ok(self)
    }

    /// Score each cluster from its de-scaled centroid and assign labels
    /// by ascending score: lowest score gets the first (lowest) risk level.
    fn risk_mapping(&self, kmeans: &KMeans) -> Result<Vec<String>> {
        let centroids = kmeans.centroids().ok_or(HazardError::ModelNotFitted)?;
        let centroids = self.scaler.inverse_transform(centroids)?;
        let weights = risk_indicator_weights();

        let scores: Vec<f64> = (0..self.n_clusters)
            .map(|cluster_id| {
                let mut score = 0.0;
                for (i, feature) in self.feature_names.iter().enumerate() {
                    if let Some((_, weight)) =
                        weights.iter().find(|(name, _)| *name == feature.as_str())
                    {
                        score +=
                            normalize_indicator(feature, centroids[[cluster_id, i]]) * weight;
                    }
                }
                score
            })
            .collect();

        let mut order: Vec<usize> = (0..self.n_clusters).collect();
        order.sort_by(|&a, &b| {
            scores[a]
                .partial_cmp(&scores[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut mapping = vec![String::new(); self.n_clusters];
        for (rank, &cluster_id) in order.iter().enumerate() {
            mapping[cluster_id] = RISK_LEVELS
                .get(rank)
                .copied()
                .unwrap_or(SURPLUS_RISK_LEVEL)
                .to_string();
        }
        Ok(mapping)
    }

    /// Predict the risk label for one record.
    /// Features named by the fitted list but absent from the record are
    /// zero-filled; unknown toxicity labels degrade to zero with a warning.
    pub fn predict(&self, record: &PollutionRecord) -> Result<String> {
        let kmeans = self.kmeans.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let mut fields: BTreeMap<String, f64> = super::numeric_fields(record)?;
        if self.toxicity_encoder.is_fitted() {
            match self.toxicity_encoder.transform(&record.toxicity_level) {
                Ok(code) => {
                    fields.insert(ENCODED_TOXICITY.to_string(), code);
                }
                Err(_) => {
                    warn!(
                        label = %record.toxicity_level,
                        "Unknown toxicity label, using zero"
                    );
                }
            }
        }

        let x = assemble_features(&fields, &self.feature_names)?;
        let x_scaled = self.scaler.transform(&x)?;
        let cluster = kmeans.predict(&x_scaled)?[0] as usize;

        self.cluster_risk
            .get(cluster)
            .cloned()
            .ok_or_else(|| HazardError::TrainingError(format!("no risk label for cluster {}", cluster)))
    }

    /// Risk label per cluster id
    pub fn cluster_risk_mapping(&self) -> &[String] {
        &self.cluster_risk
    }

    /// Sum of squared distances from the fit
    pub fn inertia(&self) -> Option<f64> {
        self.kmeans.as_ref().and_then(|k| k.inertia)
    }

    /// Feature order presented to the scaler and k-means
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn is_fitted(&self) -> bool {
        self.kmeans.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two regimes: clean water and heavily polluted water
    pub(crate) fn training_frame(n: usize) -> DataFrame {
        let polluted = |i: usize| i >= n / 2;
        let jitter = |i: usize| (i % 5) as f64 * 0.01;

        let make = |clean: f64, dirty: f64| -> Vec<f64> {
            (0..n)
                .map(|i| if polluted(i) { dirty + jitter(i) } else { clean + jitter(i) })
                .collect::<Vec<f64>>()
        };

        let toxicity: Vec<&str> = (0..n)
            .map(|i| if polluted(i) { "high" } else { "low" })
            .collect();

        df!(
            "pH" => make(7.8, 5.2),
            "dissolved_oxygen" => make(8.0, 2.0),
            "biochemical_oxygen_demand" => make(2.0, 18.0),
            "chemical_oxygen_demand" => make(10.0, 95.0),
            "nitrates" => make(1.0, 12.0),
            "phosphates" => make(0.2, 4.0),
            "toxicity_level" => toxicity,
            "turbidity" => make(3.0, 40.0),
            "temperature" => make(18.0, 26.0),
            "salinity" => make(34.0, 31.0),
            "bacterial_count" => make(500.0, 28000.0),
            "algal_bloom_risk" => make(0.1, 0.9),
            "coral_bleaching_index" => make(0.05, 0.85),
            "fish_mortality_rate" => make(0.02, 0.7),
            "industrial_waste_indicator" => make(0.1, 0.9),
            "agricultural_runoff_index" => make(0.1, 0.8),
            "domestic_sewage_index" => make(0.1, 0.9),
        )
        .unwrap()
    }

    pub(crate) fn clean_record() -> PollutionRecord {
        PollutionRecord {
            ph: 7.8,
            dissolved_oxygen: 8.0,
            biochemical_oxygen_demand: 2.0,
            chemical_oxygen_demand: 10.0,
            nitrates: 1.0,
            phosphates: 0.2,
            toxicity_level: "low".to_string(),
            turbidity: 3.0,
            temperature: 18.0,
            salinity: 34.0,
            bacterial_count: 500.0,
            algal_bloom_risk: 0.1,
            coral_bleaching_index: 0.05,
            fish_mortality_rate: 0.02,
            industrial_waste_indicator: 0.1,
            agricultural_runoff_index: 0.1,
            domestic_sewage_index: 0.1,
        }
    }

    pub(crate) fn polluted_record() -> PollutionRecord {
        PollutionRecord {
            ph: 5.2,
            dissolved_oxygen: 2.0,
            biochemical_oxygen_demand: 18.0,
            chemical_oxygen_demand: 95.0,
            nitrates: 12.0,
            phosphates: 4.0,
            toxicity_level: "high".to_string(),
            turbidity: 40.0,
            temperature: 26.0,
            salinity: 31.0,
            bacterial_count: 28000.0,
            algal_bloom_risk: 0.9,
            coral_bleaching_index: 0.85,
            fish_mortality_rate: 0.7,
            industrial_waste_indicator: 0.9,
            agricultural_runoff_index: 0.8,
            domestic_sewage_index: 0.9,
        }
    }

    #[test]
    fn test_fit_assigns_all_risk_labels() {
        let df = training_frame(40);
        let mut model = PollutionRiskModel::new(42);
        model.fit(&df).unwrap();

        assert_eq!(model.cluster_risk_mapping().len(), 4);
        let mapping: Vec<&str> = model
            .cluster_risk_mapping()
            .iter()
            .map(|s| s.as_str())
            .collect();
        for level in RISK_LEVELS {
            assert!(mapping.contains(&level), "missing label {}", level);
        }
    }

    #[test]
    fn test_clean_water_scores_lower_than_polluted() {
        let df = training_frame(40);
        let mut model = PollutionRiskModel::new(42);
        model.fit(&df).unwrap();

        let clean = model.predict(&clean_record()).unwrap();
        let dirty = model.predict(&polluted_record()).unwrap();

        let rank = |label: &str| {
            RISK_LEVELS
                .iter()
                .position(|l| *l == label)
                .unwrap_or(RISK_LEVELS.len())
        };
        assert!(
            rank(&clean) < rank(&dirty),
            "clean water ranked {} vs polluted {}",
            clean,
            dirty
        );
    }

    #[test]
    fn test_unknown_toxicity_degrades_to_zero() {
        let df = training_frame(40);
        let mut model = PollutionRiskModel::new(42);
        model.fit(&df).unwrap();

        let mut record = clean_record();
        record.toxicity_level = "unheard-of".to_string();
        // Must not error; the encoded feature falls back to zero
        model.predict(&record).unwrap();
    }

    #[test]
    fn test_two_clusters_surplus_not_used() {
        let df = training_frame(40);
        let mut model = PollutionRiskModel::with_clusters(2, 42);
        model.fit(&df).unwrap();

        let mapping = model.cluster_risk_mapping();
        assert_eq!(mapping.len(), 2);
        assert!(mapping.contains(&"Low".to_string()));
        assert!(mapping.contains(&"Medium".to_string()));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = PollutionRiskModel::new(42);
        assert!(matches!(
            model.predict(&clean_record()),
            Err(HazardError::ModelNotFitted)
        ));
    }
}
