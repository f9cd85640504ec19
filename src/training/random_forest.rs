//! Random forest implementation
//!
//! Bagged ensembles of [`DecisionTree`]s. Trees are built in parallel with
//! per-tree ChaCha8 seeds derived from the forest seed, so fits are
//! reproducible for a fixed random state.

use super::decision_tree::DecisionTree;
use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Strategy for the number of features considered per split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features (classification default)
    Sqrt,
    /// All features (regression default)
    All,
}

/// Random forest model (classifier or regressor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub random_state: u64,
    is_classification: bool,
    feature_importances: Option<Array1<f64>>,
    n_features: usize,
    /// Sorted class codes (classification only)
    classes: Vec<f64>,
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new_classifier(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            random_state: 42,
            is_classification: true,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Create a new regressor forest
    pub fn new_regressor(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            random_state: 42,
            is_classification: false,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum tree depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set the random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().ceil() as usize).max(1),
            MaxFeatures::All => n_features,
        }
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(HazardError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(HazardError::TrainingError(
                "cannot fit a forest on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;
        let max_features = self.features_per_split(n_features);

        if self.is_classification {
            let mut classes: Vec<f64> = y.iter().copied().collect();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup_by(|a, b| (*a - *b).abs() < 1e-10);
            self.classes = classes;
        }

        let base_seed = self.random_state;

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                // Bootstrap sample with replacement
                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = if self.is_classification {
                    DecisionTree::new_classifier()
                } else {
                    DecisionTree::new_regressor()
                };

                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree = tree
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf);
                tree.max_features = Some(max_features);

                tree.fit(&x_boot, &y_boot).ok();
                tree
            })
            .collect();

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        totals[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut totals {
            *imp /= n_trees;
        }
        let total: f64 = totals.iter().sum();
        if total > 0.0 {
            for imp in &mut totals {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(totals));
    }

    fn tree_predictions(&self, x: &Array2<f64>) -> Result<Vec<Array1<f64>>> {
        if self.trees.is_empty() {
            return Err(HazardError::ModelNotFitted);
        }

        let all: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .filter_map(|tree| tree.predict(x).ok())
            .collect();

        if all.is_empty() {
            return Err(HazardError::TrainingError(
                "no tree could make predictions".to_string(),
            ));
        }
        Ok(all)
    }

    /// Make predictions: majority vote for classification, mean for regression
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let all_predictions = self.tree_predictions(x)?;
        let n_samples = x.nrows();

        let predictions: Vec<f64> = if self.is_classification {
            (0..n_samples)
                .map(|i| {
                    let mut votes: HashMap<i64, usize> = HashMap::new();
                    for preds in &all_predictions {
                        *votes.entry(preds[i].round() as i64).or_insert(0) += 1;
                    }
                    votes
                        .into_iter()
                        .max_by_key(|(_, count)| *count)
                        .map(|(class, _)| class as f64)
                        .unwrap_or(0.0)
                })
                .collect()
        } else {
            (0..n_samples)
                .map(|i| {
                    let sum: f64 = all_predictions.iter().map(|p| p[i]).sum();
                    sum / all_predictions.len() as f64
                })
                .collect()
        };

        Ok(Array1::from_vec(predictions))
    }

    /// Predict class probabilities as vote fractions (classification only).
    /// Columns follow the sorted class order of [`classes`](Self::classes).
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_classification {
            return Err(HazardError::TrainingError(
                "predict_proba is only available for classification".to_string(),
            ));
        }

        let all_predictions = self.tree_predictions(x)?;
        let n_samples = x.nrows();
        let n_classes = self.classes.len();

        let mut proba = Array2::zeros((n_samples, n_classes));
        for i in 0..n_samples {
            for preds in &all_predictions {
                let class = preds[i].round() as i64;
                if let Some(class_idx) = self
                    .classes
                    .iter()
                    .position(|&c| c.round() as i64 == class)
                {
                    proba[[i, class_idx]] += 1.0;
                }
            }
            let row_sum: f64 = proba.row(i).sum();
            if row_sum > 0.0 {
                for j in 0..n_classes {
                    proba[[i, j]] /= row_sum;
                }
            }
        }

        Ok(proba)
    }

    /// Get feature importances (averaged across trees, normalized)
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Sorted class codes seen during fit (classification)
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest has been fitted
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut rf = RandomForest::new_classifier(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let acc = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (**p - **a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;
        assert!(acc >= 0.8, "accuracy too low: {}", acc);
    }

    #[test]
    fn test_regressor() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut rf = RandomForest::new_regressor(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 2.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_predict_proba_sums_to_one() {
        let x = array![[0.0, 0.0], [0.1, 0.1], [1.0, 1.0], [1.1, 1.1]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut rf = RandomForest::new_classifier(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 2);
        for i in 0..proba.nrows() {
            let row_sum: f64 = proba.row(i).sum();
            assert!((row_sum - 1.0).abs() < 1e-6, "row {} sum: {}", i, row_sum);
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut a = RandomForest::new_classifier(5).with_random_state(7);
        let mut b = RandomForest::new_classifier(5).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_proba_on_regressor_fails() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        let mut rf = RandomForest::new_regressor(3);
        rf.fit(&x, &y).unwrap();
        assert!(rf.predict_proba(&x).is_err());
    }
}
