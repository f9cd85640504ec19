//! Decision tree implementation
//!
//! CART-style binary trees used as the base learners of the random forests.
//! Classification splits on Gini impurity, regression on variance (MSE).

use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Variance / mean squared error (regression)
    Mse,
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split (None = all)
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
    is_classification: bool,
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            n_features: 0,
            feature_importances: None,
            is_classification: true,
        }
    }

    /// Create a new regressor tree
    pub fn new_regressor() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Mse,
            n_features: 0,
            feature_importances: None,
            is_classification: false,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
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

    /// Fit the tree to training data
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
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances));

        // Normalize importances to sum to 1
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf {
                value: self.leaf_value(&y_subset),
                n_samples,
            };
        }

        if let Some((feature_idx, threshold)) = self.find_best_split(x, y, indices) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, feature_idx]] <= threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf {
                    value: self.leaf_value(&y_subset),
                    n_samples,
                };
            }

            // Weighted impurity decrease feeds the importance of this feature
            let parent_impurity = self.impurity(&y_subset);
            let left_y: Vec<f64> = left_indices.iter().map(|&i| y[i]).collect();
            let right_y: Vec<f64> = right_indices.iter().map(|&i| y[i]).collect();
            let child_impurity = (left_indices.len() as f64 * self.impurity(&left_y)
                + right_indices.len() as f64 * self.impurity(&right_y))
                / n_samples as f64;
            importances[feature_idx] += n_samples as f64 * (parent_impurity - child_impurity);

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances));

            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf {
                value: self.leaf_value(&y_subset),
                n_samples,
            }
        }
    }

    /// Scan features in parallel; each returns its best (threshold, gain)
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let n_features_to_try = self.max_features.unwrap_or(n_features).min(n_features);

        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = self.impurity(&y_subset);

        let feature_results: Vec<Option<(usize, f64, f64)>> = (0..n_features_to_try)
            .into_par_iter()
            .map(|feature_idx| {
                let mut values: Vec<f64> =
                    indices.iter().map(|&i| x[[i, feature_idx]]).collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                values.dedup();

                let mut best_gain = 0.0f64;
                let mut best_threshold = 0.0f64;

                for window in values.windows(2) {
                    let threshold = (window[0] + window[1]) / 2.0;

                    let mut left_count = 0usize;
                    let mut right_count = 0usize;
                    let mut left_sum = 0.0f64;
                    let mut right_sum = 0.0f64;
                    let mut left_sq_sum = 0.0f64;
                    let mut right_sq_sum = 0.0f64;
                    let mut left_classes: HashMap<i64, usize> = HashMap::new();
                    let mut right_classes: HashMap<i64, usize> = HashMap::new();

                    for &idx in indices {
                        let yi = y[idx];
                        if x[[idx, feature_idx]] <= threshold {
                            left_count += 1;
                            left_sum += yi;
                            left_sq_sum += yi * yi;
                            *left_classes.entry(yi.round() as i64).or_insert(0) += 1;
                        } else {
                            right_count += 1;
                            right_sum += yi;
                            right_sq_sum += yi * yi;
                            *right_classes.entry(yi.round() as i64).or_insert(0) += 1;
                        }
                    }

                    if left_count < self.min_samples_leaf || right_count < self.min_samples_leaf {
                        continue;
                    }

                    let left_impurity =
                        self.impurity_from_stats(left_count, left_sum, left_sq_sum, &left_classes);
                    let right_impurity = self.impurity_from_stats(
                        right_count,
                        right_sum,
                        right_sq_sum,
                        &right_classes,
                    );

                    let n = indices.len() as f64;
                    let weighted =
                        (left_count as f64 * left_impurity + right_count as f64 * right_impurity)
                            / n;

                    let gain = parent_impurity - weighted;
                    if gain > best_gain {
                        best_gain = gain;
                        best_threshold = threshold;
                    }
                }

                if best_gain > 0.0 {
                    Some((feature_idx, best_threshold, best_gain))
                } else {
                    None
                }
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, threshold, _)| (idx, threshold))
    }

    /// Impurity from pre-accumulated split statistics (single pass per threshold)
    fn impurity_from_stats(
        &self,
        count: usize,
        sum: f64,
        sq_sum: f64,
        class_counts: &HashMap<i64, usize>,
    ) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        match self.criterion {
            Criterion::Gini => {
                let mut gini = 1.0;
                for &c in class_counts.values() {
                    let p = c as f64 / n;
                    gini -= p * p;
                }
                gini
            }
            // Var = E[X²] - E[X]²
            Criterion::Mse => sq_sum / n - (sum / n).powi(2),
        }
    }

    fn impurity(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let n = y.len() as f64;
        match self.criterion {
            Criterion::Gini => {
                let mut counts: HashMap<i64, usize> = HashMap::new();
                for &val in y {
                    *counts.entry(val.round() as i64).or_insert(0) += 1;
                }
                1.0 - counts
                    .values()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Mse => {
                let mean = y.iter().sum::<f64>() / n;
                y.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n
            }
        }
    }

    fn leaf_value(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        if self.is_classification {
            // Mode (most common class)
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for &val in y {
                *counts.entry(val.round() as i64).or_insert(0) += 1;
            }
            counts
                .into_iter()
                .max_by_key(|(_, count)| *count)
                .map(|(class, _)| class as f64)
                .unwrap_or(0.0)
        } else {
            // Mean
            y.iter().sum::<f64>() / y.len() as f64
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let sample = x.row(i).to_vec();
                predict_sample(root, &sample)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            ..
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

fn is_pure(y: &[f64]) -> bool {
    if y.is_empty() {
        return true;
    }
    let first = y[0];
    y.iter().all(|&v| (v - first).abs() < 1e-10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separable() {
        let x = array![[0.0, 0.0], [0.1, 0.2], [1.0, 1.0], [1.1, 0.9]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        for (p, a) in predictions.iter().zip(y.iter()) {
            assert!((p - a).abs() < 0.5);
        }
    }

    #[test]
    fn test_regressor() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = DecisionTree::new_regressor();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        let mse: f64 = predictions
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 1.0, "MSE too high: {}", mse);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new_classifier();
        let x = array![[1.0]];
        assert!(matches!(
            tree.predict(&x),
            Err(HazardError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_feature_importances_pick_informative() {
        // First feature separates classes, second is constant
        let x = array![[1.0, 5.0], [2.0, 5.0], [8.0, 5.0], [9.0, 5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new_classifier();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!(importances[0] > importances[1]);
    }
}
