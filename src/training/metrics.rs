//! Evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metrics for a trained classifier, computed on the held-out split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub cv_accuracy_mean: f64,
    pub cv_accuracy_std: f64,
    /// Support-weighted precision across classes
    pub precision: f64,
    /// Support-weighted recall across classes
    pub recall: f64,
    /// Support-weighted F1 across classes
    pub f1_score: f64,
    pub n_train_samples: usize,
    pub n_test_samples: usize,
}

/// Metrics for a trained regressor, computed on the held-out split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub train_mse: f64,
    pub test_mse: f64,
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_r2: f64,
    pub test_r2: f64,
    pub cv_r2_mean: f64,
    pub n_train_samples: usize,
    pub n_test_samples: usize,
}

/// One entry of a feature-importance ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Pair feature names with importances and sort descending.
/// Extra names or extra importances beyond the shorter list are dropped.
pub fn rank_importances(features: &[String], importances: &Array1<f64>) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = features
        .iter()
        .zip(importances.iter())
        .map(|(f, &imp)| FeatureImportance {
            feature: f.clone(),
            importance: imp,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Fraction of predictions matching the true class
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (**t - **p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Support-weighted precision, recall and F1 across all classes
pub fn weighted_precision_recall_f1(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> (f64, f64, f64) {
    let n = y_true.len();
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    // Per-class true positives, predicted counts and supports
    let mut tp: BTreeMap<i64, usize> = BTreeMap::new();
    let mut predicted: BTreeMap<i64, usize> = BTreeMap::new();
    let mut support: BTreeMap<i64, usize> = BTreeMap::new();

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t = t.round() as i64;
        let p = p.round() as i64;
        *support.entry(t).or_insert(0) += 1;
        *predicted.entry(p).or_insert(0) += 1;
        if t == p {
            *tp.entry(t).or_insert(0) += 1;
        }
    }

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;

    for (&class, &sup) in &support {
        let tp_c = tp.get(&class).copied().unwrap_or(0) as f64;
        let pred_c = predicted.get(&class).copied().unwrap_or(0) as f64;
        let sup_f = sup as f64;

        let p_c = if pred_c > 0.0 { tp_c / pred_c } else { 0.0 };
        let r_c = tp_c / sup_f;
        let f1_c = if p_c + r_c > 0.0 {
            2.0 * p_c * r_c / (p_c + r_c)
        } else {
            0.0
        };

        let weight = sup_f / n as f64;
        precision += weight * p_c;
        recall += weight * r_c;
        f1 += weight * f1_c;
    }

    (precision, recall, f1)
}

/// Mean squared error
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

/// Mean absolute error
pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Coefficient of determination (R²)
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let n = y_true.len() as f64;
    let mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_accuracy() {
        let y_true = array![0.0, 1.0, 1.0, 0.0];
        let y_pred = array![0.0, 1.0, 0.0, 0.0];
        assert_eq!(accuracy(&y_true, &y_pred), 0.75);
    }

    #[test]
    fn test_weighted_prf_perfect() {
        let y_true = array![0.0, 1.0, 2.0, 1.0];
        let y_pred = y_true.clone();
        let (p, r, f1) = weighted_precision_recall_f1(&y_true, &y_pred);
        assert!((p - 1.0).abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
        assert!((f1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_prf_skewed() {
        // Class 0 has support 3, class 1 has support 1
        let y_true = array![0.0, 0.0, 0.0, 1.0];
        let y_pred = array![0.0, 0.0, 1.0, 1.0];
        let (p, r, _) = weighted_precision_recall_f1(&y_true, &y_pred);
        // recall: class0 = 2/3, class1 = 1 → weighted = 0.75*2/3 + 0.25*1
        assert!((r - (0.75 * 2.0 / 3.0 + 0.25)).abs() < 1e-12);
        assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(mean_squared_error(&y_true, &y_pred), 0.0);
        assert_eq!(mean_absolute_error(&y_true, &y_pred), 0.0);
        assert_eq!(r2_score(&y_true, &y_pred), 1.0);
    }

    #[test]
    fn test_rank_importances_sorted() {
        let features = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let importances = array![0.1, 0.7, 0.2];
        let ranked = rank_importances(&features, &importances);
        assert_eq!(ranked[0].feature, "b");
        assert_eq!(ranked[2].feature, "a");
    }
}
