//! Exhaustive hyperparameter search for forest classifiers
//!
//! Every combination in the grid is scored by mean accuracy over a
//! stratified k-fold split; the best-scoring configuration wins.

use super::cross_validation::{CvScores, KFold, StratifiedKFold};
use super::metrics::{accuracy, r2_score};
use super::random_forest::RandomForest;
use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One forest hyperparameter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl ForestParams {
    /// Build a classifier forest from these parameters
    pub fn build_classifier(&self, seed: u64) -> RandomForest {
        RandomForest::new_classifier(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_random_state(seed)
    }

    /// Build a regressor forest from these parameters
    pub fn build_regressor(&self, seed: u64) -> RandomForest {
        RandomForest::new_regressor(self.n_estimators)
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_random_state(seed)
    }
}

/// Grid of candidate forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl ForestParamGrid {
    /// All parameter combinations, in grid order
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::new();
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &min_samples_leaf in &self.min_samples_leaf {
                        out.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            min_samples_leaf,
                        });
                    }
                }
            }
        }
        out
    }
}

/// Outcome of a grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub best_params: ForestParams,
    pub best_score: f64,
    pub n_candidates: usize,
}

/// Search the grid with stratified k-fold CV accuracy as the objective
pub fn search_forest_classifier(
    x: &Array2<f64>,
    y: &Array1<f64>,
    grid: &ForestParamGrid,
    cv_folds: usize,
    seed: u64,
) -> Result<GridSearchResult> {
    let candidates = grid.candidates();
    if candidates.is_empty() {
        return Err(HazardError::TrainingError(
            "parameter grid has no candidates".to_string(),
        ));
    }
    let folds = StratifiedKFold::new(cv_folds)
        .with_random_state(seed)
        .split(y)?;

    info!(
        candidates = candidates.len(),
        folds = cv_folds,
        "Starting grid search"
    );

    let mut best_params = candidates[0].clone();
    let mut best_score = f64::MIN;

    for params in &candidates {
        let mut fold_scores = Vec::with_capacity(folds.len());

        for (train_idx, test_idx) in &folds {
            let x_train = x.select(Axis(0), train_idx);
            let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
            let x_test = x.select(Axis(0), test_idx);
            let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

            let mut forest = params.build_classifier(seed);
            forest.fit(&x_train, &y_train)?;
            let y_pred = forest.predict(&x_test)?;
            fold_scores.push(accuracy(&y_test, &y_pred));
        }

        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        debug!(?params, score = mean_score, "Candidate scored");

        if mean_score > best_score {
            best_score = mean_score;
            best_params = params.clone();
        }
    }

    info!(?best_params, best_score, "Grid search finished");

    Ok(GridSearchResult {
        best_params,
        best_score,
        n_candidates: candidates.len(),
    })
}

/// Cross-validated accuracy for a forest-classifier configuration.
/// Each fold refits a fresh forest on the fold's training indices.
pub fn cross_val_accuracy(
    x: &Array2<f64>,
    y: &Array1<f64>,
    params: &ForestParams,
    n_folds: usize,
    seed: u64,
) -> Result<CvScores> {
    let folds = StratifiedKFold::new(n_folds)
        .with_random_state(seed)
        .split(y)?;

    let mut scores = Vec::with_capacity(folds.len());
    for (train_idx, test_idx) in &folds {
        let x_train = x.select(Axis(0), train_idx);
        let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let x_test = x.select(Axis(0), test_idx);
        let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        let mut forest = params.build_classifier(seed);
        forest.fit(&x_train, &y_train)?;
        let y_pred = forest.predict(&x_test)?;
        scores.push(accuracy(&y_test, &y_pred));
    }

    Ok(CvScores::from_scores(scores))
}

/// Cross-validated R² for a forest-regressor configuration
pub fn cross_val_r2(
    x: &Array2<f64>,
    y: &Array1<f64>,
    params: &ForestParams,
    n_folds: usize,
    seed: u64,
) -> Result<CvScores> {
    let folds = KFold::new(n_folds).split(x.nrows())?;

    let mut scores = Vec::with_capacity(folds.len());
    for (train_idx, test_idx) in &folds {
        let x_train = x.select(Axis(0), train_idx);
        let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let x_test = x.select(Axis(0), test_idx);
        let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        let mut forest = params.build_regressor(seed);
        forest.fit(&x_train, &y_train)?;
        let y_pred = forest.predict(&x_test)?;
        scores.push(r2_score(&y_test, &y_pred));
    }

    Ok(CvScores::from_scores(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_candidates_cartesian_product() {
        let grid = ForestParamGrid {
            n_estimators: vec![10, 20],
            max_depth: vec![Some(3), None],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1, 2],
        };
        assert_eq!(grid.candidates().len(), 8);
    }

    #[test]
    fn test_search_picks_a_candidate() {
        // Two separable classes, 10 samples each
        let x = Array2::from_shape_fn((20, 2), |(i, j)| {
            if i < 10 {
                (i + j) as f64 * 0.1
            } else {
                10.0 + (i + j) as f64 * 0.1
            }
        });
        let y = Array1::from_shape_fn(20, |i| if i < 10 { 0.0 } else { 1.0 });

        let grid = ForestParamGrid {
            n_estimators: vec![5],
            max_depth: vec![Some(3), None],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        };

        let result = search_forest_classifier(&x, &y, &grid, 2, 42).unwrap();
        assert_eq!(result.n_candidates, 2);
        assert!(result.best_score > 0.5);
    }
}
