//! Cross-validation splitters

use crate::error::{HazardError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single train/test fold: (train indices, test indices)
pub type Fold = (Vec<usize>, Vec<usize>);

/// Plain k-fold splitter over sample indices, in order
#[derive(Debug, Clone)]
pub struct KFold {
    pub n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    /// Generate folds for `n_samples` samples
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(HazardError::TrainingError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(HazardError::TrainingError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut current = 0;

        for fold_idx in 0..self.n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test: Vec<usize> = (current..current + fold_size).collect();
            let train: Vec<usize> = (0..current)
                .chain(current + fold_size..n_samples)
                .collect();
            folds.push((train, test));
            current += fold_size;
        }

        Ok(folds)
    }
}

/// Stratified k-fold splitter: class proportions are preserved per fold
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub random_state: Option<u64>,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state: Some(42),
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate folds stratified by the rounded class labels in `y`
    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(HazardError::TrainingError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if y.len() < self.n_splits {
            return Err(HazardError::TrainingError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                y.len(),
                self.n_splits
            )));
        }

        // Group samples by class
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &val) in y.iter().enumerate() {
            class_indices.entry(val.round() as i64).or_default().push(idx);
        }

        if self.shuffle {
            let mut rng = match self.random_state {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            for indices in class_indices.values_mut() {
                indices.shuffle(&mut rng);
            }
        }

        // Deal samples from each class round-robin into folds
        let mut fold_members: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for indices in class_indices.values() {
            for (i, &idx) in indices.iter().enumerate() {
                fold_members[i % self.n_splits].push(idx);
            }
        }

        let mut folds = Vec::with_capacity(self.n_splits);
        for fold_idx in 0..self.n_splits {
            let test = fold_members[fold_idx].clone();
            let train: Vec<usize> = fold_members
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != fold_idx)
                .flat_map(|(_, members)| members.iter().copied())
                .collect();
            folds.push((train, test));
        }

        Ok(folds)
    }
}

/// Scores collected across cross-validation folds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    /// Summarize per-fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            scores,
            mean,
            std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold_covers_all_indices() {
        let folds = KFold::new(5).split(100).unwrap();
        assert_eq!(folds.len(), 5);

        let mut all_test: Vec<usize> = folds.iter().flat_map(|(_, t)| t.clone()).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());

        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), 100);
        }
    }

    #[test]
    fn test_stratified_k_fold_balance() {
        let y = Array1::from_vec(vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ]);
        let folds = StratifiedKFold::new(5).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        for (_, test) in &folds {
            assert_eq!(test.len(), 2);
            let ones = test.iter().filter(|&&i| y[i] == 1.0).count();
            assert_eq!(ones, 1, "each fold should hold one sample per class");
        }
    }

    #[test]
    fn test_too_few_samples() {
        let y = Array1::from_vec(vec![0.0, 1.0]);
        assert!(StratifiedKFold::new(5).split(&y).is_err());
    }

    #[test]
    fn test_cv_scores_summary() {
        let scores = CvScores::from_scores(vec![0.8, 0.9, 1.0]);
        assert!((scores.mean - 0.9).abs() < 1e-12);
        assert!(scores.std > 0.0);
    }
}
