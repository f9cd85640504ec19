//! Train/test splitting

use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// How to stratify a train/test split
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stratify {
    /// No stratification; plain shuffled split
    None,
    /// Stratify by class label (classification targets)
    Labels,
    /// Stratify by equal-width bins over the target range (regression targets)
    Bins(usize),
}

/// Split features and target into train/test sets.
///
/// Each stratum is shuffled with a ChaCha8 RNG seeded from `seed` and split
/// at `test_size`, so class (or bin) proportions carry over to both sides.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
    stratify: Stratify,
) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
    let n = x.nrows();
    if n != y.len() {
        return Err(HazardError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(HazardError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if n < 2 {
        return Err(HazardError::TrainingError(format!(
            "need at least 2 samples to split, got {}",
            n
        )));
    }

    let strata = build_strata(y, stratify);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut test_indices: Vec<usize> = Vec::new();
    let mut train_indices: Vec<usize> = Vec::new();

    for (_, mut indices) in strata {
        indices.shuffle(&mut rng);
        // At least one test sample per stratum that can spare one
        let n_test = ((indices.len() as f64 * test_size).round() as usize)
            .min(indices.len().saturating_sub(1));
        test_indices.extend_from_slice(&indices[..n_test]);
        train_indices.extend_from_slice(&indices[n_test..]);
    }

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(HazardError::TrainingError(
            "split produced an empty train or test set".to_string(),
        ));
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    let x_train = x.select(Axis(0), &train_indices);
    let x_test = x.select(Axis(0), &test_indices);
    let y_train = Array1::from_vec(train_indices.iter().map(|&i| y[i]).collect());
    let y_test = Array1::from_vec(test_indices.iter().map(|&i| y[i]).collect());

    Ok((x_train, x_test, y_train, y_test))
}

/// Group sample indices into strata according to the strategy
fn build_strata(y: &Array1<f64>, stratify: Stratify) -> BTreeMap<i64, Vec<usize>> {
    let mut strata: BTreeMap<i64, Vec<usize>> = BTreeMap::new();

    match stratify {
        Stratify::None => {
            strata.insert(0, (0..y.len()).collect());
        }
        Stratify::Labels => {
            for (idx, &val) in y.iter().enumerate() {
                strata.entry(val.round() as i64).or_default().push(idx);
            }
        }
        Stratify::Bins(n_bins) => {
            let n_bins = n_bins.max(1);
            let min = y.iter().copied().fold(f64::MAX, f64::min);
            let max = y.iter().copied().fold(f64::MIN, f64::max);
            let width = (max - min) / n_bins as f64;

            for (idx, &val) in y.iter().enumerate() {
                let bin = if width > 0.0 {
                    (((val - min) / width) as i64).min(n_bins as i64 - 1)
                } else {
                    0
                };
                strata.entry(bin).or_default().push(idx);
            }
        }
    }

    strata
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn make_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = make_data(20);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, 42, Stratify::Labels).unwrap();

        assert_eq!(x_train.nrows() + x_test.nrows(), 20);
        assert_eq!(y_train.len(), x_train.nrows());
        assert_eq!(y_test.len(), x_test.nrows());
        assert_eq!(x_test.nrows(), 4);
    }

    #[test]
    fn test_stratified_preserves_class_balance() {
        let (x, y) = make_data(20);
        let (_, _, y_train, y_test) =
            train_test_split(&x, &y, 0.2, 42, Stratify::Labels).unwrap();

        let train_ones = y_train.iter().filter(|&&v| v == 1.0).count();
        let test_ones = y_test.iter().filter(|&&v| v == 1.0).count();
        assert_eq!(train_ones, 8);
        assert_eq!(test_ones, 2);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = make_data(20);
        let (a, _, _, _) = train_test_split(&x, &y, 0.2, 7, Stratify::Labels).unwrap();
        let (b, _, _, _) = train_test_split(&x, &y, 0.2, 7, Stratify::Labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_binned_stratification() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(30, |i| i as f64 / 30.0);
        let (x_train, x_test, _, _) =
            train_test_split(&x, &y, 0.2, 42, Stratify::Bins(5)).unwrap();
        assert_eq!(x_train.nrows() + x_test.nrows(), 30);
        assert!(x_test.nrows() >= 5);
    }

    #[test]
    fn test_invalid_test_size() {
        let (x, y) = make_data(10);
        assert!(train_test_split(&x, &y, 1.5, 42, Stratify::None).is_err());
    }
}
