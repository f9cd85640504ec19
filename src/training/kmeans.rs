//! K-means clustering
//!
//! Lloyd iterations with k-means++ initialization. The fit runs `n_init`
//! independent restarts and keeps the one with the lowest inertia.

use crate::error::{HazardError, Result};
use ndarray::{Array1, Array2};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// K-means clustering model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    pub n_clusters: usize,
    pub max_iter: usize,
    pub tol: f64,
    /// Independent restarts; the best run (lowest inertia) wins
    pub n_init: usize,
    pub random_state: u64,
    /// Fitted cluster centroids (n_clusters × n_features)
    centroids: Option<Array2<f64>>,
    /// Cluster labels assigned during fit
    pub labels: Option<Array1<f64>>,
    /// Sum of squared distances to the nearest centroid
    pub inertia: Option<f64>,
    pub is_fitted: bool,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(4)
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            n_init: 10,
            random_state: 42,
            centroids: None,
            labels: None,
            inertia: None,
            is_fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// K-means++ initialization: pick centroids spread apart
    fn kmeans_pp_init(x: &Array2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let mut centroids = Array2::zeros((k, n_features));

        let first = (rng.next_u64() as usize) % n_samples;
        centroids.row_mut(0).assign(&x.row(first));

        for c in 1..k {
            // Squared distance to the nearest chosen centroid
            let dists: Vec<f64> = (0..n_samples)
                .map(|i| {
                    let row = x.row(i);
                    (0..c)
                        .map(|j| euclidean_sq(&row, &centroids.row(j)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            let total: f64 = dists.iter().sum();
            if total <= 0.0 {
                let idx = (rng.next_u64() as usize) % n_samples;
                centroids.row_mut(c).assign(&x.row(idx));
                continue;
            }

            // Weighted random selection proportional to D²
            let r = (rng.next_u64() as f64 / u64::MAX as f64) * total;
            let mut cumulative = 0.0;
            let mut chosen = 0;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if cumulative >= r {
                    chosen = i;
                    break;
                }
            }
            centroids.row_mut(c).assign(&x.row(chosen));
        }

        centroids
    }

    /// Run Lloyd iterations from one seeded initialization
    fn fit_single(&self, x: &Array2<f64>, seed: u64) -> (Array2<f64>, Array1<f64>, f64) {
        let n_samples = x.nrows();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut centroids = Self::kmeans_pp_init(x, self.n_clusters, &mut rng);
        let mut labels = Array1::zeros(n_samples);

        for _iter in 0..self.max_iter {
            // Assignment step
            let new_labels: Vec<f64> = (0..n_samples)
                .into_par_iter()
                .map(|i| nearest_centroid(&x.row(i), &centroids) as f64)
                .collect();
            let new_labels = Array1::from_vec(new_labels);

            let changed: usize = new_labels
                .iter()
                .zip(labels.iter())
                .filter(|(a, b): &(&f64, &f64)| (**a - **b).abs() > 0.5)
                .count();
            labels = new_labels;

            // Update step
            let mut new_centroids = Array2::zeros(centroids.dim());
            let mut counts = vec![0usize; self.n_clusters];

            for i in 0..n_samples {
                let c = labels[i] as usize;
                counts[c] += 1;
                for j in 0..x.ncols() {
                    new_centroids[[c, j]] += x[[i, j]];
                }
            }

            for c in 0..self.n_clusters {
                if counts[c] > 0 {
                    for j in 0..x.ncols() {
                        new_centroids[[c, j]] /= counts[c] as f64;
                    }
                } else {
                    // Empty cluster: reseed from a random sample
                    let idx = (rng.next_u64() as usize) % n_samples;
                    new_centroids.row_mut(c).assign(&x.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            centroids = new_centroids;

            if changed == 0 || shift < self.tol {
                break;
            }
        }

        let inertia: f64 = (0..n_samples)
            .map(|i| {
                let c = labels[i] as usize;
                euclidean_sq(&x.row(i), &centroids.row(c))
            })
            .sum();

        (centroids, labels, inertia)
    }

    /// Fit the model (unsupervised)
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples < self.n_clusters {
            return Err(HazardError::TrainingError(format!(
                "n_samples ({}) < n_clusters ({})",
                n_samples, self.n_clusters
            )));
        }

        let mut best: Option<(Array2<f64>, Array1<f64>, f64)> = None;
        for run in 0..self.n_init {
            let seed = self.random_state.wrapping_add(run as u64);
            let candidate = self.fit_single(x, seed);
            let better = match &best {
                Some((_, _, inertia)) => candidate.2 < *inertia,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }

        let (centroids, labels, inertia) =
            best.ok_or_else(|| HazardError::TrainingError("no k-means run converged".to_string()))?;

        self.centroids = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        self.is_fitted = true;
        Ok(self)
    }

    /// Predict cluster labels for new data
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let centroids = self.centroids.as_ref().ok_or(HazardError::ModelNotFitted)?;

        let labels: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| nearest_centroid(&x.row(i), centroids) as f64)
            .collect();

        Ok(Array1::from_vec(labels))
    }

    /// Get cluster centroids
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }
}

fn euclidean_sq(a: &ndarray::ArrayView1<f64>, b: &ndarray::ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest_centroid(row: &ndarray::ArrayView1<f64>, centroids: &Array2<f64>) -> usize {
    let mut best_c = 0;
    let mut best_dist = f64::MAX;
    for c in 0..centroids.nrows() {
        let d = euclidean_sq(row, &centroids.row(c));
        if d < best_dist {
            best_dist = d;
            best_c = c;
        }
    }
    best_c
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_two_clear_clusters() {
        let x = array![
            [1.0, 1.0],
            [1.5, 1.5],
            [1.2, 1.3],
            [8.0, 8.0],
            [8.5, 8.5],
            [8.2, 8.3],
        ];
        let mut model = KMeans::new(2);
        model.fit(&x).unwrap();
        assert!(model.is_fitted);

        let labels = model.labels.as_ref().unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_predict_new_points() {
        let x = array![[0.0, 0.0], [0.5, 0.5], [10.0, 10.0], [10.5, 10.5]];
        let mut model = KMeans::new(2);
        model.fit(&x).unwrap();

        let new_x = array![[0.1, 0.1], [10.1, 10.1]];
        let labels = model.predict(&new_x).unwrap();
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn test_restarts_keep_best_inertia() {
        let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [10.0, 10.0]];
        let mut single = KMeans::new(2).with_n_init(1);
        let mut multi = KMeans::new(2).with_n_init(10);
        single.fit(&x).unwrap();
        multi.fit(&x).unwrap();
        assert!(multi.inertia.unwrap() <= single.inertia.unwrap() + 1e-9);
    }

    #[test]
    fn test_too_few_samples() {
        let x = array![[1.0], [2.0]];
        let mut model = KMeans::new(4);
        assert!(model.fit(&x).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = KMeans::new(2);
        let x = array![[1.0]];
        assert!(matches!(
            model.predict(&x),
            Err(HazardError::ModelNotFitted)
        ));
    }
}
