//! Model training module
//!
//! Provides the estimators and model-selection tooling the hazard pipelines
//! are built from:
//! - Decision trees and random forests (classifier + regressor)
//! - K-means clustering
//! - Seeded train/test splitting with stratification
//! - K-fold and stratified k-fold cross-validation
//! - Exhaustive grid search over forest hyperparameters

pub mod cross_validation;
pub mod decision_tree;
pub mod grid_search;
pub mod kmeans;
pub mod metrics;
pub mod random_forest;
pub mod split;

pub use cross_validation::{CvScores, KFold, StratifiedKFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use grid_search::{
    cross_val_accuracy, cross_val_r2, search_forest_classifier, ForestParamGrid, ForestParams,
    GridSearchResult,
};
pub use kmeans::KMeans;
pub use metrics::{
    accuracy, mean_absolute_error, mean_squared_error, r2_score, rank_importances,
    weighted_precision_recall_f1, ClassificationMetrics, FeatureImportance, RegressionMetrics,
};
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{train_test_split, Stratify};
