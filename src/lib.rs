//! Coastwatch - environmental hazard risk models
//!
//! This crate trains and serves four risk models for coastal monitoring:
//! - Coastal erosion risk (random forest classifier)
//! - Cyclone formation probability (random forest regressor)
//! - Storm alert level (random forest classifier with class probabilities)
//! - Marine pollution risk (k-means clustering with a weighted risk mapping)
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`data`] - CSV/JSON loading and DataFrame-to-matrix conversion
//! - [`preprocessing`] - Imputation, scaling, label encoding, ratio features
//! - [`training`] - Forests, k-means, splits, cross-validation, grid search
//! - [`hazards`] - The four hazard pipelines (train/evaluate/predict)
//! - [`artifact`] - Persisted model bundle (save/load)
//!
//! ## Services
//! - [`server`] - HTTP prediction service over a loaded artifact
//! - [`cli`] - Command-line interface (train, serve)

// Core error handling
pub mod error;

// Pipeline stages
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod hazards;
pub mod artifact;

// Services
pub mod server;
pub mod cli;

pub use error::{HazardError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{HazardError, Result};

    // Data loading
    pub use crate::data::DataLoader;

    // Preprocessing
    pub use crate::preprocessing::{
        Imputer, ImputeStrategy, LabelEncoder, RatioFeature, StandardScaler,
    };

    // Training
    pub use crate::training::{
        CvScores, ForestParamGrid, ForestParams, KFold, KMeans, RandomForest,
        StratifiedKFold, Stratify,
    };

    // Hazard pipelines
    pub use crate::hazards::{
        CycloneFormationModel, ErosionRiskModel, HazardKind, PollutionRiskModel,
        StormAlertModel,
    };

    // Persistence
    pub use crate::artifact::HazardArtifact;
}
