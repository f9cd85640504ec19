//! Data preprocessing module
//!
//! Provides the preprocessing stages shared by the hazard pipelines:
//! - Missing value imputation (mean/median)
//! - Standard scaling with per-column parameters
//! - Label encoding for categorical targets and features
//! - Ratio feature engineering

mod encoder;
mod features;
mod imputer;
mod scaler;

pub use encoder::LabelEncoder;
pub use features::{RatioFeature, RATIO_EPS};
pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::StandardScaler;
