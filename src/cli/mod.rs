//! Command-line interface
//!
//! `train` runs the offline pipeline for one hazard (load → preprocess →
//! train → evaluate → persist) and prints a summary; `serve` loads a
//! persisted artifact and starts the prediction service.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::artifact::HazardArtifact;
use crate::data::DataLoader;
use crate::hazards::{
    CycloneFormationModel, ErosionRiskModel, HazardKind, PollutionRiskModel, StormAlertModel,
};
use crate::server::{run_server, ServerConfig};
use crate::training::FeatureImportance;

#[derive(Parser)]
#[command(name = "coastwatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Environmental hazard risk models for coastal monitoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a hazard model and persist the artifact bundle
    Train {
        /// Hazard to train (erosion, cyclone, storm, pollution)
        #[arg(long)]
        hazard: String,

        /// Training data file (CSV or line-delimited JSON)
        #[arg(short, long)]
        data: PathBuf,

        /// Output artifact file
        #[arg(short, long)]
        output: PathBuf,

        /// Run the hyperparameter grid search (classifiers only)
        #[arg(long)]
        tune: bool,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Serve a persisted artifact over HTTP
    Serve {
        /// Artifact file produced by `train`
        #[arg(short, long)]
        artifact: PathBuf,

        /// Bind host (falls back to API_HOST, then 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (falls back to API_PORT, then 8000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// ─── Summary printing helpers ─────────────────────────────────────────────────

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", "─".repeat(56).truecolor(100, 100, 100));
}

fn kv(key: &str, val: &str) {
    println!("  {:<28} {}", key.truecolor(140, 140, 140), val.white());
}

fn print_importances(ranked: &[FeatureImportance]) {
    section("Top feature importances");
    for entry in ranked.iter().take(10) {
        kv(&entry.feature, &format!("{:.4}", entry.importance));
    }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Train one hazard model and save its artifact
pub fn cmd_train(
    hazard: &str,
    data: &PathBuf,
    output: &PathBuf,
    tune: bool,
    seed: u64,
) -> anyhow::Result<()> {
    let kind: HazardKind = hazard.parse()?;
    let loader = DataLoader::new();
    let df = loader.load_auto(&data.to_string_lossy())?;

    let artifact = match kind {
        HazardKind::Erosion => {
            let mut model = ErosionRiskModel::new(seed);
            model.fit(&df, tune)?;
            print_classification_summary(
                "COASTAL EROSION MODEL SUMMARY",
                model.final_features().len(),
                model.n_trees(),
                model.class_labels(),
                model.metrics(),
            );
            print_importances(&model.feature_importance()?);
            HazardArtifact::Erosion(model)
        }
        HazardKind::Cyclone => {
            let mut model = CycloneFormationModel::new(seed);
            model.fit(&df)?;
            print_regression_summary(
                "CYCLONE FORMATION MODEL SUMMARY",
                model.feature_columns().len(),
                model.n_trees(),
                model.metrics(),
            );
            print_importances(&model.feature_importance()?);
            HazardArtifact::Cyclone(model)
        }
        HazardKind::Storm => {
            let mut model = StormAlertModel::new(seed);
            model.fit(&df, tune)?;
            print_classification_summary(
                "STORM ALERT MODEL SUMMARY",
                model.feature_columns().len(),
                model.n_trees(),
                model.class_labels(),
                model.metrics(),
            );
            print_importances(&model.feature_importance()?);
            HazardArtifact::Storm(model)
        }
        HazardKind::Pollution => {
            let mut model = PollutionRiskModel::new(seed);
            model.fit(&df)?;
            print_pollution_summary(&model);
            HazardArtifact::Pollution(model)
        }
    };

    artifact.save(output)?;
    println!(
        "\n  {} {}",
        "✓".truecolor(100, 210, 120),
        format!("Model saved to {}", output.display())
    );
    Ok(())
}

fn print_classification_summary(
    title: &str,
    n_features: usize,
    n_trees: usize,
    classes: &[String],
    metrics: Option<&crate::training::ClassificationMetrics>,
) {
    section(title);
    kv("Model type", "Random Forest Classifier");
    kv("Number of features", &n_features.to_string());
    kv("Number of trees", &n_trees.to_string());
    if !classes.is_empty() {
        kv("Target classes", &classes.join(", "));
    }

    if let Some(m) = metrics {
        kv("Training samples", &m.n_train_samples.to_string());
        kv("Test samples", &m.n_test_samples.to_string());
        section("Performance metrics");
        kv("Train accuracy", &format!("{:.4}", m.train_accuracy));
        kv("Test accuracy", &format!("{:.4}", m.test_accuracy));
        kv("CV accuracy mean", &format!("{:.4}", m.cv_accuracy_mean));
        kv("CV accuracy std", &format!("{:.4}", m.cv_accuracy_std));
        kv("Precision", &format!("{:.4}", m.precision));
        kv("Recall", &format!("{:.4}", m.recall));
        kv("F1 score", &format!("{:.4}", m.f1_score));
    }
}

fn print_regression_summary(
    title: &str,
    n_features: usize,
    n_trees: usize,
    metrics: Option<&crate::training::RegressionMetrics>,
) {
    section(title);
    kv("Model type", "Random Forest Regressor");
    kv("Number of features", &n_features.to_string());
    kv("Number of trees", &n_trees.to_string());

    if let Some(m) = metrics {
        kv("Training samples", &m.n_train_samples.to_string());
        kv("Test samples", &m.n_test_samples.to_string());
        section("Performance metrics");
        kv("Train MSE", &format!("{:.4}", m.train_mse));
        kv("Test MSE", &format!("{:.4}", m.test_mse));
        kv("Train MAE", &format!("{:.4}", m.train_mae));
        kv("Test MAE", &format!("{:.4}", m.test_mae));
        kv("Train R²", &format!("{:.4}", m.train_r2));
        kv("Test R²", &format!("{:.4}", m.test_r2));
        kv("CV R² mean", &format!("{:.4}", m.cv_r2_mean));
    }
}

fn print_pollution_summary(model: &PollutionRiskModel) {
    section("ENVIRONMENTAL RISK MODEL SUMMARY");
    kv("Model type", "K-Means Risk Clustering");
    kv("Number of clusters", &model.n_clusters().to_string());
    kv("Number of features", &model.feature_names().len().to_string());
    if let Some(inertia) = model.inertia() {
        kv("Inertia", &format!("{:.4}", inertia));
    }
    section("Cluster risk mapping");
    for (cluster_id, label) in model.cluster_risk_mapping().iter().enumerate() {
        kv(&format!("Cluster {}", cluster_id), label);
    }
}

/// Serve a persisted artifact
pub async fn cmd_serve(
    artifact: PathBuf,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let config = ServerConfig::new(artifact, host, port);
    run_server(config).await
}
