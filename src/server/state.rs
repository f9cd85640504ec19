//! Application state

use crate::artifact::HazardArtifact;
use crate::error::Result;
use crate::hazards::HazardKind;
use std::path::Path;

/// Read-only state shared across request handlers.
///
/// The artifact is loaded once at startup and never mutated; concurrent
/// requests only read through the shared `Arc`.
pub struct AppState {
    artifact: HazardArtifact,
    loaded_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Load the artifact bundle eagerly from disk
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = HazardArtifact::load(path)?;
        Ok(Self::from_artifact(artifact))
    }

    /// Wrap an already-loaded artifact (used by tests)
    pub fn from_artifact(artifact: HazardArtifact) -> Self {
        Self {
            artifact,
            loaded_at: chrono::Utc::now(),
        }
    }

    pub fn artifact(&self) -> &HazardArtifact {
        &self.artifact
    }

    pub fn kind(&self) -> HazardKind {
        self.artifact.kind()
    }

    pub fn loaded_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.loaded_at
    }

    /// Human-readable service name for the liveness message
    pub fn service_name(&self) -> &'static str {
        match self.kind() {
            HazardKind::Erosion => "Coastal Erosion Prediction API",
            HazardKind::Cyclone => "Cyclone Prediction API",
            HazardKind::Storm => "Storm Alert Prediction API",
            HazardKind::Pollution => "Environmental Risk Prediction API",
        }
    }
}
