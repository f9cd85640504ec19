//! Persisted model bundles
//!
//! A fitted pipeline (estimator plus its companion preprocessing objects and
//! ordered feature list) serializes to a single pretty-printed JSON file.
//! The tag names the hazard, so the serving process can load any artifact
//! from one path and dispatch on its kind. There is no version field; a
//! bundle is superseded by overwriting the file.

use crate::error::{HazardError, Result};
use crate::hazards::{
    CycloneFormationModel, ErosionRiskModel, HazardKind, PollutionRiskModel, StormAlertModel,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A fitted hazard pipeline ready to persist or serve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hazard", content = "bundle", rename_all = "snake_case")]
pub enum HazardArtifact {
    Erosion(ErosionRiskModel),
    Cyclone(CycloneFormationModel),
    Storm(StormAlertModel),
    Pollution(PollutionRiskModel),
}

impl HazardArtifact {
    /// Which hazard this artifact serves
    pub fn kind(&self) -> HazardKind {
        match self {
            HazardArtifact::Erosion(_) => HazardKind::Erosion,
            HazardArtifact::Cyclone(_) => HazardKind::Cyclone,
            HazardArtifact::Storm(_) => HazardKind::Storm,
            HazardArtifact::Pollution(_) => HazardKind::Pollution,
        }
    }

    /// Whether the wrapped pipeline has been fitted
    pub fn is_fitted(&self) -> bool {
        match self {
            HazardArtifact::Erosion(m) => m.is_fitted(),
            HazardArtifact::Cyclone(m) => m.is_fitted(),
            HazardArtifact::Storm(m) => m.is_fitted(),
            HazardArtifact::Pollution(m) => m.is_fitted(),
        }
    }

    /// Serialize the bundle to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), hazard = %self.kind(), "Model saved");
        Ok(())
    }

    /// Deserialize a bundle from a file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            HazardError::DataError(format!("Error loading model from {}: {}", path.display(), e))
        })?;
        let artifact: Self = serde_json::from_str(&json)?;
        info!(path = %path.display(), hazard = %artifact.kind(), "Model loaded");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let artifact = HazardArtifact::Cyclone(CycloneFormationModel::new(42));
        assert_eq!(artifact.kind(), HazardKind::Cyclone);
        assert!(!artifact.is_fitted());
    }

    #[test]
    fn test_load_missing_file() {
        let result = HazardArtifact::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(result, Err(HazardError::DataError(_))));
    }
}
