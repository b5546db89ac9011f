pub mod dataset;
pub mod strength;

pub use dataset::HistoricalDataset;
pub use strength::{StrengthTable, NEUTRAL_STRENGTH};

use crate::config::AppConfig;
use crate::services::LoadedClassifier;

/// Read-only artifacts shared by every request.
///
/// Built once before the server accepts traffic. A missing artifact never
/// aborts startup: the classifier becomes `None`, the dataset and the strength
/// table become empty.
#[derive(Debug)]
pub struct ArtifactStore {
    classifier: Option<LoadedClassifier>,
    dataset: HistoricalDataset,
    strengths: StrengthTable,
    season: String,
}

impl ArtifactStore {
    pub fn new(
        classifier: Option<LoadedClassifier>,
        dataset: HistoricalDataset,
        strengths: StrengthTable,
        season: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            dataset,
            strengths,
            season: season.into(),
        }
    }

    pub fn load(config: &AppConfig) -> Self {
        tracing::info!("Loading prediction artifacts...");

        let classifier = match LoadedClassifier::load(
            &config.model_path,
            config.positional_classes,
        ) {
            Ok(loaded) => {
                tracing::info!(
                    "Loaded classifier {} from {} ({} features, classes {:?})",
                    loaded.model.name(),
                    config.model_path.display(),
                    loaded.model.feature_names().len(),
                    loaded.model.classes()
                );
                Some(loaded)
            }
            Err(e) => {
                tracing::error!("Critical error loading classifier: {:#}", e);
                None
            }
        };

        let dataset = match HistoricalDataset::load(&config.dataset_path) {
            Ok(dataset) => {
                tracing::info!(
                    "Loaded {} historical matches from {} ({} form columns)",
                    dataset.len(),
                    config.dataset_path.display(),
                    dataset.form_columns().len()
                );
                if dataset.is_empty() {
                    tracing::warn!("Dataset has no rows, every request will use the rank fallback");
                }
                dataset
            }
            Err(e) => {
                tracing::error!(
                    "Error loading dataset, every request will use the rank fallback: {:#}",
                    e
                );
                HistoricalDataset::empty()
            }
        };

        let strengths = match StrengthTable::load(&config.strength_path) {
            Ok(table) => {
                tracing::info!("Loaded strength ratings for {} teams", table.len());
                if table.is_empty() {
                    tracing::warn!(
                        "Strength table is empty, every team rates {}",
                        NEUTRAL_STRENGTH
                    );
                }
                table
            }
            Err(e) => {
                tracing::warn!("Strength ratings unavailable, using defaults: {:#}", e);
                StrengthTable::empty()
            }
        };

        Self::new(classifier, dataset, strengths, config.season.clone())
    }

    pub fn classifier(&self) -> Option<&LoadedClassifier> {
        self.classifier.as_ref()
    }

    pub fn dataset(&self) -> &HistoricalDataset {
        &self.dataset
    }

    pub fn strengths(&self) -> &StrengthTable {
        &self.strengths
    }

    pub fn season(&self) -> &str {
        &self.season
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_bundled_artifacts() {
        let config = AppConfig::with_artifact_dir(env!("CARGO_MANIFEST_DIR"));
        let store = ArtifactStore::load(&config);

        let classifier = store.classifier().expect("bundled classifier loads");
        assert!(classifier.model.feature_names().iter().any(|f| f == "HomeTeam_Strength"));
        assert!(!store.dataset().is_empty());
        assert!(!store.strengths().is_empty());
        assert_eq!(store.season(), "2024-2025");
    }

    #[test]
    fn test_missing_artifacts_degrade() {
        let mut config = AppConfig::with_artifact_dir("/nonexistent/matchcast");
        config.season = "2025-2026".to_string();
        let store = ArtifactStore::load(&config);

        assert!(store.classifier().is_none());
        assert!(store.dataset().is_empty());
        assert!(store.strengths().is_empty());
        assert_eq!(store.season(), "2025-2026");
    }

    #[test]
    fn test_unlabelled_classifier_is_rejected_without_opt_in() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let mut config = AppConfig::with_artifact_dir(&dir);
        config.model_path = dir.join("tests/fixtures/unlabelled_classifier.json");

        assert!(ArtifactStore::load(&config).classifier().is_none());

        config.positional_classes = true;
        let store = ArtifactStore::load(&config);
        assert_eq!(
            store.classifier().map(|c| c.index),
            Some(crate::services::ClassIndex::POSITIONAL)
        );
    }
}
