use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "models/match_classifier.json";
pub const DEFAULT_DATASET_PATH: &str = "data/full_feature_dataset_expanded.csv";
pub const DEFAULT_STRENGTH_PATH: &str = "models/final_strength_ratings.json";
pub const DEFAULT_SEASON: &str = "2024-2025";

/// Startup configuration, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub strength_path: PathBuf,
    /// Value written into the `Season` feature column.
    pub season: String,
    /// Accept classifiers whose labels are not H/D/A by assuming A, D, H order.
    pub positional_classes: bool,
}

impl AppConfig {
    /// Default artifact layout below `dir`.
    pub fn with_artifact_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(DEFAULT_MODEL_PATH),
            dataset_path: dir.join(DEFAULT_DATASET_PATH),
            strength_path: dir.join(DEFAULT_STRENGTH_PATH),
            season: DEFAULT_SEASON.to_string(),
            positional_classes: false,
        }
    }

    pub fn from_env() -> Self {
        let artifact_dir = env::var("MATCHCAST_ARTIFACT_DIR").unwrap_or_else(|_| ".".to_string());
        let mut config = Self::with_artifact_dir(&artifact_dir);

        if let Ok(path) = env::var("MATCHCAST_MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("MATCHCAST_DATASET_PATH") {
            config.dataset_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("MATCHCAST_STRENGTH_PATH") {
            config.strength_path = PathBuf::from(path);
        }
        if let Ok(season) = env::var("MATCHCAST_SEASON") {
            config.season = season;
        }
        config.positional_classes = env::var("MATCHCAST_POSITIONAL_CLASSES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_layout() {
        let config = AppConfig::with_artifact_dir("/srv/matchcast");
        assert_eq!(config.model_path, PathBuf::from("/srv/matchcast/models/match_classifier.json"));
        assert_eq!(
            config.dataset_path,
            PathBuf::from("/srv/matchcast/data/full_feature_dataset_expanded.csv")
        );
        assert_eq!(config.season, "2024-2025");
        assert!(!config.positional_classes);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
