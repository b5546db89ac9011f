//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::error::PredictError;
use crate::models::{FeatureValue, MatchRequest};
use crate::services::{Classifier, LinearClassifier, LoadedClassifier};
use crate::store::{ArtifactStore, HistoricalDataset, StrengthTable};

/// Rows are deliberately out of date order.
pub const DATASET_CSV: &str = "\
Date,HomeTeam,AwayTeam,HomeTeam_League_Rank,AwayTeam_League_Rank,\
HomeTeam_Strength,AwayTeam_Strength,H_form_last5,A_form_last5,home_win_pct,\
H2H_draw_pct,Avg_Odds_H,Avg_Odds_D,Avg_Odds_A
2023-08-12,Arsenal,Man City,2,1,1700,1800,0.6,0.8,0.55,0.2,2.1,3.4,3.3
2024-04-20,Man City,Chelsea,1,6,1850,1600,0.9,0.4,0.78,0.25,1.4,4.8,7.5
2024-01-10,Man City,Arsenal,1,3,1820,1750,0.7,0.75,0.7,0.3,1.9,3.6,4.0
2024-03-02,Liverpool,Arsenal,2,3,1780,1760,0.8,0.85,0.72,,2.0,3.5,3.6
2023-12-01,Chelsea,Arsenal,5,2,1600,1740,0.5,0.65,0.5,0.22,2.8,3.3,2.5
";

pub const CLASSIFIER_JSON: &str = r#"{
    "model": {
        "model_name": "epl_outcome_test",
        "feature_names": [
            "HomeTeam",
            "HomeTeam_League_Rank",
            "AwayTeam_League_Rank",
            "HomeTeam_Strength",
            "AwayTeam_Strength",
            "H_form_last5",
            "A_form_last5"
        ],
        "classes": ["A", "D", "H"],
        "coefficients": [
            [0.0, 0.0, 0.0, 0.0, 0.002, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.002, 0.0, 0.0, 0.0]
        ],
        "intercepts": [0.0, 1.0, 0.0],
        "categorical": {
            "HomeTeam": { "Man City": [0.0, 0.0, 0.2] }
        }
    }
}"#;

pub fn dataset() -> HistoricalDataset {
    HistoricalDataset::from_reader(DATASET_CSV.as_bytes()).unwrap()
}

fn strengths() -> StrengthTable {
    [("Man City".to_string(), 1910.5)].into_iter().collect()
}

/// Store with the linear test classifier and the fixture history.
pub fn store() -> ArtifactStore {
    let model = LinearClassifier::from_json_str(CLASSIFIER_JSON).unwrap();
    let loaded = LoadedClassifier::new(Box::new(model), false).unwrap();
    ArtifactStore::new(Some(loaded), dataset(), strengths(), "2024-2025")
}

/// Store with the linear test classifier over a custom history.
pub fn store_with_history(csv: &str) -> ArtifactStore {
    let model = LinearClassifier::from_json_str(CLASSIFIER_JSON).unwrap();
    let loaded = LoadedClassifier::new(Box::new(model), false).unwrap();
    let history = HistoricalDataset::from_reader(csv.as_bytes()).unwrap();
    ArtifactStore::new(Some(loaded), history, strengths(), "2024-2025")
}

pub fn store_with_classifier(model: impl Classifier + 'static) -> ArtifactStore {
    let loaded = LoadedClassifier::new(Box::new(model), false).unwrap();
    ArtifactStore::new(Some(loaded), dataset(), strengths(), "2024-2025")
}

pub fn shared_store() -> Arc<ArtifactStore> {
    Arc::new(store())
}

pub fn request(home: &str, away: &str, home_rank: i64, away_rank: i64) -> MatchRequest {
    MatchRequest {
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_rank,
        away_rank,
    }
}

/// Classifier that returns the same probabilities for every input.
pub struct FixedClassifier {
    features: Vec<String>,
    classes: Vec<String>,
    probs: Vec<f64>,
}

impl FixedClassifier {
    pub fn new(classes: &[&str], probs: Vec<f64>) -> Self {
        Self {
            features: vec!["HomeTeam".to_string(), "HomeTeam_League_Rank".to_string()],
            classes: classes.iter().map(|c| c.to_string()).collect(),
            probs,
        }
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.features = features.iter().map(|f| f.to_string()).collect();
        self
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, _row: &[FeatureValue]) -> Result<Vec<f64>, PredictError> {
        Ok(self.probs.clone())
    }
}
