use std::sync::Arc;

use crate::error::{PredictError, Result};
use crate::models::{MatchRequest, Outcome, PredictionResult, Probabilities};
use crate::services::{FeatureBuilder, NameNormalizer};
use crate::store::ArtifactStore;
use crate::utils::to_percent;

/// Turns match requests into predictions over a shared, immutable store.
///
/// Flow: normalize names, build features, classify, validate. A team without
/// history or a NaN from the classifier ends in the rank fallback; every other
/// failure is returned to the caller.
pub struct PredictionEngine {
    store: Arc<ArtifactStore>,
    normalizer: NameNormalizer,
}

impl PredictionEngine {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        let normalizer = NameNormalizer::new(store.dataset());
        Self { store, normalizer }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    pub fn predict(&self, request: &MatchRequest) -> Result<PredictionResult> {
        match self.predict_with_model(request) {
            Ok(result) => Ok(result),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    "Handled error for {} vs {}: {}; using rank fallback",
                    request.home_team,
                    request.away_team,
                    e
                );
                Ok(rank_fallback(request.home_rank, request.away_rank))
            }
            Err(e) => {
                tracing::error!(
                    "Prediction failed for {} vs {}: {}",
                    request.home_team,
                    request.away_team,
                    e
                );
                Err(e)
            }
        }
    }

    fn predict_with_model(&self, request: &MatchRequest) -> Result<PredictionResult> {
        let features = FeatureBuilder::new(&self.store, &self.normalizer).build(request)?;

        let classifier = self
            .store
            .classifier()
            .ok_or_else(|| PredictError::Server("classifier is not loaded".to_string()))?;

        let row = features.select(classifier.model.feature_names()).map_err(|column| {
            PredictError::Server(format!("feature vector is missing classifier column {}", column))
        })?;

        let probs = classifier.model.predict_proba(&row)?;
        let (home, draw, away) = classifier.index.pick(&probs)?;

        tracing::debug!(
            "{} vs {} | P(H)={:.4} P(D)={:.4} P(A)={:.4}",
            request.home_team,
            request.away_team,
            home,
            draw,
            away
        );

        if home.is_nan() || draw.is_nan() || away.is_nan() {
            return Err(PredictError::CorruptedOutput);
        }

        Ok(PredictionResult {
            prediction: select_winner(home, draw, away),
            probabilities: Probabilities {
                home: to_percent(home),
                draw: to_percent(draw),
                away: to_percent(away),
            },
        })
    }
}

/// Strictly greatest probability wins; any tie at the top is a draw.
pub fn select_winner(home: f64, draw: f64, away: f64) -> Outcome {
    if home > away && home > draw {
        Outcome::Home
    } else if away > home && away > draw {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

/// Deterministic answer from league ranks alone; the better-placed (lower)
/// rank is favoured.
pub fn rank_fallback(home_rank: i64, away_rank: i64) -> PredictionResult {
    let (prediction, home, draw, away) = match home_rank.cmp(&away_rank) {
        std::cmp::Ordering::Less => (Outcome::Home, 60.0, 25.0, 15.0),
        std::cmp::Ordering::Greater => (Outcome::Away, 15.0, 25.0, 60.0),
        std::cmp::Ordering::Equal => (Outcome::Draw, 33.0, 34.0, 33.0),
    };

    PredictionResult {
        prediction,
        probabilities: Probabilities { home, draw, away },
    }
}
