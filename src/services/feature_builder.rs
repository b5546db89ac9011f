use crate::error::{PredictError, Result};
use crate::models::{FeatureValue, FeatureVector, HistoricalRecord, MatchRequest};
use crate::services::NameNormalizer;
use crate::store::{ArtifactStore, NEUTRAL_STRENGTH};

/// Columns that are not guaranteed to exist in every dataset export, with the
/// value used when the home snapshot lacks them.
pub const HOTFIX_DEFAULTS: &[(&str, f64)] = &[
    ("H2H_draw_pct", 0.25),
    ("Avg_Odds_H", 2.5),
    ("Avg_Odds_D", 3.2),
    ("Avg_Odds_A", 2.5),
];

/// Assembles the classifier input for one request from the latest history.
pub struct FeatureBuilder<'a> {
    store: &'a ArtifactStore,
    normalizer: &'a NameNormalizer,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(store: &'a ArtifactStore, normalizer: &'a NameNormalizer) -> Self {
        Self { store, normalizer }
    }

    /// Build the feature record, or `NoHistory` when the home team has never
    /// played at home or the away team has never played away.
    pub fn build(&self, request: &MatchRequest) -> Result<FeatureVector> {
        let home = self.normalizer.normalize(&request.home_team);
        let away = self.normalizer.normalize(&request.away_team);

        let dataset = self.store.dataset();
        let home_snapshot = dataset
            .latest_home(&home)
            .ok_or_else(|| PredictError::NoHistory { team: home.clone(), side: "home" })?;
        let away_snapshot = dataset
            .latest_away(&away)
            .ok_or_else(|| PredictError::NoHistory { team: away.clone(), side: "away" })?;

        let strengths = self.store.strengths();
        let home_strength = strengths
            .get(&home)
            .or_else(|| home_snapshot.get_f64("HomeTeam_Strength"))
            .unwrap_or(NEUTRAL_STRENGTH);
        let away_strength = strengths
            .get(&away)
            .or_else(|| away_snapshot.get_f64("AwayTeam_Strength"))
            .unwrap_or(NEUTRAL_STRENGTH);

        let mut features = FeatureVector::new();
        features.set("HomeTeam", home.as_str());
        features.set("AwayTeam", away.as_str());
        features.set("Season", self.store.season());
        // Caller-supplied ranks win over whatever rank the history recorded.
        features.set("HomeTeam_League_Rank", request.home_rank as f64);
        features.set("AwayTeam_League_Rank", request.away_rank as f64);
        features.set("HomeTeam_Strength", home_strength);
        features.set("AwayTeam_Strength", away_strength);

        for column in dataset.form_columns() {
            let source = form_source(column, home_snapshot, away_snapshot);
            let value = match source.fields.get(column) {
                Some(FeatureValue::Missing) | None => FeatureValue::Number(f64::NAN),
                Some(value) => value.clone(),
            };
            features.set(column.as_str(), value);
        }

        for (column, default) in HOTFIX_DEFAULTS {
            let value = home_snapshot
                .get(column)
                .cloned()
                .unwrap_or(FeatureValue::Number(*default));
            features.set(*column, value);
        }

        tracing::debug!(
            "Built features for {} vs {} from snapshots dated {:?} / {:?}: [{}]",
            home,
            away,
            home_snapshot.date,
            away_snapshot.date,
            features.names().collect::<Vec<_>>().join(", ")
        );

        Ok(features)
    }
}

/// `H_` columns describe the home side, `A_` columns the away side; anything
/// else is read from the home snapshot.
fn form_source<'r>(
    column: &str,
    home: &'r HistoricalRecord,
    away: &'r HistoricalRecord,
) -> &'r HistoricalRecord {
    if column.starts_with("A_") {
        away
    } else {
        home
    }
}
