use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::MatchRequest;
use crate::services::PredictionEngine;
use crate::store::ArtifactStore;

fn load_engine(config: &AppConfig) -> PredictionEngine {
    PredictionEngine::new(Arc::new(ArtifactStore::load(config)))
}

pub fn predict_match(config: &AppConfig, request: MatchRequest) -> Result<()> {
    let engine = load_engine(config);

    println!(
        "🔮 Predicting {} (rank {}) vs {} (rank {})...",
        request.home_team, request.home_rank, request.away_team, request.away_rank
    );

    let result = engine.predict(&request)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

pub fn query_team(config: &AppConfig, name: &str) -> Result<()> {
    let engine = load_engine(config);
    let store = engine.store();
    let dataset = store.dataset();

    let canonical = engine.normalizer().normalize(name);
    println!("🔍 \"{}\" resolves to \"{}\"", name, canonical);

    let home_games = dataset.home_match_count(&canonical);
    let away_games = dataset.away_match_count(&canonical);
    println!("   Home matches in history: {}", home_games);
    println!("   Away matches in history: {}", away_games);

    match store.strengths().get(&canonical) {
        Some(rating) => println!("   Strength rating: {:.1}", rating),
        None => println!("   Strength rating: not rated"),
    }

    if let Some(latest) = dataset.latest_home(&canonical) {
        println!(
            "   Latest home match: vs {} ({})",
            latest.away_team,
            latest.date.map_or("undated".to_string(), |d| d.date().to_string())
        );
    }
    if let Some(latest) = dataset.latest_away(&canonical) {
        println!(
            "   Latest away match: at {} ({})",
            latest.home_team,
            latest.date.map_or("undated".to_string(), |d| d.date().to_string())
        );
    }

    if home_games == 0 || away_games == 0 {
        println!(
            "⚠️  Missing history: predictions involving {} use the rank fallback",
            canonical
        );
    }

    Ok(())
}
