use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::PredictError;
use crate::models::{ErrorDetail, HealthStatus, MatchRequest, PredictionResult};
use crate::services::PredictionEngine;
use crate::store::ArtifactStore;

pub async fn serve(port: u16, config: AppConfig) -> anyhow::Result<()> {
    // Artifacts are loaded before the listener exists, so no request ever sees a partial store.
    let store = Arc::new(ArtifactStore::load(&config));
    let engine = Arc::new(PredictionEngine::new(store));

    let app = create_router(engine);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Matchcast API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(engine: Arc<PredictionEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/predict", post(predict_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(engine)
}

/// Failure surfaced to the HTTP caller as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDetail { detail: self.detail })).into_response()
    }
}

// GET /health - Artifact status
async fn health_check(State(engine): State<Arc<PredictionEngine>>) -> Json<HealthStatus> {
    let store = engine.store();
    Json(HealthStatus {
        status: "ok",
        classifier_loaded: store.classifier().is_some(),
        history_rows: store.dataset().len(),
        rated_teams: store.strengths().len(),
    })
}

// POST /predict - Predict a single match outcome
async fn predict_handler(
    State(engine): State<Arc<PredictionEngine>>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = payload?;
    let result = engine.predict(&request)?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{shared_store, store_with_classifier, FixedClassifier};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(PredictionEngine::new(shared_store())))
    }

    fn match_body(home: &str, away: &str, home_rank: i64, away_rank: i64) -> Value {
        json!({
            "home_team": home,
            "away_team": away,
            "home_rank": home_rank,
            "away_rank": away_rank,
        })
    }

    async fn post_predict(app: Router, body: Value) -> (StatusCode, Value) {
        post_raw(app, body.to_string()).await
    }

    async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_predict_fallback_home_favoured() {
        let (status, body) = post_predict(router(), match_body("luton", "sheffield", 10, 18)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"prediction": "H", "probabilities": {"Home": 60.0, "Draw": 25.0, "Away": 15.0}})
        );
    }

    #[tokio::test]
    async fn test_predict_fallback_equal_ranks() {
        let (status, body) = post_predict(router(), match_body("luton", "burnley", 18, 18)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"prediction": "D", "probabilities": {"Home": 33.0, "Draw": 34.0, "Away": 33.0}})
        );
    }

    #[tokio::test]
    async fn test_predict_with_model() {
        let (status, body) = post_predict(router(), match_body("man city", "arsenal", 1, 3)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "H");
        let probs = &body["probabilities"];
        let total: f64 = ["Home", "Draw", "Away"]
            .iter()
            .map(|k| probs[*k].as_f64().unwrap())
            .sum();
        assert!((total - 100.0).abs() <= 0.2);
    }

    #[tokio::test]
    async fn test_predict_server_error_has_detail() {
        let model = FixedClassifier::new(&["A", "D", "H"], vec![0.2, 0.3, 0.5])
            .with_features(&["Referee"]);
        let engine = PredictionEngine::new(Arc::new(store_with_classifier(model)));
        let (status, body) = post_predict(
            create_router(Arc::new(engine)),
            match_body("man city", "arsenal", 1, 3),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Server Error"));
        assert!(detail.contains("Referee"));
    }

    #[tokio::test]
    async fn test_malformed_body_has_detail() {
        let (status, body) = post_raw(router(), "{\"home_team\": ".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["detail"].as_str().unwrap().is_empty());

        let (status, body) = post_predict(router(), json!({"home_team": "luton"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("away_team"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"status": "ok", "classifier_loaded": true, "history_rows": 5, "rated_teams": 1})
        );
    }
}
