//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.model(),
        "llmConfigured": state.llm_configured,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use policysage_compare::Comparator;
    use policysage_core::{ComparisonPrompt, Result, ServiceConfig};
    use policysage_ingest::{DocumentExtractor, Normalizer};
    use policysage_llm::GenerativeService;
    use tower::ServiceExt;

    struct IdleService;

    #[async_trait]
    impl GenerativeService for IdleService {
        async fn generate(&self, _prompt: &ComparisonPrompt) -> Result<String> {
            Ok(String::new())
        }

        fn model(&self) -> &str {
            "gemini-test"
        }
    }

    #[tokio::test]
    async fn test_health_reports_model_and_key_state() {
        let upload_dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            ServiceConfig::new(upload_dir.path()).unwrap(),
            Normalizer::new(Arc::new(DocumentExtractor::new())),
            Comparator::new(Arc::new(IdleService)),
            false,
        );
        let router = crate::routes::build_router(Arc::new(state));

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "status": "ok",
                "model": "gemini-test",
                "llmConfigured": false,
            })
        );
    }
}
