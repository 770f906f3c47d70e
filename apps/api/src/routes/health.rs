use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
/// Reports service version, the image model, and whether the model answered a
/// metadata request. Always 200; a failing model check reads as "degraded".
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let status = match state.generator.health_check().await {
        Ok(()) => "healthy",
        Err(e) => {
            warn!("Image model health check failed: {e}");
            "degraded"
        }
    };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cabide-api",
        "model": state.generator.model()
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::gemini_client::{GeminiError, GeneratedImage};
    use crate::generation::generator::test_support::StubGenerator;
    use crate::routes::build_router;
    use crate::state::test_state;

    async fn get_health(stub: StubGenerator) -> serde_json::Value {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(Arc::new(stub), tmp.path()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_healthy() {
        let body = get_health(StubGenerator::returning(GeneratedImage {
            data: vec![],
            mime_type: "image/png".into(),
        }))
        .await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub-model");
        assert_eq!(body["service"], "cabide-api");
    }

    #[tokio::test]
    async fn test_health_degraded_when_model_unreachable() {
        let body = get_health(StubGenerator::failing(GeminiError::NoImage("x".into()))).await;
        assert_eq!(body["status"], "degraded");
    }
}
