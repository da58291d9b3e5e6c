use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::synthesis::SynthesisCache;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Reports which storage backends the synthesis cache will use.
pub async fn health_ready(State(cache): State<Arc<SynthesisCache>>) -> impl IntoResponse {
    let backends = cache.backend_ids();
    if backends.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "storage": backends })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "status": "ready", "storage": backends })),
    )
}
