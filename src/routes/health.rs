use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

// Service identity; consumed by the frontend's about page.
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "message": "API de TiendaCL",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "products": "/api/posts",
            "favorites": "/api/favorites",
        }
    });
    (StatusCode::OK, Json(body))
}

// Liveness only. "db" reports whether a database host is configured; it does
// not touch the pool.
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let db = if state.config.database.host.trim().is_empty() { "disconnected" } else { "connected" };
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "db": db,
    }))
}
