//! Origin allow-list enforcement.
//!
//! Two layers work together: [`cors_gate`] refuses foreign origins outright,
//! and [`cors_layer`] adds the credentials-enabled CORS headers (and answers
//! preflights) for the origins that got through.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::error::AppError;

/// Exact-match origin allow-list, immutable after startup.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Arc<Vec<String>>);

impl AllowedOrigins {
    pub fn new(origins: Vec<String>) -> Self {
        Self(Arc::new(origins))
    }

    /// Requests without an `Origin` (same-origin, curl, server-to-server) always pass.
    pub fn permits(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(value) => match value.to_str() {
                Ok(s) => self.0.iter().any(|allowed| allowed == s),
                Err(_) => false,
            },
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

pub async fn cors_gate(State(origins): State<AllowedOrigins>, req: Request, next: Next) -> Response {
    let origin = req.headers().get(ORIGIN);
    if !origins.permits(origin) {
        let shown = origin.map(|o| String::from_utf8_lossy(o.as_bytes()).into_owned()).unwrap_or_default();
        return AppError::CorsRejected(shown).into_response();
    }
    next.run(req).await
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let list: Vec<HeaderValue> = origins
        .as_slice()
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Origen CORS inutilizable ignorado {:?}: {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
