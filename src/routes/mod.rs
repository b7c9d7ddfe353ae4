//! HTTP route handlers for the TiendaCL API.
//!
//! Each sub-module owns one resource and is mounted under its own prefix by
//! [`build_router`]:
//!
//! - `auth`: registration, login, logout, current user (`/api/auth`)
//! - `users`: public user listing and lookup (`/api/users`)
//! - `posts`: marketplace listings CRUD (`/api/posts`)
//! - `profile`: the caller's own profile (`/api/profile`)
//! - `favorites`: the caller's saved posts (`/api/favorites`)
//! - `categories`: category listing (`/api/categories`)
//! - `upload`: image uploads into the uploads directory (`/api/upload`)
//! - `health`: service identity and liveness

pub mod auth;
pub mod categories;
pub mod favorites;
pub mod health;
pub mod posts;
pub mod profile;
pub mod upload;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    error::{self, AppError, AppResult},
    middleware::{cors, uploads, AllowedOrigins},
    state::AppState,
};

/// JSON and multipart bodies alike (10 MB).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Full application: route modules, informational endpoints, uploads, the
/// JSON 404 fallback and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let origins = AllowedOrigins::new(state.config.allowed_origins.clone());
    let uploads_service = ServiceBuilder::new()
        .layer(from_fn(uploads::upload_headers))
        .service(uploads::serve_uploads(&state.config.uploads_dir));

    Router::new()
        .route("/", get(health::root))
        .route("/api/healthcheck", get(health::healthcheck))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/posts", posts::router())
        .nest("/api/profile", profile::router())
        .nest("/api/favorites", favorites::router())
        .nest("/api/categories", categories::router())
        .nest("/api/upload", upload::router())
        .nest_service("/uploads", uploads_service)
        .fallback(error::not_found)
        .method_not_allowed_fallback(error::not_found)
        .with_state(state)
        // Globales Body-Limit (10 MB) für JSON und Multipart
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(cors::cors_layer(&origins))
        // Outermost: foreign origins never reach CORS handling or routing
        .layer(from_fn_with_state(origins, cors::cors_gate))
}

pub(crate) fn parse_uuid(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError {
        field: field.to_string(),
        message: format!("'{}' no es un identificador válido", raw),
    })
}
