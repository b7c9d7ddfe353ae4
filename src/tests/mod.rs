//! Unit and router-level tests for the TiendaCL backend.
//!
//! Router tests drive the full application built by [`crate::build_router`]
//! through `tower::ServiceExt::oneshot`, with an in-memory store from
//! [`support`] standing in for PostgreSQL.
//!
//! ## Test Modules
//!
//! - **config_tests**: Required keys, defaults and the CORS allow-list
//! - **error_tests**: Error mapping and the generic 500 body
//! - **health_api_tests**: Root and healthcheck endpoints
//! - **cors_tests**: Origin gate and credentialed CORS headers
//! - **uploads_tests**: Static uploads serving and upload endpoint
//! - **auth_api_tests**: Registration, login, logout, sessions
//! - **market_api_tests**: Users, posts, profile, favorites, categories

pub mod support;
