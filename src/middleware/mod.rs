//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns that sit in front of the route modules: the origin
//! allow-list, token/cookie authentication and static serving of uploads.

pub mod auth;
pub mod cors;
pub mod uploads;

pub use auth::AuthUser;
pub use cors::AllowedOrigins;
