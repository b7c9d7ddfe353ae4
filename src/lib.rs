//! # TiendaCL Backend Library
//!
//! REST backend for the TiendaCL marketplace: accounts, profiles, listings
//! ("posts"), favorites, categories and image uploads, stored in PostgreSQL.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: HTTP server and routing
//! - **SQLx**: Asynchronous PostgreSQL access through a single shared pool
//! - **Tokio**: Async runtime
//! - **Serde**: JSON (de)serialization
//!
//! ## Core Components
//!
//! - [`config`]: Configuration loading and fatal startup validation
//! - [`db`]: Pool construction, startup connection check and schema bootstrap
//! - [`error`]: Centralized error handling; the only place errors become HTTP bodies
//! - [`middleware`]: CORS allow-list, authentication, uploads serving
//! - [`routes`]: Route modules and the top-level router
//! - [`state`]: Shared application state
//! - [`store`]: Persistence trait and its PostgreSQL implementation
//! - [`types`]: Rows and request/response DTOs

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use routes::build_router;
