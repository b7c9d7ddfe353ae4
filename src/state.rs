use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::MarketStore;

/// The shared application state.
///
/// Built once in `main` and cloned into every handler by axum. The store
/// wraps the one process-wide connection pool; nothing here is mutated after
/// startup.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for every route module.
    pub store: Arc<dyn MarketStore>,
    /// Validated configuration (secrets, CORS allow-list, uploads directory).
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, config: AppConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }
}
