//! Application state shared across handlers.

use crate::config::Config;
use crate::db::CatalogStore;
use crate::error::{AppError, Result};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Catalog store; any [`CatalogStore`] can be injected.
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create application state around a store.
    pub fn new(config: Config, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Run a store operation off the async workers under the request deadline.
    pub async fn query<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn CatalogStore, Instant) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let deadline = Instant::now() + self.config.server.request_timeout();

        tokio::task::spawn_blocking(move || op(store.as_ref(), deadline))
            .await
            .map_err(|e| AppError::Internal(format!("Store task failed: {}", e)))?
    }
}
