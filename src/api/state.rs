use std::sync::Arc;

use crate::db::{MemoryStore, PlatformRepository, ReviewRepository, WatchlistRepository};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub platforms: Arc<dyn PlatformRepository>,
    pub watchlist: Arc<dyn WatchlistRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AppState {
    /// Serves every repository from one store
    pub fn new<S>(store: S) -> Self
    where
        S: PlatformRepository + WatchlistRepository + ReviewRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            platforms: store.clone(),
            watchlist: store.clone(),
            reviews: store,
        }
    }

    /// Creates state backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}
