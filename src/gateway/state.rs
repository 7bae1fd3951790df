use std::sync::Arc;

use crate::transfer::Store;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Ledger store (PostgreSQL or in-memory)
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}
