//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::db::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Signs and verifies session tokens
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, tokens: TokenService) -> Self {
        Self {
            repository,
            tokens: Arc::new(tokens),
        }
    }

    pub fn repo(&self) -> &dyn FullRepository {
        self.repository.as_ref()
    }
}
