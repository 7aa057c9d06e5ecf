use std::sync::Arc;

use catalog_auth::{AuthService, TokenIssuer, TokenSettings, UserStore};
use catalog_infra::CatalogStore;

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub catalog: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Wire both services onto one backing store.
    pub fn new<S>(store: Arc<S>, tokens: &TokenSettings) -> Self
    where
        S: UserStore + CatalogStore + 'static,
    {
        let users: Arc<dyn UserStore> = store.clone();
        Self {
            auth: Arc::new(AuthService::new(users, TokenIssuer::new(tokens))),
            catalog: store,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("auth", &self.auth).finish_non_exhaustive()
    }
}
