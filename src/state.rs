use std::sync::Arc;

use crate::auth::{OAuthProvider, PasswordHasher, TokenIssuer};
use crate::repo::{TaskStore, UserStore};
use crate::services::{AuthService, UserService};

/// Shared, read-only application state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub tasks: Arc<dyn TaskStore>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub tokens: Arc<TokenIssuer>,
    /// Base URL of the frontend, without a trailing slash.
    pub frontend_url: String,
}

impl AppState {
    /// Wires the services over the given stores.
    pub fn new(
        user_store: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        oauth: Arc<dyn OAuthProvider>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
        frontend_url: &str,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                user_store.clone(),
                hasher,
                tokens.clone(),
            )),
            users: Arc::new(UserService::new(user_store, hasher)),
            tasks,
            oauth,
            tokens,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }
}
