//! Router state
//!
//! One state value for the whole API. Handlers that only need a slice of
//! it extract that slice via `FromRef`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use super::middleware::AuthState;
use crate::application::AppServices;

#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    pub auth: AuthState,
    /// `None` when running on the in-memory store
    pub db: Option<DatabaseConnection>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(services: AppServices, auth: AuthState, db: Option<DatabaseConnection>) -> Self {
        Self {
            services,
            auth,
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}
