//! API route handlers - maps HTTP endpoints to git operations.
//!
//! - `repository`: Basic repo info (GET /api/v1/repository)
//! - `history`: File history across renames (GET /api/v1/repository/history)

pub mod history;
pub mod repository;

use std::time::Duration;

use axum::Router;

use crate::git::SharedRepo;

/// Shared handler state: the open repository plus server-wide history defaults.
#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepo,
    pub threshold: u32,
    pub timeout: Option<Duration>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(history::routes(state))
}
