use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::models::RepositoryInfo;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository", get(get_repository_info))
        .with_state(state)
}

async fn get_repository_info(State(state): State<AppState>) -> Result<Json<RepositoryInfo>> {
    let repo = state.repo.clone();
    let info = tokio::task::spawn_blocking(move || repo.info())
        .await
        .map_err(|e| crate::error::AppError::Internal(format!("Task failed: {}", e)))??;
    Ok(Json(info))
}
