//! File history endpoint.
//!
//! GET /api/v1/repository/history?path=<file>&threshold=<optional>&timeout_ms=<optional>
//!
//! Returns every commit that changed the file, oldest first, following renames.
//! The walk runs on a blocking thread and is cancelled if the request is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::git::HistoryOptions;
use crate::models::FileHistoryResponse;
use crate::routes::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository/history", get(get_history))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    path: String,
    threshold: Option<u32>,
    timeout_ms: Option<u64>,
}

/// Sets the flag whenever the handler ends, by completing or by being dropped
/// when the client goes away, so a walk still running in the blocking pool stops.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn history_options(state: &AppState, query: &HistoryQuery, cancel: Arc<AtomicBool>) -> Result<HistoryOptions> {
    let similarity_threshold = query.threshold.unwrap_or(state.threshold);
    if similarity_threshold > 100 {
        return Err(AppError::InvalidParameter(format!(
            "threshold must be between 0 and 100, got {}",
            similarity_threshold
        )));
    }

    Ok(HistoryOptions {
        similarity_threshold,
        timeout: query.timeout_ms.map(Duration::from_millis).or(state.timeout),
        cancel: Some(cancel),
    })
}

async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<FileHistoryResponse>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let options = history_options(&state, &query, cancel.clone())?;
    let _guard = CancelOnDrop(cancel);

    let repo = state.repo.clone();
    let response = tokio::task::spawn_blocking(move || repo.get_file_history(&query.path, &options))
        .await
        .map_err(|e| AppError::Internal(format!("History task failed: {}", e)))??;

    Ok(Json(response))
}
