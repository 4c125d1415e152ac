use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Job, NewJob, SearchFilters};
use crate::state::AppState;

/// Raw listing filters as the search form sends them; `type=` means all.
#[derive(Deserialize)]
pub struct JobSearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
}

/// GET /api/v1/jobs
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let filters = SearchFilters::from_raw(
        params.query.as_deref(),
        params.location.as_deref(),
        params.job_type.as_deref(),
    )?;
    let jobs = state.marketplace.lock().await.search(&filters);
    Ok(Json(jobs))
}

/// POST /api/v1/jobs
pub async fn handle_post_job(
    State(state): State<AppState>,
    Json(req): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state.marketplace.lock().await.post_job(req)?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    let job = state
        .marketplace
        .lock()
        .await
        .job(id)
        .cloned()
        .ok_or(AppError::JobNotFound(id))?;
    Ok(Json(job))
}
