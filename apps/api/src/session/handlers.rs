use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessDecision;
use crate::errors::AppError;
use crate::marketplace::Dashboard;
use crate::models::{Credentials, ProfileUpdate, Registration, Role, User};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

#[derive(Deserialize)]
pub struct AccessQuery {
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct AccessResponse {
    pub decision: AccessDecision,
    pub redirect_to: Option<&'static str>,
}

/// POST /api/v1/session/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<User>, AppError> {
    let user = state.marketplace.lock().await.login(&req).await?;
    Ok(Json(user))
}

/// POST /api/v1/session/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<Registration>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.marketplace.lock().await.register(&req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// DELETE /api/v1/session
pub async fn handle_logout(State(state): State<AppState>) -> StatusCode {
    state.marketplace.lock().await.logout().await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/session
pub async fn handle_current_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let user = state.marketplace.lock().await.current_user().cloned();
    Json(SessionResponse { user })
}

/// GET /api/v1/session/access?role=
pub async fn handle_access(
    State(state): State<AppState>,
    Query(params): Query<AccessQuery>,
) -> Json<AccessResponse> {
    let decision = state.marketplace.lock().await.access(params.role);
    Json(AccessResponse {
        decision,
        redirect_to: decision.redirect_to(),
    })
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let user = state.marketplace.lock().await.update_profile(req).await?;
    Ok(Json(user))
}

/// PATCH /api/v1/profile/:id
pub async fn handle_update_profile_of(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let user = state.marketplace.lock().await.update_profile_of(id, req).await?;
    Ok(Json(user))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let dashboard = state.marketplace.lock().await.dashboard()?;
    Ok(Json(dashboard))
}
