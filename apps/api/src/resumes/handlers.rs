use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewResume, Resume};
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub user_id: Uuid,
    pub is_active: bool,
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<NewResume>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let resume = state.store.create_resume(req).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.store.list_resumes(params.user_id).await?))
}

/// GET /api/v1/resumes/active
pub async fn handle_get_active_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Resume>, AppError> {
    state
        .store
        .active_resume(params.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("User {} has no active resume", params.user_id))
        })
}

/// PATCH /api/v1/resumes/:id/active
pub async fn handle_set_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<Resume>, AppError> {
    let resume = state
        .store
        .set_resume_active(req.user_id, id, req.is_active)
        .await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.store.delete_resume(params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
