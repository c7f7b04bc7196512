use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Profile, ProfileFields};
use crate::profiles::completeness::{completeness_report, CompletenessReport};
use crate::routes::UserIdQuery;
use crate::state::AppState;

/// Body of PUT /api/v1/profile. Any `completeness` the client sends is
/// dropped during deserialization.
#[derive(Debug, Deserialize)]
pub struct SaveProfileRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

/// PUT /api/v1/profile
pub async fn handle_save_profile(
    State(state): State<AppState>,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.store.save_profile(req.user_id, req.fields).await?))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Profile>, AppError> {
    state
        .store
        .get_profile(params.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No profile for user {}", params.user_id)))
}

/// GET /api/v1/profile/completeness
/// A user without a saved profile reports 0% with every field missing.
pub async fn handle_profile_completeness(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CompletenessReport>, AppError> {
    let fields = state
        .store
        .get_profile(params.user_id)
        .await?
        .map(|p| p.fields)
        .unwrap_or_default();
    Ok(Json(completeness_report(&fields)))
}
