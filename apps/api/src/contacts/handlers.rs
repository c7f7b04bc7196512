use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contacts::ranking::discovery_score;
use crate::errors::AppError;
use crate::models::{Contact, NewContact, VoteType};
use crate::routes::UserIdQuery;
use crate::state::AppState;

const DEFAULT_DISCOVERY_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    pub limit: Option<i64>,
}

/// A discovery listing row: the contact plus its net score.
#[derive(Debug, Serialize)]
pub struct RankedContact {
    #[serde(flatten)]
    pub contact: Contact,
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub user_id: Uuid,
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub voter_id: Uuid,
    pub vote_type: VoteType,
}

/// POST /api/v1/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    Json(req): Json<NewContact>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let contact = state.store.create_contact(req).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/contacts
pub async fn handle_list_contacts(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(state.store.list_contacts(params.user_id).await?))
}

/// GET /api/v1/contacts/discover
pub async fn handle_discover_contacts(
    State(state): State<AppState>,
    Query(params): Query<DiscoverQuery>,
) -> Result<Json<Vec<RankedContact>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_DISCOVERY_LIMIT);
    if limit <= 0 {
        return Err(AppError::Validation("limit must be positive".into()));
    }
    let ranked = state
        .store
        .discover_contacts(limit)
        .await?
        .into_iter()
        .map(|contact| RankedContact {
            score: discovery_score(&contact),
            contact,
        })
        .collect();
    Ok(Json(ranked))
}

/// GET /api/v1/contacts/:id
/// Private contacts are only returned to their creator.
pub async fn handle_get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Contact>, AppError> {
    state
        .store
        .get_contact(id)
        .await?
        .filter(|c| c.visible_to(params.user_id))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))
}

/// PATCH /api/v1/contacts/:id/visibility
pub async fn handle_set_visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VisibilityRequest>,
) -> Result<Json<Contact>, AppError> {
    let contact = state
        .store
        .set_contact_public(req.user_id, id, req.is_public)
        .await?;
    Ok(Json(contact))
}

/// DELETE /api/v1/contacts/:id
pub async fn handle_delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.store.delete_contact(params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/contacts/:id/vote
pub async fn handle_cast_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Contact>, AppError> {
    let contact = state
        .store
        .cast_vote(id, req.voter_id, req.vote_type)
        .await?;
    Ok(Json(contact))
}

/// DELETE /api/v1/contacts/:id/vote
pub async fn handle_retract_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(state.store.retract_vote(id, params.user_id).await?))
}
