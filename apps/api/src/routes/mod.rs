pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::contacts::handlers as contacts;
use crate::profiles::handlers as profiles;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Caller identity for read and delete endpoints.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route(
            "/api/v1/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/active",
            get(resumes::handle_get_active_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/active",
            patch(resumes::handle_set_active),
        )
        // Contacts
        .route(
            "/api/v1/contacts",
            post(contacts::handle_create_contact).get(contacts::handle_list_contacts),
        )
        .route(
            "/api/v1/contacts/discover",
            get(contacts::handle_discover_contacts),
        )
        .route(
            "/api/v1/contacts/:id",
            get(contacts::handle_get_contact).delete(contacts::handle_delete_contact),
        )
        .route(
            "/api/v1/contacts/:id/visibility",
            patch(contacts::handle_set_visibility),
        )
        .route(
            "/api/v1/contacts/:id/vote",
            put(contacts::handle_cast_vote).delete(contacts::handle_retract_vote),
        )
        // Profile
        .route(
            "/api/v1/profile",
            put(profiles::handle_save_profile).get(profiles::handle_get_profile),
        )
        .route(
            "/api/v1/profile/completeness",
            get(profiles::handle_profile_completeness),
        )
        .with_state(state)
}
