//! Storage seam for all tracker records.
//!
//! Every mutating operation is atomic: the derived state it maintains
//! (single active resume, vote counters, profile completeness) is written in
//! the same unit as the triggering change, or not at all.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Contact, NewContact, NewResume, Profile, ProfileFields, Resume, VoteType};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Upper bound on a single discovery page.
pub const MAX_DISCOVERY_LIMIT: i64 = 200;

#[async_trait]
pub trait TrackerStore: Send + Sync {
    // ── Resumes ──────────────────────────────────────────────────────────

    /// Uploads a resume. If it is active, the owner's other active resumes
    /// are deactivated in the same write.
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError>;

    async fn set_resume_active(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        is_active: bool,
    ) -> Result<Resume, AppError>;

    /// Owner's resumes, newest first.
    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError>;

    async fn active_resume(&self, user_id: Uuid) -> Result<Option<Resume>, AppError>;

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<(), AppError>;

    // ── Contacts ─────────────────────────────────────────────────────────

    async fn create_contact(&self, new: NewContact) -> Result<Contact, AppError>;

    async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError>;

    /// Contacts created by `user_id`, newest first.
    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError>;

    async fn set_contact_public(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
        is_public: bool,
    ) -> Result<Contact, AppError>;

    /// Deletes a contact and every vote on it.
    async fn delete_contact(&self, user_id: Uuid, contact_id: Uuid) -> Result<(), AppError>;

    /// Public contacts in discovery order (net score desc, newest first).
    async fn discover_contacts(&self, limit: i64) -> Result<Vec<Contact>, AppError>;

    // ── Votes ────────────────────────────────────────────────────────────

    /// Records `voter_id`'s vote, replacing any previous vote by the same
    /// voter on the same contact, and returns the recounted contact.
    async fn cast_vote(
        &self,
        contact_id: Uuid,
        voter_id: Uuid,
        vote_type: VoteType,
    ) -> Result<Contact, AppError>;

    /// Removes `voter_id`'s vote and returns the recounted contact.
    async fn retract_vote(&self, contact_id: Uuid, voter_id: Uuid) -> Result<Contact, AppError>;

    // ── Profiles ─────────────────────────────────────────────────────────

    /// Replaces the user's profile. Completeness is always recomputed.
    async fn save_profile(&self, user_id: Uuid, fields: ProfileFields) -> Result<Profile, AppError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
}

pub(crate) fn resume_not_found(resume_id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {resume_id} not found"))
}

pub(crate) fn contact_not_found(contact_id: Uuid) -> AppError {
    AppError::NotFound(format!("Contact {contact_id} not found"))
}

/// Rejects votes on contacts the voter cannot see.
pub(crate) fn ensure_can_vote(contact: &Contact, voter_id: Uuid) -> Result<(), AppError> {
    if contact.visible_to(voter_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Contact {} is private",
            contact.id
        )))
    }
}
