use uuid::Uuid;

use crate::models::Resume;

/// A resume write as seen by the single-active rule.
#[derive(Debug, Clone, Copy)]
pub struct ActivationWrite {
    pub resume_id: Uuid,
    pub user_id: Uuid,
    pub is_active: bool,
}

/// Returns the ids of resumes that must be deactivated, in the same write,
/// so that `write` leaves its owner with at most one active resume.
///
/// Only the owner's *other* active resumes are returned. Deactivating a
/// resume clears nothing: an owner may end up with zero active resumes and
/// none is promoted in its place.
pub fn competing_actives<'a, I>(write: &ActivationWrite, siblings: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = &'a Resume>,
{
    if !write.is_active {
        return Vec::new();
    }
    siblings
        .into_iter()
        .filter(|r| r.user_id == write.user_id && r.id != write.resume_id && r.is_active)
        .map(|r| r.id)
        .collect()
}
