use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::contacts::ranking::rank_for_discovery;
use crate::contacts::votes::tally;
use crate::errors::AppError;
use crate::models::{
    Contact, NewContact, NewResume, Profile, ProfileFields, Resume, Vote, VoteType,
};
use crate::profiles::completeness::compute_completeness;
use crate::resumes::active::{competing_actives, ActivationWrite};
use crate::store::{
    contact_not_found, ensure_can_vote, resume_not_found, TrackerStore, MAX_DISCOVERY_LIMIT,
};

#[derive(Default)]
struct MemoryState {
    resumes: HashMap<Uuid, Resume>,
    contacts: HashMap<Uuid, Contact>,
    /// Keyed by (contact_id, voter_id): one vote per voter per contact.
    votes: HashMap<(Uuid, Uuid), Vote>,
    profiles: HashMap<Uuid, Profile>,
}

impl MemoryState {
    /// Clears the owner's other active resumes ahead of `write`.
    fn enforce_single_active(&mut self, write: &ActivationWrite) {
        let cleared = competing_actives(write, self.resumes.values());
        let now = Utc::now();
        for id in &cleared {
            if let Some(r) = self.resumes.get_mut(id) {
                r.is_active = false;
                r.updated_at = now;
            }
        }
        if !cleared.is_empty() {
            debug!(
                "Deactivated {} resume(s) for user {}",
                cleared.len(),
                write.user_id
            );
        }
    }

    /// Full recount of a contact's counters from its live votes.
    fn recount(&mut self, contact_id: Uuid) -> Result<Contact, AppError> {
        let counts = tally(
            self.votes
                .values()
                .filter(|v| v.contact_id == contact_id)
                .map(|v| v.vote_type),
        );
        let contact = self
            .contacts
            .get_mut(&contact_id)
            .ok_or_else(|| contact_not_found(contact_id))?;
        contact.upvotes = counts.upvotes;
        contact.downvotes = counts.downvotes;
        contact.updated_at = Utc::now();
        debug!(
            "Recounted contact {contact_id}: +{} -{}",
            counts.upvotes, counts.downvotes
        );
        Ok(contact.clone())
    }

    fn owned_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<&Resume, AppError> {
        self.resumes
            .get(&resume_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| resume_not_found(resume_id))
    }
}

/// In-process store. One lock guards all state, so every operation is
/// applied atomically with respect to every other.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError> {
        new.validate()?;
        let mut state = self.state.lock().await;

        let now = Utc::now();
        let resume = Resume {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            is_active: new.wants_active(),
            name: new.name.trim().to_string(),
            file_ref: new.file_ref,
            created_at: now,
            updated_at: now,
        };
        state.enforce_single_active(&ActivationWrite {
            resume_id: resume.id,
            user_id: resume.user_id,
            is_active: resume.is_active,
        });
        state.resumes.insert(resume.id, resume.clone());

        info!("Created resume {} for user {}", resume.id, resume.user_id);
        Ok(resume)
    }

    async fn set_resume_active(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        is_active: bool,
    ) -> Result<Resume, AppError> {
        let mut state = self.state.lock().await;
        state.owned_resume(user_id, resume_id)?;

        state.enforce_single_active(&ActivationWrite {
            resume_id,
            user_id,
            is_active,
        });
        let resume = state
            .resumes
            .get_mut(&resume_id)
            .ok_or_else(|| resume_not_found(resume_id))?;
        resume.is_active = is_active;
        resume.updated_at = Utc::now();

        info!("Resume {resume_id} is_active={is_active} for user {user_id}");
        Ok(resume.clone())
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
        let state = self.state.lock().await;
        let mut resumes: Vec<Resume> = state
            .resumes
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        resumes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(resumes)
    }

    async fn active_resume(&self, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .resumes
            .values()
            .find(|r| r.user_id == user_id && r.is_active)
            .cloned())
    }

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.owned_resume(user_id, resume_id)?;
        state.resumes.remove(&resume_id);
        info!("Deleted resume {resume_id} for user {user_id}");
        Ok(())
    }

    async fn create_contact(&self, new: NewContact) -> Result<Contact, AppError> {
        new.validate()?;
        let mut state = self.state.lock().await;

        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            company_name: new.company_name.trim().to_string(),
            contact_name: new.contact_name,
            email: new.email.trim().to_string(),
            position: new.position,
            is_public: new.is_public,
            is_verified: false,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        };
        state.contacts.insert(contact.id, contact.clone());

        info!("Created contact {} for user {}", contact.id, contact.user_id);
        Ok(contact)
    }

    async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError> {
        let state = self.state.lock().await;
        Ok(state.contacts.get(&contact_id).cloned())
    }

    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError> {
        let state = self.state.lock().await;
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(contacts)
    }

    async fn set_contact_public(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
        is_public: bool,
    ) -> Result<Contact, AppError> {
        let mut state = self.state.lock().await;
        let contact = state
            .contacts
            .get_mut(&contact_id)
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| contact_not_found(contact_id))?;
        contact.is_public = is_public;
        contact.updated_at = Utc::now();

        info!("Contact {contact_id} is_public={is_public}");
        Ok(contact.clone())
    }

    async fn delete_contact(&self, user_id: Uuid, contact_id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let owned = state
            .contacts
            .get(&contact_id)
            .is_some_and(|c| c.user_id == user_id);
        if !owned {
            return Err(contact_not_found(contact_id));
        }
        state.contacts.remove(&contact_id);
        state.votes.retain(|(cid, _), _| *cid != contact_id);

        info!("Deleted contact {contact_id} for user {user_id}");
        Ok(())
    }

    async fn discover_contacts(&self, limit: i64) -> Result<Vec<Contact>, AppError> {
        let limit = limit.clamp(0, MAX_DISCOVERY_LIMIT) as usize;
        let state = self.state.lock().await;
        let mut public: Vec<Contact> = state
            .contacts
            .values()
            .filter(|c| c.is_public)
            .cloned()
            .collect();
        rank_for_discovery(&mut public);
        public.truncate(limit);
        Ok(public)
    }

    async fn cast_vote(
        &self,
        contact_id: Uuid,
        voter_id: Uuid,
        vote_type: VoteType,
    ) -> Result<Contact, AppError> {
        let mut state = self.state.lock().await;
        let contact = state
            .contacts
            .get(&contact_id)
            .ok_or_else(|| contact_not_found(contact_id))?;
        ensure_can_vote(contact, voter_id)?;

        let now = Utc::now();
        state
            .votes
            .entry((contact_id, voter_id))
            .and_modify(|v| {
                v.vote_type = vote_type;
                v.updated_at = now;
            })
            .or_insert_with(|| Vote {
                id: Uuid::new_v4(),
                contact_id,
                voter_id,
                vote_type,
                created_at: now,
                updated_at: now,
            });

        info!("User {voter_id} voted {vote_type} on contact {contact_id}");
        state.recount(contact_id)
    }

    async fn retract_vote(&self, contact_id: Uuid, voter_id: Uuid) -> Result<Contact, AppError> {
        let mut state = self.state.lock().await;
        if !state.contacts.contains_key(&contact_id) {
            return Err(contact_not_found(contact_id));
        }
        if state.votes.remove(&(contact_id, voter_id)).is_none() {
            return Err(AppError::NotFound(format!(
                "No vote by user {voter_id} on contact {contact_id}"
            )));
        }

        info!("User {voter_id} retracted vote on contact {contact_id}");
        state.recount(contact_id)
    }

    async fn save_profile(&self, user_id: Uuid, fields: ProfileFields) -> Result<Profile, AppError> {
        let completeness = compute_completeness(&fields);
        let mut state = self.state.lock().await;

        let now = Utc::now();
        let created_at = state
            .profiles
            .get(&user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);
        let profile = Profile {
            user_id,
            fields,
            completeness,
            created_at,
            updated_at: now,
        };
        state.profiles.insert(user_id, profile.clone());

        info!("Saved profile for user {user_id} (completeness {completeness}%)");
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ranking::discovery_score;

    fn new_resume(user_id: Uuid, name: &str, is_active: Option<bool>) -> NewResume {
        NewResume {
            user_id,
            name: name.into(),
            file_ref: format!("resumes/{name}.pdf"),
            is_active,
        }
    }

    fn new_contact(user_id: Uuid, company: &str, is_public: bool) -> NewContact {
        NewContact {
            user_id,
            company_name: company.into(),
            contact_name: Some("Recruiter".into()),
            email: format!("jobs@{company}.io"),
            position: None,
            is_public,
        }
    }

    async fn active_count(store: &MemoryStore, user_id: Uuid) -> usize {
        store
            .list_resumes(user_id)
            .await
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .count()
    }

    async fn assert_counters_match_votes(store: &MemoryStore, contact_id: Uuid) {
        let state = store.state.lock().await;
        let contact = state.contacts.get(&contact_id).unwrap();
        let ups = state
            .votes
            .values()
            .filter(|v| v.contact_id == contact_id && v.vote_type == VoteType::Up)
            .count() as i32;
        let downs = state
            .votes
            .values()
            .filter(|v| v.contact_id == contact_id && v.vote_type == VoteType::Down)
            .count() as i32;
        assert_eq!((contact.upvotes, contact.downvotes), (ups, downs));
    }

    #[tokio::test]
    async fn test_upload_sequence_keeps_at_most_one_active() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let steps = [Some(true), None, Some(false), Some(true), None];
        for (i, is_active) in steps.into_iter().enumerate() {
            store
                .create_resume(new_resume(owner, &format!("cv{i}"), is_active))
                .await
                .unwrap();
            assert!(active_count(&store, owner).await <= 1);
        }

        let last = store.active_resume(owner).await.unwrap().unwrap();
        assert_eq!(last.name, "cv4");
    }

    #[tokio::test]
    async fn test_activation_does_not_touch_other_owners() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let bobs = store.create_resume(new_resume(bob, "bob", None)).await.unwrap();
        store.create_resume(new_resume(alice, "alice", None)).await.unwrap();

        let bob_active = store.active_resume(bob).await.unwrap().unwrap();
        assert_eq!(bob_active.id, bobs.id);
    }

    #[tokio::test]
    async fn test_set_active_switches_and_is_idempotent() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let first = store.create_resume(new_resume(owner, "first", None)).await.unwrap();
        let second = store.create_resume(new_resume(owner, "second", None)).await.unwrap();

        store.set_resume_active(owner, first.id, true).await.unwrap();
        store.set_resume_active(owner, first.id, true).await.unwrap();

        let resumes = store.list_resumes(owner).await.unwrap();
        let active: Vec<_> = resumes.iter().filter(|r| r.is_active).map(|r| r.id).collect();
        assert_eq!(active, vec![first.id]);
        assert!(resumes.iter().any(|r| r.id == second.id && !r.is_active));
    }

    #[tokio::test]
    async fn test_deactivating_sole_active_leaves_none() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_resume(new_resume(owner, "a", None)).await.unwrap();
        let b = store.create_resume(new_resume(owner, "b", None)).await.unwrap();

        store.set_resume_active(owner, b.id, false).await.unwrap();
        assert_eq!(active_count(&store, owner).await, 0);
        assert!(store.active_resume(owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_foreign_resume_is_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let r = store.create_resume(new_resume(owner, "a", None)).await.unwrap();

        let err = store
            .set_resume_active(Uuid::new_v4(), r.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = store.delete_resume(Uuid::new_v4(), r.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deleting_active_resume_promotes_nothing() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_resume(new_resume(owner, "old", None)).await.unwrap();
        let current = store.create_resume(new_resume(owner, "new", None)).await.unwrap();

        store.delete_resume(owner, current.id).await.unwrap();
        assert_eq!(store.list_resumes(owner).await.unwrap().len(), 1);
        assert!(store.active_resume(owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_contact_starts_at_zero() {
        let store = MemoryStore::new();
        let c = store
            .create_contact(new_contact(Uuid::new_v4(), "acme", true))
            .await
            .unwrap();
        assert_eq!((c.upvotes, c.downvotes), (0, 0));
        assert!(!c.is_verified);
    }

    #[tokio::test]
    async fn test_vote_sequence_recounts_after_each_mutation() {
        let store = MemoryStore::new();
        let c = store
            .create_contact(new_contact(Uuid::new_v4(), "acme", true))
            .await
            .unwrap();
        let voters: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        store.cast_vote(c.id, voters[0], VoteType::Up).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;
        store.cast_vote(c.id, voters[1], VoteType::Up).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;
        store.cast_vote(c.id, voters[2], VoteType::Down).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;
        store.cast_vote(c.id, voters[1], VoteType::Down).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;
        store.retract_vote(c.id, voters[0]).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;
        let after = store.cast_vote(c.id, voters[3], VoteType::Up).await.unwrap();
        assert_counters_match_votes(&store, c.id).await;

        assert_eq!((after.upvotes, after.downvotes), (1, 2));
    }

    #[tokio::test]
    async fn test_changing_vote_replaces_it() {
        let store = MemoryStore::new();
        let c = store
            .create_contact(new_contact(Uuid::new_v4(), "acme", true))
            .await
            .unwrap();
        let voter = Uuid::new_v4();

        let up = store.cast_vote(c.id, voter, VoteType::Up).await.unwrap();
        assert_eq!((up.upvotes, up.downvotes), (1, 0));
        let down = store.cast_vote(c.id, voter, VoteType::Down).await.unwrap();
        assert_eq!((down.upvotes, down.downvotes), (0, 1));

        let state = store.state.lock().await;
        assert_eq!(state.votes.len(), 1);
    }

    #[tokio::test]
    async fn test_retracting_last_vote_zeroes_counters() {
        let store = MemoryStore::new();
        let c = store
            .create_contact(new_contact(Uuid::new_v4(), "acme", true))
            .await
            .unwrap();
        let voter = Uuid::new_v4();
        store.cast_vote(c.id, voter, VoteType::Down).await.unwrap();

        let after = store.retract_vote(c.id, voter).await.unwrap();
        assert_eq!((after.upvotes, after.downvotes), (0, 0));

        let err = store.retract_vote(c.id, voter).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_private_contact_votes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let c = store
            .create_contact(new_contact(owner, "stealth", false))
            .await
            .unwrap();

        let err = store
            .cast_vote(c.id, Uuid::new_v4(), VoteType::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_counters_match_votes(&store, c.id).await;

        let own = store.cast_vote(c.id, owner, VoteType::Up).await.unwrap();
        assert_eq!(own.upvotes, 1);
    }

    #[tokio::test]
    async fn test_vote_on_missing_contact_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .cast_vote(Uuid::new_v4(), Uuid::new_v4(), VoteType::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_contact_drops_its_votes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let c = store.create_contact(new_contact(owner, "acme", true)).await.unwrap();
        store.cast_vote(c.id, Uuid::new_v4(), VoteType::Up).await.unwrap();

        let err = store.delete_contact(Uuid::new_v4(), c.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        store.delete_contact(owner, c.id).await.unwrap();
        assert!(store.get_contact(c.id).await.unwrap().is_none());
        assert!(store.state.lock().await.votes.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_ranking_scenario() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let a = store.create_contact(new_contact(owner, "a", true)).await.unwrap();
        let b = store.create_contact(new_contact(owner, "b", true)).await.unwrap();
        let c = store.create_contact(new_contact(owner, "c", true)).await.unwrap();
        store.create_contact(new_contact(owner, "hidden", false)).await.unwrap();

        // b older than c; scores (5,1), (3,0), (5,2)
        {
            let mut state = store.state.lock().await;
            let base = Utc::now();
            state.contacts.get_mut(&a.id).unwrap().created_at = base - chrono::Duration::hours(3);
            state.contacts.get_mut(&b.id).unwrap().created_at = base - chrono::Duration::hours(2);
            state.contacts.get_mut(&c.id).unwrap().created_at = base - chrono::Duration::hours(1);
        }
        for (id, ups, downs) in [(a.id, 5, 1), (b.id, 3, 0), (c.id, 5, 2)] {
            for _ in 0..ups {
                store.cast_vote(id, Uuid::new_v4(), VoteType::Up).await.unwrap();
            }
            for _ in 0..downs {
                store.cast_vote(id, Uuid::new_v4(), VoteType::Down).await.unwrap();
            }
        }

        let listed = store.discover_contacts(50).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
        let scores: Vec<_> = listed.iter().map(discovery_score).collect();
        assert_eq!(scores, vec![4, 3, 3]);

        assert_eq!(store.discover_contacts(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_completeness_is_server_derived() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let fields: ProfileFields = serde_json::from_value(serde_json::json!({
            "full_name": "Ada",
            "completeness": 999
        }))
        .unwrap();
        let saved = store.save_profile(user, fields).await.unwrap();
        assert_eq!(saved.completeness, 6);

        let empty = store.save_profile(user, ProfileFields::default()).await.unwrap();
        assert_eq!(empty.completeness, 0);
        assert_eq!(empty.created_at, saved.created_at);
        assert_eq!(
            store.get_profile(user).await.unwrap().unwrap().completeness,
            0
        );
    }
}
