use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::contacts::votes::{tally, VoteTally};
use crate::errors::AppError;
use crate::models::{Contact, NewContact, NewResume, Profile, ProfileFields, Resume, VoteType};
use crate::profiles::completeness::compute_completeness;
use crate::resumes::active::{competing_actives, ActivationWrite};
use crate::store::{
    contact_not_found, ensure_can_vote, resume_not_found, TrackerStore, MAX_DISCOVERY_LIMIT,
};

/// Postgres-backed store. Each mutating operation runs in one transaction;
/// derived columns are written before commit.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks the owner's resume rows and clears every active sibling of `write`.
async fn enforce_single_active(
    tx: &mut Transaction<'_, Postgres>,
    write: &ActivationWrite,
) -> Result<(), AppError> {
    let siblings: Vec<Resume> =
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 FOR UPDATE")
            .bind(write.user_id)
            .fetch_all(&mut **tx)
            .await?;

    let cleared = competing_actives(write, &siblings);
    if cleared.is_empty() {
        return Ok(());
    }

    sqlx::query("UPDATE resumes SET is_active = FALSE, updated_at = now() WHERE id = ANY($1)")
        .bind(cleared.as_slice())
        .execute(&mut **tx)
        .await?;
    debug!(
        "Deactivated {} resume(s) for user {}",
        cleared.len(),
        write.user_id
    );
    Ok(())
}

/// Locks the contact row so recounts on the same contact serialize.
async fn lock_contact(
    tx: &mut Transaction<'_, Postgres>,
    contact_id: Uuid,
) -> Result<Contact, AppError> {
    sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1 FOR UPDATE")
        .bind(contact_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| contact_not_found(contact_id))
}

/// Full recount of a contact's counters from its live votes.
async fn recount(
    tx: &mut Transaction<'_, Postgres>,
    contact_id: Uuid,
) -> Result<Contact, AppError> {
    let raw: Vec<String> = sqlx::query_scalar("SELECT vote_type FROM votes WHERE contact_id = $1")
        .bind(contact_id)
        .fetch_all(&mut **tx)
        .await?;
    let vote_types = raw
        .iter()
        .map(|s| s.parse::<VoteType>())
        .collect::<Result<Vec<_>, _>>()?;
    let VoteTally { upvotes, downvotes } = tally(vote_types);

    let contact = sqlx::query_as::<_, Contact>(
        r#"
        UPDATE contacts
        SET upvotes = $2, downvotes = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(contact_id)
    .bind(upvotes)
    .bind(downvotes)
    .fetch_one(&mut **tx)
    .await?;

    debug!("Recounted contact {contact_id}: +{upvotes} -{downvotes}");
    Ok(contact)
}

#[async_trait]
impl TrackerStore for PgStore {
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError> {
        new.validate()?;
        let write = ActivationWrite {
            resume_id: Uuid::new_v4(),
            user_id: new.user_id,
            is_active: new.wants_active(),
        };

        let mut tx = self.pool.begin().await?;
        enforce_single_active(&mut tx, &write).await?;
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (id, user_id, name, file_ref, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(write.resume_id)
        .bind(write.user_id)
        .bind(new.name.trim())
        .bind(&new.file_ref)
        .bind(write.is_active)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Created resume {} for user {}", resume.id, resume.user_id);
        Ok(resume)
    }

    async fn set_resume_active(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        is_active: bool,
    ) -> Result<Resume, AppError> {
        let write = ActivationWrite {
            resume_id,
            user_id,
            is_active,
        };

        let mut tx = self.pool.begin().await?;
        enforce_single_active(&mut tx, &write).await?;
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes
            SET is_active = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(resume_id)
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(&mut *tx)
        .await?
        // Dropping `tx` here rolls back any sibling deactivation.
        .ok_or_else(|| resume_not_found(resume_id))?;
        tx.commit().await?;

        info!("Resume {resume_id} is_active={is_active} for user {user_id}");
        Ok(resume)
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
        Ok(sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn active_resume(&self, user_id: Uuid) -> Result<Option<Resume>, AppError> {
        Ok(sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 AND is_active LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(resume_not_found(resume_id));
        }
        info!("Deleted resume {resume_id} for user {user_id}");
        Ok(())
    }

    async fn create_contact(&self, new: NewContact) -> Result<Contact, AppError> {
        new.validate()?;
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts
                (id, user_id, company_name, contact_name, email, position, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.company_name.trim())
        .bind(&new.contact_name)
        .bind(new.email.trim())
        .bind(&new.position)
        .bind(new.is_public)
        .fetch_one(&self.pool)
        .await?;

        info!("Created contact {} for user {}", contact.id, contact.user_id);
        Ok(contact)
    }

    async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>, AppError> {
        Ok(
            sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
                .bind(contact_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError> {
        Ok(sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_contact_public(
        &self,
        user_id: Uuid,
        contact_id: Uuid,
        is_public: bool,
    ) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET is_public = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(contact_id)
        .bind(user_id)
        .bind(is_public)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| contact_not_found(contact_id))?;

        info!("Contact {contact_id} is_public={is_public}");
        Ok(contact)
    }

    async fn delete_contact(&self, user_id: Uuid, contact_id: Uuid) -> Result<(), AppError> {
        // Votes go with the contact via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .bind(contact_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(contact_not_found(contact_id));
        }
        info!("Deleted contact {contact_id} for user {user_id}");
        Ok(())
    }

    async fn discover_contacts(&self, limit: i64) -> Result<Vec<Contact>, AppError> {
        Ok(sqlx::query_as::<_, Contact>(
            r#"
            SELECT * FROM contacts
            WHERE is_public
            ORDER BY (upvotes - downvotes) DESC, created_at DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(0, MAX_DISCOVERY_LIMIT))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn cast_vote(
        &self,
        contact_id: Uuid,
        voter_id: Uuid,
        vote_type: VoteType,
    ) -> Result<Contact, AppError> {
        let mut tx = self.pool.begin().await?;
        let contact = lock_contact(&mut tx, contact_id).await?;
        ensure_can_vote(&contact, voter_id)?;

        sqlx::query(
            r#"
            INSERT INTO votes (id, contact_id, voter_id, vote_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (contact_id, voter_id)
            DO UPDATE SET vote_type = EXCLUDED.vote_type, updated_at = now()
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contact_id)
        .bind(voter_id)
        .bind(vote_type.as_str())
        .execute(&mut *tx)
        .await?;

        let contact = recount(&mut tx, contact_id).await?;
        tx.commit().await?;

        info!("User {voter_id} voted {vote_type} on contact {contact_id}");
        Ok(contact)
    }

    async fn retract_vote(&self, contact_id: Uuid, voter_id: Uuid) -> Result<Contact, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_contact(&mut tx, contact_id).await?;

        let result = sqlx::query("DELETE FROM votes WHERE contact_id = $1 AND voter_id = $2")
            .bind(contact_id)
            .bind(voter_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No vote by user {voter_id} on contact {contact_id}"
            )));
        }

        let contact = recount(&mut tx, contact_id).await?;
        tx.commit().await?;

        info!("User {voter_id} retracted vote on contact {contact_id}");
        Ok(contact)
    }

    async fn save_profile(&self, user_id: Uuid, fields: ProfileFields) -> Result<Profile, AppError> {
        let completeness = compute_completeness(&fields);
        let ProfileFields {
            full_name,
            phone,
            linkedin_url,
            bio,
            target_position,
            target_industry,
            profile_picture_url,
            github_url,
            portfolio_url,
            years_of_experience,
            education_level,
            preferred_locations,
            availability_date,
            salary_expectation,
            email_signature,
        } = fields;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (user_id, full_name, phone, linkedin_url, bio, target_position,
                 target_industry, profile_picture_url, github_url, portfolio_url,
                 years_of_experience, education_level, preferred_locations,
                 availability_date, salary_expectation, email_signature, completeness)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                linkedin_url = EXCLUDED.linkedin_url,
                bio = EXCLUDED.bio,
                target_position = EXCLUDED.target_position,
                target_industry = EXCLUDED.target_industry,
                profile_picture_url = EXCLUDED.profile_picture_url,
                github_url = EXCLUDED.github_url,
                portfolio_url = EXCLUDED.portfolio_url,
                years_of_experience = EXCLUDED.years_of_experience,
                education_level = EXCLUDED.education_level,
                preferred_locations = EXCLUDED.preferred_locations,
                availability_date = EXCLUDED.availability_date,
                salary_expectation = EXCLUDED.salary_expectation,
                email_signature = EXCLUDED.email_signature,
                completeness = EXCLUDED.completeness,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(phone)
        .bind(linkedin_url)
        .bind(bio)
        .bind(target_position)
        .bind(target_industry)
        .bind(profile_picture_url)
        .bind(github_url)
        .bind(portfolio_url)
        .bind(years_of_experience)
        .bind(education_level)
        .bind(preferred_locations)
        .bind(availability_date)
        .bind(salary_expectation)
        .bind(email_signature)
        .bind(completeness)
        .fetch_one(&self.pool)
        .await?;

        info!("Saved profile for user {user_id} (completeness {completeness}%)");
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}
