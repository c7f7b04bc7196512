use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// A company contact. `upvotes` and `downvotes` are maintained from the
/// votes table and are never written by users directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Contact {
    pub id: Uuid,
    /// Creator; the only user allowed to modify the contact.
    pub user_id: Uuid,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: String,
    pub position: Option<String>,
    pub is_public: bool,
    pub is_verified: bool,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Whether `user_id` may see (and vote on) this contact.
    pub fn visible_to(&self, user_id: Uuid) -> bool {
        self.is_public || self.user_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub user_id: Uuid,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewContact {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.company_name.trim().is_empty() {
            return Err(AppError::Validation("company name must not be empty".into()));
        }
        if !looks_like_email(&self.email) {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}
