use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Reference to the uploaded file in blob storage.
    pub file_ref: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResume {
    pub user_id: Uuid,
    pub name: String,
    pub file_ref: String,
    /// Uploading makes the new resume active unless the caller says otherwise.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewResume {
    pub fn wants_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("resume name must not be empty".into()));
        }
        if self.file_ref.trim().is_empty() {
            return Err(AppError::Validation("resume file reference must not be empty".into()));
        }
        Ok(())
    }
}
