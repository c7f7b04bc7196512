use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The descriptive profile fields a user may fill in. All optional.
/// Which of these count toward completeness is declared in
/// `profiles::completeness::TRACKED_FIELDS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(default)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub bio: Option<String>,
    pub target_position: Option<String>,
    pub target_industry: Option<String>,
    pub profile_picture_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub years_of_experience: Option<i32>,
    pub education_level: Option<String>,
    pub preferred_locations: Option<Vec<String>>,
    pub availability_date: Option<NaiveDate>,
    pub salary_expectation: Option<String>,
    pub email_signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: ProfileFields,
    /// Server-derived percentage in [0, 100].
    pub completeness: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
