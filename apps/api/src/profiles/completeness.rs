use serde::{Deserialize, Serialize};

use crate::models::ProfileFields;

type FilledPredicate = fn(&ProfileFields) -> bool;

/// Fields that count toward profile completeness, in display order.
/// Adding a tracked field is one entry here.
pub const TRACKED_FIELDS: &[(&str, FilledPredicate)] = &[
    ("full_name", |p| text_filled(&p.full_name)),
    ("phone", |p| text_filled(&p.phone)),
    ("linkedin_url", |p| text_filled(&p.linkedin_url)),
    ("bio", |p| text_filled(&p.bio)),
    ("target_position", |p| text_filled(&p.target_position)),
    ("target_industry", |p| text_filled(&p.target_industry)),
    ("profile_picture_url", |p| text_filled(&p.profile_picture_url)),
    ("github_url", |p| text_filled(&p.github_url)),
    ("portfolio_url", |p| text_filled(&p.portfolio_url)),
    ("years_of_experience", |p| p.years_of_experience.is_some_and(|y| y > 0)),
    ("education_level", |p| text_filled(&p.education_level)),
    ("preferred_locations", |p| {
        p.preferred_locations.as_ref().is_some_and(|l| !l.is_empty())
    }),
    ("availability_date", |p| p.availability_date.is_some()),
    ("salary_expectation", |p| text_filled(&p.salary_expectation)),
    ("email_signature", |p| text_filled(&p.email_signature)),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletenessReport {
    pub completeness: i32,
    pub filled_count: usize,
    pub tracked_count: usize,
    pub missing_fields: Vec<String>,
}

fn text_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub fn filled_count(fields: &ProfileFields) -> usize {
    TRACKED_FIELDS
        .iter()
        .filter(|(_, filled)| filled(fields))
        .count()
}

/// Percentage of tracked fields that are filled, truncated toward zero
/// (one of fifteen is 6, not 7).
pub fn compute_completeness(fields: &ProfileFields) -> i32 {
    let pct = filled_count(fields) * 100 / TRACKED_FIELDS.len();
    // bounded by 100
    pct as i32
}

pub fn missing_fields(fields: &ProfileFields) -> Vec<&'static str> {
    TRACKED_FIELDS
        .iter()
        .filter(|(_, filled)| !filled(fields))
        .map(|(name, _)| *name)
        .collect()
}

pub fn completeness_report(fields: &ProfileFields) -> CompletenessReport {
    CompletenessReport {
        completeness: compute_completeness(fields),
        filled_count: filled_count(fields),
        tracked_count: TRACKED_FIELDS.len(),
        missing_fields: missing_fields(fields)
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn full_profile() -> ProfileFields {
        ProfileFields {
            full_name: Some("Ada Lovelace".into()),
            phone: Some("+44 20 7946 0000".into()),
            linkedin_url: Some("https://linkedin.com/in/ada".into()),
            bio: Some("Analyst".into()),
            target_position: Some("SWE Intern".into()),
            target_industry: Some("Fintech".into()),
            profile_picture_url: Some("https://img/ada.png".into()),
            github_url: Some("https://github.com/ada".into()),
            portfolio_url: Some("https://ada.dev".into()),
            years_of_experience: Some(2),
            education_level: Some("Bachelor".into()),
            preferred_locations: Some(vec!["London".into()]),
            availability_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            salary_expectation: Some("30/h".into()),
            email_signature: Some("-- Ada".into()),
        }
    }

    #[test]
    fn test_fifteen_tracked_fields() {
        assert_eq!(TRACKED_FIELDS.len(), 15);
    }

    #[test]
    fn test_empty_profile_is_zero() {
        assert_eq!(compute_completeness(&ProfileFields::default()), 0);
    }

    #[test]
    fn test_full_profile_is_hundred() {
        assert_eq!(compute_completeness(&full_profile()), 100);
        assert!(missing_fields(&full_profile()).is_empty());
    }

    #[test]
    fn test_single_field_truncates_to_six() {
        let p = ProfileFields {
            bio: Some("hello".into()),
            ..Default::default()
        };
        assert_eq!(compute_completeness(&p), 6);
    }

    #[test]
    fn test_fourteen_fields_truncates_to_93() {
        let p = ProfileFields {
            email_signature: None,
            ..full_profile()
        };
        assert_eq!(compute_completeness(&p), 93);
        assert_eq!(missing_fields(&p), vec!["email_signature"]);
    }

    #[test]
    fn test_whitespace_text_is_not_filled() {
        let p = ProfileFields {
            full_name: Some("   ".into()),
            phone: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filled_count(&p), 0);
    }

    #[test]
    fn test_zero_experience_and_empty_locations_not_filled() {
        let p = ProfileFields {
            years_of_experience: Some(0),
            preferred_locations: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(filled_count(&p), 0);

        let p = ProfileFields {
            years_of_experience: Some(1),
            preferred_locations: Some(vec!["Remote".into()]),
            ..Default::default()
        };
        assert_eq!(filled_count(&p), 2);
    }

    #[test]
    fn test_report_lists_missing_in_order() {
        let p = ProfileFields {
            full_name: Some("Ada".into()),
            ..Default::default()
        };
        let report = completeness_report(&p);
        assert_eq!(report.filled_count, 1);
        assert_eq!(report.tracked_count, 15);
        assert_eq!(report.missing_fields.len(), 14);
        assert_eq!(report.missing_fields[0], "phone");
    }
}
