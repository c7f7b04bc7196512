use std::cmp::Ordering;

use crate::models::Contact;

/// Net score used to order contacts for discovery.
pub fn discovery_score(contact: &Contact) -> i64 {
    i64::from(contact.upvotes) - i64::from(contact.downvotes)
}

/// Discovery order: highest net score first, then newest first.
/// Ties on both fall back to id so the order is total.
pub fn discovery_order(a: &Contact, b: &Contact) -> Ordering {
    discovery_score(b)
        .cmp(&discovery_score(a))
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn rank_for_discovery(contacts: &mut [Contact]) {
    contacts.sort_by(discovery_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn contact(name: &str, up: i32, down: i32, age_minutes: i64) -> Contact {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_name: name.into(),
            contact_name: None,
            email: format!("hr@{name}.io"),
            position: None,
            is_public: true,
            is_verified: false,
            upvotes: up,
            downvotes: down,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_score_then_newest_first() {
        let a = contact("a", 5, 1, 30);
        let older_three = contact("b", 3, 0, 20);
        let newer_three = contact("c", 5, 2, 10);
        let mut list = vec![older_three.clone(), a.clone(), newer_three.clone()];

        rank_for_discovery(&mut list);

        let names: Vec<_> = list.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        let scores: Vec<_> = list.iter().map(discovery_score).collect();
        assert_eq!(scores, vec![4, 3, 3]);
    }

    #[test]
    fn test_negative_scores_sink() {
        let mut list = vec![contact("down", 0, 4, 0), contact("flat", 0, 0, 60)];
        rank_for_discovery(&mut list);
        assert_eq!(list[0].company_name, "flat");
    }
}
