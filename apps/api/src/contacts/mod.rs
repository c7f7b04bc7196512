// Contacts: creation, visibility, voting, and discovery ranking.

pub mod handlers;
pub mod ranking;
pub mod votes;
