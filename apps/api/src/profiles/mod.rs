// Profiles: one per user, with a server-derived completeness score.

pub mod completeness;
pub mod handlers;
