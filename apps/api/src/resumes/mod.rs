// Resumes: upload, listing, and the single-active rule.

pub mod active;
pub mod handlers;
