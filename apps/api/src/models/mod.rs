pub mod contact;
pub mod profile;
pub mod resume;
pub mod vote;

pub use contact::{Contact, NewContact};
pub use profile::{Profile, ProfileFields};
pub use resume::{NewResume, Resume};
pub use vote::{Vote, VoteType};
