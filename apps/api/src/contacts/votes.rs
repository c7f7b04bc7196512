use serde::{Deserialize, Serialize};

use crate::models::VoteType;

/// Vote counters for a single contact.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteTally {
    pub upvotes: i32,
    pub downvotes: i32,
}

/// Recounts a contact's votes from scratch.
///
/// Callers pass every live vote for the contact; counters are replaced
/// with the result, never adjusted incrementally.
pub fn tally<I>(votes: I) -> VoteTally
where
    I: IntoIterator<Item = VoteType>,
{
    votes
        .into_iter()
        .fold(VoteTally::default(), |mut acc, vote| {
            match vote {
                VoteType::Up => acc.upvotes += 1,
                VoteType::Down => acc.downvotes += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally_is_zero() {
        assert_eq!(tally(Vec::<VoteType>::new()), VoteTally::default());
    }

    #[test]
    fn test_mixed_votes() {
        let t = tally([VoteType::Up, VoteType::Down, VoteType::Up]);
        assert_eq!(t, VoteTally { upvotes: 2, downvotes: 1 });
    }
}
