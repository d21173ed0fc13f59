//! Leaderboard ordering.
//!
//! The documented ranking is ascending by vote count; callers that want
//! highest-first pass `order=desc` explicitly. Ties always break by
//! creation time (oldest first) so the ordering is stable.

use serde::Deserialize;

/// Direction of the vote-count sort for a leaderboard query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOrder {
    /// Lowest vote count first (the documented default).
    #[default]
    Asc,
    /// Highest vote count first.
    Desc,
}

impl VoteOrder {
    /// SQL sort keyword for this direction.
    pub fn sql_keyword(self) -> &'static str {
        match self {
            VoteOrder::Asc => "ASC",
            VoteOrder::Desc => "DESC",
        }
    }
}
