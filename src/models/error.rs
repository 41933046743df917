//! Errors for construction and play of groups, brackets and group stages.

use crate::models::fixture::MatchId;
use crate::models::team::TeamId;
use thiserror::Error;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Not enough teams to build the competition.
    #[error("Need at least {required} teams (got {actual})")]
    TooFewEntrants { required: usize, actual: usize },
    /// Team handle is unusable (nil id or blank name).
    #[error("Invalid team {0}")]
    InvalidEntrant(TeamId),
    /// The same team appears twice.
    #[error("Team {0} is listed more than once")]
    DuplicateEntrant(TeamId),
    /// Team is not part of this group.
    #[error("Team {0} is not in this group")]
    TeamNotInGroup(TeamId),
    /// Fixture or round has already been played.
    #[error("Already played")]
    AlreadyPlayed,
    /// Nothing left to play.
    #[error("No rounds left to play")]
    NoRoundsLeft,
    /// Group stage is already complete.
    #[error("Group stage is already complete")]
    AlreadyComplete,
    /// No pending fixture with this id.
    #[error("Fixture {0} not found among pending fixtures")]
    FixtureNotFound(MatchId),
    /// Group count is zero or larger than the team count.
    #[error("Invalid group count {groups} for {teams} teams")]
    InvalidGroupCount { groups: usize, teams: usize },
    /// Qualified count cannot be reached with these groups.
    #[error("Cannot qualify {qualified} teams: {reason}")]
    InvalidQualifiedCount { qualified: usize, reason: String },
    /// A seed tier (other than the last) is not a multiple of the group count.
    #[error("Seed tier {tier} has {size} teams, not a multiple of {groups} groups")]
    UnevenSeedTier {
        tier: usize,
        size: usize,
        groups: usize,
    },
    /// Simulator configuration out of range.
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}
