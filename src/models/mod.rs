//! Data structures: teams, fixtures, rounds, standings and errors.

mod error;
mod fixture;
mod round;
mod standings;
mod team;

pub use error::TournamentError;
pub use fixture::{Fixture, FixtureState, MatchId, Opponent};
pub use round::{Round, RoundStatus};
pub use standings::StandingsRow;
pub use team::{FixedStrength, StrengthLookup, Team, TeamId, TeamStrength};
