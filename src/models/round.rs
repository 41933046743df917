//! Round (match day): a batch of fixtures played together.

use crate::logic::MatchSimulator;
use crate::models::error::TournamentError;
use crate::models::fixture::{Fixture, MatchId};
use crate::models::team::{StrengthLookup, TeamId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Progress of a round, computed from its fixtures.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    InProgress,
    Complete,
}

/// A set of fixtures in which every team appears at most once. Rounds come from the
/// schedulers; callers cannot assemble their own:
///
/// ```compile_fail
/// let _ = tournament_engine::Round::new(Vec::new());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    fixtures: Vec<Fixture>,
}

impl Round {
    /// `fixtures` must be non-empty, with no team in two of them.
    pub(crate) fn new(fixtures: Vec<Fixture>) -> Self {
        debug_assert!(!fixtures.is_empty(), "a round needs at least one fixture");
        debug_assert!(
            {
                let mut seen = std::collections::HashSet::new();
                fixtures.iter().flat_map(|f| f.teams()).all(|t| seen.insert(t))
            },
            "a team appears twice in the same round"
        );
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn status(&self) -> RoundStatus {
        let played = self.fixtures.iter().filter(|f| f.is_played()).count();
        if played == 0 {
            RoundStatus::Pending
        } else if played == self.fixtures.len() {
            RoundStatus::Complete
        } else {
            RoundStatus::InProgress
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == RoundStatus::Complete
    }

    /// Every team in the round, byes included.
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.fixtures.iter().flat_map(|f| f.teams())
    }

    pub fn includes(&self, team: TeamId) -> bool {
        self.fixtures.iter().any(|f| f.includes(team))
    }

    /// Play every unplayed fixture.
    pub fn play<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        if self.is_complete() {
            return Err(TournamentError::AlreadyPlayed);
        }
        for fixture in self.fixtures.iter_mut().filter(|f| !f.is_played()) {
            fixture.play(simulator, rng)?;
        }
        Ok(())
    }

    /// Record the result of one unplayed fixture of this round.
    pub fn record_result(
        &mut self,
        fixture_id: MatchId,
        home_score: u32,
        away_score: u32,
    ) -> Result<(), TournamentError> {
        self.fixtures
            .iter_mut()
            .find(|f| f.id == fixture_id)
            .ok_or(TournamentError::FixtureNotFound(fixture_id))?
            .record_result(home_score, away_score)
    }

    /// Mirror of this round: every pairing with sides swapped, byes unchanged.
    pub fn reversed(&self) -> Self {
        Self {
            fixtures: self.fixtures.iter().map(Fixture::reversed).collect(),
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, fixture) in self.fixtures.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{fixture}")?;
        }
        Ok(())
    }
}
