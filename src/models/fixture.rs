//! Fixture: one scheduled pairing (or a bye) and its play state.

use crate::logic::MatchSimulator;
use crate::models::error::TournamentError;
use crate::models::team::{StrengthLookup, TeamId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fixture.
pub type MatchId = Uuid;

/// Second slot of a fixture: a real opponent, or nobody (bye).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum Opponent {
    Team(TeamId),
    Bye,
}

impl Opponent {
    pub fn team(&self) -> Option<TeamId> {
        match self {
            Opponent::Team(id) => Some(*id),
            Opponent::Bye => None,
        }
    }
}

/// Play state of a fixture. Moves from `Unplayed` to `Played` exactly once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FixtureState {
    #[default]
    Unplayed,
    Played { home_score: u32, away_score: u32 },
}

/// A single fixture: `home` against `away`, or `home` exempt when `away` is a bye.
///
/// Fixtures are built by the schedulers only, so `home` never meets itself:
///
/// ```compile_fail
/// let team = tournament_engine::Team::new("Solo").id;
/// let _ = tournament_engine::Fixture::new(team, team, false);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: MatchId,
    pub home: TeamId,
    pub away: Opponent,
    /// Played on neutral ground (no home advantage).
    pub neutral: bool,
    state: FixtureState,
}

impl Fixture {
    /// `home` and `away` must differ.
    pub(crate) fn new(home: TeamId, away: TeamId, neutral: bool) -> Self {
        debug_assert_ne!(home, away, "a team cannot play itself");
        Self {
            id: Uuid::new_v4(),
            home,
            away: Opponent::Team(away),
            neutral,
            state: FixtureState::Unplayed,
        }
    }

    /// Fixture in which `team` is exempt.
    pub(crate) fn bye(team: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            home: team,
            away: Opponent::Bye,
            neutral: false,
            state: FixtureState::Unplayed,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.away == Opponent::Bye
    }

    pub fn away_team(&self) -> Option<TeamId> {
        self.away.team()
    }

    pub fn state(&self) -> FixtureState {
        self.state
    }

    pub fn is_played(&self) -> bool {
        matches!(self.state, FixtureState::Played { .. })
    }

    /// (home, away) score once played.
    pub fn score(&self) -> Option<(u32, u32)> {
        match self.state {
            FixtureState::Unplayed => None,
            FixtureState::Played {
                home_score,
                away_score,
            } => Some((home_score, away_score)),
        }
    }

    /// Teams involved (one for a bye, two otherwise).
    pub fn teams(&self) -> impl Iterator<Item = TeamId> {
        std::iter::once(self.home).chain(self.away.team())
    }

    pub fn includes(&self, team: TeamId) -> bool {
        self.home == team || self.away == Opponent::Team(team)
    }

    /// Whether `team` is the away side (never true for a bye).
    pub fn plays_away(&self, team: TeamId) -> bool {
        self.away == Opponent::Team(team)
    }

    /// Winner of a played, non-bye fixture; `None` on a draw.
    pub fn winner(&self) -> Option<TeamId> {
        let away = self.away.team()?;
        let (h, a) = self.score()?;
        if h > a {
            Some(self.home)
        } else if a > h {
            Some(away)
        } else {
            None
        }
    }

    /// Loser of a played, non-bye fixture; `None` on a draw.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner()?;
        if winner == self.home {
            self.away.team()
        } else {
            Some(self.home)
        }
    }

    /// (goals for, goals against) from `team`'s point of view, for a played non-bye fixture.
    pub fn goals_for(&self, team: TeamId) -> Option<(u32, u32)> {
        let away = self.away.team()?;
        let (h, a) = self.score()?;
        if team == self.home {
            Some((h, a))
        } else if team == away {
            Some((a, h))
        } else {
            None
        }
    }

    /// Same pairing with sides swapped (a bye stays a bye). Fresh id, unplayed.
    pub fn reversed(&self) -> Self {
        match self.away {
            Opponent::Bye => Self::bye(self.home),
            Opponent::Team(away) => Self::new(away, self.home, self.neutral),
        }
    }

    /// Simulate the fixture. A bye resolves without play.
    pub fn play<S, R>(
        &mut self,
        simulator: &MatchSimulator<S>,
        rng: &mut R,
    ) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        if self.is_played() {
            return Err(TournamentError::AlreadyPlayed);
        }
        let (home_score, away_score) = match self.away {
            Opponent::Bye => (0, 0),
            Opponent::Team(away) => simulator.play(rng, self.home, away, self.neutral),
        };
        self.state = FixtureState::Played {
            home_score,
            away_score,
        };
        Ok(())
    }

    /// Record a result from an outside source. Scores are ignored for a bye.
    pub fn record_result(&mut self, home_score: u32, away_score: u32) -> Result<(), TournamentError> {
        if self.is_played() {
            return Err(TournamentError::AlreadyPlayed);
        }
        self.state = if self.is_bye() {
            FixtureState::Played {
                home_score: 0,
                away_score: 0,
            }
        } else {
            FixtureState::Played {
                home_score,
                away_score,
            }
        };
        Ok(())
    }
}

impl std::fmt::Display for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.away, self.score()) {
            (Opponent::Bye, _) => write!(f, "{} exempt", self.home),
            (Opponent::Team(away), Some((h, a))) => write!(f, "{} - {} ({}-{})", self.home, away, h, a),
            (Opponent::Team(away), None) => write!(f, "{} - {}", self.home, away),
        }
    }
}
