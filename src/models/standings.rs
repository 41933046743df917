//! Standings row: points and goals of one team, derived from played fixtures.

use crate::models::fixture::Fixture;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const POINTS_PER_WIN: u32 = 3;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: TeamId,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl StandingsRow {
    /// Tally `team`'s played, non-bye fixtures. Fixtures not involving `team` are skipped.
    pub fn from_fixtures<'a>(team: TeamId, fixtures: impl IntoIterator<Item = &'a Fixture>) -> Self {
        let mut row = Self {
            team,
            ..Self::default()
        };
        for fixture in fixtures {
            let Some((scored, conceded)) = fixture.goals_for(team) else {
                continue;
            };
            row.played += 1;
            row.goals_for += scored;
            row.goals_against += conceded;
            match scored.cmp(&conceded) {
                Ordering::Greater => row.wins += 1,
                Ordering::Equal => row.draws += 1,
                Ordering::Less => row.losses += 1,
            }
        }
        row
    }

    pub fn points(&self) -> u32 {
        POINTS_PER_WIN * self.wins + self.draws
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Ranking order: points, then goal difference, then goals scored (best first).
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .points()
            .cmp(&self.points())
            .then_with(|| other.goal_difference().cmp(&self.goal_difference()))
            .then_with(|| other.goals_for.cmp(&self.goals_for))
    }
}
