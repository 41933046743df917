//! Group: a set of teams and its round-robin schedule.

use crate::logic::round_robin::build_schedule;
use crate::logic::MatchSimulator;
use crate::models::{Fixture, Round, StandingsRow, StrengthLookup, Team, TeamId, TournamentError};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fewest teams a group can hold.
pub const MIN_GROUP_TEAMS: usize = 3;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    teams: Vec<Team>,
    rounds: Vec<Round>,
}

impl Group {
    /// Validate `teams` and build the schedule (two legs unless `one_leg`).
    pub fn new(teams: Vec<Team>, one_leg: bool) -> Result<Self, TournamentError> {
        if teams.len() < MIN_GROUP_TEAMS {
            return Err(TournamentError::TooFewEntrants {
                required: MIN_GROUP_TEAMS,
                actual: teams.len(),
            });
        }
        validate_teams(&teams)?;

        let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        let rounds = build_schedule(&ids, one_leg);
        Ok(Self { teams, rounds })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn contains(&self, team: TeamId) -> bool {
        self.teams.iter().any(|t| t.id == team)
    }

    pub fn is_complete(&self) -> bool {
        self.rounds.iter().all(Round::is_complete)
    }

    /// First round that is not complete yet.
    pub fn next_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|r| !r.is_complete())
    }

    /// Play the next incomplete round.
    pub fn play_next<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        let index = self
            .rounds
            .iter()
            .position(|r| !r.is_complete())
            .ok_or(TournamentError::NoRoundsLeft)?;
        self.rounds[index].play(simulator, rng)?;
        debug!("group round {}/{} played", index + 1, self.rounds.len());
        Ok(())
    }

    /// Play every remaining round. Does nothing on a complete group.
    pub fn play_all<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        for round in self.rounds.iter_mut().filter(|r| !r.is_complete()) {
            round.play(simulator, rng)?;
        }
        Ok(())
    }

    /// Fixtures of `team` in schedule order, optionally filtered on play state and byes.
    pub fn matches_for(
        &self,
        team: TeamId,
        played: Option<bool>,
        exclude_byes: bool,
    ) -> Result<Vec<&Fixture>, TournamentError> {
        if !self.contains(team) {
            return Err(TournamentError::TeamNotInGroup(team));
        }
        Ok(self
            .rounds
            .iter()
            .flat_map(|r| r.fixtures())
            .filter(|f| f.includes(team))
            .filter(|f| played.map_or(true, |p| f.is_played() == p))
            .filter(|f| !exclude_byes || !f.is_bye())
            .collect())
    }

    pub fn standings_for(&self, team: TeamId) -> Result<StandingsRow, TournamentError> {
        let fixtures = self.matches_for(team, Some(true), true)?;
        Ok(StandingsRow::from_fixtures(team, fixtures))
    }

    /// Table sorted by points, goal difference, goals scored. Ranks start at 1; ties keep
    /// team order.
    pub fn ranking(&self) -> Vec<(usize, StandingsRow)> {
        let mut rows: Vec<StandingsRow> = self
            .teams
            .iter()
            .map(|team| {
                let fixtures = self.rounds.iter().flat_map(|r| r.fixtures());
                StandingsRow::from_fixtures(team.id, fixtures)
            })
            .collect();
        rows.sort_by(StandingsRow::rank_cmp);
        rows.into_iter().enumerate().map(|(i, row)| (i + 1, row)).collect()
    }
}

/// Reject unusable handles and duplicates.
pub(crate) fn validate_teams(teams: &[Team]) -> Result<(), TournamentError> {
    let mut seen = HashSet::with_capacity(teams.len());
    for team in teams {
        if !team.is_valid() {
            return Err(TournamentError::InvalidEntrant(team.id));
        }
        if !seen.insert(team.id) {
            return Err(TournamentError::DuplicateEntrant(team.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn teams(n: usize) -> Vec<Team> {
        (0..n).map(|i| Team::new(format!("T{i}"))).collect()
    }

    #[test]
    fn needs_three_distinct_valid_teams() {
        assert_eq!(
            Group::new(teams(2), false).unwrap_err(),
            TournamentError::TooFewEntrants { required: 3, actual: 2 }
        );

        let mut dup = teams(3);
        dup.push(dup[1].clone());
        assert_eq!(
            Group::new(dup.clone(), true).unwrap_err(),
            TournamentError::DuplicateEntrant(dup[1].id)
        );

        let mut blank = teams(3);
        blank[2].name = " ".into();
        assert_eq!(
            Group::new(blank.clone(), true).unwrap_err(),
            TournamentError::InvalidEntrant(blank[2].id)
        );
    }

    #[test]
    fn play_next_walks_the_schedule_then_stops() {
        let mut group = Group::new(teams(3), true).unwrap();
        let sim = MatchSimulator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for played in 1..=3 {
            group.play_next(&sim, &mut rng).unwrap();
            assert_eq!(group.rounds().iter().filter(|r| r.is_complete()).count(), played);
        }
        assert!(group.is_complete());
        assert!(group.next_round().is_none());
        assert_eq!(group.play_next(&sim, &mut rng), Err(TournamentError::NoRoundsLeft));
    }

    #[test]
    fn matches_for_filters_state_and_byes() {
        let t = teams(5);
        let mut group = Group::new(t.clone(), false).unwrap();
        let sim = MatchSimulator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        group.play_next(&sim, &mut rng).unwrap();

        let id = t[0].id;
        assert_eq!(group.matches_for(id, None, false).unwrap().len(), 10);
        assert_eq!(group.matches_for(id, None, true).unwrap().len(), 8);
        assert_eq!(group.matches_for(id, Some(true), false).unwrap().len(), 1);
        assert_eq!(group.matches_for(id, Some(false), false).unwrap().len(), 9);

        let stranger = Team::new("Stranger").id;
        assert_eq!(
            group.matches_for(stranger, None, false).unwrap_err(),
            TournamentError::TeamNotInGroup(stranger)
        );
    }

    #[test]
    fn ranking_orders_by_points_and_counts_played_matches() {
        let t = teams(4);
        let mut group = Group::new(t.clone(), true).unwrap();
        for round_index in 0..group.rounds.len() {
            let ids: Vec<_> = group.rounds[round_index].fixtures().iter().map(|f| f.id).collect();
            for id in ids {
                let fixture = group.rounds[round_index].fixtures().iter().find(|f| f.id == id).unwrap();
                // T0 beats everyone; every other match is a 1-1 draw
                let (h, a) = if fixture.home == t[0].id {
                    (2, 0)
                } else if fixture.away_team() == Some(t[0].id) {
                    (0, 2)
                } else {
                    (1, 1)
                };
                group.rounds[round_index].record_result(id, h, a).unwrap();
            }
        }

        let ranking = group.ranking();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking[0].0, 1);
        assert_eq!(ranking[0].1.team, t[0].id);
        assert_eq!(ranking[0].1.points(), 9);
        assert_eq!(ranking[0].1.played, 3);
        // the three others are level on everything; listed order breaks the tie
        let rest: Vec<_> = ranking[1..].iter().map(|(_, r)| r.team).collect();
        assert_eq!(rest, vec![t[1].id, t[2].id, t[3].id]);
        assert!(ranking[1..].iter().all(|(_, r)| r.points() == 2));
        assert_eq!(group.standings_for(t[1].id).unwrap().draws, 2);
    }
}
