//! Knockout bracket: power-of-two rounds, a partial preliminary round when needed,
//! one- or two-leg ties resolved by score, aggregate, away goals or shootout.

use crate::logic::group::validate_teams;
use crate::logic::MatchSimulator;
use crate::models::{Fixture, MatchId, Round, StrengthLookup, Team, TeamId, TournamentError};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fewest teams a bracket can hold.
pub const MIN_BRACKET_TEAMS: usize = 2;

/// How a tie was decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Single leg, won on the day.
    Score,
    /// Two legs, more goals over both.
    Aggregate,
    /// Two legs level on aggregate, more goals scored away.
    AwayGoals,
    /// Coin flip after everything else was level.
    Shootout,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TieOutcome {
    pub qualified: TeamId,
    pub eliminated: TeamId,
    pub decision: Decision,
}

/// One knockout pairing: its first leg and, for two-leg ties, the return leg.
#[derive(Clone, Copy, Debug)]
pub struct Tie<'a> {
    pub first_leg: &'a Fixture,
    pub second_leg: Option<&'a Fixture>,
}

impl Tie<'_> {
    /// Decide who goes through. `None` until every leg is played.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<TieOutcome> {
        let a = self.first_leg.home;
        let b = self.first_leg.away_team()?;
        let legs: Vec<&Fixture> = std::iter::once(self.first_leg).chain(self.second_leg).collect();
        if legs.iter().any(|leg| !leg.is_played()) {
            return None;
        }

        let decided = |qualified: TeamId, decision| {
            let eliminated = if qualified == a { b } else { a };
            Some(TieOutcome {
                qualified,
                eliminated,
                decision,
            })
        };

        let goals = |team: TeamId| -> u32 {
            legs.iter()
                .filter_map(|leg| leg.goals_for(team))
                .map(|(f, _)| f)
                .sum()
        };
        let away_goals = |team: TeamId| -> u32 {
            legs.iter()
                .filter(|leg| leg.plays_away(team))
                .filter_map(|leg| leg.goals_for(team))
                .map(|(f, _)| f)
                .sum()
        };

        let (goals_a, goals_b) = (goals(a), goals(b));
        let by_goals = if self.second_leg.is_some() {
            Decision::Aggregate
        } else {
            Decision::Score
        };
        if goals_a != goals_b {
            return decided(if goals_a > goals_b { a } else { b }, by_goals);
        }
        if self.second_leg.is_some() {
            let (away_a, away_b) = (away_goals(a), away_goals(b));
            if away_a != away_b {
                return decided(if away_a > away_b { a } else { b }, Decision::AwayGoals);
            }
        }
        decided(if rng.gen_bool(0.5) { a } else { b }, Decision::Shootout)
    }
}

/// One stage of the bracket: its leg(s), the teams that skip it, and once all legs are
/// played, the outcome of each tie.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnockoutRound {
    first_leg: Round,
    second_leg: Option<Round>,
    byes: Vec<TeamId>,
    outcomes: Vec<TieOutcome>,
}

impl KnockoutRound {
    pub fn first_leg(&self) -> &Round {
        &self.first_leg
    }

    pub fn second_leg(&self) -> Option<&Round> {
        self.second_leg.as_ref()
    }

    pub fn legs(&self) -> impl Iterator<Item = &Round> {
        std::iter::once(&self.first_leg).chain(self.second_leg.as_ref())
    }

    /// Teams carried into the next round without playing this one.
    pub fn byes(&self) -> &[TeamId] {
        &self.byes
    }

    /// Empty until the round is resolved.
    pub fn outcomes(&self) -> &[TieOutcome] {
        &self.outcomes
    }

    pub fn is_resolved(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// Ties in fixture order; the return leg sits at the same index as its first leg.
    pub fn ties(&self) -> Vec<Tie<'_>> {
        self.first_leg
            .fixtures()
            .iter()
            .enumerate()
            .map(|(i, first_leg)| Tie {
                first_leg,
                second_leg: self.second_leg.as_ref().map(|r| &r.fixtures()[i]),
            })
            .collect()
    }

    /// Teams that go on: tie winners, then byes. Empty until resolved.
    pub fn qualified(&self) -> Vec<TeamId> {
        if !self.is_resolved() {
            return Vec::new();
        }
        self.outcomes
            .iter()
            .map(|o| o.qualified)
            .chain(self.byes.iter().copied())
            .collect()
    }

    /// Teams alive at the start of this round.
    pub fn entrants(&self) -> Vec<TeamId> {
        self.first_leg.teams().chain(self.byes.iter().copied()).collect()
    }

    fn pending_leg_mut(&mut self) -> Option<&mut Round> {
        if !self.first_leg.is_complete() {
            return Some(&mut self.first_leg);
        }
        self.second_leg.as_mut().filter(|r| !r.is_complete())
    }

    fn pending_leg(&self) -> Option<&Round> {
        if !self.first_leg.is_complete() {
            return Some(&self.first_leg);
        }
        self.second_leg.as_ref().filter(|r| !r.is_complete())
    }

    fn resolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_resolved() || self.pending_leg().is_some() {
            return false;
        }
        let outcomes: Option<Vec<TieOutcome>> = self.ties().iter().map(|tie| tie.resolve(rng)).collect();
        match outcomes {
            Some(outcomes) => {
                self.outcomes = outcomes;
                true
            }
            None => false,
        }
    }
}

/// Elimination ladder over a list of teams ordered by bye priority (first = most likely to
/// skip the preliminary round).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bracket {
    teams: Vec<Team>,
    one_leg: bool,
    one_leg_final: bool,
    rounds: Vec<KnockoutRound>,
}

impl Bracket {
    pub fn new<R: Rng + ?Sized>(
        teams: Vec<Team>,
        one_leg: bool,
        one_leg_final: bool,
        rng: &mut R,
    ) -> Result<Self, TournamentError> {
        if teams.len() < MIN_BRACKET_TEAMS {
            return Err(TournamentError::TooFewEntrants {
                required: MIN_BRACKET_TEAMS,
                actual: teams.len(),
            });
        }
        validate_teams(&teams)?;

        let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        let playing = preliminary_size(ids.len());
        let (byes, participants) = ids.split_at(ids.len() - playing);

        let mut bracket = Self {
            teams,
            one_leg,
            one_leg_final,
            rounds: Vec::new(),
        };
        let first = bracket.build_round(participants.to_vec(), byes.to_vec(), rng);
        bracket.rounds.push(first);
        Ok(bracket)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn rounds(&self) -> &[KnockoutRound] {
        &self.rounds
    }

    /// Every leg built so far, in play order.
    pub fn legs(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter().flat_map(|r| r.legs())
    }

    /// The leg to play next, if any.
    pub fn next_pending_round(&self) -> Option<&Round> {
        self.rounds.last().and_then(KnockoutRound::pending_leg)
    }

    /// Teams not eliminated yet.
    pub fn remaining(&self) -> Vec<TeamId> {
        match self.rounds.last() {
            Some(round) if round.is_resolved() => round.qualified(),
            Some(round) => round.entrants(),
            None => Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.next_pending_round().is_none()
    }

    pub fn winner(&self) -> Option<TeamId> {
        match self.remaining().as_slice() {
            [winner] if self.is_complete() => Some(*winner),
            _ => None,
        }
    }

    /// Play the next pending leg. Finishing a round resolves its ties and builds the next
    /// round while more than one team remains.
    pub fn play_next<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        let leg = self
            .rounds
            .last_mut()
            .and_then(KnockoutRound::pending_leg_mut)
            .ok_or(TournamentError::NoRoundsLeft)?;
        leg.play(simulator, rng)?;
        self.advance(rng);
        Ok(())
    }

    /// Record a result for a fixture of the pending leg.
    pub fn record_result<R: Rng + ?Sized>(
        &mut self,
        fixture_id: MatchId,
        home_score: u32,
        away_score: u32,
        rng: &mut R,
    ) -> Result<(), TournamentError> {
        let leg = self
            .rounds
            .last_mut()
            .and_then(KnockoutRound::pending_leg_mut)
            .ok_or(TournamentError::NoRoundsLeft)?;
        leg.record_result(fixture_id, home_score, away_score)?;
        self.advance(rng);
        Ok(())
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(round) = self.rounds.last_mut() else {
            return;
        };
        if !round.resolve(rng) {
            return;
        }
        let pool = round.qualified();
        debug!(
            "knockout round {} resolved, {} team(s) remain",
            self.rounds.len(),
            pool.len()
        );
        if pool.len() > 1 {
            let next = self.build_round(pool, Vec::new(), rng);
            self.rounds.push(next);
        } else if let Some(winner) = pool.first() {
            let name = self
                .teams
                .iter()
                .find(|t| t.id == *winner)
                .map_or("?", |t| t.name.as_str());
            info!("bracket won by {name}");
        }
    }

    /// Pool size 2 is the final.
    fn is_two_leg(&self, pool_size: usize) -> bool {
        if pool_size == 2 {
            !self.one_leg_final
        } else {
            !self.one_leg
        }
    }

    fn build_round<R: Rng + ?Sized>(&self, mut participants: Vec<TeamId>, byes: Vec<TeamId>, rng: &mut R) -> KnockoutRound {
        let pool_size = participants.len() + byes.len();
        let two_legs = self.is_two_leg(pool_size);
        participants.shuffle(rng);
        let fixtures = participants
            .chunks_exact(2)
            .map(|pair| Fixture::new(pair[0], pair[1], !two_legs))
            .collect();
        let first_leg = Round::new(fixtures);
        let second_leg = two_legs.then(|| first_leg.reversed());
        debug!(
            "knockout round built: {} tie(s), {} bye(s), {}",
            participants.len() / 2,
            byes.len(),
            if two_legs { "two legs" } else { "one leg" }
        );
        KnockoutRound {
            first_leg,
            second_leg,
            byes,
            outcomes: Vec::new(),
        }
    }
}

/// How many of `n` teams play the first round: all of them for a power of two, otherwise
/// twice the excess over the previous power of two.
pub fn preliminary_size(n: usize) -> usize {
    let full = n.next_power_of_two();
    if full == n {
        n
    } else {
        2 * (n - full / 2)
    }
}
