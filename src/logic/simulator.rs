//! Match outcome simulator.
//!
//! The interval `[0, total)` (total = weighted home level + away level) is split into a
//! home-win zone, a draw zone and an away-win zone. One uniform draw picks the zone, a
//! normal draw picks the total number of goals (resampled until it fits the zone), and the
//! goals are then split so the zone's winner ends up ahead.

use crate::models::{FixedStrength, StrengthLookup, TeamId, TeamStrength, TournamentError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `goals_avg` and `goals_std_dev`.
pub const MAX_GOALS_PARAM: f64 = 100.0;
/// Upper bound accepted for `home_advantage`.
pub const MAX_HOME_ADVANTAGE: f64 = 10.0;
/// Ceiling on a simulated goal total.
const MAX_GOALS: u32 = 1_000;
/// Normal draws tried before the goal total falls back to the nearest fitting value.
const MAX_RESAMPLES: usize = 64;

/// Simulator constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Multiplier applied to the home side's level (ignored on neutral ground).
    pub home_advantage: f64,
    /// Share of the outcome interval given to draws.
    pub draw_rate: f64,
    /// Mean of the total goals distribution.
    pub goals_avg: f64,
    /// Standard deviation of the total goals distribution.
    pub goals_std_dev: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            home_advantage: 1.33,
            draw_rate: 0.25,
            goals_avg: 2.5,
            goals_std_dev: 1.7,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        let finite = [self.home_advantage, self.draw_rate, self.goals_avg, self.goals_std_dev]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(TournamentError::InvalidConfig("values must be finite".into()));
        }
        if self.home_advantage <= 0.0 || self.home_advantage > MAX_HOME_ADVANTAGE {
            return Err(TournamentError::InvalidConfig(format!(
                "home_advantage must be in (0, {MAX_HOME_ADVANTAGE}]"
            )));
        }
        if !(0.0..1.0).contains(&self.draw_rate) {
            return Err(TournamentError::InvalidConfig("draw_rate must be in [0, 1)".into()));
        }
        let in_range = |v: f64| v > 0.0 && v <= MAX_GOALS_PARAM;
        if !in_range(self.goals_avg) || !in_range(self.goals_std_dev) {
            return Err(TournamentError::InvalidConfig(format!(
                "goals_avg and goals_std_dev must be in (0, {MAX_GOALS_PARAM}]"
            )));
        }
        Ok(())
    }
}

/// Result category picked before the goal count.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

/// Produces scores for fixtures. Holds no random state; the caller passes the source in.
#[derive(Clone, Debug)]
pub struct MatchSimulator<S = FixedStrength> {
    config: SimulationConfig,
    strengths: S,
}

impl Default for MatchSimulator<FixedStrength> {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            strengths: FixedStrength::default(),
        }
    }
}

impl<S: StrengthLookup> MatchSimulator<S> {
    pub fn new(config: SimulationConfig, strengths: S) -> Result<Self, TournamentError> {
        config.validate()?;
        Ok(Self { config, strengths })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Score for `home` against `away`, using the strength lookup.
    pub fn play<R: Rng + ?Sized>(&self, rng: &mut R, home: TeamId, away: TeamId, neutral: bool) -> (u32, u32) {
        let home = self.strengths.strength(home);
        let away = self.strengths.strength(away);
        self.simulate(rng, home, away, neutral)
    }

    /// Score for two sides of the given strengths.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        home: TeamStrength,
        away: TeamStrength,
        neutral: bool,
    ) -> (u32, u32) {
        let advantage = if neutral { 1.0 } else { self.config.home_advantage };
        let home_level = home.level() as f64 * advantage;
        let away_level = away.level() as f64;
        let total = home_level + away_level;
        if total <= 0.0 {
            return (0, 0);
        }

        let draw_start = home_level * (1.0 - self.config.draw_rate);
        let draw_end = home_level + away_level * self.config.draw_rate;
        let x = rng.gen::<f64>() * total;
        let outcome = if x < draw_start {
            Outcome::HomeWin
        } else if x >= draw_end {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        };

        let balance = (i64::from(home.offense) - i64::from(away.defense))
            + (i64::from(away.offense) - i64::from(home.defense));
        let mean = (self.config.goals_avg * (1.0 + balance as f64 / 100.0)).clamp(0.0, f64::from(MAX_GOALS));
        let goals = self.total_goals(rng, mean, outcome);

        match outcome {
            Outcome::Draw => (goals / 2, goals / 2),
            Outcome::HomeWin => {
                let steps = walk_steps(x, draw_start, goals);
                (goals - (steps - 1), steps - 1)
            }
            Outcome::AwayWin => {
                let steps = walk_steps(total - x, total - draw_end, goals);
                (steps - 1, goals - (steps - 1))
            }
        }
    }

    /// Total goals from the normal distribution, resampled until it fits `outcome`:
    /// never negative, even for a draw, non-zero for a decisive result. Capped at
    /// `MAX_GOALS`; after `MAX_RESAMPLES` misses the mean itself is fitted instead.
    fn total_goals<R: Rng + ?Sized>(&self, rng: &mut R, mean: f64, outcome: Outcome) -> u32 {
        let fits = |goals: u32| match outcome {
            Outcome::Draw => goals % 2 == 0,
            Outcome::HomeWin | Outcome::AwayWin => goals > 0,
        };
        for _ in 0..MAX_RESAMPLES {
            let z: f64 = rng.sample(StandardNormal);
            let sample = mean + self.config.goals_std_dev * z;
            if sample < 0.0 {
                continue;
            }
            let goals = sample.trunc().min(f64::from(MAX_GOALS)) as u32;
            if fits(goals) {
                return goals;
            }
        }
        let goals = mean.trunc().clamp(0.0, f64::from(MAX_GOALS)) as u32;
        match outcome {
            Outcome::Draw => goals - goals % 2,
            Outcome::HomeWin | Outcome::AwayWin => goals.max(1),
        }
    }
}

/// Number of equal steps (zone / ceil(goals/2) each) needed to cover `distance`,
/// clamped to `1..=ceil(goals/2)` so the winner always stays ahead.
fn walk_steps(distance: f64, zone: f64, goals: u32) -> u32 {
    let slices = goals.div_ceil(2).max(1);
    let step = zone / f64::from(slices);
    let mut covered = 0.0;
    let mut steps = 0;
    loop {
        steps += 1;
        covered += step;
        if covered >= distance || steps == slices {
            return steps;
        }
    }
}
