//! Tournament engine: round-robin groups, knockout brackets, group stages with tie-break
//! knockouts, and the match simulator that scores them.

pub mod logic;
pub mod models;

pub use logic::{
    build_schedule, preliminary_size, Bracket, Decision, Group, GroupStage, GroupStageSettings,
    KnockoutRound, MatchSimulator, Outcome, SimulationConfig, StageStatus, Tie, TieBreak,
    TieOutcome, TieResolver, MAX_GOALS_PARAM, MAX_HOME_ADVANTAGE,
};
pub use models::{
    FixedStrength, Fixture, FixtureState, MatchId, Opponent, Round, RoundStatus, StandingsRow,
    StrengthLookup, Team, TeamId, TeamStrength, TournamentError,
};
