//! Tournament logic: simulation, scheduling, groups, knockouts and group stages.

mod group;
mod group_stage;
mod knockout;
mod round_robin;
mod simulator;

pub use group::{Group, MIN_GROUP_TEAMS};
pub use group_stage::{GroupStage, GroupStageSettings, StageStatus, TieBreak, TieResolver};
pub use knockout::{preliminary_size, Bracket, Decision, KnockoutRound, Tie, TieOutcome, MIN_BRACKET_TEAMS};
pub use round_robin::build_schedule;
pub use simulator::{MatchSimulator, Outcome, SimulationConfig, MAX_GOALS_PARAM, MAX_HOME_ADVANTAGE};
