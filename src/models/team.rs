//! Team (entrant) and its strength rating.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Unique identifier for a team (used in fixtures, standings and brackets).
pub type TeamId = Uuid;

/// A team taking part in a competition.
///
/// Two teams are the same team only if they share an id; names are display-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    /// Create a new team with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// A team handle is usable if it has a real id and a non-blank name.
    pub fn is_valid(&self) -> bool {
        !self.id.is_nil() && !self.name.trim().is_empty()
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Team {}

impl Hash for Team {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Offense/defense rating of a team, as seen by the match simulator.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub offense: u32,
    pub defense: u32,
}

impl TeamStrength {
    pub fn new(offense: u32, defense: u32) -> Self {
        Self { offense, defense }
    }

    /// Overall level: offense + defense.
    pub fn level(&self) -> u64 {
        u64::from(self.offense) + u64::from(self.defense)
    }
}

impl Default for TeamStrength {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

/// Looks up the strength of a team for simulation.
pub trait StrengthLookup {
    fn strength(&self, team: TeamId) -> TeamStrength;
}

/// Every team has the same strength.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FixedStrength(pub TeamStrength);

impl StrengthLookup for FixedStrength {
    fn strength(&self, _team: TeamId) -> TeamStrength {
        self.0
    }
}

impl<F> StrengthLookup for F
where
    F: Fn(TeamId) -> TeamStrength,
{
    fn strength(&self, team: TeamId) -> TeamStrength {
        self(team)
    }
}
