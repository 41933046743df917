//! Group stage: several groups played in step, then qualification.
//!
//! `qualified_count / group_count` teams qualify outright from every group. The remaining
//! `qualified_count % group_count` places are contested by the team ranked just below the
//! cut in each group, using the configured [`TieBreak`].

use crate::logic::group::{validate_teams, Group};
use crate::logic::knockout::Bracket;
use crate::logic::MatchSimulator;
use crate::models::{StandingsRow, StrengthLookup, Team, TeamId, TournamentError};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the contested places at the cut are decided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Overall standings comparison across groups.
    #[default]
    Ranking,
    /// Every contender enters a knockout (one or two legs, as the groups); the best
    /// ranked get the byes.
    KnockOut,
    /// Single-leg knockout without byes: the best ranked contenders, as many as the largest
    /// power of two available, play; the others are out. When that field could not fill the
    /// places, the best ranked go through directly and the next pairs play one round.
    Mixed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStageSettings {
    pub group_count: usize,
    #[serde(default)]
    pub one_leg: bool,
    pub qualified_count: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Current phase of the group stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Group rounds left to play.
    #[default]
    Playing,
    /// Groups done; a knockout is deciding the contested places.
    ResolvingTies,
    /// Every qualified team is known.
    Complete,
}

/// Knockout between contenders for `places` spots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TieResolver {
    bracket: Bracket,
    places: usize,
    /// Contenders, best overall ranking first.
    ranked: Vec<TeamId>,
}

impl TieResolver {
    pub fn bracket(&self) -> &Bracket {
        &self.bracket
    }

    pub fn places(&self) -> usize {
        self.places
    }

    /// Survivors once no more than `places` teams are left, topped up with the best
    /// ranked losers of the last round when the knockout cut too deep.
    fn settled(&self) -> Option<Vec<TeamId>> {
        let mut survivors = self.bracket.remaining();
        if survivors.len() > self.places {
            return None;
        }
        let shortfall = self.places - survivors.len();
        if shortfall > 0 {
            let mut losers: Vec<TeamId> = self
                .bracket
                .rounds()
                .iter()
                .rev()
                .find(|r| r.is_resolved())
                .map(|r| r.outcomes().iter().map(|o| o.eliminated).collect())
                .unwrap_or_default();
            losers.sort_by_key(|id| self.ranked.iter().position(|r| r == id));
            survivors.extend(losers.into_iter().take(shortfall));
        }
        Some(survivors)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupStage {
    settings: GroupStageSettings,
    groups: Vec<Group>,
    qualified: Vec<TeamId>,
    tie_resolver: Option<TieResolver>,
    status: StageStatus,
}

impl GroupStage {
    /// Deal each seed tier across the groups (shuffled within the tier) and build the
    /// groups. Every tier but the last must split evenly across the groups.
    pub fn new<R: Rng + ?Sized>(
        settings: GroupStageSettings,
        tiers: Vec<Vec<Team>>,
        rng: &mut R,
    ) -> Result<Self, TournamentError> {
        let all: Vec<Team> = tiers.iter().flatten().cloned().collect();
        validate_teams(&all)?;

        let total = all.len();
        let group_count = settings.group_count;
        if group_count == 0 || group_count > total {
            return Err(TournamentError::InvalidGroupCount {
                groups: group_count,
                teams: total,
            });
        }
        if let Some((index, tier)) = tiers
            .iter()
            .enumerate()
            .take(tiers.len().saturating_sub(1))
            .find(|(_, tier)| tier.len() % group_count != 0)
        {
            return Err(TournamentError::UnevenSeedTier {
                tier: index + 1,
                size: tier.len(),
                groups: group_count,
            });
        }
        check_qualified_count(settings.qualified_count, group_count, total)?;

        let mut buckets: Vec<Vec<Team>> = vec![Vec::new(); group_count];
        for mut tier in tiers {
            tier.shuffle(rng);
            for (i, team) in tier.into_iter().enumerate() {
                buckets[i % group_count].push(team);
            }
        }
        let groups = buckets
            .into_iter()
            .map(|teams| Group::new(teams, settings.one_leg))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "group stage: {} teams in {} groups, {} to qualify ({:?})",
            total, group_count, settings.qualified_count, settings.tie_break
        );
        Ok(Self {
            settings,
            groups,
            qualified: Vec::new(),
            tie_resolver: None,
            status: StageStatus::Playing,
        })
    }

    pub fn settings(&self) -> &GroupStageSettings {
        &self.settings
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == StageStatus::Complete
    }

    /// Teams qualified so far: outright qualifiers in group order, then contested places.
    pub fn qualified_teams(&self) -> &[TeamId] {
        &self.qualified
    }

    pub fn tie_resolver(&self) -> Option<&TieResolver> {
        self.tie_resolver.as_ref()
    }

    /// One unit of work: the next round of every unfinished group, or the next leg of the
    /// tie-break knockout.
    pub fn play_next<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        match self.status {
            StageStatus::Complete => Err(TournamentError::AlreadyComplete),
            StageStatus::Playing => {
                for group in self.groups.iter_mut().filter(|g| !g.is_complete()) {
                    group.play_next(simulator, rng)?;
                }
                if self.groups.iter().all(Group::is_complete) {
                    self.close_groups(rng)?;
                }
                Ok(())
            }
            StageStatus::ResolvingTies => {
                let resolver = self.tie_resolver.as_mut().ok_or(TournamentError::NoRoundsLeft)?;
                resolver.bracket.play_next(simulator, rng)?;
                if let Some(winners) = resolver.settled() {
                    self.qualified.extend(winners);
                    self.finish();
                }
                Ok(())
            }
        }
    }

    /// Play until complete.
    pub fn play_all<S, R>(&mut self, simulator: &MatchSimulator<S>, rng: &mut R) -> Result<(), TournamentError>
    where
        S: StrengthLookup,
        R: Rng + ?Sized,
    {
        while !self.is_complete() {
            self.play_next(simulator, rng)?;
        }
        Ok(())
    }

    fn close_groups<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), TournamentError> {
        let per_group = self.settings.qualified_count / self.groups.len();
        let places = self.settings.qualified_count % self.groups.len();

        let mut contenders: Vec<StandingsRow> = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut ranking = group.ranking().into_iter().map(|(_, row)| row);
            self.qualified.extend(ranking.by_ref().take(per_group).map(|row| row.team));
            if places > 0 {
                contenders.extend(ranking.next());
            }
        }
        debug!("{} team(s) qualified outright", self.qualified.len());

        if places == 0 {
            self.finish();
            return Ok(());
        }

        contenders.sort_by(StandingsRow::rank_cmp);
        let ranked: Vec<TeamId> = contenders.iter().map(|row| row.team).collect();

        let (entrants, one_leg, bracket_places) = match self.settings.tie_break {
            TieBreak::Ranking => {
                self.qualified.extend(ranked.iter().take(places).copied());
                self.finish();
                return Ok(());
            }
            TieBreak::KnockOut => (ranked.clone(), self.settings.one_leg, places),
            TieBreak::Mixed => {
                let (direct, size) = mixed_field(ranked.len(), places);
                self.qualified.extend(ranked.iter().take(direct).copied());
                (ranked[direct..direct + size].to_vec(), true, places - direct)
            }
        };

        let teams: Vec<Team> = entrants.iter().filter_map(|id| self.team(*id).cloned()).collect();
        info!(
            "{} contender(s) for {} place(s) go to a tie-break knockout",
            teams.len(),
            bracket_places
        );
        let bracket = Bracket::new(teams, one_leg, one_leg, rng)?;
        self.tie_resolver = Some(TieResolver {
            bracket,
            places: bracket_places,
            ranked,
        });
        self.status = StageStatus::ResolvingTies;
        Ok(())
    }

    fn finish(&mut self) {
        self.status = StageStatus::Complete;
        info!("group stage complete: {} team(s) qualified", self.qualified.len());
    }

    fn team(&self, id: TeamId) -> Option<&Team> {
        self.groups.iter().flat_map(|g| g.teams()).find(|t| t.id == id)
    }
}

/// Split `contenders` (ranked) for `places` under [`TieBreak::Mixed`] into
/// `(qualified directly, knockout field)`. The field is a power of two, so the knockout has
/// no byes. Expects `0 < places < contenders`.
fn mixed_field(contenders: usize, places: usize) -> (usize, usize) {
    let largest = prev_power_of_two(contenders);
    if largest > places {
        return (0, largest);
    }
    // one round of `field` teams settles `field / 2` places
    let field = 2 * prev_power_of_two(contenders - places);
    (places - field / 2, field)
}

fn prev_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

fn check_qualified_count(qualified: usize, groups: usize, teams: usize) -> Result<(), TournamentError> {
    let invalid = |reason: String| TournamentError::InvalidQualifiedCount { qualified, reason };
    if qualified == 0 {
        return Err(invalid("at least one team must qualify".into()));
    }
    if qualified > teams {
        return Err(invalid(format!("only {teams} teams take part")));
    }
    let smallest_group = teams / groups;
    let needed = qualified / groups + usize::from(qualified % groups > 0);
    if needed > smallest_group {
        return Err(invalid(format!(
            "needs {needed} teams per group, smallest group has {smallest_group}"
        )));
    }
    Ok(())
}
