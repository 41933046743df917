//! Round-robin schedule generation (circle method).
//!
//! 1. Odd team counts get a bye slot appended.
//! 2. Round one pairs slot `2k` with `2k + 1`.
//! 3. Each later round rotates every team but the first one position around the ring.
//! 4. The full double round-robin is the single leg followed by its mirror, then an
//!    alternation pass mirrors every other round (except across the midpoint) so no team
//!    gets long home or away runs.
//!
//! Three and four teams use fixed schedules; rotation degenerates at those sizes.

use crate::models::{Fixture, Round, TeamId};
use log::debug;

/// A position in the rotation: a team, or the bye sentinel of an odd-sized group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Team(TeamId),
    Bye,
}

/// Build the ordered rounds for `teams`. One leg keeps only the first half.
///
/// `teams` must hold at least 3 distinct teams; the group validates this first.
pub fn build_schedule(teams: &[TeamId], one_leg: bool) -> Vec<Round> {
    let mut rounds = match teams.len() {
        3 => three_team_rounds(teams),
        4 => four_team_rounds(teams),
        _ => rotated_rounds(teams),
    };
    if one_leg {
        rounds.truncate(rounds.len() / 2);
    }
    debug!(
        "built {} round(s) for {} teams ({})",
        rounds.len(),
        teams.len(),
        if one_leg { "one leg" } else { "two legs" }
    );
    rounds
}

fn three_team_rounds(t: &[TeamId]) -> Vec<Round> {
    let first_leg = vec![
        Round::new(vec![Fixture::new(t[0], t[1], false), Fixture::bye(t[2])]),
        Round::new(vec![Fixture::new(t[1], t[2], false), Fixture::bye(t[0])]),
        Round::new(vec![Fixture::new(t[2], t[0], false), Fixture::bye(t[1])]),
    ];
    let second_leg: Vec<_> = first_leg.iter().map(Round::reversed).collect();
    first_leg.into_iter().chain(second_leg).collect()
}

fn four_team_rounds(t: &[TeamId]) -> Vec<Round> {
    let first_leg = vec![
        Round::new(vec![Fixture::new(t[0], t[1], false), Fixture::new(t[2], t[3], false)]),
        Round::new(vec![Fixture::new(t[3], t[0], false), Fixture::new(t[1], t[2], false)]),
        Round::new(vec![Fixture::new(t[1], t[3], false), Fixture::new(t[0], t[2], false)]),
    ];
    let second_leg = [
        first_leg[2].reversed(),
        first_leg[0].reversed(),
        first_leg[1].reversed(),
    ];
    first_leg.into_iter().chain(second_leg).collect()
}

fn rotated_rounds(teams: &[TeamId]) -> Vec<Round> {
    let mut slots: Vec<Slot> = teams.iter().copied().map(Slot::Team).collect();
    if slots.len() % 2 == 1 {
        slots.push(Slot::Bye);
    }

    let mut table = first_table(&slots);
    let mut single_leg = vec![round_from_table(&table)];
    for _ in 1..slots.len() - 1 {
        table = rotate(&table);
        single_leg.push(round_from_table(&table));
    }

    let mirrored: Vec<_> = single_leg.iter().map(Round::reversed).collect();
    let ordered: Vec<Round> = single_leg.into_iter().chain(mirrored).collect();
    alternate(ordered)
}

/// Rows of `[home, away]` slots for the first round.
fn first_table(slots: &[Slot]) -> Vec<[Slot; 2]> {
    slots.chunks_exact(2).map(|pair| [pair[0], pair[1]]).collect()
}

/// One step of the circle: row 0's home slot stays put, every other slot moves one place
/// around the ring. Away slots shift down a row, the last away slot wraps to the last home
/// slot, home slots shift up a row, and row 1's home slot folds into row 0's away slot.
///
/// The table keeps the bye slot where the rotation puts it, so whether the exempt team was
/// listed first or second carries over to the next step.
fn rotate(old: &[[Slot; 2]]) -> Vec<[Slot; 2]> {
    let rows = old.len();
    let mut new = vec![[Slot::Bye; 2]; rows];
    new[0][0] = old[0][0];
    for k in 0..rows {
        if k + 1 < rows {
            new[k + 1][1] = old[k][1];
        } else {
            new[rows - 1][0] = old[k][1];
        }
        match k {
            0 => {}
            1 => new[0][1] = old[1][0],
            _ => new[k - 1][0] = old[k][0],
        }
    }
    new
}

fn round_from_table(table: &[[Slot; 2]]) -> Round {
    let fixtures = table
        .iter()
        .map(|row| match (row[0], row[1]) {
            (Slot::Team(home), Slot::Team(away)) => Fixture::new(home, away, false),
            (Slot::Team(team), Slot::Bye) | (Slot::Bye, Slot::Team(team)) => Fixture::bye(team),
            (Slot::Bye, Slot::Bye) => unreachable!("only one bye slot exists"),
        })
        .collect();
    Round::new(fixtures)
}

/// Mirror every other round, except that the toggle holds across the midpoint.
fn alternate(ordered: Vec<Round>) -> Vec<Round> {
    let midpoint = ordered.len() / 2;
    let mut mirror = false;
    let mut out = Vec::with_capacity(ordered.len());
    for (i, round) in ordered.into_iter().enumerate() {
        out.push(if mirror { round.reversed() } else { round });
        if i + 1 != midpoint {
            mirror = !mirror;
        }
    }
    out
}
