//! Integration tests for knockout brackets.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tournament_engine::{Bracket, Decision, MatchSimulator, Team, TeamId, TournamentError};

fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|i| Team::new(format!("Club {i}"))).collect()
}

fn ids(teams: &[Team]) -> Vec<TeamId> {
    teams.iter().map(|t| t.id).collect()
}

/// Two-team, two-leg bracket with both legs recorded; returns the first leg's home team,
/// its opponent and the bracket.
fn two_leg_tie(first: (u32, u32), second: (u32, u32), seed: u64) -> (TeamId, TeamId, Bracket) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bracket = Bracket::new(teams(2), false, false, &mut rng).unwrap();
    let (host, visitor, first_id, second_id) = {
        let round = &bracket.rounds()[0];
        let first_leg = &round.first_leg().fixtures()[0];
        let second_leg = &round.second_leg().unwrap().fixtures()[0];
        (first_leg.home, first_leg.away_team().unwrap(), first_leg.id, second_leg.id)
    };
    bracket.record_result(first_id, first.0, first.1, &mut rng).unwrap();
    bracket.record_result(second_id, second.0, second.1, &mut rng).unwrap();
    (host, visitor, bracket)
}

#[test]
fn twenty_three_teams_give_nine_byes() {
    let t = teams(23);
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    let mut bracket = Bracket::new(t.clone(), true, true, &mut rng).unwrap();

    let first = &bracket.rounds()[0];
    assert_eq!(first.first_leg().fixtures().len(), 7);
    assert!(first.second_leg().is_none());
    assert_eq!(first.byes(), &ids(&t[..9])[..]);
    let playing: HashSet<TeamId> = first.first_leg().teams().collect();
    assert_eq!(playing, ids(&t[9..]).into_iter().collect());
    assert!(first.first_leg().fixtures().iter().all(|f| f.neutral));

    bracket.play_next(&MatchSimulator::default(), &mut rng).unwrap();
    let second = &bracket.rounds()[1];
    assert_eq!(second.first_leg().fixtures().len(), 8);
    assert!(second.byes().is_empty());
    let entrants: HashSet<TeamId> = second.entrants().into_iter().collect();
    assert_eq!(entrants.len(), 16);
    assert!(ids(&t[..9]).iter().all(|id| entrants.contains(id)));
}

#[test]
fn fifty_five_teams_play_twenty_three_preliminary_ties() {
    let t = teams(55);
    let mut rng = ChaCha8Rng::seed_from_u64(55);
    let bracket = Bracket::new(t.clone(), false, true, &mut rng).unwrap();

    let first = &bracket.rounds()[0];
    assert_eq!(first.first_leg().fixtures().len(), 23);
    assert_eq!(first.second_leg().map(|r| r.fixtures().len()), Some(23));
    let tail: HashSet<TeamId> = ids(&t[9..]).into_iter().collect();
    assert!(first.first_leg().teams().all(|id| tail.contains(&id)));
    assert_eq!(first.byes().len(), 9);
    assert!(first.first_leg().fixtures().iter().all(|f| !f.neutral));
}

#[test]
fn aggregate_then_away_goals_then_shootout() {
    // 3-0, 1-1: first-leg hosts win 4-1 on aggregate
    let (host, visitor, bracket) = two_leg_tie((3, 0), (1, 1), 1);
    let outcome = bracket.rounds()[0].outcomes()[0];
    assert_eq!(outcome.decision, Decision::Aggregate);
    assert_eq!((outcome.qualified, outcome.eliminated), (host, visitor));
    assert_eq!(bracket.winner(), Some(host));

    // 2-1, 1-0: 2-2 on aggregate, visitors scored once away, hosts never
    let (host, visitor, bracket) = two_leg_tie((2, 1), (1, 0), 2);
    let outcome = bracket.rounds()[0].outcomes()[0];
    assert_eq!(outcome.decision, Decision::AwayGoals);
    assert_eq!((outcome.qualified, outcome.eliminated), (visitor, host));

    // 1-1, 1-1: level on everything
    let (host, visitor, bracket) = two_leg_tie((1, 1), (1, 1), 3);
    let outcome = bracket.rounds()[0].outcomes()[0];
    assert_eq!(outcome.decision, Decision::Shootout);
    let pair: HashSet<TeamId> = [outcome.qualified, outcome.eliminated].into_iter().collect();
    assert_eq!(pair, [host, visitor].into_iter().collect());
    assert_eq!(bracket.winner(), Some(outcome.qualified));
}

#[test]
fn shootout_goes_both_ways_over_many_seeds() {
    let mut host_through = 0;
    for seed in 0..200 {
        let (host, _, bracket) = two_leg_tie((0, 0), (0, 0), seed);
        if bracket.winner() == Some(host) {
            host_through += 1;
        }
    }
    assert!((60..=140).contains(&host_through), "hosts went through {host_through} times");
}

#[test]
fn construction_errors() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(
        Bracket::new(teams(1), true, true, &mut rng).unwrap_err(),
        TournamentError::TooFewEntrants { required: 2, actual: 1 }
    );
    let mut t = teams(6);
    t.push(t[2].clone());
    assert_eq!(
        Bracket::new(t.clone(), true, true, &mut rng).unwrap_err(),
        TournamentError::DuplicateEntrant(t[2].id)
    );
}

#[test]
fn finished_bracket_has_nothing_left_to_play() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let sim = MatchSimulator::default();
    let mut bracket = Bracket::new(teams(5), false, true, &mut rng).unwrap();
    while !bracket.is_complete() {
        assert!(bracket.winner().is_none());
        bracket.play_next(&sim, &mut rng).unwrap();
    }
    assert!(bracket.winner().is_some());
    assert!(bracket.next_pending_round().is_none());
    assert_eq!(bracket.play_next(&sim, &mut rng), Err(TournamentError::NoRoundsLeft));
    // semi-finals over two legs, final over one
    let legs: Vec<usize> = bracket.rounds().iter().map(|r| r.legs().count()).collect();
    assert_eq!(legs, vec![2, 2, 1]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_bracket_ends_with_one_winner(
        n in 2usize..=40,
        one_leg: bool,
        one_leg_final: bool,
        seed: u64,
    ) {
        let t = teams(n);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sim = MatchSimulator::default();
        let mut bracket = Bracket::new(t.clone(), one_leg, one_leg_final, &mut rng).unwrap();
        while !bracket.is_complete() {
            bracket.play_next(&sim, &mut rng).unwrap();
        }

        let expected_rounds = n.next_power_of_two().trailing_zeros() as usize;
        prop_assert_eq!(bracket.rounds().len(), expected_rounds);

        let mut alive: HashSet<TeamId> = ids(&t).into_iter().collect();
        for round in bracket.rounds() {
            let entrants: HashSet<TeamId> = round.entrants().into_iter().collect();
            prop_assert_eq!(&entrants, &alive);
            for outcome in round.outcomes() {
                prop_assert!(alive.remove(&outcome.eliminated));
            }
            let two_legs = if entrants.len() == 2 { !one_leg_final } else { !one_leg };
            prop_assert_eq!(round.second_leg().is_some(), two_legs);
        }
        prop_assert_eq!(alive.len(), 1);
        prop_assert_eq!(bracket.winner(), alive.into_iter().next());
    }
}
