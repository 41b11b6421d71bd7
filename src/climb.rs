use std::collections::HashMap;
use std::mem;

use itertools::{Itertools, MinMaxResult};
use log::{debug, trace};
use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::{HILL_CLIMB_STARTS, MAX_TEAM_SIZE, MIN_GENDER_PER_TEAM};
use crate::feasible::players_per_team;
use crate::model::entity::{Id, Player};
use crate::model::partition::Partition;
use crate::model::preference::{LockTarget, Locks, Preference};
use crate::score::{score, score_total, ScoreBreakdown};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SortError {
    #[error("team count must be at least 1, got {0}")]
    InvalidTeamCount(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortResult {
    pub partition: Partition,
    pub score: ScoreBreakdown,
}

/// Hard constraints: team sizes within one of each other, no team above
/// [`MAX_TEAM_SIZE`], and when `enforce_gender` is set, at least
/// [`MIN_GENDER_PER_TEAM`] of each gender on every non-empty team.
pub fn is_valid(partition: &Partition, enforce_gender: bool) -> bool {
    match partition.teams.iter().map(|team| team.players.len()).minmax() {
        MinMaxResult::NoElements => {}
        MinMaxResult::OneElement(size) => {
            if size > MAX_TEAM_SIZE {
                return false;
            }
        }
        MinMaxResult::MinMax(min, max) => {
            if max - min > 1 || max > MAX_TEAM_SIZE {
                return false;
            }
        }
    }
    if enforce_gender {
        for team in &partition.teams {
            if team.players.is_empty() {
                continue;
            }
            let males = team.players.iter().filter(|player| player.is_male()).count();
            let females = team.players.len() - males;
            if males < MIN_GENDER_PER_TEAM || females < MIN_GENDER_PER_TEAM {
                return false;
            }
        }
    }
    true
}

/// Round-robin the pool across teams, skipping teams already at capacity.
/// Players that fit nowhere become reserves.
fn deal(partition: &mut Partition, pool: Vec<Player>, per_team: usize) {
    let team_count = partition.teams.len();
    let mut cursor = 0;
    'players: for player in pool {
        for _ in 0..team_count {
            let team = &mut partition.teams[cursor % team_count];
            cursor += 1;
            if team.players.len() < per_team {
                team.players.push(player);
                continue 'players;
            }
        }
        partition.reserves.push(player);
    }
}

/// One randomized starting partition. Locked players are seated first and
/// hold their slot for the whole run; the rest are shuffled and dealt.
/// Validity is the optimizer's job, not the generator's.
fn initial_assignment(
    roster: &[Player],
    team_count: usize,
    enforce_gender: bool,
    locks: &Locks,
    rng: &mut SmallRng,
) -> Partition {
    let mut partition = Partition::empty(team_count);
    let mut free: Vec<Player> = Vec::new();
    for player in roster {
        match locks.get(&player.id) {
            Some(LockTarget::Team(index)) if *index < team_count => {
                partition.teams[*index].players.push(player.clone());
            }
            Some(LockTarget::Reserves) => partition.reserves.push(player.clone()),
            // A lock to a team that does not exist in this run is ignored.
            _ => free.push(player.clone()),
        }
    }

    let per_team = players_per_team(roster.len(), team_count);
    if enforce_gender {
        let (mut males, mut females): (Vec<Player>, Vec<Player>) =
            free.into_iter().partition(Player::is_male);
        males.shuffle(rng);
        females.shuffle(rng);
        deal(&mut partition, males, per_team);
        deal(&mut partition, females, per_team);
    } else {
        let mut pool = free;
        pool.shuffle(rng);
        deal(&mut partition, pool, per_team);
    }
    partition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    team_index: usize,
    player_index: usize,
}

/// Both moves exchange two players in place, so applying a move twice
/// restores the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    TeamSwap(Slot, Slot),
    ReserveSwap { slot: Slot, reserve_index: usize },
}

fn apply(partition: &mut Partition, player_team: &mut HashMap<Id, usize>, mv: Move) {
    match mv {
        Move::TeamSwap(a, b) => {
            let (first, second) = if a.team_index < b.team_index { (a, b) } else { (b, a) };
            let (left, right) = partition.teams.split_at_mut(second.team_index);
            let player_a = &mut left[first.team_index].players[first.player_index];
            let player_b = &mut right[0].players[second.player_index];
            player_team.insert(player_a.id, second.team_index);
            player_team.insert(player_b.id, first.team_index);
            mem::swap(player_a, player_b);
        }
        Move::ReserveSwap { slot, reserve_index } => {
            let Partition { teams, reserves } = partition;
            let player = &mut teams[slot.team_index].players[slot.player_index];
            let reserve = &mut reserves[reserve_index];
            player_team.remove(&player.id);
            player_team.insert(reserve.id, slot.team_index);
            mem::swap(player, reserve);
        }
    }
}

/// Every single-swap neighbor of the current partition that leaves locked
/// players untouched: all cross-team exchanges plus all team-reserve
/// exchanges.
fn candidate_moves(partition: &Partition, locks: &Locks) -> Vec<Move> {
    let unlocked = |player: &Player| !locks.contains_key(&player.id);
    let mut moves = Vec::new();

    for (team_a, team_b) in (0..partition.teams.len()).tuple_combinations() {
        for (index_a, player_a) in partition.teams[team_a].players.iter().enumerate() {
            if !unlocked(player_a) {
                continue;
            }
            for (index_b, player_b) in partition.teams[team_b].players.iter().enumerate() {
                if !unlocked(player_b) {
                    continue;
                }
                moves.push(Move::TeamSwap(
                    Slot { team_index: team_a, player_index: index_a },
                    Slot { team_index: team_b, player_index: index_b },
                ));
            }
        }
    }

    for (team_index, team) in partition.teams.iter().enumerate() {
        for (player_index, player) in team.players.iter().enumerate() {
            if !unlocked(player) {
                continue;
            }
            for (reserve_index, reserve) in partition.reserves.iter().enumerate() {
                if !unlocked(reserve) {
                    continue;
                }
                moves.push(Move::ReserveSwap {
                    slot: Slot { team_index, player_index },
                    reserve_index,
                });
            }
        }
    }

    moves
}

/// Steepest-ascent hill climb. Each pass tries every candidate move
/// tentatively (apply, validate, score, revert), then commits the single
/// best strict improvement; converged when a full pass commits nothing.
/// Returns the final score total.
fn hill_climb(
    partition: &mut Partition,
    preferences: &[Preference],
    enforce_gender: bool,
    locks: &Locks,
) -> f64 {
    let mut player_team = partition.player_team_map();
    let mut current = score_total(partition, preferences, &player_team);
    let mut passes = 0usize;

    loop {
        passes += 1;
        let mut best: Option<Move> = None;
        let mut best_total = current;

        for mv in candidate_moves(partition, locks) {
            apply(partition, &mut player_team, mv);
            if is_valid(partition, enforce_gender) {
                let total = score_total(partition, preferences, &player_team);
                if total > best_total {
                    best_total = total;
                    best = Some(mv);
                }
            }
            // Undo before the next candidate; moves are involutions.
            apply(partition, &mut player_team, mv);
        }

        match best {
            Some(mv) => {
                apply(partition, &mut player_team, mv);
                current = best_total;
            }
            None => break,
        }
    }

    trace!("hill climb converged after {passes} passes at {current:.3}");
    current
}

/// Split `players` into `team_count` teams plus reserves, balancing rating
/// and gender and honoring `preferences` and `locks`. Runs
/// [`HILL_CLIMB_STARTS`] independent randomized restarts and keeps the
/// best-scoring local optimum; ties keep the earlier run.
///
/// The gender quota is enforced only when the roster can support it for
/// this team count; otherwise the run silently falls back to best-effort
/// gender balancing.
pub fn sort_teams(
    players: &[Player],
    team_count: usize,
    preferences: &[Preference],
    locks: &Locks,
) -> Result<SortResult, SortError> {
    if team_count == 0 {
        return Err(SortError::InvalidTeamCount(team_count));
    }

    let males = players.iter().filter(|player| player.is_male()).count();
    let females = players.len() - males;
    let enforce_gender = males >= team_count * MIN_GENDER_PER_TEAM
        && females >= team_count * MIN_GENDER_PER_TEAM;

    let mut rng = SmallRng::from_entropy();
    let mut best_partition =
        initial_assignment(players, team_count, enforce_gender, locks, &mut rng);
    let mut best_total = hill_climb(&mut best_partition, preferences, enforce_gender, locks);
    debug!("restart 0: local optimum {best_total:.3}");

    for restart in 1..HILL_CLIMB_STARTS {
        let mut partition =
            initial_assignment(players, team_count, enforce_gender, locks, &mut rng);
        let total = hill_climb(&mut partition, preferences, enforce_gender, locks);
        debug!("restart {restart}: local optimum {total:.3}");
        if total > best_total {
            best_total = total;
            best_partition = partition;
        }
    }

    let breakdown = score(&best_partition, preferences);
    Ok(SortResult {
        partition: best_partition,
        score: breakdown,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::entity::Gender;
    use crate::model::preference::PreferenceKind::MustBeTogether;

    fn player(id: u32, gender: Gender, rating: f64) -> Player {
        Player {
            id,
            name: format!("Player {id}"),
            gender,
            rating: Some(rating),
            tier: None,
        }
    }

    /// Alternating genders, ratings cycling 1..=10.
    fn roster(size: u32) -> Vec<Player> {
        (0..size)
            .map(|id| {
                let gender = if id % 2 == 0 { Gender::Male } else { Gender::Female };
                player(id, gender, f64::from(id % 10 + 1))
            })
            .collect()
    }

    fn assert_complete(roster: &[Player], partition: &Partition) {
        let mut seen = HashSet::new();
        for team in &partition.teams {
            for p in &team.players {
                assert!(seen.insert(p.id), "player {} placed twice", p.id);
            }
        }
        for p in &partition.reserves {
            assert!(seen.insert(p.id), "player {} placed twice", p.id);
        }
        let expected: HashSet<u32> = roster.iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);
    }

    fn balanced_partition(sizes: &[usize]) -> Partition {
        let mut partition = Partition::empty(sizes.len());
        let mut id = 0;
        for (index, &size) in sizes.iter().enumerate() {
            for _ in 0..size {
                let gender = if id % 2 == 0 { Gender::Male } else { Gender::Female };
                partition.teams[index].players.push(player(id, gender, 5.0));
                id += 1;
            }
        }
        partition
    }

    #[test]
    fn validity_checks_size_spread_and_ceiling() {
        assert!(is_valid(&balanced_partition(&[5, 5]), false));
        assert!(is_valid(&balanced_partition(&[6, 5]), false));
        assert!(!is_valid(&balanced_partition(&[7, 5]), false));
        assert!(!is_valid(&balanced_partition(&[9, 8]), false));
    }

    #[test]
    fn validity_checks_gender_quota_only_when_enforced() {
        let mut partition = Partition::empty(2);
        for id in 0..5 {
            partition.teams[0].players.push(player(id, Gender::Male, 5.0));
        }
        for id in 5..10 {
            let gender = if id == 5 { Gender::Male } else { Gender::Female };
            partition.teams[1].players.push(player(id, gender, 5.0));
        }
        assert!(is_valid(&partition, false));
        // Team 0 has no female player.
        assert!(!is_valid(&partition, true));
    }

    #[test]
    fn initial_assignment_places_everyone_once() {
        let roster = roster(23);
        let mut rng = SmallRng::seed_from_u64(7);
        let partition = initial_assignment(&roster, 3, true, &Locks::new(), &mut rng);
        assert_complete(&roster, &partition);
        // 23 players over 3 teams: 7 per team, 2 reserves.
        for team in &partition.teams {
            assert_eq!(team.players.len(), 7);
        }
        assert_eq!(partition.reserves.len(), 2);
    }

    #[test]
    fn initial_assignment_honors_locks() {
        let roster = roster(12);
        let mut locks = Locks::new();
        locks.insert(3, LockTarget::Team(1));
        locks.insert(8, LockTarget::Reserves);
        let mut rng = SmallRng::seed_from_u64(7);
        let partition = initial_assignment(&roster, 2, true, &locks, &mut rng);

        assert!(partition.teams[1].players.iter().any(|p| p.id == 3));
        assert!(partition.reserves.iter().any(|p| p.id == 8));
        assert_complete(&roster, &partition);
    }

    #[test]
    fn lock_to_missing_team_falls_back_to_free() {
        let roster = roster(10);
        let mut locks = Locks::new();
        locks.insert(0, LockTarget::Team(5));
        let mut rng = SmallRng::seed_from_u64(7);
        let partition = initial_assignment(&roster, 2, true, &locks, &mut rng);
        assert_complete(&roster, &partition);
    }

    #[test]
    fn hill_climb_never_worsens_the_score() {
        let roster = roster(14);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut partition = initial_assignment(&roster, 2, true, &Locks::new(), &mut rng);
        let map = partition.player_team_map();
        let before = score_total(&partition, &[], &map);

        let after = hill_climb(&mut partition, &[], true, &Locks::new());
        assert!(after >= before);

        // The returned total matches the final state.
        let map = partition.player_team_map();
        assert!((after - score_total(&partition, &[], &map)).abs() < 1e-9);
    }

    #[test]
    fn sort_teams_rejects_zero_teams() {
        let roster = roster(12);
        assert_eq!(
            sort_teams(&roster, 0, &[], &Locks::new()),
            Err(SortError::InvalidTeamCount(0))
        );
    }

    #[test]
    fn twelve_players_two_teams_meet_all_hard_constraints() {
        let roster = roster(12);
        let result = sort_teams(&roster, 2, &[], &Locks::new()).unwrap();
        let partition = &result.partition;

        assert_complete(&roster, partition);
        assert_eq!(partition.teams.len(), 2);
        assert!(partition.reserves.is_empty());
        for team in &partition.teams {
            assert_eq!(team.players.len(), 6);
            assert!(team.players.iter().any(|p| p.is_male()));
            assert!(team.players.iter().any(|p| !p.is_male()));
        }
    }

    #[test]
    fn sort_teams_keeps_locked_placements() {
        let roster = roster(17);
        let mut locks = Locks::new();
        locks.insert(1, LockTarget::Team(0));
        locks.insert(6, LockTarget::Team(1));
        locks.insert(11, LockTarget::Reserves);

        let result = sort_teams(&roster, 2, &[], &locks).unwrap();
        let partition = &result.partition;
        assert!(partition.teams[0].players.iter().any(|p| p.id == 1));
        assert!(partition.teams[1].players.iter().any(|p| p.id == 6));
        assert!(partition.reserves.iter().any(|p| p.id == 11));
        assert_complete(&roster, partition);
    }

    #[test]
    fn single_gender_roster_still_balances_sizes() {
        let roster: Vec<Player> = (0..12)
            .map(|id| player(id, Gender::Male, f64::from(id % 10 + 1)))
            .collect();
        let result = sort_teams(&roster, 2, &[], &Locks::new()).unwrap();
        for team in &result.partition.teams {
            assert_eq!(team.players.len(), 6);
        }
    }

    #[test]
    fn satisfiable_must_pair_ends_up_together() {
        // Flat ratings and even genders, so reuniting the pair always has a
        // strictly improving swap available.
        let roster: Vec<Player> = (0..12)
            .map(|id| {
                let gender = if id % 2 == 0 { Gender::Male } else { Gender::Female };
                player(id, gender, 5.0)
            })
            .collect();
        let preferences = vec![Preference::new(0, 2, MustBeTogether)];

        let result = sort_teams(&roster, 2, &preferences, &Locks::new()).unwrap();
        assert!(
            result.score.must_violations.is_empty(),
            "pair split: {:?}",
            result.score.must_violations
        );
    }
}
