use std::collections::HashMap;

use crate::config::{WEIGHT_GENDER, WEIGHT_RATING, WEIGHT_SOFT_PREF, WEIGHT_STRONG_PREF};
use crate::model::entity::{Id, Player};
use crate::model::partition::Partition;
use crate::model::preference::{Preference, PreferenceKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScore {
    pub raw: f64,
    pub weighted: f64,
}

impl ComponentScore {
    fn weighted(raw: f64, weight: f64) -> ComponentScore {
        ComponentScore {
            raw,
            weighted: weight * raw,
        }
    }
}

/// A `MustBeTogether` pair split across teams, by player name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairViolation {
    pub player_a: String,
    pub player_b: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftViolationKind {
    /// A `PreferTogether` pair ended up on different teams.
    Split,
    /// A `PreferApart` pair ended up on the same team.
    Together,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftViolation {
    pub player_a: String,
    pub player_b: String,
    pub kind: SoftViolationKind,
}

/// Per-objective scores plus the violated preferences, for display. All raw
/// components are penalties (non-positive); the total is their weighted sum,
/// so 0 is the unattainable ideal and higher is better.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub rating: ComponentScore,
    pub gender: ComponentScore,
    pub must_pairs: ComponentScore,
    pub soft_pairs: ComponentScore,
    pub must_violations: Vec<PairViolation>,
    pub soft_violations: Vec<SoftViolation>,
    pub total: f64,
}

fn roster_rating_mean(partition: &Partition) -> f64 {
    let roster_size = partition.roster_size();
    if roster_size == 0 {
        return 0.0;
    }
    let sum: f64 = partition
        .teams
        .iter()
        .flat_map(|team| &team.players)
        .chain(&partition.reserves)
        .map(Player::effective_rating)
        .sum();
    sum / roster_size as f64
}

/// Squared deviation of each team average from the roster average, negated.
fn rating_penalty(partition: &Partition) -> f64 {
    let overall = roster_rating_mean(partition);
    partition
        .teams
        .iter()
        .map(|team| {
            let deviation = team.average_rating() - overall;
            -(deviation * deviation)
        })
        .sum()
}

/// Absolute deviation of each non-empty team's male ratio from the roster
/// male ratio, negated.
fn gender_penalty(partition: &Partition) -> f64 {
    let roster_size = partition.roster_size();
    if roster_size == 0 {
        return 0.0;
    }
    let males = partition
        .teams
        .iter()
        .flat_map(|team| &team.players)
        .chain(&partition.reserves)
        .filter(|player| player.is_male())
        .count();
    let overall_ratio = males as f64 / roster_size as f64;

    partition
        .teams
        .iter()
        .filter(|team| !team.players.is_empty())
        .map(|team| {
            let team_males = team.players.iter().filter(|player| player.is_male()).count();
            let team_ratio = team_males as f64 / team.players.len() as f64;
            -(team_ratio - overall_ratio).abs()
        })
        .sum()
}

/// Total score only, no violation bookkeeping. This is the optimizer's inner
/// loop; `player_team` is the caller-maintained id-to-team map so preference
/// checks stay constant-time per record.
pub fn score_total(
    partition: &Partition,
    preferences: &[Preference],
    player_team: &HashMap<Id, usize>,
) -> f64 {
    let mut must = 0.0;
    let mut soft = 0.0;
    for pref in preferences {
        // A preference with either player in reserves is ignored outright.
        let (Some(&team_a), Some(&team_b)) =
            (player_team.get(&pref.a), player_team.get(&pref.b))
        else {
            continue;
        };
        match pref.kind {
            PreferenceKind::MustBeTogether if team_a != team_b => must -= 1.0,
            PreferenceKind::PreferTogether if team_a != team_b => soft -= 1.0,
            PreferenceKind::PreferApart if team_a == team_b => soft -= 1.0,
            _ => {}
        }
    }

    WEIGHT_RATING * rating_penalty(partition)
        + WEIGHT_GENDER * gender_penalty(partition)
        + WEIGHT_STRONG_PREF * must
        + WEIGHT_SOFT_PREF * soft
}

fn player_names(partition: &Partition) -> HashMap<Id, &str> {
    let mut names = HashMap::new();
    for team in &partition.teams {
        for player in &team.players {
            names.insert(player.id, player.name.as_str());
        }
    }
    names
}

fn display_name(names: &HashMap<Id, &str>, id: Id) -> String {
    match names.get(&id) {
        Some(name) => (*name).to_string(),
        None => format!("#{id}"),
    }
}

/// Full breakdown with violation lists. Pure: identical inputs always yield
/// an identical breakdown.
pub fn score(partition: &Partition, preferences: &[Preference]) -> ScoreBreakdown {
    let player_team = partition.player_team_map();
    let names = player_names(partition);

    let mut must_violations = Vec::new();
    let mut soft_violations = Vec::new();
    for pref in preferences {
        let (Some(&team_a), Some(&team_b)) =
            (player_team.get(&pref.a), player_team.get(&pref.b))
        else {
            continue;
        };
        match pref.kind {
            PreferenceKind::MustBeTogether if team_a != team_b => {
                must_violations.push(PairViolation {
                    player_a: display_name(&names, pref.a),
                    player_b: display_name(&names, pref.b),
                });
            }
            PreferenceKind::PreferTogether if team_a != team_b => {
                soft_violations.push(SoftViolation {
                    player_a: display_name(&names, pref.a),
                    player_b: display_name(&names, pref.b),
                    kind: SoftViolationKind::Split,
                });
            }
            PreferenceKind::PreferApart if team_a == team_b => {
                soft_violations.push(SoftViolation {
                    player_a: display_name(&names, pref.a),
                    player_b: display_name(&names, pref.b),
                    kind: SoftViolationKind::Together,
                });
            }
            _ => {}
        }
    }

    let rating = ComponentScore::weighted(rating_penalty(partition), WEIGHT_RATING);
    let gender = ComponentScore::weighted(gender_penalty(partition), WEIGHT_GENDER);
    let must_pairs =
        ComponentScore::weighted(-(must_violations.len() as f64), WEIGHT_STRONG_PREF);
    let soft_pairs =
        ComponentScore::weighted(-(soft_violations.len() as f64), WEIGHT_SOFT_PREF);
    let total =
        rating.weighted + gender.weighted + must_pairs.weighted + soft_pairs.weighted;

    ScoreBreakdown {
        rating,
        gender,
        must_pairs,
        soft_pairs,
        must_violations,
        soft_violations,
        total,
    }
}
