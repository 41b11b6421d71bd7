use crate::config::{MAX_TEAM_SIZE, MIN_TEAMS, MIN_TEAM_SIZE};

/// One viable way of splitting a roster into teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamOption {
    pub team_count: usize,
    pub players_per_team: usize,
    pub reserves: usize,
}

/// Players each team gets for a roster of `roster_size`, capped at
/// [`MAX_TEAM_SIZE`]. `team_count` must be at least 1.
pub fn players_per_team(roster_size: usize, team_count: usize) -> usize {
    (roster_size / team_count).min(MAX_TEAM_SIZE)
}

/// All viable team counts for a roster, ascending. Empty when the roster is
/// too small for any split; callers decide how to surface that.
pub fn enumerate_feasible_sizes(roster_size: usize) -> Vec<TeamOption> {
    let mut options = Vec::new();
    for team_count in MIN_TEAMS..=roster_size {
        // Team size is capped; excess players become reserves.
        let per_team = players_per_team(roster_size, team_count);
        if per_team < MIN_TEAM_SIZE {
            continue;
        }
        options.push(TeamOption {
            team_count,
            players_per_team: per_team,
            reserves: roster_size - per_team * team_count,
        });
    }
    options
}
