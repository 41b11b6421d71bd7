//! Fixed tuning for the sorter. These are build-time configuration, not
//! runtime inputs.

pub const MIN_TEAM_SIZE: usize = 5;
pub const MAX_TEAM_SIZE: usize = 8;
pub const MIN_TEAMS: usize = 2;
pub const MIN_PLAYERS: usize = MIN_TEAM_SIZE * MIN_TEAMS;
pub const MIN_GENDER_PER_TEAM: usize = 1;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;
/// Rating assumed for players that have never been rated.
pub const DEFAULT_RATING: f64 = 4.0;

pub const WEIGHT_RATING: f64 = 10.0;
pub const WEIGHT_GENDER: f64 = 6.0;
pub const WEIGHT_STRONG_PREF: f64 = 3.0;
pub const WEIGHT_SOFT_PREF: f64 = 1.0;

/// Independent randomized restarts per `sort_teams` call.
pub const HILL_CLIMB_STARTS: usize = 10;
