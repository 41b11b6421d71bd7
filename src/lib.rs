//! Team assignment for pickup games.
//!
//! Splits a roster into a fixed number of teams plus reserves, balancing
//! skill and gender across teams while honoring pairing preferences and
//! pinned ("locked") placements. The sorter is a multi-start steepest-ascent
//! hill climb over single-player swaps; it approximates, so two runs on the
//! same input may return different but comparably scored partitions.
//!
//! ```
//! use team_sorter::{enumerate_feasible_sizes, sort_teams, Gender, Locks, Player};
//!
//! let players: Vec<Player> = (0..12)
//!     .map(|id| Player {
//!         id,
//!         name: format!("Player {id}"),
//!         gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
//!         rating: Some(f64::from(id % 10 + 1)),
//!         tier: None,
//!     })
//!     .collect();
//!
//! let options = enumerate_feasible_sizes(players.len());
//! assert!(options.iter().any(|option| option.team_count == 2));
//!
//! let result = sort_teams(&players, 2, &[], &Locks::default()).unwrap();
//! assert_eq!(result.partition.teams.len(), 2);
//! ```

pub mod climb;
pub mod config;
pub mod feasible;
pub mod model;
pub mod score;

pub use climb::{is_valid, sort_teams, SortError, SortResult};
pub use feasible::{enumerate_feasible_sizes, players_per_team, TeamOption};
pub use model::entity::{Gender, Id, Player, Tier};
pub use model::partition::{Partition, Team};
pub use model::preference::{LockTarget, Locks, Preference, PreferenceKind};
pub use score::{
    score, score_total, ComponentScore, PairViolation, ScoreBreakdown, SoftViolation,
    SoftViolationKind,
};
