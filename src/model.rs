pub mod entity {
    use crate::config::DEFAULT_RATING;

    pub type Id = u32;
    pub type Tier = String;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Gender {
        Male,
        Female,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Player {
        pub id: Id,
        pub name: String,
        pub gender: Gender,
        /// `None` means never rated; scoring substitutes [`DEFAULT_RATING`].
        pub rating: Option<f64>,
        /// Caller-side classification; the sorter never reads it.
        pub tier: Option<Tier>,
    }

    impl Player {
        pub fn effective_rating(&self) -> f64 {
            self.rating.unwrap_or(DEFAULT_RATING)
        }

        pub fn is_male(&self) -> bool {
            self.gender == Gender::Male
        }
    }
}

pub mod preference {
    use std::collections::HashMap;

    use super::entity::Id;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PreferenceKind {
        MustBeTogether,
        PreferTogether,
        PreferApart,
    }

    /// Pairing preference between two players. The pair is unordered and
    /// callers keep at most one record per pair.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Preference {
        pub a: Id,
        pub b: Id,
        pub kind: PreferenceKind,
    }

    impl Preference {
        pub fn new(a: Id, b: Id, kind: PreferenceKind) -> Preference {
            Preference { a, b, kind }
        }
    }

    /// Pinned destination the sorter must not change during a run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LockTarget {
        Team(usize),
        Reserves,
    }

    pub type Locks = HashMap<Id, LockTarget>;
}

pub mod partition {
    use std::collections::{HashMap, HashSet};

    use super::entity::{Id, Player};
    use super::preference::{LockTarget, Locks};

    const TEAM_LABELS: [&str; 6] = [
        "Equipo A", "Equipo B", "Equipo C", "Equipo D", "Equipo E", "Equipo F",
    ];

    fn team_label(index: usize) -> String {
        match TEAM_LABELS.get(index) {
            Some(label) => (*label).to_string(),
            None => format!("Equipo {}", index + 1),
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Team {
        pub label: String,
        pub players: Vec<Player>,
    }

    impl Team {
        pub fn average_rating(&self) -> f64 {
            if self.players.is_empty() {
                return 0.0;
            }
            let sum: f64 = self.players.iter().map(Player::effective_rating).sum();
            sum / self.players.len() as f64
        }
    }

    /// One complete arrangement of the roster: every player sits on exactly
    /// one team or in the reserves.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Partition {
        pub teams: Vec<Team>,
        pub reserves: Vec<Player>,
    }

    impl Partition {
        /// Empty partition with `team_count` labelled teams.
        pub fn empty(team_count: usize) -> Partition {
            let teams = (0..team_count)
                .map(|index| Team {
                    label: team_label(index),
                    players: Vec::new(),
                })
                .collect();
            Partition {
                teams,
                reserves: Vec::new(),
            }
        }

        pub fn roster_size(&self) -> usize {
            self.teams.iter().map(|team| team.players.len()).sum::<usize>()
                + self.reserves.len()
        }

        /// Map from player id to team index. Reserves are absent.
        pub fn player_team_map(&self) -> HashMap<Id, usize> {
            let mut map = HashMap::new();
            for (index, team) in self.teams.iter().enumerate() {
                for player in &team.players {
                    map.insert(player.id, index);
                }
            }
            map
        }

        /// Lock map pinning each player in `kept` to its current placement,
        /// for re-sorting around manual choices.
        pub fn locks_for(&self, kept: &HashSet<Id>) -> Locks {
            let mut locks = Locks::new();
            for (index, team) in self.teams.iter().enumerate() {
                for player in &team.players {
                    if kept.contains(&player.id) {
                        locks.insert(player.id, LockTarget::Team(index));
                    }
                }
            }
            for player in &self.reserves {
                if kept.contains(&player.id) {
                    locks.insert(player.id, LockTarget::Reserves);
                }
            }
            locks
        }
    }
}
