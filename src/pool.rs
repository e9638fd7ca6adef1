//! The player pool: a read-only mapping from player id to salary, projection, ownership,
//! team and eligible positions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub team: String,
    pub salary: u32,
    pub projection: f64,
    /// Projected ownership in percent (0–100). Absent for sparse feeds.
    #[serde(default)]
    pub ownership: Option<f64>,
    pub positions: Vec<String>,
}
impl Player {
    /// Ownership in percent, with absent values read as zero.
    pub fn ownership_or_zero(&self) -> f64 {
        self.ownership.unwrap_or(0.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("duplicate player id {0}")]
    DuplicatePlayer(String),

    #[error("player {id} has invalid ownership {ownership}")]
    InvalidOwnership { id: String, ownership: f64 },

    #[error("player {id} has non-finite projection")]
    InvalidProjection { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: FxHashMap<String, Player>,
}
impl PlayerPool {
    pub fn try_from_players(players: impl IntoIterator<Item = Player>) -> Result<Self, PoolError> {
        let players = players.into_iter();
        let mut map = FxHashMap::with_capacity_and_hasher(players.size_hint().0, Default::default());
        for player in players {
            if let Some(ownership) = player.ownership {
                if !(0.0..=100.0).contains(&ownership) {
                    return Err(PoolError::InvalidOwnership {
                        id: player.id,
                        ownership,
                    });
                }
            }
            if !player.projection.is_finite() {
                return Err(PoolError::InvalidProjection { id: player.id });
            }
            if map.contains_key(&player.id) {
                return Err(PoolError::DuplicatePlayer(player.id));
            }
            map.insert(player.id.clone(), player);
        }
        Ok(Self { players: map })
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
