//! A self-contained run description, as read from a JSON file.

use crate::config::EngineConfig;
use crate::contest::PayoutCurve;
use crate::lineup::Lineup;
use crate::payout::ScoreSheet;
use crate::pool::{Player, PlayerPool, PoolError};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub config: EngineConfig,
    pub players: Vec<Player>,
    pub catalog: Vec<Lineup>,
    #[serde(default)]
    pub user_entries: Vec<Lineup>,
    pub payout: PayoutCurve,
    #[serde(default)]
    pub seed: u64,
    /// Realised points per player, one map per trial.
    #[serde(default)]
    pub trials: Vec<BTreeMap<String, f64>>,
}
impl Scenario {
    pub fn pool(&self) -> Result<PlayerPool, PoolError> {
        PlayerPool::try_from_players(self.players.iter().cloned())
    }

    pub fn score_sheets(&self) -> Vec<ScoreSheet> {
        self.trials
            .iter()
            .map(|points| ScoreSheet::from_points(points.iter().map(|(id, &points)| (id.as_str(), points))))
            .collect()
    }
}
