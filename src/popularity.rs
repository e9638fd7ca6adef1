//! The popularity model: a linear score over lineup features, turned into a sampling
//! distribution over the catalog by a softmax.

use crate::config::ConfigError;
use crate::lineup::Lineup;
use crate::notes::{Note, Notes};
use crate::pool::PlayerPool;
use crate::probs::{logit, SliceExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ownership probabilities are clamped into \[floor, MAX_OWNERSHIP] before taking log-odds.
pub const MAX_OWNERSHIP: f64 = 0.9999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityWeights {
    pub bias: f64,
    pub projection: f64,
    pub salary: f64,
    pub ownership: f64,
    pub chalk: f64,
}
impl Default for PopularityWeights {
    fn default() -> Self {
        Self {
            bias: 0.0,
            projection: 0.1,
            salary: 0.0,
            ownership: 0.5,
            chalk: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularityParams {
    pub weights: PopularityWeights,
    /// Ownership (percent) above which a player counts as chalk.
    pub chalk_threshold: f64,
    pub ownership_floor: f64,
    /// Share of zero-or-missing ownership slots at or above which a note is raised.
    pub sparsity_ratio: f64,
}
impl Default for PopularityParams {
    fn default() -> Self {
        Self {
            weights: PopularityWeights::default(),
            chalk_threshold: 30.0,
            ownership_floor: 0.001,
            sparsity_ratio: 0.25,
        }
    }
}
impl PopularityParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = &self.weights;
        for (name, value) in [
            ("bias", weights.bias),
            ("projection", weights.projection),
            ("salary", weights.salary),
            ("ownership", weights.ownership),
            ("chalk", weights.chalk),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight(name));
            }
        }
        if !(self.ownership_floor > 0.0 && self.ownership_floor < MAX_OWNERSHIP) {
            return Err(ConfigError::InvalidOwnershipFloor(self.ownership_floor));
        }
        if !(0.0..=100.0).contains(&self.chalk_threshold) {
            return Err(ConfigError::InvalidChalkThreshold(self.chalk_threshold));
        }
        if !(0.0..=1.0).contains(&self.sparsity_ratio) {
            return Err(ConfigError::InvalidSparsityRatio(self.sparsity_ratio));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    #[default]
    Weighted,
    Uniform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupFeatures {
    pub projection: f64,
    pub salary: f64,
    pub ownership_logit: f64,
    pub chalk: usize,
}
impl LineupFeatures {
    pub fn extract(lineup: &Lineup, pool: &PlayerPool, params: &PopularityParams) -> Self {
        let mut features = Self {
            projection: 0.0,
            salary: 0.0,
            ownership_logit: 0.0,
            chalk: 0,
        };
        for player in lineup.resolve(pool) {
            let ownership = player.ownership_or_zero();
            features.projection += player.projection;
            features.salary += player.salary as f64;
            features.ownership_logit += logit((ownership / 100.0).clamp(params.ownership_floor, MAX_OWNERSHIP));
            if ownership > params.chalk_threshold {
                features.chalk += 1;
            }
        }
        features
    }

    pub fn score(&self, weights: &PopularityWeights) -> f64 {
        weights.bias
            + weights.projection * self.projection
            + weights.salary * self.salary
            + weights.ownership * self.ownership_logit
            + weights.chalk * self.chalk as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popularity {
    /// One probability per catalog lineup, summing to 1.
    pub probs: Vec<f64>,
    pub mode: SamplingMode,
}

/// Share of catalog player slots whose ownership is zero or absent.
pub fn ownership_sparsity(catalog: &[Lineup], pool: &PlayerPool) -> f64 {
    let mut slots = 0;
    let mut sparse = 0;
    for player in catalog.iter().flat_map(|lineup| lineup.resolve(pool)) {
        slots += 1;
        if player.ownership_or_zero() <= 0.0 {
            sparse += 1;
        }
    }
    if slots == 0 {
        0.0
    } else {
        sparse as f64 / slots as f64
    }
}

pub fn fit(
    catalog: &[Lineup],
    pool: &PlayerPool,
    params: &PopularityParams,
    mode: SamplingMode,
    notes: &mut Notes,
) -> Popularity {
    if catalog.is_empty() {
        return Popularity { probs: vec![], mode };
    }

    let sparse_share = ownership_sparsity(catalog, pool);
    if sparse_share >= params.sparsity_ratio {
        notes.push(Note::SparseOwnership {
            sparse_share,
            threshold: params.sparsity_ratio,
        });
    }

    let probs = match mode {
        SamplingMode::Uniform => vec![1.0 / catalog.len() as f64; catalog.len()],
        SamplingMode::Weighted => {
            let mut scores: Vec<_> = catalog
                .iter()
                .map(|lineup| LineupFeatures::extract(lineup, pool, params).score(&params.weights))
                .collect();
            scores.softmax();
            scores
        }
    };
    debug!(
        "popularity over {} lineups ({mode:?}): max prob {:.6}",
        probs.len(),
        probs.iter().copied().fold(0.0, f64::max)
    );
    Popularity { probs, mode }
}
