//! Engine configuration. Every run is a pure function of this configuration, the inputs and
//! the seed.

use crate::bucket::{validate_targets, BucketTarget, OwnershipCuts, SalaryBins};
use crate::field::{AssemblyMode, SalaryWindow};
use crate::popularity::{PopularityParams, SamplingMode};
use crate::roster::RosterTemplate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("contest size must be positive")]
    ZeroContestSize,

    #[error("popularity weight '{0}' must be finite")]
    NonFiniteWeight(&'static str),

    #[error("ownership floor {0} must lie in (0, 0.9999)")]
    InvalidOwnershipFloor(f64),

    #[error("chalk threshold {0} must lie in [0, 100]")]
    InvalidChalkThreshold(f64),

    #[error("sparsity ratio {0} must lie in [0, 1]")]
    InvalidSparsityRatio(f64),

    #[error("duplicate percentage {0} must lie in (0, 1]")]
    InvalidDuplicatePercentage(f64),

    #[error("duplicate cap must be at least 1")]
    ZeroDuplicateCap,

    #[error("salary window min {min} exceeds max {max}")]
    InvalidSalaryWindow { min: u32, max: u32 },

    #[error("salary bin threshold mid_from {mid_from} exceeds high_from {high_from}")]
    InvalidSalaryBins { mid_from: u32, high_from: u32 },

    #[error("ownership cuts {lower}, {upper} must be finite and ordered")]
    InvalidOwnershipCuts { lower: f64, upper: f64 },

    #[error("bucket target #{index} has invalid share {share}")]
    InvalidTargetShare { index: usize, share: f64 },

    #[error("bucket target shares must carry positive mass")]
    ZeroTargetShares,

    #[error("roster template has no slots")]
    EmptyRoster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub contest_size: usize,

    #[serde(default)]
    pub mode: AssemblyMode,

    #[serde(default)]
    pub sampling: SamplingMode,

    #[serde(default)]
    pub popularity: PopularityParams,

    #[serde(default)]
    pub salary_window: Option<SalaryWindow>,

    #[serde(default)]
    pub bucket_targets: Option<Vec<BucketTarget>>,

    #[serde(default)]
    pub salary_bins: SalaryBins,

    #[serde(default)]
    pub legacy_ownership_cuts: OwnershipCuts,

    /// Absolute per-lineup duplicate cap enforced after assembly. No repair pass if absent.
    #[serde(default)]
    pub dup_cap: Option<usize>,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub roster: RosterTemplate,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl EngineConfig {
    pub fn new(contest_size: usize) -> Self {
        Self {
            contest_size,
            mode: AssemblyMode::default(),
            sampling: SamplingMode::default(),
            popularity: PopularityParams::default(),
            salary_window: None,
            bucket_targets: None,
            salary_bins: SalaryBins::default(),
            legacy_ownership_cuts: OwnershipCuts::default(),
            dup_cap: None,
            top_n: DEFAULT_TOP_N,
            roster: RosterTemplate::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contest_size == 0 {
            return Err(ConfigError::ZeroContestSize);
        }
        if self.roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        self.mode.validate()?;
        self.popularity.validate()?;
        if let Some(window) = &self.salary_window {
            window.validate()?;
        }
        if let Some(targets) = &self.bucket_targets {
            validate_targets(targets)?;
        }
        self.salary_bins.validate()?;
        self.legacy_ownership_cuts.validate()?;
        if self.dup_cap == Some(0) {
            return Err(ConfigError::ZeroDuplicateCap);
        }
        Ok(())
    }
}
