//! Bucketed quota sampling. The catalog is partitioned by salary bin and ownership tertile;
//! each configured [BucketTarget] receives a whole number of seats, filled by a multinomial draw
//! over its members' popularity.

use crate::config::ConfigError;
use crate::lineup::Lineup;
use crate::notes::{Note, Notes};
use crate::pool::PlayerPool;
use crate::probs::SliceExt;
use crate::sampling::CategoricalSampler;
use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};
use tinyrand::Rand;
use tracing::debug;

/// Shares may deviate from 1.0 by this much before renormalisation is noted.
pub const SHARE_SUM_TOLERANCE: f64 = 0.02;

pub const BUCKETS: usize = SalaryBin::COUNT * OwnershipTertile::COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Ordinal, EnumCount, EnumIter, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SalaryBin {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Ordinal, EnumCount, EnumIter, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OwnershipTertile {
    LowOwn,
    MidOwn,
    HighOwn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    pub salary_bin: SalaryBin,
    pub ownership_tertile: OwnershipTertile,
}
impl BucketKey {
    pub fn ordinal(&self) -> usize {
        self.salary_bin.ordinal() * OwnershipTertile::COUNT + self.ownership_tertile.ordinal()
    }

    /// All keys in ordinal order.
    pub fn all() -> impl Iterator<Item = BucketKey> {
        SalaryBin::iter().flat_map(|salary_bin| {
            OwnershipTertile::iter().map(move |ownership_tertile| BucketKey {
                salary_bin,
                ownership_tertile,
            })
        })
    }
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.salary_bin, self.ownership_tertile)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTarget {
    pub salary_bin: SalaryBin,
    pub ownership_tertile: OwnershipTertile,
    pub target_share: f64,
}
impl BucketTarget {
    pub fn key(&self) -> BucketKey {
        BucketKey {
            salary_bin: self.salary_bin,
            ownership_tertile: self.ownership_tertile,
        }
    }
}

pub fn validate_targets(targets: &[BucketTarget]) -> Result<(), ConfigError> {
    for (index, target) in targets.iter().enumerate() {
        if !target.target_share.is_finite() || target.target_share < 0.0 {
            return Err(ConfigError::InvalidTargetShare {
                index,
                share: target.target_share,
            });
        }
    }
    if targets.iter().map(|target| target.target_share).sum::<f64>() <= 0.0 {
        return Err(ConfigError::ZeroTargetShares);
    }
    Ok(())
}

/// Absolute lineup-salary thresholds separating the bins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBins {
    pub mid_from: u32,
    pub high_from: u32,
}
impl Default for SalaryBins {
    fn default() -> Self {
        Self {
            mid_from: 48_500,
            high_from: 49_500,
        }
    }
}
impl SalaryBins {
    pub fn bin(&self, salary: u64) -> SalaryBin {
        if salary >= u64::from(self.high_from) {
            SalaryBin::High
        } else if salary >= u64::from(self.mid_from) {
            SalaryBin::Mid
        } else {
            SalaryBin::Low
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mid_from > self.high_from {
            return Err(ConfigError::InvalidSalaryBins {
                mid_from: self.mid_from,
                high_from: self.high_from,
            });
        }
        Ok(())
    }
}

/// Summed-lineup-ownership cut points (percent) separating the tertiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipCuts {
    pub lower: f64,
    pub upper: f64,
}
impl Default for OwnershipCuts {
    fn default() -> Self {
        Self {
            lower: 80.0,
            upper: 140.0,
        }
    }
}
impl OwnershipCuts {
    /// Data-driven cut points at the 1/3 and 2/3 quantiles of the usable (positive) ownership
    /// sums, or `legacy` if there are fewer than three.
    pub fn from_sums(sums: &[f64], legacy: &OwnershipCuts) -> OwnershipCuts {
        let usable: Vec<_> = sums.iter().copied().filter(|&sum| sum > 0.0 && sum.is_finite()).collect();
        match (usable.quantile(1.0 / 3.0), usable.quantile(2.0 / 3.0)) {
            (Some(lower), Some(upper)) if usable.len() >= 3 => OwnershipCuts { lower, upper },
            _ => legacy.clone(),
        }
    }

    pub fn tertile(&self, ownership: f64) -> OwnershipTertile {
        if ownership < self.lower {
            OwnershipTertile::LowOwn
        } else if ownership < self.upper {
            OwnershipTertile::MidOwn
        } else {
            OwnershipTertile::HighOwn
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper) {
            return Err(ConfigError::InvalidOwnershipCuts {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

/// Integer seat counts per bucket, indexed by [BucketKey::ordinal], summing to `seats`.
pub fn allocate_seats(targets: &[BucketTarget], seats: usize, notes: &mut Notes) -> [usize; BUCKETS] {
    let shares = normalised_shares(targets, notes);
    let mut allocations = [0; BUCKETS];
    for (ordinal, share) in shares.iter().enumerate() {
        allocations[ordinal] = (share * seats as f64).round() as usize;
    }
    if allocations.iter().sum::<usize>() != seats {
        // largest remainder over the exact proportional allocation
        let mut remainders = [0.0; BUCKETS];
        for (ordinal, share) in shares.iter().enumerate() {
            let exact = share * seats as f64;
            allocations[ordinal] = exact.floor() as usize;
            remainders[ordinal] = exact - exact.floor();
        }
        let mut order: Vec<_> = (0..BUCKETS).collect();
        order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]).then(a.cmp(&b)));
        let assigned: usize = allocations.iter().sum();
        for &ordinal in order.iter().take(seats.saturating_sub(assigned)) {
            allocations[ordinal] += 1;
        }
    }
    allocations
}

/// Target shares per bucket ordinal, merged across repeated keys and scaled to sum to 1.
pub fn normalised_shares(targets: &[BucketTarget], notes: &mut Notes) -> [f64; BUCKETS] {
    let mut shares = [0.0; BUCKETS];
    for target in targets {
        shares[target.key().ordinal()] += target.target_share;
    }
    let share_sum = shares.sum();
    if (share_sum - 1.0).abs() > SHARE_SUM_TOLERANCE {
        notes.push(Note::TargetSharesRenormalised { share_sum });
    }
    if share_sum > 0.0 {
        shares.scale(1.0 / share_sum);
    }
    shares
}

/// The bucket of every catalog lineup, plus the configured targets.
#[derive(Debug, Clone)]
pub struct BucketPlan {
    pub targets: Vec<BucketTarget>,
    pub cuts: OwnershipCuts,
    bucket_of: Vec<BucketKey>,
}
impl BucketPlan {
    pub fn new(
        catalog: &[Lineup],
        pool: &PlayerPool,
        targets: Vec<BucketTarget>,
        salary_bins: &SalaryBins,
        legacy_cuts: &OwnershipCuts,
    ) -> Self {
        let ownership_sums: Vec<_> = catalog.iter().map(|lineup| lineup.ownership(pool)).collect();
        let cuts = OwnershipCuts::from_sums(&ownership_sums, legacy_cuts);
        let bucket_of = catalog
            .iter()
            .zip(ownership_sums)
            .map(|(lineup, ownership)| BucketKey {
                salary_bin: salary_bins.bin(lineup.salary(pool)),
                ownership_tertile: cuts.tertile(ownership),
            })
            .collect();
        debug!("ownership tertile cuts: {:.2} / {:.2}", cuts.lower, cuts.upper);
        Self {
            targets,
            cuts,
            bucket_of,
        }
    }

    pub fn bucket_of(&self, catalog_index: usize) -> BucketKey {
        self.bucket_of[catalog_index]
    }

    /// Fills `seats` with catalog indices. Buckets are drawn in ordinal order and any shortfall
    /// is backfilled from `full`, so the sequence of draws is fixed by the generator's seed.
    pub fn sample(
        &self,
        seats: usize,
        probs: &[f64],
        full: &CategoricalSampler,
        rand: &mut impl Rand,
        notes: &mut Notes,
    ) -> BucketDraw {
        let allocations = allocate_seats(&self.targets, seats, notes);
        let mut draws = Vec::with_capacity(seats);
        let mut shortfall = 0;
        for key in BucketKey::all() {
            let allotted = allocations[key.ordinal()];
            if allotted == 0 {
                continue;
            }
            let members: Vec<_> = (0..self.bucket_of.len()).filter(|&index| self.bucket_of[index] == key).collect();
            let member_probs: Vec<_> = members.iter().map(|&index| probs[index]).collect();
            match CategoricalSampler::new(&member_probs) {
                Some(sampler) => {
                    draws.extend(sampler.sample_many(allotted, rand).into_iter().map(|member| members[member]));
                }
                None => {
                    notes.push(Note::BucketShortfall { bucket: key, seats: allotted });
                    shortfall += allotted;
                }
            }
        }
        draws.extend(full.sample_many(shortfall, rand));

        let mut shares = Vec::with_capacity(BUCKETS);
        let targets = normalised_shares(&self.targets, &mut Notes::default());
        let mut realised = [0usize; BUCKETS];
        for &draw in &draws {
            realised[self.bucket_of[draw].ordinal()] += 1;
        }
        for key in BucketKey::all() {
            let target = targets[key.ordinal()];
            let count = realised[key.ordinal()];
            if target > 0.0 || count > 0 {
                shares.push(BucketShare {
                    key,
                    target,
                    realised: if seats == 0 { 0.0 } else { count as f64 / seats as f64 },
                });
            }
        }
        BucketDraw { draws, shares }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShare {
    pub key: BucketKey,
    pub target: f64,
    pub realised: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketDraw {
    pub draws: Vec<usize>,
    pub shares: Vec<BucketShare>,
}

#[cfg(test)]
mod tests;
