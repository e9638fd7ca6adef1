//! Contest economics: the payout curve, entry fee and rake.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContestError {
    #[error("payout curve has no ranges")]
    EmptyCurve,

    #[error("field size must be positive")]
    ZeroFieldSize,

    #[error("range #{index} ({rank_start}..={rank_end}) is malformed")]
    MalformedRange { index: usize, rank_start: usize, rank_end: usize },

    #[error("range #{index} starts at rank {rank_start}, expected {expected}")]
    Discontiguous { index: usize, rank_start: usize, expected: usize },

    #[error("payout ranges cover ranks 1..={covered}, field size is {field_size}")]
    Uncovered { covered: usize, field_size: usize },

    #[error("range #{index} has invalid prize {prize}")]
    InvalidPrize { index: usize, prize: f64 },

    #[error("entry fee {0} must be finite and non-negative")]
    InvalidEntryFee(f64),

    #[error("rake {0} must lie in [0, 1)")]
    InvalidRake(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutRange {
    pub rank_start: usize,
    pub rank_end: usize,
    /// Paid to each rank in the range.
    pub prize: f64,
}
impl PayoutRange {
    pub fn contains(&self, rank: usize) -> bool {
        (self.rank_start..=self.rank_end).contains(&rank)
    }

    pub fn ranks(&self) -> usize {
        self.rank_end - self.rank_start + 1
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawPayoutCurve {
    ranges: Vec<PayoutRange>,
    field_size: usize,
    #[serde(default)]
    entry_fee: f64,
    #[serde(default)]
    rake: f64,
}

/// A validated payout curve. The ranges are contiguous and cover exactly the ranks
/// `1..=field_size`. The prizes are taken as already net of rake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPayoutCurve")]
pub struct PayoutCurve {
    ranges: Vec<PayoutRange>,
    field_size: usize,
    entry_fee: f64,
    rake: f64,
}
impl PayoutCurve {
    pub fn try_new(ranges: Vec<PayoutRange>, field_size: usize, entry_fee: f64, rake: f64) -> Result<Self, ContestError> {
        if field_size == 0 {
            return Err(ContestError::ZeroFieldSize);
        }
        if ranges.is_empty() {
            return Err(ContestError::EmptyCurve);
        }
        let mut expected = 1;
        for (index, range) in ranges.iter().enumerate() {
            if range.rank_start == 0 || range.rank_start > range.rank_end {
                return Err(ContestError::MalformedRange {
                    index,
                    rank_start: range.rank_start,
                    rank_end: range.rank_end,
                });
            }
            if range.rank_start != expected {
                return Err(ContestError::Discontiguous {
                    index,
                    rank_start: range.rank_start,
                    expected,
                });
            }
            if !range.prize.is_finite() || range.prize < 0.0 {
                return Err(ContestError::InvalidPrize {
                    index,
                    prize: range.prize,
                });
            }
            expected = range.rank_end + 1;
        }
        let covered = expected - 1;
        if covered != field_size {
            return Err(ContestError::Uncovered { covered, field_size });
        }
        if !entry_fee.is_finite() || entry_fee < 0.0 {
            return Err(ContestError::InvalidEntryFee(entry_fee));
        }
        if !(0.0..1.0).contains(&rake) {
            return Err(ContestError::InvalidRake(rake));
        }
        Ok(Self {
            ranges,
            field_size,
            entry_fee,
            rake,
        })
    }

    pub fn ranges(&self) -> &[PayoutRange] {
        &self.ranges
    }

    pub fn field_size(&self) -> usize {
        self.field_size
    }

    pub fn entry_fee(&self) -> f64 {
        self.entry_fee
    }

    /// Informational only; never deducted from the prizes.
    pub fn rake(&self) -> f64 {
        self.rake
    }

    /// The prize for a 1-based rank. Ranks past the end of the curve pay nothing.
    pub fn prize_for_rank(&self, rank: usize) -> f64 {
        let index = self.ranges.partition_point(|range| range.rank_end < rank);
        match self.ranges.get(index) {
            Some(range) if range.contains(rank) => range.prize,
            _ => 0.0,
        }
    }

    pub fn total_prize(&self) -> f64 {
        self.ranges.iter().map(|range| range.prize * range.ranks() as f64).sum()
    }
}

impl TryFrom<RawPayoutCurve> for PayoutCurve {
    type Error = ContestError;

    fn try_from(raw: RawPayoutCurve) -> Result<Self, Self::Error> {
        Self::try_new(raw.ranges, raw.field_size, raw.entry_fee, raw.rake)
    }
}
