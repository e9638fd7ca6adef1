//! Soft, recoverable conditions. A [Note] never aborts a run: it is logged when raised and
//! carried on the telemetry so callers can decide how to surface it.

use crate::bucket::BucketKey;
use crate::lineup::Signature;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Note {
    SparseOwnership { sparse_share: f64, threshold: f64 },
    TargetSharesRenormalised { share_sum: f64 },
    BucketShortfall { bucket: BucketKey, seats: usize },
    CapRelaxed { requested: usize, relaxed: usize },
    ResidualViolation { signature: Signature, count: usize, cap: usize },
    ContestSizeMismatch { contest_size: usize, curve_field_size: usize },
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Note::SparseOwnership { sparse_share, threshold } => write!(
                f,
                "{:.1}% of catalog player slots lack ownership (threshold {:.1}%), substituting the ownership floor",
                sparse_share * 100.,
                threshold * 100.
            ),
            Note::TargetSharesRenormalised { share_sum } => {
                write!(f, "bucket target shares sum to {share_sum:.4}, renormalised to 1")
            }
            Note::BucketShortfall { bucket, seats } => {
                write!(f, "bucket {bucket} could not fill {seats} seat(s), backfilled from the full distribution")
            }
            Note::CapRelaxed { requested, relaxed } => {
                write!(f, "duplicate cap {requested} is infeasible, relaxed to {relaxed}")
            }
            Note::ResidualViolation { signature, count, cap } => {
                write!(f, "lineup {signature} remains at {count} copies over cap {cap}")
            }
            Note::ContestSizeMismatch { contest_size, curve_field_size } => write!(
                f,
                "contest size {contest_size} differs from the payout curve's field size {curve_field_size}"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Notes {
    items: Vec<Note>,
}
impl Notes {
    pub fn push(&mut self, note: Note) {
        warn!("{note}");
        self.items.push(note);
    }

    pub fn items(&self) -> &[Note] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
