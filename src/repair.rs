//! Duplicate-cap repair. Over-represented lineups are swapped, one unprotected occurrence at a
//! time, for catalog lineups still under the cap.

use crate::field::{Field, Protection};
use crate::lineup::Signature;
use crate::notes::{Note, Notes};
use crate::popularity::SamplingMode;
use crate::sampling::{choose_uniform, CategoricalSampler};
use serde::Serialize;
use tinyrand::Rand;
use tracing::{debug, trace};

/// The smallest cap that a field of `field_size` entries drawn from `unique_lineups` distinct
/// lineups can satisfy.
pub fn min_feasible_cap(field_size: usize, unique_lineups: usize) -> usize {
    if unique_lineups == 0 {
        field_size
    } else {
        field_size.div_ceil(unique_lineups)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualReason {
    /// Every catalog lineup is at or over the cap.
    NoEligibleReplacement,
    /// The remaining excess sits on protected positions.
    Protected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualViolation {
    pub signature: Signature,
    pub count: usize,
    pub cap: usize,
    pub reason: ResidualReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairReport {
    pub requested_cap: usize,
    pub effective_cap: usize,
    pub replacements: usize,
    pub residuals: Vec<ResidualViolation>,
}
impl RepairReport {
    pub fn relaxed(&self) -> bool {
        self.effective_cap != self.requested_cap
    }
}

#[derive(Debug, Clone)]
pub struct Repairer<'a> {
    /// Lineup id of every catalog index, as assigned by the field's table.
    pub catalog_ids: &'a [usize],
    /// Popularity weight of every catalog index.
    pub probs: &'a [f64],
    pub sampling: SamplingMode,
}
impl Repairer<'_> {
    /// Enforces `cap` (relaxed to the feasible minimum if need be) on every lineup, leaving
    /// protected positions untouched. The field keeps its length.
    pub fn repair(
        &self,
        mut field: Field,
        cap: usize,
        protection: &Protection,
        rand: &mut impl Rand,
        notes: &mut Notes,
    ) -> (Field, RepairReport) {
        let unique = {
            let mut ids = self.catalog_ids.to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids.len()
        };
        let min_cap = min_feasible_cap(field.len(), unique);
        let effective_cap = if cap < min_cap {
            notes.push(Note::CapRelaxed {
                requested: cap,
                relaxed: min_cap,
            });
            min_cap
        } else {
            cap
        };

        let mut counts = field.counts();
        let over_cap: Vec<_> = (0..counts.len()).filter(|&id| counts[id] > effective_cap).collect();
        let mut replacements = 0;
        let mut residuals = vec![];
        for id in over_cap {
            let mut occurrences: Vec<_> = (0..field.len())
                .filter(|&position| field.entries()[position] == id && !protection.is_protected(position))
                .collect();
            while counts[id] > effective_cap {
                let reason = if occurrences.is_empty() {
                    ResidualReason::Protected
                } else {
                    match self.draw_replacement(&counts, effective_cap, id, rand) {
                        Some(replacement) => {
                            let position = occurrences.swap_remove(choose_uniform(occurrences.len(), rand));
                            trace!("replacing lineup {id} at {position} with {replacement}");
                            field.replace(position, replacement);
                            counts[id] -= 1;
                            counts[replacement] += 1;
                            replacements += 1;
                            continue;
                        }
                        None => ResidualReason::NoEligibleReplacement,
                    }
                };
                let signature = field.lineup_by_id(id).signature();
                notes.push(Note::ResidualViolation {
                    signature,
                    count: counts[id],
                    cap: effective_cap,
                });
                residuals.push(ResidualViolation {
                    signature,
                    count: counts[id],
                    cap: effective_cap,
                    reason,
                });
                break;
            }
        }
        debug!(
            "duplicate cap {effective_cap} (requested {cap}): {replacements} replacements, {} residual violations",
            residuals.len()
        );
        (
            field,
            RepairReport {
                requested_cap: cap,
                effective_cap,
                replacements,
                residuals,
            },
        )
    }

    /// Draws the lineup id of a catalog lineup other than `exclude` that is still under `cap`.
    /// Returns `None` when no such lineup exists.
    fn draw_replacement(&self, counts: &[usize], cap: usize, exclude: usize, rand: &mut impl Rand) -> Option<usize> {
        let eligible: Vec<_> = (0..self.catalog_ids.len())
            .filter(|&index| {
                let id = self.catalog_ids[index];
                id != exclude && counts[id] < cap
            })
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let chosen = match self.sampling {
            SamplingMode::Uniform => eligible[choose_uniform(eligible.len(), rand)],
            SamplingMode::Weighted => {
                let weights: Vec<_> = eligible.iter().map(|&index| self.probs[index]).collect();
                match CategoricalSampler::new(&weights) {
                    Some(sampler) => eligible[sampler.sample(rand)],
                    None => eligible[choose_uniform(eligible.len(), rand)],
                }
            }
        };
        Some(self.catalog_ids[chosen])
    }
}
