//! Field telemetry: how concentrated the duplication is, who the field is exposed to, and
//! how far the sampled seats landed from their bucket targets.

use crate::bucket::BucketShare;
use crate::field::Field;
use crate::lineup::{Lineup, Signature};
use crate::notes::Note;
use crate::repair::ResidualViolation;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicatedLineup {
    pub signature: Signature,
    pub lineup: Lineup,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub contest_size: usize,
    pub distinct_lineups: usize,
    /// Entries per lineup → number of distinct lineups with that many entries.
    pub duplication_histogram: BTreeMap<usize, usize>,
    pub gini: f64,
    /// Percentage of entries containing each player.
    pub exposures: BTreeMap<String, f64>,
    pub bucket_deviation: f64,
    pub bucket_shares: Vec<BucketShare>,
    pub top_duplicated: Vec<DuplicatedLineup>,
    pub effective_cap: Option<usize>,
    pub residual_violations: Vec<ResidualViolation>,
    pub notes: Vec<Note>,
}

/// Entry counts of the lineups present in the field, in lineup-id order.
pub fn present_counts(field: &Field) -> Vec<usize> {
    field.counts().into_iter().filter(|&count| count > 0).collect()
}

pub fn duplication_histogram(counts: &[usize]) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for &count in counts.iter().filter(|&&count| count > 0) {
        *histogram.entry(count).or_default() += 1;
    }
    histogram
}

/// Gini coefficient of the counts: 0 when every lineup is equally duplicated, approaching 1
/// as the entries concentrate on a single lineup.
pub fn gini(counts: &[usize]) -> f64 {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let n = sorted.len() as f64;
    let total: usize = sorted.iter().sum();
    if sorted.is_empty() || total == 0 {
        return 0.0;
    }
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(index, &count)| (index + 1) as f64 * count as f64)
        .sum();
    let gini = 2.0 * weighted / (n * total as f64) - (n + 1.0) / n;
    gini.clamp(0.0, 1.0)
}

pub fn exposures(field: &Field) -> BTreeMap<String, f64> {
    let mut occurrences = BTreeMap::<String, usize>::new();
    for (id, count) in field.counts().into_iter().enumerate() {
        if count == 0 {
            continue;
        }
        for player in field.lineup_by_id(id).players() {
            *occurrences.entry(player.clone()).or_default() += count;
        }
    }
    let contest_size = field.len() as f64;
    occurrences
        .into_iter()
        .map(|(player, count)| (player, 100.0 * count as f64 / contest_size))
        .collect()
}

/// Largest absolute gap between target and realised share. Zero if no targets were set.
pub fn bucket_deviation(shares: &[BucketShare]) -> f64 {
    shares
        .iter()
        .map(|share| (share.target - share.realised).abs())
        .fold(0.0, f64::max)
}

/// The `n` most duplicated lineups, ties broken by signature.
pub fn top_duplicated(field: &Field, n: usize) -> Vec<DuplicatedLineup> {
    let mut duplicated: Vec<_> = field
        .counts()
        .into_iter()
        .enumerate()
        .filter(|&(_, count)| count > 0)
        .map(|(id, count)| {
            let lineup = field.lineup_by_id(id);
            DuplicatedLineup {
                signature: lineup.signature(),
                lineup: lineup.clone(),
                count,
            }
        })
        .collect();
    duplicated.sort_by(|a, b| b.count.cmp(&a.count).then(a.signature.cmp(&b.signature)));
    duplicated.truncate(n);
    duplicated
}

pub struct TelemetryInputs<'a> {
    pub bucket_shares: Option<&'a [BucketShare]>,
    pub top_n: usize,
    pub effective_cap: Option<usize>,
    pub residual_violations: &'a [ResidualViolation],
    pub notes: &'a [Note],
}

impl Telemetry {
    pub fn compute(field: &Field, inputs: TelemetryInputs) -> Self {
        let counts = present_counts(field);
        let bucket_shares = inputs.bucket_shares.map(<[BucketShare]>::to_vec).unwrap_or_default();
        Self {
            contest_size: field.len(),
            distinct_lineups: counts.len(),
            duplication_histogram: duplication_histogram(&counts),
            gini: gini(&counts),
            exposures: exposures(field),
            bucket_deviation: bucket_deviation(&bucket_shares),
            bucket_shares,
            top_duplicated: top_duplicated(field, inputs.top_n),
            effective_cap: inputs.effective_cap,
            residual_violations: inputs.residual_violations.to_vec(),
            notes: inputs.notes.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{BucketKey, OwnershipTertile, SalaryBin};
    use crate::hash_lookup::HashLookup;
    use crate::testing::single;
    use assert_float_eq::*;

    fn field_of(ids: &[&str]) -> Field {
        let mut table = HashLookup::default();
        let entries = ids.iter().map(|&id| table.intern(&single(id))).collect();
        Field::new(table, entries)
    }

    #[test]
    fn histogram() {
        let histogram = duplication_histogram(&[1, 3, 1, 2, 0]);
        assert_eq!(BTreeMap::from([(1, 2), (2, 1), (3, 1)]), histogram);
    }

    #[test]
    fn gini_even_and_concentrated() {
        assert_f64_near!(0.0, gini(&[4, 4, 4, 4]));
        assert_f64_near!(0.0, gini(&[7]));
        assert_eq!(0.0, gini(&[]));
        // (2·(1·1 + 2·1 + 3·1 + 4·9)) / (4·12) − 5/4 = 84/48 − 1.25
        assert_float_absolute_eq!(0.5, gini(&[9, 1, 1, 1]), 1e-12);
    }

    #[test]
    fn gini_within_bounds() {
        for counts in [vec![1, 1000], vec![1, 2, 3, 4, 5], vec![1, 1, 1, 1, 1, 1, 1, 100_000]] {
            let gini = gini(&counts);
            assert!((0.0..=1.0).contains(&gini), "gini {gini} for {counts:?}");
        }
    }

    #[test]
    fn exposures_in_percent() {
        let field = field_of(&["a", "a", "b", "c"]);
        let exposures = exposures(&field);
        assert_f64_near!(50.0, exposures["a"]);
        assert_f64_near!(25.0, exposures["b"]);
        assert_f64_near!(25.0, exposures["c"]);
    }

    #[test]
    fn deviation() {
        let key = |ownership_tertile| BucketKey {
            salary_bin: SalaryBin::Mid,
            ownership_tertile,
        };
        let shares = vec![
            BucketShare {
                key: key(OwnershipTertile::LowOwn),
                target: 0.5,
                realised: 0.45,
            },
            BucketShare {
                key: key(OwnershipTertile::HighOwn),
                target: 0.5,
                realised: 0.4,
            },
            BucketShare {
                key: key(OwnershipTertile::MidOwn),
                target: 0.0,
                realised: 0.15,
            },
        ];
        assert_float_absolute_eq!(0.15, bucket_deviation(&shares), 1e-12);
        assert_eq!(0.0, bucket_deviation(&[]));
    }

    #[test]
    fn top_duplicates() {
        let field = field_of(&["a", "b", "b", "c", "c", "c", "d", "d"]);
        let top = top_duplicated(&field, 2);
        assert_eq!(2, top.len());
        assert_eq!(single("c"), top[0].lineup);
        assert_eq!(3, top[0].count);
        assert_eq!(single("c").signature(), top[0].signature);
        assert_eq!(2, top[1].count);
    }

    #[test]
    fn compute() {
        let field = field_of(&["a", "a", "b"]);
        let telemetry = Telemetry::compute(
            &field,
            TelemetryInputs {
                bucket_shares: None,
                top_n: 5,
                effective_cap: Some(2),
                residual_violations: &[],
                notes: &[],
            },
        );
        assert_eq!(3, telemetry.contest_size);
        assert_eq!(2, telemetry.distinct_lineups);
        assert_eq!(BTreeMap::from([(1, 1), (2, 1)]), telemetry.duplication_histogram);
        assert_float_absolute_eq!(1.0 / 6.0, telemetry.gini, 1e-12);
        assert_eq!(0.0, telemetry.bucket_deviation);
        assert_eq!(2, telemetry.top_duplicated.len());
    }
}
