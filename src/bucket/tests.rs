use super::*;
use crate::pool::PlayerPool;
use crate::testing::{player, single};
use assert_float_eq::*;
use tinyrand::{Seeded, StdRand};

fn target(salary_bin: SalaryBin, ownership_tertile: OwnershipTertile, target_share: f64) -> BucketTarget {
    BucketTarget {
        salary_bin,
        ownership_tertile,
        target_share,
    }
}

fn fixture() -> (PlayerPool, Vec<Lineup>, SalaryBins) {
    let pool = PlayerPool::try_from_players(vec![
        player("p0", "T", 3_000, 10.0, Some(5.0), &["X"]),
        player("p1", "T", 6_000, 20.0, Some(20.0), &["X"]),
        player("p2", "T", 9_000, 30.0, Some(40.0), &["X"]),
        player("p3", "T", 9_000, 35.0, Some(60.0), &["X"]),
    ])
    .unwrap();
    let catalog = vec![single("p0"), single("p1"), single("p2"), single("p3")];
    let bins = SalaryBins {
        mid_from: 5_000,
        high_from: 8_000,
    };
    (pool, catalog, bins)
}

#[test]
fn key_ordinals_are_dense() {
    let ordinals: Vec<_> = BucketKey::all().map(|key| key.ordinal()).collect();
    assert_eq!((0..BUCKETS).collect::<Vec<_>>(), ordinals);
    let key = BucketKey {
        salary_bin: SalaryBin::High,
        ownership_tertile: OwnershipTertile::LowOwn,
    };
    assert_eq!("high/low_own", key.to_string());
}

#[test]
fn salary_bins() {
    let bins = SalaryBins::default();
    assert_eq!(SalaryBin::Low, bins.bin(48_499));
    assert_eq!(SalaryBin::Mid, bins.bin(48_500));
    assert_eq!(SalaryBin::High, bins.bin(50_000));
    assert!(SalaryBins { mid_from: 2, high_from: 1 }.validate().is_err());
}

#[test]
fn ownership_cuts_from_quantiles() {
    let legacy = OwnershipCuts::default();
    let cuts = OwnershipCuts::from_sums(&[5.0, 20.0, 40.0, 60.0], &legacy);
    assert_float_absolute_eq!(20.0, cuts.lower, 1e-9);
    assert_float_absolute_eq!(40.0, cuts.upper, 1e-9);
    assert_eq!(OwnershipTertile::LowOwn, cuts.tertile(19.9));
    assert_eq!(OwnershipTertile::MidOwn, cuts.tertile(20.0));
    assert_eq!(OwnershipTertile::HighOwn, cuts.tertile(40.0));
}

#[test]
fn ownership_cuts_fall_back_to_legacy() {
    let legacy = OwnershipCuts::default();
    assert_eq!(legacy, OwnershipCuts::from_sums(&[10.0, 0.0, 0.0, 30.0], &legacy));
    assert_eq!(legacy, OwnershipCuts::from_sums(&[], &legacy));
}

#[test]
fn allocation_rescales_to_exact_seats() {
    let targets = vec![
        target(SalaryBin::Low, OwnershipTertile::LowOwn, 1.0 / 3.0),
        target(SalaryBin::Mid, OwnershipTertile::MidOwn, 1.0 / 3.0),
        target(SalaryBin::High, OwnershipTertile::HighOwn, 1.0 / 3.0),
    ];
    let mut notes = Notes::default();
    let allocations = allocate_seats(&targets, 10, &mut notes);
    assert_eq!(10, allocations.iter().sum::<usize>());
    assert_eq!(4, allocations[targets[0].key().ordinal()]);
    assert_eq!(3, allocations[targets[1].key().ordinal()]);
    assert_eq!(3, allocations[targets[2].key().ordinal()]);
    assert!(notes.is_empty());
}

#[test]
fn allocation_renormalises_off_unit_shares() {
    let targets = vec![
        target(SalaryBin::Low, OwnershipTertile::LowOwn, 0.2),
        target(SalaryBin::High, OwnershipTertile::HighOwn, 0.2),
    ];
    let mut notes = Notes::default();
    let allocations = allocate_seats(&targets, 6, &mut notes);
    assert_eq!(3, allocations[targets[0].key().ordinal()]);
    assert_eq!(3, allocations[targets[1].key().ordinal()]);
    assert_eq!(vec![Note::TargetSharesRenormalised { share_sum: 0.4 }], notes.items());
}

#[test]
fn small_deviation_is_silent() {
    let targets = vec![
        target(SalaryBin::Low, OwnershipTertile::LowOwn, 0.5),
        target(SalaryBin::High, OwnershipTertile::HighOwn, 0.51),
    ];
    let mut notes = Notes::default();
    allocate_seats(&targets, 100, &mut notes);
    assert!(notes.is_empty());
}

#[test]
fn plan_partitions_catalog() {
    let (pool, catalog, bins) = fixture();
    let plan = BucketPlan::new(&catalog, &pool, vec![], &bins, &OwnershipCuts::default());
    let key = |index| plan.bucket_of(index);
    assert_eq!(SalaryBin::Low, key(0).salary_bin);
    assert_eq!(OwnershipTertile::LowOwn, key(0).ownership_tertile);
    assert_eq!(SalaryBin::Mid, key(1).salary_bin);
    assert_eq!(OwnershipTertile::MidOwn, key(1).ownership_tertile);
    assert_eq!(key(2), key(3));
    assert_eq!(OwnershipTertile::HighOwn, key(3).ownership_tertile);
}

#[test]
fn sample_meets_quota_and_backfills_empty_bucket() {
    let (pool, catalog, bins) = fixture();
    let targets = vec![
        target(SalaryBin::High, OwnershipTertile::HighOwn, 0.5),
        target(SalaryBin::Low, OwnershipTertile::LowOwn, 0.25),
        // no catalog lineup lives here
        target(SalaryBin::Low, OwnershipTertile::HighOwn, 0.25),
    ];
    let plan = BucketPlan::new(&catalog, &pool, targets, &bins, &OwnershipCuts::default());
    let probs = [0.25; 4];
    let full = CategoricalSampler::new(&probs).unwrap();
    let mut notes = Notes::default();
    let outcome = plan.sample(20, &probs, &full, &mut StdRand::seed(11), &mut notes);

    assert_eq!(20, outcome.draws.len());
    let high = outcome.draws.iter().filter(|&&index| index >= 2).count();
    let low = outcome.draws.iter().filter(|&&index| index == 0).count();
    // 10 quota seats for high/high_own and 5 for low/low_own, plus 5 backfilled anywhere
    assert!(high >= 10);
    assert!(low >= 5);
    assert_eq!(
        vec![Note::BucketShortfall {
            bucket: BucketKey {
                salary_bin: SalaryBin::Low,
                ownership_tertile: OwnershipTertile::HighOwn
            },
            seats: 5
        }],
        notes.items()
    );

    let realised_sum: f64 = outcome.shares.iter().map(|share| share.realised).sum();
    assert_float_absolute_eq!(1.0, realised_sum, 1e-12);
    let empty = outcome
        .shares
        .iter()
        .find(|share| share.key.salary_bin == SalaryBin::Low && share.key.ownership_tertile == OwnershipTertile::HighOwn)
        .unwrap();
    assert_float_absolute_eq!(0.25, empty.target, 1e-12);
    assert_eq!(0.0, empty.realised);
}

#[test]
fn sample_is_seed_deterministic() {
    let (pool, catalog, bins) = fixture();
    let targets = vec![
        target(SalaryBin::High, OwnershipTertile::HighOwn, 0.6),
        target(SalaryBin::Mid, OwnershipTertile::MidOwn, 0.4),
    ];
    let plan = BucketPlan::new(&catalog, &pool, targets, &bins, &OwnershipCuts::default());
    let probs = [0.1, 0.2, 0.3, 0.4];
    let full = CategoricalSampler::new(&probs).unwrap();
    let first = plan.sample(50, &probs, &full, &mut StdRand::seed(5), &mut Notes::default());
    let second = plan.sample(50, &probs, &full, &mut StdRand::seed(5), &mut Notes::default());
    assert_eq!(first, second);
}
