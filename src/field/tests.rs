use super::*;
use crate::bucket::{BucketTarget, OwnershipCuts, OwnershipTertile, SalaryBin, SalaryBins};
use crate::testing::{dk_catalog, dk_pool, single, single_slot_pool};
use tinyrand::{Seeded, StdRand};

fn assembler(contest_size: usize, mode: AssemblyMode) -> FieldAssembler<'static> {
    FieldAssembler {
        contest_size,
        mode,
        sampling: SamplingMode::Weighted,
        buckets: None,
    }
}

#[test]
fn full_catalog_coverage_and_fill() {
    let catalog = vec![single("p1"), single("p2"), single("p3")];
    let user = vec![single("p0")];
    let probs = [1.0 / 3.0; 3];
    let mut notes = Notes::default();
    let assembly = assembler(6, AssemblyMode::FullCatalog)
        .assemble(&catalog, &user, &probs, &mut StdRand::seed(1), &mut notes)
        .unwrap();

    let field = &assembly.field;
    assert_eq!(6, field.len());
    assert_eq!(&single("p0"), field.lineup(0));
    assert_eq!(&catalog[..], &field.to_lineups()[1..4]);
    for extra in &field.to_lineups()[4..] {
        assert!(catalog.contains(extra));
    }
    assert_eq!(Protection::Prefix(4), assembly.protection);
    assert_eq!(vec![0, 1, 2], assembly.catalog_ids);
    assert!(assembly.bucket_shares.is_none());
    assert!(notes.is_empty());
}

#[test]
fn full_catalog_exact_fit_samples_nothing() {
    let catalog = vec![single("p1"), single("p2")];
    let probs = [0.5, 0.5];
    let assembly = assembler(2, AssemblyMode::FullCatalog)
        .assemble(&catalog, &[], &probs, &mut StdRand::seed(1), &mut Notes::default())
        .unwrap();
    assert_eq!(catalog, assembly.field.to_lineups());
}

#[test]
fn full_catalog_too_small() {
    let catalog = vec![single("p1"), single("p2"), single("p3")];
    let user = vec![single("p0")];
    let err = assembler(3, AssemblyMode::FullCatalog)
        .assemble(&catalog, &user, &[1.0 / 3.0; 3], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap_err();
    assert_eq!(
        AssemblyError::ContestTooSmall {
            contest_size: 3,
            required: 4
        },
        err
    );
}

#[test]
fn empty_catalog_and_mismatched_weights() {
    let err = assembler(3, AssemblyMode::FullCatalog)
        .assemble(&[], &[], &[], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap_err();
    assert_eq!(AssemblyError::EmptyCatalog, err);

    let err = assembler(3, AssemblyMode::FullCatalog)
        .assemble(&[single("p1")], &[], &[0.5, 0.5], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap_err();
    assert_eq!(AssemblyError::WeightMismatch { probs: 2, catalog: 1 }, err);

    let err = assembler(3, AssemblyMode::FullCatalog)
        .assemble(&[single("p1")], &[], &[0.0], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap_err();
    assert_eq!(AssemblyError::DegenerateWeights, err);
}

#[test]
fn replacement_mode_splices_user_entries() {
    let catalog: Vec<_> = (1..=5).map(|k| single(&format!("p{k}"))).collect();
    let user = vec![single("u0"), single("u1")];
    let probs = [0.6, 0.1, 0.1, 0.1, 0.1];
    let mut notes = Notes::default();
    let assembly = assembler(20, AssemblyMode::Replacement { max_dup_pct: 0.2 })
        .assemble(&catalog, &user, &probs, &mut StdRand::seed(9), &mut notes)
        .unwrap();

    let field = &assembly.field;
    assert_eq!(20, field.len());
    let Protection::Positions(positions) = &assembly.protection else {
        panic!("expected protected positions");
    };
    assert_eq!(2, positions.len());
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    let spliced: Vec<_> = positions.iter().map(|&position| field.lineup(position).clone()).collect();
    assert!(spliced.contains(&user[0]));
    assert!(spliced.contains(&user[1]));

    // 18 sampled seats over 5 lineups under a cap of ceil(0.2 × 20) = 4
    let pool_repair = assembly.pool_repair.as_ref().unwrap();
    assert_eq!(4, pool_repair.effective_cap);
    assert!(pool_repair.residuals.is_empty());
    let counts = field.counts();
    for &id in &assembly.catalog_ids {
        assert!(counts[id] <= 4, "lineup {id} has {} entries", counts[id]);
    }
    assert_eq!(18, assembly.catalog_ids.iter().map(|&id| counts[id]).sum::<usize>());
}

#[test]
fn replacement_mode_needs_room_for_users() {
    let err = assembler(1, AssemblyMode::Replacement { max_dup_pct: 0.5 })
        .assemble(&[single("p1")], &[single("u0"), single("u1")], &[1.0], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap_err();
    assert_eq!(
        AssemblyError::ContestTooSmall {
            contest_size: 1,
            required: 2
        },
        err
    );
}

#[test]
fn bucketed_fill_reports_realised_shares() {
    let pool = dk_pool();
    let catalog = dk_catalog(32);
    let targets = vec![
        BucketTarget {
            salary_bin: SalaryBin::Low,
            ownership_tertile: OwnershipTertile::LowOwn,
            target_share: 0.5,
        },
        BucketTarget {
            salary_bin: SalaryBin::Low,
            ownership_tertile: OwnershipTertile::HighOwn,
            target_share: 0.5,
        },
    ];
    let plan = BucketPlan::new(&catalog, &pool, targets, &SalaryBins::default(), &OwnershipCuts::default());
    let probs = vec![1.0 / 32.0; 32];
    let assembler = FieldAssembler {
        buckets: Some(&plan),
        ..assembler(132, AssemblyMode::FullCatalog)
    };
    let assembly = assembler
        .assemble(&catalog, &[], &probs, &mut StdRand::seed(4), &mut Notes::default())
        .unwrap();
    assert_eq!(132, assembly.field.len());
    let shares = assembly.bucket_shares.unwrap();
    let realised: f64 = shares.iter().map(|share| share.realised).sum();
    assert!((realised - 1.0).abs() < 1e-9);
}

#[test]
fn bucketed_replacement_fills_every_seat() {
    let pool = dk_pool();
    let catalog = dk_catalog(32);
    let targets = vec![
        BucketTarget {
            salary_bin: SalaryBin::Low,
            ownership_tertile: OwnershipTertile::LowOwn,
            target_share: 0.5,
        },
        BucketTarget {
            salary_bin: SalaryBin::High,
            ownership_tertile: OwnershipTertile::HighOwn,
            target_share: 0.5,
        },
    ];
    let plan = BucketPlan::new(&catalog, &pool, targets, &SalaryBins::default(), &OwnershipCuts::default());
    let probs = vec![1.0 / 32.0; 32];
    let assembler = FieldAssembler {
        buckets: Some(&plan),
        ..assembler(60, AssemblyMode::Replacement { max_dup_pct: 0.2 })
    };
    let user = vec![catalog[3].clone()];
    let assembly = assembler
        .assemble(&catalog, &user, &probs, &mut StdRand::seed(9), &mut Notes::default())
        .unwrap();
    assert_eq!(60, assembly.field.len());
    assert_eq!(Protection::Positions(vec![assembly.protection.positions()[0]]), assembly.protection);
    assert_eq!(&user[0], assembly.field.lineup(assembly.protection.positions()[0]));
}

#[test]
fn assembly_is_seed_deterministic() {
    let catalog = dk_catalog(10);
    let probs: Vec<_> = (1..=10).map(|k| k as f64 / 55.0).collect();
    let assemble = |seed| {
        assembler(40, AssemblyMode::Replacement { max_dup_pct: 0.1 })
            .assemble(&catalog, &[catalog[0].clone()], &probs, &mut StdRand::seed(seed), &mut Notes::default())
            .unwrap()
    };
    assert_eq!(assemble(17).field, assemble(17).field);
    assert_eq!(assemble(17).protection, assemble(17).protection);
}

#[test]
fn salary_window_filter() {
    let pool = single_slot_pool(3);
    let catalog = vec![single("p0"), single("p1")];
    let window = SalaryWindow {
        min: Some(4_000),
        max: None,
    };
    assert_eq!(catalog, window.filter(&catalog, &pool).unwrap());

    let window = SalaryWindow {
        min: Some(6_000),
        max: Some(7_000),
    };
    assert_eq!(
        AssemblyError::EmptySalaryWindow { window },
        window.filter(&catalog, &pool).unwrap_err()
    );
    assert_eq!("[6000, 7000]", window.to_string());
    assert_eq!("[*, *]", SalaryWindow::default().to_string());
}

#[test]
fn salary_window_validation() {
    assert!(SalaryWindow { min: Some(2), max: Some(1) }.validate().is_err());
    assert!(SalaryWindow { min: Some(1), max: None }.validate().is_ok());
}

#[test]
fn protection() {
    let prefix = Protection::Prefix(2);
    assert!(prefix.is_protected(1));
    assert!(!prefix.is_protected(2));
    assert_eq!(vec![0, 1], prefix.positions());
    let positions = Protection::Positions(vec![3, 7]);
    assert!(positions.is_protected(7));
    assert!(!positions.is_protected(4));
}

#[test]
fn field_serialises_as_lineups() {
    let catalog = vec![single("p1"), single("p2")];
    let assembly = assembler(2, AssemblyMode::FullCatalog)
        .assemble(&catalog, &[], &[0.5, 0.5], &mut StdRand::seed(1), &mut Notes::default())
        .unwrap();
    assert_eq!(r#"[["p1"],["p2"]]"#, serde_json::to_string(&assembly.field).unwrap());
}
