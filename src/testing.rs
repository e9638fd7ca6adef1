//! Testing helpers and fixtures.

use crate::lineup::Lineup;
use crate::pool::{Player, PlayerPool};
use crate::roster::{RosterTemplate, Slot};
use assert_float_eq::*;
use tinyrand::Rand;

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

/// A generator that always yields the same word.
pub struct FixedRand(pub u64);

impl Rand for FixedRand {
    fn next_u64(&mut self) -> u64 {
        self.0
    }
}

pub fn player(id: &str, team: &str, salary: u32, projection: f64, ownership: Option<f64>, positions: &[&str]) -> Player {
    Player {
        id: id.into(),
        team: team.into(),
        salary,
        projection,
        ownership,
        positions: positions.iter().map(|&position| position.into()).collect(),
    }
}

const DK_POSITIONS: [&str; 5] = ["PG", "SG", "SF", "PF", "C"];

/// Four players per DK position, ids `pg0`..`c3`. Salaries rise with the suffix, as do
/// projections; ownership falls with it.
pub fn dk_pool() -> PlayerPool {
    let mut players = vec![];
    for (team_index, position) in DK_POSITIONS.iter().enumerate() {
        for k in 0..4 {
            let id = format!("{}{k}", position.to_lowercase());
            let salary = 4_000 + k * 600 + team_index as u32 * 100;
            players.push(player(
                &id,
                &format!("T{team_index}"),
                salary,
                salary as f64 / 200.0,
                Some(40.0 - k as f64 * 10.0),
                &[position],
            ));
        }
    }
    PlayerPool::try_from_players(players).unwrap()
}

/// The `i`-th distinct valid DK lineup over [dk_pool], for `i < 256`.
pub fn dk_lineup(i: usize) -> Lineup {
    let (a, b, c, d) = (i % 4, (i / 4) % 4, (i / 16) % 4, (i / 64) % 4);
    Lineup::new(vec![
        format!("pg{a}"),
        format!("sg{b}"),
        format!("sf{c}"),
        format!("pf{d}"),
        "c0".into(),
        format!("pg{}", (a + 1) % 4),
        format!("pf{}", (d + 1) % 4),
        "c1".into(),
    ])
}

pub fn dk_catalog(size: usize) -> Vec<Lineup> {
    (0..size).map(dk_lineup).collect()
}

/// A one-slot template accepting position `X`, for simplified lineups.
pub fn single_slot_template() -> RosterTemplate {
    RosterTemplate {
        slots: vec![Slot::new("X", &["X"])],
        salary_cap: 50_000,
    }
}

/// `count` interchangeable players `p0`, `p1`, ... at position `X`.
pub fn single_slot_pool(count: usize) -> PlayerPool {
    PlayerPool::try_from_players(
        (0..count).map(|k| player(&format!("p{k}"), "T", 5_000, 20.0, Some(10.0), &["X"])),
    )
    .unwrap()
}

pub fn single(id: &str) -> Lineup {
    Lineup::from(vec![id])
}
