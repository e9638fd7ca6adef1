//! Lineups, their signatures, and validation against a [PlayerPool] and [RosterTemplate].

use crate::display::DisplayTruncated;
use crate::pool::{Player, PlayerPool};
use crate::roster::RosterTemplate;
use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use strum_macros::Display;
use thiserror::Error;

/// Number of offending lineups carried in a [LineupError].
pub const MAX_REPORTED_OFFENDERS: usize = 5;

/// A slot-ordered assignment of player ids. Two lineups are the same entry iff their
/// slot-ordered ids are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lineup {
    players: Vec<String>,
}
impl Lineup {
    pub fn new(players: Vec<String>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn signature(&self) -> Signature {
        let mut hasher = FxHasher::default();
        self.players.hash(&mut hasher);
        Signature(hasher.finish())
    }

    /// Resolves the lineup's players against the pool, skipping unknown ids.
    pub fn resolve<'a>(&'a self, pool: &'a PlayerPool) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.iter().filter_map(|id| pool.get(id))
    }

    /// Widened to `u64`, so any number of `u32` salaries sums without overflow.
    pub fn salary(&self, pool: &PlayerPool) -> u64 {
        self.resolve(pool).map(|player| u64::from(player.salary)).sum()
    }

    pub fn projection(&self, pool: &PlayerPool) -> f64 {
        self.resolve(pool).map(|player| player.projection).sum()
    }

    pub fn ownership(&self, pool: &PlayerPool) -> f64 {
        self.resolve(pool).map(Player::ownership_or_zero).sum()
    }

    /// Returns the first fault found, checking shape, then players, then the salary cap.
    pub fn check(&self, pool: &PlayerPool, template: &RosterTemplate) -> Result<(), LineupFault> {
        if self.players.len() != template.len() {
            return Err(LineupFault::WrongSize {
                expected: template.len(),
                actual: self.players.len(),
            });
        }
        let mut seen = FxHashSet::default();
        let mut salary = 0u64;
        for (id, slot) in self.players.iter().zip(template.slots.iter()) {
            if !seen.insert(id) {
                return Err(LineupFault::DuplicatePlayer(id.clone()));
            }
            let player = pool
                .get(id)
                .ok_or_else(|| LineupFault::UnknownPlayer(id.clone()))?;
            if !slot.accepts(player.positions.iter()) {
                return Err(LineupFault::Ineligible {
                    player: id.clone(),
                    slot: slot.name.clone(),
                });
            }
            salary += u64::from(player.salary);
        }
        if salary > u64::from(template.salary_cap) {
            return Err(LineupFault::OverCap {
                salary,
                cap: template.salary_cap,
            });
        }
        Ok(())
    }
}

impl From<Vec<&str>> for Lineup {
    fn from(players: Vec<&str>) -> Self {
        Self::new(players.into_iter().map(String::from).collect())
    }
}

impl Display for Lineup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.players.join("/"))
    }
}

/// Stable hash of the slot-ordered player ids, independent of salaries and eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signature(pub u64);

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineupFault {
    #[error("expected {expected} players, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    #[error("player {0} appears more than once")]
    DuplicatePlayer(String),

    #[error("unknown player {0}")]
    UnknownPlayer(String),

    #[error("player {player} is not eligible for slot {slot}")]
    Ineligible { player: String, slot: String },

    #[error("salary {salary} exceeds cap {cap}")]
    OverCap { salary: u64, cap: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Origin {
    #[strum(serialize = "catalog")]
    Catalog,

    #[strum(serialize = "user entry")]
    UserEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offender {
    pub index: usize,
    pub fault: LineupFault,
}

impl Display for Offender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {}", self.index, self.fault)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub struct LineupError {
    pub origin: Origin,
    pub invalid: usize,
    pub offenders: Vec<Offender>,
}

impl Display for LineupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} invalid {} lineup(s), first offenders: {}",
            self.invalid,
            self.origin,
            DisplayTruncated::from(&*self.offenders)
        )
    }
}

/// Validates every lineup, failing with the first [MAX_REPORTED_OFFENDERS] offenders.
pub fn validate_all(
    lineups: &[Lineup],
    pool: &PlayerPool,
    template: &RosterTemplate,
    origin: Origin,
) -> Result<(), LineupError> {
    let mut invalid = 0;
    let mut offenders = vec![];
    for (index, lineup) in lineups.iter().enumerate() {
        if let Err(fault) = lineup.check(pool, template) {
            invalid += 1;
            if offenders.len() < MAX_REPORTED_OFFENDERS {
                offenders.push(Offender { index, fault });
            }
        }
    }
    if invalid == 0 {
        Ok(())
    } else {
        Err(LineupError {
            origin,
            invalid,
            offenders,
        })
    }
}
