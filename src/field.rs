//! Field assembly. A [Field] is an exact-size sequence of entries built from the catalog, the
//! user's protected entries and the popularity distribution, in one of two [AssemblyMode]s.

use crate::bucket::{BucketPlan, BucketShare};
use crate::config::ConfigError;
use crate::hash_lookup::HashLookup;
use crate::lineup::Lineup;
use crate::notes::Notes;
use crate::pool::PlayerPool;
use crate::popularity::SamplingMode;
use crate::repair::{RepairReport, Repairer};
use crate::sampling::{choose_without_replacement, CategoricalSampler};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tinyrand::Rand;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssemblyError {
    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("no catalog lineup has a salary in {window}")]
    EmptySalaryWindow { window: SalaryWindow },

    #[error("contest size {contest_size} cannot hold the {required} entries it must cover")]
    ContestTooSmall { contest_size: usize, required: usize },

    #[error("{probs} popularity weights supplied for {catalog} catalog lineups")]
    WeightMismatch { probs: usize, catalog: usize },

    #[error("popularity weights carry no sampling mass")]
    DegenerateWeights,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyMode {
    /// User entries, then one copy of every catalog lineup, then sampled seats.
    #[default]
    FullCatalog,

    /// Every seat but the user entries is sampled and held to a percentage-of-field cap;
    /// user entries are then spliced in at random positions.
    Replacement { max_dup_pct: f64 },
}
impl AssemblyMode {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            AssemblyMode::FullCatalog => Ok(()),
            AssemblyMode::Replacement { max_dup_pct } => {
                if *max_dup_pct > 0.0 && *max_dup_pct <= 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidDuplicatePercentage(*max_dup_pct))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryWindow {
    pub min: Option<u32>,
    pub max: Option<u32>,
}
impl SalaryWindow {
    pub fn contains(&self, salary: u64) -> bool {
        self.min.map_or(true, |min| salary >= u64::from(min)) && self.max.map_or(true, |max| salary <= u64::from(max))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(ConfigError::InvalidSalaryWindow { min, max }),
            _ => Ok(()),
        }
    }

    /// The catalog lineups whose total salary lies in the window.
    pub fn filter(&self, catalog: &[Lineup], pool: &PlayerPool) -> Result<Vec<Lineup>, AssemblyError> {
        let retained: Vec<_> = catalog
            .iter()
            .filter(|lineup| self.contains(lineup.salary(pool)))
            .cloned()
            .collect();
        debug!("salary window {self} retained {} of {} lineups", retained.len(), catalog.len());
        if retained.is_empty() {
            return Err(AssemblyError::EmptySalaryWindow { window: *self });
        }
        Ok(retained)
    }
}

impl std::fmt::Display for SalaryWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |value: Option<u32>| value.map_or("*".to_string(), |value| value.to_string());
        write!(f, "[{}, {}]", bound(self.min), bound(self.max))
    }
}

/// Field positions the repairer must never alter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protection {
    Prefix(usize),
    /// Sorted, distinct positions.
    Positions(Vec<usize>),
}
impl Protection {
    pub fn is_protected(&self, position: usize) -> bool {
        match self {
            Protection::Prefix(len) => position < *len,
            Protection::Positions(positions) => positions.binary_search(&position).is_ok(),
        }
    }

    pub fn positions(&self) -> Vec<usize> {
        match self {
            Protection::Prefix(len) => (0..*len).collect(),
            Protection::Positions(positions) => positions.clone(),
        }
    }
}

/// The entries of a contest, stored as ids into a table of distinct lineups.
#[derive(Debug, Clone)]
pub struct Field {
    table: HashLookup<Lineup>,
    entries: Vec<usize>,
}
impl Field {
    pub(crate) fn new(table: HashLookup<Lineup>, entries: Vec<usize>) -> Self {
        debug_assert!(entries.iter().all(|&id| id < table.len()));
        Self { table, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lineup id at every position.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    pub fn lineup(&self, position: usize) -> &Lineup {
        &self.table[self.entries[position]]
    }

    pub fn lineup_by_id(&self, id: usize) -> &Lineup {
        &self.table[id]
    }

    /// Size of the lineup id space. Some ids may have no entries.
    pub fn ids(&self) -> usize {
        self.table.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lineup> + '_ {
        self.entries.iter().map(|&id| &self.table[id])
    }

    /// Number of entries per lineup id.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.table.len()];
        for &id in &self.entries {
            counts[id] += 1;
        }
        counts
    }

    pub(crate) fn replace(&mut self, position: usize, id: usize) {
        self.entries[position] = id;
    }

    pub fn to_lineups(&self) -> Vec<Lineup> {
        self.iter().cloned().collect()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub field: Field,
    pub protection: Protection,
    /// Lineup id of every catalog index.
    pub catalog_ids: Vec<usize>,
    /// Realised bucket shares of the freshly sampled seats, when targets were configured.
    pub bucket_shares: Option<Vec<BucketShare>>,
    /// The percentage-of-field cap pass of replacement mode.
    pub pool_repair: Option<RepairReport>,
}

#[derive(Debug, Clone)]
pub struct FieldAssembler<'a> {
    pub contest_size: usize,
    pub mode: AssemblyMode,
    pub sampling: SamplingMode,
    pub buckets: Option<&'a BucketPlan>,
}
impl FieldAssembler<'_> {
    /// Assembles a field of exactly `contest_size` entries. `probs` holds one popularity
    /// weight per catalog lineup.
    pub fn assemble(
        &self,
        catalog: &[Lineup],
        user_entries: &[Lineup],
        probs: &[f64],
        rand: &mut impl Rand,
        notes: &mut Notes,
    ) -> Result<Assembly, AssemblyError> {
        if catalog.is_empty() {
            return Err(AssemblyError::EmptyCatalog);
        }
        if probs.len() != catalog.len() {
            return Err(AssemblyError::WeightMismatch {
                probs: probs.len(),
                catalog: catalog.len(),
            });
        }
        let required = match self.mode {
            AssemblyMode::FullCatalog => user_entries.len() + catalog.len(),
            AssemblyMode::Replacement { .. } => user_entries.len(),
        };
        if self.contest_size < required {
            return Err(AssemblyError::ContestTooSmall {
                contest_size: self.contest_size,
                required,
            });
        }
        let full = CategoricalSampler::new(probs).ok_or(AssemblyError::DegenerateWeights)?;

        let mut table = HashLookup::with_capacity(catalog.len() + user_entries.len());
        let catalog_ids: Vec<_> = catalog.iter().map(|lineup| table.intern(lineup)).collect();
        let user_ids: Vec<_> = user_entries.iter().map(|lineup| table.intern(lineup)).collect();

        let assembly = match self.mode {
            AssemblyMode::FullCatalog => {
                let mut entries = Vec::with_capacity(self.contest_size);
                entries.extend_from_slice(&user_ids);
                entries.extend_from_slice(&catalog_ids);
                let covered = entries.len();
                let (draws, bucket_shares) = self.fill(self.contest_size - covered, probs, &full, rand, notes);
                entries.extend(draws.into_iter().map(|index| catalog_ids[index]));
                debug!(
                    "full-catalog field: {} user, {} coverage, {} sampled",
                    user_ids.len(),
                    catalog_ids.len(),
                    self.contest_size - covered
                );
                Assembly {
                    field: Field::new(table, entries),
                    protection: Protection::Prefix(covered),
                    catalog_ids,
                    bucket_shares,
                    pool_repair: None,
                }
            }
            AssemblyMode::Replacement { max_dup_pct } => {
                let seats = self.contest_size - user_ids.len();
                let (draws, bucket_shares) = self.fill(seats, probs, &full, rand, notes);
                let sampled: Vec<_> = draws.into_iter().map(|index| catalog_ids[index]).collect();

                let cap = usize::max(1, (max_dup_pct * self.contest_size as f64).ceil() as usize);
                let repairer = Repairer {
                    catalog_ids: &catalog_ids,
                    probs,
                    sampling: self.sampling,
                };
                let (sampled, pool_repair) =
                    repairer.repair(Field::new(table, sampled), cap, &Protection::Prefix(0), rand, notes);

                let mut positions = choose_without_replacement(self.contest_size, user_ids.len(), rand);
                let mut user_at = vec![None; self.contest_size];
                for (&position, &id) in positions.iter().zip(user_ids.iter()) {
                    user_at[position] = Some(id);
                }
                let Field { table, entries: pool } = sampled;
                let mut pool = pool.into_iter();
                let entries: Vec<_> = user_at
                    .into_iter()
                    .filter_map(|user| user.or_else(|| pool.next()))
                    .collect();
                debug_assert_eq!(self.contest_size, entries.len());
                positions.sort_unstable();
                debug!(
                    "replacement field: {seats} sampled under cap {}, {} user entries spliced",
                    pool_repair.effective_cap,
                    user_ids.len()
                );
                Assembly {
                    field: Field::new(table, entries),
                    protection: Protection::Positions(positions),
                    catalog_ids,
                    bucket_shares,
                    pool_repair: Some(pool_repair),
                }
            }
        };
        Ok(assembly)
    }

    fn fill(
        &self,
        seats: usize,
        probs: &[f64],
        full: &CategoricalSampler,
        rand: &mut impl Rand,
        notes: &mut Notes,
    ) -> (Vec<usize>, Option<Vec<BucketShare>>) {
        match self.buckets {
            Some(plan) => {
                let outcome = plan.sample(seats, probs, full, rand, notes);
                (outcome.draws, Some(outcome.shares))
            }
            None => (full.sample_many(seats, rand), None),
        }
    }
}

#[cfg(test)]
mod tests;
