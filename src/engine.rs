//! The end-to-end pipeline: validation, popularity, assembly, repair, telemetry and payout.

use crate::bucket::BucketPlan;
use crate::config::{ConfigError, EngineConfig};
use crate::contest::PayoutCurve;
use crate::field::{AssemblyError, AssemblyMode, Field, FieldAssembler, Protection};
use crate::lineup::{validate_all, Lineup, LineupError, Origin};
use crate::notes::Notes;
use crate::payout::{PayoutSimulator, Portfolio, ScoreSheet, SimulationResult, TrialSummary};
use crate::pool::PlayerPool;
use crate::popularity;
use crate::repair::{RepairReport, Repairer, ResidualViolation};
use crate::telemetry::{Telemetry, TelemetryInputs};
use crate::timed::Timed;
use serde::Serialize;
use thiserror::Error;
use tinyrand::{Rand, Seeded, StdRand};
use tracing::debug;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lineup(#[from] LineupError),

    #[error("cannot assemble field: {0}")]
    Assembly(#[from] AssemblyError),
}

#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    pub pool: &'a PlayerPool,
    pub catalog: &'a [Lineup],
    pub user_entries: &'a [Lineup],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldBuild {
    pub field: Field,
    pub protection: Protection,
    /// Field positions holding the user entries.
    pub user_positions: Vec<usize>,
    /// The last duplicate-cap pass applied to the field, if any.
    pub repair: Option<RepairReport>,
    pub telemetry: Telemetry,
}
impl FieldBuild {
    /// The user entries if there are any, otherwise the whole field.
    pub fn portfolio(&self) -> Portfolio {
        if self.user_positions.is_empty() {
            Portfolio::All
        } else {
            Portfolio::Positions(self.user_positions.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub build: FieldBuild,
    pub simulation: SimulationResult,
    pub trials: Option<TrialSummary>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl TryFrom<EngineConfig> for Engine {
    type Error = ConfigError;

    fn try_from(config: EngineConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Engine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds and repairs a field of exactly `contest_size` entries, drawing only from `rand`.
    pub fn build_field(&self, inputs: &Inputs, rand: &mut impl Rand) -> Result<FieldBuild, EngineError> {
        let mut notes = Notes::default();
        let config = &self.config;
        validate_all(inputs.catalog, inputs.pool, &config.roster, Origin::Catalog)?;
        validate_all(inputs.user_entries, inputs.pool, &config.roster, Origin::UserEntry)?;
        if inputs.catalog.is_empty() {
            return Err(AssemblyError::EmptyCatalog.into());
        }

        let catalog = match &config.salary_window {
            Some(window) => window.filter(inputs.catalog, inputs.pool)?,
            None => inputs.catalog.to_vec(),
        };

        let popularity = Timed::value(|| {
            popularity::fit(&catalog, inputs.pool, &config.popularity, config.sampling, &mut notes)
        });
        debug!("fitted popularity in {:?}", popularity.elapsed);
        let probs = popularity.value.probs;

        let plan = config.bucket_targets.as_ref().map(|targets| {
            BucketPlan::new(
                &catalog,
                inputs.pool,
                targets.clone(),
                &config.salary_bins,
                &config.legacy_ownership_cuts,
            )
        });
        let assembler = FieldAssembler {
            contest_size: config.contest_size,
            mode: config.mode,
            sampling: config.sampling,
            buckets: plan.as_ref(),
        };
        let assembly = Timed::result(|| assembler.assemble(&catalog, inputs.user_entries, &probs, &mut *rand, &mut notes))?;
        debug!("assembled {} entries in {:?}", assembly.value.field.len(), assembly.elapsed);
        let assembly = assembly.value;

        let user_positions = match config.mode {
            AssemblyMode::FullCatalog => (0..inputs.user_entries.len()).collect(),
            AssemblyMode::Replacement { .. } => assembly.protection.positions(),
        };

        let pool_repair = assembly.pool_repair;
        let (field, repair) = match config.dup_cap {
            Some(cap) => {
                let repairer = Repairer {
                    catalog_ids: &assembly.catalog_ids,
                    probs: &probs,
                    sampling: config.sampling,
                };
                let repaired = Timed::value(|| repairer.repair(assembly.field, cap, &assembly.protection, &mut *rand, &mut notes));
                debug!("repaired field in {:?}", repaired.elapsed);
                let (field, report) = repaired.value;
                (field, Some(report))
            }
            None => (assembly.field, None),
        };
        let residual_violations = merge_residuals(&[pool_repair.as_ref(), repair.as_ref()]);
        let repair = repair.or(pool_repair);

        let telemetry = Telemetry::compute(
            &field,
            TelemetryInputs {
                bucket_shares: assembly.bucket_shares.as_deref(),
                top_n: config.top_n,
                effective_cap: repair.as_ref().map(|report| report.effective_cap),
                residual_violations: &residual_violations,
                notes: notes.items(),
            },
        );
        debug!(
            "field of {} entries over {} distinct lineups, gini {:.4}",
            telemetry.contest_size, telemetry.distinct_lineups, telemetry.gini
        );

        Ok(FieldBuild {
            field,
            protection: assembly.protection,
            user_positions,
            repair,
            telemetry,
        })
    }

    /// Builds a field from `seed`, settles it at projected scores and, given realised score
    /// sheets, summarises the portfolio's returns across them.
    pub fn run(&self, inputs: &Inputs, curve: &PayoutCurve, trials: &[ScoreSheet], seed: u64) -> Result<Run, EngineError> {
        let mut rand = StdRand::seed(seed);
        let mut build = self.build_field(inputs, &mut rand)?;

        let mut notes = Notes::default();
        let simulator = PayoutSimulator { curve };
        let portfolio = build.portfolio();
        let simulation = simulator.simulate(&build.field, &ScoreSheet::projected(inputs.pool), &portfolio, &mut notes);
        let trials = if trials.is_empty() {
            None
        } else {
            Some(simulator.simulate_trials(&build.field, trials, &portfolio, &mut Notes::default()))
        };
        build.telemetry.notes.extend_from_slice(notes.items());

        Ok(Run {
            build,
            simulation,
            trials,
        })
    }
}

/// Residuals of every duplicate-cap pass, in the order the passes ran.
fn merge_residuals(passes: &[Option<&RepairReport>]) -> Vec<ResidualViolation> {
    passes
        .iter()
        .flatten()
        .flat_map(|report| report.residuals.iter().cloned())
        .collect()
}
