//! Builds a simulated contest field from a catalog of candidate lineups, holds it to coverage,
//! bucket-share and duplicate-cap constraints, and settles it against a payout curve to
//! report risk and return telemetry.

#![allow(clippy::too_many_arguments)]

pub mod bucket;
pub mod config;
pub mod contest;
pub mod display;
pub mod engine;
pub mod field;
pub mod file;
pub mod hash_lookup;
pub mod lineup;
pub mod notes;
pub mod payout;
pub mod pool;
pub mod popularity;
pub mod print;
pub mod probs;
pub mod repair;
pub mod roster;
pub mod sampling;
pub mod scenario;
pub mod telemetry;
pub mod timed;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
