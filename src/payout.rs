//! Payout simulation over a frozen field. Entries are ranked by score, paid from the curve,
//! and tied scores split the prizes of the ranks they jointly occupy.

use crate::contest::PayoutCurve;
use crate::field::Field;
use crate::lineup::{Lineup, Signature};
use crate::notes::{Note, Notes};
use crate::pool::PlayerPool;
use crate::probs::SliceExt;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

/// Fantasy points per player. Players missing from the sheet score nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSheet {
    points: FxHashMap<String, f64>,
}
impl ScoreSheet {
    /// Scores every player at their projection.
    pub fn projected(pool: &PlayerPool) -> Self {
        Self::from_points(pool.players().map(|player| (player.id.clone(), player.projection)))
    }

    pub fn from_points<S: Into<String>>(points: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            points: points.into_iter().map(|(id, points)| (id.into(), points)).collect(),
        }
    }

    pub fn player(&self, id: &str) -> f64 {
        self.points.get(id).copied().unwrap_or(0.0)
    }

    /// Sums in player-id order, so the same players score identically whatever their slots.
    pub fn lineup(&self, lineup: &Lineup) -> f64 {
        let mut ids: Vec<_> = lineup.players().iter().collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| self.player(id)).sum()
    }
}

/// The field positions whose results make up the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Portfolio {
    All,
    Positions(Vec<usize>),
}
impl Portfolio {
    pub fn positions(&self, field_len: usize) -> Vec<usize> {
        match self {
            Portfolio::All => (0..field_len).collect(),
            Portfolio::Positions(positions) => positions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryResult {
    /// Position in the field.
    pub entry: usize,
    pub lineup_id: usize,
    pub score: f64,
    pub rank: usize,
    pub prize: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupResult {
    pub lineup_id: usize,
    pub signature: Signature,
    pub duplicates: usize,
    pub score: f64,
    /// Summed over all duplicates.
    pub prize: f64,
    pub best_rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub entries: usize,
    pub total_prize: f64,
    pub cost: f64,
    pub roi: f64,
    pub itm: f64,
    pub dup_mean: f64,
    pub dup_p95: f64,
    pub dup_max: usize,
    pub duplication_risk: f64,
    pub entropy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// One result per field position, in field order.
    pub entries: Vec<EntryResult>,
    /// One result per distinct lineup, in lineup-id order.
    pub lineups: Vec<LineupResult>,
    pub aggregates: Aggregates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnMetrics {
    pub trials: usize,
    pub mean: f64,
    pub stdev: f64,
    pub sharpe: f64,
    pub sortino: f64,
}
impl ReturnMetrics {
    pub fn from_returns(returns: &[f64]) -> Self {
        let mean = returns.mean();
        let stdev = returns.stdev().unwrap_or(0.0);
        let downside: Vec<_> = returns.iter().copied().filter(|&value| value < 0.0).collect();
        let downside_stdev = downside.stdev().unwrap_or(0.0);
        Self {
            trials: returns.len(),
            mean,
            stdev,
            sharpe: ratio(mean, stdev),
            sortino: ratio(mean, downside_stdev),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    /// Portfolio ROI of every trial.
    pub returns: Vec<f64>,
    pub metrics: ReturnMetrics,
}

#[derive(Debug, Clone)]
pub struct PayoutSimulator<'a> {
    pub curve: &'a PayoutCurve,
}
impl PayoutSimulator<'_> {
    pub fn simulate(&self, field: &Field, sheet: &ScoreSheet, portfolio: &Portfolio, notes: &mut Notes) -> SimulationResult {
        self.check_size(field, notes);
        self.settle(field, sheet, portfolio)
    }

    /// Settles the same field once per score sheet and summarises the portfolio's returns.
    pub fn simulate_trials(
        &self,
        field: &Field,
        sheets: &[ScoreSheet],
        portfolio: &Portfolio,
        notes: &mut Notes,
    ) -> TrialSummary {
        self.check_size(field, notes);
        let returns: Vec<_> = sheets
            .iter()
            .map(|sheet| self.settle(field, sheet, portfolio).aggregates.roi)
            .collect();
        let metrics = ReturnMetrics::from_returns(&returns);
        debug!(
            "{} trials: mean ROI {:.4}, sharpe {:.4}, sortino {:.4}",
            metrics.trials, metrics.mean, metrics.sharpe, metrics.sortino
        );
        TrialSummary { returns, metrics }
    }

    fn check_size(&self, field: &Field, notes: &mut Notes) {
        if field.len() != self.curve.field_size() {
            notes.push(Note::ContestSizeMismatch {
                contest_size: field.len(),
                curve_field_size: self.curve.field_size(),
            });
        }
    }

    fn settle(&self, field: &Field, sheet: &ScoreSheet, portfolio: &Portfolio) -> SimulationResult {
        let counts = field.counts();
        let lineup_scores: Vec<_> = (0..field.ids())
            .map(|id| if counts[id] > 0 { sheet.lineup(field.lineup_by_id(id)) } else { 0.0 })
            .collect();

        let mut order: Vec<_> = (0..field.len()).collect();
        let entry_score = |position: usize| lineup_scores[field.entries()[position]];
        order.sort_by(|&a, &b| entry_score(b).total_cmp(&entry_score(a)).then(a.cmp(&b)));

        let mut prizes = vec![0.0; field.len()];
        let mut ranks = vec![0; field.len()];
        let mut start = 0;
        while start < order.len() {
            let score = entry_score(order[start]);
            let mut end = start + 1;
            while end < order.len() && entry_score(order[end]) == score {
                end += 1;
            }
            let pooled: f64 = (start + 1..=end).map(|rank| self.curve.prize_for_rank(rank)).sum();
            let dead_heat = pooled / (end - start) as f64;
            for (offset, &position) in order[start..end].iter().enumerate() {
                ranks[position] = start + offset + 1;
                prizes[position] = dead_heat;
            }
            start = end;
        }

        let entries: Vec<_> = (0..field.len())
            .map(|position| EntryResult {
                entry: position,
                lineup_id: field.entries()[position],
                score: entry_score(position),
                rank: ranks[position],
                prize: prizes[position],
            })
            .collect();

        let mut lineups: Vec<LineupResult> = Vec::new();
        let mut slot_of = vec![None; field.ids()];
        for entry in &entries {
            match slot_of[entry.lineup_id] {
                Some(slot) => {
                    let result: &mut LineupResult = &mut lineups[slot];
                    result.prize += entry.prize;
                    result.best_rank = result.best_rank.min(entry.rank);
                }
                None => {
                    slot_of[entry.lineup_id] = Some(lineups.len());
                    lineups.push(LineupResult {
                        lineup_id: entry.lineup_id,
                        signature: field.lineup_by_id(entry.lineup_id).signature(),
                        duplicates: counts[entry.lineup_id],
                        score: entry.score,
                        prize: entry.prize,
                        best_rank: entry.rank,
                    });
                }
            }
        }
        lineups.sort_by_key(|result| result.lineup_id);

        let aggregates = self.aggregate(&entries, &counts, &portfolio.positions(field.len()));
        debug!(
            "settled {} entries: portfolio of {} won {:.2} (ROI {:.4})",
            entries.len(),
            aggregates.entries,
            aggregates.total_prize,
            aggregates.roi
        );
        SimulationResult {
            entries,
            lineups,
            aggregates,
        }
    }

    fn aggregate(&self, entries: &[EntryResult], counts: &[usize], positions: &[usize]) -> Aggregates {
        let held: Vec<_> = positions.iter().filter_map(|&position| entries.get(position)).collect();
        let field_size: usize = counts.iter().sum();
        let entropy = if field_size == 0 {
            0.0
        } else {
            -counts
                .iter()
                .filter(|&&count| count > 0)
                .map(|&count| {
                    let share = count as f64 / field_size as f64;
                    share * share.ln()
                })
                .sum::<f64>()
        };
        if held.is_empty() {
            return Aggregates {
                entropy,
                ..Aggregates::default()
            };
        }

        let total_prize: f64 = held.iter().map(|entry| entry.prize).sum();
        let cost = held.len() as f64 * self.curve.entry_fee();
        let roi = if cost > 0.0 { (total_prize - cost) / cost } else { 0.0 };
        let in_the_money = held.iter().filter(|entry| entry.prize > 0.0).count();
        let duplicated = held.iter().filter(|entry| counts[entry.lineup_id] > 1).count();

        let mut held_ids: Vec<_> = held.iter().map(|entry| entry.lineup_id).collect();
        held_ids.sort_unstable();
        held_ids.dedup();
        let dup_counts: Vec<_> = held_ids.iter().map(|&id| counts[id] as f64).collect();

        Aggregates {
            entries: held.len(),
            total_prize,
            cost,
            roi,
            itm: in_the_money as f64 / held.len() as f64,
            dup_mean: dup_counts.mean(),
            dup_p95: dup_counts.quantile(0.95).unwrap_or(0.0),
            dup_max: held_ids.iter().map(|&id| counts[id]).max().unwrap_or(0),
            duplication_risk: duplicated as f64 / held.len() as f64,
            entropy,
        }
    }
}
