use crate::field::Field;
use crate::payout::{Aggregates, ReturnMetrics, SimulationResult};
use crate::telemetry::Telemetry;
use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

fn key_value_table() -> Table {
    Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(20)).with(Left)),
        Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
    ])
}

fn push_pair(table: &mut Table, key: &str, value: String) {
    table.push_row(Row::new(Styles::default(), vec![key.into(), value.into()]));
}

pub fn tabulate_telemetry(telemetry: &Telemetry) -> Table {
    let mut table = key_value_table();
    push_pair(&mut table, "Contest size", telemetry.contest_size.to_string());
    push_pair(&mut table, "Distinct lineups", telemetry.distinct_lineups.to_string());
    push_pair(&mut table, "Gini", format!("{:.4}", telemetry.gini));
    push_pair(&mut table, "Bucket deviation", format!("{:.4}", telemetry.bucket_deviation));
    push_pair(
        &mut table,
        "Duplicate cap",
        telemetry.effective_cap.map_or("-".into(), |cap| cap.to_string()),
    );
    push_pair(&mut table, "Residual violations", telemetry.residual_violations.len().to_string());
    push_pair(&mut table, "Notes", telemetry.notes.len().to_string());
    table
}

pub fn tabulate_histogram(telemetry: &Telemetry) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Copies".into(), "Lineups".into()],
        ));
    for (copies, lineups) in &telemetry.duplication_histogram {
        table.push_row(Row::new(
            Styles::default(),
            vec![copies.to_string().into(), lineups.to_string().into()],
        ));
    }
    table
}

pub fn tabulate_top_duplicated(telemetry: &Telemetry) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(18)).with(Left)),
            Col::new(Styles::default().with(MinWidth(40)).with(Left)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Signature".into(), "Lineup".into(), "Count".into()],
        ));
    for duplicated in &telemetry.top_duplicated {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                duplicated.signature.to_string().into(),
                duplicated.lineup.to_string().into(),
                duplicated.count.to_string().into(),
            ],
        ));
    }
    table
}

pub fn tabulate_bucket_shares(telemetry: &Telemetry) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(16)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Bucket".into(), "Target".into(), "Realised".into()],
        ));
    for share in &telemetry.bucket_shares {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                share.key.to_string().into(),
                format!("{:.4}", share.target).into(),
                format!("{:.4}", share.realised).into(),
            ],
        ));
    }
    table
}

/// The `limit` best-placed distinct lineups.
pub fn tabulate_lineup_results(field: &Field, simulation: &SimulationResult, limit: usize) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(40)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(Separator(true)).with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Rank".into(), "Lineup".into(), "Score".into(), "Copies".into(), "Prize".into()],
        ));
    let mut lineups: Vec<_> = simulation.lineups.iter().collect();
    lineups.sort_by_key(|result| result.best_rank);
    for result in lineups.into_iter().take(limit) {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                result.best_rank.to_string().into(),
                field.lineup_by_id(result.lineup_id).to_string().into(),
                format!("{:.2}", result.score).into(),
                result.duplicates.to_string().into(),
                format!("{:.2}", result.prize).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_aggregates(aggregates: &Aggregates, returns: Option<&ReturnMetrics>) -> Table {
    let mut table = key_value_table();
    push_pair(&mut table, "Entries", aggregates.entries.to_string());
    push_pair(&mut table, "Cost", format!("{:.2}", aggregates.cost));
    push_pair(&mut table, "Total prize", format!("{:.2}", aggregates.total_prize));
    push_pair(&mut table, "ROI", format!("{:.4}", aggregates.roi));
    push_pair(&mut table, "ITM", format!("{:.2}%", aggregates.itm * 100.0));
    push_pair(&mut table, "Duplicates mean", format!("{:.2}", aggregates.dup_mean));
    push_pair(&mut table, "Duplicates p95", format!("{:.2}", aggregates.dup_p95));
    push_pair(&mut table, "Duplicates max", aggregates.dup_max.to_string());
    push_pair(&mut table, "Duplication risk", format!("{:.4}", aggregates.duplication_risk));
    push_pair(&mut table, "Entropy", format!("{:.4}", aggregates.entropy));
    if let Some(returns) = returns {
        push_pair(&mut table, "Trials", returns.trials.to_string());
        push_pair(&mut table, "Mean return", format!("{:.4}", returns.mean));
        push_pair(&mut table, "Sharpe", format!("{:.4}", returns.sharpe));
        push_pair(&mut table, "Sortino", format!("{:.4}", returns.sortino));
    }
    table
}
