use std::env;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use fieldsim::engine::{Engine, Inputs};
use fieldsim::file::ReadJsonFile;
use fieldsim::print::{
    tabulate_aggregates, tabulate_bucket_shares, tabulate_histogram, tabulate_lineup_results, tabulate_telemetry,
    tabulate_top_duplicated,
};
use fieldsim::scenario::Scenario;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// scenario file
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// overrides the scenario's seed
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// number of lineup results to print
    #[clap(short = 'l', long, default_value_t = 10)]
    lineups: usize,

    /// print the run as JSON instead of tables
    #[clap(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    debug!("args: {args:?}");

    let scenario = Scenario::read_json_file(&args.file)
        .with_context(|| format!("reading scenario from {}", args.file.display()))?;
    let seed = args.seed.unwrap_or(scenario.seed);
    let pool = scenario.pool()?;
    info!(
        "{} players, {} catalog lineups, {} user entries, contest size {}, seed {seed}",
        pool.len(),
        scenario.catalog.len(),
        scenario.user_entries.len(),
        scenario.config.contest_size
    );

    let engine = Engine::try_from(scenario.config.clone())?;
    let inputs = Inputs {
        pool: &pool,
        catalog: &scenario.catalog,
        user_entries: &scenario.user_entries,
    };
    let run = engine.run(&inputs, &scenario.payout, &scenario.score_sheets(), seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    let telemetry = &run.build.telemetry;
    info!("Field:\n{}", Console::default().render(&tabulate_telemetry(telemetry)));
    info!("Duplication:\n{}", Console::default().render(&tabulate_histogram(telemetry)));
    info!("Most duplicated:\n{}", Console::default().render(&tabulate_top_duplicated(telemetry)));
    if !telemetry.bucket_shares.is_empty() {
        info!("Buckets:\n{}", Console::default().render(&tabulate_bucket_shares(telemetry)));
    }
    info!(
        "Lineups:\n{}",
        Console::default().render(&tabulate_lineup_results(&run.build.field, &run.simulation, args.lineups))
    );
    let returns = run.trials.as_ref().map(|trials| &trials.metrics);
    info!(
        "Portfolio:\n{}",
        Console::default().render(&tabulate_aggregates(&run.simulation.aggregates, returns))
    );
    Ok(())
}
