use std::{
    collections::BTreeMap,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use env_logger::Builder;
use serde::Deserialize;

use vcache::{
    error::Result,
    experiment::{Experiment, Instance, RunResult},
    run_stats::RunStats,
    strategy_config::StrategyConfig,
};

fn default_passes() -> Vec<usize> {
    vec![1]
}

#[derive(Deserialize)]
struct Config {
    instances: Vec<PathBuf>,
    strategies: Vec<String>,
    #[serde(default = "default_passes")]
    passes: Vec<usize>,
}

/// Runs batch experiment.
#[derive(Parser, Debug)]
struct Args {
    /// Path to config.
    #[arg(short, long)]
    config: PathBuf,

    /// Path to folder for solution files.
    #[arg(short, long, default_value = None)]
    solutions: Option<PathBuf>,

    /// Path to file with results.
    #[arg(short, long)]
    output: PathBuf,

    /// Do not run experiments, just read results from --output.
    #[arg(long)]
    precalculated: bool,

    /// Number of threads.
    #[arg(long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
    threads: usize,
}

fn filename(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("instance")
        .to_string()
}

struct ResultRow {
    name: String,
    avg_fill: f64,
    min_fill: f64,
    avg_served: f64,
    wins: usize,
}

fn load_results(args: &Args) -> Result<Vec<RunResult>> {
    if args.precalculated {
        return Ok(serde_json::from_str(&std::fs::read_to_string(&args.output)?)?);
    }
    let config: Config = serde_yaml::from_str(&std::fs::read_to_string(&args.config)?)
        .map_err(vcache::error::ConfigError::from)?;
    let strategies = config
        .strategies
        .iter()
        .map(|name| name.parse::<StrategyConfig>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let experiment = Experiment::new(
        config
            .instances
            .into_iter()
            .enumerate()
            .map(|(i, path)| Instance {
                name: format!("{}_{}", i, filename(&path)),
                path,
            })
            .collect(),
        strategies,
        config.passes,
        args.solutions.clone(),
    );

    let result = experiment.run(args.threads)?;
    File::create(&args.output)?.write_all(serde_json::to_string_pretty(&result)?.as_bytes())?;
    Ok(result)
}

/// Fraction of the requested weight which is served from caches.
fn served_fraction(run_stats: &RunStats) -> f64 {
    let total = run_stats.placed_weight + run_stats.pending_weight;
    if total == 0 {
        0.0
    } else {
        run_stats.placed_weight as f64 / total as f64
    }
}

fn print_table(result: Vec<RunResult>) {
    type ExperimentSetup = (String, usize);
    let mut best_strategies: BTreeMap<ExperimentSetup, Vec<(String, f64)>> = BTreeMap::new();
    let mut strategy_runs: BTreeMap<String, Vec<RunResult>> = BTreeMap::new();
    for run in result.into_iter() {
        let served = served_fraction(&run.run_stats);
        best_strategies
            .entry((run.instance.clone(), run.passes))
            .or_default()
            .push((run.strategy.clone(), served));
        strategy_runs.entry(run.strategy.clone()).or_default().push(run);
    }

    let mut wins: BTreeMap<String, usize> = BTreeMap::new();
    for (_setup, values) in best_strategies.into_iter() {
        if let Some((best, _)) = values.iter().max_by(|a, b| a.1.total_cmp(&b.1)) {
            *wins.entry(best.clone()).or_default() += 1;
        }
    }

    let mut rows = strategy_runs
        .into_iter()
        .map(|(name, runs)| {
            let fills = runs.iter().map(|run| run.run_stats.space_utilization).collect::<Vec<_>>();
            let served = runs
                .iter()
                .map(|run| served_fraction(&run.run_stats))
                .collect::<Vec<_>>();
            ResultRow {
                wins: wins.get(&name).copied().unwrap_or(0),
                name,
                avg_fill: fills.iter().sum::<f64>() / fills.len() as f64 * 100.,
                min_fill: fills.iter().copied().min_by(|a, b| a.total_cmp(b)).unwrap_or(0.0) * 100.,
                avg_served: served.iter().sum::<f64>() / served.len() as f64 * 100.,
            }
        })
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| b.avg_served.total_cmp(&a.avg_served).then(a.name.cmp(&b.name)));

    let width = rows.iter().map(|x| x.name.len()).max().unwrap_or(0).max("strategy".len());
    println!(
        "| {: <width$} | avg fill | min fill | served weight | wins |",
        "strategy",
        width = width
    );
    println!("|-{:-<width$}-|----------|----------|---------------|------|", "", width = width);
    for row in rows.into_iter() {
        println!(
            "| {: <width$} | {: >7.2}% | {: >7.2}% | {: >12.2}% | {: >4} |",
            row.name,
            row.avg_fill,
            row.min_fill,
            row.avg_served,
            row.wins,
            width = width
        );
    }
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    match load_results(&args) {
        Ok(result) => {
            print_table(result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
