use std::{io::Write, path::PathBuf, process::ExitCode};

use clap::Parser;
use env_logger::Builder;
use log::info;

use vcache::{
    error::Result,
    runner::Runner,
    strategy_config::{RunConfig, StrategyConfig},
    system::System,
};

/// Places videos into caches and writes the resulting cache contents.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the problem input.
    infile: PathBuf,

    /// Path to write cache contents to.
    outfile: PathBuf,

    /// Number of passes. Overrides the value from --config.
    passes: Option<usize>,

    /// Placement strategy, e.g. `Greedy` or `ThrottledGreedy[granularity=3,minimum_caches=1]`.
    #[arg(short, long, default_value = "Greedy")]
    strategy: StrategyConfig,

    /// YAML file with passes and strategy. Takes precedence over --strategy.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to write a JSON trace of all placements to.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Print run stats as JSON to stdout.
    #[arg(long)]
    stats: bool,
}

fn run(args: Args) -> Result<()> {
    let (strategy, passes) = match &args.config {
        Some(path) => {
            let config = RunConfig::from_yaml(path)?;
            (config.strategy, args.passes.unwrap_or(config.passes))
        }
        None => (args.strategy, args.passes.unwrap_or(1)),
    };

    let mut system = System::from_file(&args.infile)?;
    info!("Infile has been read. Starting computation...");
    if args.trace.is_some() {
        system.caches_mut().enable_trace();
    }

    let mut runner = Runner::new(strategy.build()?, passes);
    let run_stats = runner.run(&mut system);

    info!("Computation done, writing outfile.");
    system.save_solution(&args.outfile)?;
    if let (Some(trace), Some(path)) = (system.take_trace(), &args.trace) {
        trace.save(path)?;
    }
    if args.stats {
        println!("{}", serde_json::to_string_pretty(&run_stats)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
