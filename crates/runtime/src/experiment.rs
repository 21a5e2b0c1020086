use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use itertools::Itertools;
use log::{error, info};
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use crate::{
    error::{Error, Result},
    run_stats::RunStats,
    runner::Runner,
    strategy_config::StrategyConfig,
    system::System,
};

#[derive(Clone)]
pub struct Instance {
    pub name: String,
    pub path: PathBuf,
}

struct Run {
    instance: String,
    system: Arc<System>,
    strategy: StrategyConfig,
    passes: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub instance: String,
    pub strategy: String,
    pub passes: usize,
    pub run_stats: RunStats,
}

/// Runs every strategy on every instance with every pass count.
///
/// Runs are independent of each other: each one works on its own copy of the
/// instance and its own strategy instance.
pub struct Experiment {
    instances: Vec<Instance>,
    strategies: Vec<StrategyConfig>,
    passes: Vec<usize>,
    solutions_folder: Option<PathBuf>,
}

impl Experiment {
    pub fn new(
        instances: Vec<Instance>,
        strategies: Vec<StrategyConfig>,
        passes: Vec<usize>,
        solutions_folder: Option<PathBuf>,
    ) -> Self {
        Self {
            instances,
            strategies,
            passes,
            solutions_folder,
        }
    }

    /// Parses all instances, then executes runs on `threads` threads.
    /// Fails before running anything if some instance or strategy is invalid.
    pub fn run(self, threads: usize) -> Result<Vec<RunResult>> {
        for strategy in self.strategies.iter() {
            strategy.validate()?;
        }
        if let Some(dir) = &self.solutions_folder {
            std::fs::create_dir_all(dir)?;
        }

        let mut systems = Vec::new();
        for instance in self.instances.into_iter() {
            let system = System::from_file(&instance.path)?;
            info!("read instance {} from {}", instance.name, instance.path.display());
            systems.push((instance.name, Arc::new(system)));
        }

        let runs = systems
            .into_iter()
            .cartesian_product(self.strategies)
            .cartesian_product(self.passes)
            .map(|(((instance, system), strategy), passes)| Run {
                instance,
                system,
                strategy,
                passes,
            })
            .collect::<Vec<_>>();

        let total_runs = runs.len();

        let finished_run_atomic = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(Mutex::new(Vec::new()));

        let pool = ThreadPool::new(threads.max(1));
        let start_time = Instant::now();
        for run in runs.into_iter() {
            let finished_run_atomic = finished_run_atomic.clone();
            let results = results.clone();
            let solutions_folder = self.solutions_folder.clone();
            pool.execute(move || {
                let result = execute_run(run, solutions_folder);

                if let Ok(mut results) = results.lock() {
                    results.push(result);
                }

                let finished_runs = finished_run_atomic.fetch_add(1, Ordering::SeqCst) + 1;
                let elapsed = start_time.elapsed();
                let remaining = Duration::from_secs_f64(
                    elapsed.as_secs_f64() / finished_runs as f64 * (total_runs - finished_runs) as f64,
                );
                info!(
                    "Finished {}/{} [{}%] runs in {:.2?}, remaining time: {:.2?}",
                    finished_runs,
                    total_runs,
                    (finished_runs as f64 * 100. / total_runs as f64).round() as i32,
                    elapsed,
                    remaining
                );
            });
        }

        pool.join();

        info!("Finished {} runs in {:.2?}", total_runs, start_time.elapsed());

        let results = match Arc::try_unwrap(results) {
            Ok(results) => results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
            Err(results) => std::mem::take(&mut *results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())),
        };
        collect_results(&pool, results, total_runs)
    }
}

/// Fails if some job of `pool` panicked and left no result behind.
fn collect_results(pool: &ThreadPool, results: Vec<Result<RunResult>>, total_runs: usize) -> Result<Vec<RunResult>> {
    if pool.panic_count() > 0 || results.len() != total_runs {
        let failed = pool.panic_count().max(total_runs.saturating_sub(results.len()));
        error!("{} of {} runs panicked", failed, total_runs);
        return Err(Error::RunsPanicked {
            failed,
            total: total_runs,
        });
    }
    let mut results = results.into_iter().collect::<Result<Vec<_>>>()?;
    results.sort_by_cached_key(|run| (run.instance.clone(), run.strategy.clone(), run.passes));
    Ok(results)
}

fn execute_run(run: Run, solutions_folder: Option<PathBuf>) -> Result<RunResult> {
    let mut system = System::clone(&run.system);
    let mut runner = Runner::new(run.strategy.build()?, run.passes);
    let run_stats = runner.run(&mut system);
    let strategy = run.strategy.to_string();
    if let Some(folder) = solutions_folder {
        system.save_solution(folder.join(format!("{}_{}_{}.out", run.instance, strategy, run.passes)))?;
    }
    Ok(RunResult {
        instance: run.instance,
        strategy,
        passes: run.passes,
        run_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_result(instance: &str) -> RunResult {
        RunResult {
            instance: instance.to_string(),
            strategy: "Greedy".to_string(),
            passes: 1,
            run_stats: RunStats::default(),
        }
    }

    #[test]
    fn panicked_run_fails_experiment() {
        let pool = ThreadPool::new(2);
        pool.execute(|| panic!("run failed"));
        pool.join();

        let result = collect_results(&pool, vec![Ok(run_result("b"))], 2);
        assert!(matches!(result, Err(Error::RunsPanicked { failed: 1, total: 2 })));
    }

    #[test]
    fn complete_runs_are_sorted() {
        let pool = ThreadPool::new(1);
        let results = collect_results(&pool, vec![Ok(run_result("b")), Ok(run_result("a"))], 2).unwrap();
        assert_eq!(
            results.iter().map(|run| run.instance.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }
}
