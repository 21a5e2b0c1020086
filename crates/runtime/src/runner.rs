//! Pass driver.

use log::info;

use crate::{placement_strategy::PlacementStrategy, run_stats::RunStats, system::System};

/// Runs a placement strategy over a system for a fixed number of passes.
///
/// Every pass calls the strategy once per endpoint in increasing endpoint id order.
/// Caches are filled first come first served, so this order decides the result.
pub struct Runner {
    strategy: Box<dyn PlacementStrategy>,
    passes: usize,
}

impl Runner {
    pub fn new(strategy: Box<dyn PlacementStrategy>, passes: usize) -> Self {
        Runner { strategy, passes }
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Executes all passes and returns stats of the final state.
    pub fn run(&mut self, system: &mut System) -> RunStats {
        info!("Algorithm: {}", self.strategy.name());
        info!("Passes:    {}", self.passes);
        let (endpoints, caches) = system.parts_mut();
        for pass in 0..self.passes {
            caches.begin_pass(pass);
            for endpoint in endpoints.iter_mut() {
                self.strategy.execute(endpoint, caches, pass);
            }
        }
        let run_stats = RunStats::collect(system, self.passes);
        info!(
            "computation done: {} videos stored, {} requests pending",
            run_stats.resident_videos, run_stats.pending_requests
        );
        run_stats
    }
}
