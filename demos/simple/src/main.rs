use std::io::Write;

use env_logger::Builder;
use log::info;

use vcache::{
    cache::CachePool, endpoint::Endpoint, placement_strategies::greedy::GreedyStrategy,
    placement_strategy::PlacementStrategy, runner::Runner, system::System,
};

/// Places the lowest scoring request into the slowest cache. Only here to show
/// how a custom strategy plugs into [Runner].
struct ContrarianStrategy {}

impl PlacementStrategy for ContrarianStrategy {
    fn name(&self) -> String {
        "Contrarian".to_string()
    }

    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, _pass: usize) {
        let Some(video_id) = endpoint.requests().last().map(|request| request.video_id()) else {
            return;
        };
        for cache in endpoint.snapshot_caches().into_iter().rev() {
            if caches.try_place(endpoint, cache, video_id).is_success() {
                break;
            }
        }
    }
}

fn build_system() -> System {
    let mut system = System::new(vec![50, 50, 80, 30, 110], 3, 100);

    let first = system.add_endpoint(1000);
    system.connect(first, 0, 100);
    system.connect(first, 2, 200);
    system.connect(first, 1, 300);
    let second = system.add_endpoint(500);

    system.add_request(3, first, 1500);
    system.add_request(0, second, 1000);
    system.add_request(4, first, 500);
    system.add_request(1, first, 1000);
    system
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let strategies: Vec<Box<dyn PlacementStrategy>> =
        vec![Box::new(GreedyStrategy::new()), Box::new(ContrarianStrategy {})];
    for strategy in strategies {
        let mut system = build_system();
        let mut runner = Runner::new(strategy, 3);
        let run_stats = runner.run(&mut system);
        info!("{}: {:?}", runner.strategy_name(), run_stats);

        println!("{}:", runner.strategy_name());
        for cache in system.caches().iter() {
            println!("  {} -> {:?}", cache, cache.resident_videos());
        }
    }
}
