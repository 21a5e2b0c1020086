use std::{io::Write, time::Instant};

use env_logger::Builder;

use vcache::{
    placement_strategies::divisor_phased::{DivisorPhasedStrategy, DEFAULT_DIVISORS},
    runner::Runner,
    system::System,
};

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    // Every endpoint sees every cache with the same latency, like the trending_today dataset.
    let video_count = 10000;
    let sizes = (0..video_count as u64).map(|i| (i * 7919) % 1000 + 1).collect::<Vec<_>>();
    let mut system = System::new(sizes, 100, 50000);
    for _ in 0..100 {
        let endpoint = system.add_endpoint(600);
        for cache in 0..100 {
            system.connect(endpoint, cache, 100);
        }
    }
    for i in 0..100000usize {
        system.add_request((i * 104729) % video_count, i % 100, (i as u64 * 31) % 1000 + 1);
    }

    let start_time = Instant::now();
    let mut runner = Runner::new(Box::new(DivisorPhasedStrategy::default()), DEFAULT_DIVISORS.len() + 1);
    let run_stats = runner.run(&mut system);
    match serde_yaml::to_string(&run_stats) {
        Ok(yaml) => println!("\nRun stats:\n{}", yaml),
        Err(e) => eprintln!("can't serialize run stats: {e}"),
    }
    println!("Finished in {:.2?}", start_time.elapsed());
}
