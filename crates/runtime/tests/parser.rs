use std::path::PathBuf;

use vcache::{
    error::{ConfigError, ParseError},
    experiment::{Experiment, Instance},
    parser::parse_input,
    runner::Runner,
    strategy_config::{RunConfig, StrategyConfig},
    system::System,
};

const EXAMPLE: &str = "5 2 4 3 100
50 50 80 30 110
1000 3
0 100
2 200
1 300
500 0
3 0 1500
0 1 1000
4 0 500
1 0 1000
";

fn solution(system: &System) -> String {
    let mut out = Vec::new();
    system.write_solution(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vcache_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn parse_example() {
    let system = parse_input(EXAMPLE).unwrap();
    assert_eq!(system.video_sizes(), &[50, 50, 80, 30, 110]);
    assert_eq!(system.caches().len(), 3);
    assert!(system.caches().iter().all(|cache| cache.capacity() == 100));

    let first = &system.endpoints()[0];
    assert_eq!(first.datacenter_latency(), 1000);
    assert_eq!(first.snapshot_caches(), vec![0, 2, 1]);
    assert_eq!(
        first.requests().iter().map(|r| r.video_id()).collect::<Vec<_>>(),
        vec![3, 1, 4]
    );

    let second = &system.endpoints()[1];
    assert_eq!(second.datacenter_latency(), 500);
    assert!(second.cache_links().is_empty());
    assert_eq!(second.requests().len(), 1);
}

#[test]
fn greedy_on_example() {
    let mut system = parse_input(EXAMPLE).unwrap();
    let mut runner = Runner::new(StrategyConfig::Greedy.build().unwrap(), 3);
    let stats = runner.run(&mut system);
    assert_eq!(solution(&system), "3\n0 3 1\n1\n2\n");
    assert_eq!(stats.placements.stored, 2);
    assert_eq!(stats.placements.rejected, 3);
    assert_eq!(stats.pending_requests, 2);
    assert_eq!(stats.total_used, 80);
    assert_eq!(stats.total_capacity, 300);
}

#[test]
fn duplicate_request_lines_are_merged() {
    let system = parse_input("1 1 2 1 10\n5\n100 1\n0 10\n0 0 3\n0 0 4\n").unwrap();
    let requests = system.endpoints()[0].requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].weight(), 7);
}

#[test]
fn malformed_input() {
    assert_eq!(parse_input("").unwrap_err(), ParseError::MissingToken("video count"));
    assert_eq!(
        parse_input("2 0 0 1 100\n10").unwrap_err(),
        ParseError::MissingToken("video size")
    );
    assert_eq!(
        parse_input("1 0 0 1 100\nten").unwrap_err(),
        ParseError::InvalidNumber {
            what: "video size",
            token: "ten".to_string()
        }
    );
    assert_eq!(
        parse_input("1 0 0 1 100\n0").unwrap_err(),
        ParseError::ZeroVideoSize { video: 0 }
    );
    assert_eq!(
        parse_input("1 1 0 1 100\n10\n100 1\n3 10\n").unwrap_err(),
        ParseError::UnknownCache {
            endpoint: 0,
            cache: 3,
            cache_count: 1
        }
    );
    assert_eq!(
        parse_input("1 1 1 1 100\n10\n100 0\n2 0 5\n").unwrap_err(),
        ParseError::UnknownVideo {
            request: 0,
            video: 2,
            video_count: 1
        }
    );
    assert_eq!(
        parse_input("1 1 1 1 100\n10\n100 0\n0 1 5\n").unwrap_err(),
        ParseError::UnknownEndpoint {
            request: 0,
            endpoint: 1,
            endpoint_count: 1
        }
    );
    assert_eq!(
        parse_input("1 1 2 1 100\n10\n100 0\n0 0 5\n").unwrap_err(),
        ParseError::MissingToken("request video")
    );
}

#[test]
fn strategy_names() {
    assert_eq!("Greedy".parse::<StrategyConfig>().unwrap(), StrategyConfig::Greedy);
    assert_eq!("Trivial".parse::<StrategyConfig>().unwrap(), StrategyConfig::Trivial);
    assert_eq!(
        "ThrottledGreedy".parse::<StrategyConfig>().unwrap(),
        StrategyConfig::ThrottledGreedy {
            granularity: 3,
            minimum_caches: 1
        }
    );
    assert_eq!(
        "ThrottledGreedy[granularity=2, minimum_caches=200]"
            .parse::<StrategyConfig>()
            .unwrap(),
        StrategyConfig::ThrottledGreedy {
            granularity: 2,
            minimum_caches: 200
        }
    );
    let divisor_phased = "DivisorPhased[divisors=10;5]".parse::<StrategyConfig>().unwrap();
    assert_eq!(divisor_phased, StrategyConfig::DivisorPhased { divisors: vec![10, 5] });
    assert_eq!(divisor_phased.to_string(), "DivisorPhased[divisors=10;5]");
    assert_eq!(
        divisor_phased.build().unwrap().name(),
        "DivisorPhased[divisors=10;5]"
    );

    match "DivisorPhased".parse::<StrategyConfig>().unwrap() {
        StrategyConfig::DivisorPhased { divisors } => assert_eq!(divisors.len(), 15),
        other => panic!("unexpected config {:?}", other),
    }
}

#[test]
fn invalid_strategy_names() {
    assert!(matches!(
        "Random".parse::<StrategyConfig>(),
        Err(ConfigError::UnknownStrategy(_))
    ));
    assert!(matches!(
        "Greedy[x=1]".parse::<StrategyConfig>(),
        Err(ConfigError::UnknownParameter { .. })
    ));
    assert!(matches!(
        "ThrottledGreedy[granularity=0]".parse::<StrategyConfig>(),
        Err(ConfigError::ZeroGranularity)
    ));
    assert!(matches!(
        "ThrottledGreedy[granularity=x]".parse::<StrategyConfig>(),
        Err(ConfigError::InvalidParameter { .. })
    ));
    assert!(matches!(
        "DivisorPhased[divisors=10;0]".parse::<StrategyConfig>(),
        Err(ConfigError::InvalidDivisors)
    ));
    assert!(matches!(
        "DivisorPhased[divisors=10".parse::<StrategyConfig>(),
        Err(ConfigError::MalformedName(_))
    ));
}

#[test]
fn run_config_from_yaml() {
    let config = RunConfig::from_yaml_str("passes: 16\nstrategy:\n  type: DivisorPhased\n  divisors: [10, 5]\n").unwrap();
    assert_eq!(config.passes, 16);
    assert_eq!(config.strategy, StrategyConfig::DivisorPhased { divisors: vec![10, 5] });

    let config = RunConfig::from_yaml_str("strategy:\n  type: ThrottledGreedy\n").unwrap();
    assert_eq!(config.passes, 1);
    assert_eq!(
        config.strategy,
        StrategyConfig::ThrottledGreedy {
            granularity: 3,
            minimum_caches: 1
        }
    );

    assert!(RunConfig::from_yaml_str("strategy:\n  type: ThrottledGreedy\n  granularity: 0\n").is_err());
    assert!(RunConfig::from_yaml_str("strategy:\n  type: Unknown\n").is_err());
}

#[test]
fn experiment_runs_every_combination() {
    let dir = temp_dir("experiment");
    let input = dir.join("example.in");
    std::fs::write(&input, EXAMPLE).unwrap();
    let solutions = dir.join("solutions");

    let experiment = Experiment::new(
        vec![Instance {
            name: "example".to_string(),
            path: input,
        }],
        vec![StrategyConfig::Greedy, StrategyConfig::Trivial],
        vec![1, 3],
        Some(solutions.clone()),
    );
    let results = experiment.run(2).unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(
        results
            .iter()
            .map(|result| (result.strategy.as_str(), result.passes))
            .collect::<Vec<_>>(),
        vec![("Greedy", 1), ("Greedy", 3), ("Trivial", 1), ("Trivial", 3)]
    );
    assert_eq!(results[1].run_stats.resident_videos, 2);
    assert_eq!(results[3].run_stats.resident_videos, 0);
    assert_eq!(
        std::fs::read_to_string(solutions.join("example_Greedy_3.out")).unwrap(),
        "3\n0 3 1\n1\n2\n"
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn experiment_fails_on_malformed_instance() {
    let dir = temp_dir("malformed");
    let input = dir.join("broken.in");
    std::fs::write(&input, "1 1 1").unwrap();
    let experiment = Experiment::new(
        vec![Instance {
            name: "broken".to_string(),
            path: input,
        }],
        vec![StrategyConfig::Greedy],
        vec![1],
        None,
    );
    assert!(experiment.run(1).is_err());
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn experiment_keeps_oversized_video_out_of_cache() {
    let dir = temp_dir("oversized");
    let huge = dir.join("huge.in");
    std::fs::write(&huge, "2 1 2 1 100\n40 18446744073709551615\n1000 1\n0 10\n0 0 1000\n1 0 1\n").unwrap();
    let example = dir.join("example.in");
    std::fs::write(&example, EXAMPLE).unwrap();

    let experiment = Experiment::new(
        vec![
            Instance {
                name: "huge".to_string(),
                path: huge,
            },
            Instance {
                name: "example".to_string(),
                path: example,
            },
        ],
        vec![StrategyConfig::Greedy],
        vec![2],
        None,
    );
    let results = experiment.run(2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].instance, "huge");
    assert_eq!(results[1].run_stats.total_used, 40);
    assert_eq!(results[1].run_stats.resident_videos, 1);
    assert_eq!(results[1].run_stats.placements.rejected, 1);
    std::fs::remove_dir_all(dir).unwrap();
}
