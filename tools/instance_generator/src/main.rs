use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use rand::{seq::index::sample, Rng, SeedableRng};
use rand_pcg::Pcg64;
use thiserror::Error;

use vcache::system::System;

/// Generates a random problem instance in the input format.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the generated instance.
    #[arg(short, long)]
    output_path: PathBuf,

    /// Number of videos.
    #[arg(long, default_value_t = 100)]
    videos: usize,

    /// Number of endpoints.
    #[arg(long, default_value_t = 10)]
    endpoints: usize,

    /// Number of request lines. Lines for the same video and endpoint are allowed.
    #[arg(long, default_value_t = 1000)]
    requests: usize,

    /// Number of caches.
    #[arg(long, default_value_t = 10)]
    caches: usize,

    /// Capacity of each cache.
    #[arg(long, default_value_t = 1000)]
    capacity: u64,

    /// Bounds of uniform distribution for video size.
    #[arg(long, default_value_t = 1)]
    video_size_from: u64,

    /// Bounds of uniform distribution for video size.
    #[arg(long, default_value_t = 1000)]
    video_size_to: u64,

    /// Maximum number of caches connected to one endpoint.
    #[arg(long, default_value_t = 5)]
    max_connections: usize,

    /// Connect every endpoint to every cache with the same latency.
    #[arg(long, default_value_t = false)]
    fully_connected: bool,

    /// Bounds of uniform distribution for datacenter latency.
    #[arg(long, default_value_t = 500)]
    datacenter_latency_from: u64,

    /// Bounds of uniform distribution for datacenter latency.
    #[arg(long, default_value_t = 1500)]
    datacenter_latency_to: u64,

    /// Bounds of uniform distribution for cache latency.
    #[arg(long, default_value_t = 10)]
    cache_latency_from: u64,

    /// Bounds of uniform distribution for cache latency.
    #[arg(long, default_value_t = 500)]
    cache_latency_to: u64,

    /// Bounds of uniform distribution for request weight.
    #[arg(long, default_value_t = 1)]
    weight_from: u64,

    /// Bounds of uniform distribution for request weight.
    #[arg(long, default_value_t = 1000)]
    weight_to: u64,

    /// Random seed.
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Parse the generated file back to make sure it is valid.
    #[arg(long, default_value_t = false)]
    check: bool,
}

#[derive(Debug, Error)]
enum GeneratorError {
    #[error("video size must be positive")]
    ZeroVideoSize,

    #[error("lower bound of {0} range is greater than the upper one")]
    EmptyRange(&'static str),

    #[error("requests need at least one video and one endpoint")]
    NothingToRequest,

    #[error("can't write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("generated instance is invalid: {0}")]
    Invalid(#[from] vcache::error::Error),
}

fn validate(args: &Args) -> Result<(), GeneratorError> {
    if args.video_size_from == 0 {
        return Err(GeneratorError::ZeroVideoSize);
    }
    let ranges = [
        ("video size", args.video_size_from, args.video_size_to),
        ("datacenter latency", args.datacenter_latency_from, args.datacenter_latency_to),
        ("cache latency", args.cache_latency_from, args.cache_latency_to),
        ("weight", args.weight_from, args.weight_to),
    ];
    if let Some((what, _, _)) = ranges.iter().find(|(_, from, to)| from > to) {
        return Err(GeneratorError::EmptyRange(*what));
    }
    if args.requests > 0 && (args.videos == 0 || args.endpoints == 0) {
        return Err(GeneratorError::NothingToRequest);
    }
    Ok(())
}

fn generate<W: Write>(args: &Args, out: &mut W) -> io::Result<()> {
    let mut rng = Pcg64::seed_from_u64(args.seed);

    writeln!(
        out,
        "{} {} {} {} {}",
        args.videos, args.endpoints, args.requests, args.caches, args.capacity
    )?;

    let sizes = (0..args.videos)
        .map(|_| rng.gen_range(args.video_size_from..=args.video_size_to).to_string())
        .collect::<Vec<_>>();
    writeln!(out, "{}", sizes.join(" "))?;

    let shared_latency = rng.gen_range(args.cache_latency_from..=args.cache_latency_to);
    let shared_datacenter_latency = rng.gen_range(args.datacenter_latency_from..=args.datacenter_latency_to);
    for _ in 0..args.endpoints {
        if args.fully_connected {
            writeln!(out, "{} {}", shared_datacenter_latency, args.caches)?;
            for cache in 0..args.caches {
                writeln!(out, "{} {}", cache, shared_latency)?;
            }
            continue;
        }
        let datacenter_latency = rng.gen_range(args.datacenter_latency_from..=args.datacenter_latency_to);
        let connections = rng.gen_range(0..=args.max_connections.min(args.caches));
        writeln!(out, "{} {}", datacenter_latency, connections)?;
        for cache in sample(&mut rng, args.caches, connections).into_iter() {
            let latency = rng
                .gen_range(args.cache_latency_from..=args.cache_latency_to)
                .min(datacenter_latency);
            writeln!(out, "{} {}", cache, latency)?;
        }
    }

    for _ in 0..args.requests {
        writeln!(
            out,
            "{} {} {}",
            rng.gen_range(0..args.videos),
            rng.gen_range(0..args.endpoints),
            rng.gen_range(args.weight_from..=args.weight_to)
        )?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), GeneratorError> {
    validate(args)?;

    let write_error = |source| GeneratorError::Write {
        path: args.output_path.clone(),
        source,
    };
    let file = File::create(&args.output_path).map_err(write_error)?;
    let mut out = BufWriter::new(file);
    generate(args, &mut out)
        .and_then(|_| out.flush())
        .map_err(write_error)?;

    if args.check {
        let system = System::from_file(&args.output_path)?;
        println!(
            "generated {} videos, {} endpoints, {} caches",
            system.video_sizes().len(),
            system.endpoints().len(),
            system.caches().len()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use vcache::parser::parse_input;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["instance_generator", "--output-path", "unused.in"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn generated(args: &Args) -> String {
        let mut out = Vec::new();
        generate(args, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn generated_instance_parses() {
        let args = args(&["--videos", "50", "--endpoints", "7", "--requests", "300", "--caches", "4"]);
        assert!(validate(&args).is_ok());
        let system = parse_input(&generated(&args)).unwrap();
        assert_eq!(system.video_sizes().len(), 50);
        assert_eq!(system.endpoints().len(), 7);
        assert_eq!(system.caches().len(), 4);
        assert!(system.video_sizes().iter().all(|&size| (1..=1000).contains(&size)));
        for endpoint in system.endpoints() {
            assert!(endpoint.cache_links().len() <= 4);
            assert!(endpoint
                .cache_links()
                .iter()
                .all(|link| link.latency <= endpoint.datacenter_latency()));
        }
    }

    #[test]
    fn fully_connected_instance_links_every_cache() {
        let args = args(&["--fully-connected", "--caches", "6", "--endpoints", "3"]);
        let system = parse_input(&generated(&args)).unwrap();
        assert!(system.endpoints().iter().all(|endpoint| endpoint.cache_links().len() == 6));
    }

    #[test]
    fn same_seed_same_instance() {
        assert_eq!(generated(&args(&["--seed", "7"])), generated(&args(&["--seed", "7"])));
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(
            validate(&args(&["--video-size-from", "0"])),
            Err(GeneratorError::ZeroVideoSize)
        ));
        assert!(matches!(
            validate(&args(&["--weight-from", "10", "--weight-to", "5"])),
            Err(GeneratorError::EmptyRange("weight"))
        ));
        assert!(matches!(
            validate(&args(&["--videos", "0"])),
            Err(GeneratorError::NothingToRequest)
        ));
    }
}
