#![doc = include_str!("../../../README.md")]

pub mod cache;
pub mod endpoint;
pub mod error;
pub mod experiment;
pub mod parser;
pub mod placement_strategies;
pub mod placement_strategy;
pub mod request;
pub mod run_stats;
pub mod runner;
pub mod strategy_config;
pub mod system;
pub mod trace;
