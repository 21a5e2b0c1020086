//! Selection and parameters of a placement strategy for a run.

use std::{fmt, num::NonZeroUsize, path::Path, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    placement_strategies::{
        divisor_phased::{DivisorPhasedStrategy, DEFAULT_DIVISORS},
        greedy::GreedyStrategy,
        throttled_greedy::{ThrottledGreedyStrategy, DEFAULT_GRANULARITY, DEFAULT_MINIMUM_CACHES},
        trivial::TrivialStrategy,
    },
    placement_strategy::PlacementStrategy,
};

fn default_granularity() -> usize {
    DEFAULT_GRANULARITY
}

fn default_minimum_caches() -> usize {
    DEFAULT_MINIMUM_CACHES
}

fn default_divisors() -> Vec<u64> {
    DEFAULT_DIVISORS.to_vec()
}

/// Placement strategy with its parameters.
///
/// Besides serde, it can be parsed from a compact name like
/// `ThrottledGreedy[granularity=3,minimum_caches=1]` or `DivisorPhased[divisors=10;5]`.
/// Omitted parameters take default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrategyConfig {
    Trivial,
    Greedy,
    ThrottledGreedy {
        #[serde(default = "default_granularity")]
        granularity: usize,
        #[serde(default = "default_minimum_caches")]
        minimum_caches: usize,
    },
    DivisorPhased {
        #[serde(default = "default_divisors")]
        divisors: Vec<u64>,
    },
}

impl StrategyConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self {
            StrategyConfig::ThrottledGreedy { granularity: 0, .. } => Err(ConfigError::ZeroGranularity),
            StrategyConfig::DivisorPhased { divisors } if divisors.is_empty() || divisors.contains(&0) => {
                Err(ConfigError::InvalidDivisors)
            }
            _ => Ok(()),
        }
    }

    /// Creates a fresh strategy instance. Any state kept by the strategy starts empty.
    pub fn build(&self) -> std::result::Result<Box<dyn PlacementStrategy>, ConfigError> {
        let strategy: Box<dyn PlacementStrategy> = match self {
            StrategyConfig::Trivial => Box::new(TrivialStrategy::new()),
            StrategyConfig::Greedy => Box::new(GreedyStrategy::new()),
            StrategyConfig::ThrottledGreedy {
                granularity,
                minimum_caches,
            } => Box::new(ThrottledGreedyStrategy::new(
                NonZeroUsize::new(*granularity).ok_or(ConfigError::ZeroGranularity)?,
                *minimum_caches,
            )),
            StrategyConfig::DivisorPhased { divisors } => Box::new(DivisorPhasedStrategy::new(divisors.clone())?),
        };
        Ok(strategy)
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyConfig::Trivial => write!(f, "Trivial"),
            StrategyConfig::Greedy => write!(f, "Greedy"),
            StrategyConfig::ThrottledGreedy {
                granularity,
                minimum_caches,
            } => write!(
                f,
                "ThrottledGreedy[granularity={},minimum_caches={}]",
                granularity, minimum_caches
            ),
            StrategyConfig::DivisorPhased { divisors } => {
                write!(f, "DivisorPhased[divisors={}]", divisors.iter().join(";"))
            }
        }
    }
}

fn read_name(name: &str) -> std::result::Result<(&str, Vec<(&str, &str)>), ConfigError> {
    let Some(open) = name.find('[') else {
        return Ok((name.trim(), Vec::new()));
    };
    let args = name[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| ConfigError::MalformedName(name.to_string()))?;
    let args = args
        .split(',')
        .filter(|arg| !arg.trim().is_empty())
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim(), value.trim()))
                .ok_or_else(|| ConfigError::MalformedName(name.to_string()))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((name[..open].trim(), args))
}

fn parse_param<T: FromStr>(strategy: &'static str, param: &str, value: &str) -> std::result::Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidParameter {
        strategy,
        param: param.to_string(),
        value: value.to_string(),
    })
}

fn expect_no_params(strategy: &'static str, args: &[(&str, &str)]) -> std::result::Result<(), ConfigError> {
    match args.first() {
        Some((param, _)) => Err(ConfigError::UnknownParameter {
            strategy,
            param: param.to_string(),
        }),
        None => Ok(()),
    }
}

impl FromStr for StrategyConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, args) = read_name(s)?;
        let config = match name {
            "Trivial" => {
                expect_no_params("Trivial", &args)?;
                StrategyConfig::Trivial
            }
            "Greedy" => {
                expect_no_params("Greedy", &args)?;
                StrategyConfig::Greedy
            }
            "ThrottledGreedy" => {
                const NAME: &str = "ThrottledGreedy";
                let mut granularity = DEFAULT_GRANULARITY;
                let mut minimum_caches = DEFAULT_MINIMUM_CACHES;
                for (param, value) in args {
                    match param {
                        "granularity" => granularity = parse_param(NAME, param, value)?,
                        "minimum_caches" => minimum_caches = parse_param(NAME, param, value)?,
                        _ => {
                            return Err(ConfigError::UnknownParameter {
                                strategy: NAME,
                                param: param.to_string(),
                            })
                        }
                    }
                }
                StrategyConfig::ThrottledGreedy {
                    granularity,
                    minimum_caches,
                }
            }
            "DivisorPhased" => {
                const NAME: &str = "DivisorPhased";
                let mut divisors = default_divisors();
                for (param, value) in args {
                    match param {
                        "divisors" => {
                            divisors = value
                                .split(';')
                                .map(|divisor| parse_param(NAME, param, divisor.trim()))
                                .collect::<std::result::Result<Vec<u64>, _>>()?
                        }
                        _ => {
                            return Err(ConfigError::UnknownParameter {
                                strategy: NAME,
                                param: param.to_string(),
                            })
                        }
                    }
                }
                StrategyConfig::DivisorPhased { divisors }
            }
            _ => return Err(ConfigError::UnknownStrategy(name.to_string())),
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_passes() -> usize {
    1
}

/// Parameters of a single run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_passes")]
    pub passes: usize,
    pub strategy: StrategyConfig,
}

impl RunConfig {
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.strategy.validate()?;
        Ok(config)
    }

    /// Read [RunConfig] from YAML file.
    pub fn from_yaml<P: AsRef<Path>>(file: P) -> Result<Self> {
        Ok(Self::from_yaml_str(&std::fs::read_to_string(file)?)?)
    }
}
