//! Errors of input parsing and configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed problem input. Nothing is constructed when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input while reading {0}")]
    MissingToken(&'static str),

    #[error("can't parse {what} from {token:?}")]
    InvalidNumber { what: &'static str, token: String },

    #[error("video {video} has zero size")]
    ZeroVideoSize { video: usize },

    #[error("endpoint {endpoint} refers to unknown cache {cache} (cache count is {cache_count})")]
    UnknownCache {
        endpoint: usize,
        cache: usize,
        cache_count: usize,
    },

    #[error("request {request} refers to unknown endpoint {endpoint} (endpoint count is {endpoint_count})")]
    UnknownEndpoint {
        request: usize,
        endpoint: usize,
        endpoint_count: usize,
    },

    #[error("request {request} refers to unknown video {video} (video count is {video_count})")]
    UnknownVideo {
        request: usize,
        video: usize,
        video_count: usize,
    },
}

/// Invalid run or strategy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown placement strategy {0:?}")]
    UnknownStrategy(String),

    #[error("malformed strategy name {0:?}")]
    MalformedName(String),

    #[error("invalid value {value:?} for parameter {param} of {strategy}")]
    InvalidParameter {
        strategy: &'static str,
        param: String,
        value: String,
    },

    #[error("unknown parameter {param} of {strategy}")]
    UnknownParameter { strategy: &'static str, param: String },

    #[error("granularity must be positive")]
    ZeroGranularity,

    #[error("divisor list must be non-empty and contain only positive values")]
    InvalidDivisors,

    #[error("can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{failed} of {total} experiment runs panicked")]
    RunsPanicked { failed: usize, total: usize },
}
