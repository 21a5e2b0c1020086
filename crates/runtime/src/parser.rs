//! Reading problem instances in the text input format.
//!
//! ```text
//! videos endpoints requests caches capacity
//! size_0 size_1 ... size_{videos-1}
//! datacenter_latency connected_caches     (once per endpoint, followed by
//! cache_id latency                         `connected_caches` lines)
//! video endpoint weight                   (once per request)
//! ```

use std::{
    path::Path,
    str::{FromStr, SplitWhitespace},
};

use crate::{
    error::{ParseError, Result},
    system::System,
};

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn read<T: FromStr>(&mut self, what: &'static str) -> std::result::Result<T, ParseError> {
        let token = self.inner.next().ok_or(ParseError::MissingToken(what))?;
        token.parse().map_err(|_| ParseError::InvalidNumber {
            what,
            token: token.to_string(),
        })
    }
}

/// Builds a [System] from input text. Either the whole input is valid or an error is returned.
pub fn parse_input(text: &str) -> std::result::Result<System, ParseError> {
    let mut tokens = Tokens::new(text);
    let video_count: usize = tokens.read("video count")?;
    let endpoint_count: usize = tokens.read("endpoint count")?;
    let request_count: usize = tokens.read("request count")?;
    let cache_count: usize = tokens.read("cache count")?;
    let cache_capacity: u64 = tokens.read("cache capacity")?;

    let mut video_sizes = Vec::with_capacity(video_count.min(1 << 20));
    for video in 0..video_count {
        let size: u64 = tokens.read("video size")?;
        if size == 0 {
            return Err(ParseError::ZeroVideoSize { video });
        }
        video_sizes.push(size);
    }

    let mut system = System::new(video_sizes, cache_count, cache_capacity);

    for endpoint in 0..endpoint_count {
        let datacenter_latency: u64 = tokens.read("datacenter latency")?;
        let connections: usize = tokens.read("connected cache count")?;
        let id = system.add_endpoint(datacenter_latency);
        debug_assert_eq!(id, endpoint);
        for _ in 0..connections {
            let cache: usize = tokens.read("cache id")?;
            let latency: u64 = tokens.read("cache latency")?;
            if cache >= cache_count {
                return Err(ParseError::UnknownCache {
                    endpoint,
                    cache,
                    cache_count,
                });
            }
            system.connect(endpoint, cache, latency);
        }
    }

    for request in 0..request_count {
        let video: usize = tokens.read("request video")?;
        let endpoint: usize = tokens.read("request endpoint")?;
        let weight: u64 = tokens.read("request weight")?;
        if video >= video_count {
            return Err(ParseError::UnknownVideo {
                request,
                video,
                video_count,
            });
        }
        if endpoint >= endpoint_count {
            return Err(ParseError::UnknownEndpoint {
                request,
                endpoint,
                endpoint_count,
            });
        }
        system.add_request(video, endpoint, weight);
    }

    Ok(system)
}

impl System {
    /// Reads a [System] from a file in the input format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(parse_input(&text)?)
    }
}
