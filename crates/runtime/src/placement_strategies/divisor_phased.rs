use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    cache::CachePool, endpoint::Endpoint, error::ConfigError, placement_strategy::PlacementStrategy,
    request::VideoId,
};

/// Divisors of the cache size used on the dataset where every endpoint sees every cache.
pub const DEFAULT_DIVISORS: [u64; 15] = [1000, 625, 500, 400, 250, 200, 125, 100, 80, 50, 40, 25, 20, 16, 10];

/// Strategy for systems where every endpoint is connected to every cache, so a video
/// needs to be stored only once.
///
/// Pass `p < divisors.len()` places videos whose size is a multiple of `divisors[p]`, which
/// fills caches with little fragmentation. Any later pass places whatever is left.
/// Videos stored by any endpoint are never attempted again by this instance.
#[derive(Debug)]
pub struct DivisorPhasedStrategy {
    divisors: Vec<u64>,
    placed: HashSet<VideoId>,
}

impl DivisorPhasedStrategy {
    /// `divisors` should be in descending order. Fails if it is empty or contains zero.
    pub fn new(divisors: Vec<u64>) -> Result<Self, ConfigError> {
        if divisors.is_empty() || divisors.contains(&0) {
            return Err(ConfigError::InvalidDivisors);
        }
        Ok(Self {
            divisors,
            placed: HashSet::new(),
        })
    }

    pub fn divisors(&self) -> &[u64] {
        &self.divisors
    }

    /// Whether `video_id` was already stored in some cache by this strategy.
    pub fn is_placed(&self, video_id: VideoId) -> bool {
        self.placed.contains(&video_id)
    }

    fn place(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, video_id: VideoId) {
        if self.placed.contains(&video_id) {
            return;
        }
        if caches.place_in_fastest(endpoint, video_id).is_some() {
            self.placed.insert(video_id);
        }
    }
}

impl Default for DivisorPhasedStrategy {
    fn default() -> Self {
        Self {
            divisors: DEFAULT_DIVISORS.to_vec(),
            placed: HashSet::new(),
        }
    }
}

impl PlacementStrategy for DivisorPhasedStrategy {
    fn name(&self) -> String {
        format!("DivisorPhased[divisors={}]", self.divisors.iter().join(";"))
    }

    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, pass: usize) {
        let requests = endpoint.snapshot_requests();
        match self.divisors.get(pass).copied() {
            Some(divisor) => {
                for request in requests.iter().filter(|request| request.size() % divisor == 0) {
                    self.place(endpoint, caches, request.video_id());
                }
            }
            None => {
                // Lowest score first. Fits one more video than the forward order on the reference dataset.
                for request in requests.iter().rev() {
                    self.place(endpoint, caches, request.video_id());
                }
            }
        }
    }
}
