use std::num::NonZeroUsize;

use crate::{cache::CachePool, endpoint::Endpoint, placement_strategy::PlacementStrategy};

use super::greedy::place_best_request;

pub const DEFAULT_GRANULARITY: usize = 3;
pub const DEFAULT_MINIMUM_CACHES: usize = 1;

/// Greedy placement where endpoints connected to many caches start later.
///
/// On pass `p` only endpoints with at most `p / granularity + minimum_caches`
/// connected caches place a request.
#[derive(Debug)]
pub struct ThrottledGreedyStrategy {
    granularity: NonZeroUsize,
    minimum_caches: usize,
}

impl ThrottledGreedyStrategy {
    pub fn new(granularity: NonZeroUsize, minimum_caches: usize) -> Self {
        Self {
            granularity,
            minimum_caches,
        }
    }

    /// Largest number of connected caches allowed to act on a given pass.
    pub fn threshold(&self, pass: usize) -> usize {
        (pass / self.granularity).saturating_add(self.minimum_caches)
    }
}

impl Default for ThrottledGreedyStrategy {
    fn default() -> Self {
        Self::new(
            NonZeroUsize::new(DEFAULT_GRANULARITY).unwrap_or(NonZeroUsize::MIN),
            DEFAULT_MINIMUM_CACHES,
        )
    }
}

impl PlacementStrategy for ThrottledGreedyStrategy {
    fn name(&self) -> String {
        format!(
            "ThrottledGreedy[granularity={},minimum_caches={}]",
            self.granularity, self.minimum_caches
        )
    }

    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, pass: usize) {
        if endpoint.cache_links().len() > self.threshold(pass) {
            return;
        }
        place_best_request(endpoint, caches);
    }
}
