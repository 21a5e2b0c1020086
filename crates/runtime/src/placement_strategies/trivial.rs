use log::{debug, info};

use crate::{cache::CachePool, endpoint::Endpoint, placement_strategy::PlacementStrategy};

/// Places nothing. Dumps endpoint state on the first pass.
#[derive(Debug, Default)]
pub struct TrivialStrategy {}

impl TrivialStrategy {
    pub fn new() -> Self {
        TrivialStrategy {}
    }
}

impl PlacementStrategy for TrivialStrategy {
    fn name(&self) -> String {
        "Trivial".to_string()
    }

    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, pass: usize) {
        if pass != 0 {
            return;
        }
        info!("{}", endpoint);
        for link in endpoint.cache_links() {
            if let Some(cache) = caches.get(link.cache) {
                debug!("  {} at {} ms", cache, link.latency);
            }
        }
        for request in endpoint.requests() {
            debug!("  {}", request);
        }
    }
}
