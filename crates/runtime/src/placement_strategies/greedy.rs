use crate::{cache::CachePool, endpoint::Endpoint, placement_strategy::PlacementStrategy};

/// Each call places the highest scoring pending request into the fastest cache
/// which has space for it.
#[derive(Debug, Default)]
pub struct GreedyStrategy {}

impl GreedyStrategy {
    pub fn new() -> Self {
        GreedyStrategy {}
    }
}

impl PlacementStrategy for GreedyStrategy {
    fn name(&self) -> String {
        "Greedy".to_string()
    }

    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, _pass: usize) {
        place_best_request(endpoint, caches);
    }
}

pub(crate) fn place_best_request(endpoint: &mut Endpoint, caches: &mut CachePool) {
    let Some(video_id) = endpoint.requests().first().map(|request| request.video_id()) else {
        return;
    };
    caches.place_in_fastest(endpoint, video_id);
}
