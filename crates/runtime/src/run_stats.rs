//! Some stats from a completed run.

use serde::{Deserialize, Serialize};

use crate::{cache::PlacementCounters, system::System};

/// Some stats from a completed run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of executed passes.
    pub passes: usize,
    /// Number of endpoints in the system.
    pub endpoint_count: usize,
    /// Number of caches in the system.
    pub cache_count: usize,
    /// Placement attempts by outcome.
    pub placements: PlacementCounters,
    /// Total number of videos stored in caches. A video stored in two caches counts twice.
    pub resident_videos: usize,
    /// Number of distinct videos stored in at least one cache.
    pub distinct_resident_videos: usize,
    /// Sum of all cache capacities.
    pub total_capacity: u64,
    /// Sum of used space over all caches.
    pub total_used: u64,
    /// Fraction of the used space.
    pub space_utilization: f64,
    /// Requests still waiting in endpoint queues.
    pub pending_requests: usize,
    /// Total weight of the pending requests.
    pub pending_weight: u64,
    /// Total weight of the requests served by caches.
    pub placed_weight: u64,
}

impl RunStats {
    /// Collects stats from the current state of `system`.
    pub fn collect(system: &System, passes: usize) -> Self {
        let caches = system.caches();
        let total_capacity = saturating_sum(caches.iter().map(|cache| cache.capacity()));
        let total_used = saturating_sum(caches.iter().map(|cache| cache.used()));
        let mut distinct = caches
            .iter()
            .flat_map(|cache| cache.resident_videos())
            .collect::<Vec<_>>();
        distinct.sort_unstable();
        distinct.dedup();
        RunStats {
            passes,
            endpoint_count: system.endpoints().len(),
            cache_count: caches.len(),
            placements: caches.counters(),
            resident_videos: caches.iter().map(|cache| cache.videos().len()).sum(),
            distinct_resident_videos: distinct.len(),
            total_capacity,
            total_used,
            space_utilization: if total_capacity == 0 {
                0.0
            } else {
                total_used as f64 / total_capacity as f64
            },
            pending_requests: system.endpoints().iter().map(|endpoint| endpoint.requests().len()).sum(),
            pending_weight: saturating_sum(system.endpoints().iter().map(|endpoint| endpoint.pending_weight())),
            placed_weight: saturating_sum(
                caches
                    .iter()
                    .flat_map(|cache| cache.videos())
                    .map(|video| video.weight()),
            ),
        }
    }
}

/// Sum that stops at `u64::MAX`.
fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}
