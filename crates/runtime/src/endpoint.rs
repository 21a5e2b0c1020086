//! Model of an endpoint: a source of requests connected to some caches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    cache::CacheId,
    request::{Request, VideoId},
};

pub type EndpointId = usize;

/// Connection from an endpoint to a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLink {
    pub cache: CacheId,
    /// Latency in ms from the endpoint to the cache.
    pub latency: u64,
}

/// Model of an endpoint.
///
/// Keeps connected caches ordered from fastest to slowest and pending requests
/// ordered from highest to lowest score. Both orders are stable: an element goes
/// after the already present elements with an equal key.
#[derive(Debug, Clone)]
pub struct Endpoint {
    id: EndpointId,
    datacenter_latency: u64,
    caches: Vec<CacheLink>,
    requests: Vec<Request>,
}

impl Endpoint {
    pub fn new(id: EndpointId, datacenter_latency: u64) -> Self {
        Endpoint {
            id,
            datacenter_latency,
            caches: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// Latency in ms to the datacenter.
    pub fn datacenter_latency(&self) -> u64 {
        self.datacenter_latency
    }

    /// Connects endpoint to a cache.
    pub fn add_cache(&mut self, cache: CacheId, latency: u64) {
        let slot = self.caches.partition_point(|link| link.latency <= latency);
        self.caches.insert(slot, CacheLink { cache, latency });
    }

    /// Adds a request to the queue. A pending request for the same video absorbs
    /// the new one and moves to the position matching its new score.
    pub fn add_request(&mut self, request: Request) {
        let request = match self.position_of(request.video_id()) {
            Some(index) => {
                let mut existing = self.requests.remove(index);
                let merged = existing.merge_with(request);
                debug_assert!(merged.is_ok());
                existing
            }
            None => request,
        };
        let score = request.score();
        let slot = self.requests.partition_point(|r| r.score() >= score);
        self.requests.insert(slot, request);
    }

    /// Removes pending request for a given video and returns it.
    pub fn pull_request_by_id(&mut self, video_id: VideoId) -> Option<Request> {
        self.position_of(video_id).map(|index| self.requests.remove(index))
    }

    /// Removes pending request at a given queue position and returns it.
    pub fn pull_request_by_index(&mut self, index: usize) -> Option<Request> {
        if index >= self.requests.len() {
            return None;
        }
        Some(self.requests.remove(index))
    }

    /// Pending request for a given video, if any.
    pub fn pending_request(&self, video_id: VideoId) -> Option<&Request> {
        self.requests.iter().find(|r| r.video_id() == video_id)
    }

    /// Pending requests, highest score first.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Connected caches, fastest first.
    pub fn cache_links(&self) -> &[CacheLink] {
        &self.caches
    }

    /// Latencies of connected caches, in the order of [Endpoint::cache_links].
    pub fn cache_latencies(&self) -> Vec<u64> {
        self.caches.iter().map(|link| link.latency).collect()
    }

    /// Copy of the pending requests, highest score first.
    pub fn snapshot_requests(&self) -> Vec<Request> {
        self.requests.clone()
    }

    /// Ids of connected caches, fastest first.
    pub fn snapshot_caches(&self) -> Vec<CacheId> {
        self.caches.iter().map(|link| link.cache).collect()
    }

    /// Total weight of all pending requests.
    pub fn pending_weight(&self) -> u64 {
        self.requests.iter().fold(0u64, |total, r| total.saturating_add(r.weight()))
    }

    fn position_of(&self, video_id: VideoId) -> Option<usize> {
        self.requests.iter().position(|r| r.video_id() == video_id)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ENDPOINT #{} (latency: {} | caches: {} | requests: {})",
            self.id,
            self.datacenter_latency,
            self.caches.len(),
            self.requests.len()
        )
    }
}
