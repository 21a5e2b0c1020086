//! Whole problem instance: videos, caches and endpoints.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    cache::{CacheId, CachePool},
    endpoint::{Endpoint, EndpointId},
    error::Result,
    request::{RequestIdGenerator, VideoId},
    trace::Trace,
};

/// Owns all entities of a problem instance.
///
/// Caches live in a single [CachePool] and endpoints refer to them by id.
#[derive(Debug, Clone)]
pub struct System {
    video_sizes: Vec<u64>,
    caches: CachePool,
    endpoints: Vec<Endpoint>,
    request_ids: RequestIdGenerator,
}

impl System {
    /// Creates a system with given video sizes and `cache_count` empty caches of the same capacity.
    pub fn new(video_sizes: Vec<u64>, cache_count: usize, cache_capacity: u64) -> Self {
        System {
            video_sizes,
            caches: CachePool::with_uniform_capacity(cache_count, cache_capacity),
            endpoints: Vec::new(),
            request_ids: RequestIdGenerator::new(),
        }
    }

    /// Adds an endpoint without connections and returns its id.
    pub fn add_endpoint(&mut self, datacenter_latency: u64) -> EndpointId {
        let id = self.endpoints.len();
        self.endpoints.push(Endpoint::new(id, datacenter_latency));
        id
    }

    /// Connects endpoint to a cache. Panics if the endpoint doesn't exist.
    pub fn connect(&mut self, endpoint: EndpointId, cache: CacheId, latency: u64) {
        self.endpoints[endpoint].add_cache(cache, latency);
    }

    /// Registers `weight` requests of `video` from `endpoint`. Panics if the endpoint or video doesn't exist.
    pub fn add_request(&mut self, video: VideoId, endpoint: EndpointId, weight: u64) {
        let request = self.request_ids.create(video, self.video_sizes[video], weight);
        self.endpoints[endpoint].add_request(request);
    }

    pub fn video_sizes(&self) -> &[u64] {
        &self.video_sizes
    }

    pub fn video_size(&self, video: VideoId) -> Option<u64> {
        self.video_sizes.get(video).copied()
    }

    pub fn caches(&self) -> &CachePool {
        &self.caches
    }

    pub fn caches_mut(&mut self) -> &mut CachePool {
        &mut self.caches
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id)
    }

    /// Mutable access to endpoints and caches at the same time.
    pub fn parts_mut(&mut self) -> (&mut [Endpoint], &mut CachePool) {
        (&mut self.endpoints, &mut self.caches)
    }

    pub fn take_trace(&mut self) -> Option<Trace> {
        self.caches.take_trace()
    }

    /// Writes cache contents in submission format.
    pub fn write_solution<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.caches.serialize(writer)?;
        Ok(())
    }

    /// Writes cache contents in submission format to a file.
    pub fn save_solution<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_solution(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
