//! Capacity-limited caches and the pool which owns all of them.

use std::{
    fmt,
    io::{self, Write},
    ops::Index,
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    endpoint::Endpoint,
    request::{Request, VideoId},
    trace::{Trace, TraceEvent},
};

pub type CacheId = usize;

/// Result of an attempt to move a request into a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Video was added to the cache.
    Stored,
    /// Video was already in the cache, request weight was added to it.
    Merged,
    /// Not enough free space, nothing changed.
    Rejected,
    /// Endpoint has no pending request for the video, nothing changed.
    NotPending,
}

impl Placement {
    pub fn is_success(&self) -> bool {
        matches!(self, Placement::Stored | Placement::Merged)
    }
}

/// Model of a cache server.
#[derive(Debug, Clone)]
pub struct Cache {
    id: CacheId,
    capacity: u64,
    used: u64,
    videos: Vec<Request>,
}

impl Cache {
    pub fn new(id: CacheId, capacity: u64) -> Self {
        Cache {
            id,
            capacity,
            used: 0,
            videos: Vec::new(),
        }
    }

    pub fn id(&self) -> CacheId {
        self.id
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining_space(&self) -> u64 {
        self.capacity - self.used
    }

    /// Stored videos in the order they were placed. Each one carries the total weight
    /// of all requests merged into it.
    pub fn videos(&self) -> &[Request] {
        &self.videos
    }

    /// Ids of stored videos in the order they were placed.
    pub fn resident_videos(&self) -> Vec<VideoId> {
        self.videos.iter().map(|video| video.video_id()).collect()
    }

    pub fn contains(&self, video_id: VideoId) -> bool {
        self.videos.iter().any(|video| video.video_id() == video_id)
    }

    /// Moves pending request for `video_id` from `endpoint` to this cache.
    ///
    /// If the video is already stored, the request is merged into it without using
    /// any space. On [Placement::Rejected] and [Placement::NotPending] neither the
    /// cache nor the endpoint is modified.
    pub fn try_place(&mut self, endpoint: &mut Endpoint, video_id: VideoId) -> Placement {
        let size = match endpoint.pending_request(video_id) {
            Some(request) => request.size(),
            None => return Placement::NotPending,
        };
        let resident = self.videos.iter().position(|video| video.video_id() == video_id);
        if resident.is_none() && size > self.remaining_space() {
            return Placement::Rejected;
        }
        let Some(request) = endpoint.pull_request_by_id(video_id) else {
            return Placement::NotPending;
        };
        match resident {
            Some(index) => {
                let merged = self.videos[index].merge_with(request);
                debug_assert!(merged.is_ok());
                Placement::Merged
            }
            None => {
                self.used += size;
                self.videos.push(request);
                Placement::Stored
            }
        }
    }

    /// Writes cache id followed by stored video ids in submission format.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", self.id)?;
        for video in self.videos.iter() {
            write!(writer, " {}", video.video_id())?;
        }
        writeln!(writer)
    }
}

impl fmt::Display for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CACHE #{} (usage: {}/{} | videos: {})",
            self.id,
            self.used,
            self.capacity,
            self.videos.len()
        )
    }
}

/// Number of placement attempts by outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCounters {
    pub stored: u64,
    pub merged: u64,
    pub rejected: u64,
}

/// Owns all caches of a system. Endpoints refer to caches by [CacheId], so a change
/// made through one endpoint is seen by every other endpoint connected to the same cache.
#[derive(Debug, Default, Clone)]
pub struct CachePool {
    caches: Vec<Cache>,
    counters: PlacementCounters,
    trace: Option<Trace>,
    pass: usize,
}

impl CachePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `count` caches with the same capacity.
    pub fn with_uniform_capacity(count: usize, capacity: u64) -> Self {
        let mut pool = Self::new();
        for _ in 0..count {
            pool.add_cache(capacity);
        }
        pool
    }

    /// Adds a new empty cache and returns its id.
    pub fn add_cache(&mut self, capacity: u64) -> CacheId {
        let id = self.caches.len();
        self.caches.push(Cache::new(id, capacity));
        id
    }

    pub fn get(&self, id: CacheId) -> Option<&Cache> {
        self.caches.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cache> {
        self.caches.iter()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    pub fn counters(&self) -> PlacementCounters {
        self.counters
    }

    /// Starts recording placement events.
    pub fn enable_trace(&mut self) {
        if self.trace.is_none() {
            self.trace = Some(Trace::new(self.caches.iter().map(|cache| cache.capacity).collect()));
        }
    }

    pub fn take_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Sets pass index attached to subsequent trace events.
    pub fn begin_pass(&mut self, pass: usize) {
        self.pass = pass;
    }

    /// Same as [Cache::try_place], but also updates counters and the trace.
    pub fn try_place(&mut self, endpoint: &mut Endpoint, cache_id: CacheId, video_id: VideoId) -> Placement {
        let Some(cache) = self.caches.get_mut(cache_id) else {
            warn!("endpoint {} refers to unknown cache {}", endpoint.id(), cache_id);
            return Placement::Rejected;
        };
        let size = endpoint.pending_request(video_id).map(|request| request.size());
        let placement = cache.try_place(endpoint, video_id);
        match placement {
            Placement::Stored => {
                self.counters.stored += 1;
                debug!(
                    "pass {}: endpoint {} stored video {} in cache {} ({}/{})",
                    self.pass,
                    endpoint.id(),
                    video_id,
                    cache_id,
                    cache.used,
                    cache.capacity
                );
                if let Some(trace) = self.trace.as_mut() {
                    trace.log(TraceEvent::Stored {
                        pass: self.pass,
                        endpoint: endpoint.id(),
                        cache: cache_id,
                        video: video_id,
                        size: size.unwrap_or_default(),
                    });
                }
            }
            Placement::Merged => {
                self.counters.merged += 1;
                debug!(
                    "pass {}: endpoint {} merged video {} into cache {}",
                    self.pass,
                    endpoint.id(),
                    video_id,
                    cache_id
                );
                if let Some(trace) = self.trace.as_mut() {
                    trace.log(TraceEvent::Merged {
                        pass: self.pass,
                        endpoint: endpoint.id(),
                        cache: cache_id,
                        video: video_id,
                    });
                }
            }
            Placement::Rejected => self.counters.rejected += 1,
            Placement::NotPending => {}
        }
        placement
    }

    /// Tries connected caches of `endpoint` from fastest to slowest and stops
    /// at the first one accepting the video.
    pub fn place_in_fastest(&mut self, endpoint: &mut Endpoint, video_id: VideoId) -> Option<CacheId> {
        for cache_id in endpoint.snapshot_caches() {
            if self.try_place(endpoint, cache_id, video_id).is_success() {
                return Some(cache_id);
            }
        }
        None
    }

    /// Writes the number of caches followed by one line per cache.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", self.caches.len())?;
        for cache in self.caches.iter() {
            cache.serialize(writer)?;
        }
        Ok(())
    }
}

impl Index<CacheId> for CachePool {
    type Output = Cache;

    fn index(&self, id: CacheId) -> &Cache {
        &self.caches[id]
    }
}
