//! Demand for a single video coming from one endpoint.

use std::fmt;

use log::warn;

pub type RequestId = u64;
pub type VideoId = usize;

/// Demand for a video. Stored in an endpoint queue while pending and
/// in a cache once placed, where it only accumulates the total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    id: RequestId,
    video_id: VideoId,
    size: u64,
    weight: u64,
}

impl Request {
    /// Creates new request. `size` must be positive since it divides the weight in [Request::score].
    pub fn new(id: RequestId, video_id: VideoId, size: u64, weight: u64) -> Self {
        debug_assert!(size > 0, "video {} has zero size", video_id);
        Request {
            id,
            video_id,
            size,
            weight,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Weight per unit of size. Only used as an ordering key.
    pub fn score(&self) -> f64 {
        self.weight as f64 / self.size as f64
    }

    /// Absorbs `other` into this request by adding up the weights.
    ///
    /// Both requests must refer to the same video. Otherwise nothing changes
    /// and `other` is handed back to the caller.
    pub fn merge_with(&mut self, other: Request) -> Result<(), Request> {
        if self.video_id != other.video_id {
            warn!(
                "refusing to merge request #{} (video {}) into request #{} (video {})",
                other.id, other.video_id, self.id, self.video_id
            );
            return Err(other);
        }
        self.weight = self.weight.saturating_add(other.weight);
        Ok(())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "REQUEST #{} (video: {} | size: {} | weight: {} | score: {})",
            self.id,
            self.video_id,
            self.size,
            self.weight,
            self.score()
        )
    }
}

/// Hands out sequential request ids.
#[derive(Debug, Default, Clone)]
pub struct RequestIdGenerator {
    next_id: RequestId,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request with a fresh id.
    pub fn create(&mut self, video_id: VideoId, size: u64, weight: u64) -> Request {
        let id = self.next_id;
        self.next_id += 1;
        Request::new(id, video_id, size, weight)
    }
}
