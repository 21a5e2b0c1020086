use std::{fs::File, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{cache::CacheId, endpoint::EndpointId, request::VideoId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    Stored {
        pass: usize,
        endpoint: EndpointId,
        cache: CacheId,
        video: VideoId,
        size: u64,
    },
    Merged {
        pass: usize,
        endpoint: EndpointId,
        cache: CacheId,
        video: VideoId,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trace {
    pub cache_capacities: Vec<u64>,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(cache_capacities: Vec<u64>) -> Self {
        Self {
            cache_capacities,
            events: Vec::new(),
        }
    }

    pub fn log(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        File::create(path)?.write_all(json.as_bytes())?;
        Ok(())
    }
}
