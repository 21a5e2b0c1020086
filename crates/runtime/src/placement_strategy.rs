//! Trait for a placement strategy.

use crate::{cache::CachePool, endpoint::Endpoint};

/// Decides which pending requests of an endpoint go to which caches.
///
/// [Runner](crate::runner::Runner) calls [PlacementStrategy::execute] once per endpoint
/// on every pass, endpoints in increasing id order. Running out of space or requests
/// is a normal outcome and leaves the endpoint as is for this pass.
pub trait PlacementStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> String;

    /// Makes placement decisions for `endpoint` on pass `pass`.
    /// * `caches` --- all caches of the system, changes are visible to other endpoints.
    fn execute(&mut self, endpoint: &mut Endpoint, caches: &mut CachePool, pass: usize);
}
