//! Implementations of placement strategies.

pub mod divisor_phased;
pub mod greedy;
pub mod throttled_greedy;
pub mod trivial;
