//! Progress reporting hooks.
//!
//! The harness never prints. Callers that want progress pass an
//! [`Observer`]; every method has an empty default.

/// Receives progress events from an evaluation run.
pub trait Observer {
    /// A pool is about to be evaluated.
    fn pool_started(&self, _name: &str, _index: usize, _total: usize) {}

    /// A pool was left out because it is not heavier than the threshold.
    fn pool_skipped(&self, _name: &str, _agg_weight: u64, _min_size: u64) {}

    /// One weight limit of a sweep has been collected.
    fn limit_done(&self, _limit: u64, _index: usize, _total: usize) {}

    /// The graph emptied before the sweep reached its last limit.
    fn exhausted(&self, _at_limit: u64) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}
