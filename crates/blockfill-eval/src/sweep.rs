//! Running one comparator over a sequence of weight limits.

use anyhow::{Context, Result};
use blockfill_core::{AncestorSetBuilder, BlockCollector, ChainCompare, Dim, Pool, TxGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::observer::Observer;

/// Evenly spaced weight limits `start, start + step, ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sweep {
    pub start: u64,
    pub step: u64,
    pub count: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            start: 3_000_000,
            step: 10_000,
            count: 200,
        }
    }
}

impl Sweep {
    #[must_use]
    pub fn limits(&self) -> Vec<u64> {
        (0..self.count as u64)
            .map(|i| self.start + i * self.step)
            .collect()
    }

    /// The largest limit, or `start` for an empty sweep.
    #[must_use]
    pub fn last(&self) -> u64 {
        self.limits().last().copied().unwrap_or(self.start)
    }
}

/// Block dimensions found for each evaluated limit.
///
/// `limits` and `results` have equal length. The sweep stops early once the
/// pool is used up, so both can be shorter than the requested limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    pub limits: Vec<u64>,
    pub results: Vec<Dim>,
}

/// Collect a block for every limit in order from one builder.
///
/// Limits must not decrease. Stops before the first limit at which the
/// builder has nothing left.
///
/// # Errors
///
/// Fails if the pool does not form a valid graph or a limit is lower than
/// the weight already admitted.
#[instrument(skip(pool, observer), fields(txs = pool.len(), compare = %compare))]
pub fn blocks_for_limits(
    pool: &Pool,
    compare: &ChainCompare,
    limits: &[u64],
    max_failures: usize,
    observer: &dyn Observer,
) -> Result<EvalResult> {
    let graph = TxGraph::from_pool(pool).context("building transaction graph")?;
    let builder = AncestorSetBuilder::new(graph, compare.clone());
    let mut collector = BlockCollector::with_max_failures(builder, max_failures);

    let mut out = EvalResult::default();
    for (i, &limit) in limits.iter().enumerate() {
        if collector.builder().is_empty() {
            debug!(limit, "pool exhausted");
            observer.exhausted(limit);
            break;
        }
        let dim = collector
            .collect(limit)
            .with_context(|| format!("collecting block at weight limit {limit}"))?;
        out.limits.push(limit);
        out.results.push(dim);
        observer.limit_done(limit, i, limits.len());
    }
    Ok(out)
}

/// [`blocks_for_limits`] over a [`Sweep`].
///
/// # Errors
///
/// Same as [`blocks_for_limits`].
pub fn evaluate(
    pool: &Pool,
    compare: &ChainCompare,
    sweep: &Sweep,
    max_failures: usize,
    observer: &dyn Observer,
) -> Result<EvalResult> {
    blocks_for_limits(pool, compare, &sweep.limits(), max_failures, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use blockfill_core::{MAX_CONSECUTIVE_FAILURES, Tx};
    use std::cell::RefCell;

    fn pool() -> Pool {
        [
            Tx::new("a", 30, 10).with_spent_by(["b"]),
            Tx::new("b", 50, 10).with_depends(["a"]),
            Tx::new("c", 10, 10),
            Tx::new("d", 35, 10),
        ]
        .into_iter()
        .map(|tx| (tx.id.clone(), tx))
        .collect()
    }

    #[derive(Default)]
    struct Recorder {
        limits: RefCell<Vec<u64>>,
        exhausted: RefCell<Option<u64>>,
    }

    impl Observer for Recorder {
        fn limit_done(&self, limit: u64, _index: usize, _total: usize) {
            self.limits.borrow_mut().push(limit);
        }

        fn exhausted(&self, at_limit: u64) {
            *self.exhausted.borrow_mut() = Some(at_limit);
        }
    }

    #[test]
    fn sweep_limits_are_evenly_spaced() {
        let sweep = Sweep::default();
        let limits = sweep.limits();
        assert_eq!(limits.len(), 200);
        assert_eq!(limits[0], 3_000_000);
        assert_eq!(limits[199], 4_990_000);
        assert_eq!(sweep.last(), 4_990_000);
    }

    #[test]
    fn stops_once_the_pool_is_used_up() {
        let recorder = Recorder::default();
        let result = blocks_for_limits(
            &pool(),
            &ChainCompare::fee_rate_and_fee(),
            &[10, 20, 30, 40, 50, 60],
            MAX_CONSECUTIVE_FAILURES,
            &recorder,
        )
        .expect("evaluate");

        assert_eq!(result.limits, [10, 20, 30, 40]);
        assert_eq!(result.results.last(), Some(&Dim::new(125, 40)));
        assert_eq!(*recorder.limits.borrow(), [10, 20, 30, 40]);
        assert_eq!(*recorder.exhausted.borrow(), Some(50));
    }

    #[test]
    fn decreasing_limits_are_rejected() {
        let err = blocks_for_limits(
            &pool(),
            &ChainCompare::fee_rate(),
            &[30, 20],
            MAX_CONSECUTIVE_FAILURES,
            &NoopObserver,
        )
        .expect_err("should fail");
        assert!(format!("{err:#}").contains("weight limit 20"));
    }
}
