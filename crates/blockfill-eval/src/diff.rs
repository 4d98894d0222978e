//! Per-limit differences between two evaluations of the same pool.

use blockfill_core::Dim;
use serde::{Deserialize, Serialize};

use crate::sweep::EvalResult;

/// One limit at which the two comparators collected different fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDiff {
    pub limit: u64,
    /// Weight left unused under the limit by each side.
    pub remaining: (u64, u64),
    /// Left fee minus right fee.
    pub fee_diff: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalDiff {
    pub diff: Vec<LimitDiff>,
    /// Mean fee difference over every compared limit, equal ones included.
    pub avg_diff: f64,
    /// Number of limits compared.
    pub compared: usize,
}

/// Compare two evaluations limit by limit.
///
/// Only limits evaluated on both sides are compared; when one sweep stopped
/// early the extra entries of the other are ignored. Limits must line up
/// position by position, which holds for two runs over the same sweep.
#[must_use]
pub fn diff(left: &EvalResult, right: &EvalResult) -> EvalDiff {
    let mut out = EvalDiff::default();
    let mut total: i64 = 0;

    let pairs = left
        .limits
        .iter()
        .zip(&left.results)
        .zip(right.limits.iter().zip(&right.results));
    for ((&limit, a), (&limit_b, b)) in pairs {
        debug_assert_eq!(limit, limit_b, "sweeps are misaligned");
        out.compared += 1;
        let fee_diff = a.fee - b.fee;
        total += fee_diff;
        if fee_diff != 0 {
            out.diff.push(LimitDiff {
                limit,
                remaining: (unused(limit, *a), unused(limit, *b)),
                fee_diff,
            });
        }
    }

    if out.compared > 0 {
        #[allow(clippy::cast_precision_loss)]
        let avg = total as f64 / out.compared as f64;
        out.avg_diff = avg;
    }
    out
}

const fn unused(limit: u64, dim: Dim) -> u64 {
    limit.saturating_sub(dim.weight)
}
