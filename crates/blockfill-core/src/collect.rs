//! Block collection at a rising sequence of weight limits.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::{AncestorSet, AncestorSetBuilder, MAX_CONSECUTIVE_FAILURES};
use crate::error::{BuilderError, CollectError};

/// Fee and weight of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dim {
    pub fee: i64,
    pub weight: u64,
}

impl Dim {
    #[must_use]
    pub const fn new(fee: i64, weight: u64) -> Self {
        Self { fee, weight }
    }

    #[must_use]
    pub const fn of(set: &AncestorSet) -> Self {
        Self::new(set.agg_fee(), set.agg_weight())
    }
}

impl Add for Dim {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.fee + rhs.fee, self.weight + rhs.weight)
    }
}

impl AddAssign for Dim {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Sum the dimensions of every set an ordering yields.
///
/// # Errors
///
/// Returns the first error the ordering yields.
pub fn sum_dims<I>(sets: I) -> Result<Dim, BuilderError>
where
    I: IntoIterator<Item = Result<AncestorSet, BuilderError>>,
{
    sets.into_iter()
        .try_fold(Dim::default(), |acc, set| Ok(acc + Dim::of(&set?)))
}

/// Collects block dimensions for non-decreasing weight limits from one
/// builder.
///
/// Each [`BlockCollector::collect`] call first admits, on the live builder,
/// every set that fits without discarding anything (`max_failures = 0`).
/// That part is kept and counts towards the next limit. It then explores a
/// clone with the lenient failure bound; the extra weight found there is
/// reported but not kept, because the lenient pass throws candidates away
/// that a larger limit might still admit.
#[derive(Debug, Clone)]
pub struct BlockCollector {
    builder: AncestorSetBuilder,
    consumed: Dim,
    max_failures: usize,
}

impl BlockCollector {
    #[must_use]
    pub const fn new(builder: AncestorSetBuilder) -> Self {
        Self::with_max_failures(builder, MAX_CONSECUTIVE_FAILURES)
    }

    #[must_use]
    pub const fn with_max_failures(builder: AncestorSetBuilder, max_failures: usize) -> Self {
        Self {
            builder,
            consumed: Dim::new(0, 0),
            max_failures,
        }
    }

    #[must_use]
    pub const fn builder(&self) -> &AncestorSetBuilder {
        &self.builder
    }

    /// Fee and weight admitted by strict passes so far.
    #[must_use]
    pub const fn consumed(&self) -> Dim {
        self.consumed
    }

    /// Dimension of the best block found for `limit`.
    ///
    /// # Errors
    ///
    /// - [`CollectError::LimitDecreased`] if `limit` is below the consumed
    ///   weight. Nothing is touched in that case.
    /// - [`CollectError::Builder`] if either pass hits a broken invariant.
    pub fn collect(&mut self, limit: u64) -> Result<Dim, CollectError> {
        let remaining = self.remaining(limit)?;
        let strict = sum_dims(self.builder.ordered_ancestor_sets(remaining, 0))?;
        self.consumed += strict;

        let remaining = self.remaining(limit)?;
        let mut probe = self.builder.clone();
        let extra = sum_dims(probe.ordered_ancestor_sets(remaining, self.max_failures))?;

        debug!(
            limit,
            strict_weight = strict.weight,
            extra_weight = extra.weight,
            left = self.builder.len(),
            "block collected"
        );
        Ok(self.consumed + extra)
    }

    fn remaining(&self, limit: u64) -> Result<u64, CollectError> {
        limit
            .checked_sub(self.consumed.weight)
            .ok_or(CollectError::LimitDecreased {
                limit,
                consumed: self.consumed.weight,
            })
    }
}
