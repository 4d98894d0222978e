//! Ancestor-set selection engine.
//!
//! # Overview
//!
//! [`AncestorSetBuilder`] keeps every transaction of a [`TxGraph`] in an
//! [`IndexedHeap`] ordered by a [`ChainCompare`] over the transaction's
//! *current* ancestor set (the transaction plus everything it transitively
//! depends on). The ancestor set is read from the live graph on every
//! comparison; nothing is cached in the heap.
//!
//! ```text
//! peek  ──► best ancestor set (no mutation)
//! pop   ──► peek + remove_ancestor_set
//! remove_ancestor_set(S):
//!     affected = ⋃ descendants(m) for m in S, minus S
//!     heap  -= S ∪ affected        (graph still intact: old priorities)
//!     graph -= S
//!     heap  += affected            (new priorities)
//! ```
//!
//! After every public operation each transaction in the graph is in the heap
//! exactly once and vice versa.
//!
//! # Skipping
//!
//! [`AncestorSetBuilder::ordered_ancestor_sets`] discards candidates that do
//! not fit, up to a bound on consecutive misses. A discarded candidate is
//! gone from this builder for good, even if a later call asks for more
//! weight. Callers that raise the limit step by step should run a strict
//! pass (`max_failures = 0`) on the live builder and explore further on a
//! clone; [`crate::collect::BlockCollector`] does exactly that.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::iter::FusedIterator;

use tracing::{debug, instrument, trace};

use crate::compare::{Candidate, ChainCompare};
use crate::error::{BuilderError, GraphError};
use crate::graph::TxGraph;
use crate::heap::IndexedHeap;
use crate::set::SizedSet;
use crate::tx::TxRef;

/// Default bound on consecutive non-fitting candidates before giving up.
pub const MAX_CONSECUTIVE_FAILURES: usize = 1000;

/// Consensus block weight limit minus the coinbase reserve.
pub const CONSENSUS_WEIGHT_LIMIT: u64 = 3_992_820;

/// A representative transaction together with all of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorSet {
    pub tx: TxRef,
    /// `tx` and every transaction it transitively depends on.
    pub with_ancestors: SizedSet<TxRef>,
}

impl AncestorSet {
    #[must_use]
    pub const fn agg_fee(&self) -> i64 {
        self.with_ancestors.agg_fee()
    }

    #[must_use]
    pub const fn agg_weight(&self) -> u64 {
        self.with_ancestors.agg_weight()
    }

    #[must_use]
    pub fn agg_fee_rate(&self) -> f64 {
        self.with_ancestors.agg_fee_rate()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.with_ancestors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with_ancestors.is_empty()
    }

    /// Member identities in byte-wise order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.with_ancestors.iter().map(TxRef::id).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn candidate(&self) -> Candidate<'_> {
        Candidate {
            rep: self.tx.id(),
            agg_fee: self.agg_fee(),
            agg_weight: self.agg_weight(),
        }
    }
}

/// Candidate view of `tx` against the live graph.
///
/// # Panics
///
/// Panics if `tx` has no ancestor entry in `graph`. Heap members are always
/// graph members, so this only fires on a maintenance bug.
fn candidate<'a>(graph: &'a TxGraph, tx: &'a TxRef) -> Candidate<'a> {
    let Some(ancestors) = graph.ancestors(tx) else {
        panic!("heap member {tx} has no ancestor entry in the graph");
    };
    Candidate {
        rep: tx.id(),
        agg_fee: ancestors.agg_fee() + tx.fee,
        agg_weight: ancestors.agg_weight() + tx.weight,
    }
}

fn heap_order<'g>(
    graph: &'g TxGraph,
    compare: &'g ChainCompare,
) -> impl Fn(&TxRef, &TxRef) -> Ordering + 'g {
    move |a, b| compare.apply(&candidate(graph, a), &candidate(graph, b))
}

/// Greedy ancestor-set selection over a transaction graph.
///
/// Cloning is deep for the graph and the heap array and shallow for the
/// transactions themselves, so a clone can be explored and dropped without
/// affecting the original.
#[derive(Debug, Clone)]
pub struct AncestorSetBuilder {
    graph: TxGraph,
    compare: ChainCompare,
    heap: IndexedHeap<TxRef>,
}

impl AncestorSetBuilder {
    /// Take ownership of `graph` and order all of its transactions.
    #[must_use]
    #[instrument(skip_all, fields(txs = graph.len(), compare = %compare))]
    pub fn new(graph: TxGraph, compare: ChainCompare) -> Self {
        let heap = IndexedHeap::from_items(graph.nodes(), &heap_order(&graph, &compare));
        debug!(heap = heap.len(), "builder ready");
        Self {
            graph,
            compare,
            heap,
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &TxGraph {
        &self.graph
    }

    #[must_use]
    pub const fn compare(&self) -> &ChainCompare {
        &self.compare
    }

    /// Number of transactions left to select.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The best ancestor set, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEntry`] if the top of the heap is not in
    /// the graph.
    pub fn peek_ancestor_set(&self) -> Result<Option<AncestorSet>, BuilderError> {
        let Some(tx) = self.heap.peek() else {
            return Ok(None);
        };
        let ancestors = self
            .graph
            .ancestors(tx)
            .ok_or_else(|| GraphError::MissingEntry { id: tx.to_string() })?;
        let mut with_ancestors = ancestors.clone();
        with_ancestors.add(tx.clone());
        Ok(Some(AncestorSet {
            tx: tx.clone(),
            with_ancestors,
        }))
    }

    /// Take the best ancestor set out of the builder.
    ///
    /// # Errors
    ///
    /// Same as [`AncestorSetBuilder::remove_ancestor_set`].
    pub fn pop_ancestor_set(&mut self) -> Result<Option<AncestorSet>, BuilderError> {
        let Some(set) = self.peek_ancestor_set()? else {
            return Ok(None);
        };
        self.remove_ancestor_set(&set)?;
        Ok(Some(set))
    }

    /// Remove every member of `set` and reorder the descendants it leaves
    /// behind.
    ///
    /// Membership is checked before anything is mutated, so a failed call
    /// leaves the builder unchanged.
    ///
    /// # Errors
    ///
    /// - [`GraphError::MissingEntry`] if a member is not in the graph.
    /// - [`BuilderError::HeapDesync`] if a member or affected descendant is
    ///   not in the heap.
    pub fn remove_ancestor_set(&mut self, set: &AncestorSet) -> Result<(), BuilderError> {
        let Self {
            graph,
            compare,
            heap,
        } = self;
        let removed = set.with_ancestors.as_set();

        let mut affected: HashSet<TxRef> = HashSet::new();
        for m in removed {
            let descendants = graph
                .descendants(m)
                .ok_or_else(|| GraphError::MissingEntry { id: m.to_string() })?;
            affected.extend(descendants.iter().filter(|d| !removed.contains(*d)).cloned());
        }

        if let Some(stray) = removed.iter().chain(&affected).find(|k| !heap.contains(*k)) {
            return Err(BuilderError::HeapDesync {
                id: stray.to_string(),
            });
        }

        {
            let order = heap_order(graph, compare);
            for k in removed.iter().chain(&affected) {
                heap.remove(k, &order);
            }
        }

        graph.remove_all(removed)?;

        let order = heap_order(graph, compare);
        let reordered = affected.len();
        for k in affected {
            heap.push(k, &order);
        }

        trace!(
            rep = %set.tx,
            removed = removed.len(),
            reordered,
            "ancestor set removed"
        );
        Ok(())
    }

    /// Lazily yield ancestor sets in priority order while they fit.
    ///
    /// A set that would push the running weight past `max_weight` counts as a
    /// failure. Once more than `max_failures` failures occur in a row the
    /// iterator stops and leaves that set in the builder; below the bound the
    /// set is discarded (removed without being yielded) and the search goes
    /// on. With `max_failures = 0` the first misfit ends the sequence and the
    /// builder is exactly as it was before that set was peeked.
    ///
    /// The iterator stops for good after yielding an error.
    pub fn ordered_ancestor_sets(
        &mut self,
        max_weight: u64,
        max_failures: usize,
    ) -> OrderedAncestorSets<'_> {
        OrderedAncestorSets {
            builder: self,
            max_weight,
            max_failures,
            agg_weight: 0,
            failures: 0,
            discarded: 0,
            done: false,
        }
    }

    /// Confirm that the heap and the graph hold the same transactions.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::HeapDesync`] naming a transaction present on
    /// one side only.
    pub fn check_sync(&self) -> Result<(), BuilderError> {
        let nodes = self.graph.nodes();
        if let Some(stray) = self.heap.iter().find(|k| !nodes.contains(*k)) {
            return Err(BuilderError::HeapDesync {
                id: stray.to_string(),
            });
        }
        if let Some(stray) = nodes.iter().find(|k| !self.heap.contains(*k)) {
            return Err(BuilderError::HeapDesync {
                id: stray.to_string(),
            });
        }
        if self.heap.len() != nodes.len() {
            return Err(BuilderError::HeapDesync {
                id: String::from("<duplicate>"),
            });
        }
        Ok(())
    }
}

/// Iterator returned by [`AncestorSetBuilder::ordered_ancestor_sets`].
#[derive(Debug)]
pub struct OrderedAncestorSets<'b> {
    builder: &'b mut AncestorSetBuilder,
    max_weight: u64,
    max_failures: usize,
    agg_weight: u64,
    failures: usize,
    discarded: usize,
    done: bool,
}

impl OrderedAncestorSets<'_> {
    /// Weight of everything yielded so far.
    #[must_use]
    pub const fn agg_weight(&self) -> u64 {
        self.agg_weight
    }

    /// Sets removed without being yielded.
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }

    fn fail(&mut self, err: BuilderError) -> Option<Result<AncestorSet, BuilderError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for OrderedAncestorSets<'_> {
    type Item = Result<AncestorSet, BuilderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let set = match self.builder.peek_ancestor_set() {
                Ok(Some(set)) => set,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(err) => return self.fail(err),
            };

            if self.agg_weight.saturating_add(set.agg_weight()) > self.max_weight {
                self.failures += 1;
                if self.failures > self.max_failures {
                    debug!(
                        rep = %set.tx,
                        agg_weight = self.agg_weight,
                        discarded = self.discarded,
                        "stopping at candidate that does not fit"
                    );
                    self.done = true;
                    return None;
                }
                if let Err(err) = self.builder.remove_ancestor_set(&set) {
                    return self.fail(err);
                }
                self.discarded += 1;
                continue;
            }

            if let Err(err) = self.builder.remove_ancestor_set(&set) {
                return self.fail(err);
            }
            self.agg_weight += set.agg_weight();
            self.failures = 0;
            return Some(Ok(set));
        }
    }
}

impl FusedIterator for OrderedAncestorSets<'_> {}
