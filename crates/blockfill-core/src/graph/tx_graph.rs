//! Weighted transaction graph built from a pool snapshot.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::DynGraph;
use crate::closure::TransitiveClosure;
use crate::error::GraphError;
use crate::set::SizedSet;
use crate::tx::{Pool, Tx, TxRef};

/// Dependency graph whose per-node sets carry fee and weight totals.
///
/// `ancestors(tx)` is therefore already an aggregate: its fee and weight
/// are those of every transaction `tx` transitively depends on.
pub type TxGraph = DynGraph<TxRef, SizedSet<TxRef>>;

impl TxGraph {
    /// Build the graph for a pool keyed by transaction id.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownDependency`] if a `depends` or `spent_by` entry
    ///   names a transaction that is not in the pool.
    /// - [`GraphError::AsymmetricLink`] if a parent/child pair is listed on
    ///   one side only.
    /// - [`GraphError::ZeroWeight`] if a transaction has no weight.
    /// - [`GraphError::Cycle`] if the dependencies are cyclic.
    pub fn from_pool(pool: &Pool) -> Result<Self, GraphError> {
        Self::from_txs(pool.values().cloned())
    }

    /// Build the graph from an iterator of transactions.
    ///
    /// # Errors
    ///
    /// Same as [`TxGraph::from_pool`], plus [`GraphError::DuplicateTx`] if
    /// two transactions share an id.
    #[instrument(skip(txs))]
    pub fn from_txs<I>(txs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Tx>,
    {
        let mut refs: HashMap<String, TxRef> = HashMap::new();
        for tx in txs {
            if tx.weight == 0 {
                return Err(GraphError::ZeroWeight { id: tx.id });
            }
            if refs.contains_key(&tx.id) {
                return Err(GraphError::DuplicateTx { id: tx.id });
            }
            refs.insert(tx.id.clone(), TxRef::new(tx));
        }

        check_links(&refs)?;

        let lookup = |owner: &TxRef, ids: &[String]| -> Result<SizedSet<TxRef>, GraphError> {
            ids.iter()
                .map(|id| {
                    refs.get(id).cloned().ok_or_else(|| GraphError::UnknownDependency {
                        tx: owner.id().to_string(),
                        missing: id.clone(),
                    })
                })
                .collect()
        };

        let mut depends = HashMap::with_capacity(refs.len());
        let mut spent_by = HashMap::with_capacity(refs.len());
        for tx in refs.values() {
            depends.insert(tx.clone(), lookup(tx, &tx.depends)?);
            spent_by.insert(tx.clone(), lookup(tx, &tx.spent_by)?);
        }

        let graph = Self::new(
            TransitiveClosure::new(depends)?,
            TransitiveClosure::new(spent_by)?,
        );
        debug!(txs = graph.len(), "transaction graph built");
        Ok(graph)
    }

    /// The shared handle for `id`, if it is still in the graph.
    #[must_use]
    pub fn tx(&self, id: &str) -> Option<&TxRef> {
        self.depends()
            .closure()
            .get_key_value(id)
            .map(|(k, _)| k)
    }

    /// Summed weight of every transaction in the graph.
    #[must_use]
    pub fn agg_weight(&self) -> u64 {
        self.depends().closure().keys().map(|tx| tx.weight).sum()
    }
}

/// Every `depends` edge must be mirrored by a `spent_by` edge and vice versa.
fn check_links(refs: &HashMap<String, TxRef>) -> Result<(), GraphError> {
    for tx in refs.values() {
        for parent_id in &tx.depends {
            let parent = refs.get(parent_id).ok_or_else(|| GraphError::UnknownDependency {
                tx: tx.id.clone(),
                missing: parent_id.clone(),
            })?;
            if !parent.spent_by.contains(&tx.id) {
                return Err(GraphError::AsymmetricLink {
                    parent: parent_id.clone(),
                    child: tx.id.clone(),
                });
            }
        }
        for child_id in &tx.spent_by {
            let child = refs.get(child_id).ok_or_else(|| GraphError::UnknownDependency {
                tx: tx.id.clone(),
                missing: child_id.clone(),
            })?;
            if !child.depends.contains(&tx.id) {
                return Err(GraphError::AsymmetricLink {
                    parent: tx.id.clone(),
                    child: child_id.clone(),
                });
            }
        }
    }
    Ok(())
}
