//! Pair of inverse closures supporting whole-node removal.
//!
//! # Edge Direction
//!
//! `depends` maps a node to the nodes it requires first (its ancestors);
//! `spent_by` maps a node to the nodes that require it (its descendants).
//! The two relations are exact inverses at every node, before and after
//! every removal.

#![allow(clippy::module_name_repetitions)]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::closure::TransitiveClosure;
use crate::error::GraphError;
use crate::set::MemberSet;

/// Dependency graph over identities of type `K` with per-node sets `S`.
#[derive(Debug, Clone)]
pub struct DynGraph<K, S> {
    depends: TransitiveClosure<K, S>,
    spent_by: TransitiveClosure<K, S>,
    check_removed: bool,
}

impl<K, S> DynGraph<K, S>
where
    K: Hash + Eq + Clone + fmt::Display,
    S: MemberSet<K>,
{
    /// Pair two closures that must already be inverses of each other.
    #[must_use]
    pub const fn new(depends: TransitiveClosure<K, S>, spent_by: TransitiveClosure<K, S>) -> Self {
        Self {
            depends,
            spent_by,
            check_removed: false,
        }
    }

    /// Verify after every removal that no trace of the removed node is left.
    ///
    /// This scans every entry of both closures and is meant for tests.
    pub fn set_check_removed(&mut self, enabled: bool) {
        self.check_removed = enabled;
    }

    #[must_use]
    pub const fn depends(&self) -> &TransitiveClosure<K, S> {
        &self.depends
    }

    #[must_use]
    pub const fn spent_by(&self) -> &TransitiveClosure<K, S> {
        &self.spent_by
    }

    /// All transitive ancestors of `k`, excluding `k`.
    pub fn ancestors<Q>(&self, k: &Q) -> Option<&S>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.depends.closure_of(k)
    }

    /// All transitive descendants of `k`, excluding `k`.
    pub fn descendants<Q>(&self, k: &Q) -> Option<&S>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.spent_by.closure_of(k)
    }

    /// Remove `k`, updating both closures.
    ///
    /// Removing `k` can only shrink the ancestor sets of its descendants and
    /// the descendant sets of its ancestors, so only those are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEntry`] if `k` is not in the graph.
    pub fn remove<Q>(&mut self, k: &Q) -> Result<(), GraphError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let missing = || GraphError::MissingEntry { id: k.to_string() };
        let ancestors: Vec<K> = self.ancestors(k).ok_or_else(missing)?.iter().cloned().collect();
        let descendants: Vec<K> =
            self.descendants(k).ok_or_else(missing)?.iter().cloned().collect();

        self.depends.remove(k, &descendants)?;
        self.spent_by.remove(k, &ancestors)?;

        if self.check_removed {
            self.depends.check_removed(k)?;
            self.spent_by.check_removed(k)?;
        }
        Ok(())
    }

    /// Remove every node of `ks` in iteration order.
    ///
    /// # Errors
    ///
    /// Fails on the first node that is not in the graph, which includes a
    /// node listed twice.
    pub fn remove_all<'a, I>(&mut self, ks: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        for k in ks {
            self.remove(k)?;
        }
        Ok(())
    }

    /// Nodes without remaining ancestors.
    #[must_use]
    pub fn roots(&self) -> Vec<K> {
        self.depends
            .relation()
            .iter()
            .filter(|(_, direct)| direct.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Every node in an order where each node follows all of its ancestors.
    ///
    /// Works layer by layer on a disposable copy: collect the current roots,
    /// sort them with `order` if given, emit them, remove them, repeat.
    ///
    /// # Errors
    ///
    /// Only fails if the graph is internally inconsistent.
    pub fn topological_order(
        &self,
        order: Option<&dyn Fn(&K, &K) -> Ordering>,
    ) -> Result<Vec<K>, GraphError> {
        let mut work = self.clone();
        work.check_removed = false;
        let mut seq = Vec::with_capacity(self.len());

        while !work.depends.relation().is_empty() {
            let mut roots = work.roots();
            if roots.is_empty() {
                // Acyclic graphs always have a root; be loud rather than spin.
                let stuck = work.depends.relation().keys().next().map(ToString::to_string);
                return Err(GraphError::Cycle {
                    id: stuck.unwrap_or_default(),
                });
            }
            if let Some(order) = order {
                roots.sort_by(|a, b| order(a, b));
            }
            work.remove_all(roots.iter())?;
            seq.extend(roots);
        }

        debug!(nodes = seq.len(), "topological order computed");
        Ok(seq)
    }

    /// Independent graph induced on `subset`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEntry`] if `subset` names a node that is
    /// not in the graph.
    pub fn subgraph(&self, subset: &HashSet<K>) -> Result<Self, GraphError> {
        Ok(Self {
            depends: self.depends.subset(subset)?,
            spent_by: self.spent_by.subset(subset)?,
            check_removed: self.check_removed,
        })
    }

    /// Every node currently in the graph.
    #[must_use]
    pub fn nodes(&self) -> HashSet<K> {
        self.depends.closure().keys().cloned().collect()
    }

    pub fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.depends.closure_of(k).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.depends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depends.is_empty()
    }
}

impl<K> DynGraph<K, HashSet<K>>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    /// Build a graph from `(node, depends, spent_by)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] for a cyclic input.
    pub fn from_links<I, D>(nodes: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (K, D, D)>,
        D: IntoIterator<Item = K>,
    {
        let mut depends = std::collections::HashMap::new();
        let mut spent_by = std::collections::HashMap::new();
        for (k, deps, children) in nodes {
            depends.insert(k.clone(), deps.into_iter().collect());
            spent_by.insert(k, children.into_iter().collect());
        }
        Ok(Self::new(
            TransitiveClosure::new(depends)?,
            TransitiveClosure::new(spent_by)?,
        ))
    }
}
