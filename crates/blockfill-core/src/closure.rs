//! Incrementally maintained transitive closure of a binary relation.
//!
//! # Overview
//!
//! [`TransitiveClosure`] keeps a direct relation `rel` (identity → directly
//! related identities) together with its closure (identity → every identity
//! reachable through `rel`, never including itself):
//!
//! ```text
//! rel:     { a: [b], b: [c] }
//! closure: { a: [b, c], b: [c], c: [] }    (c only if c has a rel entry)
//! ```
//!
//! ## Construction
//!
//! Closures are computed by a memoized depth-first traversal. The memo is
//! the closure map itself: once an identity's closure is written it is never
//! recomputed. The traversal uses an explicit stack with an in-progress set,
//! so long dependency chains cannot overflow the call stack and a cyclic
//! relation is reported as [`GraphError::Cycle`] instead of looping.
//!
//! ## Removal
//!
//! [`TransitiveClosure::remove`] deletes one identity. The caller passes the
//! identities whose closure may contain it (the closure of the *inverse*
//! relation at that identity). Only those closures are invalidated and
//! recomputed; everything else is left untouched.

#![allow(clippy::module_name_repetitions)]

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use tracing::trace;

use crate::error::GraphError;
use crate::set::MemberSet;

/// Direct relation: identity → directly related identities.
pub type RelationMap<K, S> = HashMap<K, S>;

/// A relation and its transitive closure, kept mutually consistent.
#[derive(Debug, Clone)]
pub struct TransitiveClosure<K, S> {
    rel: RelationMap<K, S>,
    closure: RelationMap<K, S>,
}

impl<K, S> TransitiveClosure<K, S>
where
    K: Hash + Eq + Clone + fmt::Display,
    S: MemberSet<K>,
{
    /// Build the closure of `rel`.
    ///
    /// Related identities without a `rel` entry of their own are treated as
    /// leaves: they appear in closures but get no closure entry.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] if `rel` is cyclic.
    pub fn new(rel: RelationMap<K, S>) -> Result<Self, GraphError> {
        let mut tc = Self {
            closure: HashMap::with_capacity(rel.len()),
            rel,
        };
        let keys: Vec<K> = tc.rel.keys().cloned().collect();
        for k in &keys {
            tc.traverse(k)?;
        }
        Ok(tc)
    }

    /// Compute and cache the closure of `start` and of everything it reaches.
    fn traverse(&mut self, start: &K) -> Result<(), GraphError> {
        if self.closure.contains_key(start) {
            return Ok(());
        }

        let mut in_progress: HashSet<K> = HashSet::new();
        let mut stack: Vec<(K, bool)> = vec![(start.clone(), false)];

        while let Some((k, expanded)) = stack.pop() {
            if expanded {
                let reach = {
                    let mut reach = S::default();
                    if let Some(direct) = self.rel.get(&k) {
                        for n in direct.iter() {
                            reach.insert(n.clone());
                            if let Some(nested) = self.closure.get(n) {
                                for m in nested.iter() {
                                    reach.insert(m.clone());
                                }
                            }
                        }
                    }
                    reach
                };
                in_progress.remove(&k);
                self.closure.insert(k, reach);
                continue;
            }

            if self.closure.contains_key(&k) {
                continue;
            }
            let Some(direct) = self.rel.get(&k) else {
                continue;
            };

            in_progress.insert(k.clone());
            stack.push((k.clone(), true));
            for n in direct.iter() {
                if self.closure.contains_key(n) {
                    continue;
                }
                if in_progress.contains(n) {
                    return Err(GraphError::Cycle { id: n.to_string() });
                }
                stack.push((n.clone(), false));
            }
        }

        Ok(())
    }

    /// Remove `k` from the relation and the closure.
    ///
    /// `inverse` must list every identity whose closure may contain `k`,
    /// i.e. the closure of the opposite relation at `k`. Their direct entries
    /// drop `k` and their closures are recomputed; no other closure changes.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEntry`] if an identity in `inverse` has
    /// no relation entry.
    pub fn remove<Q>(&mut self, k: &Q, inverse: &[K]) -> Result<(), GraphError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.rel.remove(k);
        self.closure.remove(k);

        for kk in inverse {
            let direct = self
                .rel
                .get_mut::<K>(kk)
                .ok_or_else(|| GraphError::MissingEntry { id: kk.to_string() })?;
            direct.remove(k);
            self.closure.remove::<K>(kk);
        }

        for kk in inverse {
            if self.rel.contains_key::<K>(kk) {
                self.traverse(kk)?;
            }
        }

        trace!(recomputed = inverse.len(), "closure entry removed");
        Ok(())
    }

    /// Independent closure of the relation induced on `subset`.
    ///
    /// Each member's direct entry is intersected with `subset` and the
    /// closure is rebuilt from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEntry`] if a member of `subset` has no
    /// relation entry.
    pub fn subset(&self, subset: &HashSet<K>) -> Result<Self, GraphError> {
        let mut rel = HashMap::with_capacity(subset.len());
        for t in subset {
            let direct = self
                .rel
                .get(t)
                .ok_or_else(|| GraphError::MissingEntry { id: t.to_string() })?;
            let restricted: S = direct
                .iter()
                .filter(|n| subset.contains(*n))
                .cloned()
                .collect();
            rel.insert(t.clone(), restricted);
        }
        Self::new(rel)
    }

    /// Confirm that `k` no longer appears anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Residual`] naming the first holder found.
    pub fn check_removed<Q>(&self, k: &Q) -> Result<(), GraphError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        for (label, map) in [("rel", &self.rel), ("closure", &self.closure)] {
            if map.contains_key(k) {
                return Err(GraphError::Residual {
                    id: k.to_string(),
                    holder: label.to_string(),
                });
            }
            if let Some((holder, _)) = map.iter().find(|(_, v)| v.contains(k)) {
                return Err(GraphError::Residual {
                    id: k.to_string(),
                    holder: format!("{label}[{holder}]"),
                });
            }
        }
        Ok(())
    }

    /// Direct relation entry of `k`.
    pub fn relation_of<Q>(&self, k: &Q) -> Option<&S>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.rel.get(k)
    }

    /// Closure entry of `k`.
    pub fn closure_of<Q>(&self, k: &Q) -> Option<&S>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.closure.get(k)
    }

    #[must_use]
    pub const fn relation(&self) -> &RelationMap<K, S> {
        &self.rel
    }

    #[must_use]
    pub const fn closure(&self) -> &RelationMap<K, S> {
        &self.closure
    }

    /// Number of identities with a closure entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closure.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closure.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tc = TransitiveClosure<String, HashSet<String>>;

    /// Parse `"a:b,c b:c c:"` into a relation map.
    fn rel(spec: &str) -> RelationMap<String, HashSet<String>> {
        spec.split_whitespace()
            .map(|entry| {
                let (k, v) = entry.split_once(':').unwrap_or((entry, ""));
                let related = v
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                (k.to_string(), related)
            })
            .collect()
    }

    fn sorted(tc: &Tc, k: &str) -> Vec<String> {
        let mut v: Vec<String> = tc
            .closure_of(k)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        v.sort();
        v
    }

    #[test]
    fn builds_chain_closure() {
        let tc = Tc::new(rel("a:b b:c c:d")).expect("acyclic");
        assert_eq!(sorted(&tc, "a"), ["b", "c", "d"]);
        assert_eq!(sorted(&tc, "b"), ["c", "d"]);
        assert_eq!(sorted(&tc, "c"), ["d"]);
        // `d` is a leaf without a relation entry of its own.
        assert!(tc.closure_of("d").is_none());
    }

    #[test]
    fn shortcut_edges_do_not_duplicate() {
        let tc =
            Tc::new(rel("a:b,d b:c c:d")).expect("acyclic");
        assert_eq!(sorted(&tc, "a"), ["b", "c", "d"]);
    }

    #[test]
    fn disjoint_components_stay_apart() {
        let tc = Tc::new(rel("a:b b: c:d,a")).expect("acyclic");
        assert_eq!(sorted(&tc, "a"), ["b"]);
        assert!(sorted(&tc, "b").is_empty());
        assert_eq!(sorted(&tc, "c"), ["a", "b", "d"]);
    }

    #[test]
    fn cycle_is_reported() {
        let err = Tc::new(rel("a:b b:c c:a")).expect_err("should fail");
        assert!(matches!(err, GraphError::Cycle { .. }));

        let err = Tc::new(rel("a:a")).expect_err("should fail");
        assert_eq!(err, GraphError::Cycle { id: "a".to_string() });
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let ids: Vec<String> = (0..2_000).map(|i| format!("n{i:04}")).collect();
        let rel: RelationMap<String, HashSet<String>> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let next: HashSet<String> = ids.get(i + 1).cloned().into_iter().collect();
                (id.clone(), next)
            })
            .collect();

        // Only count sizes at the ends; full closures are quadratic.
        let tc = Tc::new(rel).expect("acyclic");
        assert_eq!(tc.closure_of("n1998").map(HashSet::len), Some(1));
        assert_eq!(tc.closure_of("n0000").map(HashSet::len), Some(1_999));
    }

    #[test]
    fn remove_recomputes_only_inverse_neighbours() {
        // depends: b -> a, c -> b, d -> a
        let mut tc =
            Tc::new(rel("a: b:a c:b d:a")).expect("ok");
        let descendants_of_a = ["b", "c", "d"].map(String::from);
        tc.remove("a", &descendants_of_a).expect("remove");

        assert!(tc.closure_of("a").is_none());
        assert!(sorted(&tc, "b").is_empty());
        assert_eq!(sorted(&tc, "c"), ["b"]);
        assert!(sorted(&tc, "d").is_empty());
        tc.check_removed("a").expect("no residue");
    }

    #[test]
    fn remove_with_unknown_inverse_fails() {
        let mut tc = Tc::new(rel("a:")).expect("ok");
        let err = tc.remove("a", &["ghost".to_string()]).expect_err("should fail");
        assert_eq!(err, GraphError::MissingEntry { id: "ghost".to_string() });
    }

    #[test]
    fn subset_restricts_and_recomputes() {
        let tc = Tc::new(rel("a: b:a c:b")).expect("ok");
        let keep: HashSet<String> = ["a", "c"].into_iter().map(String::from).collect();
        let sub = tc.subset(&keep).expect("subset");

        assert_eq!(sub.len(), 2);
        assert!(sorted(&sub, "c").is_empty());
        // The source is unaffected.
        assert_eq!(sorted(&tc, "c"), ["a", "b"]);
    }

    #[test]
    fn clone_is_independent() {
        let tc = Tc::new(rel("a: b:a")).expect("ok");
        let mut copy = tc.clone();
        copy.remove("a", &["b".to_string()]).expect("remove");

        assert_eq!(sorted(&tc, "b"), ["a"]);
        assert!(sorted(&copy, "b").is_empty());
    }

    #[test]
    fn check_removed_finds_residue() {
        let tc = Tc::new(rel("a: b:a")).expect("ok");
        let err = tc.check_removed("a").expect_err("should fail");
        assert!(matches!(err, GraphError::Residual { .. }));
    }
}
