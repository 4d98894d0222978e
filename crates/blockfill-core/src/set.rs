//! Set types stored in relations and closures.
//!
//! [`MemberSet`] is the seam between the closure engine and the set it
//! stores per identity. Two implementations exist: plain [`HashSet`] for
//! generic identities, and [`SizedSet`], which additionally keeps running
//! fee and weight totals of its members.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use crate::tx::SizedItem;

/// Minimal mutable set surface needed by [`crate::closure::TransitiveClosure`].
pub trait MemberSet<K>: Clone + Default + FromIterator<K> {
    /// Insert `k`; returns `true` if the set changed.
    fn insert(&mut self, k: K) -> bool;

    /// Remove `k`; returns `true` if it was present.
    fn remove<Q>(&mut self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a;

    /// Keep only the members for which `keep` returns `true`.
    fn retain(&mut self, keep: impl FnMut(&K) -> bool);
}

impl<K: Hash + Eq + Clone> MemberSet<K> for HashSet<K> {
    fn insert(&mut self, k: K) -> bool {
        Self::insert(self, k)
    }

    fn remove<Q>(&mut self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self::remove(self, k)
    }

    fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self::contains(self, k)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
    {
        Self::iter(self)
    }

    fn retain(&mut self, keep: impl FnMut(&K) -> bool) {
        Self::retain(self, keep);
    }
}

/// A set that tracks the summed fee and weight of its members.
///
/// The totals always equal the sums over exactly the members currently
/// present: inserting a member twice counts it once, and removing an
/// absent member changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedSet<K: Hash + Eq> {
    set: HashSet<K>,
    agg_fee: i64,
    agg_weight: u64,
}

impl<K: Hash + Eq> Default for SizedSet<K> {
    fn default() -> Self {
        Self {
            set: HashSet::new(),
            agg_fee: 0,
            agg_weight: 0,
        }
    }
}

impl<K: SizedItem + Hash + Eq + Clone> SizedSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `k`, adding its fee and weight if it was absent.
    pub fn add(&mut self, k: K) -> bool {
        let (fee, weight) = (k.fee(), k.weight());
        if self.set.insert(k) {
            self.agg_fee += fee;
            self.agg_weight += weight;
            true
        } else {
            false
        }
    }

    /// Remove `k`, subtracting its fee and weight if it was present.
    pub fn delete<Q>(&mut self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.set.take(k) {
            Some(removed) => {
                self.agg_fee -= removed.fee();
                self.agg_weight -= removed.weight();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn agg_fee(&self) -> i64 {
        self.agg_fee
    }

    #[must_use]
    pub const fn agg_weight(&self) -> u64 {
        self.agg_weight
    }

    /// `agg_fee / agg_weight` as a float, for reporting.
    ///
    /// NaN for an empty set. Ordering decisions use [`cmp_fee_rate`] instead.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn agg_fee_rate(&self) -> f64 {
        self.agg_fee as f64 / self.agg_weight as f64
    }

    /// Plain view of the members.
    #[must_use]
    pub const fn as_set(&self) -> &HashSet<K> {
        &self.set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.set.iter()
    }

    #[must_use]
    pub fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.set.contains(k)
    }
}

impl<K: SizedItem + Hash + Eq + Clone> FromIterator<K> for SizedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        for k in iter {
            set.add(k);
        }
        set
    }
}

impl<K: SizedItem + Hash + Eq + Clone> Extend<K> for SizedSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.add(k);
        }
    }
}

impl<K: SizedItem + Hash + Eq + Clone> MemberSet<K> for SizedSet<K> {
    fn insert(&mut self, k: K) -> bool {
        self.add(k)
    }

    fn remove<Q>(&mut self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.delete(k)
    }

    fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.set.contains(k)
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
    {
        self.set.iter()
    }

    fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        let (mut fee, mut weight) = (0_i64, 0_u64);
        self.set.retain(|k| {
            let kept = keep(k);
            if !kept {
                fee += k.fee();
                weight += k.weight();
            }
            kept
        });
        self.agg_fee -= fee;
        self.agg_weight -= weight;
    }
}

/// Compare two fee rates `fee_a / weight_a` and `fee_b / weight_b` exactly.
///
/// Cross-multiplies in `i128`, so no precision is lost for any `i64` fee
/// and `u64` weight. Two zero weights compare equal.
#[must_use]
pub fn cmp_fee_rate(fee_a: i64, weight_a: u64, fee_b: i64, weight_b: u64) -> Ordering {
    let lhs = i128::from(fee_a) * i128::from(weight_b);
    let rhs = i128::from(fee_b) * i128::from(weight_a);
    lhs.cmp(&rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Tx, TxRef};

    fn tx(id: &str, fee: i64, weight: u64) -> TxRef {
        TxRef::new(Tx::new(id, fee, weight))
    }

    #[test]
    fn add_tracks_totals_once() {
        let mut set = SizedSet::new();
        assert!(set.add(tx("a", 10, 4)));
        assert!(set.add(tx("b", 6, 2)));
        assert!(!set.add(tx("a", 10, 4)));

        assert_eq!(set.agg_fee(), 16);
        assert_eq!(set.agg_weight(), 6);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn delete_absent_member_is_noop() {
        let mut set: SizedSet<TxRef> = [tx("a", 10, 4)].into_iter().collect();
        assert!(!set.delete("missing"));
        assert_eq!(set.agg_fee(), 10);

        assert!(set.delete("a"));
        assert_eq!(set.agg_fee(), 0);
        assert_eq!(set.agg_weight(), 0);
        assert!(set.agg_fee_rate().is_nan());
    }

    #[test]
    fn retain_subtracts_dropped_members() {
        let mut set: SizedSet<TxRef> =
            [tx("a", 1, 1), tx("b", 2, 2), tx("c", 3, 3)].into_iter().collect();
        MemberSet::retain(&mut set, |t| t.id() != "b");

        assert_eq!(set.agg_fee(), 4);
        assert_eq!(set.agg_weight(), 4);
        assert!(!set.contains("b"));
    }

    fn member_ids<S: MemberSet<TxRef>>(set: &S) -> Vec<String> {
        let mut ids: Vec<String> = set.iter().map(|t| t.id().to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn both_member_sets_iterate_every_member() {
        let sized: SizedSet<TxRef> = [tx("b", 1, 1), tx("a", 2, 2)].into_iter().collect();
        let plain: HashSet<TxRef> = [tx("b", 1, 1), tx("a", 2, 2)].into_iter().collect();

        assert_eq!(member_ids(&sized), ["a", "b"]);
        assert_eq!(member_ids(&plain), ["a", "b"]);
    }

    #[test]
    fn clone_copies_membership_and_totals() {
        let original: SizedSet<TxRef> = [tx("a", 3, 1)].into_iter().collect();
        let mut copy = original.clone();
        copy.add(tx("b", 5, 5));

        assert_eq!(original.agg_fee(), 3);
        assert_eq!(copy.agg_fee(), 8);
    }

    #[test]
    fn fee_rate_comparison_is_exact() {
        // 1/3 vs 333_333_333/1_000_000_000: floats would round these together.
        assert_eq!(cmp_fee_rate(1, 3, 333_333_333, 1_000_000_000), Ordering::Greater);
        assert_eq!(cmp_fee_rate(2, 4, 1, 2), Ordering::Equal);
        assert_eq!(cmp_fee_rate(0, 0, 0, 0), Ordering::Equal);
    }
}
