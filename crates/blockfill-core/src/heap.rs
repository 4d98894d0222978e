//! Indexed binary heap with removal of arbitrary members.
//!
//! The heap never stores priorities. Every operation that reorders takes the
//! comparison function, so an element's priority is whatever that function
//! says at the time of the call. The caller must not let an element's
//! priority change while it is inside the heap; to reprioritize, remove it,
//! change the underlying state, and push it again.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Min-heap under a caller-supplied order: the top sorts first.
#[derive(Debug, Clone)]
pub struct IndexedHeap<K> {
    items: Vec<K>,
    pos: HashMap<K, usize>,
}

impl<K> Default for IndexedHeap<K> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pos: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> IndexedHeap<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Heapify `items` in linear time. Duplicates are dropped.
    #[must_use]
    pub fn from_items<I, F>(items: I, cmp: &F) -> Self
    where
        I: IntoIterator<Item = K>,
        F: Fn(&K, &K) -> Ordering,
    {
        let mut heap = Self::default();
        for k in items {
            if heap.pos.contains_key(&k) {
                continue;
            }
            heap.pos.insert(k.clone(), heap.items.len());
            heap.items.push(k);
        }
        for i in (0..heap.items.len() / 2).rev() {
            heap.sift_down(i, cmp);
        }
        heap
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.pos.contains_key(k)
    }

    /// Members in internal array order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.items.iter()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&K> {
        self.items.first()
    }

    /// Insert `k`; returns `false` and leaves the heap alone if present.
    pub fn push<F>(&mut self, k: K, cmp: &F) -> bool
    where
        F: Fn(&K, &K) -> Ordering,
    {
        if self.pos.contains_key(&k) {
            return false;
        }
        let i = self.items.len();
        self.pos.insert(k.clone(), i);
        self.items.push(k);
        self.sift_up(i, cmp);
        true
    }

    pub fn pop<F>(&mut self, cmp: &F) -> Option<K>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        if self.items.is_empty() {
            return None;
        }
        Some(self.take_at(0, cmp))
    }

    /// Remove `k` wherever it sits; returns `false` if it is not a member.
    pub fn remove<Q, F>(&mut self, k: &Q, cmp: &F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: Fn(&K, &K) -> Ordering,
    {
        match self.pos.get(k) {
            Some(&i) => {
                self.take_at(i, cmp);
                true
            }
            None => false,
        }
    }

    fn take_at<F>(&mut self, i: usize, cmp: &F) -> K
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let last = self.items.len() - 1;
        self.swap(i, last);
        let removed = self.items.swap_remove(last);
        self.pos.remove(&removed);
        if i < self.items.len() {
            self.sift_down(i, cmp);
            self.sift_up(i, cmp);
        }
        removed
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.items.swap(a, b);
        for i in [a, b] {
            if let Some(p) = self.pos.get_mut(&self.items[i]) {
                *p = i;
            }
        }
    }

    fn sift_up<F>(&mut self, mut i: usize, cmp: &F)
    where
        F: Fn(&K, &K) -> Ordering,
    {
        while i > 0 {
            let parent = (i - 1) / 2;
            if cmp(&self.items[i], &self.items[parent]) != Ordering::Less {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down<F>(&mut self, mut i: usize, cmp: &F)
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let n = self.items.len();
        loop {
            let mut best = i;
            for child in [2 * i + 1, 2 * i + 2] {
                if child < n && cmp(&self.items[child], &self.items[best]) == Ordering::Less {
                    best = child;
                }
            }
            if best == i {
                break;
            }
            self.swap(i, best);
            i = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }

    fn drain(mut heap: IndexedHeap<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some(k) = heap.pop(&asc) {
            out.push(k);
        }
        out
    }

    #[test]
    fn pops_in_order() {
        let heap = IndexedHeap::from_items([5, 3, 9, 1, 7, 3], &asc);
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(drain(heap), [1, 3, 5, 7, 9]);
    }

    #[test]
    fn removes_interior_members() {
        let mut heap = IndexedHeap::new();
        for k in [8, 2, 6, 4, 10, 1] {
            assert!(heap.push(k, &asc));
        }
        assert!(!heap.push(6, &asc));

        assert!(heap.remove(&6, &asc));
        assert!(heap.remove(&1, &asc));
        assert!(!heap.remove(&6, &asc));
        assert!(!heap.contains(&6));
        assert_eq!(drain(heap), [2, 4, 8, 10]);
    }

    #[test]
    fn positions_track_every_swap() {
        let mut heap = IndexedHeap::from_items(0..64, &asc);
        for k in (0..64).step_by(3) {
            assert!(heap.remove(&k, &asc));
        }
        for (i, k) in heap.items.iter().enumerate() {
            assert_eq!(heap.pos.get(k), Some(&i));
        }
        let expected: Vec<u32> = (0..64).filter(|k| k % 3 != 0).collect();
        assert_eq!(drain(heap), expected);
    }

    #[test]
    fn clone_is_independent() {
        let heap = IndexedHeap::from_items([3, 1, 2], &asc);
        let mut copy = heap.clone();
        copy.pop(&asc);
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(copy.peek(), Some(&2));
    }
}
