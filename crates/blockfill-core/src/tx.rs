//! Pool transactions and the shared handle used as graph key.
//!
//! A [`Tx`] is immutable once built. Graphs, heaps and every clone of them
//! hold [`TxRef`] handles to the same allocation, so cloning a graph never
//! copies transaction data.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Anything that contributes value and weight to an aggregate.
pub trait SizedItem {
    /// Value ("fee") in integer base units.
    fn fee(&self) -> i64;
    /// Consumed capacity; strictly positive for pool transactions.
    fn weight(&self) -> u64;
}

/// One pool transaction as read from a snapshot.
///
/// `depends` lists the direct parents that must be admitted first and
/// `spent_by` the direct children; the two lists are expected to be
/// mutual inverses across the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub id: String,
    pub fee: i64,
    pub weight: u64,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default, rename = "spentby")]
    pub spent_by: Vec<String>,
}

impl Tx {
    #[must_use]
    pub fn new(id: impl Into<String>, fee: i64, weight: u64) -> Self {
        Self {
            id: id.into(),
            fee,
            weight,
            depends: Vec::new(),
            spent_by: Vec::new(),
        }
    }

    /// Builder-style helper setting the direct parents.
    #[must_use]
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = depends.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper setting the direct children.
    #[must_use]
    pub fn with_spent_by<I, S>(mut self, spent_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spent_by = spent_by.into_iter().map(Into::into).collect();
        self
    }
}

/// A pool snapshot keyed by transaction id.
pub type Pool = HashMap<String, Tx>;

impl SizedItem for Tx {
    fn fee(&self) -> i64 {
        self.fee
    }

    fn weight(&self) -> u64 {
        self.weight
    }
}

/// Shared, immutable handle to a [`Tx`].
///
/// Equality, hashing and ordering all go through the transaction id, and
/// the handle borrows as `str`, so maps keyed by `TxRef` can be queried
/// with a bare id.
#[derive(Clone)]
pub struct TxRef(Arc<Tx>);

impl TxRef {
    #[must_use]
    pub fn new(tx: Tx) -> Self {
        Self(Arc::new(tx))
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// Whether both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl From<Tx> for TxRef {
    fn from(tx: Tx) -> Self {
        Self::new(tx)
    }
}

impl Deref for TxRef {
    type Target = Tx;

    fn deref(&self) -> &Tx {
        &self.0
    }
}

impl Borrow<str> for TxRef {
    fn borrow(&self) -> &str {
        &self.0.id
    }
}

impl PartialEq for TxRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for TxRef {}

impl Hash for TxRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `str`'s hash for `Borrow<str>` lookups.
        self.0.id.as_str().hash(state);
    }
}

impl PartialOrd for TxRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TxRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl SizedItem for TxRef {
    fn fee(&self) -> i64 {
        self.0.fee
    }

    fn weight(&self) -> u64 {
        self.0.weight
    }
}

impl fmt::Debug for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tx({})", self.0.id)
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.id)
    }
}
