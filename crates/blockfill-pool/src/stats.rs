//! Summary numbers and content hashing for a pool.

use blockfill_core::{Pool, TxGraph};
use serde::Serialize;

/// Virtual size of a transaction of weight `weight`: `ceil(weight / 4)`.
#[must_use]
pub const fn weight_to_vsize(weight: u64) -> u64 {
    weight.div_ceil(4)
}

/// Shape of a pool at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub txs: usize,
    pub agg_weight: u64,
    pub agg_vsize: u64,
    pub agg_fee: i64,
    /// Transactions without in-pool parents.
    pub roots: usize,
    /// Largest ancestor set, counting the transaction itself.
    pub max_ancestors: usize,
    /// Largest descendant set, counting the transaction itself.
    pub max_descendants: usize,
}

impl PoolStats {
    #[must_use]
    pub fn compute(graph: &TxGraph) -> Self {
        let mut stats = Self {
            txs: graph.len(),
            agg_weight: 0,
            agg_vsize: 0,
            agg_fee: 0,
            roots: graph.roots().len(),
            max_ancestors: 0,
            max_descendants: 0,
        };
        for tx in graph.nodes() {
            stats.agg_weight += tx.weight;
            stats.agg_vsize += weight_to_vsize(tx.weight);
            stats.agg_fee += tx.fee;
            if let Some(anc) = graph.ancestors(&tx) {
                stats.max_ancestors = stats.max_ancestors.max(anc.len() + 1);
            }
            if let Some(desc) = graph.descendants(&tx) {
                stats.max_descendants = stats.max_descendants.max(desc.len() + 1);
            }
        }
        stats
    }
}

/// `blake3:<hex>` digest of the pool's text records, sorted by id.
///
/// Depends only on ids, fees, weights and parent sets, so a JSON dump and
/// its text conversion hash identically.
#[must_use]
pub fn content_hash(pool: &Pool) -> String {
    let mut ids: Vec<&String> = pool.keys().collect();
    ids.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for id in ids {
        let tx = &pool[id];
        let mut depends: Vec<&str> = tx.depends.iter().map(String::as_str).collect();
        depends.sort_unstable();
        hasher.update(format!("{} {} {}", tx.id, tx.fee, tx.weight).as_bytes());
        for d in depends {
            hasher.update(b" ");
            hasher.update(d.as_bytes());
        }
        hasher.update(b"\n");
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}
