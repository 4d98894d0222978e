//! Deterministic synthetic pools.
//!
//! Transactions are generated in order; each may spend up to
//! `max_parents` of the `window` transactions generated just before it, so
//! the result is always acyclic and chains stay local the way real pools
//! tend to.

use std::collections::HashMap;

use blockfill_core::{Pool, Tx};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Knobs for [`generate_pool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthParams {
    pub seed: u64,
    pub count: usize,
    pub max_parents: usize,
    pub window: usize,
    /// Inclusive fee range in base units.
    pub fee: (i64, i64),
    /// Inclusive weight range; the lower end must be positive.
    pub weight: (u64, u64),
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            seed: 0,
            count: 1_000,
            max_parents: 2,
            window: 64,
            fee: (200, 100_000),
            weight: (400, 16_000),
        }
    }
}

/// 64-hex-digit id derived from the seed and position.
fn synth_id(seed: u64, i: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(&(i as u64).to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Generate a pool from `params`. Equal params give equal pools.
#[must_use]
#[instrument]
pub fn generate_pool(params: &SynthParams) -> Pool {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let ids: Vec<String> = (0..params.count).map(|i| synth_id(params.seed, i)).collect();
    let (fee_lo, fee_hi) = params.fee;
    let (weight_lo, weight_hi) = (params.weight.0.max(1), params.weight.1.max(1));

    let mut txs: Vec<Tx> = Vec::with_capacity(params.count);
    for (i, id) in ids.iter().enumerate() {
        let mut depends: Vec<String> = Vec::new();
        if i > 0 && params.max_parents > 0 {
            let reach = i.min(params.window.max(1));
            for _ in 0..rng.gen_range(0..=params.max_parents) {
                let parent = &ids[i - rng.gen_range(1..=reach)];
                if !depends.contains(parent) {
                    depends.push(parent.clone());
                }
            }
        }
        let fee = rng.gen_range(fee_lo.min(fee_hi)..=fee_hi.max(fee_lo));
        let weight = rng.gen_range(weight_lo.min(weight_hi)..=weight_hi.max(weight_lo));
        txs.push(Tx::new(id.as_str(), fee, weight).with_depends(depends));
    }

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for tx in &txs {
        for parent in &tx.depends {
            children.entry(parent.clone()).or_default().push(tx.id.clone());
        }
    }

    let pool: Pool = txs
        .into_iter()
        .map(|mut tx| {
            if let Some(mut kids) = children.remove(&tx.id) {
                kids.sort_unstable();
                tx.spent_by = kids;
            }
            (tx.id.clone(), tx)
        })
        .collect();
    debug!(txs = pool.len(), "synthetic pool generated");
    pool
}
