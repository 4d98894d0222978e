//! JSON mempool dumps in the shape of `getrawmempool true`.
//!
//! The top-level object maps txid to an entry. Fees come in coin units and
//! are converted to integer base units. Both the flat layout (`fee`,
//! `ancestorfees`, ...) and the nested `fees` object of newer dumps are
//! accepted; the flat field wins when both are present.

use std::collections::{BTreeMap, HashMap};

use blockfill_core::{Pool, Tx};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PoolError;

/// Base units per coin.
pub const COIN: f64 = 1e8;

/// Nested fee block of newer dumps, in coin units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFees {
    pub base: Option<f64>,
    pub ancestor: Option<f64>,
    pub descendant: Option<f64>,
}

/// One entry of the dump, as written by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MempoolEntry {
    pub fee: Option<f64>,
    pub fees: Option<EntryFees>,
    pub vsize: Option<u64>,
    pub weight: Option<u64>,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub spentby: Vec<String>,
    pub ancestorcount: Option<usize>,
    pub ancestorsize: Option<u64>,
    pub ancestorfees: Option<i64>,
    pub descendantcount: Option<usize>,
    pub descendantsize: Option<u64>,
    pub descendantfees: Option<i64>,
}

/// Package statistics the node recorded for one transaction.
///
/// Counts and fees include the transaction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedStats {
    pub ancestor_count: usize,
    pub ancestor_fees: i64,
    pub descendant_count: usize,
    pub descendant_fees: i64,
}

/// Convert a coin amount to base units, rounding to the nearest unit.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_base_units(coins: f64) -> i64 {
    (coins * COIN).round() as i64
}

impl MempoolEntry {
    fn to_tx(&self, id: &str) -> Result<Tx, PoolError> {
        let fee = self
            .fee
            .or_else(|| self.fees.as_ref().and_then(|f| f.base))
            .ok_or_else(|| PoolError::MissingField {
                tx: id.to_string(),
                field: "fee",
            })?;
        let weight = self
            .weight
            .or_else(|| self.vsize.map(|v| v * 4))
            .ok_or_else(|| PoolError::MissingField {
                tx: id.to_string(),
                field: "weight",
            })?;
        if weight == 0 {
            return Err(PoolError::ZeroWeight { tx: id.to_string() });
        }

        let mut tx = Tx::new(id, to_base_units(fee), weight)
            .with_depends(self.depends.iter().cloned())
            .with_spent_by(self.spentby.iter().cloned());
        tx.depends.sort_unstable();
        tx.spent_by.sort_unstable();
        Ok(tx)
    }

    fn recorded(&self) -> Option<RecordedStats> {
        let fees = self.fees.clone().unwrap_or_default();
        Some(RecordedStats {
            ancestor_count: self.ancestorcount?,
            ancestor_fees: self
                .ancestorfees
                .or_else(|| fees.ancestor.map(to_base_units))?,
            descendant_count: self.descendantcount?,
            descendant_fees: self
                .descendantfees
                .or_else(|| fees.descendant.map(to_base_units))?,
        })
    }
}

/// A parsed JSON dump: the pool plus whatever statistics it recorded.
#[derive(Debug, Clone, Default)]
pub struct JsonPool {
    pub pool: Pool,
    pub recorded: HashMap<String, RecordedStats>,
}

/// Parse a JSON dump.
///
/// # Errors
///
/// - [`PoolError::Json`] if the text is not a txid-keyed object of entries.
/// - [`PoolError::MissingField`] if an entry has no fee or no size.
/// - [`PoolError::ZeroWeight`] if an entry's weight (or vsize) is zero.
pub fn parse_json(input: &str) -> Result<JsonPool, PoolError> {
    let entries: BTreeMap<String, MempoolEntry> = serde_json::from_str(input)?;
    let mut out = JsonPool::default();
    for (id, entry) in &entries {
        out.pool.insert(id.clone(), entry.to_tx(id)?);
        if let Some(stats) = entry.recorded() {
            out.recorded.insert(id.clone(), stats);
        }
    }
    debug!(
        txs = out.pool.len(),
        recorded = out.recorded.len(),
        "json snapshot parsed"
    );
    Ok(out)
}
