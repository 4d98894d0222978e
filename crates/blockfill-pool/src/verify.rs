//! Cross-check computed closures against node-recorded package statistics.

use std::collections::HashMap;
use std::fmt;

use blockfill_core::{GraphError, SizedSet, TxGraph, TxRef};
use serde::Serialize;
use tracing::{debug, warn};

use crate::json::RecordedStats;

/// Which recorded statistic disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    AncestorCount,
    AncestorFees,
    DescendantCount,
    DescendantFees,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AncestorCount => "ancestorcount",
            Self::AncestorFees => "ancestorfees",
            Self::DescendantCount => "descendantcount",
            Self::DescendantFees => "descendantfees",
        })
    }
}

/// One disagreement between the snapshot and the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatMismatch {
    pub tx: String,
    pub stat: Stat,
    pub recorded: i64,
    pub computed: i64,
}

/// Compare `closure ∪ {tx}` counts and fees with the recorded statistics.
///
/// Returns every mismatch, sorted by transaction id and statistic.
///
/// # Errors
///
/// Returns [`GraphError::MissingEntry`] if a transaction with recorded
/// statistics is not in `graph`.
pub fn verify_recorded_stats(
    recorded: &HashMap<String, RecordedStats>,
    graph: &TxGraph,
) -> Result<Vec<StatMismatch>, GraphError> {
    let mut mismatches = Vec::new();

    for (id, stats) in recorded {
        let missing = || GraphError::MissingEntry { id: id.clone() };
        let tx = graph.tx(id).ok_or_else(missing)?;
        let ancestors = graph.ancestors(id.as_str()).ok_or_else(missing)?;
        let descendants = graph.descendants(id.as_str()).ok_or_else(missing)?;

        let (anc_count, anc_fees) = with_self(ancestors, tx);
        let (desc_count, desc_fees) = with_self(descendants, tx);
        let checks = [
            (Stat::AncestorCount, count(stats.ancestor_count), anc_count),
            (Stat::AncestorFees, stats.ancestor_fees, anc_fees),
            (Stat::DescendantCount, count(stats.descendant_count), desc_count),
            (Stat::DescendantFees, stats.descendant_fees, desc_fees),
        ];
        for (stat, recorded, computed) in checks {
            if recorded != computed {
                mismatches.push(StatMismatch {
                    tx: id.clone(),
                    stat,
                    recorded,
                    computed,
                });
            }
        }
    }

    mismatches.sort_by(|a, b| a.tx.cmp(&b.tx).then_with(|| a.stat.cmp(&b.stat)));
    if mismatches.is_empty() {
        debug!(checked = recorded.len(), "recorded statistics match");
    } else {
        warn!(
            checked = recorded.len(),
            mismatches = mismatches.len(),
            "recorded statistics disagree with computed closures"
        );
    }
    Ok(mismatches)
}

fn with_self(set: &SizedSet<TxRef>, tx: &TxRef) -> (i64, i64) {
    (count(set.len() + 1), set.agg_fee() + tx.fee)
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
