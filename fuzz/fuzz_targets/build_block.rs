#![no_main]

use blockfill_core::{AncestorSetBuilder, ChainCompare, TxGraph};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pool) = blockfill_pool::parse_text(input) else {
        return;
    };
    let total = pool.values().try_fold(0u64, |acc, tx| acc.checked_add(tx.weight));
    let fees = pool.values().try_fold(0i64, |acc, tx| acc.checked_add(tx.fee.checked_abs()?));
    let (Some(total), Some(_)) = (total, fees) else {
        return;
    };
    // Cyclic pools are rejected here; everything else must order cleanly.
    let Ok(graph) = TxGraph::from_pool(&pool) else {
        assert!(!blockfill_pool::find_cycles(&pool).is_empty());
        return;
    };

    let mut builder = AncestorSetBuilder::new(graph, ChainCompare::default());
    let mut weight = 0u64;
    for set in builder.ordered_ancestor_sets(u64::MAX, 0) {
        let set = set.expect("ordering stays consistent");
        weight += set.agg_weight();
    }
    assert!(builder.is_empty());
    assert_eq!(weight, total);
});
