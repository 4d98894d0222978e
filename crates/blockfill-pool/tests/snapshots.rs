use std::fs;

use blockfill_core::{AncestorSetBuilder, ChainCompare, TxGraph};
use blockfill_pool::{
    PoolError, SynthParams, content_hash, find_cycles, generate_pool, load_pool, parse_text,
    verify_recorded_stats, write_text,
};
use proptest::prelude::*;

#[test]
fn synthetic_pool_survives_a_disk_round_trip() {
    let pool = generate_pool(&SynthParams {
        seed: 11,
        count: 200,
        ..SynthParams::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("synthetic_11.mempool");
    let mut file = fs::File::create(&path).expect("create");
    write_text(&pool, &mut file).expect("write");
    drop(file);

    let snap = load_pool(&path).expect("load");
    assert_eq!(snap.pool, pool);
    assert_eq!(content_hash(&snap.pool), content_hash(&pool));
    assert_eq!(snap.label(), "synthetic");
}

#[test]
fn json_dump_with_consistent_stats_verifies_clean() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mempool.json");
    fs::write(
        &path,
        r#"{
          "p": { "fee": 0.0001, "weight": 800, "spentby": ["c1", "c2"],
                 "ancestorcount": 1, "ancestorfees": 10000,
                 "descendantcount": 3, "descendantfees": 10600 },
          "c1": { "fee": 0.000005, "weight": 400, "depends": ["p"],
                  "ancestorcount": 2, "ancestorfees": 10500,
                  "descendantcount": 1, "descendantfees": 500 },
          "c2": { "fee": 0.000001, "weight": 400, "depends": ["p"],
                  "ancestorcount": 2, "ancestorfees": 10100,
                  "descendantcount": 1, "descendantfees": 100 }
        }"#,
    )
    .expect("write");

    let snap = load_pool(&path).expect("load");
    let graph = TxGraph::from_pool(&snap.pool).expect("graph");
    assert!(verify_recorded_stats(&snap.recorded, &graph).expect("verify").is_empty());

    let mut builder = AncestorSetBuilder::new(graph, ChainCompare::fee_rate());
    let first = builder.pop_ancestor_set().expect("pop").expect("set");
    // p alone: 10000 / 800 beats {p, c1}: 10500 / 1200.
    assert_eq!(first.tx.id(), "p");
}

#[test]
fn cyclic_text_snapshot_is_diagnosed_before_graph_build() {
    let pool = parse_text("a 1 4 c\nb 1 4 a\nc 1 4 b\n").expect("parse");
    assert_eq!(find_cycles(&pool), [vec!["a", "b", "c"]]);
    assert!(TxGraph::from_pool(&pool).is_err());
}

#[test]
fn unsupported_extension_has_a_hint() {
    let err = load_pool(std::path::Path::new("pool.csv")).expect_err("should fail");
    assert!(matches!(err, PoolError::Unsupported { .. }));
    assert!(err.code().hint().is_some());
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn synthetic_pools_are_always_valid(seed in any::<u64>(), count in 1usize..150, parents in 0usize..4) {
        let pool = generate_pool(&SynthParams {
            seed,
            count,
            max_parents: parents,
            window: 8,
            ..SynthParams::default()
        });
        prop_assert_eq!(pool.len(), count);
        prop_assert!(find_cycles(&pool).is_empty());
        let graph = TxGraph::from_pool(&pool).expect("graph");
        prop_assert_eq!(graph.len(), count);
    }
}
