//! Hand-built graphs with known answers.

use std::collections::BTreeMap;

use blockfill_core::{
    AncestorSet, AncestorSetBuilder, BlockCollector, ChainCompare, Dim, GraphError, Tx, TxGraph,
    MAX_CONSECUTIVE_FAILURES,
};

fn closures(graph: &TxGraph, ancestors: bool) -> BTreeMap<String, Vec<String>> {
    graph
        .nodes()
        .iter()
        .map(|tx| {
            let set = if ancestors {
                graph.ancestors(tx)
            } else {
                graph.descendants(tx)
            };
            let mut ids: Vec<String> = set
                .expect("entry")
                .iter()
                .map(|t| t.id().to_string())
                .collect();
            ids.sort();
            (tx.id().to_string(), ids)
        })
        .collect()
}

/// `("c", "a,b")` rows to a closure map.
fn map(rows: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
    rows.iter()
        .map(|(k, v)| {
            let ids = v.split(',').filter(|s| !s.is_empty()).map(String::from).collect();
            ((*k).to_string(), ids)
        })
        .collect()
}

/// a, b -> a, c -> b, d -> a
fn diamond_free() -> Vec<Tx> {
    vec![
        Tx::new("a", 1, 1).with_spent_by(["b", "d"]),
        Tx::new("b", 1, 1).with_depends(["a"]).with_spent_by(["c"]),
        Tx::new("c", 1, 1).with_depends(["b"]),
        Tx::new("d", 1, 1).with_depends(["a"]),
    ]
}

#[test]
fn removing_the_root_rewires_both_closures() {
    let mut graph = TxGraph::from_txs(diamond_free()).expect("graph");
    assert_eq!(
        closures(&graph, true),
        map(&[("a", ""), ("b", "a"), ("c", "a,b"), ("d", "a")])
    );

    graph.remove("a").expect("remove a");
    assert_eq!(
        closures(&graph, true),
        map(&[("b", ""), ("c", "b"), ("d", "")])
    );
    assert_eq!(
        closures(&graph, false),
        map(&[("b", "c"), ("c", ""), ("d", "")])
    );
}

#[test]
fn identity_decides_between_equal_sets() {
    // A = {x, y} with rep x, B = {w, a} with rep w.
    let graph = TxGraph::from_txs([
        Tx::new("x", 1, 1).with_depends(["y"]),
        Tx::new("y", 1, 1).with_spent_by(["x"]),
        Tx::new("w", 1, 1).with_depends(["a"]),
        Tx::new("a", 1, 1).with_spent_by(["w"]),
    ])
    .expect("graph");
    let builder = AncestorSetBuilder::new(graph, ChainCompare::fee_rate_and_fee());

    let top = builder.peek_ancestor_set().expect("peek").expect("set");
    assert_eq!(top.tx.id(), "w");
    assert_eq!(top.member_ids(), ["a", "w"]);

    let chain = ChainCompare::fee_rate_and_fee();
    let mut b_first = builder.clone();
    let set_b = b_first.pop_ancestor_set().expect("pop").expect("set");
    let set_a = b_first.pop_ancestor_set().expect("pop").expect("set");
    assert_eq!(set_a.tx.id(), "x");
    assert_eq!(
        chain.apply(&set_b.candidate(), &set_a.candidate()),
        std::cmp::Ordering::Less
    );
}

#[test]
fn small_pool_is_exhausted_in_priority_order() {
    let graph = TxGraph::from_txs([
        Tx::new("a", 30, 10).with_spent_by(["b"]),
        Tx::new("b", 50, 10).with_depends(["a"]),
        Tx::new("c", 10, 10),
        Tx::new("d", 35, 10),
    ])
    .expect("graph");
    let total = graph.agg_weight();
    let mut builder = AncestorSetBuilder::new(graph, ChainCompare::default());

    let sets: Vec<AncestorSet> = builder
        .ordered_ancestor_sets(total + 1, MAX_CONSECUTIVE_FAILURES)
        .collect::<Result<_, _>>()
        .expect("ordering");

    // {a, b} at 4.0, d at 3.5, c at 1.0.
    let reps: Vec<&str> = sets.iter().map(|s| s.tx.id()).collect();
    assert_eq!(reps, ["b", "d", "c"]);
    let rates: Vec<f64> = sets.iter().map(AncestorSet::agg_fee_rate).collect();
    assert!(rates.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(sets.iter().map(AncestorSet::len).sum::<usize>(), 4);
    assert_eq!(builder.graph().len(), 0);
}

#[test]
fn collector_sweeps_rising_limits() {
    let graph = TxGraph::from_txs([
        Tx::new("a", 30, 10).with_spent_by(["b"]),
        Tx::new("b", 50, 10).with_depends(["a"]),
        Tx::new("c", 10, 10),
        Tx::new("d", 35, 10),
    ])
    .expect("graph");
    let mut collector =
        BlockCollector::new(AncestorSetBuilder::new(graph, ChainCompare::default()));

    let dims: Vec<Dim> = [10, 20, 30, 40]
        .into_iter()
        .map(|limit| collector.collect(limit).expect("collect"))
        .collect();
    assert_eq!(
        dims,
        [
            // {a, b} does not fit; the probe skips it and finds d.
            Dim::new(35, 10),
            Dim::new(80, 20),
            Dim::new(115, 30),
            Dim::new(125, 40),
        ]
    );
}

#[test]
fn cyclic_snapshot_is_reported() {
    let err = TxGraph::from_txs([
        Tx::new("p", 1, 1).with_depends(["r"]).with_spent_by(["q"]),
        Tx::new("q", 1, 1).with_depends(["p"]).with_spent_by(["r"]),
        Tx::new("r", 1, 1).with_depends(["q"]).with_spent_by(["p"]),
    ])
    .expect_err("cycle");
    assert!(matches!(err, GraphError::Cycle { .. }));
}
