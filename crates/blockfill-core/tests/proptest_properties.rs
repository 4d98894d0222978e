use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use blockfill_core::compare::Candidate;
use blockfill_core::{AncestorSetBuilder, ChainCompare, SizedSet, Tx, TxGraph, TxRef};
use proptest::prelude::*;

use generators::*;

fn builder(pool: &[Tx]) -> AncestorSetBuilder {
    let graph = TxGraph::from_txs(pool.iter().cloned()).expect("generated pools are acyclic");
    AncestorSetBuilder::new(graph, ChainCompare::fee_rate_and_fee())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn closures_match_reachability(pool in arb_pool()) {
        let graph = TxGraph::from_txs(pool.iter().cloned()).expect("graph");
        let oracle = Oracle::new(&pool);

        for tx in &pool {
            let anc = graph.ancestors(tx.id.as_str()).expect("ancestors");
            let desc = graph.descendants(tx.id.as_str()).expect("descendants");
            prop_assert_eq!(ids(anc.iter()), oracle.ancestors(&tx.id));
            prop_assert_eq!(ids(desc.iter()), oracle.descendants(&tx.id));

            let fee: i64 = anc.iter().map(|t| t.fee).sum();
            prop_assert_eq!(anc.agg_fee(), fee);
        }
    }

    #[test]
    fn removal_matches_rebuild(pool in arb_pool(), pick in any::<usize>()) {
        let removed = pool[pick % pool.len()].id.clone();
        let mut graph = TxGraph::from_txs(pool.iter().cloned()).expect("graph");
        graph.set_check_removed(true);
        graph.remove(removed.as_str()).expect("remove");

        let rest = without(&pool, &removed);
        let rebuilt = TxGraph::from_txs(rest.iter().cloned()).expect("rebuilt");
        prop_assert_eq!(graph.len(), rebuilt.len());

        for tx in &rest {
            let id = tx.id.as_str();
            let live = graph.ancestors(id).expect("live");
            let fresh = rebuilt.ancestors(id).expect("fresh");
            prop_assert_eq!(ids(live.iter()), ids(fresh.iter()));
            prop_assert_eq!(live.agg_weight(), fresh.agg_weight());

            let live = graph.descendants(id).expect("live");
            let fresh = rebuilt.descendants(id).expect("fresh");
            prop_assert_eq!(ids(live.iter()), ids(fresh.iter()));
        }
    }

    #[test]
    fn aggregates_track_membership(
        ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..64),
    ) {
        let universe: Vec<TxRef> = (0..8)
            .map(|i| TxRef::new(Tx::new(tx_id(i), i64::try_from(i).expect("small") * 7 - 20, 1 + i as u64)))
            .collect();
        let mut set = SizedSet::new();
        let mut model: HashSet<usize> = HashSet::new();

        for (add, i) in ops {
            if add {
                prop_assert_eq!(set.add(universe[i].clone()), model.insert(i));
            } else {
                prop_assert_eq!(set.delete(universe[i].id()), model.remove(&i));
            }
            let fee: i64 = model.iter().map(|&i| universe[i].fee).sum();
            let weight: u64 = model.iter().map(|&i| universe[i].weight).sum();
            prop_assert_eq!(set.agg_fee(), fee);
            prop_assert_eq!(set.agg_weight(), weight);
            prop_assert_eq!(set.len(), model.len());
        }
    }

    #[test]
    fn default_chains_are_strict_total_orders(
        a in (0i64..50, 1u64..50),
        b in (0i64..50, 1u64..50),
        rep_a in "[a-f]{1,4}",
        rep_b in "[a-f]{1,4}",
    ) {
        prop_assume!(rep_a != rep_b);
        let ca = Candidate { rep: &rep_a, agg_fee: a.0, agg_weight: a.1 };
        let cb = Candidate { rep: &rep_b, agg_fee: b.0, agg_weight: b.1 };

        for chain in [
            ChainCompare::fee_rate(),
            ChainCompare::fee_rate_and_fee(),
            ChainCompare::fee_rate_and_weight(),
        ] {
            let ab = chain.apply(&ca, &cb);
            prop_assert_ne!(ab, Ordering::Equal);
            prop_assert_eq!(ab, chain.apply(&cb, &ca).reverse());
        }
    }

    #[test]
    fn heap_and_graph_stay_in_sync(
        pool in arb_pool(),
        ops in prop::collection::vec(0u8..3, 0..20),
    ) {
        let mut b = builder(&pool);
        let mut shelved = Vec::new();
        for op in ops {
            match op {
                0 => {
                    b.peek_ancestor_set().expect("peek");
                }
                1 => {
                    b.pop_ancestor_set().expect("pop");
                }
                _ => {
                    let copy = b.clone();
                    shelved.push(std::mem::replace(&mut b, copy));
                }
            }
            b.check_sync().expect("live builder in sync");
        }
        for old in &shelved {
            old.check_sync().expect("shelved builder in sync");
        }
    }

    #[test]
    fn strict_pass_stops_at_first_misfit(pool in arb_pool(), max_weight in 0u64..20_000) {
        let mut b = builder(&pool);
        let sets: Vec<_> = b
            .ordered_ancestor_sets(max_weight, 0)
            .collect::<Result<_, _>>()
            .expect("ordering");

        let mut running = 0;
        let mut yielded = 0;
        for set in &sets {
            running += set.agg_weight();
            yielded += set.len();
            prop_assert!(running <= max_weight);
        }
        prop_assert_eq!(b.len(), pool.len() - yielded);

        if let Some(next) = b.peek_ancestor_set().expect("peek") {
            prop_assert!(running + next.agg_weight() > max_weight);
        }
        b.check_sync().expect("in sync");
    }

    #[test]
    fn clones_do_not_interfere(pool in arb_pool(), pops in 1usize..10) {
        let original = builder(&pool);
        let before = original.peek_ancestor_set().expect("peek");

        let mut copy = original.clone();
        for _ in 0..pops {
            copy.pop_ancestor_set().expect("pop");
        }
        prop_assert_eq!(original.peek_ancestor_set().expect("peek"), before.clone());
        prop_assert_eq!(original.len(), pool.len());

        let mut original = original;
        original.pop_ancestor_set().expect("pop");
        let fresh = builder(&pool);
        let mut replay = fresh.clone();
        for _ in 0..pops {
            replay.pop_ancestor_set().expect("pop");
        }
        prop_assert_eq!(copy.len(), replay.len());
        prop_assert_eq!(copy.peek_ancestor_set().expect("peek"), replay.peek_ancestor_set().expect("peek"));
    }

    #[test]
    fn topological_order_is_sound(pool in arb_pool()) {
        let graph = TxGraph::from_txs(pool.iter().cloned()).expect("graph");
        let by_id = |a: &TxRef, b: &TxRef| a.cmp(b);
        let order = graph.topological_order(Some(&by_id)).expect("topo");

        prop_assert_eq!(order.len(), pool.len());
        let pos: HashMap<&str, usize> =
            order.iter().enumerate().map(|(i, t)| (t.id(), i)).collect();
        prop_assert_eq!(pos.len(), pool.len());

        let oracle = Oracle::new(&pool);
        for tx in &pool {
            for anc in oracle.ancestors(&tx.id) {
                prop_assert!(oracle.has_path(&tx.id, &anc));
                prop_assert!(pos[anc.as_str()] < pos[tx.id.as_str()]);
            }
        }
    }
}
