//! Cycle diagnostics for snapshots that the graph builder would reject.

use std::collections::HashMap;

use blockfill_core::Pool;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Every dependency cycle in `pool`, as sorted member lists.
///
/// A cycle is a strongly connected component with more than one member or a
/// transaction that depends on itself. Parents missing from the pool are
/// ignored here. The result is sorted, so it is stable across runs.
#[must_use]
pub fn find_cycles(pool: &Pool) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let index: HashMap<&str, NodeIndex> = pool
        .keys()
        .map(|id| (id.as_str(), graph.add_node(id.as_str())))
        .collect();

    let mut self_loops = Vec::new();
    for tx in pool.values() {
        let child = index[tx.id.as_str()];
        for parent in &tx.depends {
            if parent == &tx.id {
                self_loops.push(vec![tx.id.clone()]);
            }
            if let Some(&p) = index.get(parent.as_str()) {
                graph.add_edge(child, p, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut ids: Vec<String> = scc.iter().map(|n| graph[*n].to_string()).collect();
            ids.sort_unstable();
            ids
        })
        .chain(self_loops)
        .collect();
    cycles.sort_unstable();
    cycles
}
