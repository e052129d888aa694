//! Cycle-tolerant dependency ordering over a petgraph `DiGraph`.
//!
//! Edges point from a node to the node it depends on. The result always
//! contains every node exactly once, dependencies first; when the graph has
//! cycles the order is given as strongly-connected-component levels.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

/// The processing order of a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologicalOrder {
    /// Acyclic: a total order, dependencies first.
    Sorted(Vec<NodeIndex>),
    /// Cyclic: SCC levels, each level's dependencies in earlier levels.
    /// Nodes within a level are ordered by index.
    Cyclic(Vec<Vec<NodeIndex>>),
}

impl TopologicalOrder {
    pub fn is_cyclic(&self) -> bool {
        matches!(self, TopologicalOrder::Cyclic(_))
    }

    /// Flatten into one processing sequence.
    pub fn into_sequence(self) -> Vec<NodeIndex> {
        match self {
            TopologicalOrder::Sorted(nodes) => nodes,
            TopologicalOrder::Cyclic(levels) => levels.into_iter().flatten().collect(),
        }
    }
}

/// Order the nodes of `graph` so that every node follows the nodes it has
/// edges to.
pub fn dependency_order<N, E>(graph: &DiGraph<N, E>) -> TopologicalOrder {
    match toposort(graph, None) {
        Ok(mut nodes) => {
            // toposort puts edge sources first; dependencies are targets.
            nodes.reverse();
            TopologicalOrder::Sorted(nodes)
        }
        Err(_) => {
            // Tarjan yields components in reverse topological order, which
            // is dependencies first for dependency edges.
            let levels = tarjan_scc(graph)
                .into_iter()
                .map(|mut level| {
                    level.sort();
                    level
                })
                .collect();
            TopologicalOrder::Cyclic(levels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[NodeIndex], node: NodeIndex) -> usize {
        order.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn acyclic_graph_puts_dependencies_first() {
        let mut graph = DiGraph::<&str, ()>::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.add_edge(a, b, ()); // a depends on b
        graph.add_edge(b, c, ());

        let order = dependency_order(&graph);
        assert!(!order.is_cyclic());
        assert_eq!(order.into_sequence(), vec![c, b, a]);
    }

    #[test]
    fn cycle_yields_levels_with_every_node_once() {
        let mut graph = DiGraph::<&str, ()>::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        graph.add_edge(a, b, ());
        graph.add_edge(b, a, ());
        graph.add_edge(c, a, ()); // c depends on the cycle
        graph.add_edge(b, d, ()); // the cycle depends on d

        let order = dependency_order(&graph);
        let TopologicalOrder::Cyclic(levels) = &order else {
            panic!("expected cyclic order, got {:?}", order);
        };
        assert!(levels.contains(&vec![a, b]));

        let sequence = order.clone().into_sequence();
        assert_eq!(sequence.len(), 4);
        assert!(position(&sequence, d) < position(&sequence, a));
        assert!(position(&sequence, b) < position(&sequence, c));
    }

    #[test]
    fn self_loop_counts_as_cycle() {
        let mut graph = DiGraph::<(), ()>::new();
        let a = graph.add_node(());
        graph.add_edge(a, a, ());
        assert_eq!(dependency_order(&graph), TopologicalOrder::Cyclic(vec![vec![a]]));
    }
}
