use super::DependencyGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::VecDeque;

/// Processing order over the dependency graph.
#[derive(Debug, Clone, Default)]
pub struct TopologicalOrder {
    /// Every activity exactly once.
    pub order: Vec<NodeIndex>,
    /// How many leading entries of `order` are properly sorted. The rest
    /// sit on or behind a cycle and follow in record order.
    pub sorted: usize,
}

impl TopologicalOrder {
    pub fn is_complete(&self) -> bool {
        self.sorted == self.order.len()
    }

    /// Activities that could not be sorted.
    pub fn unsorted(&self) -> &[NodeIndex] {
        &self.order[self.sorted..]
    }
}

/// Kahn's algorithm. The ready queue is seeded and fed in record order so
/// the result is stable for a given snapshot.
pub(crate) fn kahn_order(graph: &DependencyGraph) -> TopologicalOrder {
    let g = &graph.graph;
    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|n| g.edges_directed(n, Direction::Incoming).count())
        .collect();

    let mut queue: VecDeque<NodeIndex> = g
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .collect();
    let mut order = Vec::with_capacity(g.node_count());
    let mut placed = vec![false; g.node_count()];

    while let Some(node) = queue.pop_front() {
        order.push(node);
        placed[node.index()] = true;
        for dependent in graph.dependents(node) {
            in_degree[dependent.index()] -= 1;
            if in_degree[dependent.index()] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let sorted = order.len();
    if sorted < g.node_count() {
        log::warn!(
            "dependency cycle: {} of {} activities appended in record order",
            g.node_count() - sorted,
            g.node_count()
        );
        order.extend(g.node_indices().filter(|n| !placed[n.index()]));
    }

    TopologicalOrder { order, sorted }
}

#[cfg(test)]
mod tests {
    use crate::graph::test_support::act;
    use crate::graph::DependencyGraph;

    fn order_ids(graph: &DependencyGraph) -> Vec<String> {
        graph
            .topological_order()
            .order
            .iter()
            .map(|&n| graph.graph[n].id.clone())
            .collect()
    }

    #[test]
    fn test_chain_orders_prerequisites_first() {
        let activities = vec![act("A", "B", 1.0), act("B", "C", 1.0), act("C", "", 1.0)];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(order_ids(&graph), vec!["C", "B", "A"]);
        assert!(graph.topological_order().is_complete());
    }

    #[test]
    fn test_independent_activities_keep_record_order() {
        let activities = vec![act("X", "", 1.0), act("Y", "", 1.0), act("Z", "X", 1.0)];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(order_ids(&graph), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_repeated_prerequisite_does_not_stall() {
        let activities = vec![act("A", "", 1.0), act("B", "A, A", 1.0)];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(order_ids(&graph), vec!["A", "B"]);
    }

    #[test]
    fn test_cycle_falls_back_to_record_order() {
        let activities = vec![
            act("A", "C", 1.0),
            act("B", "A", 1.0),
            act("C", "B", 1.0),
            act("D", "", 1.0),
        ];
        let graph = DependencyGraph::build(&activities);
        let topo = graph.topological_order();
        assert_eq!(topo.sorted, 1);
        assert!(!topo.is_complete());
        assert_eq!(topo.unsorted().len(), 3);
        assert_eq!(order_ids(&graph), vec!["D", "A", "B", "C"]);
    }
}
