use super::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

struct Frame {
    node: NodeIndex,
    prerequisites: Vec<NodeIndex>,
    next: usize,
}

/// Ids of every activity that takes part in at least one dependency cycle.
///
/// Depth-first walk along prerequisite links, starting from each activity in
/// record order. Reaching an activity still on the stack marks the stack
/// from that activity onward. Individual cycles are not reported.
pub fn detect_cycles(graph: &DependencyGraph) -> BTreeSet<String> {
    let g = &graph.graph;
    let mut marks = vec![Mark::Unvisited; g.node_count()];
    let mut in_cycle = BTreeSet::new();

    for root in g.node_indices() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        marks[root.index()] = Mark::Visiting;
        let mut stack = vec![Frame {
            node: root,
            prerequisites: graph.prerequisites(root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = frame.prerequisites.get(frame.next) else {
                marks[frame.node.index()] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.next += 1;

            match marks[next.index()] {
                Mark::Visiting => {
                    if let Some(pos) = stack.iter().position(|f| f.node == next) {
                        for f in &stack[pos..] {
                            in_cycle.insert(g[f.node].id.clone());
                        }
                    }
                    in_cycle.insert(g[next].id.clone());
                }
                Mark::Unvisited => {
                    marks[next.index()] = Mark::Visiting;
                    stack.push(Frame {
                        node: next,
                        prerequisites: graph.prerequisites(next),
                        next: 0,
                    });
                }
                Mark::Done => {}
            }
        }
    }

    in_cycle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::act;

    fn ids(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_three_node_cycle() {
        let activities = vec![act("A", "B", 1.0), act("B", "C", 1.0), act("C", "A", 1.0)];
        let cycles = detect_cycles(&DependencyGraph::build(&activities));
        assert_eq!(ids(&cycles), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_acyclic_chain_is_clean() {
        let activities = vec![act("A", "B", 1.0), act("B", "C", 1.0), act("C", "", 1.0)];
        assert!(detect_cycles(&DependencyGraph::build(&activities)).is_empty());
    }

    #[test]
    fn test_tail_outside_cycle_not_marked() {
        // D leads into the B <-> C loop but is not part of it
        let activities = vec![
            act("D", "B", 1.0),
            act("B", "C", 1.0),
            act("C", "B", 1.0),
            act("E", "", 1.0),
        ];
        let cycles = detect_cycles(&DependencyGraph::build(&activities));
        assert_eq!(ids(&cycles), vec!["B", "C"]);
    }

    #[test]
    fn test_self_dependency() {
        let activities = vec![act("A", "A", 1.0), act("B", "A", 1.0)];
        let cycles = detect_cycles(&DependencyGraph::build(&activities));
        assert_eq!(ids(&cycles), vec!["A"]);
    }
}
