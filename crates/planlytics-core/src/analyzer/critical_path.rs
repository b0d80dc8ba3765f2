use crate::activity::Activity;
use crate::config::CyclePolicy;
use crate::error::{PlanError, Result};
use crate::graph::{detect_cycles, DependencyGraph};
use crate::units::round_half_up;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Longest chain of dependency-linked activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// Activity ids from the first activity to the terminal one.
    pub path: Vec<String>,
    /// Finish time of the terminal activity, whole hours.
    pub duration_hours: f64,
}

impl CriticalPath {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Find the critical path through the dependency graph.
///
/// Longest path over planned durations. Dependency types do not offset
/// timing; an edge only means "after". On ties the earlier declared
/// prerequisite, and the earlier terminal in processing order, win. A
/// cyclic graph still yields a path, computed over the fallback order.
pub fn find_critical_path(graph: &DependencyGraph) -> CriticalPath {
    let g = &graph.graph;
    let topo = graph.topological_order();
    let mut finish = vec![0.0_f64; g.node_count()];
    let mut predecessor: Vec<Option<NodeIndex>> = vec![None; g.node_count()];

    for &node in &topo.order {
        let mut best_finish = 0.0;
        let mut best_dependency = None;
        for dependency in graph.prerequisites(node) {
            let dependency_finish = finish[dependency.index()];
            if dependency_finish > best_finish {
                best_finish = dependency_finish;
                best_dependency = Some(dependency);
            }
        }
        finish[node.index()] = best_finish + g[node].planned_duration_hours;
        predecessor[node.index()] = best_dependency;
    }

    let mut terminal = None;
    let mut longest_finish = 0.0;
    for &node in &topo.order {
        if finish[node.index()] > longest_finish {
            longest_finish = finish[node.index()];
            terminal = Some(node);
        }
    }

    let mut path = Vec::new();
    let mut cursor = terminal;
    while let Some(node) = cursor {
        // predecessors are always processed earlier, so the walk ends;
        // the bound only guards against a broken invariant
        if path.len() > g.node_count() {
            break;
        }
        path.push(g[node].id.clone());
        cursor = predecessor[node.index()];
    }
    path.reverse();

    CriticalPath {
        path,
        duration_hours: round_half_up(longest_finish),
    }
}

/// Like [`find_critical_path`], but a cycle is an error naming its members.
pub fn find_critical_path_strict(graph: &DependencyGraph) -> Result<CriticalPath> {
    let cycles = detect_cycles(graph);
    if !cycles.is_empty() {
        return Err(PlanError::CyclicDependency {
            activity_ids: cycles.into_iter().collect(),
        });
    }
    Ok(find_critical_path(graph))
}

pub fn critical_path_with_policy(
    graph: &DependencyGraph,
    policy: CyclePolicy,
) -> Result<CriticalPath> {
    match policy {
        CyclePolicy::BestEffort => Ok(find_critical_path(graph)),
        CyclePolicy::Reject => find_critical_path_strict(graph),
    }
}

/// Critical path over a slice of activities. Pass enriched activities to
/// get durations rounded the way reports show them.
pub fn critical_path(activities: &[Activity]) -> CriticalPath {
    find_critical_path(&DependencyGraph::build(activities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::act;

    fn diamond(b_hours: f64, c_hours: f64) -> Vec<Activity> {
        vec![
            act("A", "", 8.0),
            act("B", "A", b_hours),
            act("C", "A", c_hours),
            act("D", "B, C", 2.0),
        ]
    }

    #[test]
    fn test_critical_path_linear() {
        let activities = vec![act("a", "", 3.0), act("b", "a", 4.0), act("c", "b", 5.0)];
        let cp = critical_path(&activities);
        assert_eq!(cp.path, vec!["a", "b", "c"]);
        assert_eq!(cp.duration_hours, 12.0);
    }

    #[test]
    fn test_diamond_takes_longer_branch() {
        let cp = critical_path(&diamond(10.0, 4.0));
        assert_eq!(cp.path, vec!["A", "B", "D"]);
        assert_eq!(cp.duration_hours, 20.0);

        let cp = critical_path(&diamond(4.0, 10.0));
        assert_eq!(cp.path, vec!["A", "C", "D"]);
        assert_eq!(cp.duration_hours, 20.0);
    }

    #[test]
    fn test_tie_goes_to_first_declared_prerequisite() {
        let cp = critical_path(&diamond(6.0, 6.0));
        assert_eq!(cp.path, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_duration_is_rounded_to_whole_hours() {
        let activities = vec![act("A", "", 2.25), act("B", "A", 2.25)];
        assert_eq!(critical_path(&activities).duration_hours, 5.0);
    }

    #[test]
    fn test_empty_and_zero_duration_inputs() {
        assert!(critical_path(&[]).is_empty());
        let zeros = vec![act("A", "", 0.0), act("B", "A", 0.0)];
        let cp = critical_path(&zeros);
        assert!(cp.path.is_empty());
        assert_eq!(cp.duration_hours, 0.0);
    }

    #[test]
    fn test_cycle_best_effort_and_reject() {
        let activities = vec![
            act("A", "C", 5.0),
            act("B", "A", 5.0),
            act("C", "B", 5.0),
        ];
        let graph = DependencyGraph::build(&activities);

        let cp = critical_path_with_policy(&graph, CyclePolicy::BestEffort).unwrap();
        assert_eq!(cp.path, vec!["A", "B", "C"]);
        assert_eq!(cp.duration_hours, 15.0);

        match critical_path_with_policy(&graph, CyclePolicy::Reject) {
            Err(PlanError::CyclicDependency { activity_ids }) => {
                assert_eq!(activity_ids, vec!["A", "B", "C"]);
            }
            other => panic!("expected cyclic dependency error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_accepts_acyclic_graph() {
        let graph = DependencyGraph::build(&diamond(10.0, 4.0));
        assert_eq!(find_critical_path_strict(&graph).unwrap().duration_hours, 20.0);
    }
}
