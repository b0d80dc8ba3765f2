pub mod blocked;
pub mod cycles;
pub mod health;
pub mod topo;

use crate::activity::{Activity, ActivityStatus, DependencyType};
use crate::temporal::planned_duration_hours;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use blocked::{blocked_activities, BlockedActivity};
pub use cycles::detect_cycles;
pub use health::{dependency_health, missing_dependencies, DependencyHealth};
pub use topo::TopologicalOrder;

/// A node in the dependency graph, projected from one activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityNode {
    pub id: String,
    pub name: String,
    /// Position of the source record in the slice the graph was built from.
    pub record_index: usize,
    pub planned_duration_hours: f64,
    pub status: ActivityStatus,
}

/// Edge from a prerequisite to the activity that waits on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Declared type; carried for reporting only, scheduling treats every
    /// edge as finish-to-start.
    pub kind: DependencyType,
}

/// Prerequisite graph over the activities of one snapshot.
///
/// Edges point from prerequisite to dependent. Dependencies naming an id
/// outside the snapshot are left out; see [`missing_dependencies`] for those.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub graph: DiGraph<ActivityNode, DependencyEdge>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph. Records without an id are skipped, and for a
    /// repeated id only the first record is kept.
    pub fn build(activities: &[Activity]) -> Self {
        let mut dep_graph = Self::default();

        for (index, activity) in activities.iter().enumerate() {
            let id = activity.activity_id.as_str();
            if id.is_empty() {
                continue;
            }
            if dep_graph.node_map.contains_key(id) {
                log::warn!("ignoring duplicate activity id '{}' at record {}", id, index);
                continue;
            }
            let node = dep_graph.graph.add_node(ActivityNode {
                id: id.to_string(),
                name: activity.activity_name.clone(),
                record_index: index,
                planned_duration_hours: planned_duration_hours(activity),
                status: activity.activity_status,
            });
            dep_graph.node_map.insert(id.to_string(), node);
        }

        for (index, activity) in activities.iter().enumerate() {
            let Some(&target) = dep_graph.node_map.get(activity.activity_id.as_str()) else {
                continue;
            };
            if dep_graph.graph[target].record_index != index {
                continue;
            }
            for dependency in activity.dependency_ids() {
                if let Some(&source) = dep_graph.node_map.get(dependency) {
                    dep_graph.graph.add_edge(
                        source,
                        target,
                        DependencyEdge {
                            kind: activity.dependency_type,
                        },
                    );
                }
            }
        }

        log::debug!(
            "built dependency graph: {} activities, {} links",
            dep_graph.activity_count(),
            dep_graph.link_count()
        );
        dep_graph
    }

    pub fn activity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn get(&self, id: &str) -> Option<&ActivityNode> {
        self.node_map.get(id).map(|idx| &self.graph[*idx])
    }

    /// All activity ids in record order.
    pub fn activity_ids(&self) -> Vec<String> {
        self.graph.node_weights().map(|n| n.id.clone()).collect()
    }

    /// Prerequisites of `node` in the order the activity declared them.
    /// A prerequisite listed twice appears twice.
    pub fn prerequisites(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_neighbors(node, Direction::Incoming)
    }

    /// Activities waiting on `node`, in record order.
    pub fn dependents(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_neighbors(node, Direction::Outgoing)
    }

    /// Resolved prerequisite ids of an activity.
    pub fn prerequisite_ids(&self, id: &str) -> Vec<&str> {
        match self.node_map.get(id) {
            Some(&node) => self
                .prerequisites(node)
                .into_iter()
                .map(|p| self.graph[p].id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    // Edge indices grow with insertion, so sorting by them restores
    // declaration order.
    fn ordered_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                (edge.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, other)| other).collect()
    }

    /// Activities with no resolved prerequisites.
    pub fn root_activities(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
                    == 0
            })
            .collect()
    }

    /// Activities nothing else depends on.
    pub fn leaf_activities(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .count()
                    == 0
            })
            .collect()
    }

    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Kahn ordering with a best-effort tail for activities stuck in cycles.
    pub fn topological_order(&self) -> TopologicalOrder {
        topo::kahn_order(self)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::activity::Activity;

    pub fn act(id: &str, deps: &str, hours: f64) -> Activity {
        Activity {
            dependencies: deps.to_string(),
            planned_duration_hours: hours,
            ..Activity::new(id, format!("Activity {}", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::act;
    use super::*;

    #[test]
    fn test_build_drops_unknown_dependencies() {
        let activities = vec![act("A", "", 8.0), act("B", "A, ACT-9999", 4.0)];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(graph.activity_count(), 2);
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.prerequisite_ids("B"), vec!["A"]);
    }

    #[test]
    fn test_build_skips_blank_and_duplicate_ids() {
        let activities = vec![act("A", "", 8.0), act("", "A", 2.0), act("A", "", 99.0)];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(graph.activity_count(), 1);
        assert_eq!(graph.get("A").unwrap().planned_duration_hours, 8.0);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_prerequisites_keep_declaration_order() {
        let activities = vec![
            act("A", "", 1.0),
            act("B", "", 1.0),
            act("C", "", 1.0),
            act("D", "C, A, B", 1.0),
        ];
        let graph = DependencyGraph::build(&activities);
        assert_eq!(graph.prerequisite_ids("D"), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_roots_and_leaves() {
        let activities = vec![act("A", "", 1.0), act("B", "A", 1.0), act("C", "A", 1.0)];
        let graph = DependencyGraph::build(&activities);
        let roots: Vec<_> = graph.root_activities().iter().map(|&i| graph.graph[i].id.clone()).collect();
        let leaves: Vec<_> = graph.leaf_activities().iter().map(|&i| graph.graph[i].id.clone()).collect();
        assert_eq!(roots, vec!["A"]);
        assert_eq!(leaves, vec!["B", "C"]);
        assert!(!graph.has_cycle());
    }
}
