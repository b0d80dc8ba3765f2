use super::{detect_cycles, DependencyGraph};
use crate::activity::Activity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Referential-integrity summary of a snapshot's dependency lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyHealth {
    pub missing_by_activity: BTreeMap<String, Vec<String>>,
    pub missing_dependency_links: usize,
    pub activities_with_missing_dependencies: usize,
    pub cycle_activity_ids: Vec<String>,
    pub cycle_count: usize,
}

impl DependencyHealth {
    pub fn is_clean(&self) -> bool {
        self.missing_dependency_links == 0 && self.cycle_count == 0
    }
}

/// Dependency ids that name no activity in the snapshot, per activity.
pub fn missing_dependencies(activities: &[Activity]) -> BTreeMap<String, Vec<String>> {
    let known: HashSet<&str> = activities
        .iter()
        .map(|a| a.activity_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();

    let mut missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for activity in activities {
        let unknown: Vec<String> = activity
            .dependency_ids()
            .into_iter()
            .filter(|dep| !known.contains(dep))
            .map(String::from)
            .collect();
        if !unknown.is_empty() {
            missing
                .entry(activity.activity_id.clone())
                .or_default()
                .extend(unknown);
        }
    }
    missing
}

pub fn dependency_health(activities: &[Activity]) -> DependencyHealth {
    let missing_by_activity = missing_dependencies(activities);
    let cycles = detect_cycles(&DependencyGraph::build(activities));

    DependencyHealth {
        missing_dependency_links: missing_by_activity.values().map(Vec::len).sum(),
        activities_with_missing_dependencies: missing_by_activity.len(),
        missing_by_activity,
        cycle_count: cycles.len(),
        cycle_activity_ids: cycles.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_support::act;

    #[test]
    fn test_missing_reference_reported_once() {
        let activities = vec![act("ACT-0001", "", 1.0), act("ACT-0002", "ACT-0001, ACT-9999", 1.0)];
        let missing = missing_dependencies(&activities);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing["ACT-0002"], vec!["ACT-9999"]);
    }

    #[test]
    fn test_health_summary_counts() {
        let activities = vec![
            act("A", "B, X1", 1.0),
            act("B", "A", 1.0),
            act("C", "X2, X3", 1.0),
        ];
        let health = dependency_health(&activities);
        assert_eq!(health.missing_dependency_links, 3);
        assert_eq!(health.activities_with_missing_dependencies, 2);
        assert_eq!(health.cycle_activity_ids, vec!["A", "B"]);
        assert_eq!(health.cycle_count, 2);
        assert!(!health.is_clean());
    }
}
