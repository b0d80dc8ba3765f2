use crate::activity::{Activity, ActivityStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedActivity {
    pub activity_id: String,
    pub activity_name: String,
    /// Known prerequisites that are not yet completed, in declaration order.
    pub blocking_dependencies: Vec<String>,
}

/// Activities waiting on at least one known, unfinished prerequisite.
///
/// Pass enriched activities so the check runs against inferred status.
/// Unknown dependency ids never block.
pub fn blocked_activities(activities: &[Activity]) -> Vec<BlockedActivity> {
    let by_id: HashMap<&str, &Activity> = activities
        .iter()
        .map(|a| (a.activity_id.as_str(), a))
        .collect();

    activities
        .iter()
        .filter_map(|activity| {
            let blocking: Vec<String> = activity
                .dependency_ids()
                .into_iter()
                .filter(|dep| {
                    by_id
                        .get(dep)
                        .is_some_and(|p| p.activity_status != ActivityStatus::Completed)
                })
                .map(String::from)
                .collect();
            if blocking.is_empty() {
                return None;
            }
            Some(BlockedActivity {
                activity_id: activity.activity_id.clone(),
                activity_name: activity.activity_name.clone(),
                blocking_dependencies: blocking,
            })
        })
        .collect()
}
