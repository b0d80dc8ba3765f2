use crate::activity::{Activity, MaterialCriticality, MaterialStatus};
use crate::enrich::enrich_activities;
use crate::units::date_start;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Material pipeline summary for a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialHealth {
    pub ownership_counts: BTreeMap<String, usize>,
    pub status_counts: BTreeMap<String, usize>,
    pub department_counts: BTreeMap<String, usize>,
    /// High or critical materials not yet received.
    pub pending_critical: Vec<MaterialRow>,
    /// Received after the required date, or overdue and still outstanding.
    pub late_materials: Vec<MaterialRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRow {
    pub activity_id: String,
    pub activity_name: String,
    pub required_materials: String,
    pub material_ownership: String,
    pub material_status: MaterialStatus,
    pub material_criticality: MaterialCriticality,
    pub material_required_date: Option<NaiveDate>,
    pub material_received_date: Option<NaiveDate>,
}

impl From<&Activity> for MaterialRow {
    fn from(a: &Activity) -> Self {
        Self {
            activity_id: a.activity_id.clone(),
            activity_name: a.activity_name.clone(),
            required_materials: a.required_materials.clone(),
            material_ownership: a.material_ownership.clone(),
            material_status: a.material_status,
            material_criticality: a.material_criticality,
            material_required_date: a.material_required_date,
            material_received_date: a.material_received_date,
        }
    }
}

fn count_by<F>(activities: &[Activity], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&Activity) -> String,
{
    let mut counts = BTreeMap::new();
    for activity in activities {
        *counts.entry(key(activity)).or_insert(0) += 1;
    }
    counts
}

fn or_label(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

pub fn is_pending_critical(activity: &Activity) -> bool {
    matches!(
        activity.material_criticality,
        MaterialCriticality::High | MaterialCriticality::Critical
    ) && activity.material_status != MaterialStatus::Received
}

/// Late against the required date. Without a required date nothing is late.
pub fn is_material_late(activity: &Activity, reference: DateTime<Utc>) -> bool {
    let Some(required) = activity.material_required_date else {
        return false;
    };
    match activity.material_received_date {
        Some(received) => received > required,
        None => date_start(required) < reference,
    }
}

pub fn material_health(activities: &[Activity], reference: DateTime<Utc>) -> MaterialHealth {
    let enriched = enrich_activities(activities, reference);

    MaterialHealth {
        ownership_counts: count_by(&enriched, |a| or_label(&a.material_ownership, "Unspecified")),
        status_counts: count_by(&enriched, |a| a.material_status.label().to_string()),
        department_counts: count_by(&enriched, |a| or_label(&a.resource_department, "Unassigned")),
        pending_critical: enriched
            .iter()
            .filter(|a| is_pending_critical(a))
            .map(MaterialRow::from)
            .collect(),
        late_materials: enriched
            .iter()
            .filter(|a| is_material_late(a, reference))
            .map(MaterialRow::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_material_health_counts_and_lists() {
        let activities = vec![
            Activity {
                material_ownership: "Client".to_string(),
                material_status: MaterialStatus::Ordered,
                material_criticality: MaterialCriticality::Critical,
                material_required_date: NaiveDate::from_ymd_opt(2026, 1, 8),
                resource_department: "Fabrication".to_string(),
                ..Activity::new("ACT-0001", "Housing")
            },
            Activity {
                material_status: MaterialStatus::Received,
                material_criticality: MaterialCriticality::High,
                material_required_date: NaiveDate::from_ymd_opt(2026, 1, 5),
                material_received_date: NaiveDate::from_ymd_opt(2026, 1, 6),
                ..Activity::new("ACT-0002", "Fixtures")
            },
            Activity {
                material_required_date: NaiveDate::from_ymd_opt(2026, 2, 1),
                ..Activity::new("ACT-0003", "Spares")
            },
        ];
        let health = material_health(&activities, reference());

        assert_eq!(health.ownership_counts["Client"], 1);
        assert_eq!(health.ownership_counts["Unspecified"], 2);
        assert_eq!(health.status_counts["Ordered"], 1);
        assert_eq!(health.status_counts["Received"], 1);
        assert_eq!(health.department_counts["Unassigned"], 2);

        let pending: Vec<_> = health.pending_critical.iter().map(|r| r.activity_id.as_str()).collect();
        assert_eq!(pending, vec!["ACT-0001"]);
        let late: Vec<_> = health.late_materials.iter().map(|r| r.activity_id.as_str()).collect();
        assert_eq!(late, vec!["ACT-0001", "ACT-0002"]);
    }
}
