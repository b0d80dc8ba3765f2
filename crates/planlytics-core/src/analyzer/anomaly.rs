use super::report::Severity;
use crate::activity::{Activity, ActivityStatus, MaterialStatus};
use crate::graph::{dependency_health, DependencyHealth};
use crate::temporal::is_delayed;
use crate::units::clamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest edit distance at which an unknown dependency id is matched to an
/// existing one.
const MAX_HINT_DISTANCE: usize = 2;

/// A data-quality finding on one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRow {
    /// Machine-stable rule identifier.
    pub rule_id: String,
    pub activity_id: String,
    pub activity_name: String,
    pub severity: Severity,
    pub issue: String,
    pub details: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

struct RowContext<'a> {
    activity_id: &'a str,
    activity_name: &'a str,
}

impl RowContext<'_> {
    fn row(
        &self,
        rule_id: &str,
        severity: Severity,
        issue: &str,
        details: String,
        recommendation: &str,
    ) -> AnomalyRow {
        AnomalyRow {
            rule_id: rule_id.to_string(),
            activity_id: self.activity_id.to_string(),
            activity_name: self.activity_name.to_string(),
            severity,
            issue: issue.to_string(),
            details,
            recommendation: recommendation.to_string(),
            hint: None,
        }
    }
}

/// Run every anomaly rule over normalized (not enriched) activities.
///
/// Rows are ordered by severity, most severe first, then by activity id.
pub fn anomaly_rows(activities: &[Activity], reference: DateTime<Utc>) -> Vec<AnomalyRow> {
    let health = dependency_health(activities);
    let known_ids = hint_candidates(activities);

    let mut rows = Vec::new();
    for activity in activities {
        rows.extend(check_activity(activity, &health, &known_ids, reference));
    }

    rows.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| a.activity_id.cmp(&b.activity_id))
    });
    rows
}

fn check_activity(
    activity: &Activity,
    health: &DependencyHealth,
    known_ids: &[&str],
    reference: DateTime<Utc>,
) -> Vec<AnomalyRow> {
    let ctx = RowContext {
        activity_id: non_blank(&activity.activity_id, "UNKNOWN"),
        activity_name: non_blank(&activity.activity_name, "-"),
    };
    let mut rows = Vec::new();

    let completion = clamp(activity.completion_percentage, 0.0, 100.0);
    if activity.activity_status == ActivityStatus::Completed && completion < 100.0 {
        rows.push(ctx.row(
            "completed_without_full_completion",
            Severity::High,
            "Completed status but completion is below 100%",
            format!("Completion is {}%.", completion),
            "Set completion to 100% or correct the status.",
        ));
    }

    if let (Some(start), Some(end)) = (activity.actual_start_date, activity.actual_end_date) {
        if end < start {
            rows.push(ctx.row(
                "actual_end_before_start",
                Severity::Critical,
                "Actual end date is before actual start date",
                format!("{} is earlier than {}.", end, start),
                "Correct actual start/end dates before reporting progress.",
            ));
        }
    }

    if is_delayed(activity, reference) && activity.delay_reason.trim().is_empty() {
        rows.push(ctx.row(
            "delayed_without_root_cause",
            Severity::High,
            "Delayed activity has no root cause",
            "Delay reason field is blank.".to_string(),
            "Capture root cause and mitigation action.",
        ));
    }

    if let Some(missing) = health.missing_by_activity.get(&activity.activity_id) {
        let mut row = ctx.row(
            "missing_dependency_reference",
            Severity::Critical,
            "Missing dependency references detected",
            format!("Unknown dependency IDs: {}.", missing.join(", ")),
            "Correct dependency IDs or add missing predecessor activities.",
        );
        row.hint = dependency_hint(missing, known_ids);
        rows.push(row);
    }

    // cycle ids come sorted
    if health
        .cycle_activity_ids
        .binary_search(&activity.activity_id)
        .is_ok()
    {
        rows.push(ctx.row(
            "dependency_cycle_detected",
            Severity::Critical,
            "Dependency cycle detected",
            "Activity participates in a circular dependency loop.".to_string(),
            "Break the cycle by revising predecessor links.",
        ));
    }

    if activity.material_status == MaterialStatus::Received && activity.material_received_date.is_none() {
        rows.push(ctx.row(
            "received_without_date",
            Severity::Medium,
            "Material marked received without received date",
            "Material status is Received but materialReceivedDate is empty.".to_string(),
            "Enter the material received date for traceability.",
        ));
    }

    rows
}

fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Distinct non-blank ids in first-seen order, the same record the
/// dependency graph keeps for a repeated id.
fn hint_candidates(activities: &[Activity]) -> Vec<&str> {
    let mut seen = HashSet::new();
    activities
        .iter()
        .map(|a| a.activity_id.as_str())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect()
}

/// Suggest existing ids for unknown ones that look like typos.
fn dependency_hint(missing: &[String], known_ids: &[&str]) -> Option<String> {
    let suggestions: Vec<String> = missing
        .iter()
        .filter_map(|unknown| {
            closest_id(unknown, known_ids).map(|known| format!("'{}' -> '{}'", unknown, known))
        })
        .collect();
    if suggestions.is_empty() {
        return None;
    }
    Some(format!("Did you mean {}?", suggestions.join(", ")))
}

fn closest_id<'a>(unknown: &str, known_ids: &[&'a str]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;
    for &known in known_ids {
        let dist = strsim::damerau_levenshtein(unknown, known);
        if dist < best_distance && dist <= MAX_HINT_DISTANCE && dist > 0 {
            best_distance = dist;
            best_match = Some(known);
        }
    }
    best_match
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()
    }

    fn rule_ids(rows: &[AnomalyRow]) -> Vec<&str> {
        rows.iter().map(|r| r.rule_id.as_str()).collect()
    }

    #[test]
    fn test_clean_activity_has_no_anomalies() {
        let activities = vec![Activity::new("ACT-0001", "Clean")];
        assert!(anomaly_rows(&activities, reference()).is_empty());
    }

    #[test]
    fn test_completed_below_full_completion() {
        let activity = Activity {
            activity_status: ActivityStatus::Completed,
            completion_percentage: 80.0,
            ..Activity::new("ACT-0001", "Weld")
        };
        let rows = anomaly_rows(&[activity], reference());
        assert_eq!(rule_ids(&rows), vec!["completed_without_full_completion"]);
        assert_eq!(rows[0].details, "Completion is 80%.");
        assert_eq!(rows[0].severity, Severity::High);
    }

    #[test]
    fn test_end_before_start() {
        let activity = Activity {
            actual_start_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            actual_end_date: NaiveDate::from_ymd_opt(2026, 1, 3),
            delay_reason: "n/a".to_string(),
            ..Activity::new("ACT-0001", "Paint")
        };
        let rows = anomaly_rows(&[activity], reference());
        assert_eq!(rule_ids(&rows), vec!["actual_end_before_start"]);
        assert_eq!(rows[0].details, "2026-01-03 is earlier than 2026-01-05.");
    }

    #[test]
    fn test_delay_without_reason() {
        let late = Activity {
            planned_start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            planned_end_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            ..Activity::new("ACT-0001", "Late")
        };
        let explained = Activity {
            activity_id: "ACT-0002".to_string(),
            delay_reason: "Vendor slip".to_string(),
            ..late.clone()
        };
        let rows = anomaly_rows(&[late, explained], reference());
        assert_eq!(rule_ids(&rows), vec!["delayed_without_root_cause"]);
        assert_eq!(rows[0].activity_id, "ACT-0001");
    }

    #[test]
    fn test_missing_dependency_with_hint() {
        let activities = vec![
            Activity::new("ACT-0002", "Existing"),
            Activity {
                dependencies: "ACT-0020, ZZZ".to_string(),
                ..Activity::new("ACT-0003", "Dependent")
            },
        ];
        let rows = anomaly_rows(&activities, reference());
        assert_eq!(rule_ids(&rows), vec!["missing_dependency_reference"]);
        assert_eq!(rows[0].details, "Unknown dependency IDs: ACT-0020, ZZZ.");
        assert_eq!(rows[0].hint.as_deref(), Some("Did you mean 'ACT-0020' -> 'ACT-0002'?"));
    }

    #[test]
    fn test_hint_candidates_skip_repeats_and_blanks() {
        let activities = vec![
            Activity::new("ACT-0002", "First"),
            Activity::new("", "Blank"),
            Activity::new("ACT-0002", "Repeat"),
            Activity::new("ACT-0005", "Other"),
        ];
        assert_eq!(hint_candidates(&activities), vec!["ACT-0002", "ACT-0005"]);
    }

    #[test]
    fn test_hint_with_repeated_ids_names_each_match_once() {
        let activities = vec![
            Activity::new("ACT-0002", "Existing"),
            Activity::new("ACT-0002", "Existing again"),
            Activity {
                dependencies: "ACT-0020".to_string(),
                ..Activity::new("ACT-0003", "Dependent")
            },
        ];
        let rows = anomaly_rows(&activities, reference());
        let missing: Vec<_> = rows
            .iter()
            .filter(|r| r.rule_id == "missing_dependency_reference")
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].hint.as_deref(), Some("Did you mean 'ACT-0020' -> 'ACT-0002'?"));
    }

    #[test]
    fn test_cycle_and_material_rules() {
        let activities = vec![
            Activity {
                dependencies: "B".to_string(),
                material_status: MaterialStatus::Received,
                ..Activity::new("A", "First")
            },
            Activity {
                dependencies: "A".to_string(),
                ..Activity::new("B", "Second")
            },
        ];
        let rows = anomaly_rows(&activities, reference());
        assert_eq!(
            rule_ids(&rows),
            vec![
                "dependency_cycle_detected",
                "dependency_cycle_detected",
                "received_without_date"
            ]
        );
        assert_eq!(rows[0].activity_id, "A");
        assert_eq!(rows[1].activity_id, "B");
        assert_eq!(rows[2].severity, Severity::Medium);
    }

    #[test]
    fn test_placeholders_for_blank_identity() {
        let activity = Activity {
            activity_status: ActivityStatus::Completed,
            completion_percentage: 10.0,
            ..Activity::default()
        };
        let rows = anomaly_rows(&[activity], reference());
        assert_eq!(rows[0].activity_id, "UNKNOWN");
        assert_eq!(rows[0].activity_name, "-");
    }
}
