use crate::activity::{normalize_all, Activity, RiskLevel};
use crate::risk::risk_score;
use crate::temporal::{
    actual_duration_hours, delay_hours, effective_completion, infer_status, planned_duration_hours,
};
use crate::units::round_to;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Recompute every derived field of an activity at `reference`.
///
/// Durations and delay are rounded to two decimals; the risk score is taken
/// over the rounded durations. `activity_status` becomes the inferred status.
pub fn enrich_activity(activity: &Activity, reference: DateTime<Utc>) -> Activity {
    let completion_percentage = effective_completion(activity);
    let planned_duration_hours = round_to(planned_duration_hours(activity), 2);
    let actual_duration_hours = round_to(actual_duration_hours(activity, reference), 2);
    let delay_hours = round_to(delay_hours(activity, reference), 2);

    let scored = Activity {
        completion_percentage,
        planned_duration_hours,
        actual_duration_hours,
        ..activity.clone()
    };
    let risk_score = risk_score(&scored, reference);

    Activity {
        completion_percentage,
        planned_duration_hours,
        actual_duration_hours,
        delay_hours,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        activity_status: infer_status(activity, reference),
        ..activity.clone()
    }
}

pub fn enrich_activities(activities: &[Activity], reference: DateTime<Utc>) -> Vec<Activity> {
    activities
        .iter()
        .map(|activity| enrich_activity(activity, reference))
        .collect()
}

/// Normalize a JSON array of raw records and enrich the result.
pub fn enrich_raw(raw: &Value, reference: DateTime<Utc>) -> Vec<Activity> {
    enrich_activities(&normalize_all(raw, reference.date_naive()), reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityStatus, MaterialCriticality, MaterialStatus, Priority};
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_enrichment_fills_derived_fields() {
        let activity = Activity {
            planned_start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            planned_end_date: NaiveDate::from_ymd_opt(2026, 1, 5),
            actual_start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            completion_percentage: 40.0,
            ..Activity::new("ACT-0001", "Assemble")
        };
        let enriched = enrich_activity(&activity, reference());
        assert_eq!(enriched.planned_duration_hours, 96.0);
        assert_eq!(enriched.actual_duration_hours, 216.0);
        assert_eq!(enriched.delay_hours, 120.0);
        assert_eq!(enriched.activity_status, ActivityStatus::Delayed);
        // delay 40 (capped) + gap 60 * 0.35 = 20 (capped) + priority 7
        assert_eq!(enriched.risk_score, 67);
        assert_eq!(enriched.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_enrichment_keeps_source_fields() {
        let activity = Activity {
            priority: Priority::Critical,
            material_status: MaterialStatus::Delayed,
            material_criticality: MaterialCriticality::Critical,
            remarks: "expedite".to_string(),
            ..Activity::new("ACT-0002", "Procure")
        };
        let enriched = enrich_activity(&activity, reference());
        assert_eq!(enriched.remarks, "expedite");
        assert_eq!(enriched.risk_score, 46);
        assert_eq!(enriched.risk_level, RiskLevel::Medium);
        assert_eq!(enriched.activity_status, ActivityStatus::NotStarted);
    }

    #[test]
    fn test_enrich_raw_normalizes_first() {
        let enriched = enrich_raw(
            &json!([{"activityId": " ACT-1 ", "completionPercentage": 250, "activityStatus": "completed"}]),
            reference(),
        );
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].activity_id, "ACT-1");
        assert_eq!(enriched[0].completion_percentage, 100.0);
        assert_eq!(enriched[0].activity_status, ActivityStatus::Completed);
    }
}
