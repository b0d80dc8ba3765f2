//! Duration, progress and delay derivations for a single activity.
//!
//! Every function takes the reference instant explicitly; the engine never
//! reads the wall clock.

use crate::activity::{Activity, ActivityStatus};
use crate::units::{clamp, date_start, hours_between};
use chrono::{DateTime, Utc};

/// Planned duration in hours.
///
/// Precedence: manual override, explicit planned duration, planned date
/// span, base effort.
pub fn planned_duration_hours(activity: &Activity) -> f64 {
    if activity.manual_override_duration > 0.0 {
        return activity.manual_override_duration;
    }
    if activity.planned_duration_hours > 0.0 {
        return activity.planned_duration_hours;
    }
    if let (Some(start), Some(end)) = (activity.planned_start_date, activity.planned_end_date) {
        let span = hours_between(date_start(start), date_start(end));
        if span > 0.0 {
            return span;
        }
    }
    activity.base_effort_hours.max(0.0)
}

/// Actual duration in hours; open activities are measured up to `reference`.
pub fn actual_duration_hours(activity: &Activity, reference: DateTime<Utc>) -> f64 {
    if activity.actual_duration_hours > 0.0 {
        return activity.actual_duration_hours;
    }
    match (activity.actual_start_date, activity.actual_end_date) {
        (Some(start), Some(end)) => hours_between(date_start(start), date_start(end)).max(0.0),
        (Some(start), None) if activity.activity_status != ActivityStatus::Completed => {
            hours_between(date_start(start), reference).max(0.0)
        }
        _ => 0.0,
    }
}

/// Share of the planned window elapsed at `reference`, 0-100.
pub fn expected_completion(activity: &Activity, reference: DateTime<Utc>) -> f64 {
    let (Some(start), Some(end)) = (activity.planned_start_date, activity.planned_end_date) else {
        return 0.0;
    };
    let (start, end) = (date_start(start), date_start(end));
    if reference <= start {
        return 0.0;
    }
    if reference >= end {
        return 100.0;
    }
    let total = hours_between(start, end);
    if total <= 0.0 {
        return 0.0;
    }
    clamp(hours_between(start, reference) / total * 100.0, 0.0, 100.0)
}

/// Stored completion, forced to 100 once the activity is finished.
pub fn effective_completion(activity: &Activity) -> f64 {
    if activity.activity_status == ActivityStatus::Completed || activity.actual_end_date.is_some() {
        return 100.0;
    }
    clamp(activity.completion_percentage, 0.0, 100.0)
}

/// Hours past the planned end date.
pub fn delay_hours(activity: &Activity, reference: DateTime<Utc>) -> f64 {
    let Some(planned_end) = activity.planned_end_date else {
        return 0.0;
    };
    let planned_end = date_start(planned_end);

    if let Some(actual_end) = activity.actual_end_date {
        return hours_between(planned_end, date_start(actual_end)).max(0.0);
    }
    if effective_completion(activity) >= 100.0
        || activity.activity_status == ActivityStatus::Completed
    {
        return 0.0;
    }
    hours_between(planned_end, reference).max(0.0)
}

pub fn is_delayed(activity: &Activity, reference: DateTime<Utc>) -> bool {
    activity.activity_status == ActivityStatus::Delayed || delay_hours(activity, reference) > 0.0
}

/// Status implied by the activity's dates and progress.
///
/// Completed beats Delayed beats In Progress; otherwise the stored status stands.
pub fn infer_status(activity: &Activity, reference: DateTime<Utc>) -> ActivityStatus {
    let completion = effective_completion(activity);
    if completion >= 100.0 || activity.actual_end_date.is_some() {
        return ActivityStatus::Completed;
    }
    if is_delayed(activity, reference) {
        return ActivityStatus::Delayed;
    }
    if activity.actual_start_date.is_some() || completion > 0.0 {
        return ActivityStatus::InProgress;
    }
    activity.activity_status
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn planned(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Activity {
        Activity {
            planned_start_date: start,
            planned_end_date: end,
            ..Activity::new("ACT-0001", "Test")
        }
    }

    #[test]
    fn test_planned_duration_from_date_span_beats_base_effort() {
        let activity = Activity {
            base_effort_hours: 10.0,
            ..planned(day(2026, 1, 1), day(2026, 1, 3))
        };
        assert_eq!(planned_duration_hours(&activity), 48.0);
    }

    #[test]
    fn test_manual_override_wins() {
        let activity = Activity {
            manual_override_duration: 8.0,
            planned_duration_hours: 96.0,
            base_effort_hours: 40.0,
            ..planned(day(2026, 1, 1), day(2026, 2, 1))
        };
        assert_eq!(planned_duration_hours(&activity), 8.0);
    }

    #[test]
    fn test_planned_duration_falls_back_to_base_effort() {
        let inverted = Activity {
            base_effort_hours: 12.0,
            ..planned(day(2026, 1, 5), day(2026, 1, 1))
        };
        assert_eq!(planned_duration_hours(&inverted), 12.0);

        let negative = Activity {
            base_effort_hours: -3.0,
            ..Activity::default()
        };
        assert_eq!(planned_duration_hours(&negative), 0.0);
    }

    #[test]
    fn test_actual_duration_open_activity_runs_to_reference() {
        let activity = Activity {
            actual_start_date: day(2026, 1, 1),
            activity_status: ActivityStatus::InProgress,
            ..Activity::default()
        };
        assert_eq!(actual_duration_hours(&activity, at(2026, 1, 2, 6)), 30.0);

        let completed = Activity {
            activity_status: ActivityStatus::Completed,
            ..activity.clone()
        };
        assert_eq!(actual_duration_hours(&completed, at(2026, 1, 2, 6)), 0.0);

        let closed = Activity {
            actual_end_date: day(2026, 1, 4),
            ..activity
        };
        assert_eq!(actual_duration_hours(&closed, at(2026, 1, 2, 6)), 72.0);
    }

    #[test]
    fn test_expected_completion_interpolates() {
        let activity = planned(day(2026, 1, 1), day(2026, 1, 5));
        assert_eq!(expected_completion(&activity, at(2025, 12, 31, 0)), 0.0);
        assert_eq!(expected_completion(&activity, at(2026, 1, 2, 0)), 25.0);
        assert_eq!(expected_completion(&activity, at(2026, 1, 5, 0)), 100.0);
        assert_eq!(expected_completion(&planned(day(2026, 1, 1), None), at(2026, 1, 2, 0)), 0.0);
    }

    #[test]
    fn test_effective_completion_forced_when_finished() {
        let activity = Activity {
            completion_percentage: 40.0,
            actual_end_date: day(2026, 1, 3),
            ..Activity::default()
        };
        assert_eq!(effective_completion(&activity), 100.0);
    }

    #[test]
    fn test_delay_hours() {
        let open = Activity {
            completion_percentage: 50.0,
            ..planned(day(2026, 1, 1), day(2026, 1, 3))
        };
        assert_eq!(delay_hours(&open, at(2026, 1, 4, 0)), 24.0);
        assert_eq!(delay_hours(&open, at(2026, 1, 2, 0)), 0.0);

        let finished_late = Activity {
            actual_end_date: day(2026, 1, 5),
            ..open.clone()
        };
        assert_eq!(delay_hours(&finished_late, at(2026, 2, 1, 0)), 48.0);

        let done = Activity {
            completion_percentage: 100.0,
            ..open
        };
        assert_eq!(delay_hours(&done, at(2026, 2, 1, 0)), 0.0);
        assert_eq!(delay_hours(&Activity::default(), at(2026, 2, 1, 0)), 0.0);
    }

    #[test]
    fn test_stored_delayed_status_counts_as_delayed() {
        let activity = Activity {
            activity_status: ActivityStatus::Delayed,
            ..Activity::default()
        };
        assert!(is_delayed(&activity, at(2026, 1, 1, 0)));
    }

    #[test]
    fn test_infer_status_precedence() {
        let reference = at(2026, 1, 10, 0);
        let base = planned(day(2026, 1, 1), day(2026, 1, 20));

        assert_eq!(infer_status(&base, reference), ActivityStatus::NotStarted);

        let started = Activity {
            actual_start_date: day(2026, 1, 2),
            ..base.clone()
        };
        assert_eq!(infer_status(&started, reference), ActivityStatus::InProgress);

        let late = Activity {
            completion_percentage: 30.0,
            ..planned(day(2026, 1, 1), day(2026, 1, 5))
        };
        assert_eq!(infer_status(&late, reference), ActivityStatus::Delayed);

        let finished = Activity {
            actual_end_date: day(2026, 1, 9),
            ..late
        };
        assert_eq!(infer_status(&finished, reference), ActivityStatus::Completed);

        let blocked = Activity {
            activity_status: ActivityStatus::Blocked,
            ..base
        };
        assert_eq!(infer_status(&blocked, reference), ActivityStatus::Blocked);
    }
}
