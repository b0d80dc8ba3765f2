use super::critical_path::{critical_path, CriticalPath};
use crate::activity::{Activity, ActivityStatus, RiskLevel};
use crate::enrich::enrich_activities;
use crate::graph::{blocked_activities, BlockedActivity};
use crate::temporal::{is_delayed, planned_duration_hours};
use crate::units::{add_hours, date_start, hours_between, round_to};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Risk score at or above which an activity counts as high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 55;

/// Portfolio roll-up of one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_activities: usize,
    pub delayed: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub high_risk: usize,
    /// Mean completion percentage, one decimal.
    pub avg_completion: f64,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    /// Actual minus estimated.
    pub cost_variance: f64,
    pub critical_path: CriticalPath,
    pub blocked_activities: Vec<BlockedActivity>,
}

pub fn compute_portfolio_metrics(activities: &[Activity], reference: DateTime<Utc>) -> PortfolioMetrics {
    metrics_from_enriched(&enrich_activities(activities, reference), reference)
}

/// Roll up activities that have already been enriched at `reference`.
pub fn metrics_from_enriched(enriched: &[Activity], reference: DateTime<Utc>) -> PortfolioMetrics {
    let count_status = |status: ActivityStatus| {
        enriched
            .iter()
            .filter(|a| a.activity_status == status)
            .count()
    };

    let avg_completion = if enriched.is_empty() {
        0.0
    } else {
        let total: f64 = enriched.iter().map(|a| a.completion_percentage).sum();
        round_to(total / enriched.len() as f64, 1)
    };
    let estimated_cost: f64 = enriched.iter().map(|a| a.estimated_cost).sum();
    let actual_cost: f64 = enriched.iter().map(|a| a.actual_cost).sum();

    PortfolioMetrics {
        total_activities: enriched.len(),
        delayed: enriched.iter().filter(|a| is_delayed(a, reference)).count(),
        completed: count_status(ActivityStatus::Completed),
        in_progress: count_status(ActivityStatus::InProgress),
        blocked: count_status(ActivityStatus::Blocked),
        high_risk: enriched
            .iter()
            .filter(|a| a.risk_score >= HIGH_RISK_THRESHOLD)
            .count(),
        avg_completion,
        estimated_cost,
        actual_cost,
        cost_variance: actual_cost - estimated_cost,
        critical_path: critical_path(enriched),
        blocked_activities: blocked_activities(enriched),
    }
}

/// Number of activities in each risk band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn risk_distribution(enriched: &[Activity]) -> RiskDistribution {
    let mut dist = RiskDistribution::default();
    for activity in enriched {
        match RiskLevel::from_score(activity.risk_score) {
            RiskLevel::Critical => dist.critical += 1,
            RiskLevel::High => dist.high += 1,
            RiskLevel::Medium => dist.medium += 1,
            RiskLevel::Low => dist.low += 1,
        }
    }
    dist
}

/// An activity worth watching: delayed or high risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRegisterRow {
    pub activity_id: String,
    pub activity_name: String,
    pub phase: String,
    pub activity_status: ActivityStatus,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub delay_hours: f64,
    pub delay_reason: String,
}

/// Delayed or high-risk activities, riskiest first.
pub fn delay_and_risk_register(activities: &[Activity], reference: DateTime<Utc>) -> Vec<RiskRegisterRow> {
    let mut rows: Vec<RiskRegisterRow> = enrich_activities(activities, reference)
        .into_iter()
        .filter(|a| is_delayed(a, reference) || a.risk_score >= HIGH_RISK_THRESHOLD)
        .map(|a| RiskRegisterRow {
            activity_id: a.activity_id,
            activity_name: a.activity_name,
            phase: a.phase,
            activity_status: a.activity_status,
            risk_score: a.risk_score,
            risk_level: a.risk_level,
            delay_hours: a.delay_hours,
            delay_reason: a.delay_reason,
        })
        .collect();
    rows.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseProgress {
    pub phase: String,
    pub activity_count: usize,
    pub avg_completion: f64,
    pub delayed_activities: usize,
}

/// Progress per phase, phases in first-seen order. Blank phases are
/// grouped as "Unassigned".
pub fn phase_progress(activities: &[Activity], reference: DateTime<Utc>) -> Vec<PhaseProgress> {
    struct Bucket {
        phase: String,
        count: usize,
        completion: f64,
        delayed: usize,
    }

    let mut buckets: Vec<Bucket> = Vec::new();
    for activity in enrich_activities(activities, reference) {
        let phase = match activity.phase.trim() {
            "" => "Unassigned",
            phase => phase,
        };
        let index = match buckets.iter().position(|b| b.phase == phase) {
            Some(index) => index,
            None => {
                buckets.push(Bucket {
                    phase: phase.to_string(),
                    count: 0,
                    completion: 0.0,
                    delayed: 0,
                });
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[index];
        bucket.count += 1;
        bucket.completion += activity.completion_percentage;
        if is_delayed(&activity, reference) {
            bucket.delayed += 1;
        }
    }

    buckets
        .into_iter()
        .map(|b| PhaseProgress {
            avg_completion: round_to(b.completion / b.count as f64, 1),
            phase: b.phase,
            activity_count: b.count,
            delayed_activities: b.delayed,
        })
        .collect()
}

/// Window covering every dated activity, padded by a day on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBounds {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

/// Timeline window of a snapshot.
///
/// Planned dates are preferred over actual ones. An activity with a start
/// but no end reaches to start plus its planned duration. Without any start
/// or end date the window is three days before to fourteen days after
/// `reference`.
pub fn timeline_bounds(activities: &[Activity], reference: DateTime<Utc>) -> TimelineBounds {
    let mut starts = Vec::new();
    let mut ends = Vec::new();

    for activity in enrich_activities(activities, reference) {
        let start = activity
            .planned_start_date
            .or(activity.actual_start_date)
            .map(date_start);
        let end = activity
            .planned_end_date
            .or(activity.actual_end_date)
            .map(date_start);
        if let Some(start) = start {
            starts.push(start);
        }
        if let Some(end) = end {
            ends.push(end);
        }
        if let (Some(start), None) = (start, end) {
            ends.push(add_hours(start, planned_duration_hours(&activity)));
        }
    }

    match (starts.iter().min(), ends.iter().max()) {
        (Some(&min), Some(&max)) => TimelineBounds {
            min: shift_days(min, -1),
            max: shift_days(max, 1),
        },
        _ => TimelineBounds {
            min: shift_days(reference, -3),
            max: shift_days(reference, 14),
        },
    }
}

/// Move by whole days, staying put at the edge of the calendar.
fn shift_days(instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    instant
        .checked_add_signed(Duration::days(days))
        .unwrap_or(instant)
}

/// Projected finish: the upper timeline bound over activities carrying at
/// least one date. `None` when no activity is dated.
pub fn project_finish(activities: &[Activity], reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let dated: Vec<Activity> = activities
        .iter()
        .filter(|a| {
            a.planned_start_date.is_some()
                || a.planned_end_date.is_some()
                || a.actual_start_date.is_some()
                || a.actual_end_date.is_some()
        })
        .cloned()
        .collect();
    if dated.is_empty() {
        return None;
    }
    Some(timeline_bounds(&dated, reference).max)
}

/// Baseline and current value of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricVariance {
    pub baseline: f64,
    pub current: f64,
    /// Current minus baseline.
    pub variance: f64,
}

impl MetricVariance {
    fn new(baseline: f64, current: f64) -> Self {
        Self {
            baseline,
            current,
            variance: current - baseline,
        }
    }
}

/// Drift of the current snapshot from a locked baseline snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineComparison {
    pub activities: MetricVariance,
    pub avg_completion: MetricVariance,
    pub delayed: MetricVariance,
    pub high_risk: MetricVariance,
    pub estimated_cost: MetricVariance,
    pub actual_cost: MetricVariance,
    pub baseline_finish: Option<NaiveDate>,
    pub current_finish: Option<NaiveDate>,
    /// Hours the projected finish moved, one decimal; positive is later.
    /// `None` unless both snapshots have a projected finish.
    pub finish_variance_hours: Option<f64>,
}

pub fn compare_to_baseline(
    baseline: &[Activity],
    current: &[Activity],
    reference: DateTime<Utc>,
) -> BaselineComparison {
    let base = compute_portfolio_metrics(baseline, reference);
    let now = compute_portfolio_metrics(current, reference);
    let baseline_finish = project_finish(baseline, reference);
    let current_finish = project_finish(current, reference);

    let avg_completion = MetricVariance {
        variance: round_to(now.avg_completion - base.avg_completion, 1),
        ..MetricVariance::new(base.avg_completion, now.avg_completion)
    };

    BaselineComparison {
        activities: MetricVariance::new(base.total_activities as f64, now.total_activities as f64),
        avg_completion,
        delayed: MetricVariance::new(base.delayed as f64, now.delayed as f64),
        high_risk: MetricVariance::new(base.high_risk as f64, now.high_risk as f64),
        estimated_cost: MetricVariance::new(base.estimated_cost, now.estimated_cost),
        actual_cost: MetricVariance::new(base.actual_cost, now.actual_cost),
        baseline_finish: baseline_finish.map(|d| d.date_naive()),
        current_finish: current_finish.map(|d| d.date_naive()),
        finish_variance_hours: match (baseline_finish, current_finish) {
            (Some(b), Some(c)) => Some(round_to(hours_between(b, c), 1)),
            _ => None,
        },
    }
}
