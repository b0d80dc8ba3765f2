use crate::activity::{
    Activity, DependencyType, MaterialCriticality, MaterialStatus, Priority, RiskLevel,
};
use crate::temporal::{delay_hours, effective_completion, expected_completion, planned_duration_hours};
use crate::units::{clamp, round_half_up};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity risk scorer.
///
/// A fixed additive heuristic over six factors:
/// - Delay against planned duration (max 40)
/// - Completion gap against the planned timeline (max 20)
/// - Priority (3-18)
/// - Material status and criticality (max 28)
/// - Dependency count and type (max 22)
/// - Cost overrun (max 10)
///
/// The weights are part of the reporting contract and are not tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub delay_score: f64,
    pub execution_score: f64,
    pub priority_weight: f64,
    pub material_weight: f64,
    pub dependency_weight: f64,
    pub cost_score: f64,

    /// Sum of all factors, clamped to 0-100 and rounded
    pub total: u8,
    pub level: RiskLevel,
}

pub fn priority_weight(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 18.0,
        Priority::High => 12.0,
        Priority::Medium => 7.0,
        Priority::Low => 3.0,
        Priority::Unrated => 5.0,
    }
}

pub fn material_risk_weight(activity: &Activity) -> f64 {
    let status = match activity.material_status {
        MaterialStatus::Delayed => 14.0,
        MaterialStatus::InTransit => 8.0,
        MaterialStatus::Ordered => 5.0,
        MaterialStatus::NotOrdered | MaterialStatus::Received => 0.0,
    };
    let criticality = match activity.material_criticality {
        MaterialCriticality::Critical => 14.0,
        MaterialCriticality::High => 8.0,
        MaterialCriticality::Medium => 4.0,
        MaterialCriticality::Low | MaterialCriticality::Unspecified => 0.0,
    };
    status + criticality
}

/// Counts every declared dependency, including ones that do not resolve.
pub fn dependency_risk_weight(activity: &Activity) -> f64 {
    let base = clamp(activity.dependency_ids().len() as f64 * 4.0, 0.0, 20.0);
    match activity.dependency_type {
        DependencyType::StartToStart => base + 2.0,
        DependencyType::FinishToFinish => base + 1.0,
        DependencyType::FinishToStart | DependencyType::Unspecified => base,
    }
}

pub fn cost_score(activity: &Activity) -> f64 {
    let variance = activity.actual_cost - activity.estimated_cost;
    if variance <= 0.0 {
        return 0.0;
    }
    clamp(variance / activity.estimated_cost.max(1.0) * 15.0, 0.0, 10.0)
}

/// Score one activity at `reference`, keeping each factor.
pub fn score_breakdown(activity: &Activity, reference: DateTime<Utc>) -> RiskBreakdown {
    let planned = planned_duration_hours(activity).max(1.0);
    let delay_ratio = delay_hours(activity, reference) / planned;
    let delay_score = clamp(delay_ratio * 45.0, 0.0, 40.0);

    let completion_gap =
        (expected_completion(activity, reference) - effective_completion(activity)).max(0.0);
    let execution_score = clamp(completion_gap * 0.35, 0.0, 20.0);

    let priority_weight = priority_weight(activity.priority);
    let material_weight = material_risk_weight(activity);
    let dependency_weight = dependency_risk_weight(activity);
    let cost_score = cost_score(activity);

    let sum = delay_score
        + execution_score
        + priority_weight
        + material_weight
        + dependency_weight
        + cost_score;
    let total = round_half_up(clamp(sum, 0.0, 100.0)) as u8;

    RiskBreakdown {
        delay_score,
        execution_score,
        priority_weight,
        material_weight,
        dependency_weight,
        cost_score,
        total,
        level: RiskLevel::from_score(total),
    }
}

pub fn risk_score(activity: &Activity, reference: DateTime<Utc>) -> u8 {
    score_breakdown(activity, reference).total
}
