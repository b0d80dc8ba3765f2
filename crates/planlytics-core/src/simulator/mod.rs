use crate::activity::{Activity, MaterialStatus};
use crate::enrich::enrich_activities;
use crate::graph::DependencyGraph;
use crate::temporal::planned_duration_hours;
use crate::units::{add_hours, clamp, date_start, hours_between, round_to};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the scenarios available without any configuration.
pub const BUILT_IN_PRESETS: [&str; 3] = ["overtime", "manpower", "leadtime"];

/// A what-if adjustment applied uniformly to every activity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Extra crew, percent of the assigned crew (0-100).
    #[serde(alias = "manpowerBoostPct")]
    pub manpower_boost_pct: f64,
    /// Overtime per day, hours (0-12).
    #[serde(alias = "overtimeHoursPerDay")]
    pub overtime_hours_per_day: f64,
    /// Reduction of material lead time, percent (0-100).
    #[serde(alias = "leadTimeReductionPct")]
    pub lead_time_reduction_pct: f64,
}

impl Scenario {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn preset(name: &str) -> Option<Self> {
        let scenario = match name.trim().to_ascii_lowercase().as_str() {
            "overtime" => Self {
                overtime_hours_per_day: 3.0,
                ..Self::zero()
            },
            "manpower" => Self {
                manpower_boost_pct: 20.0,
                ..Self::zero()
            },
            "leadtime" => Self {
                lead_time_reduction_pct: 25.0,
                ..Self::zero()
            },
            _ => return None,
        };
        Some(scenario)
    }

    /// Bring every lever into its valid range; non-finite values become 0.
    pub fn clamped(self) -> Self {
        fn finite(value: f64) -> f64 {
            if value.is_finite() {
                value
            } else {
                0.0
            }
        }
        Self {
            manpower_boost_pct: clamp(finite(self.manpower_boost_pct), 0.0, 100.0),
            overtime_hours_per_day: clamp(finite(self.overtime_hours_per_day), 0.0, 12.0),
            lead_time_reduction_pct: clamp(finite(self.lead_time_reduction_pct), 0.0, 100.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Hours spent waiting on material that has not been received.
pub fn material_wait_penalty_hours(activity: &Activity, lead_reduction_pct: f64) -> f64 {
    if activity.material_status == MaterialStatus::Received {
        return 0.0;
    }
    let lead_time = activity.material_lead_time.max(0.0);
    lead_time * (1.0 - clamp(lead_reduction_pct, 0.0, 100.0) / 100.0)
}

/// Duration of one activity under `scenario`, never below one hour of work
/// plus any material wait.
pub fn adjusted_duration_hours(activity: &Activity, scenario: &Scenario) -> f64 {
    let scenario = scenario.clamped();
    let base_duration = planned_duration_hours(activity).max(1.0);

    let manpower_level = activity.assigned_manpower.max(1.0);
    let efficiency_gain =
        (scenario.manpower_boost_pct / 100.0) * (manpower_level / 4.0).min(1.5);
    let manpower_adjusted = base_duration / (1.0 + efficiency_gain);

    let overtime_gain =
        scenario.overtime_hours_per_day * (manpower_adjusted / 8.0).max(1.0) * 0.35;
    let production_adjusted = (manpower_adjusted - overtime_gain).max(1.0);

    production_adjusted + material_wait_penalty_hours(activity, scenario.lead_time_reduction_pct)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub activity_id: String,
    pub activity_name: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    /// Adjusted duration, one decimal.
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    /// One row per scheduled activity, in processing order.
    pub rows: Vec<ScheduleRow>,
    pub project_finish: Option<DateTime<Utc>>,
}

/// Forward pass over the dependency graph.
///
/// Each activity starts at the later of its planned start and the finish of
/// its latest known prerequisite. Activities without a planned start use
/// the earliest planned start in the snapshot, or `reference` when no
/// activity has one.
pub fn schedule_by_dependencies(
    activities: &[Activity],
    scenario: &Scenario,
    reference: DateTime<Utc>,
) -> Schedule {
    let enriched = enrich_activities(activities, reference);
    let graph = DependencyGraph::build(&enriched);
    let topo = graph.topological_order();

    let fallback_start = enriched
        .iter()
        .filter_map(|a| a.planned_start_date)
        .min()
        .map(date_start)
        .unwrap_or(reference);

    let mut finish_by_id: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut rows = Vec::with_capacity(topo.order.len());

    for &node in &topo.order {
        let activity = &enriched[graph.graph[node].record_index];

        let dependency_gate = activity
            .dependency_ids()
            .into_iter()
            .filter_map(|dep| finish_by_id.get(dep).copied())
            .max()
            .unwrap_or(fallback_start);
        let planned_start = activity
            .planned_start_date
            .map(date_start)
            .unwrap_or(fallback_start);
        let start = planned_start.max(dependency_gate);

        let duration = adjusted_duration_hours(activity, scenario);
        let finish = add_hours(start, duration);

        finish_by_id.insert(activity.activity_id.as_str(), finish);
        rows.push(ScheduleRow {
            activity_id: activity.activity_id.clone(),
            activity_name: activity.activity_name.clone(),
            start_date: start.date_naive(),
            finish_date: finish.date_naive(),
            duration_hours: round_to(duration, 1),
        });
    }

    Schedule {
        rows,
        project_finish: finish_by_id.values().max().copied(),
    }
}

/// Per-activity effect of a scenario against the zero-scenario baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityImpact {
    pub activity_id: String,
    pub activity_name: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub duration_hours: f64,
    pub baseline_duration_hours: f64,
    pub saved_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub scenario: Scenario,
    pub baseline_finish_date: Option<NaiveDate>,
    pub simulated_finish_date: Option<NaiveDate>,
    /// Hours the project finish moves earlier; negative when it slips.
    pub improvement_hours: f64,
    /// Sorted by saved hours, largest first.
    pub impacts: Vec<ActivityImpact>,
}

pub fn run_scenario_simulation(
    activities: &[Activity],
    scenario: &Scenario,
    reference: DateTime<Utc>,
) -> SimulationResult {
    let scenario = scenario.clamped();
    log::debug!(
        "simulating {} activities: manpower +{}%, overtime {} h/day, lead time -{}%",
        activities.len(),
        scenario.manpower_boost_pct,
        scenario.overtime_hours_per_day,
        scenario.lead_time_reduction_pct
    );

    let baseline = schedule_by_dependencies(activities, &Scenario::zero(), reference);
    let simulated = schedule_by_dependencies(activities, &scenario, reference);

    let baseline_by_id: HashMap<&str, &ScheduleRow> = baseline
        .rows
        .iter()
        .map(|row| (row.activity_id.as_str(), row))
        .collect();

    let mut impacts: Vec<ActivityImpact> = simulated
        .rows
        .iter()
        .filter_map(|row| {
            let base = baseline_by_id.get(row.activity_id.as_str())?;
            Some(ActivityImpact {
                activity_id: row.activity_id.clone(),
                activity_name: row.activity_name.clone(),
                start_date: row.start_date,
                finish_date: row.finish_date,
                duration_hours: row.duration_hours,
                baseline_duration_hours: base.duration_hours,
                saved_hours: round_to(base.duration_hours - row.duration_hours, 1),
            })
        })
        .collect();
    impacts.sort_by(|a, b| b.saved_hours.total_cmp(&a.saved_hours));

    let improvement_hours = match (baseline.project_finish, simulated.project_finish) {
        (Some(base), Some(sim)) => round_to(hours_between(sim, base), 1),
        _ => 0.0,
    };

    SimulationResult {
        scenario,
        baseline_finish_date: baseline.project_finish.map(|d| d.date_naive()),
        simulated_finish_date: simulated.project_finish.map(|d| d.date_naive()),
        improvement_hours,
        impacts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()
    }

    fn work(id: &str, deps: &str, hours: f64) -> Activity {
        Activity {
            dependencies: deps.to_string(),
            planned_duration_hours: hours,
            assigned_manpower: 4.0,
            ..Activity::new(id, format!("Work {}", id))
        }
    }

    #[test]
    fn test_presets_and_clamping() {
        assert_eq!(Scenario::preset("overtime").unwrap().overtime_hours_per_day, 3.0);
        assert_eq!(Scenario::preset("Manpower").unwrap().manpower_boost_pct, 20.0);
        assert_eq!(Scenario::preset("leadtime").unwrap().lead_time_reduction_pct, 25.0);
        assert!(Scenario::preset("weekend").is_none());

        let wild = Scenario {
            manpower_boost_pct: 250.0,
            overtime_hours_per_day: 30.0,
            lead_time_reduction_pct: f64::NAN,
        }
        .clamped();
        assert_eq!(wild.manpower_boost_pct, 100.0);
        assert_eq!(wild.overtime_hours_per_day, 12.0);
        assert_eq!(wild.lead_time_reduction_pct, 0.0);
    }

    #[test]
    fn test_zero_scenario_keeps_planned_duration() {
        let activity = work("A", "", 10.0);
        assert_eq!(adjusted_duration_hours(&activity, &Scenario::zero()), 10.0);
        // zero planned hours still takes one hour
        assert_eq!(adjusted_duration_hours(&work("B", "", 0.0), &Scenario::zero()), 1.0);
    }

    #[test]
    fn test_manpower_boost() {
        let activity = work("A", "", 12.0);
        let scenario = Scenario {
            manpower_boost_pct: 20.0,
            ..Scenario::zero()
        };
        // 12 / (1 + 0.2 * min(1.5, 4 / 4))
        assert!((adjusted_duration_hours(&activity, &scenario) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_overtime_gain() {
        let activity = Activity {
            assigned_manpower: 0.0,
            ..work("A", "", 16.0)
        };
        let scenario = Scenario {
            overtime_hours_per_day: 3.0,
            ..Scenario::zero()
        };
        // 16 - 3 * max(1, 16 / 8) * 0.35
        assert!((adjusted_duration_hours(&activity, &scenario) - 13.9).abs() < 1e-9);
    }

    #[test]
    fn test_material_penalty() {
        let ordered = Activity {
            material_lead_time: 24.0,
            material_status: MaterialStatus::Ordered,
            ..work("A", "", 8.0)
        };
        assert_eq!(material_wait_penalty_hours(&ordered, 25.0), 18.0);
        assert_eq!(adjusted_duration_hours(&ordered, &Scenario::zero()), 32.0);

        let received = Activity {
            material_status: MaterialStatus::Received,
            ..ordered
        };
        assert_eq!(material_wait_penalty_hours(&received, 0.0), 0.0);
    }

    #[test]
    fn test_schedule_gates_on_prerequisites() {
        let first = Activity {
            planned_start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            ..work("A", "", 24.0)
        };
        let second = work("B", "A", 10.0);
        let schedule = schedule_by_dependencies(&[second, first], &Scenario::zero(), reference());

        assert_eq!(schedule.rows[0].activity_id, "A");
        assert_eq!(schedule.rows[1].activity_id, "B");
        assert_eq!(schedule.rows[1].start_date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(
            schedule.project_finish,
            Some(Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_schedule_falls_back_to_reference_without_dates() {
        let schedule = schedule_by_dependencies(&[work("A", "", 5.0)], &Scenario::zero(), reference());
        assert_eq!(schedule.rows[0].start_date, reference().date_naive());
        assert_eq!(
            schedule.project_finish,
            Some(Utc.with_ymd_and_hms(2026, 1, 10, 5, 0, 0).unwrap())
        );
        assert!(schedule_by_dependencies(&[], &Scenario::zero(), reference())
            .project_finish
            .is_none());
    }

    #[test]
    fn test_simulation_reports_improvement_as_positive() {
        let activities = vec![
            Activity {
                planned_start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                ..work("A", "", 48.0)
            },
            work("B", "A", 9.0),
        ];
        let scenario = Scenario::preset("overtime").unwrap();
        let result = run_scenario_simulation(&activities, &scenario, reference());

        // A: 48 - 3 * 6 * 0.35 = 41.7, B: 9 - 3 * 1.125 * 0.35 = 7.81875
        assert_eq!(result.impacts[0].activity_id, "A");
        assert_eq!(result.impacts[0].saved_hours, 6.3);
        assert_eq!(result.impacts[1].saved_hours, 1.2);
        assert_eq!(result.improvement_hours, 7.5);
        assert_eq!(result.baseline_finish_date, NaiveDate::from_ymd_opt(2026, 1, 3));
    }

    #[test]
    fn test_zero_scenario_changes_nothing() {
        let activities = vec![work("A", "", 10.0), work("B", "A", 6.0)];
        let result = run_scenario_simulation(&activities, &Scenario::zero(), reference());
        assert_eq!(result.improvement_hours, 0.0);
        assert!(result.impacts.iter().all(|i| i.saved_hours == 0.0));
        assert_eq!(result.baseline_finish_date, result.simulated_finish_date);
    }
}
