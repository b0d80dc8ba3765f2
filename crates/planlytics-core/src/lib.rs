//! Planning analytics engine for activity-based project plans.
//!
//! The engine is pure: every entry point takes a snapshot of activity
//! records plus an explicit reference instant and returns derived data.
//! Nothing here reads the clock, touches storage or installs a logger.

pub mod activity;
pub mod analyzer;
pub mod config;
pub mod enrich;
pub mod error;
pub mod graph;
pub mod risk;
pub mod simulator;
pub mod temporal;
pub mod units;

pub use activity::{
    next_activity_id, normalize, normalize_all, normalize_row, parse_dependencies, sample_dataset,
    Activity, ActivityStatus, DependencyType, MaterialCriticality, MaterialStatus, Priority,
    RiskLevel,
};
pub use analyzer::anomaly::{anomaly_rows, AnomalyRow};
pub use analyzer::critical_path::{
    critical_path, critical_path_with_policy, find_critical_path, find_critical_path_strict,
    CriticalPath,
};
pub use analyzer::materials::{material_health, MaterialHealth};
pub use analyzer::portfolio::{
    compare_to_baseline, compute_portfolio_metrics, delay_and_risk_register, phase_progress,
    project_finish, risk_distribution, timeline_bounds, BaselineComparison, PortfolioMetrics,
    TimelineBounds,
};
pub use analyzer::report::{AnalysisReport, Severity};
pub use analyzer::analyze;
pub use config::{CyclePolicy, EngineConfig};
pub use enrich::{enrich_activities, enrich_activity, enrich_raw};
pub use error::{PlanError, Result};
pub use graph::{
    blocked_activities, dependency_health, detect_cycles, missing_dependencies, BlockedActivity,
    DependencyGraph, DependencyHealth,
};
pub use risk::{risk_score, score_breakdown, RiskBreakdown};
pub use simulator::{run_scenario_simulation, schedule_by_dependencies, Scenario, SimulationResult};

/// Decode a snapshot and normalize each record.
///
/// Accepts either a JSON array of records or an object whose `activities`
/// field holds one, the shape of a saved baseline. `today` fills in
/// `lastModifiedDate` when a record has none.
pub fn load_snapshot(json: &str, today: chrono::NaiveDate) -> Result<Vec<Activity>> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let records = match raw.get("activities") {
        Some(inner) if inner.is_array() => inner,
        _ => &raw,
    };
    Ok(normalize_all(records, today))
}
