pub mod anomaly;
pub mod critical_path;
pub mod materials;
pub mod portfolio;
pub mod report;

use crate::activity::Activity;
use crate::enrich::enrich_activities;
use crate::graph::dependency_health;
use chrono::{DateTime, Utc};
use report::{AnalysisReport, SeverityCounts};

/// Run every portfolio analysis over a normalized snapshot and produce a
/// unified report.
pub fn analyze(activities: &[Activity], reference: DateTime<Utc>) -> AnalysisReport {
    let enriched = enrich_activities(activities, reference);
    let metrics = portfolio::metrics_from_enriched(&enriched, reference);
    let anomalies = anomaly::anomaly_rows(activities, reference);

    log::debug!(
        "analyzed {} activities: {} delayed, {} anomalies",
        metrics.total_activities,
        metrics.delayed,
        anomalies.len()
    );

    AnalysisReport {
        reference_date: reference.date_naive(),
        dependency_health: dependency_health(activities),
        risk_distribution: portfolio::risk_distribution(&enriched),
        phase_progress: portfolio::phase_progress(activities, reference),
        risk_register: portfolio::delay_and_risk_register(activities, reference),
        timeline: portfolio::timeline_bounds(activities, reference),
        anomalies: SeverityCounts::from_rows(&anomalies),
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::sample_dataset;
    use chrono::TimeZone;

    #[test]
    fn test_analyze_sample_dataset() {
        let reference = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let activities = sample_dataset(reference.date_naive());
        let report = analyze(&activities, reference);

        assert_eq!(report.metrics.total_activities, 3);
        assert_eq!(report.metrics.critical_path.path.len(), 3);
        assert!(report.dependency_health.is_clean());
        let dist = report.risk_distribution;
        assert_eq!(dist.critical + dist.high + dist.medium + dist.low, 3);
        assert_eq!(report.reference_date, reference.date_naive());
    }
}
