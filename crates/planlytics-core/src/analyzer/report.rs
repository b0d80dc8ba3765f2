use super::anomaly::AnomalyRow;
use super::portfolio::{PhaseProgress, PortfolioMetrics, RiskDistribution, RiskRegisterRow, TimelineBounds};
use crate::graph::DependencyHealth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for data-quality findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Sort key, higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Anomaly totals per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_rows(rows: &[AnomalyRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// One-call portfolio report for a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub reference_date: NaiveDate,
    pub metrics: PortfolioMetrics,
    pub dependency_health: DependencyHealth,
    pub risk_distribution: RiskDistribution,
    pub phase_progress: Vec<PhaseProgress>,
    pub risk_register: Vec<RiskRegisterRow>,
    pub timeline: TimelineBounds,
    pub anomalies: SeverityCounts,
}

impl AnalysisReport {
    pub fn completion_rate(&self) -> f64 {
        if self.metrics.total_activities == 0 {
            return 0.0;
        }
        self.metrics.completed as f64 / self.metrics.total_activities as f64 * 100.0
    }

    pub fn has_data_quality_issues(&self) -> bool {
        !self.dependency_health.is_clean() || self.anomalies.total() > 0
    }
}

/// Signed number with one decimal, e.g. `+2.5 h` or `-3`.
pub fn format_signed(value: f64, suffix: &str) -> String {
    let number = crate::units::round_to(if value.is_finite() { value } else { 0.0 }, 1);
    let sign = if number > 0.0 { "+" } else { "" };
    format!("{}{}{}", sign, number, suffix)
}

/// Currency amount with thousands separators and two decimals.
pub fn format_currency(amount: f64) -> String {
    let cents = crate::units::round_half_up(amount.abs() * 100.0) as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_orders_critical_first() {
        let mut all = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        all.sort_by_key(|s| std::cmp::Reverse(s.rank()));
        assert_eq!(all, Severity::ALL.to_vec());
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(2.0, ""), "+2");
        assert_eq!(format_signed(-3.25, " h"), "-3.2 h");
        assert_eq!(format_signed(0.0, "%"), "0%");
        assert_eq!(format_signed(12.34, "%"), "+12.3%");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(-950.5), "-950.50");
        assert_eq!(format_currency(100.0), "100.00");
    }
}
