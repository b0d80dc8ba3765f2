use colored::*;
use planlytics_core::analyzer::materials::{MaterialHealth, MaterialRow};
use planlytics_core::analyzer::portfolio::{BaselineComparison, MetricVariance};
use planlytics_core::analyzer::report::{format_currency, format_signed, AnalysisReport};
use planlytics_core::units::format_hours;
use planlytics_core::{AnomalyRow, CriticalPath, DependencyGraph, RiskLevel, Severity, SimulationResult};
use std::collections::BTreeMap;
use std::path::Path;

fn header(title: &str) {
    println!();
    println!(
        "{}",
        format!(" Planlytics v{} - {}", env!("CARGO_PKG_VERSION"), title).bold()
    );
    println!();
}

fn section(title: &str) {
    println!(" {}", title.bold().underline());
}

fn separator() {
    println!(" {}", "=".repeat(60).dimmed());
    println!();
}

fn severity_tag(severity: Severity) -> String {
    let tag = format!(" {} ", severity.symbol());
    match severity {
        Severity::Critical => tag.on_red().white().bold().to_string(),
        Severity::High => tag.on_yellow().black().bold().to_string(),
        Severity::Medium => tag.on_blue().white().bold().to_string(),
        Severity::Low => tag.dimmed().to_string(),
    }
}

fn risk_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Critical => level.label().red().bold(),
        RiskLevel::High => level.label().yellow().bold(),
        RiskLevel::Medium => level.label().yellow(),
        RiskLevel::Low => level.label().green(),
    }
}

fn count(value: usize, alarm: fn(String) -> ColoredString) -> String {
    if value > 0 {
        alarm(value.to_string()).to_string()
    } else {
        "0".to_string()
    }
}

/// Print a full portfolio report to the terminal.
pub fn print_analysis_report(report: &AnalysisReport, source: &Path) {
    header(&format!("Analyzing {}", source.display()));
    let m = &report.metrics;

    section("Portfolio");
    println!(
        " {} {} activities, {} completed, {} in progress",
        "|-".dimmed(),
        m.total_activities,
        m.completed,
        m.in_progress
    );
    println!(
        " {} Delayed: {}  Blocked: {}  High risk: {}",
        "|-".dimmed(),
        count(m.delayed, |s| s.red().bold()),
        count(m.blocked, |s| s.yellow().bold()),
        count(m.high_risk, |s| s.red().bold()),
    );
    println!(" {} Average completion: {}%", "|-".dimmed(), m.avg_completion);
    println!(
        " {} Cost: {} estimated, {} actual ({})",
        "|-".dimmed(),
        format_currency(m.estimated_cost),
        format_currency(m.actual_cost),
        if m.cost_variance > 0.0 {
            format!("+{}", format_currency(m.cost_variance)).red().to_string()
        } else {
            format_currency(m.cost_variance).green().to_string()
        }
    );
    if m.critical_path.is_empty() {
        println!(" {} Critical path: -", "|-".dimmed());
    } else {
        println!(
            " {} Critical path: {} ({})",
            "|-".dimmed(),
            m.critical_path.path.join(" -> "),
            format_hours(m.critical_path.duration_hours)
        );
    }
    println!(
        " {} Timeline: {} to {}",
        "|-".dimmed(),
        report.timeline.min.date_naive(),
        report.timeline.max.date_naive()
    );
    println!();

    separator();

    section("Risk");
    let dist = &report.risk_distribution;
    println!(
        " {} {} critical, {} high, {} medium, {} low",
        "|-".dimmed(),
        count(dist.critical, |s| s.red().bold()),
        count(dist.high, |s| s.yellow().bold()),
        dist.medium,
        dist.low
    );
    for row in report.risk_register.iter().take(10) {
        println!(
            " {} {:<10} {:>3} {:<8} {}{}",
            "|-".dimmed(),
            row.activity_id,
            row.risk_score,
            risk_label(row.risk_level),
            row.activity_name,
            if row.delay_hours > 0.0 {
                format!(" (late {})", format_hours(row.delay_hours)).red().to_string()
            } else {
                String::new()
            }
        );
    }
    if report.risk_register.len() > 10 {
        println!(
            " {} ... and {} more",
            "|-".dimmed(),
            report.risk_register.len() - 10
        );
    }
    println!();

    if !report.phase_progress.is_empty() {
        section("Phases");
        for phase in &report.phase_progress {
            println!(
                " {} {:<20} {:>3} activities  {:>5}% done  {} delayed",
                "|-".dimmed(),
                phase.phase,
                phase.activity_count,
                phase.avg_completion,
                count(phase.delayed_activities, |s| s.red())
            );
        }
        println!();
    }

    if !m.blocked_activities.is_empty() {
        section("Blocked");
        for blocked in &m.blocked_activities {
            println!(
                " {} {} {} waits on {}",
                "|-".dimmed(),
                blocked.activity_id.yellow(),
                blocked.activity_name,
                blocked.blocking_dependencies.join(", ").cyan()
            );
        }
        println!();
    }

    separator();

    section("Data Quality");
    let health = &report.dependency_health;
    if health.is_clean() && report.anomalies.total() == 0 {
        println!(" {} No data-quality issues detected.", "OK".green().bold());
    } else {
        println!(
            " {} Missing dependency links: {} across {} activities",
            "|-".dimmed(),
            count(health.missing_dependency_links, |s| s.red().bold()),
            health.activities_with_missing_dependencies
        );
        if health.cycle_count > 0 {
            println!(
                " {} Dependency cycle through: {}",
                "|-".dimmed(),
                health.cycle_activity_ids.join(", ").red()
            );
        }
        let a = &report.anomalies;
        println!(
            " {} Anomalies: {} critical, {} high, {} medium, {} low",
            "|-".dimmed(),
            count(a.critical, |s| s.red().bold()),
            count(a.high, |s| s.yellow().bold()),
            a.medium,
            a.low
        );
    }
    println!();

    let file = source.display().to_string();
    if report.has_data_quality_issues() {
        println!(
            " Run {} for details",
            format!("planlytics anomalies {}", file).cyan()
        );
    }
    println!(
        " Run {} to test a what-if scenario",
        format!("planlytics simulate {} --preset overtime", file).cyan()
    );
    println!();
}

pub fn print_anomalies(rows: &[AnomalyRow], source: &Path) {
    header(&format!("Anomalies in {}", source.display()));

    if rows.is_empty() {
        println!(" {} No anomalies detected.", "OK".green().bold());
        println!();
        return;
    }

    for row in rows {
        println!(
            " {} {} {}",
            severity_tag(row.severity),
            row.activity_id.bold(),
            row.issue.bold()
        );
        println!("   {} {}", "|".dimmed(), row.activity_name);
        println!("   {} {}", "|".dimmed(), row.details);
        if let Some(hint) = &row.hint {
            println!("   {} {}", "|".dimmed(), hint.cyan());
        }
        println!("   {} {}", "|".dimmed(), row.recommendation.dimmed());
        println!("   {} rule: {}", "|".dimmed(), row.rule_id.dimmed());
        println!();
    }

    let mut by_severity: BTreeMap<u8, (Severity, usize)> = BTreeMap::new();
    for row in rows {
        by_severity.entry(row.severity.rank()).or_insert((row.severity, 0)).1 += 1;
    }
    let summary: Vec<String> = by_severity
        .values()
        .rev()
        .map(|(severity, n)| format!("{} {}", n, severity.label().to_lowercase()))
        .collect();
    println!(" {} anomalies: {}", rows.len(), summary.join(", "));
    println!();
}

pub fn print_critical_path(critical: &CriticalPath, graph: &DependencyGraph) {
    header("Critical Path");

    if critical.is_empty() {
        println!(" {} No activity carries planned duration.", "--".dimmed());
        println!();
        return;
    }

    let mut elapsed = 0.0;
    for (i, id) in critical.path.iter().enumerate() {
        let (name, hours) = graph
            .get(id)
            .map(|n| (n.name.as_str(), n.planned_duration_hours))
            .unwrap_or(("", 0.0));
        elapsed += hours;
        let connector = if i + 1 == critical.path.len() { "`-" } else { "|-" };
        println!(
            " {} {:<10} {:<36} {:>10}  {}",
            connector.dimmed(),
            id.bold(),
            name,
            format_hours(hours),
            format!("ends at {}", format_hours(elapsed)).dimmed()
        );
    }
    println!();
    println!(
        " Total: {} across {} activities",
        format_hours(critical.duration_hours).bold(),
        critical.path.len()
    );
    println!();
}

pub fn print_simulation(result: &SimulationResult, preset: Option<&str>) {
    header(&format!("Scenario {}", preset.unwrap_or("custom")));

    section("Levers");
    let s = &result.scenario;
    println!(" {} Manpower boost: {}%", "|-".dimmed(), s.manpower_boost_pct);
    println!(" {} Overtime: {} h/day", "|-".dimmed(), s.overtime_hours_per_day);
    println!(" {} Lead-time reduction: {}%", "|-".dimmed(), s.lead_time_reduction_pct);
    println!();

    section("Project Finish");
    let date_or_dash = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        " {} Baseline:  {}",
        "|-".dimmed(),
        date_or_dash(result.baseline_finish_date)
    );
    println!(
        " {} Simulated: {}",
        "|-".dimmed(),
        date_or_dash(result.simulated_finish_date)
    );
    let improvement = format_signed(result.improvement_hours, " h");
    println!(
        " {} Improvement: {}",
        "|-".dimmed(),
        if result.improvement_hours > 0.0 {
            improvement.green().bold().to_string()
        } else {
            improvement
        }
    );
    println!();

    if result.impacts.is_empty() {
        return;
    }

    separator();
    section("Activity Impact");
    println!(
        "   {:<10} {:>10} {:>10} {:>8}",
        "Activity".dimmed(),
        "Baseline".dimmed(),
        "Scenario".dimmed(),
        "Saved".dimmed()
    );
    for impact in &result.impacts {
        let saved = format!("{:>8}", impact.saved_hours);
        println!(
            "   {:<10} {:>10} {:>10} {}",
            impact.activity_id,
            impact.baseline_duration_hours,
            impact.duration_hours,
            if impact.saved_hours > 0.0 {
                saved.green().to_string()
            } else {
                saved
            }
        );
    }
    println!();
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>) {
    section(title);
    for (key, n) in counts {
        println!(" {} {:<24} {}", "|-".dimmed(), key, n);
    }
    println!();
}

fn print_material_rows(rows: &[MaterialRow]) {
    for row in rows {
        let required = row
            .material_required_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            " {} {:<10} {:<30} {:<12} required {}",
            "|-".dimmed(),
            row.activity_id.bold(),
            if row.required_materials.is_empty() {
                row.activity_name.as_str()
            } else {
                row.required_materials.as_str()
            },
            row.material_status.label(),
            required
        );
    }
}

pub fn print_material_health(health: &MaterialHealth, source: &Path) {
    header(&format!("Materials in {}", source.display()));

    print_counts("By Ownership", &health.ownership_counts);
    print_counts("By Status", &health.status_counts);
    print_counts("By Department", &health.department_counts);

    separator();

    section("Pending Critical Materials");
    if health.pending_critical.is_empty() {
        println!(" {} None outstanding.", "OK".green().bold());
    } else {
        print_material_rows(&health.pending_critical);
    }
    println!();

    section("Late Materials");
    if health.late_materials.is_empty() {
        println!(" {} Nothing late.", "OK".green().bold());
    } else {
        print_material_rows(&health.late_materials);
    }
    println!();
}

fn print_variance(label: &str, v: &MetricVariance, suffix: &str) {
    let variance = format_signed(v.variance, suffix);
    println!(
        " {} {:<20} {:>14} {:>14} {:>12}",
        "|-".dimmed(),
        label,
        format!("{}{}", v.baseline, suffix),
        format!("{}{}", v.current, suffix),
        variance
    );
}

fn print_cost_variance(label: &str, v: &MetricVariance) {
    let variance = if v.variance > 0.0 {
        format!("+{}", format_currency(v.variance))
    } else {
        format_currency(v.variance)
    };
    println!(
        " {} {:<20} {:>14} {:>14} {:>12}",
        "|-".dimmed(),
        label,
        format_currency(v.baseline),
        format_currency(v.current),
        variance
    );
}

pub fn print_baseline_comparison(cmp: &BaselineComparison, baseline: &Path, current: &Path) {
    header(&format!(
        "Baseline {} vs {}",
        baseline.display(),
        current.display()
    ));

    section("Variance");
    println!(
        "   {:<20} {:>14} {:>14} {:>12}",
        "Metric".dimmed(),
        "Baseline".dimmed(),
        "Current".dimmed(),
        "Variance".dimmed()
    );
    print_variance("Activities", &cmp.activities, "");
    print_variance("Avg completion", &cmp.avg_completion, "%");
    print_variance("Delayed", &cmp.delayed, "");
    print_variance("High risk", &cmp.high_risk, "");
    print_cost_variance("Estimated cost", &cmp.estimated_cost);
    print_cost_variance("Actual cost", &cmp.actual_cost);
    println!();

    section("Finish Date");
    match (cmp.baseline_finish, cmp.current_finish, cmp.finish_variance_hours) {
        (Some(b), Some(c), Some(hours)) => {
            let variance = format_signed(hours, " h");
            println!(
                " {} {} baseline -> {} current ({})",
                "|-".dimmed(),
                b,
                c,
                if hours > 0.0 {
                    variance.red().bold().to_string()
                } else {
                    variance.green().to_string()
                }
            );
        }
        _ => println!(" {} Insufficient timeline dates", "|-".dimmed()),
    }
    println!();
}
