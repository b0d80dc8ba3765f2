mod display;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use planlytics_core::config::{load_config, load_or_default};
use planlytics_core::units::date_start;
use planlytics_core::{
    analyze, anomaly_rows, compare_to_baseline, critical_path_with_policy, enrich_activities,
    load_snapshot, material_health, run_scenario_simulation, sample_dataset, Activity,
    DependencyGraph, EngineConfig, Scenario,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "planlytics",
    version,
    about = "Planlytics - schedule, risk and dependency analytics for project plans",
    long_about = "Analyze activity plans exported as JSON: portfolio metrics, critical path, \
        blocked work, data-quality anomalies, material health and what-if scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine config file (defaults to the nearest .planlytics/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for time-sensitive metrics, YYYY-MM-DD (defaults to now)
    #[arg(long, global = true, value_parser = parse_as_of)]
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Portfolio report: metrics, critical path, blocked work, dependency health
    Analyze {
        /// Activity snapshot (JSON array of activity records)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List data-quality anomalies, most severe first
    Anomalies {
        /// Activity snapshot
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the longest chain of dependent activities
    CriticalPath {
        /// Activity snapshot
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Simulate a what-if scenario against the dependency-gated schedule
    Simulate {
        /// Activity snapshot
        file: PathBuf,

        /// Named scenario (overtime, manpower, leadtime, or one from the config)
        #[arg(short, long)]
        preset: Option<String>,

        /// Extra manpower, percent (0-100)
        #[arg(long)]
        manpower: Option<f64>,

        /// Overtime per day, hours (0-12)
        #[arg(long)]
        overtime: Option<f64>,

        /// Material lead-time reduction, percent (0-100)
        #[arg(long = "lead-time")]
        lead_time: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Material ownership, status and lateness summary
    Materials {
        /// Activity snapshot
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compare the current snapshot against a locked baseline
    Compare {
        /// Baseline snapshot
        baseline: PathBuf,

        /// Current snapshot
        current: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the demonstration dataset as JSON
    Sample {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reference = match cli.as_of {
        Some(date) => date_start(date),
        None => Utc::now(),
    };
    log::debug!("reference instant {}", reference);

    match cli.command {
        Commands::Analyze { file, format } => cmd_analyze(&file, reference, format),
        Commands::Anomalies { file, format } => cmd_anomalies(&file, reference, format),
        Commands::CriticalPath { file, format } => {
            let config = load_engine_config(cli.config.as_deref())?;
            cmd_critical_path(&file, reference, &config, format)
        }
        Commands::Simulate {
            file,
            preset,
            manpower,
            overtime,
            lead_time,
            format,
        } => {
            let config = load_engine_config(cli.config.as_deref())?;
            let levers = Levers {
                manpower,
                overtime,
                lead_time,
            };
            cmd_simulate(&file, reference, &config, preset.as_deref(), levers, format)
        }
        Commands::Materials { file, format } => cmd_materials(&file, reference, format),
        Commands::Compare {
            baseline,
            current,
            format,
        } => cmd_compare(&baseline, &current, reference, format),
        Commands::Sample { output } => cmd_sample(reference, output.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn parse_as_of(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read the current directory")?;
            load_or_default(&cwd)?
        }
    };
    Ok(config)
}

fn load_activities(path: &Path, reference: DateTime<Utc>) -> Result<Vec<Activity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let activities = load_snapshot(&content, reference.date_naive())
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if activities.is_empty() {
        log::warn!("{} contains no activity records", path.display());
    }
    Ok(activities)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_analyze(path: &Path, reference: DateTime<Utc>, format: OutputFormat) -> Result<()> {
    let activities = load_activities(path, reference)?;
    let report = analyze(&activities, reference);

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            display::print_analysis_report(&report, path);
            Ok(())
        }
    }
}

fn cmd_anomalies(path: &Path, reference: DateTime<Utc>, format: OutputFormat) -> Result<()> {
    let activities = load_activities(path, reference)?;
    let rows = anomaly_rows(&activities, reference);

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            display::print_anomalies(&rows, path);
            Ok(())
        }
    }
}

fn cmd_critical_path(
    path: &Path,
    reference: DateTime<Utc>,
    config: &EngineConfig,
    format: OutputFormat,
) -> Result<()> {
    let activities = load_activities(path, reference)?;
    let enriched = enrich_activities(&activities, reference);
    let graph = DependencyGraph::build(&enriched);
    let critical = critical_path_with_policy(&graph, config.schedule.cycle_policy)
        .with_context(|| format!("Cannot compute the critical path of {}", path.display()))?;

    match format {
        OutputFormat::Json => print_json(&critical),
        OutputFormat::Text => {
            display::print_critical_path(&critical, &graph);
            Ok(())
        }
    }
}

/// Scenario levers given on the command line.
struct Levers {
    manpower: Option<f64>,
    overtime: Option<f64>,
    lead_time: Option<f64>,
}

impl Levers {
    fn is_empty(&self) -> bool {
        self.manpower.is_none() && self.overtime.is_none() && self.lead_time.is_none()
    }

    fn apply(&self, base: Scenario) -> Scenario {
        Scenario {
            manpower_boost_pct: self.manpower.unwrap_or(base.manpower_boost_pct),
            overtime_hours_per_day: self.overtime.unwrap_or(base.overtime_hours_per_day),
            lead_time_reduction_pct: self.lead_time.unwrap_or(base.lead_time_reduction_pct),
        }
    }
}

fn cmd_simulate(
    path: &Path,
    reference: DateTime<Utc>,
    config: &EngineConfig,
    preset: Option<&str>,
    levers: Levers,
    format: OutputFormat,
) -> Result<()> {
    if preset.is_none() && levers.is_empty() {
        anyhow::bail!(
            "No scenario given. Pass --preset ({}) or at least one of --manpower, --overtime, --lead-time.",
            config.scenario_names().join(", ")
        );
    }

    let base = match preset {
        Some(name) => config.scenario(name).with_context(|| {
            format!(
                "Unknown scenario '{}'. Available: {}",
                name,
                config.scenario_names().join(", ")
            )
        })?,
        None => Scenario::zero(),
    };
    let scenario = levers.apply(base).clamped();

    let activities = load_activities(path, reference)?;
    let result = run_scenario_simulation(&activities, &scenario, reference);

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            display::print_simulation(&result, preset);
            Ok(())
        }
    }
}

fn cmd_materials(path: &Path, reference: DateTime<Utc>, format: OutputFormat) -> Result<()> {
    let activities = load_activities(path, reference)?;
    let health = material_health(&activities, reference);

    match format {
        OutputFormat::Json => print_json(&health),
        OutputFormat::Text => {
            display::print_material_health(&health, path);
            Ok(())
        }
    }
}

fn cmd_compare(
    baseline_path: &Path,
    current_path: &Path,
    reference: DateTime<Utc>,
    format: OutputFormat,
) -> Result<()> {
    let baseline = load_activities(baseline_path, reference)?;
    let current = load_activities(current_path, reference)?;
    let comparison = compare_to_baseline(&baseline, &current, reference);

    match format {
        OutputFormat::Json => print_json(&comparison),
        OutputFormat::Text => {
            display::print_baseline_comparison(&comparison, baseline_path, current_path);
            Ok(())
        }
    }
}

fn cmd_sample(reference: DateTime<Utc>, output: Option<&Path>) -> Result<()> {
    let sample = sample_dataset(reference.date_naive());
    let json = serde_json::to_string_pretty(&sample)?;

    match output {
        Some(out_path) => {
            std::fs::write(out_path, json + "\n")
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            println!("Sample dataset written to {}", out_path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
