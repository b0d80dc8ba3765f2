pub mod normalize;
pub mod sample;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use normalize::{normalize, normalize_row, normalize_all};
pub use sample::sample_dataset;

/// Execution status of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Blocked,
    Delayed,
    Completed,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 5] = [
        ActivityStatus::NotStarted,
        ActivityStatus::InProgress,
        ActivityStatus::Blocked,
        ActivityStatus::Delayed,
        ActivityStatus::Completed,
    ];

    /// Case-insensitive match against the status labels.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityStatus::NotStarted => "Not Started",
            ActivityStatus::InProgress => "In Progress",
            ActivityStatus::Blocked => "Blocked",
            ActivityStatus::Delayed => "Delayed",
            ActivityStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheduling priority. `Unrated` holds any non-empty label outside the known scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Unrated,
}

impl Priority {
    /// Empty input yields `Medium`, unknown labels yield `Unrated`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "medium" => Priority::Medium,
            "low" => Priority::Low,
            "high" => Priority::High,
            "critical" => Priority::Critical,
            _ => Priority::Unrated,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
            Priority::Unrated => "Unrated",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Procurement state of the activity's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialStatus {
    #[default]
    #[serde(rename = "Not Ordered")]
    NotOrdered,
    Ordered,
    #[serde(rename = "In Transit")]
    InTransit,
    Received,
    Delayed,
}

impl MaterialStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not ordered" => Some(MaterialStatus::NotOrdered),
            "ordered" => Some(MaterialStatus::Ordered),
            "in transit" => Some(MaterialStatus::InTransit),
            "received" => Some(MaterialStatus::Received),
            "delayed" => Some(MaterialStatus::Delayed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialStatus::NotOrdered => "Not Ordered",
            MaterialStatus::Ordered => "Ordered",
            MaterialStatus::InTransit => "In Transit",
            MaterialStatus::Received => "Received",
            MaterialStatus::Delayed => "Delayed",
        }
    }
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much a missing material would hurt the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialCriticality {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    Low,
    Medium,
    High,
    Critical,
}

impl MaterialCriticality {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => MaterialCriticality::Low,
            "medium" => MaterialCriticality::Medium,
            "high" => MaterialCriticality::High,
            "critical" => MaterialCriticality::Critical,
            _ => MaterialCriticality::Unspecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialCriticality::Unspecified => "",
            MaterialCriticality::Low => "Low",
            MaterialCriticality::Medium => "Medium",
            MaterialCriticality::High => "High",
            MaterialCriticality::Critical => "Critical",
        }
    }
}

/// Declared dependency relationship. Only used as a risk bump; scheduling
/// treats every edge as finish-to-start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
}

impl DependencyType {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "FS" => DependencyType::FinishToStart,
            "SS" => DependencyType::StartToStart,
            "FF" => DependencyType::FinishToFinish,
            _ => DependencyType::Unspecified,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DependencyType::Unspecified => "",
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
        }
    }
}

/// Discrete risk band derived from the 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => RiskLevel::Critical,
            55..=74 => RiskLevel::High,
            30..=54 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a project plan in canonical form.
///
/// Dates are calendar dates; an absent date serializes as an empty string.
/// `planned_duration_hours`, `actual_duration_hours`, `delay_hours`,
/// `risk_score`, `risk_level` and the effective `activity_status` are
/// recomputed by [`crate::enrich::enrich_activity`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub activity_id: String,
    pub phase: String,
    pub activity_name: String,
    pub sub_activity: String,
    pub base_effort_hours: f64,
    pub required_materials: String,
    pub required_tools: String,
    pub material_ownership: String,
    /// Hours of lead time for the material.
    pub material_lead_time: f64,
    /// Comma-separated predecessor activity ids.
    pub dependencies: String,
    #[serde(with = "iso_date")]
    pub planned_start_date: Option<NaiveDate>,
    #[serde(with = "iso_date")]
    pub planned_end_date: Option<NaiveDate>,
    pub planned_duration_hours: f64,
    pub priority: Priority,
    pub milestone: String,
    pub assigned_manpower: f64,
    pub manpower_skill_level: String,
    pub resource_name: String,
    pub resource_department: String,
    pub shift_type: String,
    pub material_status: MaterialStatus,
    #[serde(with = "iso_date")]
    pub material_required_date: Option<NaiveDate>,
    #[serde(with = "iso_date")]
    pub material_received_date: Option<NaiveDate>,
    pub material_criticality: MaterialCriticality,
    #[serde(with = "iso_date")]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(with = "iso_date")]
    pub actual_end_date: Option<NaiveDate>,
    pub actual_duration_hours: f64,
    pub activity_status: ActivityStatus,
    pub completion_percentage: f64,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub delay_reason: String,
    pub dependency_type: DependencyType,
    pub manual_override_duration: f64,
    pub override_reason: String,
    pub override_approved_by: String,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub cost_center: String,
    pub last_modified_by: String,
    #[serde(with = "iso_date")]
    pub last_modified_date: Option<NaiveDate>,
    pub remarks: String,
    /// Derived view of `delay_hours`; never read back as source of truth.
    pub delay_hours: f64,
}

impl Activity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            activity_id: id.into(),
            activity_name: name.into(),
            last_modified_by: "Planner".to_string(),
            ..Self::default()
        }
    }

    /// Predecessor ids in declaration order, duplicates kept.
    pub fn dependency_ids(&self) -> Vec<&str> {
        parse_dependencies(&self.dependencies)
    }
}

/// Split a comma-separated dependency list into trimmed, non-empty ids.
pub fn parse_dependencies(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

/// Next free `ACT-NNNN` id, one above the highest numbered id in use.
pub fn next_activity_id(existing: &[Activity]) -> String {
    let pattern = Regex::new(r"^ACT-(\d{4,})$").ok();
    let max = existing
        .iter()
        .filter_map(|activity| pattern.as_ref()?.captures(&activity.activity_id))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("ACT-{:04}", max + 1)
}

/// Serde adapter storing optional dates as `YYYY-MM-DD`, or `""` when absent.
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), FORMAT).ok()))
    }
}
