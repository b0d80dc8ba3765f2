//! Tolerant coercion of untrusted records into [`Activity`].
//!
//! Nothing here fails: unparseable numbers become `0`, unparseable dates
//! become absent, unknown enumerations fall back to their defaults.

use super::{
    Activity, ActivityStatus, DependencyType, MaterialCriticality, MaterialStatus, Priority,
    RiskLevel,
};
use crate::units::{clamp, round_half_up, DAY_MS};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// A field of the activity schema with its spreadsheet label.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
}

const fn col(key: &'static str, label: &'static str, kind: ColumnKind) -> Column {
    Column { key, label, kind }
}

pub const COLUMNS: &[Column] = &[
    col("activityId", "Activity ID", ColumnKind::Text),
    col("phase", "Phase", ColumnKind::Text),
    col("activityName", "Activity Name", ColumnKind::Text),
    col("subActivity", "Sub Activity", ColumnKind::Text),
    col("baseEffortHours", "Base Effort Hours", ColumnKind::Number),
    col("requiredMaterials", "Required Materials", ColumnKind::Text),
    col("requiredTools", "Required Tools", ColumnKind::Text),
    col("materialOwnership", "Material Ownership", ColumnKind::Text),
    col("materialLeadTime", "Material Lead Time", ColumnKind::Number),
    col("dependencies", "Dependencies", ColumnKind::Text),
    col("plannedStartDate", "Planned Start Date", ColumnKind::Date),
    col("plannedEndDate", "Planned End Date", ColumnKind::Date),
    col("plannedDurationHours", "Planned Duration Hours", ColumnKind::Number),
    col("priority", "Priority", ColumnKind::Text),
    col("milestone", "Milestone", ColumnKind::Text),
    col("assignedManpower", "Assigned Manpower", ColumnKind::Number),
    col("manpowerSkillLevel", "Manpower Skill Level", ColumnKind::Text),
    col("resourceName", "Resource Name", ColumnKind::Text),
    col("resourceDepartment", "Resource Department", ColumnKind::Text),
    col("shiftType", "Shift Type", ColumnKind::Text),
    col("materialStatus", "Material Status", ColumnKind::Text),
    col("materialRequiredDate", "Material Required Date", ColumnKind::Date),
    col("materialReceivedDate", "Material Received Date", ColumnKind::Date),
    col("materialCriticality", "Material Criticality", ColumnKind::Text),
    col("actualStartDate", "Actual Start Date", ColumnKind::Date),
    col("actualEndDate", "Actual End Date", ColumnKind::Date),
    col("actualDurationHours", "Actual Duration Hours", ColumnKind::Number),
    col("activityStatus", "Activity Status", ColumnKind::Text),
    col("completionPercentage", "Completion Percentage", ColumnKind::Number),
    col("riskLevel", "Risk Level", ColumnKind::Text),
    col("riskScore", "Risk Score", ColumnKind::Number),
    col("delayReason", "Delay Reason", ColumnKind::Text),
    col("dependencyType", "Dependency Type", ColumnKind::Text),
    col("manualOverrideDuration", "Manual Override Duration", ColumnKind::Number),
    col("overrideReason", "Override Reason", ColumnKind::Text),
    col("overrideApprovedBy", "Override Approved By", ColumnKind::Text),
    col("estimatedCost", "Estimated Cost", ColumnKind::Number),
    col("actualCost", "Actual Cost", ColumnKind::Number),
    col("costCenter", "Cost Center", ColumnKind::Text),
    col("lastModifiedBy", "Last Modified By", ColumnKind::Text),
    col("lastModifiedDate", "Last Modified Date", ColumnKind::Date),
    col("remarks", "Remarks", ColumnKind::Text),
];

/// Extra header spellings seen in spreadsheets, mapped to schema keys.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("subactivity", "subActivity"),
    ("activityid", "activityId"),
    ("base effort", "baseEffortHours"),
    ("material lead time days", "materialLeadTime"),
    ("planned duration", "plannedDurationHours"),
    ("actual duration", "actualDurationHours"),
    ("completion", "completionPercentage"),
    ("risk", "riskScore"),
];

const DEFAULT_MODIFIED_BY: &str = "Planner";

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a spreadsheet header (label, key, or alias) to its schema column.
pub fn column_for_header(header: &str) -> Option<&'static Column> {
    let wanted = normalize_header(header);
    if wanted.is_empty() {
        return None;
    }
    COLUMNS
        .iter()
        .find(|c| normalize_header(c.label) == wanted || normalize_header(c.key) == wanted)
        .or_else(|| {
            HEADER_ALIASES
                .iter()
                .find(|(alias, _)| *alias == wanted)
                .and_then(|(_, key)| COLUMNS.iter().find(|c| c.key == *key))
        })
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number(fields: &Map<String, Value>, key: &str) -> f64 {
    let value = match fields.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn date(fields: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    match fields.get(key) {
        Some(Value::String(s)) => parse_date_text(s),
        Some(Value::Number(n)) => n.as_f64().and_then(spreadsheet_serial_date),
        _ => None,
    }
}

/// Best-effort calendar date from text: ISO dates, RFC 3339 timestamps
/// (taken in UTC), slash-separated dates.
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }
    for fmt in ["%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    None
}

/// Spreadsheet serial day number (epoch 1899-12-30) to a calendar date.
pub fn spreadsheet_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    // the cast saturates, so far-out serials land on i64 bounds
    let millis = (serial * DAY_MS) as i64;
    epoch
        .checked_add_signed(Duration::try_milliseconds(millis)?)
        .map(|ts| ts.date())
}

/// Fold free-text ownership into `Internal Team`, `Supplier` or `Client`
/// when a keyword matches; otherwise keep the text as given.
pub fn normalize_ownership(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let lowered = raw.to_lowercase();
    if lowered.contains("internal") {
        "Internal Team".to_string()
    } else if ["third", "supplier", "vendor"]
        .iter()
        .any(|k| lowered.contains(k))
    {
        "Supplier".to_string()
    } else if ["client", "customer", "joint"]
        .iter()
        .any(|k| lowered.contains(k))
    {
        "Client".to_string()
    } else {
        raw.to_string()
    }
}

/// Coerce an arbitrary JSON value into a complete [`Activity`].
///
/// `today` fills `lastModifiedDate` when the record has none.
pub fn normalize(raw: &Value, today: NaiveDate) -> Activity {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    let status_text = text(fields, "activityStatus");
    let status = ActivityStatus::parse(&status_text).unwrap_or_else(|| {
        if !status_text.is_empty() {
            log::debug!(
                "activity '{}': unrecognized status '{}', using '{}'",
                text(fields, "activityId"),
                status_text,
                ActivityStatus::default().label()
            );
        }
        ActivityStatus::default()
    });
    let material_status =
        MaterialStatus::parse(&text(fields, "materialStatus")).unwrap_or_default();
    let risk_level = RiskLevel::parse(&text(fields, "riskLevel")).unwrap_or_default();
    let last_modified_by = match text(fields, "lastModifiedBy") {
        s if s.is_empty() => DEFAULT_MODIFIED_BY.to_string(),
        s => s,
    };

    Activity {
        activity_id: text(fields, "activityId"),
        phase: text(fields, "phase"),
        activity_name: text(fields, "activityName"),
        sub_activity: text(fields, "subActivity"),
        base_effort_hours: number(fields, "baseEffortHours"),
        required_materials: text(fields, "requiredMaterials"),
        required_tools: text(fields, "requiredTools"),
        material_ownership: normalize_ownership(&text(fields, "materialOwnership")),
        material_lead_time: number(fields, "materialLeadTime"),
        dependencies: text(fields, "dependencies"),
        planned_start_date: date(fields, "plannedStartDate"),
        planned_end_date: date(fields, "plannedEndDate"),
        planned_duration_hours: number(fields, "plannedDurationHours"),
        priority: Priority::parse(&text(fields, "priority")),
        milestone: text(fields, "milestone"),
        assigned_manpower: number(fields, "assignedManpower"),
        manpower_skill_level: text(fields, "manpowerSkillLevel"),
        resource_name: text(fields, "resourceName"),
        resource_department: text(fields, "resourceDepartment"),
        shift_type: text(fields, "shiftType"),
        material_status,
        material_required_date: date(fields, "materialRequiredDate"),
        material_received_date: date(fields, "materialReceivedDate"),
        material_criticality: MaterialCriticality::parse(&text(fields, "materialCriticality")),
        actual_start_date: date(fields, "actualStartDate"),
        actual_end_date: date(fields, "actualEndDate"),
        actual_duration_hours: number(fields, "actualDurationHours"),
        activity_status: status,
        completion_percentage: clamp(number(fields, "completionPercentage"), 0.0, 100.0),
        risk_level,
        risk_score: round_half_up(clamp(number(fields, "riskScore"), 0.0, 100.0)) as u8,
        delay_reason: text(fields, "delayReason"),
        dependency_type: DependencyType::parse(&text(fields, "dependencyType")),
        manual_override_duration: number(fields, "manualOverrideDuration"),
        override_reason: text(fields, "overrideReason"),
        override_approved_by: text(fields, "overrideApprovedBy"),
        estimated_cost: number(fields, "estimatedCost"),
        actual_cost: number(fields, "actualCost"),
        cost_center: text(fields, "costCenter"),
        last_modified_by,
        last_modified_date: date(fields, "lastModifiedDate").or(Some(today)),
        remarks: text(fields, "remarks"),
        delay_hours: number(fields, "delayHours").max(0.0),
    }
}

/// Normalize a spreadsheet-style row keyed by column labels or aliases.
/// Unrecognized headers are ignored; a later header for the same column wins.
pub fn normalize_row(row: &Map<String, Value>, today: NaiveDate) -> Activity {
    let mut fields = Map::new();
    for (header, value) in row {
        if let Some(column) = column_for_header(header) {
            fields.insert(column.key.to_string(), value.clone());
        }
    }
    normalize(&Value::Object(fields), today)
}

/// Normalize every element of a JSON array; a non-array yields nothing.
pub fn normalize_all(raw: &Value, today: NaiveDate) -> Vec<Activity> {
    raw.as_array()
        .map(|items| items.iter().map(|item| normalize(item, today)).collect())
        .unwrap_or_default()
}
