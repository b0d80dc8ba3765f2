use super::{normalize, Activity};
use chrono::NaiveDate;
use serde_json::json;

/// Three-step demonstration plan: strategy freeze, supplier fabrication,
/// integrated dry run, chained finish-to-start.
pub fn sample_dataset(today: NaiveDate) -> Vec<Activity> {
    let stamp = today.format("%Y-%m-%d").to_string();
    let raw = [
        json!({
            "activityId": "ACT-0001",
            "phase": "Preparation",
            "activityName": "Fixture Strategy Freeze",
            "subActivity": "Stakeholder Approval",
            "baseEffortHours": 40,
            "requiredMaterials": "Fixture Frame, Mounting Plate",
            "requiredTools": "CAD Suite, Review Board",
            "materialOwnership": "Internal Team",
            "materialLeadTime": 12,
            "dependencies": "",
            "plannedStartDate": "2026-02-12",
            "plannedEndDate": "2026-02-18",
            "plannedDurationHours": 40,
            "priority": "High",
            "milestone": "Strategy Approved",
            "assignedManpower": 3,
            "manpowerSkillLevel": "Senior",
            "resourceName": "Planning Core Team",
            "resourceDepartment": "Process Engineering",
            "shiftType": "Day",
            "materialStatus": "Received",
            "materialRequiredDate": "2026-02-14",
            "materialReceivedDate": "2026-02-13",
            "materialCriticality": "High",
            "actualStartDate": "2026-02-12",
            "actualDurationHours": 36,
            "activityStatus": "In Progress",
            "completionPercentage": 90,
            "riskLevel": "Medium",
            "riskScore": 52,
            "dependencyType": "FS",
            "estimatedCost": 8000,
            "actualCost": 7600,
            "costCenter": "CC-PLN-100",
            "lastModifiedBy": "Planner",
            "lastModifiedDate": stamp,
            "remarks": "Awaiting final review notes"
        }),
        json!({
            "activityId": "ACT-0002",
            "phase": "Build-Up",
            "activityName": "Third Party Housing Fabrication",
            "subActivity": "Machining and QA",
            "baseEffortHours": 96,
            "requiredMaterials": "Aluminum Housing, Fasteners",
            "requiredTools": "CNC Program, QA Fixture",
            "materialOwnership": "Supplier",
            "materialLeadTime": 48,
            "dependencies": "ACT-0001",
            "plannedStartDate": "2026-02-19",
            "plannedEndDate": "2026-02-26",
            "plannedDurationHours": 96,
            "priority": "Critical",
            "milestone": "Housing Released",
            "assignedManpower": 4,
            "manpowerSkillLevel": "Expert",
            "resourceName": "Fabrication Vendor A",
            "resourceDepartment": "External Supply",
            "shiftType": "Day/Night",
            "materialStatus": "In Transit",
            "materialRequiredDate": "2026-02-20",
            "materialCriticality": "Critical",
            "actualStartDate": "2026-02-20",
            "actualDurationHours": 28,
            "activityStatus": "Delayed",
            "completionPercentage": 25,
            "riskLevel": "High",
            "riskScore": 78,
            "delayReason": "Vendor heat-treatment queue saturation",
            "dependencyType": "FS",
            "manualOverrideDuration": 8,
            "overrideReason": "Expedite via overtime",
            "overrideApprovedBy": "Operations Lead",
            "estimatedCost": 23000,
            "actualCost": 25000,
            "costCenter": "CC-BLD-240",
            "lastModifiedBy": "Supply Planner",
            "lastModifiedDate": stamp,
            "remarks": "Daily escalation active"
        }),
        json!({
            "activityId": "ACT-0003",
            "phase": "Validation",
            "activityName": "Integrated Dry Run",
            "subActivity": "Sequence and Interlock Verification",
            "baseEffortHours": 64,
            "requiredMaterials": "Harness Set, Safety Interlock",
            "requiredTools": "Commissioning Toolkit",
            "materialOwnership": "Client",
            "materialLeadTime": 24,
            "dependencies": "ACT-0002",
            "plannedStartDate": "2026-02-27",
            "plannedEndDate": "2026-03-03",
            "plannedDurationHours": 64,
            "priority": "High",
            "milestone": "Dry Run Complete",
            "assignedManpower": 5,
            "manpowerSkillLevel": "Mixed",
            "resourceName": "Validation Squad",
            "resourceDepartment": "Testing",
            "shiftType": "Day",
            "materialStatus": "Ordered",
            "materialRequiredDate": "2026-02-28",
            "materialCriticality": "High",
            "activityStatus": "Not Started",
            "completionPercentage": 0,
            "riskLevel": "Medium",
            "riskScore": 46,
            "dependencyType": "FS",
            "estimatedCost": 15000,
            "actualCost": 0,
            "costCenter": "CC-VAL-320",
            "lastModifiedBy": "Planner",
            "lastModifiedDate": stamp,
            "remarks": "Start depends on ACT-0002 release"
        }),
    ];
    raw.iter().map(|record| normalize(record, today)).collect()
}
