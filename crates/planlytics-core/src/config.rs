use crate::error::{PlanError, Result};
use crate::simulator::{Scenario, BUILT_IN_PRESETS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".planlytics";
pub const CONFIG_FILE: &str = "config.toml";

/// What critical-path queries do when the dependency graph has a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Order cyclic activities after the sortable ones and carry on.
    #[default]
    BestEffort,
    /// Fail with [`PlanError::CyclicDependency`].
    Reject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

/// Engine configuration loaded from `.planlytics/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Named scenarios, in addition to the built-in presets. A name that
    /// matches a built-in replaces it.
    #[serde(default)]
    pub scenarios: BTreeMap<String, Scenario>,
}

impl EngineConfig {
    /// Look up a scenario by name, configured ones first. Values are clamped.
    pub fn scenario(&self, name: &str) -> Option<Scenario> {
        self.scenarios
            .get(name)
            .copied()
            .or_else(|| Scenario::preset(name))
            .map(Scenario::clamped)
    }

    /// Built-in preset names followed by configured ones, without repeats.
    pub fn scenario_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILT_IN_PRESETS.iter().map(|s| s.to_string()).collect();
        for name in self.scenarios.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Parse configuration text. `path` is only used in error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<EngineConfig> {
    toml::from_str(content).map_err(|e| PlanError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Find `.planlytics/config.toml` in `start` or the nearest ancestor.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Load the discovered config, or defaults when there is none.
pub fn load_or_default(start: &Path) -> Result<EngineConfig> {
    match discover_config(start) {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            load_config(&path)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("", Path::new("config.toml")).unwrap();
        assert_eq!(config.schedule.cycle_policy, CyclePolicy::BestEffort);
        assert!(config.scenarios.is_empty());
        assert_eq!(config.scenario("overtime"), Scenario::preset("overtime"));
    }

    #[test]
    fn test_scenarios_and_policy() {
        let toml = r#"
[schedule]
cycle_policy = "reject"

[scenarios.rush]
manpower_boost_pct = 30
overtime_hours_per_day = 20

[scenarios.manpower]
manpower_boost_pct = 50
"#;
        let config = parse_config(toml, Path::new("config.toml")).unwrap();
        assert_eq!(config.schedule.cycle_policy, CyclePolicy::Reject);

        let rush = config.scenario("rush").unwrap();
        assert_eq!(rush.manpower_boost_pct, 30.0);
        assert_eq!(rush.overtime_hours_per_day, 12.0);
        assert_eq!(rush.lead_time_reduction_pct, 0.0);

        assert_eq!(config.scenario("manpower").unwrap().manpower_boost_pct, 50.0);
        assert_eq!(
            config.scenario_names(),
            vec!["overtime", "manpower", "leadtime", "rush"]
        );
        assert!(config.scenario("missing").is_none());
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err = parse_config("[schedule]\ncycle_policy = \"ignore\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, PlanError::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
