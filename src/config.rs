//! Dashboard configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::aggregate::KpiOptions;

/// Name of the optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Settings for the dashboard. Every field has a default; `dashboard.json`
/// only needs to list the ones it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Table loaded at start-up when the file exists.
    pub data_path: PathBuf,
    /// Headcount interpretation and loyalty threshold.
    pub kpi: KpiOptions,
    /// Age slider bounds used when the table has no `Age` column.
    pub fallback_age_bounds: (i64, i64),
    /// JobLevel slider bounds used when the table has no `JobLevel` column.
    pub fallback_level_bounds: (i64, i64),
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("employees.csv"),
            kpi: KpiOptions::default(),
            fallback_age_bounds: (18, 65),
            fallback_level_bounds: crate::data::level::DEFAULT_RANK_BOUNDS,
        }
    }
}

impl DashboardConfig {
    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Defaults, overridden by `path` when it exists. A malformed file is
    /// logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("{} not found, using default configuration", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring configuration: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::HeadcountMode;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{ "data_path": "hr/staff.parquet", "kpi": { "headcount": "row_count" } }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("hr/staff.parquet"));
        assert_eq!(config.kpi.headcount, HeadcountMode::RowCount);
        assert_eq!(config.kpi.loyalty_threshold_years, 5.0);
        assert_eq!(config.fallback_age_bounds, (18, 65));
        assert_eq!(config.fallback_level_bounds, (1, 5));
    }

    #[test]
    fn missing_or_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
