//! User settings, read once at start-up from the OS config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Category;

const APP_NAME: &str = "MonthPlanner";

/// Persisted user settings (`settings.json` in the config directory).
///
/// Every field falls back to its default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Key of the task snapshot in the store.
    pub storage_key: String,
    /// Populate a first run (no stored snapshot) with sample tasks.
    pub seed_sample_tasks: bool,
    /// Category preselected in the create form.
    pub default_category: Category,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            storage_key: "month_planner_tasks_v2".into(),
            seed_sample_tasks: true,
            default_category: Category::ToDo,
            log_filter: "info".into(),
            window_width: 1280.0,
            window_height: 800.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PlannerConfig {
    /// Read settings from `path`. `Ok(None)` when the file does not exist.
    ///
    /// Does not log, so it can run before the subscriber is installed.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        Ok(Some(config))
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.storage_key.trim().is_empty() {
            self.storage_key = defaults.storage_key;
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = defaults.log_filter;
        }
        if self.window_width.is_nan() || self.window_width < 640.0 {
            self.window_width = defaults.window_width;
        }
        if self.window_height.is_nan() || self.window_height < 480.0 {
            self.window_height = defaults.window_height;
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

pub fn config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

/// Directory holding the task snapshot.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PlannerConfig::read(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "seed_sample_tasks": false, "default_category": "Review" }"#,
        )
        .unwrap();

        let config = PlannerConfig::read(&path).unwrap().unwrap();
        assert!(!config.seed_sample_tasks);
        assert_eq!(config.default_category, Category::Review);
        assert_eq!(config.storage_key, PlannerConfig::default().storage_key);
    }

    #[test]
    fn invalid_values_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "storage_key": "  ", "window_width": 10.0 }"#).unwrap();

        let config = PlannerConfig::read(&path).unwrap().unwrap();
        assert_eq!(config.storage_key, "month_planner_tasks_v2");
        assert_eq!(config.window_width, 1280.0);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(PlannerConfig::read(&path), Err(ConfigError::Parse { .. })));
    }
}
