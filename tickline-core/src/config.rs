use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env_filter::EnvironmentFilter;
use crate::rollup::TimeWindow;

const CONFIG_ENV_VAR: &str = "TICKLINE_CONFIG";
const CONFIG_NAMES: [&str; 4] = [
    "tickline.yaml",
    "tickline.yml",
    ".tickline.yaml",
    ".tickline.yml",
];

/// Root configuration file structure
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimelineConfig {
    /// Config file version
    #[serde(default = "default_version")]
    pub version: String,

    /// Bucket data file (JSON array of `[ts, {env: counts}]`)
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Environment to show; omitted or "all" shows every environment
    #[serde(default)]
    pub environment: Option<String>,

    /// Visible time window
    #[serde(default)]
    pub window: TimeWindow,

    /// How often the live view re-reads the input file
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Timeline width in columns; the terminal width is used when unset
    #[serde(default)]
    pub timeline_width: Option<u16>,
}

fn default_version() -> String {
    "1".into()
}
fn default_refresh_interval() -> u64 {
    5000
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            input: None,
            environment: None,
            window: TimeWindow::default(),
            refresh_interval_ms: default_refresh_interval(),
            timeline_width: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("refresh_interval_ms must be greater than zero")]
    InvalidRefreshInterval,
    #[error("no config file found, searched: {searched:?}")]
    NotFound { searched: Vec<PathBuf> },
}

impl TimelineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Search for a config file: `TICKLINE_CONFIG` first, then the start
    /// directory and each of its parents.
    pub fn discover(start_dir: &Path) -> Result<(PathBuf, Self), ConfigError> {
        let mut searched = Vec::new();

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
            if path.is_file() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        for path in start_dir
            .ancestors()
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        {
            if path.is_file() {
                return Ok((path.clone(), Self::load(&path)?));
            }
            searched.push(path);
        }

        Err(ConfigError::NotFound { searched })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidRefreshInterval);
        }
        Ok(())
    }

    pub fn environment_filter(&self) -> EnvironmentFilter {
        self.environment
            .as_deref()
            .map(|env| env.parse::<EnvironmentFilter>().unwrap_or_default())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
version: "1"
input: data/buckets.json
environment: prod
window: 7d
refresh_interval_ms: 1000
timeline_width: 120
"#;
        let config = TimelineConfig::from_str(yaml).unwrap();
        assert_eq!(config.input, Some(PathBuf::from("data/buckets.json")));
        assert_eq!(config.window, TimeWindow::OneWeek);
        assert_eq!(config.refresh_interval_ms, 1000);
        assert_eq!(config.timeline_width, Some(120));
        assert_eq!(config.environment_filter(), EnvironmentFilter::only("prod"));
    }

    #[test]
    fn test_defaults() {
        let config = TimelineConfig::from_str("{}").unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.window, TimeWindow::OneDay);
        assert_eq!(config.refresh_interval_ms, 5000);
        assert_eq!(config.environment_filter(), EnvironmentFilter::All);
    }

    #[test]
    fn test_all_environment_keyword() {
        let config = TimelineConfig::from_str("environment: all").unwrap();
        assert_eq!(config.environment_filter(), EnvironmentFilter::All);
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let result = TimelineConfig::from_str("refresh_interval_ms: 0");
        assert!(matches!(result, Err(ConfigError::InvalidRefreshInterval)));
    }

    #[test]
    fn test_unknown_window_rejected() {
        let result = TimelineConfig::from_str("window: 2w");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_discover_prefers_nearest_dir() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("tickline.yaml"), "environment: dev\n").unwrap();
        let nested = root.path().join("svc");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(".tickline.yml"), "environment: prod\n").unwrap();

        let (path, config) = TimelineConfig::discover(&nested).unwrap();
        assert_eq!(path, nested.join(".tickline.yml"));
        assert_eq!(config.environment.as_deref(), Some("prod"));
    }

    #[test]
    fn test_discover_in_parent_dir() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("tickline.yaml"), "environment: dev\n").unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (path, config) = TimelineConfig::discover(&nested).unwrap();
        assert_eq!(path, root.path().join("tickline.yaml"));
        assert_eq!(config.environment.as_deref(), Some("dev"));
    }
}
