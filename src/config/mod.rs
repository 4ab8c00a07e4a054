//! Configuration module
//!
//! Handles loading and layering run configuration: defaults, then a config
//! file, then `NESTSPEC_*` environment variables, then CLI flags.

mod env;
mod file;

pub use env::EnvConfig;
pub use file::{find_config_file, CONFIG_LOCATIONS};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Only run tests whose full name contains this (case-insensitive)
    pub filter: Option<String>,

    /// Output format (table, json, json-pretty, summary)
    pub format: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Silence the panic hook while actions run
    pub quiet_panics: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: None,
            format: "table".to_string(),
            log_level: "info".to_string(),
            quiet_panics: false,
        }
    }
}

impl RunConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if file::is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Load from the first standard location that exists, or use defaults
    pub fn load_default() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if file::is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(filter) = &env.filter {
            self.filter = Some(filter.clone());
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(quiet) = env.quiet_panics {
            self.quiet_panics = quiet;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.format, "table");
        assert_eq!(config.log_level, "info");
        assert!(config.filter.is_none());
        assert!(!config.quiet_panics);
    }

    #[test]
    fn test_load_yaml_with_missing_fields() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "filter: static\nquiet_panics: true").unwrap();

        let config = RunConfig::load(file.path()).unwrap();
        assert_eq!(config.filter.as_deref(), Some("static"));
        assert!(config.quiet_panics);
        assert_eq!(config.format, "table");
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nestspec.json");
        let config = RunConfig {
            format: "json".to_string(),
            ..RunConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{ not json").unwrap();

        let err = RunConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON config"));
    }

    #[test]
    fn test_env_overrides() {
        let env = EnvConfig {
            filter: Some("pending".to_string()),
            quiet_panics: Some(true),
            ..EnvConfig::default()
        };

        let config = RunConfig::default().with_env(&env);
        assert_eq!(config.filter.as_deref(), Some("pending"));
        assert!(config.quiet_panics);
        assert_eq!(config.log_level, "info");
    }
}
