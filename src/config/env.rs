//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "NESTSPEC";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Filter from NESTSPEC_FILTER
    pub filter: Option<String>,
    /// Output format from NESTSPEC_FORMAT
    pub format: Option<String>,
    /// Log level from NESTSPEC_LOG
    pub log_level: Option<String>,
    /// Quiet panics from NESTSPEC_QUIET_PANICS
    pub quiet_panics: Option<bool>,
    /// Config file from NESTSPEC_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            filter: get_env("FILTER"),
            format: get_env("FORMAT"),
            log_level: get_env("LOG"),
            quiet_panics: get_env_bool("QUIET_PANICS"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.filter.is_some()
            || self.format.is_some()
            || self.log_level.is_some()
            || self.quiet_panics.is_some()
            || self.config_file.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Sets `NESTSPEC_*` variables for the duration of a test
#[cfg(test)]
#[derive(Default)]
pub(crate) struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FILTER"), filter.into()));
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FORMAT"), format.into()));
        self
    }

    pub fn quiet_panics(mut self, quiet: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_QUIET_PANICS"), quiet.to_string()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub(crate) struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.filter.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .filter("static context")
            .format("json")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.filter, Some("static context".to_string()));
        assert_eq!(config.format, Some("json".to_string()));
        assert!(config.has_any());
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = EnvBuilder::new().quiet_panics(true).apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.quiet_panics, Some(true));
    }
}
