//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "mvps.toml",
    "./config/config.toml",
    "/etc/mvps/config.toml",
];

/// Configuration loader
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        Self::apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file does not exist, searching defaults");
        }

        if let Some(path) = lookup("MVPS_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // HTTP
        if let Some(val) = lookup("MVPS_HTTP_HOST") {
            config.http.host = val;
        }
        if let Some(val) = lookup("MVPS_HTTP_PORT") {
            match val.parse() {
                Ok(port) => config.http.port = port,
                Err(_) => warn!(value = %val, "Ignoring unparseable MVPS_HTTP_PORT"),
            }
        }

        // Database
        if let Some(val) = lookup("MVPS_DATABASE_URL") {
            config.database.url = val;
        }
        if let Some(val) = lookup("MVPS_DATABASE_MAX_CONNECTIONS") {
            match val.parse() {
                Ok(n) => config.database.max_connections = n,
                Err(_) => warn!(value = %val, "Ignoring unparseable MVPS_DATABASE_MAX_CONNECTIONS"),
            }
        }

        if let Some(val) = lookup("MVPS_DEV_MODE") {
            config.dev_mode = val == "true" || val == "1";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9000\n\n[database]\nurl = \"sqlite://file.db\"").unwrap();

        let loader = ConfigLoader::with_path(file.path());
        let config = loader
            .load_with(lookup_from(&[
                ("MVPS_HTTP_PORT", "9100"),
                ("MVPS_DEV_MODE", "1"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 9100);
        assert_eq!(config.database.url, "sqlite://file.db");
        assert!(config.dev_mode);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9000").unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[("MVPS_HTTP_PORT", "not-a-port")]))
            .unwrap();

        assert_eq!(config.http.port, 9000);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dev_mode = false").unwrap();

        let result = ConfigLoader::with_path(file.path())
            .load_with(lookup_from(&[("MVPS_DATABASE_MAX_CONNECTIONS", "0")]));

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
