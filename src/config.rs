use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use larder_core::GatewayConfig;

/// Default API server.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default page size for list commands.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the Larder API
    pub api_url: ConfigValue<String>,
    /// Directory holding the auth token
    pub data_dir: ConfigValue<PathBuf>,
    /// Request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Page size for list commands
    pub per_page: ConfigValue<u32>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    per_page: Option<u32>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut api_url = ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut per_page = ConfigValue::new(DEFAULT_PER_PAGE, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
            if let Some(n) = file_config.per_page {
                per_page = ConfigValue::new(n, ConfigSource::File);
            }
        }

        if let Some(url) = env("LARDER_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Some(dir) = env("LARDER_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(raw) = env("LARDER_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LARDER_TIMEOUT_SECS", raw.clone()))?;
            timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        if timeout_secs.value == 0 {
            return Err(ConfigError::InvalidValue("timeout_secs", "0".to_string()));
        }
        if per_page.value == 0 {
            return Err(ConfigError::InvalidValue("per_page", "0".to_string()));
        }

        Ok(Self {
            api_url,
            data_dir,
            timeout_secs,
            per_page,
            config_file,
        })
    }

    /// Gateway settings derived from this configuration.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig::new(self.api_url.value.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs.value))
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/larder/
    /// - macOS: ~/Library/Application Support/larder/
    /// - Windows: %APPDATA%/larder/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/larder/
    /// - macOS: ~/Library/Application Support/larder/
    /// - Windows: %APPDATA%/larder/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(config.api_url.value, DEFAULT_API_URL);
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert!(config.data_dir.value.ends_with("larder"));
        assert_eq!(config.timeout_secs.value, 30);
        assert_eq!(config.per_page.value, 10);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: https://larder.example.com").unwrap();
        writeln!(file, "data_dir: /var/lib/larder").unwrap();
        writeln!(file, "timeout_secs: 5").unwrap();
        writeln!(file, "per_page: 25").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(config.api_url.value, "https://larder.example.com");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert_eq!(config.data_dir.value, PathBuf::from("/var/lib/larder"));
        assert_eq!(config.timeout_secs.value, 5);
        assert_eq!(config.per_page.value, 25);
        assert_eq!(config.per_page.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: state\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "api_url: http://fromfile\ntimeout_secs: 5\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("LARDER_API_URL", "http://fromenv"),
            ("LARDER_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();

        let config =
            Config::load_with_env(Some(config_path), |k| env.get(k).map(|v| v.to_string()))
                .unwrap();
        assert_eq!(config.api_url.value, "http://fromenv");
        assert_eq!(config.api_url.source, ConfigSource::Environment);
        assert_eq!(config.timeout_secs.value, 12);
        assert_eq!(config.timeout_secs.source, ConfigSource::Environment);
        assert_eq!(config.per_page.source, ConfigSource::Default);
    }

    #[test]
    fn test_invalid_env_timeout() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let result = Config::load_with_env(Some(config_path), |k| {
            (k == "LARDER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("LARDER_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_per_page_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "per_page: 0\n").unwrap();

        assert!(Config::load_with_env(Some(config_path), no_env).is_err());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_gateway_config() {
        let temp_dir = tempdir().unwrap();
        let config =
            Config::load_with_env(Some(temp_dir.path().join("none.yaml")), no_env).unwrap();
        let gateway = config.gateway();
        assert_eq!(gateway.base_url, DEFAULT_API_URL);
        assert_eq!(gateway.timeout, Duration::from_secs(30));
    }
}
