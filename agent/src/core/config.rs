use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::utils::file::expand_path;
use crate::utils::string::mask_secret;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_GENERATE_CONFIG_SECS,
    DEFAULT_INTERVAL_SECS, DEFAULT_MYSQL_HOST, DEFAULT_MYSQL_PORT, DEFAULT_MYSQL_USER,
    DEFAULT_READ_CONFIG_SECS,
};

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// MySQL connection section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MysqlFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// AWS section (monitored RDS instance)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AwsFileConfig {
    pub region: Option<String>,
    pub rds_db: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub interval_seconds: Option<u64>,
    pub interval_read_config_seconds: Option<u64>,
    pub interval_generate_config_seconds: Option<u64>,
    pub call_timeout_seconds: Option<u64>,
    pub debug: Option<bool>,
    pub apikey: Option<String>,
    pub api_url: Option<String>,
    pub hostname: Option<String>,
    pub mysql: Option<MysqlFileConfig>,
    pub aws: Option<AwsFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    pub(crate) fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "Loading config file");
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    pub(crate) fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Final Config
// =============================================================================

/// MySQL connection settings
#[derive(Clone, PartialEq)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for MysqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &mask_secret(&self.password))
            .finish()
    }
}

/// Settings snapshot used by the worker. Replaced wholesale on reload.
#[derive(Clone, PartialEq)]
pub struct AgentConfig {
    pub interval_seconds: u64,
    pub read_config_seconds: u64,
    pub generate_config_seconds: u64,
    pub call_timeout_seconds: u64,
    pub debug: bool,
    pub api_key: String,
    pub api_url: String,
    pub hostname: Option<String>,
    pub aws_region: Option<String>,
    pub aws_rds_db: Option<String>,
    pub mysql: MysqlConfig,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("interval_seconds", &self.interval_seconds)
            .field("read_config_seconds", &self.read_config_seconds)
            .field("generate_config_seconds", &self.generate_config_seconds)
            .field("call_timeout_seconds", &self.call_timeout_seconds)
            .field("debug", &self.debug)
            .field("api_key", &self.masked_api_key())
            .field("api_url", &self.api_url)
            .field("hostname", &self.hostname)
            .field("aws_region", &self.aws_region)
            .field("aws_rds_db", &self.aws_rds_db)
            .field("mysql", &self.mysql)
            .finish()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_INTERVAL_SECS,
            read_config_seconds: DEFAULT_READ_CONFIG_SECS,
            generate_config_seconds: DEFAULT_GENERATE_CONFIG_SECS,
            call_timeout_seconds: DEFAULT_CALL_TIMEOUT_SECS,
            debug: false,
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            hostname: None,
            aws_region: None,
            aws_rds_db: None,
            mysql: MysqlConfig {
                host: DEFAULT_MYSQL_HOST.to_string(),
                port: DEFAULT_MYSQL_PORT,
                user: DEFAULT_MYSQL_USER.to_string(),
                password: String::new(),
            },
        }
    }
}

impl AgentConfig {
    /// Build from a parsed file, layering CLI/env overrides on top
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Config file
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn from_file_config(
        file_config: FileConfig,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let file_mysql = file_config.mysql.unwrap_or_default();
        let file_aws = file_config.aws.unwrap_or_default();

        let config = Self {
            interval_seconds: file_config
                .interval_seconds
                .unwrap_or(defaults.interval_seconds),
            read_config_seconds: file_config
                .interval_read_config_seconds
                .unwrap_or(defaults.read_config_seconds),
            generate_config_seconds: file_config
                .interval_generate_config_seconds
                .unwrap_or(defaults.generate_config_seconds),
            call_timeout_seconds: file_config
                .call_timeout_seconds
                .unwrap_or(defaults.call_timeout_seconds),
            // debug: CLI/env flag takes precedence, then file config, default false
            debug: overrides.debug || file_config.debug.unwrap_or(false),
            api_key: overrides
                .api_key
                .clone()
                .or(file_config.apikey)
                .unwrap_or_default(),
            api_url: file_config
                .api_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            hostname: file_config.hostname,
            aws_region: file_aws.region.filter(|r| !r.is_empty()),
            aws_rds_db: file_aws.rds_db.filter(|d| !d.is_empty()),
            mysql: MysqlConfig {
                host: file_mysql.host.unwrap_or(defaults.mysql.host),
                port: file_mysql.port.unwrap_or(defaults.mysql.port),
                user: file_mysql.user.unwrap_or(defaults.mysql.user),
                password: file_mysql.password.unwrap_or_default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("interval_seconds", self.interval_seconds),
            ("interval_read_config_seconds", self.read_config_seconds),
            (
                "interval_generate_config_seconds",
                self.generate_config_seconds,
            ),
            ("call_timeout_seconds", self.call_timeout_seconds),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be greater than 0", name)));
            }
        }
        if self.api_url.is_empty() {
            return Err(ConfigError::Invalid("api_url must not be empty".into()));
        }
        Ok(())
    }

    pub fn collection_period(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn read_config_period(&self) -> Duration {
        Duration::from_secs(self.read_config_seconds)
    }

    pub fn generate_period(&self) -> Duration {
        Duration::from_secs(self.generate_config_seconds)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }

    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Values from CLI/env that win over the config file on every (re)load
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub debug: bool,
    pub api_key: Option<String>,
}

impl From<&CliConfig> for ConfigOverrides {
    fn from(cli: &CliConfig) -> Self {
        Self {
            debug: cli.debug,
            api_key: cli.api_key.clone(),
        }
    }
}

/// Produces a replacement configuration from a location
pub trait ConfigLoader: Send + Sync {
    fn load(&self, location: &Path) -> Result<AgentConfig, ConfigError>;
}

/// Reads the JSON config file and applies CLI/env overrides
#[derive(Debug, Clone, Default)]
pub struct FileConfigLoader {
    overrides: ConfigOverrides,
}

impl FileConfigLoader {
    pub fn new(overrides: ConfigOverrides) -> Self {
        Self { overrides }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self, location: &Path) -> Result<AgentConfig, ConfigError> {
        let file_config = FileConfig::load_from_file(location)?;
        file_config.warn_unknown_fields();
        AgentConfig::from_file_config(file_config, &self.overrides)
    }
}

/// Resolve the config file location: CLI/env path, else the local file name
pub fn resolve_config_path(cli: &CliConfig) -> PathBuf {
    match cli.config {
        Some(ref path) => expand_path(&path.to_string_lossy()),
        None => expand_path(CONFIG_FILE_NAME),
    }
}
