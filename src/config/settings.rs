//! TOML-based configuration for augur.
//!
//! Supports a config file (augur.toml) with environment variable expansion
//! in paths.
//!
//! Example configuration:
//! ```toml
//! [catalog]
//! path = "${AUGUR_HOME}/catalog.json"   # built-in GA4 catalog when omitted
//!
//! [rules]
//! path = "./rules.toml"                 # built-in rule book when omitted
//!
//! [compiler]
//! default_window_days = 30
//! max_limit = 1000
//! default_metric = "sessions"
//!
//! [report]
//! default_limit = 100
//!
//! [logging]
//! level = "info"
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::PROVIDER_MAX_LIMIT;
use crate::report::DEFAULT_REPORT_LIMIT;

/// `${VAR}` or `$VAR`
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").unwrap());

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub rules: RulesSettings,
    pub compiler: CompilerSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

/// Where the metric/dimension catalog comes from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// JSON catalog document (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl CatalogSettings {
    /// The configured path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        resolve_optional_path(self.path.as_deref())
    }
}

/// Where the rule book comes from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesSettings {
    /// TOML rule book (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl RulesSettings {
    /// The configured path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        resolve_optional_path(self.path.as_deref())
    }
}

/// Compiler behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Window used when a question carries no date cue.
    pub default_window_days: u32,

    /// Upper bound for extracted row limits.
    pub max_limit: u32,

    /// Metric applied when nothing in the question names one.
    pub default_metric: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            default_window_days: 30,
            max_limit: PROVIDER_MAX_LIMIT,
            default_metric: "sessions".to_string(),
        }
    }
}

/// Report request defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Row limit sent when the question asked for none.
    pub default_limit: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_REPORT_LIMIT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive ("info", "augur=debug", ...). `RUST_LOG`
    /// takes precedence when set.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `AUGUR_CONFIG`
    /// 2. `./augur.toml`
    /// 3. `~/.config/augur/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("AUGUR_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("augur.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("augur").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values the compiler cannot honour.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let compiler = &self.compiler;
        if compiler.default_window_days == 0 {
            return Err(SettingsError::InvalidConfig(
                "compiler.default_window_days must be at least 1".to_string(),
            ));
        }
        if compiler.max_limit == 0 || compiler.max_limit > PROVIDER_MAX_LIMIT {
            return Err(SettingsError::InvalidConfig(format!(
                "compiler.max_limit must be between 1 and {}",
                PROVIDER_MAX_LIMIT
            )));
        }
        if compiler.default_metric.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "compiler.default_metric must not be empty".to_string(),
            ));
        }
        if self.report.default_limit == 0 || self.report.default_limit > PROVIDER_MAX_LIMIT {
            return Err(SettingsError::InvalidConfig(format!(
                "report.default_limit must be between 1 and {}",
                PROVIDER_MAX_LIMIT
            )));
        }
        Ok(())
    }
}

fn resolve_optional_path(path: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
    match path {
        Some(path) if !path.trim().is_empty() => Ok(Some(PathBuf::from(expand_env_vars(path)?))),
        _ => Ok(None),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as-is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
