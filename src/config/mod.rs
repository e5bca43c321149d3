//! Configuration module for augur.
//!
//! Handles the settings file, environment variable expansion and the
//! compiler/report defaults.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, CompilerSettings, LoggingSettings, ReportSettings,
    RulesSettings, Settings, SettingsError,
};
