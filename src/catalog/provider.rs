//! CatalogProvider trait definition.
//!
//! A provider knows where a catalog document lives and how to turn it into a
//! validated [`Catalog`]. Providers are consulted once at startup; the
//! compiler itself never touches them.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Catalog, CatalogError, CatalogResult};
use crate::config::{CatalogSettings, SettingsError};

/// The GA4 catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Source of the metric/dimension catalog.
///
/// # Example
///
/// ```ignore
/// use augur::catalog::{BuiltinCatalogProvider, CatalogProvider};
///
/// let catalog = BuiltinCatalogProvider.load()?;
/// assert!(catalog.is_metric("sessions"));
/// ```
pub trait CatalogProvider: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Load and validate the catalog.
    fn load(&self) -> CatalogResult<Catalog>;
}

/// Serves the catalog compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalogProvider;

impl CatalogProvider for BuiltinCatalogProvider {
    fn describe(&self) -> String {
        "built-in GA4 catalog".to_string()
    }

    fn load(&self) -> CatalogResult<Catalog> {
        Catalog::from_json(BUILTIN_CATALOG)
    }
}

/// Reads a JSON catalog document from disk.
#[derive(Debug, Clone)]
pub struct FileCatalogProvider {
    path: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for FileCatalogProvider {
    fn describe(&self) -> String {
        format!("catalog file {}", self.path.display())
    }

    fn load(&self) -> CatalogResult<Catalog> {
        if !self.path.exists() {
            return Err(CatalogError::FileNotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        Catalog::from_json(&content)
    }
}

/// Pick the provider named by the settings: a file when a path is
/// configured, the built-in catalog otherwise.
pub fn provider_for(settings: &CatalogSettings) -> Result<Box<dyn CatalogProvider>, SettingsError> {
    let provider: Box<dyn CatalogProvider> = match settings.resolved_path()? {
        Some(path) => Box::new(FileCatalogProvider::new(path)),
        None => Box::new(BuiltinCatalogProvider),
    };
    Ok(provider)
}
