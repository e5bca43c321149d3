//! The metric/dimension catalog.
//!
//! The catalog is the universe of names the reporting backend accepts, plus a
//! compatibility map restricting which dimensions may accompany a metric in a
//! single query. It is loaded once through a [`CatalogProvider`] and shared
//! read-only by every compilation.
//!
//! # Document format
//!
//! ```json
//! {
//!   "metrics":    { "traffic": { "sessions": "Number of sessions" } },
//!   "dimensions": { "geography": { "country": "Country of the user" } },
//!   "compatibility": { "itemsPurchased": ["itemName", "date"] }
//! }
//! ```
//!
//! Fields are grouped for display only; names must be unique across all
//! groups and across metrics and dimensions.

pub mod inflection;
mod provider;

pub use provider::{provider_for, BuiltinCatalogProvider, CatalogProvider, FileCatalogProvider};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::PathBuf;

use crate::stages::normalize::find_word_outside;

/// Errors raised while building a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Catalog declares no metrics")]
    NoMetrics,

    #[error("'{0}' is declared as both a metric and a dimension")]
    AmbiguousName(String),

    #[error("Compatibility entry for unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("Compatibility entry for '{metric}' references unknown dimension '{dimension}'")]
    UnknownDimension { metric: String, dimension: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Whether a name is a metric or a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Metric,
    Dimension,
}

/// Display metadata for one catalog field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub group: String,
    pub description: String,
}

/// On-disk catalog document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogDocument {
    /// group -> name -> description
    pub metrics: BTreeMap<String, BTreeMap<String, String>>,
    /// group -> name -> description
    pub dimensions: BTreeMap<String, BTreeMap<String, String>>,
    /// metric -> allowed dimensions
    pub compatibility: BTreeMap<String, Vec<String>>,
}

/// A catalog field mentioned in a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
    /// Byte offset of the first occurrence in the question.
    pub position: usize,
}

/// Immutable set of metrics, dimensions and their compatibility.
#[derive(Debug, Clone)]
pub struct Catalog {
    metrics: BTreeMap<String, FieldInfo>,
    dimensions: BTreeMap<String, FieldInfo>,
    compatibility: BTreeMap<String, BTreeSet<String>>,
    /// name -> forms a question may use for it
    surface_forms: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Build a catalog from a parsed document, validating cross references.
    pub fn from_document(document: CatalogDocument) -> CatalogResult<Self> {
        let metrics = flatten_groups(document.metrics);
        let dimensions = flatten_groups(document.dimensions);

        if metrics.is_empty() {
            return Err(CatalogError::NoMetrics);
        }
        if let Some(name) = metrics.keys().find(|name| dimensions.contains_key(*name)) {
            return Err(CatalogError::AmbiguousName(name.clone()));
        }

        let mut compatibility = BTreeMap::new();
        for (metric, allowed) in document.compatibility {
            if !metrics.contains_key(&metric) {
                return Err(CatalogError::UnknownMetric(metric));
            }
            if let Some(dimension) = allowed.iter().find(|d| !dimensions.contains_key(*d)) {
                return Err(CatalogError::UnknownDimension {
                    metric,
                    dimension: dimension.clone(),
                });
            }
            compatibility.insert(metric, allowed.into_iter().collect());
        }

        let surface_forms = metrics
            .keys()
            .chain(dimensions.keys())
            .map(|name| (name.clone(), inflection::surface_forms(name)))
            .collect();

        Ok(Self {
            metrics,
            dimensions,
            compatibility,
            surface_forms,
        })
    }

    /// Parse and validate a JSON catalog document.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Build a catalog from bare names. Handy for substitute catalogs in tests.
    pub fn from_names(
        metrics: &[&str],
        dimensions: &[&str],
        compatibility: &[(&str, &[&str])],
    ) -> CatalogResult<Self> {
        let group = |names: &[&str]| {
            let fields: BTreeMap<String, String> = names
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect();
            BTreeMap::from([("default".to_string(), fields)])
        };
        Self::from_document(CatalogDocument {
            metrics: group(metrics),
            dimensions: group(dimensions),
            compatibility: compatibility
                .iter()
                .map(|(metric, allowed)| {
                    (
                        metric.to_string(),
                        allowed.iter().map(|d| d.to_string()).collect(),
                    )
                })
                .collect(),
        })
    }

    pub fn is_metric(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn is_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        if self.is_metric(name) {
            Some(FieldKind::Metric)
        } else if self.is_dimension(name) {
            Some(FieldKind::Dimension)
        } else {
            None
        }
    }

    /// Metric names in sorted order.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, &FieldInfo)> {
        self.metrics.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Dimension names in sorted order.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &FieldInfo)> {
        self.dimensions.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn describe(&self, name: &str) -> Option<&FieldInfo> {
        self.metrics.get(name).or_else(|| self.dimensions.get(name))
    }

    /// The dimensions allowed with `metric`, if the metric is restricted.
    pub fn allowed_dimensions(&self, metric: &str) -> Option<&BTreeSet<String>> {
        self.compatibility.get(metric)
    }

    /// True when `dimension` may accompany `metric`.
    ///
    /// Metrics without a compatibility entry accept every dimension.
    pub fn is_compatible(&self, metric: &str, dimension: &str) -> bool {
        self.allowed_dimensions(metric)
            .map_or(true, |allowed| allowed.contains(dimension))
    }

    /// Forms under which `name` may appear in a normalized question.
    pub fn surface_forms(&self, name: &str) -> &[String] {
        self.surface_forms
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of the first word-bounded mention of `name` outside `masked`.
    pub fn mention_position(
        &self,
        question: &str,
        name: &str,
        masked: &[Range<usize>],
    ) -> Option<usize> {
        self.surface_forms(name)
            .iter()
            .filter_map(|form| find_word_outside(question, form, masked))
            .min()
    }

    /// Every catalog field named in `question`, in order of appearance.
    ///
    /// Ties (two names at the same offset) are broken by name so the result
    /// is deterministic.
    pub fn mentions<'a>(&'a self, question: &str, masked: &[Range<usize>]) -> Vec<Mention<'a>> {
        let mut found: Vec<Mention<'a>> = self
            .surface_forms
            .keys()
            .filter_map(|name| {
                let position = self.mention_position(question, name, masked)?;
                let kind = self.kind_of(name)?;
                Some(Mention {
                    name: name.as_str(),
                    kind,
                    position,
                })
            })
            .collect();
        found.sort_by(|a, b| a.position.cmp(&b.position).then(a.name.cmp(b.name)));
        found
    }
}

fn flatten_groups(groups: BTreeMap<String, BTreeMap<String, String>>) -> BTreeMap<String, FieldInfo> {
    let mut fields = BTreeMap::new();
    for (group, entries) in groups {
        for (name, description) in entries {
            fields.insert(
                name,
                FieldInfo {
                    group: group.clone(),
                    description,
                },
            );
        }
    }
    fields
}
