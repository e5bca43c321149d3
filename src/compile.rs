//! End-to-end compilation from a question to a report specification.
//!
//! ```text
//! question → normalize → comparative → resolver → dates → compatibility
//!          → overlay → compatibility → fallback → ParsedQuerySpec
//! ```
//!
//! # Example
//!
//! ```ignore
//! use augur::compile::{CompileOptions, QueryCompiler};
//! use chrono::NaiveDate;
//!
//! let compiler = QueryCompiler::builtin(CompileOptions::default())?;
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//! let output = compiler.compile_on("top 5 pages last month", None, today);
//!
//! assert_eq!(output.spec.limit, Some(5));
//! println!("{}", output.spec);
//! ```

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{self, BuiltinCatalogProvider, Catalog, CatalogError, CatalogProvider};
use crate::config::{CompilerSettings, Settings, SettingsError};
use crate::model::{ConversationContext, DateCue, Filters, ParsedQuerySpec, PROVIDER_MAX_LIMIT};
use crate::rules::{self, RuleBook, RuleIssue, RulesError};
use crate::stages::resolver::Strategy;
use crate::stages::{
    comparative, compatibility, dates, fallback, normalize, overlay, resolver, Diagnostic, Stage,
};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while building a compiler. Compiling a question never fails.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Rule book is inconsistent with the catalog:\n{}", format_issues(.0))]
    InvalidRules(Vec<RuleIssue>),

    #[error("Default metric '{0}' is not in the catalog")]
    UnknownDefaultMetric(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

fn format_issues(issues: &[RuleIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Evaluation date. The local date is read per call when unset.
    pub today: Option<NaiveDate>,

    /// Window used when the question carries no date cue.
    pub default_window_days: u32,

    /// Upper bound for row limits.
    pub max_limit: u32,

    /// Metric applied when nothing names one.
    pub default_metric: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from(&CompilerSettings::default())
    }
}

impl From<&CompilerSettings> for CompileOptions {
    fn from(settings: &CompilerSettings) -> Self {
        Self {
            today: None,
            default_window_days: settings.default_window_days,
            max_limit: settings.max_limit.min(PROVIDER_MAX_LIMIT),
            default_metric: settings.default_metric.clone(),
        }
    }
}

impl CompileOptions {
    /// Pin the evaluation date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_default_window_days(mut self, days: u32) -> Self {
        self.default_window_days = days;
        self
    }

    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit.min(PROVIDER_MAX_LIMIT);
        self
    }

    pub fn with_default_metric(mut self, metric: impl Into<String>) -> Self {
        self.default_metric = metric.into();
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling one question.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutput {
    /// The report specification.
    pub spec: ParsedQuerySpec,

    /// The resolver strategy that produced metrics and dimensions.
    pub strategy: Strategy,

    /// Advisory notes (dropped dimensions, default window, ...).
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles questions against a fixed catalog and rule book.
///
/// Immutable after construction; share it across threads freely.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    catalog: Catalog,
    rules: RuleBook,
    options: CompileOptions,
}

impl QueryCompiler {
    /// Build a compiler, checking the rule book against the catalog.
    pub fn new(catalog: Catalog, rules: RuleBook, options: CompileOptions) -> CompileResult<Self> {
        if !catalog.is_metric(&options.default_metric) {
            return Err(CompileError::UnknownDefaultMetric(options.default_metric));
        }
        rules::validate(&rules, &catalog).map_err(CompileError::InvalidRules)?;
        Ok(Self {
            catalog,
            rules,
            options,
        })
    }

    /// The built-in catalog and rule book.
    pub fn builtin(options: CompileOptions) -> CompileResult<Self> {
        let catalog = BuiltinCatalogProvider.load()?;
        let rules = RuleBook::builtin()?;
        Self::new(catalog, rules, options)
    }

    /// Load catalog and rule book from the locations named in `settings`.
    pub fn from_settings(settings: &Settings) -> CompileResult<Self> {
        let provider = catalog::provider_for(&settings.catalog)?;
        info!(source = %provider.describe(), "loading catalog");
        let catalog = provider.load()?;

        let rules_path = settings.rules.resolved_path()?;
        let rules = RuleBook::load(rules_path.as_deref())?;
        info!(version = rules.version, "loaded rule book");

        Self::new(catalog, rules, CompileOptions::from(&settings.compiler))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a question, evaluated on the pinned date or today.
    pub fn compile(&self, question: &str, context: Option<&ConversationContext>) -> CompileOutput {
        let today = self.options.today.unwrap_or_else(|| Local::now().date_naive());
        self.compile_on(question, context, today)
    }

    /// Compile a question as if evaluated on `today`.
    pub fn compile_on(
        &self,
        question: &str,
        context: Option<&ConversationContext>,
        today: NaiveDate,
    ) -> CompileOutput {
        let mut diagnostics = Vec::new();

        // Step 1: Normalize
        let question = normalize::normalize(question);
        debug!(%question, %today, "compiling question");

        // Step 2: Comparative periods
        let comparative =
            comparative::detect(&question, &self.rules.comparative, today, &mut diagnostics);

        // Step 3: Metrics and dimensions
        let masked = dates::temporal_spans(&question);
        let resolution = resolver::resolve(
            &question,
            &self.rules,
            &self.catalog,
            &self.options.default_metric,
            context,
            &masked,
            &mut diagnostics,
        );

        // Step 4: Date range
        let window = resolution
            .default_time_range
            .unwrap_or(self.options.default_window_days);
        let period = dates::extract(&question, today, window);
        debug!(cue = %period.cue, range = %period.range, "date range resolved");
        if matches!(period.cue, DateCue::Default { .. }) {
            diagnostics.push(Diagnostic::new(
                Stage::Dates,
                format!("no date in the question; using the last {} days", window),
            ));
        }

        let mut spec = ParsedQuerySpec {
            metrics: resolution.metrics,
            dimensions: resolution.dimensions,
            date_range: period.range,
            filters: Filters::new(),
            limit: None,
            suggestion: resolution.suggestion,
            llm_needed: false,
            comparative,
        };

        // Step 5: Compatibility
        compatibility::enforce(
            &self.catalog,
            &spec.metrics,
            &mut spec.dimensions,
            &mut diagnostics,
        );

        // Step 6: Business rules, then re-check what they injected
        let outcome = overlay::apply(
            &question,
            &self.rules.overlay,
            self.options.max_limit,
            &mut spec,
        );
        compatibility::enforce(
            &self.catalog,
            &spec.metrics,
            &mut spec.dimensions,
            &mut diagnostics,
        );

        // Step 7: Fallback
        if fallback::needs_clarification(&resolution.strategy, &spec.dimensions, &outcome) {
            spec.llm_needed = true;
            spec.suggestion = Some(self.rules.clarification.clone());
            diagnostics.push(Diagnostic::new(
                Stage::Fallback,
                "question not understood; asking for clarification",
            ));
        }

        info!(
            strategy = %resolution.strategy,
            llm_needed = spec.llm_needed,
            "compiled question"
        );

        CompileOutput {
            spec,
            strategy: resolution.strategy,
            diagnostics,
        }
    }
}
