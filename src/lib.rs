//! # Augur
//!
//! Compiles free-text analytics questions, in French or English, into
//! validated GA4 report specifications.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Question (free text)                     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [normalize, comparative]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Normalized question + optional two periods        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver: smart rules → intents → catalog scan]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Metrics, dimensions, suggestion             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dates, compatibility, overlay, fallback]
//! ┌─────────────────────────────────────────────────────────┐
//! │                   ParsedQuerySpec                        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report]
//! ┌─────────────────────────────────────────────────────────┐
//! │            runReport request body(ies)                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`catalog`] and the [`rules`] book are loaded once and injected into
//! a [`QueryCompiler`]; compiling a question is pure and never fails.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod model;
pub mod report;
pub mod rules;
pub mod stages;

pub use catalog::{Catalog, CatalogError, CatalogProvider};
pub use compile::{CompileError, CompileOptions, CompileOutput, QueryCompiler};
pub use config::Settings;
pub use model::{ComparativePeriods, ConversationContext, DateRange, FilterValue, ParsedQuerySpec};
pub use rules::{RuleBook, RulesError};
pub use stages::resolver::Strategy;
pub use stages::Diagnostic;
