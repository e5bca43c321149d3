//! The rule book: ordered, reviewable resolution data.
//!
//! Everything the compiler knows about the *language* of questions lives here
//! rather than in code: smart rules, intents, synonyms, comparative markers and
//! the vocabularies of the business rule overlay. The built-in book is
//! `data/rules.toml`; a deployment may point `rules.path` at its own copy.
//!
//! Declaration order is part of the data. Smart rules and intents are
//! evaluated top to bottom with first-match-wins semantics.
//!
//! ```toml
//! [[smart_rules]]
//! name = "top_pages"
//! keywords = ["top pages", "pages les plus vues"]
//! metrics = ["screenPageViews"]
//! dimensions = ["pagePath"]
//!
//! [[intents]]
//! name = "traffic"
//! keywords = ["sessions", "visites"]
//! metrics = ["sessions"]
//! dimensions = ["date", "country"]
//! ```

mod validation;

pub use validation::{validate, RuleIssue};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::stages::normalize::{contains_phrase, normalize};

/// The rule book shipped with the crate.
const BUILTIN_RULES: &str = include_str!("../../data/rules.toml");

/// Errors raised while loading a rule book.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("Rule book not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read rule book: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse rule book: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub type RulesResult<T> = Result<T, RulesError>;

/// A curated keyword shortcut, already known to be compatible.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SmartRule {
    pub name: String,
    pub keywords: Vec<String>,
    pub metrics: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

impl SmartRule {
    /// The first keyword found in the question.
    pub fn matched_keyword(&self, question: &str) -> Option<&str> {
        first_keyword(&self.keywords, question)
    }
}

/// A question category with default metrics and dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IntentEntry {
    pub name: String,
    pub keywords: Vec<String>,
    pub metrics: Vec<String>,
    /// The first entry is the primary (default) dimension.
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Window in days used when the question carries no date cue.
    #[serde(default)]
    pub default_time_range: Option<u32>,
}

impl IntentEntry {
    pub fn matched_keyword(&self, question: &str) -> Option<&str> {
        first_keyword(&self.keywords, question)
    }

    pub fn primary_dimension(&self) -> Option<&str> {
        self.dimensions.first().map(String::as_str)
    }
}

/// A natural-language phrase standing for a metric or dimension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Synonym {
    pub phrase: String,
    pub token: String,
}

/// Phrases that mark a two-period comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComparativeRules {
    pub markers: Vec<String>,
}

/// A spelled-out number after "top".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpelledNumber {
    pub word: String,
    pub value: u32,
}

/// A phrase mapped to a filter label ("france" -> "France").
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelPhrase {
    pub phrase: String,
    pub value: String,
}

/// Catalog names the overlay reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayFields {
    pub month: String,
    pub channel_group: String,
    pub source: String,
    pub medium: String,
    pub device_category: String,
    pub day_of_week: String,
    pub country: String,
    pub average_session_duration: String,
    pub conversion_rate: String,
    pub purchase_count: String,
}

impl Default for OverlayFields {
    fn default() -> Self {
        Self {
            month: "month".to_string(),
            channel_group: "sessionDefaultChannelGroup".to_string(),
            source: "sessionSource".to_string(),
            medium: "sessionMedium".to_string(),
            device_category: "deviceCategory".to_string(),
            day_of_week: "dayOfWeekName".to_string(),
            country: "country".to_string(),
            average_session_duration: "averageSessionDuration".to_string(),
            conversion_rate: "sessionConversionRate".to_string(),
            purchase_count: "itemsPurchased".to_string(),
        }
    }
}

impl OverlayFields {
    /// `(setting name, value)` for every dimension field.
    pub fn dimension_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("month", self.month.as_str()),
            ("channel_group", self.channel_group.as_str()),
            ("source", self.source.as_str()),
            ("medium", self.medium.as_str()),
            ("device_category", self.device_category.as_str()),
            ("day_of_week", self.day_of_week.as_str()),
            ("country", self.country.as_str()),
        ]
    }

    /// `(setting name, value)` for every metric field.
    pub fn metric_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("average_session_duration", self.average_session_duration.as_str()),
            ("conversion_rate", self.conversion_rate.as_str()),
            ("purchase_count", self.purchase_count.as_str()),
        ]
    }
}

/// Vocabularies and labels for the business rule overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayRules {
    pub fields: OverlayFields,
    pub trend: Vec<String>,
    pub organic: Vec<String>,
    pub paid: Vec<String>,
    pub channel: Vec<String>,
    pub duration: Vec<String>,
    pub conversion_rate: Vec<String>,
    pub day_of_week: Vec<String>,
    pub sales: Vec<String>,
    pub top_generic: Vec<String>,
    pub organic_channel: String,
    pub paid_channels: Vec<String>,
    pub top_spelled: Vec<SpelledNumber>,
    pub countries: Vec<LabelPhrase>,
    pub devices: Vec<LabelPhrase>,
}

/// The complete rule book.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleBook {
    #[serde(default)]
    pub version: u32,
    #[serde(default = "default_clarification")]
    pub clarification: String,
    #[serde(default)]
    pub smart_rules: Vec<SmartRule>,
    #[serde(default)]
    pub intents: Vec<IntentEntry>,
    #[serde(default)]
    pub synonyms: Vec<Synonym>,
    #[serde(default)]
    pub comparative: ComparativeRules,
    #[serde(default)]
    pub overlay: OverlayRules,
}

fn default_clarification() -> String {
    "Could you rephrase the question with a metric (sessions, users, page views...) \
     or a dimension (country, device, channel...)?"
        .to_string()
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            version: 0,
            clarification: default_clarification(),
            smart_rules: Vec::new(),
            intents: Vec::new(),
            synonyms: Vec::new(),
            comparative: ComparativeRules::default(),
            overlay: OverlayRules::default(),
        }
    }
}

impl RuleBook {
    /// The rule book compiled into the binary.
    pub fn builtin() -> RulesResult<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// Load a rule book from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RulesResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RulesError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a rule book and normalize its vocabularies.
    pub fn from_toml_str(content: &str) -> RulesResult<Self> {
        let rules: RuleBook = toml::from_str(content)?;
        Ok(rules.normalized())
    }

    /// Load the book named by `path`, or the built-in one.
    pub fn load(path: Option<&Path>) -> RulesResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Lower-case every phrase so it compares against normalized questions.
    ///
    /// Catalog names and filter labels keep their case.
    pub fn normalized(mut self) -> Self {
        let normalize_all = |phrases: &mut Vec<String>| {
            for phrase in phrases.iter_mut() {
                *phrase = normalize(phrase);
            }
        };

        for rule in &mut self.smart_rules {
            normalize_all(&mut rule.keywords);
        }
        for intent in &mut self.intents {
            normalize_all(&mut intent.keywords);
        }
        for synonym in &mut self.synonyms {
            synonym.phrase = normalize(&synonym.phrase);
        }
        normalize_all(&mut self.comparative.markers);

        let overlay = &mut self.overlay;
        for vocabulary in [
            &mut overlay.trend,
            &mut overlay.organic,
            &mut overlay.paid,
            &mut overlay.channel,
            &mut overlay.duration,
            &mut overlay.conversion_rate,
            &mut overlay.day_of_week,
            &mut overlay.sales,
            &mut overlay.top_generic,
        ] {
            normalize_all(vocabulary);
        }
        for spelled in &mut overlay.top_spelled {
            spelled.word = normalize(&spelled.word);
        }
        for label in overlay.countries.iter_mut().chain(overlay.devices.iter_mut()) {
            label.phrase = normalize(&label.phrase);
        }
        self
    }

    /// First smart rule (declaration order) matching the question.
    pub fn smart_rule_for(&self, question: &str) -> Option<(&SmartRule, &str)> {
        self.smart_rules
            .iter()
            .find_map(|rule| rule.matched_keyword(question).map(|kw| (rule, kw)))
    }

    /// First intent (declaration order) matching the question.
    pub fn intent_for(&self, question: &str) -> Option<(&IntentEntry, &str)> {
        self.intents
            .iter()
            .find_map(|intent| intent.matched_keyword(question).map(|kw| (intent, kw)))
    }
}

fn first_keyword<'a>(keywords: &'a [String], question: &str) -> Option<&'a str> {
    keywords
        .iter()
        .find(|keyword| contains_phrase(question, keyword))
        .map(String::as_str)
}
