//! Tests for rule book loading and validation.

use augur::catalog::{BuiltinCatalogProvider, Catalog, CatalogProvider};
use augur::compile::{CompileError, CompileOptions, QueryCompiler};
use augur::rules::{validate, RuleBook, RuleIssue, RulesError};
use std::fs;

fn builtin_catalog() -> Catalog {
    BuiltinCatalogProvider.load().unwrap()
}

// ============================================================================
// Built-in Rule Book
// ============================================================================

#[test]
fn test_builtin_book_is_consistent() {
    let rules = RuleBook::builtin().unwrap();
    assert_eq!(validate(&rules, &builtin_catalog()), Ok(()));
}

#[test]
fn test_builtin_intent_order() {
    let rules = RuleBook::builtin().unwrap();
    let names: Vec<&str> = rules.intents.iter().map(|i| i.name.as_str()).collect();

    // "pages" must be tried before the generic traffic words
    let page_views = names.iter().position(|n| *n == "page_views").unwrap();
    let traffic = names.iter().position(|n| *n == "traffic").unwrap();
    assert!(page_views < traffic);
}

#[test]
fn test_smart_rules_take_precedence_over_intents() {
    let rules = RuleBook::builtin().unwrap();
    let question = "sessions par pays";

    let (rule, _) = rules.smart_rule_for(question).unwrap();
    assert_eq!(rule.name, "visits_by_country");
    // The intent catalog would have matched too
    assert!(rules.intent_for(question).is_some());
}

#[test]
fn test_builtin_vocabularies_are_normalized() {
    let rules = RuleBook::builtin().unwrap();
    let all_lowercase = |phrases: &[String]| phrases.iter().all(|p| *p == p.to_lowercase());

    assert!(rules.smart_rules.iter().all(|r| all_lowercase(&r.keywords)));
    assert!(rules.intents.iter().all(|i| all_lowercase(&i.keywords)));
    assert!(all_lowercase(&rules.comparative.markers));
    assert!(all_lowercase(&rules.overlay.top_generic));
    // Labels keep their case
    assert!(rules.overlay.countries.iter().any(|c| c.value == "France"));
}

// ============================================================================
// Custom Rule Books
// ============================================================================

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("augur_rules_{}.toml", std::process::id()));
    fs::write(
        &path,
        r#"
version = 9
clarification = "Please name a metric."

[[intents]]
name = "traffic"
keywords = ["Visits"]
metrics = ["sessions"]
dimensions = ["date"]
"#,
    )
    .unwrap();

    let rules = RuleBook::load(Some(path.as_path())).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(rules.version, 9);
    assert_eq!(rules.clarification, "Please name a metric.");
    assert_eq!(rules.intents[0].keywords, vec!["visits"]);
}

#[test]
fn test_missing_file() {
    let result = RuleBook::load(Some(std::path::Path::new("/nonexistent/augur/rules.toml")));
    assert!(matches!(result, Err(RulesError::FileNotFound(_))));
}

#[test]
fn test_all_issues_reported_together() {
    let rules = RuleBook::from_toml_str(
        r#"
[[smart_rules]]
name = "sellers"
keywords = []
metrics = ["itemsPurchased"]
dimensions = ["pagePath"]

[[intents]]
name = "ghost"
keywords = ["ghost"]
metrics = ["hauntings"]

[[synonyms]]
phrase = "planète"
token = "planet"
"#,
    )
    .unwrap();

    let issues = validate(&rules, &builtin_catalog()).unwrap_err();
    let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();

    assert_eq!(
        messages,
        vec![
            "Smart rule 'sellers' has no keywords",
            "Smart rule 'sellers' pairs metric 'itemsPurchased' with incompatible dimension 'pagePath'",
            "Intent 'ghost' references unknown metric 'hauntings'",
            "Synonym 'planète' maps to 'planet', which is not in the catalog",
        ]
    );
    assert!(matches!(issues[0], RuleIssue::EmptyKeywords { .. }));
}

#[test]
fn test_compiler_refuses_inconsistent_book() {
    let rules = RuleBook::from_toml_str(
        r#"
[[intents]]
name = "ghost"
keywords = ["ghost"]
metrics = ["hauntings"]
"#,
    )
    .unwrap();

    let result = QueryCompiler::new(builtin_catalog(), rules, CompileOptions::default());
    let err = result.err().expect("compiler should refuse the book");
    assert!(matches!(err, CompileError::InvalidRules(_)));
    assert!(err.to_string().contains("unknown metric 'hauntings'"));
}
