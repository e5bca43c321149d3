//! Integration tests for the end-to-end question → spec pipeline.
//!
//! All questions are evaluated on a pinned date (Sunday 2026-10-18) against
//! the built-in catalog and rule book.

use augur::compile::{CompileOptions, CompileOutput, QueryCompiler};
use augur::model::{ConversationContext, DateCue, DateRange, FilterValue};
use augur::rules::RuleBook;
use augur::stages::Stage;
use augur::{Catalog, Strategy};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 10, 18)
}

fn compiler() -> QueryCompiler {
    QueryCompiler::builtin(CompileOptions::default().with_today(today()))
        .expect("built-in catalog and rules should be consistent")
}

fn compile(question: &str) -> CompileOutput {
    compiler().compile(question, None)
}

fn last_30_days() -> DateRange {
    DateRange::new(date(2026, 9, 18), today())
}

// ============================================================================
// Row Limits
// ============================================================================

#[test]
fn test_top_n_with_digits() {
    let output = compile("top 7 pages");

    assert_eq!(
        output.strategy,
        Strategy::Intent {
            name: "page_views".to_string()
        }
    );
    assert_eq!(output.spec.metrics, vec!["screenPageViews"]);
    assert_eq!(output.spec.dimensions, vec!["pagePath"]);
    assert_eq!(output.spec.limit, Some(7));
    assert_eq!(output.spec.date_range, last_30_days());
    assert!(!output.spec.llm_needed);
}

#[test]
fn test_top_n_spelled_in_french() {
    let output = compile("Top cinq pages");
    assert_eq!(output.spec.limit, Some(5));
}

#[test]
fn test_top_n_alone_still_needs_clarification() {
    let output = compile("top dix");

    assert_eq!(output.spec.limit, Some(10));
    assert!(output.spec.llm_needed);
    assert_eq!(output.strategy, Strategy::Default);
    assert_eq!(output.spec.metrics, vec!["sessions"]);
    assert_eq!(
        output.spec.suggestion.as_deref(),
        Some(RuleBook::builtin().unwrap().clarification.as_str())
    );
}

// ============================================================================
// Comparative Questions
// ============================================================================

#[test]
fn test_comparative_months() {
    let output = compile("sessions in June vs July");

    let periods = output.spec.comparative.expect("two periods");
    assert_eq!(periods.period1, DateRange::new(date(2026, 6, 1), date(2026, 6, 30)));
    assert_eq!(periods.period2, DateRange::new(date(2026, 7, 1), date(2026, 7, 31)));
    assert_eq!(output.spec.metrics, vec!["sessions"]);
    assert_eq!(output.spec.date_range, periods.period1);
    assert_eq!(
        output.spec.to_string(),
        "metrics=[sessions] dimensions=[date] range=2026-06-01..2026-06-30 \
         compare=2026-06-01..2026-06-30 vs 2026-07-01..2026-07-31"
    );
}

#[test]
fn test_comparative_marker_with_one_month() {
    let output = compile("sessions de juin comparé");

    assert!(output.spec.comparative.is_none());
    assert_eq!(output.spec.date_range, DateRange::month(2026, 6).unwrap());
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.stage == Stage::Comparative));
}

// ============================================================================
// Resolver Strategies and Overlay Precedence
// ============================================================================

#[test]
fn test_best_sellers_smart_rule() {
    let output = compile("produits les plus vendus");

    assert_eq!(
        output.strategy,
        Strategy::SmartRule {
            name: "best_sellers".to_string()
        }
    );
    assert_eq!(output.spec.metrics, vec!["itemsPurchased"]);
    assert_eq!(output.spec.dimensions, vec!["itemName"]);
    assert!(output.spec.suggestion.is_some());
}

#[test]
fn test_sales_overlay_overrides_intent_metrics() {
    let output = compile("chiffre d'affaires des articles les plus vendus");

    assert_eq!(
        output.strategy,
        Strategy::Intent {
            name: "revenue".to_string()
        }
    );
    assert_eq!(output.spec.metrics, vec!["itemsPurchased"]);
    assert_eq!(output.spec.dimensions, vec!["date"]);
}

#[test]
fn test_french_traffic_question() {
    let output = compile("nombre de visite sur mon site les 30 derniers jours");

    assert_eq!(
        output.strategy,
        Strategy::Intent {
            name: "traffic".to_string()
        }
    );
    assert_eq!(output.spec.metrics, vec!["sessions"]);
    assert_eq!(output.spec.date_range, last_30_days());
}

#[test]
fn test_unresolvable_question() {
    let output = compile("bonjour, comment ça va ?");

    assert!(output.spec.llm_needed);
    assert!(!output.spec.suggestion.unwrap_or_default().is_empty());
    assert_eq!(output.spec.metrics, vec!["sessions"]);
    assert!(output.spec.dimensions.is_empty());
}

#[test]
fn test_catalog_scan_with_incompatible_dimension() {
    let output = compile("items purchased by page path");

    assert_eq!(output.strategy, Strategy::CatalogScan);
    assert_eq!(output.spec.metrics, vec!["itemsPurchased"]);
    assert!(output.spec.dimensions.is_empty());
    assert!(!output.spec.llm_needed);
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.stage == Stage::Compatibility && d.message.contains("pagePath")));
}

#[test]
fn test_date_words_are_not_dimensions() {
    let output = compile("engagement rate this week");

    assert_eq!(output.spec.metrics, vec!["engagementRate"]);
    assert!(output.spec.dimensions.is_empty());
    assert_eq!(output.spec.date_range, DateRange::new(date(2026, 10, 12), today()));
}

#[test]
fn test_follow_up_question_reuses_metrics() {
    let context = ConversationContext::new(vec!["totalUsers".to_string()], vec![]);
    let output = compiler().compile("et par pays ?", Some(&context));

    assert_eq!(output.strategy, Strategy::FollowUp);
    assert_eq!(output.spec.metrics, vec!["totalUsers"]);
    assert_eq!(output.spec.dimensions, vec!["country"]);
    assert!(!output.spec.llm_needed);
}

#[test]
fn test_follow_up_drops_unknown_context_dimensions() {
    let context = ConversationContext::new(
        vec!["sessions".to_string()],
        vec!["planet".to_string(), "country".to_string()],
    );
    let output = compiler().compile("et ensuite ?", Some(&context));

    assert_eq!(output.spec.dimensions, vec!["country"]);
}

// ============================================================================
// Business Rules
// ============================================================================

#[test]
fn test_organic_traffic_last_month() {
    let output = compile("trafic organique le mois dernier");

    assert_eq!(output.spec.date_range, DateRange::month(2026, 9).unwrap());
    assert_eq!(
        output.spec.filters.get("sessionDefaultChannelGroup"),
        Some(&FilterValue::equals("Organic Search"))
    );
}

#[test]
fn test_conversion_rate_by_device() {
    let output = compile("taux de conversion mobile");

    assert_eq!(output.spec.metrics[0], "sessionConversionRate");
    assert_eq!(output.spec.dimensions[0], "deviceCategory");
    assert!(output.spec.filters.get("deviceCategory").is_none());
}

#[test]
fn test_trend_adds_month() {
    let output = compile("évolution des utilisateurs actifs");

    assert_eq!(output.spec.metrics, vec!["activeUsers"]);
    assert_eq!(output.spec.dimensions, vec!["date", "month"]);
}

#[test]
fn test_country_and_device_filters() {
    let output = compile("sessions mobile en France");

    assert_eq!(output.spec.filters.get("country"), Some(&FilterValue::equals("France")));
    assert_eq!(
        output.spec.filters.get("deviceCategory"),
        Some(&FilterValue::equals("mobile"))
    );
}

#[test]
fn test_channel_and_day_of_week() {
    let output = compile("sessions par canal");
    assert_eq!(output.spec.dimensions, vec!["sessionDefaultChannelGroup"]);

    let output = compile("sessions par jour de la semaine");
    assert_eq!(output.spec.dimensions, vec!["dayOfWeekName", "date"]);
}

#[test]
fn test_since_month() {
    let output = compile("visites depuis mars");
    assert_eq!(output.spec.date_range, DateRange::new(date(2026, 3, 1), today()));
}

#[test]
fn test_grouping_by_device_keeps_requested_metric() {
    let output = compile("pages vues par appareil");
    assert_eq!(output.spec.metrics, vec!["screenPageViews"]);
    assert_eq!(output.spec.dimensions, vec!["deviceCategory"]);

    let output = compile("sessions par appareil");
    assert_eq!(output.spec.metrics, vec!["sessions"]);
    assert_eq!(output.spec.dimensions, vec!["deviceCategory"]);

    let output = compile("active users by device");
    assert_eq!(output.spec.metrics, vec!["activeUsers"]);
    assert_eq!(output.spec.dimensions, vec!["deviceCategory"]);
}

#[test]
fn test_new_users_by_browser() {
    let output = compile("new users by browser and operating system over the past 90 days");

    assert_eq!(
        output.strategy,
        Strategy::Intent {
            name: "new_users".to_string()
        }
    );
    assert_eq!(output.spec.metrics, vec!["newUsers"]);
    assert_eq!(output.spec.dimensions, vec!["browser", "operatingSystem"]);
    assert_eq!(output.spec.date_range, DateRange::new(date(2026, 7, 20), today()));
}

#[test]
fn test_may_as_a_verb_is_not_a_month() {
    let output = compile("what may i see about sessions");
    assert_eq!(output.spec.date_range, last_30_days());

    let output = compile("sessions in may");
    assert_eq!(output.spec.date_range, DateRange::month(2026, 5).unwrap());
}

// ============================================================================
// Custom Rule Books
// ============================================================================

#[test]
fn test_intent_default_time_range() {
    let catalog = Catalog::from_names(&["sessions"], &["date", "country"], &[]).unwrap();
    let rules = RuleBook::from_toml_str(
        r#"
[overlay.fields]
month = "date"
channel_group = "country"
source = "country"
medium = "country"
device_category = "country"
day_of_week = "date"
average_session_duration = "sessions"
conversion_rate = "sessions"
purchase_count = "sessions"

[[intents]]
name = "weekly_traffic"
keywords = ["visits"]
metrics = ["sessions"]
dimensions = ["date"]
default_time_range = 7
"#,
    )
    .unwrap();

    let compiler = QueryCompiler::new(catalog, rules, CompileOptions::default()).unwrap();
    let output = compiler.compile_on("visits", None, today());

    assert_eq!(output.spec.date_range, DateRange::new(date(2026, 10, 11), today()));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.stage == Stage::Dates && d.message.contains("7 days")));

    // An explicit cue still wins
    let output = compiler.compile_on("visits yesterday", None, today());
    assert_eq!(output.spec.date_range, DateRange::day(date(2026, 10, 17)));
}

#[test]
fn test_date_cue_serialization() {
    let cue = DateCue::LastDays { days: 7 };
    assert_eq!(
        serde_json::to_string(&cue).unwrap(),
        r#"{"kind":"last_days","days":7}"#
    );
}
