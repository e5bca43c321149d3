//! Invariants that must hold for every compiled question.

use augur::compile::{CompileOptions, CompileOutput, QueryCompiler};
use augur::model::{ConversationContext, PROVIDER_MAX_LIMIT};
use chrono::NaiveDate;

const QUESTIONS: &[&str] = &[
    "",
    "   ",
    "?",
    "bonjour, comment ça va ?",
    "top 7 pages",
    "top cinq pages",
    "top dix",
    "top 0",
    "top 123456789012 produits",
    "sessions in June vs July",
    "ventes juin 2025 par rapport à juin 2024",
    "produits les plus vendus",
    "chiffre d'affaires des articles les plus vendus",
    "nombre de visite sur mon site les 30 derniers jours",
    "items purchased by page path and country",
    "évolution du taux de rebond par canal",
    "temps moyen passé par appareil la semaine dernière",
    "taux de conversion mobile vs desktop en france",
    "trafic payant depuis janvier",
    "sessions par jour de la semaine cette semaine",
    "best-selling products by landing page in march 2025",
    "users from organic search yesterday",
    "new users by browser and operating system over the past 90 days",
    "pages vues par titre des 6 derniers mois",
    "meilleures ventes par source et support l'an dernier",
    "visiteurs à Paris depuis décembre",
];

fn compiler() -> QueryCompiler {
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    QueryCompiler::builtin(CompileOptions::default().with_today(today)).unwrap()
}

fn contexts() -> Vec<Option<ConversationContext>> {
    vec![
        None,
        Some(ConversationContext::new(
            vec!["totalUsers".to_string()],
            vec!["country".to_string()],
        )),
        Some(ConversationContext::new(
            vec!["bogus".to_string()],
            vec!["pagePath".to_string(), "nowhere".to_string()],
        )),
    ]
}

fn for_each_output(mut check: impl FnMut(&str, &CompileOutput)) {
    let compiler = compiler();
    for context in contexts() {
        for question in QUESTIONS {
            let output = compiler.compile(question, context.as_ref());
            check(question, &output);
        }
    }
}

fn has_duplicates(names: &[String]) -> bool {
    names
        .iter()
        .enumerate()
        .any(|(idx, name)| names[..idx].contains(name))
}

#[test]
fn test_metrics_never_empty() {
    for_each_output(|question, output| {
        assert!(!output.spec.metrics.is_empty(), "no metric for {:?}", question);
    });
}

#[test]
fn test_names_unique_and_known() {
    let compiler = compiler();
    let catalog = compiler.catalog();
    for_each_output(|question, output| {
        let spec = &output.spec;
        assert!(!has_duplicates(&spec.metrics), "{:?}: {:?}", question, spec.metrics);
        assert!(!has_duplicates(&spec.dimensions), "{:?}: {:?}", question, spec.dimensions);
        for metric in &spec.metrics {
            assert!(catalog.is_metric(metric), "{:?}: unknown metric {}", question, metric);
        }
    });
}

#[test]
fn test_dimensions_compatible_with_primary_metric() {
    let compiler = compiler();
    let catalog = compiler.catalog();
    for_each_output(|question, output| {
        let primary = output.spec.primary_metric().unwrap();
        for dimension in &output.spec.dimensions {
            assert!(
                catalog.is_dimension(dimension),
                "{:?}: unknown dimension {}",
                question,
                dimension
            );
            assert!(
                catalog.is_compatible(primary, dimension),
                "{:?}: {} incompatible with {}",
                question,
                dimension,
                primary
            );
        }
    });
}

#[test]
fn test_date_range_ordered() {
    for_each_output(|question, output| {
        let range = output.spec.date_range;
        assert!(range.start <= range.end, "{:?}: {}", question, range);
        if let Some(periods) = output.spec.comparative {
            assert!(periods.period1.start <= periods.period1.end);
            assert!(periods.period2.start <= periods.period2.end);
            assert_ne!(periods.period1, periods.period2);
        }
    });
}

#[test]
fn test_limit_within_provider_bounds() {
    for_each_output(|question, output| {
        if let Some(limit) = output.spec.limit {
            assert!(
                (1..=PROVIDER_MAX_LIMIT).contains(&limit),
                "{:?}: limit {}",
                question,
                limit
            );
        }
    });
}

#[test]
fn test_clarification_always_has_suggestion() {
    for_each_output(|question, output| {
        if output.spec.llm_needed {
            let suggestion = output.spec.suggestion.as_deref().unwrap_or("");
            assert!(!suggestion.is_empty(), "{:?}", question);
        }
    });
}

#[test]
fn test_compilation_is_deterministic() {
    let first = compiler();
    let second = compiler();
    for context in contexts() {
        for question in QUESTIONS {
            let a = serde_json::to_string(&first.compile(question, context.as_ref())).unwrap();
            let b = serde_json::to_string(&second.compile(question, context.as_ref())).unwrap();
            assert_eq!(a, b, "{:?}", question);
        }
    }
}

#[test]
fn test_normalization_does_not_change_meaning() {
    let compiler = compiler();
    let plain = compiler.compile("top 5 pages le mois dernier", None);
    let noisy = compiler.compile("   TOP  5\tPages   le MOIS dernier ", None);
    assert_eq!(plain.spec, noisy.spec);
}

#[test]
fn test_spec_serializes_with_snake_case_dates() {
    let output = compiler().compile("sessions in june vs july", None);
    let json = serde_json::to_value(&output.spec).unwrap();

    assert_eq!(json["date_range"]["start_date"], "2026-06-01");
    assert_eq!(json["comparative"]["period2"]["end_date"], "2026-07-31");
    assert_eq!(json["llm_needed"], false);
}
