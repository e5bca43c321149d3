//! Tests for catalog loading and name lookup.

use augur::catalog::inflection::{humanize, pluralize};
use augur::catalog::{
    BuiltinCatalogProvider, Catalog, CatalogError, CatalogProvider, FieldKind, FileCatalogProvider,
};
use std::fs;
use std::path::PathBuf;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("augur_{}_{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_builtin_catalog_contents() {
    let catalog = BuiltinCatalogProvider.load().unwrap();

    for metric in ["sessions", "totalUsers", "screenPageViews", "itemsPurchased"] {
        assert!(catalog.is_metric(metric), "missing metric {}", metric);
    }
    for dimension in ["date", "month", "country", "deviceCategory", "dayOfWeekName"] {
        assert!(catalog.is_dimension(dimension), "missing dimension {}", dimension);
    }

    assert!(catalog.is_compatible("itemsPurchased", "itemName"));
    assert!(!catalog.is_compatible("itemsPurchased", "pagePath"));
    assert_eq!(catalog.describe("sessions").unwrap().group, "traffic");
}

#[test]
fn test_file_provider_loads_custom_catalog() {
    let path = temp_file(
        "catalog.json",
        r#"{
            "metrics": { "store": { "footfall": "Visitors entering a store" } },
            "dimensions": { "store": { "storeName": "Store", "aisle": "Aisle" } },
            "compatibility": { "footfall": ["storeName"] }
        }"#,
    );

    let provider = FileCatalogProvider::new(&path);
    let catalog = provider.load().unwrap();
    fs::remove_file(&path).ok();

    assert!(catalog.is_metric("footfall"));
    assert!(catalog.is_compatible("footfall", "storeName"));
    assert!(!catalog.is_compatible("footfall", "aisle"));
    assert!(provider.describe().starts_with("catalog file "));
}

#[test]
fn test_file_provider_rejects_bad_json() {
    let path = temp_file("broken.json", "{ not json");
    let result = FileCatalogProvider::new(&path).load();
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(CatalogError::ParseError(_))));
}

#[test]
fn test_compatibility_must_reference_known_names() {
    let result = Catalog::from_json(
        r#"{
            "metrics": { "m": { "sessions": "" } },
            "dimensions": { "d": { "country": "" } },
            "compatibility": { "revenue": ["country"] }
        }"#,
    );
    assert!(matches!(result, Err(CatalogError::UnknownMetric(name)) if name == "revenue"));
}

#[test]
fn test_mentions_use_humanized_and_plural_forms() {
    let catalog = BuiltinCatalogProvider.load().unwrap();

    let mentions = catalog.mentions("active users by device category and countries", &[]);
    let found: Vec<(&str, FieldKind)> = mentions.iter().map(|m| (m.name, m.kind)).collect();

    assert_eq!(
        found,
        vec![
            ("activeUsers", FieldKind::Metric),
            ("deviceCategory", FieldKind::Dimension),
            ("country", FieldKind::Dimension),
        ]
    );
}

#[test]
fn test_mentions_need_whole_words() {
    let catalog = BuiltinCatalogProvider.load().unwrap();
    assert!(catalog.mentions("countryside citywide", &[]).is_empty());
}

#[test]
fn test_inflection_helpers() {
    assert_eq!(humanize("sessionDefaultChannelGroup"), "session default channel group");
    assert_eq!(pluralize("device category"), "device categories");
    assert_eq!(pluralize("country"), "countries");
}
