// tests/menu_sources.rs
use sommelier_advisor::ingest::types::MenuSource;
use sommelier_advisor::ingest::{load_menu, EmbeddedMenuSource, FileMenuSource};
use sommelier_advisor::menu::{appellations, wines_by_appellation};
use sommelier_advisor::Category;
use std::fs;

#[tokio::test]
async fn file_source_wins_over_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("menu.json");
    fs::write(
        &p,
        r#"[
  {"id":"W1","name":"Rioja X","price":"25,00 €","category":"VINOS TINTOS","do":"Rioja"},
  {"id":"F1","name":"Croquetas","price":"9,00 €","category":"DE TAPEO","pairing_tags":["fritos"]}
]"#,
    )
    .unwrap();

    let sources: Vec<Box<dyn MenuSource>> =
        vec![Box::new(FileMenuSource::new(&p)), Box::new(EmbeddedMenuSource)];
    let loaded = load_menu(&sources).await.unwrap();
    assert_eq!(loaded.source, "file");
    assert_eq!(loaded.items.len(), 2);
    assert!(loaded.report.is_clean());
    assert_eq!(loaded.items[0].category, Category::RedWine);
    assert!(loaded.items[1].category.is_food());
}

#[tokio::test]
async fn malformed_file_falls_back_to_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("menu.json");
    fs::write(&p, r#"{"not":"an array"}"#).unwrap();

    let sources: Vec<Box<dyn MenuSource>> =
        vec![Box::new(FileMenuSource::new(&p)), Box::new(EmbeddedMenuSource)];
    let loaded = load_menu(&sources).await.unwrap();
    assert_eq!(loaded.source, "embedded");
    assert!(loaded.report.is_clean());
}

#[tokio::test]
async fn problems_are_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("menu.json");
    fs::write(
        &p,
        r#"[
  {"id":"W1","name":"Uno","price":"20,00 €","category":"VINOS TINTOS"},
  {"id":"W1","name":"Dos","price":18,"category":"VINOS TINTOS"},
  {"name":"Sin id","price":"12,00 €","category":"VINOS BLANCOS"}
]"#,
    )
    .unwrap();

    let sources: Vec<Box<dyn MenuSource>> = vec![Box::new(FileMenuSource::new(&p))];
    let loaded = load_menu(&sources).await.unwrap();
    assert_eq!(loaded.items.len(), 3);
    assert_eq!(loaded.report.duplicate_ids, vec!["W1".to_string()]);
    assert_eq!(loaded.report.incomplete.len(), 1);
    assert_eq!(loaded.report.incomplete[0].index, 2);
    assert!(loaded.report.incomplete[0].missing.contains(&"id"));
    // Numeric price is accepted.
    assert_eq!(loaded.items[1].price_value(), Some(18.0));
}

#[tokio::test]
async fn embedded_menu_lists_appellations() {
    let loaded = load_menu(&[Box::new(EmbeddedMenuSource) as Box<dyn MenuSource>])
        .await
        .unwrap();
    let apps = appellations(&loaded.items);
    assert!(apps.contains(&"Rioja".to_string()));

    let rioja = wines_by_appellation(&loaded.items, Some("Rioja"));
    assert!(!rioja.is_empty());
    assert!(rioja
        .iter()
        .all(|w| w.category.is_wine() && w.appellation.as_deref() == Some("Rioja")));

    let all = wines_by_appellation(&loaded.items, None);
    assert!(all.len() > rioja.len());
    assert!(all.iter().all(|w| w.category.is_wine()));
}

#[tokio::test]
async fn null_category_is_reported_and_file_still_wins() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("menu.json");
    fs::write(
        &p,
        r#"[
  {"id":"W1","name":"Rioja X","price":"25,00 €","category":"VINOS TINTOS"},
  {"id":"W2","name":"Sin familia","price":"18,00 €","category":null,"glass_price":6.5},
  {"id":"W3","name":"Godello","price":"21,00 €","category":"VINOS BLANCOS","do":null,"image":42}
]"#,
    )
    .unwrap();

    let sources: Vec<Box<dyn MenuSource>> =
        vec![Box::new(FileMenuSource::new(&p)), Box::new(EmbeddedMenuSource)];
    let loaded = load_menu(&sources).await.unwrap();
    assert_eq!(loaded.source, "file");
    assert_eq!(loaded.items.len(), 3);
    assert_eq!(loaded.report.incomplete.len(), 1);
    assert_eq!(loaded.report.incomplete[0].id, "W2");
    assert_eq!(loaded.report.incomplete[0].missing, vec!["category"]);
    assert_eq!(loaded.items[1].glass_price.as_deref(), Some("6.5"));
    assert_eq!(loaded.items[2].image.as_deref(), Some("42"));
}
