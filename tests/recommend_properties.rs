// tests/recommend_properties.rs
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use sommelier_advisor::analyze::{AdaptiveMultipliers, FactorWeights, SelectionSignals};
use sommelier_advisor::config::AdaptiveParams;
use sommelier_advisor::ingest::parse_menu;
use sommelier_advisor::ingest::providers::embedded::EMBEDDED_MENU;
use sommelier_advisor::{
    recommend, CandidatePool, Category, MemoryStore, MenuItem, PreferenceStore, PriceRange,
    RankingContext, RecommendationQuery, Sommelier, SommelierConfig,
};

fn wine(id: &str, price: &str, app: Option<&str>, review: &str) -> MenuItem {
    MenuItem {
        id: id.into(),
        name: format!("Vino {id}"),
        price: price.into(),
        category: Category::RedWine,
        appellation: app.map(str::to_string),
        review: review.into(),
        ..Default::default()
    }
}

fn ctx<'c>(cfg: &'c SommelierConfig, recent: &'c [String]) -> RankingContext<'c> {
    RankingContext {
        config: cfg,
        weights: FactorWeights::base(),
        recent_ids: recent,
    }
}

#[test]
fn single_rioja_is_recommended_with_lexical_hit() {
    let menu: Vec<MenuItem> = serde_json::from_str(
        r#"[{"id":"W1","category":"VINOS TINTOS","price":"25,00 €","name":"Rioja X","review":"elegante fino"}]"#,
    )
    .unwrap();
    let q = RecommendationQuery::new(
        Category::RedWine,
        vec!["rioja".into()],
        PriceRange::new(0.0, 30.0),
    );
    let cfg = SommelierConfig::default();
    let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(42));

    assert_eq!(rec.pool, CandidatePool::Exact);
    assert_eq!(rec.ids(), vec!["W1".to_string()]);
    let c = &rec.picks[0].candidate;
    assert!(c.breakdown.lexical_hits > 0);
    assert!(c.breakdown.lexical_hits as f64 * FactorWeights::base().lexical > 0.0);
}

#[test]
fn shortlist_never_repeats_an_id() {
    let items = parse_menu(EMBEDDED_MENU).unwrap();
    let cfg = SommelierConfig::default();
    let budgets = [(0.0, 30.0), (30.0, 70.0), (70.0, 2000.0)];
    let families = [Category::RedWine, Category::WhiteWine, Category::Sparkling];

    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        for fam in &families {
            for (min, max) in budgets {
                let q = RecommendationQuery::new(
                    fam.clone(),
                    vec!["fresco".into(), "elegante".into()],
                    PriceRange::new(min, max),
                );
                let rec = recommend(&items, &q, &ctx(&cfg, &[]), &mut rng);
                let ids = rec.ids();
                let unique: HashSet<_> = ids.iter().collect();
                assert_eq!(unique.len(), ids.len(), "duplicate in {ids:?}");
                assert!(ids.len() <= cfg.scoring.shortlist_size);
            }
        }
    }
}

#[test]
fn duplicate_menu_ids_are_not_shortlisted_twice() {
    let menu = vec![
        wine("W1", "20,00 €", Some("Rioja"), "rioja"),
        wine("W1", "21,00 €", Some("Toro"), "rioja"),
    ];
    let q = RecommendationQuery::new(Category::RedWine, vec!["rioja".into()], PriceRange::new(0.0, 30.0));
    let cfg = SommelierConfig::default();
    let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(0));
    assert_eq!(rec.ids(), vec!["W1".to_string()]);
}

#[test]
fn relaxed_range_is_tried_before_whole_category() {
    let cfg = SommelierConfig::default();
    let q = RecommendationQuery::new(Category::RedWine, vec![], PriceRange::new(0.0, 30.0));

    // 40 € is outside [0,30] but inside the widened [0,45].
    let menu = vec![
        wine("NEAR", "40,00 €", Some("Rioja"), ""),
        wine("FAR", "300,00 €", Some("Toro"), ""),
    ];
    let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(1));
    assert_eq!(rec.pool, CandidatePool::Widened);
    assert_eq!(rec.ids(), vec!["NEAR".to_string()]);
    assert!(rec.picks[0].rationale.contains("range widened"));

    // Nothing within the widened range: whole category.
    let menu = vec![wine("FAR", "300,00 €", Some("Toro"), "")];
    let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(1));
    assert_eq!(rec.pool, CandidatePool::WholeCategory);
    assert_eq!(rec.ids(), vec!["FAR".to_string()]);

    // Category empty: nothing at all.
    let q = RecommendationQuery::new(Category::Sparkling, vec![], PriceRange::new(0.0, 30.0));
    let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(1));
    assert!(rec.is_empty());
}

#[test]
fn picks_span_two_appellations_when_available() {
    let mut menu: Vec<MenuItem> = (0..10)
        .map(|i| wine(&format!("R{i}"), "20,00 €", Some("Rioja"), "rioja crianza tempranillo"))
        .collect();
    menu.push(wine("T0", "20,00 €", Some("Toro"), ""));
    let q = RecommendationQuery::new(Category::RedWine, vec!["rioja".into()], PriceRange::new(0.0, 30.0));
    let cfg = SommelierConfig::default();

    for seed in 0..30u64 {
        let rec = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(seed));
        assert_eq!(rec.picks.len(), 2);
        let a = rec.picks[0].item().appellation.clone();
        let b = rec.picks[1].item().appellation.clone();
        assert_ne!(a, b, "seed {seed}: both picks from {a:?}");
    }
}

#[test]
fn recent_ids_are_penalized_and_lose_the_top_spot() {
    let mut cfg = SommelierConfig::default();
    cfg.scoring.diversity_jitter = 0.0;
    let menu = vec![
        wine("W1", "15,00 €", Some("Rioja"), ""),
        wine("W2", "15,00 €", Some("Toro"), ""),
    ];
    let q = RecommendationQuery::new(Category::RedWine, vec![], PriceRange::new(0.0, 30.0));

    let fresh = recommend(&menu, &q, &ctx(&cfg, &[]), &mut StdRng::seed_from_u64(0));
    assert_eq!(fresh.picks[0].item().id, "W1");

    let recent = vec!["W1".to_string()];
    let again = recommend(&menu, &q, &ctx(&cfg, &recent), &mut StdRng::seed_from_u64(0));
    assert_eq!(again.picks[0].item().id, "W2");
    let w1 = again.ranking.iter().find(|c| c.item.id == "W1").unwrap();
    assert!(w1.breakdown.recency_penalty > 0.0);
}

#[test]
fn every_remembered_id_gets_a_penalty() {
    let menu: Vec<MenuItem> = (0..14)
        .map(|i| wine(&format!("W{i}"), "15,00 €", Some(&format!("DO{i}")), ""))
        .collect();
    let recent: Vec<String> = (0..12).map(|i| format!("W{i}")).collect();
    let mut cfg = SommelierConfig::default();
    cfg.scoring.top_pool = 20;
    let q = RecommendationQuery::new(Category::RedWine, vec![], PriceRange::new(0.0, 30.0));
    let rec = recommend(&menu, &q, &ctx(&cfg, &recent), &mut StdRng::seed_from_u64(3));

    for c in &rec.ranking {
        let remembered = recent.contains(&c.item.id);
        assert_eq!(c.breakdown.recency_penalty > 0.0, remembered, "{}", c.item.id);
    }
}

#[test]
fn advisor_history_feeds_the_next_identical_query() {
    let menu = vec![
        wine("W1", "15,00 €", Some("Rioja"), "rioja"),
        wine("W2", "15,00 €", Some("Toro"), ""),
        wine("W3", "15,00 €", Some("Bierzo"), ""),
    ];
    let store = MemoryStore::new();
    store.set("sommelier.ab_group.v1", "A");
    let mut s = Sommelier::new(SommelierConfig::default(), store, &mut StdRng::seed_from_u64(0));
    let q = RecommendationQuery::new(Category::RedWine, vec!["rioja".into()], PriceRange::new(0.0, 30.0));

    let mut rng = StdRng::seed_from_u64(11);
    let first = s.recommend(&menu, &q, &mut rng);
    let first_ids = first.ids();
    let second = s.recommend(&menu, &q, &mut rng);
    for c in &second.ranking {
        if first_ids.contains(&c.item.id) {
            assert!(c.breakdown.recency_penalty > 0.0);
        }
    }
}

#[test]
fn multipliers_stay_bounded_through_random_feedback() {
    let p = AdaptiveParams::default();
    let mut m = AdaptiveMultipliers::default();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..2_000 {
        use rand::Rng;
        let s = SelectionSignals {
            lexical: rng.random_bool(0.5),
            semantic: rng.random_bool(0.9),
            ratings: rng.random_bool(0.1),
            reviews: rng.random_bool(0.5),
            budget: rng.random_bool(0.7),
            occasion: rng.random_bool(0.3),
        };
        m.adapt(&s, &p);
        assert!(m.values().iter().all(|v| (0.7..=1.8).contains(v)), "{m:?}");
    }
}
