//! Food suggestions for a chosen wine.
//!
//! 1) food whose `pairing_tags` overlap the wine's tags (substring either way,
//!    case and accent insensitive)
//! 2) too few tag matches → food whose name contains a family keyword
//! 3) still nothing → configured fallback ids
//!
//! Result is deduplicated by id and capped.

use std::collections::HashSet;
use tracing::debug;

use crate::config::Lexicon;
use crate::menu::{find_by_id, food_items, MenuItem};
use crate::text::normalize_text;

/// How the suggestions were found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingStrategy {
    Tags,
    FamilyKeywords,
    Fallback,
    /// Tag matches were too few and the wine has no family keywords.
    SparseTags,
}

#[derive(Clone, Debug)]
pub struct FoodPairing<'a> {
    pub strategy: PairingStrategy,
    pub dishes: Vec<&'a MenuItem>,
}

fn tags_overlap(food_tags: &[String], wine_tags: &[String]) -> bool {
    food_tags.iter().any(|ft| {
        let ft = normalize_text(ft);
        !ft.is_empty()
            && wine_tags.iter().any(|wt| {
                let wt = normalize_text(wt);
                !wt.is_empty() && (wt.contains(&ft) || ft.contains(&wt))
            })
    })
}

pub fn suggest_food<'a>(menu: &'a [MenuItem], wine: &MenuItem, lexicon: &Lexicon) -> FoodPairing<'a> {
    let rules = &lexicon.pairing;
    let food = food_items(menu);

    let wine_tags = wine.pairing_signals();
    let mut strategy = PairingStrategy::Tags;
    let mut dishes: Vec<&MenuItem> = if wine_tags.is_empty() {
        Vec::new()
    } else {
        food.iter()
            .copied()
            .filter(|f| {
                f.pairing_tags
                    .as_deref()
                    .is_some_and(|tags| tags_overlap(tags, wine_tags))
            })
            .collect()
    };

    if dishes.len() < rules.min_tag_matches {
        let keywords: Vec<String> = lexicon
            .pairing_keywords(&wine.category)
            .iter()
            .map(|k| normalize_text(k))
            .collect();
        if keywords.is_empty() {
            strategy = PairingStrategy::SparseTags;
        } else {
            strategy = PairingStrategy::FamilyKeywords;
            dishes = food
                .iter()
                .copied()
                .filter(|f| {
                    let name = normalize_text(&f.name);
                    keywords.iter().any(|k| name.contains(k.as_str()))
                })
                .take(rules.max_suggestions)
                .collect();
        }
    }

    if dishes.is_empty() {
        strategy = PairingStrategy::Fallback;
        dishes = rules
            .fallback_ids
            .iter()
            .filter_map(|id| find_by_id(menu, id))
            .collect();
    }

    let mut seen = HashSet::new();
    dishes.retain(|d| seen.insert(d.id.as_str()));
    dishes.truncate(rules.max_suggestions);

    debug!(
        target: "ranking",
        wine = %wine.id,
        ?strategy,
        count = dishes.len(),
        "food pairing"
    );

    FoodPairing { strategy, dishes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Category;

    fn food(id: &str, name: &str, tags: &[&str]) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: name.into(),
            price: "8,00 €".into(),
            category: Category::parse("DE TAPEO"),
            pairing_tags: (!tags.is_empty()).then(|| tags.iter().map(|t| t.to_string()).collect()),
            ..Default::default()
        }
    }

    fn red(tags: &[&str]) -> MenuItem {
        MenuItem {
            id: "W1".into(),
            name: "Tinto".into(),
            price: "20,00 €".into(),
            category: Category::RedWine,
            pairing_tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn enough_tag_matches_win() {
        let menu = vec![
            food("F1", "Pulpo", &["marisco"]),
            food("F2", "Zamburiñas", &["Mariscos gallegos"]),
            food("F3", "Navajas", &["MARISCO"]),
            food("F4", "Tarta", &["postre"]),
        ];
        let p = suggest_food(&menu, &red(&["marisco"]), &Lexicon::default());
        assert_eq!(p.strategy, PairingStrategy::Tags);
        let ids: Vec<_> = p.dishes.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F2", "F3"]);
    }

    #[test]
    fn few_tag_matches_fall_to_family_keywords() {
        let menu = vec![
            food("F1", "Pulpo", &["marisco"]),
            food("F2", "Jamón Ibérico", &[]),
            food("F3", "Croquetas caseras", &[]),
        ];
        let p = suggest_food(&menu, &red(&["marisco"]), &Lexicon::default());
        assert_eq!(p.strategy, PairingStrategy::FamilyKeywords);
        let ids: Vec<_> = p.dishes.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["F2", "F3"]);
    }

    #[test]
    fn nothing_matches_uses_fallback_ids() {
        let menu = vec![
            food("FOOD_001", "Pan", &[]),
            food("FOOD_003", "Aceitunas", &[]),
            food("FOOD_009", "Sopa", &[]),
        ];
        let p = suggest_food(&menu, &red(&[]), &Lexicon::default());
        assert_eq!(p.strategy, PairingStrategy::Fallback);
        let ids: Vec<_> = p.dishes.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["FOOD_003", "FOOD_001"]);
    }

    #[test]
    fn result_is_deduplicated_and_capped() {
        let menu = vec![
            food("F0", "Tabla de quesos", &[]),
            food("F0", "Queso otra vez", &[]),
            food("F1", "Tabla ibérica", &[]),
            food("F2", "Queso curado", &[]),
            food("F3", "Cecina", &[]),
            food("F4", "Oreja a la plancha", &[]),
        ];
        let p = suggest_food(&menu, &red(&[]), &Lexicon::default());
        let ids: Vec<_> = p.dishes.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["F0", "F1", "F2"]);

        let many: Vec<MenuItem> = (0..6)
            .map(|i| food(&format!("F{i}"), "Tabla de quesos", &[]))
            .collect();
        assert_eq!(suggest_food(&many, &red(&[]), &Lexicon::default()).dishes.len(), 4);
    }
}
