//! Matching data kept out of the code: the semantic synonym table, food
//! pairing keywords and the wizard presets.
//!
//! The built-in table is `config/lexicon.toml`, embedded at compile time. A
//! user config may override any of its sections under `[lexicon]`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::menu::Category;
use crate::query::PriceRange;
use crate::text::normalize_text;

static DEFAULT_LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../../config/lexicon.toml");
    toml::from_str::<Lexicon>(raw).expect("valid embedded lexicon")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Profile keyword → related terms.
    #[serde(default = "default_semantic")]
    pub semantic: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_pairing")]
    pub pairing: PairingRules,
    #[serde(default = "default_profiles")]
    pub profiles: Vec<ProfilePreset>,
    #[serde(default = "default_occasions")]
    pub occasions: Vec<OccasionPreset>,
}

impl Default for Lexicon {
    fn default() -> Self {
        DEFAULT_LEXICON.clone()
    }
}

fn default_semantic() -> BTreeMap<String, Vec<String>> {
    DEFAULT_LEXICON.semantic.clone()
}
fn default_pairing() -> PairingRules {
    DEFAULT_LEXICON.pairing.clone()
}
fn default_profiles() -> Vec<ProfilePreset> {
    DEFAULT_LEXICON.profiles.clone()
}
fn default_occasions() -> Vec<OccasionPreset> {
    DEFAULT_LEXICON.occasions.clone()
}

impl Lexicon {
    /// Profile keywords plus their related terms, normalized and deduplicated
    /// in first-seen order. The keywords themselves are part of the set.
    pub fn expand_terms(&self, profile: &[String]) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |t: String| {
            if !t.is_empty() && !terms.contains(&t) {
                terms.push(t);
            }
        };

        for raw in profile {
            let key = normalize_text(raw.trim());
            let related = self.related(&key);
            push(key);
            for t in related.into_iter().flatten() {
                push(normalize_text(t));
            }
        }
        terms
    }

    fn related(&self, key: &str) -> Option<&Vec<String>> {
        self.semantic
            .get(key)
            .or_else(|| {
                self.semantic
                    .iter()
                    .find(|(k, _)| normalize_text(k) == key)
                    .map(|(_, v)| v)
            })
    }

    /// Profile presets offered for a wine family.
    pub fn profiles_for(&self, family: &Category) -> Vec<&ProfilePreset> {
        self.profiles
            .iter()
            .filter(|p| p.family.matches(family))
            .collect()
    }

    /// Pairing keywords for a wine family (empty for non-wine categories).
    pub fn pairing_keywords(&self, family: &Category) -> &[String] {
        match family {
            Category::RedWine => &self.pairing.red,
            Category::WhiteWine => &self.pairing.white,
            Category::Sparkling => &self.pairing.sparkling,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingRules {
    pub max_suggestions: usize,
    /// Below this many tag matches the family keyword rules take over.
    pub min_tag_matches: usize,
    pub fallback_ids: Vec<String>,
    pub red: Vec<String>,
    pub white: Vec<String>,
    pub sparkling: Vec<String>,
}

/// A "character" choice for a wine family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePreset {
    pub family: Category,
    pub label: String,
    pub keys: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// A budget choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccasionPreset {
    pub label: String,
    #[serde(default)]
    pub sublabel: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub description: String,
}

impl OccasionPreset {
    pub fn range(&self) -> PriceRange {
        PriceRange::new(self.min, self.max)
    }
}
