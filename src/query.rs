//! Recommendation query: what the wizard collected before ranking.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::menu::Category;
use crate::text::normalize_text;

/// Closed price interval `[min, max]` in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Build a range; inverted bounds are swapped.
    pub fn new(min: f64, max: f64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    /// Range widened by `margin` on both sides, lower bound floored at 0.
    pub fn widened(&self, margin: f64) -> Self {
        Self {
            min: (self.min - margin).max(0.0),
            max: self.max + margin,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Half the span, never below one currency unit.
    pub fn half_span(&self) -> f64 {
        ((self.max - self.min) / 2.0).max(1.0)
    }

    /// Compact key used in query signatures, e.g. `"0-30"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.min, self.max)
    }
}

/// `"MIN-MAX"`, e.g. `"0-30"` or `"30.5-70"`. Bounds must be finite and
/// non-negative.
impl FromStr for PriceRange {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (min, max) = raw
            .split_once('-')
            .ok_or_else(|| format!("expected MIN-MAX, got {raw:?}"))?;
        let bound = |s: &str, which: &str| -> Result<f64, String> {
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| format!("bad {which} in {raw:?}"))
        };
        Ok(Self::new(bound(min, "minimum")?, bound(max, "maximum")?))
    }
}

/// Budget tier derived from the upper bound of the price range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccasionTier {
    /// Affordable, versatile wines.
    Everyday,
    /// Reserves and crianzas.
    Special,
    /// Top-end bottles.
    Connoisseur,
}

impl OccasionTier {
    pub fn classify(range: &PriceRange, everyday_max: f64, special_max: f64) -> Self {
        if range.max <= everyday_max {
            Self::Everyday
        } else if range.max <= special_max {
            Self::Special
        } else {
            Self::Connoisseur
        }
    }
}

/// Category + profile keywords + budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationQuery {
    pub category: Category,
    pub profile: Vec<String>,
    pub budget: PriceRange,
}

impl RecommendationQuery {
    pub fn new(category: Category, profile: Vec<String>, budget: PriceRange) -> Self {
        Self {
            category,
            profile,
            budget,
        }
    }

    /// Profile keywords, normalized, empty ones dropped.
    pub fn normalized_profile(&self) -> Vec<String> {
        self.profile
            .iter()
            .map(|k| normalize_text(k.trim()))
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Signature identifying "the same question" for recency tracking:
    /// `category::sorted|profile|keys::min-max`.
    pub fn signature(&self) -> String {
        let mut profile = self
            .profile
            .iter()
            .map(|k| normalize_text(k))
            .collect::<Vec<_>>();
        profile.sort();
        format!(
            "{}::{}::{}",
            normalize_text(self.category.label()),
            profile.join("|"),
            self.budget.key()
        )
    }
}
