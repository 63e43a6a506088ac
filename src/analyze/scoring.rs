//! Per-candidate factor scoring.
//!
//! Six raw factors, each multiplied by its weight and summed:
//! - `lexical`   : profile keywords found in the search blob (count)
//! - `semantic`  : expanded synonym terms found in the search blob (count)
//! - `ratings`   : external ratings rescaled to 0..100, mapped into 0..20
//! - `reviews`   : points per customer review, capped
//! - `budget`    : closeness to the budget midpoint, 0..10
//! - `occasion`  : tier-dependent price preference
//!
//! The recency penalty is subtracted after the weighted sum.

use serde::Serialize;
use std::fmt;

use crate::analyze::weights::FactorWeights;
use crate::config::ScoringParams;
use crate::menu::MenuItem;
use crate::query::{OccasionTier, PriceRange};

/// Raw factor values of one candidate (before weighting).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub lexical_hits: usize,
    pub semantic_hits: usize,
    pub ratings_score: f64,
    pub reviews_count: usize,
    pub reviews_score: f64,
    pub budget_fit: f64,
    pub occasion_adjustment: f64,
    pub recency_penalty: f64,
}

impl FactorBreakdown {
    /// Weighted sum minus the recency penalty.
    pub fn total(&self, w: &FactorWeights) -> f64 {
        self.lexical_hits as f64 * w.lexical
            + self.semantic_hits as f64 * w.semantic
            + self.ratings_score * w.ratings
            + self.reviews_score * w.reviews
            + self.budget_fit * w.budget
            + self.occasion_adjustment * w.occasion
            - self.recency_penalty
    }
}

/// Why an item was recommended; rendered in the rationale line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    ProfileTraits(usize),
    SemanticCues(usize),
    ExternalRatings,
    VerifiedReviews,
    WithinBudget,
    /// Only reachable after the price range was widened.
    WidenedRange,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileTraits(n) => write!(f, "matches {n} profile traits"),
            Self::SemanticCues(n) => write!(f, "echoes {n} semantic cues"),
            Self::ExternalRatings => f.write_str("backed by external ratings"),
            Self::VerifiedReviews => f.write_str("verified customer reviews"),
            Self::WithinBudget => f.write_str("within budget"),
            Self::WidenedRange => f.write_str("range widened to keep options"),
        }
    }
}

/// A scored menu item.
#[derive(Clone, Debug)]
pub struct ScoredCandidate<'a> {
    pub item: &'a MenuItem,
    pub score: f64,
    pub breakdown: FactorBreakdown,
    pub reasons: Vec<MatchReason>,
}

/// Everything `score_candidate` needs, computed once per run.
#[derive(Clone, Debug)]
pub struct ScoringContext<'p> {
    /// Normalized profile keywords.
    pub profile: Vec<String>,
    /// Keywords plus related terms, normalized and deduplicated.
    pub semantic_terms: Vec<String>,
    /// Budget as asked (not widened).
    pub budget: PriceRange,
    pub tier: OccasionTier,
    pub weights: FactorWeights,
    /// Candidates came from a widened price range.
    pub widened: bool,
    pub params: &'p ScoringParams,
}

/* ---- Factors ---- */

/// Number of needles found in `blob` (substring match).
pub fn count_hits(blob: &str, needles: &[String]) -> usize {
    needles
        .iter()
        .filter(|n| !n.is_empty() && blob.contains(n.as_str()))
        .count()
}

/// Average of the numeric ratings on a 0..100 scale, mapped into
/// `[0, ratings_cap]`. Values at or below the 5-point threshold are ×20.
pub fn ratings_quality(values: &[f64], p: &ScoringParams) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values
        .iter()
        .map(|&v| if v <= p.five_point_scale_max { v * 20.0 } else { v })
        .sum();
    let avg = sum / values.len() as f64;
    ((avg - p.ratings_floor) / p.ratings_divisor).clamp(0.0, p.ratings_cap)
}

pub fn reviews_score(count: usize, p: &ScoringParams) -> f64 {
    (count as f64 * p.review_points_per_review).min(p.review_points_cap)
}

/// `(1 - normalized distance to midpoint) × scale`; unknown price fits 0.
pub fn budget_fit(price: Option<f64>, budget: &PriceRange, p: &ScoringParams) -> f64 {
    let distance = match price {
        Some(v) => ((v - budget.midpoint()).abs() / budget.half_span()).min(1.0),
        None => 1.0,
    };
    (1.0 - distance) * p.budget_fit_scale
}

/// Everyday rewards cheap, special rewards balance, connoisseur rewards
/// expensive. Unknown price adjusts nothing.
pub fn occasion_adjustment(
    price: Option<f64>,
    budget: &PriceRange,
    tier: OccasionTier,
    fit: f64,
    p: &ScoringParams,
) -> f64 {
    let Some(v) = price else {
        return 0.0;
    };
    match tier {
        OccasionTier::Everyday => {
            ((budget.max - v) / budget.max.max(1.0)).max(0.0) * p.occasion_scale
        }
        OccasionTier::Special => fit * p.special_budget_factor,
        OccasionTier::Connoisseur => {
            ((v - budget.min) / (budget.max - budget.min).max(1.0)).max(0.0) * p.occasion_scale
        }
    }
}

/// Score one item. `recency_penalty` comes from the query history.
pub fn score_candidate<'a>(
    item: &'a MenuItem,
    ctx: &ScoringContext<'_>,
    recency_penalty: f64,
) -> ScoredCandidate<'a> {
    let p = ctx.params;
    let blob = item.search_blob();
    let price = item.price_value();

    let ratings_score = ratings_quality(&item.numeric_ratings(), p);
    let reviews_count = item.user_reviews.len();
    let fit = budget_fit(price, &ctx.budget, p);

    let breakdown = FactorBreakdown {
        lexical_hits: count_hits(&blob, &ctx.profile),
        semantic_hits: count_hits(&blob, &ctx.semantic_terms),
        ratings_score,
        reviews_count,
        reviews_score: reviews_score(reviews_count, p),
        budget_fit: fit,
        occasion_adjustment: occasion_adjustment(price, &ctx.budget, ctx.tier, fit, p),
        recency_penalty,
    };

    let in_budget = price.is_some_and(|v| ctx.budget.contains(v));
    let mut reasons = Vec::new();
    if breakdown.lexical_hits > 0 {
        reasons.push(MatchReason::ProfileTraits(breakdown.lexical_hits));
    }
    if breakdown.semantic_hits > 0 {
        reasons.push(MatchReason::SemanticCues(breakdown.semantic_hits));
    }
    if ratings_score > 0.0 {
        reasons.push(MatchReason::ExternalRatings);
    }
    if reviews_count > 0 {
        reasons.push(MatchReason::VerifiedReviews);
    }
    if in_budget {
        reasons.push(MatchReason::WithinBudget);
    }
    if ctx.widened && price.is_some() && !in_budget {
        reasons.push(MatchReason::WidenedRange);
    }

    ScoredCandidate {
        item,
        score: breakdown.total(&ctx.weights),
        breakdown,
        reasons,
    }
}

/// Sort by score, highest first. Ties keep menu order.
pub fn sort_by_score(candidates: &mut [ScoredCandidate<'_>]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}
