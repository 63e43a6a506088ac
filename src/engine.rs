//! # Recommendation Engine
//! Pure ranking: `(menu, query, weights, recent ids, rng)` → shortlist.
//! No I/O and no stored state; the caller owns history, the experiment arm
//! and the event log (see `crate::advisor`).
//!
//! Pipeline:
//! 1) category filter
//! 2) price filter, relaxed by a margin, then the whole category
//! 3) factor scoring minus recency penalty
//! 4) top pool by score
//! 5) diversity pick + rationale

use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::analyze::rerank::pick_diverse;
use crate::analyze::scoring::{score_candidate, sort_by_score, ScoredCandidate, ScoringContext};
use crate::analyze::weights::FactorWeights;
use crate::config::SommelierConfig;
use crate::history::recency_penalty;
use crate::menu::MenuItem;
use crate::query::{OccasionTier, PriceRange, RecommendationQuery};

/// Which stage of the relaxation cascade produced the candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePool {
    /// Items inside the requested price range.
    Exact,
    /// Items inside the range widened by the relax margin.
    Widened,
    /// Every item of the category, price ignored.
    WholeCategory,
    /// The category has no items.
    Empty,
}

impl CandidatePool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Widened => "widened",
            Self::WholeCategory => "whole_category",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for CandidatePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run inputs besides menu and query.
#[derive(Clone, Copy, Debug)]
pub struct RankingContext<'c> {
    pub config: &'c SommelierConfig,
    /// Effective weights for this run (arm A or base × multipliers).
    pub weights: FactorWeights,
    /// Ids recently shown for the same query signature, most recent first.
    pub recent_ids: &'c [String],
}

/// A shortlisted item.
#[derive(Clone, Debug)]
pub struct Recommended<'a> {
    pub candidate: ScoredCandidate<'a>,
    /// 1-based.
    pub position: usize,
    pub rationale: String,
}

impl<'a> Recommended<'a> {
    pub fn item(&self) -> &'a MenuItem {
        self.candidate.item
    }
}

#[derive(Clone, Debug)]
pub struct Recommendation<'a> {
    pub pool: CandidatePool,
    /// Top of the ranking before the diversity pass.
    pub ranking: Vec<ScoredCandidate<'a>>,
    pub picks: Vec<Recommended<'a>>,
}

impl<'a> Recommendation<'a> {
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.picks.iter().map(|p| p.item().id.clone()).collect()
    }

    fn empty() -> Self {
        Self {
            pool: CandidatePool::Empty,
            ranking: Vec::new(),
            picks: Vec::new(),
        }
    }
}

/// Filter cascade: exact range, widened range, whole category.
pub fn candidate_pool<'a>(
    menu: &'a [MenuItem],
    query: &RecommendationQuery,
    relax_margin: f64,
) -> (CandidatePool, Vec<&'a MenuItem>) {
    let in_category: Vec<&MenuItem> = menu
        .iter()
        .filter(|i| i.category.matches(&query.category))
        .collect();
    if in_category.is_empty() {
        return (CandidatePool::Empty, in_category);
    }

    let within = |range: PriceRange| -> Vec<&'a MenuItem> {
        in_category
            .iter()
            .copied()
            .filter(|i| i.price_value().is_some_and(|p| range.contains(p)))
            .collect()
    };

    let exact = within(query.budget);
    if !exact.is_empty() {
        return (CandidatePool::Exact, exact);
    }
    let widened = within(query.budget.widened(relax_margin));
    if !widened.is_empty() {
        return (CandidatePool::Widened, widened);
    }
    (CandidatePool::WholeCategory, in_category)
}

/// Rank the menu for `query` and pick the shortlist.
pub fn recommend<'a, R: Rng + ?Sized>(
    menu: &'a [MenuItem],
    query: &RecommendationQuery,
    ctx: &RankingContext<'_>,
    rng: &mut R,
) -> Recommendation<'a> {
    let cfg = ctx.config;
    let sp = &cfg.scoring;

    let (pool, candidates) = candidate_pool(menu, query, sp.price_relax_margin);
    if candidates.is_empty() {
        debug!(target: "ranking", category = %query.category, "no candidates in category");
        return Recommendation::empty();
    }

    let scoring = ScoringContext {
        profile: query.normalized_profile(),
        semantic_terms: cfg.lexicon.expand_terms(&query.profile),
        budget: query.budget,
        tier: OccasionTier::classify(&query.budget, sp.everyday_max, sp.special_max),
        weights: ctx.weights,
        widened: pool == CandidatePool::Widened,
        params: sp,
    };

    let mut ranking: Vec<ScoredCandidate<'a>> = candidates
        .into_iter()
        .map(|item| {
            let penalty = recency_penalty(&item.id, ctx.recent_ids, &cfg.recency);
            score_candidate(item, &scoring, penalty)
        })
        .collect();
    sort_by_score(&mut ranking);
    ranking.truncate(sp.top_pool);

    let picks = pick_diverse(
        &ranking,
        sp.shortlist_size,
        sp.diversity_pool,
        sp.diversity_jitter,
        rng,
    )
    .into_iter()
    .enumerate()
    .map(|(idx, candidate)| Recommended {
        rationale: rationale(idx, &candidate),
        position: idx + 1,
        candidate,
    })
    .collect::<Vec<_>>();

    debug!(
        target: "ranking",
        pool = %pool,
        ranked = ranking.len(),
        picks = ?picks.iter().map(|p| p.item().id.as_str()).collect::<Vec<_>>(),
        "ranking done"
    );

    Recommendation {
        pool,
        ranking,
        picks,
    }
}

/// `"<tag>: <reason> + <reason>"`, first two reasons only.
pub fn rationale(idx: usize, c: &ScoredCandidate<'_>) -> String {
    let tag = if idx == 0 {
        "Top pick"
    } else {
        "Balanced alternative"
    };
    let reasons = if c.reasons.is_empty() {
        "recommended on overall fit".to_string()
    } else {
        c.reasons
            .iter()
            .take(2)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    };
    format!("{tag}: {reasons}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::scoring::{FactorBreakdown, MatchReason};
    use crate::menu::Category;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wine(id: &str, price: &str, app: &str) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: format!("Vino {id}"),
            price: price.into(),
            category: Category::RedWine,
            appellation: Some(app.into()),
            ..Default::default()
        }
    }

    fn query(min: f64, max: f64) -> RecommendationQuery {
        RecommendationQuery::new(Category::RedWine, vec!["rioja".into()], PriceRange::new(min, max))
    }

    #[test]
    fn exact_pool_when_range_has_items() {
        let menu = vec![wine("A", "20,00 €", "Rioja"), wine("B", "50,00 €", "Toro")];
        let (pool, items) = candidate_pool(&menu, &query(0.0, 30.0), 15.0);
        assert_eq!(pool, CandidatePool::Exact);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn widened_before_whole_category() {
        let menu = vec![wine("A", "40,00 €", "Rioja"), wine("B", "90,00 €", "Toro")];
        let (pool, items) = candidate_pool(&menu, &query(0.0, 30.0), 15.0);
        assert_eq!(pool, CandidatePool::Widened);
        assert_eq!(items[0].id, "A");

        let (pool, items) = candidate_pool(&menu, &query(0.0, 10.0), 15.0);
        assert_eq!(pool, CandidatePool::WholeCategory);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn malformed_prices_never_match_a_range() {
        let menu = vec![wine("A", "consultar", "Rioja")];
        let (pool, items) = candidate_pool(&menu, &query(0.0, 30.0), 15.0);
        assert_eq!(pool, CandidatePool::WholeCategory);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn empty_category_gives_empty_result() {
        let menu = vec![wine("A", "20,00 €", "Rioja")];
        let q = RecommendationQuery::new(Category::Sparkling, vec![], PriceRange::new(0.0, 30.0));
        let cfg = SommelierConfig::default();
        let ctx = RankingContext {
            config: &cfg,
            weights: FactorWeights::base(),
            recent_ids: &[],
        };
        let r = recommend(&menu, &q, &ctx, &mut StdRng::seed_from_u64(1));
        assert!(r.is_empty());
        assert_eq!(r.pool, CandidatePool::Empty);
    }

    #[test]
    fn rationale_uses_two_reasons_or_fallback() {
        let item = wine("A", "20,00 €", "Rioja");
        let mut c = ScoredCandidate {
            item: &item,
            score: 1.0,
            breakdown: FactorBreakdown::default(),
            reasons: vec![
                MatchReason::ProfileTraits(2),
                MatchReason::ExternalRatings,
                MatchReason::WithinBudget,
            ],
        };
        assert_eq!(
            rationale(0, &c),
            "Top pick: matches 2 profile traits + backed by external ratings"
        );
        c.reasons.clear();
        assert_eq!(
            rationale(1, &c),
            "Balanced alternative: recommended on overall fit"
        );
    }

    #[test]
    fn shortlist_is_positioned_and_unique() {
        let menu: Vec<MenuItem> = (0..8)
            .map(|i| wine(&format!("W{i}"), "20,00 €", if i % 2 == 0 { "Rioja" } else { "Toro" }))
            .collect();
        let cfg = SommelierConfig::default();
        let ctx = RankingContext {
            config: &cfg,
            weights: FactorWeights::base(),
            recent_ids: &[],
        };
        let r = recommend(&menu, &query(0.0, 30.0), &ctx, &mut StdRng::seed_from_u64(9));
        assert_eq!(r.picks.len(), 2);
        assert_eq!(r.picks[0].position, 1);
        assert_eq!(r.picks[1].position, 2);
        assert_ne!(r.picks[0].item().id, r.picks[1].item().id);
        assert_ne!(r.picks[0].item().appellation, r.picks[1].item().appellation);
        assert!(r.picks[0].rationale.starts_with("Top pick: "));
    }
}
