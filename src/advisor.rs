//! Application state around the pure engine.
//!
//! `Sommelier` owns the config, the preference store, the experiment arm and
//! the adaptive multipliers. It reads/writes recency history, appends the
//! event log, learns from selections (arm B only) and counts runs.
//!
//! Store access is best-effort: a failing or empty store only means defaults.

use chrono::Utc;
use metrics::counter;
use rand::Rng;
use tracing::{debug, info};

use crate::analyze::scoring::FactorBreakdown;
use crate::analyze::weights::{AdaptiveMultipliers, ExperimentGroup, FactorWeights, SelectionSignals};
use crate::config::{OccasionPreset, ProfilePreset, SommelierConfig};
use crate::engine::{self, RankingContext, Recommendation};
use crate::error::{Result, SommelierError};
use crate::events::{append_event, LogEvent, RankedSnapshot, RankingRun, SelectedSnapshot, SelectionEvent};
use crate::history::RecommendationHistory;
use crate::menu::{find_by_id, Category, MenuItem};
use crate::pairing::{suggest_food, FoodPairing};
use crate::query::RecommendationQuery;
use crate::store::{
    get_json, set_json, PreferenceStore, KEY_ADAPTIVE_WEIGHTS, KEY_EXPERIMENT_GROUP,
    KEY_RECENT_RECOMMENDATIONS,
};
use crate::summary::OrderSummary;
use crate::text::normalize_text;

/// One shortlisted entry remembered for learning.
#[derive(Clone, Debug)]
struct BatchEntry {
    id: String,
    position: usize,
    score: f64,
    breakdown: FactorBreakdown,
}

/// The last ranking run; selections are only learned from this batch.
#[derive(Clone, Debug)]
struct LastBatch {
    query: RecommendationQuery,
    entries: Vec<BatchEntry>,
}

/// Outcome of `record_selection`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Item was in the last batch and the multipliers moved.
    Learned,
    /// Item was in the last batch; arm A logs but does not learn.
    Logged,
    /// Item was not part of the last batch.
    Ignored,
}

pub struct Sommelier<S: PreferenceStore> {
    config: SommelierConfig,
    store: S,
    group: ExperimentGroup,
    multipliers: AdaptiveMultipliers,
    last_batch: Option<LastBatch>,
}

impl<S: PreferenceStore> Sommelier<S> {
    /// Read the experiment arm (assigning and persisting one if absent) and
    /// the stored multipliers.
    pub fn new<R: Rng + ?Sized>(config: SommelierConfig, store: S, rng: &mut R) -> Self {
        let group = match store.get(KEY_EXPERIMENT_GROUP).as_deref().and_then(ExperimentGroup::parse) {
            Some(g) => g,
            None => {
                let g = ExperimentGroup::assign(rng);
                store.set(KEY_EXPERIMENT_GROUP, g.as_str());
                info!(target: "adaptive", group = %g, "assigned experiment group");
                g
            }
        };
        let multipliers = store
            .get(KEY_ADAPTIVE_WEIGHTS)
            .map(|raw| AdaptiveMultipliers::from_json_lossy(&raw, &config.adaptive))
            .unwrap_or_default();

        Self {
            config,
            store,
            group,
            multipliers,
            last_batch: None,
        }
    }

    pub fn config(&self) -> &SommelierConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn group(&self) -> ExperimentGroup {
        self.group
    }

    pub fn multipliers(&self) -> &AdaptiveMultipliers {
        &self.multipliers
    }

    /// Weights the next run will score with.
    pub fn effective_weights(&self) -> FactorWeights {
        self.config.weights.effective(self.group, &self.multipliers)
    }

    /// Rank, remember the picks for recency, log the run.
    pub fn recommend<'a, R: Rng + ?Sized>(
        &mut self,
        menu: &'a [MenuItem],
        query: &RecommendationQuery,
        rng: &mut R,
    ) -> Recommendation<'a> {
        let signature = query.signature();
        let cap = self.config.recency.history_cap;
        let mut history: RecommendationHistory =
            get_json(&self.store, KEY_RECENT_RECOMMENDATIONS).unwrap_or_default();
        let recent = history.recent(&signature, cap).to_vec();
        let weights = self.effective_weights();

        let ctx = RankingContext {
            config: &self.config,
            weights,
            recent_ids: &recent,
        };
        let rec = engine::recommend(menu, query, &ctx, rng);

        counter!("sommelier_recommendation_runs_total", "group" => self.group.as_str()).increment(1);
        counter!("sommelier_candidate_pool_total", "pool" => rec.pool.as_str()).increment(1);

        if rec.is_empty() {
            self.last_batch = None;
            return rec;
        }

        history.record(&signature, &rec.ids(), cap);
        set_json(&self.store, KEY_RECENT_RECOMMENDATIONS, &history);

        let run = RankingRun {
            timestamp: Utc::now(),
            category: query.category.clone(),
            profile: query.profile.clone(),
            budget: query.budget,
            group: self.group,
            weights,
            selected: rec
                .picks
                .iter()
                .map(|p| SelectedSnapshot::from_candidate(&p.candidate, p.position))
                .collect(),
            top_ranking: rec
                .ranking
                .iter()
                .enumerate()
                .map(|(i, c)| RankedSnapshot::from_candidate(c, i + 1))
                .collect(),
        };
        append_event(&self.store, &LogEvent::Ranking(run), self.config.events.log_cap);

        self.last_batch = Some(LastBatch {
            query: query.clone(),
            entries: rec
                .picks
                .iter()
                .map(|p| BatchEntry {
                    id: p.item().id.clone(),
                    position: p.position,
                    score: p.candidate.score,
                    breakdown: p.candidate.breakdown,
                })
                .collect(),
        });

        info!(
            target: "ranking",
            group = %self.group,
            pool = %rec.pool,
            picks = ?rec.ids(),
            "recommendation run"
        );
        rec
    }

    /// The guest chose `id`. Learns (arm B) and logs when `id` was part of
    /// the last shortlist; otherwise nothing happens.
    pub fn record_selection(&mut self, id: &str) -> SelectionOutcome {
        let Some(batch) = &self.last_batch else {
            return SelectionOutcome::Ignored;
        };
        let Some(entry) = batch.entries.iter().find(|e| e.id == id) else {
            debug!(target: "adaptive", id, "selection outside last batch");
            return SelectionOutcome::Ignored;
        };

        let learned = if self.group.learns() {
            let signals = SelectionSignals::from_breakdown(&entry.breakdown, &self.config.adaptive);
            self.multipliers.adapt(&signals, &self.config.adaptive);
            set_json(&self.store, KEY_ADAPTIVE_WEIGHTS, &self.multipliers);
            debug!(target: "adaptive", ?signals, multipliers = ?self.multipliers, "multipliers updated");
            true
        } else {
            false
        };

        let event = SelectionEvent {
            timestamp: Utc::now(),
            group: self.group,
            selected_id: entry.id.clone(),
            position: entry.position,
            score: crate::events::round2(entry.score),
            category: batch.query.category.clone(),
            profile: batch.query.profile.clone(),
            budget: batch.query.budget,
        };
        append_event(&self.store, &LogEvent::Selection(event), self.config.events.log_cap);
        counter!("sommelier_selections_total", "group" => self.group.as_str()).increment(1);

        if learned {
            SelectionOutcome::Learned
        } else {
            SelectionOutcome::Logged
        }
    }

    /// Profile presets offered for a wine family.
    pub fn profile_presets(&self, family: &Category) -> Vec<&ProfilePreset> {
        self.config.lexicon.profiles_for(family)
    }

    pub fn occasion_presets(&self) -> &[OccasionPreset] {
        &self.config.lexicon.occasions
    }

    /// Occasion preset by label, ignoring case and accents.
    pub fn occasion_preset(&self, label: &str) -> Option<&OccasionPreset> {
        let wanted = normalize_text(label);
        self.occasion_presets()
            .iter()
            .find(|o| normalize_text(&o.label) == wanted)
    }

    /// Food suggestions for a wine on the menu.
    pub fn pair<'a>(&self, menu: &'a [MenuItem], wine_id: &str) -> Result<FoodPairing<'a>> {
        let wine = find_by_id(menu, wine_id)
            .filter(|w| w.category.is_wine())
            .ok_or_else(|| SommelierError::UnknownWine(wine_id.to_string()))?;
        Ok(suggest_food(menu, wine, &self.config.lexicon))
    }

    pub fn summarize(&self, menu: &[MenuItem], wine_id: &str, food: &str) -> Result<OrderSummary> {
        OrderSummary::build(menu, wine_id, food)
    }
}
