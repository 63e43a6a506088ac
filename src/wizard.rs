//! Wizard state machine.
//!
//! Family(1) → Profile(2) → Occasion(3) → Results(4) → Pairing(5) → Summary(6)
//!
//! `choose_*` records a selection and advances; choosing again at an earlier
//! step clears everything after it. `next` advances only when the current
//! step already has its selection. `go_back` moves one step back and keeps
//! the selection; `restart` clears it.

use serde::Serialize;

use crate::config::{OccasionPreset, ProfilePreset};
use crate::error::{Result, SommelierError};
use crate::menu::Category;
use crate::query::{PriceRange, RecommendationQuery};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Family,
    Profile,
    Occasion,
    Results,
    Pairing,
    Summary,
}

impl Step {
    /// 1-based position shown in the progress indicator.
    pub fn number(&self) -> u8 {
        match self {
            Self::Family => 1,
            Self::Profile => 2,
            Self::Occasion => 3,
            Self::Results => 4,
            Self::Pairing => 5,
            Self::Summary => 6,
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::Family => Some(Self::Profile),
            Self::Profile => Some(Self::Occasion),
            Self::Occasion => Some(Self::Results),
            Self::Results => Some(Self::Pairing),
            Self::Pairing => Some(Self::Summary),
            Self::Summary => None,
        }
    }

    fn prev(&self) -> Option<Self> {
        match self {
            Self::Family => None,
            Self::Profile => Some(Self::Family),
            Self::Occasion => Some(Self::Profile),
            Self::Results => Some(Self::Occasion),
            Self::Pairing => Some(Self::Results),
            Self::Summary => Some(Self::Pairing),
        }
    }
}

/// What the guest has chosen so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Selection {
    pub family: Option<Category>,
    pub profile: Option<Vec<String>>,
    pub budget: Option<PriceRange>,
    pub wine_id: Option<String>,
    pub food: Option<String>,
}

impl Selection {
    fn clear_after(&mut self, step: Step) {
        if step < Step::Profile {
            self.profile = None;
        }
        if step < Step::Occasion {
            self.budget = None;
        }
        if step < Step::Results {
            self.wine_id = None;
        }
        if step < Step::Pairing {
            self.food = None;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Wizard {
    step: Step,
    selection: Selection,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: Step::Family,
            selection: Selection::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    fn expect_step(&self, step: Step, action: &'static str) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(SommelierError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }

    pub fn choose_family(&mut self, family: Category) -> Result<()> {
        self.expect_step(Step::Family, "choose a family")?;
        if !family.is_wine() {
            return Err(SommelierError::InvalidTransition {
                from: self.step,
                action: "choose a non-wine family",
            });
        }
        self.selection.family = Some(family);
        self.selection.clear_after(Step::Family);
        self.step = Step::Profile;
        Ok(())
    }

    pub fn choose_profile(&mut self, keys: Vec<String>) -> Result<()> {
        self.expect_step(Step::Profile, "choose a profile")?;
        if keys.iter().all(|k| k.trim().is_empty()) {
            return Err(SommelierError::EmptyProfile);
        }
        self.selection.profile = Some(keys);
        self.selection.clear_after(Step::Profile);
        self.step = Step::Occasion;
        Ok(())
    }

    /// Record the budget and move to results; returns the query to rank.
    pub fn choose_budget(&mut self, budget: PriceRange) -> Result<RecommendationQuery> {
        self.expect_step(Step::Occasion, "choose a budget")?;
        self.selection.budget = Some(budget);
        self.selection.clear_after(Step::Occasion);
        self.step = Step::Results;
        self.query().ok_or(SommelierError::InvalidTransition {
            from: Step::Occasion,
            action: "build a query",
        })
    }

    /// Choose a profile preset; it must belong to the chosen family.
    pub fn choose_profile_preset(&mut self, preset: &ProfilePreset) -> Result<()> {
        self.expect_step(Step::Profile, "choose a profile")?;
        let same_family = self
            .selection
            .family
            .as_ref()
            .is_some_and(|f| preset.family.matches(f));
        if !same_family {
            return Err(SommelierError::InvalidTransition {
                from: self.step,
                action: "choose a profile of another family",
            });
        }
        self.choose_profile(preset.keys.clone())
    }

    pub fn choose_occasion(&mut self, preset: &OccasionPreset) -> Result<RecommendationQuery> {
        self.choose_budget(preset.range())
    }

    pub fn choose_wine(&mut self, wine_id: impl Into<String>) -> Result<()> {
        self.expect_step(Step::Results, "choose a wine")?;
        self.selection.wine_id = Some(wine_id.into());
        self.selection.clear_after(Step::Results);
        self.step = Step::Pairing;
        Ok(())
    }

    pub fn choose_food(&mut self, food: impl Into<String>) -> Result<()> {
        self.expect_step(Step::Pairing, "choose a dish")?;
        self.selection.food = Some(food.into());
        self.step = Step::Summary;
        Ok(())
    }

    /// Query built from family, profile and budget, once all three exist.
    pub fn query(&self) -> Option<RecommendationQuery> {
        let s = &self.selection;
        Some(RecommendationQuery::new(
            s.family.clone()?,
            s.profile.clone()?,
            s.budget?,
        ))
    }

    fn has_selection_for(&self, step: Step) -> bool {
        let s = &self.selection;
        match step {
            Step::Family => s.family.is_some(),
            Step::Profile => s.profile.is_some(),
            Step::Occasion => s.budget.is_some(),
            Step::Results => s.wine_id.is_some(),
            Step::Pairing => s.food.is_some(),
            Step::Summary => false,
        }
    }

    pub fn next(&mut self) -> Result<Step> {
        match self.step.next() {
            Some(to) if self.has_selection_for(self.step) => {
                self.step = to;
                Ok(to)
            }
            _ => Err(SommelierError::InvalidTransition {
                from: self.step,
                action: "advance",
            }),
        }
    }

    pub fn go_back(&mut self) -> Result<Step> {
        let to = self.step.prev().ok_or(SommelierError::InvalidTransition {
            from: self.step,
            action: "go back",
        })?;
        self.step = to;
        Ok(to)
    }

    pub fn restart(&mut self) {
        *self = Self::new();
    }
}
