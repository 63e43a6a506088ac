// src/ingest/mod.rs
//! Menu loading: try each source in order, first success wins.
//!
//! A loaded menu is validated (incomplete records, duplicate ids) and the
//! problems are logged; they never block loading.

pub mod providers;
pub mod types;

use anyhow::{anyhow, Context, Result};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::ingest::types::MenuSource;
use crate::menu::{validate_menu, MenuItem, MenuReport};

pub use providers::{EmbeddedMenuSource, FileMenuSource};
#[cfg(feature = "http-source")]
pub use providers::HttpMenuSource;

/// One-time metrics registration.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sommelier_menu_load_failures_total",
            "Menu sources that failed to load."
        );
        describe_counter!(
            "sommelier_recommendation_runs_total",
            "Recommendation runs by experiment group."
        );
        describe_counter!(
            "sommelier_candidate_pool_total",
            "Which filter stage produced the candidates."
        );
        describe_counter!(
            "sommelier_selections_total",
            "Selections from a shortlist by experiment group."
        );
    });
}

/// Decode a menu JSON document. The top level must be an array.
pub fn parse_menu(raw: &str) -> Result<Vec<MenuItem>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("menu is not valid JSON")?;
    if !value.is_array() {
        return Err(anyhow!("menu JSON must be an array of items"));
    }
    serde_json::from_value(value).context("menu items have an unexpected shape")
}

/// A loaded menu plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedMenu {
    pub source: &'static str,
    pub items: Vec<MenuItem>,
    pub report: MenuReport,
}

/// Try `sources` in order. Fails only when every source fails.
pub async fn load_menu(sources: &[Box<dyn MenuSource>]) -> Result<LoadedMenu> {
    ensure_metrics_described();

    let mut errors = Vec::new();
    for s in sources {
        match s.load().await {
            Ok(items) => {
                let report = validate_menu(&items);
                info!(target: "ingest", source = s.name(), items = items.len(), "menu loaded");
                return Ok(LoadedMenu {
                    source: s.name(),
                    items,
                    report,
                });
            }
            Err(e) => {
                warn!(target: "ingest", error = ?e, source = s.name(), "menu source failed");
                counter!("sommelier_menu_load_failures_total", "source" => s.name()).increment(1);
                errors.push(format!("{}: {e:#}", s.name()));
            }
        }
    }

    Err(anyhow!("no menu source succeeded ({})", errors.join("; ")))
}
