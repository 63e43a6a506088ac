//! Sommelier CLI: binary entrypoint
//! Loads the menu (file, then the embedded dataset), wires the advisor to a
//! preference store and runs one subcommand.
//!
//! See `README.md` for examples.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sommelier_advisor::ingest::types::MenuSource;
use sommelier_advisor::ingest::{load_menu, EmbeddedMenuSource, FileMenuSource};
use sommelier_advisor::menu::{appellations, wines_by_appellation};
use sommelier_advisor::{
    Category, JsonFileStore, MemoryStore, MenuItem, PreferenceStore, PriceRange,
    RecommendationQuery, Sommelier, SommelierConfig,
};

#[derive(Parser, Debug)]
#[command(name = "sommelier", version, about = "Wine recommendations and food pairing")]
struct Cli {
    /// Menu JSON file; the embedded dataset is used when it cannot be read.
    #[arg(long, env = "SOMMELIER_MENU_PATH", default_value = "data/menu.json")]
    menu: PathBuf,

    /// Preference store file (experiment group, weights, history, event log).
    /// Without it nothing is persisted.
    #[arg(long, env = "SOMMELIER_STORE_PATH")]
    store: Option<PathBuf>,

    /// Seed for reproducible diversity jitter and group assignment.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortlist wines for a family, profile keywords and budget.
    Recommend {
        /// "tinto", "blanco", "espumoso" or a menu category label.
        #[arg(long)]
        family: String,
        /// Profile keyword; repeat for several.
        #[arg(long = "profile", required = true)]
        profile: Vec<String>,
        /// Budget as MIN-MAX, e.g. 0-30.
        #[arg(long, value_parser = parse_budget, required_unless_present = "occasion", conflicts_with = "occasion")]
        budget: Option<PriceRange>,
        /// Occasion preset label instead of a budget (see `presets`).
        #[arg(long)]
        occasion: Option<String>,
        /// Record the choice of this id from the shortlist.
        #[arg(long)]
        pick: Option<String>,
    },
    /// Food suggestions for a wine id.
    Pair {
        #[arg(long)]
        wine: String,
    },
    /// Order summary for a wine id and a dish (id or name).
    Summary {
        #[arg(long)]
        wine: String,
        #[arg(long)]
        food: String,
    },
    /// List wines, optionally for one appellation.
    Menu {
        #[arg(long)]
        appellation: Option<String>,
    },
    /// Report incomplete records and duplicate ids.
    Validate,
    /// Profile presets for a family and the occasion presets.
    Presets {
        #[arg(long)]
        family: String,
    },
}

fn parse_budget(raw: &str) -> std::result::Result<PriceRange, String> {
    raw.parse()
}

fn parse_family(raw: &str) -> Category {
    match raw.trim().to_lowercase().as_str() {
        "tinto" | "tintos" | "red" => Category::RedWine,
        "blanco" | "blancos" | "white" => Category::WhiteWine,
        "espumoso" | "espumosos" | "sparkling" => Category::Sparkling,
        _ => Category::parse(raw),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=info,ranking=info,adaptive=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = SommelierConfig::load_default().context("loading configuration")?;

    let sources: Vec<Box<dyn MenuSource>> = vec![
        Box::new(FileMenuSource::new(&cli.menu)),
        Box::new(EmbeddedMenuSource),
    ];
    let loaded = load_menu(&sources).await?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.store.clone() {
        Some(path) => {
            let advisor = Sommelier::new(config, JsonFileStore::open(path), &mut rng);
            run(cli.command, advisor, &loaded.items, &loaded.report, &mut rng)
        }
        None => {
            let advisor = Sommelier::new(config, MemoryStore::new(), &mut rng);
            run(cli.command, advisor, &loaded.items, &loaded.report, &mut rng)
        }
    }
}

fn run<S: PreferenceStore>(
    command: Command,
    mut advisor: Sommelier<S>,
    menu: &[MenuItem],
    report: &sommelier_advisor::menu::MenuReport,
    rng: &mut StdRng,
) -> Result<()> {
    match command {
        Command::Recommend {
            family,
            profile,
            budget,
            occasion,
            pick,
        } => {
            let budget = match (budget, occasion.as_deref()) {
                (Some(b), _) => b,
                (None, Some(label)) => advisor
                    .occasion_preset(label)
                    .map(|o| o.range())
                    .ok_or_else(|| anyhow!("unknown occasion {label:?}"))?,
                (None, None) => bail!("either --budget or --occasion is required"),
            };
            let query = RecommendationQuery::new(parse_family(&family), profile, budget);
            let rec = advisor.recommend(menu, &query, rng);
            if rec.is_empty() {
                println!("No wines found for these criteria. Try another budget or profile.");
                return Ok(());
            }
            println!("Experiment group {} ({} pool)", advisor.group(), rec.pool);
            for p in &rec.picks {
                let item = p.item();
                println!(
                    "{}. [{}] {} ({}) score {:.2}",
                    p.position, item.id, item.name, item.price, p.candidate.score
                );
                println!("   {}", p.rationale);
            }
            if let Some(id) = pick {
                let outcome = advisor.record_selection(&id);
                println!("Selection {id}: {outcome:?}");
            }
        }
        Command::Pair { wine } => {
            let pairing = advisor.pair(menu, &wine)?;
            println!("Suggested dishes ({:?}):", pairing.strategy);
            for d in pairing.dishes {
                println!("- [{}] {} ({})", d.id, d.name, d.price);
            }
        }
        Command::Summary { wine, food } => {
            let summary = advisor.summarize(menu, &wine, &food)?;
            println!("{summary}");
        }
        Command::Menu { appellation } => {
            if let Some(d) = appellation.as_deref() {
                if !appellations(menu).iter().any(|a| a == d) {
                    bail!("unknown appellation {d:?}");
                }
            }
            for w in wines_by_appellation(menu, appellation.as_deref()) {
                println!(
                    "[{}] {} | {} | {} | {}",
                    w.id,
                    w.name,
                    w.category,
                    w.appellation.as_deref().unwrap_or("-"),
                    w.price
                );
            }
        }
        Command::Validate => {
            if report.is_clean() {
                println!("Menu OK ({} items)", menu.len());
                return Ok(());
            }
            for it in &report.incomplete {
                println!(
                    "incomplete #{} {}: missing {}",
                    it.index,
                    it.id,
                    it.missing.join(", ")
                );
            }
            for id in &report.duplicate_ids {
                println!("duplicate id {id}");
            }
            return Err(anyhow!("menu has problems"));
        }
        Command::Presets { family } => {
            let family = parse_family(&family);
            if !family.is_wine() {
                bail!("unknown wine family {family}");
            }
            println!("Profiles ({family}):");
            for p in advisor.profile_presets(&family) {
                println!("- {}: {} [{}]", p.label, p.description, p.keys.join(", "));
            }
            println!("Occasions:");
            for o in advisor.occasion_presets() {
                let r = o.range();
                println!("- {} ({}): {:.0}-{:.0} €", o.label, o.sublabel, r.min, r.max);
            }
        }
    }
    Ok(())
}
