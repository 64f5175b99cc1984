mod config;
mod data;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use config::Settings;
use data::clean::MalformedRowPolicy;
use data::filter::{CategorySelector, ALL_CATEGORIES};
use data::loader::load_catalog;
use state::DashboardState;

#[derive(Parser)]
#[command(name = "catalog-insights")]
#[command(about = "Clean a product catalog and summarise it by category", long_about = None)]
struct Cli {
    /// Catalog file (.csv, .json or .parquet)
    path: PathBuf,

    /// Main category to filter on
    #[arg(short, long, default_value = ALL_CATEGORIES)]
    category: String,

    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Length of the ranked category lists
    #[arg(long)]
    top_n: Option<usize>,

    /// Abort on the first malformed price or discount instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Print the category selector entries and exit
    #[arg(long)]
    list_categories: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(n) = cli.top_n {
        settings.top_n = n;
    }
    if cli.strict {
        settings.malformed_rows = MalformedRowPolicy::Fail;
    }

    let catalog = load_catalog(&cli.path, settings.malformed_rows)?;
    let mut state = DashboardState::new(catalog, settings);

    let output = if cli.list_categories {
        json!(state.selector_options())
    } else {
        let selector: CategorySelector = cli.category.parse()?;
        state.select(selector);
        json!({
            "filter": state.selector.to_string(),
            "rejected_rows": state.catalog().rejected.len(),
            "summary": state.summary,
        })
    };

    let text = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
