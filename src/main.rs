//! Family Gestor main entry point

use anyhow::Context;
use clap::Parser;
use gestor_advisor::Advisor;
use gestor_api::{start_server, AppState};
use gestor_config::{Config, ConfigError};
use gestor_core::{CategoryPalette, JsonFileStore, Ledger};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "gestor")]
#[command(version)]
#[command(about = "A family finance dashboard served over HTTP", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a commented default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    // RUST_LOG overrides the configured level
    let (config, missing) = match Config::load(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
            return Err(e).with_context(|| format!("loading {}", args.config.display()));
        }
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if missing {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let palette = CategoryPalette::from_overrides(&config.categories.colors)
        .context("invalid category colors")?;
    let store = Arc::new(JsonFileStore::new(config.ledger_path()));
    log::info!("Ledger file: {}", config.ledger_path().display());

    let mut ledger = Ledger::new(config.clone(), palette, store);
    let outcome = ledger
        .load(gestor_core::today())
        .await
        .context("loading ledger")?;
    log::info!(
        "Ledger loaded: {} transactions, {} fixed expenses, {} closings",
        ledger.state().transactions.len(),
        ledger.state().fixed_expenses.len(),
        ledger.state().history.len()
    );
    if outcome.generated > 0 {
        log::info!("Generated {} fixed-expense transactions", outcome.generated);
    }

    let advisor = Advisor::from_config(&config.advisor).context("building advisor client")?;
    if !advisor.is_enabled() {
        log::info!("Insights disabled in configuration");
    }

    start_server(AppState {
        ledger: Arc::new(RwLock::new(ledger)),
        config,
        advisor: Arc::new(advisor),
    })
    .await
}
