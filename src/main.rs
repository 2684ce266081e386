use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealwatch::config::Config;
use mealwatch::engine::WatchEngine;
use mealwatch::notifications::WebhookNotifier;
use mealwatch::portal::PortalClient;
use mealwatch::scanner::AllergenScanner;

#[derive(Parser, Debug)]
#[command(name = "mealwatch")]
#[command(author, version, about = "Allergen watcher for a meal-delivery portal", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mealwatch.toml", env = "MEALWATCH_CONFIG")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override how many upcoming deliveries to check
    #[arg(long)]
    limit: Option<usize>,

    /// Run the full pipeline but log alerts instead of posting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;

    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting mealwatch v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let portal = PortalClient::login(&config.portal)
        .await
        .context("portal login failed")?;

    let notifier = WebhookNotifier::new(config.notifications.webhook_url.clone())
        .context("can't build webhook client")?;
    let scanner = AllergenScanner::new(&config.scanner.allergen_keywords);
    let limit = cli.limit.unwrap_or(config.watch.delivery_limit);

    let engine = WatchEngine::new(Arc::new(portal), notifier, scanner, limit, cli.dry_run);
    let summary = engine.run().await?;

    tracing::info!(
        deliveries = summary.deliveries_checked,
        flagged = summary.meals_flagged,
        alerts = summary.alerts_sent,
        "run complete"
    );
    Ok(())
}
