//! E-Boekhouden migration runner.
//!
//! Usage:
//!   ebmig run    - Run the full migration (default)
//!   ebmig fetch  - Crawl the source into the mutation cache and print statistics

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ebmig_client::SourceClient;
use ebmig_engine::{Orchestrator, RunStatus};
use ebmig_shared::{ChannelProgressBus, MigrationConfig};
use ebmig_store::{MemoryMutationCache, MemoryStore, MutationCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ebmig=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "run".to_string());

    // Load configuration
    let config = MigrationConfig::load()?;
    let client = Arc::new(SourceClient::new(&config.source)?);
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryMutationCache::new());
    let orchestrator = Orchestrator::new(client, store, cache.clone(), config);

    // Forward progress events to the log as they arrive
    let (bus, mut events) = ChannelProgressBus::new();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.progress {
                Some(pct) => info!(pct, "{}", event.message),
                None => info!("{}", event.message),
            }
        }
    });

    match command.as_str() {
        "run" => {
            let report = orchestrator.run(&bus).await;
            drop(bus);
            reporter.await?;
            info!("{}", report.summary());
            for (mutation_type, count) in &report.imported_by_type {
                info!(mutation_type = mutation_type.code(), count, "imported");
            }
            for line in &report.error_log {
                tracing::warn!("{line}");
            }
            if report.status == RunStatus::Failed {
                anyhow::bail!("migration failed");
            }
        }
        "fetch" => {
            let stats = orchestrator.fetch_into_cache(&bus).await?;
            drop(bus);
            reporter.await?;
            info!(
                checked = stats.checked,
                found = stats.found,
                cached = stats.cached,
                stopped_early = stats.stopped_early,
                "fetch finished"
            );
            let summary = cache.statistics().await?;
            info!(total = summary.total, "cache contents");
            for (mutation_type, count) in &summary.by_type {
                info!(mutation_type = mutation_type.code(), count, "cached mutations");
            }
            if let Some((low, high)) = summary.id_range {
                info!(low, high, "cached ID range");
            }
            if let Some((from, to)) = summary.date_range {
                info!(%from, %to, "cached date range");
            }
        }
        other => {
            anyhow::bail!("unknown command: {other} (expected run or fetch)");
        }
    }

    Ok(())
}
