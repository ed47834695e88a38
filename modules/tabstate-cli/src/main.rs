//! Host process for the tab state store.
//!
//! Restores state from the cache, then commits JSON-lines mutations read from
//! stdin, persisting after each cacheable one.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tabstate_cache::{CacheStore, FileCache, MemoryCache};
use tabstate_common::file_config::{load_config_or_default, CacheBackend, FileConfig};
use tabstate_common::{AppMutation, AppReducer, AppState};
use tabstate_engine::{MutationLike, Store};
use tabstate_persist::{load_cached_state, persistence, restore_into};

#[derive(Parser)]
#[command(name = "tabstate")]
#[command(about = "New-tab state store with cache persistence")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "TABSTATE_CONFIG", default_value = "tabstate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore from cache, then commit mutations read from stdin (one JSON object per line)
    Apply {
        /// Print the final state as JSON
        #[arg(long)]
        print: bool,
    },

    /// Print the cached snapshot
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = load_config_or_default(&cli.config)?;
    config.persist = config
        .persist
        .with_env_overrides()
        .context("Invalid persistence settings in environment")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(config = %cli.config.display(), "tabstate starting");
    config.persist.log();

    let cache = open_cache(&config).await?;

    match cli.command {
        Commands::Apply { print } => apply(cache, &config, print).await,
        Commands::Show => show(cache.as_ref(), &config).await,
    }
}

async fn open_cache(config: &FileConfig) -> Result<Arc<dyn CacheStore>> {
    match config.cache.backend {
        CacheBackend::File => {
            let cache = FileCache::open(&config.cache.dir).await.with_context(|| {
                format!("Failed to open cache dir: {}", config.cache.dir.display())
            })?;
            info!(dir = %config.cache.dir.display(), "Using file cache");
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

async fn apply(cache: Arc<dyn CacheStore>, config: &FileConfig, print: bool) -> Result<()> {
    let (plugin, writer) = persistence(Arc::clone(&cache), &config.persist)?;
    let mut store = Store::new(AppReducer, AppState::default()).with_subscriber(plugin);

    restore_into(&mut store, cache.as_ref(), &config.persist.cache_key)
        .await
        .context("Failed to restore state from cache")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<AppMutation>(line) {
            Ok(mutation) => {
                let category = mutation.category();
                info!(line = line_no, mutation = mutation.mutation_type(), ?category, "Committing");
                store.commit(mutation);
            }
            Err(e) => warn!(line = line_no, error = %e, "Skipping malformed mutation"),
        }
    }

    let stats = writer.shutdown().await;
    info!(
        commits = store.commit_count(),
        written = stats.written(),
        failed = stats.failed(),
        "Done"
    );

    if print {
        println!("{}", serde_json::to_string_pretty(store.state().as_ref())?);
    }
    Ok(())
}

async fn show(cache: &dyn CacheStore, config: &FileConfig) -> Result<()> {
    match load_cached_state(cache, &config.persist.cache_key).await? {
        Some(cached) => println!("{}", serde_json::to_string_pretty(&cached)?),
        None => info!(key = config.persist.cache_key.as_str(), "Cache is empty"),
    }
    Ok(())
}
