use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Explorer, ExplorerOptions, GatewayConfig, HttpEntityGateway};
use storage::{MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod repl;

use config::{load_settings, prepare_preferences_url};

#[derive(Parser, Debug)]
#[command(about = "Search accounts and browse their repositories")]
struct Args {
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = "explorer.toml")]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    debounce_ms: Option<u64>,
    /// Treat the system appearance as dark when no theme has been saved.
    #[arg(long)]
    prefers_dark: bool,
    /// Keep preferences in memory instead of the SQLite file.
    #[arg(long)]
    ephemeral: bool,
    /// Print the results for this query and exit.
    #[arg(long)]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.token {
        settings.token = Some(v);
    }
    if let Some(v) = args.page_size {
        settings.page_size = v;
    }
    if let Some(v) = args.debounce_ms {
        settings.debounce_ms = v;
    }
    if args.prefers_dark {
        settings.prefers_dark = true;
    }
    settings.validate().context("invalid settings")?;

    let gateway = HttpEntityGateway::new(GatewayConfig {
        base_url: settings.api_url.clone(),
        token: settings.token.clone(),
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
        ..GatewayConfig::default()
    })?;

    let preferences: Arc<dyn PreferenceStore> = if args.ephemeral {
        Arc::new(MemoryPreferenceStore::new())
    } else {
        let url = prepare_preferences_url(&settings.preferences_url);
        info!(preferences_url = %url, "opening preference store");
        Arc::new(SqlitePreferenceStore::new(&url).await?)
    };

    let explorer = Explorer::start(
        Arc::new(gateway),
        preferences,
        ExplorerOptions {
            page_size: settings.page_size,
            search_debounce: Duration::from_millis(settings.debounce_ms),
            system_prefers_dark: settings.prefers_dark,
        },
    )
    .await;

    if let Some(query) = args.once {
        explorer.set_query(&query).await;
        explorer.trigger_search(1).await;
        let snapshot = explorer.snapshot().await;
        print!("{}", repl::render_snapshot(&snapshot));
        if let Some(error) = snapshot.error {
            anyhow::bail!(error);
        }
        return Ok(());
    }

    repl::run(explorer).await
}
