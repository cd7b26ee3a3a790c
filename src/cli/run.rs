use crate::config::{load_config, Overrides};
use crate::notify::{NotifyError, SlackNotifier};
use crate::poll::{Cursor, PollCycle};
use crate::source::{ElasticSearchSource, SourceError};
use crate::watcher::Watcher;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("search client error: {0}")]
    Source(#[from] SourceError),

    #[error("notifier error: {0}")]
    Notifier(#[from] NotifyError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub async fn run(config_path: Option<PathBuf>, overrides: Overrides) -> Result<(), RunError> {
    match &config_path {
        Some(path) => info!(config_path = %path.display(), "Loading configuration"),
        None => info!("No config file found, using command line settings"),
    }

    let config = load_config(config_path.as_deref(), &overrides)?;

    info!(url = %config.search.url, index = %config.search.index, "Creating search client");
    let source = Arc::new(ElasticSearchSource::new(&config.search)?);

    info!(channel = %config.slack.channel, "Creating Slack notifier");
    let notifier = Arc::new(SlackNotifier::new(&config.slack)?);

    let cycle = PollCycle::from_config(config.search.page_size, &config.poll);
    let watcher = Watcher::new(source, notifier, cycle, config.poll.interval, Cursor::now());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let startup_text = startup_message();
    let handle = tokio::spawn(async move { watcher.run(&startup_text, shutdown_rx).await });

    info!("Watcher started, press Ctrl+C to shutdown");

    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    handle.await?;
    info!("Shutdown complete");

    Ok(())
}

fn startup_message() -> String {
    match hostname::get() {
        Ok(host) => format!("i started to work on {}", host.to_string_lossy()),
        Err(_) => "i started to work".to_string(),
    }
}
