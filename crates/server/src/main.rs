//! Headless simulation host.
//!
//! Runs rounds back to back with the built-in roster, logs what happens and
//! stops on Ctrl-C.
mod config;
mod roster;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use config::HostConfig;
use game_core::EngineEvent;
use runtime::{Event, InMemoryLedger, Runtime, RuntimeHandle, Topic};

/// Rounds' worth of candidates queued at start-up.
const DEMO_ROUNDS: usize = 50;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = HostConfig::from_env();
    let _guard = setup_logging(&config)?;

    let runtime = Runtime::builder()
        .config(config.runtime.clone())
        .identity_feed(roster::demo_feed(DEMO_ROUNDS))
        .ledger(InMemoryLedger::new().with_stakes(config.ledger_staked))
        .build()
        .await
        .context("failed to start runtime")?;

    let handle = runtime.handle();
    let game_log = tokio::spawn(log_game_events(handle.clone()));
    let chat_log = tokio::spawn(log_topic(handle.clone(), Topic::Chat));
    let snapshot_log = tokio::spawn(log_topic(handle, Topic::Snapshot));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("shutdown requested");

    runtime.shutdown().await.context("runtime shutdown failed")?;
    game_log.abort();
    chat_log.abort();
    snapshot_log.abort();
    Ok(())
}

/// Install stderr logging plus an optional file layer.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(config: &HostConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = if config.log_to_file {
        let dir = config.log_dir.clone().unwrap_or_else(default_log_dir);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(&dir, "sim-server.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if config.log_to_file {
        tracing::info!("file logging enabled");
    }
    Ok(guard)
}

/// Platform cache directory, e.g. `~/.cache/among-sim/logs` on Linux.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "among-sim")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/among-sim"))
        .join("logs")
}

async fn log_game_events(handle: RuntimeHandle) {
    let mut rx = handle.subscribe(Topic::Game);
    loop {
        match rx.recv().await {
            Ok(Event::Game(event)) => log_engine_event(&event),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "game event log lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn log_engine_event(event: &EngineEvent) {
    match event {
        EngineEvent::RoundEnded { round, outcome } => {
            tracing::info!(target: "sim_server", round, result = %outcome, "round over");
        }
        EngineEvent::AgentKilled {
            killer,
            victim,
            witnessed,
        } => {
            tracing::info!(target: "sim_server", %killer, %victim, witnessed, "kill");
        }
        EngineEvent::AgentEjected { agent } => {
            tracing::info!(target: "sim_server", %agent, "ejected");
        }
        other => tracing::debug!(target: "sim_server", event = ?other, "game event"),
    }
}

async fn log_topic(handle: RuntimeHandle, topic: Topic) {
    let mut rx = handle.subscribe(topic);
    loop {
        match rx.recv().await {
            Ok(Event::Chat(message)) => {
                tracing::debug!(
                    target: "sim_server::chat",
                    kind = ?message.kind,
                    sender = %message.sender,
                    name = %message.sender_name,
                    "{}",
                    message.content
                );
            }
            Ok(Event::Snapshot(snapshot)) => {
                if tracing::enabled!(target: "sim_server::snapshot", tracing::Level::TRACE) {
                    match serde_json::to_string(&snapshot) {
                        Ok(json) => tracing::trace!(target: "sim_server::snapshot", "{json}"),
                        Err(error) => {
                            tracing::warn!(%error, "failed to encode snapshot");
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }
}
