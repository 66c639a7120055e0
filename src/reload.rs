//! Process supervision: configuration reloads and shutdown signals.
//!
//! `SIGHUP` (Unix) and, with `--watch`, changes to the config file trigger a
//! reload. Ctrl-C and `SIGTERM` end [`supervise`].

use crate::app::App;
use anyhow::{Context, Result};
use std::path::Path;
use tilefont_config::watcher::ConfigWatcher;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinSet;

/// Debounce for config file change events.
pub const WATCH_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Hangup,
    FileChanged,
}

/// Serve reload triggers until a shutdown signal arrives.
pub async fn supervise(app: &App, config_path: &Path, watch: bool) -> Result<()> {
    let (tx, mut rx) = unbounded_channel();
    // Listener tasks are aborted when this set drops.
    let mut listeners: JoinSet<()> = JoinSet::new();

    #[cfg(unix)]
    spawn_hangup_listener(&mut listeners, tx.clone())?;
    if watch {
        spawn_config_watcher(&mut listeners, config_path, tx.clone())?;
    }
    drop(tx);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            Some(trigger) = rx.recv() => reload(app, config_path, trigger).await,
        }
    }
}

async fn reload(app: &App, config_path: &Path, trigger: ReloadTrigger) {
    match trigger {
        ReloadTrigger::Hangup => log::info!("Received SIGHUP, reloading configuration"),
        ReloadTrigger::FileChanged => log::info!("Config file changed, reloading configuration"),
    }
    if let Err(e) = app.reload(config_path).await {
        log::error!("Config reload failed, keeping previous configuration: {:#}", e);
    }
}

#[cfg(unix)]
fn spawn_hangup_listener(
    listeners: &mut JoinSet<()>,
    tx: UnboundedSender<ReloadTrigger>,
) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    listeners.spawn(async move {
        while hangup.recv().await.is_some() {
            if tx.send(ReloadTrigger::Hangup).is_err() {
                break;
            }
        }
    });
    Ok(())
}

fn spawn_config_watcher(
    listeners: &mut JoinSet<()>,
    config_path: &Path,
    tx: UnboundedSender<ReloadTrigger>,
) -> Result<()> {
    let mut watcher = ConfigWatcher::new(config_path, WATCH_DEBOUNCE_MS)
        .context("Failed to start config watcher")?;
    listeners.spawn(async move {
        while watcher.recv().await.is_some() {
            if tx.send(ReloadTrigger::FileChanged).is_err() {
                break;
            }
        }
    });
    Ok(())
}

/// Resolves on Ctrl-C, or `SIGTERM` on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received interrupt, shutting down"),
        _ = terminate => log::info!("Received SIGTERM, shutting down"),
    }
}
