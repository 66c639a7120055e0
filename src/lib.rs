//! tilefont: glyph server for vector map styles.
//!
//! Serves `/fonts/{fontstack}/{range}.pbf` by resolving every font of the
//! stack through the allow-list and fallback chain of `tilefont-glyphs`,
//! then merging the results into one PBF. Configuration comes from
//! `tilefont-config` and can be reloaded without a restart.

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod logging;
pub mod reload;
pub mod server;
pub mod state;

use anyhow::{Context, Result};
use app::App;
use cli::RuntimeOptions;
use server::ServerOptions;
use state::ServingState;
use std::net::SocketAddr;
use std::sync::Arc;
use tilefont_config::Config;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Run the glyph server until a shutdown signal arrives.
///
/// The config is parsed before binding so a broken file fails fast. The
/// listener is up while fonts are discovered; `/health` reports `503` until
/// that finishes.
pub async fn run(options: RuntimeOptions) -> Result<()> {
    let config = Config::load(&options.config_path)
        .with_context(|| format!("Failed to load config {}", options.config_path.display()))?;

    let addr = SocketAddr::new(options.bind, options.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening at http://{}/", listener.local_addr()?);

    let app = Arc::new(App::new(ServerOptions {
        cors: options.cors,
        silent: options.silent,
    }));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(server::serve(listener, Arc::clone(&app), shutdown_rx));

    let result = match ServingState::from_config(config).await {
        Ok(state) => {
            app.install(state);
            log::info!("Startup complete");
            reload::supervise(&app, &options.config_path, options.watch).await
        }
        Err(e) => Err(e),
    };

    let _ = shutdown_tx.send(true);
    server.await.context("Server task failed")??;
    result
}

/// Validate the configuration and print the fonts it would serve.
pub async fn check(options: RuntimeOptions) -> Result<()> {
    let state = ServingState::load(&options.config_path).await?;

    println!("Config:      {}", options.config_path.display());
    println!("Fonts dir:   {}", state.fonts_dir.display());
    println!(
        "Allow-list:  {}",
        match &state.allow_list {
            Some(allowed) => format!("{} fonts", allowed.len()),
            None => "none (all fonts served)".to_string(),
        }
    );
    println!("Timeout:     {:?}", state.timeout);
    println!();
    for font in state.listed_fonts() {
        let marker = if state.available_fonts.contains(&font) {
            ' '
        } else {
            '!'
        };
        println!("{marker} {font}");
    }
    Ok(())
}
