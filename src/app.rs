//! Shared application context.
//!
//! Holds the current [`ServingState`] behind an `ArcSwapOption`: empty until
//! the first configuration is loaded (the server answers `503` meanwhile),
//! then replaced atomically on every successful reload.

use crate::server::ServerOptions;
use crate::server::http::Response;
use crate::state::ServingState;
use anyhow::Result;
use arc_swap::ArcSwapOption;
use std::path::Path;
use std::sync::Arc;

/// Main application state
#[derive(Debug)]
pub struct App {
    state: ArcSwapOption<ServingState>,
    options: ServerOptions,
}

impl App {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            state: ArcSwapOption::empty(),
            options,
        }
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Current serving state, `None` while starting up.
    pub fn state(&self) -> Option<Arc<ServingState>> {
        self.state.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.state.load().is_some()
    }

    /// Make `state` the one new requests see.
    pub fn install(&self, state: ServingState) {
        self.state.store(Some(Arc::new(state)));
    }

    /// Load `config_path` and swap it in. On error the current state stays.
    pub async fn reload(&self, config_path: &Path) -> Result<()> {
        let state = ServingState::load(config_path).await?;
        self.install(state);
        log::info!("Configuration reloaded from {}", config_path.display());
        Ok(())
    }

    /// Apply headers every response carries.
    pub fn decorate(&self, response: Response) -> Response {
        if self.options.cors {
            response.header("Access-Control-Allow-Origin", "*")
        } else {
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_failed_reload_keeps_state() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"options": {"allowedFonts": ["Open Sans Regular"]}}"#)
            .unwrap();

        let app = App::new(ServerOptions::default());
        assert!(!app.is_ready());
        app.reload(&config_path).await.expect("first load succeeds");
        assert!(app.is_ready());

        fs::write(&config_path, "{ broken").unwrap();
        assert!(app.reload(&config_path).await.is_err());
        let state = app.state().expect("previous state kept");
        assert_eq!(state.listed_fonts(), vec!["Open Sans Regular"]);
    }

    #[test]
    fn test_decorate_cors() {
        let with_cors = App::new(ServerOptions::default());
        let response = with_cors.decorate(Response::text(200, "OK"));
        assert!(response.headers.contains(&("Access-Control-Allow-Origin", "*".to_string())));

        let without = App::new(ServerOptions {
            cors: false,
            silent: false,
        });
        let response = without.decorate(Response::text(200, "OK"));
        assert!(response.headers.iter().all(|(n, _)| *n != "Access-Control-Allow-Origin"));
    }
}
