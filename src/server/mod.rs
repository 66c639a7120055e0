//! HTTP front for the glyph endpoints.
//!
//! One task per connection, one request per connection. The accept loop stops
//! when the shutdown channel fires and open connections get a grace period
//! to finish before they are aborted.

pub mod http;
pub mod routes;

use crate::app::App;
use crate::logging::ACCESS_TARGET;
use anyhow::Result;
use http::{HEAD_READ_TIMEOUT, HttpError, MAX_HEAD_BYTES, Response, read_request};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// How long open connections may run after shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Pause after a failed `accept` (e.g. file descriptor exhaustion).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Response behaviour switches from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// Send `Access-Control-Allow-Origin: *`.
    pub cors: bool,
    /// Skip access log lines for successful responses.
    pub silent: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            cors: true,
            silent: false,
        }
    }
}

/// Accept connections on `listener` until `shutdown` changes or its sender
/// is dropped.
pub async fn serve(
    listener: TcpListener,
    app: Arc<App>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut connections: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let app = Arc::clone(&app);
                    connections.spawn(handle_connection(app, stream, peer));
                }
                Err(e) => {
                    log::warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined
                    && e.is_panic()
                {
                    log::error!("Connection task panicked: {}", e);
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    drop(listener);
    if !connections.is_empty() {
        log::info!("Waiting for {} open connections", connections.len());
        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            log::warn!("Aborting connections still open after {:?}", SHUTDOWN_GRACE);
            connections.abort_all();
        }
    }
    log::info!("Server stopped");
    Ok(())
}

async fn handle_connection(app: Arc<App>, mut stream: TcpStream, peer: SocketAddr) {
    let started = Instant::now();
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader.take(MAX_HEAD_BYTES as u64 + 1));

    let (method, path, head_only, response) =
        match tokio::time::timeout(HEAD_READ_TIMEOUT, read_request(&mut reader)).await {
            Ok(Ok(request)) => {
                let response = routes::handle(&app, &request).await;
                (request.method.clone(), request.path.clone(), request.is_head(), response)
            }
            Ok(Err(e @ HttpError::TooLarge)) => {
                ("-".to_string(), "-".to_string(), false, Response::text(431, e.to_string()))
            }
            Ok(Err(e @ HttpError::Malformed(_))) => {
                ("-".to_string(), "-".to_string(), false, Response::text(400, e.to_string()))
            }
            Ok(Err(HttpError::Closed)) => return,
            Ok(Err(HttpError::Io(e))) => {
                log::debug!("Read from {} failed: {}", peer, e);
                return;
            }
            Err(_) => {
                log::debug!("{} sent no request within {:?}", peer, HEAD_READ_TIMEOUT);
                return;
            }
        };

    let response = app.decorate(response);
    if let Err(e) = response.write_to(&mut writer, head_only).await {
        log::debug!("Write to {} failed: {}", peer, e);
    }
    let _ = writer.shutdown().await;

    if !(app.options().silent && matches!(response.status, 200 | 304)) {
        log::info!(
            target: ACCESS_TARGET,
            "{} \"{} {}\" {} {} {}ms",
            peer.ip(),
            method,
            path,
            response.status,
            response.body.len(),
            started.elapsed().as_millis()
        );
    }
}
