//! # HTTP Server for QR and Text Printing
//!
//! ## Routes
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET/POST | `/print` | Compose and print; `OK` once printed |
//! | GET/POST | `/preview` | Compose only; returns `image/png` |
//! | GET | `/health` | Liveness probe |
//!
//! Inputs: `?text=...&qr=...`, a JSON body `{"text": ..., "qr": ...}` where
//! `text` may be nested objects and arrays, or a raw text body.
//!
//! ## Usage
//!
//! ```bash
//! printpost --device /dev/rfcomm0 serve
//! curl 'http://localhost:8080/print?qr=https://example.com&text=Scan%20me'
//! ```

mod handlers;
mod state;

pub use handlers::ApiError;
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ServerError;

/// Largest accepted request body (10 KiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024;

const USAGE: &str = "\
Not found.

Usage:
  GET  /print?text=<text>&qr=<payload>
  POST /print   JSON {\"text\": <string|object|array>, \"qr\": <string>} or a plain text body
  GET|POST /preview   same inputs, returns image/png without printing
";

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/print", get(handlers::print::print).post(handlers::print::print))
        .route("/preview", get(handlers::preview::preview).post(handlers::preview::preview))
        .route("/health", get(|| async { "ok" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, USAGE) })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use printpost::printer::{PrintDispatcher, PrinterCapabilities, SpoolDriver};
/// use printpost::server::{serve, AppState, ServerConfig};
///
/// # async fn example() -> Result<(), printpost::error::ServerError> {
/// let driver = SpoolDriver::new("/tmp/spool", PrinterCapabilities::TSP650II);
/// let state = Arc::new(AppState::new(PrintDispatcher::new(driver)));
///
/// serve(ServerConfig::new("0.0.0.0", 8080), state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let printer = state.dispatcher.capabilities();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr.clone(),
            source,
        })?;

    info!(
        addr = %config.listen_addr,
        printer = printer.name,
        width_dots = printer.width_dots,
        dpi = printer.dpi,
        paper_mm = printer.width_mm().round() as u32,
        "printpost HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
