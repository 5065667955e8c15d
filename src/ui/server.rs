//! HTTP server
//!
//! | Path | Description |
//! |------|-------------|
//! | `/ws` | Viewer WebSocket, push-only |
//! | `/api/status` | Current show state and intake counters |
//! | everything else | Static files from `static_dir` |

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::UiConfig;
use crate::error::{NetworkError, Result};
use crate::network::OscStats;
use crate::relay::Relay;
use crate::ui::{handlers, websocket};

/// Shared state for all request handlers
pub struct AppState {
    pub relay: Arc<Relay>,
    pub osc_stats: Arc<OscStats>,
    pub trust_proxy: bool,
}

/// Web server for viewers
pub struct WebServer {
    config: UiConfig,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(config: UiConfig, relay: Arc<Relay>, osc_stats: Arc<OscStats>) -> Self {
        let state = Arc::new(AppState {
            relay,
            osc_stats,
            trust_proxy: config.trust_proxy,
        });
        Self { config, state }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket::ws_handler))
            .route("/api/status", get(handlers::get_status))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| NetworkError::BindFailed(format!("{}: {}", addr, e)))?;

        let app = self.router();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }

    /// Serve on a background task
    pub fn start_background<F>(self, shutdown: F) -> tokio::task::JoinHandle<Result<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let result = self.run(shutdown).await;
            if let Err(ref e) = result {
                tracing::error!("Web server error: {}", e);
            }
            result
        })
    }
}
