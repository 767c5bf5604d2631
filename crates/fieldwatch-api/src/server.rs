//! API server implementation

use fieldwatch_core::{InMemoryRepository, ReportRepository};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::routes::{AppState, router};

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind; 0 picks a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fieldwatch persistence server
pub struct Server {
    config: ServerConfig,
    repo: Arc<dyn ReportRepository>,
}

impl Server {
    /// Creates a server backed by an empty in-memory store.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_repository(config, Arc::new(InMemoryRepository::new()))
    }

    /// Creates a server backed by the given repository.
    pub fn with_repository(config: ServerConfig, repo: Arc<dyn ReportRepository>) -> Self {
        Self { config, repo }
    }

    /// Listener settings.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The router with tracing attached.
    pub fn router(&self) -> axum::Router {
        router(AppState::new(self.repo.clone())).layer(TraceLayer::new_for_http())
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(%addr, backend = self.repo.name(), "Fieldwatch API listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("Fieldwatch API stopped");
        Ok(())
    }
}
